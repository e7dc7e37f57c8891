use serde::{Deserialize, Serialize};

use crate::models::user::User;

/// Claims of an identity token. Only the external id is carried; roles are
/// recomputed per request.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct IdentityClaims {
    pub sub: String, // subject (external user ID)
    pub iat: usize,  // issued at
}

/// A freshly minted identity and the signed token the client must keep.
#[derive(Debug, Clone)]
pub struct IssuedIdentity {
    pub user: User,
    pub token: String,
}

/// Result of resolving the caller's identity for one request.
#[derive(Debug, Clone)]
pub enum SessionOutcome {
    Resolved(User),
    Issued(IssuedIdentity),
}
