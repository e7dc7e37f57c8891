use std::fmt;

#[derive(Debug)]
pub enum IdentityServiceError {
    /// Missing, malformed, forged, expired or orphaned token. Callers recover
    /// by issuing a fresh identity.
    InvalidToken,
    JwtError(String),
    RepositoryUnavailable(String),
}

impl fmt::Display for IdentityServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IdentityServiceError::InvalidToken => write!(f, "Invalid identity token"),
            IdentityServiceError::JwtError(msg) => write!(f, "JWT error: {}", msg),
            IdentityServiceError::RepositoryUnavailable(msg) => {
                write!(f, "Identity store unavailable: {}", msg)
            }
        }
    }
}

impl std::error::Error for IdentityServiceError {}
