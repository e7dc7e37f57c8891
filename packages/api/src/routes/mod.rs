pub mod games;
pub mod health;
pub mod identity;
pub mod join;
pub mod user;
