pub mod auth;
pub mod game;
pub mod move_request;
pub mod role;
pub mod user;
pub mod views;
