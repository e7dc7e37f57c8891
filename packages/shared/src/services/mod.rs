pub mod access_control;
pub mod board_service;
pub mod errors;
pub mod game_service;
pub mod identity_service;
pub mod user_service;
