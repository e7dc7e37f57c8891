pub mod board_service_errors;
pub mod game_service_errors;
pub mod identity_service_errors;
pub mod user_service_errors;
