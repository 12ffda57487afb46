mod auth;
mod health_check;

pub use auth::{current_user, login, signup, verify_token};
pub use health_check::{health_check, index};
