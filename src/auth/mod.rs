/// Authentication module
///
/// Password hashing, session token issuance/verification, and the role
/// model carried inside tokens.

mod claims;
mod jwt;
mod password;
mod role;

pub use claims::Claims;
pub use claims::Identity;
pub use jwt::TokenCodec;
pub use jwt::TokenError;
pub use password::PasswordHasher;
pub use password::MAX_PASSWORD_BYTES;
pub use role::Role;
