/// Middleware module
///
/// Request gating: token verification and role checks.

mod access_guard;
mod role_guard;

pub use access_guard::bearer_token;
pub use access_guard::AccessGuard;
pub use access_guard::AuthenticatedUser;
pub use role_guard::RoleGuard;
