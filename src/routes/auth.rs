/// Authentication Routes
///
/// Handles account registration, login, token verification, and current
/// user information.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::accounts::AccountService;
use crate::auth::{Role, TokenCodec, TokenError};
use crate::error::{AppError, AuthError, ErrorContext, ValidationError};
use crate::middleware::AuthenticatedUser;
use crate::validators::require_field;

/// Account registration request
///
/// Fields are optional so that absent values produce the same
/// "Missing required fields" error as empty ones.
#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Token verification request
#[derive(Deserialize)]
pub struct VerifyTokenRequest {
    pub token: Option<String>,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user_id: i64,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

#[derive(Serialize)]
pub struct TokenStatusResponse {
    pub message: String,
    pub user_id: i64,
    pub role: Role,
}

/// POST /api/signup
///
/// # Errors
/// - 400: Missing fields, unknown role, or username already exists
/// - 500: Internal server error
pub async fn signup(
    form: web::Json<SignupRequest>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("signup");

    let username = require_field(form.username.as_deref())?;
    let password = require_field(form.password.as_deref())?;
    let role: Role = require_field(form.role.as_deref())?.parse()?;

    let account = accounts.register(username, password, role).await?;

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        user_id = account.id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(SignupResponse {
        message: "User registered successfully".to_string(),
        user_id: account.id,
    }))
}

/// POST /api/login
///
/// # Errors
/// - 400: Missing fields
/// - 401: Invalid credentials (unknown username or wrong password)
///
/// # Security Notes
/// - Same error for "not found" and "wrong password"
pub async fn login(
    form: web::Json<LoginRequest>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("login");

    let username = require_field(form.username.as_deref())?;
    let password = require_field(form.password.as_deref())?;

    let token = accounts.authenticate(username, password).await?;

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login successful".to_string(),
        token,
    }))
}

/// GET /api/me
///
/// **Requires a valid token** in the Authorization header; the identity is
/// injected by `AccessGuard`.
///
/// # Errors
/// - 401: Missing or invalid token (handled by middleware)
/// - 404: Account no longer exists
pub async fn current_user(
    user: AuthenticatedUser,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse, AppError> {
    let AuthenticatedUser(identity) = user;
    let context = ErrorContext::new("current_user").with_user_id(identity.user_id);

    let account = accounts.find_account(identity.user_id).await?;

    tracing::debug!(
        request_id = %context.request_id,
        operation = %context.operation,
        user_id = ?context.user_id,
        "Current user fetched"
    );

    Ok(HttpResponse::Ok().json(UserResponse {
        user_id: account.id,
        username: account.username,
        role: account.role,
    }))
}

/// POST /api/verify-token
///
/// Unlike the access guard, this endpoint tells the client whether a token
/// failed because it expired.
///
/// # Errors
/// - 400: Token missing from the body
/// - 401: Token expired, or invalid for any other reason
pub async fn verify_token(
    form: web::Json<VerifyTokenRequest>,
    codec: web::Data<TokenCodec>,
) -> Result<HttpResponse, AppError> {
    let token = form
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or(ValidationError::MissingToken)?;

    match codec.verify(token) {
        Ok(identity) => Ok(HttpResponse::Ok().json(TokenStatusResponse {
            message: "Token is valid".to_string(),
            user_id: identity.user_id,
            role: identity.role,
        })),
        Err(TokenError::Expired) => Err(AuthError::TokenExpired.into()),
        Err(e) => {
            tracing::warn!(reason = e.kind(), "Token verification failed");
            Err(AuthError::TokenRejected.into())
        }
    }
}
