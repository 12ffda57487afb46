use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;

use crate::accounts::AccountService;
use crate::auth::{PasswordHasher, TokenCodec};
use crate::configuration::{DatabaseSettings, Settings, StoreBackend};
use crate::error::{AppError, DatabaseError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::middleware::AccessGuard;
use crate::routes::{current_user, health_check, index, login, signup, verify_token};
use crate::store::{AccountStore, InMemoryAccountStore, PgAccountStore};

/// Opens the configured account store, running migrations for Postgres.
pub async fn connect_store(settings: &DatabaseSettings) -> Result<Arc<dyn AccountStore>, AppError> {
    match settings.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory account store; accounts are lost on restart");
            Ok(Arc::new(InMemoryAccountStore::new()))
        }
        StoreBackend::Postgres => {
            tracing::info!("Attempting to connect to database");
            let pool = PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .connect(&settings.connection_string())
                .await?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| {
                    AppError::Database(DatabaseError::UnexpectedError(format!(
                        "Migration failed: {}",
                        e
                    )))
                })?;

            tracing::info!("Database connection pool created successfully");
            Ok(Arc::new(PgAccountStore::new(pool)))
        }
    }
}

/// Builds the token codec and account service from settings.
pub fn build_services(
    settings: &Settings,
    store: Arc<dyn AccountStore>,
) -> Result<(AccountService, Arc<TokenCodec>), AppError> {
    let codec = Arc::new(TokenCodec::new(&settings.jwt)?);
    let hasher = PasswordHasher::new(settings.hashing.cost);
    let accounts = AccountService::new(store, hasher, codec.clone())?;
    Ok((accounts, codec))
}

/// Malformed or non-JSON bodies become a 400 with the standard error body.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(ValidationError::MalformedBody(err.to_string())).into()
    })
}

pub fn run(
    listener: TcpListener,
    accounts: AccountService,
    codec: Arc<TokenCodec>,
) -> Result<Server, std::io::Error> {
    let accounts = web::Data::new(accounts);
    let codec_data = web::Data::from(codec.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(LoggerMiddleware)
            .app_data(json_config())
            .app_data(accounts.clone())
            .app_data(codec_data.clone())
            .route("/", web::get().to(index))
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .route("/signup", web::post().to(signup))
                    .route("/login", web::post().to(login))
                    .route("/verify-token", web::post().to(verify_token))
                    .service(
                        web::resource("/me")
                            .wrap(AccessGuard::new(codec.clone()))
                            .route(web::get().to(current_user)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
