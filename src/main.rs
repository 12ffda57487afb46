use std::net::TcpListener;
use clinic_auth::configuration::get_configuration;
use clinic_auth::startup::{build_services, connect_store, run};
use clinic_auth::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let store = connect_store(&configuration.database).await.map_err(|e| {
        tracing::error!("Failed to open account store: {}", e);
        std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "Database connection error",
        )
    })?;

    // The signing key is read here once and never again.
    let (accounts, codec) = build_services(&configuration, store).map_err(|e| {
        tracing::error!("Failed to initialise services: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;

    let address = configuration.application.address();
    tracing::info!("Binding server to address: {}", address);

    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, accounts, codec)?;
    tracing::info!("Server started successfully");

    server.await
}
