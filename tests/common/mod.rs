#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use clinic_auth::auth::TokenCodec;
use clinic_auth::configuration::{
    ApplicationSettings, DatabaseSettings, HashingSettings, JwtSettings, Settings, StoreBackend,
};
use clinic_auth::startup::{build_services, run};
use clinic_auth::store::{AccountStore, InMemoryAccountStore};

pub struct TestApp {
    pub address: String,
    pub codec: Arc<TokenCodec>,
    pub store: InMemoryAccountStore,
}

pub fn test_settings() -> Settings {
    Settings {
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseSettings {
            backend: StoreBackend::Memory,
            username: String::new(),
            password: String::new(),
            port: 0,
            host: String::new(),
            database_name: String::new(),
            url: None,
            max_connections: 1,
        },
        jwt: JwtSettings {
            secret: "integration-test-secret-at-least-32-chars".to_string(),
            issuer: "clinic_auth_test".to_string(),
            token_ttl_hours: 24,
        },
        // Minimum bcrypt cost keeps the suite fast.
        hashing: HashingSettings { cost: 4 },
    }
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store = InMemoryAccountStore::new();
    let shared: Arc<dyn AccountStore> = Arc::new(store.clone());
    let (accounts, codec) =
        build_services(&test_settings(), shared).expect("Failed to build services");

    let server = run(listener, accounts, codec.clone()).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        codec,
        store,
    }
}
