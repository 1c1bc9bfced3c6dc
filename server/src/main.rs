use server::config::{Config, StoreBackend};
use server::repositories::{Gateway, SqlStore};
use server::services::ensure_admin_exists;
use server::{AppState, create_router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "server=debug,concierge_server=debug,tower_http=info".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Carica la configurazione (legge anche il .env)
    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;
    config.print_info();

    // Il backend si sceglie qui una volta sola, il resto dell'app vede solo il Gateway
    let store = match (config.store_backend, config.database_url.as_deref()) {
        (StoreBackend::Durable, Some(url)) => {
            info!("Connecting to SQLite store...");
            Gateway::from(SqlStore::connect(url, config.max_connections).await?)
        }
        (StoreBackend::Durable, None) => {
            return Err("DATABASE_URL must be set when STORE_BACKEND is durable".into());
        }
        (StoreBackend::Ephemeral, _) => {
            info!("Using in-memory store, data is lost on restart");
            Gateway::ephemeral()
        }
    };

    if let Some(seed) = &config.admin_seed {
        ensure_admin_exists(&store, seed).await?;
    }

    let state = Arc::new(AppState::new(store, config.jwt_secret.clone()));

    // Il widget vive su domini diversi, CORS aperto
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state).layer(cors);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Concierge listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
