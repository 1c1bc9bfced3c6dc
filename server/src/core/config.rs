use dotenv::dotenv;
use std::env;
use tracing::{info, warn};

const DEFAULT_JWT_SECRET: &str = "concierge-dev-secret-change-in-production";

/// Backend del Persistence Gateway, scelto una volta sola all'avvio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Durable,
    Ephemeral,
}

/// Account staff creato all'avvio se la sua email non è ancora registrata
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub max_connections: u32,
    pub app_env: String,
    pub admin_seed: Option<AdminSeed>,
}

impl Config {
    /// Carica la configurazione dalle variabili d'ambiente
    /// Chiama dotenv() automaticamente
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let store_backend = match env::var("STORE_BACKEND").ok().as_deref() {
            Some("durable") => StoreBackend::Durable,
            Some("ephemeral") => StoreBackend::Ephemeral,
            Some(other) => {
                return Err(format!(
                    "Invalid STORE_BACKEND '{}': must be 'durable' or 'ephemeral'",
                    other
                ));
            }
            None if database_url.is_some() => StoreBackend::Durable,
            None => StoreBackend::Ephemeral,
        };

        if store_backend == StoreBackend::Durable && database_url.is_none() {
            return Err("DATABASE_URL must be set when STORE_BACKEND is durable".to_string());
        }

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using default (not secure for production!)");
            DEFAULT_JWT_SECRET.to_string()
        });

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| "Invalid SERVER_PORT: must be a number between 0-65535".to_string())?;

        let max_connections = env::var("MAX_DB_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .map_err(|_| "Invalid MAX_DB_CONNECTIONS: must be a positive number".to_string())?;

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let admin_seed = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(AdminSeed {
                name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Concierge".to_string()),
                email,
                password,
            }),
            (Ok(_), Err(_)) | (Err(_), Ok(_)) => {
                return Err("ADMIN_EMAIL and ADMIN_PASSWORD must be set together".to_string());
            }
            _ => None,
        };

        Ok(Config {
            store_backend,
            database_url,
            jwt_secret,
            server_host,
            server_port,
            max_connections,
            app_env,
            admin_seed,
        })
    }

    /// Logga la configurazione (nascondendo i segreti)
    pub fn print_info(&self) {
        info!("Server Configuration:");
        info!("   Environment: {}", self.app_env);
        info!("   Server Address: {}:{}", self.server_host, self.server_port);
        info!("   Store backend: {:?}", self.store_backend);
        if let Some(url) = &self.database_url {
            info!("   Database: {}", Self::mask_url(url));
        }
        info!("   Max DB Connections: {}", self.max_connections);
        info!(
            "   JWT Secret: {}",
            if self.jwt_secret == DEFAULT_JWT_SECRET {
                "USING DEFAULT (INSECURE!)"
            } else {
                "custom secret configured"
            }
        );
        if let Some(seed) = &self.admin_seed {
            info!("   Staff account: {}", seed.email);
        }
    }

    /// Maschera l'URL del database per il logging
    fn mask_url(url: &str) -> String {
        if let Some(at_pos) = url.find('@') {
            if let Some(scheme_end) = url.find("://") {
                let scheme = &url[..scheme_end + 3];
                let after_at = &url[at_pos..];
                return format!("{}***{}", scheme, after_at);
            }
        }
        // i path sqlite non hanno credenziali
        url.to_string()
    }
}
