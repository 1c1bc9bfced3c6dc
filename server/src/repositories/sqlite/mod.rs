//! SqlStore - Backend durevole su SQLite
//!
//! Le query usano `sqlx::query_as` con binding a runtime e righe `FromRow`:
//! niente macro `query!`, così il crate compila anche senza un database raggiungibile.
//! I timestamp sono salvati come secondi epoch interi; la conversione da e verso
//! `DateTime<Utc>` avviene solo qui dentro ed è esatta al secondo.

mod conversation;
mod message;
mod user;

use super::StoreError;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct SqlStore {
    connection_pool: SqlitePool,
}

impl SqlStore {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Apre il pool, crea il file se manca e applica le migrations da `migrations/`
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.migrate().await?;
        info!("Durable store ready");
        Ok(store)
    }

    /// Database in memoria su una singola connessione che non scade mai:
    /// con SQLite ogni connessione `:memory:` è un database a sé.
    pub async fn connect_in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.connection_pool).await?;
        Ok(())
    }
}

/// `DateTime<Utc>` -> secondi epoch (la parte sub-secondo viene scartata)
pub(crate) fn to_epoch(at: &DateTime<Utc>) -> i64 {
    at.timestamp()
}

/// secondi epoch -> `DateTime<Utc>`
pub(crate) fn from_epoch(secs: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp(secs, 0).ok_or(StoreError::InvalidTimestamp(secs))
}
