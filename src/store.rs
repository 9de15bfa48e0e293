//! Embedded store connections: one pool per store, opened from a connection URL.

use crate::config::StoreKind;
use crate::error::{AppError, ConfigError};
use crate::settings::Settings;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Open a pool for `database_url`, creating the database file when missing.
/// In-memory URLs are pinned to a single long-lived connection so every
/// statement sees the same database.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, AppError> {
    let opts = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| ConfigError::Load(format!("invalid database url '{}': {}", database_url, e)))?
        .create_if_missing(true);
    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
    let pool = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(opts)
            .await?
    };
    tracing::info!(url = %database_url, "store connected");
    Ok(pool)
}

/// Pools for every store the catalog can reference.
#[derive(Clone, Debug)]
pub struct Stores {
    pub school: SqlitePool,
    pub spin: SqlitePool,
}

impl Stores {
    pub async fn open(settings: &Settings) -> Result<Self, AppError> {
        let school = connect(&settings.school_db_url, settings.max_connections).await?;
        let spin = connect(&settings.spin_db_url, settings.max_connections).await?;
        Ok(Stores { school, spin })
    }

    /// Two independent in-memory stores.
    pub async fn in_memory() -> Result<Self, AppError> {
        Ok(Stores {
            school: connect("sqlite::memory:", 1).await?,
            spin: connect("sqlite::memory:", 1).await?,
        })
    }

    pub fn pool(&self, kind: StoreKind) -> &SqlitePool {
        match kind {
            StoreKind::School => &self.school,
            StoreKind::Spin => &self.spin,
        }
    }

    /// Readiness probe: one trivial statement per store.
    pub async fn ping(&self) -> Result<(), AppError> {
        for pool in [&self.school, &self.spin] {
            sqlx::query("SELECT 1").fetch_optional(pool).await?;
        }
        Ok(())
    }
}
