//! School administration screens: a catalog of entities served as generic CRUD
//! pages over embedded SQLite stores, rendered as full pages or Datastar fragments.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod logging;
pub mod menu;
pub mod migration;
pub mod naming;
pub mod notify;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;
pub mod view;

pub use config::{builtin_catalog, load_from_path, resolve, Catalog, CatalogConfig, EntityConfig};
pub use error::{AppError, ConfigError};
pub use migration::ensure_tables;
pub use routes::app_router;
pub use service::{Row, RowRepository};
pub use settings::Settings;
pub use state::AppState;
pub use store::Stores;

/// Catalog from `CATALOG_PATH` when set, else the built-in one. Validated.
pub async fn load_catalog(settings: &Settings) -> Result<Catalog, ConfigError> {
    let config = match &settings.catalog_path {
        Some(path) => load_from_path(path).await?,
        None => builtin_catalog(),
    };
    resolve(&config)
}

/// Open stores, ensure tables and assemble state.
pub async fn bootstrap(settings: Settings) -> Result<AppState, AppError> {
    let catalog = load_catalog(&settings).await?;
    let stores = Stores::open(&settings).await?;
    ensure_tables(&stores, &catalog).await?;
    AppState::new(stores, catalog, settings)
}
