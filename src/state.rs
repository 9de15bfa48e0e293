//! Shared application state for all routes. Everything except the notifier is read-only.

use crate::config::Catalog;
use crate::error::AppError;
use crate::menu::default_menu;
use crate::notify::Notifier;
use crate::settings::Settings;
use crate::store::Stores;
use crate::view::Renderer;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub catalog: Arc<Catalog>,
    pub renderer: Arc<Renderer>,
    pub notifier: Notifier,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(stores: Stores, catalog: Catalog, settings: Settings) -> Result<Self, AppError> {
        let renderer = Renderer::new(&default_menu())?;
        Ok(AppState {
            stores,
            catalog: Arc::new(catalog),
            renderer: Arc::new(renderer),
            notifier: Notifier::new(),
            settings: Arc::new(settings),
        })
    }
}
