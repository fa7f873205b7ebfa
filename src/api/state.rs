use std::sync::Arc;

use crate::db::SessionStore;
use crate::services::MovieCatalog;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn MovieCatalog>,
    pub sessions: Arc<dyn SessionStore>,
    /// Prefix for poster image URLs in rendered pages
    pub poster_base_url: String,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn MovieCatalog>,
        sessions: Arc<dyn SessionStore>,
        poster_base_url: String,
    ) -> Self {
        Self {
            catalog,
            sessions,
            poster_base_url,
        }
    }
}
