use std::sync::Arc;

use ts_core::{CollectionRepo, ThreadRepo};
use ts_services::{ServiceConfig, Services};

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
}

impl AppState {
    pub fn new(
        threads: Arc<dyn ThreadRepo>,
        collections: Arc<dyn CollectionRepo>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            services: Services::new(threads, collections, config),
        }
    }
}
