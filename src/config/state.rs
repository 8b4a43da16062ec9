// Application state module
// Holds configuration and the mock database handle

use std::path::Path;
use std::sync::Arc;

use super::types::Config;
use crate::api::types::{default_shows, SHOWS};
use crate::store::{self, MockDb, StoreError};

/// Application state shared by every connection
pub struct AppState {
    pub config: Config,
    pub db: Arc<MockDb>,
}

impl AppState {
    pub fn new(config: &Config, db: Arc<MockDb>) -> Self {
        Self {
            config: config.clone(),
            db,
        }
    }

    /// Build state with a database populated according to `[store]`
    pub fn with_seeded_store(config: &Config) -> Result<Self, StoreError> {
        let db = MockDb::new();

        if config.store.seed {
            db.seed(SHOWS, default_shows())?;
        }

        if let Some(ref path) = config.store.seed_file {
            for (collection, records) in store::load_seed_file(Path::new(path))? {
                db.seed(&collection, records)?;
            }
        }

        Ok(Self::new(config, Arc::new(db)))
    }
}
