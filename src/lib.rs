pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod utils;

use sea_orm::DatabaseConnection;

use crate::services::mailer::Mailer;
use crate::services::storage::MediaStore;

pub use config::Config;
pub use error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub mailer: Option<Mailer>,
    pub media: MediaStore,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let mailer = Mailer::from_config(&config);
        let media = MediaStore::new(&config);
        Self {
            db,
            config,
            mailer,
            media,
        }
    }
}
