use std::sync::Arc;

use crate::domain::repositories::{BookRepository, UserRepository};
use crate::infrastructure::auth::JwtKeys;
use crate::infrastructure::catalog::CatalogClient;
use crate::infrastructure::database::Database;
use crate::infrastructure::repositories::{SqlBookRepository, SqlUserRepository};

/// Configuration for everything that varies between production and test
/// environments. Repositories are created automatically from the pool.
pub struct AppStateConfig {
    pub jwt_keys: JwtKeys,
    pub catalog_url: String,
}

#[derive(Clone)]
pub struct AppState {
    pub book_repo: Arc<dyn BookRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub jwt_keys: JwtKeys,
    pub catalog: CatalogClient,
}

impl AppState {
    pub fn from_database(database: &Database, config: AppStateConfig) -> Self {
        let pool = database.clone_pool();

        let book_repo: Arc<dyn BookRepository> = Arc::new(SqlBookRepository::new(pool.clone()));
        let user_repo: Arc<dyn UserRepository> = Arc::new(SqlUserRepository::new(pool));

        #[allow(clippy::expect_used)] // Startup: no TLS backend means nothing will work anyway
        let http_client = reqwest::ClientBuilder::new()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            book_repo,
            user_repo,
            jwt_keys: config.jwt_keys,
            catalog: CatalogClient::new(http_client, config.catalog_url),
        }
    }
}
