//! Application state - shared across all handlers.

use std::sync::Arc;

use blogicum_core::ports::{CategoryRepository, CommentRepository, PostRepository, UserRepository};
use blogicum_infra::database::{DatabaseConfig, InMemoryDatabase};

#[cfg(feature = "postgres")]
use blogicum_infra::database::{
    DatabaseConnections, PostgresCategoryRepository, PostgresCommentRepository,
    PostgresPostRepository, PostgresUserRepository,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub posts_per_page: u64,
}

impl AppState {
    /// Repositories backed by a fresh in-memory store.
    pub fn in_memory(posts_per_page: u64) -> Self {
        Self::from_memory(&InMemoryDatabase::new(), posts_per_page)
    }

    /// Repositories backed by an existing in-memory store.
    pub fn from_memory(db: &InMemoryDatabase, posts_per_page: u64) -> Self {
        Self {
            users: Arc::new(db.users()),
            categories: Arc::new(db.categories()),
            posts: Arc::new(db.posts()),
            comments: Arc::new(db.comments()),
            posts_per_page,
        }
    }

    #[cfg(feature = "postgres")]
    fn from_connections(connections: DatabaseConnections, posts_per_page: u64) -> Self {
        let conn = connections.main;
        Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn)),
            posts_per_page,
        }
    }

    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>, posts_per_page: u64) -> Self {
        #[cfg(feature = "postgres")]
        let state = {
            if let Some(config) = db_config {
                match DatabaseConnections::init(config).await {
                    Ok(connections) => Self::from_connections(connections, posts_per_page),
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        Self::in_memory(posts_per_page)
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::in_memory(posts_per_page)
            }
        };

        #[cfg(not(feature = "postgres"))]
        let state = {
            if db_config.is_some() {
                tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
            }
            tracing::info!("Running without postgres feature - using in-memory repository");
            Self::in_memory(posts_per_page)
        };

        tracing::info!(posts_per_page = state.posts_per_page, "Application state initialized");
        state
    }
}
