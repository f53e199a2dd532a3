//! Database Module
//!
//! Owns the embedded SurrealDB handle. The connection is opened once at
//! process start and shared across requests via [`crate::core::ServerState`].

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Database service — owns the embedded SurrealDB connection
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open the embedded database at the given path and select the
    /// application namespace
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns("storefront")
            .use_db("main")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        tracing::info!("Database connection established (embedded SurrealDB at {db_path})");

        Ok(Self { db })
    }
}
