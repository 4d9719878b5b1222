/// Public library interface for the Habit Insights MCP server
///
/// The analytics engine (`AnalyticsEngine::compute`) is usable on its own
/// against any `EventStore`. `InsightServer` hosts it behind MCP tools backed
/// by SQLite.

use std::path::PathBuf;
use thiserror::Error;

// Internal modules
mod domain;
pub mod storage;
pub mod analytics;
pub mod tools;
pub mod mcp;

// Re-export public modules and types
pub use domain::*;
pub use storage::{EventLog, EventStore, MemoryStore, SqliteStorage, StorageError};
pub use analytics::{
    AnalyticsEngine, EngineConfig, EngineError, FocusPoint, Insight, InsightReport, MoodPoint, WeeklyStats,
};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Insights server: SQLite storage plus the analytics engine
///
/// This server manages event data through a SQLite database and answers
/// MCP tool calls for logging events and reading weekly insights.
pub struct InsightServer {
    storage: SqliteStorage,
    analytics: AnalyticsEngine,
}

impl InsightServer {
    /// Create a server with the default engine thresholds
    ///
    /// This will initialize the SQLite database with the required schema
    /// if it doesn't already exist.
    pub async fn new(db_path: PathBuf) -> Result<Self, ServerError> {
        Self::with_config(db_path, EngineConfig::default()).await
    }

    /// Create a server with custom engine thresholds
    pub async fn with_config(db_path: PathBuf, config: EngineConfig) -> Result<Self, ServerError> {
        tracing::info!("Initializing Habit Insights server with database: {:?}", db_path);

        let storage = SqliteStorage::new(db_path)?;
        let analytics = AnalyticsEngine::with_config(config);

        Ok(Self {
            storage,
            analytics,
        })
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin closes or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");
        tracing::debug!("Engine thresholds: {:?}", self.analytics.config());

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Get a reference to the analytics engine (useful for testing)
    pub fn analytics(&self) -> &AnalyticsEngine {
        &self.analytics
    }
}
