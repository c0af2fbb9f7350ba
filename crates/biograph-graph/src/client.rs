//! Neo4j connection management and shared graph client.

use neo4rs::{query, ConfigBuilder, Graph, Query};

use biograph_core::config::Neo4jSettings;

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Failed to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },

    #[error("Unknown attribute {attribute} on {kind}")]
    UnknownAttribute { kind: String, attribute: String },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    /// Database used when a request does not name one.
    pub database: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self::from(&Neo4jSettings::default())
    }
}

impl From<&Neo4jSettings> for GraphConfig {
    fn from(settings: &Neo4jSettings) -> Self {
        Self {
            uri: settings.uri.clone(),
            user: settings.user.clone(),
            password: settings.password.clone(),
            database: settings.database.clone(),
            max_connections: settings.max_connections,
            fetch_size: settings.fetch_size,
        }
    }
}

/// Thread-safe Neo4j graph client with connection pooling.
///
/// One client is created at startup and shared by every request. Each
/// statement is routed to the logical database named by the caller.
/// Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
    database: String,
}

impl GraphClient {
    /// Connect to Neo4j and verify the connection with a trivial statement.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        graph
            .run_on(config.database.as_str(), query("RETURN 1"))
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, database = %config.database, "Connected to Neo4j");
        Ok(Self {
            graph,
            database: config.database.clone(),
        })
    }

    /// The database configured at connect time.
    pub fn default_database(&self) -> &str {
        &self.database
    }

    /// Get a reference to the underlying neo4rs Graph for direct operations.
    pub fn inner(&self) -> &Graph {
        &self.graph
    }

    /// Execute a write-only statement against `database`.
    pub async fn run_on(&self, database: &str, query: Query) -> Result<(), GraphError> {
        self.graph.run_on(database, query).await?;
        Ok(())
    }

    /// Execute a read statement against `database` and collect all rows.
    pub async fn query_rows_on(
        &self,
        database: &str,
        query: Query,
    ) -> Result<Vec<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute_on(database, query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a read statement against `database` and return the first row.
    pub async fn query_one_on(
        &self,
        database: &str,
        query: Query,
    ) -> Result<Option<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute_on(database, query).await?;
        Ok(stream.next().await?)
    }
}
