//! HTTP surface: GraphQL execution, GraphiQL, and a liveness probe.

use async_graphql::dynamic::Schema;
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use biograph_core::{RequestContext, ServiceConfig};

use crate::error::{ApiError, Result};

/// Header naming the logical database for one request.
pub const DATABASE_HEADER: &str = "x-neo4j-database";

pub const GRAPHQL_PATH: &str = "/graphql";

/// Shared by every request handler. Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    schema: Schema,
    default_database: String,
    allow_database_override: bool,
}

impl AppState {
    pub fn new(schema: Schema, config: &ServiceConfig) -> Self {
        Self {
            schema,
            default_database: config.neo4j.database.clone(),
            allow_database_override: config.api.allow_database_override,
        }
    }

    /// Build the context for one request from its headers.
    pub fn request_context(&self, headers: &HeaderMap) -> RequestContext {
        let requested = self
            .allow_database_override
            .then(|| headers.get(DATABASE_HEADER))
            .flatten()
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|db| !db.is_empty());
        RequestContext::for_database(requested.unwrap_or(&self.default_database))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(GRAPHQL_PATH, get(graphiql).post(graphql_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let ctx = state.request_context(&headers);
    let span = tracing::info_span!(
        "graphql",
        request_id = %Uuid::new_v4(),
        database = %ctx.database
    );
    let request = request.into_inner().data(ctx);
    state.schema.execute(request).instrument(span).await.into()
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Bind `addr` and serve until Ctrl-C or SIGTERM.
pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ApiError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    tracing::info!("GraphQL endpoint available at http://{addr}{GRAPHQL_PATH}");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::HeaderValue;
    use biograph_core::catalog::compile_biomedical;
    use biograph_graph::InMemoryBackend;

    use crate::schema::{build_schema, SchemaOptions};

    fn state(allow_database_override: bool) -> AppState {
        let mut config = ServiceConfig::default();
        config.api.allow_database_override = allow_database_override;
        let schema = build_schema(
            Arc::new(compile_biomedical().unwrap()),
            Arc::new(InMemoryBackend::new()),
            &SchemaOptions::from(&config),
        )
        .unwrap();
        AppState::new(schema, &config)
    }

    #[test]
    fn database_header_requires_opt_in() {
        let mut headers = HeaderMap::new();
        headers.insert(DATABASE_HEADER, HeaderValue::from_static("biocypher"));

        assert_eq!(state(false).request_context(&headers).database, "neo4j");
        assert_eq!(state(true).request_context(&headers).database, "biocypher");
        assert_eq!(state(true).request_context(&HeaderMap::new()).database, "neo4j");
    }
}
