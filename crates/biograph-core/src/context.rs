//! Per-request execution context.

use serde::{Deserialize, Serialize};

/// Values derived independently for every inbound request and passed to the
/// graph backend unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestContext {
    /// Logical database the request's queries run against.
    pub database: String,
}

impl RequestContext {
    pub fn for_database(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
        }
    }
}
