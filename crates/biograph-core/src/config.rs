//! Configuration management for biograph.
//!
//! Configuration is loaded from (in priority order):
//! 1. Legacy environment variables (`NEO4J_URI`, `NEO4J_USERNAME`,
//!    `NEO4J_PASSWORD`, `NEO4J_DATABASE_NAME`, `API_PORT`)
//! 2. Environment variables (`BIOGRAPH_` prefix, `__` between section and
//!    key, e.g. `BIOGRAPH_NEO4J__URI`)
//! 3. Config file (`biograph.toml` by default)
//! 4. Defaults
//!
//! Connection parameters are passed through untouched; nothing here checks
//! that the database is reachable.

use serde::Deserialize;

use crate::error::BiographError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub neo4j: Neo4jSettings,

    #[serde(default)]
    pub api: ApiSettings,
}

/// Neo4j connection settings (`[neo4j]`).
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    /// Default logical database for requests.
    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

/// HTTP and GraphQL settings (`[api]`).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Expose `create*` / `update*` / `delete*` mutations.
    #[serde(default = "default_mutations_enabled")]
    pub mutations_enabled: bool,

    /// Honour the `x-neo4j-database` request header.
    #[serde(default)]
    pub allow_database_override: bool,

    /// Must stay deep enough for GraphiQL's introspection query.
    #[serde(default = "default_depth_limit")]
    pub depth_limit: usize,

    #[serde(default = "default_complexity_limit")]
    pub complexity_limit: usize,
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_database() -> String {
    "neo4j".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_mutations_enabled() -> bool {
    true
}

fn default_depth_limit() -> usize {
    16
}

fn default_complexity_limit() -> usize {
    20_000
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: String::new(),
            database: default_database(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            mutations_enabled: default_mutations_enabled(),
            allow_database_override: false,
            depth_limit: default_depth_limit(),
            complexity_limit: default_complexity_limit(),
        }
    }
}

/// Legacy variable names and the keys they override.
const LEGACY_ENV: [(&str, &str); 5] = [
    ("NEO4J_URI", "neo4j.uri"),
    ("NEO4J_USERNAME", "neo4j.user"),
    ("NEO4J_PASSWORD", "neo4j.password"),
    ("NEO4J_DATABASE_NAME", "neo4j.database"),
    ("API_PORT", "api.port"),
];

impl ServiceConfig {
    /// Load from `<file_prefix>.toml` (optional) and the process environment.
    pub fn load(file_prefix: &str) -> Result<Self, BiographError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("BIOGRAPH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        for (var, key) in LEGACY_ENV {
            builder = builder.set_override_option(key, std::env::var(var).ok())?;
        }
        let cfg = builder.build()?.try_deserialize::<ServiceConfig>()?;

        tracing::debug!(
            uri = %cfg.neo4j.uri,
            database = %cfg.neo4j.database,
            port = cfg.api.port,
            "Configuration loaded"
        );
        Ok(cfg)
    }

    /// Socket address the HTTP server binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const ENV_VARS: [&str; 5] = [
        "BIOGRAPH_API__PORT",
        "BIOGRAPH_NEO4J__DATABASE",
        "API_PORT",
        "NEO4J_DATABASE_NAME",
        "NEO4J_PASSWORD",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.neo4j.uri, "bolt://localhost:7687");
        assert_eq!(config.neo4j.database, "neo4j");
        assert_eq!(config.api.port, 4000);
        assert!(config.api.mutations_enabled);
        assert_eq!(config.listen_addr(), "0.0.0.0:4000");
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("biograph-test.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[neo4j]
uri = "bolt://graph.internal:7687"
password = "s3cret"
database = "crossbar"

[api]
port = 8080
mutations_enabled = false
"#
        )
        .unwrap();

        let prefix = dir.path().join("biograph-test");
        let config = ServiceConfig::load(prefix.to_str().unwrap()).unwrap();
        assert_eq!(config.neo4j.uri, "bolt://graph.internal:7687");
        assert_eq!(config.neo4j.user, "neo4j");
        assert_eq!(config.neo4j.password, "s3cret");
        assert_eq!(config.neo4j.database, "crossbar");
        assert_eq!(config.neo4j.max_connections, 16);
        assert_eq!(config.api.port, 8080);
        assert!(!config.api.mutations_enabled);
        assert!(!config.api.allow_database_override);
    }

    #[test]
    #[serial]
    fn test_env_precedence() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("biograph-env.toml");
        std::fs::write(
            &path,
            "[neo4j]\ndatabase = \"from-file\"\npassword = \"file\"\n\n[api]\nport = 8080\n",
        )
        .unwrap();
        let prefix = dir.path().join("biograph-env");
        let prefix = prefix.to_str().unwrap();

        std::env::set_var("BIOGRAPH_API__PORT", "9090");
        std::env::set_var("BIOGRAPH_NEO4J__DATABASE", "from-prefix");
        let prefixed = ServiceConfig::load(prefix);

        std::env::set_var("API_PORT", "8081");
        std::env::set_var("NEO4J_DATABASE_NAME", "crossbar");
        std::env::set_var("NEO4J_PASSWORD", "12345");
        let legacy = ServiceConfig::load(prefix);

        // Cleanup
        clear_env();

        let prefixed = prefixed.unwrap();
        assert_eq!(prefixed.api.port, 9090);
        assert_eq!(prefixed.neo4j.database, "from-prefix");
        assert_eq!(prefixed.neo4j.password, "file");

        let legacy = legacy.unwrap();
        assert_eq!(legacy.api.port, 8081);
        assert_eq!(legacy.neo4j.database, "crossbar");
        assert_eq!(legacy.neo4j.password, "12345");
        assert_eq!(legacy.neo4j.user, "neo4j");
    }
}
