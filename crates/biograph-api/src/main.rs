//! CLI entry point for the biograph GraphQL endpoint.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use biograph_api::{build_schema, serve, AppState, SchemaOptions};
use biograph_core::catalog::compile_biomedical;
use biograph_core::ServiceConfig;
use biograph_graph::{GraphClient, GraphConfig, InMemoryBackend};

#[derive(Parser)]
#[command(name = "biograph")]
#[command(about = "GraphQL endpoint over the biomedical knowledge graph")]
struct Cli {
    /// Config file prefix (default: biograph).
    #[arg(short, long, default_value = "biograph", global = true)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Connect to Neo4j and serve GraphQL over HTTP.
    Serve {
        /// Override the listen port from config.
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the knowledge-graph schema as Neo4j GraphQL type definitions.
    Schema {
        /// Print the compiled model as JSON instead.
        #[arg(long)]
        json: bool,
    },
    /// Print the generated GraphQL SDL.
    Sdl {
        /// Leave out the create/update/delete mutations.
        #[arg(long)]
        read_only: bool,
    },
    /// Compile the schema and report what it declares.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Command::Serve { .. }));

    match cli.command {
        Command::Serve { port } => {
            let mut config = ServiceConfig::load(&cli.config)?;
            if let Some(port) = port {
                config.api.port = port;
            }
            run_server(config).await
        }
        Command::Schema { json } => {
            let schema = compile_biomedical()?;
            if json {
                println!("{}", schema.to_json()?);
            } else {
                print!("{}", schema.to_sdl());
            }
            Ok(())
        }
        Command::Sdl { read_only } => {
            let options = SchemaOptions {
                mutations_enabled: !read_only,
                ..SchemaOptions::default()
            };
            let schema = build_schema(
                Arc::new(compile_biomedical()?),
                Arc::new(InMemoryBackend::new()),
                &options,
            )?;
            println!("{}", schema.sdl());
            Ok(())
        }
        Command::Check => {
            let schema = compile_biomedical()?;
            println!(
                "ok: {} node kinds, {} edge kinds, {} property sets",
                schema.node_kinds().len(),
                schema.edge_kinds().len(),
                schema.property_sets().len()
            );
            Ok(())
        }
    }
}

/// JSON logs for the server, plain stderr output for one-shot commands.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn run_server(config: ServiceConfig) -> anyhow::Result<()> {
    // Schema errors are fatal before anything connects.
    let compiled = Arc::new(compile_biomedical()?);
    tracing::info!(
        node_kinds = compiled.node_kinds().len(),
        edge_kinds = compiled.edge_kinds().len(),
        "Schema compiled"
    );

    let graph = GraphClient::connect(&GraphConfig::from(&config.neo4j)).await?;

    let schema = build_schema(compiled, Arc::new(graph), &SchemaOptions::from(&config))?;
    let state = AppState::new(schema, &config);
    serve(state, &config.listen_addr()).await?;
    Ok(())
}
