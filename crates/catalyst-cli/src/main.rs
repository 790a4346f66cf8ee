use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "catalyst", version, about = "Catalyst query guardrail")]
struct Cli {
    /// Configuration file. Defaults apply when it does not exist.
    #[arg(short, long, global = true, default_value = "catalyst.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server exposing get_query_context and validate_sql.
    Serve {
        /// Transport type (stdio or http). Overrides config file.
        #[arg(long)]
        transport: Option<String>,

        /// HTTP port (only for http transport). Overrides config file and MCP_PORT.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the schema context for a question as JSON.
    Context {
        /// The natural-language question.
        #[arg(default_value = "")]
        query: String,
    },

    /// Validate a SQL statement. Exits with status 1 when it is rejected.
    Validate {
        /// The SQL statement.
        sql: String,
    },

    /// Print the MCP tool definitions.
    Tools,

    /// Introspect Postgres and write a schema snapshot for the `file` source.
    Snapshot {
        /// Output path for the YAML snapshot.
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = commands::load_config(&cli.config)?;
    init_tracing(loaded.config.observability.log_level.as_deref());
    if !loaded.found {
        tracing::warn!(config = %cli.config.display(), "Config file not found, using defaults");
    }
    let config = loaded.config;

    match cli.cmd {
        Command::Serve { transport, port } => commands::serve::run(config, transport, port).await?,
        Command::Context { query } => commands::inspect::context(&config, &query).await?,
        Command::Validate { sql } => {
            if !commands::inspect::validate(&config, &sql).await? {
                std::process::exit(1);
            }
        }
        Command::Tools => commands::inspect::tools()?,
        Command::Snapshot { output } => commands::snapshot::run(&config, &output).await?,
    }

    Ok(())
}

/// Logs go to stderr; stdout carries protocol frames and command output.
fn init_tracing(log_level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or("info")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
