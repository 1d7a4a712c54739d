use std::net::SocketAddr;

use anyhow::Result;
use bookly::application::{ServerConfig, serve};
use bookly::infrastructure::catalog::GOOGLE_BOOKS_URL;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(author, version, about = "Book recommendation API server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve(ServeCommand),
}

#[derive(Debug, Args)]
struct ServeCommand {
    #[arg(long, env = "BOOKLY_DATABASE_URL", default_value = "sqlite://bookly.db")]
    database_url: String,

    #[arg(long, env = "BOOKLY_BIND_ADDRESS", default_value = "127.0.0.1:5000")]
    bind_address: SocketAddr,

    /// Secret used to sign and verify access tokens
    #[arg(long, env = "BOOKLY_JWT_SECRET")]
    jwt_secret: String,

    /// Access token lifetime in hours
    #[arg(long, env = "BOOKLY_TOKEN_TTL_HOURS", default_value_t = 168)]
    token_ttl_hours: i64,

    #[arg(long, env = "BOOKLY_CATALOG_URL", default_value = GOOGLE_BOOKS_URL)]
    catalog_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before clap parses env vars)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(cmd) => run_server(cmd).await,
    }
}

async fn run_server(command: ServeCommand) -> Result<()> {
    let config = ServerConfig {
        bind_address: command.bind_address,
        database_url: command.database_url,
        jwt_secret: command.jwt_secret,
        token_ttl_hours: command.token_ttl_hours,
        catalog_url: command.catalog_url,
    };

    serve(config).await
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if logging cannot be initialized
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }
}
