//! MCP server for CouchDB.
//!
//! Run with `couchdb-mcp --url http://localhost:5984` or set `COUCHDB_URL`.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use couchdb_mcp::{CouchClient, CouchConfig, McpServer, McpSession, DEFAULT_URL};
use tracing_subscriber::EnvFilter;

/// MCP server for CouchDB.
///
/// Exposes CouchDB operations as MCP tools for AI agents.
/// Communicates via JSON-RPC 2.0 over stdin/stdout.
#[derive(Parser)]
#[command(name = "couchdb-mcp")]
#[command(version, about, long_about = None)]
struct Args {
    /// CouchDB server URL.
    #[arg(long, env = "COUCHDB_URL", default_value = DEFAULT_URL, value_name = "URL")]
    url: String,

    /// HTTP request timeout in seconds.
    #[arg(long, env = "COUCHDB_TIMEOUT_SECS", default_value_t = 30, value_name = "SECS")]
    timeout_secs: u64,

    /// Enable debug logging to stderr.
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    // Set up logging
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("couchdb_mcp=debug")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let config = CouchConfig::new(&args.url).with_timeout(Duration::from_secs(args.timeout_secs));
    let client = match CouchClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: Invalid CouchDB configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(url = %args.url, "Starting couchdb-mcp");

    // Create session and server
    let session = McpSession::new(Arc::new(client));
    let mut server = McpServer::new(session);

    // Run the server
    if let Err(e) = server.run().await {
        eprintln!("Error: Server error: {}", e);
        std::process::exit(1);
    }
}
