/// MCP Server Entry Point
///
/// Reads configuration from the environment (see `core::config`), sets up
/// logging on stderr, builds the tool registry once and serves it over the
/// selected transport: STDIO, HTTP, or both concurrently.

use mcp_example_tools::core::config::{LogFormat, ServerConfig, TransportMode};
use mcp_example_tools::core::server;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        // stdout carries the STDIO protocol stream
        .with_writer(std::io::stderr)
        .with_target(true);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(config.log_format);

    let registry = match server::initialize_tools(config.tool_context()) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!(error = %e, "failed to register tools");
            std::process::exit(1);
        }
    };

    match config.transport {
        TransportMode::Stdio => server::run_server_stdio(&config, registry).await,
        TransportMode::Http => server::run_server_http(&config, registry).await,
        TransportMode::Both => {
            // STDIO for local inspectors in the background, HTTP in the foreground
            let stdio_config = config.clone();
            let stdio_registry = registry.clone();
            let stdio_handle = tokio::spawn(async move {
                if let Err(e) = server::run_server_stdio(&stdio_config, stdio_registry).await {
                    tracing::error!(error = %e, "STDIO server error");
                }
            });

            let http_result = server::run_server_http(&config, registry).await;

            // If HTTP server exits, abort STDIO task
            stdio_handle.abort();

            http_result
        }
    }
}
