/// Core Framework Module
///
/// - descriptor.rs: tool and parameter descriptors, argument validation
/// - registry.rs: tool registry and the validate-then-execute contract
/// - context.rs: shared resources handed to every handler
/// - error.rs: invocation error taxonomy
/// - config.rs: environment-driven server configuration
/// - server.rs: MCP JSON-RPC transports (HTTP and STDIO)

pub mod config;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod server;
