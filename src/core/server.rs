/// MCP Server Implementation
///
/// This module adapts the tool registry to the Model Context Protocol:
/// - JSON-RPC 2.0 request/response structures
/// - Method routing shared by both transports (`dispatch`)
/// - HTTP server setup with Actix Web
/// - STDIO server implementation for line-based communication
///
/// No tool logic lives here; `tools/list` and `tools/call` map directly onto
/// `ToolRegistry::list` and `ToolRegistry::invoke_request`.

use actix_web::{
    web, App, HttpServer, HttpResponse, Result,
    middleware::{Compress, Logger, DefaultHeaders},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::core::config::ServerConfig;
use crate::core::context::ToolContext;
use crate::core::error::{ErrorKind, ToolError};
use crate::core::registry::{InvocationRequest, InvocationResult, ToolRegistry};
use crate::tools;

const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

/// Server metadata reported in `initialize` responses.
#[derive(Clone)]
pub struct AppState {
    /// Server name as reported in MCP initialize responses
    pub server_name: String,
    /// Server version string as reported in MCP initialize responses
    pub server_version: String,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            server_name: config.name.clone(),
            server_version: config.version.clone(),
        }
    }
}

/// JSON-RPC 2.0 request structure for MCP protocol.
///
/// `id` is None for notifications, which never receive a response.
#[derive(Deserialize, Debug)]
pub struct MCPRequest {
    /// JSON-RPC version identifier, must be "2.0"
    #[allow(dead_code)]
    jsonrpc: String,
    /// Request ID for correlating responses
    id: Option<Value>,
    /// MCP method name (e.g., "initialize", "tools/list", "tools/call")
    method: String,
    /// Method-specific parameters
    params: Option<Value>,
}

/// JSON-RPC 2.0 response structure; exactly one of `result` and `error` is set.
#[derive(Serialize, Debug)]
pub struct MCPResponse {
    jsonrpc: String,
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<MCPError>,
}

/// JSON-RPC 2.0 error structure.
#[derive(Serialize, Debug)]
pub struct MCPError {
    /// JSON-RPC error code (e.g., -32601 for method not found)
    code: i32,
    /// Human-readable error message
    message: String,
    /// Optional additional error data
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl MCPResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(MCPError {
                code,
                message,
                data: None,
            }),
        }
    }
}

/// Build the registry with every built-in tool registered.
pub fn initialize_tools(context: ToolContext) -> Result<Arc<ToolRegistry>, ToolError> {
    let mut registry = ToolRegistry::new(context);
    tools::register_all(&mut registry)?;
    tracing::info!(count = registry.len(), "registered tools");
    Ok(Arc::new(registry))
}

/// Tool listing in MCP wire form (`inputSchema` in camelCase).
fn tools_json(registry: &ToolRegistry) -> Vec<Value> {
    registry
        .list()
        .into_iter()
        .map(|tool| {
            serde_json::json!({
                "name": tool.name,
                "description": tool.description,
                "inputSchema": tool.input_schema()
            })
        })
        .collect()
}

/// Route one JSON-RPC request to its MCP method.
pub fn dispatch(state: &AppState, registry: &ToolRegistry, req: MCPRequest) -> MCPResponse {
    match req.method.as_str() {
        "initialize" => MCPResponse::success(
            req.id,
            serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": state.server_name,
                    "version": state.server_version
                }
            }),
        ),
        "tools/list" => MCPResponse::success(req.id, serde_json::json!({ "tools": tools_json(registry) })),
        "tools/call" => handle_tools_call(registry, req.id, req.params),
        _ => MCPResponse::failure(req.id, METHOD_NOT_FOUND, format!("Method not found: {}", req.method)),
    }
}

fn handle_tools_call(registry: &ToolRegistry, id: Option<Value>, params: Option<Value>) -> MCPResponse {
    let request: InvocationRequest = match params.map(serde_json::from_value::<InvocationRequest>) {
        Some(Ok(request)) => request,
        Some(Err(e)) => return MCPResponse::failure(id, INVALID_PARAMS, format!("Invalid params: {}", e)),
        None => return MCPResponse::failure(id, INVALID_PARAMS, "Invalid params".to_string()),
    };

    match registry.invoke_request(&request) {
        InvocationResult::Success { value } => {
            // Strings go out verbatim rather than JSON-quoted
            let text = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            MCPResponse::success(
                id,
                serde_json::json!({
                    "content": [{ "type": "text", "text": text }],
                    "isError": false
                }),
            )
        }
        InvocationResult::Failure { kind: ErrorKind::UnknownTool, .. } => MCPResponse::failure(
            id,
            METHOD_NOT_FOUND,
            format!("Unknown tool: {}", request.tool_name),
        ),
        InvocationResult::Failure { kind, message } => MCPResponse::success(
            id,
            serde_json::json!({
                "content": [{ "type": "text", "text": format!("Error: {}", message) }],
                "isError": true,
                "errorKind": kind
            }),
        ),
    }
}

/// Parse one JSON-RPC message.
///
/// On failure the `-32700` response carries the request id when it can still
/// be recovered from the text, and `null` otherwise.
pub fn parse_request(text: &str) -> std::result::Result<MCPRequest, MCPResponse> {
    serde_json::from_str::<MCPRequest>(text).map_err(|e| {
        tracing::warn!(error = %e, "parse error");
        let id = serde_json::from_str::<Value>(text)
            .ok()
            .and_then(|partial| partial.get("id").cloned());
        MCPResponse::failure(id, PARSE_ERROR, format!("Parse error: {}", e))
    })
}

/// Process one line of STDIO input, returning the serialized response if one is due.
///
/// Blank lines and notifications get no reply, and neither does a parse
/// error whose id cannot be recovered.
pub fn handle_line(state: &AppState, registry: &ToolRegistry, line: &str) -> Option<String> {
    if line.trim().is_empty() {
        return None;
    }

    let response = match parse_request(line) {
        Ok(req) if req.id.is_none() => {
            tracing::debug!(method = %req.method, "notification received");
            return None;
        }
        Ok(req) => dispatch(state, registry, req),
        Err(error_response) if error_response.id.is_none() => return None,
        Err(error_response) => error_response,
    };

    match serde_json::to_string(&response) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!(error = %e, "error serializing response");
            None
        }
    }
}

/// Serve JSON-RPC lines from `reader`, writing one response line per request.
pub async fn serve_lines<R, W>(
    state: &AppState,
    registry: &ToolRegistry,
    reader: R,
    mut writer: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(response) = handle_line(state, registry, &line) {
            writer.write_all(response.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            // Flush per response so clients never wait on a full buffer
            writer.flush().await?;
        }
    }
    Ok(())
}

/// Health check endpoint handler.
async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "mcp-example-tools"
    })))
}

/// MCP JSON-RPC request handler for HTTP mode.
///
/// The raw body goes through the same parsing as STDIO input, so malformed
/// requests get a JSON-RPC parse error rather than a bare 400. Notifications
/// are acknowledged with `202 Accepted` and no body.
///
/// # Arguments
/// * `state` - Server metadata for `initialize`
/// * `registry` - Tool registry serving `tools/list` and `tools/call`
/// * `counter` - Request counter reported by `/metrics`
/// * `body` - Raw JSON-RPC request text
async fn mcp_handler(
    state: web::Data<AppState>,
    registry: web::Data<ToolRegistry>,
    counter: web::Data<AtomicU64>,
    body: String,
) -> Result<HttpResponse> {
    counter.fetch_add(1, Ordering::Relaxed);

    let response = match parse_request(&body) {
        Ok(req) if req.id.is_none() => {
            tracing::debug!(method = %req.method, "notification received");
            return Ok(HttpResponse::Accepted().finish());
        }
        Ok(req) => dispatch(&state, &registry, req),
        Err(error_response) => error_response,
    };
    Ok(HttpResponse::Ok().json(response))
}

/// Total number of MCP requests processed since start.
async fn metrics_handler(counter: web::Data<AtomicU64>) -> Result<HttpResponse> {
    let count = counter.load(Ordering::Relaxed);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "requests_total": count,
        "status": "ok"
    })))
}

/// Server-Sent Events endpoint for tools discovery.
///
/// Emits the tool listing as a single SSE event.
async fn sse_tools_discovery(registry: web::Data<ToolRegistry>) -> Result<HttpResponse> {
    use actix_web::http::header;

    let tools = tools_json(&registry);
    let tools_data = serde_json::json!({
        "count": tools.len(),
        "tools": tools
    });
    let sse_data = format!("data: {}\n\n", tools_data);

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(header::CacheControl(vec![
            header::CacheDirective::NoCache,
            header::CacheDirective::NoStore,
            header::CacheDirective::MustRevalidate,
        ]))
        // Disable nginx buffering
        .insert_header(("x-accel-buffering", "no"))
        .body(sse_data))
}

/// Register the HTTP routes.
///
/// Expects `AppState`, `ToolRegistry` and the `AtomicU64` request counter to
/// be present as app data.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics_handler))
        .route("/sse", web::get().to(sse_tools_discovery))
        .route("/mcp", web::post().to(mcp_handler))
        .route("/", web::post().to(mcp_handler))
        .route("/", web::get().to(health));
}

/// Run the MCP server in HTTP mode.
///
/// # Arguments
/// * `config` - Server configuration (bind address, workers, metadata)
/// * `registry` - Tool registry shared with every worker
pub async fn run_server_http(config: &ServerConfig, registry: Arc<ToolRegistry>) -> std::io::Result<()> {
    use std::time::Duration;

    let bind_addr = config.bind_addr();
    let workers = config.workers;
    let app_state = web::Data::new(AppState::from_config(config));
    let tool_registry = web::Data::from(registry);
    let request_count = web::Data::new(AtomicU64::new(0));

    tracing::info!(
        name = %config.name,
        version = %config.version,
        bind = %bind_addr,
        workers,
        "MCP server starting (HTTP mode)"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(tool_registry.clone())
            .app_data(request_count.clone())
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
            )
            // %r = request line, %s = status, %Dms = duration in milliseconds
            .wrap(Logger::new("%r %s %Dms"))
            .configure(configure_routes)
    })
    .workers(workers)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .client_disconnect_timeout(Duration::from_secs(2))
    .shutdown_timeout(10)
    .bind(&bind_addr)?
    .run()
    .await
}

/// Run the MCP server in STDIO mode.
///
/// Requests are read line by line from stdin and answered on stdout; all
/// logging goes to stderr so the protocol stream stays clean.
pub async fn run_server_stdio(config: &ServerConfig, registry: Arc<ToolRegistry>) -> std::io::Result<()> {
    use tokio::io::{BufReader, BufWriter};

    tracing::info!(
        name = %config.name,
        version = %config.version,
        "MCP server starting (STDIO mode)"
    );

    let state = AppState::from_config(config);
    let stdin = BufReader::with_capacity(8192, tokio::io::stdin());
    let stdout = BufWriter::with_capacity(8192, tokio::io::stdout());
    serve_lines(&state, &registry, stdin, stdout).await
}
