//! MCP server implementation for PDF spread rendering and contrast auditing.
//!
//! The server reads one JSON-RPC message per line, handles it to completion,
//! and writes at most one response line before reading the next message.
//! Requests are answered in the order they arrive; notifications are never
//! answered.
//!
//! Tool failures never escape a handler: they are reported to the client as
//! `{"error": "..."}` results.

use std::io;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, error, info, warn};

use crate::config::DefaultsConfig;
use crate::contrast::{analyze, build_report, summarize};
use crate::mcp::protocol::{
    ErrorResponse, Message, Notification, Request, Response, MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use crate::mcp::tools::{names, tool_definitions, ToolDefinition};
use crate::mcp::transport::{LineTransport, StdioTransport};
use crate::pdf::{PdfBackend, PdfError, PdfResult};
use crate::spread::{render_spread, save_spread, SpreadRequest};

/// Sent if a reply cannot be serialised.
const FALLBACK_INTERNAL_ERROR: &str =
    r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"Internal error"}}"#;

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    pub tools: ToolCapabilities,
}

/// Tool-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCapabilities {}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    #[serde(default)]
    pub protocol_version: Option<String>,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
    /// Base64-encoded image.
    Image {
        /// Base64 payload.
        data: String,
        /// MIME type of the decoded payload.
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ToolCallResult {
    /// The tool succeeded.
    Content {
        /// Content returned by the tool.
        content: Vec<ToolContent>,
    },
    /// The tool failed.
    Error {
        /// What went wrong.
        error: String,
    },
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Content {
            content: vec![ToolContent::Text { text: text.into() }],
        }
    }

    /// Creates an error result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}

impl From<PdfError> for ToolCallResult {
    fn from(err: PdfError) -> Self {
        Self::error(err.report())
    }
}

/// A reply line: either a result or an error.
#[derive(Serialize)]
#[serde(untagged)]
enum Reply {
    Success(Response),
    Failure(ErrorResponse),
}

/// The MCP server.
pub struct McpServer {
    /// PDF library used by every tool.
    backend: Box<dyn PdfBackend>,
    /// Defaults for omitted tool parameters.
    defaults: DefaultsConfig,
    /// Catalog returned by tools/list.
    tools: Vec<ToolDefinition>,
}

impl McpServer {
    /// Creates a new MCP server.
    #[must_use]
    pub fn new(backend: Box<dyn PdfBackend>, defaults: DefaultsConfig) -> Self {
        Self {
            backend,
            defaults,
            tools: tool_definitions(&defaults),
        }
    }

    /// Returns the advertised tool catalog.
    #[must_use]
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Serves stdin/stdout until end of input or a shutdown signal.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails or signal handlers cannot be
    /// installed.
    pub async fn run(&self) -> io::Result<()> {
        let mut transport = StdioTransport::stdio();
        tokio::select! {
            result = self.serve(&mut transport) => result,
            signal = shutdown_signal() => {
                let signal = signal?;
                info!(signal, "Received shutdown signal, stopping");
                Ok(())
            }
        }
    }

    /// Answers every line read from `transport` until end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing fails.
    pub async fn serve<R, W>(&self, transport: &mut LineTransport<R, W>) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        while let Some(line) = transport.read_line().await? {
            let reply = match line {
                Ok(text) => self.handle_line(&text),
                Err(e) => {
                    warn!(error = %e, "Rejected line that is not UTF-8");
                    Some(encode_reply(&Reply::Failure(ErrorResponse::parse_error(None))))
                }
            };
            if let Some(reply) = reply {
                transport.write_line(&reply).await?;
            }
        }
        info!("Input closed");
        Ok(())
    }

    /// Handles one input line and returns the serialised reply, if any.
    ///
    /// Blank lines and notifications produce no reply.
    #[must_use]
    pub fn handle_line(&self, line: &str) -> Option<String> {
        if line.trim().is_empty() {
            return None;
        }

        let reply = match Message::parse(line) {
            Ok(Message::Request(req)) => match self.handle_request(&req) {
                Ok(response) => Reply::Success(response),
                Err(error) => Reply::Failure(error),
            },
            Ok(Message::Notification(notif)) => {
                Self::handle_notification(&notif);
                return None;
            }
            Err(error) => {
                warn!(code = error.error.code, "Rejected malformed message");
                Reply::Failure(error)
            }
        };

        Some(encode_reply(&reply))
    }

    /// Handles an incoming request.
    fn handle_request(&self, req: &Request) -> Result<Response, ErrorResponse> {
        debug!(id = %req.id, method = %req.method, "Handling request");
        match req.method.as_str() {
            "initialize" => Ok(Self::handle_initialize(req)),
            "tools/list" => Ok(self.handle_tools_list(req)),
            "tools/call" => self.handle_tools_call(req),
            "ping" => Ok(Response::success(req.id.clone(), json!({}))),
            _ => Err(ErrorResponse::method_not_found(req.id.clone(), &req.method)),
        }
    }

    /// Handles an incoming notification.
    fn handle_notification(notif: &Notification) {
        if notif.method == "notifications/initialized" {
            info!("Client initialised");
        } else {
            debug!(method = %notif.method, "Ignoring notification");
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(req: &Request) -> Response {
        let params: InitializeParams = req
            .params
            .as_ref()
            .and_then(|p| serde_json::from_value(p.clone()).ok())
            .unwrap_or_default();

        if let Some(client) = &params.client_info {
            info!(
                client = %client.name,
                client_version = client.version.as_deref().unwrap_or("unknown"),
                requested_version = params.protocol_version.as_deref().unwrap_or("unspecified"),
                "Initialize request"
            );
        }

        let result = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": ServerCapabilities {
                tools: ToolCapabilities::default(),
            },
            "serverInfo": ServerInfo::default(),
        });

        Response::success(req.id.clone(), result)
    }

    /// Handles the tools/list request.
    fn handle_tools_list(&self, req: &Request) -> Response {
        Response::success(req.id.clone(), json!({ "tools": self.tools }))
    }

    /// Handles the tools/call request.
    fn handle_tools_call(&self, req: &Request) -> Result<Response, ErrorResponse> {
        let params: ToolCallParams = req
            .params
            .as_ref()
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
            .map_err(|e| {
                ErrorResponse::invalid_params(
                    req.id.clone(),
                    format!("Invalid tool call params: {e}"),
                )
            })?
            .ok_or_else(|| {
                ErrorResponse::invalid_params(req.id.clone(), "Missing tool call params")
            })?;

        let result = self.call_tool(&params.name, &params.arguments);

        let result_value = serde_json::to_value(&result).map_err(|e| {
            error!(error = %e, "Failed to serialise tool call result");
            ErrorResponse::internal_error(
                req.id.clone(),
                "Internal error: failed to serialise result",
            )
        })?;

        Ok(Response::success(req.id.clone(), result_value))
    }

    /// Routes a tool call by name.
    #[must_use]
    pub fn call_tool(&self, name: &str, arguments: &Value) -> ToolCallResult {
        info!(tool = name, "Tool call");
        let outcome = match name {
            names::VIEW_SPREAD | names::GET_SPREAD => self.call_view_spread(arguments),
            names::SAVE_SPREAD => self.call_save_spread(arguments),
            names::ANALYZE_CONTRAST => self.call_analyze_contrast(arguments),
            names::GET_WCAG_REPORT => self.call_get_wcag_report(arguments),
            _ => return ToolCallResult::error(format!("Unknown tool: {name}")),
        };

        outcome.unwrap_or_else(|e| {
            warn!(tool = name, error = %e.report(), "Tool call failed");
            e.into()
        })
    }

    // ==================== Spread Tools ====================

    fn spread_request(&self, arguments: &Value) -> PdfResult<SpreadRequest> {
        Ok(SpreadRequest {
            pdf_path: required_str(arguments, "pdf_path")?.to_string(),
            left_page: required_u32(arguments, "left_page")?,
            right_page: required_u32(arguments, "right_page")?,
            border_width: optional_u32(arguments, "border_width", self.defaults.border_width)?,
            quality: optional_u32(arguments, "quality", self.defaults.quality)?,
        })
    }

    /// Renders a spread and returns it inline.
    fn call_view_spread(&self, arguments: &Value) -> PdfResult<ToolCallResult> {
        let request = self.spread_request(arguments)?;
        let png = render_spread(self.backend.as_ref(), &request)?;

        Ok(ToolCallResult::Content {
            content: vec![
                ToolContent::Image {
                    data: BASE64_STANDARD.encode(&png),
                    mime_type: "image/png".to_string(),
                },
                ToolContent::Text {
                    text: format!(
                        "Double-page spread: pages {}-{}",
                        request.left_page, request.right_page
                    ),
                },
            ],
        })
    }

    /// Renders a spread and writes it to disk.
    fn call_save_spread(&self, arguments: &Value) -> PdfResult<ToolCallResult> {
        let request = self.spread_request(arguments)?;
        let output_path = required_str(arguments, "output_path")?;
        let (path, bytes) = save_spread(self.backend.as_ref(), &request, output_path)?;

        Ok(ToolCallResult::text(format!(
            "Saved double-page spread (pages {}-{}) to {} ({bytes} bytes)",
            request.left_page,
            request.right_page,
            path.display()
        )))
    }

    // ==================== Contrast Tools ====================

    /// Analyses text contrast on a page range.
    fn call_analyze_contrast(&self, arguments: &Value) -> PdfResult<ToolCallResult> {
        let pdf_path = required_str(arguments, "pdf_path")?;
        let left_page = required_u32(arguments, "left_page")?;
        let right_page = required_u32(arguments, "right_page")?;
        let quality = optional_u32(arguments, "quality", self.defaults.quality)?;

        let analyses = analyze(self.backend.as_ref(), pdf_path, left_page, right_page, quality)?;
        let detail = json!({
            "pdf_path": pdf_path,
            "left_page": left_page,
            "right_page": right_page,
            "pages": analyses,
        });

        Ok(ToolCallResult::Content {
            content: vec![
                ToolContent::Text {
                    text: summarize(&analyses),
                },
                ToolContent::Text {
                    text: to_pretty_json(&detail)?,
                },
            ],
        })
    }

    /// Builds a document-wide WCAG report.
    fn call_get_wcag_report(&self, arguments: &Value) -> PdfResult<ToolCallResult> {
        let pdf_path = required_str(arguments, "pdf_path")?;
        let start_page = optional_u32(arguments, "start_page", 1)?;
        let quality = optional_u32(arguments, "quality", self.defaults.quality)?;

        let report = build_report(self.backend.as_ref(), pdf_path, start_page, quality)?;
        Ok(ToolCallResult::text(to_pretty_json(&report)?))
    }
}

fn encode_reply(reply: &Reply) -> String {
    serde_json::to_string(reply).unwrap_or_else(|e| {
        error!(error = %e, "Failed to serialise reply");
        FALLBACK_INTERNAL_ERROR.to_string()
    })
}

#[cfg(unix)]
async fn shutdown_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => Ok("SIGINT"),
        _ = sigterm.recv() => Ok("SIGTERM"),
    }
}

#[cfg(windows)]
async fn shutdown_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}

// ==================== Argument Helpers ====================

fn required_str<'a>(arguments: &'a Value, name: &str) -> PdfResult<&'a str> {
    match arguments.get(name) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(Value::String(_)) => Err(PdfError::validation(name, "must not be empty")),
        Some(_) => Err(PdfError::validation(name, "must be a string")),
        None => Err(missing(name)),
    }
}

fn required_u32(arguments: &Value, name: &str) -> PdfResult<u32> {
    match arguments.get(name) {
        None | Some(Value::Null) => Err(missing(name)),
        Some(value) => as_u32(value, name),
    }
}

fn optional_u32(arguments: &Value, name: &str, default: u32) -> PdfResult<u32> {
    match arguments.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => as_u32(value, name),
    }
}

fn as_u32(value: &Value, name: &str) -> PdfResult<u32> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| PdfError::validation(name, "must be a non-negative integer"))
}

fn missing(name: &str) -> PdfError {
    PdfError::validation(name, "missing required parameter")
}

fn to_pretty_json<T: Serialize>(value: &T) -> PdfResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| PdfError::library(format!("failed to serialise result: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_call_result_text() {
        let result = ToolCallResult::text("Hello, world!");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            json!({"content": [{"type": "text", "text": "Hello, world!"}]})
        );
    }

    #[test]
    fn tool_call_result_error() {
        let json = serde_json::to_value(ToolCallResult::error("Something went wrong")).unwrap();
        assert_eq!(json, json!({"error": "Something went wrong"}));
    }

    #[test]
    fn image_content_uses_mime_type_key() {
        let content = ToolContent::Image {
            data: "AAAA".to_string(),
            mime_type: "image/png".to_string(),
        };
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(
            json,
            json!({"type": "image", "data": "AAAA", "mimeType": "image/png"})
        );
    }

    #[test]
    fn argument_helpers() {
        let args = json!({"pdf_path": "a.pdf", "left_page": 3, "quality": -1, "empty": ""});
        assert_eq!(required_str(&args, "pdf_path").unwrap(), "a.pdf");
        assert!(required_str(&args, "empty").is_err());
        assert!(required_str(&args, "left_page").is_err());
        assert_eq!(required_u32(&args, "left_page").unwrap(), 3);
        assert!(required_u32(&args, "right_page")
            .unwrap_err()
            .to_string()
            .contains("missing required parameter"));
        assert!(optional_u32(&args, "quality", 50).is_err());
        assert_eq!(optional_u32(&args, "border_width", 2).unwrap(), 2);
    }
}
