//! JSON-RPC 2.0 framing for the MCP stdio transport.
//!
//! Every input line is classified as a [`Message`]: a request when it
//! carries an `id`, otherwise a notification. Lines that are not valid JSON,
//! or not a valid JSON-RPC envelope, are turned straight into an
//! [`ErrorResponse`] ready to be written back.
//!
//! MCP forbids `null` request IDs, so an `id` must be a string or an integer.
//! Error replies to lines whose `id` cannot be recovered carry `"id": null`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The MCP protocol version this server speaks.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported during initialisation.
pub const SERVER_NAME: &str = "pdf-spread-mcp";

const JSONRPC_VERSION: &str = "2.0";

/// A request identifier: string or integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Integer ID.
    Number(i64),
    /// String ID.
    String(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl RequestId {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Number),
            Value::String(s) => Some(Self::String(s.clone())),
            _ => None,
        }
    }
}

/// A request that expects exactly one reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Echoed in the reply.
    pub id: RequestId,
    /// Method name, e.g. `tools/call`.
    pub method: String,
    /// Method parameters, if any.
    pub params: Option<Value>,
}

/// A one-way message; never answered.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Method name, e.g. `notifications/initialized`.
    pub method: String,
    /// Parameters, if any.
    pub params: Option<Value>,
}

/// A well-formed incoming message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Has an `id`.
    Request(Request),
    /// Has no `id`.
    Notification(Notification),
}

impl Message {
    /// Parses one line of input.
    ///
    /// # Errors
    ///
    /// Returns a parse error (`-32700`) for malformed JSON or a non-object
    /// value, and an invalid-request error (`-32600`) for an object that is
    /// not a JSON-RPC 2.0 request or notification. The error carries the
    /// line's `id` whenever it is a valid string or integer.
    pub fn parse(line: &str) -> Result<Self, ErrorResponse> {
        let value: Value =
            serde_json::from_str(line).map_err(|_| ErrorResponse::parse_error(None))?;
        let Value::Object(mut fields) = value else {
            return Err(ErrorResponse::parse_error(None));
        };

        let raw_id = fields.remove("id");
        let id = raw_id.as_ref().and_then(RequestId::from_value);
        let invalid = || ErrorResponse::invalid_request(id.clone());

        if fields.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
            return Err(invalid());
        }
        let method = take_method(&mut fields).ok_or_else(invalid)?;
        let params = fields.remove("params");

        match (raw_id, &id) {
            (None, _) => Ok(Self::Notification(Notification { method, params })),
            (Some(_), Some(id)) => Ok(Self::Request(Request {
                id: id.clone(),
                method,
                params,
            })),
            (Some(_), None) => Err(invalid()),
        }
    }

    /// The method name.
    #[must_use]
    pub fn method(&self) -> &str {
        match self {
            Self::Request(req) => &req.method,
            Self::Notification(notif) => &notif.method,
        }
    }

    /// The request ID, for requests.
    #[must_use]
    pub const fn id(&self) -> Option<&RequestId> {
        match self {
            Self::Request(req) => Some(&req.id),
            Self::Notification(_) => None,
        }
    }
}

fn take_method(fields: &mut Map<String, Value>) -> Option<String> {
    match fields.remove("method") {
        Some(Value::String(method)) if !method.is_empty() => Some(method),
        _ => None,
    }
}

/// A successful reply.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    /// Always "2.0".
    pub jsonrpc: &'static str,
    /// ID of the request being answered.
    pub id: RequestId,
    /// Method result.
    pub result: Value,
}

impl Response {
    /// Wraps a method result.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Value is not const-compatible
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }
}

/// Standard JSON-RPC 2.0 error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    /// Invalid JSON.
    ParseError = -32700,
    /// Valid JSON but not a request object.
    InvalidRequest = -32600,
    /// Unknown method.
    MethodNotFound = -32601,
    /// Bad method parameters.
    InvalidParams = -32602,
    /// Failure inside the server.
    InternalError = -32603,
}

impl ErrorCode {
    /// Numeric value sent on the wire.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    const fn label(self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
        }
    }
}

/// The `error` member of an error reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorObject {
    /// One of the [`ErrorCode`] values.
    pub code: i32,
    /// Human-readable description.
    pub message: String,
}

/// An error reply.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Always "2.0".
    pub jsonrpc: &'static str,
    /// ID of the offending request; serialised as `null` when unknown.
    pub id: Option<RequestId>,
    /// Error details.
    pub error: ErrorObject,
}

impl ErrorResponse {
    /// Creates an error reply with an explicit message.
    #[must_use]
    pub fn new(id: Option<RequestId>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            error: ErrorObject {
                code: code.code(),
                message: message.into(),
            },
        }
    }

    /// `-32700`: the line was not a JSON object.
    #[must_use]
    pub fn parse_error(id: Option<RequestId>) -> Self {
        Self::new(id, ErrorCode::ParseError, ErrorCode::ParseError.label())
    }

    /// `-32600`: the object was not a valid envelope.
    #[must_use]
    pub fn invalid_request(id: Option<RequestId>) -> Self {
        Self::new(
            id,
            ErrorCode::InvalidRequest,
            ErrorCode::InvalidRequest.label(),
        )
    }

    /// `-32601`.
    #[must_use]
    pub fn method_not_found(id: RequestId, method: &str) -> Self {
        Self::new(
            Some(id),
            ErrorCode::MethodNotFound,
            format!("{}: {method}", ErrorCode::MethodNotFound.label()),
        )
    }

    /// `-32602`.
    #[must_use]
    pub fn invalid_params(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(Some(id), ErrorCode::InvalidParams, message)
    }

    /// `-32603`.
    #[must_use]
    pub fn internal_error(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(Some(id), ErrorCode::InternalError, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_with_params() {
        let msg = Message::parse(
            r#"{"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {"name": "x"}}"#,
        )
        .unwrap();

        let Message::Request(req) = msg else {
            panic!("Expected Request, got Notification");
        };
        assert_eq!(req.id, RequestId::Number(1));
        assert_eq!(req.method, "tools/call");
        assert_eq!(req.params, Some(json!({"name": "x"})));
    }

    #[test]
    fn notification_has_no_id() {
        let msg =
            Message::parse(r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#).unwrap();
        assert!(msg.id().is_none());
        assert_eq!(msg.method(), "notifications/initialized");
    }

    #[test]
    fn string_ids_are_kept() {
        let msg = Message::parse(r#"{"jsonrpc": "2.0", "id": "abc-123", "method": "ping"}"#)
            .unwrap();
        assert_eq!(msg.id(), Some(&RequestId::String("abc-123".to_string())));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = Message::parse("not valid json").unwrap_err();
        assert_eq!(err.error.code, -32700);
        assert!(err.id.is_none());

        let err = Message::parse("[1, 2]").unwrap_err();
        assert_eq!(err.error.code, -32700);
    }

    #[test]
    fn bad_envelope_recovers_id() {
        let err = Message::parse(r#"{"id": 7, "method": "ping"}"#).unwrap_err();
        assert_eq!(err.error.code, -32600);
        assert_eq!(err.id, Some(RequestId::Number(7)));

        let err = Message::parse(r#"{"jsonrpc": "1.0", "id": "a", "method": "ping"}"#).unwrap_err();
        assert_eq!(err.id, Some(RequestId::String("a".to_string())));

        let err = Message::parse(r#"{"jsonrpc": "2.0", "id": 3, "method": ""}"#).unwrap_err();
        assert_eq!(err.error.code, -32600);
    }

    #[test]
    fn null_id_is_rejected() {
        let err = Message::parse(r#"{"jsonrpc": "2.0", "id": null, "method": "ping"}"#)
            .unwrap_err();
        assert_eq!(err.error.code, -32600);
        assert!(err.id.is_none());
    }

    #[test]
    fn unknown_id_serialises_as_null() {
        let json = serde_json::to_value(ErrorResponse::parse_error(None)).unwrap();
        assert_eq!(
            json,
            json!({"jsonrpc": "2.0", "id": null, "error": {"code": -32700, "message": "Parse error"}})
        );
    }

    #[test]
    fn success_response_shape() {
        let response = Response::success(RequestId::Number(1), json!({"ok": true}));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"jsonrpc": "2.0", "id": 1, "result": {"ok": true}})
        );
    }

    #[test]
    fn method_not_found_names_method() {
        let error = ErrorResponse::method_not_found(RequestId::Number(1), "unknown/method");
        assert_eq!(error.error.code, -32601);
        assert_eq!(error.error.message, "Method not found: unknown/method");
    }

    #[test]
    fn request_id_display() {
        assert_eq!(RequestId::Number(42).to_string(), "42");
        assert_eq!(RequestId::String("abc".to_string()).to_string(), "abc");
    }
}
