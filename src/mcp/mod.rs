//! Model Context Protocol (MCP) server implementation.
//!
//! This module exposes PDF spread rendering and contrast auditing as MCP
//! tools. The server communicates over stdio transport using JSON-RPC 2.0
//! messages, one per line.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         MCP Server                          │
//! │                                                             │
//! │   ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    │
//! │   │  Transport  │───▶│   Server    │───▶│   Tools     │    │
//! │   │   (stdio)   │    │ (dispatch)  │    │  (handlers) │    │
//! │   └─────────────┘    └─────────────┘    └─────────────┘    │
//! │                                           │         │       │
//! │                                           ▼         ▼       │
//! │                                      ┌────────┐ ┌────────┐  │
//! │                                      │ spread │ │contrast│  │
//! │                                      └────────┘ └────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use protocol::{ErrorResponse, Message, Request, Response, MCP_PROTOCOL_VERSION};
pub use server::{McpServer, ToolCallResult, ToolContent};
pub use transport::{LineTransport, StdioTransport};
