//! pdf-spread-mcp: MCP server for PDF spread rendering and WCAG contrast audits
//!
//! This library exposes two capabilities to AI assistants as MCP tools:
//!
//! - **Spreads**: two PDF pages rasterised and composed side by side on one
//!   bordered PNG canvas, like a printed book opened flat
//! - **Contrast audits**: every text span measured against the colour behind
//!   it, classified against the WCAG AA/AAA thresholds, and aggregated into a
//!   per-page report of failures
//!
//! PDF decoding and rasterisation are delegated to PDFium.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`contrast`]: Contrast analysis and WCAG reports
//! - [`error`]: Configuration error types
//! - [`mcp`]: MCP protocol implementation
//! - [`pdf`]: PDF library seam, colours and domain errors
//! - [`spread`]: Spread compositing

pub mod config;
pub mod contrast;
pub mod error;
pub mod mcp;
pub mod pdf;
pub mod spread;
