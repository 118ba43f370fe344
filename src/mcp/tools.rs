//! Tool catalog advertised through `tools/list`.
//!
//! The catalog is built once when the server is constructed. Schema defaults
//! reflect the configured border width and quality.

use serde::Serialize;
use serde_json::{json, Value};

use crate::config::DefaultsConfig;
use crate::spread::MAX_BORDER_WIDTH;

/// Tool names understood by the server.
pub mod names {
    /// Inline spread image.
    pub const VIEW_SPREAD: &str = "view_spread";
    /// Spread written to disk.
    pub const SAVE_SPREAD: &str = "save_spread";
    /// Per-region contrast analysis.
    pub const ANALYZE_CONTRAST: &str = "analyze_contrast";
    /// Document-wide WCAG report.
    pub const GET_WCAG_REPORT: &str = "get_wcag_report";
    /// Legacy alias of [`VIEW_SPREAD`].
    pub const GET_SPREAD: &str = "get_spread";
}

/// A tool definition for tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

impl ToolDefinition {
    fn new(name: &str, description: &str, input_schema: Value) -> Self {
        Self {
            name: name.to_string(),
            description: Some(description.to_string()),
            input_schema,
        }
    }
}

fn pdf_path_property() -> Value {
    json!({
        "type": "string",
        "description": "Path to the PDF file (can use ~ for home directory)"
    })
}

fn page_property(description: &str) -> Value {
    json!({
        "type": "integer",
        "minimum": 1,
        "description": description
    })
}

fn quality_property(default: u32) -> Value {
    json!({
        "type": "integer",
        "minimum": 1,
        "maximum": 100,
        "default": default,
        "description": format!(
            "Rendering quality 1-100; DPI = 2 x quality (default: {default})"
        )
    })
}

fn spread_schema(defaults: &DefaultsConfig, with_output: bool) -> Value {
    let mut properties = json!({
        "pdf_path": pdf_path_property(),
        "left_page": page_property("Left page number (1-based index)"),
        "right_page": page_property("Right page number (1-based index)"),
        "border_width": {
            "type": "integer",
            "minimum": 0,
            "maximum": MAX_BORDER_WIDTH,
            "default": defaults.border_width,
            "description": format!(
                "Width of black border in pixels (default: {})",
                defaults.border_width
            )
        },
        "quality": quality_property(defaults.quality),
    });
    let mut required = vec!["pdf_path", "left_page", "right_page"];

    if with_output {
        properties["output_path"] = json!({
            "type": "string",
            "description": "Where to write the PNG; parent directories are created"
        });
        required.push("output_path");
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

/// Builds the tool catalog.
#[must_use]
pub fn tool_definitions(defaults: &DefaultsConfig) -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            names::VIEW_SPREAD,
            "Convert two consecutive PDF pages into a single side-by-side image with black \
             borders. Returns the PNG inline.",
            spread_schema(defaults, false),
        ),
        ToolDefinition::new(
            names::SAVE_SPREAD,
            "Render two consecutive PDF pages as a side-by-side PNG and write it to disk.",
            spread_schema(defaults, true),
        ),
        ToolDefinition::new(
            names::ANALYZE_CONTRAST,
            "Measure the WCAG contrast ratio of every text span on a range of pages, \
             comparing each span's colour with the dominant colour behind it.",
            json!({
                "type": "object",
                "properties": {
                    "pdf_path": pdf_path_property(),
                    "left_page": page_property("First page to analyse (1-based index)"),
                    "right_page": page_property("Last page to analyse (1-based index)"),
                    "quality": quality_property(defaults.quality),
                },
                "required": ["pdf_path", "left_page", "right_page"]
            }),
        ),
        ToolDefinition::new(
            names::GET_WCAG_REPORT,
            "Scan a PDF two pages at a time and report every text region failing at least \
             one WCAG contrast threshold, grouped by page.",
            json!({
                "type": "object",
                "properties": {
                    "pdf_path": pdf_path_property(),
                    "start_page": {
                        "type": "integer",
                        "minimum": 1,
                        "default": 1,
                        "description": "Page to start scanning from (default: 1)"
                    },
                    "quality": quality_property(defaults.quality),
                },
                "required": ["pdf_path"]
            }),
        ),
        ToolDefinition::new(
            names::GET_SPREAD,
            "Deprecated alias of view_spread.",
            spread_schema(defaults, false),
        ),
    ]
}
