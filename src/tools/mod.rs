//! Tool registry and category definitions.
//!
//! Every tool declares its arguments as a list of [`ArgSpec`]s. The same list
//! renders the advertised JSON Schema and validates incoming calls, so the two
//! never drift apart.

pub mod database;
pub mod document;
pub mod mango;

use serde::Serialize;
use serde_json::{json, Map, Value as JsonValue};
use tracing::{debug, warn};

use crate::convert::as_count;
use crate::error::{McpError, Result};
use crate::query::operator_tags;
use crate::session::McpSession;

/// Argument type constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Non-empty string
    String,
    /// Non-negative integer
    Count,
    /// Boolean
    Boolean,
    /// JSON object
    Object,
    /// Array of strings
    StringArray,
    /// Array of `{field, value, operator?}` filter objects
    FilterArray,
    /// Array of `{field, order?}` sort objects
    SortArray,
}

impl ArgKind {
    /// JSON Schema fragment for this kind.
    pub fn schema(self) -> JsonValue {
        match self {
            ArgKind::String => json!({ "type": "string" }),
            ArgKind::Count => json!({ "type": "integer", "minimum": 0 }),
            ArgKind::Boolean => json!({ "type": "boolean" }),
            ArgKind::Object => json!({ "type": "object" }),
            ArgKind::StringArray => json!({ "type": "array", "items": { "type": "string" } }),
            ArgKind::FilterArray => {
                let operators: Vec<&str> = operator_tags().collect();
                json!({
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "field": { "type": "string", "description": "Field name to filter by" },
                            "value": { "description": "Value to compare against" },
                            "operator": {
                                "type": "string",
                                "enum": operators,
                                "default": "=="
                            }
                        },
                        "required": ["field", "value"]
                    }
                })
            }
            ArgKind::SortArray => json!({
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "field": { "type": "string", "description": "Field name to sort by" },
                        "order": { "type": "string", "enum": ["asc", "desc"], "default": "asc" }
                    },
                    "required": ["field"]
                }
            }),
        }
    }

    fn check(self, name: &str, value: &JsonValue) -> Result<()> {
        match self {
            ArgKind::String => match value.as_str() {
                Some(s) if !s.is_empty() => Ok(()),
                _ => Err(McpError::invalid_arg(name, "must be a non-empty string")),
            },
            ArgKind::Count if as_count(value).is_some() => Ok(()),
            ArgKind::Count => Err(McpError::invalid_arg(name, "must be a non-negative integer")),
            ArgKind::Boolean if value.is_boolean() => Ok(()),
            ArgKind::Boolean => Err(McpError::invalid_arg(name, "must be a boolean")),
            ArgKind::Object if value.is_object() => Ok(()),
            ArgKind::Object => Err(McpError::invalid_arg(name, "must be an object")),
            ArgKind::StringArray => {
                let items = as_array(name, value)?;
                if items.iter().all(JsonValue::is_string) {
                    Ok(())
                } else {
                    Err(McpError::invalid_arg(name, "must be an array of strings"))
                }
            }
            ArgKind::FilterArray => {
                for item in as_array(name, value)? {
                    check_item_field(name, item)?;
                    if item.get("value").is_none() {
                        return Err(McpError::invalid_arg(name, "each filter needs a 'value'"));
                    }
                    if item.get("operator").is_some_and(|op| !op.is_string()) {
                        return Err(McpError::invalid_arg(name, "'operator' must be a string"));
                    }
                }
                Ok(())
            }
            ArgKind::SortArray => {
                for item in as_array(name, value)? {
                    check_item_field(name, item)?;
                    match item.get("order") {
                        None | Some(JsonValue::Null) => {}
                        Some(order) if order == "asc" || order == "desc" => {}
                        Some(_) => {
                            return Err(McpError::invalid_arg(
                                name,
                                "'order' must be \"asc\" or \"desc\"",
                            ))
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

fn as_array<'a>(name: &str, value: &'a JsonValue) -> Result<&'a Vec<JsonValue>> {
    value
        .as_array()
        .ok_or_else(|| McpError::invalid_arg(name, "must be an array"))
}

fn check_item_field(name: &str, item: &JsonValue) -> Result<()> {
    match item.get("field").and_then(JsonValue::as_str) {
        Some(field) if !field.is_empty() => Ok(()),
        _ => Err(McpError::invalid_arg(
            name,
            "each item must be an object with a non-empty 'field' string",
        )),
    }
}

/// Declared argument of a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgSpec {
    /// Argument name
    pub name: &'static str,
    /// Type constraint
    pub kind: ArgKind,
    /// Whether the argument must be present
    pub required: bool,
    /// Human-readable description
    pub description: &'static str,
    /// Advertised default
    pub default: Option<JsonValue>,
}

impl ArgSpec {
    /// A required argument.
    pub fn required(name: &'static str, kind: ArgKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
            default: None,
        }
    }

    /// An optional argument.
    pub fn optional(name: &'static str, kind: ArgKind, description: &'static str) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }

    /// Set the advertised default.
    pub fn with_default(mut self, default: JsonValue) -> Self {
        self.default = Some(default);
        self
    }

    fn schema(&self) -> JsonValue {
        let mut schema = self.kind.schema();
        if let JsonValue::Object(obj) = &mut schema {
            obj.insert("description".to_string(), json!(self.description));
            if let Some(default) = &self.default {
                obj.insert("default".to_string(), default.clone());
            }
        }
        schema
    }

    /// Check this argument in `args`. Null counts as absent.
    pub fn validate(&self, args: &Map<String, JsonValue>) -> Result<()> {
        match args.get(self.name) {
            None | Some(JsonValue::Null) if self.required => {
                Err(McpError::MissingArg(self.name.to_string()))
            }
            None | Some(JsonValue::Null) => Ok(()),
            Some(value) => self.kind.check(self.name, value),
        }
    }
}

/// Helper macro for declaring tool arguments.
#[macro_export]
macro_rules! args {
    () => {
        Vec::<$crate::tools::ArgSpec>::new()
    };

    (required: { $($req_name:literal : $req_kind:ident => $req_desc:literal),* $(,)? } $(,)?) => {
        vec![$($crate::tools::ArgSpec::required($req_name, $crate::args!(@kind $req_kind), $req_desc)),*]
    };

    (
        required: { $($req_name:literal : $req_kind:ident => $req_desc:literal),* $(,)? },
        optional: { $($opt_name:literal : $opt_kind:ident $(= $opt_default:expr)? => $opt_desc:literal),* $(,)? } $(,)?
    ) => {{
        let mut specs = vec![$($crate::tools::ArgSpec::required($req_name, $crate::args!(@kind $req_kind), $req_desc)),*];
        $(specs.push(
            $crate::tools::ArgSpec::optional($opt_name, $crate::args!(@kind $opt_kind), $opt_desc)
                $(.with_default(serde_json::json!($opt_default)))?
        );)*
        specs
    }};

    (@kind string) => { $crate::tools::ArgKind::String };
    (@kind count) => { $crate::tools::ArgKind::Count };
    (@kind boolean) => { $crate::tools::ArgKind::Boolean };
    (@kind object) => { $crate::tools::ArgKind::Object };
    (@kind array_string) => { $crate::tools::ArgKind::StringArray };
    (@kind filters) => { $crate::tools::ArgKind::FilterArray };
    (@kind sort) => { $crate::tools::ArgKind::SortArray };
}

/// Tool grouping. Decides capability gating and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCategory {
    /// Database lifecycle
    Database,
    /// Single-document reads and writes
    Document,
    /// Mango indexes and queries (CouchDB 3.x+)
    Mango,
}

impl ToolCategory {
    /// Whether tools in this category need the minimum capability tier.
    pub fn is_gated(self) -> bool {
        matches!(self, ToolCategory::Mango)
    }
}

/// A tool definition for the MCP tools/list response.
#[derive(Debug, Clone)]
pub struct ToolDef {
    /// Tool name (e.g., "createDatabase")
    pub name: String,
    /// Tool description
    pub description: String,
    /// Category
    pub category: ToolCategory,
    /// Declared arguments
    pub args: Vec<ArgSpec>,
}

impl ToolDef {
    /// Create a new tool definition.
    pub fn new(name: &str, description: &str, category: ToolCategory, args: Vec<ArgSpec>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            category,
            args,
        }
    }

    /// Whether this tool is capability-gated.
    pub fn is_gated(&self) -> bool {
        self.category.is_gated()
    }

    /// JSON Schema for the input parameters.
    pub fn input_schema(&self) -> JsonValue {
        let properties: Map<String, JsonValue> = self
            .args
            .iter()
            .map(|spec| (spec.name.to_string(), spec.schema()))
            .collect();
        let required: Vec<&str> = self
            .args
            .iter()
            .filter(|spec| spec.required)
            .map(|spec| spec.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }

    /// Validate call arguments against the declared arguments.
    pub fn validate(&self, args: &Map<String, JsonValue>) -> Result<()> {
        self.args.iter().try_for_each(|spec| spec.validate(args))
    }
}

/// A text content block of a tool response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    /// Always "text"
    #[serde(rename = "type")]
    pub kind: String,
    /// Payload
    pub text: String,
}

/// Envelope returned for every tool call that reached its handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResponse {
    /// Content blocks
    pub content: Vec<TextContent>,
    /// Set when the backend call failed
    #[serde(rename = "isError", skip_serializing_if = "is_false")]
    pub is_error: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ToolResponse {
    /// Successful response carrying `text`.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent {
                kind: "text".to_string(),
                text: text.into(),
            }],
            is_error: false,
        }
    }

    /// Operational failure carrying `text`.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(text)
        }
    }

    /// Text of the first content block.
    pub fn first_text(&self) -> &str {
        self.content.first().map_or("", |c| c.text.as_str())
    }
}

/// Registry of all available tools.
pub struct ToolRegistry {
    tools: Vec<ToolDef>,
}

impl ToolRegistry {
    /// Create a new registry with all tools registered.
    pub fn new() -> Self {
        let mut tools = Vec::new();

        tools.extend(database::tools());
        tools.extend(document::tools());
        tools.extend(mango::tools());

        Self { tools }
    }

    /// All tool definitions, base and gated.
    pub fn tools(&self) -> &[ToolDef] {
        &self.tools
    }

    /// Look up a tool by exact name.
    pub fn get(&self, name: &str) -> Option<&ToolDef> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Tools advertised regardless of server version.
    pub fn base_tools(&self) -> impl Iterator<Item = &ToolDef> {
        self.tools.iter().filter(|t| !t.is_gated())
    }

    /// Tools that need the minimum capability tier.
    pub fn gated_tools(&self) -> impl Iterator<Item = &ToolDef> {
        self.tools.iter().filter(|t| t.is_gated())
    }

    /// Whether `name` is a gated tool.
    pub fn is_gated(&self, name: &str) -> bool {
        self.gated_tools().any(|t| t.name == name)
    }

    /// Tools available on the session's server.
    ///
    /// Falls back to the base set when the server version cannot be
    /// determined.
    pub async fn list_tools(&self, session: &mut McpSession) -> Vec<&ToolDef> {
        let mut tools: Vec<&ToolDef> = self.base_tools().collect();
        if session.gated_tools_available().await {
            tools.extend(self.gated_tools());
        }
        tools
    }

    /// Gate, validate and dispatch a tool call.
    ///
    /// Protocol faults are returned as `Err`. Failures from the store are
    /// reported in an `isError` response.
    pub async fn call(
        &self,
        session: &mut McpSession,
        name: &str,
        args: Map<String, JsonValue>,
    ) -> Result<ToolResponse> {
        if self.is_gated(name) {
            session.require_gated(name).await?;
        }

        let tool = self
            .get(name)
            .ok_or_else(|| McpError::UnknownTool(name.to_string()))?;
        tool.validate(&args)?;

        debug!(tool = name, "Dispatching tool call");
        let store = session.store();
        let outcome = match tool.category {
            ToolCategory::Database => database::dispatch(store, name, &args).await,
            ToolCategory::Document => document::dispatch(store, name, &args).await,
            ToolCategory::Mango => mango::dispatch(store, name, &args).await,
        };

        match outcome {
            Ok(text) => Ok(ToolResponse::text(text)),
            Err(err) if err.is_protocol_fault() => Err(err),
            Err(err) => {
                warn!(tool = name, error = %err, "Tool call failed");
                Ok(ToolResponse::error(format!("Error: {}", err)))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
