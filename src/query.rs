//! Simplified query compilation.
//!
//! Turns a list of field filters plus paging, projection and sort options into
//! a Mango query document for `_find`.

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value as JsonValue};

use crate::error::{McpError, Result};
use crate::store::{DatabaseHandle, DocumentStore, FindResponse};

/// A single field filter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterClause {
    /// Field name (dotted paths allowed)
    pub field: String,
    /// Value to compare against
    pub value: JsonValue,
    /// Operator tag, `==` when absent
    #[serde(default)]
    pub operator: Option<String>,
}

impl FilterClause {
    /// Equality filter.
    pub fn new(field: impl Into<String>, value: JsonValue) -> Self {
        Self {
            field: field.into(),
            value,
            operator: None,
        }
    }

    /// Filter with an explicit operator tag.
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending
    #[default]
    Asc,
    /// Descending
    Desc,
}

/// A single sort key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SortClause {
    /// Field name
    pub field: String,
    /// Direction, ascending when absent or null
    #[serde(default, deserialize_with = "null_as_default")]
    pub order: SortOrder,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl SortClause {
    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    /// Descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

/// Serializes as Mango's single-key `{field: "asc"}` form.
impl Serialize for SortClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.order)?;
        map.end()
    }
}

/// Inputs of the `queryDocuments` tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRequest {
    /// Field filters
    pub filters: Vec<FilterClause>,
    /// Maximum number of documents
    pub limit: Option<u64>,
    /// Number of documents to skip
    pub skip: Option<u64>,
    /// Projection
    pub fields: Option<Vec<String>>,
    /// Sort keys in precedence order
    pub sort: Option<Vec<SortClause>>,
    /// Replace each document with its `_id`
    pub return_ids_only: bool,
}

/// A Mango query document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    selector: Map<String, JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skip: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<Vec<SortClause>>,
}

impl CompiledQuery {
    /// The selector document.
    pub fn selector(&self) -> &Map<String, JsonValue> {
        &self.selector
    }

    /// Render as the JSON body for `_find`.
    pub fn to_json(&self) -> JsonValue {
        json!(self)
    }
}

type SelectorBuilder = fn(JsonValue) -> JsonValue;

/// Operator tag to selector builder. Unlisted tags compile to equality.
static OPERATORS: &[(&str, SelectorBuilder)] = &[
    ("==", literal),
    ("!=", not_equal),
    (">", greater_than),
    ("<", less_than),
    (">=", greater_or_equal),
    ("<=", less_or_equal),
    ("in", member_of),
    ("nin", not_member_of),
    ("exists", exists),
    ("type", type_of),
    ("regex", regex),
];

/// Supported operator tags, in table order.
pub fn operator_tags() -> impl Iterator<Item = &'static str> {
    OPERATORS.iter().map(|(tag, _)| *tag)
}

fn literal(value: JsonValue) -> JsonValue {
    value
}

fn not_equal(value: JsonValue) -> JsonValue {
    json!({ "$ne": value })
}

fn greater_than(value: JsonValue) -> JsonValue {
    json!({ "$gt": value })
}

fn less_than(value: JsonValue) -> JsonValue {
    json!({ "$lt": value })
}

fn greater_or_equal(value: JsonValue) -> JsonValue {
    json!({ "$gte": value })
}

fn less_or_equal(value: JsonValue) -> JsonValue {
    json!({ "$lte": value })
}

fn member_of(value: JsonValue) -> JsonValue {
    json!({ "$in": as_array(value) })
}

fn not_member_of(value: JsonValue) -> JsonValue {
    json!({ "$nin": as_array(value) })
}

fn exists(value: JsonValue) -> JsonValue {
    json!({ "$exists": value })
}

fn type_of(value: JsonValue) -> JsonValue {
    json!({ "$type": value })
}

fn regex(value: JsonValue) -> JsonValue {
    json!({ "$regex": value })
}

fn as_array(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Array(_) => value,
        scalar => JsonValue::Array(vec![scalar]),
    }
}

fn selector_entry(operator: Option<&str>, value: JsonValue) -> JsonValue {
    let tag = operator.unwrap_or("==");
    let build = OPERATORS
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, build)| *build)
        .unwrap_or(literal);
    build(value)
}

/// Compile a request into a Mango query.
///
/// Later filters on the same field replace earlier ones.
pub fn compile(request: &QueryRequest) -> CompiledQuery {
    let mut selector = Map::new();
    for filter in &request.filters {
        let entry = selector_entry(filter.operator.as_deref(), filter.value.clone());
        selector.insert(filter.field.clone(), entry);
    }

    CompiledQuery {
        selector,
        limit: request.limit,
        skip: request.skip,
        fields: request.fields.clone().filter(|f| !f.is_empty()),
        sort: request.sort.clone().filter(|s| !s.is_empty()),
    }
}

/// `_find` result reduced to document IDs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdsOnlyResult {
    /// `_id` of each document, in result order
    pub docs: Vec<JsonValue>,
    /// Pagination bookmark
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<String>,
    /// Index warning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<FindResponse> for IdsOnlyResult {
    fn from(response: FindResponse) -> Self {
        let docs = response
            .docs
            .into_iter()
            .map(|doc| doc.get("_id").cloned().unwrap_or(JsonValue::Null))
            .collect();
        Self {
            docs,
            bookmark: response.bookmark,
            warning: response.warning,
        }
    }
}

/// Compile `request`, run it against `db` and shape the result.
pub async fn execute(
    store: &dyn DocumentStore,
    db: &DatabaseHandle,
    request: &QueryRequest,
) -> Result<JsonValue> {
    let query = compile(request);
    tracing::debug!(db = db.name(), query = %query.to_json(), "Running compiled query");

    let response = store
        .find(db, &query.to_json())
        .await
        .map_err(McpError::into_operational)?;
    if request.return_ids_only {
        Ok(json!(IdsOnlyResult::from(response)))
    } else {
        Ok(json!(response))
    }
}
