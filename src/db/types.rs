//! Statement result types for Airgraph.
//!
//! Defines the structures used to represent what the graph database sends
//! back for a statement: column names, a lazy stream of records, and the
//! mutation counters.

use futures::stream::{self, BoxStream, StreamExt};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// Lazy, single-pass sequence of records for one statement.
pub type RecordStream = BoxStream<'static, Result<Record>>;

/// Everything the server returned for one submitted statement.
pub struct StatementResult {
    /// Column names in the order the statement returns them.
    pub columns: Vec<String>,

    /// Records, pulled on demand.
    pub records: RecordStream,

    /// Mutation counters for the statement.
    pub counters: Counters,
}

impl StatementResult {
    /// Creates a result from its parts.
    pub fn new(columns: Vec<String>, records: RecordStream, counters: Counters) -> Self {
        Self {
            columns,
            records,
            counters,
        }
    }

    /// Creates a result from already-materialized rows.
    ///
    /// Every row is keyed by `columns`; rows shorter than the column list
    /// simply have no value for the trailing columns.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>, counters: Counters) -> Self {
        let keys: Arc<[String]> = columns.clone().into();
        let records = rows
            .into_iter()
            .map(move |values| Ok(Record::new(Arc::clone(&keys), values)));

        Self::new(columns, stream::iter(records).boxed(), counters)
    }

    /// Creates a result with no columns and no records.
    pub fn empty(counters: Counters) -> Self {
        Self::new(Vec::new(), stream::empty().boxed(), counters)
    }

    /// Drains every record and returns the mutation counters.
    ///
    /// Forces the statement to run to completion; an error surfaced while
    /// draining is returned instead of the counters.
    pub async fn consume(mut self) -> Result<Counters> {
        while let Some(record) = self.records.next().await {
            record?;
        }
        Ok(self.counters)
    }

    /// Splits the result into its column list and record stream.
    pub fn into_parts(self) -> (Vec<String>, RecordStream) {
        (self.columns, self.records)
    }
}

impl fmt::Debug for StatementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementResult")
            .field("columns", &self.columns)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

/// One row of a statement result, keyed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    keys: Arc<[String]>,
    values: Vec<Value>,
}

impl Record {
    /// Creates a record from shared column keys and positional values.
    pub fn new(keys: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { keys, values }
    }

    /// Returns the value for the given column, if present.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.keys
            .iter()
            .position(|key| key == column)
            .and_then(|idx| self.values.get(idx))
    }

    /// Column names of this record.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Values of this record in column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// Mutation counters reported by the server for one statement.
///
/// Field names follow the Neo4j `stats` object so the struct can be
/// deserialized from a response directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Counters {
    pub contains_updates: bool,
    pub nodes_created: u64,
    pub nodes_deleted: u64,
    pub properties_set: u64,
    pub relationships_created: u64,
    #[serde(alias = "relationship_deleted")]
    pub relationships_deleted: u64,
    pub labels_added: u64,
    pub labels_removed: u64,
    pub indexes_added: u64,
    pub indexes_removed: u64,
    pub constraints_added: u64,
    pub constraints_removed: u64,
    pub contains_system_updates: bool,
    pub system_updates: u64,
}

impl Counters {
    /// Returns the non-zero counters as `(name, count)` pairs.
    pub fn non_zero(&self) -> Vec<(&'static str, u64)> {
        [
            ("nodes_created", self.nodes_created),
            ("nodes_deleted", self.nodes_deleted),
            ("properties_set", self.properties_set),
            ("relationships_created", self.relationships_created),
            ("relationships_deleted", self.relationships_deleted),
            ("labels_added", self.labels_added),
            ("labels_removed", self.labels_removed),
            ("indexes_added", self.indexes_added),
            ("indexes_removed", self.indexes_removed),
            ("constraints_added", self.constraints_added),
            ("constraints_removed", self.constraints_removed),
            ("system_updates", self.system_updates),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect()
    }

    /// Returns true if the statement changed anything.
    pub fn has_changes(&self) -> bool {
        self.contains_updates || self.contains_system_updates || !self.non_zero().is_empty()
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.non_zero();
        if entries.is_empty() {
            return write!(f, "no changes");
        }

        let parts: Vec<String> = entries
            .into_iter()
            .map(|(name, count)| format!("{name}: {count}"))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// A graph node as returned in a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    /// Server-assigned element id, when the server reports one.
    pub id: Option<String>,
    pub properties: BTreeMap<String, Value>,
}

/// A graph relationship as returned in a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relationship {
    /// Server-assigned element id, when the server reports one.
    pub id: Option<String>,
    pub properties: BTreeMap<String, Value>,
}

/// Represents a single value from a graph query.
///
/// Values carry no declared schema; the same column may hold different
/// variants from one record to the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer (up to i64).
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Text/string value.
    String(String),

    /// Ordered list of values.
    List(Vec<Value>),

    /// String-keyed map of values.
    Map(BTreeMap<String, Value>),

    /// Graph node.
    Node(Node),

    /// Graph relationship.
    Relationship(Relationship),

    /// Path: alternating nodes and relationships, starting with a node.
    Path(Vec<Value>),

    /// A value of a shape the decoder does not recognize, kept as raw text.
    Other(String),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts the value to its display form. Total over every variant.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format!("{f:?}"),
            Value::String(s) => s.clone(),
            Value::List(items) => format!("[{}]", join_values(items)),
            Value::Map(map) => format_properties(map),
            Value::Node(node) => format_element('(', ')', node.id.as_deref(), &node.properties),
            Value::Relationship(rel) => {
                format_element('[', ']', rel.id.as_deref(), &rel.properties)
            }
            Value::Path(elements) => elements
                .iter()
                .map(Value::to_display_string)
                .collect::<Vec<_>>()
                .join("-"),
            Value::Other(raw) => raw.clone(),
        }
    }
}

fn join_values(items: &[Value]) -> String {
    items
        .iter()
        .map(Value::to_display_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_properties(map: &BTreeMap<String, Value>) -> String {
    let entries: Vec<String> = map
        .iter()
        .map(|(k, v)| format!("{k}: {}", v.to_display_string()))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

fn format_element(
    open: char,
    close: char,
    id: Option<&str>,
    properties: &BTreeMap<String, Value>,
) -> String {
    let mut out = String::new();
    out.push(open);
    if let Some(id) = id {
        out.push_str(id);
    }
    if !properties.is_empty() {
        if id.is_some() {
            out.push(':');
        }
        out.push_str(&format_properties(properties));
    }
    out.push(close);
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

// Conversion implementations for common types
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Other(n.to_string())
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}
