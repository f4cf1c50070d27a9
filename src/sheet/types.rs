// src/sheet/types.rs

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A single cell as written to the cache.
///
/// An empty `Text` marks an absent value.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(Number),
    Text(String),
}

impl CellValue {
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }
}

impl From<Value> for CellValue {
    /// Nulls become the empty marker; arrays and objects are kept as their JSON text.
    fn from(v: Value) -> Self {
        match v {
            Value::Null => CellValue::empty(),
            Value::Bool(b) => CellValue::Bool(b),
            Value::Number(n) => CellValue::Number(n),
            Value::String(s) => CellValue::Text(s),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_owned())
    }
}

/// A normalized sheet: header labels, rows of cells, and the weighted-column mask.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub weighted_columns: Vec<bool>,
}

/// Where a sheet lives inside the spreadsheet.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Locator {
    /// Numeric tab id, sent as `gid=`.
    Gid(String),
    /// Tab name, sent as `sheet=`.
    Sheet(String),
}

impl Locator {
    /// Query parameter pair for the export endpoint.
    pub fn query_pair(&self) -> (&'static str, &str) {
        match self {
            Locator::Gid(gid) => ("gid", gid),
            Locator::Sheet(name) => ("sheet", name),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (key, value) = self.query_pair();
        write!(f, "{}={}", key, value)
    }
}

/// One entry of the sheet catalog.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Hash)]
pub struct SheetSpec {
    pub name: String,
    #[serde(flatten)]
    pub locator: Locator,
}

impl SheetSpec {
    pub fn gid(name: &str, gid: &str) -> Self {
        Self {
            name: name.to_owned(),
            locator: Locator::Gid(gid.to_owned()),
        }
    }

    pub fn named(name: &str, sheet: &str) -> Self {
        Self {
            name: name.to_owned(),
            locator: Locator::Sheet(sheet.to_owned()),
        }
    }
}
