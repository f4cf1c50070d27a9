// src/cache/types.rs

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::sheet::Table;

/// The document the front-end reads: run timestamps plus one table per fetched sheet.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CacheDocument {
    pub timestamp: String,
    pub last_updated: String,
    pub data: BTreeMap<String, Table>,
}

impl CacheDocument {
    /// Both timestamps are the same instant, RFC 3339 in UTC with milliseconds.
    pub fn new(data: BTreeMap<String, Table>, at: DateTime<Utc>) -> Self {
        let stamp = at.to_rfc3339_opts(SecondsFormat::Millis, true);
        Self {
            timestamp: stamp.clone(),
            last_updated: stamp,
            data,
        }
    }
}
