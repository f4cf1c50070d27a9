// src/sheet/extract.rs

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, trace, warn};

use super::envelope::strip_envelope;
use super::types::{CellValue, Table};
use crate::error::SheetError;

/// Marker looked for in the first row of the weighting sheet.
const WEIGHTED_MARKER: &str = "weighted";

#[derive(Debug, Deserialize)]
struct GvizResponse {
    #[serde(default)]
    table: Option<GvizTable>,
}

#[derive(Debug, Deserialize)]
struct GvizTable {
    #[serde(default)]
    cols: Option<Vec<GvizCol>>,
    #[serde(default)]
    rows: Option<Vec<GvizRow>>,
}

#[derive(Debug, Deserialize)]
struct GvizCol {
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GvizRow {
    #[serde(default)]
    c: Option<Vec<Option<GvizCell>>>,
}

#[derive(Debug, Deserialize)]
struct GvizCell {
    #[serde(default)]
    v: Option<Value>,
}

/// Parse a raw gviz export payload into a `Table`.
///
/// `is_weighting` selects the weighting-sheet mask rule; `sheet` only feeds
/// error messages and logs.
#[instrument(level = "debug", skip(text), fields(content_len = text.len()))]
pub fn extract_table(text: &str, sheet: &str, is_weighting: bool) -> Result<Table, SheetError> {
    let json_text = strip_envelope(text).map_err(|e| {
        warn!(sheet, error = %e, "envelope not found");
        SheetError::MalformedResponse {
            sheet: sheet.to_owned(),
            reason: e.to_string(),
        }
    })?;

    let doc: Value =
        serde_json::from_str(json_text).map_err(|e| SheetError::MalformedResponse {
            sheet: sheet.to_owned(),
            reason: e.to_string(),
        })?;

    // valid JSON of the wrong shape counts as missing table data
    let parsed: GvizResponse = serde_json::from_value(doc).map_err(|e| {
        debug!(sheet, error = %e, "unexpected document shape");
        SheetError::MissingTableData(sheet.to_owned())
    })?;

    let (cols, rows) = match parsed.table {
        Some(GvizTable {
            cols,
            rows: Some(rows),
        }) => (cols.unwrap_or_default(), rows),
        _ => return Err(SheetError::MissingTableData(sheet.to_owned())),
    };

    let headers: Vec<String> = cols
        .into_iter()
        .map(|col| col.label.unwrap_or_default())
        .collect();
    trace!(headers = ?headers, "parsed headers");

    let rows: Vec<Vec<CellValue>> = rows
        .into_iter()
        .map(|row| {
            row.c
                .unwrap_or_default()
                .into_iter()
                .map(|cell| {
                    cell.and_then(|c| c.v)
                        .map(CellValue::from)
                        .unwrap_or_else(CellValue::empty)
                })
                .collect()
        })
        .collect();

    let weighted_columns = if is_weighting {
        weighted_mask(&rows, headers.len())
    } else {
        vec![false; headers.len()]
    };

    debug!(
        columns = headers.len(),
        rows = rows.len(),
        weighted = weighted_columns.iter().filter(|w| **w).count(),
        "extracted table"
    );
    Ok(Table {
        headers,
        rows,
        weighted_columns,
    })
}

/// Derive the mask from the first data row of the weighting sheet.
///
/// One entry per header; a header with no cell under it is `false`.
/// With no rows the mask is empty rather than all-false.
pub fn weighted_mask(rows: &[Vec<CellValue>], columns: usize) -> Vec<bool> {
    match rows.first() {
        Some(first) => (0..columns)
            .map(|i| {
                first
                    .get(i)
                    .and_then(CellValue::as_str)
                    .map(|s| s.to_lowercase().contains(WEIGHTED_MARKER))
                    .unwrap_or(false)
            })
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Number;

    fn wrap(json: &str) -> String {
        format!(
            "/*O_o*/\ngoogle.visualization.Query.setResponse({});",
            json
        )
    }

    #[test]
    fn test_missing_delimiters_are_malformed() {
        for raw in ["{\"table\":{\"rows\":[]}}", "setResponse(", "", "no json here"] {
            let err = extract_table(raw, "overview", false).unwrap_err();
            assert!(
                matches!(err, SheetError::MalformedResponse { ref sheet, .. } if sheet == "overview"),
                "{:?} -> {:?}",
                raw,
                err
            );
        }
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = extract_table("cb({\"table\": {rows: }})", "yearly", false).unwrap_err();
        assert!(matches!(err, SheetError::MalformedResponse { .. }));
        assert_eq!(err.kind(), "malformed_response");
    }

    #[test]
    fn test_missing_table_or_rows() {
        for json in [
            r#"{"status":"error","errors":[{"reason":"access_denied"}]}"#,
            r#"{"table":{"cols":[{"label":"A"}]}}"#,
            r#"{"table":{"rows":null}}"#,
            r#"{"table":{"rows":5}}"#,
        ] {
            let err = extract_table(&wrap(json), "regional", false).unwrap_err();
            assert!(
                matches!(err, SheetError::MissingTableData(ref s) if s == "regional"),
                "{} -> {:?}",
                json,
                err
            );
            assert_eq!(err.to_string(), "no data found in regional");
        }
    }

    #[test]
    fn test_headers_follow_declared_columns() {
        let json = r#"{"table":{
            "cols":[{"id":"A","label":"Company","type":"string"},{"id":"B","type":"number"},{"label":null}],
            "rows":[]
        }}"#;
        let table = extract_table(&wrap(json), "overview", false).unwrap();
        assert_eq!(table.headers, vec!["Company", "", ""]);
        assert!(table.rows.is_empty());
        assert_eq!(table.weighted_columns, vec![false, false, false]);
    }

    #[test]
    fn test_no_cols_gives_empty_headers() {
        let json = r#"{"table":{"rows":[{"c":[{"v":"x"}]}]}}"#;
        let table = extract_table(&wrap(json), "overview", false).unwrap();
        assert!(table.headers.is_empty());
        assert!(table.weighted_columns.is_empty());
        assert_eq!(table.rows, vec![vec![CellValue::from("x")]]);
    }

    #[test]
    fn test_rows_keep_heterogeneous_lengths_and_values() {
        let json = r#"{"table":{
            "cols":[{"label":"A"},{"label":"B"},{"label":"C"}],
            "rows":[
                {"c":[{"v":"Acme","f":"Acme"},{"v":12.5,"f":"12.50"},{"v":true}]},
                {"c":[null,{"v":null},{}]},
                {"c":[{"v":0}]},
                {},
                {"c":[]}
            ]
        }}"#;
        let table = extract_table(&wrap(json), "quarterly", false).unwrap();
        assert_eq!(table.rows.len(), 5);
        assert_eq!(
            table.rows[0],
            vec![
                CellValue::from("Acme"),
                CellValue::Number(Number::from_f64(12.5).unwrap()),
                CellValue::Bool(true),
            ]
        );
        assert_eq!(table.rows[1].len(), 3);
        assert!(table.rows[1].iter().all(CellValue::is_empty));
        assert_eq!(table.rows[2], vec![CellValue::Number(Number::from(0))]);
        assert!(table.rows[3].is_empty());
        assert!(table.rows[4].is_empty());
        assert_eq!(table.weighted_columns, vec![false; 3]);
    }

    #[test]
    fn test_weighting_sheet_mask_from_first_row() {
        let json = r#"{"table":{
            "cols":[{"label":""},{"label":""},{"label":""}],
            "rows":[
                {"c":[{"v":"Metric"},{"v":"Weighted Score"},{"v":"Raw"}]},
                {"c":[{"v":"Revenue"},{"v":0.4},{"v":"weighted"}]}
            ]
        }}"#;
        let table = extract_table(&wrap(json), "weights", true).unwrap();
        assert_eq!(table.weighted_columns, vec![false, true, false]);
    }

    #[test]
    fn test_weighted_match_is_case_insensitive_and_strings_only() {
        let rows = vec![vec![
            CellValue::from("WEIGHTED"),
            CellValue::from("unweighted avg"),
            CellValue::Number(Number::from(1)),
            CellValue::Bool(true),
            CellValue::empty(),
        ]];
        assert_eq!(weighted_mask(&rows, 5), vec![true, true, false, false, false]);
    }

    #[test]
    fn test_weighting_mask_follows_header_count() {
        let json = r#"{"table":{
            "cols":[{"label":"A"},{"label":"B"},{"label":"C"}],
            "rows":[
                {"c":[{"v":"Weighted"}]},
                {"c":[{"v":"x"},{"v":"y"},{"v":"z"}]}
            ]
        }}"#;
        let table = extract_table(&wrap(json), "weights", true).unwrap();
        assert_eq!(table.weighted_columns, vec![true, false, false]);
        assert_eq!(table.weighted_columns.len(), table.headers.len());
    }

    #[test]
    fn test_weighting_mask_ignores_cells_beyond_headers() {
        let rows = vec![vec![
            CellValue::from("Metric"),
            CellValue::from("Weighted"),
            CellValue::from("weighted extra"),
        ]];
        assert_eq!(weighted_mask(&rows, 2), vec![false, true]);
    }

    #[test]
    fn test_weighting_sheet_with_no_rows_gives_empty_mask() {
        let json = r#"{"table":{"cols":[{"label":"A"},{"label":"B"}],"rows":[]}}"#;
        let table = extract_table(&wrap(json), "weights", true).unwrap();
        assert_eq!(table.headers.len(), 2);
        assert!(table.weighted_columns.is_empty());
    }

    #[test]
    fn test_non_weighting_sheet_ignores_row_content() {
        let json = r#"{"table":{
            "cols":[{"label":"Weighted"},{"label":"B"}],
            "rows":[{"c":[{"v":"Weighted Score"},{"v":"weighted"},{"v":"extra"}]}]
        }}"#;
        let table = extract_table(&wrap(json), "overview", false).unwrap();
        assert_eq!(table.weighted_columns, vec![false, false]);
    }
}
