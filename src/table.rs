//! Reaction-condition tables.
//!
//! A table is a JSON array of row objects, or JSON Lines with one object per
//! line. Keys follow the spreadsheet headers; other columns are ignored.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One experiment: the varied components of a coupling, as SMILES.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "Aryl halide")]
    pub aryl_halide: String,
    #[serde(rename = "Ligand")]
    pub ligand: String,
    #[serde(rename = "Base")]
    pub base: String,
    #[serde(rename = "Additive")]
    pub additive: String,
}

impl Row {
    pub fn new(
        aryl_halide: impl Into<String>,
        ligand: impl Into<String>,
        base: impl Into<String>,
        additive: impl Into<String>,
    ) -> Self {
        Self {
            aryl_halide: aryl_halide.into(),
            ligand: ligand.into(),
            base: base.into(),
            additive: additive.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid table JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid row on line {line}: {source}")]
    JsonLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported table format: {0} (expected .json, .jsonl or .ndjson)")]
    UnsupportedFormat(PathBuf),
}

/// Read a table, choosing the format from the file extension.
pub fn load_rows(path: &Path) -> Result<Vec<Row>, TableError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let parse: fn(&str) -> Result<Vec<Row>, TableError> = match ext.as_deref() {
        Some("json") => rows_from_json_str,
        Some("jsonl" | "ndjson") => rows_from_jsonl_str,
        _ => return Err(TableError::UnsupportedFormat(path.to_path_buf())),
    };
    let content = std::fs::read_to_string(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = parse(&content)?;
    tracing::debug!(?path, rows = rows.len(), "loaded table");
    Ok(rows)
}

pub fn rows_from_json_str(s: &str) -> Result<Vec<Row>, TableError> {
    Ok(serde_json::from_str(s)?)
}

/// Blank lines are skipped; line numbers in errors are 1-based.
pub fn rows_from_jsonl_str(s: &str) -> Result<Vec<Row>, TableError> {
    s.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|source| TableError::JsonLine { line: i + 1, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_array_with_extra_columns() {
        let rows = rows_from_json_str(
            r#"[{"Ligand": "L", "Additive": "A", "Base": "B", "Aryl halide": "Brc1ccccc1", "Output": 12.5}]"#,
        )
        .unwrap();
        assert_eq!(rows, vec![Row::new("Brc1ccccc1", "L", "B", "A")]);
    }

    #[test]
    fn json_lines_skip_blanks() {
        let text = concat!(
            r#"{"Aryl halide": "X1", "Ligand": "L", "Base": "B", "Additive": "A"}"#,
            "\n\n",
            r#"{"Aryl halide": "X2", "Ligand": "L", "Base": "B", "Additive": "A"}"#,
            "\n",
        );
        let rows = rows_from_jsonl_str(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].aryl_halide, "X2");
    }

    #[test]
    fn json_lines_report_line_number() {
        let text = concat!(
            r#"{"Aryl halide": "X1", "Ligand": "L", "Base": "B", "Additive": "A"}"#,
            "\n",
            r#"{"Aryl halide": "X2"}"#,
        );
        let err = rows_from_jsonl_str(text).unwrap_err();
        assert!(matches!(err, TableError::JsonLine { line: 2, .. }));
    }

    #[test]
    fn missing_column_is_an_error() {
        assert!(rows_from_json_str(r#"[{"Aryl halide": "X"}]"#).is_err());
    }

    #[test]
    fn unknown_extension() {
        let err = load_rows(Path::new("rows.xlsx")).unwrap_err();
        assert!(matches!(err, TableError::UnsupportedFormat(_)));
    }

    #[test]
    fn round_trips_column_names() {
        let json = serde_json::to_value(Row::new("X", "L", "B", "A")).unwrap();
        assert_eq!(json["Aryl halide"], "X");
        assert_eq!(json["Additive"], "A");
    }
}
