//! Parameter source resolution
//!
//! Turns each configured parameter spec into a concrete, deterministically
//! ordered sequence of values. File-column sources read a CSV relative to
//! the config directory; row order is preserved so the case builder can
//! row-align columns drawn from the same file.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{ConfigError, ParamSource, ParamSpec};
use crate::models::ParamValue;

/// A parameter with its resolved value sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedParam {
    pub name: String,

    /// Values in source order.
    pub values: Vec<ParamValue>,

    /// Source file for file-column parameters. Parameters with the same
    /// group are row-aligned by the case builder.
    pub group: Option<PathBuf>,
}

/// Resolve every spec, in config order.
pub fn resolve_all(
    specs: &[ParamSpec],
    base_dir: &Path,
) -> Result<Vec<ResolvedParam>, ConfigError> {
    specs.iter().map(|spec| resolve(spec, base_dir)).collect()
}

/// Resolve a single spec to its value sequence.
pub fn resolve(spec: &ParamSpec, base_dir: &Path) -> Result<ResolvedParam, ConfigError> {
    match &spec.source {
        ParamSource::Literal { value } => Ok(ResolvedParam {
            name: spec.name.clone(),
            values: vec![value.clone()],
            group: None,
        }),
        ParamSource::List { values } => Ok(ResolvedParam {
            name: spec.name.clone(),
            values: values.clone(),
            group: None,
        }),
        ParamSource::FileColumn { file, column } => {
            let path = base_dir.join(file);
            let values = read_column(&path, column)?;
            debug!(
                "Resolved parameter '{}' from {} ({} rows)",
                spec.name,
                path.display(),
                values.len()
            );
            Ok(ResolvedParam {
                name: spec.name.clone(),
                values,
                group: Some(path),
            })
        }
    }
}

/// Extract a named column from a CSV file, preserving row order.
fn read_column(path: &Path, column: &str) -> Result<Vec<ParamValue>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::SourceFile {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(&content))
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|source| ConfigError::SourceCsv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let index = headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| ConfigError::MissingColumn {
            column: column.to_string(),
            path: path.to_path_buf(),
        })?;

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| ConfigError::SourceCsv {
            path: path.to_path_buf(),
            source,
        })?;
        let cell = record.get(index).unwrap_or("");
        values.push(ParamValue::Str(cell.to_string()));
    }

    Ok(values)
}

/// Pick the delimiter (`,`, `;`, or tab) that occurs most often in the
/// header line; comma when none appears.
fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");
    [b',', b';', b'\t']
        .into_iter()
        .map(|d| (d, header.matches(d as char).count()))
        .max_by_key(|(_, count)| *count)
        .filter(|(_, count)| *count > 0)
        .map(|(d, _)| d)
        .unwrap_or(b',')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParamSource;
    use tempfile::tempdir;

    fn spec(name: &str, source: ParamSource) -> ParamSpec {
        ParamSpec {
            name: name.to_string(),
            source,
        }
    }

    #[test]
    fn test_resolve_literal() {
        let resolved = resolve(
            &spec(
                "region",
                ParamSource::Literal {
                    value: ParamValue::from("eu"),
                },
            ),
            Path::new("."),
        )
        .unwrap();
        assert_eq!(resolved.values, vec![ParamValue::from("eu")]);
        assert_eq!(resolved.group, None);
    }

    #[test]
    fn test_resolve_list_preserves_order() {
        let resolved = resolve(
            &spec(
                "user_id",
                ParamSource::List {
                    values: vec![ParamValue::Int(3), ParamValue::Int(1), ParamValue::Int(2)],
                },
            ),
            Path::new("."),
        )
        .unwrap();
        assert_eq!(
            resolved.values,
            vec![ParamValue::Int(3), ParamValue::Int(1), ParamValue::Int(2)]
        );
    }

    #[test]
    fn test_resolve_file_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("skus.csv");
        std::fs::write(&path, "sku,price\nA-1,10\nB-2,20\nA-1,30\n").unwrap();

        let resolved = resolve(
            &spec(
                "sku",
                ParamSource::FileColumn {
                    file: PathBuf::from("skus.csv"),
                    column: "sku".to_string(),
                },
            ),
            dir.path(),
        )
        .unwrap();

        // Row order and duplicates are preserved for row alignment.
        assert_eq!(
            resolved.values,
            vec![
                ParamValue::from("A-1"),
                ParamValue::from("B-2"),
                ParamValue::from("A-1")
            ]
        );
        assert_eq!(resolved.group, Some(path));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = resolve(
            &spec(
                "sku",
                ParamSource::FileColumn {
                    file: PathBuf::from("missing.csv"),
                    column: "sku".to_string(),
                },
            ),
            Path::new("/nonexistent"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::SourceFile { .. }));
    }

    #[test]
    fn test_missing_column_is_config_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("data.csv"), "a,b\n1,2\n").unwrap();

        let err = resolve(
            &spec(
                "sku",
                ParamSource::FileColumn {
                    file: PathBuf::from("data.csv"),
                    column: "sku".to_string(),
                },
            ),
            dir.path(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingColumn { .. }));
    }

    #[test]
    fn test_semicolon_delimiter_sniffed() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("data.csv"), "id;name\n1;alpha\n2;beta\n").unwrap();

        let resolved = resolve(
            &spec(
                "name",
                ParamSource::FileColumn {
                    file: PathBuf::from("data.csv"),
                    column: "name".to_string(),
                },
            ),
            dir.path(),
        )
        .unwrap();
        assert_eq!(
            resolved.values,
            vec![ParamValue::from("alpha"), ParamValue::from("beta")]
        );
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("a,b,c\n"), b',');
        assert_eq!(sniff_delimiter("a;b;c\n"), b';');
        assert_eq!(sniff_delimiter("a\tb\tc\n"), b'\t');
        assert_eq!(sniff_delimiter("single\n"), b',');
    }
}
