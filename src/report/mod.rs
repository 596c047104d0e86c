//! Spreadsheet report output
//!
//! Serializes a run report into a single-sheet Excel workbook: one column
//! per parameter, then status, data flag, and diff detail. The header row
//! is written even when there are no cases.

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::models::{ParamValue, RunReport};

/// Sheet name, matching the tool this replaces.
const SHEET_NAME: &str = "API Diff Results";

/// Report output failures. Fatal: the run's results are lost if the
/// workbook cannot be written.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },
}

/// Write the report workbook, creating parent directories and replacing
/// any existing file.
pub fn write_report(report: &RunReport, path: impl AsRef<Path>) -> Result<(), ReportError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| ReportError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    build_workbook(report)
        .and_then(|mut workbook| workbook.save(path))
        .map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    info!("Saved report to {}", path.display());
    Ok(())
}

fn build_workbook(report: &RunReport) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let mut headers: Vec<String> = report.param_names.iter().map(|n| title_case(n)).collect();
    headers.push("Status".to_string());
    headers.push("Has Data".to_string());
    headers.push("Diff".to_string());
    if report.include_raw {
        headers.push("Old Body".to_string());
        headers.push("New Body".to_string());
    }

    let bold = Format::new().set_bold();
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &bold)?;
    }

    for (i, row) in report.rows.iter().enumerate() {
        let row_num = i as u32 + 1;
        let mut col: u16 = 0;

        for name in &report.param_names {
            match row.case.get(name) {
                Some(ParamValue::Int(v)) => {
                    worksheet.write_number(row_num, col, *v as f64)?;
                }
                Some(ParamValue::Float(v)) => {
                    worksheet.write_number(row_num, col, *v)?;
                }
                Some(ParamValue::Str(v)) => {
                    worksheet.write_string(row_num, col, v)?;
                }
                None => {
                    worksheet.write_string(row_num, col, "")?;
                }
            }
            col += 1;
        }

        worksheet.write_string(row_num, col, row.status.as_str())?;
        worksheet.write_boolean(row_num, col + 1, row.has_data)?;
        worksheet.write_string(row_num, col + 2, &row.detail)?;

        if report.include_raw {
            worksheet.write_string(row_num, col + 3, row.old_raw.as_deref().unwrap_or(""))?;
            worksheet.write_string(row_num, col + 4, row.new_raw.as_deref().unwrap_or(""))?;
        }
    }

    worksheet.autofit();
    Ok(workbook)
}

/// Turn a parameter name into a column header: `user_id` -> `User Id`.
fn title_case(name: &str) -> String {
    name.split(['_', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CaseRow, CaseStatus, TestCase};
    use chrono::Utc;
    use tempfile::tempdir;

    fn report(rows: Vec<CaseRow>, param_names: Vec<String>) -> RunReport {
        RunReport {
            started_at: Utc::now(),
            completed_at: Utc::now(),
            param_names,
            include_raw: false,
            rows,
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("user_id"), "User Id");
        assert_eq!(title_case("sku"), "Sku");
        assert_eq!(title_case("has_data"), "Has Data");
    }

    #[test]
    fn test_zero_case_report_still_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.xlsx");

        write_report(&report(Vec::new(), vec!["user_id".to_string()]), &path).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_parent_directories_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/output/report.xlsx");

        write_report(&report(Vec::new(), Vec::new()), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_rows_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.xlsx");

        let rows = vec![CaseRow {
            case: TestCase::new(vec![(
                "user_id".to_string(),
                crate::models::ParamValue::Int(1),
            )]),
            status: CaseStatus::Mismatch,
            has_data: true,
            detail: "changed name: \"A\" -> \"B\"".to_string(),
            old_raw: None,
            new_raw: None,
        }];

        write_report(&report(rows, vec!["user_id".to_string()]), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_existing_file_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        std::fs::write(&path, "stale").unwrap();

        write_report(&report(Vec::new(), Vec::new()), &path).unwrap();
        let content = std::fs::read(&path).unwrap();
        assert_ne!(content, b"stale");
    }
}
