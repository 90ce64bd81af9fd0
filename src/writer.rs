//! CSV report output.
//!
//! One row per difference with the column order
//! `path, kind, left_value, left_type, right_value, right_type, detail`.

use crate::record::Difference;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output file name used when none is given.
pub const DEFAULT_OUTPUT: &str = "differences.csv";

/// What the report writer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
	/// No differences, so no file was written.
	NoDifferences,
	Written { rows: usize },
}

/// Write `differences` to `destination` as CSV with a header row.
pub fn write_report(differences: &[Difference], destination: &Path) -> Result<WriteOutcome> {
	if differences.is_empty() {
		return Ok(WriteOutcome::NoDifferences);
	}

	let mut writer = csv::Writer::from_path(destination)
		.with_context(|| format!("Failed to create {}", destination.display()))?;
	for difference in differences {
		writer
			.serialize(difference)
			.with_context(|| format!("Failed to write {}", destination.display()))?;
	}
	writer
		.flush()
		.with_context(|| format!("Failed to write {}", destination.display()))?;

	debug!(path = %destination.display(), rows = differences.len(), "wrote report");
	Ok(WriteOutcome::Written {
		rows: differences.len(),
	})
}

/// Append `.csv` to `name` unless it already ends with it.
pub fn ensure_csv_extension(name: &str) -> PathBuf {
	if name.ends_with(".csv") {
		PathBuf::from(name)
	} else {
		PathBuf::from(format!("{}.csv", name))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use std::fs;
	use tempfile::tempdir;

	#[test]
	fn test_ensure_csv_extension() {
		assert_eq!(ensure_csv_extension("report"), PathBuf::from("report.csv"));
		assert_eq!(ensure_csv_extension("report.csv"), PathBuf::from("report.csv"));
		assert_eq!(ensure_csv_extension("out.txt"), PathBuf::from("out.txt.csv"));
	}

	#[test]
	fn test_empty_report_writes_nothing() {
		let temp = tempdir().unwrap();
		let path = temp.path().join("report.csv");

		assert_eq!(write_report(&[], &path).unwrap(), WriteOutcome::NoDifferences);
		assert!(!path.exists());
	}

	#[test]
	fn test_writes_header_and_rows() {
		let temp = tempdir().unwrap();
		let path = temp.path().join("report.csv");
		let differences = vec![
			Difference::field_missing_in_second("b", &json!(2)),
			Difference::value_mismatch("a, quoted", &json!("x"), &json!("y")),
		];

		let outcome = write_report(&differences, &path).unwrap();
		assert_eq!(outcome, WriteOutcome::Written { rows: 2 });

		let content = fs::read_to_string(&path).unwrap();
		let lines: Vec<&str> = content.lines().collect();
		assert_eq!(
			lines,
			vec![
				"path,kind,left_value,left_type,right_value,right_type,detail",
				"b,FIELD_MISSING_IN_SECOND,2,int,FIELD_DOES_NOT_EXIST,N/A,Field exists in the first document but not in the second",
				"\"a, quoted\",VALUE_MISMATCH,x,str,y,str,Different values: x vs y",
			]
		);
	}
}
