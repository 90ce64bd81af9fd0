//! Structural JSON Comparison Library
//!
//! Reports every divergence between two JSON documents as a flat list of
//! records, ignoring object key order and array element order.

pub mod canonical;
pub mod differ;
pub mod error;
pub mod loader;
pub mod path;
pub mod record;
pub mod writer;

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

pub use canonical::{canonicalize, fingerprint};
pub use differ::Differ;
pub use error::{DiffError, LoadError};
pub use record::{DiffKind, Difference};

/// Configuration for a comparison
#[derive(Debug, Clone)]
pub struct Config {
	/// Maximum array/object nesting accepted on either side (default: 256)
	pub max_depth: usize,
	/// Whether to report fields that only the second document has (default: true)
	pub report_missing_in_first: bool,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			max_depth: 256,
			report_missing_in_first: true,
		}
	}
}

/// Compare two documents with the default configuration.
pub fn diff(left: &Value, right: &Value) -> Result<Vec<Difference>, DiffError> {
	Differ::new(&Config::default()).diff(left, right)
}

/// Count of differences per kind
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
	counts: BTreeMap<DiffKind, usize>,
}

impl Summary {
	pub fn from_differences(differences: &[Difference]) -> Self {
		let mut counts = BTreeMap::new();
		for difference in differences {
			*counts.entry(difference.kind).or_insert(0) += 1;
		}
		Self { counts }
	}

	pub fn count(&self, kind: DiffKind) -> usize {
		self.counts.get(&kind).copied().unwrap_or(0)
	}

	pub fn total(&self) -> usize {
		self.counts.values().sum()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	/// Kinds that occurred, in declaration order
	pub fn iter(&self) -> impl Iterator<Item = (DiffKind, usize)> + '_ {
		self.counts.iter().map(|(kind, count)| (*kind, *count))
	}
}

/// Outcome of comparing two documents
#[derive(Debug, Clone)]
pub struct Report {
	pub differences: Vec<Difference>,
	pub summary: Summary,
	pub left_fingerprint: String,
	pub right_fingerprint: String,
}

impl Report {
	pub fn is_identical(&self) -> bool {
		self.differences.is_empty()
	}
}

/// Compare two documents and summarize the result.
pub fn compare(left: &Value, right: &Value, config: &Config) -> Result<Report, DiffError> {
	let differences = Differ::new(config).diff(left, right)?;
	let summary = Summary::from_differences(&differences);
	let (left_fingerprint, right_fingerprint) =
		rayon::join(|| fingerprint(left), || fingerprint(right));

	debug!(
		total = summary.total(),
		left = %left_fingerprint,
		right = %right_fingerprint,
		"documents compared"
	);

	Ok(Report {
		differences,
		summary,
		left_fingerprint,
		right_fingerprint,
	})
}
