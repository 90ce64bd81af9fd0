//! Error types for comparison and document loading.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the comparison engine.
#[derive(Debug, Error)]
pub enum DiffError {
	#[error("document nesting depth {depth} exceeds the limit of {limit}")]
	DepthExceeded { depth: usize, limit: usize },
}

/// Errors raised while reading a JSON document from disk.
#[derive(Debug, Error)]
pub enum LoadError {
	#[error("file not found: {}", path.display())]
	NotFound { path: PathBuf },
	#[error("failed to read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("failed to decode JSON in {}: {source}", path.display())]
	Parse {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},
	#[error("{}: nesting depth {depth} exceeds the limit of {limit}", path.display())]
	DepthExceeded {
		path: PathBuf,
		depth: usize,
		limit: usize,
	},
}
