//! Reading JSON documents from disk.
//!
//! Files ending in `.gz` are decompressed before parsing. The nesting depth
//! is measured on the raw bytes first, so the parser's own recursion limit is
//! lifted and documents up to `max_depth` levels deep are accepted.

use crate::error::LoadError;
use flate2::read::GzDecoder;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// Load and parse the JSON document at `path`, rejecting documents nested
/// deeper than `max_depth`.
pub fn load(path: &Path, max_depth: usize) -> Result<Value, LoadError> {
	let content = read_content(path).map_err(|source| {
		if source.kind() == io::ErrorKind::NotFound {
			LoadError::NotFound {
				path: path.to_path_buf(),
			}
		} else {
			LoadError::Io {
				path: path.to_path_buf(),
				source,
			}
		}
	})?;
	debug!(path = %path.display(), bytes = content.len(), "read document");

	let depth = scan_depth(&content);
	if depth > max_depth {
		return Err(LoadError::DepthExceeded {
			path: path.to_path_buf(),
			depth,
			limit: max_depth,
		});
	}

	parse(&content).map_err(|source| LoadError::Parse {
		path: path.to_path_buf(),
		source,
	})
}

/// Load two documents in parallel.
pub fn load_pair(
	left: &Path,
	right: &Path,
	max_depth: usize,
) -> Result<(Value, Value), LoadError> {
	let (left, right) = rayon::join(|| load(left, max_depth), || load(right, max_depth));
	Ok((left?, right?))
}

fn parse(content: &[u8]) -> serde_json::Result<Value> {
	let mut de = serde_json::Deserializer::from_slice(content);
	de.disable_recursion_limit();
	let value = Value::deserialize(&mut de)?;
	de.end()?;
	Ok(value)
}

/// Deepest bracket nesting in `content`, ignoring brackets inside strings.
///
/// Malformed input still gets a number; the parser reports the real error.
fn scan_depth(content: &[u8]) -> usize {
	let mut depth = 0usize;
	let mut deepest = 0usize;
	let mut in_string = false;
	let mut escaped = false;

	for &byte in content {
		if in_string {
			if escaped {
				escaped = false;
			} else if byte == b'\\' {
				escaped = true;
			} else if byte == b'"' {
				in_string = false;
			}
			continue;
		}
		match byte {
			b'"' => in_string = true,
			b'[' | b'{' => {
				depth += 1;
				deepest = deepest.max(depth);
			}
			b']' | b'}' => depth = depth.saturating_sub(1),
			_ => {}
		}
	}

	deepest
}

fn read_content(path: &Path) -> io::Result<Vec<u8>> {
	let raw = fs::read(path)?;
	if !is_gzipped(path) {
		return Ok(raw);
	}

	let mut decoded = Vec::new();
	GzDecoder::new(raw.as_slice()).read_to_end(&mut decoded)?;
	Ok(decoded)
}

fn is_gzipped(path: &Path) -> bool {
	path.extension()
		.map(|ext| ext.eq_ignore_ascii_case("gz"))
		.unwrap_or(false)
}
