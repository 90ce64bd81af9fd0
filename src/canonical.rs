//! Canonical form of JSON values for order-insensitive comparison.
//!
//! Object keys are visited in ascending order and array elements are sorted by
//! a derived key, so two documents that differ only in key or element order
//! canonicalize to the same value.

use serde_json::{Map, Number, Value};
use std::borrow::Cow;
use std::cmp::Ordering;
use tracing::debug;

/// Rewrite `value` into canonical form. Never fails and never mutates input.
pub fn canonicalize(value: &Value) -> Value {
	match value {
		Value::Object(map) => {
			let mut entries: Vec<(&String, &Value)> = map.iter().collect();
			entries.sort_by(|a, b| a.0.cmp(b.0));

			let mut canonical = Map::new();
			for (key, child) in entries {
				canonical.insert(key.clone(), canonicalize(child));
			}
			Value::Object(canonical)
		}
		Value::Array(items) => {
			let items = items.iter().map(canonicalize).collect();
			Value::Array(sort_best_effort(items))
		}
		scalar => scalar.clone(),
	}
}

/// How numbers are spelled by [`write_canonical`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberText {
	/// As parsed, so `1.0` stays `1.0`.
	AsWritten,
	/// Integral floats written as integers, so `1.0` and `1` agree.
	Normalized,
}

/// Compact JSON text with object keys written in ascending order at every level.
///
/// The output does not depend on the iteration order of the map type.
/// Numbers keep their original spelling.
pub fn canonical_text(value: &Value) -> String {
	let mut buf = String::new();
	write_canonical(value, &mut buf, NumberText::AsWritten);
	buf
}

/// Canonical text with numerically equal numbers spelled identically.
///
/// Used as the sort key of structured array elements and for fingerprints, so
/// values the differ treats as equal also sort and hash the same.
pub fn sort_text(value: &Value) -> String {
	let mut buf = String::new();
	write_canonical(value, &mut buf, NumberText::Normalized);
	buf
}

fn write_canonical(value: &Value, buf: &mut String, numbers: NumberText) {
	match value {
		Value::Array(items) => {
			buf.push('[');
			for (i, item) in items.iter().enumerate() {
				if i > 0 {
					buf.push(',');
				}
				write_canonical(item, buf, numbers);
			}
			buf.push(']');
		}
		Value::Object(map) => {
			let mut keys: Vec<&String> = map.keys().collect();
			keys.sort();

			buf.push('{');
			for (i, key) in keys.iter().enumerate() {
				if i > 0 {
					buf.push(',');
				}
				// Value's Display handles string escaping
				buf.push_str(&Value::String((*key).clone()).to_string());
				buf.push(':');
				if let Some(child) = map.get(*key) {
					write_canonical(child, buf, numbers);
				}
			}
			buf.push('}');
		}
		Value::Number(n) if numbers == NumberText::Normalized => {
			buf.push_str(&normalized_number_text(n))
		}
		scalar => buf.push_str(&scalar.to_string()),
	}
}

/// MD5 hex digest of the sort text of `value`'s canonical form.
///
/// Two documents with the same fingerprint are canonically identical.
pub fn fingerprint(value: &Value) -> String {
	use md5::{Digest, Md5};
	let mut hasher = Md5::new();
	hasher.update(sort_text(&canonicalize(value)).as_bytes());
	format!("{:x}", hasher.finalize())
}

/// Key used to order array elements during canonicalization.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey<'a> {
	Null,
	Bool(bool),
	Number(&'a Number),
	/// Strings sort by themselves; arrays and objects by their sort text.
	Text(Cow<'a, str>),
}

impl<'a> SortKey<'a> {
	pub fn of(value: &'a Value) -> Self {
		match value {
			Value::Null => SortKey::Null,
			Value::Bool(b) => SortKey::Bool(*b),
			Value::Number(n) => SortKey::Number(n),
			Value::String(s) => SortKey::Text(Cow::Borrowed(s)),
			structured => SortKey::Text(Cow::Owned(sort_text(structured))),
		}
	}
}

/// Result of comparing two sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrdering {
	Less,
	Equal,
	Greater,
	/// The keys belong to different classes and have no natural order.
	Incomparable,
}

impl From<Ordering> for KeyOrdering {
	fn from(ordering: Ordering) -> Self {
		match ordering {
			Ordering::Less => KeyOrdering::Less,
			Ordering::Equal => KeyOrdering::Equal,
			Ordering::Greater => KeyOrdering::Greater,
		}
	}
}

/// Compare two sort keys. Keys of different classes are incomparable.
pub fn compare_keys(a: &SortKey<'_>, b: &SortKey<'_>) -> KeyOrdering {
	match (a, b) {
		(SortKey::Null, SortKey::Null) => KeyOrdering::Equal,
		(SortKey::Bool(x), SortKey::Bool(y)) => x.cmp(y).into(),
		(SortKey::Number(x), SortKey::Number(y)) => compare_numbers(x, y).into(),
		(SortKey::Text(x), SortKey::Text(y)) => x.cmp(y).into(),
		_ => KeyOrdering::Incomparable,
	}
}

/// 2^64, the first float above every `u64`.
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;
/// -2^63, the smallest `i64`, exactly representable as a float.
const MIN_I64_F64: f64 = -9_223_372_036_854_775_808.0;

/// Exact numeric ordering that treats integers and floats as one kind.
///
/// `3` equals `3.0` and `-0.0` equals `0`, but an integer never rounds to a
/// neighbouring float, so the ordering stays transitive across mixed arrays.
pub fn compare_numbers(a: &Number, b: &Number) -> Ordering {
	match (as_integer(a), as_integer(b)) {
		(Some(x), Some(y)) => x.cmp(&y),
		(Some(x), None) => compare_integer_float(x, b.as_f64().unwrap_or(0.0)),
		(None, Some(y)) => compare_integer_float(y, a.as_f64().unwrap_or(0.0)).reverse(),
		(None, None) => match (a.as_f64(), b.as_f64()) {
			(Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
			_ => Ordering::Equal,
		},
	}
}

fn as_integer(n: &Number) -> Option<i128> {
	n.as_i64()
		.map(i128::from)
		.or_else(|| n.as_u64().map(i128::from))
}

/// Order of `int` relative to `float`, without rounding either side.
fn compare_integer_float(int: i128, float: f64) -> Ordering {
	// every integer here lies in [-2^63, 2^64)
	if float >= TWO_POW_64 {
		return Ordering::Less;
	}
	if float <= -TWO_POW_64 {
		return Ordering::Greater;
	}

	let whole = float.trunc();
	match int.cmp(&(whole as i128)) {
		Ordering::Equal => {
			let fraction = float - whole;
			if fraction > 0.0 {
				Ordering::Less
			} else if fraction < 0.0 {
				Ordering::Greater
			} else {
				Ordering::Equal
			}
		}
		unequal => unequal,
	}
}

/// Number text that is identical for numerically equal integers and floats.
///
/// Integral floats inside the integer range are written as integers.
fn normalized_number_text(n: &Number) -> String {
	match n.as_f64() {
		Some(f) if n.is_f64() && f.fract() == 0.0 && (0.0..TWO_POW_64).contains(&f) => {
			(f as u64).to_string()
		}
		Some(f) if n.is_f64() && f.fract() == 0.0 && (MIN_I64_F64..0.0).contains(&f) => {
			(f as i64).to_string()
		}
		_ => n.to_string(),
	}
}

/// Sort `items` by their canonical sort key.
///
/// If any two elements are incomparable the input order is returned
/// unchanged. Comparability depends only on the key class, so checking
/// neighbours is enough to know every pair is comparable.
pub fn sort_best_effort(items: Vec<Value>) -> Vec<Value> {
	if items.len() < 2 {
		return items;
	}

	let Some(order) = sort_order(&items) else {
		debug!(
			len = items.len(),
			"array elements are not mutually orderable, keeping input order"
		);
		return items;
	};

	let mut slots: Vec<Option<Value>> = items.into_iter().map(Some).collect();
	order.into_iter().filter_map(|i| slots[i].take()).collect()
}

/// Permutation that sorts `items`, or `None` if some pair is incomparable.
fn sort_order(items: &[Value]) -> Option<Vec<usize>> {
	let keys: Vec<SortKey<'_>> = items.iter().map(SortKey::of).collect();
	let orderable = keys
		.windows(2)
		.all(|pair| compare_keys(&pair[0], &pair[1]) != KeyOrdering::Incomparable);
	if !orderable {
		return None;
	}

	let mut order: Vec<usize> = (0..items.len()).collect();
	order.sort_by(|&a, &b| match compare_keys(&keys[a], &keys[b]) {
		KeyOrdering::Less => Ordering::Less,
		KeyOrdering::Greater => Ordering::Greater,
		KeyOrdering::Equal | KeyOrdering::Incomparable => Ordering::Equal,
	});
	Some(order)
}
