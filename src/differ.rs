//! Recursive comparison of two canonicalized JSON trees.
//!
//! Both roots are canonicalized once; the walk then descends both trees in
//! lockstep, appending a [`Difference`] for every divergence it finds.

use crate::canonical::{canonicalize, compare_numbers};
use crate::error::DiffError;
use crate::path::{child_index, child_key};
use crate::record::{Difference, ValueKind};
use crate::Config;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use tracing::debug;

/// Comparison engine configured by [`Config`].
#[derive(Debug, Clone)]
pub struct Differ {
	max_depth: usize,
	report_missing_in_first: bool,
}

impl Differ {
	pub fn new(config: &Config) -> Self {
		Self {
			max_depth: config.max_depth,
			report_missing_in_first: config.report_missing_in_first,
		}
	}

	/// Compare two documents, starting at the root path.
	///
	/// Fails only when either document nests deeper than the configured limit.
	pub fn diff(&self, left: &Value, right: &Value) -> Result<Vec<Difference>, DiffError> {
		for value in [left, right] {
			let depth = nesting_depth(value);
			if depth > self.max_depth {
				return Err(DiffError::DepthExceeded {
					depth,
					limit: self.max_depth,
				});
			}
		}

		let (left, right) = rayon::join(|| canonicalize(left), || canonicalize(right));

		let mut differences = Vec::new();
		self.compare(&left, &right, "", &mut differences);
		debug!(count = differences.len(), "comparison finished");
		Ok(differences)
	}

	fn compare(&self, left: &Value, right: &Value, path: &str, out: &mut Vec<Difference>) {
		let (left_kind, right_kind) = (ValueKind::of(left), ValueKind::of(right));
		if !left_kind.is_compatible(right_kind) {
			out.push(Difference::type_mismatch(path, left, right));
			return;
		}

		match (left, right) {
			(Value::Array(left), Value::Array(right)) => self.compare_lists(left, right, path, out),
			(Value::Object(left), Value::Object(right)) => {
				self.compare_objects(left, right, path, out)
			}
			_ => {
				if !scalars_equal(left, right) {
					out.push(Difference::value_mismatch(path, left, right));
				}
			}
		}
	}

	fn compare_lists(&self, left: &[Value], right: &[Value], path: &str, out: &mut Vec<Difference>) {
		if left.len() != right.len() {
			out.push(Difference::list_length_mismatch(path, left.len(), right.len()));
		}

		for i in 0..left.len().max(right.len()) {
			let item_path = child_index(path, i);
			match (left.get(i), right.get(i)) {
				(Some(l), Some(r)) => self.compare(l, r, &item_path, out),
				(Some(l), None) => out.push(Difference::item_missing_in_second(&item_path, l)),
				(None, Some(r)) => out.push(Difference::item_missing_in_first(&item_path, r)),
				(None, None) => {}
			}
		}
	}

	fn compare_objects(
		&self,
		left: &Map<String, Value>,
		right: &Map<String, Value>,
		path: &str,
		out: &mut Vec<Difference>,
	) {
		let mut left_keys: Vec<&String> = left.keys().collect();
		left_keys.sort();
		let mut right_keys: Vec<&String> = right.keys().collect();
		right_keys.sort();

		for key in &left_keys {
			if !right.contains_key(key.as_str()) {
				out.push(Difference::field_missing_in_second(
					&child_key(path, key),
					&left[key.as_str()],
				));
			}
		}

		if self.report_missing_in_first {
			for key in &right_keys {
				if !left.contains_key(key.as_str()) {
					out.push(Difference::field_missing_in_first(
						&child_key(path, key),
						&right[key.as_str()],
					));
				}
			}
		}

		for key in &left_keys {
			if let Some(r) = right.get(key.as_str()) {
				self.compare(&left[key.as_str()], r, &child_key(path, key), out);
			}
		}
	}
}

/// Equality for scalars of compatible kinds; numbers compare by value.
fn scalars_equal(left: &Value, right: &Value) -> bool {
	match (left, right) {
		(Value::Number(l), Value::Number(r)) => compare_numbers(l, r) == Ordering::Equal,
		_ => left == right,
	}
}

/// Deepest array/object nesting level in `value`; scalars are depth 0.
///
/// Walks an explicit stack so arbitrarily deep input cannot overflow.
pub fn nesting_depth(value: &Value) -> usize {
	let mut max = 0;
	let mut stack = vec![(value, 0usize)];
	while let Some((value, depth)) = stack.pop() {
		match value {
			Value::Array(items) => {
				max = max.max(depth + 1);
				stack.extend(items.iter().map(|item| (item, depth + 1)));
			}
			Value::Object(map) => {
				max = max.max(depth + 1);
				stack.extend(map.values().map(|item| (item, depth + 1)));
			}
			_ => {}
		}
	}
	max
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::record::{DiffKind, FIELD_DOES_NOT_EXIST, ITEM_DOES_NOT_EXIST};
	use serde_json::json;

	fn run(left: Value, right: Value) -> Vec<Difference> {
		Differ::new(&Config::default()).diff(&left, &right).unwrap()
	}

	fn kinds(differences: &[Difference]) -> Vec<(&str, DiffKind)> {
		differences
			.iter()
			.map(|d| (d.path.as_str(), d.kind))
			.collect()
	}

	#[test]
	fn test_identical_documents() {
		let doc = json!({"a": [1, {"b": null}], "c": "text", "d": 1.5, "e": false});
		assert!(run(doc.clone(), doc).is_empty());
	}

	#[test]
	fn test_key_order_is_ignored() {
		let left: Value = serde_json::from_str(r#"{"a": 1, "b": {"x": 1, "y": 2}}"#).unwrap();
		let right: Value = serde_json::from_str(r#"{"b": {"y": 2, "x": 1}, "a": 1}"#).unwrap();
		assert!(run(left, right).is_empty());
	}

	#[test]
	fn test_array_order_is_ignored() {
		assert!(run(json!({"l": [3, 1, 2]}), json!({"l": [2, 3, 1]})).is_empty());
		assert!(run(
			json!([{"id": 2}, {"id": 1}]),
			json!([{"id": 1}, {"id": 2}])
		)
		.is_empty());
	}

	#[test]
	fn test_type_mismatch_short_circuits() {
		let differences = run(json!({"a": 1}), json!({"a": "1"}));
		assert_eq!(differences.len(), 1);
		let record = &differences[0];
		assert_eq!(record.path, "a");
		assert_eq!(record.kind, DiffKind::TypeMismatch);
		assert_eq!(record.left_type, "int");
		assert_eq!(record.right_type, "str");
		assert_eq!(record.right_value, "1");
		assert_eq!(record.detail, "Different types: int vs str");
	}

	#[test]
	fn test_null_is_a_kind_not_an_absence() {
		let differences = run(json!({"a": 1}), json!({"a": null}));
		assert_eq!(differences.len(), 1);
		assert_eq!(differences[0].kind, DiffKind::TypeMismatch);
		assert_eq!(differences[0].right_value, "null");
		assert_eq!(differences[0].right_type, "null");
	}

	#[test]
	fn test_bool_is_not_numeric() {
		let differences = run(json!({"flag": true}), json!({"flag": 1}));
		assert_eq!(kinds(&differences), vec![("flag", DiffKind::TypeMismatch)]);
	}

	#[test]
	fn test_numeric_equivalence() {
		assert!(run(json!({"x": 3}), json!({"x": 3.0})).is_empty());
		assert!(run(json!({"x": -0.0}), json!({"x": 0})).is_empty());
		assert!(run(json!({"x": u64::MAX}), json!({"x": u64::MAX})).is_empty());
	}

	#[test]
	fn test_value_mismatch() {
		let differences = run(json!({"x": 3}), json!({"x": 4.5}));
		assert_eq!(differences.len(), 1);
		let record = &differences[0];
		assert_eq!(record.kind, DiffKind::ValueMismatch);
		assert_eq!(record.left_value, "3");
		assert_eq!(record.left_type, "int");
		assert_eq!(record.right_value, "4.5");
		assert_eq!(record.right_type, "float");
		assert_eq!(record.detail, "Different values: 3 vs 4.5");
	}

	#[test]
	fn test_large_integers_compare_exactly() {
		let differences = run(
			json!({"id": 9007199254740993_i64}),
			json!({"id": 9007199254740992_i64}),
		);
		assert_eq!(kinds(&differences), vec![("id", DiffKind::ValueMismatch)]);
	}

	#[test]
	fn test_integer_and_float_compare_exactly() {
		let differences = run(
			json!({"id": 9007199254740993_i64}),
			json!({"id": 9007199254740992.0}),
		);
		assert_eq!(kinds(&differences), vec![("id", DiffKind::ValueMismatch)]);

		let differences = run(
			json!({"id": 9007199254740992_i64}),
			json!({"id": 9007199254740992.0}),
		);
		assert!(differences.is_empty());
	}

	#[test]
	fn test_field_missing_in_second() {
		let differences = run(json!({"a": 1, "b": 2}), json!({"a": 1}));
		assert_eq!(differences.len(), 1);
		assert_eq!(differences[0].path, "b");
		assert_eq!(differences[0].kind, DiffKind::FieldMissingInSecond);
		assert_eq!(differences[0].right_value, FIELD_DOES_NOT_EXIST);
	}

	#[test]
	fn test_field_missing_in_first() {
		let differences = run(json!({"a": 1}), json!({"a": 1, "b": {"c": 2}}));
		assert_eq!(differences.len(), 1);
		assert_eq!(differences[0].path, "b");
		assert_eq!(differences[0].kind, DiffKind::FieldMissingInFirst);
		assert_eq!(differences[0].left_value, FIELD_DOES_NOT_EXIST);
		assert_eq!(differences[0].right_value, r#"{"c":2}"#);
		assert_eq!(differences[0].right_type, "dict");
	}

	#[test]
	fn test_missing_in_first_can_be_disabled() {
		let config = Config {
			report_missing_in_first: false,
			..Config::default()
		};
		let differences = Differ::new(&config)
			.diff(&json!({"a": 1}), &json!({"a": 1, "b": 2}))
			.unwrap();
		assert!(differences.is_empty());
	}

	#[test]
	fn test_list_length_mismatch() {
		let differences = run(json!({"l": [3, 1, 2]}), json!({"l": [2, 1]}));
		assert_eq!(
			kinds(&differences),
			vec![
				("l", DiffKind::ListLengthMismatch),
				("l[2]", DiffKind::ListItemMissingInSecond),
			]
		);
		assert_eq!(differences[0].detail, "Different item counts: 3 vs 2");
		assert_eq!(differences[1].left_value, "3");
		assert_eq!(differences[1].right_value, ITEM_DOES_NOT_EXIST);
	}

	#[test]
	fn test_list_item_missing_in_first() {
		let differences = run(json!(["a"]), json!(["a", "b"]));
		assert_eq!(
			kinds(&differences),
			vec![
				("", DiffKind::ListLengthMismatch),
				("[1]", DiffKind::ListItemMissingInFirst),
			]
		);
		assert_eq!(differences[1].right_value, "b");
		assert_eq!(differences[1].right_type, "str");
	}

	#[test]
	fn test_nested_path_construction() {
		let differences = run(
			json!({"a": {"b": [{"c": 1}]}}),
			json!({"a": {"b": [{"c": 2}]}}),
		);
		assert_eq!(kinds(&differences), vec![("a.b[0].c", DiffKind::ValueMismatch)]);
	}

	#[test]
	fn test_incomparable_arrays_compare_positionally() {
		let differences = run(json!([1, "a"]), json!(["a", 1]));
		assert_eq!(
			kinds(&differences),
			vec![("[0]", DiffKind::TypeMismatch), ("[1]", DiffKind::TypeMismatch)]
		);
	}

	#[test]
	fn test_empty_containers() {
		assert!(run(json!({}), json!({})).is_empty());
		assert!(run(json!({"l": []}), json!({"l": []})).is_empty());
		assert!(run(json!([]), json!([])).is_empty());
	}

	#[test]
	fn test_unicode_strings() {
		assert!(run(json!({"名前": "café ☕"}), json!({"名前": "café ☕"})).is_empty());
		let differences = run(json!({"名前": "café"}), json!({"名前": "cafe"}));
		assert_eq!(kinds(&differences), vec![("名前", DiffKind::ValueMismatch)]);
	}

	#[test]
	fn test_object_records_follow_sorted_key_order() {
		let differences = run(
			json!({"b": 1, "a": 1, "z": 1, "m": {"k": 1}}),
			json!({"y": 1, "x": 1, "m": {"k": 2}, "a": 2}),
		);
		assert_eq!(
			kinds(&differences),
			vec![
				("b", DiffKind::FieldMissingInSecond),
				("z", DiffKind::FieldMissingInSecond),
				("x", DiffKind::FieldMissingInFirst),
				("y", DiffKind::FieldMissingInFirst),
				("a", DiffKind::ValueMismatch),
				("m.k", DiffKind::ValueMismatch),
			]
		);
	}

	#[test]
	fn test_depth_limit() {
		let mut deep = json!(1);
		for _ in 0..10 {
			deep = json!([deep]);
		}
		assert_eq!(nesting_depth(&deep), 10);

		let config = Config {
			max_depth: 5,
			..Config::default()
		};
		let err = Differ::new(&config).diff(&deep, &json!([])).unwrap_err();
		assert!(matches!(err, DiffError::DepthExceeded { depth: 10, limit: 5 }));

		let err = Differ::new(&config).diff(&json!([]), &deep).unwrap_err();
		assert!(matches!(err, DiffError::DepthExceeded { depth: 10, limit: 5 }));
	}

	#[test]
	fn test_nesting_depth() {
		assert_eq!(nesting_depth(&json!(1)), 0);
		assert_eq!(nesting_depth(&json!([])), 1);
		assert_eq!(nesting_depth(&json!({"a": {"b": [1]}})), 3);
	}
}
