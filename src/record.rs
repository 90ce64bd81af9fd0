//! Difference records produced by the comparison engine.

use crate::canonical::canonical_text;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Display value for a field that exists on only one side.
pub const FIELD_DOES_NOT_EXIST: &str = "FIELD_DOES_NOT_EXIST";
/// Display value for a list item that exists on only one side.
pub const ITEM_DOES_NOT_EXIST: &str = "ITEM_DOES_NOT_EXIST";
/// Type name reported for an absent side.
pub const NOT_APPLICABLE: &str = "N/A";

/// Runtime kind of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
	Null,
	Bool,
	Int,
	Float,
	Str,
	List,
	Dict,
}

impl ValueKind {
	pub fn of(value: &Value) -> Self {
		match value {
			Value::Null => ValueKind::Null,
			Value::Bool(_) => ValueKind::Bool,
			Value::Number(n) if n.is_f64() => ValueKind::Float,
			Value::Number(_) => ValueKind::Int,
			Value::String(_) => ValueKind::Str,
			Value::Array(_) => ValueKind::List,
			Value::Object(_) => ValueKind::Dict,
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			ValueKind::Null => "null",
			ValueKind::Bool => "bool",
			ValueKind::Int => "int",
			ValueKind::Float => "float",
			ValueKind::Str => "str",
			ValueKind::List => "list",
			ValueKind::Dict => "dict",
		}
	}

	/// Whether two kinds can be compared by value. Integers and floats are
	/// one numeric kind; booleans are never numeric.
	pub fn is_compatible(self, other: ValueKind) -> bool {
		(self.is_numeric() && other.is_numeric()) || self == other
	}

	fn is_numeric(self) -> bool {
		matches!(self, ValueKind::Int | ValueKind::Float)
	}
}

impl fmt::Display for ValueKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Category of a reported divergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffKind {
	TypeMismatch,
	ValueMismatch,
	ListLengthMismatch,
	ListItemMissingInFirst,
	ListItemMissingInSecond,
	FieldMissingInFirst,
	FieldMissingInSecond,
}

impl DiffKind {
	pub const ALL: [DiffKind; 7] = [
		DiffKind::TypeMismatch,
		DiffKind::ValueMismatch,
		DiffKind::ListLengthMismatch,
		DiffKind::ListItemMissingInFirst,
		DiffKind::ListItemMissingInSecond,
		DiffKind::FieldMissingInFirst,
		DiffKind::FieldMissingInSecond,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			DiffKind::TypeMismatch => "TYPE_MISMATCH",
			DiffKind::ValueMismatch => "VALUE_MISMATCH",
			DiffKind::ListLengthMismatch => "LIST_LENGTH_MISMATCH",
			DiffKind::ListItemMissingInFirst => "LIST_ITEM_MISSING_IN_FIRST",
			DiffKind::ListItemMissingInSecond => "LIST_ITEM_MISSING_IN_SECOND",
			DiffKind::FieldMissingInFirst => "FIELD_MISSING_IN_FIRST",
			DiffKind::FieldMissingInSecond => "FIELD_MISSING_IN_SECOND",
		}
	}
}

impl fmt::Display for DiffKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One divergence between the first and second document.
///
/// Field order is the column order of the CSV report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difference {
	pub path: String,
	pub kind: DiffKind,
	pub left_value: String,
	pub left_type: String,
	pub right_value: String,
	pub right_type: String,
	pub detail: String,
}

impl Difference {
	/// Both sides present with incompatible kinds.
	pub fn type_mismatch(path: &str, left: &Value, right: &Value) -> Self {
		let (left_kind, right_kind) = (ValueKind::of(left), ValueKind::of(right));
		Self {
			path: path.to_string(),
			kind: DiffKind::TypeMismatch,
			left_value: display_value(left),
			left_type: left_kind.to_string(),
			right_value: display_value(right),
			right_type: right_kind.to_string(),
			detail: format!("Different types: {} vs {}", left_kind, right_kind),
		}
	}

	/// Both sides present with compatible kinds but unequal values.
	pub fn value_mismatch(path: &str, left: &Value, right: &Value) -> Self {
		let (left_value, right_value) = (display_value(left), display_value(right));
		Self {
			path: path.to_string(),
			kind: DiffKind::ValueMismatch,
			detail: format!("Different values: {} vs {}", left_value, right_value),
			left_value,
			left_type: ValueKind::of(left).to_string(),
			right_value,
			right_type: ValueKind::of(right).to_string(),
		}
	}

	pub fn list_length_mismatch(path: &str, left_len: usize, right_len: usize) -> Self {
		Self {
			path: path.to_string(),
			kind: DiffKind::ListLengthMismatch,
			left_value: format!("List with {} items", left_len),
			left_type: ValueKind::List.to_string(),
			right_value: format!("List with {} items", right_len),
			right_type: ValueKind::List.to_string(),
			detail: format!("Different item counts: {} vs {}", left_len, right_len),
		}
	}

	/// A list item present only in the first document.
	pub fn item_missing_in_second(path: &str, left: &Value) -> Self {
		Self {
			path: path.to_string(),
			kind: DiffKind::ListItemMissingInSecond,
			left_value: display_value(left),
			left_type: ValueKind::of(left).to_string(),
			right_value: ITEM_DOES_NOT_EXIST.to_string(),
			right_type: NOT_APPLICABLE.to_string(),
			detail: "Item exists in the first document but not in the second".to_string(),
		}
	}

	/// A list item present only in the second document.
	pub fn item_missing_in_first(path: &str, right: &Value) -> Self {
		Self {
			path: path.to_string(),
			kind: DiffKind::ListItemMissingInFirst,
			left_value: ITEM_DOES_NOT_EXIST.to_string(),
			left_type: NOT_APPLICABLE.to_string(),
			right_value: display_value(right),
			right_type: ValueKind::of(right).to_string(),
			detail: "Item exists in the second document but not in the first".to_string(),
		}
	}

	/// An object field present only in the first document.
	pub fn field_missing_in_second(path: &str, left: &Value) -> Self {
		Self {
			path: path.to_string(),
			kind: DiffKind::FieldMissingInSecond,
			left_value: display_value(left),
			left_type: ValueKind::of(left).to_string(),
			right_value: FIELD_DOES_NOT_EXIST.to_string(),
			right_type: NOT_APPLICABLE.to_string(),
			detail: "Field exists in the first document but not in the second".to_string(),
		}
	}

	/// An object field present only in the second document.
	pub fn field_missing_in_first(path: &str, right: &Value) -> Self {
		Self {
			path: path.to_string(),
			kind: DiffKind::FieldMissingInFirst,
			left_value: FIELD_DOES_NOT_EXIST.to_string(),
			left_type: NOT_APPLICABLE.to_string(),
			right_value: display_value(right),
			right_type: ValueKind::of(right).to_string(),
			detail: "Field exists in the second document but not in the first".to_string(),
		}
	}
}

/// Textual form of a value for reports.
///
/// Strings appear without quotes; arrays and objects as canonical compact JSON.
pub fn display_value(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		Value::Array(_) | Value::Object(_) => canonical_text(value),
		scalar => scalar.to_string(),
	}
}
