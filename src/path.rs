//! Locator strings for positions inside a JSON document.
//!
//! Object keys are joined with `.` and array indices are bracketed, so the
//! third element's `c` field under `a.b` reads `a.b[2].c`. The root is `""`.

/// Path of the field `key` inside the object at `path`.
pub fn child_key(path: &str, key: &str) -> String {
	if path.is_empty() {
		key.to_string()
	} else {
		format!("{}.{}", path, key)
	}
}

/// Path of element `index` inside the array at `path`.
pub fn child_index(path: &str, index: usize) -> String {
	format!("{}[{}]", path, index)
}
