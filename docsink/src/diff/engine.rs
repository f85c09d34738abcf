use std::collections::BTreeSet;

use regex::Regex;
use serde_json::Value;

use crate::types::Document;

/// The structural difference between two document trees.
///
/// `from` and `to` each hold only the keys that differ, recursively. Both
/// are empty when the trees are identical after ignore-pattern removal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentDiff {
    /// The differing keys with their old values.
    pub from: Document,
    /// The differing keys with their new values.
    pub to: Document,
}

impl DocumentDiff {
    /// Whether neither side recorded a difference.
    pub fn is_empty(&self) -> bool {
        self.from.is_empty() && self.to.is_empty()
    }
}

/// Computes the recursive structural difference between two documents.
///
/// Walks the union of keys on both sides. A key matching any ignore pattern
/// (tested against the bare key name, not the path) never appears in the
/// result. Nested objects on both sides recurse; the nested diff is recorded
/// structurally under the key only when non-empty. Any other value pair,
/// including type mismatches, is compared for equality. Pure and
/// independent of key iteration order.
pub fn diff_documents(old: &Document, new: &Document, ignore: &[Regex]) -> DocumentDiff {
    let mut diff = DocumentDiff::default();

    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    for key in keys {
        if ignore.iter().any(|pattern| pattern.is_match(key)) {
            continue;
        }

        match (old.get(key.as_str()), new.get(key.as_str())) {
            (Some(Value::Object(old_inner)), Some(Value::Object(new_inner))) => {
                let nested = diff_documents(old_inner, new_inner, ignore);
                if !nested.is_empty() {
                    diff.from.insert(key.clone(), Value::Object(nested.from));
                    diff.to.insert(key.clone(), Value::Object(nested.to));
                }
            }
            (Some(old_value), Some(new_value)) => {
                if old_value != new_value {
                    diff.from.insert(key.clone(), old_value.clone());
                    diff.to.insert(key.clone(), new_value.clone());
                }
            }
            (Some(old_value), None) => {
                diff.from.insert(key.clone(), old_value.clone());
            }
            (None, Some(new_value)) => {
                diff.to.insert(key.clone(), new_value.clone());
            }
            (None, None) => {}
        }
    }

    diff
}
