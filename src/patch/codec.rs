//! Merge-patch codec.
//!
//! Encodes documents to bytes and back, computes merge-patch deltas between
//! two encoded snapshots, and folds a delta into a document. Semantics follow
//! JSON merge patch: objects are diffed key by key and recursively, a key
//! missing on the modified side becomes an explicit `null`, and every other
//! value (arrays included) is replaced wholesale.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{PatchError, Result};

/// Codec for merge-patch documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatchCodec;

impl PatchCodec {
    /// Creates a new codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Serializes a document to bytes.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the value cannot be encoded.
    pub fn serialize<T: Serialize + ?Sized>(&self, obj: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(obj).map_err(|e| PatchError::from(e).into())
    }

    /// Decodes bytes back into a document.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the bytes are not a valid document.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<Value> {
        serde_json::from_slice(bytes).map_err(|e| PatchError::from(e).into())
    }

    /// Computes the merge-patch delta turning `original` into `modified`.
    ///
    /// Both snapshots must encode objects.
    ///
    /// # Errors
    ///
    /// Returns an error if either snapshot is not an encoded object.
    pub fn diff(&self, original: &[u8], modified: &[u8]) -> Result<Value> {
        let original = self.deserialize(original)?;
        let modified = self.deserialize(modified)?;

        let (Value::Object(original), Value::Object(modified)) = (&original, &modified) else {
            let found = if original.is_object() { &modified } else { &original };
            return Err(PatchError::InvalidDocument {
                found: value_kind(found),
            }
            .into());
        };

        Ok(Value::Object(diff_objects(original, modified)))
    }

    /// Folds a merge-patch delta into a document.
    ///
    /// A `null` in the delta removes the key; removing an absent key is a
    /// no-op. A non-object delta replaces the document.
    #[must_use]
    pub fn fold_apply(&self, mut obj: Value, delta: &Value) -> Value {
        merge_into(&mut obj, delta);
        obj
    }
}

/// Recursive object diff.
fn diff_objects(original: &Map<String, Value>, modified: &Map<String, Value>) -> Map<String, Value> {
    let mut delta = Map::new();

    for (key, new_value) in modified {
        match original.get(key) {
            None => {
                delta.insert(key.clone(), new_value.clone());
            }
            Some(Value::Object(old_map)) => {
                if let Value::Object(new_map) = new_value {
                    let nested = diff_objects(old_map, new_map);
                    if !nested.is_empty() {
                        delta.insert(key.clone(), Value::Object(nested));
                    }
                } else {
                    delta.insert(key.clone(), new_value.clone());
                }
            }
            Some(old_value) => {
                if old_value != new_value {
                    delta.insert(key.clone(), new_value.clone());
                }
            }
        }
    }

    for key in original.keys() {
        if !modified.contains_key(key) {
            delta.insert(key.clone(), Value::Null);
        }
    }

    delta
}

/// Applies `patch` onto `target` in place.
fn merge_into(target: &mut Value, patch: &Value) {
    let Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }

    if let Value::Object(target_map) = target {
        for (key, value) in patch_map {
            if value.is_null() {
                target_map.remove(key);
            } else {
                merge_into(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

/// Human-readable kind of a JSON value.
const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn diff(a: &Value, b: &Value) -> Value {
        let codec = PatchCodec::new();
        codec
            .diff(
                &codec.serialize(a).expect("encode"),
                &codec.serialize(b).expect("encode"),
            )
            .expect("diff")
    }

    #[test]
    fn test_diff_marks_removed_keys_null() {
        let delta = diff(
            &json!({"a": 1, "b": {"c": 2, "d": 3}}),
            &json!({"a": 1, "b": {"c": 2}}),
        );

        assert_eq!(delta, json!({"b": {"d": null}}));
    }

    #[test]
    fn test_diff_replaces_arrays_wholesale() {
        let delta = diff(
            &json!({"ports": [80, 443], "name": "svc"}),
            &json!({"ports": [80], "name": "svc"}),
        );

        assert_eq!(delta, json!({"ports": [80]}));
    }

    #[test]
    fn test_diff_type_change_replaces_value() {
        let delta = diff(&json!({"spec": {"a": 1}}), &json!({"spec": "none"}));
        assert_eq!(delta, json!({"spec": "none"}));
    }

    #[test]
    fn test_diff_equal_documents_is_empty() {
        let doc = json!({"a": [1, {"b": 2}], "c": {"d": null}});
        assert_eq!(diff(&doc, &doc), json!({}));
    }

    #[test]
    fn test_diff_rejects_non_objects() {
        let codec = PatchCodec::new();
        let err = codec.diff(b"[1]", b"{}").unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_diff_rejects_malformed_bytes() {
        let codec = PatchCodec::new();
        assert!(codec.diff(b"{", b"{}").is_err());
    }

    #[test]
    fn test_fold_apply_merge_semantics() {
        let codec = PatchCodec::new();
        let folded = codec.fold_apply(
            json!({"a": 1, "b": {"c": 2, "d": 3}, "e": [1, 2]}),
            &json!({"a": null, "b": {"d": 4, "x": null}, "e": [3], "f": {"g": null, "h": 1}}),
        );

        assert_eq!(folded, json!({"b": {"c": 2, "d": 4}, "e": [3], "f": {"h": 1}}));
    }

    #[test]
    fn test_fold_apply_of_diff_reaches_target() {
        let codec = PatchCodec::new();
        let from = json!({"a": 1, "b": {"c": [1], "d": "x"}, "gone": true});
        let to = json!({"a": 2, "b": {"c": [2, 3]}, "new": {"k": "v"}});

        let delta = diff(&from, &to);
        assert_eq!(codec.fold_apply(from, &delta), to);
    }
}
