//! Positive merge-patch generation.
//!
//! A plain merge-patch diff of live vs desired emits `null` for every field
//! the live object carries and the desired manifest does not. Many of those
//! were filled in by the server after an earlier replace (defaults, status,
//! bookkeeping metadata) and are not owned by the deployer. The generator
//! produces a patch that only adds or updates fields:
//!
//! 1. diff the encoded live and desired snapshots into a raw delta
//! 2. fold the raw delta into a copy of the desired document, which drops
//!    every deletion marker that only exists because desired never named
//!    the field
//! 3. merge that candidate over the live snapshot and diff again
//!
//! The resulting patch leaves untouched every live field the desired
//! document does not mention. It cannot express "stop setting a field the
//! manifest used to set": that case collapses into "leave untouched".

use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::resource::Resource;

use super::codec::PatchCodec;
use super::Patch;

/// Generator for positive merge patches.
#[derive(Debug, Default, Clone, Copy)]
pub struct PositivePatchGenerator {
    codec: PatchCodec,
}

impl PositivePatchGenerator {
    /// Creates a new generator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            codec: PatchCodec::new(),
        }
    }

    /// Computes the positive patch from a live resource to a desired one.
    ///
    /// Neither input is modified.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if either resource cannot be encoded.
    pub fn compute_patch(&self, from: &Resource, to: &Resource) -> Result<Patch> {
        let delta = self.compute_delta(&from.to_value()?, &to.to_value()?)?;
        Ok(Patch::merge(delta))
    }

    /// Computes the positive delta between two documents.
    ///
    /// # Errors
    ///
    /// Returns an error if either document is not an object.
    pub fn compute_delta(&self, from: &Value, to: &Value) -> Result<Value> {
        let live = self.codec.serialize(from)?;
        let desired = self.codec.serialize(to)?;

        let raw = self.codec.diff(&live, &desired)?;

        let candidate = self.codec.fold_apply(to.clone(), &raw);
        let candidate = self.codec.serialize(&candidate)?;

        let merged = self
            .codec
            .fold_apply(self.codec.deserialize(&live)?, &self.codec.deserialize(&candidate)?);
        let merged = self.codec.serialize(&merged)?;

        let delta = self.codec.diff(&live, &merged)?;
        debug!(
            raw_keys = count_keys(&raw),
            positive_keys = count_keys(&delta),
            "Computed positive patch"
        );
        Ok(delta)
    }

    /// Computes the plain merge-patch delta, deletions included.
    ///
    /// # Errors
    ///
    /// Returns an error if either document is not an object.
    pub fn naive_delta(&self, from: &Value, to: &Value) -> Result<Value> {
        self.codec
            .diff(&self.codec.serialize(from)?, &self.codec.serialize(to)?)
    }
}

/// Number of leaf entries in a delta.
fn count_keys(delta: &Value) -> usize {
    match delta {
        Value::Object(map) => map
            .values()
            .map(|v| if v.is_object() { count_keys(v) } else { 1 })
            .sum(),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn positive(from: &Value, to: &Value) -> Value {
        PositivePatchGenerator::new()
            .compute_delta(from, to)
            .expect("delta")
    }

    fn apply(target: &Value, delta: &Value) -> Value {
        PatchCodec::new().fold_apply(target.clone(), delta)
    }

    /// True if every field `expected` sets has the same value in `actual`.
    fn covers(actual: &Value, expected: &Value) -> bool {
        match (actual, expected) {
            (Value::Object(a), Value::Object(e)) => e.iter().all(|(k, v)| {
                if v.is_null() {
                    return true;
                }
                a.get(k).is_some_and(|av| covers(av, v))
            }),
            _ => actual == expected,
        }
    }

    fn cases() -> Vec<(Value, Value)> {
        vec![
            (
                json!({"name": "svc", "replicas": 3, "status": {"observedGeneration": 5}}),
                json!({"name": "svc", "replicas": 5}),
            ),
            (
                json!({"spec": {"template": {"image": "a:1", "pullPolicy": "IfNotPresent"}}, "ports": [80]}),
                json!({"spec": {"template": {"image": "a:2"}}, "ports": [80, 443]}),
            ),
            (
                json!({"metadata": {"name": "x", "uid": "u-1", "labels": {"app": "x"}}}),
                json!({"metadata": {"name": "x", "labels": {"app": "y", "tier": "web"}}}),
            ),
            (
                json!({"spec": {"mode": {"a": 1}}}),
                json!({"spec": {"mode": "flat"}, "extra": {"deep": {"k": [1, 2]}}}),
            ),
            (json!({}), json!({"a": {"b": {"c": 1}}})),
        ]
    }

    #[test]
    fn test_defaulted_field_is_not_deleted() {
        let delta = positive(
            &json!({"name": "svc", "replicas": 3, "status": {"observedGeneration": 5}}),
            &json!({"name": "svc", "replicas": 5}),
        );

        assert_eq!(delta, json!({"replicas": 5}));
    }

    #[test]
    fn test_naive_delta_would_delete() {
        let delta = PositivePatchGenerator::new()
            .naive_delta(
                &json!({"name": "svc", "replicas": 3, "status": {"observedGeneration": 5}}),
                &json!({"name": "svc", "replicas": 5}),
            )
            .expect("delta");

        assert_eq!(delta, json!({"replicas": 5, "status": null}));
    }

    #[test]
    fn test_explicit_null_cannot_delete() {
        let delta = positive(&json!({"a": 1, "b": 2}), &json!({"a": 1, "b": null}));
        assert_eq!(delta, json!({}));
    }

    #[test]
    fn test_nested_defaults_survive() {
        let delta = positive(
            &json!({"spec": {"template": {"image": "a:1", "pullPolicy": "IfNotPresent"}}}),
            &json!({"spec": {"template": {"image": "a:2"}}}),
        );

        assert_eq!(delta, json!({"spec": {"template": {"image": "a:2"}}}));
    }

    #[test]
    fn test_positivity() {
        for (live, desired) in cases() {
            let patched = apply(&live, &positive(&live, &desired));
            let (Value::Object(live_map), Value::Object(patched_map)) = (&live, &patched) else {
                panic!("documents must be objects");
            };
            for key in live_map.keys() {
                assert!(patched_map.contains_key(key), "{key} removed from {live}");
            }
        }
    }

    #[test]
    fn test_coverage() {
        for (live, desired) in cases() {
            let patched = apply(&live, &positive(&live, &desired));
            assert!(covers(&patched, &desired), "{patched} does not cover {desired}");
        }
    }

    #[test]
    fn test_idempotence() {
        for (live, desired) in cases() {
            let once = apply(&live, &positive(&live, &desired));
            let second = positive(&once, &desired);
            let twice = apply(&once, &second);

            assert_eq!(second, json!({}));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_subset_is_noop() {
        let live = json!({"name": "svc", "replicas": 3, "spec": {"a": 1, "b": [1]}, "status": {"ok": true}});
        let desired = json!({"name": "svc", "spec": {"b": [1]}});

        assert_eq!(positive(&live, &desired), json!({}));
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let live = json!({"a": 1, "b": 2});
        let desired = json!({"a": 3});
        let (live_before, desired_before) = (live.clone(), desired.clone());

        let _ = positive(&live, &desired);

        assert_eq!(live, live_before);
        assert_eq!(desired, desired_before);
    }

    #[test]
    fn test_compute_patch_on_resources() {
        let live = Resource::new("apps/v1", "Deployment", Some("default"), "svc")
            .with_field("spec", json!({"replicas": 3, "revisionHistoryLimit": 10}))
            .with_field("status", json!({"observedGeneration": 5}));
        let desired = Resource::new("apps/v1", "Deployment", Some("default"), "svc")
            .with_field("spec", json!({"replicas": 5}));

        let patch = PositivePatchGenerator::new()
            .compute_patch(&live, &desired)
            .expect("patch");

        assert_eq!(patch.data(), &json!({"spec": {"replicas": 5}}));
    }
}
