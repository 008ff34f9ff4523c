//! Fingerprint computation for alert identity.
//!
//! Resolves Open Question 1: a stable deterministic hash over sorted label
//! pairs is required; this implementation picks SHA-256 over the teacher's
//! own `compute_fingerprint` construction (field=value; concatenation, hex
//! output). Fingerprints produced here are not guaranteed to match any
//! legacy MD5- or FNV64a-based implementation.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

/// Compute a stable fingerprint over a label set.
///
/// `labels` is sorted by key (a `BTreeMap` already iterates in key order),
/// so the result is independent of insertion order. Equal label sets always
/// produce equal fingerprints and vice versa.
#[must_use]
pub fn fingerprint_labels(labels: &BTreeMap<String, String>) -> String {
    let mut hasher = Sha256::new();
    for (name, value) in labels {
        hasher.update(name.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
        hasher.update(b";");
    }
    hex::encode(hasher.finalize())
}
