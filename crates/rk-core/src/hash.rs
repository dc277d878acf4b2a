//! Canonical JSON normalization and content hashing.
//!
//! The engine keys every interned entity (conditions, condition sets,
//! candidate values, decisions) by the hash of its canonical JSON form.
//! Canonicalization sorts object keys lexicographically, drops
//! insignificant whitespace, and renders numbers in their shortest
//! round-trip form — the same value always normalizes to the same bytes
//! regardless of how it was constructed.

use serde_json::Value;
use std::fmt::Write as _;

/// Produces a canonical byte encoding of a [`serde_json::Value`].
///
/// `hash(a) == hash(b)` iff `normalize(a) == normalize(b)`, and
/// normalization is idempotent: `normalize(normalize(x)) == normalize(x)`.
pub trait Normalizer {
    /// Render `value` into its canonical byte encoding.
    fn normalize(&self, value: &Value) -> Vec<u8>;
}

/// The engine's single canonical normalizer: sorted object keys, no
/// insignificant whitespace, `serde_json`'s shortest round-trip number
/// formatting.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalNormalizer;

impl Normalizer for CanonicalNormalizer {
    fn normalize(&self, value: &Value) -> Vec<u8> {
        let mut out = String::new();
        write_canonical(value, &mut out);
        out.into_bytes()
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Value::String(s) => write_canonical_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical_string(key, out);
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
    }
}

fn write_canonical_string(s: &str, out: &mut String) {
    // serde_json's string escaping matches canonical JSON requirements
    // (control chars escaped, `"` and `\` escaped); reuse it rather than
    // hand-rolling an escaper.
    let encoded = serde_json::to_string(s).expect("string serialization is infallible");
    out.push_str(&encoded);
}

/// Computes a content hash over the canonical encoding of a JSON value.
pub trait Hasher {
    /// Hash `value`'s canonical form, returning a lowercase hex string.
    fn hash_value(&self, normalizer: &dyn Normalizer, value: &Value) -> String;

    /// Hash raw bytes directly (used for hashing already-canonicalized
    /// token strings, e.g. condition-set keys).
    fn hash_bytes(&self, bytes: &[u8]) -> String;
}

/// Default content hasher: CRC32 of the canonical encoding, rendered as
/// lowercase hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32Hasher;

impl Hasher for Crc32Hasher {
    fn hash_value(&self, normalizer: &dyn Normalizer, value: &Value) -> String {
        let bytes = normalizer.normalize(value);
        self.hash_bytes(&bytes)
    }

    fn hash_bytes(&self, bytes: &[u8]) -> String {
        let checksum = crc32fast::hash(bytes);
        format!("{checksum:08x}")
    }
}

/// Alternate content hasher using SHA-256, for deployments that want a
/// cryptographically strong key at the cost of a longer hex string.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn hash_value(&self, normalizer: &dyn Normalizer, value: &Value) -> String {
        let bytes = normalizer.normalize(value);
        self.hash_bytes(&bytes)
    }

    fn hash_bytes(&self, bytes: &[u8]) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hasher.finalize();
        let mut s = String::with_capacity(digest.len() * 2);
        for byte in digest {
            let _ = write!(s, "{byte:02x}");
        }
        s
    }
}

/// Convenience: hash a value with the default normalizer and hasher.
#[must_use]
pub fn default_hash(value: &Value) -> String {
    Crc32Hasher.hash_value(&CanonicalNormalizer, value)
}

/// Convenience: hash pre-joined canonical token bytes with the default hasher.
#[must_use]
pub fn default_hash_bytes(bytes: &[u8]) -> String {
    Crc32Hasher.hash_bytes(bytes)
}
