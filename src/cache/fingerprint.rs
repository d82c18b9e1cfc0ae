//! Request fingerprints.
//!
//! A fingerprint is the SHA-256 digest of the method, the path and the query
//! parameters serialized as a JSON object with sorted keys. It never depends
//! on the body or on object identity.

use std::collections::BTreeMap;
use std::fmt;

use sha2::{Digest, Sha256};

use crate::http::request::RawRequest;

/// Stable cache key for a request shape.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(request: &RawRequest) -> Self {
        Self::compute(request.method(), request.path(), request.query())
    }

    pub fn compute(method: &str, path: &str, query: &[(String, String)]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(method.as_bytes());
        hasher.update([0]);
        hasher.update(path.as_bytes());
        hasher.update([0]);
        hasher.update(canonical_query(query).as_bytes());
        Self(hasher.finalize().into())
    }
}

/// Query parameters as a JSON object with keys in sorted order. Repeated
/// keys keep their values in arrival order.
fn canonical_query(query: &[(String, String)]) -> String {
    let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (key, value) in query {
        grouped.entry(key.as_str()).or_default().push(value.as_str());
    }
    serde_json::to_string(&grouped).unwrap_or_default()
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self)
    }
}
