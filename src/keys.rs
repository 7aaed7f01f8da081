//! Deterministic cache-key construction.
//!
//! Call sites that cache the same semantic request must agree on the key
//! byte for byte, so keys are built here instead of formatted ad hoc.
//! Structured payloads (filters, query parameters) are digested into a
//! fixed-width segment; arbitrary serializable types therefore cannot
//! produce unbounded or filesystem-hostile keys.

use std::fmt::Display;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Hex characters kept from a digested segment.
const DIGEST_LEN: usize = 16;

/// Builds hierarchical keys of the form `domain:segment:...`.
#[derive(Debug)]
pub struct KeyBuilder {
    segments: Vec<String>,
}

impl KeyBuilder {
    pub fn new(domain: &str) -> Self {
        Self {
            segments: vec![domain.to_string()],
        }
    }

    /// Append a plain segment.
    pub fn segment(mut self, part: impl Display) -> Self {
        self.segments.push(part.to_string());
        self
    }

    /// Append a digest of a serializable payload.
    ///
    /// A payload that fails to serialize digests its error text instead,
    /// keeping the builder infallible; such a key still only ever equals
    /// itself.
    pub fn digest<F: Serialize>(mut self, payload: &F) -> Self {
        let canonical = match serde_json::to_string(payload) {
            Ok(json) => json,
            Err(err) => format!("!serialize:{err}"),
        };
        let digest = hex::encode(Sha256::digest(canonical.as_bytes()));
        self.segments.push(digest[..DIGEST_LEN].to_string());
        self
    }

    pub fn build(self) -> String {
        self.segments.join(":")
    }
}

/// Key for a single entity: `domain:id`.
pub fn entity_key(domain: &str, id: impl Display) -> String {
    KeyBuilder::new(domain).segment(id).build()
}

/// Key for a filtered listing: `domain:list:<digest>`.
pub fn listing_key<F: Serialize>(domain: &str, filters: &F) -> String {
    KeyBuilder::new(domain).segment("list").digest(filters).build()
}
