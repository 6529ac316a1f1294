// Node records and identifiers
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng, TryRngCore};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// A monitored node as the registry stores it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Serialized as `null` when absent
    pub token: Option<String>,
}

impl NodeRecord {
    /// Build a record from raw form values; a blank token becomes `None`
    pub fn from_form(id: &str, name: &str, url: &str, token: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            token: normalize_token(token),
        }
    }
}

/// Blank or whitespace-only tokens are absent; anything else is kept verbatim
pub fn normalize_token(token: &str) -> Option<String> {
    if token.trim().is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Generates ids for new node records.
///
/// Uses the operating system's secure random source. When that source is
/// unavailable it falls back to a time-seeded PRNG laid out as an RFC 4122
/// version 4 UUID. Fallback ids are unique enough for form records but are
/// NOT cryptographically safe.
#[derive(Debug, Default)]
pub struct IdGenerator {
    fallback: Option<StdRng>,
    force_fallback: bool,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator that never touches the secure source
    pub fn insecure() -> Self {
        Self {
            fallback: None,
            force_fallback: true,
        }
    }

    pub fn generate(&mut self) -> String {
        if !self.force_fallback {
            let mut bytes = [0u8; 16];
            match OsRng.try_fill_bytes(&mut bytes) {
                Ok(()) => return uuid::Builder::from_random_bytes(bytes).into_uuid().to_string(),
                Err(e) => {
                    warn!(target: "modal", error = %e, "Secure random source unavailable, using fallback ids")
                }
            }
        }
        self.generate_fallback()
    }

    fn generate_fallback(&mut self) -> String {
        let rng = self.fallback.get_or_insert_with(|| {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default();
            StdRng::seed_from_u64(nanos ^ u64::from(std::process::id()).rotate_left(32))
        });
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        uuid::Builder::from_random_bytes(bytes).into_uuid().to_string()
    }
}

/// Whether `id` has the shape of a version 4 UUID
pub fn is_v4_layout(id: &str) -> bool {
    Uuid::parse_str(id)
        .map(|u| u.get_version_num() == 4 && u.get_variant() == uuid::Variant::RFC4122)
        .unwrap_or(false)
}
