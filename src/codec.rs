//! Reversible payload transform for the durable file tier.
//!
//! The durable tier stores its entry files base64-encoded rather than as
//! plain JSON. The transform is obfuscation only: reversible text
//! encoding, not compression and not encryption. Callers must not rely
//! on it for size or confidentiality.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::StoreError;

/// Encode serialized entry text for storage.
pub fn obfuscate(plain: &str) -> String {
    STANDARD.encode(plain.as_bytes())
}

/// Reverse [`obfuscate`]. Anything that is not base64 over UTF-8 text
/// fails, which the read path treats as a corrupt entry.
pub fn deobfuscate(stored: &str) -> Result<String, StoreError> {
    let bytes = STANDARD.decode(stored.trim().as_bytes())?;
    Ok(String::from_utf8(bytes)?)
}
