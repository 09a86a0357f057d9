//! Uploaded images turned into self-contained `data:` URLs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;

/// Media type used when the upload didn't declare one.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// An uploaded binary payload and its declared media type.
///
/// Size and type limits are enforced by the upload layer before an `Asset`
/// is built; the bytes are taken as-is.
#[derive(Clone, PartialEq, Eq)]
pub struct Asset {
    bytes: Vec<u8>,
    media_type: String,
}

impl Asset {
    /// A blank or missing media type falls back to [`DEFAULT_MEDIA_TYPE`].
    pub fn new(bytes: impl Into<Vec<u8>>, media_type: Option<&str>) -> Self {
        let media_type = media_type
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MEDIA_TYPE)
            .to_string();
        Self {
            bytes: bytes.into(),
            media_type,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:<media type>;base64,<payload>`.
    pub fn inline_reference(&self) -> String {
        let payload = STANDARD.encode(&self.bytes);
        let mut reference = String::with_capacity(self.media_type.len() + payload.len() + 13);
        reference.push_str("data:");
        reference.push_str(&self.media_type);
        reference.push_str(";base64,");
        reference.push_str(&payload);
        reference
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The inline reference for an optional asset; the empty string when absent.
pub fn encode(asset: Option<&Asset>) -> String {
    asset.map(Asset::inline_reference).unwrap_or_default()
}

/// Splits a base64 `data:` URL back into its media type and bytes.
///
/// Returns `None` for anything `encode` would not have produced.
pub fn decode_inline_reference(reference: &str) -> Option<(String, Vec<u8>)> {
    let rest = reference.strip_prefix("data:")?;
    let (media_type, payload) = rest.split_once(";base64,")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((media_type.to_string(), bytes))
}
