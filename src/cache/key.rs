//! Cache fingerprints.

use sha2::{Digest, Sha256};

use crate::types::{ImageAttachment, Provider};

/// Content fingerprint identifying one cacheable static context.
///
/// Two requests share a fingerprint exactly when vendor, model, static part
/// and image attachments all match, so a hit is always safe to reuse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub hash: String,
    pub provider: Provider,
    pub model: String,
}

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}

/// Fingerprint a static context: SHA-256 over vendor, model, static part and
/// each image's identity, with length framing so adjacent fields cannot
/// collide.
pub fn fingerprint(
    provider: Provider,
    model: &str,
    static_part: &str,
    images: &[ImageAttachment],
) -> CacheKey {
    let mut hasher = Sha256::new();
    for field in [provider.as_str(), model, static_part] {
        hasher.update((field.len() as u64).to_be_bytes());
        hasher.update(field.as_bytes());
    }
    for image in images {
        for field in [image.mime_type.as_str(), image.base64_data.as_str()] {
            hasher.update((field.len() as u64).to_be_bytes());
            hasher.update(field.as_bytes());
        }
    }
    let hash = hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();
    CacheKey {
        hash,
        provider,
        model: model.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(data: &str) -> ImageAttachment {
        ImageAttachment::new("image/png", data)
    }

    #[test]
    fn identical_inputs_share_a_fingerprint() {
        let a = fingerprint(Provider::GoogleGemini, "gemini-1.5-pro-002", "ctx", &[image("AA==")]);
        let b = fingerprint(Provider::GoogleGemini, "gemini-1.5-pro-002", "ctx", &[image("AA==")]);
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn any_field_change_changes_the_fingerprint() {
        let base = fingerprint(Provider::GoogleGemini, "gemini-1.5-pro-002", "ctx", &[]);
        let other_model = fingerprint(Provider::GoogleGemini, "gemini-1.5-flash-002", "ctx", &[]);
        let other_part = fingerprint(Provider::GoogleGemini, "gemini-1.5-pro-002", "ctx2", &[]);
        let with_image =
            fingerprint(Provider::GoogleGemini, "gemini-1.5-pro-002", "ctx", &[image("AA==")]);
        assert_ne!(base.hash, other_model.hash);
        assert_ne!(base.hash, other_part.hash);
        assert_ne!(base.hash, with_image.hash);
    }

    #[test]
    fn field_boundaries_are_framed() {
        // "ab" + "c" must not collide with "a" + "bc".
        let left = fingerprint(Provider::Anthropic, "ab", "c", &[]);
        let right = fingerprint(Provider::Anthropic, "a", "bc", &[]);
        assert_ne!(left.hash, right.hash);
    }
}
