use crate::config::Lang;

/// Cache key for translated chunks.
///
/// Keys are opaque MD5 hashes of the normalized source text plus both
/// language tags, ensuring:
/// - Whitespace and case variants of the same text collapse to one entry
/// - The same text cached for two target languages never collides
/// - Keys are fixed-length (32 hex chars) for consistent storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    hash: String,
}

impl CacheKey {
    pub fn new(text: &str, source_lang: &Lang, target_lang: &Lang) -> Self {
        // Trim and case-fold before hashing so formatting differences
        // share a single entry.
        let normalized = text.trim().to_lowercase();

        // Null-byte separators prevent collisions between inputs like
        // ("a", "bc") and ("ab", "c").
        let combined = format!(
            "{}\0{}\0{}",
            normalized,
            source_lang.as_str(),
            target_lang.as_str()
        );

        Self {
            hash: format!("{:x}", md5::compute(combined.as_bytes())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str, src: &str, tgt: &str) -> CacheKey {
        CacheKey::new(text, &Lang::new(src), &Lang::new(tgt))
    }

    #[test]
    fn test_cache_key_is_fixed_length_hash() {
        let k = key("Hello world", "en", "es");
        assert_eq!(k.to_string().len(), 32);
        assert!(k.to_string().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_cache_key_differs_by_content() {
        assert_ne!(key("Hello", "en", "es"), key("World", "en", "es"));
    }

    #[test]
    fn test_cache_key_differs_by_target_language() {
        assert_ne!(key("Hello", "en", "es"), key("Hello", "en", "fr"));
    }

    #[test]
    fn test_cache_key_differs_by_source_language() {
        assert_ne!(key("Hello", "en", "es"), key("Hello", "auto", "es"));
    }

    #[test]
    fn test_cache_key_same_inputs_same_key() {
        assert_eq!(key("Hello", "en", "es"), key("Hello", "en", "es"));
    }

    #[test]
    fn test_cache_key_normalizes_whitespace_and_case() {
        assert_eq!(key("  Hello World  ", "en", "es"), key("hello world", "en", "es"));
    }

    #[test]
    fn test_cache_key_separator_prevents_field_bleed() {
        // Text ending in a language tag must not collide with the tag itself
        assert_ne!(key("hello en", "en", "es"), key("hello", "en en", "es"));
    }
}
