//! Package slug validation.
//!
//! The slug becomes a store key segment, a URL path segment and a top-level
//! archive folder, so it must be a single plain name.

use crate::error::WorkerError;

const SLUG_MAX: usize = 200;

/// Returns the slug unchanged if it is safe to use, else `InvalidSlug`.
///
/// Rejects empty names, `.`/`..`, separators (`/`, `\`), whitespace and
/// control characters, and names longer than 200 bytes.
pub fn validate_slug(slug: &str) -> Result<&str, WorkerError> {
    let bad = slug.is_empty()
        || slug.len() > SLUG_MAX
        || slug == "."
        || slug == ".."
        || slug
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control());
    if bad {
        return Err(WorkerError::InvalidSlug(slug.to_string()));
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plugin_style_slugs() {
        assert!(validate_slug("akismet").is_ok());
        assert!(validate_slug("wp-super-cache").is_ok());
        assert!(validate_slug("contact_form.7").is_ok());
    }

    #[test]
    fn rejects_traversal_and_separators() {
        assert!(validate_slug("").is_err());
        assert!(validate_slug("..").is_err());
        assert!(validate_slug("a/b").is_err());
        assert!(validate_slug("a\\b").is_err());
        assert!(validate_slug("has space").is_err());
        assert!(validate_slug("nul\0").is_err());
    }

    #[test]
    fn rejects_overlong() {
        let long = "x".repeat(SLUG_MAX + 1);
        assert!(validate_slug(&long).is_err());
    }
}
