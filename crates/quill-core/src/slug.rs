//! Slug derivation for post URLs.
//!
//! Slugs are non-empty identifiers composed of lowercase ASCII letters,
//! digits, and hyphens, derived from the post title. Collisions are resolved
//! by the post store with a numeric suffix.

/// Upper bound on numeric suffix attempts when resolving a slug collision.
pub const SLUG_SUFFIX_LIMIT: u32 = 100;

/// Derive a URL-safe slug from a title.
///
/// ASCII alphanumeric runs are lowercased and joined with single hyphens;
/// every other character acts as a separator. A title with no such content
/// falls back to `"post"` so the slug is never empty.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if slug.is_empty() {
        slug.push_str("post");
    }
    slug
}

/// Return `true` when `value` is a well-formed slug.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
        && !value.starts_with('-')
        && !value.ends_with('-')
}
