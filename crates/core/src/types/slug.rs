//! Slug derivation.
//!
//! A slug is the URL-safe form of a display name. Products and tags share the
//! same normalization:
//!
//! 1. lowercase
//! 2. drop every character outside `[a-z0-9]`, whitespace and `-`
//! 3. turn whitespace runs into a single `-`
//! 4. collapse repeated `-`
//! 5. trim leading and trailing `-`
//!
//! ```
//! use myngo_core::slugify;
//!
//! assert_eq!(slugify("Honey Jar"), "honey-jar");
//! assert_eq!(slugify("  Fresh -- Eggs! "), "fresh-eggs");
//! ```

/// Derive a slug from a display name.
///
/// The result may be empty when the input contains no ASCII letters or digits.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());

    for c in input.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if (c == '-' || c.is_whitespace()) && !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// Candidate slugs for owner-scoped uniqueness.
///
/// Yields `base`, then `base-1`, `base-2`, ... forever. The first candidate not
/// already taken wins; gaps left by deleted rows are not reused ahead of the
/// base itself, the search is strictly first-fit in this order.
///
/// ```
/// use myngo_core::SlugCandidates;
///
/// let first: Vec<String> = SlugCandidates::new("foo").take(3).collect();
/// assert_eq!(first, ["foo", "foo-1", "foo-2"]);
/// ```
#[derive(Debug, Clone)]
pub struct SlugCandidates {
    base: String,
    counter: u32,
}

impl SlugCandidates {
    /// Start a candidate sequence from a base slug.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            counter: 0,
        }
    }
}

impl Iterator for SlugCandidates {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let candidate = if self.counter == 0 {
            self.base.clone()
        } else {
            format!("{}-{}", self.base, self.counter)
        };
        self.counter = self.counter.checked_add(1)?;
        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Honey Jar"), "honey-jar");
        assert_eq!(slugify("organic"), "organic");
        assert_eq!(slugify("Organic "), "organic");
    }

    #[test]
    fn test_slugify_strips_punctuation_without_adding_hyphens() {
        assert_eq!(slugify("Mom's Jam!"), "moms-jam");
        assert_eq!(slugify("a!b"), "ab");
    }

    #[test]
    fn test_slugify_collapses_whitespace_and_hyphens() {
        assert_eq!(slugify("a   b"), "a-b");
        assert_eq!(slugify("a - b"), "a-b");
        assert_eq!(slugify("a---b"), "a-b");
        assert_eq!(slugify("a\t\nb"), "a-b");
    }

    #[test]
    fn test_slugify_trims_hyphens() {
        assert_eq!(slugify("--hello--"), "hello");
        assert_eq!(slugify(" - hello - "), "hello");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!(slugify("Café Latte"), "caf-latte");
        assert_eq!(slugify("日本"), "");
    }

    #[test]
    fn test_slugify_keeps_digits() {
        assert_eq!(slugify("Gift Box 2024"), "gift-box-2024");
    }

    #[test]
    fn test_candidates_sequence() {
        let seq: Vec<String> = SlugCandidates::new("foo").take(4).collect();
        assert_eq!(seq, ["foo", "foo-1", "foo-2", "foo-3"]);
    }

    #[test]
    fn test_candidates_first_fit() {
        fn first_free(taken: &HashSet<&str>, base: &str) -> Option<String> {
            SlugCandidates::new(base).find(|c| !taken.contains(c.as_str()))
        }

        let mut taken = HashSet::new();
        assert_eq!(first_free(&taken, "foo").as_deref(), Some("foo"));

        taken.insert("foo");
        assert_eq!(first_free(&taken, "foo").as_deref(), Some("foo-1"));

        taken.insert("foo-1");
        assert_eq!(first_free(&taken, "foo").as_deref(), Some("foo-2"));

        // A gap after a deleted row is filled only when reached in order.
        taken.remove("foo-1");
        taken.insert("foo-2");
        assert_eq!(first_free(&taken, "foo").as_deref(), Some("foo-1"));
    }
}
