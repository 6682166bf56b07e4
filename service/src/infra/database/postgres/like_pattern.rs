//! [`LikePattern`] definition.

use derive_more::Display;
use postgres_types::{FromSql, ToSql};

/// SQL `LIKE` pattern matching any string containing the provided input
/// literally.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct LikePattern(String);

impl LikePattern {
    /// Creates a new [`LikePattern`] out of the given `input`.
    #[must_use]
    pub fn containing(input: &str) -> Self {
        let escaped = input
            .replace('\\', r"\\")
            .replace('%', r"\%")
            .replace('_', r"\_");
        Self(format!("%{escaped}%"))
    }
}

#[cfg(test)]
mod spec {
    use super::LikePattern;

    #[test]
    fn escapes_wildcards() {
        assert_eq!(LikePattern::containing("sea view").0, "%sea view%");
        assert_eq!(LikePattern::containing("100%").0, r"%100\%%");
        assert_eq!(LikePattern::containing(r"a_b\c").0, r"%a\_b\\c%");
    }
}
