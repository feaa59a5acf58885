use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::domain::errors::ValidationError;

static NON_ALPHANUMERIC_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex"));

/// URL slug derived from a product name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Lowercase the name, collapse every non-alphanumeric run into one
    /// hyphen, and trim hyphens from both ends.
    pub fn from_name(name: &str) -> Result<Self, ValidationError> {
        let lowered = name.to_lowercase();
        let hyphenated = NON_ALPHANUMERIC_RUN.replace_all(&lowered, "-");
        let slug = hyphenated.trim_matches('-');

        if slug.is_empty() {
            return Err(ValidationError::EmptySlug {
                source_name: name.to_string(),
            });
        }

        Ok(Self(slug.to_string()))
    }

    /// Wrap an already-stored slug without re-deriving it
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_name() {
        assert_eq!(
            Slug::from_name("Fauteuil Milo  (Velours)").unwrap().as_str(),
            "fauteuil-milo-velours"
        );
        assert_eq!(Slug::from_name("--Table 120cm--").unwrap().as_str(), "table-120cm");
        assert_eq!(Slug::from_name("Chaise Élise").unwrap().as_str(), "chaise-lise");
    }

    #[test]
    fn test_slug_requires_alphanumerics() {
        assert!(Slug::from_name("  !!  ").is_err());
        assert!(Slug::from_name("").is_err());
    }
}
