use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

use crate::domain::errors::ValidationError;

const MAX_SKU_LEN: usize = 64;

/// Prefix used when no category name is available
pub const GENERIC_SKU_PREFIX: &str = "GEN";

static TRAILING_SEQUENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d+)$").expect("static regex"));

static SEQUENTIAL_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}-\d{4,}$").expect("static regex"));

/// Three uppercase ASCII letters heading a generated SKU
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SkuPrefix(String);

impl SkuPrefix {
    pub fn new(value: &str) -> Result<Self, ValidationError> {
        if value.len() == 3 && value.chars().all(|c| c.is_ascii_uppercase()) {
            Ok(Self(value.to_string()))
        } else {
            Err(ValidationError::InvalidSkuPrefix(value.to_string()))
        }
    }

    pub fn generic() -> Self {
        Self(GENERIC_SKU_PREFIX.to_string())
    }

    /// Derive a prefix from a category name: letters only, uppercased, first three.
    /// Names with fewer than three ASCII letters get the generic prefix.
    pub fn derive(category_name: &str) -> Self {
        let letters: String = category_name
            .chars()
            .filter(char::is_ascii_alphabetic)
            .take(3)
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if letters.len() == 3 {
            Self(letters)
        } else {
            Self::generic()
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SkuPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A product stock-keeping unit.
///
/// Generated SKUs look like `CHA-0042`; operators may also type a free-form
/// value on the draft, so only emptiness and length are enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl Sku {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(ValidationError::EmptySku);
        }

        let len = value.chars().count();
        if len > MAX_SKU_LEN {
            return Err(ValidationError::SkuTooLong {
                actual: len,
                max: MAX_SKU_LEN,
            });
        }

        Ok(Self(value))
    }

    /// `PFX-NNNN`, zero-padded to four digits and growing past 9999
    pub fn sequential(prefix: &SkuPrefix, sequence: u64) -> Self {
        Self(format!("{}-{:04}", prefix, sequence))
    }

    /// The trailing `-NNNN` number, if the SKU has one
    pub fn sequence(&self) -> Option<u64> {
        TRAILING_SEQUENCE
            .captures(&self.0)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    pub fn is_sequential_format(&self) -> bool {
        SEQUENTIAL_FORMAT.is_match(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Sku {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Sku> for String {
    fn from(sku: Sku) -> Self {
        sku.0
    }
}

impl std::fmt::Display for Sku {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which counter a generated SKU draws its number from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkuScope {
    /// One counter shared by every prefix
    #[default]
    Global,
    /// One counter per category prefix
    PerPrefix,
}

impl SkuScope {
    /// Key of the persisted counter row for this scope
    pub fn counter_key(&self, prefix: &SkuPrefix) -> String {
        match self {
            SkuScope::Global => "global".to_string(),
            SkuScope::PerPrefix => format!("prefix:{}", prefix),
        }
    }
}

impl FromStr for SkuScope {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "global" => Ok(SkuScope::Global),
            "per_prefix" | "per-prefix" | "prefix" => Ok(SkuScope::PerPrefix),
            other => Err(ValidationError::InvalidField {
                field: "sku_scope".to_string(),
                value: other.to_string(),
                expected: "global | per_prefix".to_string(),
            }),
        }
    }
}
