use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::errors::ValidationError;

/// The kind of aggregate an image is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    Draft,
    Product,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::Draft => "draft",
            OwnerKind::Product => "product",
        }
    }

    /// Top-level blob namespace for owners of this kind
    pub fn path_segment(&self) -> &'static str {
        match self {
            OwnerKind::Draft => "drafts",
            OwnerKind::Product => "products",
        }
    }
}

impl std::fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnerKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(OwnerKind::Draft),
            "product" => Ok(OwnerKind::Product),
            other => Err(ValidationError::InvalidField {
                field: "owner_kind".to_string(),
                value: other.to_string(),
                expected: "draft | product".to_string(),
            }),
        }
    }
}

/// Identifier of an image owner.
///
/// Empty while the owning draft has not been saved yet; attachment
/// operations check [`OwnerId::is_provisioned`] before doing any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    /// An owner id for an aggregate that does not exist yet
    pub fn unprovisioned() -> Self {
        Self(String::new())
    }

    pub fn is_provisioned(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Uuid> for OwnerId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for OwnerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OwnerId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The (owner id, owner kind) pair images are attached to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerScope {
    pub owner_id: OwnerId,
    pub kind: OwnerKind,
}

impl OwnerScope {
    pub fn new(owner_id: impl Into<OwnerId>, kind: OwnerKind) -> Self {
        Self {
            owner_id: owner_id.into(),
            kind,
        }
    }

    pub fn draft(id: Uuid) -> Self {
        Self::new(id, OwnerKind::Draft)
    }

    pub fn product(id: Uuid) -> Self {
        Self::new(id, OwnerKind::Product)
    }

    pub fn is_provisioned(&self) -> bool {
        self.owner_id.is_provisioned()
    }
}

impl std::fmt::Display for OwnerScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.owner_id)
    }
}
