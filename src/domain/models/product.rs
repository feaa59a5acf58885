use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::{
    errors::{FieldError, ValidationError},
    value_objects::{OwnerScope, Sku, Slug},
};

/// Availability status a product is created with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    #[default]
    InStock,
    OutOfStock,
    Preorder,
    ComingSoon,
    Discontinued,
    Sourcing,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::InStock => "in_stock",
            AvailabilityStatus::OutOfStock => "out_of_stock",
            AvailabilityStatus::Preorder => "preorder",
            AvailabilityStatus::ComingSoon => "coming_soon",
            AvailabilityStatus::Discontinued => "discontinued",
            AvailabilityStatus::Sourcing => "sourcing",
        }
    }
}

impl FromStr for AvailabilityStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" => Ok(AvailabilityStatus::InStock),
            "out_of_stock" => Ok(AvailabilityStatus::OutOfStock),
            "preorder" => Ok(AvailabilityStatus::Preorder),
            "coming_soon" => Ok(AvailabilityStatus::ComingSoon),
            "discontinued" => Ok(AvailabilityStatus::Discontinued),
            "sourcing" => Ok(AvailabilityStatus::Sourcing),
            other => Err(ValidationError::InvalidField {
                field: "status".to_string(),
                value: other.to_string(),
                expected: "an availability status".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCondition {
    #[default]
    New,
    Refurbished,
    Used,
}

impl ProductCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCondition::New => "new",
            ProductCondition::Refurbished => "refurbished",
            ProductCondition::Used => "used",
        }
    }
}

impl FromStr for ProductCondition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(ProductCondition::New),
            "refurbished" => Ok(ProductCondition::Refurbished),
            "used" => Ok(ProductCondition::Used),
            other => Err(ValidationError::InvalidField {
                field: "condition".to_string(),
                value: other.to_string(),
                expected: "new | refurbished | used".to_string(),
            }),
        }
    }
}

/// Checkpoint recorded on a draft while it is being promoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PromotionState {
    #[default]
    Pending,
    ProductCreated { product_id: Uuid },
}

impl PromotionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromotionState::Pending => "pending",
            PromotionState::ProductCreated { .. } => "product_created",
        }
    }

    pub fn product_id(&self) -> Option<Uuid> {
        match self {
            PromotionState::Pending => None,
            PromotionState::ProductCreated { product_id } => Some(*product_id),
        }
    }

    /// Rebuild from the two persisted columns
    pub fn from_columns(state: &str, product_id: Option<Uuid>) -> Result<Self, ValidationError> {
        match (state, product_id) {
            ("pending", _) => Ok(PromotionState::Pending),
            ("product_created", Some(product_id)) => {
                Ok(PromotionState::ProductCreated { product_id })
            }
            (other, _) => Err(ValidationError::InvalidField {
                field: "promotion_state".to_string(),
                value: other.to_string(),
                expected: "pending | product_created (with product id)".to_string(),
            }),
        }
    }
}

/// A product being sourced; every field is optional until promotion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bon::Builder)]
pub struct DraftProduct {
    #[builder(default = Uuid::new_v4())]
    pub id: Uuid,
    #[builder(into)]
    pub name: Option<String>,
    #[builder(into)]
    pub sku: Option<String>,
    #[builder(into)]
    pub supplier_reference: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    #[builder(into)]
    pub supplier_page_url: Option<String>,
    #[builder(into)]
    pub description: Option<String>,
    #[builder(into)]
    pub color: Option<String>,
    #[builder(into)]
    pub material: Option<String>,
    pub dimensions: Option<serde_json::Value>,
    pub weight: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    /// Legacy twin of `cost_price`; either one may carry the declared cost.
    pub supplier_price: Option<Decimal>,
    pub margin_percentage: Option<Decimal>,
    pub estimated_selling_price: Option<Decimal>,
    #[builder(default)]
    pub promotion_state: PromotionState,
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
    #[builder(default = Utc::now())]
    pub updated_at: DateTime<Utc>,
}

/// Draft fields that passed the promotion preconditions
#[derive(Debug, Clone, PartialEq)]
pub struct PromotableDraft {
    pub name: String,
    pub slug: Slug,
    pub supplier_id: Uuid,
    pub subcategory_id: Uuid,
    pub declared_cost: Decimal,
    /// Operator-entered SKU; `None` means one must be generated
    pub entered_sku: Option<Sku>,
}

impl DraftProduct {
    pub fn scope(&self) -> OwnerScope {
        OwnerScope::draft(self.id)
    }

    /// First positive cost across the two legacy-compatible price fields
    pub fn declared_cost(&self) -> Option<Decimal> {
        [self.cost_price, self.supplier_price]
            .into_iter()
            .flatten()
            .find(|price| *price > Decimal::ZERO)
    }

    /// Check promotion preconditions, collecting every failing field
    pub fn promotable(&self) -> Result<PromotableDraft, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        let slug = match name {
            None => {
                errors.push(FieldError::new("name", "a name is required to create the product"));
                None
            }
            Some(name) => match Slug::from_name(name) {
                Ok(slug) => Some(slug),
                Err(e) => {
                    errors.push(FieldError::new("name", e.to_string()));
                    None
                }
            },
        };

        if self.supplier_id.is_none() {
            errors.push(FieldError::new(
                "supplier_id",
                "a supplier is required to create the product",
            ));
        }
        if self.subcategory_id.is_none() {
            errors.push(FieldError::new(
                "subcategory_id",
                "a subcategory is required to create the product",
            ));
        }

        let declared_cost = self.declared_cost();
        if declared_cost.is_none() {
            errors.push(FieldError::new(
                "cost_price",
                "a positive purchase price is required to create the product",
            ));
        }

        let entered_sku = match self.sku.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => match Sku::new(value) {
                Ok(sku) => Some(sku),
                Err(e) => {
                    errors.push(FieldError::new("sku", e.to_string()));
                    None
                }
            },
        };

        match (name, slug, self.supplier_id, self.subcategory_id, declared_cost) {
            (Some(name), Some(slug), Some(supplier_id), Some(subcategory_id), Some(cost))
                if errors.is_empty() =>
            {
                Ok(PromotableDraft {
                    name: name.to_string(),
                    slug,
                    supplier_id,
                    subcategory_id,
                    declared_cost: cost,
                    entered_sku,
                })
            }
            _ => Err(errors),
        }
    }
}

/// A finalized catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: Sku,
    pub slug: Slug,
    pub supplier_reference: Option<String>,
    pub supplier_id: Uuid,
    pub subcategory_id: Uuid,
    pub supplier_page_url: Option<String>,
    pub description: Option<String>,
    pub variant_attributes: serde_json::Value,
    pub dimensions: Option<serde_json::Value>,
    pub weight: Option<Decimal>,
    pub price_ht: Decimal,
    pub cost_price: Option<Decimal>,
    pub tax_rate: Decimal,
    pub margin_percentage: Option<Decimal>,
    pub estimated_selling_price: Option<Decimal>,
    pub status: AvailabilityStatus,
    pub condition: ProductCondition,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn scope(&self) -> OwnerScope {
        OwnerScope::product(self.id)
    }
}

/// Product row to insert; the repository assigns id and timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub sku: Sku,
    pub slug: Slug,
    pub supplier_reference: Option<String>,
    pub supplier_id: Uuid,
    pub subcategory_id: Uuid,
    pub supplier_page_url: Option<String>,
    pub description: Option<String>,
    pub variant_attributes: serde_json::Value,
    pub dimensions: Option<serde_json::Value>,
    pub weight: Option<Decimal>,
    pub price_ht: Decimal,
    pub cost_price: Option<Decimal>,
    pub tax_rate: Decimal,
    pub margin_percentage: Option<Decimal>,
    pub estimated_selling_price: Option<Decimal>,
    pub status: AvailabilityStatus,
    pub condition: ProductCondition,
}

impl NewProduct {
    /// 20% VAT
    pub fn default_tax_rate() -> Decimal {
        Decimal::new(20, 2)
    }

    /// Build the product payload from a validated draft
    pub fn from_draft(draft: &DraftProduct, promotable: &PromotableDraft, sku: Sku) -> Self {
        let price_ht = draft
            .estimated_selling_price
            .filter(|price| *price > Decimal::ZERO)
            .unwrap_or(promotable.declared_cost);

        Self {
            name: promotable.name.clone(),
            sku,
            slug: promotable.slug.clone(),
            supplier_reference: non_blank(&draft.supplier_reference),
            supplier_id: promotable.supplier_id,
            subcategory_id: promotable.subcategory_id,
            supplier_page_url: non_blank(&draft.supplier_page_url),
            description: non_blank(&draft.description),
            variant_attributes: json!({
                "color": draft.color,
                "material": draft.material,
            }),
            dimensions: draft.dimensions.clone(),
            weight: draft.weight,
            price_ht,
            cost_price: Some(promotable.declared_cost),
            tax_rate: Self::default_tax_rate(),
            margin_percentage: draft.margin_percentage,
            estimated_selling_price: draft.estimated_selling_price,
            status: AvailabilityStatus::default(),
            condition: ProductCondition::default(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Result of a completed promotion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionReceipt {
    pub product: Product,
    /// Image rows re-pointed from the draft during this call
    pub images_migrated: u64,
    /// False when the draft row could not be deleted; it no longer owns images
    pub draft_retired: bool,
}
