//! Variant catalog and tier pricing
//!
//! Amounts are whole currency units. Each variant carries tier prices
//! for a few fixed quantities; every other quantity prices at the
//! single-unit rate, so the tier discount never applies off-tier.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared::order::VariantOffer;
use shared::{StoreError, StoreResult};

/// Catalog definition errors (startup time)
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog JSON did not parse
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A variant has no single-unit price to fall back on
    #[error("variant {0} does not define a unit price (tier 1)")]
    MissingUnitTier(String),

    /// A catalog with nothing to sell
    #[error("catalog defines no variants")]
    Empty,

    /// Two variants share an id
    #[error("duplicate variant id: {0}")]
    DuplicateVariant(String),
}

/// One sellable variant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantSpec {
    /// Stable variant id, also the inventory shelf key
    pub id: String,
    /// Buyer-facing display name
    pub display: String,
    /// Tier prices keyed by quantity
    pub tiers: BTreeMap<u32, i64>,
}

impl VariantSpec {
    /// Single-unit price (tier 1; enforced at catalog construction)
    pub fn unit_price(&self) -> i64 {
        self.tiers.get(&1).copied().unwrap_or(0)
    }

    /// Tier prices as (quantity, amount) pairs, ascending by quantity
    pub fn tier_list(&self) -> Vec<(u32, i64)> {
        self.tiers.iter().map(|(q, a)| (*q, *a)).collect()
    }

    /// Menu projection with a live stock count
    pub fn offer(&self, stock: u32) -> VariantOffer {
        VariantOffer {
            id: self.id.clone(),
            display: self.display.clone(),
            stock,
            tiers: self.tier_list(),
        }
    }
}

/// Immutable variant catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    variants: BTreeMap<String, VariantSpec>,
}

impl Catalog {
    /// Built-in catalog: the three launch variants
    pub fn standard() -> Self {
        let launch = [
            ("1000", "₹1000 Off", [(1, 70), (5, 335), (10, 650)]),
            ("2000", "₹2000 Off", [(1, 180), (5, 670), (10, 1300)]),
            ("500", "₹500 Off", [(1, 30), (5, 130), (10, 240)]),
        ];
        let variants = launch
            .into_iter()
            .map(|(id, display, tiers)| {
                (
                    id.to_string(),
                    VariantSpec {
                        id: id.to_string(),
                        display: display.to_string(),
                        tiers: BTreeMap::from(tiers),
                    },
                )
            })
            .collect();
        Self { variants }
    }

    /// Parse a catalog from its JSON definition (an array of variants)
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let specs: Vec<VariantSpec> = serde_json::from_str(json)?;
        Self::from_specs(specs)
    }

    /// Build a catalog from variant specs, validating each one
    pub fn from_specs(specs: Vec<VariantSpec>) -> Result<Self, CatalogError> {
        if specs.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut variants = BTreeMap::new();
        for spec in specs {
            if !spec.tiers.contains_key(&1) {
                return Err(CatalogError::MissingUnitTier(spec.id));
            }
            if variants.contains_key(&spec.id) {
                return Err(CatalogError::DuplicateVariant(spec.id));
            }
            variants.insert(spec.id.clone(), spec);
        }
        Ok(Self { variants })
    }

    /// Look up a variant
    pub fn get(&self, variant: &str) -> StoreResult<&VariantSpec> {
        self.variants
            .get(variant)
            .ok_or_else(|| StoreError::unknown_variant(variant))
    }

    /// Whether the catalog sells this variant
    pub fn contains(&self, variant: &str) -> bool {
        self.variants.contains_key(variant)
    }

    /// Variant ids in stable (lexicographic) order
    pub fn variant_ids(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    /// All variant specs in stable order
    pub fn specs(&self) -> impl Iterator<Item = &VariantSpec> {
        self.variants.values()
    }

    /// Price a (variant, quantity) pair.
    ///
    /// A quantity with a tier gets the tier amount; anything else pays
    /// quantity times the single-unit rate.
    pub fn quote(&self, variant: &str, quantity: u32) -> StoreResult<i64> {
        let spec = self.get(variant)?;
        if let Some(amount) = spec.tiers.get(&quantity) {
            return Ok(*amount);
        }
        Ok(spec.unit_price() * i64::from(quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_variants() {
        let catalog = Catalog::standard();
        let ids: Vec<&str> = catalog.variant_ids().collect();
        assert_eq!(ids, vec!["1000", "2000", "500"]);
        assert_eq!(catalog.get("1000").unwrap().display, "₹1000 Off");
        assert!(catalog.contains("500"));
        assert!(!catalog.contains("750"));
    }

    #[test]
    fn test_quote_tier_amounts() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.quote("500", 1).unwrap(), 30);
        assert_eq!(catalog.quote("500", 5).unwrap(), 130);
        assert_eq!(catalog.quote("500", 10).unwrap(), 240);
        assert_eq!(catalog.quote("1000", 5).unwrap(), 335);
        assert_eq!(catalog.quote("2000", 10).unwrap(), 1300);
    }

    #[test]
    fn test_quote_off_tier_pays_unit_rate() {
        let catalog = Catalog::standard();
        // 7 is not a tier: 7 * 70, no discount
        assert_eq!(catalog.quote("1000", 7).unwrap(), 490);
        assert_eq!(catalog.quote("500", 12).unwrap(), 360);
        assert_eq!(catalog.quote("2000", 2).unwrap(), 360);
    }

    #[test]
    fn test_quote_unknown_variant() {
        let catalog = Catalog::standard();
        assert_eq!(
            catalog.quote("750", 1),
            Err(StoreError::unknown_variant("750"))
        );
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"id": "100", "display": "₹100 Off", "tiers": {"1": 10, "5": 45}}
        ]"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.quote("100", 5).unwrap(), 45);
        assert_eq!(catalog.quote("100", 3).unwrap(), 30);
    }

    #[test]
    fn test_from_json_rejects_missing_unit_tier() {
        let json = r#"[
            {"id": "100", "display": "₹100 Off", "tiers": {"5": 45}}
        ]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::MissingUnitTier(id)) if id == "100"
        ));
    }

    #[test]
    fn test_from_specs_rejects_empty_and_duplicates() {
        assert!(matches!(
            Catalog::from_specs(vec![]),
            Err(CatalogError::Empty)
        ));

        let spec = VariantSpec {
            id: "100".to_string(),
            display: "₹100 Off".to_string(),
            tiers: BTreeMap::from([(1, 10)]),
        };
        assert!(matches!(
            Catalog::from_specs(vec![spec.clone(), spec]),
            Err(CatalogError::DuplicateVariant(id)) if id == "100"
        ));
    }
}
