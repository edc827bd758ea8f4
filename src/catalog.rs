//! Item catalog
//!
//! Static registry of everything the store can put on a shelf. Loaded once
//! at startup and never mutated afterwards.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Catalog key for an item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A single sellable item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: ItemId,
    pub display_name: String,
    /// Shelf price in store currency
    pub unit_price: f64,
    /// Key the host uses to find the item's model
    pub visual_asset_key: String,
    /// Uniform scale applied to the model when placed in a slot
    #[serde(default = "default_display_scale")]
    pub display_scale: f32,
}

fn default_display_scale() -> f32 {
    1.0
}

impl ItemDefinition {
    pub fn new(
        id: &str,
        display_name: &str,
        unit_price: f64,
        visual_asset_key: &str,
        display_scale: f32,
    ) -> Self {
        Self {
            id: ItemId::new(id),
            display_name: display_name.to_string(),
            unit_price,
            visual_asset_key: visual_asset_key.to_string(),
            display_scale,
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog has no items")]
    Empty,
    #[error("duplicate item id in catalog: {id}")]
    DuplicateId { id: ItemId },
    #[error("item {id} has invalid price {price}")]
    InvalidPrice { id: ItemId, price: f64 },
    #[error("item {id} has invalid display scale {scale}")]
    InvalidScale { id: ItemId, scale: f32 },
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Immutable item registry, iterated in definition order
///
/// Only constructible through validation, so it is never empty.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    items: Vec<ItemDefinition>,
}

impl Catalog {
    /// Build a catalog, rejecting malformed definitions
    pub fn new(items: Vec<ItemDefinition>) -> Result<Self, CatalogError> {
        let catalog = Self { items };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a JSON array of item definitions
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let items: Vec<ItemDefinition> = serde_json::from_str(json)?;
        Self::new(items)
    }

    /// Load a catalog file from disk
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;
        log::info!("Loaded {} catalog items from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.items.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if !seen.insert(&item.id) {
                return Err(CatalogError::DuplicateId {
                    id: item.id.clone(),
                });
            }
            if !item.unit_price.is_finite() || item.unit_price < 0.0 {
                return Err(CatalogError::InvalidPrice {
                    id: item.id.clone(),
                    price: item.unit_price,
                });
            }
            if !item.display_scale.is_finite() || item.display_scale <= 0.0 {
                return Err(CatalogError::InvalidScale {
                    id: item.id.clone(),
                    scale: item.display_scale,
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &ItemId) -> Option<&ItemDefinition> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Unit price, or `None` for ids the catalog doesn't know
    pub fn price_of(&self, id: &ItemId) -> Option<f64> {
        self.get(id).map(|item| item.unit_price)
    }

    /// Display scale for an item (1.0 for unknown ids)
    pub fn scale_of(&self, id: &ItemId) -> f32 {
        self.get(id).map(|item| item.display_scale).unwrap_or(1.0)
    }

    /// Item at a position in definition order (used for random draws)
    pub fn item_at(&self, index: usize) -> Option<&ItemDefinition> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[ItemDefinition] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for Catalog {
    /// The stock storefront
    fn default() -> Self {
        Self {
            items: vec![
                ItemDefinition::new("headphones", "Wireless Headphones", 89.99, "headphones", 0.9),
                ItemDefinition::new("sneakers", "Running Sneakers", 39.99, "sneakers", 0.8),
                ItemDefinition::new("backpack", "Travel Backpack", 29.99, "backpack", 1.0),
                ItemDefinition::new("watch", "Smart Watch", 119.99, "watch", 0.6),
                ItemDefinition::new("mug", "Ceramic Mug", 9.99, "mug", 0.5),
                ItemDefinition::new("lamp", "Desk Lamp", 24.99, "lamp", 1.1),
            ],
        }
    }
}
