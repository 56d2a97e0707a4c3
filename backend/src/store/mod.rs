//! Catalog store: the persistence target of an import run.
//!
//! The store holds storefront-shaped rows (products, variants, images,
//! inventory items and levels). The persistence adapter only talks to the
//! [`CatalogStore`] trait, so any backend with per-record transactions can be
//! plugged in. Two are provided:
//!
//! - [`MemoryCatalog`] - in-process tables, rollback by undo journal
//! - [`JsonFileCatalog`] - the same tables written to a JSON file on commit

pub mod file;
pub mod memory;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

pub use file::JsonFileCatalog;
pub use memory::MemoryCatalog;

/// Product type assigned when the record has none.
pub const DEFAULT_PRODUCT_TYPE: &str = "Uncategorized";

/// Inventory policy of newly created variants.
pub const DEFAULT_INVENTORY_POLICY: &str = "deny";

// =============================================================================
// Rows
// =============================================================================

/// Scalar product columns usable for lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductKey {
    Handle,
    Title,
    Vendor,
    ProductType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub handle: String,
    pub title: String,
    pub description: String,
    pub vendor: Option<String>,
    pub product_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(handle: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            handle: handle.into(),
            title: String::new(),
            description: String::new(),
            vendor: None,
            product_type: DEFAULT_PRODUCT_TYPE.to_string(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Column value for a lookup key.
    pub fn key(&self, key: ProductKey) -> Option<&str> {
        match key {
            ProductKey::Handle => Some(&self.handle),
            ProductKey::Title => Some(&self.title),
            ProductKey::Vendor => self.vendor.as_deref(),
            ProductKey::ProductType => Some(&self.product_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub supplier_sku: Option<String>,
    pub title: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Decimal,
    pub barcode: Option<String>,
    pub grams: i64,
    pub position: i64,
    pub taxable: bool,
    pub requires_shipping: bool,
    pub inventory_policy: String,
    pub inventory_management: Option<String>,
    pub option1: Option<String>,
    pub option2: Option<String>,
    pub option3: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Variant {
    pub fn new(product_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            product_id,
            supplier_sku: None,
            title: None,
            price: Decimal::ZERO,
            compare_at_price: Decimal::ZERO,
            barcode: None,
            grams: 0,
            position: 1,
            taxable: true,
            requires_shipping: true,
            inventory_policy: DEFAULT_INVENTORY_POLICY.to_string(),
            inventory_management: None,
            option1: None,
            option2: None,
            option3: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: Uuid,
    pub product_id: Uuid,
    pub src: String,
    pub position: i64,
    pub alt: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Image {
    pub fn new(product_id: Uuid, src: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            product_id,
            src: src.into(),
            position: 1,
            alt: None,
            width: None,
            height: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Stock-keeping record of one variant; at most one per variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub shopify_sku: Option<String>,
    pub tracked: bool,
    pub requires_shipping: bool,
    /// Quantity as reported by the supplier feed.
    pub source_quantity: i64,
    pub unit_cost_amount: Decimal,
    pub unit_cost_currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn new(variant_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            variant_id,
            shopify_sku: None,
            tracked: true,
            requires_shipping: true,
            source_quantity: 0,
            unit_cost_amount: Decimal::ZERO,
            unit_cost_currency: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Quantities of one inventory item at one location; at most one per pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryLevel {
    pub id: Uuid,
    pub inventory_item_id: Uuid,
    pub location_gid: String,
    pub quantities: BTreeMap<String, i64>,
    /// Set when local quantities changed and the storefront is behind.
    pub sync_pending: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryLevel {
    pub fn new(inventory_item_id: Uuid, location_gid: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            inventory_item_id,
            location_gid: location_gid.into(),
            quantities: BTreeMap::new(),
            sync_pending: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Row identity, shared by the table helpers.
pub(crate) trait Row: Clone {
    const ENTITY: &'static str;
    fn id(&self) -> Uuid;
}

macro_rules! impl_row {
    ($ty:ty, $entity:literal) => {
        impl Row for $ty {
            const ENTITY: &'static str = $entity;
            fn id(&self) -> Uuid {
                self.id
            }
        }
    };
}

impl_row!(Product, "Product");
impl_row!(Variant, "Variant");
impl_row!(Image, "Image");
impl_row!(InventoryItem, "InventoryItem");
impl_row!(InventoryLevel, "InventoryLevel");

// =============================================================================
// Tables
// =============================================================================

/// All catalog rows, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogTables {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub inventory_items: Vec<InventoryItem>,
    #[serde(default)]
    pub inventory_levels: Vec<InventoryLevel>,
}

pub(crate) fn insert_row<T: Row>(rows: &mut Vec<T>, row: T) -> StoreResult<()> {
    if rows.iter().any(|r| r.id() == row.id()) {
        return Err(StoreError::Duplicate {
            entity: T::ENTITY,
            id: row.id().to_string(),
        });
    }
    rows.push(row);
    Ok(())
}

/// Replace the row with the same id, returning its position and previous value.
pub(crate) fn replace_row<T: Row>(rows: &mut [T], row: &T) -> StoreResult<(usize, T)> {
    let index = rows
        .iter()
        .position(|r| r.id() == row.id())
        .ok_or_else(|| StoreError::NotFound {
            entity: T::ENTITY,
            id: row.id().to_string(),
        })?;
    let previous = std::mem::replace(&mut rows[index], row.clone());
    Ok((index, previous))
}

// =============================================================================
// Store trait
// =============================================================================

/// Transactional catalog backend.
///
/// `begin`/`commit`/`rollback` bracket one record. Lookups return the first
/// match in insertion order.
pub trait CatalogStore {
    fn begin(&mut self) -> StoreResult<()>;
    fn commit(&mut self) -> StoreResult<()>;
    fn rollback(&mut self) -> StoreResult<()>;

    fn find_product(&self, key: ProductKey, value: &str) -> StoreResult<Option<Product>>;
    fn create_product(&mut self, product: Product) -> StoreResult<()>;
    fn update_product(&mut self, product: &Product) -> StoreResult<()>;
    fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>>;

    /// Variant by supplier SKU, across all products when `product_id` is `None`.
    fn find_variant(&self, product_id: Option<Uuid>, supplier_sku: &str) -> StoreResult<Option<Variant>>;
    fn create_variant(&mut self, variant: Variant) -> StoreResult<()>;
    fn update_variant(&mut self, variant: &Variant) -> StoreResult<()>;

    fn find_image(&self, product_id: Uuid, src: &str) -> StoreResult<Option<Image>>;
    fn create_image(&mut self, image: Image) -> StoreResult<()>;
    fn update_image(&mut self, image: &Image) -> StoreResult<()>;

    fn find_inventory_item(&self, variant_id: Uuid) -> StoreResult<Option<InventoryItem>>;
    fn create_inventory_item(&mut self, item: InventoryItem) -> StoreResult<()>;
    fn update_inventory_item(&mut self, item: &InventoryItem) -> StoreResult<()>;

    fn find_inventory_level(&self, item_id: Uuid, location_gid: &str) -> StoreResult<Option<InventoryLevel>>;
    fn create_inventory_level(&mut self, level: InventoryLevel) -> StoreResult<()>;
    fn update_inventory_level(&mut self, level: &InventoryLevel) -> StoreResult<()>;

    /// Update-or-create keyed by variant. Returns the stored row and whether
    /// it was created.
    fn upsert_inventory_item(&mut self, mut item: InventoryItem) -> StoreResult<(InventoryItem, bool)> {
        match self.find_inventory_item(item.variant_id)? {
            Some(existing) => {
                item.id = existing.id;
                item.created_at = existing.created_at;
                item.updated_at = Utc::now();
                self.update_inventory_item(&item)?;
                Ok((item, false))
            }
            None => {
                self.create_inventory_item(item.clone())?;
                Ok((item, true))
            }
        }
    }

    /// Update-or-create keyed by (inventory item, location).
    fn upsert_inventory_level(&mut self, mut level: InventoryLevel) -> StoreResult<(InventoryLevel, bool)> {
        match self.find_inventory_level(level.inventory_item_id, &level.location_gid)? {
            Some(existing) => {
                level.id = existing.id;
                level.created_at = existing.created_at;
                level.updated_at = Utc::now();
                self.update_inventory_level(&level)?;
                Ok((level, false))
            }
            None => {
                self.create_inventory_level(level.clone())?;
                Ok((level, true))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut rows = Vec::new();
        let product = Product::new("lamp");
        insert_row(&mut rows, product.clone()).unwrap();
        assert!(matches!(
            insert_row(&mut rows, product),
            Err(StoreError::Duplicate { entity: "Product", .. })
        ));
    }

    #[test]
    fn test_replace_requires_existing_row() {
        let mut rows = vec![Product::new("lamp")];
        let mut updated = rows[0].clone();
        updated.title = "Brass lamp".into();
        let (index, previous) = replace_row(&mut rows, &updated).unwrap();
        assert_eq!(index, 0);
        assert_eq!(previous.title, "");
        assert_eq!(rows[0].title, "Brass lamp");

        let stranger = Product::new("desk");
        assert!(matches!(
            replace_row(&mut rows, &stranger),
            Err(StoreError::NotFound { entity: "Product", .. })
        ));
    }

    #[test]
    fn test_product_key_lookup_columns() {
        let mut product = Product::new("lamp");
        product.title = "Lamp".into();
        assert_eq!(product.key(ProductKey::Handle), Some("lamp"));
        assert_eq!(product.key(ProductKey::Title), Some("Lamp"));
        assert_eq!(product.key(ProductKey::Vendor), None);
        assert_eq!(product.key(ProductKey::ProductType), Some(DEFAULT_PRODUCT_TYPE));
    }
}
