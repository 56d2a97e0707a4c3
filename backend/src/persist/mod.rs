//! Persistence adapter: canonical products into a catalog store.
//!
//! Each record is written in its own store transaction:
//!
//! 1. resolve the product by the configured [`UniqueIdentifier`], update it
//!    or create it
//! 2. update-or-create variants by `(product, supplier_sku)`; variants
//!    without a supplier SKU are always created
//! 3. update-or-create the inventory item of every variant, and its level at
//!    the default location when one is configured
//! 4. update-or-create images by `(product, src)`
//!
//! A failure rolls back the current record only; earlier records stay
//! committed. Running the same input twice creates nothing the second time
//! (except keyless variants).

use std::env;
use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{PersistError, PersistResult};
use crate::logs::log_error;
use crate::models::{CanonicalImage, CanonicalProduct, CanonicalVariant};
use crate::store::{
    CatalogStore, Image, InventoryItem, InventoryLevel, Product, ProductKey, Variant,
    DEFAULT_PRODUCT_TYPE,
};
use crate::transform::builtins::slugify;

/// Env var naming the location that receives inventory levels.
pub const ENV_DEFAULT_LOCATION: &str = "FEEDLOAD_DEFAULT_LOCATION";
/// Env var holding the currency of supplier unit costs.
pub const ENV_CURRENCY: &str = "FEEDLOAD_CURRENCY";
pub const DEFAULT_CURRENCY: &str = "USD";

/// Business key used to match a record to an existing product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UniqueIdentifier {
    /// Primary variant SKU, matched across all products.
    #[default]
    SupplierSku,
    /// Handle, or the slugified title when the record has none.
    Handle,
    Title,
    Vendor,
    ProductType,
}

impl UniqueIdentifier {
    pub fn as_str(self) -> &'static str {
        match self {
            UniqueIdentifier::SupplierSku => "supplier_sku",
            UniqueIdentifier::Handle => "handle",
            UniqueIdentifier::Title => "title",
            UniqueIdentifier::Vendor => "vendor",
            UniqueIdentifier::ProductType => "product_type",
        }
    }

    /// Identifier value carried by `record`, `None` when missing or empty.
    pub fn value_of(self, record: &CanonicalProduct) -> Option<String> {
        let value = match self {
            UniqueIdentifier::SupplierSku => record.primary_supplier_sku().map(str::to_string),
            UniqueIdentifier::Handle => record
                .handle
                .clone()
                .filter(|h| !h.is_empty())
                .or_else(|| record.title.as_deref().map(slugify)),
            UniqueIdentifier::Title => record.title.clone(),
            UniqueIdentifier::Vendor => record.vendor.clone(),
            UniqueIdentifier::ProductType => record.product_type.clone(),
        };
        value.filter(|v| !v.is_empty())
    }
}

impl FromStr for UniqueIdentifier {
    type Err = PersistError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "supplier_sku" | "variants.supplier_sku" => Ok(UniqueIdentifier::SupplierSku),
            "handle" => Ok(UniqueIdentifier::Handle),
            "title" => Ok(UniqueIdentifier::Title),
            "vendor" => Ok(UniqueIdentifier::Vendor),
            "product_type" => Ok(UniqueIdentifier::ProductType),
            other => Err(PersistError::UnsupportedIdentifier(other.to_string())),
        }
    }
}

impl fmt::Display for UniqueIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for one persistence run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistOptions {
    pub unique_identifier: UniqueIdentifier,
    /// Location receiving inventory levels; no levels are written without one.
    pub default_location: Option<String>,
    /// Currency recorded with inventory unit costs.
    pub currency: String,
}

impl Default for PersistOptions {
    fn default() -> Self {
        Self {
            unique_identifier: UniqueIdentifier::default(),
            default_location: None,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl PersistOptions {
    /// Location and currency from `FEEDLOAD_DEFAULT_LOCATION` / `FEEDLOAD_CURRENCY`.
    pub fn from_env(unique_identifier: UniqueIdentifier) -> Self {
        Self::from_lookup(unique_identifier, |key| env::var(key).ok())
    }

    fn from_lookup(unique_identifier: UniqueIdentifier, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            unique_identifier,
            default_location: non_empty(ENV_DEFAULT_LOCATION),
            currency: non_empty(ENV_CURRENCY).unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        }
    }
}

/// Created/updated counters of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PersistSummary {
    pub products_created: usize,
    pub products_updated: usize,
    pub variants_created: usize,
    pub variants_updated: usize,
    pub images_created: usize,
    pub images_updated: usize,
}

impl PersistSummary {
    pub fn merge(&mut self, other: &PersistSummary) {
        self.products_created += other.products_created;
        self.products_updated += other.products_updated;
        self.variants_created += other.variants_created;
        self.variants_updated += other.variants_updated;
        self.images_created += other.images_created;
        self.images_updated += other.images_updated;
    }

    /// Records committed.
    pub fn products_total(&self) -> usize {
        self.products_created + self.products_updated
    }
}

/// Persist every record, stopping at the first failure.
///
/// Records before the failing one stay committed.
pub fn persist_records<I, S>(records: I, store: &mut S, options: &PersistOptions) -> PersistResult<PersistSummary>
where
    I: IntoIterator<Item = CanonicalProduct>,
    S: CatalogStore + ?Sized,
{
    let mut summary = PersistSummary::default();
    for record in records {
        let delta = persist_one(&record, store, options)?;
        summary.merge(&delta);
    }
    Ok(summary)
}

/// Persist one record atomically, returning its counters.
pub fn persist_one<S>(record: &CanonicalProduct, store: &mut S, options: &PersistOptions) -> PersistResult<PersistSummary>
where
    S: CatalogStore + ?Sized,
{
    store.begin()?;
    match write_record(record, store, options) {
        Ok(delta) => {
            store.commit()?;
            Ok(delta)
        }
        Err(e) => {
            if let Err(rollback_err) = store.rollback() {
                log_error(format!("Rollback failed: {}", rollback_err));
            }
            Err(e)
        }
    }
}

fn write_record<S>(record: &CanonicalProduct, store: &mut S, options: &PersistOptions) -> PersistResult<PersistSummary>
where
    S: CatalogStore + ?Sized,
{
    let mut delta = PersistSummary::default();

    let (product, created) = upsert_product(record, store, options)?;
    if created {
        delta.products_created += 1;
    } else {
        delta.products_updated += 1;
    }

    for variant in &record.variants {
        if sync_variant(&product, variant, store, options)? {
            delta.variants_created += 1;
        } else {
            delta.variants_updated += 1;
        }
    }

    for image in &record.images {
        match sync_image(&product, image, store)? {
            Some(true) => delta.images_created += 1,
            Some(false) => delta.images_updated += 1,
            None => {}
        }
    }

    Ok(delta)
}

fn resolve_product<S>(record: &CanonicalProduct, store: &S, options: &PersistOptions) -> PersistResult<Option<Product>>
where
    S: CatalogStore + ?Sized,
{
    let identifier = options.unique_identifier;
    let value = identifier
        .value_of(record)
        .ok_or_else(|| PersistError::MissingIdentifier(identifier.to_string()))?;

    let key = match identifier {
        UniqueIdentifier::SupplierSku => {
            return match store.find_variant(None, &value)? {
                Some(variant) => Ok(store.get_product(variant.product_id)?),
                None => Ok(None),
            };
        }
        UniqueIdentifier::Handle => ProductKey::Handle,
        UniqueIdentifier::Title => ProductKey::Title,
        UniqueIdentifier::Vendor => ProductKey::Vendor,
        UniqueIdentifier::ProductType => ProductKey::ProductType,
    };
    Ok(store.find_product(key, &value)?)
}

fn upsert_product<S>(record: &CanonicalProduct, store: &mut S, options: &PersistOptions) -> PersistResult<(Product, bool)>
where
    S: CatalogStore + ?Sized,
{
    let existing = resolve_product(record, store, options)?;

    let title = record.title.clone().unwrap_or_default();
    let handle = record
        .handle
        .clone()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| {
            let from_title = slugify(&title);
            if from_title.is_empty() {
                record.primary_supplier_sku().map(slugify).unwrap_or_default()
            } else {
                from_title
            }
        });

    let created = existing.is_none();
    let mut product = existing.unwrap_or_else(|| Product::new(handle.as_str()));
    product.handle = handle;
    product.title = title;
    product.description = record.description.clone().unwrap_or_default();
    product.vendor = record.vendor.clone();
    product.product_type = record
        .product_type
        .clone()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_PRODUCT_TYPE.to_string());
    product.tags = record.tags.clone();

    if created {
        store.create_product(product.clone())?;
    } else {
        product.updated_at = Utc::now();
        store.update_product(&product)?;
    }
    Ok((product, created))
}

/// Zero with the scale prices are stored at.
fn zero_amount() -> Decimal {
    Decimal::new(0, 2)
}

/// Returns `true` when the variant was created.
fn sync_variant<S>(
    product: &Product,
    record: &CanonicalVariant,
    store: &mut S,
    options: &PersistOptions,
) -> PersistResult<bool>
where
    S: CatalogStore + ?Sized,
{
    let existing = match record.business_key() {
        Some(sku) => store.find_variant(Some(product.id), sku)?,
        None => None,
    };
    let created = existing.is_none();
    let mut variant = existing.unwrap_or_else(|| Variant::new(product.id));

    variant.supplier_sku = record.supplier_sku.clone();
    variant.title = record.title.clone();
    variant.price = record.price.unwrap_or_else(zero_amount);
    variant.compare_at_price = record.compare_at_price.unwrap_or_else(zero_amount);
    variant.barcode = record.barcode.clone();
    variant.grams = record.grams.unwrap_or(0);
    variant.position = record.position.unwrap_or(1);
    if let Some(taxable) = record.taxable {
        variant.taxable = taxable;
    }
    if let Some(requires_shipping) = record.requires_shipping {
        variant.requires_shipping = requires_shipping;
    }
    if let Some(policy) = record.inventory_policy.clone().filter(|p| !p.is_empty()) {
        variant.inventory_policy = policy;
    }
    if let Some(management) = record.inventory_management.clone().filter(|m| !m.is_empty()) {
        variant.inventory_management = Some(management);
    }
    variant.option1 = record.option1.clone();
    variant.option2 = record.option2.clone();
    variant.option3 = record.option3.clone();

    if created {
        store.create_variant(variant.clone())?;
    } else {
        variant.updated_at = Utc::now();
        store.update_variant(&variant)?;
    }

    let quantity = record.quantity.unwrap_or(0);
    let mut item = InventoryItem::new(variant.id);
    item.shopify_sku = record
        .sku
        .clone()
        .filter(|s| !s.is_empty())
        .or_else(|| variant.supplier_sku.clone());
    item.tracked = record.tracked.unwrap_or(true);
    item.requires_shipping = variant.requires_shipping;
    item.source_quantity = quantity;
    item.unit_cost_amount = record.cost.unwrap_or_else(zero_amount);
    item.unit_cost_currency = options.currency.clone();
    let (item, _) = store.upsert_inventory_item(item)?;

    if let Some(location) = &options.default_location {
        let mut level = InventoryLevel::new(item.id, location.as_str());
        level.quantities.insert("available".to_string(), quantity);
        level.sync_pending = true;
        store.upsert_inventory_level(level)?;
    }

    Ok(created)
}

/// `None` when the image has no source and was skipped.
fn sync_image<S>(product: &Product, record: &CanonicalImage, store: &mut S) -> PersistResult<Option<bool>>
where
    S: CatalogStore + ?Sized,
{
    let Some(src) = record.src.as_deref().filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let position = record.position.unwrap_or(1);

    match store.find_image(product.id, src)? {
        Some(mut image) => {
            image.position = position;
            image.updated_at = Utc::now();
            store.update_image(&image)?;
            Ok(Some(false))
        }
        None => {
            let mut image = Image::new(product.id, src);
            image.position = position;
            image.alt = record.alt.clone();
            image.width = record.width;
            image.height = record.height;
            store.create_image(image)?;
            Ok(Some(true))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCatalog;

    fn options(identifier: UniqueIdentifier) -> PersistOptions {
        PersistOptions {
            unique_identifier: identifier,
            default_location: Some("gid://shopify/Location/1".into()),
            currency: "USD".into(),
        }
    }

    fn persist(record: CanonicalProduct, store: &mut MemoryCatalog, identifier: UniqueIdentifier) -> PersistSummary {
        persist_records([record], store, &options(identifier)).unwrap()
    }

    fn seeded_product(store: &mut MemoryCatalog, handle: &str) -> Product {
        let mut product = Product::new(handle);
        product.title = "Old".into();
        product.description = "Old".into();
        store.create_product(product.clone()).unwrap();
        product
    }

    fn variant(sku: Option<&str>) -> CanonicalVariant {
        CanonicalVariant {
            supplier_sku: sku.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_upsert_product_by_handle_updates_existing() {
        let mut store = MemoryCatalog::new();
        seeded_product(&mut store, "existing-handle");

        let record = CanonicalProduct {
            title: Some("New".into()),
            description: Some("New desc".into()),
            handle: Some("existing-handle".into()),
            ..Default::default()
        };
        let summary = persist(record, &mut store, UniqueIdentifier::Handle);

        assert_eq!(summary.products_updated, 1);
        assert_eq!(summary.products_created, 0);
        let product = store
            .find_product(ProductKey::Handle, "existing-handle")
            .unwrap()
            .unwrap();
        assert_eq!(product.title, "New");
        assert_eq!(product.description, "New desc");
    }

    #[test]
    fn test_upsert_product_by_supplier_sku_updates_existing() {
        let mut store = MemoryCatalog::new();
        let product = seeded_product(&mut store, "old-handle");
        let mut existing = Variant::new(product.id);
        existing.supplier_sku = Some("SKU-1".into());
        store.create_variant(existing).unwrap();

        let record = CanonicalProduct {
            title: Some("Updated".into()),
            handle: Some("updated-handle".into()),
            variants: vec![variant(Some("SKU-1"))],
            ..Default::default()
        };
        let summary = persist(record, &mut store, UniqueIdentifier::SupplierSku);

        assert_eq!(summary.products_updated, 1);
        assert_eq!(summary.products_created, 0);
        assert_eq!(summary.variants_updated, 1);
        let reloaded = store.get_product(product.id).unwrap().unwrap();
        assert_eq!(reloaded.title, "Updated");
        assert_eq!(reloaded.handle, "updated-handle");
    }

    #[test]
    fn test_same_input_twice_is_idempotent() {
        let mut store = MemoryCatalog::new();
        let record = CanonicalProduct {
            title: Some("Brass Lamp".into()),
            variants: vec![variant(Some("L-1"))],
            images: vec![CanonicalImage {
                src: Some("http://img/1".into()),
                ..Default::default()
            }],
            ..Default::default()
        };

        let first = persist(record.clone(), &mut store, UniqueIdentifier::Handle);
        let second = persist(record, &mut store, UniqueIdentifier::Handle);

        assert_eq!((first.products_created, first.variants_created, first.images_created), (1, 1, 1));
        assert_eq!((second.products_updated, second.variants_updated, second.images_updated), (1, 1, 1));
        assert_eq!(second.products_created + second.variants_created + second.images_created, 0);

        let tables = store.tables();
        assert_eq!(tables.products.len(), 1);
        assert_eq!(tables.products[0].handle, "brass-lamp");
        assert_eq!(tables.variants.len(), 1);
        assert_eq!(tables.images.len(), 1);
        assert_eq!(tables.inventory_items.len(), 1);
        assert_eq!(tables.inventory_levels.len(), 1);
    }

    #[test]
    fn test_variants_update_by_supplier_sku() {
        let mut store = MemoryCatalog::new();
        let product = seeded_product(&mut store, "prod-handle");
        let mut existing = Variant::new(product.id);
        existing.supplier_sku = Some("SKU-1".into());
        existing.title = Some("Old Var".into());
        existing.price = Decimal::new(500, 2);
        store.create_variant(existing).unwrap();

        let record = CanonicalProduct {
            title: Some("Prod".into()),
            handle: Some("prod-handle".into()),
            variants: vec![CanonicalVariant {
                supplier_sku: Some("SKU-1".into()),
                title: Some("New Var".into()),
                price: Some(Decimal::new(700, 2)),
                grams: Some(10),
                ..Default::default()
            }],
            ..Default::default()
        };
        let summary = persist(record, &mut store, UniqueIdentifier::Handle);

        assert_eq!(summary.variants_updated, 1);
        assert_eq!(summary.variants_created, 0);
        let variant = store.find_variant(Some(product.id), "SKU-1").unwrap().unwrap();
        assert_eq!(variant.title.as_deref(), Some("New Var"));
        assert_eq!(variant.price, Decimal::new(700, 2));
        assert_eq!(variant.grams, 10);
    }

    #[test]
    fn test_keyless_variants_always_created() {
        let mut store = MemoryCatalog::new();
        let record = CanonicalProduct {
            title: Some("Prod".into()),
            handle: Some("prod-handle".into()),
            variants: vec![CanonicalVariant {
                title: Some("No SKU".into()),
                price: Some(Decimal::new(300, 2)),
                ..Default::default()
            }],
            ..Default::default()
        };

        let first = persist(record.clone(), &mut store, UniqueIdentifier::Handle);
        let second = persist(record, &mut store, UniqueIdentifier::Handle);

        assert_eq!(first.variants_created, 1);
        assert_eq!(second.variants_created, 1);
        assert_eq!(store.tables().variants.len(), 2);
        assert!(store.tables().variants.iter().all(|v| v.supplier_sku.is_none()));
    }

    #[test]
    fn test_variant_defaults_and_preserved_flags() {
        let mut store = MemoryCatalog::new();
        let product = seeded_product(&mut store, "prod");
        let mut existing = Variant::new(product.id);
        existing.supplier_sku = Some("SKU-1".into());
        existing.taxable = false;
        existing.inventory_policy = "continue".into();
        store.create_variant(existing).unwrap();

        let record = CanonicalProduct {
            handle: Some("prod".into()),
            variants: vec![variant(Some("SKU-1"))],
            ..Default::default()
        };
        persist(record, &mut store, UniqueIdentifier::Handle);

        let variant = store.find_variant(None, "SKU-1").unwrap().unwrap();
        assert_eq!(variant.price, Decimal::new(0, 2));
        assert_eq!(variant.position, 1);
        assert!(!variant.taxable);
        assert_eq!(variant.inventory_policy, "continue");
    }

    #[test]
    fn test_images_update_by_src_and_skip_missing_src() {
        let mut store = MemoryCatalog::new();
        let product = seeded_product(&mut store, "prod-handle");
        let mut image = Image::new(product.id, "http://img");
        image.alt = Some("kept".into());
        store.create_image(image).unwrap();

        let record = CanonicalProduct {
            title: Some("Prod".into()),
            handle: Some("prod-handle".into()),
            images: vec![
                CanonicalImage {
                    src: Some("http://img".into()),
                    position: Some(2),
                    alt: Some("ignored".into()),
                    ..Default::default()
                },
                CanonicalImage::default(),
            ],
            ..Default::default()
        };
        let summary = persist(record, &mut store, UniqueIdentifier::Handle);

        assert_eq!(summary.images_updated, 1);
        assert_eq!(summary.images_created, 0);
        let image = store.find_image(product.id, "http://img").unwrap().unwrap();
        assert_eq!(image.position, 2);
        assert_eq!(image.alt.as_deref(), Some("kept"));
        assert_eq!(store.tables().images.len(), 1);
    }

    #[test]
    fn test_inventory_item_and_level_are_upserted() {
        let mut store = MemoryCatalog::new();
        let record = CanonicalProduct {
            title: Some("Prod".into()),
            handle: Some("prod-handle".into()),
            variants: vec![CanonicalVariant {
                supplier_sku: Some("SKU-1".into()),
                price: Some(Decimal::new(250, 2)),
                quantity: Some(5),
                cost: Some(Decimal::new(125, 2)),
                ..Default::default()
            }],
            ..Default::default()
        };
        persist(record, &mut store, UniqueIdentifier::Handle);

        let variant = store.find_variant(None, "SKU-1").unwrap().unwrap();
        let item = store.find_inventory_item(variant.id).unwrap().unwrap();
        assert_eq!(item.source_quantity, 5);
        assert_eq!(item.unit_cost_amount, Decimal::new(125, 2));
        assert_eq!(item.unit_cost_currency, "USD");
        assert_eq!(item.shopify_sku.as_deref(), Some("SKU-1"));
        assert!(item.tracked);

        let level = store
            .find_inventory_level(item.id, "gid://shopify/Location/1")
            .unwrap()
            .unwrap();
        assert_eq!(level.quantities.get("available"), Some(&5));
        assert!(level.sync_pending);
    }

    #[test]
    fn test_no_levels_without_location() {
        let mut store = MemoryCatalog::new();
        let record = CanonicalProduct {
            title: Some("Prod".into()),
            variants: vec![variant(Some("SKU-1"))],
            ..Default::default()
        };
        let options = PersistOptions {
            unique_identifier: UniqueIdentifier::Handle,
            ..Default::default()
        };
        persist_records([record], &mut store, &options).unwrap();

        assert_eq!(store.tables().inventory_items.len(), 1);
        assert!(store.tables().inventory_levels.is_empty());
    }

    #[test]
    fn test_created_product_defaults() {
        let mut store = MemoryCatalog::new();
        let record = CanonicalProduct {
            variants: vec![variant(Some("ABC 123"))],
            ..Default::default()
        };
        persist(record, &mut store, UniqueIdentifier::SupplierSku);

        let product = &store.tables().products[0];
        assert_eq!(product.handle, "abc-123");
        assert_eq!(product.product_type, DEFAULT_PRODUCT_TYPE);
        assert_eq!(product.title, "");
    }

    #[test]
    fn test_missing_identifier_fails_and_writes_nothing() {
        let mut store = MemoryCatalog::new();
        let record = CanonicalProduct {
            title: Some("No sku".into()),
            ..Default::default()
        };
        let err = persist_records([record], &mut store, &options(UniqueIdentifier::SupplierSku)).unwrap_err();

        assert!(matches!(err, PersistError::MissingIdentifier(ref id) if id == "supplier_sku"));
        assert!(store.tables().products.is_empty());
        assert!(!store.in_transaction());
    }

    #[test]
    fn test_failure_keeps_earlier_records() {
        let mut store = MemoryCatalog::new();
        let good = CanonicalProduct {
            title: Some("Good".into()),
            ..Default::default()
        };
        let bad = CanonicalProduct::default();

        let result = persist_records([good, bad], &mut store, &options(UniqueIdentifier::Title));
        assert!(result.is_err());
        assert_eq!(store.tables().products.len(), 1);
    }

    #[test]
    fn test_identifier_parsing() {
        assert_eq!("supplier_sku".parse::<UniqueIdentifier>().unwrap(), UniqueIdentifier::SupplierSku);
        assert_eq!(
            "variants.supplier_sku".parse::<UniqueIdentifier>().unwrap(),
            UniqueIdentifier::SupplierSku
        );
        assert_eq!("product_type".parse::<UniqueIdentifier>().unwrap(), UniqueIdentifier::ProductType);
        assert!(matches!(
            "barcode".parse::<UniqueIdentifier>(),
            Err(PersistError::UnsupportedIdentifier(_))
        ));
    }

    #[test]
    fn test_options_from_lookup() {
        let options = PersistOptions::from_lookup(UniqueIdentifier::Handle, |key| match key {
            ENV_DEFAULT_LOCATION => Some("gid://shopify/Location/9".into()),
            ENV_CURRENCY => Some("  ".into()),
            _ => None,
        });
        assert_eq!(options.default_location.as_deref(), Some("gid://shopify/Location/9"));
        assert_eq!(options.currency, DEFAULT_CURRENCY);
    }
}
