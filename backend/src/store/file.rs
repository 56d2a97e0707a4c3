//! JSON-file catalog
//!
//! Keeps the catalog in memory and rewrites one JSON document after every
//! committed record, so an interrupted run keeps everything committed so far.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::{
    CatalogStore, CatalogTables, Image, InventoryItem, InventoryLevel, MemoryCatalog, Product,
    ProductKey, Variant,
};
use crate::error::StoreResult;

/// Catalog file used when none is given (relative to current dir)
pub const DEFAULT_CATALOG_PATH: &str = ".feedload/catalog.json";

/// Catalog persisted to a single JSON file.
#[derive(Debug)]
pub struct JsonFileCatalog {
    path: PathBuf,
    inner: MemoryCatalog,
}

impl JsonFileCatalog {
    /// Open the catalog at `path`; a missing file is an empty catalog.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = PathBuf::from(path.as_ref());
        let tables = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str::<CatalogTables>(&content)?
        } else {
            CatalogTables::default()
        };
        Ok(Self {
            path,
            inner: MemoryCatalog::from_tables(tables),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tables(&self) -> &CatalogTables {
        self.inner.tables()
    }

    /// Write the current tables to disk.
    pub fn flush(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self.inner.tables())?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl CatalogStore for JsonFileCatalog {
    fn begin(&mut self) -> StoreResult<()> {
        self.inner.begin()
    }

    /// Writes the file before releasing the transaction; a failed write rolls
    /// the record back.
    fn commit(&mut self) -> StoreResult<()> {
        if !self.inner.in_transaction() {
            return self.inner.commit();
        }
        if let Err(e) = self.flush() {
            self.inner.rollback()?;
            return Err(e);
        }
        self.inner.commit()
    }

    fn rollback(&mut self) -> StoreResult<()> {
        self.inner.rollback()
    }

    fn find_product(&self, key: ProductKey, value: &str) -> StoreResult<Option<Product>> {
        self.inner.find_product(key, value)
    }

    fn create_product(&mut self, product: Product) -> StoreResult<()> {
        self.inner.create_product(product)
    }

    fn update_product(&mut self, product: &Product) -> StoreResult<()> {
        self.inner.update_product(product)
    }

    fn find_variant(&self, product_id: Option<Uuid>, supplier_sku: &str) -> StoreResult<Option<Variant>> {
        self.inner.find_variant(product_id, supplier_sku)
    }

    fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        self.inner.get_product(id)
    }

    fn create_variant(&mut self, variant: Variant) -> StoreResult<()> {
        self.inner.create_variant(variant)
    }

    fn update_variant(&mut self, variant: &Variant) -> StoreResult<()> {
        self.inner.update_variant(variant)
    }

    fn find_image(&self, product_id: Uuid, src: &str) -> StoreResult<Option<Image>> {
        self.inner.find_image(product_id, src)
    }

    fn create_image(&mut self, image: Image) -> StoreResult<()> {
        self.inner.create_image(image)
    }

    fn update_image(&mut self, image: &Image) -> StoreResult<()> {
        self.inner.update_image(image)
    }

    fn find_inventory_item(&self, variant_id: Uuid) -> StoreResult<Option<InventoryItem>> {
        self.inner.find_inventory_item(variant_id)
    }

    fn create_inventory_item(&mut self, item: InventoryItem) -> StoreResult<()> {
        self.inner.create_inventory_item(item)
    }

    fn update_inventory_item(&mut self, item: &InventoryItem) -> StoreResult<()> {
        self.inner.update_inventory_item(item)
    }

    fn find_inventory_level(&self, item_id: Uuid, location_gid: &str) -> StoreResult<Option<InventoryLevel>> {
        self.inner.find_inventory_level(item_id, location_gid)
    }

    fn create_inventory_level(&mut self, level: InventoryLevel) -> StoreResult<()> {
        self.inner.create_inventory_level(level)
    }

    fn update_inventory_level(&mut self, level: &InventoryLevel) -> StoreResult<()> {
        self.inner.update_inventory_level(level)
    }
}
