//! In-memory catalog with journaled transactions.

use uuid::Uuid;

use super::{
    insert_row, replace_row, CatalogStore, CatalogTables, Image, InventoryItem, InventoryLevel,
    Product, ProductKey, Row, Variant,
};
use crate::error::{StoreError, StoreResult};

/// Undo state of one table since `begin`.
///
/// Rows are only appended or replaced in place, so the table length plus
/// the first original of every replaced row is enough to restore it.
#[derive(Debug, Clone)]
struct TableUndo<T> {
    len: usize,
    replaced: Vec<(usize, T)>,
}

impl<T: Row> TableUndo<T> {
    fn new(rows: &[T]) -> Self {
        Self {
            len: rows.len(),
            replaced: Vec::new(),
        }
    }

    fn record(&mut self, index: usize, previous: T) {
        // Rows appended in this transaction are dropped by the truncate.
        if index < self.len && !self.replaced.iter().any(|(i, _)| *i == index) {
            self.replaced.push((index, previous));
        }
    }

    fn restore(self, rows: &mut Vec<T>) {
        rows.truncate(self.len);
        for (index, previous) in self.replaced {
            rows[index] = previous;
        }
    }
}

#[derive(Debug, Clone)]
struct Journal {
    products: TableUndo<Product>,
    variants: TableUndo<Variant>,
    images: TableUndo<Image>,
    inventory_items: TableUndo<InventoryItem>,
    inventory_levels: TableUndo<InventoryLevel>,
}

impl Journal {
    fn new(tables: &CatalogTables) -> Self {
        Self {
            products: TableUndo::new(&tables.products),
            variants: TableUndo::new(&tables.variants),
            images: TableUndo::new(&tables.images),
            inventory_items: TableUndo::new(&tables.inventory_items),
            inventory_levels: TableUndo::new(&tables.inventory_levels),
        }
    }

    fn restore(self, tables: &mut CatalogTables) {
        self.products.restore(&mut tables.products);
        self.variants.restore(&mut tables.variants);
        self.images.restore(&mut tables.images);
        self.inventory_items.restore(&mut tables.inventory_items);
        self.inventory_levels.restore(&mut tables.inventory_levels);
    }
}

/// Catalog held in process memory.
///
/// `begin` opens an undo journal and `rollback` replays it, so a failed
/// record leaves no partial rows behind. The cost of a transaction depends
/// on the rows it touches, not on the catalog size. Writes outside a
/// transaction apply immediately.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    tables: CatalogTables,
    journal: Option<Journal>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tables(tables: CatalogTables) -> Self {
        Self {
            tables,
            journal: None,
        }
    }

    pub fn tables(&self) -> &CatalogTables {
        &self.tables
    }

    pub fn in_transaction(&self) -> bool {
        self.journal.is_some()
    }
}

impl CatalogStore for MemoryCatalog {
    fn begin(&mut self) -> StoreResult<()> {
        if self.journal.is_some() {
            return Err(StoreError::Transaction("transaction already open".into()));
        }
        self.journal = Some(Journal::new(&self.tables));
        Ok(())
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.journal
            .take()
            .map(|_| ())
            .ok_or_else(|| StoreError::Transaction("commit without open transaction".into()))
    }

    fn rollback(&mut self) -> StoreResult<()> {
        let journal = self
            .journal
            .take()
            .ok_or_else(|| StoreError::Transaction("rollback without open transaction".into()))?;
        journal.restore(&mut self.tables);
        Ok(())
    }

    fn find_product(&self, key: ProductKey, value: &str) -> StoreResult<Option<Product>> {
        Ok(self
            .tables
            .products
            .iter()
            .find(|p| p.key(key) == Some(value))
            .cloned())
    }

    fn create_product(&mut self, product: Product) -> StoreResult<()> {
        insert_row(&mut self.tables.products, product)
    }

    fn update_product(&mut self, product: &Product) -> StoreResult<()> {
        let (index, previous) = replace_row(&mut self.tables.products, product)?;
        if let Some(journal) = &mut self.journal {
            journal.products.record(index, previous);
        }
        Ok(())
    }

    fn find_variant(&self, product_id: Option<Uuid>, supplier_sku: &str) -> StoreResult<Option<Variant>> {
        Ok(self
            .tables
            .variants
            .iter()
            .filter(|v| product_id.map_or(true, |id| v.product_id == id))
            .find(|v| v.supplier_sku.as_deref() == Some(supplier_sku))
            .cloned())
    }

    fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        Ok(self.tables.products.iter().find(|p| p.id == id).cloned())
    }

    fn create_variant(&mut self, variant: Variant) -> StoreResult<()> {
        insert_row(&mut self.tables.variants, variant)
    }

    fn update_variant(&mut self, variant: &Variant) -> StoreResult<()> {
        let (index, previous) = replace_row(&mut self.tables.variants, variant)?;
        if let Some(journal) = &mut self.journal {
            journal.variants.record(index, previous);
        }
        Ok(())
    }

    fn find_image(&self, product_id: Uuid, src: &str) -> StoreResult<Option<Image>> {
        Ok(self
            .tables
            .images
            .iter()
            .find(|i| i.product_id == product_id && i.src == src)
            .cloned())
    }

    fn create_image(&mut self, image: Image) -> StoreResult<()> {
        insert_row(&mut self.tables.images, image)
    }

    fn update_image(&mut self, image: &Image) -> StoreResult<()> {
        let (index, previous) = replace_row(&mut self.tables.images, image)?;
        if let Some(journal) = &mut self.journal {
            journal.images.record(index, previous);
        }
        Ok(())
    }

    fn find_inventory_item(&self, variant_id: Uuid) -> StoreResult<Option<InventoryItem>> {
        Ok(self
            .tables
            .inventory_items
            .iter()
            .find(|i| i.variant_id == variant_id)
            .cloned())
    }

    fn create_inventory_item(&mut self, item: InventoryItem) -> StoreResult<()> {
        insert_row(&mut self.tables.inventory_items, item)
    }

    fn update_inventory_item(&mut self, item: &InventoryItem) -> StoreResult<()> {
        let (index, previous) = replace_row(&mut self.tables.inventory_items, item)?;
        if let Some(journal) = &mut self.journal {
            journal.inventory_items.record(index, previous);
        }
        Ok(())
    }

    fn find_inventory_level(&self, item_id: Uuid, location_gid: &str) -> StoreResult<Option<InventoryLevel>> {
        Ok(self
            .tables
            .inventory_levels
            .iter()
            .find(|l| l.inventory_item_id == item_id && l.location_gid == location_gid)
            .cloned())
    }

    fn create_inventory_level(&mut self, level: InventoryLevel) -> StoreResult<()> {
        insert_row(&mut self.tables.inventory_levels, level)
    }

    fn update_inventory_level(&mut self, level: &InventoryLevel) -> StoreResult<()> {
        let (index, previous) = replace_row(&mut self.tables.inventory_levels, level)?;
        if let Some(journal) = &mut self.journal {
            journal.inventory_levels.record(index, previous);
        }
        Ok(())
    }
}
