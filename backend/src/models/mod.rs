//! Canonical product model shared by every provider.
//!
//! This module contains the normalized records the parser engine produces and
//! the persistence adapter consumes:
//!
//! - [`CanonicalProduct`] - product-level display fields, variants, images, metadata
//! - [`CanonicalVariant`] - one purchasable SKU with pricing and inventory
//! - [`CanonicalImage`] - one product image
//! - [`FieldValue`] - dynamic value type for raw and transformed data
//!
//! Every addressable field is listed in a table together with its
//! [`FieldKind`]. Assignment uses the kind to convert dynamic values, and the
//! validator uses it to check populated fields.

pub mod path;
pub mod value;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AssignError;

pub use path::{Destination, SchemaVersion, SourcePath, VariantTarget};
pub use value::FieldValue;

// =============================================================================
// Field kinds
// =============================================================================

/// Semantic type of a canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Integer,
    Bool,
    TextList,
}

impl FieldKind {
    pub fn describe(self) -> &'static str {
        match self {
            FieldKind::Text => "string",
            FieldKind::Number => "number",
            FieldKind::Integer => "integer",
            FieldKind::Bool => "bool",
            FieldKind::TextList => "list of strings",
        }
    }
}

fn mismatch(field: &str, kind: FieldKind, value: &FieldValue) -> AssignError {
    AssignError::TypeMismatch {
        field: field.to_string(),
        expected: kind.describe(),
        actual: value.type_name(),
    }
}

fn expect_text(field: &str, value: FieldValue) -> Result<String, AssignError> {
    match value {
        FieldValue::Text(s) => Ok(s),
        other => Err(mismatch(field, FieldKind::Text, &other)),
    }
}

fn expect_number(field: &str, value: FieldValue) -> Result<Decimal, AssignError> {
    match value {
        FieldValue::Int(_) | FieldValue::Float(_) | FieldValue::Decimal(_) => value
            .as_decimal()
            .ok_or_else(|| mismatch(field, FieldKind::Number, &value)),
        other => Err(mismatch(field, FieldKind::Number, &other)),
    }
}

fn expect_integer(field: &str, value: FieldValue) -> Result<i64, AssignError> {
    match value {
        FieldValue::Int(i) => Ok(i),
        other => Err(mismatch(field, FieldKind::Integer, &other)),
    }
}

fn expect_bool(field: &str, value: FieldValue) -> Result<bool, AssignError> {
    match value {
        FieldValue::Bool(b) => Ok(b),
        other => Err(mismatch(field, FieldKind::Bool, &other)),
    }
}

/// Lists must hold strings only; a single string is split on commas the way
/// storefront tag strings are.
fn expect_text_list(field: &str, value: FieldValue) -> Result<Vec<String>, AssignError> {
    match value {
        FieldValue::Text(s) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()),
        FieldValue::List(items) => items
            .into_iter()
            .map(|item| match item {
                FieldValue::Text(s) => Ok(s),
                other => Err(mismatch(field, FieldKind::TextList, &other)),
            })
            .collect(),
        other => Err(mismatch(field, FieldKind::TextList, &other)),
    }
}

fn text(value: &Option<String>) -> Option<FieldValue> {
    value.clone().map(FieldValue::Text)
}

fn number(value: &Option<Decimal>) -> Option<FieldValue> {
    value.map(FieldValue::Decimal)
}

fn integer(value: &Option<i64>) -> Option<FieldValue> {
    value.map(FieldValue::Int)
}

fn boolean(value: &Option<bool>) -> Option<FieldValue> {
    value.map(FieldValue::Bool)
}

// =============================================================================
// Product
// =============================================================================

/// Scalar product-level fields addressable by a mapping destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Title,
    Description,
    Vendor,
    ProductType,
    Handle,
    Tags,
}

const PRODUCT_FIELDS: &[(ProductField, &str, FieldKind)] = &[
    (ProductField::Title, "title", FieldKind::Text),
    (ProductField::Description, "description", FieldKind::Text),
    (ProductField::Vendor, "vendor", FieldKind::Text),
    (ProductField::ProductType, "product_type", FieldKind::Text),
    (ProductField::Handle, "handle", FieldKind::Text),
    (ProductField::Tags, "tags", FieldKind::TextList),
];

impl ProductField {
    pub fn all() -> impl Iterator<Item = ProductField> {
        PRODUCT_FIELDS.iter().map(|(f, _, _)| *f)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        PRODUCT_FIELDS
            .iter()
            .find(|(_, n, _)| *n == name)
            .map(|(f, _, _)| *f)
    }

    pub fn name(self) -> &'static str {
        PRODUCT_FIELDS
            .iter()
            .find(|(f, _, _)| *f == self)
            .map_or("", |(_, n, _)| n)
    }

    pub fn kind(self) -> FieldKind {
        PRODUCT_FIELDS
            .iter()
            .find(|(f, _, _)| *f == self)
            .map_or(FieldKind::Text, |(_, _, k)| *k)
    }
}

/// The normalized product every provider maps into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProduct {
    pub title: Option<String>,
    pub description: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    /// URL slug; synthesized from the title at persistence time when absent.
    pub handle: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub variants: Vec<CanonicalVariant>,
    #[serde(default)]
    pub images: Vec<CanonicalImage>,
    #[serde(default)]
    pub metadata: BTreeMap<String, FieldValue>,
}

impl CanonicalProduct {
    pub fn set(&mut self, field: ProductField, value: FieldValue) -> Result<(), AssignError> {
        let name = field.name();
        match field {
            ProductField::Title => self.title = Some(expect_text(name, value)?),
            ProductField::Description => self.description = Some(expect_text(name, value)?),
            ProductField::Vendor => self.vendor = Some(expect_text(name, value)?),
            ProductField::ProductType => self.product_type = Some(expect_text(name, value)?),
            ProductField::Handle => self.handle = Some(expect_text(name, value)?),
            ProductField::Tags => self.tags = expect_text_list(name, value)?,
        }
        Ok(())
    }

    pub fn get(&self, field: ProductField) -> Option<FieldValue> {
        match field {
            ProductField::Title => text(&self.title),
            ProductField::Description => text(&self.description),
            ProductField::Vendor => text(&self.vendor),
            ProductField::ProductType => text(&self.product_type),
            ProductField::Handle => text(&self.handle),
            ProductField::Tags if self.tags.is_empty() => None,
            ProductField::Tags => Some(FieldValue::List(
                self.tags.iter().cloned().map(FieldValue::Text).collect(),
            )),
        }
    }

    /// Variant at `index`, right-padding the list with empty variants.
    pub fn variant_mut(&mut self, index: usize) -> &mut CanonicalVariant {
        if index >= self.variants.len() {
            self.variants.resize_with(index + 1, CanonicalVariant::default);
        }
        &mut self.variants[index]
    }

    /// Image at `index`, right-padding the list with empty images.
    pub fn image_mut(&mut self, index: usize) -> &mut CanonicalImage {
        if index >= self.images.len() {
            self.images.resize_with(index + 1, CanonicalImage::default);
        }
        &mut self.images[index]
    }

    /// First non-empty supplier SKU across variants.
    pub fn primary_supplier_sku(&self) -> Option<&str> {
        self.variants
            .iter()
            .filter_map(|v| v.supplier_sku.as_deref())
            .find(|sku| !sku.is_empty())
    }
}

// =============================================================================
// Variant
// =============================================================================

/// Variant fields addressable by `variants.<index>.<field>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantField {
    SupplierSku,
    Barcode,
    Price,
    CompareAtPrice,
    Cost,
    Grams,
    Taxable,
    RequiresShipping,
    Tracked,
    Quantity,
    Option1,
    Option2,
    Option3,
    Title,
    Sku,
    Position,
    InventoryPolicy,
    InventoryManagement,
}

const VARIANT_FIELDS: &[(VariantField, &str, FieldKind)] = &[
    (VariantField::SupplierSku, "supplier_sku", FieldKind::Text),
    (VariantField::Barcode, "barcode", FieldKind::Text),
    (VariantField::Price, "price", FieldKind::Number),
    (VariantField::CompareAtPrice, "compare_at_price", FieldKind::Number),
    (VariantField::Cost, "cost", FieldKind::Number),
    (VariantField::Grams, "grams", FieldKind::Integer),
    (VariantField::Taxable, "taxable", FieldKind::Bool),
    (VariantField::RequiresShipping, "requires_shipping", FieldKind::Bool),
    (VariantField::Tracked, "tracked", FieldKind::Bool),
    (VariantField::Quantity, "quantity", FieldKind::Integer),
    (VariantField::Option1, "option1", FieldKind::Text),
    (VariantField::Option2, "option2", FieldKind::Text),
    (VariantField::Option3, "option3", FieldKind::Text),
    (VariantField::Title, "title", FieldKind::Text),
    (VariantField::Sku, "sku", FieldKind::Text),
    (VariantField::Position, "position", FieldKind::Integer),
    (VariantField::InventoryPolicy, "inventory_policy", FieldKind::Text),
    (VariantField::InventoryManagement, "inventory_management", FieldKind::Text),
];

impl VariantField {
    pub fn all() -> impl Iterator<Item = VariantField> {
        VARIANT_FIELDS.iter().map(|(f, _, _)| *f)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        VARIANT_FIELDS
            .iter()
            .find(|(_, n, _)| *n == name)
            .map(|(f, _, _)| *f)
    }

    pub fn name(self) -> &'static str {
        VARIANT_FIELDS
            .iter()
            .find(|(f, _, _)| *f == self)
            .map_or("", |(_, n, _)| n)
    }

    pub fn kind(self) -> FieldKind {
        VARIANT_FIELDS
            .iter()
            .find(|(f, _, _)| *f == self)
            .map_or(FieldKind::Text, |(_, _, k)| *k)
    }
}

/// One purchasable SKU of a [`CanonicalProduct`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalVariant {
    /// Supplier-side SKU; the business key for variant matching.
    pub supplier_sku: Option<String>,
    pub barcode: Option<String>,
    pub price: Option<Decimal>,
    pub compare_at_price: Option<Decimal>,
    /// Unit cost, copied onto the inventory item.
    pub cost: Option<Decimal>,
    pub grams: Option<i64>,
    pub taxable: Option<bool>,
    pub requires_shipping: Option<bool>,
    pub tracked: Option<bool>,
    /// Available quantity at the default location.
    pub quantity: Option<i64>,
    pub option1: Option<String>,
    pub option2: Option<String>,
    pub option3: Option<String>,
    pub title: Option<String>,
    /// Store-side SKU, when it differs from the supplier's.
    pub sku: Option<String>,
    pub position: Option<i64>,
    pub inventory_policy: Option<String>,
    pub inventory_management: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, FieldValue>,
}

impl CanonicalVariant {
    pub fn set(&mut self, field: VariantField, value: FieldValue) -> Result<(), AssignError> {
        let name = field.name();
        match field {
            VariantField::SupplierSku => self.supplier_sku = Some(expect_text(name, value)?),
            VariantField::Barcode => self.barcode = Some(expect_text(name, value)?),
            VariantField::Price => self.price = Some(expect_number(name, value)?),
            VariantField::CompareAtPrice => {
                self.compare_at_price = Some(expect_number(name, value)?)
            }
            VariantField::Cost => self.cost = Some(expect_number(name, value)?),
            VariantField::Grams => self.grams = Some(expect_integer(name, value)?),
            VariantField::Taxable => self.taxable = Some(expect_bool(name, value)?),
            VariantField::RequiresShipping => {
                self.requires_shipping = Some(expect_bool(name, value)?)
            }
            VariantField::Tracked => self.tracked = Some(expect_bool(name, value)?),
            VariantField::Quantity => self.quantity = Some(expect_integer(name, value)?),
            VariantField::Option1 => self.option1 = Some(expect_text(name, value)?),
            VariantField::Option2 => self.option2 = Some(expect_text(name, value)?),
            VariantField::Option3 => self.option3 = Some(expect_text(name, value)?),
            VariantField::Title => self.title = Some(expect_text(name, value)?),
            VariantField::Sku => self.sku = Some(expect_text(name, value)?),
            VariantField::Position => self.position = Some(expect_integer(name, value)?),
            VariantField::InventoryPolicy => {
                self.inventory_policy = Some(expect_text(name, value)?)
            }
            VariantField::InventoryManagement => {
                self.inventory_management = Some(expect_text(name, value)?)
            }
        }
        Ok(())
    }

    pub fn get(&self, field: VariantField) -> Option<FieldValue> {
        match field {
            VariantField::SupplierSku => text(&self.supplier_sku),
            VariantField::Barcode => text(&self.barcode),
            VariantField::Price => number(&self.price),
            VariantField::CompareAtPrice => number(&self.compare_at_price),
            VariantField::Cost => number(&self.cost),
            VariantField::Grams => integer(&self.grams),
            VariantField::Taxable => boolean(&self.taxable),
            VariantField::RequiresShipping => boolean(&self.requires_shipping),
            VariantField::Tracked => boolean(&self.tracked),
            VariantField::Quantity => integer(&self.quantity),
            VariantField::Option1 => text(&self.option1),
            VariantField::Option2 => text(&self.option2),
            VariantField::Option3 => text(&self.option3),
            VariantField::Title => text(&self.title),
            VariantField::Sku => text(&self.sku),
            VariantField::Position => integer(&self.position),
            VariantField::InventoryPolicy => text(&self.inventory_policy),
            VariantField::InventoryManagement => text(&self.inventory_management),
        }
    }

    /// Supplier SKU if present and non-empty.
    pub fn business_key(&self) -> Option<&str> {
        self.supplier_sku.as_deref().filter(|s| !s.is_empty())
    }
}

// =============================================================================
// Image
// =============================================================================

/// Image fields addressable by `images.<index>.<field>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageField {
    Src,
    Position,
    Alt,
    Width,
    Height,
}

const IMAGE_FIELDS: &[(ImageField, &str, FieldKind)] = &[
    (ImageField::Src, "src", FieldKind::Text),
    (ImageField::Position, "position", FieldKind::Integer),
    (ImageField::Alt, "alt", FieldKind::Text),
    (ImageField::Width, "width", FieldKind::Integer),
    (ImageField::Height, "height", FieldKind::Integer),
];

impl ImageField {
    pub fn all() -> impl Iterator<Item = ImageField> {
        IMAGE_FIELDS.iter().map(|(f, _, _)| *f)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        IMAGE_FIELDS
            .iter()
            .find(|(_, n, _)| *n == name)
            .map(|(f, _, _)| *f)
    }

    pub fn name(self) -> &'static str {
        IMAGE_FIELDS
            .iter()
            .find(|(f, _, _)| *f == self)
            .map_or("", |(_, n, _)| n)
    }

    pub fn kind(self) -> FieldKind {
        IMAGE_FIELDS
            .iter()
            .find(|(f, _, _)| *f == self)
            .map_or(FieldKind::Text, |(_, _, k)| *k)
    }
}

/// One product image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalImage {
    pub src: Option<String>,
    pub position: Option<i64>,
    pub alt: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

impl CanonicalImage {
    pub fn set(&mut self, field: ImageField, value: FieldValue) -> Result<(), AssignError> {
        let name = field.name();
        match field {
            ImageField::Src => self.src = Some(expect_text(name, value)?),
            ImageField::Position => self.position = Some(expect_integer(name, value)?),
            ImageField::Alt => self.alt = Some(expect_text(name, value)?),
            ImageField::Width => self.width = Some(expect_integer(name, value)?),
            ImageField::Height => self.height = Some(expect_integer(name, value)?),
        }
        Ok(())
    }

    pub fn get(&self, field: ImageField) -> Option<FieldValue> {
        match field {
            ImageField::Src => text(&self.src),
            ImageField::Position => integer(&self.position),
            ImageField::Alt => text(&self.alt),
            ImageField::Width => integer(&self.width),
            ImageField::Height => integer(&self.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_tables_round_trip_names() {
        for field in ProductField::all() {
            assert_eq!(ProductField::from_name(field.name()), Some(field));
        }
        for field in VariantField::all() {
            assert_eq!(VariantField::from_name(field.name()), Some(field));
        }
        for field in ImageField::all() {
            assert_eq!(ImageField::from_name(field.name()), Some(field));
        }
    }

    #[test]
    fn test_variant_mut_pads_with_defaults() {
        let mut product = CanonicalProduct::default();
        product.variant_mut(2).price = Some(Decimal::new(500, 2));

        assert_eq!(product.variants.len(), 3);
        assert_eq!(product.variants[0], CanonicalVariant::default());
        assert_eq!(product.variants[1], CanonicalVariant::default());
        assert_eq!(product.variants[2].price, Some(Decimal::new(500, 2)));
    }

    #[test]
    fn test_set_rejects_wrong_type() {
        let mut variant = CanonicalVariant::default();
        let err = variant
            .set(VariantField::Quantity, FieldValue::Text("5".into()))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected integer for 'quantity', got string"
        );
        assert_eq!(variant.quantity, None);
    }

    #[test]
    fn test_number_fields_accept_any_numeric() {
        let mut variant = CanonicalVariant::default();
        variant.set(VariantField::Price, FieldValue::Int(3)).unwrap();
        assert_eq!(variant.price, Some(Decimal::from(3)));
        variant
            .set(VariantField::Cost, FieldValue::Decimal(Decimal::new(125, 2)))
            .unwrap();
        assert_eq!(variant.cost, Some(Decimal::new(125, 2)));
    }

    #[test]
    fn test_tags_split_comma_string() {
        let mut product = CanonicalProduct::default();
        product
            .set(ProductField::Tags, FieldValue::Text("summer, sale,,new".into()))
            .unwrap();
        assert_eq!(product.tags, vec!["summer", "sale", "new"]);

        let err = product
            .set(ProductField::Tags, FieldValue::List(vec![FieldValue::Int(1)]))
            .unwrap_err();
        assert!(err.to_string().contains("list of strings"));
    }

    #[test]
    fn test_primary_supplier_sku_skips_empty() {
        let product = CanonicalProduct {
            variants: vec![
                CanonicalVariant {
                    supplier_sku: Some(String::new()),
                    ..Default::default()
                },
                CanonicalVariant {
                    supplier_sku: Some("SKU-2".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(product.primary_supplier_sku(), Some("SKU-2"));
    }
}
