//! Dotted paths into raw records and canonical records.
//!
//! Source paths walk plain JSON objects. Destination paths are compiled once,
//! when the provider config is loaded, into a typed [`Destination`]; a
//! malformed destination is a config issue instead of a per-record failure.
//!
//! ```text
//! title                      → Destination::Product(Title)
//! variants.2.price           → Destination::Variant { index: 2, Field(Price) }
//! variants.0.metadata.color  → Destination::Variant { index: 0, Metadata("color") }
//! images.1.src               → Destination::Image { index: 1, field: Src }
//! metadata.season            → Destination::Metadata("season")
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    CanonicalImage, CanonicalProduct, CanonicalVariant, FieldKind, FieldValue, ImageField,
    ProductField, VariantField,
};
use crate::error::AssignError;

/// Largest list index a destination may address.
pub const MAX_LIST_INDEX: usize = 999;

/// Destination path dialect of a provider config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// Legacy nested layout (`basic_info.title`, `identifiers.sku`, ...),
    /// compiled onto the current canonical record.
    V1,
    /// Flat layout matching [`CanonicalProduct`] directly.
    #[default]
    V2,
}

impl SchemaVersion {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "v1" => Some(SchemaVersion::V1),
            "v2" => Some(SchemaVersion::V2),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaVersion::V1 => "v1",
            SchemaVersion::V2 => "v2",
        }
    }
}

// =============================================================================
// Source paths
// =============================================================================

/// Dot-separated key path into a raw JSON record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePath {
    raw: String,
    segments: Vec<String>,
}

impl SourcePath {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            segments: raw.split('.').map(str::to_string).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Walk the record; a missing key or a non-object intermediate is absent.
    pub fn extract<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        let mut current = record;
        for segment in &self.segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}

// =============================================================================
// Destinations
// =============================================================================

/// Target inside a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantTarget {
    Field(VariantField),
    Metadata(String),
}

impl VariantTarget {
    fn assign(&self, variant: &mut CanonicalVariant, value: FieldValue) -> Result<(), AssignError> {
        match self {
            VariantTarget::Field(field) => variant.set(*field, value),
            VariantTarget::Metadata(key) => {
                variant.metadata.insert(key.clone(), value);
                Ok(())
            }
        }
    }
}

/// A compiled destination inside a [`CanonicalProduct`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Product(ProductField),
    Metadata(String),
    Variant { index: usize, target: VariantTarget },
    Image { index: usize, field: ImageField },
}

impl Destination {
    /// Compile a dotted destination path in the given dialect.
    pub fn parse(path: &str, version: SchemaVersion) -> Result<Self, String> {
        let parts: Vec<&str> = path.split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err("Empty path segment".to_string());
        }
        match version {
            SchemaVersion::V2 => parse_v2(&parts),
            SchemaVersion::V1 => parse_v1(&parts),
        }
    }

    /// Semantic type expected at this destination, `None` for free-form metadata.
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            Destination::Product(field) => Some(field.kind()),
            Destination::Variant {
                target: VariantTarget::Field(field),
                ..
            } => Some(field.kind()),
            Destination::Image { field, .. } => Some(field.kind()),
            Destination::Metadata(_)
            | Destination::Variant {
                target: VariantTarget::Metadata(_),
                ..
            } => None,
        }
    }

    /// Write `value`, growing variant/image lists as needed. A rejected value
    /// leaves `product` untouched.
    pub fn assign(&self, product: &mut CanonicalProduct, value: FieldValue) -> Result<(), AssignError> {
        match self {
            Destination::Product(field) => product.set(*field, value),
            Destination::Metadata(key) => {
                product.metadata.insert(key.clone(), value);
                Ok(())
            }
            // Lists only grow once the value has been accepted.
            Destination::Variant { index, target } => {
                if let Some(variant) = product.variants.get_mut(*index) {
                    return target.assign(variant, value);
                }
                let mut variant = CanonicalVariant::default();
                target.assign(&mut variant, value)?;
                *product.variant_mut(*index) = variant;
                Ok(())
            }
            Destination::Image { index, field } => {
                if let Some(image) = product.images.get_mut(*index) {
                    return image.set(*field, value);
                }
                let mut image = CanonicalImage::default();
                image.set(*field, value)?;
                *product.image_mut(*index) = image;
                Ok(())
            }
        }
    }

    /// Read the current value without growing anything.
    pub fn resolve(&self, product: &CanonicalProduct) -> Option<FieldValue> {
        match self {
            Destination::Product(field) => product.get(*field),
            Destination::Metadata(key) => product.metadata.get(key).cloned(),
            Destination::Variant { index, target } => {
                let variant = product.variants.get(*index)?;
                match target {
                    VariantTarget::Field(field) => variant.get(*field),
                    VariantTarget::Metadata(key) => variant.metadata.get(key).cloned(),
                }
            }
            Destination::Image { index, field } => product.images.get(*index)?.get(*field),
        }
    }
}

fn parse_index(raw: &str) -> Result<usize, String> {
    let index: usize = raw
        .parse()
        .map_err(|_| format!("'{}' is not a list index", raw))?;
    if index > MAX_LIST_INDEX {
        return Err(format!("Index {} exceeds {}", index, MAX_LIST_INDEX));
    }
    Ok(index)
}

fn single_key(root: &str, rest: &[&str]) -> Result<String, String> {
    match rest {
        [key] => Ok((*key).to_string()),
        _ => Err(format!("Expected {}.<key>", root)),
    }
}

fn parse_v2(parts: &[&str]) -> Result<Destination, String> {
    match parts {
        ["variants", rest @ ..] => parse_variant_v2(rest),
        ["images", rest @ ..] => match rest {
            [index, field] => {
                let index = parse_index(index)?;
                let field = ImageField::from_name(field)
                    .ok_or_else(|| format!("Unknown image field '{}'", field))?;
                Ok(Destination::Image { index, field })
            }
            _ => Err("Expected images.<index>.<field>".to_string()),
        },
        ["metadata", rest @ ..] => Ok(Destination::Metadata(single_key("metadata", rest)?)),
        [field] => ProductField::from_name(field)
            .map(Destination::Product)
            .ok_or_else(|| format!("Unknown product field '{}'", field)),
        _ => Err(format!("Unknown destination root '{}'", parts[0])),
    }
}

fn parse_variant_v2(rest: &[&str]) -> Result<Destination, String> {
    match rest {
        [index, "metadata", tail @ ..] => Ok(Destination::Variant {
            index: parse_index(index)?,
            target: VariantTarget::Metadata(single_key("variants.<index>.metadata", tail)?),
        }),
        [index, field] => {
            let index = parse_index(index)?;
            let field = VariantField::from_name(field)
                .ok_or_else(|| format!("Unknown variant field '{}'", field))?;
            Ok(Destination::Variant {
                index,
                target: VariantTarget::Field(field),
            })
        }
        _ => Err("Expected variants.<index>.<field>".to_string()),
    }
}

fn primary_variant(field: VariantField) -> Destination {
    Destination::Variant {
        index: 0,
        target: VariantTarget::Field(field),
    }
}

/// The legacy layout grouped fields by topic; each legacy path lands on the
/// closest current field, or in metadata when there is none.
fn parse_v1(parts: &[&str]) -> Result<Destination, String> {
    let dest = match parts {
        ["identifiers", "sku"] => primary_variant(VariantField::SupplierSku),
        ["identifiers", "upc_ean"] => primary_variant(VariantField::Barcode),
        ["identifiers", "mpn"] => Destination::Metadata("mpn".to_string()),
        ["basic_info", "title"] => Destination::Product(ProductField::Title),
        ["basic_info", "description_text" | "description_html"] => {
            Destination::Product(ProductField::Description)
        }
        ["basic_info", "brand"] => Destination::Product(ProductField::Vendor),
        ["pricing", "cost"] => primary_variant(VariantField::Cost),
        ["pricing", "msrp"] => primary_variant(VariantField::CompareAtPrice),
        ["pricing", "map"] => Destination::Variant {
            index: 0,
            target: VariantTarget::Metadata("map".to_string()),
        },
        ["pricing", "currency"] => Destination::Metadata("currency".to_string()),
        ["inventory", "quantity"] => primary_variant(VariantField::Quantity),
        ["inventory", "warehouse_name"] => Destination::Metadata("warehouse_name".to_string()),
        ["classification", "category" | "product_type"] => {
            Destination::Product(ProductField::ProductType)
        }
        ["classification", "tags"] => Destination::Product(ProductField::Tags),
        ["classification", "gender"] => Destination::Metadata("gender".to_string()),
        ["media", "images", index, field] => {
            let field = match *field {
                "url" => ImageField::Src,
                "position" => ImageField::Position,
                other => return Err(format!("Unknown image field '{}'", other)),
            };
            Destination::Image {
                index: parse_index(index)?,
                field,
            }
        }
        ["attributes", rest @ ..] => Destination::Metadata(single_key("attributes", rest)?),
        ["variants", index, "option_values", rest @ ..] => Destination::Variant {
            index: parse_index(index)?,
            target: VariantTarget::Metadata(single_key("option_values", rest)?),
        },
        ["variants", index, field] => {
            let field = match *field {
                "sku" => VariantField::SupplierSku,
                "inventory_quantity" => VariantField::Quantity,
                "title" => VariantField::Title,
                "price" => VariantField::Price,
                "compare_at_price" => VariantField::CompareAtPrice,
                "barcode" => VariantField::Barcode,
                other => return Err(format!("Unknown variant field '{}'", other)),
            };
            Destination::Variant {
                index: parse_index(index)?,
                target: VariantTarget::Field(field),
            }
        }
        _ => return Err(format!("Unknown v1 destination '{}'", parts.join("."))),
    };
    Ok(dest)
}
