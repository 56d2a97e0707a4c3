//! Canonical product validation.
//!
//! Two entry points:
//!
//! - [`validate`] checks a typed [`CanonicalProduct`]: required paths are
//!   resolved with the same addressing as mapping destinations, then every
//!   populated field is checked against its domain (non-negative money,
//!   positions starting at 1, non-blank tags and metadata keys).
//! - [`validate_document`] checks an untyped canonical JSON document (for
//!   example a previously exported file) against the embedded JSON Schema
//!   `schemas/canonical-product.json`, Draft 7.
//!
//! Issues are advisory; the pipeline only acts on them when asked to.
//!
//! # Example
//!
//! ```rust,ignore
//! use feedload::models::CanonicalProduct;
//! use feedload::validation::{validate, is_valid};
//!
//! let product = CanonicalProduct { title: Some("Lamp".into()), ..Default::default() };
//! assert!(is_valid(&product));
//! assert!(!validate(&product, &["title", "variants.0.supplier_sku"]).is_empty());
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::models::{CanonicalProduct, Destination, FieldValue, SchemaVersion};

/// Required paths used by [`is_valid`].
pub const DEFAULT_REQUIRED_FIELDS: &[&str] = &["title"];

const CANONICAL_SCHEMA: &str = include_str!("../../schemas/canonical-product.json");

/// One problem found on a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Check required paths and field domains, collecting every issue.
pub fn validate(product: &CanonicalProduct, required_fields: &[&str]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for path in required_fields {
        let value = Destination::parse(path, SchemaVersion::V2)
            .ok()
            .and_then(|dest| dest.resolve(product));
        if value.as_ref().map_or(true, FieldValue::is_blank) {
            issues.push(ValidationIssue::new(*path, "Missing required value"));
        }
    }

    for (idx, tag) in product.tags.iter().enumerate() {
        if tag.trim().is_empty() {
            issues.push(ValidationIssue::new(format!("tags[{}]", idx), "Blank tag"));
        }
    }
    check_metadata(&product.metadata, "metadata", &mut issues);

    for (idx, variant) in product.variants.iter().enumerate() {
        let prefix = format!("variants[{}]", idx);
        for (name, amount) in [
            ("price", variant.price),
            ("compare_at_price", variant.compare_at_price),
            ("cost", variant.cost),
        ] {
            check_non_negative(amount, &prefix, name, &mut issues);
        }
        if variant.grams.is_some_and(|g| g < 0) {
            issues.push(ValidationIssue::new(format!("{}.grams", prefix), "Must not be negative"));
        }
        check_position(variant.position, &prefix, &mut issues);
        check_metadata(&variant.metadata, &format!("{}.metadata", prefix), &mut issues);
    }

    for (idx, image) in product.images.iter().enumerate() {
        let prefix = format!("images[{}]", idx);
        check_position(image.position, &prefix, &mut issues);
        for (name, size) in [("width", image.width), ("height", image.height)] {
            if size.is_some_and(|s| s <= 0) {
                issues.push(ValidationIssue::new(format!("{}.{}", prefix, name), "Must be positive"));
            }
        }
    }

    issues
}

/// `true` when the product has no issues against [`DEFAULT_REQUIRED_FIELDS`].
pub fn is_valid(product: &CanonicalProduct) -> bool {
    validate(product, DEFAULT_REQUIRED_FIELDS).is_empty()
}

/// Validate a batch, concatenating issues in product order.
pub fn validate_products<'a, I>(products: I, required_fields: &[&str]) -> Vec<ValidationIssue>
where
    I: IntoIterator<Item = &'a CanonicalProduct>,
{
    products
        .into_iter()
        .flat_map(|product| validate(product, required_fields))
        .collect()
}

fn check_non_negative(amount: Option<Decimal>, prefix: &str, name: &str, issues: &mut Vec<ValidationIssue>) {
    if amount.is_some_and(|a| a.is_sign_negative() && !a.is_zero()) {
        issues.push(ValidationIssue::new(format!("{}.{}", prefix, name), "Must not be negative"));
    }
}

fn check_position(position: Option<i64>, prefix: &str, issues: &mut Vec<ValidationIssue>) {
    if position.is_some_and(|p| p < 1) {
        issues.push(ValidationIssue::new(format!("{}.position", prefix), "Must be at least 1"));
    }
}

fn check_metadata(metadata: &BTreeMap<String, FieldValue>, path: &str, issues: &mut Vec<ValidationIssue>) {
    if metadata.keys().any(|k| k.trim().is_empty()) {
        issues.push(ValidationIssue::new(path, "Metadata keys must not be blank"));
    }
    for (key, value) in metadata {
        if matches!(value, FieldValue::Float(f) if !f.is_finite()) {
            issues.push(ValidationIssue::new(format!("{}.{}", path, key), "Expected finite number"));
        }
    }
}

// =============================================================================
// JSON Schema validation of untyped documents
// =============================================================================

/// Validate a JSON value against a Draft 7 schema.
fn validate_schema(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check an exported canonical document against the embedded schema.
pub fn validate_document(data: &Value) -> Vec<ValidationIssue> {
    let schema: Value = match serde_json::from_str(CANONICAL_SCHEMA) {
        Ok(schema) => schema,
        Err(e) => return vec![ValidationIssue::new("$", format!("Invalid embedded schema: {}", e))],
    };
    match validate_schema(&schema, data) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .into_iter()
            .map(|message| ValidationIssue::new("$", message))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CanonicalImage, CanonicalVariant};
    use serde_json::json;

    fn paths(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.path.as_str()).collect()
    }

    #[test]
    fn test_reports_missing_required_fields() {
        let product = CanonicalProduct::default();
        let issues = validate(&product, &["title", "variants.0.supplier_sku"]);

        assert_eq!(paths(&issues), vec!["title", "variants.0.supplier_sku"]);
        assert!(issues.iter().all(|i| i.message == "Missing required value"));
    }

    #[test]
    fn test_blank_string_counts_as_missing() {
        let product = CanonicalProduct {
            title: Some("   ".into()),
            ..Default::default()
        };
        assert!(!is_valid(&product));
    }

    #[test]
    fn test_accepts_valid_variant() {
        let product = CanonicalProduct {
            title: Some("Product".into()),
            variants: vec![CanonicalVariant {
                supplier_sku: Some("sku-1".into()),
                quantity: Some(2),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(validate(&product, &["title", "variants.0.supplier_sku"]), vec![]);
        assert!(is_valid(&product));
    }

    #[test]
    fn test_domain_checks_collect_everything() {
        let product = CanonicalProduct {
            title: Some("Lamp".into()),
            tags: vec!["ok".into(), " ".into()],
            variants: vec![CanonicalVariant {
                price: Some(Decimal::new(-100, 2)),
                cost: Some(Decimal::ZERO),
                grams: Some(-5),
                position: Some(0),
                ..Default::default()
            }],
            images: vec![CanonicalImage {
                src: Some("http://img".into()),
                width: Some(0),
                ..Default::default()
            }],
            metadata: BTreeMap::from([(String::new(), FieldValue::Float(f64::NAN))]),
            ..Default::default()
        };

        let issues = validate(&product, DEFAULT_REQUIRED_FIELDS);
        assert_eq!(
            paths(&issues),
            vec![
                "tags[1]",
                "metadata",
                "metadata.",
                "variants[0].price",
                "variants[0].grams",
                "variants[0].position",
                "images[0].width",
            ]
        );
    }

    #[test]
    fn test_batch_validation() {
        let good = CanonicalProduct {
            title: Some("A".into()),
            ..Default::default()
        };
        let bad = CanonicalProduct::default();
        let issues = validate_products([&good, &bad, &bad], DEFAULT_REQUIRED_FIELDS);
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_exported_product_matches_schema() {
        let product = CanonicalProduct {
            title: Some("Lamp".into()),
            tags: vec!["home".into()],
            variants: vec![CanonicalVariant {
                supplier_sku: Some("L-1".into()),
                price: Some(Decimal::new(1999, 2)),
                quantity: Some(3),
                ..Default::default()
            }],
            ..Default::default()
        };
        let document = serde_json::to_value(&product).unwrap();
        assert_eq!(validate_document(&document), vec![]);
    }

    #[test]
    fn test_document_type_mismatches_reported() {
        let document = json!({
            "title": 42,
            "variants": [{ "price": "cheap", "quantity": "3" }]
        });
        let issues = validate_document(&document);
        assert!(issues.len() >= 3, "{:?}", issues);
        assert!(issues.iter().all(|i| i.path == "$"));
    }
}
