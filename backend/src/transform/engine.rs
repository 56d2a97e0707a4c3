//! Parser engine
//!
//! Turns raw supplier records into [`CanonicalProduct`]s by running every
//! mapping rule of a [`ProviderConfig`] against each record. Output is lazy
//! and single-pass: one product per input record, in input order.
//!
//! Per rule:
//! 1. extract the source path (missing → absent, never an error)
//! 2. substitute the rule default when absent or null, skip when still absent
//! 3. run the transform chain with merged params
//! 4. assign at the compiled destination
//!
//! Failures are recorded in the [`ParseReport`]. Under
//! [`ErrorPolicy::Continue`] the failing rule is abandoned and its siblings
//! still run; under [`ErrorPolicy::Fail`] the iterator yields the error and
//! stops.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::config::{ErrorPolicy, MappingRule, ProviderConfig};
use super::registry::TransformRegistry;
use crate::models::{CanonicalProduct, FieldValue};

/// One failed rule on one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseError {
    pub provider_id: String,
    pub record_index: usize,
    pub source: Option<String>,
    pub destination: Option<String>,
    /// Failing transform, `None` for assignment failures.
    pub transform: Option<String>,
    pub message: String,
}

impl ParseError {
    fn for_rule(
        config: &ProviderConfig,
        record_index: usize,
        rule: &MappingRule,
        transform: Option<&str>,
        message: String,
    ) -> Self {
        Self {
            provider_id: config.provider_id.clone(),
            record_index,
            source: Some(rule.source.as_str().to_string()),
            destination: Some(rule.destination.clone()),
            transform: transform.map(str::to_string),
            message,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record {}", self.record_index)?;
        if let Some(destination) = &self.destination {
            write!(f, " ({})", destination)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Ordered, append-only list of parse errors for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseReport {
    errors: Vec<ParseError>,
}

impl ParseReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Lazy parse of `records`. See the module docs for per-rule behavior.
pub fn parse_records<'a, I>(
    records: I,
    config: &'a ProviderConfig,
    registry: &'a TransformRegistry,
    report: &'a mut ParseReport,
) -> ParsedRecords<'a, I::IntoIter>
where
    I: IntoIterator<Item = Value>,
{
    ParsedRecords {
        records: records.into_iter(),
        next_index: 0,
        config,
        registry,
        report,
        halted: false,
    }
}

/// Iterator returned by [`parse_records`].
pub struct ParsedRecords<'a, I> {
    records: I,
    next_index: usize,
    config: &'a ProviderConfig,
    registry: &'a TransformRegistry,
    report: &'a mut ParseReport,
    halted: bool,
}

impl<I> ParsedRecords<'_, I> {
    /// Errors recorded so far.
    pub fn report(&self) -> &ParseReport {
        &*self.report
    }
}

impl<I> Iterator for ParsedRecords<'_, I>
where
    I: Iterator<Item = Value>,
{
    type Item = Result<CanonicalProduct, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }
        let record = self.records.next()?;
        let index = self.next_index;
        self.next_index += 1;

        let result = parse_record(&record, index, self.config, self.registry, self.report);
        if result.is_err() {
            self.halted = true;
        }
        Some(result)
    }
}

/// Parse a single record. `Err` only under [`ErrorPolicy::Fail`]; the error
/// is recorded in `report` either way.
pub fn parse_record(
    record: &Value,
    record_index: usize,
    config: &ProviderConfig,
    registry: &TransformRegistry,
    report: &mut ParseReport,
) -> Result<CanonicalProduct, ParseError> {
    let mut product = CanonicalProduct::default();

    for rule in &config.mappings {
        let extracted = rule
            .source
            .extract(record)
            .filter(|v| !v.is_null())
            .map(FieldValue::from)
            .or_else(|| rule.default.clone());
        let Some(value) = extracted else {
            continue;
        };

        let value = match run_chain(value, rule, record_index, config, registry) {
            Ok(value) => value,
            Err(error) => {
                report.record(error.clone());
                match config.error_policy {
                    ErrorPolicy::Fail => return Err(error),
                    ErrorPolicy::Continue => continue,
                }
            }
        };
        if value.is_null() {
            continue;
        }

        if let Err(e) = rule.target.assign(&mut product, value) {
            let error = ParseError::for_rule(config, record_index, rule, None, e.to_string());
            report.record(error.clone());
            if config.error_policy == ErrorPolicy::Fail {
                return Err(error);
            }
        }
    }

    Ok(product)
}

fn run_chain(
    value: FieldValue,
    rule: &MappingRule,
    record_index: usize,
    config: &ProviderConfig,
    registry: &TransformRegistry,
) -> Result<FieldValue, ParseError> {
    rule.transforms.iter().try_fold(value, |current, spec| {
        registry
            .apply(&spec.name, current, &config.merged_params(spec))
            .map_err(|e| {
                ParseError::for_rule(config, record_index, rule, Some(&spec.name), e.to_string())
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn config(policy: &str, mappings: Value) -> ProviderConfig {
        ProviderConfig::from_value(
            &json!({ "provider_id": "demo", "error_policy": policy, "mappings": mappings }),
            "<test>",
        )
        .unwrap()
    }

    fn parse_all(
        records: Vec<Value>,
        config: &ProviderConfig,
        report: &mut ParseReport,
    ) -> Vec<Result<CanonicalProduct, ParseError>> {
        let registry = TransformRegistry::with_builtins();
        parse_records(records, config, &registry, report).collect()
    }

    #[test]
    fn test_builds_canonical_product() {
        let config = config(
            "continue",
            json!([
                { "source": "Title", "destination": "title" },
                { "source": "SKU", "destination": "variants.0.supplier_sku", "transforms": [{ "name": "trim" }] },
                { "source": "Qty", "destination": "variants.0.quantity", "transforms": [{ "name": "parse_int" }] },
                { "source": "Image", "destination": "images.0.src" },
                { "source": "Meta", "destination": "metadata.extra" }
            ]),
        );
        let records = vec![json!({
            "Title": "Test", "SKU": "  abc ", "Qty": "5", "Image": "http://img", "Meta": "ok"
        })];

        let mut report = ParseReport::new();
        let parsed = parse_all(records, &config, &mut report);
        assert_eq!(parsed.len(), 1);
        let product = parsed[0].as_ref().unwrap();

        assert_eq!(product.title.as_deref(), Some("Test"));
        assert_eq!(product.variants[0].supplier_sku.as_deref(), Some("abc"));
        assert_eq!(product.variants[0].quantity, Some(5));
        assert_eq!(product.images[0].src.as_deref(), Some("http://img"));
        assert_eq!(product.metadata.get("extra"), Some(&FieldValue::Text("ok".into())));
        assert!(report.is_empty());
    }

    #[test]
    fn test_missing_source_leaves_defaults() {
        let config = config(
            "fail",
            json!([
                { "source": "Title", "destination": "title" },
                { "source": "nested.price", "destination": "variants.0.price" }
            ]),
        );
        let mut report = ParseReport::new();
        let parsed = parse_all(vec![json!({"Other": 1, "nested": "flat"})], &config, &mut report);

        assert_eq!(parsed[0].as_ref().unwrap(), &CanonicalProduct::default());
        assert!(report.is_empty());
    }

    #[test]
    fn test_continue_leaves_unmapped_and_rejected_fields_default() {
        let config = config(
            "continue",
            json!([
                { "source": "Title", "destination": "title" },
                { "source": "nested.price", "destination": "variants.0.price" },
                { "source": "Qty", "destination": "variants.2.quantity" },
                { "source": "Width", "destination": "images.0.width" }
            ]),
        );
        let mut report = ParseReport::new();
        let parsed = parse_all(
            vec![json!({"Title": "Lamp", "Qty": "five", "Width": "wide"})],
            &config,
            &mut report,
        );

        let expected = CanonicalProduct {
            title: Some("Lamp".into()),
            ..Default::default()
        };
        let product = parsed[0].as_ref().unwrap();
        assert_eq!(product, &expected);
        assert!(product.variants.is_empty());
        assert!(product.images.is_empty());

        assert_eq!(report.error_count(), 2);
        assert!(report.errors().iter().all(|e| e.transform.is_none()));
        assert_eq!(report.errors()[0].destination.as_deref(), Some("variants.2.quantity"));
    }

    #[test]
    fn test_default_used_for_absent_and_null() {
        let config = config(
            "continue",
            json!([{ "source": "Type", "destination": "product_type", "default": "Misc" }]),
        );
        let mut report = ParseReport::new();
        let parsed = parse_all(vec![json!({}), json!({"Type": null}), json!({"Type": "Bags"})], &config, &mut report);

        let types: Vec<_> = parsed
            .iter()
            .map(|p| p.as_ref().unwrap().product_type.clone())
            .collect();
        assert_eq!(types, vec![Some("Misc".into()), Some("Misc".into()), Some("Bags".into())]);
    }

    #[test]
    fn test_continue_policy_abandons_rule_only() {
        let config = config(
            "continue",
            json!([
                { "source": "Price", "destination": "variants.0.price", "transforms": [{ "name": "parse_price" }] },
                { "source": "Title", "destination": "title" }
            ]),
        );
        let mut report = ParseReport::new();
        let parsed = parse_all(
            vec![json!({"Price": "call us", "Title": "Lamp"}), json!({"Price": "9.50", "Title": "Desk"})],
            &config,
            &mut report,
        );

        assert_eq!(parsed.len(), 2);
        let first = parsed[0].as_ref().unwrap();
        assert_eq!(first.title.as_deref(), Some("Lamp"));
        assert!(first.variants.is_empty());
        assert_eq!(
            parsed[1].as_ref().unwrap().variants[0].price,
            Some(Decimal::new(950, 2))
        );

        assert_eq!(report.error_count(), 1);
        let error = &report.errors()[0];
        assert_eq!(error.provider_id, "demo");
        assert_eq!(error.record_index, 0);
        assert_eq!(error.source.as_deref(), Some("Price"));
        assert_eq!(error.destination.as_deref(), Some("variants.0.price"));
        assert_eq!(error.transform.as_deref(), Some("parse_price"));
    }

    #[test]
    fn test_fail_policy_stops_after_first_error() {
        let config = config(
            "fail",
            json!([{ "source": "Qty", "destination": "variants.0.quantity", "transforms": [{ "name": "parse_int" }] }]),
        );
        let mut report = ParseReport::new();
        let parsed = parse_all(
            vec![json!({"Qty": "3"}), json!({"Qty": "lots"}), json!({"Qty": "4"})],
            &config,
            &mut report,
        );

        assert_eq!(parsed.len(), 2);
        assert!(parsed[0].is_ok());
        let err = parsed[1].as_ref().unwrap_err();
        assert_eq!(err.record_index, 1);
        assert_eq!(report.errors(), std::slice::from_ref(err));
    }

    #[test]
    fn test_assignment_mismatch_has_no_transform() {
        let config = config(
            "continue",
            json!([{ "source": "Qty", "destination": "variants.0.quantity" }]),
        );
        let mut report = ParseReport::new();
        let parsed = parse_all(vec![json!({"Qty": "five"})], &config, &mut report);

        assert!(parsed[0].is_ok());
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.errors()[0].transform, None);
        assert!(report.errors()[0].message.contains("quantity"));
    }

    #[test]
    fn test_out_of_range_variant_index_pads() {
        let config = config(
            "continue",
            json!([{ "source": "p", "destination": "variants.2.price", "transforms": [{ "name": "parse_price" }] }]),
        );
        let mut report = ParseReport::new();
        let parsed = parse_all(vec![json!({"p": "12.00"})], &config, &mut report);

        let product = parsed[0].as_ref().unwrap();
        assert_eq!(product.variants.len(), 3);
        assert_eq!(product.variants[0].price, None);
        assert_eq!(product.variants[1].price, None);
        assert_eq!(product.variants[2].price, Some(Decimal::new(1200, 2)));
    }

    #[test]
    fn test_parsing_is_lazy() {
        let config = config("continue", json!([{ "source": "t", "destination": "title" }]));
        let registry = TransformRegistry::with_builtins();
        let mut report = ParseReport::new();

        let endless = std::iter::repeat(json!({"t": "x"}));
        let taken: Vec<_> = parse_records(endless, &config, &registry, &mut report)
            .take(3)
            .collect();
        assert_eq!(taken.len(), 3);
    }

    #[test]
    fn test_null_chain_result_skips_rule() {
        let config = config(
            "continue",
            json!([{ "source": "Qty", "destination": "variants.0.quantity", "transforms": [{ "name": "parse_int" }] }]),
        );
        let mut report = ParseReport::new();
        let parsed = parse_all(vec![json!({"Qty": "  "})], &config, &mut report);

        assert!(parsed[0].as_ref().unwrap().variants.is_empty());
        assert!(report.is_empty());
    }
}
