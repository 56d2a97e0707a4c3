//! High-level pipeline API: raw records to committed catalog rows.
//!
//! Combines every step for one run:
//!
//! 1. load and validate the provider config, check its transform names
//! 2. parse records lazily against the config
//! 3. validate each product (advisory unless [`ValidationMode::SkipInvalid`])
//! 4. persist each product in its own transaction
//!
//! Records are handled one at a time; the deadline and cancel flag are
//! checked between records. Errors carry the summary of what was committed
//! before the run stopped.
//!
//! # Example
//!
//! ```rust,ignore
//! use feedload::parser::load_records;
//! use feedload::store::JsonFileCatalog;
//! use feedload::transform::pipeline::{run_pipeline, PipelineOptions};
//!
//! let records = load_records("feed.csv")?;
//! let mut store = JsonFileCatalog::open(".feedload/catalog.json")?;
//! let (summary, report) = run_pipeline(records, "acme.json", &mut store, &PipelineOptions::default())?;
//! println!("{} products created, {} parse errors", summary.products_created, report.error_count());
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use super::config::{load_provider_config, ProviderConfig};
use super::engine::{parse_records, ParseReport};
use super::registry::{TransformRegistry, DEFAULT_REGISTRY};
use crate::error::{ConfigError, PipelineError, PipelineResult};
use crate::logs::{log_error, log_info, log_success, log_warning, log_warning_indent};
use crate::persist::{persist_one, PersistOptions, PersistSummary};
use crate::store::CatalogStore;
use crate::validation::{validate, ValidationIssue, DEFAULT_REQUIRED_FIELDS};

/// What the pipeline does with products that fail validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Log the issues and persist anyway.
    #[default]
    Advisory,
    /// Log the issues and skip the product.
    SkipInvalid,
}

/// Options for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub persist: PersistOptions,
    pub validation: ValidationMode,
    /// Paths that must hold a non-blank value, e.g. `variants.0.supplier_sku`.
    pub required_fields: Vec<String>,
    /// Stop before the next record once this instant has passed.
    pub deadline: Option<Instant>,
    /// Stop before the next record once set.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            persist: PersistOptions::default(),
            validation: ValidationMode::default(),
            required_fields: DEFAULT_REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect(),
            deadline: None,
            cancel: None,
        }
    }
}

impl PipelineOptions {
    fn should_stop(&self) -> bool {
        let cancelled = self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed));
        let expired = self.deadline.is_some_and(|deadline| Instant::now() >= deadline);
        cancelled || expired
    }
}

/// Run the pipeline with the built-in transforms.
///
/// Returns the persistence summary and every parse error recorded. On failure
/// the report is lost; use [`run_pipeline_with_report`] to keep it.
pub fn run_pipeline<I, S>(
    records: I,
    config_path: impl AsRef<Path>,
    store: &mut S,
    options: &PipelineOptions,
) -> PipelineResult<(PersistSummary, ParseReport)>
where
    I: IntoIterator<Item = Value>,
    S: CatalogStore + ?Sized,
{
    let mut report = ParseReport::new();
    let summary = run_pipeline_with_report(records, config_path, store, options, &mut report)?;
    Ok((summary, report))
}

/// Same as [`run_pipeline`] with a caller-owned report, filled even when the
/// run fails.
pub fn run_pipeline_with_report<I, S>(
    records: I,
    config_path: impl AsRef<Path>,
    store: &mut S,
    options: &PipelineOptions,
    report: &mut ParseReport,
) -> PipelineResult<PersistSummary>
where
    I: IntoIterator<Item = Value>,
    S: CatalogStore + ?Sized,
{
    let config_path = config_path.as_ref();
    log_info(format!("Loading provider config {}", config_path.display()));
    let config = load_provider_config(config_path)?;
    run_with_config(records, &config, &DEFAULT_REGISTRY, store, options, report)
}

/// Run against an already-loaded config and a custom registry.
pub fn run_with_config<I, S>(
    records: I,
    config: &ProviderConfig,
    registry: &TransformRegistry,
    store: &mut S,
    options: &PipelineOptions,
    report: &mut ParseReport,
) -> PipelineResult<PersistSummary>
where
    I: IntoIterator<Item = Value>,
    S: CatalogStore + ?Sized,
{
    let issues = config.check_transforms(registry);
    if !issues.is_empty() {
        let error = ConfigError::Invalid {
            source_name: config.provider_id.clone(),
            issues,
        };
        log_error(error.to_string());
        return Err(error.into());
    }

    log_success(format!(
        "Provider '{}': {} mappings, error policy '{}', schema {}",
        config.provider_id,
        config.mappings.len(),
        config.error_policy.as_str(),
        config.schema_version.as_str()
    ));
    log_info(format!(
        "Matching products by {}",
        options.persist.unique_identifier
    ));

    let required: Vec<&str> = options.required_fields.iter().map(String::as_str).collect();
    let mut summary = PersistSummary::default();
    let mut processed = 0usize;
    let mut skipped = 0usize;
    let mut parsed = parse_records(records, config, registry, report);

    loop {
        if options.should_stop() {
            log_warning(format!("Run cancelled after {} records", processed));
            return Err(PipelineError::Cancelled { processed, summary });
        }

        let errors_before = parsed.report().error_count();
        let Some(result) = parsed.next() else {
            break;
        };
        let index = processed;
        processed += 1;

        for error in &parsed.report().errors()[errors_before..] {
            log_warning_indent(format!("Record {}: {}", error.record_index, error.message), 1);
        }

        let product = match result {
            Ok(product) => product,
            Err(error) => {
                log_error(format!("Record {} aborted the run: {}", index, error.message));
                return Err(PipelineError::Parse { error, summary });
            }
        };

        let issues = validate(&product, &required);
        if !issues.is_empty() {
            let joined = join_issues(&issues);
            match options.validation {
                ValidationMode::Advisory => {
                    log_warning_indent(format!("Record {} has validation issues: {}", index, joined), 1);
                }
                ValidationMode::SkipInvalid => {
                    log_warning_indent(format!("Record {} skipped: {}", index, joined), 1);
                    skipped += 1;
                    continue;
                }
            }
        }

        match persist_one(&product, store, &options.persist) {
            Ok(delta) => summary.merge(&delta),
            Err(source) => {
                log_error(format!("Record {} failed to persist: {}", index, source));
                return Err(PipelineError::Persist {
                    record_index: index,
                    source,
                    summary,
                });
            }
        }
    }

    let parse_errors = parsed.report().error_count();
    log_success(format!(
        "{} records processed: {} products created, {} updated, {} variants created, {} updated, {} images created, {} updated",
        processed,
        summary.products_created,
        summary.products_updated,
        summary.variants_created,
        summary.variants_updated,
        summary.images_created,
        summary.images_updated
    ));
    if parse_errors > 0 {
        log_warning(format!("{} parse errors recorded", parse_errors));
    }
    if skipped > 0 {
        log_warning(format!("{} records skipped by validation", skipped));
    }

    Ok(summary)
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.path, i.message))
        .collect::<Vec<_>>()
        .join(", ")
}
