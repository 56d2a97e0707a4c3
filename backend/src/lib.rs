//! # Feedload - supplier feed normalization and catalog import
//!
//! Feedload maps heterogeneous supplier product feeds (CSV, JSON, NDJSON) onto
//! one canonical product model through per-provider declarative configs, then
//! upserts the result into a product catalog.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Supplier    │────▶│   Records   │────▶│   Engine    │────▶│   Catalog   │
//! │ CSV / JSON  │     │ (auto-enc)  │     │ (config +   │     │  (upserts)  │
//! │             │     │             │     │ transforms) │     │             │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use feedload::{load_records, run_pipeline, MemoryCatalog, PipelineOptions};
//!
//! let records = load_records("feed.csv")?;
//! let mut store = MemoryCatalog::new();
//! let (summary, report) = run_pipeline(records, "acme.json", &mut store, &PipelineOptions::default())?;
//! println!("{} created, {} parse errors", summary.products_created, report.error_count());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types, one per layer
//! - [`logs`] - Run logging with broadcast subscribers
//! - [`models`] - Canonical product model and addressing
//! - [`parser`] - Record loading with encoding/delimiter detection
//! - [`transform`] - Registry, provider configs, engine and pipeline
//! - [`validation`] - Canonical product validation
//! - [`store`] - Catalog store trait with memory and JSON-file backends
//! - [`persist`] - Upserting canonical products into a store

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// Record sources
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// Catalog
pub mod persist;
pub mod store;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AssignError, ConfigError, ConfigIssue, PersistError, PipelineError, RecordsError, StoreError,
    TransformError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{CanonicalImage, CanonicalProduct, CanonicalVariant, Destination, FieldValue, SchemaVersion};

// =============================================================================
// Re-exports - Records
// =============================================================================

pub use parser::{detect_delimiter, detect_encoding, load_records, parse_csv_bytes, parse_json_str, CsvRecords};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    apply_transform, load_provider_config, parse_records, run_pipeline, run_pipeline_with_report,
    ErrorPolicy, ParseError, ParseReport, PipelineOptions, ProviderConfig, TransformRegistry,
    ValidationMode, DEFAULT_REGISTRY,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid, validate, validate_document, ValidationIssue};

// =============================================================================
// Re-exports - Catalog
// =============================================================================

pub use persist::{persist_records, PersistOptions, PersistSummary, UniqueIdentifier};
pub use store::{CatalogStore, JsonFileCatalog, MemoryCatalog};
