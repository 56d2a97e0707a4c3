//! Transformation module.
//!
//! This module turns raw supplier records into canonical products:
//! - Registry / builtins: named single-value transforms
//! - Config: provider mapping configs, validated and compiled at load
//! - Engine: lazy per-record parsing with an error report
//! - Pipeline: config → parse → validate → persist

pub mod builtins;
pub mod config;
pub mod engine;
pub mod pipeline;
pub mod registry;

pub use config::{load_provider_config, validate_provider_config, ErrorPolicy, MappingRule, ProviderConfig, TransformSpec};
pub use engine::{parse_record, parse_records, ParseError, ParseReport, ParsedRecords};
pub use pipeline::{run_pipeline, run_pipeline_with_report, run_with_config, PipelineOptions, ValidationMode};
pub use registry::{apply_transform, Params, TransformRegistry, DEFAULT_REGISTRY};
