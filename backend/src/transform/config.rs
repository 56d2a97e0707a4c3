//! Provider config loading
//!
//! A provider config describes how one supplier's records map onto the
//! canonical product:
//!
//! ```json
//! {
//!   "provider_id": "acme",
//!   "error_policy": "continue",
//!   "schema_version": "v2",
//!   "mappings": [
//!     { "source": "SKU", "destination": "variants.0.supplier_sku", "transforms": [{ "name": "trim" }] },
//!     { "source": "Category", "destination": "product_type", "default": "Misc" }
//!   ],
//!   "transform_params": { "map_category": { "mapping": { "TEE": "T-Shirts" } } }
//! }
//! ```
//!
//! The document is validated as a whole: every problem is collected and
//! reported in one [`ConfigError::Invalid`], and no config is built from an
//! invalid document.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::registry::{Params, TransformRegistry};
use crate::error::{ConfigError, ConfigIssue, ConfigResult};
use crate::models::{Destination, FieldValue, SchemaVersion, SourcePath};

/// What happens when a rule fails on a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Record the error, abandon the rule, keep going.
    #[default]
    Continue,
    /// Record the error and abort the run.
    Fail,
}

impl ErrorPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "continue" => Some(ErrorPolicy::Continue),
            "fail" => Some(ErrorPolicy::Fail),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorPolicy::Continue => "continue",
            ErrorPolicy::Fail => "fail",
        }
    }
}

/// One step of a rule's transform chain.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformSpec {
    pub name: String,
    pub params: Params,
}

/// Source → destination mapping with its transform chain.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRule {
    pub source: SourcePath,
    /// Destination as written in the config.
    pub destination: String,
    /// Destination compiled against the config's schema version.
    pub target: Destination,
    pub transforms: Vec<TransformSpec>,
    /// Used when the source is absent or null.
    pub default: Option<FieldValue>,
}

/// A validated provider config. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub provider_id: String,
    pub mappings: Vec<MappingRule>,
    pub error_policy: ErrorPolicy,
    pub schema_version: SchemaVersion,
    /// Per-transform default params, overlaid by each rule's own params.
    pub transform_params: BTreeMap<String, Params>,
}

/// Load and validate a provider config file.
pub fn load_provider_config(path: impl AsRef<Path>) -> ConfigResult<ProviderConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    ProviderConfig::from_json_str(&content, &path.display().to_string())
}

/// Every issue in `data`, without building a config.
pub fn validate_provider_config(data: &Value) -> Vec<ConfigIssue> {
    compile(data).err().unwrap_or_default()
}

impl ProviderConfig {
    /// Build from an already parsed document. `source_name` only labels errors.
    pub fn from_value(data: &Value, source_name: &str) -> ConfigResult<Self> {
        compile(data).map_err(|issues| ConfigError::Invalid {
            source_name: source_name.to_string(),
            issues,
        })
    }

    pub fn from_json_str(content: &str, source_name: &str) -> ConfigResult<Self> {
        let data: Value = serde_json::from_str(content)?;
        Self::from_value(&data, source_name)
    }

    /// Params for one transform step: config-level defaults, then the rule's.
    pub fn merged_params(&self, spec: &TransformSpec) -> Params {
        let mut params = self
            .transform_params
            .get(&spec.name)
            .cloned()
            .unwrap_or_default();
        params.extend(spec.params.iter().map(|(k, v)| (k.clone(), v.clone())));
        params
    }

    /// Transform names the registry does not know, as config issues.
    pub fn check_transforms(&self, registry: &TransformRegistry) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for (idx, rule) in self.mappings.iter().enumerate() {
            for (t_idx, spec) in rule.transforms.iter().enumerate() {
                if !registry.contains(&spec.name) {
                    issues.push(ConfigIssue::new(
                        format!("mappings[{}].transforms[{}].name", idx, t_idx),
                        format!("Unknown transform '{}'", spec.name),
                    ));
                }
            }
        }
        issues
    }

    /// The config as a JSON document that loads back into an equal config.
    pub fn to_value(&self) -> Value {
        let mappings: Vec<Value> = self
            .mappings
            .iter()
            .map(|rule| {
                let mut obj = Map::new();
                obj.insert("source".into(), json!(rule.source.as_str()));
                obj.insert("destination".into(), json!(rule.destination));
                if !rule.transforms.is_empty() {
                    let transforms: Vec<Value> = rule
                        .transforms
                        .iter()
                        .map(|t| json!({ "name": t.name, "params": t.params }))
                        .collect();
                    obj.insert("transforms".into(), Value::Array(transforms));
                }
                if let Some(default) = &rule.default {
                    obj.insert("default".into(), Value::from(default.clone()));
                }
                Value::Object(obj)
            })
            .collect();

        json!({
            "provider_id": self.provider_id,
            "error_policy": self.error_policy,
            "schema_version": self.schema_version,
            "mappings": mappings,
            "transform_params": self.transform_params,
        })
    }
}

fn non_blank(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Validate and build in one pass; any issue discards the result.
fn compile(data: &Value) -> Result<ProviderConfig, Vec<ConfigIssue>> {
    let Some(root) = data.as_object() else {
        return Err(vec![ConfigIssue::new("$", "Expected object")]);
    };
    let mut issues = Vec::new();

    let provider_id = non_blank(root.get("provider_id"));
    if provider_id.is_none() {
        issues.push(ConfigIssue::new("provider_id", "Required"));
    }

    let error_policy = match root.get("error_policy") {
        None => ErrorPolicy::default(),
        Some(raw) => raw.as_str().and_then(ErrorPolicy::parse).unwrap_or_else(|| {
            issues.push(ConfigIssue::new("error_policy", "Expected 'continue' or 'fail'"));
            ErrorPolicy::default()
        }),
    };

    // Destinations only compile once the dialect is known.
    let schema_version = match root.get("schema_version") {
        None => Some(SchemaVersion::default()),
        Some(raw) => {
            let parsed = raw.as_str().and_then(SchemaVersion::parse);
            if parsed.is_none() {
                issues.push(ConfigIssue::new("schema_version", "Expected 'v1' or 'v2'"));
            }
            parsed
        }
    };

    let mappings: Vec<Option<MappingRule>> = match root.get("mappings").and_then(Value::as_array) {
        Some(raw_mappings) => raw_mappings
            .iter()
            .enumerate()
            .map(|(idx, rule)| compile_rule(rule, idx, schema_version, &mut issues))
            .collect(),
        None => {
            issues.push(ConfigIssue::new("mappings", "Expected list"));
            Vec::new()
        }
    };

    let mut transform_params = BTreeMap::new();
    match root.get("transform_params") {
        None => {}
        Some(Value::Object(entries)) => {
            for (name, params) in entries {
                match params.as_object() {
                    Some(params) => {
                        transform_params.insert(name.clone(), params.clone());
                    }
                    None => issues.push(ConfigIssue::new(
                        format!("transform_params.{}", name),
                        "Expected object",
                    )),
                }
            }
        }
        Some(_) => issues.push(ConfigIssue::new("transform_params", "Expected object")),
    }

    match (provider_id, schema_version) {
        (Some(provider_id), Some(schema_version)) if issues.is_empty() => Ok(ProviderConfig {
            provider_id: provider_id.to_string(),
            mappings: mappings.into_iter().flatten().collect(),
            error_policy,
            schema_version,
            transform_params,
        }),
        _ => Err(issues),
    }
}

fn compile_rule(
    rule: &Value,
    idx: usize,
    version: Option<SchemaVersion>,
    issues: &mut Vec<ConfigIssue>,
) -> Option<MappingRule> {
    let prefix = format!("mappings[{}]", idx);
    let Some(obj) = rule.as_object() else {
        issues.push(ConfigIssue::new(prefix, "Expected object"));
        return None;
    };

    let source = non_blank(obj.get("source"));
    if source.is_none() {
        issues.push(ConfigIssue::new(format!("{}.source", prefix), "Required"));
    }

    let destination = non_blank(obj.get("destination"));
    if destination.is_none() {
        issues.push(ConfigIssue::new(format!("{}.destination", prefix), "Required"));
    }

    let target = match (destination, version) {
        (Some(path), Some(version)) => match Destination::parse(path, version) {
            Ok(target) => Some(target),
            Err(message) => {
                issues.push(ConfigIssue::new(format!("{}.destination", prefix), message));
                None
            }
        },
        _ => None,
    };

    let transforms = match obj.get("transforms") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(t_idx, item)| {
                compile_transform(item, &format!("{}.transforms[{}]", prefix, t_idx), issues)
            })
            .collect(),
        Some(_) => {
            issues.push(ConfigIssue::new(format!("{}.transforms", prefix), "Expected list"));
            Vec::new()
        }
    };

    let default = obj
        .get("default")
        .filter(|v| !v.is_null())
        .map(FieldValue::from);

    Some(MappingRule {
        source: SourcePath::new(source?),
        destination: destination?.to_string(),
        target: target?,
        transforms,
        default,
    })
}

fn compile_transform(item: &Value, path: &str, issues: &mut Vec<ConfigIssue>) -> Option<TransformSpec> {
    let Some(obj) = item.as_object() else {
        issues.push(ConfigIssue::new(path, "Expected object"));
        return None;
    };

    let name = non_blank(obj.get("name"));
    if name.is_none() {
        issues.push(ConfigIssue::new(format!("{}.name", path), "Required"));
    }

    let params = match obj.get("params") {
        None | Some(Value::Null) => Params::new(),
        Some(Value::Object(params)) => params.clone(),
        Some(_) => {
            issues.push(ConfigIssue::new(format!("{}.params", path), "Expected object"));
            return None;
        }
    };

    Some(TransformSpec {
        name: name?.to_string(),
        params,
    })
}
