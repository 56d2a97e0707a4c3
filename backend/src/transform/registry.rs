//! Transform registry
//!
//! Named single-value functions that provider configs reference by string.
//! Names are registered once at startup; re-registration is refused so a
//! config always means the same thing for the lifetime of the process.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use super::builtins;
use crate::error::{TransformError, TransformResult};
use crate::models::FieldValue;

/// Parameters passed to a transform (config-level defaults merged with the
/// rule's own params).
pub type Params = Map<String, Value>;

/// Signature of every registered transform.
pub type TransformFn = dyn Fn(FieldValue, &Params) -> TransformResult<FieldValue> + Send + Sync;

/// Process-wide registry holding the built-in transforms.
pub static DEFAULT_REGISTRY: Lazy<TransformRegistry> = Lazy::new(TransformRegistry::with_builtins);

/// String-keyed table of transforms.
#[derive(Default)]
pub struct TransformRegistry {
    transforms: HashMap<String, Box<TransformFn>>,
}

impl TransformRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in transform.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, func) in builtins::BUILTINS {
            let registered = registry.register(name, *func);
            debug_assert!(registered.is_ok(), "duplicate built-in transform '{}'", name);
        }
        registry
    }

    /// Register `func` under `name`.
    ///
    /// Fails with [`TransformError::DuplicateName`] when `name` is blank or taken.
    pub fn register<F>(&mut self, name: &str, func: F) -> TransformResult<()>
    where
        F: Fn(FieldValue, &Params) -> TransformResult<FieldValue> + Send + Sync + 'static,
    {
        if name.trim().is_empty() || self.transforms.contains_key(name) {
            return Err(TransformError::DuplicateName(name.to_string()));
        }
        self.transforms.insert(name.to_string(), Box::new(func));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transforms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the transform called `name`.
    pub fn apply(&self, name: &str, value: FieldValue, params: &Params) -> TransformResult<FieldValue> {
        let func = self
            .transforms
            .get(name)
            .ok_or_else(|| TransformError::UnknownTransform(name.to_string()))?;
        func(value, params)
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("transforms", &self.names())
            .finish()
    }
}

/// Apply a transform from [`DEFAULT_REGISTRY`].
pub fn apply_transform(name: &str, value: FieldValue, params: &Params) -> TransformResult<FieldValue> {
    DEFAULT_REGISTRY.apply(name, value, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shout(value: FieldValue, _params: &Params) -> TransformResult<FieldValue> {
        Ok(match value {
            FieldValue::Text(s) => FieldValue::Text(format!("{}!", s)),
            other => other,
        })
    }

    #[test]
    fn test_register_and_apply_custom() {
        let mut registry = TransformRegistry::new();
        registry.register("shout", shout).unwrap();
        let out = registry
            .apply("shout", FieldValue::Text("hi".into()), &Params::new())
            .unwrap();
        assert_eq!(out, FieldValue::Text("hi!".into()));
    }

    #[test]
    fn test_duplicate_and_empty_names_rejected() {
        let mut registry = TransformRegistry::with_builtins();
        assert_eq!(
            registry.register("trim", shout),
            Err(TransformError::DuplicateName("trim".into()))
        );
        assert_eq!(
            registry.register("  ", shout),
            Err(TransformError::DuplicateName("  ".into()))
        );
    }

    #[test]
    fn test_unknown_transform() {
        let err = DEFAULT_REGISTRY
            .apply("nope", FieldValue::Null, &Params::new())
            .unwrap_err();
        assert_eq!(err, TransformError::UnknownTransform("nope".into()));
    }

    #[test]
    fn test_builtins_registered() {
        for name in ["trim", "upper", "parse_price", "parse_bool", "parse_int", "map_category"] {
            assert!(DEFAULT_REGISTRY.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn test_every_builtin_name_registered_once() {
        let registry = TransformRegistry::with_builtins();
        assert_eq!(registry.names().len(), builtins::BUILTINS.len());
    }
}
