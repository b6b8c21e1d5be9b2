//! Config resolver
//!
//! Turns a type's [`Schema`] plus a raw override map into a validated
//! [`Config`] via a fixed five-phase pipeline:
//!
//! 1. Exclusivity check against the raw override map
//! 2. Static default fill
//! 3. Computed default fill
//! 4. Unknown-key check
//! 5. Missing-required check
//!
//! The ordering is a hard contract. The exclusivity check runs before any
//! default is filled so that it only ever inspects what the caller
//! explicitly supplied — a computed default for one member of a group could
//! otherwise be derived from the other member's raw value and mask a
//! genuine caller error. Computed defaults run after static ones so that a
//! provider can read statically defaulted siblings.

use indexmap::IndexMap;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use tracing::{debug, trace};

use crate::config::schema::{DefaultValue, Schema};
use crate::error::ConfigError;

static NULL: Value = Value::Null;

// ============================================================================
// Resolved Configuration
// ============================================================================

/// A resolved, fully validated configuration map.
///
/// Built once at construction by [`Config::resolve`] and immutable
/// afterwards; it may be freely shared and read without synchronization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    values: IndexMap<String, Value>,
}

impl Config {
    /// Resolves `overrides` against `schema`, producing a complete
    /// configuration or the first contract violation in phase order.
    ///
    /// `overrides` must be a JSON object or `Value::Null` (treated as an
    /// empty map). A key whose override value is null counts as absent for
    /// defaulting and exclusivity purposes, but still counts as present for
    /// the unknown-key check.
    ///
    /// # Errors
    ///
    /// Returns the first violation encountered, in pipeline order:
    /// [`ConfigError::InvalidCombination`], [`ConfigError::InvalidKey`],
    /// then [`ConfigError::Missing`]. Non-map overrides are rejected with
    /// [`ConfigError::InvalidOverrides`].
    pub fn resolve(schema: &Schema, overrides: Value) -> Result<Self, ConfigError> {
        let values: IndexMap<String, Value> = match overrides {
            Value::Null => IndexMap::new(),
            Value::Object(map) => map.into_iter().collect(),
            other => {
                return Err(ConfigError::InvalidOverrides {
                    found: json_type_name(&other).to_string(),
                });
            }
        };

        // Phase 1: exclusivity, against the raw override map only.
        for group in schema.exclusive_groups() {
            for (i, first) in group.iter().enumerate() {
                for second in &group[i + 1..] {
                    if is_present(&values, first) && is_present(&values, second) {
                        return Err(ConfigError::InvalidCombination {
                            first: first.clone(),
                            second: second.clone(),
                        });
                    }
                }
            }
        }

        let mut config = Self { values };

        // Phase 2: static defaults.
        for (key, default) in schema.defaults() {
            if let DefaultValue::Static(value) = default
                && config.get(key).is_null()
            {
                config.values.insert(key.clone(), value.clone());
            }
        }

        // Phase 3: computed defaults. Single pass in registry order; a
        // provider sees raw overrides and static defaults, not the output
        // of other providers.
        for (key, default) in schema.defaults() {
            if let DefaultValue::Computed(provider) = default
                && config.get(key).is_null()
            {
                let value = provider(&config);
                config.values.insert(key.clone(), value);
            }
        }

        // Phase 4: every working key must be declared. Presence of the key
        // triggers the check, regardless of its value.
        for key in config.values.keys() {
            if !schema.is_known(key) {
                return Err(ConfigError::InvalidKey { key: key.clone() });
            }
        }

        // Phase 5: required keys must have resolved to non-null.
        for key in schema.required_keys() {
            if config.get(key).is_null() {
                return Err(ConfigError::Missing { key: key.clone() });
            }
        }

        trace!(keys = config.values.len(), "configuration resolved");
        Ok(config)
    }

    /// Index-style lookup: the value at `key`, or `Value::Null` for keys
    /// absent from the configuration. Never fails — this is the safe probe
    /// for optional keys.
    #[must_use]
    pub fn get(&self, key: &str) -> &Value {
        self.values.get(key).unwrap_or(&NULL)
    }

    /// Attribute-style lookup: the value at `key`, failing for keys absent
    /// from the configuration.
    ///
    /// Strict validation guarantees that every declared key is present
    /// after construction, so this accessor enforces "this must be a schema
    /// key" — deliberately stricter than [`Config::get`].
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoSuchField`] when `key` is not in the configuration.
    pub fn field(&self, key: &str) -> Result<&Value, ConfigError> {
        self.values.get(key).ok_or_else(|| ConfigError::NoSuchField {
            key: key.to_string(),
        })
    }

    /// Whether `key` is present in the resolved configuration.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The full resolved configuration map.
    #[must_use]
    pub fn as_map(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// Consumes the configuration, returning the underlying map.
    #[must_use]
    pub fn into_map(self) -> IndexMap<String, Value> {
        self.values
    }
}

/// A key counts as supplied only when present with a non-null value.
fn is_present(values: &IndexMap<String, Value>, key: &str) -> bool {
    values.get(key).is_some_and(|v| !v.is_null())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a map",
    }
}

// ============================================================================
// Contract Surface
// ============================================================================

/// The contract surface adopted by configurable entities.
///
/// An implementing type owns exactly one [`Schema`], built once before any
/// instance is constructed, and each instance holds one resolved
/// [`Config`]. The provided accessors delegate to the instance's
/// configuration.
pub trait Configurable {
    /// The type's declared schema.
    fn schema() -> &'static Schema
    where
        Self: Sized;

    /// The instance's resolved configuration.
    fn config(&self) -> &Config;

    /// Index-style lookup (see [`Config::get`]).
    fn get(&self, key: &str) -> &Value {
        self.config().get(key)
    }

    /// Attribute-style lookup (see [`Config::field`]).
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoSuchField`] when `key` is not in the configuration.
    fn field(&self, key: &str) -> Result<&Value, ConfigError> {
        self.config().field(key)
    }

    /// The full resolved configuration map.
    fn to_map(&self) -> &IndexMap<String, Value> {
        self.config().as_map()
    }
}

// ============================================================================
// Shared Configuration
// ============================================================================

/// Class-level convenience: a single cached configuration per adopting type.
///
/// Used by the JSON-backed lookup tables to hold a "global" resolved `path`
/// setting. `configure` replaces any previously cached configuration;
/// `reset` discards it so a later `configure` can rebuild.
#[derive(Debug, Default)]
pub struct SharedConfig {
    slot: RwLock<Option<Arc<Config>>>,
}

impl SharedConfig {
    /// Creates an empty shared slot, usable in a `static`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Resolves `overrides` against `schema` and caches the result.
    ///
    /// # Errors
    ///
    /// Propagates any [`ConfigError`] from [`Config::resolve`]; on failure
    /// the previously cached configuration (if any) is left untouched.
    pub fn configure(&self, schema: &Schema, overrides: Value) -> Result<Arc<Config>, ConfigError> {
        let config = Arc::new(Config::resolve(schema, overrides)?);
        *self.slot.write().expect("shared config lock poisoned") = Some(Arc::clone(&config));
        debug!("shared configuration rebuilt");
        Ok(config)
    }

    /// The cached configuration, if one has been built.
    #[must_use]
    pub fn get(&self) -> Option<Arc<Config>> {
        self.slot.read().expect("shared config lock poisoned").clone()
    }

    /// Discards the cached configuration.
    pub fn reset(&self) {
        *self.slot.write().expect("shared config lock poisoned") = None;
    }
}

// ============================================================================
// Tests
// ============================================================================
