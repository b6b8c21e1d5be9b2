//! Schema registry for configuration contracts
//!
//! A [`Schema`] is owned by an entity type, not an instance: it is built
//! once at type-definition time (typically inside a `LazyLock` initializer)
//! and read by every subsequent resolution. The registries are append-only
//! and nothing is validated at declaration time — an inconsistent schema is
//! only caught when concrete input is resolved against it.

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::config::resolver::Config;

/// A computed-value provider, invoked during resolution with the in-progress
/// configuration.
///
/// A provider may read sibling keys that were supplied by the caller or
/// filled by a static default. There is no ordering guarantee relative to
/// other providers: resolution is a single pass in registry order, so a
/// provider that depends on another provider's output reads null instead.
pub type Provider = Arc<dyn Fn(&Config) -> Value + Send + Sync>;

/// A declared default value: either a literal or a provider evaluated
/// lazily against the in-progress configuration.
#[derive(Clone)]
pub enum DefaultValue {
    /// Fixed literal, filled in phase 2 of resolution
    Static(Value),
    /// Computed from other resolved keys, filled in phase 3 of resolution
    Computed(Provider),
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// A type's declared vocabulary of configuration keys: their defaults, the
/// required subset, and the mutually exclusive key groups.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    defaults: IndexMap<String, DefaultValue>,
    required: Vec<String>,
    exclusives: Vec<Vec<String>>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a static default for `key`.
    ///
    /// Declaring a default for the same key twice is an idempotent
    /// overwrite: the later declaration wins.
    #[must_use]
    pub fn default_value(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.defaults
            .insert(key.to_string(), DefaultValue::Static(value.into()));
        self
    }

    /// Declares a computed default for `key`.
    ///
    /// The provider is invoked during phase 3 of resolution, after static
    /// defaults are filled, and only when the working configuration still
    /// lacks a non-null value for `key`.
    #[must_use]
    pub fn default_with<F>(mut self, key: &str, provider: F) -> Self
    where
        F: Fn(&Config) -> Value + Send + Sync + 'static,
    {
        self.defaults
            .insert(key.to_string(), DefaultValue::Computed(Arc::new(provider)));
        self
    }

    /// Declares `key` as required: it must resolve to a non-null value.
    ///
    /// Duplicate declarations are harmless; the resolution check is
    /// existence-based.
    #[must_use]
    pub fn required(mut self, key: &str) -> Self {
        self.required.push(key.to_string());
        self
    }

    /// Declares a group of mutually exclusive keys.
    ///
    /// Within a group, at most one key may be present in the raw override
    /// map supplied by the caller. Groups may overlap in membership.
    #[must_use]
    pub fn exclusive(mut self, keys: &[&str]) -> Self {
        self.exclusives
            .push(keys.iter().map(ToString::to_string).collect());
        self
    }

    /// The defaults registry, in declaration order.
    #[must_use]
    pub fn defaults(&self) -> &IndexMap<String, DefaultValue> {
        &self.defaults
    }

    /// The declared required keys.
    #[must_use]
    pub fn required_keys(&self) -> &[String] {
        &self.required
    }

    /// The declared exclusive key groups.
    #[must_use]
    pub fn exclusive_groups(&self) -> &[Vec<String>] {
        &self.exclusives
    }

    /// Whether the schema recognizes `key`, i.e. it appears in the defaults
    /// registry or the required set.
    #[must_use]
    pub fn is_known(&self, key: &str) -> bool {
        self.defaults.contains_key(key) || self.required.iter().any(|r| r == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn later_default_declaration_wins() {
        let schema = Schema::new()
            .default_value("protocol", "udp")
            .default_value("protocol", "tcp");

        assert_eq!(schema.defaults().len(), 1);
        match &schema.defaults()["protocol"] {
            DefaultValue::Static(value) => assert_eq!(value, &json!("tcp")),
            DefaultValue::Computed(_) => panic!("expected a static default"),
        }
    }

    #[test]
    fn computed_overwrites_static() {
        let schema = Schema::new()
            .default_value("from_port", 22)
            .default_with("from_port", |config| config.get("port").clone());

        assert!(matches!(
            schema.defaults()["from_port"],
            DefaultValue::Computed(_)
        ));
    }

    #[test]
    fn duplicate_required_declarations_are_harmless() {
        let schema = Schema::new().required("cidr").required("cidr");
        assert_eq!(schema.required_keys(), ["cidr", "cidr"]);
        assert!(schema.is_known("cidr"));
    }

    #[test]
    fn exclusive_groups_may_overlap() {
        let schema = Schema::new()
            .exclusive(&["port", "from_port"])
            .exclusive(&["port", "to_port"]);

        assert_eq!(schema.exclusive_groups().len(), 2);
        assert_eq!(schema.exclusive_groups()[0], ["port", "from_port"]);
        assert_eq!(schema.exclusive_groups()[1], ["port", "to_port"]);
    }

    #[test]
    fn is_known_covers_defaults_and_required() {
        let schema = Schema::new().default_value("protocol", "tcp").required("cidr");

        assert!(schema.is_known("protocol"));
        assert!(schema.is_known("cidr"));
        assert!(!schema.is_known("port"));
    }

    #[test]
    fn empty_schema_recognizes_nothing() {
        let schema = Schema::new();
        assert!(!schema.is_known("anything"));
        assert!(schema.defaults().is_empty());
        assert!(schema.required_keys().is_empty());
        assert!(schema.exclusive_groups().is_empty());
    }
}
