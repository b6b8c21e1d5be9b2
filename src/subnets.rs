//! Environment→subnet CIDR lookup table backed by a JSON file
//!
//! The table is configured with a `path` key pointing at a JSON file that
//! maps environments to their services' CIDR ranges, e.g.:
//!
//! ```json
//! {
//!   "staging": {
//!     "service1": ["10.1.0.0/16", "10.2.0.0/16"],
//!     "service2": ["10.3.0.0/16", "10.4.0.0/16"]
//!   },
//!   "prod": {
//!     "service1": ["10.5.0.0/16", "10.6.0.0/16"]
//!   }
//! }
//! ```
//!
//! Unlike [`crate::services::Services`], `path` is also declared required,
//! and the backing file is parsed eagerly at configure time.

use indexmap::IndexMap;
use serde_json::Value;
use std::sync::{Arc, LazyLock, RwLock};
use tracing::debug;

use crate::config::{Config, Schema, SharedConfig};
use crate::error::TableError;
use crate::services::load_table;

/// CIDR ranges per service within one environment.
pub type SubnetMap = IndexMap<String, Vec<String>>;

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .default_value("path", "data/subnets.json")
        .required("path")
});

static CONFIG: SharedConfig = SharedConfig::new();
static MAPPING: RwLock<Option<Arc<IndexMap<String, SubnetMap>>>> = RwLock::new(None);

/// Shared environment→subnet CIDR lookup table.
pub struct Subnets;

impl Subnets {
    /// The table's declared schema.
    #[must_use]
    pub fn schema() -> &'static Schema {
        &SCHEMA
    }

    /// Resolves the table configuration and eagerly loads the backing JSON
    /// file, replacing any previously loaded mapping.
    ///
    /// # Errors
    ///
    /// Fails on a contract violation in `overrides`, a missing or
    /// unreadable backing file, or a file that is not JSON of the expected
    /// shape.
    pub fn configure(overrides: Value) -> Result<(), TableError> {
        let config = CONFIG.configure(&SCHEMA, overrides)?;
        let (path, mapping) = load_table::<IndexMap<String, SubnetMap>>(&config)?;
        debug!(path = %path.display(), environments = mapping.len(), "loaded subnets table");
        *MAPPING.write().expect("subnets table lock poisoned") = Some(Arc::new(mapping));
        Ok(())
    }

    /// The subnets of one environment.
    ///
    /// # Errors
    ///
    /// [`TableError::NotConfigured`] until [`Subnets::configure`] has run.
    pub fn get(environment: &str) -> Result<Option<SubnetMap>, TableError> {
        Ok(Self::to_map()?.get(environment).cloned())
    }

    /// The CIDR ranges of one service within one environment.
    ///
    /// # Errors
    ///
    /// [`TableError::NotConfigured`] until [`Subnets::configure`] has run.
    pub fn cidrs(environment: &str, service: &str) -> Result<Option<Vec<String>>, TableError> {
        Ok(Self::to_map()?
            .get(environment)
            .and_then(|subnets| subnets.get(service).cloned()))
    }

    /// Resolves a dotted `environment.service` subnet name.
    ///
    /// Returns `None` when the table is unconfigured, the name has no dot,
    /// or either component is unknown — this is the permissive probe used
    /// by computed rule defaults, which must not fail.
    #[must_use]
    pub fn cidrs_for(subnet: &str) -> Option<Vec<String>> {
        let (environment, service) = subnet.split_once('.')?;
        Self::cidrs(environment, service).ok().flatten()
    }

    /// The full environment→subnet mapping.
    ///
    /// # Errors
    ///
    /// [`TableError::NotConfigured`] until [`Subnets::configure`] has run.
    pub fn to_map() -> Result<Arc<IndexMap<String, SubnetMap>>, TableError> {
        MAPPING
            .read()
            .expect("subnets table lock poisoned")
            .clone()
            .ok_or(TableError::NotConfigured)
    }

    /// The cached table configuration, if configured.
    #[must_use]
    pub fn config() -> Option<Arc<Config>> {
        CONFIG.get()
    }

    /// Discards the cached configuration and mapping so the table can be
    /// rebuilt by a later [`Subnets::configure`].
    pub fn reset() {
        CONFIG.reset();
        *MAPPING.write().expect("subnets table lock poisoned") = None;
    }
}
