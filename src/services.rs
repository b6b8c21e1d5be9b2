//! Service→port lookup table backed by a JSON file
//!
//! The table is configured with a `path` key pointing at a JSON file that
//! defines recognized services and their port mappings, e.g.:
//!
//! ```json
//! {
//!   "ssh": {
//!     "tcp": [22]
//!   },
//!   "consul": {
//!     "tcp": [8301, 8400, 8500, 8600],
//!     "udp": [8301, 8600]
//!   }
//! }
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, RwLock};
use tracing::debug;

use crate::config::{Config, Schema, SharedConfig};
use crate::error::TableError;

static SCHEMA: LazyLock<Schema> =
    LazyLock::new(|| Schema::new().default_value("path", "data/services.json"));

static CONFIG: SharedConfig = SharedConfig::new();
static MAPPING: RwLock<Option<Arc<IndexMap<String, ServicePorts>>>> = RwLock::new(None);

/// Ports a service listens on, per protocol. A protocol absent from the
/// table entry deserializes as an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServicePorts {
    /// TCP ports
    #[serde(default)]
    pub tcp: Vec<u16>,
    /// UDP ports
    #[serde(default)]
    pub udp: Vec<u16>,
}

/// Shared service→ports lookup table.
pub struct Services;

impl Services {
    /// The table's declared schema.
    #[must_use]
    pub fn schema() -> &'static Schema {
        &SCHEMA
    }

    /// Resolves the table configuration and loads the backing JSON file,
    /// replacing any previously loaded mapping.
    ///
    /// # Errors
    ///
    /// Fails on a contract violation in `overrides`, a missing or
    /// unreadable backing file, or a file that is not JSON of the expected
    /// shape.
    pub fn configure(overrides: Value) -> Result<(), TableError> {
        let config = CONFIG.configure(&SCHEMA, overrides)?;
        let (path, mapping) = load_table::<IndexMap<String, ServicePorts>>(&config)?;
        debug!(path = %path.display(), services = mapping.len(), "loaded services table");
        *MAPPING.write().expect("services table lock poisoned") = Some(Arc::new(mapping));
        Ok(())
    }

    /// The port mapping for one service.
    ///
    /// # Errors
    ///
    /// [`TableError::NotConfigured`] until [`Services::configure`] has run.
    pub fn get(service: &str) -> Result<Option<ServicePorts>, TableError> {
        Ok(Self::to_map()?.get(service).cloned())
    }

    /// The full service→ports mapping.
    ///
    /// # Errors
    ///
    /// [`TableError::NotConfigured`] until [`Services::configure`] has run.
    pub fn to_map() -> Result<Arc<IndexMap<String, ServicePorts>>, TableError> {
        MAPPING
            .read()
            .expect("services table lock poisoned")
            .clone()
            .ok_or(TableError::NotConfigured)
    }

    /// The cached table configuration, if configured.
    #[must_use]
    pub fn config() -> Option<Arc<Config>> {
        CONFIG.get()
    }

    /// Discards the cached configuration and mapping so the table can be
    /// rebuilt by a later [`Services::configure`].
    pub fn reset() {
        CONFIG.reset();
        *MAPPING.write().expect("services table lock poisoned") = None;
    }
}

/// Reads and deserializes a table's backing file from its resolved `path`.
pub(crate) fn load_table<T>(config: &Config) -> Result<(PathBuf, T), TableError>
where
    T: serde::de::DeserializeOwned,
{
    let path = match config.get("path").as_str() {
        Some(path) => PathBuf::from(path),
        None => {
            return Err(TableError::InvalidPath {
                value: config.get("path").to_string(),
            });
        }
    };
    let table = parse_table(&path)?;
    Ok((path, table))
}

fn parse_table<T>(path: &Path) -> Result<T, TableError>
where
    T: serde::de::DeserializeOwned,
{
    let raw = std::fs::read_to_string(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            TableError::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            TableError::Io(err)
        }
    })?;
    serde_json::from_str(&raw).map_err(|err| TableError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}
