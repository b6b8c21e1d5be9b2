//! `secgroups` — declarative configuration contracts for building AWS
//! security group rules.
//!
//! The core of this crate is the configuration contract mechanism in
//! [`config`]: a type declares, once, which configuration keys it accepts,
//! which are required, which default to what (statically or computed from
//! other keys), and which combinations are mutually exclusive. Construction
//! from a raw override map then either yields a fully populated, validated
//! configuration or a specific [`error::ConfigError`].
//!
//! Built on top of that contract are the security group rule shapes in
//! [`security_group`] and the two JSON-backed lookup tables, [`services`]
//! and [`subnets`].

pub mod config;
pub mod error;
pub mod security_group;
pub mod services;
pub mod subnets;

pub use config::{Config, Configurable, DefaultValue, Schema, SharedConfig};
pub use error::{ConfigError, Error, Result, TableError};

#[cfg(test)]
pub(crate) mod testutil {
    use std::sync::{Mutex, MutexGuard};

    /// Serializes unit tests that touch the process-wide table caches.
    static TABLE_LOCK: Mutex<()> = Mutex::new(());

    pub fn table_guard() -> MutexGuard<'static, ()> {
        TABLE_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
