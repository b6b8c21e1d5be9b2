//! Configuration contract mechanism
//!
//! A type adopting the contract declares its schema once — defaults,
//! required keys, mutually exclusive key groups — and every instance is
//! built by resolving a raw override map against that schema. Declaration
//! time and resolution time are fully decoupled: schemas accumulate with no
//! validation, and all checking happens inside [`Config::resolve`].

pub mod resolver;
pub mod schema;

pub use resolver::{Config, Configurable, SharedConfig};
pub use schema::{DefaultValue, Provider, Schema};
