//! Security group rule shapes built on the configuration contract
//!
//! [`rule::Rule`] is the plain protocol/port/CIDR rule; [`ingress::Rule`]
//! additionally resolves a named subnet to its CIDR range via the shared
//! [`crate::subnets::Subnets`] table.

pub mod ingress;
pub mod rule;

pub use rule::{AwsRule, Rule};
