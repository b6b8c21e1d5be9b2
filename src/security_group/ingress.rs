//! A single ingress rule with protocol, ports, and subnet/CIDR
//!
//! Extends the plain rule shape with a `subnet` attribute: a dotted
//! `environment.service` name resolved against the shared
//! [`Subnets`] table. `subnet` and `cidr` are mutually exclusive; when only
//! `subnet` is given, `cidr` defaults to the subnet's first declared CIDR
//! range (null when the table is unconfigured or the name is unknown, which
//! then fails the required-`cidr` check).

use serde_json::{Value, json};
use std::sync::LazyLock;

use crate::config::{Config, Configurable, Schema};
use crate::error::ConfigError;
use crate::security_group::rule::AwsRule;
use crate::subnets::Subnets;

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .default_value("protocol", "tcp")
        .default_value("port", Value::Null)
        .default_with("from_port", |rule| {
            if rule.get("port").as_str() == Some("all") {
                json!(0)
            } else {
                rule.get("port").clone()
            }
        })
        .default_with("to_port", |rule| {
            if rule.get("port").as_str() == Some("all") {
                json!(65_535)
            } else {
                rule.get("port").clone()
            }
        })
        .default_value("subnet", Value::Null)
        .default_with("cidr", |rule| match rule.get("subnet").as_str() {
            Some(subnet) => Subnets::cidrs_for(subnet)
                .and_then(|cidrs| cidrs.into_iter().next())
                .map_or(Value::Null, Value::String),
            None => Value::Null,
        })
        .exclusive(&["port", "from_port"])
        .exclusive(&["port", "to_port"])
        .exclusive(&["subnet", "cidr"])
        .required("from_port")
        .required("to_port")
        .required("cidr")
});

/// A single ingress rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    config: Config,
}

impl Rule {
    /// Builds an ingress rule from a raw override map.
    ///
    /// # Errors
    ///
    /// Fails when the overrides violate the ingress contract, including
    /// supplying both `subnet` and `cidr`, or naming a subnet that does not
    /// resolve to a CIDR range.
    pub fn new(overrides: Value) -> Result<Self, ConfigError> {
        Ok(Self {
            config: Config::resolve(Self::schema(), overrides)?,
        })
    }

    /// The rule in the shape the AWS API expects.
    #[must_use]
    pub fn to_aws(&self) -> AwsRule {
        AwsRule {
            cidr_ip: self.get("cidr").clone(),
            from_port: self.get("from_port").clone(),
            to_port: self.get("to_port").clone(),
            ip_protocol: self.get("protocol").clone(),
        }
    }
}

impl Configurable for Rule {
    fn schema() -> &'static Schema {
        &SCHEMA
    }

    fn config(&self) -> &Config {
        &self.config
    }
}
