//! A single security group rule with protocol, ports, and CIDR
//!
//! Configurable attributes:
//!
//! * `protocol` - e.g. `"tcp"` or `"icmp"` (defaults to `"tcp"`)
//! * `port` - e.g. `22`, `443`, or `"all"`
//! * `from_port` / `to_port` - an inclusive range instead of a single port
//! * `cidr` - the CIDR range the rule applies to
//!
//! `port` is mutually exclusive with each of `from_port` and `to_port`;
//! when only `port` is given, both range ends default to it (`"all"` maps
//! to the full `0..=65535` range).

use serde::Serialize;
use serde_json::{Value, json};
use std::sync::LazyLock;

use crate::config::{Config, Configurable, Schema};
use crate::error::ConfigError;

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
        .default_value("cidr", Value::Null)
        .exclusive(&["port", "from_port"])
        .exclusive(&["port", "to_port"])
        .required("from_port")
        .required("to_port")
        .required("cidr")
});

/// A single security group rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    config: Config,
}

impl Rule {
    /// Builds a rule from a raw override map (a JSON object, or null for an
    /// empty map).
    ///
    /// # Errors
    ///
    /// Fails when the overrides violate the rule contract: both `port` and
    /// a range end supplied, an unrecognized key, or an unresolvable
    /// required key (`from_port`, `to_port`, `cidr`).
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

/// An AWS-formatted rule entry (`CidrIp`, `FromPort`, `ToPort`,
/// `IpProtocol`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AwsRule {
    /// CIDR range the rule applies to
    pub cidr_ip: Value,
    /// Start of the port range
    pub from_port: Value,
    /// End of the port range
    pub to_port: Value,
    /// IP protocol name
    pub ip_protocol: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_port_expands_to_range() {
        let rule = Rule::new(json!({"port": 80, "cidr": "0.0.0.0/0"})).unwrap();

        assert_eq!(rule.get("protocol"), &json!("tcp"));
        assert_eq!(rule.get("port"), &json!(80));
        assert_eq!(rule.get("from_port"), &json!(80));
        assert_eq!(rule.get("to_port"), &json!(80));
        assert_eq!(rule.get("cidr"), &json!("0.0.0.0/0"));
    }

    #[test]
    fn port_all_expands_to_full_range() {
        let rule = Rule::new(json!({"port": "all", "cidr": "10.0.0.0/8"})).unwrap();

        assert_eq!(rule.get("from_port"), &json!(0));
        assert_eq!(rule.get("to_port"), &json!(65_535));
    }

    #[test]
    fn port_and_from_port_are_mutually_exclusive() {
        let err = Rule::new(json!({"port": 80, "from_port": 80, "cidr": "0.0.0.0/0"}))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidCombination {
                first: "port".to_string(),
                second: "from_port".to_string(),
            }
        );
    }

    #[test]
    fn port_and_to_port_are_mutually_exclusive() {
        let err =
            Rule::new(json!({"port": 80, "to_port": 80, "cidr": "0.0.0.0/0"})).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidCombination {
                first: "port".to_string(),
                second: "to_port".to_string(),
            }
        );
    }

    #[test]
    fn cidr_alone_is_missing_from_port() {
        let err = Rule::new(json!({"cidr": "0.0.0.0/0"})).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Missing {
                key: "from_port".to_string()
            }
        );
    }

    #[test]
    fn explicit_range_is_kept() {
        let rule =
            Rule::new(json!({"from_port": 8301, "to_port": 8600, "cidr": "10.1.0.0/16"}))
                .unwrap();

        assert_eq!(rule.get("from_port"), &json!(8301));
        assert_eq!(rule.get("to_port"), &json!(8600));
        assert_eq!(rule.get("port"), &Value::Null);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = Rule::new(json!({"porf": 80, "cidr": "0.0.0.0/0"})).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidKey {
                key: "porf".to_string()
            }
        );
    }

    #[test]
    fn to_aws_shape() {
        let rule = Rule::new(json!({"port": 443, "cidr": "0.0.0.0/0"})).unwrap();
        let aws = rule.to_aws();

        assert_eq!(aws.cidr_ip, json!("0.0.0.0/0"));
        assert_eq!(aws.from_port, json!(443));
        assert_eq!(aws.to_port, json!(443));
        assert_eq!(aws.ip_protocol, json!("tcp"));

        let serialized = serde_json::to_value(&aws).unwrap();
        assert_eq!(
            serialized,
            json!({
                "CidrIp": "0.0.0.0/0",
                "FromPort": 443,
                "ToPort": 443,
                "IpProtocol": "tcp",
            })
        );
    }

    #[test]
    fn field_access_on_resolved_rule() {
        let rule = Rule::new(json!({"port": 22, "cidr": "0.0.0.0/0"})).unwrap();

        assert_eq!(rule.field("protocol").unwrap(), &json!("tcp"));
        assert!(matches!(
            rule.field("subnet"),
            Err(ConfigError::NoSuchField { .. })
        ));
    }
}
