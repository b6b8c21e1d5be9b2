//! Scenario tests for the security group rule shapes.

use secgroups::security_group::Rule;
use secgroups::{ConfigError, Configurable};
use serde_json::{Value, json};

#[test]
fn single_port_rule_resolves_completely() {
    let rule = Rule::new(json!({"port": 80, "cidr": "0.0.0.0/0"})).unwrap();

    assert_eq!(
        serde_json::to_value(rule.to_map()).unwrap(),
        json!({
            "port": 80,
            "cidr": "0.0.0.0/0",
            "protocol": "tcp",
            "from_port": 80,
            "to_port": 80,
        })
    );
}

#[test]
fn udp_rule_keeps_overridden_protocol() {
    let rule = Rule::new(json!({"protocol": "udp", "port": 123, "cidr": "10.0.0.0/8"})).unwrap();

    assert_eq!(rule.get("protocol"), &json!("udp"));
    assert_eq!(rule.to_aws().ip_protocol, json!("udp"));
}

#[test]
fn all_ports_rule() {
    let rule = Rule::new(json!({"port": "all", "cidr": "0.0.0.0/0"})).unwrap();
    let aws = rule.to_aws();

    assert_eq!(aws.from_port, json!(0));
    assert_eq!(aws.to_port, json!(65_535));
}

#[test]
fn range_rule_round_trips_to_aws_shape() {
    let rule = Rule::new(json!({
        "from_port": 8301,
        "to_port": 8600,
        "cidr": "10.1.0.0/16"
    }))
    .unwrap();

    assert_eq!(
        serde_json::to_value(rule.to_aws()).unwrap(),
        json!({
            "CidrIp": "10.1.0.0/16",
            "FromPort": 8301,
            "ToPort": 8600,
            "IpProtocol": "tcp",
        })
    );
}

#[test]
fn port_with_explicit_range_end_is_rejected() {
    let err = Rule::new(json!({"port": 80, "from_port": 80, "cidr": "0.0.0.0/0"})).unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidCombination {
            first: "port".to_string(),
            second: "from_port".to_string(),
        }
    );
}

#[test]
fn missing_port_information_is_rejected() {
    let err = Rule::new(json!({"cidr": "0.0.0.0/0"})).unwrap_err();
    assert_eq!(
        err,
        ConfigError::Missing {
            key: "from_port".to_string()
        }
    );
}

#[test]
fn missing_cidr_is_rejected() {
    let err = Rule::new(json!({"port": 22})).unwrap_err();
    assert_eq!(
        err,
        ConfigError::Missing {
            key: "cidr".to_string()
        }
    );
}

#[test]
fn construction_failure_yields_no_rule() {
    // A failed construction is a plain Err; there is no partially built
    // rule to observe.
    let result = Rule::new(json!({"port": 80}));
    assert!(result.is_err());
}

#[test]
fn null_overrides_build_nothing_but_fail_cleanly() {
    let err = Rule::new(Value::Null).unwrap_err();
    assert!(matches!(err, ConfigError::Missing { .. }));
}

#[test]
fn identical_inputs_build_identical_rules() {
    let a = Rule::new(json!({"port": 443, "cidr": "0.0.0.0/0"})).unwrap();
    let b = Rule::new(json!({"port": 443, "cidr": "0.0.0.0/0"})).unwrap();
    assert_eq!(a, b);
}
