// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::*;

const CONFIG: &str = r#"
rpc-url: http://127.0.0.1:9000
swap:
  package: "0x1145"
  module: cetus
  function: swap_b2a
  type-arguments:
    - "0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC"
    - "0x2::sui::SUI"
  amount: 100000
  arguments:
    - kind: shared
      object-id: "0xdaa4"
      mutable: false
    - kind: shared
      object-id: "0xb8d7"
      mutable: true
    - kind: split-coin
    - kind: shared
      object-id: "0x6"
      mutable: false
"#;

fn parse(yaml: &str) -> SwapConfig {
    serde_yaml::from_str(yaml).unwrap()
}

fn with_arguments(arguments: &str) -> SwapConfig {
    let head = CONFIG.split("  arguments:").next().unwrap();
    parse(&format!("{head}  arguments:\n{arguments}"))
}

#[test]
fn defaults_are_applied() {
    let config = parse(CONFIG);
    assert_eq!(config.request_timeout(), Duration::from_secs(30));
    assert_eq!(config.private_key_env, "PRIVATE_KEY");

    let settings = config.run_settings().unwrap();
    assert_eq!(settings.gas_coin, None);
    assert_eq!(settings.margins, GasMargins::default());
    assert_eq!(settings.dry_run_gas_budget, DEFAULT_DRY_RUN_GAS_BUDGET);
    assert_eq!(settings.wait_mode, WaitMode::LocalExecution);
}

#[test]
fn plan_keeps_argument_order_and_access() {
    let plan = parse(CONFIG).swap_plan().unwrap();
    assert_eq!(plan.package, ObjectID::from_hex_literal("0x1145").unwrap());
    assert_eq!(plan.module.as_str(), "cetus");
    assert_eq!(plan.function.as_str(), "swap_b2a");
    assert_eq!(plan.type_arguments.len(), 2);
    assert_eq!(plan.amount, 100_000);
    assert_eq!(plan.recipient, None);
    assert_eq!(
        plan.arguments,
        vec![
            CallArgument::Shared {
                object_id: ObjectID::from_hex_literal("0xdaa4").unwrap(),
                mutable: false,
            },
            CallArgument::Shared {
                object_id: ObjectID::from_hex_literal("0xb8d7").unwrap(),
                mutable: true,
            },
            CallArgument::SplitCoin,
            CallArgument::Shared {
                object_id: ObjectID::from_hex_literal("0x6").unwrap(),
                mutable: false,
            },
        ]
    );
}

#[test]
fn shared_argument_requires_mutability() {
    let yaml = CONFIG.replacen("      mutable: false\n", "", 1);
    assert!(serde_yaml::from_str::<SwapConfig>(&yaml).is_err());
}

#[test]
fn unknown_keys_are_rejected() {
    let yaml = format!("{CONFIG}gas-margin: 2.0\n");
    assert!(serde_yaml::from_str::<SwapConfig>(&yaml).is_err());
}

#[test]
fn conflicting_mutability_is_rejected() {
    let config = with_arguments(
        r#"    - kind: shared
      object-id: "0xdaa4"
      mutable: false
    - kind: split-coin
    - kind: shared
      object-id: "0xdaa4"
      mutable: true
"#,
    );
    let err = config.swap_plan().unwrap_err();
    assert!(
        matches!(&err, Error::Config(msg) if msg.contains("conflicting")),
        "{err}"
    );
}

#[test]
fn shared_and_owned_use_of_one_object_is_rejected() {
    let config = with_arguments(
        r#"    - kind: owned
      object-id: "0xabc"
    - kind: split-coin
    - kind: shared
      object-id: "0xabc"
      mutable: true
"#,
    );
    assert!(matches!(config.swap_plan().unwrap_err(), Error::Config(_)));
}

#[test]
fn repeated_shared_object_with_same_access_is_allowed() {
    let config = with_arguments(
        r#"    - kind: shared
      object-id: "0xb8d7"
      mutable: true
    - kind: split-coin
    - kind: shared
      object-id: "0xb8d7"
      mutable: true
"#,
    );
    assert_eq!(config.swap_plan().unwrap().arguments.len(), 3);
}

#[test]
fn owned_object_cannot_be_used_twice() {
    let config = with_arguments(
        r#"    - kind: owned
      object-id: "0xabc"
    - kind: split-coin
    - kind: owned
      object-id: "0xabc"
"#,
    );
    assert!(matches!(config.swap_plan().unwrap_err(), Error::Config(_)));
}

#[test]
fn exactly_one_split_coin() {
    let none = with_arguments(
        r#"    - kind: shared
      object-id: "0x6"
      mutable: false
"#,
    );
    assert!(matches!(none.swap_plan().unwrap_err(), Error::Config(_)));

    let two = with_arguments("    - kind: split-coin\n    - kind: split-coin\n");
    assert!(matches!(two.swap_plan().unwrap_err(), Error::Config(_)));
}

#[test]
fn margins_below_one_are_rejected() {
    let mut config = parse(CONFIG);
    config.gas_price_margin = 0.95;
    assert!(matches!(config.run_settings().unwrap_err(), Error::Config(_)));

    let mut config = parse(CONFIG);
    config.gas_budget_margin = f64::NAN;
    assert!(matches!(config.run_settings().unwrap_err(), Error::Config(_)));

    let mut config = parse(CONFIG);
    config.gas_price_margin = 1.0;
    config.gas_budget_margin = 1.5;
    let settings = config.run_settings().unwrap();
    assert_eq!(settings.margins.gas_price(1000), 1000);
    assert_eq!(settings.margins.gas_budget(1000), 1500);
}

#[test]
fn invalid_identifiers_are_reported() {
    let mut config = parse(CONFIG);
    config.swap.package = "not-an-id".to_string();
    assert!(matches!(
        config.swap_plan().unwrap_err(),
        Error::InvalidInput { value, .. } if value == "not-an-id"
    ));

    let mut config = parse(CONFIG);
    config.swap.type_arguments.push("Coin<".to_string());
    assert!(matches!(
        config.swap_plan().unwrap_err(),
        Error::InvalidInput { .. }
    ));

    let mut config = parse(CONFIG);
    config.gas_coin = Some("0xzz".to_string());
    assert!(matches!(
        config.run_settings().unwrap_err(),
        Error::InvalidInput { .. }
    ));
}

#[test]
fn zero_amount_is_rejected() {
    let mut config = parse(CONFIG);
    config.swap.amount = 0;
    assert!(matches!(config.swap_plan().unwrap_err(), Error::Config(_)));
}

#[test]
fn private_key_comes_from_the_configured_variable() {
    let mut config = parse(CONFIG);
    config.private_key_env = "SUI_SWAP_CONFIG_TESTS_KEY".to_string();
    assert!(matches!(config.private_key().unwrap_err(), Error::Config(_)));

    std::env::set_var("SUI_SWAP_CONFIG_TESTS_KEY", "suiprivkey1example");
    assert_eq!(config.private_key().unwrap(), "suiprivkey1example");
}
