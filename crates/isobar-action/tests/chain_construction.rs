//! Registry and plan behaviour exercised through configuration.

use isobar_action::{chain_len, ActionError, ActionRegistry, Dispatcher, Plan};
use isobar_core::{Configuration, GridSubtype, Tag};
use isobar_test_utils::{
    collector_builder, failing_builder, field_message, relay_builder, Collected,
};

fn nested(depth: usize) -> String {
    let mut block = r#"{"type": "collect"}"#.to_string();
    for i in 0..depth {
        let kind = if i % 2 == 0 { "relay" } else { "forward" };
        block = format!(r#"{{"type": "{kind}", "next": {block}}}"#);
    }
    block
}

#[test]
fn duplicate_name_leaves_registry_intact() {
    let registry = ActionRegistry::new();
    let collected = Collected::new();
    let _collect = registry
        .register("collect", collector_builder(collected.clone()))
        .unwrap();
    let err = registry
        .register("collect", relay_builder("impostor"))
        .unwrap_err();
    assert!(matches!(err, ActionError::DuplicateAction { .. }));

    let stage = registry
        .build("collect", &Configuration::empty())
        .unwrap();
    assert_eq!(stage.name(), "collector");
    assert_eq!(registry.names(), vec!["collect"]);
}

#[test]
fn register_then_unregister_then_build_fails() {
    let registry = ActionRegistry::new();
    let reg = registry.register("relay", relay_builder("relay")).unwrap();
    drop(reg);
    assert!(matches!(
        registry.build("relay", &Configuration::empty()),
        Err(ActionError::UnknownAction { .. })
    ));
    assert!(matches!(
        registry.unregister("relay"),
        Err(ActionError::NotRegistered { .. })
    ));
}

#[test]
fn chain_length_is_nesting_depth_plus_one() {
    let registry = ActionRegistry::new();
    let collected = Collected::new();
    let _collect = registry
        .register("collect", collector_builder(collected.clone()))
        .unwrap();
    let _relay = registry.register("relay", relay_builder("relay")).unwrap();
    let _forward = registry
        .register("forward", relay_builder("forward"))
        .unwrap();

    for depth in 0..6 {
        let config = Configuration::from_json(&nested(depth)).unwrap();
        let root = registry.build(config.action_type().unwrap(), &config).unwrap();
        assert_eq!(chain_len(root.as_ref()), depth + 1);
    }
}

#[test]
fn plan_routes_messages_to_terminus() {
    let registry = ActionRegistry::new();
    let collected = Collected::new();
    let _collect = registry
        .register("collect", collector_builder(collected.clone()))
        .unwrap();
    let _relay = registry.register("relay", relay_builder("relay")).unwrap();
    let _forward = registry
        .register("forward", relay_builder("forward"))
        .unwrap();

    let config = Configuration::from_json(&format!(
        r#"{{"name": "ocean", "actions": {}}}"#,
        nested(2)
    ))
    .unwrap();
    let plan = Plan::new(&config, &registry).unwrap();
    assert_eq!(plan.name(), "ocean");
    assert_eq!(plan.stage_names(), vec!["forward", "relay", "collector"]);

    plan.process(field_message(GridSubtype::T, 20200101, &[1.0]))
        .unwrap();
    assert_eq!(collected.tags(), vec![Tag::Field]);
}

#[test]
fn stage_failure_escapes_plan() {
    let registry = ActionRegistry::new();
    let collected = Collected::new();
    let _collect = registry
        .register("collect", collector_builder(collected.clone()))
        .unwrap();
    let _failing = registry.register("failing", failing_builder()).unwrap();

    let config = Configuration::from_json(
        r#"{"name": "p", "actions": {"type": "failing", "succeed": 1, "next": {"type": "collect"}}}"#,
    )
    .unwrap();
    let plan = Plan::new(&config, &registry).unwrap();
    plan.process(field_message(GridSubtype::T, 20200101, &[1.0]))
        .unwrap();
    let err = plan
        .process(field_message(GridSubtype::T, 20200101, &[1.0]))
        .unwrap_err();
    assert!(matches!(err, ActionError::Stage { .. }));
    assert_eq!(collected.len(), 1);
}

#[test]
fn dispatcher_builds_every_plan() {
    let registry = ActionRegistry::new();
    let collected = Collected::new();
    let _collect = registry
        .register("collect", collector_builder(collected.clone()))
        .unwrap();
    let _relay = registry.register("relay", relay_builder("relay")).unwrap();

    let config = Configuration::from_json(
        r#"{"plans": [
            {"name": "a", "actions": {"type": "collect"}},
            {"name": "b", "actions": {"type": "relay", "next": {"type": "collect"}}}
        ]}"#,
    )
    .unwrap();
    let dispatcher = Dispatcher::new(&config, &registry).unwrap();
    assert_eq!(dispatcher.plans().len(), 2);

    dispatcher
        .dispatch(field_message(GridSubtype::U, 20200101, &[0.5]))
        .unwrap();
    assert_eq!(collected.len(), 2);
}

#[test]
fn global_registry_is_shared() {
    let first = ActionRegistry::global() as *const ActionRegistry;
    let second = ActionRegistry::global() as *const ActionRegistry;
    assert_eq!(first, second);

    let reg = ActionRegistry::global()
        .register("global-relay-test", relay_builder("relay"))
        .unwrap();
    assert!(ActionRegistry::global().contains("global-relay-test"));
    drop(reg);
    assert!(!ActionRegistry::global().contains("global-relay-test"));
}
