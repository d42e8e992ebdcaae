//! End-to-end pipelines assembled from configuration.

use std::sync::Arc;

use isobar_action::{ActionError, ActionRegistry, Plan};
use isobar_actions::{BuiltinActions, PipelineContext};
use isobar_core::{Configuration, GridSubtype, Message, Tag};
use isobar_encode::{GridCache, KeyValueCodec, KeyValueCodecFactory};
use isobar_sink::StandardSinks;
use isobar_test_utils::{
    collector_builder, field_at_step, field_message, grid_pair, Collected,
};

const OCEAN_PLAN: &str = r#"{
    "name": "ocean",
    "actions": {
        "type": "select",
        "match": ["ocean-2d", "ocean-grid-coordinate"],
        "next": {
            "type": "statistics",
            "period": "monthly",
            "operations": ["accumulate", "maximum"],
            "next": {
                "type": "encode",
                "grid-type": "ORCA1",
                "next": { "type": "sink", "sink": "channel", "channel": "out" }
            }
        }
    }
}"#;

fn context(sinks: Arc<StandardSinks>) -> PipelineContext {
    PipelineContext::new(
        Arc::new(GridCache::new()),
        Arc::new(KeyValueCodecFactory::new()),
        sinks,
    )
}

#[test]
fn coordinates_then_monthly_statistics_reach_storage() {
    let registry = ActionRegistry::new();
    let sinks = Arc::new(StandardSinks::new());
    let out = sinks.channel("out");
    let _builtins = BuiltinActions::register(&registry, context(sinks.clone())).unwrap();

    let plan = Plan::new(&Configuration::from_json(OCEAN_PLAN).unwrap(), &registry).unwrap();
    assert_eq!(
        plan.stage_names(),
        vec!["select", "statistics", "encode", "sink"]
    );

    let (lat, lon) = grid_pair(GridSubtype::T, 3);
    plan.process(lat).unwrap();
    assert!(out.try_recv().is_err());
    plan.process(lon).unwrap();
    let coords: Vec<_> = out.try_iter().collect();
    assert_eq!(coords.len(), 2);
    let lat_record = KeyValueCodec::decode(&coords[0]).unwrap();
    assert_eq!(lat_record.string("unstructuredGridSubtype"), Some("T"));
    assert_eq!(lat_record.values[0], -80.0);

    plan.process(field_at_step(GridSubtype::T, 20200110, 24, &[1.0, 2.0, 3.0]))
        .unwrap();
    plan.process(field_at_step(GridSubtype::T, 20200120, 48, &[4.0, 0.0, 3.0]))
        .unwrap();
    plan.process(field_at_step(GridSubtype::T, 20200130, 72, &[2.0, 1.0, 9.0]))
        .unwrap();
    assert!(out.try_recv().is_err());

    plan.process(field_at_step(GridSubtype::T, 20200205, 96, &[1.0, 1.0, 1.0]))
        .unwrap();
    let january: Vec<_> = out
        .try_iter()
        .map(|bytes| KeyValueCodec::decode(&bytes).unwrap())
        .collect();
    assert_eq!(january.len(), 2);

    let accumulate = &january[0];
    assert_eq!(accumulate.long("typeOfStatisticalProcessing"), Some(1));
    assert_eq!(accumulate.string("stepRange"), Some("24-72"));
    assert_eq!(accumulate.long("indicatorOfUnitForTimeIncrement"), Some(13));
    assert_eq!(accumulate.long("timeIncrement"), Some(3600));
    assert_eq!(accumulate.values, vec![7.0, 3.0, 15.0]);

    let maximum = &january[1];
    assert_eq!(maximum.long("typeOfStatisticalProcessing"), Some(2));
    assert_eq!(maximum.values, vec![4.0, 2.0, 9.0]);
    assert_eq!(
        maximum.bytes("uuidOfHGrid"),
        lat_record.bytes("uuidOfHGrid")
    );

    plan.process(Message::control(Tag::Close)).unwrap();
    let february: Vec<_> = out.try_iter().collect();
    assert_eq!(february.len(), 2);
    let record = KeyValueCodec::decode(&february[0]).unwrap();
    assert_eq!(record.string("stepRange"), Some("96-96"));
    assert_eq!(record.values, vec![1.0, 1.0, 1.0]);
}

#[test]
fn field_before_grid_is_rejected_by_encode_stage() {
    let registry = ActionRegistry::new();
    let _builtins = BuiltinActions::register(&registry, PipelineContext::default()).unwrap();
    let config = Configuration::from_json(
        r#"{"name": "raw", "actions": {"type": "encode", "grid-type": "ORCA1", "next": {"type": "sink"}}}"#,
    )
    .unwrap();
    let plan = Plan::new(&config, &registry).unwrap();
    let err = plan
        .process(field_message(GridSubtype::U, 20200101, &[1.0]))
        .unwrap_err();
    match err {
        ActionError::Stage { stage, source } => {
            assert_eq!(stage, "encode");
            assert!(source.to_string().contains("not ready"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn grid_cache_is_shared_between_plans() {
    let registry = ActionRegistry::new();
    let ctx = PipelineContext::default();
    let grids = ctx.grids.clone();
    let _builtins = BuiltinActions::register(&registry, ctx).unwrap();
    let collected = Collected::new();
    let _collect = registry
        .register("collect", collector_builder(collected.clone()))
        .unwrap();

    let plan = |name: &str| {
        let config = Configuration::from_json(&format!(
            r#"{{"name": "{name}", "actions": {{"type": "encode", "grid-type": "ORCA1", "next": {{"type": "collect"}}}}}}"#
        ))
        .unwrap();
        Plan::new(&config, &registry).unwrap()
    };
    let coordinates = plan("coordinates");
    let fields = plan("fields");

    let (lat, lon) = grid_pair(GridSubtype::V, 2);
    coordinates.process(lat).unwrap();
    coordinates.process(lon).unwrap();
    assert!(grids.is_ready(GridSubtype::V));

    fields
        .process(field_message(GridSubtype::V, 20200101, &[0.5, 0.25]))
        .unwrap();
    let encoded = collected.with_tag(Tag::Encoded);
    assert_eq!(encoded.len(), 3);
}

#[test]
fn file_sink_plan_appends_encoded_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fields.iskv");
    let registry = ActionRegistry::new();
    let _builtins = BuiltinActions::register(&registry, PipelineContext::default()).unwrap();
    let config = Configuration::from_json(&format!(
        r#"{{"name": "file", "actions": {{"type": "print", "next": {{"type": "encode", "grid-type": "ORCA1", "next": {{"type": "sink", "sink": "file", "path": {:?}}}}}}}}}"#,
        path.to_string_lossy()
    ))
    .unwrap();
    let plan = Plan::new(&config, &registry).unwrap();

    let (lat, lon) = grid_pair(GridSubtype::T, 2);
    plan.process(lat).unwrap();
    plan.process(lon).unwrap();
    plan.process(Message::control(Tag::StepComplete)).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..4], b"ISKV");
    assert!(bytes.len() > 2 * 32);
}
