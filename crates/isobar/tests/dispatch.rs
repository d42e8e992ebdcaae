//! A server configuration driven through the facade.

use std::sync::Arc;

use isobar::prelude::*;
use isobar_test_utils::{field_message, grid_pair};

const SERVER: &str = r#"{
    "plans": [
        {
            "name": "grids",
            "actions": {
                "type": "select",
                "match": ["ocean-grid-coordinate"],
                "next": {
                    "type": "encode",
                    "grid-type": "ORCA1",
                    "next": { "type": "sink", "sink": "channel", "channel": "coords" }
                }
            }
        },
        {
            "name": "fields",
            "actions": {
                "type": "select",
                "match": ["ocean-2d"],
                "next": {
                    "type": "encode",
                    "grid-type": "ORCA1",
                    "next": { "type": "sink", "sink": "channel", "channel": "fields" }
                }
            }
        }
    ]
}"#;

#[test]
fn plans_share_grids_through_one_context() {
    let registry = ActionRegistry::new();
    let sinks = Arc::new(StandardSinks::new());
    let coords = sinks.channel("coords");
    let fields = sinks.channel("fields");
    let ctx = PipelineContext::new(
        Arc::new(GridCache::new()),
        Arc::new(isobar::encode::KeyValueCodecFactory::new()),
        sinks,
    );
    let _builtins = BuiltinActions::register(&registry, ctx).unwrap();

    let dispatcher = Dispatcher::new(&Configuration::from_json(SERVER).unwrap(), &registry).unwrap();
    let names: Vec<_> = dispatcher.plans().iter().map(Plan::name).collect();
    assert_eq!(names, ["grids", "fields"]);

    let (lat, lon) = grid_pair(GridSubtype::W, 4);
    dispatcher.dispatch(lat).unwrap();
    dispatcher.dispatch(lon).unwrap();
    assert_eq!(coords.try_iter().count(), 2);
    assert!(fields.try_recv().is_err());

    dispatcher
        .dispatch(field_message(GridSubtype::W, 20200101, &[0.0, 1.0, 2.0, 3.0]))
        .unwrap();
    dispatcher.dispatch(Message::control(Tag::Close)).unwrap();
    assert!(coords.try_recv().is_err());

    let bytes = fields.try_recv().unwrap();
    let record = KeyValueCodec::decode(&bytes).unwrap();
    assert_eq!(record.string("unstructuredGridSubtype"), Some("W"));
    assert_eq!(record.values, vec![0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn init_tracing_installs_once() {
    isobar::init_tracing();
    assert!(!isobar::init_tracing());
}
