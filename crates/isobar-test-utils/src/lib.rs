//! Test utilities and fixtures for Isobar development.
//!
//! Message builders with realistic ocean-model metadata, plus the mock
//! stages in [`fixtures`] for assembling test chains.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    collector_builder, failing_builder, relay_builder, Collected, Collector, FailingAction, Relay,
};

use isobar_core::{GridSubtype, Message, Metadata};

/// Parameter id given to fields built by [`field_metadata`].
pub const FIELD_PARAM: i64 = 151_130;

/// Seconds per model step in fixture metadata.
pub const TIME_STEP: i64 = 3600;

/// Run identification of a forecast run.
pub fn run_metadata() -> Metadata {
    Metadata::new()
        .with("expver", "0001")
        .with("class", "od")
        .with("stream", "oper")
        .with("type", "fc")
}

/// Metadata of a 2-D surface field on `subtype` at `date` (YYYYMMDD).
pub fn field_metadata(subtype: GridSubtype, date: i64, global_size: usize) -> Metadata {
    Metadata::new()
        .with("run", run_metadata())
        .with("param", FIELD_PARAM)
        .with("category", "ocean-2d")
        .with("gridSubtype", subtype.code())
        .with("date", date)
        .with("step", 0_i64)
        .with("timeStep", TIME_STEP)
        .with("globalSize", global_size as i64)
}

/// A field message on `subtype` at `date`, holding `values`.
pub fn field_message(subtype: GridSubtype, date: i64, values: &[f64]) -> Message {
    Message::field(field_metadata(subtype, date, values.len()), values)
}

/// A field message at `date` and `step`, holding `values`.
pub fn field_at_step(subtype: GridSubtype, date: i64, step: i64, values: &[f64]) -> Message {
    let md = field_metadata(subtype, date, values.len()).with("step", step);
    Message::field(md, values)
}

/// A coordinate message for `param` (e.g. `"lat_T"`) on `subtype`.
pub fn coordinate_message(subtype: GridSubtype, param: &str, values: &[f64]) -> Message {
    let param_id = if param.starts_with("lat") { 250_001 } else { 250_002 };
    let md = Metadata::new()
        .with("run", run_metadata())
        .with("nemoParam", param)
        .with("param", param_id as i64)
        .with("category", "ocean-grid-coordinate")
        .with("gridSubtype", subtype.code())
        .with("date", 20_200_101_i64)
        .with("globalSize", values.len() as i64);
    Message::coordinate(md, values)
}

/// Latitude and longitude messages describing a `size`-point grid.
pub fn grid_pair(subtype: GridSubtype, size: usize) -> (Message, Message) {
    let code = subtype.code();
    let lat: Vec<f64> = (0..size).map(|i| -80.0 + i as f64).collect();
    let lon: Vec<f64> = (0..size).map(|i| i as f64 * 0.5).collect();
    (
        coordinate_message(subtype, &format!("lat_{code}"), &lat),
        coordinate_message(subtype, &format!("lon_{code}"), &lon),
    )
}
