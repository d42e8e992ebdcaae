//! Benchmark profiles for the Isobar output pipeline.
//!
//! - [`ORCA1_POINTS`]: horizontal size of a 1-degree ocean grid
//! - [`smooth_field`]: deterministic field values of a given size
//! - [`daily_fields`]: one field per day starting at a date

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use isobar_core::{GridSubtype, Message};
use isobar_test_utils::field_at_step;

/// Points of the 362x292 ORCA1 grid.
pub const ORCA1_POINTS: usize = 362 * 292;

/// Deterministic, slowly varying values.
pub fn smooth_field(size: usize, phase: f64) -> Vec<f64> {
    (0..size)
        .map(|i| 15.0 + 10.0 * ((i as f64) * 1e-3 + phase).sin())
        .collect()
}

/// `days` daily T-grid fields of `size` points, starting at 2020-01-01.
///
/// Dates stay within valid calendar days by cycling through 28-day months.
pub fn daily_fields(size: usize, days: usize) -> Vec<Message> {
    (0..days)
        .map(|d| {
            let month = (d / 28) % 12 + 1;
            let day = d % 28 + 1;
            let year = 2020 + (d / (28 * 12));
            let date = (year * 10_000 + month * 100 + day) as i64;
            let step = ((d + 1) * 24) as i64;
            field_at_step(GridSubtype::T, date, step, &smooth_field(size, d as f64))
        })
        .collect()
}
