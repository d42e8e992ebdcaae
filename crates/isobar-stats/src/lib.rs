//! Temporal statistics for the Isobar output pipeline.
//!
//! Fields of one physical quantity are folded into per-operation running
//! aggregates ([`StatisticsState`]) until the calendar period changes. A
//! [`TemporalStatistics`] window then flushes one [`StatisticsOutput`] per
//! operation, ready for encoding, and starts over.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod operation;
pub mod state;
pub mod temporal;

pub use error::StatisticsError;
pub use operation::{parse_operations, Operation, Operations};
pub use state::StatisticsState;
pub use temporal::{
    make_statistics, parse_date, DailyStatistics, MonthlyStatistics, Period, StatisticsOutput,
    TemporalStatistics,
};
