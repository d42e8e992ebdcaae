//! Calendar-windowed statistics.
//!
//! A window folds same-quantity fields until a field dated in a new
//! calendar period arrives. That field first flushes the completed window
//! (one [`StatisticsOutput`] per operation) and then opens the next one.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use isobar_core::{Message, Metadata};

use crate::error::StatisticsError;
use crate::operation::{parse_operations, Operation};
use crate::state::StatisticsState;

/// Aggregated values of one operation over a completed window.
#[derive(Clone, Debug, PartialEq)]
pub struct StatisticsOutput {
    /// The operation that produced `values`.
    pub operation: Operation,
    /// Metadata of the last folded field, with `operation`, `stepRange`
    /// and `step` describing the window.
    pub metadata: Metadata,
    /// One aggregated value per field element.
    pub values: Vec<f64>,
}

impl StatisticsOutput {
    /// A field message carrying the aggregated values.
    pub fn into_message(self) -> Message {
        Message::field(self.metadata, &self.values)
    }
}

/// A statistics window kind.
pub trait TemporalStatistics: Send + fmt::Debug {
    /// Window kind name (e.g. `"monthly"`).
    fn period(&self) -> &'static str;

    /// Fold `msg` in, first flushing the window if `msg` opens a new period.
    ///
    /// Returns the flushed outputs, or nothing when no boundary was crossed.
    fn process_next(&mut self, msg: &Message) -> Result<Vec<StatisticsOutput>, StatisticsError>;

    /// Flush the current, possibly partial, window.
    fn flush(&mut self) -> Vec<StatisticsOutput>;

    /// The running aggregates.
    fn state(&self) -> &StatisticsState;

    /// Fields folded into the current window.
    fn count(&self) -> u64 {
        self.state().count()
    }
}

/// Decode a `YYYYMMDD` integer.
pub fn parse_date(date: i64) -> Result<NaiveDate, StatisticsError> {
    let invalid = || StatisticsError::InvalidDate { date };
    let year = i32::try_from(date / 10_000).map_err(|_| invalid())?;
    let month = u32::try_from((date / 100) % 100).map_err(|_| invalid())?;
    let day = u32::try_from(date % 100).map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Identifies the calendar period a date falls in.
type PeriodKey = (i32, u32, u32);

/// Shared folding logic, parameterized by the period key of a date.
#[derive(Clone, Debug)]
struct Window {
    state: StatisticsState,
    current: Option<PeriodKey>,
    first_step: Option<i64>,
    last: Option<Metadata>,
}

impl Window {
    fn new(operations: &[Operation], size: usize) -> Self {
        Self {
            state: StatisticsState::new(operations, size),
            current: None,
            first_step: None,
            last: None,
        }
    }

    fn process_next(
        &mut self,
        msg: &Message,
        key_of: fn(NaiveDate) -> PeriodKey,
    ) -> Result<Vec<StatisticsOutput>, StatisticsError> {
        let md = msg.metadata();
        let key = key_of(parse_date(md.get_i64("date")?)?);
        let step = md.get_i64("step")?;
        let values = msg.values()?;
        if values.len() != self.state.size() {
            return Err(StatisticsError::SizeMismatch {
                expected: self.state.size(),
                found: values.len(),
            });
        }

        let flushed = match self.current {
            Some(current) if current != key => self.flush(),
            _ => Vec::new(),
        };

        self.state.fold(&values)?;
        self.current = Some(key);
        self.first_step.get_or_insert(step);
        self.last = Some(md.clone());
        Ok(flushed)
    }

    fn flush(&mut self) -> Vec<StatisticsOutput> {
        let results = self.state.results();
        let outputs = match (self.last.take(), self.first_step.take()) {
            (Some(last), Some(first)) if !results.is_empty() => {
                let last_step = last.get_i64("step").unwrap_or(first);
                tracing::debug!(
                    count = self.state.count(),
                    step_range = %format_args!("{first}-{last_step}"),
                    "flushing statistics window"
                );
                results
                    .into_iter()
                    .map(|(operation, values)| StatisticsOutput {
                        operation,
                        metadata: last
                            .clone()
                            .with("operation", operation.name())
                            .with("stepRange", format!("{first}-{last_step}"))
                            .with("step", last_step),
                        values,
                    })
                    .collect()
            }
            _ => Vec::new(),
        };
        self.state.reset();
        self.current = None;
        outputs
    }
}

/// Statistics over calendar months.
#[derive(Clone, Debug)]
pub struct MonthlyStatistics {
    window: Window,
}

impl MonthlyStatistics {
    /// Allocate buffers of `size` elements for `operations`.
    pub fn new(operations: &[Operation], size: usize) -> Self {
        Self {
            window: Window::new(operations, size),
        }
    }

    fn key(date: NaiveDate) -> PeriodKey {
        (date.year(), date.month(), 0)
    }
}

impl TemporalStatistics for MonthlyStatistics {
    fn period(&self) -> &'static str {
        "monthly"
    }

    fn process_next(&mut self, msg: &Message) -> Result<Vec<StatisticsOutput>, StatisticsError> {
        self.window.process_next(msg, Self::key)
    }

    fn flush(&mut self) -> Vec<StatisticsOutput> {
        self.window.flush()
    }

    fn state(&self) -> &StatisticsState {
        &self.window.state
    }
}

/// Statistics over calendar days.
#[derive(Clone, Debug)]
pub struct DailyStatistics {
    window: Window,
}

impl DailyStatistics {
    /// Allocate buffers of `size` elements for `operations`.
    pub fn new(operations: &[Operation], size: usize) -> Self {
        Self {
            window: Window::new(operations, size),
        }
    }

    fn key(date: NaiveDate) -> PeriodKey {
        (date.year(), date.month(), date.day())
    }
}

impl TemporalStatistics for DailyStatistics {
    fn period(&self) -> &'static str {
        "daily"
    }

    fn process_next(&mut self, msg: &Message) -> Result<Vec<StatisticsOutput>, StatisticsError> {
        self.window.process_next(msg, Self::key)
    }

    fn flush(&mut self) -> Vec<StatisticsOutput> {
        self.window.flush()
    }

    fn state(&self) -> &StatisticsState {
        &self.window.state
    }
}

/// Window kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Period {
    /// Calendar months, see [`MonthlyStatistics`].
    Monthly,
    /// Calendar days, see [`DailyStatistics`].
    Daily,
}

impl Period {
    /// Allocate a window of this kind.
    pub fn create(self, operations: &[Operation], size: usize) -> Box<dyn TemporalStatistics> {
        match self {
            Period::Monthly => Box::new(MonthlyStatistics::new(operations, size)),
            Period::Daily => Box::new(DailyStatistics::new(operations, size)),
        }
    }
}

impl FromStr for Period {
    type Err = StatisticsError;

    /// Accepts `month`/`monthly` and `day`/`daily`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month" | "monthly" => Ok(Period::Monthly),
            "day" | "daily" => Ok(Period::Daily),
            _ => Err(StatisticsError::UnknownPeriod {
                name: s.to_string(),
            }),
        }
    }
}

/// Create the window kind named `period` for the named `operations`.
pub fn make_statistics<S: AsRef<str>>(
    period: &str,
    operations: &[S],
    size: usize,
) -> Result<Box<dyn TemporalStatistics>, StatisticsError> {
    let period: Period = period.parse()?;
    let ops = parse_operations(operations)?;
    Ok(period.create(&ops, size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use isobar_core::GridSubtype;
    use isobar_test_utils::{field_at_step, field_message};

    fn output<'a>(outputs: &'a [StatisticsOutput], op: Operation) -> &'a StatisticsOutput {
        outputs.iter().find(|o| o.operation == op).unwrap()
    }

    #[test]
    fn dates_decode() {
        assert_eq!(
            parse_date(20200229).unwrap(),
            NaiveDate::from_ymd_opt(2020, 2, 29).unwrap()
        );
        assert_eq!(
            parse_date(20190229),
            Err(StatisticsError::InvalidDate { date: 20190229 })
        );
        assert!(parse_date(20201301).is_err());
    }

    #[test]
    fn monthly_flushes_once_at_month_boundary() {
        let ops = [Operation::Accumulate, Operation::Maximum];
        let mut stats = MonthlyStatistics::new(&ops, 3);

        let fields = [
            field_at_step(GridSubtype::T, 20200105, 24, &[1.0, 5.0, -1.0]),
            field_at_step(GridSubtype::T, 20200115, 48, &[2.0, 4.0, -2.0]),
            field_at_step(GridSubtype::T, 20200131, 72, &[3.0, 3.0, -3.0]),
        ];
        for f in &fields {
            assert!(stats.process_next(f).unwrap().is_empty());
        }
        assert_eq!(stats.count(), 3);

        let next = field_at_step(GridSubtype::T, 20200201, 96, &[10.0, 10.0, 10.0]);
        let out = stats.process_next(&next).unwrap();
        assert_eq!(out.len(), 2);

        let acc = output(&out, Operation::Accumulate);
        assert_eq!(acc.values, vec![6.0, 12.0, -6.0]);
        assert_eq!(acc.metadata.get_str("operation").unwrap(), "accumulate");
        assert_eq!(acc.metadata.get_str("stepRange").unwrap(), "24-72");
        assert_eq!(acc.metadata.get_i64("step").unwrap(), 72);
        assert_eq!(acc.metadata.get_i64("date").unwrap(), 20200131);

        let max = output(&out, Operation::Maximum);
        assert_eq!(max.values, vec![3.0, 5.0, -1.0]);

        assert_eq!(stats.count(), 1);
        assert_eq!(
            stats.state().buffer(Operation::Accumulate).unwrap(),
            &[10.0, 10.0, 10.0]
        );
    }

    #[test]
    fn daily_flushes_on_new_day() {
        let mut stats = DailyStatistics::new(&[Operation::Average], 1);
        assert!(stats
            .process_next(&field_message(GridSubtype::U, 20200101, &[2.0]))
            .unwrap()
            .is_empty());
        assert!(stats
            .process_next(&field_message(GridSubtype::U, 20200101, &[4.0]))
            .unwrap()
            .is_empty());
        let out = stats
            .process_next(&field_message(GridSubtype::U, 20200102, &[8.0]))
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].values, vec![3.0]);
    }

    #[test]
    fn same_day_next_year_is_a_new_month() {
        let mut stats = MonthlyStatistics::new(&[Operation::Minimum], 1);
        stats
            .process_next(&field_message(GridSubtype::T, 20200301, &[1.0]))
            .unwrap();
        let out = stats
            .process_next(&field_message(GridSubtype::T, 20210301, &[2.0]))
            .unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn size_mismatch_leaves_window_untouched() {
        let mut stats = MonthlyStatistics::new(&[Operation::Accumulate], 2);
        stats
            .process_next(&field_message(GridSubtype::T, 20200101, &[1.0, 1.0]))
            .unwrap();
        let err = stats
            .process_next(&field_message(GridSubtype::T, 20200201, &[1.0]))
            .unwrap_err();
        assert_eq!(
            err,
            StatisticsError::SizeMismatch {
                expected: 2,
                found: 1
            }
        );
        assert_eq!(stats.count(), 1);
    }

    #[test]
    fn flush_emits_partial_window_then_nothing() {
        let mut stats = MonthlyStatistics::new(&[Operation::Accumulate], 1);
        assert!(stats.flush().is_empty());
        stats
            .process_next(&field_message(GridSubtype::T, 20200101, &[1.5]))
            .unwrap();
        let out = stats.flush();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].values, vec![1.5]);
        assert_eq!(stats.count(), 0);
        assert!(stats.flush().is_empty());

        let msg = out[0].clone().into_message();
        assert_eq!(msg.values().unwrap(), vec![1.5]);
    }

    #[test]
    fn factory_resolves_period_names() {
        for name in ["month", "monthly"] {
            let stats = make_statistics(name, &["average"], 4).unwrap();
            assert_eq!(stats.period(), "monthly");
            assert_eq!(stats.state().size(), 4);
        }
        for name in ["day", "daily"] {
            assert_eq!(make_statistics(name, &["maximum"], 1).unwrap().period(), "daily");
        }
        assert!(matches!(
            make_statistics("hourly", &["maximum"], 1),
            Err(StatisticsError::UnknownPeriod { .. })
        ));
        assert!(matches!(
            make_statistics("monthly", &["median"], 1),
            Err(StatisticsError::UnknownOperation { .. })
        ));
    }
}
