//! Window boundaries over a longer sequence of daily fields.

use chrono::{Datelike, Duration, NaiveDate};
use isobar_core::GridSubtype;
use isobar_stats::{make_statistics, Operation};
use isobar_test_utils::field_at_step;
use proptest::prelude::*;

fn yyyymmdd(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

#[test]
fn one_flush_per_completed_month() {
    let mut stats = make_statistics("monthly", &["accumulate", "average"], 2).unwrap();
    let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    let mut flushes = Vec::new();
    for day in 0..365 {
        let date = start + Duration::days(day);
        let msg = field_at_step(GridSubtype::T, yyyymmdd(date), (day + 1) * 24, &[1.0, 2.0]);
        flushes.extend(stats.process_next(&msg).unwrap());
    }
    // Eleven completed months, two operations each; December stays open.
    assert_eq!(flushes.len(), 22);
    let february = flushes
        .iter()
        .filter(|o| o.operation == Operation::Accumulate)
        .nth(1)
        .unwrap();
    assert_eq!(february.values, vec![28.0, 56.0]);
    assert_eq!(february.metadata.get_str("stepRange").unwrap(), "768-1416");

    let december = stats.flush();
    assert_eq!(december.len(), 2);
    let average = december
        .iter()
        .find(|o| o.operation == Operation::Average)
        .unwrap();
    assert_eq!(average.values, vec![1.0, 2.0]);
}

proptest! {
    #[test]
    fn daily_window_count_matches_fields_per_day(per_day in prop::collection::vec(1usize..5, 1..10)) {
        let mut stats = make_statistics("daily", &["maximum"], 1).unwrap();
        let start = NaiveDate::from_ymd_opt(2020, 12, 28).unwrap();
        let mut flushed = 0;
        for (day, &n) in per_day.iter().enumerate() {
            let date = yyyymmdd(start + Duration::days(day as i64));
            for i in 0..n {
                let msg = field_at_step(GridSubtype::W, date, i as i64, &[i as f64]);
                flushed += stats.process_next(&msg).unwrap().len();
            }
            prop_assert_eq!(stats.count(), n as u64);
        }
        prop_assert_eq!(flushed, per_day.len() - 1);
    }
}
