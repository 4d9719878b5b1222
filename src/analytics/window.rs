/// Date windowing
///
/// The engine works over a rolling 7-day window `[today - 6, today]`.
/// Everything here is a pure function of the injected `today`.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use crate::domain::DateRange;

/// Number of days in the rolling window
pub const WINDOW_DAYS: usize = 7;

/// The 7 window dates in ascending order, ending with `today`
pub fn window(today: NaiveDate) -> [NaiveDate; WINDOW_DAYS] {
    let mut days = [today; WINDOW_DAYS];
    for (i, day) in days.iter_mut().enumerate() {
        *day = today - Duration::days((WINDOW_DAYS - 1 - i) as i64);
    }
    days
}

/// Group records by their date
///
/// Records outside any particular window are kept; callers that only care
/// about the window look up its 7 keys.
pub fn bucket_by_date<T, F>(records: &[T], date_of: F) -> BTreeMap<NaiveDate, Vec<&T>>
where
    F: Fn(&T) -> NaiveDate,
{
    let mut buckets: BTreeMap<NaiveDate, Vec<&T>> = BTreeMap::new();
    for record in records {
        buckets.entry(date_of(record)).or_default().push(record);
    }
    buckets
}

/// A rolling window anchored on an injected "today"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    today: NaiveDate,
    days: [NaiveDate; WINDOW_DAYS],
}

impl DateWindow {
    pub fn ending(today: NaiveDate) -> Self {
        Self { today, days: window(today) }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn start(&self) -> NaiveDate {
        self.days[0]
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start() && date <= self.today
    }

    /// The window as an inclusive range
    pub fn range(&self) -> DateRange {
        DateRange::spanning(self.start(), self.today)
    }

    /// The 7-day window immediately before this one
    pub fn previous(&self) -> DateWindow {
        DateWindow::ending(self.start() - Duration::days(1))
    }
}
