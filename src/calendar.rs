//! Calendar helpers: business days, month arithmetic and date ranges.
//!
//! Business days are Monday through Friday. There is no holiday calendar.

use crate::error::{EngineError, Result};
use chrono::{Datelike, Months, NaiveDate, Weekday};
use std::iter::FusedIterator;

/// Returns `true` if `date` falls on Monday through Friday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Walks backward from `date` to the nearest business day.
///
/// A business day is returned unchanged.
pub fn previous_business_day(date: NaiveDate) -> NaiveDate {
    let mut current = date;
    while !is_business_day(current) {
        match current.pred_opt() {
            Some(prev) => current = prev,
            None => break,
        }
    }
    current
}

/// Builds `year-month-day`, failing if the day does not exist in that month.
///
/// Recurring rules never clamp: a pay day of 31 is an error in a 30-day month.
pub fn date_on(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(EngineError::InvalidDayOfMonth { day, year, month })
}

/// Last calendar day of the month, or `None` for an invalid month.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

/// The second business day counting backward from the last calendar day.
///
/// For a month ending Friday 31st this is Thursday 30th; for a month ending on
/// a Sunday it is the Thursday before, because the weekend is skipped first.
pub fn second_to_last_business_day(year: i32, month: u32) -> Option<NaiveDate> {
    let mut current = last_day_of_month(year, month)?;
    let mut found = 0;
    loop {
        if is_business_day(current) {
            found += 1;
            if found == 2 {
                return Some(current);
            }
        }
        current = current.pred_opt()?;
    }
}

/// First day of every month that overlaps `[start, end]`.
pub fn month_starts(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let first = start.with_day(1);
    std::iter::successors(first, |d| d.checked_add_months(Months::new(1)))
        .take_while(move |d| *d <= end)
}

/// Last day of the half-open window `[start, start + days)`.
///
/// `None` when the window is empty or runs past the last representable date.
pub fn window_end(start: NaiveDate, days: u64) -> Option<NaiveDate> {
    let offset = days.checked_sub(1)?;
    start.checked_add_days(chrono::Days::new(offset))
}

/// The half-open simulation window `[start, start + days)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDate,
    pub days: u64,
}

impl Window {
    pub fn new(start: NaiveDate, days: u64) -> Self {
        Window { start, days }
    }

    /// Last day inside the window, `None` when empty.
    pub fn end(&self) -> Option<NaiveDate> {
        window_end(self.start, self.days)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match self.end() {
            Some(end) => self.start <= date && date <= end,
            None => false,
        }
    }

    /// Every date of the window, in order.
    pub fn dates(&self) -> DateRange {
        date_range(self.start, self.days)
    }
}

/// A lazy run of consecutive dates.
///
/// Cloning a range restarts it from wherever the clone was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    next: Option<NaiveDate>,
    remaining: u64,
}

impl DateRange {
    /// `count` consecutive dates starting at `start`.
    pub fn new(start: NaiveDate, count: u64) -> Self {
        DateRange {
            next: Some(start),
            remaining: count,
        }
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;
        self.next = current.succ_opt();
        if self.next.is_none() {
            self.remaining = 0;
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) if self.next.is_some() => (n, Some(n)),
            Ok(_) => (0, Some(0)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for DateRange {}

/// Dates of the window `[start, start + days)`.
pub fn date_range(start: NaiveDate, days: u64) -> DateRange {
    DateRange::new(start, days)
}

/// Every day from `start` through `until`, inclusive.
///
/// Without `until` the entry happens once. Returns `None` when `until`
/// precedes `start`.
pub fn expand_date_range(start: NaiveDate, until: Option<NaiveDate>) -> Option<DateRange> {
    match until {
        None => Some(DateRange::new(start, 1)),
        Some(end) if end < start => None,
        Some(end) => {
            let span = end.signed_duration_since(start).num_days();
            let count = u64::try_from(span).ok()? + 1;
            Some(DateRange::new(start, count))
        }
    }
}
