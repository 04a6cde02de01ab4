use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::HashSet;

/// Which calendar days can receive work: a set of non-working weekdays plus
/// individual holiday dates.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkCalendar {
    holidays: HashSet<NaiveDate>,
    non_working_days: HashSet<Weekday>,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self::for_policy(5, std::iter::empty())
    }
}

impl WorkCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Calendar for a `work_days_per_week` policy value. Any week shorter than
    /// seven days loses both Saturday and Sunday.
    pub fn for_policy<J>(work_days_per_week: u8, holidays: J) -> Self
    where
        J: IntoIterator<Item = NaiveDate>,
    {
        let non_working_days = if work_days_per_week < 7 {
            HashSet::from([Weekday::Sat, Weekday::Sun])
        } else {
            HashSet::new()
        };
        Self {
            holidays: holidays.into_iter().collect(),
            non_working_days,
        }
    }

    /// Working weekdays, Monday first.
    pub fn working_days(&self) -> Vec<Weekday> {
        Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !self.non_working_days.contains(day))
            .collect()
    }

    /// Check if a date can receive work
    pub fn is_available(&self, date: NaiveDate) -> bool {
        !self.holidays.contains(&date) && !self.non_working_days.contains(&date.weekday())
    }

    /// Find the next available date strictly after `from`
    pub fn next_available(&self, from: NaiveDate) -> NaiveDate {
        let mut current = from + Duration::days(1);
        while !self.is_available(current) {
            current = current + Duration::days(1);
        }
        current
    }

    /// `from` itself when available, otherwise the next available date
    pub fn first_available_from(&self, from: NaiveDate) -> NaiveDate {
        if self.is_available(from) {
            from
        } else {
            self.next_available(from)
        }
    }
}
