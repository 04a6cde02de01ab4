use chrono::{NaiveDate, NaiveDateTime};

use crate::calendar::WorkCalendar;
use crate::policy::TimeOfDay;

/// Walks forward through the calendar one working day at a time, tracking
/// how much of the current day has been handed out.
///
/// A cursor is built fresh for every scheduling run and has no terminal
/// state; it keeps advancing for as long as tasks are consumed.
#[derive(Debug, Clone)]
pub struct CalendarCursor {
    calendar: WorkCalendar,
    day_start_minutes: i64,
    current_date: NaiveDate,
    hours_used_today: f64,
    /// Minutes after midnight; always a whole-minute slot boundary.
    pointer_minutes: i64,
}

impl CalendarCursor {
    pub fn new(calendar: WorkCalendar, work_start_time: TimeOfDay, now: NaiveDateTime) -> Self {
        let day_start_minutes = i64::from(work_start_time.minutes_since_midnight());
        Self {
            calendar,
            day_start_minutes,
            current_date: now.date(),
            hours_used_today: 0.0,
            pointer_minutes: day_start_minutes,
        }
    }

    pub fn current_date(&self) -> NaiveDate {
        self.current_date
    }

    pub fn hours_used_today(&self) -> f64 {
        self.hours_used_today
    }

    /// Hours after midnight where the next placement starts.
    pub fn time_pointer(&self) -> f64 {
        self.pointer_minutes as f64 / 60.0
    }

    pub fn is_day_empty(&self) -> bool {
        self.hours_used_today == 0.0
    }

    /// Move to the next working day after the current one and start it fresh.
    pub fn advance_to_next_working_day(&mut self) {
        self.current_date = self.calendar.next_available(self.current_date);
        self.reset_day();
    }

    /// If the cursor rests on a non-working day, move forward to the first
    /// working day and start it fresh. No-op on a working day.
    pub fn skip_non_working_days_in_place(&mut self) {
        if self.calendar.is_available(self.current_date) {
            return;
        }
        self.current_date = self.calendar.first_available_from(self.current_date);
        self.reset_day();
    }

    /// Hand out `hours` from the current day and return the `(start, end)`
    /// span in hours after midnight.
    ///
    /// The span is rounded to whole minutes and the next placement starts at
    /// the rounded end, so equal durations always yield equal slots. Capacity
    /// accounting keeps the exact hours.
    pub fn consume(&mut self, hours: f64) -> (f64, f64) {
        let start = self.pointer_minutes;
        let end = start + (hours * 60.0).round() as i64;
        self.pointer_minutes = end;
        self.hours_used_today += hours;
        (start as f64 / 60.0, end as f64 / 60.0)
    }

    fn reset_day(&mut self) {
        self.hours_used_today = 0.0;
        self.pointer_minutes = self.day_start_minutes;
    }
}
