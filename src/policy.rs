use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::calendar::WorkCalendar;
use crate::error::PolicyError;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Wall-clock time within a single day, minute precision, written as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Last representable minute of the day (23:59).
    pub fn last_minute() -> Self {
        Self(NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN))
    }

    /// Converts fractional hours after midnight into a time, rounded to the
    /// nearest minute. Returns `None` when the result falls outside the day.
    pub fn from_hours(hours: f64) -> Option<Self> {
        if !hours.is_finite() || hours < 0.0 {
            return None;
        }
        let minutes = (hours * 60.0).round() as i64;
        if minutes >= MINUTES_PER_DAY {
            return None;
        }
        Self::new((minutes / 60) as u32, (minutes % 60) as u32)
    }

    pub fn as_hours(&self) -> f64 {
        self.0.hour() as f64 + self.0.minute() as f64 / 60.0
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        self.0.hour() * 60 + self.0.minute()
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl FromStr for TimeOfDay {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (hour, minute) = trimmed
            .split_once(':')
            .ok_or_else(|| PolicyError::TimeOfDay(s.to_string()))?;
        let well_formed = |part: &str| {
            !part.is_empty() && part.len() <= 2 && part.chars().all(|c| c.is_ascii_digit())
        };
        if !well_formed(hour) || minute.len() != 2 || !well_formed(minute) {
            return Err(PolicyError::TimeOfDay(s.to_string()));
        }
        let hour: u32 = hour
            .parse()
            .map_err(|_| PolicyError::TimeOfDay(s.to_string()))?;
        let minute: u32 = minute
            .parse()
            .map_err(|_| PolicyError::TimeOfDay(s.to_string()))?;
        Self::new(hour, minute).ok_or_else(|| PolicyError::TimeOfDay(s.to_string()))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Per-user working-hours policy. Read from the preference store and never
/// mutated by a scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingPolicy {
    #[serde(alias = "workHoursPerDay")]
    pub work_hours_per_day: f64,
    /// Below 7, Saturday and Sunday are non-working.
    #[serde(alias = "workDaysPerWeek")]
    pub work_days_per_week: u8,
    #[serde(alias = "workStartTime")]
    pub work_start_time: TimeOfDay,
    /// Informational only. Capacity is gated by `work_hours_per_day` alone.
    #[serde(alias = "workEndTime")]
    pub work_end_time: TimeOfDay,
    #[serde(alias = "bufferFraction", alias = "bufferPercentage")]
    pub buffer_fraction: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub holidays: Vec<NaiveDate>,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            work_hours_per_day: 8.0,
            work_days_per_week: 5,
            work_start_time: TimeOfDay(NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)),
            work_end_time: TimeOfDay(NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN)),
            buffer_fraction: 0.2,
            holidays: Vec::new(),
        }
    }
}

impl SchedulingPolicy {
    pub fn new(
        work_hours_per_day: f64,
        work_days_per_week: u8,
        work_start_time: &str,
        work_end_time: &str,
        buffer_fraction: f64,
    ) -> Result<Self, PolicyError> {
        let policy = Self {
            work_hours_per_day,
            work_days_per_week,
            work_start_time: work_start_time.parse()?,
            work_end_time: work_end_time.parse()?,
            buffer_fraction,
            holidays: Vec::new(),
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn with_holidays<I>(mut self, holidays: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        self.holidays.extend(holidays);
        self.holidays.sort();
        self.holidays.dedup();
        self
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        let hours = self.work_hours_per_day;
        if !hours.is_finite() || hours <= 0.0 || hours > 24.0 {
            return Err(PolicyError::WorkHoursPerDay(hours));
        }
        if !(5..=7).contains(&self.work_days_per_week) {
            return Err(PolicyError::WorkDaysPerWeek(self.work_days_per_week));
        }
        let buffer = self.buffer_fraction;
        if !buffer.is_finite() || !(0.0..1.0).contains(&buffer) {
            return Err(PolicyError::BufferFraction(buffer));
        }
        Ok(())
    }

    /// Estimated hours inflated by the buffer fraction.
    pub fn buffered_hours(&self, estimated_hours: f64) -> f64 {
        estimated_hours * (1.0 + self.buffer_fraction)
    }

    pub fn work_calendar(&self) -> WorkCalendar {
        WorkCalendar::for_policy(self.work_days_per_week, self.holidays.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_of_day_parses_and_formats() {
        let t: TimeOfDay = "09:05".parse().unwrap();
        assert_eq!(t.to_string(), "09:05");
        assert_eq!(t.minutes_since_midnight(), 545);
        let t: TimeOfDay = "7:30".parse().unwrap();
        assert_eq!(t.to_string(), "07:30");
    }

    #[test]
    fn time_of_day_rejects_malformed_input() {
        for raw in ["", "9", "24:00", "12:60", "12:5", "ab:cd", "12:00:00", "-1:00"] {
            assert_eq!(
                raw.parse::<TimeOfDay>(),
                Err(PolicyError::TimeOfDay(raw.to_string())),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn from_hours_rounds_to_the_minute() {
        assert_eq!(TimeOfDay::from_hours(13.8).unwrap().to_string(), "13:48");
        assert_eq!(TimeOfDay::from_hours(9.0 + 7.2).unwrap().to_string(), "16:12");
        assert_eq!(TimeOfDay::from_hours(23.995), None);
        assert_eq!(TimeOfDay::from_hours(24.0), None);
        assert_eq!(TimeOfDay::from_hours(-0.5), None);
    }
}
