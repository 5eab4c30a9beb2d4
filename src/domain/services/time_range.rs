use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use crate::error::AppError;

pub const MINUTES_PER_DAY: i64 = 1440;

/// Half-open `[start, end)` range expressed in minutes since local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn from_times(start: NaiveTime, end: NaiveTime) -> Self {
        Self::new(minute_of_day(start), minute_of_day(end))
    }

    pub fn duration_minutes(&self) -> i64 {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Converts back to wall-clock times; `None` when the range leaves the day.
    pub fn to_times(&self) -> Option<(NaiveTime, NaiveTime)> {
        Some((time_from_minute(self.start)?, time_from_minute(self.end)?))
    }
}

pub fn minute_of_day(time: NaiveTime) -> i64 {
    (time.hour() * 60 + time.minute()) as i64
}

pub fn time_from_minute(minute: i64) -> Option<NaiveTime> {
    if !(0..MINUTES_PER_DAY).contains(&minute) {
        return None;
    }
    NaiveTime::from_hms_opt((minute / 60) as u32, (minute % 60) as u32, 0)
}

pub fn add_minutes(time: NaiveTime, minutes: i64) -> Option<NaiveTime> {
    time_from_minute(minute_of_day(time) + minutes)
}

pub fn validate_time_range(start: NaiveTime, end: NaiveTime) -> Result<(), AppError> {
    if start >= end {
        return Err(AppError::Validation("Start time must be before end time".into()));
    }
    Ok(())
}

/// Resolves a local wall-clock instant in the trainer's zone. DST gaps are rejected,
/// ambiguous times resolve to the earlier instant.
pub fn local_to_utc(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>, AppError> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(AppError::Validation("Invalid local time (skipped due to DST)".into()))
}

pub fn week_range(week_start: NaiveDate) -> (NaiveDate, NaiveDate) {
    (week_start, week_start + Duration::days(6))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_overlap_is_half_open() {
        let a = TimeRange::from_times(t(9, 0), t(10, 0));
        let b = TimeRange::from_times(t(10, 0), t(11, 0));
        let c = TimeRange::from_times(t(9, 30), t(10, 30));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
        assert!(a.overlaps(&a));
    }

    #[test]
    fn test_minute_conversions() {
        assert_eq!(minute_of_day(t(13, 45)), 825);
        assert_eq!(time_from_minute(825), Some(t(13, 45)));
        assert_eq!(time_from_minute(MINUTES_PER_DAY), None);
        assert_eq!(time_from_minute(-1), None);
        assert_eq!(add_minutes(t(23, 0), 60), None);
        assert_eq!(add_minutes(t(22, 0), 60), Some(t(23, 0)));
    }

    #[test]
    fn test_contains() {
        let block = TimeRange::from_times(t(9, 0), t(14, 0));
        assert!(block.contains(&TimeRange::from_times(t(9, 0), t(10, 0))));
        assert!(block.contains(&TimeRange::from_times(t(13, 0), t(14, 0))));
        assert!(!block.contains(&TimeRange::from_times(t(8, 0), t(9, 0))));
        assert!(!block.contains(&TimeRange::from_times(t(13, 30), t(14, 30))));
    }

    #[test]
    fn test_local_to_utc_respects_zone() {
        let tz: Tz = "Europe/Prague".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2030, 1, 15).unwrap();
        let utc = local_to_utc(&tz, date, t(10, 0)).unwrap();
        assert_eq!(utc.time(), t(9, 0));

        // 2030-03-31 02:30 does not exist in Prague
        let gap = NaiveDate::from_ymd_opt(2030, 3, 31).unwrap();
        assert!(local_to_utc(&tz, gap, t(2, 30)).is_err());
    }
}
