use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};
use time::{Date, Duration, Month, OffsetDateTime};

use super::model::{iso_date, AttendanceRecord, AttendanceStatus};
use crate::error::AppError;

/// A calendar month used to scope listings, summaries and the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthScope {
    pub year: i32,
    pub month: Month,
}

impl MonthScope {
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    pub fn current() -> Self {
        let today = OffsetDateTime::now_utc().date();
        Self::new(today.year(), today.month())
    }

    pub fn first_day(&self) -> Date {
        // Day 1 exists in every month; years come from a validated parse.
        Date::from_calendar_date(self.year, self.month, 1).unwrap_or(Date::MIN)
    }

    pub fn last_day(&self) -> Date {
        let days = time::util::days_in_year_month(self.year, self.month);
        Date::from_calendar_date(self.year, self.month, days).unwrap_or(Date::MAX)
    }

    pub fn contains(&self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl FromStr for MonthScope {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("current") {
            return Ok(Self::current());
        }
        let invalid = || AppError::InvalidMonth(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        let month = Month::try_from(month).map_err(|_| invalid())?;
        Ok(Self::new(year, month))
    }
}

impl fmt::Display for MonthScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, u8::from(self.month))
    }
}

impl Serialize for MonthScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub in_month: bool,
    pub status: Option<AttendanceStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarMonth {
    pub month: MonthScope,
    pub days: Vec<CalendarDay>,
}

/// Sunday-first grid of whole weeks covering `scope`.
pub fn month_grid(scope: MonthScope, records: &[AttendanceRecord]) -> CalendarMonth {
    let first = scope.first_day();
    let last = scope.last_day();
    let start = first - Duration::days(i64::from(first.weekday().number_days_from_sunday()));
    let end = last + Duration::days(i64::from(6 - last.weekday().number_days_from_sunday()));

    let mut days = Vec::new();
    let mut date = start;
    while date <= end {
        let status = records.iter().find(|r| r.date == date).map(|r| r.status);
        days.push(CalendarDay {
            date,
            in_month: scope.contains(date),
            status,
        });
        match date.next_day() {
            Some(next) => date = next,
            None => break,
        }
    }

    CalendarMonth { month: scope, days }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};
    use time::Weekday;
    use uuid::Uuid;

    fn rec(date: Date, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            user: Uuid::nil(),
            date,
            status,
            created_at: datetime!(2024-01-01 0:00 UTC),
            updated_at: datetime!(2024-01-01 0:00 UTC),
        }
    }

    #[test]
    fn parses_year_month() {
        let m: MonthScope = "2024-02".parse().unwrap();
        assert_eq!(m, MonthScope::new(2024, Month::February));
        assert_eq!(m.to_string(), "2024-02");
        assert_eq!(m.last_day(), date!(2024 - 02 - 29));
    }

    #[test]
    fn rejects_bad_months() {
        for bad in ["2024-13", "2024-1", "24-01", "2024/01", "", "2024-00"] {
            assert!(matches!(bad.parse::<MonthScope>(), Err(AppError::InvalidMonth(_))), "{bad}");
        }
    }

    #[test]
    fn contains_checks_year_and_month() {
        let m = MonthScope::new(2024, Month::May);
        assert!(m.contains(date!(2024 - 05 - 31)));
        assert!(!m.contains(date!(2023 - 05 - 01)));
        assert!(!m.contains(date!(2024 - 06 - 01)));
    }

    #[test]
    fn grid_covers_whole_weeks() {
        // June 2024 starts on a Saturday and ends on a Sunday.
        let grid = month_grid(MonthScope::new(2024, Month::June), &[]);
        assert_eq!(grid.days.len() % 7, 0);
        assert_eq!(grid.days.len(), 42);
        assert_eq!(grid.days[0].date, date!(2024 - 05 - 26));
        assert_eq!(grid.days[0].date.weekday(), Weekday::Sunday);
        let last = grid.days.last().unwrap();
        assert_eq!(last.date, date!(2024 - 07 - 06));
        assert_eq!(last.date.weekday(), Weekday::Saturday);
        assert_eq!(grid.days.iter().filter(|d| d.in_month).count(), 30);
    }

    #[test]
    fn grid_for_month_starting_on_sunday() {
        // September 2024 starts on a Sunday.
        let grid = month_grid(MonthScope::new(2024, Month::September), &[]);
        assert_eq!(grid.days[0].date, date!(2024 - 09 - 01));
        assert_eq!(grid.days.len(), 35);
    }

    #[test]
    fn grid_carries_statuses() {
        let records = vec![
            rec(date!(2024 - 06 - 03), AttendanceStatus::FullDay),
            rec(date!(2024 - 05 - 27), AttendanceStatus::Holiday),
        ];
        let grid = month_grid(MonthScope::new(2024, Month::June), &records);
        let day = |d: Date| grid.days.iter().find(|c| c.date == d).unwrap();
        assert_eq!(day(date!(2024 - 06 - 03)).status, Some(AttendanceStatus::FullDay));
        let spill = day(date!(2024 - 05 - 27));
        assert!(!spill.in_month);
        assert_eq!(spill.status, Some(AttendanceStatus::Holiday));
        assert_eq!(day(date!(2024 - 06 - 04)).status, None);
    }

    #[test]
    fn month_serializes_as_string() {
        let v = serde_json::to_value(MonthScope::new(2024, Month::March)).unwrap();
        assert_eq!(v, "2024-03");
    }
}
