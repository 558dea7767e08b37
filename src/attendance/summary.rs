use serde::Serialize;

use super::model::{AttendanceRecord, AttendanceStatus};

/// Decimal places kept in `attendance_percentage`.
pub const PERCENTAGE_DECIMALS: i32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub full_day: u32,
    pub half_day: u32,
    pub absent: u32,
    pub holiday: u32,
}

impl StatusCounts {
    pub fn get(&self, status: AttendanceStatus) -> u32 {
        match status {
            AttendanceStatus::FullDay => self.full_day,
            AttendanceStatus::HalfDay => self.half_day,
            AttendanceStatus::Absent => self.absent,
            AttendanceStatus::Holiday => self.holiday,
        }
    }

    fn bump(&mut self, status: AttendanceStatus) {
        let slot = match status {
            AttendanceStatus::FullDay => &mut self.full_day,
            AttendanceStatus::HalfDay => &mut self.half_day,
            AttendanceStatus::Absent => &mut self.absent,
            AttendanceStatus::Holiday => &mut self.holiday,
        };
        *slot += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub counts: StatusCounts,
    /// Full + half + absent; holidays are not owed attendance.
    pub working_days: u32,
    pub present_equivalent: f64,
    pub attendance_percentage: f64,
    pub marked_days: u32,
}

pub fn summarize<'a, I>(records: I) -> AttendanceSummary
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    summarize_statuses(records.into_iter().map(|r| r.status))
}

pub fn summarize_statuses<I>(statuses: I) -> AttendanceSummary
where
    I: IntoIterator<Item = AttendanceStatus>,
{
    let mut counts = StatusCounts::default();
    let mut marked_days = 0;
    for status in statuses {
        counts.bump(status);
        marked_days += 1;
    }

    let working_days = counts.full_day + counts.half_day + counts.absent;
    let present_equivalent = f64::from(counts.full_day) + 0.5 * f64::from(counts.half_day);
    let attendance_percentage = if working_days == 0 {
        0.0
    } else {
        round_to(100.0 * present_equivalent / f64::from(working_days), PERCENTAGE_DECIMALS)
    };

    AttendanceSummary {
        counts,
        working_days,
        present_equivalent,
        attendance_percentage,
        marked_days,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use AttendanceStatus::*;

    #[test]
    fn empty_input_is_all_zero() {
        let s = summarize_statuses([]);
        assert_eq!(s.working_days, 0);
        assert_eq!(s.attendance_percentage, 0.0);
        assert_eq!(s.marked_days, 0);
        assert_eq!(s.counts, StatusCounts::default());
    }

    #[test]
    fn mixed_week() {
        let s = summarize_statuses([FullDay, FullDay, HalfDay, Absent]);
        assert_eq!(s.working_days, 4);
        assert_eq!(s.present_equivalent, 2.5);
        assert_eq!(s.attendance_percentage, 62.5);
        assert_eq!(s.marked_days, 4);
        assert_eq!(s.counts.get(FullDay), 2);
        assert_eq!(s.counts.get(Holiday), 0);
    }

    #[test]
    fn holidays_do_not_count_as_working_days() {
        let s = summarize_statuses([Holiday, Holiday]);
        assert_eq!(s.working_days, 0);
        assert_eq!(s.attendance_percentage, 0.0);
        assert_eq!(s.marked_days, 2);
        assert_eq!(s.counts.holiday, 2);
    }

    #[test]
    fn holiday_does_not_dilute_percentage() {
        let with = summarize_statuses([FullDay, Absent, Holiday]);
        let without = summarize_statuses([FullDay, Absent]);
        assert_eq!(with.attendance_percentage, without.attendance_percentage);
        assert_eq!(with.marked_days, 3);
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        let s = summarize_statuses([FullDay, Absent, Absent]);
        assert_eq!(s.attendance_percentage, 33.33);
        let s = summarize_statuses([FullDay, FullDay, Absent]);
        assert_eq!(s.attendance_percentage, 66.67);
    }

    #[test]
    fn only_half_days() {
        let s = summarize_statuses([HalfDay, HalfDay, HalfDay]);
        assert_eq!(s.present_equivalent, 1.5);
        assert_eq!(s.attendance_percentage, 50.0);
    }
}
