use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The three teaching periods of an academic year
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Semester {
    I,
    II,
    III,
}

impl Semester {
    /// Month (1-based) in which the semester starts
    pub fn start_month(self) -> u32 {
        match self {
            Self::I => 9,
            Self::II => 2,
            Self::III => 7,
        }
    }

    /// Semesters II and III fall in the calendar year after the academic year
    pub fn year_offset(self) -> i32 {
        match self {
            Self::I => 0,
            Self::II | Self::III => 1,
        }
    }

    /// First day of the semester for the given academic year
    pub fn start_date(self, academic_year: i32) -> NaiveDate {
        let year = academic_year + self.year_offset();
        // start_month is always in 1..=12
        NaiveDate::from_ymd_opt(year, self.start_month(), 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last moment an enrollment in this semester may still be canceled:
    /// midnight on the first day of the month after the semester starts.
    pub fn cancellation_deadline(self, academic_year: i32) -> NaiveDateTime {
        let year = academic_year + self.year_offset();
        let (deadline_year, deadline_month) = if self.start_month() == 12 {
            (year + 1, 1)
        } else {
            (year, self.start_month() + 1)
        };

        NaiveDate::from_ymd_opt(deadline_year, deadline_month, 1)
            .unwrap_or(NaiveDate::MIN)
            .and_time(NaiveTime::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_parse() {
        assert_eq!(Semester::from_str("I").unwrap(), Semester::I);
        assert_eq!(Semester::from_str("II").unwrap(), Semester::II);
        assert_eq!(Semester::from_str("III").unwrap(), Semester::III);

        assert!(Semester::from_str("IV").is_err());
        assert!(Semester::from_str("").is_err());
        assert!(Semester::from_str("1").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Semester::I.to_string(), "I");
        assert_eq!(Semester::II.to_string(), "II");
        assert_eq!(Semester::III.to_string(), "III");
    }

    #[test]
    fn test_start_dates() {
        // Semester I starts in September of the academic year itself
        assert_eq!(Semester::I.start_date(2024), date(2024, 9, 1));

        // Semesters II and III start in the following calendar year
        assert_eq!(Semester::II.start_date(2024), date(2025, 2, 1));
        assert_eq!(Semester::III.start_date(2024), date(2025, 7, 1));
    }

    #[test]
    fn test_cancellation_deadlines() {
        assert_eq!(
            Semester::I.cancellation_deadline(2024),
            date(2024, 10, 1).and_time(NaiveTime::MIN)
        );
        assert_eq!(
            Semester::II.cancellation_deadline(2024),
            date(2025, 3, 1).and_time(NaiveTime::MIN)
        );
        assert_eq!(
            Semester::III.cancellation_deadline(2024),
            date(2025, 8, 1).and_time(NaiveTime::MIN)
        );
    }

    #[test]
    fn test_deadline_follows_start() {
        for semester in [Semester::I, Semester::II, Semester::III] {
            let start = semester.start_date(2025).and_time(NaiveTime::MIN);
            assert!(semester.cancellation_deadline(2025) > start);
        }
    }
}
