use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::settings::{keys, SettingsStore};

/// Which half of the academic session is running. Odd halves host odd
/// semesters (1, 3, 5, ...), even halves the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcademicHalf {
    Odd,
    Even,
}

impl AcademicHalf {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "odd" => Some(AcademicHalf::Odd),
            "even" => Some(AcademicHalf::Even),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AcademicHalf::Odd => "odd",
            AcademicHalf::Even => "even",
        }
    }
}

/// The reference period every academic derivation is computed against.
/// Derivations never store their results; they are recomputed from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicCalendar {
    pub year: i32,
    pub half: AcademicHalf,
}

impl AcademicCalendar {
    pub fn new(year: i32, half: AcademicHalf) -> Self {
        Self { year, half }
    }

    /// Build the current calendar from the runtime settings row and today's
    /// date. An unparseable stored value falls back to the odd half.
    pub fn current(settings: &dyn SettingsStore, today: NaiveDate) -> Self {
        use chrono::Datelike;
        let stored = settings.get_or_create(keys::CURRENT_ACADEMIC_HALF, "odd");
        let half = AcademicHalf::parse(&stored).unwrap_or(AcademicHalf::Odd);
        Self {
            year: today.year(),
            half,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettings;

    #[test]
    fn reads_half_from_settings() {
        let settings = MemorySettings::new();
        settings.set(keys::CURRENT_ACADEMIC_HALF, "even");
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let calendar = AcademicCalendar::current(&settings, today);
        assert_eq!(calendar.year, 2024);
        assert_eq!(calendar.half, AcademicHalf::Even);
    }

    #[test]
    fn garbage_setting_falls_back_to_odd() {
        let settings = MemorySettings::new();
        settings.set(keys::CURRENT_ACADEMIC_HALF, "monsoon");
        let today = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let calendar = AcademicCalendar::current(&settings, today);
        assert_eq!(calendar.half, AcademicHalf::Odd);
    }
}
