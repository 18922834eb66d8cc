pub mod matchers;

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use unicode_normalization::UnicodeNormalization;

use matchers::{FullDateMatcher, MonthYearMatcher, SeasonMatcher, YearMatcher};

/// A calendar date guessed from a description, as precise as the text allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferredDate {
    DayMonthYear { year: u16, month: u8, day: u8 },
    MonthYear { year: u16, month: u8 },
    Year(u16),
}

impl InferredDate {
    pub fn year(&self) -> u16 {
        match *self {
            Self::DayMonthYear { year, .. } | Self::MonthYear { year, .. } | Self::Year(year) => year,
        }
    }

    pub fn month(&self) -> Option<u8> {
        match *self {
            Self::DayMonthYear { month, .. } | Self::MonthYear { month, .. } => Some(month),
            Self::Year(_) => None,
        }
    }

    pub fn day(&self) -> Option<u8> {
        match *self {
            Self::DayMonthYear { day, .. } => Some(day),
            _ => None,
        }
    }

    /// Midnight of the first day this date covers
    pub fn earliest(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year()),
            u32::from(self.month().unwrap_or(1)),
            u32::from(self.day().unwrap_or(1)),
        )?
        .and_hms_opt(0, 0, 0)
    }
}

/// Compact form: only the known components ("2023-12-25", "2022-06", "2021")
impl fmt::Display for InferredDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::DayMonthYear { year, month, day } => write!(f, "{:04}-{:02}-{:02}", year, month, day),
            Self::MonthYear { year, month } => write!(f, "{:04}-{:02}", year, month),
            Self::Year(year) => write!(f, "{:04}", year),
        }
    }
}

/// How a date token is rendered into a filename
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateStyle {
    /// Known components only; no token at all when nothing was found
    #[default]
    Compact,
    /// Always "YYYY-MM-DD" with unknown components as X ("2022-06-XX", "XXXX-XX-XX")
    Placeholder,
}

impl DateStyle {
    pub fn render(&self, date: Option<&InferredDate>) -> Option<String> {
        match self {
            Self::Compact => date.map(ToString::to_string),
            Self::Placeholder => {
                let year = date.map_or_else(|| "XXXX".to_string(), |d| format!("{:04}", d.year()));
                let month = date
                    .and_then(InferredDate::month)
                    .map_or_else(|| "XX".to_string(), |m| format!("{:02}", m));
                let day = date
                    .and_then(InferredDate::day)
                    .map_or_else(|| "XX".to_string(), |d| format!("{:02}", d));
                Some(format!("{}-{}-{}", year, month, day))
            }
        }
    }
}

/// One way of spotting a date in lowercased, NFC-normalized text
pub trait DateMatcher: Send + Sync {
    fn try_match(&self, text: &str) -> Option<InferredDate>;
}

/// Tries its matchers in priority order; the first one that matches decides.
pub struct DateInferencer {
    matchers: Vec<Box<dyn DateMatcher>>,
}

impl Default for DateInferencer {
    fn default() -> Self {
        Self::new(vec![
            Box::new(FullDateMatcher),
            Box::new(MonthYearMatcher),
            Box::new(SeasonMatcher),
            Box::new(YearMatcher),
        ])
    }
}

impl DateInferencer {
    pub fn new(matchers: Vec<Box<dyn DateMatcher>>) -> Self {
        Self { matchers }
    }

    pub fn infer(&self, description: &str) -> Option<InferredDate> {
        let text: String = description.nfc().collect::<String>().to_lowercase();
        self.matchers.iter().find_map(|m| m.try_match(&text))
    }
}

impl fmt::Debug for DateInferencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateInferencer")
            .field("matchers", &self.matchers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(description: &str) -> Option<String> {
        DateStyle::Compact.render(DateInferencer::default().infer(description).as_ref())
    }

    #[test]
    fn test_full_date() {
        assert_eq!(token("photo 25.12.23").as_deref(), Some("2023-12-25"));
        assert_eq!(token("Mariage 07/08/1999").as_deref(), Some("1999-08-07"));
        assert_eq!(token("rentrée 01-09-2020").as_deref(), Some("2020-09-01"));
    }

    #[test]
    fn test_two_digit_year_boundary() {
        assert_eq!(token("le 01-01-99").as_deref(), Some("1999-01-01"));
        assert_eq!(token("le 01-01-05").as_deref(), Some("2005-01-01"));
        assert_eq!(token("le 01-01-30").as_deref(), Some("2030-01-01"));
        assert_eq!(token("le 01-01-31").as_deref(), Some("1931-01-01"));
    }

    #[test]
    fn test_month_year() {
        assert_eq!(token("vacances 08/2019").as_deref(), Some("2019-08"));
        assert_eq!(token("vacances 8/2019").as_deref(), Some("2019"));
    }

    #[test]
    fn test_seasons() {
        assert_eq!(token("été 2022").as_deref(), Some("2022-06"));
        assert_eq!(token("Ete 2022 au lac").as_deref(), Some("2022-06"));
        assert_eq!(token("PRINTEMPS 1987").as_deref(), Some("1987-03"));
        assert_eq!(token("automne  2001").as_deref(), Some("2001-09"));
        assert_eq!(token("hiver 2010").as_deref(), Some("2010-12"));
        assert_eq!(token("Noël 2021").as_deref(), Some("2021-12"));
    }

    #[test]
    fn test_decomposed_accents() {
        assert_eq!(token("e\u{301}te\u{301} 2022").as_deref(), Some("2022-06"));
    }

    #[test]
    fn test_year_only() {
        assert_eq!(token("Anniversaire de Paul 2015").as_deref(), Some("2015"));
        assert_eq!(token("code 1850").as_deref(), None);
        assert_eq!(token("réf 12019").as_deref(), None);
    }

    #[test]
    fn test_priority_order() {
        // A full date wins over a bare year appearing earlier in the text
        assert_eq!(token("2019 revu le 03.04.2021").as_deref(), Some("2021-04-03"));
        // Month-year wins over a season
        assert_eq!(token("été 2022 (07/2022)").as_deref(), Some("2022-07"));
        // Season wins over a bare year
        assert_eq!(token("2020 hiver 2021").as_deref(), Some("2021-12"));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(token("chat sur le canapé"), None);
        assert_eq!(DateStyle::Placeholder.render(None).as_deref(), Some("XXXX-XX-XX"));
    }

    #[test]
    fn test_placeholder_style() {
        let style = DateStyle::Placeholder;
        assert_eq!(
            style.render(Some(&InferredDate::DayMonthYear { year: 2023, month: 12, day: 25 })).as_deref(),
            Some("2023-12-25")
        );
        assert_eq!(
            style.render(Some(&InferredDate::MonthYear { year: 2022, month: 6 })).as_deref(),
            Some("2022-06-XX")
        );
        assert_eq!(style.render(Some(&InferredDate::Year(2021))).as_deref(), Some("2021-XX-XX"));
    }

    #[test]
    fn test_earliest() {
        let dt = InferredDate::MonthYear { year: 2021, month: 12 }.earliest().unwrap();
        assert_eq!(dt.to_string(), "2021-12-01 00:00:00");
        let dt = InferredDate::Year(1999).earliest().unwrap();
        assert_eq!(dt.to_string(), "1999-01-01 00:00:00");
    }
}
