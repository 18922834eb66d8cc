use chrono::NaiveDate;
use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::{DateMatcher, InferredDate};

/// Two-digit years above this are 19xx, the rest 20xx
const TWO_DIGIT_YEAR_PIVOT: u16 = 30;

/// Season (and holiday) words mapped to a representative month
const SEASONS: &[(&str, u8)] = &[
    ("printemps", 3),
    ("été", 6),
    ("ete", 6),
    ("automne", 9),
    ("hiver", 12),
    ("noël", 12),
    ("noel", 12),
];

static FULL_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<day>[0-9]{2})[./-](?P<month>[0-9]{2})[./-](?P<year>[0-9]{2}|[0-9]{4})\b").unwrap()
});
static MONTH_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?P<month>[0-9]{2})[./-](?P<year>[0-9]{4})\b").unwrap());
/// One pattern per season word, in `SEASONS` order
static SEASON_RES: LazyLock<Vec<(Regex, u8)>> = LazyLock::new(|| {
    SEASONS
        .iter()
        .map(|(word, month)| {
            let re = Regex::new(&format!(r"\b{}\s+(?P<year>[0-9]{{4}})\b", regex::escape(word))).unwrap();
            (re, *month)
        })
        .collect()
});
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(?P<year>(19|20)[0-9]{2})\b").unwrap());

/// `DD.MM.YYYY` / `DD.MM.YY` with `.`, `/` or `-` separators
#[derive(Debug, Clone, Copy, Default)]
pub struct FullDateMatcher;

/// `MM.YYYY` with `.`, `/` or `-` separators
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthYearMatcher;

/// French season names (and Christmas) followed by a four-digit year.
/// Words are tried in vocabulary order, not text order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeasonMatcher;

/// A bare 19xx or 20xx year
#[derive(Debug, Clone, Copy, Default)]
pub struct YearMatcher;

impl DateMatcher for FullDateMatcher {
    fn try_match(&self, text: &str) -> Option<InferredDate> {
        FULL_DATE_RE.captures_iter(text).find_map(|caps| {
            let day: u8 = caps["day"].parse().ok()?;
            let month: u8 = caps["month"].parse().ok()?;
            let year = expand_year(&caps["year"])?;
            NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))?;
            Some(InferredDate::DayMonthYear { year, month, day })
        })
    }
}

impl DateMatcher for MonthYearMatcher {
    fn try_match(&self, text: &str) -> Option<InferredDate> {
        MONTH_YEAR_RE.captures_iter(text).find_map(|caps| {
            let month: u8 = caps["month"].parse().ok()?;
            let year = parse_year(&caps)?;
            (1..=12)
                .contains(&month)
                .then_some(InferredDate::MonthYear { year, month })
        })
    }
}

impl DateMatcher for SeasonMatcher {
    fn try_match(&self, text: &str) -> Option<InferredDate> {
        SEASON_RES.iter().find_map(|(re, month)| {
            let caps = re.captures(text)?;
            let year = parse_year(&caps)?;
            Some(InferredDate::MonthYear { year, month: *month })
        })
    }
}

impl DateMatcher for YearMatcher {
    fn try_match(&self, text: &str) -> Option<InferredDate> {
        let caps = YEAR_RE.captures(text)?;
        parse_year(&caps).map(InferredDate::Year)
    }
}

fn parse_year(caps: &Captures) -> Option<u16> {
    caps.name("year")?.as_str().parse().ok()
}

/// Resolve a two- or four-digit year
fn expand_year(year: &str) -> Option<u16> {
    let value: u16 = year.parse().ok()?;
    if year.len() != 2 {
        return Some(value);
    }
    Some(if value > TWO_DIGIT_YEAR_PIVOT {
        1900 + value
    } else {
        2000 + value
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_year() {
        assert_eq!(expand_year("99"), Some(1999));
        assert_eq!(expand_year("31"), Some(1931));
        assert_eq!(expand_year("30"), Some(2030));
        assert_eq!(expand_year("00"), Some(2000));
        assert_eq!(expand_year("2024"), Some(2024));
    }

    #[test]
    fn test_full_date_skips_impossible_dates() {
        assert_eq!(
            FullDateMatcher.try_match("31.02.2020 puis 29.02.2020"),
            Some(InferredDate::DayMonthYear { year: 2020, month: 2, day: 29 })
        );
        assert_eq!(FullDateMatcher.try_match("45.13.2020"), None);
    }

    #[test]
    fn test_month_year_rejects_bad_month() {
        assert_eq!(MonthYearMatcher.try_match("13/2020"), None);
        assert_eq!(
            MonthYearMatcher.try_match("13/2020 ou 12/2020"),
            Some(InferredDate::MonthYear { year: 2020, month: 12 })
        );
    }

    #[test]
    fn test_season_requires_word_start() {
        assert_eq!(SeasonMatcher.try_match("complete 2020"), None);
        assert_eq!(
            SeasonMatcher.try_match("fin de l'été 1995"),
            Some(InferredDate::MonthYear { year: 1995, month: 6 })
        );
    }

    #[test]
    fn test_season_vocabulary_order_wins_over_text_order() {
        assert_eq!(
            SeasonMatcher.try_match("hiver 2020 puis printemps 2021"),
            Some(InferredDate::MonthYear { year: 2021, month: 3 })
        );
        assert_eq!(
            SeasonMatcher.try_match("noël 2019 et automne 2019"),
            Some(InferredDate::MonthYear { year: 2019, month: 9 })
        );
    }

    #[test]
    fn test_year() {
        assert_eq!(YearMatcher.try_match("photo 1984"), Some(InferredDate::Year(1984)));
        assert_eq!(YearMatcher.try_match("photo 2100"), None);
    }
}
