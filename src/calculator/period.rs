use chrono::{Datelike, Duration, NaiveDate};

/// Reporting window. Bounds are closed intervals on the date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    pub fn bounds(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Period::Day => (today, today),
            Period::Week => (today - Duration::days(7), today),
            Period::Month => (today.with_day(1).unwrap_or(today), today),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Period::Day => "сегодня",
            Period::Week => "неделю",
            Period::Month => "текущий месяц",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Period::Day => "📅",
            Period::Week => "📆",
            Period::Month => "📈",
        }
    }
}
