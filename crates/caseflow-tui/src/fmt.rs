//! Cell formatting shared by the registry screens.

use chrono::{DateTime, NaiveDate, Utc};

/// Placeholder for absent values. One char keeps columns narrow.
pub const EMPTY: &str = "-";

pub fn opt_str(value: Option<&str>) -> String {
    value.map_or_else(|| EMPTY.to_owned(), str::to_owned)
}

pub fn opt_display<T: std::fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| EMPTY.to_owned(), T::to_string)
}

pub fn date(value: Option<&NaiveDate>) -> String {
    value.map_or_else(|| EMPTY.to_owned(), |d| d.format("%Y-%m-%d").to_string())
}

pub fn datetime(value: Option<&DateTime<Utc>>) -> String {
    value.map_or_else(|| EMPTY.to_owned(), |ts| ts.format("%Y-%m-%d %H:%M").to_string())
}

/// Coarse relative age ("2h ago"), for freshness columns.
pub fn ago(value: Option<&DateTime<Utc>>) -> String {
    let Some(ts) = value else {
        return EMPTY.to_owned();
    };
    let seconds = u64::try_from((Utc::now() - *ts).num_seconds()).unwrap_or(0);
    let pretty = humantime::format_duration(std::time::Duration::from_secs(seconds)).to_string();
    // format_duration spells out every unit; the leading one is enough.
    let coarse = pretty.split_whitespace().next().unwrap_or("0s");
    format!("{coarse} ago")
}

pub fn money(amount: Option<f64>, currency: Option<&str>) -> String {
    match amount {
        Some(amount) => match currency {
            Some(currency) => format!("{amount:.2} {currency}"),
            None => format!("{amount:.2}"),
        },
        None => EMPTY.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_render_as_placeholder() {
        assert_eq!(opt_str(None), "-");
        assert_eq!(date(None), "-");
        assert_eq!(money(None, Some("USD")), "-");
    }

    #[test]
    fn money_keeps_two_decimals() {
        assert_eq!(money(Some(1200.5), Some("KES")), "1200.50 KES");
        assert_eq!(money(Some(7.0), None), "7.00");
    }
}
