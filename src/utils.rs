use crate::error::{Result, StatementError};
use chrono::{Datelike, Days, NaiveDate};

/// Currency units to fixed-point cents, rounding half away from zero.
pub fn f_in(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Fixed-point cents to currency units.
pub fn f_out(cents: i64) -> f64 {
    cents as f64 / 100.0
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.checked_sub_days(Days::new(1))
}

/// Resolves a fiscal year end such as `"December 31"` (or `"Dec 31"`) in a
/// given year. A day past the end of the month, e.g. `"February 29"` in a
/// non-leap year, clamps to the month's last day.
pub fn fiscal_year_end_date(fiscal_year_end: &str, year: i32) -> Result<NaiveDate> {
    let invalid = || {
        StatementError::InvalidAuditData(format!(
            "Invalid fiscal year end '{}': expected a month and day such as \"December 31\"",
            fiscal_year_end
        ))
    };

    let trimmed = fiscal_year_end.trim();
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{} {}", trimmed, year), "%B %d %Y") {
        return Ok(date);
    }

    // 2000 is a leap year, so every valid month/day pair parses against it.
    let reference =
        NaiveDate::parse_from_str(&format!("{} 2000", trimmed), "%B %d %Y").map_err(|_| invalid())?;
    let last = last_day_of_month(year, reference.month()).ok_or_else(invalid)?;
    Ok(last.with_day(reference.day()).unwrap_or(last))
}

/// Numeric year of a fiscal-year label such as `"2023"`.
pub fn parse_year_label(label: &str) -> Result<i32> {
    label.trim().parse::<i32>().map_err(|_| {
        StatementError::InvalidAuditData(format!(
            "Year label '{}' is not a four-digit year",
            label
        ))
    })
}

/// Heading date line: `"December 31, 2023 and 2022"`, or
/// `"December 31, 2023"` for a single year.
pub fn statement_date_line(fiscal_year_end: &str, year_labels: &[&str]) -> Result<String> {
    let mut dates = Vec::with_capacity(year_labels.len());
    for label in year_labels {
        dates.push(fiscal_year_end_date(fiscal_year_end, parse_year_label(label)?)?);
    }

    let Some(first) = dates.first() else {
        return Err(StatementError::InvalidAuditData(
            "No years to present".to_string(),
        ));
    };

    let years: Vec<String> = dates.iter().map(|d| d.year().to_string()).collect();
    Ok(format!(
        "{}, {}",
        first.format("%B %-d"),
        join_with_and(&years)
    ))
}

fn join_with_and(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Inserts thousands separators into the integer part of a non-negative amount.
pub fn group_thousands(digits: &str) -> String {
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(fraction) => format!("{}.{}", grouped, fraction),
        None => grouped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_point_conversion() {
        assert_eq!(f_in(1234.56), 123_456);
        assert_eq!(f_in(-0.005), -1);
        assert_eq!(f_in(0.1 + 0.2), 30);
        assert_eq!(f_out(123_456), 1234.56);
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(
            last_day_of_month(2023, 2),
            NaiveDate::from_ymd_opt(2023, 2, 28)
        );
        assert_eq!(
            last_day_of_month(2024, 2),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            last_day_of_month(2023, 12),
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
    }

    #[test]
    fn test_fiscal_year_end_date() {
        assert_eq!(
            fiscal_year_end_date("December 31", 2023).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
        assert_eq!(
            fiscal_year_end_date("Jun 30", 2022).unwrap(),
            NaiveDate::from_ymd_opt(2022, 6, 30).unwrap()
        );
        assert_eq!(
            fiscal_year_end_date("February 29", 2023).unwrap(),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
        assert!(fiscal_year_end_date("Smarch 3", 2023).is_err());
        assert!(fiscal_year_end_date("April 31", 2023).is_err());
    }

    #[test]
    fn test_statement_date_line() {
        assert_eq!(
            statement_date_line("December 31", &["2023", "2022"]).unwrap(),
            "December 31, 2023 and 2022"
        );
        assert_eq!(
            statement_date_line("June 30", &["2023"]).unwrap(),
            "June 30, 2023"
        );
        assert!(statement_date_line("December 31", &["FY23"]).is_err());
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("0"), "0");
        assert_eq!(group_thousands("999"), "999");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("1234567.89"), "1,234,567.89");
    }
}
