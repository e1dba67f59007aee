//! Workday time conversion and display.
//!
//! All engine arithmetic happens in minutes. Raw estimates entered in hours or
//! days convert through a fixed 8-hour workday, so one day is 480 minutes and
//! a minute total formats back as days, hours and minutes on the same scale.

use rust_decimal::Decimal;

use crate::fields::TimeUnit;

/// Minutes in one working hour.
pub const MINUTES_PER_HOUR: i64 = 60;

/// Minutes in one 8-hour working day.
pub const MINUTES_PER_DAY: i64 = 480;

/// Convert a raw estimate to minutes. Negative input converts to zero.
pub fn to_minutes(value: Decimal, unit: TimeUnit) -> Decimal {
    if value < Decimal::ZERO {
        return Decimal::ZERO;
    }
    match unit {
        TimeUnit::Minutes => value,
        TimeUnit::Hours => value * Decimal::from(MINUTES_PER_HOUR),
        TimeUnit::Days => value * Decimal::from(MINUTES_PER_DAY),
    }
}

/// Format a minute total as workdays, hours and minutes ("3 days 1 hour").
///
/// Zero and negative totals render as "0 minutes". Components that decompose
/// to zero are left out, and leftover fractional minutes keep two decimals.
pub fn format_minutes(total: Decimal) -> String {
    if total <= Decimal::ZERO {
        return "0 minutes".to_string();
    }
    let per_day = Decimal::from(MINUTES_PER_DAY);
    let per_hour = Decimal::from(MINUTES_PER_HOUR);
    let days = (total / per_day).floor();
    let after_days = total - days * per_day;
    let hours = (after_days / per_hour).floor();
    let minutes = (after_days - hours * per_hour).round_dp(2).normalize();

    let mut parts: Vec<String> = Vec::new();
    if days > Decimal::ZERO {
        parts.push(format!("{} day{}", days.normalize(), plural(days)));
    }
    if hours > Decimal::ZERO {
        parts.push(format!("{} hour{}", hours.normalize(), plural(hours)));
    }
    if minutes > Decimal::ZERO || parts.is_empty() {
        parts.push(format!("{} minute{}", minutes, plural(minutes)));
    }
    parts.join(" ")
}

fn plural(n: Decimal) -> &'static str {
    if n > Decimal::ONE {
        "s"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_minutes_per_unit() {
        assert_eq!(to_minutes(dec!(30), TimeUnit::Minutes), dec!(30));
        assert_eq!(to_minutes(dec!(1), TimeUnit::Hours), dec!(60));
        assert_eq!(to_minutes(dec!(2.5), TimeUnit::Hours), dec!(150));
        assert_eq!(to_minutes(dec!(2), TimeUnit::Days), dec!(960));
    }

    #[test]
    fn test_to_minutes_negative_clamps_to_zero() {
        assert_eq!(to_minutes(dec!(-5), TimeUnit::Hours), Decimal::ZERO);
        assert_eq!(to_minutes(dec!(-0.01), TimeUnit::Days), Decimal::ZERO);
    }

    #[test]
    fn test_format_zero_and_negative() {
        assert_eq!(format_minutes(Decimal::ZERO), "0 minutes");
        assert_eq!(format_minutes(dec!(-90)), "0 minutes");
    }

    #[test]
    fn test_format_singular_components() {
        assert_eq!(format_minutes(dec!(1)), "1 minute");
        assert_eq!(format_minutes(dec!(60)), "1 hour");
        assert_eq!(format_minutes(dec!(480)), "1 day");
    }

    #[test]
    fn test_format_composite_totals() {
        assert_eq!(format_minutes(dec!(1500)), "3 days 1 hour");
        assert_eq!(format_minutes(dec!(380)), "6 hours 20 minutes");
        assert_eq!(format_minutes(dec!(525)), "1 day 45 minutes");
        assert_eq!(format_minutes(dec!(1082)), "2 days 2 hours 2 minutes");
    }

    #[test]
    fn test_format_fractional_minutes() {
        assert_eq!(format_minutes(dec!(90.5)), "1 hour 30.5 minutes");
        assert_eq!(format_minutes(dec!(0.5)), "0.5 minute");
    }
}
