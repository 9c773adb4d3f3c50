// Display helpers: USD amounts and short dates

use chrono::NaiveDate;

/// `$1,234.56`, negatives as `-$3.50`
pub fn currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, fraction)
}

/// `Feb 29`
pub fn date_short(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency() {
        assert_eq!(currency(0.0), "$0.00");
        assert_eq!(currency(9.99), "$9.99");
        assert_eq!(currency(144.0 / 52.0), "$2.77");
        assert_eq!(currency(1234.5), "$1,234.50");
        assert_eq!(currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(currency(-3.5), "-$3.50");
    }

    #[test]
    fn test_date_short() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
        assert_eq!(date_short(date), "Feb 9");
    }
}
