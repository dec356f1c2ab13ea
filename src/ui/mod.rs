pub mod charts;
pub mod dashboard;
pub mod panels;
pub mod tables;

/// `$1,234.50` style amounts, as shown on chart labels and tables.
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}

#[cfg(test)]
mod tests {
    use super::format_currency;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_currency(999.0), "$999.00");
        assert_eq!(format_currency(1000.0), "$1,000.00");
        assert_eq!(format_currency(-52.5), "-$52.50");
        assert_eq!(format_currency(-0.001), "$0.00");
    }
}
