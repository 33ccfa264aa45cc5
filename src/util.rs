/// Formats a percentage rounded to one decimal, dropping a trailing ".0".
pub fn format_percent(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

pub fn format_lambda(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text.is_empty() { "0".to_owned() } else { text.to_owned() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_drops_trailing_zero() {
        assert_eq!(format_percent(30.0), "30");
        assert_eq!(format_percent(12.345), "12.3");
        assert_eq!(format_percent(0.04), "0");
    }

    #[test]
    fn lambda_uses_at_most_two_decimals() {
        assert_eq!(format_lambda(1.0), "1");
        assert_eq!(format_lambda(0.6), "0.6");
        assert_eq!(format_lambda(0.25), "0.25");
        assert_eq!(format_lambda(0.0), "0");
    }
}
