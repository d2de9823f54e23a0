use askama::Result;
use rust_decimal::{Decimal, RoundingStrategy};

// Askama filters used by the templates, e.g. `{{ card.days_open|days }}`.

/// Days with one decimal and a comma, `-` when unknown.
#[allow(clippy::unnecessary_wraps)]
pub fn days(value: &Option<f64>) -> Result<String> {
    Ok(match value {
        Some(d) if d.is_finite() => format!("{:.1}", d).replace('.', ","),
        _ => "-".to_string(),
    })
}

/// Brazilian currency, e.g. `R$ 1.741,50`.
#[allow(clippy::unnecessary_wraps)]
pub fn brl(value: &Decimal) -> Result<String> {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    Ok(format!("{}R$ {},{}", sign, grouped, cents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn days_use_a_decimal_comma() {
        assert_eq!(days(&Some(3.24)).unwrap(), "3,2");
        assert_eq!(days(&Some(10.0)).unwrap(), "10,0");
        assert_eq!(days(&None).unwrap(), "-");
        assert_eq!(days(&Some(f64::NAN)).unwrap(), "-");
    }

    #[test]
    fn money_is_grouped_by_thousands() {
        assert_eq!(brl(&Decimal::from_str("1741.5").unwrap()).unwrap(), "R$ 1.741,50");
        assert_eq!(brl(&Decimal::from_str("999").unwrap()).unwrap(), "R$ 999,00");
        assert_eq!(brl(&Decimal::from_str("1234567.891").unwrap()).unwrap(), "R$ 1.234.567,89");
        assert_eq!(brl(&Decimal::from_str("-20").unwrap()).unwrap(), "-R$ 20,00");
        assert_eq!(brl(&Decimal::ZERO).unwrap(), "R$ 0,00");
    }
}
