//! Conversions between human readable token amounts (`"1.5"`) and their
//! integer on-chain representation given a token's `decimals`.

use {
    crate::conversions::{big_decimal_to_u256, u256_to_big_int},
    alloy::primitives::U256,
    bigdecimal::BigDecimal,
    num::BigInt,
    std::str::FromStr,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("amount is empty")]
    Empty,
    #[error("amount is negative")]
    Negative,
    #[error("{0:?} is not a decimal number")]
    Invalid(String),
    #[error("{amount:?} has more than {decimals} fractional digits")]
    TooPrecise { amount: String, decimals: u8 },
    #[error("{0:?} does not fit into 256 bits")]
    Overflow(String),
}

/// Parses a decimal string into an integer amount scaled by `10^decimals`.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, ParseError> {
    let value = parse_decimal(amount)?;
    let scaled = value * pow10(decimals);
    if !scaled.is_integer() {
        return Err(ParseError::TooPrecise {
            amount: amount.trim().to_owned(),
            decimals,
        });
    }
    big_decimal_to_u256(&scaled).ok_or_else(|| ParseError::Overflow(amount.trim().to_owned()))
}

/// Parses a plain non-negative decimal string (digits with an optional single
/// dot). Exponent notation is not accepted.
pub fn parse_decimal(amount: &str) -> Result<BigDecimal, ParseError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(ParseError::Empty);
    }
    if amount.starts_with('-') {
        return Err(ParseError::Negative);
    }
    let well_formed = amount.chars().all(|c| c.is_ascii_digit() || c == '.')
        && amount.chars().filter(|c| *c == '.').count() <= 1
        && amount.chars().any(|c| c.is_ascii_digit());
    if !well_formed {
        return Err(ParseError::Invalid(amount.to_owned()));
    }
    // `BigDecimal` rejects a leading or trailing dot.
    let normalized = match (amount.starts_with('.'), amount.ends_with('.')) {
        (true, _) => format!("0{amount}"),
        (_, true) => format!("{amount}0"),
        _ => amount.to_owned(),
    };
    BigDecimal::from_str(&normalized).map_err(|_| ParseError::Invalid(amount.to_owned()))
}

/// Formats an integer amount as a decimal string. Trailing fractional zeros
/// are trimmed but at least one fractional digit is kept, so whole amounts
/// render as `"10000.0"`.
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = usize::from(decimals);
    let padded = if digits.len() <= decimals {
        format!("{}{digits}", "0".repeat(decimals - digits.len() + 1))
    } else {
        digits
    };
    let (int, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{int}.0")
    } else {
        format!("{int}.{fraction}")
    }
}

/// The exact decimal value of an integer amount.
pub fn to_decimal(value: U256, decimals: u8) -> BigDecimal {
    BigDecimal::new(u256_to_big_int(&value), i64::from(decimals))
}

fn pow10(decimals: u8) -> BigDecimal {
    BigDecimal::new(BigInt::from(1), -i64::from(decimals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_amounts() {
        for (amount, decimals, expected) in [
            ("1", 18, U256::from(10).pow(U256::from(18))),
            ("1.5", 6, U256::from(1_500_000)),
            ("0.000001", 6, U256::from(1)),
            (".5", 1, U256::from(5)),
            ("15000", 0, U256::from(15_000)),
            ("2.", 2, U256::from(200)),
            ("0", 18, U256::ZERO),
            ("1.50", 1, U256::from(15)),
        ] {
            assert_eq!(parse_units(amount, decimals), Ok(expected), "{amount}");
        }
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert_eq!(parse_units("", 18), Err(ParseError::Empty));
        assert_eq!(parse_units("  ", 18), Err(ParseError::Empty));
        assert_eq!(parse_units("-1", 18), Err(ParseError::Negative));
        assert!(matches!(parse_units("abc", 18), Err(ParseError::Invalid(_))));
        assert!(matches!(parse_units("1.2.3", 18), Err(ParseError::Invalid(_))));
        assert!(matches!(parse_units(".", 18), Err(ParseError::Invalid(_))));
        assert!(matches!(parse_units("1e5", 18), Err(ParseError::Invalid(_))));
        assert!(matches!(
            parse_units("0.0000001", 6),
            Err(ParseError::TooPrecise { decimals: 6, .. })
        ));
        assert!(matches!(
            parse_units(&"9".repeat(80), 0),
            Err(ParseError::Overflow(_))
        ));
    }

    #[test]
    fn formats_amounts() {
        let ether = U256::from(10).pow(U256::from(18));
        assert_eq!(format_units(U256::from(10_000) * ether, 18), "10000.0");
        assert_eq!(format_units(ether / U256::from(2), 18), "0.5");
        assert_eq!(format_units(U256::from(1), 18), "0.000000000000000001");
        assert_eq!(format_units(U256::ZERO, 18), "0.0");
        assert_eq!(format_units(U256::from(1_000_001), 6), "1.000001");
        assert_eq!(format_units(U256::from(42), 0), "42.0");
    }

    #[test]
    fn decimal_value_compares_exactly() {
        let reserve = parse_units("9999.999999999999999999", 18).unwrap();
        let threshold = parse_decimal("10000").unwrap();
        assert!(to_decimal(reserve, 18) < threshold);
        assert_eq!(to_decimal(U256::from(5_000_000), 3), parse_decimal("5000").unwrap());
    }
}
