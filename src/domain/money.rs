use std::fmt;

/// Money is represented as integer cents to avoid floating-point drift in sums.
/// 1 unit = 100 cents, so 12.50 = 1250 cents.
pub type Cents = i64;

/// Largest amount a single record may carry: 1,000,000,000.00.
///
/// Keeps every amount exact in the data file's decimal form (well under
/// 2^53 cents) and leaves room to sum millions of records in an `i64`.
pub const MAX_AMOUNT_CENTS: Cents = 100_000_000_000;

/// Format cents as a plain decimal string.
/// Example: 1250 -> "12.50", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Parse a decimal string into cents.
/// Example: "12.50" -> 1250, "12.5" -> 1250, "100" -> 10000
///
/// More than two fractional digits is an error: the amount would otherwise
/// be silently rounded.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseCentsError::Empty);
    }
    // At most one sign; anything left that is not a digit is rejected below
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };

    let (units_str, decimal_str) = match digits.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (digits, ""),
    };
    if units_str.is_empty() && decimal_str.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }
    if !units_str.chars().all(|c| c.is_ascii_digit())
        || !decimal_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ParseCentsError::InvalidFormat);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str
            .parse()
            .map_err(|_| ParseCentsError::OutOfRange)?
    };

    let decimal_cents: i64 = match decimal_str.len() {
        0 => 0,
        // "5" after the point means 50 cents
        1 => decimal_str.parse::<i64>().map_err(|_| ParseCentsError::InvalidFormat)? * 10,
        2 => decimal_str.parse().map_err(|_| ParseCentsError::InvalidFormat)?,
        _ => return Err(ParseCentsError::TooManyDecimals),
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .ok_or(ParseCentsError::OutOfRange)?;
    Ok(if negative { -cents } else { cents })
}

/// Convert cents to the floating point form used in the data file.
pub fn cents_to_decimal(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

/// Convert a decimal read from the data file back into cents.
/// Values carrying sub-cent precision are rejected.
pub fn decimal_to_cents(value: f64) -> Result<Cents, ParseCentsError> {
    if !value.is_finite() {
        return Err(ParseCentsError::InvalidFormat);
    }
    let scaled = value * 100.0;
    let rounded = scaled.round();
    // Scaling can be off by a few ulps for large values
    let tolerance = (scaled.abs() * f64::EPSILON * 4.0).max(1e-6);
    if (scaled - rounded).abs() > tolerance {
        return Err(ParseCentsError::TooManyDecimals);
    }
    if rounded.abs() > i64::MAX as f64 {
        return Err(ParseCentsError::OutOfRange);
    }
    Ok(rounded as Cents)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    Empty,
    InvalidFormat,
    TooManyDecimals,
    OutOfRange,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::Empty => write!(f, "amount is empty"),
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::TooManyDecimals => {
                write!(f, "amount has more than two decimal places")
            }
            ParseCentsError::OutOfRange => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for ParseCentsError {}

/// Serde adapter storing cents as a decimal number (`12.5`) in JSON.
pub mod decimal_amount {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::{Cents, cents_to_decimal, decimal_to_cents};

    pub fn serialize<S: Serializer>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(cents_to_decimal(*cents))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cents, D::Error> {
        let value = f64::deserialize(deserializer)?;
        decimal_to_cents(value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(1250), "12.50");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(100), "1.00");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5000), "-50.00");
        assert_eq!(format_cents(-1), "-0.01");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("12.50"), Ok(1250));
        assert_eq!(parse_cents("50"), Ok(5000));
        assert_eq!(parse_cents("12.5"), Ok(1250));
        assert_eq!(parse_cents("0.01"), Ok(1));
        assert_eq!(parse_cents(".50"), Ok(50));
        assert_eq!(parse_cents(" 7 "), Ok(700));
        assert_eq!(parse_cents("-3"), Ok(-300));
        assert_eq!(parse_cents("7."), Ok(700));
        assert_eq!(parse_cents("+4.20"), Ok(420));
    }

    #[test]
    fn test_parse_cents_invalid() {
        assert_eq!(parse_cents(""), Err(ParseCentsError::Empty));
        assert_eq!(parse_cents("abc"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("12.34.56"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("."), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("1e3"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("+-3"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("--3"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("-+3"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("++3"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("100.999"), Err(ParseCentsError::TooManyDecimals));
        assert_eq!(
            parse_cents("99999999999999999999"),
            Err(ParseCentsError::OutOfRange)
        );
    }

    #[test]
    fn test_decimal_conversion() {
        assert_eq!(cents_to_decimal(1250), 12.5);
        assert_eq!(decimal_to_cents(12.5), Ok(1250));
        assert_eq!(decimal_to_cents(0.1 + 0.2), Ok(30));
        assert_eq!(decimal_to_cents(1.005), Err(ParseCentsError::TooManyDecimals));
        assert_eq!(decimal_to_cents(f64::NAN), Err(ParseCentsError::InvalidFormat));
    }

    #[test]
    fn test_largest_amount_survives_decimal_form() {
        for cents in [MAX_AMOUNT_CENTS, MAX_AMOUNT_CENTS - 1, 12_345_678_901] {
            assert_eq!(decimal_to_cents(cents_to_decimal(cents)), Ok(cents));

            let json = serde_json::to_string(&cents_to_decimal(cents)).unwrap();
            let reread: f64 = serde_json::from_str(&json).unwrap();
            assert_eq!(decimal_to_cents(reread), Ok(cents));
        }
        assert_eq!(
            decimal_to_cents(999_999_999.995),
            Err(ParseCentsError::TooManyDecimals)
        );
    }
}
