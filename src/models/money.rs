use std::fmt;
use std::str::FromStr;

use async_graphql::{InputValueError, InputValueResult, Number, Scalar, ScalarType, Value};

/// A fixed-point amount of money with two decimal places, stored as whole cents
#[derive(sqlx::Type, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[sqlx(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    fn from_number(number: &Number) -> Option<Self> {
        if let Some(whole) = number.as_i64() {
            whole.checked_mul(100).map(Money)
        } else {
            number
                .as_f64()
                .filter(|amount| amount.is_finite())
                .map(|amount| Money((amount * 100.0).round() as i64))
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();

        write!(f, "{}{}.{:02}", sign, cents / 100, cents % 100)
    }
}

impl FromStr for Money {
    type Err = String;

    fn from_str(amount: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("{} is not a valid amount of money", amount);

        let trimmed = amount.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty()
            || fraction.len() > 2
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let fraction: i64 = format!("{:0<2}", fraction).parse().map_err(|_| invalid())?;
        let cents = whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction))
            .ok_or_else(invalid)?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

/// Money is sent as a string like `"25.00"` so no precision is lost; plain
/// numbers are accepted on input.
#[Scalar]
impl ScalarType for Money {
    fn parse(value: Value) -> InputValueResult<Self> {
        match &value {
            Value::String(amount) => amount.parse().map_err(InputValueError::custom),
            Value::Number(number) => {
                Money::from_number(number).ok_or_else(|| InputValueError::expected_type(value))
            }
            _ => Err(InputValueError::expected_type(value)),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}
