use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::ValueError;
use crate::registry::TypeInfo;
use crate::value::Value;

/// A resource quantity in the Kubernetes notation: a decimal number with an
/// optional suffix.
///
/// - decimal SI: `n u m k M G T P E`
/// - binary SI: `Ki Mi Gi Ti Pi Ei`
/// - exponent: `e3`, `E-2`
///
/// Quantities compare by amount, so `1Gi == 1024Mi` and `500m < 1`. The
/// suffix is only kept for display.
#[derive(Debug, Clone)]
pub struct Quantity {
    amount: Decimal,
    suffix: String,
    scale: Decimal,
}

impl Quantity {
    /// The exact amount in base units.
    pub fn as_decimal(&self) -> Decimal {
        self.amount
    }

    /// The amount rounded up to a whole number, saturating at the `i64`
    /// bounds.
    pub fn value(&self) -> i64 {
        saturate(self.amount.ceil(), self.amount)
    }

    /// The amount in thousandths, rounded up.
    pub fn milli_value(&self) -> i64 {
        match self.amount.checked_mul(Decimal::from(1000)) {
            Some(milli) => saturate(milli.ceil(), self.amount),
            None => saturate(Decimal::MAX, self.amount),
        }
    }

    /// Sum of two quantities, displayed with this quantity's suffix.
    pub fn checked_add(&self, other: &Quantity) -> Option<Quantity> {
        Some(Quantity {
            amount: self.amount.checked_add(other.amount)?,
            ..self.clone()
        })
    }
}

fn saturate(value: Decimal, sign_of: Decimal) -> i64 {
    value.to_i64().unwrap_or(if sign_of.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

fn pow10(exp: i32) -> Option<Decimal> {
    match exp {
        0..=28 => Some(Decimal::from_i128_with_scale(10i128.pow(exp as u32), 0)),
        -28..=-1 => Some(Decimal::new(1, exp.unsigned_abs())),
        _ => None,
    }
}

fn suffix_scale(suffix: &str) -> Option<Decimal> {
    let binary = |shift: u32| Some(Decimal::from(1u64 << shift));
    match suffix {
        "" => Some(Decimal::ONE),
        "n" => pow10(-9),
        "u" => pow10(-6),
        "m" => pow10(-3),
        "k" => pow10(3),
        "M" => pow10(6),
        "G" => pow10(9),
        "T" => pow10(12),
        "P" => pow10(15),
        "E" => pow10(18),
        "Ki" => binary(10),
        "Mi" => binary(20),
        "Gi" => binary(30),
        "Ti" => binary(40),
        "Pi" => binary(50),
        "Ei" => binary(60),
        _ => {
            let exp = suffix.strip_prefix(['e', 'E'])?.parse::<i32>().ok()?;
            pow10(exp)
        }
    }
}

impl FromStr for Quantity {
    type Err = ValueError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ValueError::Quantity {
            raw: raw.to_string(),
            reason,
        };

        let digits_start = usize::from(raw.starts_with(['+', '-']));
        let number_end = raw[digits_start..]
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .map_or(raw.len(), |i| i + digits_start);
        let (number, suffix) = raw.split_at(number_end);

        if number.len() == digits_start {
            return Err(invalid("missing number"));
        }
        let number = Decimal::from_str(number).map_err(|_| invalid("malformed number"))?;
        let scale = suffix_scale(suffix).ok_or_else(|| invalid("unknown suffix"))?;
        let amount = number
            .checked_mul(scale)
            .ok_or_else(|| invalid("out of range"))?;

        Ok(Quantity {
            amount,
            suffix: suffix.to_string(),
            scale,
        })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let number = self
            .amount
            .checked_div(self.scale)
            .unwrap_or(self.amount)
            .normalize();
        write!(f, "{number}{}", self.suffix)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity {
            amount: Decimal::ZERO,
            suffix: String::new(),
            scale: Decimal::ONE,
        }
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.amount == other.amount
    }
}

impl Eq for Quantity {}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.amount.cmp(&other.amount)
    }
}

pub fn parse_quantity(raw: &str) -> Result<Quantity, ValueError> {
    raw.parse()
}

impl Value for Quantity {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<Quantity>("Quantity")
    }

    fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::String(self.to_string())
    }
}
