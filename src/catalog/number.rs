use std::str::FromStr;

use num_bigint::BigInt;
use rust_decimal::Decimal;

use super::ValueError;
use crate::registry::TypeInfo;
use crate::value::Value;

pub fn parse_bigint(raw: &str) -> Result<BigInt, ValueError> {
    BigInt::parse_bytes(raw.as_bytes(), 10).ok_or_else(|| ValueError::BigInt(raw.to_string()))
}

/// Plain notation, falling back to scientific (`1.23e-4`).
pub fn parse_decimal(raw: &str) -> Result<Decimal, ValueError> {
    Decimal::from_str(raw)
        .or_else(|e| {
            if raw.contains(['e', 'E']) {
                Decimal::from_scientific(raw)
            } else {
                Err(e)
            }
        })
        .map_err(|source| ValueError::Decimal {
            raw: raw.to_string(),
            source,
        })
}

impl Value for BigInt {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<BigInt>("BigInt")
    }

    fn is_zero(&self) -> bool {
        *self == BigInt::default()
    }

    /// Rendered as a string: JSON numbers cannot carry arbitrary precision.
    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::String(self.to_string())
    }
}

impl Value for Decimal {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<Decimal>("Decimal")
    }

    fn is_zero(&self) -> bool {
        Decimal::is_zero(self)
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::String(self.to_string())
    }
}
