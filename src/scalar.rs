//! Primitive parsing: the last step of dispatch when neither an explicit parser
//! nor a factory claims a type.

use std::any::Any;
use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

/// The primitive kinds the scalar fallback understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Str,
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
}

#[derive(Debug, Error)]
pub enum ScalarError {
    #[error("invalid boolean {0:?}")]
    Bool(String),

    #[error("invalid integer {raw:?}: {source}")]
    Int { raw: String, source: ParseIntError },

    #[error("invalid float {raw:?}: {source}")]
    Float { raw: String, source: ParseFloatError },

    #[error("invalid duration {raw:?}: {source}")]
    Duration {
        raw: String,
        source: humantime::DurationError,
    },

    #[error("duration {0:?} does not fit in i64 nanoseconds")]
    DurationOverflow(String),
}

/// Parse `raw` as the primitive `kind`, boxed as the exact Rust type.
///
/// `i64` also accepts duration literals ending in `s` (`"30s"`, `"250ms"`,
/// `"-1m30s"`) and stores their length in nanoseconds. A leading sign
/// applies to the whole literal.
pub fn parse(raw: &str, kind: ScalarKind) -> Result<Box<dyn Any>, ScalarError> {
    fn int<T>(raw: &str) -> Result<Box<dyn Any>, ScalarError>
    where
        T: std::str::FromStr<Err = ParseIntError> + Any,
    {
        raw.parse::<T>()
            .map(|v| Box::new(v) as Box<dyn Any>)
            .map_err(|source| ScalarError::Int {
                raw: raw.to_string(),
                source,
            })
    }

    fn float<T>(raw: &str) -> Result<Box<dyn Any>, ScalarError>
    where
        T: std::str::FromStr<Err = ParseFloatError> + Any,
    {
        raw.parse::<T>()
            .map(|v| Box::new(v) as Box<dyn Any>)
            .map_err(|source| ScalarError::Float {
                raw: raw.to_string(),
                source,
            })
    }

    match kind {
        ScalarKind::Str => Ok(Box::new(raw.to_string())),
        ScalarKind::Bool => parse_bool(raw).map(|b| Box::new(b) as Box<dyn Any>),
        ScalarKind::I8 => int::<i8>(raw),
        ScalarKind::I16 => int::<i16>(raw),
        ScalarKind::I32 => int::<i32>(raw),
        ScalarKind::I64 if raw.ends_with('s') => {
            parse_duration_nanos(raw).map(|n| Box::new(n) as Box<dyn Any>)
        }
        ScalarKind::I64 => int::<i64>(raw),
        ScalarKind::Isize => int::<isize>(raw),
        ScalarKind::U8 => int::<u8>(raw),
        ScalarKind::U16 => int::<u16>(raw),
        ScalarKind::U32 => int::<u32>(raw),
        ScalarKind::U64 => int::<u64>(raw),
        ScalarKind::Usize => int::<usize>(raw),
        ScalarKind::F32 => float::<f32>(raw),
        ScalarKind::F64 => float::<f64>(raw),
    }
}

/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(raw: &str) -> Result<bool, ScalarError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ScalarError::Bool(raw.to_string())),
    }
}

fn parse_duration_nanos(raw: &str) -> Result<i64, ScalarError> {
    let (negative, literal) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let d = humantime::parse_duration(literal).map_err(|source| ScalarError::Duration {
        raw: raw.to_string(),
        source,
    })?;
    let nanos =
        i64::try_from(d.as_nanos()).map_err(|_| ScalarError::DurationOverflow(raw.to_string()))?;
    Ok(if negative { -nanos } else { nanos })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed<T: Any + Copy>(raw: &str, kind: ScalarKind) -> T {
        *parse(raw, kind).unwrap().downcast::<T>().unwrap()
    }

    #[test]
    fn string_is_identity() {
        let v = parse("  spaced  ", ScalarKind::Str).unwrap();
        assert_eq!(*v.downcast::<String>().unwrap(), "  spaced  ");
    }

    #[test]
    fn bool_literal_forms() {
        for raw in ["1", "t", "T", "TRUE", "true", "True"] {
            assert!(parse_bool(raw).unwrap(), "{raw}");
        }
        for raw in ["0", "f", "F", "FALSE", "false", "False"] {
            assert!(!parse_bool(raw).unwrap(), "{raw}");
        }
    }

    #[test]
    fn bool_rejects_other_words() {
        assert!(parse_bool("yes").is_err());
        assert!(parse_bool("tRuE").is_err());
        assert!(parse_bool("").is_err());
    }

    #[test]
    fn integers_respect_width() {
        assert_eq!(parsed::<i8>("-128", ScalarKind::I8), -128);
        assert!(parse("128", ScalarKind::I8).is_err());
        assert_eq!(parsed::<u16>("8080", ScalarKind::U16), 8080);
        assert!(parse("-1", ScalarKind::U16).is_err());
        assert_eq!(parsed::<i32>("-42", ScalarKind::I32), -42);
    }

    #[test]
    fn integer_rejects_non_numeric() {
        let err = parse("abc", ScalarKind::I32).unwrap_err();
        assert!(err.to_string().contains("\"abc\""));
    }

    #[test]
    fn i64_accepts_duration_literal_as_nanos() {
        assert_eq!(parsed::<i64>("30s", ScalarKind::I64), 30_000_000_000);
        assert_eq!(parsed::<i64>("250ms", ScalarKind::I64), 250_000_000);
        assert_eq!(parsed::<i64>("12345", ScalarKind::I64), 12345);
    }

    #[test]
    fn i64_duration_literal_may_be_signed() {
        assert_eq!(parsed::<i64>("-30s", ScalarKind::I64), -30_000_000_000);
        assert_eq!(parsed::<i64>("+250ms", ScalarKind::I64), 250_000_000);
        assert_eq!(parsed::<i64>("-1m30s", ScalarKind::I64), -90_000_000_000);
        assert!(parse("--30s", ScalarKind::I64).is_err());
    }

    #[test]
    fn narrower_ints_do_not_accept_durations() {
        assert!(parse("30s", ScalarKind::I32).is_err());
    }

    #[test]
    fn i64_bad_duration_is_an_error() {
        assert!(parse("lots", ScalarKind::I64).is_err());
    }

    #[test]
    fn floats_parse_decimal_and_exponent() {
        assert_eq!(parsed::<f64>("1.5", ScalarKind::F64), 1.5);
        assert_eq!(parsed::<f64>("2e3", ScalarKind::F64), 2000.0);
        assert_eq!(parsed::<f32>("0.25", ScalarKind::F32), 0.25);
        assert!(parse("one", ScalarKind::F64).is_err());
    }
}
