use tracing::Level;

use super::ValueError;
use crate::registry::TypeInfo;
use crate::value::Value;

/// Level names match case-insensitively and `warning` is accepted for
/// `warn`. Integers use the numbering where `DEBUG` is -4, `INFO` 0, `WARN`
/// 4 and `ERROR` 8; any integer maps to the band it falls in, so `12` is
/// `ERROR` and `-8` is `DEBUG`. `TRACE` is only reachable by name.
pub fn parse_level(raw: &str) -> Result<Level, ValueError> {
    match raw.to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => other
            .parse::<i64>()
            .map(level_from_int)
            .map_err(|_| ValueError::Level(raw.to_string())),
    }
}

fn level_from_int(n: i64) -> Level {
    match n {
        ..=-4 => Level::DEBUG,
        ..4 => Level::INFO,
        ..8 => Level::WARN,
        _ => Level::ERROR,
    }
}

impl Value for Level {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<Level>("Level")
    }

    /// `INFO` is the unset level.
    fn is_zero(&self) -> bool {
        *self == Level::INFO
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::String(self.as_str().to_string())
    }
}
