//! Config operations: field listing, redacted display, load checks, and the
//! result type callers use to display them.

use std::fmt;

use crate::settings::{self, FieldSetting};
use crate::types::FieldFilter;
use crate::walk::Config;

/// Result of a config operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// Field descriptors, one per leaf.
    Listing { settings: Vec<FieldSetting> },
    /// The loaded configuration as indented JSON, secrets masked.
    Snapshot(String),
    /// The configuration loaded without error.
    Valid { fields: usize },
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::Listing { settings } => {
                for (i, s) in settings.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{} ({}) <{}>", s.env_var, s.path, s.type_name)?;
                    if let Some(default) = &s.default {
                        write!(f, " default={default:?}")?;
                    }
                    if s.required {
                        write!(f, " required")?;
                    }
                    if s.secret {
                        write!(f, " secret")?;
                    }
                }
                Ok(())
            }
            ConfigResult::Snapshot(text) => write!(f, "{text}"),
            ConfigResult::Valid { fields } => write!(f, "Config OK ({fields} fields)"),
        }
    }
}

/// The fields of `C` selected by `filter`.
pub fn list_settings<C: Config>(filter: FieldFilter) -> ConfigResult {
    let settings = match filter {
        FieldFilter::All => settings::settings::<C>(),
        FieldFilter::Secret => settings::secret_fields::<C>(),
        FieldFilter::Required => settings::required_fields::<C>(),
    };
    ConfigResult::Listing { settings }
}
