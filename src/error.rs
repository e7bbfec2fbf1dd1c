use thiserror::Error;

/// Boxed cause returned by parsers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while populating a configuration struct.
///
/// Loading is fail-fast: the first error aborts the whole call. Fields that
/// were processed before the error keep whatever they were set to.
#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum EnvfigError {
    #[error("required key {key:?} missing")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(
            code(envfig::required_missing),
            help("set the variable in the environment or the .env file, or give the field a default")
        )
    )]
    RequiredMissing { key: String },

    #[error("field {field}: unsupported type {type_name}")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(
            code(envfig::unsupported_type),
            help("register a parser for the type or implement it with text_value!")
        )
    )]
    Unsupported { field: String, type_name: String },

    #[error("field {field}: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(envfig::parse)))]
    Parse { field: String, source: BoxError },
}

/// Errors raised by the type dispatcher for a single raw string.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No explicit parser, factory, or scalar rule handles the type.
    #[error("unsupported type {0}")]
    Unsupported(String),

    #[error("{0}")]
    Invalid(BoxError),
}

impl DispatchError {
    /// Attach the field name, turning a dispatch failure into a load failure.
    pub fn for_field(self, field: &str) -> EnvfigError {
        match self {
            DispatchError::Unsupported(type_name) => EnvfigError::Unsupported {
                field: field.to_string(),
                type_name,
            },
            DispatchError::Invalid(source) => EnvfigError::Parse {
                field: field.to_string(),
                source,
            },
        }
    }
}

/// Wraps failures of the text-decoding capability.
#[derive(Debug, Error)]
#[error("failed to decode text: {0}")]
pub struct DecodeTextError(pub BoxError);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_missing_formats_with_quoted_key() {
        let err = EnvfigError::RequiredMissing {
            key: "API_KEY".into(),
        };
        assert_eq!(err.to_string(), r#"required key "API_KEY" missing"#);
    }

    #[test]
    fn parse_error_names_field_and_cause() {
        let err = DispatchError::Invalid("invalid integer \"abc\"".into()).for_field("port");
        let msg = err.to_string();
        assert!(msg.starts_with("field port: "));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn unsupported_keeps_type_name() {
        let err = DispatchError::Unsupported("Vec<Vec<u8>>".into()).for_field("matrix");
        match err {
            EnvfigError::Unsupported { field, type_name } => {
                assert_eq!(field, "matrix");
                assert_eq!(type_name, "Vec<Vec<u8>>");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
