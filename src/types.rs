/// Which fields a `config list` reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldFilter {
    #[default]
    All,
    /// Fields declared with `secret`.
    Secret,
    /// Fields declared `required`.
    Required,
}

/// A config operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    /// Describe the schema's fields.
    List { filter: FieldFilter },
    /// Load the configuration and print it with secrets masked.
    Show,
    /// Load the configuration and report whether it succeeded.
    Check,
}
