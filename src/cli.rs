//! Clap adapter for envfig.
//!
//! Compiled only with the `clap` Cargo feature (on by default). It provides
//! [`ConfigArgs`] and [`ConfigSubcommand`], which you embed in your clap
//! `#[derive(Parser)]` struct to get `config list|show|check` subcommands.
//!
//! The only bridge to the core is [`ConfigArgs::into_action()`], which
//! converts clap-parsed arguments into a [`ConfigAction`](crate::ConfigAction).
//! Everything else goes through
//! [`EnvfigBuilder::handle()`](crate::EnvfigBuilder::handle), so other CLI
//! parsers can construct a `ConfigAction` directly.

use clap::{Args, Subcommand};

use crate::types::{ConfigAction, FieldFilter};

/// Clap-derived args for the `config` subcommand group.
///
/// ```ignore
/// #[derive(Subcommand)]
/// enum Commands {
///     Config(ConfigArgs),
/// }
/// ```
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigSubcommand>,
}

/// Available config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// List the configuration fields and the variables they read.
    List {
        /// Only fields whose values are masked.
        #[arg(long, conflicts_with = "required")]
        secrets: bool,
        /// Only fields that must be set.
        #[arg(long)]
        required: bool,
    },
    /// Show the loaded configuration with secrets masked.
    Show,
    /// Load the configuration and report errors.
    Check,
}

impl ConfigArgs {
    /// Convert clap-parsed args into a framework-agnostic `ConfigAction`.
    ///
    /// Bare `config` maps to `config list`.
    pub fn into_action(self) -> ConfigAction {
        match self.action {
            None => ConfigAction::List {
                filter: FieldFilter::All,
            },
            Some(ConfigSubcommand::List { secrets, required }) => {
                let filter = if secrets {
                    FieldFilter::Secret
                } else if required {
                    FieldFilter::Required
                } else {
                    FieldFilter::All
                };
                ConfigAction::List { filter }
            }
            Some(ConfigSubcommand::Show) => ConfigAction::Show,
            Some(ConfigSubcommand::Check) => ConfigAction::Check,
        }
    }
}
