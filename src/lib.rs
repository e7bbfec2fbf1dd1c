//! Typed configuration from environment variables and `.env` files. Define a
//! struct, derive [`Config`], and go.
//!
//! ```ignore
//! use envfig::Config;
//!
//! #[derive(Config, Default)]
//! struct AppConfig {
//!     #[config(env = "PORT", default = 8080)]
//!     port: u16,
//!     #[config(secret = "DATABASE_URL", required)]
//!     database_url: Option<url::Url>,
//!     #[config(nested)]
//!     cache: Option<CacheConfig>,
//! }
//!
//! let config: AppConfig = envfig::load_with_dotenv(&[".env"])?;
//! println!("{}", envfig::pretty_string(&config));
//! ```
//!
//! # Struct as schema
//!
//! The derive reads `#[config(...)]` attributes on each named field:
//!
//! - **`env = "KEY"`** names the variable the field reads. Without it the
//!   `secret` key is used, and without that the field name itself.
//! - **`secret = "KEY"`** names the variable and marks the field secret, so
//!   printing masks it. On a `nested` field the whole sub-struct prints as
//!   `***`.
//! - **`default = ...`** is parsed like any other raw value when the source
//!   has nothing for the key and the field still holds its zero value.
//! - **`required`** fails the load when the value resolves to empty.
//! - **`nested`** recurses into another `Config` struct. `Option<T>` and
//!   `Box<T>` wrappers are allocated on demand, so nested defaults always
//!   apply.
//! - **`skip`** leaves the field alone.
//!
//! # Layer precedence
//!
//! ```text
//! Field default         #[config(default = ...)], only for zero fields
//!        ↑ overridden by
//! .env files            earlier files win over later ones
//!        ↑ overridden by
//! Environment vars      or the map passed to .vars()
//! ```
//!
//! Overlay files are read into memory. The process environment is never
//! modified, and a missing or malformed overlay is logged and skipped.
//!
//! # Value types
//!
//! Primitives, `String`, comma-separated `Vec<T>`, and `Option<T>` work out
//! of the box, as do the rich types listed in [`catalog`]. Anything else is
//! resolved through the [`Registry`]: explicit parsers first, then factories
//! in registration order, then the scalar rules. Opt a `FromStr + Display`
//! type in with [`text_value!`], or register a parser for it:
//!
//! ```ignore
//! envfig::register_parser(|raw: &str| raw.parse::<Celsius>());
//! ```
//!
//! Registration is process-wide and must happen before the loads that need
//! it. Use [`EnvfigBuilder::registry`] to pass an isolated registry instead.
//!
//! # Printing and introspection
//!
//! [`pretty_string`] renders the loaded struct as indented JSON with keys
//! sorted and secrets masked; it never fails. [`settings`] lists every leaf
//! field with its path, variable, type, default, and flags.
//!
//! # Clap adapter
//!
//! With the `clap` feature (on by default), embed [`ConfigArgs`] in your
//! subcommand enum to get `config list|show|check`, then pass
//! [`into_action()`](ConfigArgs::into_action) to
//! [`EnvfigBuilder::handle`]. Without clap, build a [`ConfigAction`]
//! directly.
//!
//! # Error handling
//!
//! Loading is fail-fast and returns the first [`EnvfigError`]: a required
//! key with no value, a field type nothing can parse, or a value that does
//! not parse. With the `rich-errors` feature the error also implements
//! `miette::Diagnostic`.

extern crate self as envfig;

pub mod catalog;
pub mod error;
pub mod registry;
pub mod render;
pub mod settings;
pub mod source;
pub mod types;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod ops;
mod scalar;
mod value;
mod walk;

#[cfg(test)]
mod fixtures;

use std::path::Path;

pub use builder::{Envfig, EnvfigBuilder};
pub use catalog::{Expression, Mailbox, Quantity};
#[cfg(feature = "clap")]
pub use cli::{ConfigArgs, ConfigSubcommand};
pub use envfig_derive::Config;
pub use error::{DispatchError, EnvfigError};
pub use ops::ConfigResult;
pub use registry::{Registry, TypeInfo, register_parser, register_parser_factory};
pub use render::pretty_string;
pub use scalar::ScalarKind;
pub use settings::{FieldSetting, filter_settings, required_fields, secret_fields, settings};
pub use source::{Env, Layered, Source};
pub use types::{ConfigAction, FieldFilter};
pub use value::Value;
pub use walk::{Config, FieldMeta, Loader, Nested};

#[doc(hidden)]
pub use serde_json;

/// Load `C` from the process environment.
pub fn load<C: Config + Default>() -> Result<C, EnvfigError> {
    Envfig::builder::<C>().load()
}

/// Load `C` from the process environment over the given dotenv files, or
/// over `.env` when `paths` is empty.
pub fn load_with_dotenv<C, P>(paths: &[P]) -> Result<C, EnvfigError>
where
    C: Config + Default,
    P: AsRef<Path>,
{
    paths
        .iter()
        .fold(Envfig::builder::<C>().dotenv(), |builder, path| {
            builder.dotenv_path(path)
        })
        .load()
}

/// Populate an existing value from the process environment.
pub fn populate<C: Config>(config: &mut C) -> Result<(), EnvfigError> {
    Envfig::builder::<C>().populate(config)
}
