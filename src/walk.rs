//! The population engine.
//!
//! `#[derive(Config)]` generates a [`Config`] impl whose `populate` visits
//! fields in declaration order and hands each one to the [`Loader`]:
//! leaves go through [`Loader::leaf`], nested aggregates through
//! [`Loader::nested`], which recurses.
//!
//! For each leaf:
//!
//! 1. The key is the `env` attribute, else `secret`, else the field name.
//! 2. If the source has the key, its value is used, even when empty.
//! 3. Otherwise a zero field falls back to its `default` (possibly none) and a
//!    non-zero field is left alone.
//! 4. An empty value fails a `required` field with
//!    [`EnvfigError::RequiredMissing`]. For other fields it is a no-op, except
//!    for sequences, which are cleared.
//! 5. The value is dispatched through the [`Registry`] and stored.
//!
//! The first error aborts the walk. Earlier fields keep their new values.

use tracing::trace;

use crate::error::EnvfigError;
use crate::registry::Registry;
use crate::render::Snapshot;
use crate::settings::FieldSetting;
use crate::source::Source;
use crate::value::Value;

/// Static description of one schema field, emitted by the derive macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    /// The Rust field name.
    pub name: &'static str,
    pub env: Option<&'static str>,
    pub secret: Option<&'static str>,
    pub default: Option<&'static str>,
    pub required: bool,
    pub nested: bool,
    /// Attribute keys and values as written, for introspection.
    pub tags: &'static [(&'static str, &'static str)],
}

impl FieldMeta {
    /// The lookup key: `env`, else `secret`, else the field name.
    pub fn key(&self) -> &'static str {
        self.env.or(self.secret).unwrap_or(self.name)
    }

    pub fn is_secret(&self) -> bool {
        self.secret.is_some()
    }
}

/// A configuration schema. Implement it with `#[derive(envfig::Config)]`.
pub trait Config: Sized + 'static {
    const FIELDS: &'static [FieldMeta];

    /// Fill fields from the loader's source, recursing into nested schemas.
    fn populate(&mut self, loader: &Loader<'_>) -> Result<(), EnvfigError>;

    /// Write the redacted rendering of every field into `out`.
    fn redact(&self, out: &mut Snapshot);

    /// Append a descriptor for every leaf, with paths under `prefix`.
    fn collect(prefix: &str, out: &mut Vec<FieldSetting>);
}

/// A field marked `#[config(nested)]`.
///
/// The derive implements this for every schema type. `Option<N>` and
/// `Box<N>` wrap it; an empty `Option` is allocated with `Default` before
/// populating, so nested defaults always apply.
pub trait Nested {
    fn populate_nested(&mut self, loader: &Loader<'_>) -> Result<(), EnvfigError>;

    fn snapshot_nested(&self) -> serde_json::Value;

    fn collect_nested(prefix: &str, out: &mut Vec<FieldSetting>);
}

impl<N: Nested + Default> Nested for Option<N> {
    fn populate_nested(&mut self, loader: &Loader<'_>) -> Result<(), EnvfigError> {
        self.get_or_insert_with(N::default).populate_nested(loader)
    }

    fn snapshot_nested(&self) -> serde_json::Value {
        self.as_ref()
            .map_or(serde_json::Value::Null, Nested::snapshot_nested)
    }

    fn collect_nested(prefix: &str, out: &mut Vec<FieldSetting>) {
        N::collect_nested(prefix, out);
    }
}

impl<N: Nested> Nested for Box<N> {
    fn populate_nested(&mut self, loader: &Loader<'_>) -> Result<(), EnvfigError> {
        (**self).populate_nested(loader)
    }

    fn snapshot_nested(&self) -> serde_json::Value {
        (**self).snapshot_nested()
    }

    fn collect_nested(prefix: &str, out: &mut Vec<FieldSetting>) {
        N::collect_nested(prefix, out);
    }
}

/// Carries the source and registry through one population call.
pub struct Loader<'a> {
    source: &'a dyn Source,
    registry: &'a Registry,
}

impl<'a> Loader<'a> {
    pub fn new(source: &'a dyn Source, registry: &'a Registry) -> Self {
        Self { source, registry }
    }

    /// Resolve and assign one leaf field.
    pub fn leaf<T: Value>(&self, meta: &FieldMeta, field: &mut T) -> Result<(), EnvfigError> {
        let key = meta.key();

        let raw = match self.source.get(key) {
            Some(raw) => raw,
            None if field.is_zero() => {
                if meta.default.is_some() {
                    trace!(key, "applying default");
                }
                meta.default.unwrap_or_default().to_string()
            }
            None => {
                trace!(key, "keeping pre-set value");
                return Ok(());
            }
        };

        if raw.is_empty() {
            if meta.required {
                return Err(EnvfigError::RequiredMissing {
                    key: key.to_string(),
                });
            }
            if !T::SEQUENCE {
                return Ok(());
            }
        }

        field
            .assign(&raw, self.registry)
            .map_err(|e| e.for_field(meta.name))
    }

    /// Recurse into a nested aggregate.
    pub fn nested<N: Nested>(&self, _meta: &FieldMeta, field: &mut N) -> Result<(), EnvfigError> {
        field.populate_nested(self)
    }
}

/// Split a comma-separated list, trimming parts and dropping empty ones.
pub fn split_csv(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|part| !part.is_empty())
}

/// Populate `config` from `source` using `registry`.
pub fn populate<C: Config>(
    config: &mut C,
    source: &dyn Source,
    registry: &Registry,
) -> Result<(), EnvfigError> {
    config.populate(&Loader::new(source, registry))
}
