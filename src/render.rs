//! Secret-safe rendering of a populated schema.
//!
//! Each field is written under its lookup key. Secret fields go through
//! [`Value::masked`]: strings (and the strings of a `Vec<String>`) keep their
//! first three characters, every other type becomes [`SECRET_MARKER`],
//! including `Option<String>` and secret nested schemas. Nested schemas
//! render as nested objects and an unallocated `Option` renders as `null`. Keys are sorted at every
//! level, so rendering the same value twice yields identical text.

use std::collections::BTreeMap;

use crate::walk::{Config, FieldMeta, Nested};
use crate::value::Value;

/// Replaces a secret value that is not a string.
pub const SECRET_MARKER: &str = "***";

/// Replaces the password of a URL with embedded credentials.
pub const URL_MASK: &str = "***";

const MASK_CHAR: char = '*';
const VISIBLE_PREFIX: usize = 3;

/// Key-sorted rendering of one schema level.
pub type Snapshot = BTreeMap<String, serde_json::Value>;

/// Keep the first three characters and mask the rest. Three characters or
/// fewer are masked entirely.
pub fn mask(s: &str) -> String {
    let len = s.chars().count();
    if len <= VISIBLE_PREFIX {
        return MASK_CHAR.to_string().repeat(len);
    }
    s.chars()
        .take(VISIBLE_PREFIX)
        .chain(std::iter::repeat_n(MASK_CHAR, len - VISIBLE_PREFIX))
        .collect()
}

/// Render one leaf field into `out`.
pub fn leaf<T: Value>(meta: &FieldMeta, value: &T, out: &mut Snapshot) {
    let rendered = if meta.is_secret() {
        value.masked()
    } else {
        value.snapshot()
    };
    out.insert(meta.key().to_string(), rendered);
}

/// Render a nested schema into `out` under its field name. A secret nested
/// field is opaque: only [`SECRET_MARKER`] is written, whether or not it is
/// allocated.
pub fn nested<N: Nested>(meta: &FieldMeta, value: &N, out: &mut Snapshot) {
    let rendered = if meta.is_secret() {
        serde_json::Value::String(SECRET_MARKER.to_string())
    } else {
        value.snapshot_nested()
    };
    out.insert(meta.key().to_string(), rendered);
}

/// The redacted snapshot of `config` as a JSON object.
pub fn snapshot<C: Config>(config: &C) -> serde_json::Value {
    let mut out = Snapshot::new();
    config.redact(&mut out);
    serde_json::Value::Object(out.into_iter().collect())
}

/// Indented JSON of the redacted snapshot. Never fails: a serialization
/// error is returned as the text itself.
pub fn pretty_string<C: Config>(config: &C) -> String {
    let mut out = Snapshot::new();
    config.redact(&mut out);
    serde_json::to_string_pretty(&out).unwrap_or_else(|e| format!("error rendering config: {e}"))
}
