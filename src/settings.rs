//! Field metadata for introspection.
//!
//! [`settings`] flattens a schema into one [`FieldSetting`] per leaf,
//! descending into nested schemas and joining field names with `.`. It works
//! from the static field tables alone, so no value is needed and an
//! `Option` nested schema is described as if it were allocated.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::value::Value;
use crate::walk::{Config, FieldMeta, Nested};

/// Descriptor of one leaf field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSetting {
    /// Dotted field path from the schema root, e.g. `database.host`.
    pub path: String,
    pub field_name: String,
    /// The lookup key used for population.
    pub env_var: String,
    pub type_name: String,
    pub default: Option<String>,
    pub required: bool,
    pub secret: bool,
    /// Attribute keys and values as written on the field.
    pub tags: BTreeMap<String, String>,
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Describe one leaf field.
pub fn leaf<T: Value>(prefix: &str, meta: &FieldMeta, out: &mut Vec<FieldSetting>) {
    out.push(FieldSetting {
        path: join(prefix, meta.name),
        field_name: meta.name.to_string(),
        env_var: meta.key().to_string(),
        type_name: T::type_info().name().to_string(),
        default: meta.default.map(str::to_string),
        required: meta.required,
        secret: meta.is_secret(),
        tags: meta
            .tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    });
}

/// Describe the leaves of a nested schema under this field's path. Every
/// leaf under a secret nested field is reported as secret.
pub fn nested<N: Nested>(prefix: &str, meta: &FieldMeta, out: &mut Vec<FieldSetting>) {
    let start = out.len();
    N::collect_nested(&join(prefix, meta.name), out);
    if meta.is_secret() {
        for setting in &mut out[start..] {
            setting.secret = true;
        }
    }
}

/// Every leaf field of `C`, in declaration order.
pub fn settings<C: Config>() -> Vec<FieldSetting> {
    let mut out = Vec::new();
    C::collect("", &mut out);
    out
}

pub fn filter_settings<F>(settings: Vec<FieldSetting>, predicate: F) -> Vec<FieldSetting>
where
    F: Fn(&FieldSetting) -> bool,
{
    settings.into_iter().filter(|s| predicate(s)).collect()
}

/// Leaf fields declared with `secret`.
pub fn secret_fields<C: Config>() -> Vec<FieldSetting> {
    filter_settings(settings::<C>(), |s| s.secret)
}

/// Leaf fields declared `required`.
pub fn required_fields<C: Config>() -> Vec<FieldSetting> {
    filter_settings(settings::<C>(), |s| s.required)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{AppConfig, RequiredConfig, VaultConfig};

    fn find<'a>(settings: &'a [FieldSetting], path: &str) -> &'a FieldSetting {
        settings
            .iter()
            .find(|s| s.path == path)
            .unwrap_or_else(|| panic!("no setting at {path}"))
    }

    #[test]
    fn leaves_in_declaration_order() {
        let paths: Vec<_> = settings::<AppConfig>()
            .into_iter()
            .map(|s| s.path)
            .collect();
        assert_eq!(
            paths,
            vec![
                "name",
                "port",
                "debug",
                "verbose",
                "database.host",
                "database.port",
                "database.password",
                "cache.addr",
                "cache.ttl_seconds",
            ]
        );
    }

    #[test]
    fn leaf_descriptor_fields() {
        let all = settings::<AppConfig>();
        let port = find(&all, "database.port");
        assert_eq!(port.field_name, "port");
        assert_eq!(port.env_var, "DB_PORT");
        assert_eq!(port.type_name, "u16");
        assert_eq!(port.default.as_deref(), Some("5432"));
        assert!(!port.required);
        assert!(!port.secret);
        assert_eq!(port.tags["env"], "DB_PORT");
        assert_eq!(port.tags["default"], "5432");
    }

    #[test]
    fn name_is_the_fallback_env_var() {
        let all = settings::<AppConfig>();
        let verbose = find(&all, "verbose");
        assert_eq!(verbose.env_var, "verbose");
        assert_eq!(verbose.default, None);
        assert!(verbose.tags.is_empty());
    }

    #[test]
    fn secret_key_is_the_env_var() {
        let secrets = secret_fields::<AppConfig>();
        assert_eq!(secrets.len(), 1);
        assert_eq!(secrets[0].path, "database.password");
        assert_eq!(secrets[0].env_var, "DB_PASSWORD");
        assert_eq!(secrets[0].tags["secret"], "DB_PASSWORD");
    }

    #[test]
    fn secret_nested_marks_its_leaves_secret() {
        let paths: Vec<_> = secret_fields::<VaultConfig>()
            .into_iter()
            .map(|s| s.path)
            .collect();
        assert_eq!(
            paths,
            vec!["creds.user", "creds.pass", "backup.user", "backup.pass", "audit.pass", "session"]
        );

        let all = settings::<VaultConfig>();
        let user = find(&all, "creds.user");
        assert_eq!(user.env_var, "DB_USER");
        assert!(!user.tags.contains_key("secret"));
        assert!(!find(&all, "audit.user").secret);
    }

    #[test]
    fn required_fields_are_listed() {
        let required: Vec<_> = required_fields::<RequiredConfig>()
            .into_iter()
            .map(|s| s.env_var)
            .collect();
        assert_eq!(required, vec!["API_KEY", "REGION"]);
    }

    #[test]
    fn custom_filter() {
        let with_defaults = filter_settings(settings::<AppConfig>(), |s| s.default.is_some());
        assert!(with_defaults.iter().all(|s| s.default.is_some()));
        assert_eq!(with_defaults.len(), 8);
    }

    #[test]
    fn serializes_for_reports() {
        let all = settings::<AppConfig>();
        let json = serde_json::to_value(find(&all, "name")).unwrap();
        assert_eq!(json["env_var"], "APP_NAME");
        assert_eq!(json["type_name"], "String");
    }
}
