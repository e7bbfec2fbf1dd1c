//! Parser registry and type dispatch.
//!
//! Resolving a raw string into a typed value goes through three tiers, in
//! this order:
//!
//! 1. **Explicit parsers**, keyed by exact [`TypeId`]. The value form `T` and
//!    the optional form `Option<T>` are separate entries.
//! 2. **Factories**, consulted in registration order. Each one inspects a
//!    [`TypeInfo`] and either claims the type by returning a [`Parser`] or
//!    passes. The first claim wins.
//! 3. **Scalar fallback** for primitives (see [`scalar`](crate::scalar)).
//!
//! Explicit entries shadow factories, so a type that also decodes itself from
//! text (such as [`url::Url`]) can still have a dedicated parser.
//!
//! # The process-wide registry
//!
//! [`global()`] holds the registry used by the free functions and by any
//! builder without an explicit [`registry()`](crate::EnvfigBuilder::registry).
//! Register parsers during start-up, before the first load. Registration
//! while another thread is loading is not ordered against that load.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, LazyLock, PoisonError, RwLock, RwLockReadGuard};

use crate::catalog;
use crate::error::{BoxError, DecodeTextError, DispatchError};
use crate::scalar::{self, ScalarKind};
use crate::value::Value;

/// A parser turns a raw string into a boxed value of one concrete type.
pub type Parser = Arc<dyn Fn(&str) -> Result<Box<dyn Any>, BoxError> + Send + Sync>;

/// A factory claims whole categories of types by returning a parser for them.
pub type Factory = Arc<dyn Fn(&TypeInfo) -> Option<Parser> + Send + Sync>;

/// Decoder built from a type's [`FromStr`] impl.
pub type TextDecoder = fn(&str) -> Result<Box<dyn Any>, BoxError>;

type Wrap = fn(Box<dyn Any>) -> Option<Box<dyn Any>>;

/// Runtime description of a target type, handed to factories and the scalar
/// fallback.
#[derive(Clone)]
pub struct TypeInfo {
    id: TypeId,
    name: String,
    kind: Kind,
    text: Option<TextDecoder>,
}

#[derive(Clone)]
pub enum Kind {
    Scalar(ScalarKind),
    /// `Vec<T>`; parsed element by element.
    Sequence(Box<TypeInfo>),
    /// `Option<T>`; the single-level pointer form of `T`.
    Optional { inner: Box<TypeInfo>, wrap: Wrap },
    /// Anything else: only explicit parsers or factories can handle it.
    Opaque,
}

impl TypeInfo {
    pub fn scalar<T: Any>(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::new::<T>(name, Kind::Scalar(kind))
    }

    pub fn opaque<T: Any>(name: impl Into<String>) -> Self {
        Self::new::<T>(name, Kind::Opaque)
    }

    /// A type with the text-decoding capability, backed by its [`FromStr`].
    pub fn text<T>(name: impl Into<String>) -> Self
    where
        T: FromStr + Any,
        T::Err: Into<BoxError>,
    {
        Self {
            text: Some(decode_text::<T>),
            ..Self::opaque::<T>(name)
        }
    }

    pub fn sequence<T: Value>() -> TypeInfo {
        let elem = T::type_info();
        Self::new::<Vec<T>>(format!("Vec<{}>", elem.name), Kind::Sequence(Box::new(elem)))
    }

    pub fn optional<T: Value>() -> TypeInfo {
        let inner = T::type_info();
        Self::new::<Option<T>>(
            format!("Option<{}>", inner.name),
            Kind::Optional {
                inner: Box::new(inner),
                wrap: wrap_some::<T>,
            },
        )
    }

    fn new<T: Any>(name: impl Into<String>, kind: Kind) -> Self {
        // `stringify!` output from macros carries spaces around `::` and `<`.
        let name: String = name.into().chars().filter(|c| !c.is_whitespace()).collect();
        Self {
            id: TypeId::of::<T>(),
            name,
            kind,
            text: None,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// The [`FromStr`]-backed decoder, if the type declared the capability.
    pub fn text_decoder(&self) -> Option<TextDecoder> {
        self.text
    }
}

impl std::fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeInfo").field("name", &self.name).finish()
    }
}

fn decode_text<T>(raw: &str) -> Result<Box<dyn Any>, BoxError>
where
    T: FromStr + Any,
    T::Err: Into<BoxError>,
{
    raw.parse::<T>()
        .map(|v| Box::new(v) as Box<dyn Any>)
        .map_err(Into::into)
}

fn wrap_some<T: Any>(value: Box<dyn Any>) -> Option<Box<dyn Any>> {
    value
        .downcast::<T>()
        .ok()
        .map(|v| Box::new(Some(*v)) as Box<dyn Any>)
}

/// Table of explicit parsers plus the ordered factory list.
#[derive(Clone)]
pub struct Registry {
    parsers: HashMap<TypeId, Parser>,
    factories: Vec<Factory>,
}

impl Registry {
    /// A registry with the text-decoding factory and the full value catalog.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        catalog::install(&mut registry);
        registry
    }

    /// A registry with no parsers and no factories: only scalars resolve.
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
            factories: Vec::new(),
        }
    }

    /// Set the explicit parser for `T`, replacing any earlier one.
    pub fn register<T, E, F>(&mut self, parse: F)
    where
        T: Any,
        E: Into<BoxError>,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    {
        let parser: Parser = Arc::new(move |raw: &str| -> Result<Box<dyn Any>, BoxError> {
            parse(raw)
                .map(|v| Box::new(v) as Box<dyn Any>)
                .map_err(Into::into)
        });
        self.parsers.insert(TypeId::of::<T>(), parser);
    }

    /// Register `parse` for both `T` and `Option<T>`.
    pub fn register_with_optional<T, E, F>(&mut self, parse: F)
    where
        T: Any,
        E: Into<BoxError>,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    {
        let parse = Arc::new(parse);
        let inner = Arc::clone(&parse);
        self.register(move |raw: &str| inner(raw).map(Some));
        self.register(move |raw: &str| parse(raw));
    }

    /// Append a factory. Factories are tried in registration order.
    pub fn register_factory<F>(&mut self, factory: F)
    where
        F: Fn(&TypeInfo) -> Option<Parser> + Send + Sync + 'static,
    {
        self.factories.push(Arc::new(factory));
    }

    /// Whether any tier would claim this type.
    pub fn supports(&self, info: &TypeInfo) -> bool {
        self.parsers.contains_key(&info.id)
            || self.factories.iter().any(|factory| factory(info).is_some())
            || scalar_kind(info).is_some()
    }

    /// Resolve `raw` for the type described by `info`.
    pub fn parse(&self, raw: &str, info: &TypeInfo) -> Result<Box<dyn Any>, DispatchError> {
        if let Some(parser) = self.parsers.get(&info.id) {
            return parser(raw).map_err(DispatchError::Invalid);
        }

        for factory in &self.factories {
            if let Some(parser) = factory(info) {
                return parser(raw).map_err(DispatchError::Invalid);
            }
        }

        parse_scalar(raw, info)
    }

    /// Resolve `raw` into a `T`.
    pub fn dispatch<T: Value>(&self, raw: &str) -> Result<T, DispatchError> {
        let info = T::type_info();
        let value = self.parse(raw, &info)?;
        value.downcast::<T>().map(|v| *v).map_err(|_| {
            DispatchError::Invalid(
                format!("parser for {} produced a value of another type", info.name).into(),
            )
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn scalar_kind(info: &TypeInfo) -> Option<ScalarKind> {
    match &info.kind {
        Kind::Scalar(kind) => Some(*kind),
        Kind::Optional { inner, .. } => match inner.kind {
            Kind::Scalar(kind) => Some(kind),
            _ => None,
        },
        _ => None,
    }
}

fn parse_scalar(raw: &str, info: &TypeInfo) -> Result<Box<dyn Any>, DispatchError> {
    let invalid = |e: scalar::ScalarError| DispatchError::Invalid(e.into());
    match &info.kind {
        Kind::Scalar(kind) => scalar::parse(raw, *kind).map_err(invalid),
        Kind::Optional { inner, wrap } => match inner.kind {
            Kind::Scalar(kind) => {
                let value = scalar::parse(raw, kind).map_err(invalid)?;
                wrap(value).ok_or_else(|| DispatchError::Unsupported(info.name.clone()))
            }
            _ => Err(DispatchError::Unsupported(info.name.clone())),
        },
        _ => Err(DispatchError::Unsupported(info.name.clone())),
    }
}

/// The capability factory: claims every type that declared a text decoder,
/// in value form or in `Option` form.
pub fn text_factory(info: &TypeInfo) -> Option<Parser> {
    if let Some(decode) = info.text {
        return Some(Arc::new(move |raw: &str| -> Result<Box<dyn Any>, BoxError> {
            decode(raw).map_err(|e| Box::new(DecodeTextError(e)) as BoxError)
        }));
    }

    if let Kind::Optional { inner, wrap } = &info.kind
        && let Some(decode) = inner.text
    {
        let wrap = *wrap;
        let name = info.name.clone();
        return Some(Arc::new(move |raw: &str| -> Result<Box<dyn Any>, BoxError> {
            let value = decode(raw).map_err(|e| Box::new(DecodeTextError(e)) as BoxError)?;
            wrap(value).ok_or_else(|| format!("decoded value does not fit {name}").into())
        }));
    }

    None
}

static GLOBAL: LazyLock<RwLock<Registry>> = LazyLock::new(|| RwLock::new(Registry::new()));

/// Read access to the process-wide registry.
pub fn global() -> RwLockReadGuard<'static, Registry> {
    GLOBAL.read().unwrap_or_else(PoisonError::into_inner)
}

/// Register an explicit parser on the process-wide registry.
///
/// Call during start-up, before any load that needs it.
pub fn register_parser<T, E, F>(parse: F)
where
    T: Any,
    E: Into<BoxError>,
    F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
{
    GLOBAL
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(parse);
}

/// Append a factory to the process-wide registry.
///
/// Call during start-up, before any load that needs it.
pub fn register_parser_factory<F>(factory: F)
where
    F: Fn(&TypeInfo) -> Option<Parser> + Send + Sync + 'static,
{
    GLOBAL
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register_factory(factory);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Celsius(f64);

    impl FromStr for Celsius {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            let number = s.strip_suffix("C").ok_or_else(|| format!("{s:?} lacks a C suffix"))?;
            number.parse().map(Celsius).map_err(|e| format!("{e}"))
        }
    }

    impl std::fmt::Display for Celsius {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}C", self.0)
        }
    }

    crate::text_value!(Celsius);

    #[test]
    fn empty_registry_resolves_scalars_only() {
        let registry = Registry::empty();
        assert_eq!(registry.dispatch::<u16>("8080").unwrap(), 8080);
        assert!(matches!(
            registry.dispatch::<Celsius>("21C"),
            Err(DispatchError::Unsupported(_))
        ));
    }

    #[test]
    fn text_factory_decodes_value_and_optional_forms() {
        let mut registry = Registry::empty();
        registry.register_factory(text_factory);
        assert_eq!(registry.dispatch::<Celsius>("21C").unwrap(), Celsius(21.0));
        assert_eq!(
            registry.dispatch::<Option<Celsius>>("-3C").unwrap(),
            Some(Celsius(-3.0))
        );
    }

    #[test]
    fn text_factory_wraps_decode_errors() {
        let mut registry = Registry::empty();
        registry.register_factory(text_factory);
        let err = registry.dispatch::<Celsius>("21F").unwrap_err();
        assert!(err.to_string().starts_with("failed to decode text:"));
    }

    #[test]
    fn explicit_parser_shadows_factory() {
        let mut registry = Registry::empty();
        registry.register_factory(text_factory);
        registry.register(|raw: &str| -> Result<Celsius, BoxError> {
            Ok(Celsius(raw.trim_end_matches('F').parse::<f64>()? - 32.0))
        });
        assert_eq!(registry.dispatch::<Celsius>("32F").unwrap(), Celsius(0.0));
    }

    #[test]
    fn value_and_optional_forms_are_separate_entries() {
        let mut registry = Registry::empty();
        registry.register(|_: &str| Ok::<_, BoxError>(Celsius(1.0)));
        assert_eq!(registry.dispatch::<Celsius>("x").unwrap(), Celsius(1.0));
        assert!(matches!(
            registry.dispatch::<Option<Celsius>>("x"),
            Err(DispatchError::Unsupported(_))
        ));
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let mut registry = Registry::empty();
        registry.register(|_: &str| Ok::<_, BoxError>(Celsius(1.0)));
        registry.register(|_: &str| Ok::<_, BoxError>(Celsius(2.0)));
        assert_eq!(registry.dispatch::<Celsius>("x").unwrap(), Celsius(2.0));
    }

    #[test]
    fn first_claiming_factory_wins() {
        fn fixed(value: f64) -> impl Fn(&TypeInfo) -> Option<Parser> + Send + Sync {
            move |info: &TypeInfo| {
                (info.id() == TypeId::of::<Celsius>()).then(|| {
                    Arc::new(move |_: &str| Ok::<_, BoxError>(Box::new(Celsius(value)) as Box<dyn Any>))
                        as Parser
                })
            }
        }
        let mut registry = Registry::empty();
        registry.register_factory(|_| None);
        registry.register_factory(fixed(1.0));
        registry.register_factory(fixed(2.0));
        assert_eq!(registry.dispatch::<Celsius>("x").unwrap(), Celsius(1.0));
    }

    #[test]
    fn mistyped_factory_output_is_reported() {
        let mut registry = Registry::empty();
        registry.register_factory(|_| {
            Some(Arc::new(|_: &str| Ok::<_, BoxError>(Box::new(1u8) as Box<dyn Any>)) as Parser)
        });
        let err = registry.dispatch::<Celsius>("x").unwrap_err();
        assert!(err.to_string().contains("another type"));
    }

    #[test]
    fn optional_scalar_uses_fallback() {
        let registry = Registry::empty();
        assert_eq!(registry.dispatch::<Option<u32>>("7").unwrap(), Some(7));
        assert!(registry.dispatch::<Option<u32>>("x").is_err());
    }

    #[test]
    fn supports_reflects_every_tier() {
        let registry = Registry::new();
        assert!(registry.supports(&u8::type_info()));
        assert!(registry.supports(&url::Url::type_info()));
        assert!(registry.supports(&Ipv4Addr::type_info()));
        assert!(!Registry::empty().supports(&Ipv4Addr::type_info()));
    }

    #[test]
    fn type_names_are_compact() {
        assert_eq!(Celsius::type_info().name(), "Celsius");
        assert_eq!(<Vec<Option<u8>>>::type_info().name(), "Vec<Option<u8>>");
    }
}
