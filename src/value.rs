//! Leaf field types.
//!
//! Every field that is populated from a single raw string implements
//! [`Value`]: primitives, `String`, `Vec<T>` (comma-separated), `Option<T>`
//! (the pointer form of `T`), the rich types in [`catalog`](crate::catalog),
//! and any type opted in with [`text_value!`](crate::text_value).

use std::any::Any;

use crate::error::DispatchError;
use crate::registry::{Registry, TypeInfo};
use crate::render::{self, SECRET_MARKER};
use crate::scalar::ScalarKind;
use crate::walk::split_csv;

pub trait Value: Any + Sized {
    /// `true` for `Vec<T>`: an explicitly empty raw string clears the field
    /// instead of being skipped.
    const SEQUENCE: bool = false;

    fn type_info() -> TypeInfo;

    /// Whether the field still holds its type's zero value. Defaults only
    /// apply to zero fields.
    fn is_zero(&self) -> bool;

    /// Rendering for a non-secret field.
    fn snapshot(&self) -> serde_json::Value;

    /// Rendering for a secret field.
    fn masked(&self) -> serde_json::Value {
        serde_json::Value::String(SECRET_MARKER.to_string())
    }

    /// Parse `raw` and store the result in `self`.
    fn assign(&mut self, raw: &str, registry: &Registry) -> Result<(), DispatchError> {
        *self = registry.dispatch::<Self>(raw)?;
        Ok(())
    }
}

macro_rules! scalar_value {
    ($($ty:ty => $kind:ident),* $(,)?) => {$(
        impl Value for $ty {
            fn type_info() -> TypeInfo {
                TypeInfo::scalar::<$ty>(stringify!($ty), ScalarKind::$kind)
            }

            fn is_zero(&self) -> bool {
                *self == <$ty>::default()
            }

            fn snapshot(&self) -> serde_json::Value {
                serde_json::Value::from(*self)
            }
        }
    )*};
}

scalar_value! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
}

impl Value for String {
    fn type_info() -> TypeInfo {
        TypeInfo::scalar::<String>("String", ScalarKind::Str)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::String(self.clone())
    }

    fn masked(&self) -> serde_json::Value {
        serde_json::Value::String(render::mask(self))
    }
}

impl<T: Value> Value for Vec<T> {
    const SEQUENCE: bool = true;

    fn type_info() -> TypeInfo {
        TypeInfo::sequence::<T>()
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Array(self.iter().map(Value::snapshot).collect())
    }

    fn masked(&self) -> serde_json::Value {
        serde_json::Value::Array(self.iter().map(Value::masked).collect())
    }

    fn assign(&mut self, raw: &str, registry: &Registry) -> Result<(), DispatchError> {
        let items = split_csv(raw)
            .map(|part| registry.dispatch::<T>(part))
            .collect::<Result<Vec<_>, _>>()?;
        *self = items;
        Ok(())
    }
}

/// A secret `Option` masks to the opaque marker whether set or not, even
/// around a `String`.
impl<T: Value> Value for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::optional::<T>()
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn snapshot(&self) -> serde_json::Value {
        self.as_ref()
            .map_or(serde_json::Value::Null, Value::snapshot)
    }
}

/// Implement [`Value`] for a type that decodes itself from text.
///
/// The type needs [`FromStr`](std::str::FromStr) (with an error convertible
/// into a boxed error) and [`Display`](std::fmt::Display). The registry's
/// text-decoding factory picks it up in both value and `Option` form; no
/// parser registration is needed.
///
/// The one-argument form treats `Default::default()` as the zero value. Pass
/// a predicate for types without `Default`:
///
/// ```ignore
/// envfig::text_value!(Region);
/// envfig::text_value!(Endpoint, |e: &Endpoint| e.is_unset());
/// ```
#[macro_export]
macro_rules! text_value {
    ($ty:ty) => {
        $crate::text_value!($ty, |v: &$ty| *v == <$ty as ::std::default::Default>::default());
    };
    ($ty:ty, $is_zero:expr) => {
        impl $crate::Value for $ty {
            fn type_info() -> $crate::TypeInfo {
                $crate::TypeInfo::text::<$ty>(stringify!($ty))
            }

            fn is_zero(&self) -> bool {
                ($is_zero)(self)
            }

            fn snapshot(&self) -> $crate::serde_json::Value {
                $crate::serde_json::Value::String(::std::string::ToString::to_string(self))
            }
        }
    };
}
