//! Rich value types understood out of the box.
//!
//! [`install`] puts the text-decoding factory first in the factory list and
//! registers explicit parsers, in value and `Option` form, for every type
//! below. Explicit parsers take precedence over the factory, so a type like
//! [`url::Url`] goes through its dedicated parser even though it also
//! implements `FromStr`.
//!
//! | Type | Accepted input |
//! |------|----------------|
//! | `std::time::Duration` | `30s`, `1h 15m`, `250ms` |
//! | `chrono::DateTime<Utc>` | RFC 3339, else Unix seconds |
//! | `url::Url` | absolute URL |
//! | `tracing::Level` | `trace`..`error` (any case), `warning`, or an integer (`-4` debug, `0` info, `4` warn, `8` error) |
//! | `num_bigint::BigInt` | base-10 integer of any size |
//! | `rust_decimal::Decimal` | `12.50`, `1.5e3` |
//! | `std::net::IpAddr` | IPv4 or IPv6 |
//! | [`Mailbox`] | `ops@example.com`, `Ops <ops@example.com>` |
//! | [`Quantity`] | `500m`, `2Gi`, `1.5k`, `1e3` |
//! | `rsa::RsaPrivateKey` | PEM, PKCS#1 or PKCS#8 |
//! | `p256::ecdsa::SigningKey` | PEM, SEC1 or PKCS#8 |
//! | [`Expression`] | an expression that compiles |
//!
//! `uuid::Uuid`, `Ipv4Addr`, `Ipv6Addr` and `SocketAddr` are handled by the
//! text-decoding factory alone.

use thiserror::Error;

use crate::registry::{self, Registry};

mod expr;
mod keys;
mod level;
mod locator;
mod net;
mod number;
mod quantity;
mod time;

pub use expr::Expression;
pub use locator::redact_url;
pub use net::Mailbox;
pub use quantity::Quantity;

/// Parse failures of the catalog types.
#[derive(Debug, Error)]
pub enum ValueError {
    #[error("invalid duration {raw:?}: {source}")]
    Duration {
        raw: String,
        source: humantime::DurationError,
    },

    #[error("invalid time {0:?}: must be RFC 3339 or Unix seconds")]
    Timestamp(String),

    #[error("invalid URL {raw:?}: {source}")]
    Url {
        raw: String,
        source: url::ParseError,
    },

    #[error("invalid log level {0:?}: must be trace|debug|info|warn|error or an integer")]
    Level(String),

    #[error("invalid big integer {0:?}: must be base-10")]
    BigInt(String),

    #[error("invalid decimal {raw:?}: {source}")]
    Decimal {
        raw: String,
        source: rust_decimal::Error,
    },

    #[error("invalid IP address {0:?}")]
    Ip(String),

    #[error("invalid email address {raw:?}: {reason}")]
    Mailbox { raw: String, reason: String },

    #[error("invalid quantity {raw:?}: {reason}")]
    Quantity { raw: String, reason: &'static str },

    #[error("invalid PEM format for {0} private key")]
    Pem(&'static str),

    #[error("unsupported PEM block type for {family} private key: {tag}")]
    PemTag { family: &'static str, tag: String },

    #[error("failed to parse {family} private key: {reason}")]
    Key {
        family: &'static str,
        reason: String,
    },

    #[error("PKCS#8 key is not an {0} private key")]
    WrongFamily(&'static str),

    #[error("failed to compile expression {raw:?}: {reason}")]
    Expression { raw: String, reason: String },
}

/// Install the text-decoding factory and the catalog parsers.
pub fn install(registry: &mut Registry) {
    registry.register_factory(registry::text_factory);

    registry.register_with_optional(time::parse_duration);
    registry.register_with_optional(time::parse_timestamp);
    registry.register_with_optional(locator::parse_url);
    registry.register_with_optional(level::parse_level);
    registry.register_with_optional(number::parse_bigint);
    registry.register_with_optional(number::parse_decimal);
    registry.register_with_optional(net::parse_ip);
    registry.register_with_optional(net::parse_mailbox);
    registry.register_with_optional(quantity::parse_quantity);
    registry.register_with_optional(keys::parse_rsa_key);
    registry.register_with_optional(keys::parse_ecdsa_key);
    registry.register_with_optional(expr::parse_expression);
}
