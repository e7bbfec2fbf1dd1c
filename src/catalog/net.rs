use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

use super::ValueError;
use crate::registry::TypeInfo;
use crate::value::Value;

pub fn parse_ip(raw: &str) -> Result<IpAddr, ValueError> {
    raw.parse().map_err(|_| ValueError::Ip(raw.to_string()))
}

impl Value for IpAddr {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<IpAddr>("IpAddr")
    }

    fn is_zero(&self) -> bool {
        self.is_unspecified()
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::String(self.to_string())
    }
}

crate::text_value!(Ipv4Addr, |ip: &Ipv4Addr| ip.is_unspecified());
crate::text_value!(Ipv6Addr, |ip: &Ipv6Addr| ip.is_unspecified());
crate::text_value!(SocketAddr, |addr: &SocketAddr| addr.ip().is_unspecified()
    && addr.port() == 0);
crate::text_value!(uuid::Uuid, |id: &uuid::Uuid| id.is_nil());

/// An email address with an optional display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Mailbox {
    pub name: Option<String>,
    pub address: String,
}

impl Mailbox {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            name: None,
            address: address.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "\"{name}\" <{}>", self.address),
            None => f.write_str(&self.address),
        }
    }
}

impl FromStr for Mailbox {
    type Err = ValueError;

    /// Accepts `user@host` and `Name <user@host>`; exactly one address.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValueError::Mailbox {
            raw: raw.to_string(),
            reason: reason.to_string(),
        };

        let list = mailparse::addrparse(raw).map_err(|e| invalid(&e.to_string()))?;
        let single = list
            .extract_single_info()
            .ok_or_else(|| invalid("expected exactly one address"))?;

        match single.addr.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(invalid("missing @domain")),
        }

        Ok(Self {
            name: single.display_name.filter(|n| !n.is_empty()),
            address: single.addr,
        })
    }
}

pub fn parse_mailbox(raw: &str) -> Result<Mailbox, ValueError> {
    raw.parse()
}

impl Value for Mailbox {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<Mailbox>("Mailbox")
    }

    fn is_zero(&self) -> bool {
        self.address.is_empty() && self.name.is_none()
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::String(self.to_string())
    }
}
