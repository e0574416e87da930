// ── Entity identity ──
//
// The platform addresses records two ways: a UUID primary key and a
// human-readable registry code (`HH-23-0104.7712`, `GRV-0042-23`).
// EntityId unifies both behind one type so lookups accept either.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Canonical identifier for any registry record.
///
/// Transparently wraps either the UUID primary key or the registry code.
/// Serializes untagged, so it reads and writes as a plain string/uuid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Uuid(Uuid),
    Code(String),
}

impl EntityId {
    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(u) => Some(u),
            Self::Code(_) => None,
        }
    }

    pub fn as_code(&self) -> Option<&str> {
        match self {
            Self::Code(s) => Some(s),
            Self::Uuid(_) => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Code(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<Uuid> for EntityId {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        match Uuid::parse_str(&s) {
            Ok(u) => Self::Uuid(u),
            Err(_) => Self::Code(s),
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn from_uuid_string() {
        let id = EntityId::from("550e8400-e29b-41d4-a716-446655440000");
        assert!(id.as_uuid().is_some());
    }

    #[test]
    fn from_registry_code() {
        let id = EntityId::from("HH-23-0104.7712");
        assert_eq!(id.as_code(), Some("HH-23-0104.7712"));
    }

    #[test]
    fn display_round_trips_code() {
        let id: EntityId = "GRV-0042-23".parse().unwrap();
        assert_eq!(id.to_string(), "GRV-0042-23");
    }
}
