//! Interned identifiers for canvas entities.
//!
//! Node and container ids are compared constantly while resolving connections
//! and projecting them onto scopes, so they are interned once and handled as
//! copyable symbols afterwards. Serialized, an [`Id`] is a plain string.

use std::{
    convert::Infallible,
    fmt,
    sync::{Mutex, MutexGuard, OnceLock, PoisonError},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global append-only interner. Interning order never influences layout.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Interned identifier of a node or container.
///
/// # Examples
///
/// ```
/// use foundry_core::identifier::Id;
///
/// let ingest = Id::new("ingest");
/// assert_eq!(ingest, "ingest");
/// assert_eq!(ingest, Id::new("ingest"));
/// assert_eq!(ingest.to_string(), "ingest");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `name` and returns its identifier.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Returns true when the identifier is empty or only whitespace.
    pub fn is_blank(self) -> bool {
        interner()
            .resolve(self.0)
            .is_none_or(|name| name.trim().is_empty())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = interner().resolve(self.0).unwrap_or_default().to_owned();
        f.write_str(&name)
    }
}

impl std::str::FromStr for Id {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        interner().resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}
