//! Service and provider identities.
//!
//! Identities are process-unique, fully-qualified names in crate-path style
//! (e.g. `"app::search::Indexer"`). Equality is structural: two equal names
//! denote the same contract or implementation.

use std::fmt;

use serde::Serialize;

/// Identity of a service contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ServiceId(&'static str);

impl ServiceId {
    /// Create a service identity from its fully-qualified name.
    pub const fn from_name(name: &'static str) -> Self {
        Self(name)
    }

    /// The fully-qualified name of the contract.
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Identity of a concrete provider implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProviderId(&'static str);

impl ProviderId {
    /// Create a provider identity from its fully-qualified name.
    pub const fn from_name(name: &'static str) -> Self {
        Self(name)
    }

    /// The fully-qualified name of the implementation.
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A service contract: a trait object type with a stable identity.
///
/// Implemented for the *dyn type* of a contract trait. This binds the type
/// identity used for implementation checks during iteration to the string
/// identity used as a mapping key, replacing runtime introspection with an
/// explicit capability interface:
///
/// ```
/// use spi_core::{Service, ServiceId};
///
/// pub trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// impl Service for dyn Greeter {
///     const ID: ServiceId = ServiceId::from_name("example::Greeter");
/// }
/// ```
pub trait Service: 'static {
    /// Stable identity of this contract.
    const ID: ServiceId;
}
