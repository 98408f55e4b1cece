//! Provider requirements.
//!
//! A requirement is a capability predicate attached to a provider
//! descriptor. The registry evaluates every requirement once per
//! registration attempt and rejects the registration if any of them does
//! not hold. Outcomes are never memoized: if a requirement changes over the
//! process lifetime, only future `register` calls observe the change;
//! existing registry entries are unaffected.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use semver::{Version, VersionReq};
use tracing::warn;

/// A capability predicate attached to a provider.
pub trait Requirement: Send + Sync {
    /// Whether the requirement currently holds.
    fn is_satisfied(&self) -> bool;
}

static CAPABILITIES: LazyLock<RwLock<HashMap<&'static str, Version>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Declare a host capability and the version it is present at.
///
/// Later declarations for the same name replace earlier ones. Capability
/// declarations live for the process lifetime.
pub fn declare_capability(name: &'static str, version: Version) {
    CAPABILITIES
        .write()
        .expect("lock poisoned")
        .insert(name, version);
}

/// Reported version of a declared host capability, if any.
pub fn capability_version(name: &str) -> Option<Version> {
    CAPABILITIES
        .read()
        .expect("lock poisoned")
        .get(name)
        .cloned()
}

/// Built-in requirement: a named host capability must be declared and its
/// reported version must satisfy a semver range.
///
/// The range syntax and matching are those of [`semver::VersionReq`]; an
/// unparsable range is never satisfied.
///
/// ```
/// use semver::Version;
/// use spi_core::requirement::{declare_capability, CapabilityConstraint, Requirement};
///
/// declare_capability("codec-json", Version::new(2, 1, 0));
///
/// assert!(CapabilityConstraint::new("codec-json", ">=2").is_satisfied());
/// assert!(!CapabilityConstraint::new("codec-json", "^3").is_satisfied());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CapabilityConstraint {
    capability: &'static str,
    constraint: &'static str,
}

impl CapabilityConstraint {
    /// New constraint over a named capability.
    pub const fn new(capability: &'static str, constraint: &'static str) -> Self {
        Self {
            capability,
            constraint,
        }
    }

    /// Name of the required capability.
    pub const fn capability(&self) -> &'static str {
        self.capability
    }

    /// The semver range the capability's version must satisfy.
    pub const fn constraint(&self) -> &'static str {
        self.constraint
    }
}

impl Requirement for CapabilityConstraint {
    fn is_satisfied(&self) -> bool {
        let requirement = match VersionReq::parse(self.constraint) {
            Ok(requirement) => requirement,
            Err(error) => {
                warn!(
                    capability = self.capability,
                    constraint = self.constraint,
                    %error,
                    "unparsable capability constraint"
                );
                return false;
            }
        };
        match capability_version(self.capability) {
            Some(version) => requirement.matches(&version),
            None => false,
        }
    }
}
