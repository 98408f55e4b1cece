//! Tests for the built-in capability requirement and its effect on
//! registration.

use std::sync::Arc;

use semver::Version;
use spi_core::requirement::{
    capability_version, declare_capability, CapabilityConstraint, Requirement,
};
use spi_core::{Registry, Service};

use crate::fixtures::*;

#[test]
fn declared_capabilities_report_their_version() {
    declare_capability("req-int-imaging", Version::new(3, 1, 4));
    assert_eq!(
        capability_version("req-int-imaging"),
        Some(Version::new(3, 1, 4))
    );
    assert_eq!(capability_version("req-int-never-declared"), None);
}

#[test]
fn satisfied_capability_constraint_admits_registration() {
    static NEEDS_STORAGE: CapabilityConstraint =
        CapabilityConstraint::new("req-int-storage", "^1.2");
    static REQUIREMENTS: [&dyn Requirement; 1] = [&NEEDS_STORAGE];

    declare_capability("req-int-storage", Version::new(1, 4, 0));

    let catalog = fixture_catalog();
    catalog.define_provider(greeter_descriptor(GATED, construct_english, &REQUIREMENTS));
    let registry = Arc::new(Registry::new(catalog));

    assert!(registry.register(<dyn Greeter as Service>::ID, GATED));
}

#[test]
fn unsatisfied_capability_constraint_rejects_registration() {
    static NEEDS_V2: CapabilityConstraint = CapabilityConstraint::new("req-int-queue", ">=2");
    static REQUIREMENTS: [&dyn Requirement; 1] = [&NEEDS_V2];

    declare_capability("req-int-queue", Version::new(1, 0, 0));

    let catalog = fixture_catalog();
    catalog.define_provider(greeter_descriptor(GATED, construct_english, &REQUIREMENTS));
    let registry = Arc::new(Registry::new(catalog));

    assert!(!registry.register(<dyn Greeter as Service>::ID, GATED));
    assert!(registry.providers(<dyn Greeter as Service>::ID).is_empty());
}

#[test]
fn capability_declared_between_attempts_is_observed() {
    static NEEDS_SEARCH: CapabilityConstraint = CapabilityConstraint::new("req-int-search", "*");
    static REQUIREMENTS: [&dyn Requirement; 1] = [&NEEDS_SEARCH];

    let catalog = fixture_catalog();
    catalog.define_provider(greeter_descriptor(GATED, construct_english, &REQUIREMENTS));
    let registry = Arc::new(Registry::new(catalog));

    assert!(!registry.register(<dyn Greeter as Service>::ID, GATED));

    declare_capability("req-int-search", Version::new(0, 3, 0));
    assert!(registry.register(<dyn Greeter as Service>::ID, GATED));
}

#[test]
fn unparsable_constraint_is_never_satisfied() {
    declare_capability("req-int-cache", Version::new(1, 0, 0));
    assert!(!CapabilityConstraint::new("req-int-cache", "one point oh").is_satisfied());
}
