//! Tests for the provider registry: registration preconditions, the
//! compiled/runtime merge rule, and crystallization.

use std::sync::{Arc, RwLock};

use spi_core::requirement::Requirement;
use spi_core::{
    CompiledMapping, ProviderId, Registry, Service, ServiceId, TableMapping,
};

use crate::fixtures::*;

/// Compiled mapping whose contents can be replaced mid-test.
struct SwappableMapping(RwLock<TableMapping>);

impl SwappableMapping {
    fn new(mapping: TableMapping) -> Self {
        Self(RwLock::new(mapping))
    }

    fn replace(&self, mapping: TableMapping) {
        *self.0.write().unwrap() = mapping;
    }
}

impl CompiledMapping for SwappableMapping {
    fn version(&self) -> u32 {
        self.0.read().unwrap().version()
    }

    fn providers(&self, service: ServiceId) -> Vec<ProviderId> {
        self.0.read().unwrap().providers(service)
    }
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn unregistered_service_has_no_providers() {
    let registry = fixture_registry();
    assert!(registry.providers(<dyn Greeter as Service>::ID).is_empty());
}

#[test]
fn register_preserves_registration_order() {
    let registry = fixture_registry();
    assert!(registry.register(<dyn Greeter as Service>::ID, ENGLISH));
    assert!(registry.register(<dyn Greeter as Service>::ID, SPANISH));

    assert_eq!(
        registry.providers(<dyn Greeter as Service>::ID),
        vec![ENGLISH, SPANISH]
    );
}

#[test]
fn register_is_idempotent_on_identity() {
    let registry = fixture_registry();
    assert!(registry.register(<dyn Greeter as Service>::ID, ENGLISH));
    assert!(registry.register(<dyn Greeter as Service>::ID, SPANISH));
    assert!(registry.register(<dyn Greeter as Service>::ID, SPANISH));

    assert_eq!(
        registry.providers(<dyn Greeter as Service>::ID),
        vec![ENGLISH, SPANISH]
    );
}

#[test]
fn registrations_for_other_services_stay_separate() {
    let registry = fixture_registry();
    assert!(registry.register(<dyn Greeter as Service>::ID, ENGLISH));
    assert!(registry.register(<dyn Codec as Service>::ID, NOOP_CODEC));

    assert_eq!(
        registry.providers(<dyn Greeter as Service>::ID),
        vec![ENGLISH]
    );
    assert_eq!(
        registry.providers(<dyn Codec as Service>::ID),
        vec![NOOP_CODEC]
    );
}

#[test]
fn register_rejects_unresolvable_service() {
    let registry = fixture_registry();
    let unknown = ServiceId::from_name("fixtures::Unknown");

    assert!(!registry.register(unknown, ENGLISH));
    assert!(registry.providers(unknown).is_empty());
}

#[test]
fn register_rejects_unresolvable_provider() {
    let registry = fixture_registry();

    assert!(!registry.register(<dyn Greeter as Service>::ID, GHOST));
    assert!(registry.providers(<dyn Greeter as Service>::ID).is_empty());
}

#[test]
fn register_rejects_unsatisfied_requirements_and_reevaluates_per_attempt() {
    static GATE: Gate = Gate::closed();
    static REQUIREMENTS: [&dyn Requirement; 1] = [&GATE];

    let catalog = fixture_catalog();
    catalog.define_provider(greeter_descriptor(GATED, construct_english, &REQUIREMENTS));
    let registry = Arc::new(Registry::new(catalog));

    assert!(!registry.register(<dyn Greeter as Service>::ID, GATED));
    assert!(registry.providers(<dyn Greeter as Service>::ID).is_empty());

    // Requirements are evaluated per attempt, so a later registration
    // observes the change.
    GATE.open();
    assert!(registry.register(<dyn Greeter as Service>::ID, GATED));
    assert_eq!(
        registry.providers(<dyn Greeter as Service>::ID),
        vec![GATED]
    );
}

// ============================================================================
// Compiled/runtime merge
// ============================================================================

#[test]
fn compiled_entries_serve_services_with_no_runtime_entry() {
    let compiled = TableMapping::new().with(<dyn Greeter as Service>::ID, ENGLISH);
    let registry = fixture_registry_with(Arc::new(compiled));

    assert_eq!(
        registry.providers(<dyn Greeter as Service>::ID),
        vec![ENGLISH]
    );
}

#[test]
fn version_mismatch_is_treated_as_an_empty_mapping() {
    let compiled = TableMapping::with_version(2).with(<dyn Greeter as Service>::ID, ENGLISH);
    let registry = fixture_registry_with(Arc::new(compiled));

    assert!(registry.providers(<dyn Greeter as Service>::ID).is_empty());

    // Registration starts from an empty base, not the untrusted mapping.
    assert!(registry.register(<dyn Greeter as Service>::ID, SPANISH));
    assert_eq!(
        registry.providers(<dyn Greeter as Service>::ID),
        vec![SPANISH]
    );
}

#[test]
fn runtime_registrations_append_after_compiled_entries() {
    let compiled = TableMapping::new().with(<dyn Greeter as Service>::ID, ENGLISH);
    let registry = fixture_registry_with(Arc::new(compiled));

    assert!(registry.register(<dyn Greeter as Service>::ID, SPANISH));
    assert_eq!(
        registry.providers(<dyn Greeter as Service>::ID),
        vec![ENGLISH, SPANISH]
    );
}

#[test]
fn registering_a_compiled_provider_is_idempotent() {
    let compiled = TableMapping::new().with(<dyn Greeter as Service>::ID, ENGLISH);
    let registry = fixture_registry_with(Arc::new(compiled));

    assert!(registry.register(<dyn Greeter as Service>::ID, ENGLISH));
    assert_eq!(
        registry.providers(<dyn Greeter as Service>::ID),
        vec![ENGLISH]
    );
}

#[test]
fn duplicate_compiled_entries_are_suppressed() {
    let compiled = TableMapping::new()
        .with(<dyn Greeter as Service>::ID, ENGLISH)
        .with(<dyn Greeter as Service>::ID, ENGLISH);
    let registry = fixture_registry_with(Arc::new(compiled));

    assert_eq!(
        registry.providers(<dyn Greeter as Service>::ID),
        vec![ENGLISH]
    );
}

#[test]
fn first_registration_crystallizes_the_compiled_contribution() {
    let mapping = Arc::new(SwappableMapping::new(
        TableMapping::new()
            .with(<dyn Greeter as Service>::ID, ENGLISH)
            .with(<dyn Codec as Service>::ID, NOOP_CODEC),
    ));
    let registry = fixture_registry_with(mapping.clone());

    assert!(registry.register(<dyn Greeter as Service>::ID, SPANISH));

    // The greeter entry was copied into the runtime table; wiping the
    // compiled mapping no longer affects it. The codec entry was never
    // registered against, so it still reads through.
    mapping.replace(TableMapping::new());
    assert_eq!(
        registry.providers(<dyn Greeter as Service>::ID),
        vec![ENGLISH, SPANISH]
    );
    assert!(registry.providers(<dyn Codec as Service>::ID).is_empty());
}
