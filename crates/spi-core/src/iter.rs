//! Provider iteration: the lazy construct-validate-cache cursor.
//!
//! ## Slot state machine
//!
//! ```text
//!               construction succeeds
//! Unvisited ──────────────────────────────▶ Cached(instance)
//!     │                                          ▲
//!     │ pessimistic mark before                  │ overwrites the mark
//!     ▼ construction is attempted                │
//! Invalid(error) ────────────────────────────────┘
//! ```
//!
//! A slot is marked `Invalid` *before* its constructor runs; a successful
//! construction overwrites the mark with `Cached`. The first encounter of
//! a bad slot surfaces its error exactly once. Because the mark is already
//! in place when the error propagates, every later traversal over the same
//! cache - the same iterator after the error, a new iterator from the same
//! loader, or a [`restart`](ProviderIterator::restart) - skips the slot
//! silently and the remaining valid providers stay reachable.

use std::any::TypeId;
use std::sync::Arc;

use tracing::warn;

use crate::catalog::Catalog;
use crate::error::{ConfigurationError, Result};
use crate::id::{ProviderId, Service, ServiceId};
use crate::loader::{InstanceCache, Slot};

/// Stateful cursor over a service loader's provider snapshot.
///
/// Obtained from [`ServiceLoader::iter`](crate::ServiceLoader::iter).
/// Implements [`Iterator`] with `Result` items: a configuration error is
/// yielded in-stream exactly once and iteration continues past it.
pub struct ProviderIterator<S: ?Sized> {
    catalog: Arc<Catalog>,
    service: ServiceId,
    providers: Arc<[ProviderId]>,
    cache: Arc<InstanceCache<S>>,
    index: usize,
}

impl<S> ProviderIterator<S>
where
    S: Service + ?Sized + Send + Sync,
{
    pub(crate) fn new(
        catalog: Arc<Catalog>,
        service: ServiceId,
        providers: Arc<[ProviderId]>,
        cache: Arc<InstanceCache<S>>,
    ) -> Self {
        let mut iterator = Self {
            catalog,
            service,
            providers,
            cache,
            index: 0,
        };
        iterator.skip_invalid();
        iterator
    }

    /// Provider identity at the cursor, or `None` when exhausted.
    pub fn key(&self) -> Option<ProviderId> {
        self.providers.get(self.index).copied()
    }

    /// Instance at the cursor, or `Ok(None)` when exhausted.
    ///
    /// Constructs and validates the slot on the first visit and caches the
    /// outcome; afterwards returns the shared cached instance. A slot that
    /// fails validation or construction is permanently invalidated and the
    /// error is returned.
    pub fn current(&self) -> Result<Option<Arc<S>>> {
        let Some(provider) = self.key() else {
            return Ok(None);
        };
        let mut slot = self.cache.lock(self.index);
        match &*slot {
            Slot::Cached(instance) => Ok(Some(Arc::clone(instance))),
            // Reachable only when another iterator invalidated the slot
            // after this cursor stopped on it: re-report, never retry.
            Slot::Invalid(error) => Err(error.clone()),
            Slot::Unvisited => {
                // Pessimistic mark: if the constructor unwinds, the slot
                // must never be left retryable. Overwritten below with the
                // real outcome.
                *slot = Slot::Invalid(ConfigurationError::construction(
                    self.service,
                    provider,
                    "provider construction did not complete",
                ));
                match self.construct(provider) {
                    Ok(instance) => {
                        *slot = Slot::Cached(Arc::clone(&instance));
                        Ok(Some(instance))
                    }
                    Err(error) => {
                        warn!(
                            service = %self.service,
                            %provider,
                            %error,
                            "invalidated service provider slot"
                        );
                        *slot = Slot::Invalid(error.clone());
                        Err(error)
                    }
                }
            }
        }
    }

    /// Move the cursor forward, skipping slots already invalidated.
    pub fn advance(&mut self) {
        self.index += 1;
        self.skip_invalid();
    }

    /// Reset the cursor to the start, skipping slots already invalidated.
    ///
    /// A fresh traversal over a partially invalidated cache never
    /// re-raises for slots already known bad.
    pub fn restart(&mut self) {
        self.index = 0;
        self.skip_invalid();
    }

    fn skip_invalid(&mut self) {
        while self.index < self.providers.len() {
            let slot = self.cache.lock(self.index);
            if !matches!(&*slot, Slot::Invalid(_)) {
                break;
            }
            drop(slot);
            self.index += 1;
        }
    }

    fn construct(&self, provider: ProviderId) -> Result<Arc<S>> {
        let Some(descriptor) = self.catalog.provider(provider) else {
            return Err(ConfigurationError::unknown_provider(self.service, provider));
        };
        if (descriptor.service_type)() != TypeId::of::<S>() {
            return Err(ConfigurationError::type_mismatch(self.service, provider));
        }
        let instance = (descriptor.construct)()
            .map_err(|source| ConfigurationError::construction(self.service, provider, source))?;
        match instance.downcast::<Arc<S>>() {
            Ok(instance) => Ok(*instance),
            // Declared type matched above, so the constructor produced a
            // value of some other type.
            Err(_) => Err(ConfigurationError::type_mismatch(self.service, provider)),
        }
    }
}

impl<S> Iterator for ProviderIterator<S>
where
    S: Service + ?Sized + Send + Sync,
{
    type Item = Result<Arc<S>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.key()?;
        let item = self.current();
        self.advance();
        match item {
            Ok(Some(instance)) => Some(Ok(instance)),
            Ok(None) => None,
            Err(error) => Some(Err(error)),
        }
    }
}
