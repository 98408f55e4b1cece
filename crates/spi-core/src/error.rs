//! Configuration errors raised during provider iteration.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

use crate::id::{ProviderId, ServiceId};

/// Boxed error type for provider constructor failures.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Result type alias for iteration operations.
pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Error raised when a registered provider fails validation or construction
/// at the moment it is first needed.
///
/// Always attributable to a single provider slot: every variant carries both
/// the service and the provider identity. An error is surfaced at most once
/// per slot per instance cache; later traversals over the same cache skip
/// the slot silently.
///
/// Cloneable so that the invalidated slot can keep the error it was
/// invalidated with and re-report it instead of retrying construction.
#[derive(Debug, Clone, Error)]
pub enum ConfigurationError {
    /// The provider does not implement the requested service contract.
    #[error("invalid service provider: expected implementation of `{service}`, got `{provider}`")]
    TypeMismatch {
        /// The contract being loaded.
        service: ServiceId,
        /// The implementation that does not satisfy it.
        provider: ProviderId,
    },

    /// The provider's zero-argument constructor failed.
    #[error("failed to instantiate provider `{provider}` for service `{service}`: {source}")]
    Construction {
        /// The contract being loaded.
        service: ServiceId,
        /// The implementation whose constructor failed.
        provider: ProviderId,
        /// The underlying constructor failure.
        #[source]
        source: Arc<dyn StdError + Send + Sync>,
    },

    /// The provider identity has no descriptor in the catalog.
    ///
    /// Only reachable through compiled-mapping entries naming unknown
    /// providers; runtime registration pre-checks resolvability.
    #[error("unknown provider `{provider}` for service `{service}`: no descriptor in catalog")]
    UnknownProvider {
        /// The contract being loaded.
        service: ServiceId,
        /// The unresolvable implementation identity.
        provider: ProviderId,
    },
}

impl ConfigurationError {
    /// Type-mismatch error for a provider that does not implement the
    /// requested contract.
    pub fn type_mismatch(service: ServiceId, provider: ProviderId) -> Self {
        Self::TypeMismatch { service, provider }
    }

    /// Construction error chaining the underlying constructor failure.
    pub fn construction(
        service: ServiceId,
        provider: ProviderId,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Construction {
            service,
            provider,
            source: Arc::from(source.into()),
        }
    }

    /// Error for a provider identity with no catalog descriptor.
    pub fn unknown_provider(service: ServiceId, provider: ProviderId) -> Self {
        Self::UnknownProvider { service, provider }
    }

    /// The service contract the failing slot was bound to.
    pub fn service(&self) -> ServiceId {
        match self {
            Self::TypeMismatch { service, .. }
            | Self::Construction { service, .. }
            | Self::UnknownProvider { service, .. } => *service,
        }
    }

    /// The provider that failed validation or construction.
    pub fn provider(&self) -> ProviderId {
        match self {
            Self::TypeMismatch { provider, .. }
            | Self::Construction { provider, .. }
            | Self::UnknownProvider { provider, .. } => *provider,
        }
    }
}
