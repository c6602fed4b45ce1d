//! Error types for the mount registry and change observation.

use thiserror::Error;

/// Crate-level error surfaced by configuration and logging setup.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Provider error: {0}")]
    ProviderError(#[from] ProviderError),

    #[error("Observation error: {0}")]
    ObservationError(#[from] ObservationError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Why a provider could not be activated.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider service could not be obtained or refused activation.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The provider's change observation could not be set up.
    #[error(transparent)]
    Observation(#[from] ObservationError),
}

/// Errors raised while subscribing to, translating, or releasing repository events.
#[derive(Debug, Error)]
pub enum ObservationError {
    /// The underlying event repository rejected an operation.
    #[error("event source error: {0}")]
    Source(String),

    /// A raw event path that cannot be split into node and property.
    #[error("malformed event path: {0}")]
    MalformedPath(String),

    /// A native path the path mapper has no namespace counterpart for.
    #[error("path cannot be mapped: {0}")]
    Unmappable(String),

    /// Releasing the subscription or session failed; teardown still completed.
    #[error("failed to release observation resources: {0}")]
    Release(String),
}

/// Reasons a provider descriptor is structurally invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("mount path is empty")]
    EmptyPath,

    #[error("mount path is not absolute: {0}")]
    RelativePath(String),

    #[error("mount path contains an empty segment: {0}")]
    EmptySegment(String),

    #[error("unknown auth type: {0}")]
    UnknownAuthType(String),
}
