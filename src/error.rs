//! Error types used by the hub, its configuration and pluggable routers.
//!
//! This module defines three error enums:
//!
//! - [`HubError`]: errors returned by the public hub operations.
//! - [`ConfigError`]: validation failures when building a [`HubConfig`](crate::HubConfig).
//! - [`RouterError`]: errors raised by router implementations.
//!
//! All of them provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! Router errors never reach [`Hub::forward`](crate::Hub::forward) callers; they are
//! published as events or returned as data from [`Hub::flush`](crate::Hub::flush).

use thiserror::Error;

/// # Errors produced by hub operations.
///
/// Only validation and cancellation reach the caller; failures of routers and
/// preprocessors are isolated and reported through the event bus instead.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HubError {
    /// The operation observed its cancellation token.
    ///
    /// For [`Hub::reconfigure`](crate::Hub::reconfigure) the hub state is undefined
    /// afterwards: neither the old nor the new configuration may be fully active.
    #[error("operation cancelled")]
    Canceled,

    /// A configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A router failed to start while a new configuration was being applied.
    ///
    /// The hub is left unconfigured; buffered events are kept.
    #[error("router '{router}' failed to start: {error}")]
    RouterStart {
        /// Name of the router that failed.
        router: String,
        /// The underlying router error.
        error: RouterError,
    },
}

impl HubError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventhub::HubError;
    ///
    /// assert_eq!(HubError::Canceled.as_label(), "hub_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HubError::Canceled => "hub_canceled",
            HubError::Config(_) => "hub_invalid_config",
            HubError::RouterStart { .. } => "hub_router_start_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HubError::Canceled => "operation cancelled".to_string(),
            HubError::Config(e) => format!("config: {e}"),
            HubError::RouterStart { router, error } => {
                format!("router start failed: router={router} error={error}")
            }
        }
    }

    /// True if the error is a cancellation.
    pub fn is_canceled(&self) -> bool {
        matches!(self, HubError::Canceled)
    }
}

/// # Configuration validation errors.
///
/// Raised synchronously by [`HubConfig::new`](crate::HubConfig::new) and
/// [`HubConfigBuilder::build`](crate::HubConfigBuilder::build).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A numeric field is outside its allowed range.
    #[error("{field} out of range: {reason}")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// What the field must satisfy.
        reason: &'static str,
    },
}

impl ConfigError {
    /// Returns the name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            ConfigError::OutOfRange { field, .. } => field,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::OutOfRange { .. } => "config_out_of_range",
        }
    }
}

/// # Errors produced by router implementations.
///
/// Returned from [`Router`](crate::Router) and [`Flushable`](crate::Flushable)
/// methods. The hub never propagates these out of `forward`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// The router observed its cancellation token.
    #[error("router operation cancelled")]
    Canceled,

    /// The backend is not reachable or not ready.
    #[error("router unavailable: {reason}")]
    Unavailable {
        /// Why the backend is unavailable.
        reason: String,
    },

    /// The operation failed.
    #[error("router failed: {reason}")]
    Failed {
        /// Description of what went wrong.
        reason: String,
    },
}

impl RouterError {
    /// Creates a [`RouterError::Failed`] with the given reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Creates a [`RouterError::Unavailable`] with the given reason.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventhub::RouterError;
    ///
    /// assert_eq!(RouterError::failed("disk full").as_label(), "router_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RouterError::Canceled => "router_canceled",
            RouterError::Unavailable { .. } => "router_unavailable",
            RouterError::Failed { .. } => "router_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_names_field() {
        let err = ConfigError::OutOfRange {
            field: "max_batch_size",
            reason: "must be greater than zero",
        };
        assert_eq!(err.field(), "max_batch_size");
        assert_eq!(
            err.to_string(),
            "max_batch_size out of range: must be greater than zero"
        );
    }

    #[test]
    fn test_hub_error_from_config_error() {
        let err: HubError = ConfigError::OutOfRange {
            field: "max_queue_length",
            reason: "must be greater than zero",
        }
        .into();
        assert_eq!(err.as_label(), "hub_invalid_config");
        assert!(!err.is_canceled());
    }

    #[test]
    fn test_router_error_helpers() {
        assert_eq!(
            RouterError::failed("boom").to_string(),
            "router failed: boom"
        );
        assert_eq!(
            RouterError::unavailable("no route").to_string(),
            "router unavailable: no route"
        );
        assert_eq!(RouterError::Canceled.as_label(), "router_canceled");
    }

    #[test]
    fn test_router_start_message() {
        let err = HubError::RouterStart {
            router: "disk".into(),
            error: RouterError::failed("read-only"),
        };
        assert_eq!(
            err.as_message(),
            "router start failed: router=disk error=router failed: read-only"
        );
    }
}
