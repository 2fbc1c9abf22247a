#![forbid(unsafe_code)]

//! Error types for container access and configuration loading.
//!
//! None of these cross the public component APIs: container errors are
//! absorbed by [`retry_with_fallback`](crate::perf::retry::retry_with_fallback)
//! and the safe-default [`ScrollState`](crate::state::ScrollState), and
//! configuration errors are only surfaced by the explicit loading/validation
//! entry points.

use thiserror::Error;

/// Failure while reading from or writing to a scroll container.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContainerError {
    #[error("container is detached from the document")]
    Detached,

    #[error("failed to read container property `{property}`")]
    PropertyAccess { property: &'static str },

    #[error("container property `{property}` is not finite ({value})")]
    NonFinite { property: &'static str, value: f64 },
}

/// Failure while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_error_messages_name_the_property() {
        let err = ContainerError::PropertyAccess {
            property: "scrollTop",
        };
        assert_eq!(err.to_string(), "failed to read container property `scrollTop`");

        let err = ContainerError::NonFinite {
            property: "scrollHeight",
            value: f64::NAN,
        };
        assert!(err.to_string().contains("scrollHeight"));
    }

    #[test]
    fn config_error_wraps_json() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ConfigError::from(parse);
        assert!(err.to_string().starts_with("JSON error"));
    }
}
