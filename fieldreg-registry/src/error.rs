//! Error types for the configuration loader and option registry

use fieldreg_backend::BackendError;
use fieldreg_fields::{EntityKey, FieldsError};
use thiserror::Error;

/// Shown when the server gives no reason for a failed config fetch
pub const GENERIC_LOAD_MESSAGE: &str = "Failed to load field configuration";

/// Shown when the server gives no reason for a failed option add
pub const GENERIC_ADD_MESSAGE: &str = "Failed to add option";

/// Shown when the server gives no reason for a failed option list
pub const GENERIC_LIST_MESSAGE: &str = "Failed to load options";

/// A configuration fetch failed.
///
/// Kept in the published loader state, so it is `Clone` and carries only the
/// user-facing message rather than the transport error.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigLoadError {
    /// The backend refused or could not be reached
    #[error("{message}")]
    Backend {
        key: EntityKey,
        status: Option<u16>,
        message: String,
        retryable: bool,
    },

    /// The backend answered with a configuration that breaks its invariants
    #[error("invalid configuration for {key}: {source}")]
    Invalid { key: EntityKey, source: FieldsError },
}

impl ConfigLoadError {
    pub(crate) fn from_backend(key: &EntityKey, err: &BackendError) -> Self {
        Self::Backend {
            key: key.clone(),
            status: err.status(),
            message: err.message_or(GENERIC_LOAD_MESSAGE),
            retryable: err.is_retryable(),
        }
    }

    pub fn key(&self) -> &EntityKey {
        match self {
            Self::Backend { key, .. } | Self::Invalid { key, .. } => key,
        }
    }

    /// The message to show the user
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Backend { retryable, .. } => *retryable,
            Self::Invalid { .. } => false,
        }
    }
}

/// Listing or extending an option category failed.
#[derive(Debug, Error)]
pub enum OptionError {
    /// Nothing left after trimming; no request was made
    #[error("option value cannot be empty")]
    EmptyValue,

    /// The backend refused the new option
    #[error("{message}")]
    AddFailed {
        category: String,
        message: String,
        #[source]
        source: BackendError,
    },

    /// The category could not be fetched
    #[error("{message}")]
    ListFailed {
        category: String,
        message: String,
        #[source]
        source: BackendError,
    },
}

impl OptionError {
    pub(crate) fn add_failed(category: &str, source: BackendError) -> Self {
        Self::AddFailed {
            category: category.to_string(),
            message: source.message_or(GENERIC_ADD_MESSAGE),
            source,
        }
    }

    pub(crate) fn list_failed(category: &str, source: BackendError) -> Self {
        Self::ListFailed {
            category: category.to_string(),
            message: source.message_or(GENERIC_LIST_MESSAGE),
            source,
        }
    }

    /// Backend failures may succeed on another attempt; an empty value never will.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::EmptyValue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_uses_detail() {
        let key = EntityKey::new("crm", "leads");
        let err = ConfigLoadError::from_backend(&key, &BackendError::api(404, "Unknown entity"));
        assert_eq!(err.message(), "Unknown entity");
        assert_eq!(err.key(), &key);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_load_error_generic_message() {
        let key = EntityKey::new("crm", "leads");
        let backend = BackendError::Api {
            status: 502,
            detail: None,
        };
        let err = ConfigLoadError::from_backend(&key, &backend);
        assert_eq!(err.message(), GENERIC_LOAD_MESSAGE);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_option_errors() {
        assert!(!OptionError::EmptyValue.is_retryable());
        let err = OptionError::add_failed(
            "industry",
            BackendError::Api {
                status: 500,
                detail: None,
            },
        );
        assert_eq!(err.to_string(), GENERIC_ADD_MESSAGE);
        assert!(err.is_retryable());
    }
}
