//! Error types for the EDHREC client
//!
//! Every public operation returns [`EdhrecError`]. Messages name the operation,
//! the card or commander and the filters involved so callers can tell
//! "this commander doesn't exist" apart from "no data for this combination".

use thiserror::Error;

use crate::cache::Operation;
use crate::params::ParameterSet;
use crate::transport::TransportError;

/// Errors returned by the client
#[derive(Debug, Error)]
pub enum EdhrecError {
    /// The display name was empty or reduced to an empty slug
    #[error("Invalid card name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// A filter value is not part of the recognized enumeration
    #[error("Invalid {field} parameter passed: '{value}'. Only {allowed} available.")]
    InvalidParameter {
        field: &'static str,
        value: String,
        allowed: String,
    },

    /// Network or HTTP layer failure
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    /// The upstream site has no such card or commander
    #[error("No {operation} found on EDHREC for '{name}'")]
    NotFound { operation: Operation, name: String },

    /// The entity exists but has no data for the requested filters
    #[error(
        "No {operation} available on EDHREC for '{name}' with {params}. \
         This combination may not have enough data on the website."
    )]
    NoData {
        operation: Operation,
        name: String,
        params: ParameterSet,
    },

    /// The payload does not match the expected shape
    #[error("Malformed {record} response: field `{field}` {reason}")]
    MalformedResponse {
        record: &'static str,
        field: String,
        reason: String,
    },
}

impl EdhrecError {
    /// Shorthand for a missing mandatory field
    pub(crate) fn missing(record: &'static str, field: impl Into<String>) -> Self {
        EdhrecError::MalformedResponse {
            record,
            field: field.into(),
            reason: "is missing".to_string(),
        }
    }

    /// Shorthand for a field holding the wrong JSON type
    pub(crate) fn wrong_type(
        record: &'static str,
        field: impl Into<String>,
        expected: &str,
    ) -> Self {
        EdhrecError::MalformedResponse {
            record,
            field: field.into(),
            reason: format!("is not {}", expected),
        }
    }

    /// Attributes a lookup failure to the operation the caller asked for
    pub(crate) fn for_operation(self, operation: Operation) -> Self {
        match self {
            EdhrecError::NotFound { name, .. } => EdhrecError::NotFound { operation, name },
            EdhrecError::NoData { name, params, .. } => EdhrecError::NoData {
                operation,
                name,
                params,
            },
            other => other,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, EdhrecError>;
