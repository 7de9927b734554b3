//! Error types for justpaypaddle.
//!
//! Every failure a lifecycle call can surface lives in [`Error`]. A missing
//! entity on read is not one of them: readers return `Ok(None)` instead.

use thiserror::Error;

/// The main error type for reconciliation operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid provider configuration, detected before any remote call
    #[error("Configuration error ({attribute}): {message}")]
    Config {
        attribute: &'static str,
        message: String,
    },

    /// A declared value failed an enumeration or pattern check
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The remote API rejected or failed a request
    #[error("{operation} failed for {context}: {detail}")]
    Api {
        operation: String,
        context: String,
        status: u16,
        code: Option<String>,
        detail: String,
    },

    /// A non-API failure during a remote call, with the operation and identifying context
    #[error("{operation} failed for {context}: {source}")]
    Remote {
        operation: String,
        context: String,
        #[source]
        source: Box<Error>,
    },

    /// The remote entity does not exist
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    /// A read, update or delete was attempted on a record that was never created or imported
    #[error("{resource} has no identifier; create or import it first")]
    Unidentified { resource: &'static str },

    /// Network-level failure talking to the API
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A custom data value could not be serialized
    #[error("failed to marshal custom_data value for key {key}: {source}")]
    Conversion {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The desired change touches fields that cannot be updated in place
    #[error("{resource} requires replacement, immutable fields changed: {}", fields.join(", "))]
    RequiresReplacement {
        resource: &'static str,
        fields: Vec<&'static str>,
    },

    /// The entity was created remotely but its follow-up read failed.
    /// `record` holds what the create response did tell us.
    #[error("{resource} {id} was created but could not be read back: {source}")]
    Incomplete {
        resource: &'static str,
        id: String,
        record: serde_json::Value,
        #[source]
        source: Box<Error>,
    },

    /// The caller cancelled the operation
    #[error("operation cancelled")]
    Cancelled,

    /// The operation deadline elapsed before the API answered
    #[error("operation deadline exceeded")]
    DeadlineExceeded,

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for reconciliation operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(attribute: &'static str, message: S) -> Self {
        Error::Config {
            attribute,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Error::NotFound { .. })
    }

    /// The underlying error, looking through any `Remote` context.
    pub fn root(&self) -> &Error {
        match self {
            Error::Remote { source, .. } => source.root(),
            other => other,
        }
    }

    /// Attach the attempted operation and identifying context to a remote failure.
    ///
    /// `Api` errors are rewritten in place. Transport, decoding, not-found,
    /// cancellation and deadline failures are wrapped in `Remote`. Errors
    /// raised before any call, or already carrying context, pass through.
    pub fn during<O, C>(self, operation: O, context: C) -> Self
    where
        O: Into<String>,
        C: Into<String>,
    {
        match self {
            Error::Api {
                status,
                code,
                detail,
                ..
            } => Error::Api {
                operation: operation.into(),
                context: context.into(),
                status,
                code,
                detail,
            },
            err @ (Error::Config { .. }
            | Error::Validation(_)
            | Error::Unidentified { .. }
            | Error::RequiresReplacement { .. }
            | Error::Incomplete { .. }
            | Error::Remote { .. }) => err,
            other => Error::Remote {
                operation: operation.into(),
                context: context.into(),
                source: Box::new(other),
            },
        }
    }
}

/// A field value that is outside its allowed set or pattern
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{summary} at {path}: must be {expected}. Got: {value}")]
pub struct ValidationError {
    /// Attribute path, e.g. `unit_price.currency_code`
    pub path: String,
    /// Short title, e.g. `Invalid Tax Mode`
    pub summary: &'static str,
    /// The allowed values or the pattern
    pub expected: String,
    /// The offending value
    pub value: String,
}
