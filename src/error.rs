//! Error types for key derivation, the DAO and the store boundary.
//!
//! "Not found" is deliberately absent from both enums: `Dao::get` and
//! `Store::get_item` report absence as `Ok(None)`.

use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// Failures surfaced by a [`Store`](crate::dynamodb::Store) implementation.
///
/// These are propagated to callers unmodified and never retried inside the DAO.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Transport level failure: the request may never have reached the store.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store received the request and refused it (throttling, validation,
    /// missing table, ...).
    #[error("store rejected request ({code}): {message}")]
    Rejected { code: String, message: String },
}

impl StoreError {
    pub(crate) fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl<E, R> From<SdkError<E, R>> for StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    fn from(err: SdkError<E, R>) -> Self {
        let message = DisplayErrorContext(&err).to_string();
        match err.as_service_error() {
            Some(service) => {
                StoreError::rejected(service.code().unwrap_or("Unknown").to_string(), message)
            }
            None => StoreError::Unavailable(message),
        }
    }
}

/// Errors returned by the key engine and the [`Dao`](crate::dao::Dao).
#[derive(Error, Debug)]
pub enum DaoError {
    /// A key rule referenced a field the record never supplied.
    #[error("field '{0}' is referenced by a key rule but missing from the record")]
    MissingField(String),

    /// The leading partition spec resolved to no value.
    #[error("partition key for '{attribute}' cannot be derived: leading field has no value")]
    MissingPartitionKey { attribute: String },

    /// A referenced value contains the key delimiter and would corrupt key boundaries.
    #[error("value of field '{field}' contains the key delimiter '{delimiter}'")]
    DelimiterInValue { field: String, delimiter: char },

    /// Only strings, numbers and booleans can be part of a composite key.
    #[error("field '{field}' has a {kind} value, which cannot be used in a key")]
    UnsupportedKeyValue { field: String, kind: &'static str },

    #[error("invalid table spec: {0}")]
    InvalidTable(String),

    #[error("attribute conversion failed: {0}")]
    Serialization(#[from] serde_dynamo::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T, E = DaoError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::error::ErrorMetadata;
    use aws_sdk_dynamodb::operation::put_item::PutItemError;

    #[test]
    fn test_transport_failure_is_unavailable() {
        let err = StoreError::from(SdkError::<PutItemError, ()>::timeout_error("boom"));
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn test_service_error_is_rejected_with_its_code() {
        let service = PutItemError::generic(
            ErrorMetadata::builder()
                .code("ThrottlingException")
                .message("slow down")
                .build(),
        );
        let err = StoreError::from(SdkError::service_error(service, ()));
        assert!(matches!(err, StoreError::Rejected { ref code, .. } if code == "ThrottlingException"));
    }

    #[test]
    fn test_service_error_without_code_is_unknown() {
        let service = PutItemError::generic(ErrorMetadata::builder().build());
        let err = StoreError::from(SdkError::service_error(service, ()));
        assert!(matches!(err, StoreError::Rejected { ref code, .. } if code == "Unknown"));
    }
}
