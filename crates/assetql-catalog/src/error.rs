//! Error types for catalog lookups.

use thiserror::Error;

/// A specialized Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while resolving fields, operators, or enumerations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// No field schema exists for the supplied name.
    #[error("unable to find field named {field:?}")]
    FieldNotFound {
        /// The field name that could not be resolved.
        field: String,
    },

    /// The "all fields" sentinel can never be used in a query.
    #[error("can not use {field:?} field in queries")]
    AllFieldForbidden {
        /// The name of the sentinel field.
        field: String,
    },

    /// A complex entry named a field that is not complex.
    #[error("invalid complex field {field:?} for adapter {adapter:?}, valid complex fields:{valid}")]
    NotComplex {
        /// The field name that was supplied.
        field: String,
        /// Adapter the field belongs to.
        adapter: String,
        /// Newline-prefixed listing of valid complex field names.
        valid: String,
    },

    /// The supplied operator is not legal for the field's type map.
    #[error("invalid operator {operator:?} for field {field:?} with type {type_map:?}, valid operators:{valid}")]
    UnknownOperator {
        /// The operator name that was supplied.
        operator: String,
        /// The field (annotated with its parent when it is a sub-field).
        field: String,
        /// Name of the operator type map the field resolved to.
        type_map: String,
        /// Newline-prefixed listing of valid operator names.
        valid: String,
    },

    /// No operator type map matches the field's type signature.
    #[error("unexpected schema in field {field:?} with {signature}, known signatures:{candidates}")]
    UnknownSignature {
        /// The field whose signature failed to match.
        field: String,
        /// Human-readable rendering of the field's signature.
        signature: String,
        /// Newline-prefixed listing of every known signature.
        candidates: String,
    },

    /// An enumeration lookup (adapters, labels, tags) failed.
    #[error("enumeration lookup failed: {message}")]
    Enumeration {
        /// Description of the failure, supplied by the provider.
        message: String,
    },
}

impl CatalogError {
    /// Creates a field-not-found error.
    pub fn field_not_found(field: impl Into<String>) -> Self {
        CatalogError::FieldNotFound {
            field: field.into(),
        }
    }

    /// Creates an enumeration lookup error.
    pub fn enumeration(message: impl Into<String>) -> Self {
        CatalogError::Enumeration {
            message: message.into(),
        }
    }
}
