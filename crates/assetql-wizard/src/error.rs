//! Error type for the wizard pipeline.

use assetql_catalog::CatalogError;
use thiserror::Error;

/// A specialized Result type for wizard operations.
pub type WizardResult<T> = Result<T, WizardError>;

/// Errors that can occur while compiling entries into a query.
///
/// The first failure anywhere aborts the whole invocation. Failures raised
/// while processing one entry, row, or line are wrapped in
/// [`WizardError::Entry`] with a descriptor of where that entry came from.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("missing required column {column:?}, found columns: {found}")]
    MissingColumn { column: String, found: String },

    #[error("no rows found: {detail}")]
    NoRows { detail: String },

    #[error("invalid type {etype:?}, valid types: {valid}")]
    UnknownEntryType { etype: String, valid: String },

    #[error("empty required key {key:?}")]
    EmptyValue { key: String },

    #[error("first row must be type 'saved_query', not {etype:?}")]
    FirstRowNotSavedQuery { etype: String },

    #[error("invalid GUI page size {value:?}, valid sizes: {valid}")]
    InvalidPageSize { value: String, valid: String },

    #[error("found invalid characters '{chars}' in {src} from value '{value}'")]
    InvalidCharacters {
        src: &'static str,
        chars: String,
        value: String,
    },

    #[error("empty required {src} from value '{value}'")]
    EmptyToken { src: &'static str, value: String },

    #[error("empty value after stripping flags from '{value}'")]
    EmptyAfterFlags { value: String },

    #[error("no ' // ' found in value '{value}'")]
    MissingComplexSeparator { value: String },

    #[error("must supply a filter after type {etype:?}")]
    MissingFilter { etype: String },

    #[error("{message}")]
    InvalidValue { message: String },

    #[error("error in item #{index} of {count} from {value:?}: {source}")]
    CsvItem {
        index: usize,
        count: usize,
        value: String,
        source: Box<WizardError>,
    },

    #[error("unable to find sub field {sub_field:?} of complex field {field:?}, valid sub fields: {valid}")]
    SubFieldNotFound {
        sub_field: String,
        field: String,
        valid: String,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("error parsing {origin}:\n{inner}")]
    Entry {
        origin: String,
        inner: Box<WizardError>,
    },
}

impl WizardError {
    /// Creates a value conversion/validation error.
    pub fn invalid_value(message: impl Into<String>) -> Self {
        WizardError::InvalidValue {
            message: message.into(),
        }
    }

    /// Wraps an error with the descriptor of the entry that caused it.
    pub fn for_entry(origin: impl Into<String>, inner: WizardError) -> Self {
        WizardError::Entry {
            origin: origin.into(),
            inner: Box::new(inner),
        }
    }

    /// The root cause, unwrapping any entry descriptors.
    pub fn root(&self) -> &WizardError {
        match self {
            WizardError::Entry { inner, .. } => inner.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_wrapper_keeps_origin_and_root() {
        let inner = WizardError::EmptyAfterFlags {
            value: "!".to_string(),
        };
        let err = WizardError::for_entry("text line #3: ! ", inner);
        let display = err.to_string();
        assert!(display.contains("text line #3"));
        assert!(display.contains("stripping flags"));
        assert!(matches!(err.root(), WizardError::EmptyAfterFlags { .. }));
    }

    #[test]
    fn test_catalog_error_converts() {
        let err: WizardError = CatalogError::field_not_found("badwolf").into();
        assert!(err.to_string().contains("badwolf"));
    }
}
