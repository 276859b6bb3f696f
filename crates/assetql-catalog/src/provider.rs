//! Field resolution against a schema source.
//!
//! The wizard never talks to the platform directly. It resolves field names
//! and enumeration allow-lists through the [`FieldProvider`] trait, so the
//! same pipeline runs against a live REST catalog or the in-memory
//! [`MemoryCatalog`] used by tests and offline tooling.

use crate::error::{CatalogError, CatalogResult};
use crate::schema::FieldSchema;

/// Source of field schemas and enumeration allow-lists.
///
/// Implementations are expected to be cheap to call repeatedly for
/// `get_field`; the enumeration methods may be expensive (a REST call) and
/// are read through an [`EnumCache`](crate::cache::EnumCache) by the wizard.
pub trait FieldProvider {
    /// Looks up a field schema by name.
    fn get_field(&self, name: &str) -> CatalogResult<FieldSchema>;

    /// The default field selection for saved queries.
    fn fields_default(&self) -> Vec<String>;

    /// Every complex field schema, for error listings.
    fn complex_fields(&self) -> Vec<FieldSchema>;

    /// Known adapter names. Empty means "do not validate".
    fn adapter_names(&self) -> CatalogResult<Vec<String>>;

    /// Known adapter connection labels. Empty means "do not validate".
    fn connection_labels(&self) -> CatalogResult<Vec<String>>;

    /// Known asset tags. Empty means "do not validate".
    fn tags(&self) -> CatalogResult<Vec<String>>;
}

/// Resolves a field for a simple entry.
///
/// The "all fields" sentinel resolves in the catalog but can never be
/// queried, so it is rejected here.
pub fn resolve_field(provider: &dyn FieldProvider, name: &str) -> CatalogResult<FieldSchema> {
    let schema = provider.get_field(name)?;
    if schema.is_all {
        return Err(CatalogError::AllFieldForbidden {
            field: schema.name,
        });
    }
    Ok(schema)
}

/// Resolves a field for a complex entry.
///
/// On top of [`resolve_field`], the schema must be complex and must not be
/// a fetch-details helper. Failures list every valid complex field.
pub fn resolve_field_complex(
    provider: &dyn FieldProvider,
    name: &str,
) -> CatalogResult<FieldSchema> {
    let schema = resolve_field(provider, name)?;
    if !schema.is_complex || schema.is_details {
        let valid: String = provider
            .complex_fields()
            .iter()
            .filter(|f| !f.is_details)
            .map(|f| format!("\n - {}", f.name))
            .collect();
        return Err(CatalogError::NotComplex {
            field: schema.name,
            adapter: schema.adapter_name,
            valid,
        });
    }
    Ok(schema)
}

/// An in-memory [`FieldProvider`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    schemas: Vec<FieldSchema>,
    default_fields: Vec<String>,
    adapters: Vec<String>,
    labels: Vec<String>,
    tags: Vec<String>,
}

impl MemoryCatalog {
    /// Creates a catalog over the given schemas.
    pub fn new(schemas: Vec<FieldSchema>) -> Self {
        Self {
            schemas,
            ..Self::default()
        }
    }

    /// Sets the default field selection for saved queries.
    pub fn with_default_fields(mut self, fields: Vec<String>) -> Self {
        self.default_fields = fields;
        self
    }

    /// Sets the adapter name allow-list.
    pub fn with_adapters(mut self, adapters: Vec<String>) -> Self {
        self.adapters = adapters;
        self
    }

    /// Sets the connection label allow-list.
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Sets the tag allow-list.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Adds one schema.
    pub fn push(&mut self, schema: FieldSchema) {
        self.schemas.push(schema);
    }
}

impl FieldProvider for MemoryCatalog {
    fn get_field(&self, name: &str) -> CatalogResult<FieldSchema> {
        self.schemas
            .iter()
            .find(|schema| schema.name == name)
            .cloned()
            .ok_or_else(|| CatalogError::field_not_found(name))
    }

    fn fields_default(&self) -> Vec<String> {
        self.default_fields.clone()
    }

    fn complex_fields(&self) -> Vec<FieldSchema> {
        self.schemas
            .iter()
            .filter(|schema| schema.is_complex)
            .cloned()
            .collect()
    }

    fn adapter_names(&self) -> CatalogResult<Vec<String>> {
        Ok(self.adapters.clone())
    }

    fn connection_labels(&self) -> CatalogResult<Vec<String>> {
        Ok(self.labels.clone())
    }

    fn tags(&self) -> CatalogResult<Vec<String>> {
        Ok(self.tags.clone())
    }
}
