//! Field schemas and operator catalog for AssetQL queries.
//!
//! This crate holds everything the query wizard needs to know about the
//! asset platform's fields: the schema model returned by the REST catalog,
//! the static table mapping field type signatures to their legal operators,
//! the [`FieldProvider`] collaborator trait for schema and enumeration
//! lookups, and a TTL-bounded [`EnumCache`] for dynamically fetched
//! allow-lists (adapter names, connection labels, tags).
//!
//! # Quick Start
//!
//! ```
//! use assetql_catalog::{get_operator, get_type_map, FieldSchema, FieldType};
//!
//! let schema = FieldSchema::simple("hostname", FieldType::String);
//! let type_map = get_type_map(&schema);
//! assert_eq!(type_map.name, "string");
//!
//! let operator = get_operator(&schema, "contains").unwrap();
//! assert_eq!(operator.name, "contains");
//! ```

pub mod cache;
pub mod error;
pub mod operators;
pub mod provider;
pub mod schema;

pub use cache::EnumCache;
pub use error::{CatalogError, CatalogResult};
pub use operators::{
    find_type_map, get_operator, get_type_map, AqlValue, Operator, OperatorTypeMap, ParserKind,
};
pub use provider::{resolve_field, resolve_field_complex, FieldProvider, MemoryCatalog};
pub use schema::{FieldFormat, FieldItems, FieldSchema, FieldType, Signature};
