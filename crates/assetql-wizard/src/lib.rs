//! Query wizard: compiles human-writable filter entries into AssetQL.
//!
//! Each entry names a field, an operator, and a value, with optional
//! control flags for negation, OR joins, and brackets. The wizard
//! validates every piece against an [`assetql_catalog`] schema source and
//! produces both the AQL query string and the JSON expression tree the
//! GUI query builder uses to render it.
//!
//! Three frontends feed the same pipeline:
//!
//! * [`Wizard::parse`] takes structured [`Entry`] values;
//! * [`Wizard::parse_text`] takes one entry per line of text;
//! * [`Wizard::parse_csv`] takes CSV rows grouped into saved queries.
//!
//! # Quick Start
//!
//! ```
//! use assetql_catalog::{EnumCache, FieldSchema, FieldType, MemoryCatalog};
//! use assetql_wizard::{Entry, Wizard};
//!
//! let catalog = MemoryCatalog::new(vec![
//!     FieldSchema::simple("hostname", FieldType::String),
//!     FieldSchema::simple("last_seen", FieldType::String),
//! ]);
//! let enums = EnumCache::new();
//! let wizard = Wizard::new(&catalog, &enums);
//!
//! let parsed = wizard
//!     .parse(vec![
//!         Entry::simple("hostname contains test"),
//!         Entry::simple("|hostname contains prod"),
//!     ])
//!     .unwrap();
//! assert_eq!(
//!     parsed.query,
//!     r#"("hostname" == regex("test", "i")) or ("hostname" == regex("prod", "i"))"#
//! );
//! assert_eq!(parsed.expressions.len(), 2);
//! ```

pub mod csv;
pub mod entry;
pub mod error;
pub mod expr;
pub mod flags;
pub mod text;
pub mod value;
pub mod wizard;

pub use crate::csv::SavedQuery;
pub use crate::entry::{Entry, EntryType, Flag, SavedQueryMeta, GUI_PAGE_SIZES};
pub use crate::error::{WizardError, WizardResult};
pub use crate::expr::{Expression, ExpressionChild, ParseResult};
pub use crate::flags::{parse_flags, split_flags};
pub use crate::wizard::{split_complex, split_simple, Wizard, COMPLEX_SPLIT};
