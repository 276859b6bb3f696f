//! The core pipeline: entries in, AQL and expressions out.

use assetql_catalog::{
    get_operator, resolve_field, resolve_field_complex, EnumCache, FieldProvider, FieldSchema,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::entry::{Entry, EntryType};
use crate::error::{WizardError, WizardResult};
use crate::expr::{self, Expression, ExpressionChild, ParseResult};
use crate::flags;
use crate::value::parse_value;

/// Separator between the field and each sub-filter of a complex value.
pub const COMPLEX_SPLIT: &str = " // ";

static FIELD_BAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9:._\-]").expect("field pattern"));
static OP_BAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_\-]").expect("operator pattern"));

/// Compiles filter entries into an AQL query plus GUI expressions.
///
/// Holds no state of its own beyond its collaborators: a [`FieldProvider`]
/// for schema lookups and an [`EnumCache`] for allow-list fetches. One
/// wizard can parse any number of batches.
///
/// # Examples
///
/// ```
/// use assetql_catalog::{EnumCache, FieldSchema, FieldType, MemoryCatalog};
/// use assetql_wizard::{Entry, Wizard};
///
/// let catalog = MemoryCatalog::new(vec![
///     FieldSchema::simple("hostname", FieldType::String),
/// ]);
/// let enums = EnumCache::new();
/// let wizard = Wizard::new(&catalog, &enums);
///
/// let parsed = wizard.parse(vec![Entry::simple("hostname contains test")]).unwrap();
/// assert_eq!(parsed.query, r#"("hostname" == regex("test", "i"))"#);
/// ```
pub struct Wizard<'a> {
    pub(crate) provider: &'a dyn FieldProvider,
    pub(crate) enums: &'a EnumCache,
}

impl<'a> Wizard<'a> {
    pub fn new(provider: &'a dyn FieldProvider, enums: &'a EnumCache) -> Self {
        Self { provider, enums }
    }

    /// Parses a batch of structured entries.
    ///
    /// Only simple and complex entries are legal here; saved query headers
    /// belong to the CSV frontend. The first failure aborts the batch,
    /// wrapped with the failing entry's source descriptor.
    pub fn parse(&self, entries: Vec<Entry>) -> WizardResult<ParseResult> {
        self.parse_entries(entries, "entries")
    }

    pub(crate) fn parse_entries(
        &self,
        mut entries: Vec<Entry>,
        source: &str,
    ) -> WizardResult<ParseResult> {
        let total = entries.len();
        for (idx, entry) in entries.iter_mut().enumerate() {
            if entry.source.is_empty() {
                entry.source = format!("{source} entry #{}/{}", idx + 1, total);
            }
            if entry.value.trim().is_empty() {
                return Err(WizardError::for_entry(
                    entry.source.clone(),
                    WizardError::EmptyValue {
                        key: "value".to_string(),
                    },
                ));
            }
        }

        flags::parse_flags(&mut entries)?;

        let mut expressions = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            debug!(source = %entry.source, etype = %entry.entry_type, "parsing entry");
            let expression = self
                .parse_entry(entry, idx)
                .map_err(|err| WizardError::for_entry(entry.source.clone(), err))?;
            expressions.push(expression);
        }

        let query = expr::query_of(&expressions);
        Ok(ParseResult { expressions, query })
    }

    fn parse_entry(&self, entry: &Entry, idx: usize) -> WizardResult<Expression> {
        match entry.entry_type {
            EntryType::Simple => self.parse_simple(entry, idx),
            EntryType::Complex => self.parse_complex(entry, idx),
            EntryType::SavedQuery => Err(WizardError::UnknownEntryType {
                etype: entry.entry_type.to_string(),
                valid: "simple, complex".to_string(),
            }),
        }
    }

    fn parse_simple(&self, entry: &Entry, idx: usize) -> WizardResult<Expression> {
        let (field, operator, value) = split_simple(&entry.value)?;
        let schema = resolve_field(self.provider, &field)?;
        let op = get_operator(&schema, &operator)?;
        let (aql, echo) = parse_value(op.parser, &value, &schema, self.provider, self.enums)?;
        let query = op.render(&schema.name, &aql);
        Ok(Expression::build(
            entry, query, &schema, idx, op.op, echo, vec![], false,
        ))
    }

    fn parse_complex(&self, entry: &Entry, idx: usize) -> WizardResult<Expression> {
        let (field, subs_raw) = split_complex(&entry.value)?;
        let schema = resolve_field_complex(self.provider, &field)?;

        let mut children = Vec::with_capacity(subs_raw.len());
        for (sub_idx, sub_raw) in subs_raw.iter().enumerate() {
            children.push(self.parse_sub(&schema, sub_raw, sub_idx)?);
        }

        let subs = expr::subs_query_of(&children);
        let query = expr::complex_query(&schema.name, &subs);
        Ok(Expression::build(
            entry,
            query,
            &schema,
            idx,
            "",
            Value::Null,
            children,
            true,
        ))
    }

    fn parse_sub(
        &self,
        schema: &FieldSchema,
        sub_raw: &str,
        sub_idx: usize,
    ) -> WizardResult<ExpressionChild> {
        let (sub_name, operator, value) = split_simple(sub_raw)?;
        let sub_schema = schema.sub_field(&sub_name).ok_or_else(|| {
            WizardError::SubFieldNotFound {
                sub_field: sub_name.clone(),
                field: schema.name.clone(),
                valid: schema
                    .sub_fields
                    .iter()
                    .map(|sub| sub.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        })?;
        let op = get_operator(sub_schema, &operator)?;
        let (aql, echo) = parse_value(op.parser, &value, sub_schema, self.provider, self.enums)?;
        let query = op.render(&sub_schema.name, &aql);
        Ok(ExpressionChild::build(
            query,
            op.op,
            &sub_schema.name,
            echo,
            sub_idx,
        ))
    }
}

/// Splits a simple value into field, operator, and value tokens.
///
/// The first two single spaces delimit the tokens; everything after the
/// second space is the value, which may be empty for operators that take
/// none. Field and operator tokens are validated against their grammars.
pub fn split_simple(value_raw: &str) -> WizardResult<(String, String, String)> {
    let mut parts = value_raw.splitn(3, ' ');
    let field = parts.next().unwrap_or("").trim().to_string();
    let operator = parts.next().unwrap_or("").trim().to_lowercase();
    let value = parts.next().unwrap_or("").trim_start().to_string();

    check_token(&field, "FIELD", &FIELD_BAD, value_raw)?;
    if !field.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(WizardError::InvalidCharacters {
            src: "FIELD",
            chars: field.chars().take(1).collect(),
            value: value_raw.to_string(),
        });
    }
    check_token(&operator, "OPERATOR", &OP_BAD, value_raw)?;

    Ok((field, operator, value))
}

/// Splits a complex value into the field token and its raw sub-filters.
pub fn split_complex(value_raw: &str) -> WizardResult<(String, Vec<String>)> {
    if !value_raw.contains(COMPLEX_SPLIT) {
        return Err(WizardError::MissingComplexSeparator {
            value: value_raw.to_string(),
        });
    }

    let mut parts = value_raw.split(COMPLEX_SPLIT);
    let field = parts.next().unwrap_or("").trim().to_string();
    let subs: Vec<String> = parts
        .map(|sub| sub.trim_start().to_string())
        .filter(|sub| !sub.is_empty())
        .collect();

    check_token(&field, "FIELD", &FIELD_BAD, value_raw)?;
    if subs.is_empty() {
        return Err(WizardError::EmptyToken {
            src: "SUB-FIELD(s)",
            value: value_raw.to_string(),
        });
    }
    Ok((field, subs))
}

fn check_token(
    token: &str,
    src: &'static str,
    bad: &Regex,
    value_raw: &str,
) -> WizardResult<()> {
    if token.is_empty() {
        return Err(WizardError::EmptyToken {
            src,
            value: value_raw.to_string(),
        });
    }
    let chars: String = bad.find_iter(token).map(|m| m.as_str()).collect();
    if !chars.is_empty() {
        return Err(WizardError::InvalidCharacters {
            src,
            chars,
            value: value_raw.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple() {
        let (field, operator, value) = split_simple("hostname contains test value").unwrap();
        assert_eq!(field, "hostname");
        assert_eq!(operator, "contains");
        assert_eq!(value, "test value");
    }

    #[test]
    fn test_split_simple_no_value() {
        let (field, operator, value) = split_simple("hostname exists").unwrap();
        assert_eq!(field, "hostname");
        assert_eq!(operator, "exists");
        assert_eq!(value, "");
    }

    #[test]
    fn test_split_simple_lowercases_operator() {
        let (_, operator, _) = split_simple("hostname Contains test").unwrap();
        assert_eq!(operator, "contains");
    }

    #[test]
    fn test_split_simple_bad_field() {
        let err = split_simple("host$name contains x").unwrap_err();
        assert!(matches!(
            err,
            WizardError::InvalidCharacters { src: "FIELD", .. }
        ));
        assert!(err.to_string().contains('$'));

        let err = split_simple("9host contains x").unwrap_err();
        assert!(matches!(
            err,
            WizardError::InvalidCharacters { src: "FIELD", .. }
        ));
    }

    #[test]
    fn test_split_simple_missing_operator() {
        let err = split_simple("hostname").unwrap_err();
        assert!(matches!(err, WizardError::EmptyToken { src: "OPERATOR", .. }));
    }

    #[test]
    fn test_split_complex() {
        let (field, subs) =
            split_complex("installed_software // name contains chrome // version earlier_than 82")
                .unwrap();
        assert_eq!(field, "installed_software");
        assert_eq!(
            subs,
            vec!["name contains chrome", "version earlier_than 82"]
        );
    }

    #[test]
    fn test_split_complex_missing_separator() {
        let err = split_complex("installed_software name contains chrome").unwrap_err();
        assert!(matches!(err, WizardError::MissingComplexSeparator { .. }));
    }

    #[test]
    fn test_split_complex_no_subs() {
        let err = split_complex("installed_software //  ").unwrap_err();
        assert!(matches!(err, WizardError::EmptyToken { .. }));
    }
}
