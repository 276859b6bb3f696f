//! Filter entries and saved query metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{WizardError, WizardResult};

/// GUI page sizes a saved query may request. The first is the default.
pub const GUI_PAGE_SIZES: [u64; 3] = [20, 50, 100];

/// The kind of one filter entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// One filter against a simple field.
    Simple,
    /// One filter against a complex field with sub-filters.
    Complex,
    /// A saved query header row (CSV frontend only).
    SavedQuery,
}

impl EntryType {
    /// Parses a type token against the set a frontend allows.
    ///
    /// The token is lowercased and trimmed. A miss lists the allowed types.
    pub fn parse(etype: &str, valid: &[EntryType]) -> WizardResult<EntryType> {
        let token = etype.trim().to_lowercase();
        valid
            .iter()
            .find(|t| t.as_str() == token)
            .copied()
            .ok_or_else(|| WizardError::UnknownEntryType {
                etype: token,
                valid: valid
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Simple => "simple",
            EntryType::Complex => "complex",
            EntryType::SavedQuery => "saved_query",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A control flag stripped from the front (or back) of an entry value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Flag {
    /// `!` negate this entry.
    Not,
    /// `&` join with AND (the default).
    And,
    /// `|` join with OR.
    Or,
    /// `(` open a bracket.
    Open,
    /// `)` close a bracket, also legal at the end of a value.
    Close,
}

impl Flag {
    /// The flag for a character, if it is one.
    pub fn from_char(c: char) -> Option<Flag> {
        match c {
            '!' => Some(Flag::Not),
            '&' => Some(Flag::And),
            '|' => Some(Flag::Or),
            '(' => Some(Flag::Open),
            ')' => Some(Flag::Close),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Flag::Not => '!',
            Flag::And => '&',
            Flag::Or => '|',
            Flag::Open => '(',
            Flag::Close => ')',
        }
    }
}

impl TryFrom<String> for Flag {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Flag::from_char(c).ok_or_else(|| format!("invalid flag {value:?}"))
            }
            _ => Err(format!("invalid flag {value:?}")),
        }
    }
}

/// One filter unit flowing through the pipeline.
///
/// Created by a frontend, mutated in place by the flag machine (value,
/// flags, and weight; the machine may also append a close flag to the
/// previous entry), then consumed once to build an expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Entry {
    /// Where this entry came from, for diagnostics.
    #[serde(default)]
    pub source: String,

    /// The kind of entry.
    #[serde(rename = "type")]
    pub entry_type: EntryType,

    /// The raw value text; flags are stripped out of it by the flag machine.
    pub value: String,

    /// Control flags, either supplied up front or stripped from the value.
    #[serde(default)]
    pub flags: Vec<Flag>,

    /// Bracket weight assigned by the flag machine.
    #[serde(default)]
    pub weight: i64,
}

impl Entry {
    pub fn new(entry_type: EntryType, value: impl Into<String>) -> Self {
        Self {
            source: String::new(),
            entry_type,
            value: value.into(),
            flags: Vec::new(),
            weight: 0,
        }
    }

    /// A simple entry.
    pub fn simple(value: impl Into<String>) -> Self {
        Self::new(EntryType::Simple, value)
    }

    /// A complex entry.
    pub fn complex(value: impl Into<String>) -> Self {
        Self::new(EntryType::Complex, value)
    }

    /// Sets the source descriptor.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }
}

/// Metadata from a saved query header row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedQueryMeta {
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub fields: Vec<String>,
    pub private: bool,
    pub asset_scope: bool,
    pub always_cached: bool,
    pub gui_page_size: u64,
}

/// Lenient bool coercion for CSV cells.
///
/// Accepts `true/t/yes/y/1` and `false/f/no/n/0`, case-insensitive.
pub fn parse_bool(value: &str) -> WizardResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Ok(true),
        "false" | "f" | "no" | "n" | "0" => Ok(false),
        other => Err(WizardError::invalid_value(format!(
            "unable to coerce {other:?} into a boolean"
        ))),
    }
}

/// Validates a GUI page size cell. Empty means the default.
pub fn parse_page_size(value: &str) -> WizardResult<u64> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(GUI_PAGE_SIZES[0]);
    }
    let invalid = || WizardError::InvalidPageSize {
        value: value.to_string(),
        valid: GUI_PAGE_SIZES
            .iter()
            .map(|size| size.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    };
    let size: u64 = value.parse().map_err(|_| invalid())?;
    if !GUI_PAGE_SIZES.contains(&size) {
        return Err(invalid());
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_type_parse() {
        let valid = [EntryType::Simple, EntryType::Complex];
        assert_eq!(
            EntryType::parse(" Simple ", &valid).unwrap(),
            EntryType::Simple
        );
        let err = EntryType::parse("saved_query", &valid).unwrap_err();
        assert!(err.to_string().contains("simple, complex"));
    }

    #[test]
    fn test_flag_char_round_trip() {
        for c in ['!', '&', '|', '(', ')'] {
            assert_eq!(Flag::from_char(c).unwrap().as_char(), c);
        }
        assert!(Flag::from_char('x').is_none());
    }

    #[test]
    fn test_entry_deserialize_defaults() {
        let entry: Entry =
            serde_json::from_str(r#"{"type": "simple", "value": "hostname contains test"}"#)
                .unwrap();
        assert_eq!(entry.entry_type, EntryType::Simple);
        assert!(entry.flags.is_empty());
        assert_eq!(entry.weight, 0);

        let entry: Entry = serde_json::from_str(
            r#"{"type": "complex", "value": "x // y equals 1", "flags": ["!", "("]}"#,
        )
        .unwrap();
        assert_eq!(entry.flags, vec![Flag::Not, Flag::Open]);
    }

    #[test]
    fn test_parse_bool() {
        for v in ["true", "T", "Yes", "y", "1"] {
            assert!(parse_bool(v).unwrap());
        }
        for v in ["false", "F", "No", "n", "0"] {
            assert!(!parse_bool(v).unwrap());
        }
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_parse_page_size() {
        assert_eq!(parse_page_size("").unwrap(), 20);
        assert_eq!(parse_page_size("50").unwrap(), 50);
        assert!(parse_page_size("25").is_err());
        assert!(parse_page_size("lots").is_err());
    }
}
