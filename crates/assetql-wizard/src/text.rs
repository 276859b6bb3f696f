//! Text frontend.
//!
//! One entry per line: the first token is the entry type, the rest of the
//! line is the value. Blank lines and `#` comments are skipped.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::entry::{Entry, EntryType};
use crate::error::{WizardError, WizardResult};
use crate::expr::ParseResult;
use crate::wizard::Wizard;

const TEXT_TYPES: [EntryType; 2] = [EntryType::Simple, EntryType::Complex];

impl Wizard<'_> {
    /// Parses lines of text into a query and GUI expressions.
    ///
    /// # Examples
    ///
    /// ```
    /// # use assetql_catalog::{EnumCache, FieldSchema, FieldType, MemoryCatalog};
    /// # use assetql_wizard::Wizard;
    /// # let catalog = MemoryCatalog::new(vec![
    /// #     FieldSchema::simple("hostname", FieldType::String),
    /// # ]);
    /// # let enums = EnumCache::new();
    /// let wizard = Wizard::new(&catalog, &enums);
    /// let parsed = wizard.parse_text("
    /// ## any comment line is skipped
    /// simple hostname contains test
    /// ").unwrap();
    /// assert_eq!(parsed.query, r#"("hostname" == regex("test", "i"))"#);
    /// ```
    pub fn parse_text(&self, content: &str) -> WizardResult<ParseResult> {
        self.parse_text_from(content, "text")
    }

    /// Parses a text file into a query and GUI expressions.
    pub fn parse_text_path(&self, path: impl AsRef<Path>) -> WizardResult<ParseResult> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        self.parse_text_from(&content, &format!("text file {}", path.display()))
    }

    fn parse_text_from(&self, content: &str, source: &str) -> WizardResult<ParseResult> {
        let entries = lines_to_entries(content, source)?;
        self.parse_entries(entries, source)
    }
}

fn lines_to_entries(content: &str, source: &str) -> WizardResult<Vec<Entry>> {
    let mut entries = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            debug!(line = idx + 1, "skipping blank/comment line");
            continue;
        }
        let src = format!("{source} line #{}: {line}", idx + 1);
        let entry =
            line_to_entry(line, &src).map_err(|err| WizardError::for_entry(src.clone(), err))?;
        entries.push(entry);
    }
    Ok(entries)
}

fn line_to_entry(line: &str, src: &str) -> WizardResult<Entry> {
    let (etype, value) = match line.split_once(' ') {
        Some((etype, value)) => (etype, value.trim_start()),
        None => {
            return Err(WizardError::MissingFilter {
                etype: line.to_string(),
            })
        }
    };
    let entry_type = EntryType::parse(etype, &TEXT_TYPES)?;
    if value.is_empty() {
        return Err(WizardError::MissingFilter {
            etype: entry_type.to_string(),
        });
    }
    Ok(Entry::new(entry_type, value).with_source(src))
}
