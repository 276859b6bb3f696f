//! CSV frontend.
//!
//! A CSV file defines one or more saved queries. The first data row must
//! have type `saved_query`; every following row belongs to that saved
//! query until the next `saved_query` row. The `description`, `tags`, and
//! `fields` columns (plus the boolean and page size columns) are only read
//! on `saved_query` rows.

use std::fs;
use std::path::Path;

use assetql_catalog::FieldProvider;
use serde::Serialize;
use tracing::debug;

use crate::entry::{
    parse_bool, parse_page_size, Entry, EntryType, SavedQueryMeta,
};
use crate::error::{WizardError, WizardResult};
use crate::expr::{Expression, ParseResult};
use crate::wizard::Wizard;

const CSV_TYPES: [EntryType; 3] = [EntryType::Simple, EntryType::Complex, EntryType::SavedQuery];
const REQUIRED_COLUMNS: [&str; 2] = ["type", "value"];

/// Sentinel in the `fields` column that expands to the default selection.
const FIELDS_DEFAULT: &str = "default";

/// A saved query compiled from one CSV group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedQuery {
    #[serde(flatten)]
    pub meta: SavedQueryMeta,
    pub expressions: Vec<Expression>,
    pub query: String,
}

#[derive(Debug)]
enum CsvRow {
    Header(Box<SavedQueryMeta>),
    Filter(Entry),
}

impl Wizard<'_> {
    /// Parses CSV content into a set of saved queries.
    pub fn parse_csv(&self, content: &str) -> WizardResult<Vec<SavedQuery>> {
        self.parse_csv_from(content, "csv")
    }

    /// Parses a CSV file into a set of saved queries.
    pub fn parse_csv_path(&self, path: impl AsRef<Path>) -> WizardResult<Vec<SavedQuery>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        self.parse_csv_from(&content, &format!("csv file {}", path.display()))
    }

    fn parse_csv_from(&self, content: &str, source: &str) -> WizardResult<Vec<SavedQuery>> {
        let rows = load_rows(content, source, self.provider)?;
        if rows.is_empty() {
            return Err(WizardError::NoRows {
                detail: format!("no usable rows in {source}"),
            });
        }
        self.process_groups(rows)
    }

    fn process_groups(&self, rows: Vec<CsvRow>) -> WizardResult<Vec<SavedQuery>> {
        let mut saved = Vec::new();
        let mut current: Option<(SavedQueryMeta, Vec<Entry>)> = None;

        for row in rows {
            match row {
                CsvRow::Header(meta) => {
                    if let Some((done, group)) = current.take() {
                        saved.push(self.finish_group(done, group)?);
                    }
                    debug!(name = %meta.name, "starting saved query group");
                    current = Some((*meta, Vec::new()));
                }
                CsvRow::Filter(entry) => match current.as_mut() {
                    Some((_, group)) => group.push(entry),
                    None => {
                        return Err(WizardError::for_entry(
                            entry.source.clone(),
                            WizardError::FirstRowNotSavedQuery {
                                etype: entry.entry_type.to_string(),
                            },
                        ))
                    }
                },
            }
        }

        if let Some((done, group)) = current.take() {
            saved.push(self.finish_group(done, group)?);
        }
        Ok(saved)
    }

    fn finish_group(
        &self,
        meta: SavedQueryMeta,
        group: Vec<Entry>,
    ) -> WizardResult<SavedQuery> {
        let parsed = if group.is_empty() {
            ParseResult {
                expressions: Vec::new(),
                query: String::new(),
            }
        } else {
            self.parse_entries(group, "csv")?
        };
        Ok(SavedQuery {
            meta,
            expressions: parsed.expressions,
            query: parsed.query,
        })
    }
}

fn load_rows(
    content: &str,
    source: &str,
    provider: &dyn FieldProvider,
) -> WizardResult<Vec<CsvRow>> {
    let content = content.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            let found = if headers.iter().all(|h| h.is_empty()) {
                "NONE!".to_string()
            } else {
                headers.join(", ")
            };
            return Err(WizardError::MissingColumn {
                column: column.to_string(),
                found,
            });
        }
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let src = format!("{source} row #{}", idx + 1);
        let cells = RowCells {
            headers: &headers,
            record: &record,
        };
        let row = row_to_entry(&cells, &src, provider)
            .map_err(|err| WizardError::for_entry(src.clone(), err))?;
        if let Some(row) = row {
            rows.push(row);
        } else {
            debug!(row = idx + 1, "skipping row with empty/comment type");
        }
    }
    Ok(rows)
}

struct RowCells<'r> {
    headers: &'r [String],
    record: &'r csv::StringRecord,
}

impl RowCells<'_> {
    fn get(&self, name: &str) -> &str {
        self.headers
            .iter()
            .position(|h| h == name)
            .and_then(|i| self.record.get(i))
            .unwrap_or("")
    }
}

fn row_to_entry(
    cells: &RowCells<'_>,
    src: &str,
    provider: &dyn FieldProvider,
) -> WizardResult<Option<CsvRow>> {
    let etype = cells.get("type").trim();
    if etype.is_empty() || etype.starts_with('#') {
        return Ok(None);
    }
    let entry_type = EntryType::parse(etype, &CSV_TYPES)?;

    let value = cells.get("value");
    if value.trim().is_empty() {
        return Err(WizardError::EmptyValue {
            key: "value".to_string(),
        });
    }
    let value = value.trim_start();

    if entry_type == EntryType::SavedQuery {
        let meta = meta_from_row(cells, value, provider)?;
        return Ok(Some(CsvRow::Header(Box::new(meta))));
    }
    Ok(Some(CsvRow::Filter(
        Entry::new(entry_type, value).with_source(src),
    )))
}

fn meta_from_row(
    cells: &RowCells<'_>,
    name: &str,
    provider: &dyn FieldProvider,
) -> WizardResult<SavedQueryMeta> {
    let description = cells.get("description").trim();
    let description = (!description.is_empty()).then(|| description.to_string());

    let tags: Vec<String> = cells
        .get("tags")
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    let fields_raw = cells.get("fields").trim();
    let fields_raw = if fields_raw.is_empty() {
        FIELDS_DEFAULT
    } else {
        fields_raw
    };
    let mut fields: Vec<String> = fields_raw
        .split(',')
        .map(|f| f.trim().to_lowercase())
        .filter(|f| !f.is_empty())
        .collect();
    if let Some(pos) = fields.iter().position(|f| f == FIELDS_DEFAULT) {
        fields.splice(pos..pos + 1, provider.fields_default());
        fields.retain(|f| f != FIELDS_DEFAULT);
    }

    let bool_cell = |name: &str| -> WizardResult<bool> {
        let raw = cells.get(name).trim();
        if raw.is_empty() {
            Ok(false)
        } else {
            parse_bool(raw)
        }
    };

    Ok(SavedQueryMeta {
        name: name.to_string(),
        description,
        tags,
        fields,
        private: bool_cell("private")?,
        asset_scope: bool_cell("asset_scope")?,
        always_cached: bool_cell("always_cached")?,
        gui_page_size: parse_page_size(cells.get("gui_page_size"))?,
    })
}
