//! Flag extraction and the bracket state machine.
//!
//! Values can carry control flags at the front (`!`, `&`, `|`, `(`) and a
//! close-bracket at the very end. [`split_flags`] strips them off one value;
//! [`parse_flags`] then runs the sequential bracket pass over the whole
//! entry list, assigning weights and repairing unbalanced brackets.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::entry::{Entry, Flag};
use crate::error::{WizardError, WizardResult};

static LEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<flags>[^a-zA-Z0-9]*)(?P<value>.*)$").expect("leading flags regex"));

/// Splits leading and trailing control flags off a raw value.
///
/// Every character in the leading non-alphanumeric run that maps to a flag
/// is collected; other characters in the run (spaces, stray punctuation)
/// are discarded. A single trailing `)` (with or without a preceding space)
/// becomes a [`Flag::Close`]. Errors if nothing remains after the strip.
pub fn split_flags(value_raw: &str, mut flags: Vec<Flag>) -> WizardResult<(Vec<Flag>, String)> {
    let caps = LEADING.captures(value_raw).ok_or_else(|| {
        WizardError::EmptyAfterFlags {
            value: value_raw.to_string(),
        }
    })?;

    let mut value = caps.name("value").map_or("", |m| m.as_str()).to_string();
    if value.is_empty() {
        return Err(WizardError::EmptyAfterFlags {
            value: value_raw.to_string(),
        });
    }

    let leading = caps.name("flags").map_or("", |m| m.as_str());
    flags.extend(leading.chars().filter_map(Flag::from_char));

    for suffix in [" )", ")"] {
        if let Some(stripped) = value.strip_suffix(suffix) {
            value = stripped.to_string();
            flags.push(Flag::Close);
            break;
        }
    }

    debug!(value_raw, ?flags, value, "split flags");
    Ok((flags, value))
}

/// Runs the bracket pass over a freshly normalized entry list.
///
/// Single-shot: entries must not have been through this pass before. Each
/// entry first has its flags split out of its value, then the bracket
/// branches run in order, carrying `is_open` and a weight tracker across
/// entries:
///
/// - an open while a bracket is already open force-closes the previous
///   entry (brackets never nest),
/// - an orphan close gets an open synthesized on the same entry,
/// - entries inside a bracket get increasing weights, the opener gets −1,
///   entries outside get 0,
/// - a bracket still open at the last entry is force-closed.
pub fn parse_flags(entries: &mut [Entry]) -> WizardResult<()> {
    let count = entries.len();
    let mut is_open = false;
    let mut tracker: i64 = 0;

    for idx in 0..count {
        let pending = std::mem::take(&mut entries[idx].flags);
        let (flags, value) = split_flags(&entries[idx].value, pending)
            .map_err(|err| WizardError::for_entry(entries[idx].source.clone(), err))?;
        entries[idx].flags = flags;
        entries[idx].value = value;
        let is_last = idx + 1 == count;

        if is_open && entries[idx].has_flag(Flag::Open) {
            debug!(idx, "bracket already open, closing previous entry");
            entries[idx - 1].flags.push(Flag::Close);
        }

        if !is_open && entries[idx].has_flag(Flag::Close) {
            debug!(idx, "orphan close, synthesizing open on this entry");
            entries[idx].flags.push(Flag::Open);
            entries[idx].weight = -1;
            tracker = 0;
        }

        if is_open {
            tracker += 1;
            entries[idx].weight = tracker;
        }

        if !is_open && !entries[idx].has_flag(Flag::Open) {
            entries[idx].weight = 0;
        }

        if entries[idx].has_flag(Flag::Open) {
            entries[idx].weight = -1;
            tracker = 0;
            is_open = true;
        }

        if entries[idx].has_flag(Flag::Close) {
            is_open = false;
            tracker = 0;
        }

        if is_last && is_open && !entries[idx].has_flag(Flag::Close) {
            debug!(idx, "last entry with bracket still open, force closing");
            entries[idx].flags.push(Flag::Close);
            tracker = 0;
        }

        debug!(
            idx,
            flags = ?entries[idx].flags,
            weight = entries[idx].weight,
            is_open,
            tracker,
            "parsed entry flags",
        );
    }
    Ok(())
}
