//! Value parsers.
//!
//! Each operator names a [`ParserKind`]; [`parse_value`] runs that parser
//! over the raw value text and returns two things: the AQL-ready operand
//! and the raw echo value the GUI expression carries. Enum-restricted
//! fields are validated case-insensitively and the canonical casing from
//! the schema wins. Adapter names, connection labels, and tags validate
//! against allow-lists read through the [`EnumCache`]; an empty allow-list
//! skips validation.

use std::net::{IpAddr, Ipv4Addr};

use assetql_catalog::{AqlValue, EnumCache, FieldProvider, FieldSchema, ParserKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::error::{WizardError, WizardResult};

const DT_FMT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses a raw value for an operator.
///
/// Returns the AQL operand and the raw expression echo value.
pub fn parse_value(
    kind: ParserKind,
    value: &str,
    schema: &FieldSchema,
    provider: &dyn FieldProvider,
    cache: &EnumCache,
) -> WizardResult<(AqlValue, Value)> {
    match kind {
        ParserKind::ToNone => Ok((AqlValue::None, Value::Null)),
        ParserKind::ToStr => {
            let canonical = check_enum_str(check_str(value)?, schema.value_enum())?;
            Ok((AqlValue::Text(canonical.clone()), Value::String(canonical)))
        }
        ParserKind::ToStrEscapedRegex => {
            let raw = check_str(value)?;
            Ok((
                AqlValue::Text(regex::escape(raw)),
                Value::String(raw.to_string()),
            ))
        }
        ParserKind::ToStrAdapters => {
            let canonical =
                check_allowed(check_str(value)?, &cache.adapter_names(provider)?, "adapter")?;
            Ok((AqlValue::Text(canonical.clone()), Value::String(canonical)))
        }
        ParserKind::ToStrCnxLabel => {
            let canonical = check_allowed(
                check_str(value)?,
                &cache.connection_labels(provider)?,
                "connection label",
            )?;
            Ok((AqlValue::Text(canonical.clone()), Value::String(canonical)))
        }
        ParserKind::ToStrTags => {
            let canonical = check_allowed(check_str(value)?, &cache.tags(provider)?, "tag")?;
            Ok((AqlValue::Text(canonical.clone()), Value::String(canonical)))
        }
        ParserKind::ToStrSubnet => {
            let (addr, prefix) = parse_cidr(value)?;
            let text = cidr_string(addr, prefix);
            Ok((AqlValue::Text(text.clone()), Value::String(text)))
        }
        ParserKind::ToIp => {
            let text = parse_ip(value)?;
            Ok((AqlValue::Text(text.clone()), Value::String(text)))
        }
        ParserKind::ToInt => {
            let number = coerce_number(value)?;
            check_bounds(&number, schema)?;
            let number = check_enum_number(number, schema.value_enum())?;
            Ok((AqlValue::Text(number.to_string()), number))
        }
        ParserKind::ToDt => {
            let text = parse_dt(value)?;
            Ok((AqlValue::Text(text.clone()), Value::String(text)))
        }
        ParserKind::ToRawVersion => Ok((
            AqlValue::Text(raw_version(value)?),
            Value::String(value.to_string()),
        )),
        ParserKind::ToInSubnet => {
            let (addr, prefix) = parse_cidr(value)?;
            let (start, end) = cidr_bounds(addr, prefix);
            Ok((
                AqlValue::Bounds { start, end },
                Value::String(cidr_string(addr, prefix)),
            ))
        }
        ParserKind::ToCsvStr
        | ParserKind::ToCsvInt
        | ParserKind::ToCsvIp
        | ParserKind::ToCsvSubnet
        | ParserKind::ToCsvAdapters
        | ParserKind::ToCsvCnxLabel
        | ParserKind::ToCsvTags => parse_csv_list(kind, value, schema, provider, cache),
    }
}

fn check_str(value: &str) -> WizardResult<&str> {
    if value.trim().is_empty() {
        return Err(WizardError::invalid_value("empty value supplied"));
    }
    Ok(value)
}

fn check_enum_str(value: &str, allowed: &[Value]) -> WizardResult<String> {
    if allowed.is_empty() {
        return Ok(value.to_string());
    }
    for item in allowed {
        match item {
            Value::String(s) if s.eq_ignore_ascii_case(value.trim()) => return Ok(s.clone()),
            other if other.to_string() == value.trim() => return Ok(other.to_string()),
            _ => {}
        }
    }
    Err(invalid_enum(value, allowed))
}

fn check_enum_number(value: Value, allowed: &[Value]) -> WizardResult<Value> {
    if allowed.is_empty() {
        return Ok(value);
    }
    let wanted = value.as_f64();
    for item in allowed {
        if item.as_f64().is_some() && item.as_f64() == wanted {
            return Ok(item.clone());
        }
    }
    Err(invalid_enum(&value.to_string(), allowed))
}

fn invalid_enum(value: &str, allowed: &[Value]) -> WizardError {
    let valid: Vec<String> = allowed
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    WizardError::invalid_value(format!(
        "invalid value {value:?} out of {} valid values: {}",
        valid.len(),
        valid.join(", ")
    ))
}

fn check_allowed(value: &str, allowed: &[String], what: &str) -> WizardResult<String> {
    if allowed.is_empty() {
        return Ok(value.to_string());
    }
    allowed
        .iter()
        .find(|item| item.eq_ignore_ascii_case(value.trim()))
        .cloned()
        .ok_or_else(|| {
            WizardError::invalid_value(format!(
                "no {what} found matching {value:?} out of {} known: {}",
                allowed.len(),
                allowed.join(", ")
            ))
        })
}

fn coerce_number(value: &str) -> WizardResult<Value> {
    let trimmed = value.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Ok(Value::from(int));
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        if float.is_finite() {
            if let Some(number) = serde_json::Number::from_f64(float) {
                return Ok(Value::Number(number));
            }
        }
    }
    Err(WizardError::invalid_value(format!(
        "unable to coerce {value:?} into an integer or float"
    )))
}

fn check_bounds(number: &Value, schema: &FieldSchema) -> WizardResult<()> {
    let value = number.as_f64().unwrap_or_default();
    if let Some(minimum) = schema.minimum {
        if value < minimum as f64 {
            return Err(WizardError::invalid_value(format!(
                "value {number} is below the minimum of {minimum} for field {:?}",
                schema.name
            )));
        }
    }
    if let Some(maximum) = schema.maximum {
        if value > maximum as f64 {
            return Err(WizardError::invalid_value(format!(
                "value {number} is above the maximum of {maximum} for field {:?}",
                schema.name
            )));
        }
    }
    Ok(())
}

fn parse_ip(value: &str) -> WizardResult<String> {
    let addr: IpAddr = value
        .trim()
        .parse()
        .map_err(|err| WizardError::invalid_value(format!("invalid IP address {value:?}: {err}")))?;
    Ok(addr.to_string())
}

fn parse_cidr(value: &str) -> WizardResult<(Ipv4Addr, u8)> {
    let trimmed = value.trim();
    let (addr, prefix) = trimmed.split_once('/').ok_or_else(|| {
        WizardError::invalid_value(format!(
            "invalid subnet {value:?}: expected address/prefix notation"
        ))
    })?;
    let addr: Ipv4Addr = addr
        .parse()
        .map_err(|err| WizardError::invalid_value(format!("invalid subnet {value:?}: {err}")))?;
    let prefix: u8 = prefix
        .parse()
        .map_err(|err| WizardError::invalid_value(format!("invalid subnet {value:?}: {err}")))?;
    if prefix > 32 {
        return Err(WizardError::invalid_value(format!(
            "invalid subnet {value:?}: prefix must be 0-32"
        )));
    }
    Ok((addr, prefix))
}

fn cidr_mask(prefix: u8) -> u32 {
    (!0u32).checked_shl(32 - u32::from(prefix)).unwrap_or(0)
}

/// Inclusive network and broadcast addresses as integers.
fn cidr_bounds(addr: Ipv4Addr, prefix: u8) -> (u32, u32) {
    let mask = cidr_mask(prefix);
    let network = u32::from(addr) & mask;
    (network, network | !mask)
}

/// The subnet in normalized CIDR notation, host bits masked off.
fn cidr_string(addr: Ipv4Addr, prefix: u8) -> String {
    let (network, _) = cidr_bounds(addr, prefix);
    format!("{}/{}", Ipv4Addr::from(network), prefix)
}

fn parse_dt(value: &str) -> WizardResult<String> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_utc().format(DT_FMT).to_string());
    }
    for fmt in [DT_FMT, "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt.format(DT_FMT).to_string());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.format(DT_FMT).to_string());
        }
    }
    Err(WizardError::invalid_value(format!(
        "unable to parse {value:?} as a date or datetime"
    )))
}

/// Converts a dotted version into its sortable raw form.
///
/// An optional `epoch:` prefix defaults to `0` and is emitted verbatim;
/// every dotted octet must be all digits and is truncated to its first 8
/// digits, then zero-filled to width 8. `"82.6.2"` becomes
/// `"0000000820000000600000002"`.
fn raw_version(value: &str) -> WizardResult<String> {
    let trimmed = value.trim();
    let (epoch, rest) = match trimmed.split_once(':') {
        Some((epoch, rest)) => (epoch, rest),
        None => ("0", trimmed),
    };
    let mut out = epoch.to_string();
    for octet in rest.split('.') {
        if octet.is_empty() || !octet.bytes().all(|b| b.is_ascii_digit()) {
            return Err(WizardError::invalid_value(format!(
                "non-numeric segment {octet:?} in version {value:?}"
            )));
        }
        let octet = &octet[..octet.len().min(8)];
        out.push_str(&format!("{octet:0>8}"));
    }
    Ok(out)
}

fn parse_csv_list(
    kind: ParserKind,
    value: &str,
    schema: &FieldSchema,
    provider: &dyn FieldProvider,
    cache: &EnumCache,
) -> WizardResult<(AqlValue, Value)> {
    let items: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect();
    if items.is_empty() {
        return Err(WizardError::invalid_value(format!(
            "no items found in list value {value:?}"
        )));
    }

    let count = items.len();
    let mut converted = Vec::with_capacity(count);
    for (idx, item) in items.iter().enumerate() {
        let parsed = csv_item(kind, item, schema, provider, cache).map_err(|err| {
            WizardError::CsvItem {
                index: idx + 1,
                count,
                value: value.to_string(),
                source: Box::new(err),
            }
        })?;
        converted.push(parsed);
    }

    let quoted = !matches!(kind, ParserKind::ToCsvInt);
    let aql = converted
        .iter()
        .map(|item| {
            if quoted {
                format!("\"{item}\"")
            } else {
                item.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    let echo = converted.join(",");
    Ok((AqlValue::Text(aql), Value::String(echo)))
}

fn csv_item(
    kind: ParserKind,
    item: &str,
    schema: &FieldSchema,
    provider: &dyn FieldProvider,
    cache: &EnumCache,
) -> WizardResult<String> {
    match kind {
        ParserKind::ToCsvStr => check_enum_str(item, schema.value_enum()),
        ParserKind::ToCsvInt => {
            let number = coerce_number(item)?;
            check_bounds(&number, schema)?;
            Ok(check_enum_number(number, schema.value_enum())?.to_string())
        }
        ParserKind::ToCsvIp => parse_ip(item),
        ParserKind::ToCsvSubnet => {
            let (addr, prefix) = parse_cidr(item)?;
            Ok(cidr_string(addr, prefix))
        }
        ParserKind::ToCsvAdapters => {
            check_allowed(item, &cache.adapter_names(provider)?, "adapter")
        }
        ParserKind::ToCsvCnxLabel => {
            check_allowed(item, &cache.connection_labels(provider)?, "connection label")
        }
        ParserKind::ToCsvTags => check_allowed(item, &cache.tags(provider)?, "tag"),
        _ => unreachable!("not a csv parser kind"),
    }
}
