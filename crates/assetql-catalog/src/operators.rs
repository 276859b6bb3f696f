//! Static operator catalog.
//!
//! Every query operator the wizard understands is declared here as a
//! compile-time constant: its user-facing name, the comparison tag the GUI
//! expression builder expects, the AQL template it renders, and the value
//! parser that prepares its operand. [`OperatorTypeMap`]s group the
//! operators that are legal for a given field type signature, and
//! [`get_type_map`] / [`get_operator`] are the two lookups the wizard
//! performs per entry.

use tracing::warn;

use crate::error::{CatalogError, CatalogResult};
use crate::schema::{FieldFormat, FieldSchema, FieldType, Signature};

/// Which value parser prepares the operand for an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserKind {
    ToCsvAdapters,
    ToCsvCnxLabel,
    ToCsvInt,
    ToCsvIp,
    ToCsvStr,
    ToCsvSubnet,
    ToCsvTags,
    ToDt,
    ToInSubnet,
    ToInt,
    ToIp,
    ToNone,
    ToRawVersion,
    ToStr,
    ToStrAdapters,
    ToStrCnxLabel,
    ToStrEscapedRegex,
    ToStrSubnet,
    ToStrTags,
}

/// A parsed operand ready to be spliced into an AQL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AqlValue {
    /// No operand (operators like `exists` or `true`).
    None,
    /// A single rendered operand.
    Text(String),
    /// Inclusive integer bounds for the subnet range operators.
    Bounds { start: u32, end: u32 },
}

/// A query operator.
///
/// `name` is the token users write (`earlier_than`), `op` is the comparison
/// tag the GUI expression carries (`earlier than`). The template uses
/// `{field}` and `{aql_value}` placeholders, or `{aql_value_start}` /
/// `{aql_value_end}` for operators that take [`AqlValue::Bounds`].
#[derive(Debug, PartialEq, Eq)]
pub struct Operator {
    pub name: &'static str,
    pub op: &'static str,
    pub template: &'static str,
    pub parser: ParserKind,
}

impl Operator {
    /// Renders the AQL fragment for this operator.
    pub fn render(&self, field: &str, value: &AqlValue) -> String {
        let out = self.template.replace("{field}", field);
        match value {
            AqlValue::None => out,
            AqlValue::Text(text) => out.replace("{aql_value}", text),
            AqlValue::Bounds { start, end } => out
                .replace("{aql_value_start}", &start.to_string())
                .replace("{aql_value_end}", &end.to_string()),
        }
    }
}

/// The operator definitions.
pub mod ops {
    use super::{Operator, ParserKind};

    pub static CONTAINS: Operator = Operator {
        name: "contains",
        op: "contains",
        template: r#"("{field}" == regex("{aql_value}", "i"))"#,
        parser: ParserKind::ToStrEscapedRegex,
    };
    pub static COUNT_EQUALS: Operator = Operator {
        name: "count_equals",
        op: "count_equals",
        template: r#"("{field}" == size({aql_value}))"#,
        parser: ParserKind::ToInt,
    };
    pub static COUNT_BELOW: Operator = Operator {
        name: "count_below",
        op: "count_below",
        template: r#"("{field}" < size({aql_value}))"#,
        parser: ParserKind::ToInt,
    };
    pub static COUNT_ABOVE: Operator = Operator {
        name: "count_above",
        op: "count_above",
        template: r#"("{field}" > size({aql_value}))"#,
        parser: ParserKind::ToInt,
    };
    pub static ENDSWITH: Operator = Operator {
        name: "endswith",
        op: "ends",
        template: r#"("{field}" == regex("{aql_value}$", "i"))"#,
        parser: ParserKind::ToStrEscapedRegex,
    };
    pub static EQUALS_STR: Operator = Operator {
        name: "equals",
        op: "equals",
        template: r#"("{field}" == "{aql_value}")"#,
        parser: ParserKind::ToStr,
    };
    pub static EQUALS_STR_TAG: Operator = Operator {
        name: "equals",
        op: "equals",
        template: r#"("{field}" == "{aql_value}")"#,
        parser: ParserKind::ToStrTags,
    };
    pub static EQUALS_STR_ADAPTER: Operator = Operator {
        name: "equals",
        op: "equals",
        template: r#"("{field}" == "{aql_value}")"#,
        parser: ParserKind::ToStrAdapters,
    };
    pub static EQUALS_STR_CNX_LABEL: Operator = Operator {
        name: "equals",
        op: "equals",
        template: r#"("{field}" == "{aql_value}")"#,
        parser: ParserKind::ToStrCnxLabel,
    };
    pub static EQUALS_IP: Operator = Operator {
        name: "equals",
        op: "equals",
        template: r#"("{field}" == "{aql_value}")"#,
        parser: ParserKind::ToIp,
    };
    pub static EQUALS_SUBNET: Operator = Operator {
        name: "equals",
        op: "equals",
        template: r#"("{field}" == "{aql_value}")"#,
        parser: ParserKind::ToStrSubnet,
    };
    pub static EQUALS_INT: Operator = Operator {
        name: "equals",
        op: "equals",
        template: r#"("{field}" == {aql_value})"#,
        parser: ParserKind::ToInt,
    };
    pub static EXISTS: Operator = Operator {
        name: "exists",
        op: "exists",
        template: r#"(("{field}" == ({"$exists":true,"$ne":""})))"#,
        parser: ParserKind::ToNone,
    };
    pub static EXISTS_ARRAY: Operator = Operator {
        name: "exists",
        op: "exists",
        template: r#"(("{field}" == ({"$exists":true,"$ne":[]})))"#,
        parser: ParserKind::ToNone,
    };
    pub static EXISTS_ARRAY_OBJECT: Operator = Operator {
        name: "exists",
        op: "exists",
        template: r#"(("{field}" == ({"$exists":true,"$ne":[]})) and "{field}" != [])"#,
        parser: ParserKind::ToNone,
    };
    pub static IN_SUBNET: Operator = Operator {
        name: "in_subnet",
        op: "subnet",
        template: r#"("{field}_raw" == match({"$gte": {aql_value_start}, "$lte": {aql_value_end}}))"#,
        parser: ParserKind::ToInSubnet,
    };
    pub static NOT_IN_SUBNET: Operator = Operator {
        name: "not_in_subnet",
        op: "notInSubnet",
        template: r#"(("{field}_raw" == match({"$gte": 0, "$lte": {aql_value_start}}) or "{field}_raw" == match({"$gte": {aql_value_end}, "$lte": 4294967295})))"#,
        parser: ParserKind::ToInSubnet,
    };
    pub static IS_IPV4: Operator = Operator {
        name: "is_ipv4",
        op: "isIPv4",
        template: r#"("{field}" == regex("\."))"#,
        parser: ParserKind::ToNone,
    };
    pub static IS_IPV6: Operator = Operator {
        name: "is_ipv6",
        op: "isIPv6",
        template: r#"("{field}" == regex(":"))"#,
        parser: ParserKind::ToNone,
    };
    pub static IN_STR: Operator = Operator {
        name: "in",
        op: "IN",
        template: r#"("{field}" in [{aql_value}])"#,
        parser: ParserKind::ToCsvStr,
    };
    pub static IN_STR_TAG: Operator = Operator {
        name: "in",
        op: "IN",
        template: r#"("{field}" in [{aql_value}])"#,
        parser: ParserKind::ToCsvTags,
    };
    pub static IN_STR_ADAPTER: Operator = Operator {
        name: "in",
        op: "IN",
        template: r#"("{field}" in [{aql_value}])"#,
        parser: ParserKind::ToCsvAdapters,
    };
    pub static IN_STR_CNX_LABEL: Operator = Operator {
        name: "in",
        op: "IN",
        template: r#"("{field}" in [{aql_value}])"#,
        parser: ParserKind::ToCsvCnxLabel,
    };
    // The GUI emits integer IN clauses without outer parens.
    pub static IN_INT: Operator = Operator {
        name: "in",
        op: "IN",
        template: r#""{field}" in [{aql_value}]"#,
        parser: ParserKind::ToCsvInt,
    };
    pub static IN_IP: Operator = Operator {
        name: "in",
        op: "IN",
        template: r#"("{field}" in [{aql_value}])"#,
        parser: ParserKind::ToCsvIp,
    };
    pub static IN_SUBNET_LIST: Operator = Operator {
        name: "in",
        op: "IN",
        template: r#"("{field}" in [{aql_value}])"#,
        parser: ParserKind::ToCsvSubnet,
    };
    pub static IS_FALSE: Operator = Operator {
        name: "false",
        op: "false",
        template: r#"("{field}" == false)"#,
        parser: ParserKind::ToNone,
    };
    pub static IS_TRUE: Operator = Operator {
        name: "true",
        op: "true",
        template: r#"("{field}" == true)"#,
        parser: ParserKind::ToNone,
    };
    pub static LAST_HOURS: Operator = Operator {
        name: "last_hours",
        op: "hours",
        template: r#"("{field}" >= date("NOW - {aql_value}h"))"#,
        parser: ParserKind::ToInt,
    };
    pub static LAST_DAYS: Operator = Operator {
        name: "last_days",
        op: "days",
        template: r#"("{field}" >= date("NOW - {aql_value}d"))"#,
        parser: ParserKind::ToInt,
    };
    pub static LESS_THAN_DATE: Operator = Operator {
        name: "less_than",
        op: "<",
        template: r#"("{field}" < date("{aql_value}"))"#,
        parser: ParserKind::ToDt,
    };
    pub static LESS_THAN_INT: Operator = Operator {
        name: "less_than",
        op: "<",
        template: r#"("{field}" < {aql_value})"#,
        parser: ParserKind::ToInt,
    };
    pub static EARLIER_THAN_VERSION: Operator = Operator {
        name: "earlier_than",
        op: "earlier than",
        template: r#"("{field}_raw" < '{aql_value}')"#,
        parser: ParserKind::ToRawVersion,
    };
    pub static MORE_THAN_DATE: Operator = Operator {
        name: "more_than",
        op: ">",
        template: r#"("{field}" > date("{aql_value}"))"#,
        parser: ParserKind::ToDt,
    };
    pub static MORE_THAN_INT: Operator = Operator {
        name: "more_than",
        op: ">",
        template: r#"("{field}" > {aql_value})"#,
        parser: ParserKind::ToInt,
    };
    pub static LATER_THAN_VERSION: Operator = Operator {
        name: "later_than",
        op: "later than",
        template: r#"("{field}_raw" > '{aql_value}')"#,
        parser: ParserKind::ToRawVersion,
    };
    pub static NEXT_HOURS: Operator = Operator {
        name: "next_hours",
        op: "next_hours",
        template: r#"("{field}" >= date("NOW + {aql_value}h"))"#,
        parser: ParserKind::ToInt,
    };
    pub static NEXT_DAYS: Operator = Operator {
        name: "next_days",
        op: "next_days",
        template: r#"("{field}" >= date("NOW + {aql_value}d"))"#,
        parser: ParserKind::ToInt,
    };
    pub static REGEX: Operator = Operator {
        name: "regex",
        op: "regex",
        template: r#"("{field}" == regex("{aql_value}", "i"))"#,
        parser: ParserKind::ToStr,
    };
    pub static STARTSWITH: Operator = Operator {
        name: "startswith",
        op: "starts",
        template: r#"("{field}" == regex("^{aql_value}", "i"))"#,
        parser: ParserKind::ToStrEscapedRegex,
    };
}

/// The set of operators that are legal for one field type signature.
#[derive(Debug)]
pub struct OperatorTypeMap {
    pub name: &'static str,
    pub field_type: FieldType,
    pub field_format: Option<FieldFormat>,
    pub items_type: Option<FieldType>,
    pub items_format: Option<FieldFormat>,
    pub operators: &'static [&'static Operator],
}

impl OperatorTypeMap {
    /// The type signature this map covers.
    pub fn signature(&self) -> Signature {
        (
            self.field_type,
            self.field_format,
            self.items_type,
            self.items_format,
        )
    }

    /// Newline-prefixed listing of operator names, for error messages.
    pub fn valid_operators(&self) -> String {
        self.operators
            .iter()
            .map(|op| format!("\n - {}", op.name))
            .collect()
    }
}

macro_rules! type_map {
    ($name:literal, ($ft:expr, $ff:expr, $it:expr, $if_:expr), [$($op:ident),+ $(,)?]) => {
        OperatorTypeMap {
            name: $name,
            field_type: $ft,
            field_format: $ff,
            items_type: $it,
            items_format: $if_,
            operators: &[$(&ops::$op),+],
        }
    };
}

pub static STRING: OperatorTypeMap = type_map!(
    "string",
    (FieldType::String, None, None, None),
    [EXISTS, REGEX, CONTAINS, EQUALS_STR, STARTSWITH, ENDSWITH, IN_STR]
);

pub static STRING_CNX_LABEL: OperatorTypeMap = type_map!(
    "string_cnx_label",
    (FieldType::String, Some(FieldFormat::ConnectionLabel), None, None),
    [EXISTS, EQUALS_STR_CNX_LABEL, IN_STR_CNX_LABEL]
);

pub static STRING_OS_DISTRIBUTION: OperatorTypeMap = type_map!(
    "string_os_distribution",
    (FieldType::String, Some(FieldFormat::OsDistribution), None, None),
    [EXISTS, REGEX, CONTAINS, EQUALS_STR, STARTSWITH, ENDSWITH, IN_STR]
);

pub static STRING_TAG: OperatorTypeMap = type_map!(
    "string_tag",
    (FieldType::String, Some(FieldFormat::Tag), None, None),
    [EXISTS, REGEX, CONTAINS, EQUALS_STR_TAG, STARTSWITH, ENDSWITH, IN_STR_TAG]
);

pub static STRING_IP: OperatorTypeMap = type_map!(
    "string_ip",
    (FieldType::String, Some(FieldFormat::Ip), None, None),
    [
        EXISTS,
        REGEX,
        CONTAINS,
        IN_IP,
        EQUALS_IP,
        IN_SUBNET,
        NOT_IN_SUBNET,
        IS_IPV4,
        IS_IPV6,
    ]
);

pub static STRING_DATETIME: OperatorTypeMap = type_map!(
    "string_datetime",
    (FieldType::String, Some(FieldFormat::DateTime), None, None),
    [
        EXISTS,
        LESS_THAN_DATE,
        MORE_THAN_DATE,
        LAST_HOURS,
        NEXT_HOURS,
        LAST_DAYS,
        NEXT_DAYS,
    ]
);

pub static STRING_DATE: OperatorTypeMap = type_map!(
    "string_date",
    (FieldType::String, Some(FieldFormat::Date), None, None),
    [
        EXISTS,
        LESS_THAN_DATE,
        MORE_THAN_DATE,
        LAST_HOURS,
        NEXT_HOURS,
        LAST_DAYS,
        NEXT_DAYS,
    ]
);

pub static STRING_IMAGE: OperatorTypeMap = type_map!(
    "string_image",
    (FieldType::String, Some(FieldFormat::Image), None, None),
    [EXISTS]
);

pub static STRING_VERSION: OperatorTypeMap = type_map!(
    "string_version",
    (FieldType::String, Some(FieldFormat::Version), None, None),
    [
        EXISTS,
        REGEX,
        CONTAINS,
        IN_STR,
        EQUALS_STR,
        EARLIER_THAN_VERSION,
        LATER_THAN_VERSION,
    ]
);

pub static STRING_SUBNET: OperatorTypeMap = type_map!(
    "string_subnet",
    (FieldType::String, Some(FieldFormat::Subnet), None, None),
    [EXISTS, REGEX, CONTAINS, IN_SUBNET_LIST, EQUALS_SUBNET]
);

pub static BOOLEAN: OperatorTypeMap = type_map!(
    "boolean",
    (FieldType::Boolean, None, None, None),
    [IS_TRUE, IS_FALSE]
);

pub static INTEGER: OperatorTypeMap = type_map!(
    "integer",
    (FieldType::Integer, None, None, None),
    [EXISTS, EQUALS_INT, IN_INT, LESS_THAN_INT, MORE_THAN_INT]
);

pub static NUMBER: OperatorTypeMap = type_map!(
    "number",
    (FieldType::Number, None, None, None),
    [EXISTS, EQUALS_INT, IN_INT, LESS_THAN_INT, MORE_THAN_INT]
);

pub static ARRAY_OBJECT: OperatorTypeMap = type_map!(
    "array_object",
    (FieldType::Array, None, Some(FieldType::Array), None),
    [EXISTS_ARRAY_OBJECT, COUNT_EQUALS]
);

pub static ARRAY_TABLE_OBJECT: OperatorTypeMap = type_map!(
    "array_table_object",
    (FieldType::Array, Some(FieldFormat::Table), Some(FieldType::Array), None),
    [EXISTS_ARRAY_OBJECT, COUNT_EQUALS]
);

pub static ARRAY_INTEGER: OperatorTypeMap = type_map!(
    "array_integer",
    (FieldType::Array, None, Some(FieldType::Integer), None),
    [EXISTS_ARRAY, EQUALS_INT, IN_INT, LESS_THAN_INT, MORE_THAN_INT]
);

pub static ARRAY_NUMBER: OperatorTypeMap = type_map!(
    "array_number",
    (FieldType::Array, None, Some(FieldType::Number), None),
    [EXISTS_ARRAY, EQUALS_INT, IN_INT, LESS_THAN_INT, MORE_THAN_INT]
);

pub static ARRAY_STRING: OperatorTypeMap = type_map!(
    "array_string",
    (FieldType::Array, None, Some(FieldType::String), None),
    [EXISTS_ARRAY, REGEX, CONTAINS, EQUALS_STR, STARTSWITH, ENDSWITH, IN_STR]
);

pub static ARRAY_STRING_TAG: OperatorTypeMap = type_map!(
    "array_string_tag",
    (FieldType::Array, None, Some(FieldType::String), Some(FieldFormat::Tag)),
    [
        EXISTS_ARRAY,
        COUNT_EQUALS,
        REGEX,
        CONTAINS,
        EQUALS_STR_TAG,
        STARTSWITH,
        ENDSWITH,
        IN_STR_TAG,
    ]
);

pub static ARRAY_STRING_VERSION: OperatorTypeMap = type_map!(
    "array_string_version",
    (
        FieldType::Array,
        Some(FieldFormat::Version),
        Some(FieldType::String),
        Some(FieldFormat::Version)
    ),
    [
        EXISTS_ARRAY,
        REGEX,
        CONTAINS,
        IN_STR,
        EQUALS_STR,
        EARLIER_THAN_VERSION,
        LATER_THAN_VERSION,
    ]
);

pub static ARRAY_STRING_DATETIME: OperatorTypeMap = type_map!(
    "array_string_datetime",
    (
        FieldType::Array,
        Some(FieldFormat::DateTime),
        Some(FieldType::String),
        Some(FieldFormat::DateTime)
    ),
    [
        EXISTS_ARRAY,
        LESS_THAN_DATE,
        MORE_THAN_DATE,
        LAST_HOURS,
        NEXT_HOURS,
        LAST_DAYS,
        NEXT_DAYS,
    ]
);

pub static ARRAY_STRING_SUBNET: OperatorTypeMap = type_map!(
    "array_string_subnet",
    (
        FieldType::Array,
        Some(FieldFormat::Subnet),
        Some(FieldType::String),
        Some(FieldFormat::Subnet)
    ),
    [EXISTS_ARRAY, REGEX, CONTAINS, IN_SUBNET_LIST, EQUALS_SUBNET]
);

pub static ARRAY_DISCRETE_STRING_LOGO: OperatorTypeMap = type_map!(
    "array_discrete_string_logo",
    (
        FieldType::Array,
        Some(FieldFormat::Discrete),
        Some(FieldType::String),
        Some(FieldFormat::Logo)
    ),
    [
        EXISTS_ARRAY,
        EQUALS_STR_ADAPTER,
        COUNT_EQUALS,
        COUNT_BELOW,
        COUNT_ABOVE,
        IN_STR_ADAPTER,
    ]
);

pub static ARRAY_STRING_IP: OperatorTypeMap = type_map!(
    "array_string_ip",
    (
        FieldType::Array,
        Some(FieldFormat::Ip),
        Some(FieldType::String),
        Some(FieldFormat::Ip)
    ),
    [
        EXISTS_ARRAY,
        REGEX,
        CONTAINS,
        IN_IP,
        EQUALS_IP,
        IN_SUBNET,
        NOT_IN_SUBNET,
        IS_IPV4,
        IS_IPV6,
    ]
);

pub static ARRAY_STRING_IP_PREFERRED: OperatorTypeMap = type_map!(
    "array_string_ip_preferred",
    (
        FieldType::Array,
        Some(FieldFormat::IpPreferred),
        Some(FieldType::String),
        Some(FieldFormat::IpPreferred)
    ),
    [
        EXISTS_ARRAY,
        REGEX,
        CONTAINS,
        IN_IP,
        EQUALS_IP,
        IN_SUBNET,
        NOT_IN_SUBNET,
        IS_IPV4,
        IS_IPV6,
    ]
);

/// Every known operator type map, in match order.
pub static TYPE_MAPS: &[&OperatorTypeMap] = &[
    &STRING,
    &STRING_CNX_LABEL,
    &STRING_OS_DISTRIBUTION,
    &STRING_TAG,
    &STRING_IP,
    &STRING_DATETIME,
    &STRING_DATE,
    &STRING_IMAGE,
    &STRING_VERSION,
    &STRING_SUBNET,
    &BOOLEAN,
    &INTEGER,
    &NUMBER,
    &ARRAY_OBJECT,
    &ARRAY_TABLE_OBJECT,
    &ARRAY_INTEGER,
    &ARRAY_NUMBER,
    &ARRAY_STRING,
    &ARRAY_STRING_TAG,
    &ARRAY_STRING_VERSION,
    &ARRAY_STRING_DATETIME,
    &ARRAY_STRING_SUBNET,
    &ARRAY_DISCRETE_STRING_LOGO,
    &ARRAY_STRING_IP,
    &ARRAY_STRING_IP_PREFERRED,
];

fn signature_text(signature: &Signature) -> String {
    format!(
        "field_type: {:?}, field_format: {:?}, items_type: {:?}, items_format: {:?}",
        signature.0, signature.1, signature.2, signature.3
    )
}

/// Finds the type map whose signature matches the field exactly.
pub fn find_type_map(schema: &FieldSchema) -> CatalogResult<&'static OperatorTypeMap> {
    let signature = schema.signature();
    TYPE_MAPS
        .iter()
        .find(|map| map.signature() == signature)
        .copied()
        .ok_or_else(|| CatalogError::UnknownSignature {
            field: schema.name.clone(),
            signature: signature_text(&signature),
            candidates: TYPE_MAPS
                .iter()
                .map(|map| format!("\n - {}: {}", map.name, signature_text(&map.signature())))
                .collect(),
        })
}

/// The type map for a field, falling back on an unknown signature.
///
/// Fields with schemas this catalog has never seen still have to be
/// queryable, so a miss degrades to plain string semantics: `array_string`
/// when the schema carries an items clause, `string` otherwise.
pub fn get_type_map(schema: &FieldSchema) -> &'static OperatorTypeMap {
    match find_type_map(schema) {
        Ok(map) => map,
        Err(err) => {
            let is_array = schema.items.is_some();
            let assume = if is_array { &ARRAY_STRING } else { &STRING };
            warn!(
                field = %schema.name,
                fallback = assume.name,
                "unexpected field schema: {err}",
            );
            assume
        }
    }
}

/// Looks up an operator by name within the field's type map.
///
/// The name is lowercased and trimmed first. On a miss the error lists
/// every operator the field supports, and names the parent field when the
/// schema is a sub-field of a complex field.
pub fn get_operator(schema: &FieldSchema, operator: &str) -> CatalogResult<&'static Operator> {
    let wanted = operator.trim().to_lowercase();
    let type_map = get_type_map(schema);

    if let Some(op) = type_map.operators.iter().find(|op| op.name == wanted) {
        return Ok(op);
    }

    let field = if schema.is_sub_field() {
        format!("{} (sub field of {})", schema.name, schema.parent)
    } else {
        schema.name.clone()
    };
    Err(CatalogError::UnknownOperator {
        operator: wanted,
        field,
        type_map: type_map.name.to_string(),
        valid: type_map.valid_operators(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_simple_template() {
        let rendered = ops::CONTAINS.render("hostname", &AqlValue::Text("test".to_string()));
        assert_eq!(rendered, r#"("hostname" == regex("test", "i"))"#);
    }

    #[test]
    fn test_render_bounds_template() {
        let rendered = ops::IN_SUBNET.render(
            "network_interfaces.ips",
            &AqlValue::Bounds {
                start: 16908288,
                end: 16908543,
            },
        );
        assert_eq!(
            rendered,
            r#"("network_interfaces.ips_raw" == match({"$gte": 16908288, "$lte": 16908543}))"#
        );
    }

    #[test]
    fn test_render_no_value_template() {
        let rendered = ops::EXISTS.render("hostname", &AqlValue::None);
        assert_eq!(rendered, r#"(("hostname" == ({"$exists":true,"$ne":""})))"#);
    }

    #[test]
    fn test_type_map_names_unique() {
        let mut names: Vec<_> = TYPE_MAPS.iter().map(|map| map.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), TYPE_MAPS.len());
    }

    #[test]
    fn test_type_map_signatures_unique() {
        for (i, a) in TYPE_MAPS.iter().enumerate() {
            for b in &TYPE_MAPS[i + 1..] {
                assert_ne!(a.signature(), b.signature(), "{} vs {}", a.name, b.name);
            }
        }
    }

    #[test]
    fn test_get_type_map_exact_match() {
        let schema = FieldSchema::with_format("first_seen", FieldType::String, FieldFormat::DateTime);
        assert_eq!(get_type_map(&schema).name, "string_datetime");

        let schema = FieldSchema::array(
            "public_ips",
            FieldType::String,
            Some(FieldFormat::Ip),
        );
        assert_eq!(get_type_map(&schema).name, "array_string_ip");
    }

    #[test]
    fn test_get_type_map_fallback() {
        let schema = FieldSchema::with_format("odd", FieldType::Integer, FieldFormat::Ip);
        assert!(find_type_map(&schema).is_err());
        assert_eq!(get_type_map(&schema).name, "string");

        let schema = FieldSchema::array("odd_list", FieldType::Boolean, None);
        assert_eq!(get_type_map(&schema).name, "array_string");
    }

    #[test]
    fn test_get_operator_case_insensitive() {
        let schema = FieldSchema::simple("hostname", FieldType::String);
        let op = get_operator(&schema, " Contains ").unwrap();
        assert_eq!(op.name, "contains");
        assert_eq!(op.parser, ParserKind::ToStrEscapedRegex);
    }

    #[test]
    fn test_get_operator_unknown_lists_valids() {
        let schema = FieldSchema::simple("hostname", FieldType::String);
        let err = get_operator(&schema, "badwolf").unwrap_err();
        let display = err.to_string();
        assert!(display.contains("badwolf"));
        assert!(display.contains("equals"));
        assert!(display.contains("startswith"));
    }

    #[test]
    fn test_get_operator_sub_field_names_parent() {
        let parent = FieldSchema::complex(
            "installed_software",
            vec![FieldSchema::simple("name", FieldType::String)],
        );
        let sub = parent.sub_field("name").unwrap();
        let err = get_operator(sub, "last_days").unwrap_err();
        assert!(err.to_string().contains("sub field of installed_software"));
    }

    #[test]
    fn test_boolean_map_has_no_value_operators() {
        let schema = FieldSchema::simple("from_last_fetch", FieldType::Boolean);
        let map = get_type_map(&schema);
        assert_eq!(map.name, "boolean");
        assert!(get_operator(&schema, "true").is_ok());
        assert!(get_operator(&schema, "equals").is_err());
    }
}
