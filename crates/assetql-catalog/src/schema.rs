//! Field schema model for the asset platform's REST catalog.
//!
//! Schemas arrive from the platform's field catalog endpoint and are treated
//! as read-only. The wizard only cares about the handful of keys modeled
//! here: the name variants, the type signature used to pick an operator type
//! map, enum restrictions, and the complex/all/details classification flags.

use serde::{Deserialize, Serialize};

/// The type of a field schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// A string field.
    String,
    /// A boolean field.
    #[serde(rename = "bool")]
    Boolean,
    /// An integer field.
    Integer,
    /// A floating point field.
    Number,
    /// An array field; the `items` schema describes the element type.
    Array,
}

/// The format of a field schema, refining its [`FieldType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFormat {
    /// Full date and time.
    #[serde(rename = "date-time")]
    DateTime,
    /// Date only.
    Date,
    /// An inline image reference.
    Image,
    /// A dotted software version.
    Version,
    /// An IP address.
    Ip,
    /// The platform's "preferred" IP address field.
    IpPreferred,
    /// A CIDR subnet.
    Subnet,
    /// A discrete value set rendered specially by the GUI.
    Discrete,
    /// An adapter logo reference.
    Logo,
    /// A tabular sub-object.
    Table,
    /// An asset tag (label).
    Tag,
    /// An adapter connection label.
    ConnectionLabel,
    /// An OS distribution string.
    #[serde(rename = "os-distribution")]
    OsDistribution,
    /// A dynamically-typed field; ignored for signature matching.
    DynamicField,
}

/// The item schema of an array field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldItems {
    /// The type of each array element.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<FieldType>,

    /// The format of each array element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FieldFormat>,

    /// Valid values for each array element, if restricted.
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,
}

/// The type signature of a field, used to select its operator type map.
///
/// `dynamic_field` formats are normalized to `None` before matching, the
/// same way the GUI treats them.
pub type Signature = (
    FieldType,
    Option<FieldFormat>,
    Option<FieldType>,
    Option<FieldFormat>,
);

/// A field schema from the external catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Fully qualified field name used in AQL and GUI expressions.
    pub name: String,

    /// Human readable title.
    #[serde(default)]
    pub title: String,

    /// Name of the adapter this field belongs to.
    #[serde(default)]
    pub adapter_name: String,

    /// Name of the parent field, or `"root"` for top-level fields.
    #[serde(default = "default_parent")]
    pub parent: String,

    /// Field type tag the GUI expects in expressions.
    #[serde(default = "default_expr_field_type")]
    pub expr_field_type: String,

    /// The type of this field.
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// The format of this field, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FieldFormat>,

    /// Item schema for array fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<FieldItems>,

    /// Valid values for this field, if restricted.
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,

    /// Lower bound for numeric fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,

    /// Upper bound for numeric fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,

    /// Sub-field schemas of a complex field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_fields: Vec<FieldSchema>,

    /// True if this field has named sub-fields filtered via `match`.
    #[serde(default)]
    pub is_complex: bool,

    /// True if this is the "all fields" sentinel; never usable in queries.
    #[serde(default)]
    pub is_all: bool,

    /// True if this is a fetch-details helper field.
    #[serde(default)]
    pub is_details: bool,
}

fn default_parent() -> String {
    "root".to_string()
}

fn default_expr_field_type() -> String {
    "axonius".to_string()
}

impl FieldSchema {
    /// Creates a bare schema with the given name and type.
    pub fn simple(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            title: String::new(),
            adapter_name: "agg".to_string(),
            parent: default_parent(),
            expr_field_type: default_expr_field_type(),
            field_type,
            format: None,
            items: None,
            enum_values: Vec::new(),
            minimum: None,
            maximum: None,
            sub_fields: Vec::new(),
            is_complex: false,
            is_all: false,
            is_details: false,
        }
    }

    /// Creates a schema with the given name, type, and format.
    pub fn with_format(
        name: impl Into<String>,
        field_type: FieldType,
        format: FieldFormat,
    ) -> Self {
        Self {
            format: Some(format),
            ..Self::simple(name, field_type)
        }
    }

    /// Creates an array schema with the given item type and format.
    pub fn array(
        name: impl Into<String>,
        item_type: FieldType,
        item_format: Option<FieldFormat>,
    ) -> Self {
        Self {
            field_type: FieldType::Array,
            format: item_format,
            items: Some(FieldItems {
                item_type: Some(item_type),
                format: item_format,
                enum_values: Vec::new(),
            }),
            ..Self::simple(name, FieldType::Array)
        }
    }

    /// Creates a complex schema with the given sub-fields.
    pub fn complex(name: impl Into<String>, sub_fields: Vec<FieldSchema>) -> Self {
        let name = name.into();
        let sub_fields = sub_fields
            .into_iter()
            .map(|mut sub| {
                sub.parent = name.clone();
                sub
            })
            .collect();
        Self {
            field_type: FieldType::Array,
            items: Some(FieldItems {
                item_type: Some(FieldType::Array),
                format: None,
                enum_values: Vec::new(),
            }),
            sub_fields,
            is_complex: true,
            ..Self::simple(name.clone(), FieldType::Array)
        }
    }

    /// Returns the type signature used to pick an operator type map.
    pub fn signature(&self) -> Signature {
        let normalize = |format: Option<FieldFormat>| match format {
            Some(FieldFormat::DynamicField) => None,
            other => other,
        };
        let (item_type, item_format) = match &self.items {
            Some(items) => (items.item_type, normalize(items.format)),
            None => (None, None),
        };
        (
            self.field_type,
            normalize(self.format),
            item_type,
            item_format,
        )
    }

    /// Returns true if this field is a sub-field of a complex field.
    pub fn is_sub_field(&self) -> bool {
        self.parent != "root"
    }

    /// Returns the enum restriction for values of this field. The top-level
    /// enum wins over the item-level enum of array fields.
    pub fn value_enum(&self) -> &[serde_json::Value] {
        if !self.enum_values.is_empty() {
            return &self.enum_values;
        }
        match &self.items {
            Some(items) => &items.enum_values,
            None => &[],
        }
    }

    /// Looks up a sub-field by name.
    pub fn sub_field(&self, name: &str) -> Option<&FieldSchema> {
        self.sub_fields.iter().find(|sub| sub.name == name)
    }
}
