//! GUI expression building.
//!
//! The GUI query builder consumes a JSON tree of expressions alongside the
//! AQL string. Key names and layout here are exactly what it expects, so
//! [`Expression`] serializes with camelCase wire keys, `i` is omitted on
//! the first expression, and complex expressions carry a `context` marker.

use assetql_catalog::FieldSchema;
use serde::Serialize;
use serde_json::Value;

use crate::entry::{Entry, Flag};

/// Context marker for complex-field expressions.
const CONTEXT_OBJ: &str = "OBJ";

/// The result of parsing a batch of entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseResult {
    /// GUI expressions, one per entry.
    pub expressions: Vec<Expression>,
    /// The AQL string, space-joined from every expression's filter.
    pub query: String,
}

/// One GUI expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expression {
    pub bracket_weight: i64,
    pub children: Vec<ExpressionChild>,
    pub comp_op: String,
    pub field: String,
    pub field_type: String,
    pub filter: String,
    pub filtered_adapters: Value,
    pub left_bracket: bool,
    pub logic_op: String,
    pub r#not: bool,
    pub right_bracket: bool,
    pub value: Value,
    #[serde(rename = "i", skip_serializing_if = "idx_is_zero")]
    pub idx: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

fn idx_is_zero(idx: &usize) -> bool {
    *idx == 0
}

/// A child of a complex expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionChild {
    pub condition: String,
    pub expression: ChildFilter,
    #[serde(rename = "i")]
    pub idx: usize,
}

/// The inner filter of an [`ExpressionChild`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildFilter {
    #[serde(rename = "compOp")]
    pub comp_op: String,
    pub field: String,
    #[serde(rename = "filteredAdapters")]
    pub filtered_adapters: Value,
    pub value: Value,
}

impl Default for ExpressionChild {
    fn default() -> Self {
        Self::build(String::new(), "", "", Value::Null, 0)
    }
}

impl ExpressionChild {
    /// Builds a child expression.
    pub fn build(
        query: String,
        comp_op: &str,
        field: &str,
        value: Value,
        idx: usize,
    ) -> ExpressionChild {
        ExpressionChild {
            condition: query,
            expression: ChildFilter {
                comp_op: comp_op.to_string(),
                field: field.to_string(),
                filtered_adapters: Value::Null,
                value,
            },
            idx,
        }
    }
}

impl Expression {
    /// Builds an expression from a flag-parsed entry.
    ///
    /// The query fragment is wrapped inside out: NOT first, then the close
    /// paren, then the open paren, then the AND/OR prefix for every
    /// expression after the first. An expression without children gets one
    /// empty child, matching what the GUI emits itself.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        entry: &Entry,
        mut query: String,
        field: &FieldSchema,
        idx: usize,
        comp_op: &str,
        value: Value,
        children: Vec<ExpressionChild>,
        is_complex: bool,
    ) -> Expression {
        let is_not = entry.has_flag(Flag::Not);
        let is_left = entry.has_flag(Flag::Open);
        let is_right = entry.has_flag(Flag::Close);
        let is_or = entry.has_flag(Flag::Or);

        if is_not {
            query = format!("not {query}");
        }
        if is_right {
            query = format!("{query})");
        }
        if is_left {
            query = format!("({query}");
        }

        let logic_op = if idx != 0 {
            if is_or {
                query = format!("or {query}");
                "or"
            } else {
                query = format!("and {query}");
                "and"
            }
        } else {
            ""
        };

        let children = if children.is_empty() {
            vec![ExpressionChild::default()]
        } else {
            children
        };

        Expression {
            bracket_weight: entry.weight,
            children,
            comp_op: comp_op.to_string(),
            field: field.name.clone(),
            field_type: field.expr_field_type.clone(),
            filter: query,
            filtered_adapters: Value::Null,
            left_bracket: is_left,
            logic_op: logic_op.to_string(),
            r#not: is_not,
            right_bracket: is_right,
            value,
            idx,
            context: is_complex.then(|| CONTEXT_OBJ.to_string()),
        }
    }
}

/// The AQL fragment for a complex field and its joined sub-queries.
pub fn complex_query(field: &str, sub_queries: &str) -> String {
    format!("(\"{field}\" == match([{sub_queries}]))")
}

/// Space-joined query string over every expression's filter.
pub fn query_of(exprs: &[Expression]) -> String {
    exprs
        .iter()
        .map(|expr| expr.filter.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sub-conditions of a complex expression joined with `" and "`.
pub fn subs_query_of(children: &[ExpressionChild]) -> String {
    children
        .iter()
        .map(|child| child.condition.as_str())
        .collect::<Vec<_>>()
        .join(" and ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetql_catalog::FieldType;
    use serde_json::json;

    fn schema() -> FieldSchema {
        FieldSchema::simple("hostname", FieldType::String)
    }

    fn entry_with_flags(flags: Vec<Flag>, weight: i64) -> Entry {
        let mut entry = Entry::simple("hostname contains test");
        entry.flags = flags;
        entry.weight = weight;
        entry
    }

    #[test]
    fn test_build_first_expression_has_no_prefix() {
        let entry = entry_with_flags(vec![], 0);
        let expr = Expression::build(
            &entry,
            r#"("hostname" == "test")"#.to_string(),
            &schema(),
            0,
            "equals",
            json!("test"),
            vec![],
            false,
        );
        assert_eq!(expr.filter, r#"("hostname" == "test")"#);
        assert_eq!(expr.logic_op, "");
        assert_eq!(expr.children.len(), 1);
        assert_eq!(expr.children[0].condition, "");
    }

    #[test]
    fn test_build_and_or_prefix() {
        let entry = entry_with_flags(vec![], 0);
        let expr = Expression::build(
            &entry,
            "(q)".to_string(),
            &schema(),
            1,
            "equals",
            Value::Null,
            vec![],
            false,
        );
        assert_eq!(expr.filter, "and (q)");
        assert_eq!(expr.logic_op, "and");

        let entry = entry_with_flags(vec![Flag::Or], 0);
        let expr = Expression::build(
            &entry,
            "(q)".to_string(),
            &schema(),
            2,
            "equals",
            Value::Null,
            vec![],
            false,
        );
        assert_eq!(expr.filter, "or (q)");
        assert_eq!(expr.logic_op, "or");
    }

    #[test]
    fn test_build_wrap_order() {
        let entry = entry_with_flags(vec![Flag::Not, Flag::Open, Flag::Close], -1);
        let expr = Expression::build(
            &entry,
            "(q)".to_string(),
            &schema(),
            1,
            "equals",
            Value::Null,
            vec![],
            false,
        );
        assert_eq!(expr.filter, "and (not (q))");
        assert!(expr.r#not);
        assert!(expr.left_bracket);
        assert!(expr.right_bracket);
        assert_eq!(expr.bracket_weight, -1);
    }

    #[test]
    fn test_serialized_shape() {
        let entry = entry_with_flags(vec![], 0);
        let expr = Expression::build(
            &entry,
            "(q)".to_string(),
            &schema(),
            0,
            "equals",
            json!("test"),
            vec![],
            false,
        );
        let value = serde_json::to_value(&expr).unwrap();
        assert_eq!(value["compOp"], json!("equals"));
        assert_eq!(value["bracketWeight"], json!(0));
        assert_eq!(value["filteredAdapters"], Value::Null);
        assert_eq!(value["leftBracket"], json!(false));
        assert!(value.get("i").is_none());
        assert!(value.get("context").is_none());
        assert_eq!(
            value["children"][0],
            json!({
                "condition": "",
                "expression": {
                    "compOp": "",
                    "field": "",
                    "filteredAdapters": null,
                    "value": null,
                },
                "i": 0,
            })
        );
    }

    #[test]
    fn test_serialized_complex_markers() {
        let entry = entry_with_flags(vec![], 0);
        let child = ExpressionChild::build(
            "(name == regex(\"chrome\", \"i\"))".to_string(),
            "contains",
            "name",
            json!("chrome"),
            0,
        );
        let expr = Expression::build(
            &entry,
            "(q)".to_string(),
            &schema(),
            3,
            "",
            Value::Null,
            vec![child],
            true,
        );
        let value = serde_json::to_value(&expr).unwrap();
        assert_eq!(value["i"], json!(3));
        assert_eq!(value["context"], json!("OBJ"));
        assert_eq!(value["children"][0]["expression"]["field"], json!("name"));
    }

    #[test]
    fn test_query_joins() {
        let entry = entry_with_flags(vec![], 0);
        let a = Expression::build(
            &entry,
            "(a)".to_string(),
            &schema(),
            0,
            "",
            Value::Null,
            vec![],
            false,
        );
        let b = Expression::build(
            &entry,
            "(b)".to_string(),
            &schema(),
            1,
            "",
            Value::Null,
            vec![],
            false,
        );
        assert_eq!(query_of(&[a, b]), "(a) and (b)");
    }

    #[test]
    fn test_complex_query_template() {
        assert_eq!(
            complex_query("installed_software", "(x) and (y)"),
            r#"("installed_software" == match([(x) and (y)]))"#
        );
    }
}
