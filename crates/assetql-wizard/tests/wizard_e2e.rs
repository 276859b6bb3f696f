//! End-to-end tests for the wizard pipeline.
//!
//! These tests drive the full compile path over an in-memory catalog:
//! entries (structured, text, and CSV) in, AQL query strings and GUI
//! expression trees out.

use std::fs;

use assetql_catalog::{EnumCache, FieldFormat, FieldSchema, FieldType, MemoryCatalog};
use assetql_wizard::{Entry, SavedQuery, Wizard, WizardError};
use serde_json::json;

fn catalog() -> MemoryCatalog {
    MemoryCatalog::new(vec![
        FieldSchema::simple("hostname", FieldType::String),
        FieldSchema::simple("port", FieldType::Integer),
        FieldSchema::simple("from_last_fetch", FieldType::Boolean),
        FieldSchema::with_format("last_seen", FieldType::String, FieldFormat::DateTime),
        FieldSchema::with_format("os.kernel_version", FieldType::String, FieldFormat::Version),
        FieldSchema::array(
            "network_interfaces.ips",
            FieldType::String,
            Some(FieldFormat::Ip),
        ),
        FieldSchema::array("dns_servers", FieldType::String, None),
        FieldSchema::complex(
            "installed_software",
            vec![
                FieldSchema::simple("name", FieldType::String),
                FieldSchema::with_format("version", FieldType::String, FieldFormat::Version),
            ],
        ),
    ])
    .with_default_fields(vec!["hostname".to_string(), "last_seen".to_string()])
}

// ============================================================================
// Simple entries
// ============================================================================

#[test]
fn test_e2e_simple_contains() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let parsed = wizard
        .parse(vec![Entry::simple("hostname contains test")])
        .unwrap();
    assert_eq!(parsed.query, r#"("hostname" == regex("test", "i"))"#);
    assert_eq!(parsed.expressions.len(), 1);

    let expr = &parsed.expressions[0];
    assert_eq!(expr.field, "hostname");
    assert_eq!(expr.comp_op, "contains");
    assert_eq!(expr.value, json!("test"));
    assert_eq!(expr.logic_op, "");
    assert!(!expr.r#not);
}

#[test]
fn test_e2e_simple_operators_across_types() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    for (value, query) in [
        (
            "hostname equals dc-01",
            r#"("hostname" == "dc-01")"#,
        ),
        (
            "hostname exists",
            r#"(("hostname" == ({"$exists":true,"$ne":""})))"#,
        ),
        (
            "dns_servers exists",
            r#"(("dns_servers" == ({"$exists":true,"$ne":[]})))"#,
        ),
        ("port more_than 1024", r#"("port" > 1024)"#),
        ("port in 22,80,443", r#""port" in [22, 80, 443]"#),
        ("from_last_fetch true", r#"("from_last_fetch" == true)"#),
        (
            "last_seen less_than 2022-06-01",
            r#"("last_seen" < date("2022-06-01T00:00:00"))"#,
        ),
        (
            "last_seen last_days 7",
            r#"("last_seen" >= date("NOW - 7d"))"#,
        ),
        (
            "os.kernel_version earlier_than 82.6.2",
            r#"("os.kernel_version_raw" < '0000000820000000600000002')"#,
        ),
        (
            "network_interfaces.ips in_subnet 10.0.0.0/24",
            r#"("network_interfaces.ips_raw" == match({"$gte": 167772160, "$lte": 167772415}))"#,
        ),
        (
            "network_interfaces.ips equals 10.0.0.1",
            r#"("network_interfaces.ips" == "10.0.0.1")"#,
        ),
    ] {
        let parsed = wizard.parse(vec![Entry::simple(value)]).unwrap();
        assert_eq!(parsed.query, query, "entry {value:?}");
    }
}

#[test]
fn test_e2e_regex_value_is_escaped_for_contains() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let parsed = wizard
        .parse(vec![Entry::simple("hostname contains web.prod")])
        .unwrap();
    assert_eq!(parsed.query, r#"("hostname" == regex("web\.prod", "i"))"#);
    // The expression echoes the raw value, not the escaped one.
    assert_eq!(parsed.expressions[0].value, json!("web.prod"));
}

// ============================================================================
// Flags and brackets
// ============================================================================

#[test]
fn test_e2e_not_flag() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let parsed = wizard
        .parse(vec![Entry::simple("! hostname contains test")])
        .unwrap();
    assert_eq!(parsed.query, r#"not ("hostname" == regex("test", "i"))"#);
    assert!(parsed.expressions[0].r#not);
}

#[test]
fn test_e2e_or_and_brackets() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let parsed = wizard
        .parse(vec![
            Entry::simple("hostname contains a"),
            Entry::simple("( hostname contains b"),
            Entry::simple("| hostname contains c)"),
        ])
        .unwrap();
    assert_eq!(
        parsed.query,
        r#"("hostname" == regex("a", "i")) and (("hostname" == regex("b", "i")) or ("hostname" == regex("c", "i")))"#
    );

    let weights: Vec<i64> = parsed
        .expressions
        .iter()
        .map(|e| e.bracket_weight)
        .collect();
    assert_eq!(weights, vec![0, -1, 1]);
    assert!(parsed.expressions[1].left_bracket);
    assert!(parsed.expressions[2].right_bracket);
    assert_eq!(parsed.expressions[2].logic_op, "or");
}

#[test]
fn test_e2e_unclosed_bracket_is_repaired() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let parsed = wizard
        .parse(vec![
            Entry::simple("hostname contains a"),
            Entry::simple("( hostname contains b"),
        ])
        .unwrap();
    assert_eq!(
        parsed.query,
        r#"("hostname" == regex("a", "i")) and (("hostname" == regex("b", "i")))"#
    );
    assert!(parsed.expressions[1].left_bracket);
    assert!(parsed.expressions[1].right_bracket);
}

// ============================================================================
// Complex entries
// ============================================================================

#[test]
fn test_e2e_complex_entry() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let parsed = wizard
        .parse(vec![Entry::complex(
            "installed_software // name contains chrome // version earlier_than 82",
        )])
        .unwrap();
    assert_eq!(
        parsed.query,
        r#"("installed_software" == match([("name" == regex("chrome", "i")) and ("version_raw" < '000000082')]))"#
    );

    let expr = &parsed.expressions[0];
    assert_eq!(expr.field, "installed_software");
    assert_eq!(expr.context.as_deref(), Some("OBJ"));
    assert_eq!(expr.children.len(), 2);
    assert_eq!(expr.children[0].expression.field, "name");
    assert_eq!(expr.children[0].expression.comp_op, "contains");
    assert_eq!(expr.children[1].expression.field, "version");
    assert_eq!(expr.children[1].idx, 1);
}

#[test]
fn test_e2e_complex_unknown_sub_field_lists_valids() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let err = wizard
        .parse(vec![Entry::complex(
            "installed_software // vendor contains microsoft",
        )])
        .unwrap_err();
    let display = err.to_string();
    assert!(display.contains("vendor"));
    assert!(display.contains("name, version"));
}

#[test]
fn test_e2e_complex_rejects_simple_field() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let err = wizard
        .parse(vec![Entry::complex("hostname // name contains x")])
        .unwrap_err();
    assert!(err.to_string().contains("installed_software"));
}

// ============================================================================
// Error wrapping
// ============================================================================

#[test]
fn test_e2e_errors_carry_entry_source() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let err = wizard
        .parse(vec![
            Entry::simple("hostname contains ok"),
            Entry::simple("badwolf contains x"),
        ])
        .unwrap_err();
    let display = err.to_string();
    assert!(display.contains("entry #2/2"), "{display}");
    assert!(display.contains("badwolf"));
}

#[test]
fn test_e2e_unknown_operator_lists_valids() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let err = wizard
        .parse(vec![Entry::simple("hostname last_days 7")])
        .unwrap_err();
    let display = err.to_string();
    assert!(display.contains("last_days"));
    assert!(display.contains("contains"));
    assert!(display.contains("string"));
}

// ============================================================================
// Expression wire format
// ============================================================================

#[test]
fn test_e2e_expression_wire_keys() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let parsed = wizard
        .parse(vec![
            Entry::simple("hostname contains a"),
            Entry::simple("| hostname contains b"),
        ])
        .unwrap();
    let value = serde_json::to_value(&parsed.expressions).unwrap();

    let first = &value[0];
    assert_eq!(first["compOp"], json!("contains"));
    assert_eq!(first["fieldType"], json!("axonius"));
    assert_eq!(first["bracketWeight"], json!(0));
    assert_eq!(first["filteredAdapters"], json!(null));
    assert_eq!(first["logicOp"], json!(""));
    assert!(first.get("i").is_none());
    assert!(first.get("context").is_none());
    assert_eq!(first["children"][0]["expression"]["compOp"], json!(""));

    let second = &value[1];
    assert_eq!(second["i"], json!(1));
    assert_eq!(second["logicOp"], json!("or"));
    assert_eq!(second["not"], json!(false));
}

// ============================================================================
// Text frontend
// ============================================================================

#[test]
fn test_e2e_text_multiline() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let parsed = wizard
        .parse_text(
            "# hosts seen recently on the right kernel\n\
             simple hostname contains test\n\
             \n\
             simple last_seen last_days 30\n\
             complex installed_software // name contains chrome\n",
        )
        .unwrap();
    assert_eq!(parsed.expressions.len(), 3);
    assert!(parsed.query.starts_with(r#"("hostname" == regex("test", "i")) and"#));
    assert!(parsed.query.contains("match(["));
}

#[test]
fn test_e2e_text_path() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = temp_dir.path().join("entries.txt");
    fs::write(&path, "simple hostname contains test\n").unwrap();

    let parsed = wizard.parse_text_path(&path).unwrap();
    assert_eq!(parsed.query, r#"("hostname" == regex("test", "i"))"#);
}

#[test]
fn test_e2e_text_error_names_line() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let err = wizard
        .parse_text("simple hostname contains ok\nsimple badwolf exists\n")
        .unwrap_err();
    let display = err.to_string();
    assert!(display.contains("line #2"), "{display}");
}

// ============================================================================
// CSV frontend
// ============================================================================

const CSV_CONTENT: &str = "\
type,value,description,tags,fields,private,gui_page_size
saved_query,test hosts,hosts with test in the name,\"wizard, demo\",,yes,50
simple,hostname contains test,,,,,
simple,| hostname contains tst,,,,,
saved_query,recently seen,,,\"default,port\",,
simple,last_seen last_days 7,,,,,
";

#[test]
fn test_e2e_csv_groups() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let saved = wizard.parse_csv(CSV_CONTENT).unwrap();
    assert_eq!(saved.len(), 2);

    let first = &saved[0];
    assert_eq!(first.meta.name, "test hosts");
    assert_eq!(
        first.meta.description.as_deref(),
        Some("hosts with test in the name")
    );
    assert_eq!(first.meta.tags, vec!["wizard", "demo"]);
    assert_eq!(first.meta.fields, vec!["hostname", "last_seen"]);
    assert!(first.meta.private);
    assert_eq!(first.meta.gui_page_size, 50);
    assert_eq!(
        first.query,
        r#"("hostname" == regex("test", "i")) or ("hostname" == regex("tst", "i"))"#
    );
    assert_eq!(first.expressions.len(), 2);

    let second = &saved[1];
    assert_eq!(second.meta.name, "recently seen");
    assert_eq!(second.meta.fields, vec!["hostname", "last_seen", "port"]);
    assert_eq!(second.meta.gui_page_size, 20);
    assert_eq!(second.query, r#"("last_seen" >= date("NOW - 7d"))"#);
}

#[test]
fn test_e2e_csv_header_only_group() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let saved = wizard.parse_csv("type,value\nsaved_query,empty one\n").unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].query, "");
    assert!(saved[0].expressions.is_empty());
}

#[test]
fn test_e2e_csv_path_with_bom() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = temp_dir.path().join("queries.csv");
    fs::write(
        &path,
        "\u{feff}type,value\nsaved_query,from file\nsimple,hostname exists\n",
    )
    .unwrap();

    let saved = wizard.parse_csv_path(&path).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].meta.name, "from file");
    assert_eq!(
        saved[0].query,
        r#"(("hostname" == ({"$exists":true,"$ne":""})))"#
    );
}

#[test]
fn test_e2e_csv_first_row_must_be_saved_query() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let err = wizard
        .parse_csv("type,value\nsimple,hostname exists\n")
        .unwrap_err();
    assert!(matches!(
        err.root(),
        WizardError::FirstRowNotSavedQuery { .. }
    ));
}

#[test]
fn test_e2e_csv_no_rows() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let err = wizard.parse_csv("type,value\n").unwrap_err();
    assert!(matches!(err, WizardError::NoRows { .. }));
}

#[test]
fn test_e2e_saved_query_serializes_flat() {
    let catalog = catalog();
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let saved: Vec<SavedQuery> = wizard
        .parse_csv("type,value\nsaved_query,flat\nsimple,hostname exists\n")
        .unwrap();
    let value = serde_json::to_value(&saved[0]).unwrap();
    assert_eq!(value["name"], json!("flat"));
    assert_eq!(value["gui_page_size"], json!(20));
    assert!(value["query"].is_string());
    assert!(value["expressions"].is_array());
}

// ============================================================================
// Enum allow-lists through the cache
// ============================================================================

#[test]
fn test_e2e_tag_allow_list() {
    let catalog = MemoryCatalog::new(vec![FieldSchema::with_format(
        "labels",
        FieldType::String,
        FieldFormat::Tag,
    )])
    .with_tags(vec!["Production".to_string(), "Staging".to_string()]);
    let enums = EnumCache::new();
    let wizard = Wizard::new(&catalog, &enums);

    let parsed = wizard
        .parse(vec![Entry::simple("labels equals production")])
        .unwrap();
    assert_eq!(parsed.query, r#"("labels" == "Production")"#);

    let err = wizard
        .parse(vec![Entry::simple("labels equals qa")])
        .unwrap_err();
    assert!(err.to_string().contains("Staging"));
}
