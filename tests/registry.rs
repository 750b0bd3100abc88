//! Tests for the block type catalog.
mod common;
use common::*;
use snapchain_codegen::error::GraphError;
use snapchain_codegen::prelude::*;
use snapchain_codegen::registry::{FieldSpec, Placement, SlotArity, SlotSpec, tier};

#[test]
fn test_default_catalog_is_complete() {
    let registry = registry();
    let expected = [
        "solana_program",
        "rust_struct",
        "struct_field",
        "rust_enum",
        "enum_variant",
        "process_instruction",
        "function_param",
        "validate_accounts",
        "get_account",
        "check_account_owner",
        "deserialize_account",
        "init_account",
        "account_constraint",
        "create_pda",
        "pda_seed",
        "token_operation",
        "emit_event",
        "cpi_call",
        "account_ref",
        "program_error",
        "controls_if",
        "controls_for",
        "controls_while",
        "math_operation",
        "math_number",
        "logic_compare",
        "logic_operation",
        "logic_negate",
        "logic_boolean",
        "text",
        "variable_get",
    ];
    assert_eq!(registry.len(), expected.len());
    let ids: Vec<&str> = registry.type_ids().collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_every_catalog_type_has_a_renderer() {
    let registry = registry();
    let emitter = Emitter::new(registry.clone());
    for id in registry.type_ids() {
        assert!(emitter.has_renderer(id), "no renderer for '{}'", id);
    }
}

#[test]
fn test_unknown_type_lookup_fails() {
    let registry = registry();
    match registry.get_type("does_not_exist") {
        Err(GraphError::UnknownNodeType(id)) => assert_eq!(id, "does_not_exist"),
        other => panic!("Expected UnknownNodeType, got {:?}", other),
    }
}

#[test]
fn test_last_registration_wins() {
    let mut registry = Registry::with_default_catalog();
    let before = registry.len();
    registry.register_type(
        NodeType::statement("rust_struct", "Data Structures")
            .with_field(FieldSpec::identifier("name", "Replaced"))
            .with_slot(SlotSpec::chain("fields")),
    );
    assert_eq!(registry.len(), before);

    let replaced = registry.get_type("rust_struct").unwrap();
    assert_eq!(replaced.placement, Placement::Anywhere);
    assert!(!replaced.slot("fields").unwrap().required);
    // Registration order is kept for an overwritten id.
    assert_eq!(registry.type_ids().nth(1), Some("rust_struct"));
}

#[test]
fn test_expression_tiers() {
    let registry = registry();
    let tier_of = |id: &str| registry.get_type(id).unwrap().precedence_tier;

    assert_eq!(tier_of("math_number"), Some(tier::ATOMIC));
    assert_eq!(tier_of("logic_negate"), Some(tier::UNARY));
    assert_eq!(tier_of("math_operation"), Some(tier::ADDITIVE));
    assert_eq!(tier_of("logic_compare"), Some(tier::RELATIONAL));
    assert_eq!(tier_of("logic_operation"), Some(tier::OR));
    assert_eq!(tier_of("controls_if"), None);
    assert!(tier::ATOMIC < tier::UNARY && tier::ASSIGNMENT < tier::NONE);
}

#[test]
fn test_requiredness_is_declared_per_type() {
    let registry = registry();
    let slot = |ty: &str, name: &str| registry.get_type(ty).unwrap().slot(name).unwrap().clone();

    assert!(slot("rust_struct", "fields").required);
    assert!(slot("rust_enum", "variants").required);
    assert!(slot("create_pda", "seeds").required);
    assert!(!slot("solana_program", "body").required);
    assert!(!slot("process_instruction", "params").required);

    let condition = slot("controls_if", "if0");
    assert_eq!(condition.arity, SlotArity::SingleExpression);
    assert_eq!(condition.default_code.as_deref(), Some("false"));
    assert_eq!(slot("controls_if", "if3").default_code, None);
    assert_eq!(slot("controls_for", "do").arity, SlotArity::StatementChain);
}

#[test]
fn test_choice_field_defaults_to_first_option() {
    let registry = registry();
    let field = registry
        .get_type("struct_field")
        .unwrap()
        .field("type")
        .unwrap()
        .clone();
    assert_eq!(field.default, FieldValue::from("u8"));
    let options = field.options().unwrap();
    assert_eq!(options.len(), 12);
    assert!(options.iter().any(|o| o.label == "PublicKey" && o.value == "Pubkey"));
}

#[test]
fn test_categories_cover_catalog() {
    let registry = registry();
    let mut categories: Vec<&str> = registry.types().map(|t| t.category.as_str()).collect();
    categories.sort();
    categories.dedup();
    assert_eq!(
        categories,
        [
            "Accounts",
            "Control",
            "Data Structures",
            "Errors",
            "Events",
            "External Calls",
            "Instructions",
            "Logic",
            "Math",
            "PDAs",
            "Program",
            "Text",
            "Tokens",
            "Variables",
        ]
    );
}

#[test]
fn test_independent_registries() {
    let mut custom = Registry::new();
    custom.register_type(NodeType::statement("note", "Misc"));
    assert!(custom.contains("note"));
    assert!(!registry().contains("note"));
    assert!(Registry::new().is_empty());
}
