use super::tier;
use super::{FieldSpec, NodeType, Placement, Registry, SlotSpec};

/// Number of `if`/`else if` arms a conditional block can carry.
pub const MAX_IF_ARMS: usize = 4;

const FUNCTION_BODY: &[&str] = &["process_instruction"];
const PROGRAM_ITEM: &[&str] = &["solana_program"];

/// Registers every built-in block type.
pub fn register_default_catalog(registry: &mut Registry) {
    for node_type in program_blocks()
        .into_iter()
        .chain(account_blocks())
        .chain(control_blocks())
        .chain(expression_blocks())
    {
        registry.register_type(node_type);
    }
}

fn program_blocks() -> Vec<NodeType> {
    vec![
        NodeType::statement("solana_program", "Program")
            .with_field(FieldSpec::identifier("name", "my_program"))
            .with_slot(SlotSpec::chain("body"))
            .placed(Placement::TopLevel),
        NodeType::statement("rust_struct", "Data Structures")
            .with_field(FieldSpec::identifier("name", "MyStruct"))
            .with_slot(SlotSpec::chain("fields").required())
            .placed(Placement::top_level_or(PROGRAM_ITEM)),
        NodeType::statement("struct_field", "Data Structures")
            .with_field(FieldSpec::identifier("name", "field_name"))
            .with_field(FieldSpec::choice(
                "type",
                &[
                    ("u8", "u8"),
                    ("u16", "u16"),
                    ("u32", "u32"),
                    ("u64", "u64"),
                    ("i8", "i8"),
                    ("i16", "i16"),
                    ("i32", "i32"),
                    ("i64", "i64"),
                    ("String", "String"),
                    ("bool", "bool"),
                    ("PublicKey", "Pubkey"),
                    ("AccountInfo", "AccountInfo"),
                ],
            ))
            .placed(Placement::within(&[
                "rust_struct",
                "enum_variant",
                "emit_event",
            ])),
        NodeType::statement("rust_enum", "Data Structures")
            .with_field(FieldSpec::identifier("name", "MyEnum"))
            .with_slot(SlotSpec::chain("variants").required())
            .placed(Placement::top_level_or(PROGRAM_ITEM)),
        NodeType::statement("enum_variant", "Data Structures")
            .with_field(FieldSpec::identifier("name", "Variant"))
            .with_field(FieldSpec::choice(
                "type",
                &[("Simple", "SIMPLE"), ("Tuple", "TUPLE"), ("Struct", "STRUCT")],
            ))
            .with_slot(SlotSpec::chain("fields"))
            .placed(Placement::within(&["rust_enum"])),
        NodeType::statement("process_instruction", "Instructions")
            .with_field(FieldSpec::identifier("name", "process_instruction"))
            .with_slot(SlotSpec::chain("params"))
            .with_slot(SlotSpec::chain("body"))
            .placed(Placement::top_level_or(PROGRAM_ITEM)),
        NodeType::statement("function_param", "Instructions")
            .with_field(FieldSpec::text("name", "param_name"))
            .with_field(FieldSpec::choice(
                "type",
                &[
                    ("Program ID", "program_id: &Pubkey"),
                    ("Accounts", "accounts: &[AccountInfo]"),
                    ("Instruction Data", "instruction_data: &[u8]"),
                ],
            ))
            .placed(Placement::within(FUNCTION_BODY)),
    ]
}

fn account_blocks() -> Vec<NodeType> {
    vec![
        NodeType::statement("validate_accounts", "Accounts")
            .with_slot(SlotSpec::expression("min_accounts", "2"))
            .placed(Placement::within(FUNCTION_BODY)),
        NodeType::statement("get_account", "Accounts")
            .with_field(FieldSpec::number("index", 0.0))
            .with_field(FieldSpec::identifier("name", "account_name"))
            .placed(Placement::within(FUNCTION_BODY)),
        NodeType::statement("check_account_owner", "Accounts")
            .with_field(FieldSpec::identifier("account", "account"))
            .with_field(FieldSpec::choice(
                "owner",
                &[
                    ("program", "program_id"),
                    ("system program", "system_program::ID"),
                ],
            ))
            .placed(Placement::within(FUNCTION_BODY)),
        NodeType::statement("deserialize_account", "Accounts")
            .with_field(FieldSpec::identifier("account", "account"))
            .with_field(FieldSpec::identifier("type", "AccountType"))
            .placed(Placement::within(FUNCTION_BODY)),
        NodeType::statement("init_account", "Accounts")
            .with_field(FieldSpec::identifier("name", "account"))
            .with_field(FieldSpec::identifier("type", "AccountType"))
            .with_slot(SlotSpec::expression("space", "0"))
            .placed(Placement::within(FUNCTION_BODY)),
        NodeType::statement("account_constraint", "Accounts")
            .with_field(FieldSpec::identifier("account", "account"))
            .with_field(FieldSpec::choice(
                "constraint",
                &[
                    ("is initialized", "IS_INITIALIZED"),
                    ("is signer", "IS_SIGNER"),
                    ("is writable", "IS_WRITABLE"),
                    ("has sufficient funds", "HAS_FUNDS"),
                ],
            ))
            .placed(Placement::within(FUNCTION_BODY)),
        NodeType::statement("create_pda", "PDAs")
            .with_field(FieldSpec::identifier("name", "pda_name"))
            .with_slot(SlotSpec::chain("seeds").required())
            .placed(Placement::within(FUNCTION_BODY)),
        NodeType::statement("pda_seed", "PDAs")
            .with_field(FieldSpec::text("value", "seed_value").required())
            .placed(Placement::within(&["create_pda"])),
        NodeType::statement("token_operation", "Tokens")
            .with_field(FieldSpec::choice(
                "operation",
                &[
                    ("Mint", "MINT"),
                    ("Transfer", "TRANSFER"),
                    ("Burn", "BURN"),
                    ("Approve", "APPROVE"),
                ],
            ))
            .with_slot(SlotSpec::expression("amount", "0"))
            .with_slot(SlotSpec::chain("accounts"))
            .placed(Placement::within(FUNCTION_BODY)),
        NodeType::statement("emit_event", "Events")
            .with_field(FieldSpec::identifier("name", "MyEvent"))
            .with_slot(SlotSpec::chain("fields"))
            .placed(Placement::within(FUNCTION_BODY)),
        NodeType::statement("cpi_call", "External Calls")
            .with_field(FieldSpec::text("program_id", "program_id").required())
            .with_slot(SlotSpec::chain("accounts"))
            .with_slot(SlotSpec::expression("data", "[]"))
            .placed(Placement::within(FUNCTION_BODY)),
        NodeType::statement("account_ref", "External Calls")
            .with_field(FieldSpec::identifier("name", "account"))
            .placed(Placement::within(&["cpi_call", "token_operation"])),
        NodeType::statement("program_error", "Errors")
            .with_field(FieldSpec::choice(
                "error",
                &[
                    ("InvalidInstruction", "ProgramError::InvalidInstructionData"),
                    ("NotEnoughAccountKeys", "ProgramError::NotEnoughAccountKeys"),
                    ("InvalidAccountData", "ProgramError::InvalidAccountData"),
                    ("Custom", "ProgramError::Custom(1)"),
                ],
            ))
            .placed(Placement::within(FUNCTION_BODY)),
    ]
}

fn control_blocks() -> Vec<NodeType> {
    let mut conditional = NodeType::statement("controls_if", "Control");
    for arm in 0..MAX_IF_ARMS {
        let condition = if arm == 0 {
            SlotSpec::expression(&format!("if{arm}"), "false")
        } else {
            SlotSpec {
                default_code: None,
                ..SlotSpec::expression(&format!("if{arm}"), "")
            }
        };
        conditional = conditional
            .with_slot(condition)
            .with_slot(SlotSpec::chain(&format!("do{arm}")));
    }
    conditional = conditional
        .with_slot(SlotSpec::chain("else"))
        .placed(Placement::within(FUNCTION_BODY));

    vec![
        conditional,
        NodeType::statement("controls_for", "Control")
            .with_field(FieldSpec::identifier("var", "i"))
            .with_slot(SlotSpec::expression("start", "0"))
            .with_slot(SlotSpec::expression("end", "0"))
            .with_slot(SlotSpec::expression("step", "1"))
            .with_slot(SlotSpec::chain("do"))
            .placed(Placement::within(FUNCTION_BODY)),
        NodeType::statement("controls_while", "Control")
            .with_slot(SlotSpec::expression("bool", "false"))
            .with_slot(SlotSpec::chain("do"))
            .placed(Placement::within(FUNCTION_BODY)),
    ]
}

fn expression_blocks() -> Vec<NodeType> {
    vec![
        NodeType::expression("math_operation", "Math", tier::ADDITIVE)
            .with_field(FieldSpec::choice(
                "operation",
                &[("+", "ADD"), ("-", "SUB"), ("*", "MUL"), ("/", "DIV")],
            ))
            .with_slot(SlotSpec::expression("a", "0"))
            .with_slot(SlotSpec::expression("b", "0")),
        NodeType::expression("math_number", "Math", tier::ATOMIC)
            .with_field(FieldSpec::number("num", 0.0)),
        NodeType::expression("logic_compare", "Logic", tier::RELATIONAL)
            .with_field(FieldSpec::choice(
                "op",
                &[
                    ("=", "EQ"),
                    ("\u{2260}", "NEQ"),
                    ("<", "LT"),
                    ("\u{2264}", "LTE"),
                    (">", "GT"),
                    ("\u{2265}", "GTE"),
                ],
            ))
            .with_slot(SlotSpec::expression("a", "0"))
            .with_slot(SlotSpec::expression("b", "0")),
        NodeType::expression("logic_operation", "Logic", tier::OR)
            .with_field(FieldSpec::choice("op", &[("and", "AND"), ("or", "OR")]))
            .with_slot(SlotSpec::expression("a", "false"))
            .with_slot(SlotSpec::expression("b", "false")),
        NodeType::expression("logic_negate", "Logic", tier::UNARY)
            .with_slot(SlotSpec::expression("bool", "false")),
        NodeType::expression("logic_boolean", "Logic", tier::ATOMIC).with_field(
            FieldSpec::choice("bool", &[("true", "TRUE"), ("false", "FALSE")]),
        ),
        NodeType::expression("text", "Text", tier::ATOMIC)
            .with_field(FieldSpec::text("text", "")),
        NodeType::expression("variable_get", "Variables", tier::ATOMIC)
            .with_field(FieldSpec::identifier("name", "i")),
    ]
}
