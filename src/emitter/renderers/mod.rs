use super::{BlockRenderer, RenderContext, Rendered};
use crate::error::EmitError;
use crate::graph::Node;
use ahash::AHashMap;

mod accounts;
mod control;
mod expressions;
mod program;

/// Master macro to define all built-in block renderers, their registration, and their creation.
macro_rules! define_block_renderers {
    ( $( ($struct_name:ident, $node_type:literal, $render:path) ),* $(,)? ) => {
        $(
            struct $struct_name;
            impl BlockRenderer for $struct_name {
                fn node_type(&self) -> &str { $node_type }
                fn render(&self, node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
                    $render(node, cx)
                }
            }
        )*

        pub(super) fn register_default_renderers(table: &mut AHashMap<String, Box<dyn BlockRenderer>>) {
            $( table.insert($node_type.to_string(), Box::new($struct_name)); )*
        }

        pub(super) fn create_renderer_by_name(name: &str) -> Option<Box<dyn BlockRenderer>> {
            match name {
                $( $node_type => Some(Box::new($struct_name)), )*
                _ => None,
            }
        }
    };
}

define_block_renderers! {
    // Program structure
    (ProgramRenderer, "solana_program", program::solana_program),
    (StructRenderer, "rust_struct", program::rust_struct),
    (StructFieldRenderer, "struct_field", program::struct_field),
    (EnumRenderer, "rust_enum", program::rust_enum),
    (EnumVariantRenderer, "enum_variant", program::enum_variant),
    (InstructionRenderer, "process_instruction", program::process_instruction),
    (FunctionParamRenderer, "function_param", program::function_param),

    // Accounts and domain statements
    (ValidateAccountsRenderer, "validate_accounts", accounts::validate_accounts),
    (GetAccountRenderer, "get_account", accounts::get_account),
    (CheckOwnerRenderer, "check_account_owner", accounts::check_account_owner),
    (DeserializeRenderer, "deserialize_account", accounts::deserialize_account),
    (InitAccountRenderer, "init_account", accounts::init_account),
    (ConstraintRenderer, "account_constraint", accounts::account_constraint),
    (CreatePdaRenderer, "create_pda", accounts::create_pda),
    (PdaSeedRenderer, "pda_seed", accounts::pda_seed),
    (TokenOperationRenderer, "token_operation", accounts::token_operation),
    (EmitEventRenderer, "emit_event", accounts::emit_event),
    (CpiCallRenderer, "cpi_call", accounts::cpi_call),
    (AccountRefRenderer, "account_ref", accounts::account_ref),
    (ProgramErrorRenderer, "program_error", accounts::program_error),

    // Control flow
    (IfRenderer, "controls_if", control::controls_if),
    (ForRenderer, "controls_for", control::controls_for),
    (WhileRenderer, "controls_while", control::controls_while),

    // Expressions
    (MathOperationRenderer, "math_operation", expressions::math_operation),
    (MathNumberRenderer, "math_number", expressions::math_number),
    (CompareRenderer, "logic_compare", expressions::logic_compare),
    (LogicOperationRenderer, "logic_operation", expressions::logic_operation),
    (NegateRenderer, "logic_negate", expressions::logic_negate),
    (BooleanRenderer, "logic_boolean", expressions::logic_boolean),
    (TextRenderer, "text", expressions::text),
    (VariableGetRenderer, "variable_get", expressions::variable_get),
}
