use crate::emitter::{RenderContext, Rendered};
use crate::error::EmitError;
use crate::graph::Node;

const PROGRAM_HEADER: &str = "\
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint,
    entrypoint::ProgramResult,
    instruction::Instruction,
    msg,
    program::invoke,
    program_error::ProgramError,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction, system_program,
    sysvar::Sysvar,
};
";

const DERIVES: &str = "#[derive(BorshSerialize, BorshDeserialize, Debug)]";

pub(super) fn solana_program(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let name = cx.field_text(node, "name")?;
    let body = cx.flat_statements(node, "body")?;
    Ok(Rendered::statement(format!(
        "// Program: {name}\n{PROGRAM_HEADER}\nentrypoint!(process_instruction);\n\n{body}"
    )))
}

pub(super) fn rust_struct(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let name = cx.field_text(node, "name")?;
    let fields = cx.statements(node, "fields")?;
    Ok(Rendered::statement(format!(
        "{DERIVES}\npub struct {name} {{\n{fields}}}\n\n"
    )))
}

/// Field declarations read differently depending on what they declare.
pub(super) fn struct_field(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let name = cx.field_text(node, "name")?;
    let ty = cx.field_choice(node, "type")?;

    let code = match cx.parent(node) {
        Some(variant) if variant.type_id() == "enum_variant" => {
            if cx.field_choice(variant, "type")? == "TUPLE" {
                ty
            } else {
                format!("{name}: {ty},\n")
            }
        }
        Some(event) if event.type_id() == "emit_event" => name,
        _ => format!("pub {name}: {ty},\n"),
    };
    Ok(Rendered::statement(code))
}

pub(super) fn rust_enum(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let name = cx.field_text(node, "name")?;
    let variants = cx.statements(node, "variants")?;
    Ok(Rendered::statement(format!(
        "{DERIVES}\npub enum {name} {{\n{variants}}}\n\n"
    )))
}

pub(super) fn enum_variant(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let name = cx.field_text(node, "name")?;
    let code = match cx.field_choice(node, "type")?.as_str() {
        "TUPLE" => {
            let types = cx.chain_fragments(node, "fields")?;
            let inner = if types.is_empty() {
                "u64".to_string()
            } else {
                types.join(", ")
            };
            format!("{name}({inner}),\n")
        }
        "STRUCT" => {
            let mut body = cx.statements(node, "fields")?;
            if body.is_empty() {
                body = cx.indent("value: u64,\n");
            }
            format!("{name} {{\n{body}}},\n")
        }
        _ => format!("{name},\n"),
    };
    Ok(Rendered::statement(code))
}

pub(super) fn process_instruction(
    node: &Node,
    cx: &mut RenderContext<'_>,
) -> Result<Rendered, EmitError> {
    let name = cx.field_text(node, "name")?;
    let params = cx.statements(node, "params")?;
    let body = cx.statements(node, "body")?;
    let unit = cx.indent_unit();

    let signature = if params.is_empty() {
        format!("pub fn {name}() -> ProgramResult {{\n")
    } else {
        format!("pub fn {name}(\n{params}) -> ProgramResult {{\n")
    };
    Ok(Rendered::statement(format!(
        "{signature}{body}{unit}Ok(())\n}}\n\n"
    )))
}

pub(super) fn function_param(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let param = cx.field_choice(node, "type")?;
    Ok(Rendered::statement(format!("{param},\n")))
}
