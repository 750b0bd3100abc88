use crate::emitter::precedence::{Associativity, Operand, operand_tier};
use crate::emitter::{RenderContext, Rendered, is_valid_identifier};
use crate::error::EmitError;
use crate::graph::Node;
use crate::registry::tier;
use itertools::Itertools;

/// `if <condition> { return Err(<error>); }`
fn guard(cx: &RenderContext<'_>, condition: &str, error: &str) -> String {
    let unit = cx.indent_unit();
    format!("if {condition} {{\n{unit}return Err({error});\n}}\n")
}

/// `AccountType` becomes `account_type`.
fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    if is_valid_identifier(&out) {
        out
    } else {
        format!("{out}_data")
    }
}

pub(super) fn validate_accounts(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let required = operand_tier(tier::RELATIONAL, Associativity::None, Operand::Right);
    let min = cx.value(node, "min_accounts", required)?;
    let check = guard(
        cx,
        &format!("accounts.len() < {min}"),
        "ProgramError::NotEnoughAccountKeys",
    );
    Ok(Rendered::statement(format!(
        "let account_iter = &mut accounts.iter();\n{check}"
    )))
}

pub(super) fn get_account(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let index = cx.field_number(node, "index")?;
    if index < 0.0 || index.fract() != 0.0 {
        return Err(EmitError::InvalidFieldValue {
            node_id: node.id().clone(),
            field: "index".to_string(),
            value: index.to_string(),
            reason: "must be a non-negative integer".to_string(),
        });
    }
    let name = cx.field_text(node, "name")?;
    Ok(Rendered::statement(format!(
        "let {name} = next_account_info(account_iter)?; // account #{}\n",
        index as u64
    )))
}

pub(super) fn check_account_owner(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let account = cx.field_text(node, "account")?;
    let owner = cx.field_choice(node, "owner")?;
    // `program_id` is already a reference.
    let owner = if owner == "program_id" {
        owner
    } else {
        format!("&{owner}")
    };
    Ok(Rendered::statement(guard(
        cx,
        &format!("{account}.owner != {owner}"),
        "ProgramError::IncorrectProgramId",
    )))
}

pub(super) fn deserialize_account(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let account = cx.field_text(node, "account")?;
    let ty = cx.field_text(node, "type")?;
    let binding = snake_case(&ty);
    Ok(Rendered::statement(format!(
        "let {binding} = {ty}::try_from_slice(&{account}.data.borrow())?;\n"
    )))
}

pub(super) fn init_account(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let name = cx.field_text(node, "name")?;
    let ty = cx.field_text(node, "type")?;
    let space = cx.value(node, "space", tier::NONE)?;
    let unit = cx.indent_unit();
    let args = [
        format!("{name}.key"),
        format!("{name}.key"),
        "lamports".to_string(),
        "space as u64".to_string(),
        "program_id".to_string(),
    ]
    .iter()
    .map(|arg| format!("{unit}{unit}{arg},\n"))
    .join("");
    Ok(Rendered::statement(format!(
        "// Initialize {name} as {ty}\n\
         let rent = Rent::get()?;\n\
         let space = {space};\n\
         let lamports = rent.minimum_balance(space as usize);\n\
         invoke(\n\
         {unit}&system_instruction::create_account(\n\
         {args}\
         {unit}),\n\
         {unit}&[{name}.clone()],\n\
         )?;\n"
    )))
}

pub(super) fn account_constraint(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let account = cx.field_text(node, "account")?;
    let (condition, error) = match cx.field_choice(node, "constraint")?.as_str() {
        "IS_INITIALIZED" => (
            format!("{account}.data_is_empty()"),
            "ProgramError::UninitializedAccount",
        ),
        "IS_SIGNER" => (
            format!("!{account}.is_signer"),
            "ProgramError::MissingRequiredSignature",
        ),
        "IS_WRITABLE" => (
            format!("!{account}.is_writable"),
            "ProgramError::InvalidAccountData",
        ),
        _ => (
            format!("{account}.lamports() < required_lamports"),
            "ProgramError::InsufficientFunds",
        ),
    };
    Ok(Rendered::statement(guard(cx, &condition, error)))
}

pub(super) fn create_pda(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let name = cx.field_text(node, "name")?;
    let seeds = cx.chain_fragments(node, "seeds")?;
    let unit = cx.indent_unit();
    let lines: String = seeds
        .iter()
        .map(|seed| format!("{unit}{seed},\n"))
        .collect();
    Ok(Rendered::statement(format!(
        "let {name}_seeds: &[&[u8]] = &[\n{lines}];\n\
         let ({name}, {name}_bump) = Pubkey::find_program_address({name}_seeds, program_id);\n"
    )))
}

/// Quoted seeds become byte strings, anything else is taken as an integer binding.
pub(super) fn pda_seed(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let raw = cx.field_text(node, "value")?;
    let value = raw.trim();
    let code = if let Some(inner) = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
    {
        format!("b\"{}\"", inner.replace('"', "\\\""))
    } else if let Some(rest) = value.strip_prefix('"') {
        if rest.is_empty() || !rest.ends_with('"') || rest.ends_with("\\\"") {
            return Err(EmitError::InvalidFieldValue {
                node_id: node.id().clone(),
                field: "value".to_string(),
                value: value.to_string(),
                reason: "string seed is missing its closing quote".to_string(),
            });
        }
        format!("b{value}")
    } else {
        format!("&{value}.to_le_bytes()")
    };
    Ok(Rendered::statement(code))
}

pub(super) fn token_operation(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let instruction = match cx.field_choice(node, "operation")?.as_str() {
        "MINT" => "mint_to",
        "TRANSFER" => "transfer",
        "BURN" => "burn",
        _ => "approve",
    };
    let amount = cx.value(node, "amount", tier::NONE)?;
    let accounts = cx.chain_fragments(node, "accounts")?.join(", ");
    let unit = cx.indent_unit();
    Ok(Rendered::statement(format!(
        "spl_token::instruction::{instruction}(\n\
         {unit}&spl_token::id(),\n\
         {unit}&[{accounts}],\n\
         {unit}{amount},\n\
         )?;\n"
    )))
}

/// Logs the event through `msg!`, one `name={}` placeholder per field.
pub(super) fn emit_event(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let name = cx.field_text(node, "name")?;
    let fields = cx.chain_fragments(node, "fields")?;
    let code = if fields.is_empty() {
        format!("msg!(\"{name}\");\n")
    } else {
        let placeholders = fields.iter().map(|f| format!("{f}={{}}")).join(" ");
        format!("msg!(\"{name}: {placeholders}\", {});\n", fields.join(", "))
    };
    Ok(Rendered::statement(code))
}

pub(super) fn cpi_call(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let program_id = cx.field_text(node, "program_id")?.trim().to_string();
    let accounts = cx.chain_fragments(node, "accounts")?;
    let data = cx.value(node, "data", tier::UNARY)?;
    let unit = cx.indent_unit();
    let infos = accounts.iter().map(|a| format!("{a}.clone()")).join(", ");
    let accounts = accounts.join(", ");
    Ok(Rendered::statement(format!(
        "invoke(\n\
         {unit}&Instruction::new_with_bytes(\n\
         {unit}{unit}{program_id},\n\
         {unit}{unit}&{data},\n\
         {unit}{unit}&[{accounts}],\n\
         {unit}),\n\
         {unit}&[{infos}],\n\
         )?;\n"
    )))
}

pub(super) fn account_ref(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    Ok(Rendered::statement(cx.field_text(node, "name")?))
}

pub(super) fn program_error(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let error = cx.field_choice(node, "error")?;
    Ok(Rendered::statement(format!("return Err({error});\n")))
}
