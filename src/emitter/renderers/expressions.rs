use crate::emitter::precedence::{Associativity, Operand, operand_tier};
use crate::emitter::{RenderContext, Rendered};
use crate::error::EmitError;
use crate::graph::{FieldValue, Node};
use crate::registry::{Tier, tier};

fn binary(
    node: &Node,
    cx: &mut RenderContext<'_>,
    symbol: &str,
    op_tier: Tier,
    associativity: Associativity,
) -> Result<Rendered, EmitError> {
    let left = cx.value(node, "a", operand_tier(op_tier, associativity, Operand::Left))?;
    let right = cx.value(node, "b", operand_tier(op_tier, associativity, Operand::Right))?;
    Ok(Rendered::value(format!("{left} {symbol} {right}"), op_tier))
}

pub(super) fn math_operation(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let (symbol, op_tier) = match cx.field_choice(node, "operation")?.as_str() {
        "ADD" => ("+", tier::ADDITIVE),
        "SUB" => ("-", tier::ADDITIVE),
        "MUL" => ("*", tier::MULTIPLICATIVE),
        _ => ("/", tier::MULTIPLICATIVE),
    };
    binary(node, cx, symbol, op_tier, Associativity::Left)
}

pub(super) fn logic_compare(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let symbol = match cx.field_choice(node, "op")?.as_str() {
        "EQ" => "==",
        "NEQ" => "!=",
        "LT" => "<",
        "LTE" => "<=",
        "GT" => ">",
        _ => ">=",
    };
    binary(node, cx, symbol, tier::RELATIONAL, Associativity::None)
}

pub(super) fn logic_operation(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let (symbol, op_tier) = match cx.field_choice(node, "op")?.as_str() {
        "AND" => ("&&", tier::AND),
        _ => ("||", tier::OR),
    };
    binary(node, cx, symbol, op_tier, Associativity::Flat)
}

pub(super) fn logic_negate(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let operand = cx.value(node, "bool", tier::UNARY)?;
    Ok(Rendered::value(format!("!{operand}"), tier::UNARY))
}

pub(super) fn logic_boolean(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let value = cx.field_choice(node, "bool")?.to_lowercase();
    Ok(Rendered::value(value, tier::ATOMIC))
}

/// Negative literals carry a unary minus and bind like one.
pub(super) fn math_number(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let number = cx.field_number(node, "num")?;
    let number_tier = if number < 0.0 {
        tier::UNARY
    } else {
        tier::ATOMIC
    };
    Ok(Rendered::value(
        FieldValue::Number(number).to_string(),
        number_tier,
    ))
}

pub(super) fn text(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let text = cx.field_text(node, "text")?;
    Ok(Rendered::value(format!("{text:?}"), tier::ATOMIC))
}

pub(super) fn variable_get(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    Ok(Rendered::value(cx.field_text(node, "name")?, tier::ATOMIC))
}
