use crate::emitter::{RenderContext, Rendered};
use crate::error::EmitError;
use crate::graph::{FieldValue, Node};
use crate::registry::{MAX_IF_ARMS, tier};

/// `if` / `else if` arms in slot order, then an optional `else`.
///
/// Arms after the first are emitted only when their condition is bound.
pub(super) fn controls_if(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let mut code = String::new();
    for arm in 0..MAX_IF_ARMS {
        let condition_slot = format!("if{arm}");
        let body_slot = format!("do{arm}");
        let condition = if arm == 0 {
            Some(cx.value(node, &condition_slot, tier::NONE)?)
        } else {
            cx.optional_value(node, &condition_slot, tier::NONE)?
        };
        let Some(condition) = condition else {
            if cx.is_bound(node, &body_slot) {
                return Err(EmitError::MissingRequiredSlot {
                    node_id: node.id().clone(),
                    slot: condition_slot,
                });
            }
            continue;
        };
        let body = cx.statements(node, &body_slot)?;
        if arm == 0 {
            code.push_str(&format!("if {condition} {{\n{body}"));
        } else {
            code.push_str(&format!("}} else if {condition} {{\n{body}"));
        }
    }
    if cx.is_bound(node, "else") {
        let body = cx.statements(node, "else")?;
        code.push_str(&format!("}} else {{\n{body}"));
    }
    code.push_str("}\n");
    Ok(Rendered::statement(code))
}

/// Counted loop over an inclusive range. A negative literal step walks the
/// range backwards.
pub(super) fn controls_for(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let var = cx.field_text(node, "var")?;
    // Range bounds must bind tighter than `..=`.
    let start = cx.value(node, "start", tier::OR)?;
    let end = cx.value(node, "end", tier::OR)?;
    let step = cx.value(node, "step", tier::UNARY)?;
    let body = cx.statements(node, "do")?;

    let header = match step.trim().parse::<f64>() {
        Ok(n) if n < 0.0 => format!(
            "for {var} in ({end}..={start}).rev().step_by({} as usize) {{\n",
            FieldValue::Number(-n)
        ),
        _ => format!("for {var} in ({start}..={end}).step_by({step} as usize) {{\n"),
    };
    Ok(Rendered::statement(format!("{header}{body}}}\n")))
}

pub(super) fn controls_while(node: &Node, cx: &mut RenderContext<'_>) -> Result<Rendered, EmitError> {
    let condition = cx.value(node, "bool", tier::NONE)?;
    let body = cx.statements(node, "do")?;
    Ok(Rendered::statement(format!(
        "while {condition} {{\n{body}}}\n"
    )))
}
