use super::Rendered;
use crate::registry::{Tier, tier};

/// How an operator groups with operands of its own tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// `a - b - c` means `(a - b) - c`.
    Left,
    /// Chaining is a syntax error, as with Rust comparisons.
    None,
    /// Grouping does not change meaning, as with `&&` and `||`.
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Left,
    Right,
}

/// The loosest tier an operand may have at `side` of an operator of tier `op`
/// before it must be parenthesized.
pub fn operand_tier(op: Tier, associativity: Associativity, side: Operand) -> Tier {
    let tighter = op.saturating_sub(1);
    match (associativity, side) {
        (Associativity::Left, Operand::Left) => op,
        (Associativity::Left, Operand::Right) => tighter,
        (Associativity::None, _) => tighter,
        (Associativity::Flat, _) => op,
    }
}

pub fn needs_parens(child: Tier, required: Tier) -> bool {
    child > required
}

/// Renders an operand, adding parentheses only when necessary.
pub fn wrap(rendered: Rendered, required: Tier) -> String {
    let child = rendered.tier.unwrap_or(tier::ATOMIC);
    if needs_parens(child, required) {
        format!("({})", rendered.code)
    } else {
        rendered.code
    }
}
