use super::{StructuredBlock, to_json, to_summary};
use itertools::Itertools;
use serde::Serialize;

const SYSTEM_PROMPT: &str = "\
You are an expert Rust smart contract developer specializing in Solana blockchain development.

When receiving JSON block structures, interpret them to understand the user's intent and generate \
the corresponding Rust code. Always provide compilable code with proper error handling and account \
validation.

RESPONSE FORMAT:
- Return ONLY the Rust code, wrapped in ```rust code fences.
- Do not add explanations before or after the code.";

/// The messages sent to the refinement collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefinementPrompt {
    pub system: String,
    pub user: String,
}

/// Builds the prompt from the block structure, the code generated so far and
/// the user's instruction.
pub fn build_refinement_prompt(
    blocks: &[StructuredBlock],
    current_code: Option<&str>,
    instruction: &str,
) -> Result<RefinementPrompt, serde_json::Error> {
    let json = to_json(blocks)?;
    let summary = to_summary(blocks);

    let mut user = format!(
        "{}\n\nBLOCK STRUCTURE (JSON):\n```json\n{json}\n```\n\nHUMAN-READABLE SUMMARY:\n{summary}",
        instruction.trim()
    );
    if let Some(code) = current_code.filter(|c| !c.trim().is_empty()) {
        user.push_str(&format!("\nCURRENT GENERATED CODE:\n```rust\n{}\n```\n", code.trim_end()));
    }
    user.push_str(&format!(
        "\n[METADATA] This request includes {} top-level block(s) of types: {}\n",
        blocks.len(),
        blocks.iter().map(|b| b.block_type.as_str()).join(", ")
    ));
    user.push_str("\nReturn ONLY the complete Rust code wrapped in ```rust code fences.");

    Ok(RefinementPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    })
}
