use super::{StructuredBlock, StructuredInput};
use std::fmt::Write;

/// An indented, human-readable outline of the structured blocks.
pub fn to_summary(blocks: &[StructuredBlock]) -> String {
    let mut out = String::from("Blockly Workspace Structure:\n\n");
    for (index, block) in blocks.iter().enumerate() {
        let _ = writeln!(out, "Top-level Block {}:", index + 1);
        summarize(block, 1, &mut out);
        out.push('\n');
    }
    out
}

fn summarize(block: &StructuredBlock, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let _ = writeln!(out, "{indent}Type: {}", block.block_type);
    if block.revisited {
        let _ = writeln!(out, "{indent}(already shown: {})", block.id);
        return;
    }

    if !block.fields.is_empty() {
        let _ = writeln!(out, "{indent}Fields:");
        for (name, value) in &block.fields {
            let _ = writeln!(out, "{indent}  - {name}: {value}");
        }
    }

    if !block.inputs.is_empty() {
        let _ = writeln!(out, "{indent}Inputs:");
        for (name, input) in &block.inputs {
            match input {
                None => {
                    let _ = writeln!(out, "{indent}  - {name}: (empty)");
                }
                Some(StructuredInput::Chain(members)) => {
                    let _ = writeln!(out, "{indent}  - {name}: [{} blocks]", members.len());
                    for (index, member) in members.iter().enumerate() {
                        let _ = writeln!(out, "{indent}    Block {}:", index + 1);
                        summarize(member, depth + 3, out);
                    }
                }
                Some(StructuredInput::Single(child)) => {
                    let _ = writeln!(out, "{indent}  - {name}:");
                    summarize(child, depth + 2, out);
                }
            }
        }
    }

    if let Some(next) = &block.next {
        let _ = writeln!(out, "{indent}Next Block: {next}");
    }
}
