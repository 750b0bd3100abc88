use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use snapchain_codegen::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

const FIELD_TYPES: &[&str] = &["u8", "u16", "u32", "u64", "i64", "String", "bool", "Pubkey"];
const FIELD_NAMES: &[&str] = &[
    "owner", "amount", "counter", "authority", "bump", "label", "active", "limit",
];
const CONSTRAINTS: &[&str] = &["IS_INITIALIZED", "IS_SIGNER", "IS_WRITABLE", "HAS_FUNDS"];
const MATH_OPS: &[&str] = &["ADD", "SUB", "MUL", "DIV"];
const COMPARE_OPS: &[&str] = &["EQ", "NEQ", "LT", "LTE", "GT", "GTE"];

/// A tool to generate random block workspaces for exercising the code generator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated workspace JSON file to
    #[arg(short, long, default_value = "generated_workspace.json")]
    output: PathBuf,

    /// Number of account structs declared in the program
    #[arg(long, default_value_t = 5)]
    structs: usize,

    /// Number of statements in the instruction handler body
    #[arg(long, default_value_t = 20)]
    statements: usize,

    /// Maximum nesting depth of generated expressions
    #[arg(long, default_value_t = 3)]
    depth: usize,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    let mut generator = WorkspaceGenerator {
        rng: StdRng::seed_from_u64(seed),
        graph: Graph::new(Arc::new(Registry::with_default_catalog())),
        max_depth: cli.depth,
        accounts: Vec::new(),
    };

    if let Err(e) = generator.program(cli.structs, cli.statements) {
        exit_with_error(&format!("Failed to build workspace: {}", e));
    }
    let graph = generator.graph;

    let json = to_json(&to_structured(&graph))
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize workspace: {}", e)));
    if let Err(e) = fs::write(&cli.output, json) {
        exit_with_error(&format!(
            "Failed to write to file '{}': {}",
            cli.output.display(),
            e
        ));
    }

    println!(
        "Successfully generated {} blocks (seed {}) and saved to '{}'.",
        graph.len(),
        seed,
        cli.output.display()
    );
}

struct WorkspaceGenerator {
    rng: StdRng,
    graph: Graph,
    max_depth: usize,
    accounts: Vec<String>,
}

impl WorkspaceGenerator {
    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[self.rng.random_range(0..options.len())]
    }

    fn program(&mut self, structs: usize, statements: usize) -> Result<NodeId, GraphError> {
        let program = self
            .graph
            .create_node_with_fields("solana_program", [("name", "generated_program")])?;

        let mut items = Vec::with_capacity(structs + 1);
        for index in 0..structs {
            items.push(self.account_struct(index)?);
        }
        items.push(self.handler(statements)?);
        self.graph
            .bind_slot(&program, "body", SlotInput::Chain(items))?;
        Ok(program)
    }

    fn account_struct(&mut self, index: usize) -> Result<NodeId, GraphError> {
        let name = format!("Account{index}");
        let node = self
            .graph
            .create_node_with_fields("rust_struct", [("name", name.as_str())])?;

        let count = self.rng.random_range(1..=4);
        let mut fields = Vec::with_capacity(count);
        for position in 0..count {
            let field_name = format!("{}_{position}", self.pick(FIELD_NAMES));
            let field_type = self.pick(FIELD_TYPES);
            fields.push(self.graph.create_node_with_fields(
                "struct_field",
                [("name", field_name.as_str()), ("type", field_type)],
            )?);
        }
        self.graph
            .bind_slot(&node, "fields", SlotInput::Chain(fields))?;
        Ok(node)
    }

    fn handler(&mut self, statements: usize) -> Result<NodeId, GraphError> {
        let handler = self.graph.create_node("process_instruction")?;

        let mut params = Vec::new();
        for param in [
            "program_id: &Pubkey",
            "accounts: &[AccountInfo]",
            "instruction_data: &[u8]",
        ] {
            params.push(
                self.graph
                    .create_node_with_fields("function_param", [("type", param)])?,
            );
        }
        self.graph
            .bind_slot(&handler, "params", SlotInput::Chain(params))?;

        let account_count = self.rng.random_range(1..=4);
        let mut body = Vec::with_capacity(statements + account_count + 1);

        let validate = self.graph.create_node("validate_accounts")?;
        let min = self.number(account_count as i64)?;
        self.graph
            .bind_slot(&validate, "min_accounts", SlotInput::Single(min))?;
        body.push(validate);

        for index in 0..account_count {
            let name = format!("account_{index}");
            body.push(self.graph.create_node_with_fields(
                "get_account",
                [
                    ("index", FieldValue::from(index as i64)),
                    ("name", FieldValue::from(name.as_str())),
                ],
            )?);
            self.accounts.push(name);
        }

        for _ in 0..statements {
            body.push(self.statement(0)?);
        }
        self.graph
            .bind_slot(&handler, "body", SlotInput::Chain(body))?;
        Ok(handler)
    }

    fn account(&mut self) -> String {
        let index = self.rng.random_range(0..self.accounts.len());
        self.accounts[index].clone()
    }

    fn statement(&mut self, nesting: usize) -> Result<NodeId, GraphError> {
        let choice = if nesting >= 2 {
            self.rng.random_range(0..3)
        } else {
            self.rng.random_range(0..5)
        };
        match choice {
            0 => {
                let account = self.account();
                let constraint = self.pick(CONSTRAINTS);
                self.graph.create_node_with_fields(
                    "account_constraint",
                    [("account", account.as_str()), ("constraint", constraint)],
                )
            }
            1 => {
                let account = self.account();
                self.graph.create_node_with_fields(
                    "check_account_owner",
                    [("account", account.as_str()), ("owner", "program_id")],
                )
            }
            2 => {
                let event = self.graph.create_node_with_fields("emit_event", [("name", "Updated")])?;
                let account = self.account();
                let field = self
                    .graph
                    .create_node_with_fields("struct_field", [("name", account.as_str())])?;
                self.graph
                    .bind_slot(&event, "fields", SlotInput::Chain(vec![field]))?;
                Ok(event)
            }
            3 => {
                let conditional = self.graph.create_node("controls_if")?;
                let condition = self.condition()?;
                self.graph
                    .bind_slot(&conditional, "if0", SlotInput::Single(condition))?;
                let error = self.graph.create_node("program_error")?;
                self.graph
                    .bind_slot(&conditional, "do0", SlotInput::Chain(vec![error]))?;
                if self.rng.random_bool(0.5) {
                    let fallback = self.statement(nesting + 1)?;
                    self.graph
                        .bind_slot(&conditional, "else", SlotInput::Chain(vec![fallback]))?;
                }
                Ok(conditional)
            }
            _ => {
                let var = format!("i{nesting}");
                let repeat = self
                    .graph
                    .create_node_with_fields("controls_for", [("var", var.as_str())])?;
                let end = self.expression(0)?;
                self.graph.bind_slot(&repeat, "end", SlotInput::Single(end))?;
                let inner = self.statement(nesting + 1)?;
                self.graph
                    .bind_slot(&repeat, "do", SlotInput::Chain(vec![inner]))?;
                Ok(repeat)
            }
        }
    }

    fn condition(&mut self) -> Result<NodeId, GraphError> {
        let op = self.pick(COMPARE_OPS);
        let compare = self
            .graph
            .create_node_with_fields("logic_compare", [("op", op)])?;
        let a = self.expression(0)?;
        let b = self.expression(0)?;
        self.graph.bind_slot(&compare, "a", SlotInput::Single(a))?;
        self.graph.bind_slot(&compare, "b", SlotInput::Single(b))?;

        if !self.rng.random_bool(0.3) {
            return Ok(compare);
        }
        let negate = self.graph.create_node("logic_negate")?;
        self.graph
            .bind_slot(&negate, "bool", SlotInput::Single(compare))?;
        Ok(negate)
    }

    fn expression(&mut self, depth: usize) -> Result<NodeId, GraphError> {
        if depth >= self.max_depth || self.rng.random_bool(0.4) {
            return if self.rng.random_bool(0.7) {
                let value = self.rng.random_range(-10..=100);
                self.number(value)
            } else {
                let var = self.pick(&["i0", "i1", "amount"]);
                self.graph
                    .create_node_with_fields("variable_get", [("name", var)])
            };
        }
        let op = self.pick(MATH_OPS);
        let node = self
            .graph
            .create_node_with_fields("math_operation", [("operation", op)])?;
        let a = self.expression(depth + 1)?;
        let b = self.expression(depth + 1)?;
        self.graph.bind_slot(&node, "a", SlotInput::Single(a))?;
        self.graph.bind_slot(&node, "b", SlotInput::Single(b))?;
        Ok(node)
    }

    fn number(&mut self, value: i64) -> Result<NodeId, GraphError> {
        self.graph
            .create_node_with_fields("math_number", [("num", value)])
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
