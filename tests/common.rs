//! Common test utilities for building block graphs.
use snapchain_codegen::prelude::*;
use std::sync::Arc;

/// A fresh registry with the full default catalog.
#[allow(dead_code)]
pub fn registry() -> Arc<Registry> {
    Arc::new(Registry::with_default_catalog())
}

#[allow(dead_code)]
pub fn empty_graph() -> Graph {
    Graph::new(registry())
}

/// An emitter sharing the graph's registry.
#[allow(dead_code)]
pub fn emitter_for(graph: &Graph) -> Emitter {
    Emitter::new(graph.registry_handle())
}

/// A scheduler that never sleeps between batches.
#[allow(dead_code)]
pub fn scheduler_for(graph: &Graph, batch_size: usize) -> Scheduler {
    let config = SchedulerConfig {
        batch_size,
        batch_delay_ms: 0,
        ..SchedulerConfig::default()
    };
    Scheduler::new(Arc::new(emitter_for(graph)), config)
}

#[allow(dead_code)]
pub fn number(graph: &mut Graph, value: i64) -> NodeId {
    graph
        .create_node_with_fields("math_number", [("num", value)])
        .unwrap()
}

#[allow(dead_code)]
pub fn variable(graph: &mut Graph, name: &str) -> NodeId {
    graph
        .create_node_with_fields("variable_get", [("name", name)])
        .unwrap()
}

/// A binary `math_operation` (`ADD`, `SUB`, `MUL` or `DIV`) over two bound operands.
#[allow(dead_code)]
pub fn math(graph: &mut Graph, op: &str, a: NodeId, b: NodeId) -> NodeId {
    binary(graph, "math_operation", "operation", op, a, b)
}

#[allow(dead_code)]
pub fn compare(graph: &mut Graph, op: &str, a: NodeId, b: NodeId) -> NodeId {
    binary(graph, "logic_compare", "op", op, a, b)
}

#[allow(dead_code)]
pub fn logic(graph: &mut Graph, op: &str, a: NodeId, b: NodeId) -> NodeId {
    binary(graph, "logic_operation", "op", op, a, b)
}

fn binary(graph: &mut Graph, type_id: &str, field: &str, op: &str, a: NodeId, b: NodeId) -> NodeId {
    let node = graph
        .create_node_with_fields(type_id, [(field, op)])
        .unwrap();
    graph.bind_slot(&node, "a", SlotInput::Single(a)).unwrap();
    graph.bind_slot(&node, "b", SlotInput::Single(b)).unwrap();
    node
}

/// `struct <name> { <field>: <type>, ... }` as a root.
#[allow(dead_code)]
pub fn account_struct(graph: &mut Graph, name: &str, fields: &[(&str, &str)]) -> NodeId {
    let node = graph
        .create_node_with_fields("rust_struct", [("name", name)])
        .unwrap();
    let members: Vec<NodeId> = fields
        .iter()
        .map(|(field, ty)| {
            graph
                .create_node_with_fields("struct_field", [("name", *field), ("type", *ty)])
                .unwrap()
        })
        .collect();
    if !members.is_empty() {
        graph
            .bind_slot(&node, "fields", SlotInput::Chain(members))
            .unwrap();
    }
    node
}

/// An instruction handler with the usual three parameters and the given body.
#[allow(dead_code)]
pub fn instruction(graph: &mut Graph, body: Vec<NodeId>) -> NodeId {
    let handler = graph.create_node("process_instruction").unwrap();
    let params: Vec<NodeId> = [
        "program_id: &Pubkey",
        "accounts: &[AccountInfo]",
        "instruction_data: &[u8]",
    ]
    .iter()
    .map(|ty| {
        graph
            .create_node_with_fields("function_param", [("type", *ty)])
            .unwrap()
    })
    .collect();
    graph
        .bind_slot(&handler, "params", SlotInput::Chain(params))
        .unwrap();
    if !body.is_empty() {
        graph
            .bind_slot(&handler, "body", SlotInput::Chain(body))
            .unwrap();
    }
    handler
}

/// A bare instruction handler with no parameters, for checking body output.
#[allow(dead_code)]
pub fn bare_instruction(graph: &mut Graph, body: Vec<NodeId>) -> NodeId {
    let handler = graph
        .create_node_with_fields("process_instruction", [("name", "handler")])
        .unwrap();
    graph
        .bind_slot(&handler, "body", SlotInput::Chain(body))
        .unwrap();
    handler
}

/// A `msg!` statement, useful as an ordered marker inside chains.
#[allow(dead_code)]
pub fn event(graph: &mut Graph, name: &str) -> NodeId {
    graph
        .create_node_with_fields("emit_event", [("name", name)])
        .unwrap()
}

/// A program wrapping a counter struct and one handler.
#[allow(dead_code)]
pub fn create_counter_program(graph: &mut Graph) -> NodeId {
    let program = graph
        .create_node_with_fields("solana_program", [("name", "counter")])
        .unwrap();
    let state = account_struct(graph, "Counter", &[("count", "u64"), ("authority", "Pubkey")]);

    let validate = graph.create_node("validate_accounts").unwrap();
    let counter = graph
        .create_node_with_fields(
            "get_account",
            [
                ("index", FieldValue::from(0_i64)),
                ("name", FieldValue::from("counter_account")),
            ],
        )
        .unwrap();
    let owner = graph
        .create_node_with_fields(
            "check_account_owner",
            [("account", "counter_account"), ("owner", "program_id")],
        )
        .unwrap();
    let done = event(graph, "Incremented");
    let handler = instruction(graph, vec![validate, counter, owner, done]);

    graph
        .bind_slot(&program, "body", SlotInput::Chain(vec![state, handler]))
        .unwrap();
    program
}
