//! Property tests over randomly built block graphs.
mod common;
use common::*;
use proptest::prelude::*;
use snapchain_codegen::emitter::is_valid_identifier;
use snapchain_codegen::prelude::*;

#[derive(Debug, Clone)]
enum Expr {
    Number(i64),
    Variable(String),
    Math(&'static str, Box<Expr>, Box<Expr>),
}

fn expr_strategy() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        (-50_i64..50).prop_map(Expr::Number),
        "[a-z][a-z0-9_]{0,6}"
            .prop_filter("valid identifier", |name| is_valid_identifier(name))
            .prop_map(Expr::Variable),
    ];
    leaf.prop_recursive(4, 32, 2, |inner| {
        (
            prop_oneof![Just("ADD"), Just("SUB"), Just("MUL"), Just("DIV")],
            inner.clone(),
            inner,
        )
            .prop_map(|(op, a, b)| Expr::Math(op, Box::new(a), Box::new(b)))
    })
}

fn build(graph: &mut Graph, expr: &Expr) -> NodeId {
    match expr {
        Expr::Number(value) => number(graph, *value),
        Expr::Variable(name) => variable(graph, name),
        Expr::Math(op, a, b) => {
            let a = build(graph, a);
            let b = build(graph, b);
            math(graph, op, a, b)
        }
    }
}

/// A graph with the given expressions and structs as roots.
fn graph_from(exprs: &[Expr], structs: &[Vec<String>]) -> Graph {
    let mut graph = empty_graph();
    for expr in exprs {
        build(&mut graph, expr);
    }
    for (i, fields) in structs.iter().enumerate() {
        let members: Vec<(&str, &str)> = fields.iter().map(|f| (f.as_str(), "u64")).collect();
        account_struct(&mut graph, &format!("Record{i}"), &members);
    }
    graph
}

fn struct_fields() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(1_usize..1000, 1..4).prop_map(|ids| {
        ids.into_iter()
            .enumerate()
            .map(|(i, id)| format!("field_{i}_{id}"))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_emission_is_deterministic(
        exprs in prop::collection::vec(expr_strategy(), 0..6),
        structs in prop::collection::vec(struct_fields(), 0..4),
    ) {
        let graph = graph_from(&exprs, &structs);
        let emitter = emitter_for(&graph);
        prop_assert_eq!(emitter.emit_document(&graph).unwrap(), emitter.emit_document(&graph).unwrap());
    }

    #[test]
    fn prop_batch_size_does_not_change_output(
        exprs in prop::collection::vec(expr_strategy(), 1..6),
        structs in prop::collection::vec(struct_fields(), 0..4),
        batch_size in 1_usize..40,
    ) {
        let graph = graph_from(&exprs, &structs);
        let single = emitter_for(&graph).emit_document(&graph).unwrap();
        let batched = tokio_test::block_on(scheduler_for(&graph, batch_size).generate(&graph)).unwrap();
        prop_assert_eq!(batched, single);
    }

    #[test]
    fn prop_structured_form_is_lossless(
        exprs in prop::collection::vec(expr_strategy(), 0..6),
        structs in prop::collection::vec(struct_fields(), 0..4),
    ) {
        let graph = graph_from(&exprs, &structs);
        let blocks = to_structured(&graph);
        let json = to_json(&blocks).unwrap();
        let rebuilt = from_json(&json).unwrap().into_graph(graph.registry_handle()).unwrap();

        prop_assert_eq!(to_structured(&rebuilt), blocks);
        let emitter = emitter_for(&graph);
        prop_assert_eq!(emitter.emit_document(&rebuilt).unwrap(), emitter.emit_document(&graph).unwrap());
    }

    #[test]
    fn prop_statement_order_is_preserved(count in 1_usize..30) {
        let mut graph = empty_graph();
        let events: Vec<NodeId> = (0..count).map(|i| event(&mut graph, &format!("Step{i}"))).collect();
        bare_instruction(&mut graph, events);

        let code = emitter_for(&graph).emit_document(&graph).unwrap();
        let positions: Vec<usize> = (0..count)
            .map(|i| code.find(&format!("\"Step{i}\"")).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn prop_parentheses_are_balanced(expr in expr_strategy()) {
        let mut graph = empty_graph();
        build(&mut graph, &expr);
        let code = emitter_for(&graph).emit_document(&graph).unwrap();

        let opens = code.matches('(').count();
        let closes = code.matches(')').count();
        prop_assert_eq!(opens, closes);
        prop_assert!(code.ends_with(";\n"));
    }
}
