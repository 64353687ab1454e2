use super::*;
use crate::ast::{
    Block, CallExpr, Expr, ExprStmt, IfStmt, NoopResolver, Param, Program, RawExpr, ReturnStmt,
    Statement, WhileStmt,
};
use crate::ir::{EdgeKind, NodeKind};

fn raw(text: &str, line: u32) -> Expr {
    Expr::Raw(RawExpr {
        text: text.to_owned(),
        line,
        children: Vec::new(),
    })
}

fn expr_stmt(text: &str, line: u32) -> Statement {
    Statement::Expression(ExprStmt {
        expr: raw(text, line),
        text: text.to_owned(),
        line,
    })
}

fn call_stmt(name: &str, line: u32) -> Statement {
    let text = format!("{name}()");
    Statement::Expression(ExprStmt {
        expr: Expr::Call(Box::new(CallExpr {
            qualifier: None,
            name: name.to_owned(),
            args: Vec::new(),
            text: text.clone(),
            line,
        })),
        text,
        line,
    })
}

fn return_stmt(line: u32) -> Statement {
    Statement::Return(ReturnStmt {
        value: None,
        text: "return;".to_owned(),
        line,
    })
}

fn method(name: &str, statements: Vec<Statement>) -> Method {
    Method {
        name: name.to_owned(),
        class_name: Some("Demo".to_owned()),
        body: Some(Block { statements }),
        line: 1,
        ..Method::default()
    }
}

fn extract_default(method: &Method) -> ControlFlowGraph {
    extract(method, &ExtractOptions::default(), &NoopResolver)
}

#[test]
fn empty_body_connects_start_to_end() {
    let graph = extract_default(&method("noop", vec![]));
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.nodes[0].kind, NodeKind::Start);
    assert_eq!(graph.nodes[1].kind, NodeKind::End);
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].from, graph.nodes[0].id);
    assert_eq!(graph.edges[0].to, graph.nodes[1].id);
    assert_eq!(graph.entry_id, graph.nodes[0].id);
    assert_eq!(graph.exit_id, graph.nodes[1].id);
}

#[test]
fn statements_after_return_are_unreachable() {
    let graph = extract_default(&method(
        "early",
        vec![return_stmt(2), expr_stmt("x++", 3)],
    ));
    assert!(graph.nodes.iter().all(|n| n.label != "x++"));
    let ret = graph
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Return)
        .unwrap();
    assert!(graph.outgoing(&ret.id).any(|e| e.kind == EdgeKind::Normal));
}

#[test]
fn node_ids_derive_from_lines() {
    let graph = extract_default(&method(
        "ids",
        vec![expr_stmt("a++", 5), expr_stmt("b++", 5), expr_stmt("c++", 7)],
    ));
    assert!(graph.node("L5").is_some());
    assert!(graph.node("L5_2").is_some());
    assert!(graph.node("L7").is_some());
}

#[test]
fn adjacent_setters_fold_into_one_node() {
    let graph = extract_default(&method(
        "configure",
        vec![expr_stmt("foo.setA(1)", 2), expr_stmt("foo.setB(2)", 3)],
    ));
    let merged = graph
        .nodes
        .iter()
        .find(|n| n.label == "foo.setA(1)</br>foo.setB(2)")
        .unwrap();
    assert_eq!(merged.meta.merged_from, vec!["L2", "L3"]);
    assert_eq!(merged.meta.end_line, Some(3));
    assert!(graph.node("L3").is_none());
}

#[test]
fn blank_source_line_blocks_folding() {
    let mut m = method(
        "configure",
        vec![expr_stmt("foo.setA(1)", 2), expr_stmt("foo.setB(2)", 4)],
    );
    m.source = Some("void configure() {\n    foo.setA(1);\n\n    foo.setB(2);\n}".to_owned());
    let graph = extract_default(&m);
    assert!(graph.node("L2").is_some());
    assert!(graph.node("L4").is_some());
}

#[test]
fn fold_respects_parent_flag() {
    let opts = ExtractOptions {
        fold_sequential_calls: false,
        ..ExtractOptions::default()
    };
    let graph = extract(
        &method(
            "configure",
            vec![expr_stmt("foo.setA(1)", 2), expr_stmt("foo.setB(2)", 3)],
        ),
        &opts,
        &NoopResolver,
    );
    assert!(graph.node("L2").is_some());
    assert!(graph.node("L3").is_some());
}

#[test]
fn different_call_kinds_never_fold() {
    let graph = extract_default(&method(
        "mixed",
        vec![expr_stmt("foo.setA(1)", 2), expr_stmt("foo.getB()", 3)],
    ));
    assert!(graph.node("L2").is_some());
    assert!(graph.node("L3").is_some());
}

#[test]
fn fold_pass_is_idempotent() {
    let m = method(
        "steady",
        vec![
            expr_stmt("cfg.setHost(h)", 2),
            expr_stmt("cfg.setPort(p)", 3),
            expr_stmt("x = getA()", 4),
            expr_stmt("y = getB()", 5),
            Statement::If(Box::new(IfStmt {
                condition: raw("x > y", 6),
                then_branch: return_stmt(7),
                else_branch: None,
                text: "if (x > y)".to_owned(),
                line: 6,
            })),
            return_stmt(9),
        ],
    );
    let graph = extract_default(&m);

    // re-run the fold on the already-folded graph
    let mut builder = Builder::new(
        ExtractOptions::default().normalized(),
        Vec::new(),
        &NoopResolver,
        &m,
        FxHashSet::default(),
    );
    builder.nodes = graph.nodes.clone();
    builder.edges = graph.edges.clone();
    builder.fold_linear_actions();

    let labels = |nodes: &[Node]| {
        nodes
            .iter()
            .map(|n| (n.id.clone(), n.label.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(labels(&builder.nodes), labels(&graph.nodes));
    let keys = |edges: &[Edge]| edges.iter().map(Edge::dedup_key).collect::<Vec<_>>();
    assert_eq!(keys(&builder.edges), keys(&graph.edges));
}

#[test]
fn break_outside_loop_dead_ends() {
    let graph = extract_default(&method(
        "loose",
        vec![
            Statement::Break(crate::ast::SimpleStmt {
                text: "break;".to_owned(),
                line: 2,
            }),
            expr_stmt("x++", 3),
        ],
    ));
    let brk = graph.nodes.iter().find(|n| n.label == "break").unwrap();
    assert_eq!(graph.outgoing(&brk.id).count(), 0);
    assert!(graph.nodes.iter().all(|n| n.label != "x++"));
}

#[test]
fn if_without_else_routes_false_to_next_statement() {
    let graph = extract_default(&method(
        "guard",
        vec![
            Statement::If(Box::new(IfStmt {
                condition: raw("x > 0", 2),
                then_branch: expr_stmt("handle(x)", 3),
                else_branch: None,
                text: "if (x > 0)".to_owned(),
                line: 2,
            })),
            expr_stmt("done()", 5),
        ],
    ));
    let decision = graph
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Decision)
        .unwrap();
    assert!(graph
        .outgoing(&decision.id)
        .any(|e| e.kind == EdgeKind::True && e.to == "L3"));
    assert!(graph
        .outgoing(&decision.id)
        .any(|e| e.kind == EdgeKind::False && e.to == "L5" && e.label == "false"));
    assert!(graph.outgoing("L3").any(|e| e.to == "L5"));
}

#[test]
fn while_loop_shape() {
    let graph = extract_default(&method(
        "spin",
        vec![Statement::While(Box::new(WhileStmt {
            condition: raw("i < n", 2),
            body: expr_stmt("i++", 3),
            text: "while (i < n)".to_owned(),
            line: 2,
        }))],
    ));
    let head = graph
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::LoopHead)
        .unwrap();
    assert!(graph
        .outgoing(&head.id)
        .any(|e| e.kind == EdgeKind::True && e.to == "L3"));
    // body loops back to the head
    assert!(graph.outgoing("L3").any(|e| e.to == head.id));
    let false_exit = graph
        .outgoing(&head.id)
        .find(|e| e.kind == EdgeKind::False)
        .unwrap();
    let merge = graph.node(&false_exit.to).unwrap();
    assert_eq!(merge.kind, NodeKind::Merge);
}

#[test]
fn recursive_call_is_marked_not_expanded() {
    let body = vec![call_stmt("f", 2)];
    let program = Program {
        methods: vec![method("f", body)],
    };
    let graph = extract(
        &program.methods[0],
        &ExtractOptions::default(),
        &program,
    );
    assert!(graph.recursive);
    let node = graph
        .nodes
        .iter()
        .find(|n| n.label == "recursive call: f()")
        .unwrap();
    assert_eq!(node.kind, NodeKind::Call);
    let call = node.meta.call.as_ref().unwrap();
    assert!(call.callee_graph.is_none());
}

#[test]
fn call_depth_zero_keeps_callee_as_leaf() {
    let helper = method("helper", vec![expr_stmt("work()", 10)]);
    let main = method("main", vec![call_stmt("helper", 2)]);
    let program = Program {
        methods: vec![main, helper],
    };
    let opts = ExtractOptions {
        call_depth: 0,
        ..ExtractOptions::default()
    };
    let graph = extract(&program.methods[0], &opts, &program);
    let node = graph.nodes.iter().find(|n| n.label == "helper()").unwrap();
    let call = node.meta.call.as_ref().unwrap();
    assert!(call.skip_render);
    assert!(call.callee_graph.is_none());
}

#[test]
fn call_depth_one_expands_callee_graph() {
    let helper = Method {
        doc: Some("Does the work.".to_owned()),
        ..method("helper", vec![expr_stmt("work()", 10)])
    };
    let main = method("main", vec![call_stmt("helper", 2)]);
    let program = Program {
        methods: vec![main, helper],
    };
    let graph = extract(&program.methods[0], &ExtractOptions::default(), &program);
    let node = graph
        .nodes
        .iter()
        .find(|n| n.label == "Does the work.()")
        .unwrap();
    let call = node.meta.call.as_ref().unwrap();
    assert!(!call.skip_render);
    let callee = call.callee_graph.as_ref().unwrap();
    assert!(callee.nodes.iter().any(|n| n.label == "work()"));
}

#[test]
fn skip_pattern_blocks_expansion() {
    let helper = method("logStuff", vec![expr_stmt("work()", 10)]);
    let main = method("main", vec![call_stmt("logStuff", 2)]);
    let program = Program {
        methods: vec![main, helper],
    };
    let opts = ExtractOptions {
        skip_patterns: vec![r".*#log\w*\(.*\)".to_owned()],
        ..ExtractOptions::default()
    };
    let graph = extract(&program.methods[0], &opts, &program);
    let node = graph
        .nodes
        .iter()
        .find(|n| n.meta.call.is_some())
        .unwrap();
    let call = node.meta.call.as_ref().unwrap();
    assert!(call.skip_render);
    assert!(call.callee_graph.is_none());
}

#[test]
fn param_arity_drives_resolution() {
    let one_arg = Method {
        params: vec![Param {
            name: "x".to_owned(),
            ty: "int".to_owned(),
        }],
        ..method("pick", vec![expr_stmt("a()", 10)])
    };
    let program = Program {
        methods: vec![method("main", vec![call_stmt("pick", 2)]), one_arg],
    };
    // zero-arg call never resolves against the one-arg overload
    let graph = extract(&program.methods[0], &ExtractOptions::default(), &program);
    let node = graph.nodes.iter().find(|n| n.id == "L2").unwrap();
    assert_eq!(node.label, "pick()");
    assert!(node.meta.call.is_none());
}
