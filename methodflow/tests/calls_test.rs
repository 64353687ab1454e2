//! Call resolution, inlining budgets and render-time call annotations.

mod common;

use common::{call_expr, call_stmt, expr_stmt, method, raw};
use methodflow::ast::{ExprStmt, Method, NoopResolver, Program, Statement};
use methodflow::extract::extract;
use methodflow::options::ExtractOptions;
use methodflow::render::{render, render_default, RenderOptions};

fn program(methods: Vec<Method>) -> Program {
    Program { methods }
}

#[test]
fn expanded_callee_renders_as_namespaced_subgraph() {
    let p = program(vec![
        method("main", vec![call_stmt("helper", 2)]),
        method("helper", vec![expr_stmt("work()", 10)]),
    ]);
    let graph = extract(&p.methods[0], &ExtractOptions::default(), &p);
    let out = render_default(&graph);

    assert!(out.contains("cL2_L1([\"helper\"])"));
    assert!(out.contains("cL2_L10[\"work()\"]"));
    assert!(out.contains("cL2_L1-->cL2_L10"));
    assert!(out.contains("L2 -. \"calls:1\" .-> cL2_L1"));
}

#[test]
fn merge_calls_reuses_one_subgraph_per_callee() {
    let p = program(vec![
        method("main", vec![call_stmt("helper", 2), call_stmt("helper", 3)]),
        method("helper", vec![expr_stmt("work()", 10)]),
    ]);
    let graph = extract(&p.methods[0], &ExtractOptions::default(), &p);

    let merged = render_default(&graph);
    assert!(merged.contains("L2 -. \"calls:1\" .-> cL2_L1"));
    assert!(merged.contains("L3 -. \"calls:2\" .-> cL2_L1"));
    assert!(!merged.contains("cL3_"));

    let unmerged = render(
        &graph,
        &RenderOptions {
            merge_calls: false,
            ..RenderOptions::default()
        },
    );
    assert!(unmerged.contains("cL2_L1"));
    assert!(unmerged.contains("cL3_L1"));
}

#[test]
fn recursion_renders_hint_edge_instead_of_expansion() {
    let p = program(vec![method("f", vec![call_stmt("f", 2)])]);
    let graph = extract(&p.methods[0], &ExtractOptions::default(), &p);
    assert!(graph.recursive);

    let out = render_default(&graph);
    assert!(out.contains("L2 -. \"recursive call\" .-> n_start"));
    assert!(!out.contains("calls:"));
}

#[test]
fn platform_calls_follow_the_platform_budget() {
    let jdk_helper = Method {
        class_name: Some("java.util.List".to_owned()),
        ..method("helper", vec![expr_stmt("work()", 10)])
    };
    let main = method("main", vec![call_stmt("helper", 2)]);
    let p = program(vec![main, jdk_helper]);

    // budget 0 keeps the call as raw text with no expansion
    let graph = extract(&p.methods[0], &ExtractOptions::default(), &p);
    let node = graph.node("L2").unwrap();
    assert_eq!(node.label, "helper()");
    let call = node.meta.call.as_ref().unwrap();
    assert!(call.is_jdk);
    assert!(call.skip_render);
    assert!(call.callee_graph.is_none());

    // a negative budget drops the statement outright
    let opts = ExtractOptions {
        jdk_api_depth: -1,
        ..ExtractOptions::default()
    };
    let graph = extract(&p.methods[0], &opts, &p);
    assert!(graph.node("L2").is_none());

    // budget 1 expands one platform level
    let opts = ExtractOptions {
        jdk_api_depth: 1,
        ..ExtractOptions::default()
    };
    let graph = extract(&p.methods[0], &opts, &p);
    let call = graph.node("L2").unwrap().meta.call.as_ref().unwrap();
    assert!(call.callee_graph.is_some());
}

#[test]
fn disabled_fluent_fold_splits_the_chain() {
    let inner = call_expr(Some(raw("b", 2)), "c", Vec::new(), 2);
    let outer = call_expr(Some(inner), "d", Vec::new(), 2);
    let text = outer.text().to_owned();
    let m = method(
        "chained",
        vec![Statement::Expression(ExprStmt {
            expr: outer,
            text,
            line: 2,
        })],
    );
    let opts = ExtractOptions {
        fold_fluent_calls: false,
        ..ExtractOptions::default()
    };
    let graph = extract(&m, &opts, &NoopResolver);

    let root = graph.node("L2").unwrap();
    let tail = graph.node("L2_2").unwrap();
    assert_eq!(root.label, "b.c()");
    assert_eq!(tail.label, "...d()");
    assert!(root.meta.chain_split && tail.meta.chain_split);
    assert_eq!(root.meta.fluent_chain_id, tail.meta.fluent_chain_id);
    assert!(root.meta.fluent_chain_id.is_some());
    assert!(graph.edges.iter().any(|e| e.from == "L2" && e.to == "L2_2"));
}

#[test]
fn default_fluent_fold_keeps_the_chain_as_one_node() {
    let inner = call_expr(Some(raw("b", 2)), "c", Vec::new(), 2);
    let outer = call_expr(Some(inner), "d", Vec::new(), 2);
    let text = outer.text().to_owned();
    let m = method(
        "chained",
        vec![Statement::Expression(ExprStmt {
            expr: outer,
            text,
            line: 2,
        })],
    );
    let graph = extract(&m, &ExtractOptions::default(), &NoopResolver);

    assert_eq!(graph.node("L2").unwrap().label, "b.c().d()");
    assert!(graph.node("L2_2").is_none());
}
