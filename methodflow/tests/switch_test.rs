//! Switch statements, switch expressions and type-annotation links.

mod common;

use common::{expr_stmt, method, raw};
use methodflow::ast::{
    Block, DeclStmt, Expr, ExprStmt, NoopResolver, ReturnStmt, RuleBody, Statement, SwitchCase,
    SwitchExpr, SwitchKind, SwitchStmt, SwitchRule, YieldStmt,
};
use methodflow::extract::extract;
use methodflow::ir::{EdgeKind, NodeKind};
use methodflow::options::ExtractOptions;

fn rule(labels: &[&str], default: bool, body: RuleBody, line: u32) -> SwitchRule {
    SwitchRule {
        labels: labels.iter().map(|l| (*l).to_owned()).collect(),
        default,
        body,
        line,
    }
}

fn expr_body(text: &str, line: u32) -> RuleBody {
    RuleBody::Expression(ExprStmt {
        expr: raw(text, line),
        text: text.to_owned(),
        line,
    })
}

fn switch_expr(rules: Vec<SwitchRule>, line: u32) -> SwitchExpr {
    SwitchExpr {
        scrutinee: raw("x", line),
        scrutinee_kind: None,
        scrutinee_type: None,
        rules,
        text: "switch (x)".to_owned(),
        line,
    }
}

fn extract_default(m: &methodflow::ast::Method) -> methodflow::ir::ControlFlowGraph {
    extract(m, &ExtractOptions::default(), &NoopResolver)
}

#[test]
fn returned_switch_expression_hangs_off_the_return_node() {
    let expr = switch_expr(
        vec![
            rule(&["A"], false, expr_body("f1", 3), 3),
            rule(&[], true, expr_body("f2", 4), 4),
        ],
        2,
    );
    let m = method(
        "select",
        vec![Statement::Return(ReturnStmt {
            value: Some(Expr::Switch(Box::new(expr))),
            text: "return switch (x) ...".to_owned(),
            line: 2,
        })],
    );
    let graph = extract_default(&m);

    let ret = graph.nodes.iter().find(|n| n.label == "return switch").unwrap();
    assert_eq!(ret.kind, NodeKind::Return);
    // main flow goes start -> return -> end; the switch graph dangles off it
    assert!(graph.edges.iter().any(|e| e.from == "L1" && e.to == ret.id));
    let to_switch = graph
        .outgoing(&ret.id)
        .find(|e| e.kind == EdgeKind::Return)
        .unwrap();
    assert_eq!(to_switch.label, "switch");
    assert_eq!(graph.node(&to_switch.to).unwrap().label, "switch x");

    let merge = graph.nodes.iter().find(|n| n.label == "end switch").unwrap();
    assert_eq!(graph.incoming(&merge.id).count(), 2);
    assert!(graph.nodes.iter().any(|n| n.label == "case: A"));
    assert!(graph.nodes.iter().any(|n| n.label == "default"));
}

#[test]
fn enum_scrutinee_gets_a_type_annotation() {
    let m = method(
        "color",
        vec![Statement::Switch(SwitchStmt {
            scrutinee: raw("c", 2),
            scrutinee_kind: Some(SwitchKind::Enum),
            scrutinee_type: Some("Color".to_owned()),
            cases: vec![SwitchCase {
                labels: vec!["RED".to_owned()],
                default: false,
                statements: vec![expr_stmt("paint()", 3)],
                line: 3,
            }],
            text: "switch (c)".to_owned(),
            line: 2,
        })],
    );
    let graph = extract_default(&m);

    let type_node = graph.nodes.iter().find(|n| n.label == "Color").unwrap();
    assert!(type_node.meta.no_fold);
    let switch = graph.nodes.iter().find(|n| n.label == "switch c").unwrap();
    let link = graph
        .outgoing(&switch.id)
        .find(|e| e.to == type_node.id)
        .unwrap();
    assert_eq!(link.kind, EdgeKind::Return);
    assert_eq!(link.label, "enum");
}

#[test]
fn rule_blocks_with_yield_never_fold() {
    let block = RuleBody::Block(Block {
        statements: vec![Statement::Yield(YieldStmt {
            value: raw("v", 4),
            text: "yield v;".to_owned(),
            line: 4,
        })],
    });
    let expr = switch_expr(vec![rule(&["A"], false, block, 3)], 2);
    let m = method(
        "ruled",
        vec![Statement::Expression(ExprStmt {
            expr: Expr::Switch(Box::new(expr)),
            text: "switch (x) ...".to_owned(),
            line: 2,
        })],
    );
    let graph = extract_default(&m);

    let yielded = graph.nodes.iter().find(|n| n.label == "yield v").unwrap();
    assert!(yielded.meta.no_fold);
    let merge = graph.nodes.iter().find(|n| n.label == "end switch").unwrap();
    assert!(graph.edges.iter().any(|e| e.from == yielded.id && e.to == merge.id));
}

#[test]
fn declaration_switch_initializer_links_sideways() {
    let expr = switch_expr(vec![rule(&["A"], false, expr_body("f1", 3), 3)], 2);
    let m = method(
        "assign",
        vec![Statement::Declaration(DeclStmt {
            var_type: "int".to_owned(),
            name: "v".to_owned(),
            init: Some(Expr::Switch(Box::new(expr))),
            text: "int v = switch (x) ...".to_owned(),
            line: 2,
        })],
    );
    let graph = extract_default(&m);

    let decl = graph.nodes.iter().find(|n| n.label == "int v = switch").unwrap();
    let side = graph
        .outgoing(&decl.id)
        .find(|e| e.kind == EdgeKind::Return)
        .unwrap();
    assert_eq!(side.label, "switch");
    assert_eq!(graph.node(&side.to).unwrap().label, "switch x");
    // the declaration itself stays on the main flow
    let end = graph
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::End)
        .unwrap();
    assert!(graph.edges.iter().any(|e| e.from == decl.id && e.to == end.id));
}
