//! Shared AST builders for integration tests.

#![allow(dead_code)]

use methodflow::ast::{
    Block, CallExpr, Expr, ExprStmt, Method, RawExpr, ReturnStmt, Statement,
};

pub fn raw(text: &str, line: u32) -> Expr {
    Expr::Raw(RawExpr {
        text: text.to_owned(),
        line,
        children: Vec::new(),
    })
}

pub fn expr_stmt(text: &str, line: u32) -> Statement {
    Statement::Expression(ExprStmt {
        expr: raw(text, line),
        text: text.to_owned(),
        line,
    })
}

pub fn call_expr(qualifier: Option<Expr>, name: &str, args: Vec<Expr>, line: u32) -> Expr {
    let text = match &qualifier {
        Some(q) => format!("{}.{name}()", q.text()),
        None => format!("{name}()"),
    };
    Expr::Call(Box::new(CallExpr {
        qualifier,
        name: name.to_owned(),
        args,
        text,
        line,
    }))
}

pub fn call_stmt(name: &str, line: u32) -> Statement {
    let expr = call_expr(None, name, Vec::new(), line);
    let text = expr.text().to_owned();
    Statement::Expression(ExprStmt { expr, text, line })
}

pub fn return_value(text: &str, line: u32) -> Statement {
    Statement::Return(ReturnStmt {
        value: Some(raw(text, line)),
        text: format!("return {text};"),
        line,
    })
}

pub fn method(name: &str, statements: Vec<Statement>) -> Method {
    Method {
        name: name.to_owned(),
        class_name: Some("Demo".to_owned()),
        body: Some(Block { statements }),
        line: 1,
        ..Method::default()
    }
}
