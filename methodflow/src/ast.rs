//! The syntax facade consumed by the extractor.
//!
//! A host frontend (an editor plugin, a parser, a test) lowers one method
//! into these closed sum types. Every leaf carries its raw source `text`
//! and 1-based `line` so the extractor can label nodes and derive stable
//! ids without re-reading the original source.

use serde::{Deserialize, Serialize};

/// A method declaration plus (optionally) its statement body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Method {
    /// Simple method name.
    pub name: String,
    /// Qualified name of the containing type, when known.
    #[serde(default)]
    pub class_name: Option<String>,
    /// Declared parameters, in order.
    #[serde(default)]
    pub params: Vec<Param>,
    /// Presentable return type text.
    #[serde(default)]
    pub return_type: Option<String>,
    /// Doc-comment text attached to the declaration.
    #[serde(default)]
    pub doc: Option<String>,
    /// Statement body; `None` for abstract/interface methods.
    #[serde(default)]
    pub body: Option<Block>,
    /// 1-based line of the declaration.
    #[serde(default)]
    pub line: u32,
    /// Surrounding source text, used for blank-line detection during folding.
    #[serde(default)]
    pub source: Option<String>,
}

/// One declared parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Presentable type text.
    pub ty: String,
}

impl Method {
    /// Bare signature: `name(Ty1, Ty2)`.
    #[must_use]
    pub fn signature(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| p.ty.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({params})", self.name)
    }

    /// Qualified signature used for skip-pattern matching and call identity:
    /// `com.acme.Foo#name(Ty1,Ty2)` (no class part when unknown).
    #[must_use]
    pub fn qualified_signature(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| p.ty.as_str())
            .collect::<Vec<_>>()
            .join(",");
        match &self.class_name {
            Some(qname) if !qname.is_empty() => format!("{qname}#{}({params})", self.name),
            _ => format!("{}({params})", self.name),
        }
    }

    /// Whether the containing type lives in a platform/standard-library package.
    #[must_use]
    pub fn is_platform(&self) -> bool {
        self.class_name.as_deref().is_some_and(|qname| {
            crate::constants::PLATFORM_PACKAGE_PREFIXES
                .iter()
                .any(|p| qname.starts_with(p))
        })
    }
}

/// A brace-delimited statement list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Block {
    /// Statements in source order.
    #[serde(default)]
    pub statements: Vec<Statement>,
}

/// One statement, as a closed tagged union.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    /// An expression evaluated for effect (`foo();`, `a = b ? c : d;`).
    Expression(ExprStmt),
    /// A local variable declaration.
    Declaration(DeclStmt),
    /// `if`/`else`.
    If(Box<IfStmt>),
    /// `while`.
    While(Box<WhileStmt>),
    /// `do { .. } while (..)`.
    DoWhile(Box<DoWhileStmt>),
    /// Classic three-clause `for`.
    For(Box<ForStmt>),
    /// Enhanced `for (x : xs)`.
    ForEach(Box<ForEachStmt>),
    /// `switch` statement (colon or arrow cases, pre-grouped per label list).
    Switch(SwitchStmt),
    /// `return`.
    Return(ReturnStmt),
    /// `yield` inside a switch-expression rule block.
    Yield(YieldStmt),
    /// `break`.
    Break(SimpleStmt),
    /// `continue`.
    Continue(SimpleStmt),
    /// `throw`.
    Throw(ThrowStmt),
    /// `try`/`catch`/`finally`.
    Try(Box<TryStmt>),
    /// A nested block.
    Block(Block),
    /// A bare `;`.
    Empty,
}

/// Expression statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExprStmt {
    /// The evaluated expression.
    pub expr: Expr,
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
}

/// Local variable declaration statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclStmt {
    /// Presentable type text of the variable.
    pub var_type: String,
    /// Variable name.
    pub name: String,
    /// Initializer, when present.
    #[serde(default)]
    pub init: Option<Expr>,
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
}

/// `if` statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IfStmt {
    /// Branch condition.
    pub condition: Expr,
    /// Then branch.
    pub then_branch: Statement,
    /// Else branch, possibly another `If` (else-if chain).
    #[serde(default)]
    pub else_branch: Option<Statement>,
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
}

/// `while` loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhileStmt {
    /// Loop condition.
    pub condition: Expr,
    /// Loop body.
    pub body: Statement,
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
}

/// `do`/`while` loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoWhileStmt {
    /// Loop body, executed before the first condition check.
    pub body: Statement,
    /// Loop condition.
    pub condition: Expr,
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
}

/// Three-clause `for` loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForStmt {
    /// Initialization clause.
    #[serde(default)]
    pub init: Option<Statement>,
    /// Condition clause; `None` means an infinite loop.
    #[serde(default)]
    pub condition: Option<Expr>,
    /// Update clause, re-entered by `continue`.
    #[serde(default)]
    pub update: Option<Statement>,
    /// Loop body.
    pub body: Statement,
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
}

/// Enhanced `for` loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForEachStmt {
    /// Iteration variable name.
    pub var_name: String,
    /// Iterated expression.
    pub iterable: Expr,
    /// Loop body.
    pub body: Statement,
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
}

/// `switch` statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchStmt {
    /// Scrutinee expression.
    pub scrutinee: Expr,
    /// Host-resolved kind of the scrutinee type, when interesting.
    #[serde(default)]
    pub scrutinee_kind: Option<SwitchKind>,
    /// Presentable scrutinee type text.
    #[serde(default)]
    pub scrutinee_type: Option<String>,
    /// Case groups, one per label list.
    #[serde(default)]
    pub cases: Vec<SwitchCase>,
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
}

/// Scrutinee type classification for the dashed type-annotation node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchKind {
    /// An enum type.
    Enum,
    /// A sealed type hierarchy.
    Sealed,
}

impl SwitchKind {
    /// Label text for the annotation edge.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SwitchKind::Enum => "enum",
            SwitchKind::Sealed => "sealed",
        }
    }
}

/// One case group of a `switch` statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchCase {
    /// Label value texts (`1`, `"x"`, ...); empty for `default`.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Whether this is the `default` case.
    #[serde(default)]
    pub default: bool,
    /// Statements under this label list.
    #[serde(default)]
    pub statements: Vec<Statement>,
    /// 1-based start line of the label.
    pub line: u32,
}

/// `return` statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnStmt {
    /// Returned expression, when any.
    #[serde(default)]
    pub value: Option<Expr>,
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
}

/// `yield` statement (switch-expression rule blocks only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YieldStmt {
    /// Yielded expression.
    pub value: Expr,
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
}

/// `break`/`continue` statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleStmt {
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
}

/// `throw` statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrowStmt {
    /// Thrown expression.
    pub value: Expr,
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
}

/// `try` statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TryStmt {
    /// Guarded block.
    pub body: Block,
    /// Catch clauses, in order.
    #[serde(default)]
    pub catches: Vec<CatchClause>,
    /// Finally block, when present.
    #[serde(default)]
    pub finally: Option<Block>,
    /// 1-based start line.
    pub line: u32,
}

/// One `catch` clause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatchClause {
    /// Presentable text of the caught exception type.
    pub param_type: String,
    /// Handler block.
    pub body: Block,
    /// 1-based start line.
    pub line: u32,
}

/// One expression, as a closed tagged union.
///
/// `Raw` covers everything the extractor has no structural interest in;
/// its `children` keep the calls/constructors nested inside it reachable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// `cond ? a : b`.
    Ternary(Box<TernaryExpr>),
    /// A method call, possibly qualified (`a.b(x)`).
    Call(Box<CallExpr>),
    /// `new Foo(..)`.
    New(Box<NewExpr>),
    /// `lhs = value`.
    Assign(Box<AssignExpr>),
    /// A switch expression.
    Switch(Box<SwitchExpr>),
    /// `( inner )`.
    Paren(Box<ParenExpr>),
    /// Any other expression, with notable sub-expressions as children.
    Raw(RawExpr),
}

/// Ternary conditional expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TernaryExpr {
    /// Condition.
    pub condition: Expr,
    /// Value when true.
    pub then_value: Expr,
    /// Value when false.
    pub else_value: Expr,
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
}

/// Method call expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallExpr {
    /// Receiver expression; another `Call` for fluent chains.
    #[serde(default)]
    pub qualifier: Option<Expr>,
    /// Called method name.
    pub name: String,
    /// Argument expressions.
    #[serde(default)]
    pub args: Vec<Expr>,
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
}

impl CallExpr {
    /// Argument list display text: `(a, b)`.
    #[must_use]
    pub fn args_display(&self) -> String {
        let inner = self
            .args
            .iter()
            .map(Expr::text)
            .collect::<Vec<_>>()
            .join(", ");
        format!("({inner})")
    }
}

/// Constructor invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpr {
    /// Constructed type text.
    pub class_name: String,
    /// Argument expressions.
    #[serde(default)]
    pub args: Vec<Expr>,
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
}

/// Assignment expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignExpr {
    /// Left-hand-side text.
    pub target: String,
    /// Assigned value.
    pub value: Expr,
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
}

/// Switch expression (value-producing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchExpr {
    /// Scrutinee expression.
    pub scrutinee: Expr,
    /// Host-resolved kind of the scrutinee type, when interesting.
    #[serde(default)]
    pub scrutinee_kind: Option<SwitchKind>,
    /// Presentable scrutinee type text.
    #[serde(default)]
    pub scrutinee_type: Option<String>,
    /// Arrow rules, in order.
    #[serde(default)]
    pub rules: Vec<SwitchRule>,
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
}

/// One arrow rule of a switch expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchRule {
    /// Label value texts; empty for `default`.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Whether this is the `default` rule.
    #[serde(default)]
    pub default: bool,
    /// Rule body.
    pub body: RuleBody,
    /// 1-based start line.
    pub line: u32,
}

/// Body of a switch-expression rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleBody {
    /// `case X -> expr`.
    Expression(ExprStmt),
    /// `case X -> { .. yield v; }`.
    Block(Block),
}

/// Parenthesized expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParenExpr {
    /// The wrapped expression.
    pub inner: Expr,
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
}

/// Catch-all expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExpr {
    /// Raw source text.
    pub text: String,
    /// 1-based start line.
    pub line: u32,
    /// Notable nested expressions (calls, constructors, ternaries).
    #[serde(default)]
    pub children: Vec<Expr>,
}

impl Expr {
    /// Raw source text of this expression.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Expr::Ternary(e) => &e.text,
            Expr::Call(e) => &e.text,
            Expr::New(e) => &e.text,
            Expr::Assign(e) => &e.text,
            Expr::Switch(e) => &e.text,
            Expr::Paren(e) => &e.text,
            Expr::Raw(e) => &e.text,
        }
    }

    /// 1-based start line of this expression.
    #[must_use]
    pub fn line(&self) -> u32 {
        match self {
            Expr::Ternary(e) => e.line,
            Expr::Call(e) => e.line,
            Expr::New(e) => e.line,
            Expr::Assign(e) => e.line,
            Expr::Switch(e) => e.line,
            Expr::Paren(e) => e.line,
            Expr::Raw(e) => e.line,
        }
    }

    /// Strips any number of parenthesis wrappers.
    #[must_use]
    pub fn unwrap_parens(&self) -> &Expr {
        let mut current = self;
        while let Expr::Paren(paren) = current {
            current = &paren.inner;
        }
        current
    }

    /// Direct sub-expressions, in evaluation order.
    #[must_use]
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Ternary(e) => vec![&e.condition, &e.then_value, &e.else_value],
            Expr::Call(e) => {
                let mut out: Vec<&Expr> = Vec::with_capacity(e.args.len() + 1);
                if let Some(q) = &e.qualifier {
                    out.push(q);
                }
                out.extend(e.args.iter());
                out
            }
            Expr::New(e) => e.args.iter().collect(),
            Expr::Assign(e) => vec![&e.value],
            Expr::Switch(e) => vec![&e.scrutinee],
            Expr::Paren(e) => vec![&e.inner],
            Expr::Raw(e) => e.children.iter().collect(),
        }
    }

    /// Post-order walk over this expression tree.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        for child in self.children() {
            child.walk(f);
        }
        f(self);
    }

    /// Whether any nested call looks like a getter (`get*`/`is*`).
    #[must_use]
    pub fn contains_getter(&self) -> bool {
        let mut found = false;
        self.walk(&mut |e| {
            if let Expr::Call(call) = e {
                if call.name.starts_with("get") || call.name.starts_with("is") {
                    found = true;
                }
            }
        });
        found
    }

    /// Whether any nested expression is a constructor invocation.
    #[must_use]
    pub fn contains_ctor(&self) -> bool {
        let mut found = false;
        self.walk(&mut |e| {
            if matches!(e, Expr::New(_)) {
                found = true;
            }
        });
        found
    }
}

impl Statement {
    /// 1-based start line, when the variant carries one.
    #[must_use]
    pub fn line(&self) -> Option<u32> {
        match self {
            Statement::Expression(s) => Some(s.line),
            Statement::Declaration(s) => Some(s.line),
            Statement::If(s) => Some(s.line),
            Statement::While(s) => Some(s.line),
            Statement::DoWhile(s) => Some(s.line),
            Statement::For(s) => Some(s.line),
            Statement::ForEach(s) => Some(s.line),
            Statement::Switch(s) => Some(s.line),
            Statement::Return(s) => Some(s.line),
            Statement::Yield(s) => Some(s.line),
            Statement::Break(s) | Statement::Continue(s) => Some(s.line),
            Statement::Throw(s) => Some(s.line),
            Statement::Try(s) => Some(s.line),
            Statement::Block(_) | Statement::Empty => None,
        }
    }

    /// Whether this statement transitively contains a `return` or `throw`.
    ///
    /// Used to decide whether a switch case provably terminates.
    #[must_use]
    pub fn contains_terminal(&self) -> bool {
        match self {
            Statement::Return(_) | Statement::Throw(_) => true,
            Statement::Expression(_)
            | Statement::Declaration(_)
            | Statement::Yield(_)
            | Statement::Break(_)
            | Statement::Continue(_)
            | Statement::Empty => false,
            Statement::If(s) => {
                s.then_branch.contains_terminal()
                    || s.else_branch
                        .as_ref()
                        .is_some_and(Statement::contains_terminal)
            }
            Statement::While(s) => s.body.contains_terminal(),
            Statement::DoWhile(s) => s.body.contains_terminal(),
            Statement::For(s) => s.body.contains_terminal(),
            Statement::ForEach(s) => s.body.contains_terminal(),
            Statement::Switch(s) => s
                .cases
                .iter()
                .any(|c| c.statements.iter().any(Statement::contains_terminal)),
            Statement::Try(s) => {
                s.body.statements.iter().any(Statement::contains_terminal)
                    || s.catches
                        .iter()
                        .any(|c| c.body.statements.iter().any(Statement::contains_terminal))
                    || s.finally.as_ref().is_some_and(|f| {
                        f.statements.iter().any(Statement::contains_terminal)
                    })
            }
            Statement::Block(b) => b.statements.iter().any(Statement::contains_terminal),
        }
    }
}

/// Resolves a call expression to its declaration.
///
/// Resolution failure is never fatal: the extractor degrades to an
/// unlinked leaf label built from the raw call text.
pub trait CallResolver {
    /// Returns the declaration of `call`'s target, when known.
    fn resolve(&self, call: &CallExpr) -> Option<&Method>;
}

/// A resolver that never resolves anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

impl CallResolver for NoopResolver {
    fn resolve(&self, _call: &CallExpr) -> Option<&Method> {
        None
    }
}

/// Resolves calls against a flat list of methods by name and arity.
///
/// This is what the CLI uses for a JSON-supplied program; a real frontend
/// would plug in its own resolver with proper type information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    /// All methods visible to resolution.
    #[serde(default)]
    pub methods: Vec<Method>,
}

impl Program {
    /// Finds a method by simple name.
    #[must_use]
    pub fn method_by_name(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }
}

impl CallResolver for Program {
    fn resolve(&self, call: &CallExpr) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.name == call.name && m.params.len() == call.args.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_deserializes_from_tagged_json() {
        let json = r#"{
            "methods": [{
                "name": "greet",
                "class_name": "demo.Greeter",
                "params": [{"name": "who", "ty": "String"}],
                "line": 3,
                "body": {"statements": [
                    {
                        "kind": "if",
                        "condition": {"kind": "raw", "text": "who.isEmpty()", "line": 4},
                        "then_branch": {"kind": "return", "text": "return;", "line": 5},
                        "text": "if (who.isEmpty())",
                        "line": 4
                    },
                    {
                        "kind": "expression",
                        "expr": {
                            "kind": "call",
                            "qualifier": {"kind": "raw", "text": "out", "line": 6},
                            "name": "println",
                            "args": [{"kind": "raw", "text": "who", "line": 6}],
                            "text": "out.println(who)",
                            "line": 6
                        },
                        "text": "out.println(who);",
                        "line": 6
                    }
                ]}
            }]
        }"#;
        let program: Program = serde_json::from_str(json).unwrap();

        let method = program.method_by_name("greet").unwrap();
        assert_eq!(method.signature(), "greet(String)");
        assert_eq!(method.qualified_signature(), "demo.Greeter#greet(String)");
        assert!(!method.is_platform());

        let statements = &method.body.as_ref().unwrap().statements;
        assert_eq!(statements.len(), 2);
        let Statement::If(if_stmt) = &statements[0] else {
            panic!("expected an if statement");
        };
        assert!(if_stmt.else_branch.is_none());
        assert!(matches!(statements[1], Statement::Expression(_)));
    }

    #[test]
    fn program_resolves_by_name_and_arity() {
        let make = |name: &str, arity: usize| Method {
            name: name.to_owned(),
            params: (0..arity)
                .map(|i| Param {
                    name: format!("p{i}"),
                    ty: "int".to_owned(),
                })
                .collect(),
            ..Method::default()
        };
        let program = Program {
            methods: vec![make("f", 1), make("f", 2), make("g", 0)],
        };
        let call = CallExpr {
            qualifier: None,
            name: "f".to_owned(),
            args: vec![
                Expr::Raw(RawExpr {
                    text: "a".to_owned(),
                    line: 1,
                    children: Vec::new(),
                }),
                Expr::Raw(RawExpr {
                    text: "b".to_owned(),
                    line: 1,
                    children: Vec::new(),
                }),
            ],
            text: "f(a, b)".to_owned(),
            line: 1,
        };
        let target = program.resolve(&call).unwrap();
        assert_eq!(target.params.len(), 2);
    }

    #[test]
    fn platform_detection_follows_the_package_prefix() {
        let mut m = Method {
            class_name: Some("java.util.List".to_owned()),
            ..Method::default()
        };
        assert!(m.is_platform());
        m.class_name = Some("javafx.scene.Node".to_owned());
        assert!(!m.is_platform());
    }
}
