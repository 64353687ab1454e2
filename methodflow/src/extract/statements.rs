//! Per-statement traversal handlers.

use smallvec::smallvec;

use crate::ast::{
    DeclStmt, DoWhileStmt, Expr, ExprStmt, ForEachStmt, ForStmt, IfStmt, ReturnStmt, RuleBody,
    Statement, SwitchExpr, SwitchKind, SwitchRule, SwitchStmt, TernaryExpr, ThrowStmt, TryStmt,
    WhileStmt, YieldStmt,
};
use crate::ir::{EdgeKind, NodeId, NodeKind, NodeMeta};

use super::{Builder, Endpoint, Endpoints, LoopContext};

impl Builder<'_> {
    pub(crate) fn process_statements(
        &mut self,
        statements: &[Statement],
        incoming: Endpoints,
    ) -> Endpoints {
        let mut current = incoming;
        for statement in statements {
            current = self.handle_statement(statement, current);
            if current.is_empty() {
                break;
            }
        }
        current
    }

    pub(crate) fn handle_statement(
        &mut self,
        statement: &Statement,
        incoming: Endpoints,
    ) -> Endpoints {
        match statement {
            Statement::Block(block) => self.process_statements(&block.statements, incoming),
            Statement::If(stmt) => self.handle_if(stmt, incoming),
            Statement::While(stmt) => self.handle_while(stmt, incoming),
            Statement::For(stmt) => self.handle_for(stmt, incoming),
            Statement::ForEach(stmt) => self.handle_foreach(stmt, incoming),
            Statement::DoWhile(stmt) => self.handle_do_while(stmt, incoming),
            Statement::Return(stmt) => self.handle_return(stmt, incoming),
            Statement::Break(stmt) => self.handle_break(&stmt.text, stmt.line, incoming),
            Statement::Continue(stmt) => self.handle_continue(&stmt.text, stmt.line, incoming),
            Statement::Switch(stmt) => self.handle_switch(stmt, incoming),
            Statement::Throw(stmt) => self.handle_throw(stmt, incoming),
            Statement::Try(stmt) => self.handle_try(stmt, incoming),
            Statement::Yield(stmt) => self.handle_yield(stmt, incoming),
            Statement::Empty => incoming,
            Statement::Expression(_) | Statement::Declaration(_) => {
                self.handle_action(statement, incoming)
            }
        }
    }

    fn handle_if(&mut self, stmt: &IfStmt, incoming: Endpoints) -> Endpoints {
        let mut meta = NodeMeta::default();
        meta.inline_calls = self.collect_calls(&stmt.condition);
        let decision_id = self.add_node(
            NodeKind::Decision,
            self.safe(stmt.condition.text()),
            Some(stmt.line),
            meta,
        );
        self.link(&incoming, &decision_id, None, None);

        let then_incoming: Endpoints =
            smallvec![Endpoint::new(decision_id.clone(), EdgeKind::True, "true")];
        let else_label = match &stmt.else_branch {
            None => "false",
            Some(Statement::If(_)) => "false: else if ",
            Some(_) => "false: else",
        };
        let else_incoming: Endpoints =
            smallvec![Endpoint::new(decision_id, EdgeKind::False, else_label)];

        let then_exits = self.handle_statement(&stmt.then_branch, then_incoming);
        let else_exits = match &stmt.else_branch {
            Some(branch) => self.handle_statement(branch, else_incoming),
            None => else_incoming,
        };

        // no forced merge node; downstream statements receive both exits
        let mut combined = then_exits;
        combined.extend(else_exits);
        combined
    }

    fn handle_while(&mut self, stmt: &WhileStmt, incoming: Endpoints) -> Endpoints {
        let mut meta = NodeMeta::default();
        meta.inline_calls = self.collect_calls(&stmt.condition);
        let head_id = self.add_node(
            NodeKind::LoopHead,
            self.safe(stmt.condition.text()),
            Some(stmt.line),
            meta,
        );
        let after_loop = self.add_node(NodeKind::Merge, "", Some(stmt.line), NodeMeta::default());
        self.link(&incoming, &head_id, None, None);

        self.loop_stack.push(LoopContext {
            continue_target: head_id.clone(),
            break_target: after_loop.clone(),
        });
        let body_exits = self.handle_statement(
            &stmt.body,
            smallvec![Endpoint::new(head_id.clone(), EdgeKind::True, "true")],
        );
        self.loop_stack.pop();

        self.link(&body_exits, &head_id, None, None);
        self.edge(&head_id, &after_loop, EdgeKind::False, "false");
        smallvec![Endpoint::normal(after_loop)]
    }

    fn handle_do_while(&mut self, stmt: &DoWhileStmt, incoming: Endpoints) -> Endpoints {
        let mut meta = NodeMeta::default();
        meta.inline_calls = self.collect_calls(&stmt.condition);
        let head_id = self.add_node(
            NodeKind::LoopHead,
            self.safe(stmt.condition.text()),
            Some(stmt.line),
            meta,
        );
        let after_loop = self.add_node(NodeKind::Merge, "", Some(stmt.line), NodeMeta::default());

        self.loop_stack.push(LoopContext {
            continue_target: head_id.clone(),
            break_target: after_loop.clone(),
        });
        let edge_start = self.edges.len();
        let body_exits = self.handle_statement(&stmt.body, incoming.clone());
        let body_entry = self.find_body_entry(&incoming, edge_start);
        self.loop_stack.pop();

        self.link(&body_exits, &head_id, None, None);
        if let Some(entry) = body_entry {
            self.edge(&head_id, &entry, EdgeKind::True, "true");
        }
        self.edge(&head_id, &after_loop, EdgeKind::False, "false");
        smallvec![Endpoint::normal(after_loop)]
    }

    /// First node the incoming endpoints were linked to after `edge_start`,
    /// i.e. the entry of a do-while body.
    fn find_body_entry(&self, incoming: &[Endpoint], edge_start: usize) -> Option<NodeId> {
        if incoming.is_empty() {
            return None;
        }
        self.edges[edge_start..]
            .iter()
            .find(|e| incoming.iter().any(|ep| ep.from == e.from))
            .map(|e| e.to.clone())
    }

    fn handle_for(&mut self, stmt: &ForStmt, incoming: Endpoints) -> Endpoints {
        let mut after_init = incoming;
        if let Some(init) = &stmt.init {
            after_init = self.handle_statement(init, after_init);
        }
        let condition_label = match &stmt.condition {
            Some(cond) => self.safe(cond.text()),
            None => "true".to_owned(),
        };
        let mut meta = NodeMeta::default();
        if let Some(cond) = &stmt.condition {
            meta.inline_calls = self.collect_calls(cond);
        }
        let head_id = self.add_node(NodeKind::LoopHead, condition_label, Some(stmt.line), meta);
        let after_loop = self.add_node(NodeKind::Merge, "", Some(stmt.line), NodeMeta::default());
        self.link(&after_init, &head_id, None, None);

        // the update clause is materialized up front so `continue` can
        // re-enter it instead of jumping straight to the head
        let update_entry = stmt.update.as_ref().map(|update| {
            let before = self.nodes.len();
            let exits = self.handle_statement(update, Endpoints::new());
            let entry = self
                .nodes
                .get(before)
                .map_or_else(|| head_id.clone(), |n| n.id.clone());
            (entry, exits)
        });

        self.loop_stack.push(LoopContext {
            continue_target: update_entry
                .as_ref()
                .map_or_else(|| head_id.clone(), |(entry, _)| entry.clone()),
            break_target: after_loop.clone(),
        });
        let body_exits = self.handle_statement(
            &stmt.body,
            smallvec![Endpoint::new(head_id.clone(), EdgeKind::True, "true")],
        );
        self.loop_stack.pop();

        match update_entry {
            Some((entry, update_exits)) => {
                self.link(&body_exits, &entry, None, None);
                self.link(&update_exits, &head_id, None, None);
            }
            None => self.link(&body_exits, &head_id, None, None),
        }
        self.edge(&head_id, &after_loop, EdgeKind::False, "false");
        smallvec![Endpoint::normal(after_loop)]
    }

    fn handle_foreach(&mut self, stmt: &ForEachStmt, incoming: Endpoints) -> Endpoints {
        let label = format!(
            "for ({} : {})",
            self.safe(&stmt.var_name),
            self.safe(stmt.iterable.text())
        );
        let head_id = self.add_node(NodeKind::LoopHead, label, Some(stmt.line), NodeMeta::default());
        let after_loop = self.add_node(NodeKind::Merge, "", Some(stmt.line), NodeMeta::default());
        self.link(&incoming, &head_id, None, None);

        self.loop_stack.push(LoopContext {
            continue_target: head_id.clone(),
            break_target: after_loop.clone(),
        });
        let body_exits = self.handle_statement(
            &stmt.body,
            smallvec![Endpoint::new(head_id.clone(), EdgeKind::True, "next")],
        );
        self.loop_stack.pop();

        self.link(&body_exits, &head_id, None, None);
        self.edge(&head_id, &after_loop, EdgeKind::False, "done");
        smallvec![Endpoint::normal(after_loop)]
    }

    fn handle_return(&mut self, stmt: &ReturnStmt, incoming: Endpoints) -> Endpoints {
        match &stmt.value {
            None => {
                let return_id =
                    self.add_node(NodeKind::Return, "return", Some(stmt.line), NodeMeta::default());
                self.link(&incoming, &return_id, None, None);
                self.connect_return_endpoints(&[Endpoint::normal(return_id)]);
            }
            Some(value) => {
                let expr = value.unwrap_parens();
                let exits = self.build_return_expr(
                    expr,
                    incoming,
                    stmt.line,
                    self.options.ternary_expand_level,
                );
                self.connect_return_endpoints(&exits);
            }
        }
        Endpoints::new()
    }

    fn connect_return_endpoints(&mut self, exits: &[Endpoint]) {
        let end_id = self.end_id.clone();
        let switch_merge = self.switch_merge_stack.last().cloned();
        for ep in exits {
            self.edge(&ep.from, &end_id, EdgeKind::Normal, "");
            if let Some(merge) = &switch_merge {
                let label = ep.label.as_deref().unwrap_or("return").to_owned();
                self.edge(&ep.from, merge, EdgeKind::Return, &label);
            }
        }
    }

    fn handle_break(&mut self, text: &str, line: u32, incoming: Endpoints) -> Endpoints {
        let meta = NodeMeta {
            no_fold: true,
            ..NodeMeta::default()
        };
        let break_id = self.add_node(NodeKind::Action, "break", Some(line), meta);
        self.link(&incoming, &break_id, None, None);
        let Some(ctx) = self.loop_stack.last().cloned() else {
            tracing::warn!(statement = %self.safe(text), "break outside loop");
            return Endpoints::new();
        };
        self.edge(&break_id, &ctx.break_target, EdgeKind::Break, "break");
        Endpoints::new()
    }

    fn handle_continue(&mut self, text: &str, line: u32, incoming: Endpoints) -> Endpoints {
        let continue_id =
            self.add_node(NodeKind::Action, "continue", Some(line), NodeMeta::default());
        self.link(&incoming, &continue_id, None, None);
        let Some(ctx) = self.loop_stack.last().cloned() else {
            tracing::warn!(statement = %self.safe(text), "continue outside loop");
            return Endpoints::new();
        };
        self.edge(
            &continue_id,
            &ctx.continue_target,
            EdgeKind::Continue,
            "continue",
        );
        Endpoints::new()
    }

    fn handle_switch(&mut self, stmt: &SwitchStmt, incoming: Endpoints) -> Endpoints {
        let switch_id = self.add_node(
            NodeKind::Decision,
            format!("switch {}", self.safe(stmt.scrutinee.text())),
            Some(stmt.line),
            NodeMeta::default(),
        );
        self.link(&incoming, &switch_id, None, None);
        let merge_id = self.add_node(
            NodeKind::Merge,
            "end switch",
            Some(stmt.line),
            NodeMeta::default(),
        );

        if stmt.cases.is_empty() {
            self.edge(&switch_id, &merge_id, EdgeKind::Normal, "");
        } else {
            self.switch_merge_stack.push(merge_id.clone());
            for case in &stmt.cases {
                let label = if case.default {
                    "default".to_owned()
                } else {
                    format!("case: {}", self.safe(&case.labels.join(", ")))
                };
                let case_id =
                    self.add_node(NodeKind::Decision, label, Some(case.line), NodeMeta::default());
                self.edge(&switch_id, &case_id, EdgeKind::Normal, "");
                let starts: Endpoints = smallvec![Endpoint::normal(case_id.clone())];
                let exits = self.process_statements(&case.statements, starts);
                let has_terminal = case.statements.iter().any(Statement::contains_terminal);
                if exits.is_empty() && !has_terminal {
                    self.edge(&case_id, &merge_id, EdgeKind::Normal, "");
                } else {
                    self.link(&exits, &merge_id, None, None);
                }
            }
            self.switch_merge_stack.pop();
        }
        self.add_type_link(&switch_id, stmt.scrutinee_kind, stmt.scrutinee_type.as_deref(), stmt.line);
        smallvec![Endpoint::normal(merge_id)]
    }

    fn handle_throw(&mut self, stmt: &ThrowStmt, incoming: Endpoints) -> Endpoints {
        let label = format!("throw {}", self.safe(stmt.value.text()));
        let throw_id = self.add_node(NodeKind::Throw, label, Some(stmt.line), NodeMeta::default());
        self.link(&incoming, &throw_id, None, None);
        let end_id = self.end_id.clone();
        self.edge(&throw_id, &end_id, EdgeKind::Exception, "");
        if let Some(merge) = self.switch_merge_stack.last().cloned() {
            self.edge(&throw_id, &merge, EdgeKind::Return, "throw");
        }
        Endpoints::new()
    }

    fn handle_try(&mut self, stmt: &TryStmt, incoming: Endpoints) -> Endpoints {
        let try_id = self.add_node(NodeKind::Action, "try", Some(stmt.line), NodeMeta::default());
        self.link(&incoming, &try_id, None, None);
        let normal_exits = self.process_statements(
            &stmt.body.statements,
            smallvec![Endpoint::normal(try_id.clone())],
        );

        let mut catch_exits = Endpoints::new();
        for catch in &stmt.catches {
            let catch_id = self.add_node(
                NodeKind::Action,
                format!("catch ({})", self.safe(&catch.param_type)),
                Some(catch.line),
                NodeMeta::default(),
            );
            self.edge(&try_id, &catch_id, EdgeKind::Exception, "exception");
            let body_exits = self.process_statements(
                &catch.body.statements,
                smallvec![Endpoint::normal(catch_id)],
            );
            catch_exits.extend(body_exits);
        }

        match &stmt.finally {
            Some(finally) => {
                let mut sources = normal_exits;
                sources.extend(catch_exits);
                let finally_id =
                    self.add_node(NodeKind::Action, "finally", Some(stmt.line), NodeMeta::default());
                self.link(&sources, &finally_id, None, None);
                self.process_statements(
                    &finally.statements,
                    smallvec![Endpoint::normal(finally_id)],
                )
            }
            None => {
                let mut exits = normal_exits;
                exits.extend(catch_exits);
                exits
            }
        }
    }

    fn handle_yield(&mut self, stmt: &YieldStmt, incoming: Endpoints) -> Endpoints {
        let expr = stmt.value.unwrap_parens();
        if let Expr::Ternary(ternary) = expr {
            let depth = self.options.ternary_expand_level;
            if depth != 0 {
                return self.handle_ternary(ternary, incoming, stmt.line, depth);
            }
        }
        let action_id = self.add_node(
            NodeKind::Action,
            format!("yield {}", self.safe(stmt.value.text())),
            Some(stmt.line),
            NodeMeta::default(),
        );
        self.link(&incoming, &action_id, None, None);
        smallvec![Endpoint::normal(action_id)]
    }

    pub(crate) fn handle_ternary(
        &mut self,
        ternary: &TernaryExpr,
        incoming: Endpoints,
        line: u32,
        expand_depth: i32,
    ) -> Endpoints {
        let condition = ternary.condition.unwrap_parens();
        let mut meta = NodeMeta::default();
        meta.inline_calls = self.collect_calls(condition);
        let decision_id = self.add_node(
            NodeKind::Decision,
            self.safe(condition.text()),
            Some(line),
            meta,
        );
        self.link(&incoming, &decision_id, None, None);
        let next_depth = if expand_depth < 0 {
            -1
        } else {
            (expand_depth - 1).max(0)
        };
        let mut exits = Endpoints::new();

        let then_expr = ternary.then_value.unwrap_parens();
        if let (Expr::Ternary(nested), true) = (then_expr, expand_depth != 0) {
            exits.extend(self.handle_ternary(
                nested,
                smallvec![Endpoint::new(decision_id.clone(), EdgeKind::True, "true")],
                nested.line,
                next_depth,
            ));
        } else {
            let then_id = self.add_node(
                NodeKind::Action,
                self.safe(then_expr.text()),
                Some(then_expr.line()),
                NodeMeta::default(),
            );
            self.edge(&decision_id, &then_id, EdgeKind::True, "true");
            exits.push(Endpoint::normal(then_id));
        }

        let else_expr = ternary.else_value.unwrap_parens();
        if let (Expr::Ternary(nested), true) = (else_expr, expand_depth != 0) {
            exits.extend(self.handle_ternary(
                nested,
                smallvec![Endpoint::new(decision_id, EdgeKind::False, "false")],
                nested.line,
                next_depth,
            ));
        } else {
            let else_id = self.add_node(
                NodeKind::Action,
                self.safe(else_expr.text()),
                Some(else_expr.line()),
                NodeMeta::default(),
            );
            self.edge(&decision_id, &else_id, EdgeKind::False, "false");
            exits.push(Endpoint::normal(else_id));
        }
        exits
    }

    fn build_return_expr(
        &mut self,
        expr: &Expr,
        incoming: Endpoints,
        line: u32,
        expand_depth: i32,
    ) -> Endpoints {
        let expr = expr.unwrap_parens();
        let next_depth = if expand_depth < 0 {
            -1
        } else {
            (expand_depth - 1).max(0)
        };
        match expr {
            Expr::Switch(switch_expr) => {
                self.handle_switch_expression_return(switch_expr, incoming, line, next_depth)
            }
            Expr::Ternary(ternary) if expand_depth != 0 => {
                let condition = ternary.condition.unwrap_parens();
                let decision_id = self.add_node(
                    NodeKind::Decision,
                    self.safe(condition.text()),
                    Some(ternary.line),
                    NodeMeta::default(),
                );
                self.link(&incoming, &decision_id, None, None);
                let mut result = Endpoints::new();
                result.extend(self.build_return_expr(
                    &ternary.then_value,
                    smallvec![Endpoint::new(decision_id.clone(), EdgeKind::True, "true")],
                    ternary.then_value.line(),
                    next_depth,
                ));
                result.extend(self.build_return_expr(
                    &ternary.else_value,
                    smallvec![Endpoint::new(decision_id, EdgeKind::False, "false")],
                    ternary.else_value.line(),
                    next_depth,
                ));
                result
            }
            Expr::Call(call) => {
                if let Some(mut info) = self.build_call_info(call) {
                    info.meta
                        .inline_calls
                        .extend(self.collect_calls_from_arguments(call));
                    let call_id = self.add_node(
                        info.kind,
                        format!("return {}", info.label),
                        Some(call.line),
                        info.meta,
                    );
                    self.link(&incoming, &call_id, None, None);
                    return smallvec![Endpoint::normal(call_id)];
                }
                self.plain_return_node(expr, incoming, line)
            }
            _ => self.plain_return_node(expr, incoming, line),
        }
    }

    fn plain_return_node(&mut self, expr: &Expr, incoming: Endpoints, line: u32) -> Endpoints {
        let mut meta = NodeMeta::default();
        meta.inline_calls = self.collect_calls(expr);
        let return_id = self.add_node(
            NodeKind::Return,
            format!("return {}", self.safe(expr.text())),
            Some(line),
            meta,
        );
        self.link(&incoming, &return_id, None, None);
        smallvec![Endpoint::normal(return_id)]
    }

    fn handle_switch_expression_return(
        &mut self,
        switch_expr: &SwitchExpr,
        incoming: Endpoints,
        line: u32,
        next_depth: i32,
    ) -> Endpoints {
        let (switch_id, _merge_id) = self.build_switch_graph(switch_expr, next_depth);
        let return_id = self.add_node(
            NodeKind::Return,
            "return switch",
            Some(line),
            NodeMeta::default(),
        );
        // the return node stays on the main flow; a dashed edge points at
        // the switch graph as the value source
        self.link(&incoming, &return_id, None, None);
        self.edge(&return_id, &switch_id, EdgeKind::Return, "switch");
        smallvec![Endpoint::normal(return_id)]
    }

    pub(crate) fn build_switch_graph(
        &mut self,
        switch_expr: &SwitchExpr,
        next_depth: i32,
    ) -> (NodeId, NodeId) {
        let switch_id = self.add_node(
            NodeKind::Decision,
            format!("switch {}", self.safe(switch_expr.scrutinee.text())),
            Some(switch_expr.line),
            NodeMeta::default(),
        );
        let merge_id = self.add_node(
            NodeKind::Merge,
            "end switch",
            Some(switch_expr.line),
            NodeMeta::default(),
        );

        for rule in &switch_expr.rules {
            let label = if rule.default {
                "default".to_owned()
            } else if rule.labels.is_empty() {
                "case".to_owned()
            } else {
                format!("case: {}", self.safe(&rule.labels.join(", ")))
            };
            let case_id =
                self.add_node(NodeKind::Decision, label, Some(rule.line), NodeMeta::default());
            self.edge(&switch_id, &case_id, EdgeKind::Normal, "");
            let starts: Endpoints = smallvec![Endpoint::normal(case_id)];
            let exits = self.handle_switch_rule(rule, starts, next_depth);
            self.link(&exits, &merge_id, None, None);
        }
        self.add_type_link(
            &switch_id,
            switch_expr.scrutinee_kind,
            switch_expr.scrutinee_type.as_deref(),
            switch_expr.line,
        );
        (switch_id, merge_id)
    }

    fn handle_switch_rule(
        &mut self,
        rule: &SwitchRule,
        incoming: Endpoints,
        next_depth: i32,
    ) -> Endpoints {
        match &rule.body {
            RuleBody::Expression(expr_stmt) => {
                let expr = expr_stmt.expr.unwrap_parens();
                if let Expr::Ternary(ternary) = expr {
                    if next_depth != 0 {
                        return self.handle_ternary(ternary, incoming, expr_stmt.line, next_depth);
                    }
                }
                let action_id = self.add_node(
                    NodeKind::Action,
                    self.safe(&expr_stmt.text),
                    Some(expr_stmt.line),
                    NodeMeta::default(),
                );
                self.link(&incoming, &action_id, None, None);
                smallvec![Endpoint::normal(action_id)]
            }
            RuleBody::Block(block) => {
                self.with_no_fold(|b| b.process_statements(&block.statements, incoming))
            }
        }
    }

    /// Adds a dashed type-annotation node for enum/sealed switch scrutinees.
    fn add_type_link(
        &mut self,
        switch_id: &NodeId,
        kind: Option<SwitchKind>,
        type_name: Option<&str>,
        line: u32,
    ) {
        let Some(kind) = kind else { return };
        let label = self.safe(type_name.unwrap_or("type"));
        let meta = NodeMeta {
            no_fold: true,
            ..NodeMeta::default()
        };
        let type_node = self.add_node(NodeKind::Action, label, Some(line), meta);
        self.edge(switch_id, &type_node, EdgeKind::Return, kind.as_str());
    }

    fn handle_action(&mut self, statement: &Statement, incoming: Endpoints) -> Endpoints {
        match statement {
            Statement::Declaration(decl) => self.handle_declaration(decl, incoming),
            Statement::Expression(stmt) => self.handle_expression_statement(stmt, incoming),
            _ => incoming,
        }
    }

    fn handle_declaration(&mut self, decl: &DeclStmt, incoming: Endpoints) -> Endpoints {
        let mut meta = NodeMeta::default();
        if let Some(init) = &decl.init {
            if init.contains_getter() {
                meta.is_getter = true;
            }
            if init.contains_ctor() {
                meta.is_ctor = true;
            }
            let depth = self.options.ternary_expand_level;
            let init = init.unwrap_parens();
            if let Expr::Ternary(ternary) = init {
                if depth != 0 {
                    let lhs_label = format!("{} {} = ...", decl.var_type, decl.name);
                    let lhs_id = self.add_node(
                        NodeKind::Action,
                        lhs_label,
                        Some(decl.line),
                        NodeMeta::default(),
                    );
                    self.link(&incoming, &lhs_id, None, None);
                    return self.handle_ternary(
                        ternary,
                        smallvec![Endpoint::new(lhs_id, EdgeKind::Return, "=")],
                        decl.line,
                        depth,
                    );
                }
            }
            if let Expr::Switch(switch_expr) = init {
                let (switch_id, _merge) = self.build_switch_graph(switch_expr, depth);
                let decl_label = format!("{} {} = switch", decl.var_type, decl.name);
                let action_id =
                    self.add_node(NodeKind::Action, decl_label, Some(decl.line), NodeMeta::default());
                self.link(&incoming, &action_id, None, None);
                self.edge(&action_id, &switch_id, EdgeKind::Return, "switch");
                return smallvec![Endpoint::normal(action_id)];
            }
            meta.inline_calls = self.collect_calls(init);
        }
        let action_id = self.add_node(
            NodeKind::Action,
            self.safe(&decl.text),
            Some(decl.line),
            meta,
        );
        self.link(&incoming, &action_id, None, None);
        smallvec![Endpoint::normal(action_id)]
    }

    fn handle_expression_statement(&mut self, stmt: &ExprStmt, incoming: Endpoints) -> Endpoints {
        let depth = self.options.ternary_expand_level;
        match &stmt.expr {
            Expr::Ternary(ternary) => {
                if depth != 0 {
                    return self.handle_ternary(ternary, incoming, stmt.line, depth);
                }
                let action_id = self.add_node(
                    NodeKind::Action,
                    self.safe(&ternary.text),
                    Some(stmt.line),
                    NodeMeta::default(),
                );
                self.link(&incoming, &action_id, None, None);
                smallvec![Endpoint::normal(action_id)]
            }
            Expr::Assign(assign) => match assign.value.unwrap_parens() {
                Expr::Ternary(ternary) if depth != 0 => {
                    let lhs_label = format!("{} = ...", self.safe(&assign.target));
                    let lhs_id = self.add_node(
                        NodeKind::Action,
                        lhs_label,
                        Some(stmt.line),
                        NodeMeta::default(),
                    );
                    self.link(&incoming, &lhs_id, None, None);
                    self.handle_ternary(
                        ternary,
                        smallvec![Endpoint::new(lhs_id, EdgeKind::Return, "=")],
                        stmt.line,
                        depth,
                    )
                }
                Expr::Switch(switch_expr) => {
                    let (switch_id, _merge) = self.build_switch_graph(switch_expr, depth);
                    let label = format!("{} = switch", self.safe(&assign.target));
                    let action_id =
                        self.add_node(NodeKind::Action, label, Some(stmt.line), NodeMeta::default());
                    self.link(&incoming, &action_id, None, None);
                    self.edge(&action_id, &switch_id, EdgeKind::Return, "switch");
                    smallvec![Endpoint::normal(action_id)]
                }
                _ => {
                    let mut meta = NodeMeta::default();
                    if assign.value.contains_getter() {
                        meta.is_getter = true;
                    }
                    if assign.value.contains_ctor() {
                        meta.is_ctor = true;
                    }
                    meta.inline_calls = self.collect_calls(&assign.value);
                    let action_id = self.add_node(
                        NodeKind::Action,
                        self.safe(&stmt.text),
                        Some(stmt.line),
                        meta,
                    );
                    self.link(&incoming, &action_id, None, None);
                    smallvec![Endpoint::normal(action_id)]
                }
            },
            Expr::Call(call) => self.handle_call_statement(call, stmt.line, incoming),
            Expr::Switch(switch_expr) => {
                let (switch_id, _merge) = self.build_switch_graph(switch_expr, depth);
                let action_id =
                    self.add_node(NodeKind::Action, "switch", Some(stmt.line), NodeMeta::default());
                self.link(&incoming, &action_id, None, None);
                self.edge(&action_id, &switch_id, EdgeKind::Return, "switch");
                smallvec![Endpoint::normal(action_id)]
            }
            expr => {
                let mut meta = NodeMeta::default();
                if expr.contains_ctor() {
                    meta.is_ctor = true;
                }
                if expr.contains_getter() {
                    meta.is_getter = true;
                }
                meta.inline_calls = self.collect_calls(expr);
                let action_id = self.add_node(
                    NodeKind::Action,
                    self.safe(&stmt.text),
                    Some(stmt.line),
                    meta,
                );
                self.link(&incoming, &action_id, None, None);
                smallvec![Endpoint::normal(action_id)]
            }
        }
    }
}
