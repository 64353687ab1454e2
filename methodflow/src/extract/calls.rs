//! Call resolution, labeling and bounded inlining.

use smallvec::smallvec;

use crate::ast::{CallExpr, Expr, Method, Statement};
use crate::ir::{CallMeta, NodeKind, NodeMeta};
use crate::utils::doc_summary;

use super::{Builder, Endpoint, Endpoints};

/// Node shape and metadata derived from one call site.
pub(crate) struct CallInfo {
    pub(crate) kind: NodeKind,
    pub(crate) label: String,
    pub(crate) meta: NodeMeta,
}

impl Builder<'_> {
    pub(crate) fn handle_call_statement(
        &mut self,
        call: &CallExpr,
        line: u32,
        incoming: Endpoints,
    ) -> Endpoints {
        if !self.options.fold_fluent_calls {
            let chain = fluent_chain(call);
            if chain.len() > 1 {
                return self.split_fluent_chain(&chain, incoming);
            }
        }
        match self.build_call_info(call) {
            Some(mut info) => {
                info.meta
                    .inline_calls
                    .extend(self.collect_calls_from_arguments(call));
                let call_id = self.add_node(info.kind, info.label, Some(line), info.meta);
                self.link(&incoming, &call_id, None, None);
                smallvec![Endpoint::normal(call_id)]
            }
            // dropped platform call; the statement leaves no node behind
            None => incoming,
        }
    }

    /// One node per chain segment, root first, labeled `...name(args)` past
    /// the first so the receiver is only spelled once.
    fn split_fluent_chain(&mut self, chain: &[&CallExpr], incoming: Endpoints) -> Endpoints {
        let chain_id = self.next_chain_id();
        let mut current = incoming;
        for (idx, segment) in chain.iter().enumerate() {
            let Some(mut info) = self.build_call_info(segment) else {
                continue;
            };
            info.meta
                .inline_calls
                .extend(self.collect_calls_from_arguments(segment));
            info.meta.fluent_chain_id = Some(chain_id);
            info.meta.chain_split = true;
            let label = if idx == 0 {
                info.label
            } else {
                format!("...{}", strip_qualifier(&info.label))
            };
            let id = self.add_node(info.kind, label, Some(segment.line), info.meta);
            self.link(&current, &id, None, None);
            current = smallvec![Endpoint::normal(id)];
        }
        current
    }

    /// Resolves one call site. Returns `None` only for platform calls under
    /// a negative platform budget, which are dropped outright.
    pub(crate) fn build_call_info(&mut self, call: &CallExpr) -> Option<CallInfo> {
        let Some(target) = self.resolver.resolve(call) else {
            return Some(CallInfo {
                kind: NodeKind::Call,
                label: self.safe(&call.text),
                meta: NodeMeta::default(),
            });
        };
        let target_key = target.qualified_signature();
        let matched_skip = self
            .skip_regexes
            .iter()
            .any(|re| re.is_match(&target_key));
        let is_jdk = target.is_platform();
        let jdk_depth = self.options.jdk_api_depth;
        if is_jdk && jdk_depth < 0 {
            return None;
        }

        let summary = if self.options.use_doc_labels {
            target.doc.as_deref().and_then(doc_summary)
        } else {
            None
        };
        let qualifier = call.qualifier.as_ref().map(|q| self.safe(q.text()));
        let args_display = call.args_display();
        let is_recursive = self.visited.contains(&target_key);

        let mut label = if is_recursive {
            self.recursive = true;
            let callee_text = match &qualifier {
                Some(q) if !q.is_empty() => format!("{q}.{}", call.name),
                _ => call.name.clone(),
            };
            let base = summary.clone().unwrap_or(callee_text);
            format!("recursive call: {base}{args_display}")
        } else {
            let mut base = summary.clone().unwrap_or_else(|| target.name.clone());
            if let Some(q) = &qualifier {
                if !q.is_empty() {
                    base = format!("{q}.{base}");
                }
            }
            format!("{base}{args_display}")
        };
        if is_jdk && jdk_depth == 0 {
            label = self.safe(&call.text);
        }

        let skip_render =
            matched_skip || (is_jdk && jdk_depth == 0) || self.options.call_depth == 0;

        let call_depth = self.options.call_depth;
        let allow_expand = call_depth != 0 && (!is_jdk || jdk_depth > 0) && !matched_skip;
        let callee_graph = if allow_expand && !is_recursive && target.body.is_some() {
            let mut nested_visited = self.visited.clone();
            nested_visited.insert(target_key.clone());
            let nested = Builder::new(
                self.options.descend(is_jdk),
                self.skip_regexes.clone(),
                self.resolver,
                target,
                nested_visited,
            );
            Some(Box::new(nested.build()))
        } else {
            None
        };

        let callee_display = format!(
            "{}{args_display}",
            summary.unwrap_or_else(|| target.name.clone())
        );
        let meta = NodeMeta {
            call: Some(CallMeta {
                label: label.clone(),
                callee: target.signature(),
                callee_key: target_key,
                callee_display: Some(callee_display),
                callee_body: Some(self.body_summary(target)),
                callee_graph,
                is_jdk,
                skip_render,
                inline: false,
                line: Some(call.line),
                inline_calls: Vec::new(),
            }),
            ..NodeMeta::default()
        };
        Some(CallInfo {
            kind: NodeKind::Call,
            label,
            meta,
        })
    }

    /// Every resolvable, renderable call nested anywhere inside `expr`.
    pub(crate) fn collect_calls(&mut self, expr: &Expr) -> Vec<CallMeta> {
        let mut calls = Vec::new();
        let mut sites: Vec<&CallExpr> = Vec::new();
        expr.walk(&mut |e| {
            if let Expr::Call(call) = e {
                sites.push(&**call);
            }
        });
        for site in sites {
            if let Some(info) = self.build_call_info(site) {
                if let Some(mut call_meta) = info.meta.call {
                    if !call_meta.skip_render {
                        call_meta.inline = true;
                        calls.push(call_meta);
                    }
                }
            }
        }
        calls
    }

    pub(crate) fn collect_calls_from_arguments(&mut self, call: &CallExpr) -> Vec<CallMeta> {
        let mut calls = Vec::new();
        for arg in &call.args {
            calls.extend(self.collect_calls(arg));
        }
        calls
    }

    /// One-line stand-in for an unexpanded callee body.
    fn body_summary(&self, target: &Method) -> String {
        match &target.body {
            Some(body) => {
                let joined = body
                    .statements
                    .iter()
                    .filter_map(stmt_text)
                    .collect::<Vec<_>>()
                    .join(" ");
                if joined.is_empty() {
                    target.signature()
                } else {
                    self.safe(&joined)
                }
            }
            None => target.signature(),
        }
    }
}

fn fluent_chain(call: &CallExpr) -> Vec<&CallExpr> {
    let mut chain = vec![call];
    let mut current = call;
    while let Some(Expr::Call(qualifier)) = current.qualifier.as_ref() {
        chain.push(&**qualifier);
        current = &**qualifier;
    }
    chain.reverse();
    chain
}

fn strip_qualifier(label: &str) -> &str {
    match label.rfind('.') {
        Some(dot) => &label[dot + 1..],
        None => label,
    }
}

fn stmt_text(statement: &Statement) -> Option<&str> {
    match statement {
        Statement::Expression(s) => Some(&s.text),
        Statement::Declaration(s) => Some(&s.text),
        Statement::If(s) => Some(&s.text),
        Statement::While(s) => Some(&s.text),
        Statement::DoWhile(s) => Some(&s.text),
        Statement::For(s) => Some(&s.text),
        Statement::ForEach(s) => Some(&s.text),
        Statement::Switch(s) => Some(&s.text),
        Statement::Return(s) => Some(&s.text),
        Statement::Yield(s) => Some(&s.text),
        Statement::Break(s) | Statement::Continue(s) => Some(&s.text),
        Statement::Throw(s) => Some(&s.text),
        Statement::Try(_) | Statement::Block(_) | Statement::Empty => None,
    }
}
