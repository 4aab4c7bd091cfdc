//! oxc AST → host AST conversion.
//!
//! Shapes the pass reasons about are converted structurally. Anything else
//! keeps its exact source text (`Opaque` / `Raw`), sliced out of the input by
//! span, so it prints back unchanged.

use oxc_ast::ast as js;
use oxc_span::GetSpan;

use rememo_core::js_ast::{
    ArrowBody, DeclKind, Declarator, ExportKind, ImportDecl, ImportSpecifier, JsExpr, JsFunction,
    JsModule, JsPattern, JsStmt, Literal, MemberProp, ModuleItem, ObjectMember, PatternProp,
    PropKey, Span,
};

pub(crate) struct Converter<'s> {
    source: &'s str,
    file: String,
    /// Byte offset of the start of each line.
    line_starts: Vec<usize>,
}

impl<'s> Converter<'s> {
    pub(crate) fn new(source: &'s str, file: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            source,
            file: file.to_string(),
            line_starts,
        }
    }

    fn text(&self, span: oxc_span::Span) -> String {
        self.source
            .get(span.start as usize..span.end as usize)
            .unwrap_or_default()
            .to_string()
    }

    /// 1-based line and column of a span's start.
    pub(crate) fn span(&self, span: oxc_span::Span) -> Span {
        let offset = span.start as usize;
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];
        let col = self
            .source
            .get(line_start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(0);
        Span {
            file: self.file.clone(),
            line: line as u32,
            col: col as u32 + 1,
        }
    }

    // ── Module items ───────────────────────────────────────────────────

    pub(crate) fn module(&self, program: &js::Program<'_>) -> JsModule {
        let items = program.body.iter().map(|stmt| self.item(stmt)).collect();
        JsModule { items }
    }

    fn item(&self, stmt: &js::Statement<'_>) -> ModuleItem {
        match stmt {
            js::Statement::ImportDeclaration(import) => self.import(import),
            js::Statement::FunctionDeclaration(func) => self
                .function(func, ExportKind::None)
                .map(ModuleItem::Function)
                .unwrap_or_else(|| ModuleItem::Raw(self.text(stmt.span()))),
            js::Statement::ExportNamedDeclaration(export) => match &export.declaration {
                Some(js::Declaration::FunctionDeclaration(func)) => self
                    .function(func, ExportKind::Named)
                    .map(ModuleItem::Function)
                    .unwrap_or_else(|| ModuleItem::Raw(self.text(stmt.span()))),
                _ => ModuleItem::Raw(self.text(stmt.span())),
            },
            js::Statement::ExportDefaultDeclaration(export) => match &export.declaration {
                js::ExportDefaultDeclarationKind::FunctionDeclaration(func) => self
                    .function(func, ExportKind::Default)
                    .map(ModuleItem::Function)
                    .unwrap_or_else(|| ModuleItem::Raw(self.text(stmt.span()))),
                _ => ModuleItem::Raw(self.text(stmt.span())),
            },
            _ => ModuleItem::Raw(self.text(stmt.span())),
        }
    }

    fn import(&self, import: &js::ImportDeclaration<'_>) -> ModuleItem {
        if import.import_kind.is_type() {
            return ModuleItem::Raw(self.text(import.span));
        }
        let specifiers = import
            .specifiers
            .iter()
            .flatten()
            .map(|spec| match spec {
                js::ImportDeclarationSpecifier::ImportSpecifier(s) => ImportSpecifier::Named {
                    imported: s.imported.name().to_string(),
                    local: s.local.name.to_string(),
                },
                js::ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                    ImportSpecifier::Default(s.local.name.to_string())
                }
                js::ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                    ImportSpecifier::Namespace(s.local.name.to_string())
                }
            })
            .collect();
        ModuleItem::Import(ImportDecl {
            source: import.source.value.to_string(),
            specifiers,
        })
    }

    /// Named function declarations with a body; `None` for anything else.
    fn function(&self, func: &js::Function<'_>, export: ExportKind) -> Option<JsFunction> {
        let name = func.id.as_ref()?.name.to_string();
        let body = func.body.as_ref()?;
        Some(JsFunction {
            name,
            params: self.params(&func.params),
            body: self.stmts(&body.statements),
            is_async: func.r#async,
            is_generator: func.generator,
            export,
            span: Some(self.span(func.span)),
        })
    }

    fn params(&self, params: &js::FormalParameters<'_>) -> Vec<JsPattern> {
        let mut out: Vec<JsPattern> = params
            .items
            .iter()
            .map(|p| self.pattern(&p.pattern))
            .collect();
        if let Some(rest) = &params.rest {
            out.push(JsPattern::Rest(Box::new(self.pattern(&rest.rest.argument))));
        }
        out
    }

    fn pattern(&self, pattern: &js::BindingPattern<'_>) -> JsPattern {
        match pattern {
            js::BindingPattern::BindingIdentifier(ident) => JsPattern::ident(ident.name.as_str()),
            js::BindingPattern::ArrayPattern(arr) => {
                let mut elems: Vec<Option<JsPattern>> = arr
                    .elements
                    .iter()
                    .map(|e| e.as_ref().map(|p| self.pattern(p)))
                    .collect();
                if let Some(rest) = &arr.rest {
                    elems.push(Some(JsPattern::Rest(Box::new(self.pattern(&rest.argument)))));
                }
                JsPattern::Array(elems)
            }
            js::BindingPattern::ObjectPattern(obj) => JsPattern::Object {
                props: obj
                    .properties
                    .iter()
                    .map(|p| PatternProp {
                        key: self.prop_key(&p.key, p.computed),
                        value: self.pattern(&p.value),
                        shorthand: p.shorthand,
                    })
                    .collect(),
                rest: obj
                    .rest
                    .as_ref()
                    .map(|r| Box::new(self.pattern(&r.argument))),
            },
            js::BindingPattern::AssignmentPattern(assign) => JsPattern::Assign {
                target: Box::new(self.pattern(&assign.left)),
                default: Box::new(self.expr(&assign.right)),
            },
        }
    }

    fn prop_key(&self, key: &js::PropertyKey<'_>, computed: bool) -> PropKey {
        match key {
            js::PropertyKey::StaticIdentifier(ident) if !computed => {
                PropKey::Ident(ident.name.to_string())
            }
            js::PropertyKey::StringLiteral(s) if !computed => PropKey::String(s.value.to_string()),
            js::PropertyKey::NumericLiteral(n) if !computed => PropKey::Number(n.value),
            _ => match key.as_expression() {
                Some(expr) => PropKey::Computed(Box::new(self.expr(expr))),
                None => PropKey::Computed(Box::new(JsExpr::Opaque(self.text(key.span())))),
            },
        }
    }

    // ── Statements ─────────────────────────────────────────────────────

    fn stmts(&self, stmts: &[js::Statement<'_>]) -> Vec<JsStmt> {
        stmts.iter().map(|s| self.stmt(s)).collect()
    }

    fn stmt(&self, stmt: &js::Statement<'_>) -> JsStmt {
        let span = Some(self.span(stmt.span()));
        match stmt {
            js::Statement::VariableDeclaration(decl) => {
                let kind = match decl.kind {
                    js::VariableDeclarationKind::Const => DeclKind::Const,
                    js::VariableDeclarationKind::Let => DeclKind::Let,
                    js::VariableDeclarationKind::Var => DeclKind::Var,
                    _ => return self.opaque_stmt("using declaration", stmt),
                };
                JsStmt::VarDecl {
                    kind,
                    declarators: decl
                        .declarations
                        .iter()
                        .map(|d| Declarator {
                            target: self.pattern(&d.id),
                            init: d.init.as_ref().map(|e| self.expr(e)),
                        })
                        .collect(),
                    span,
                }
            }
            js::Statement::ReturnStatement(ret) => JsStmt::Return {
                value: ret.argument.as_ref().map(|e| self.expr(e)),
                span,
            },
            js::Statement::ExpressionStatement(es) => JsStmt::Expr {
                expr: self.expr(&es.expression),
                span,
            },
            _ => self.opaque_stmt(statement_kind(stmt), stmt),
        }
    }

    fn opaque_stmt(&self, kind: &str, stmt: &js::Statement<'_>) -> JsStmt {
        JsStmt::Opaque {
            kind: kind.to_string(),
            text: self.text(stmt.span()),
            span: Some(self.span(stmt.span())),
        }
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn opaque(&self, expr: &js::Expression<'_>) -> JsExpr {
        JsExpr::Opaque(self.text(expr.span()))
    }

    pub(crate) fn expr(&self, expr: &js::Expression<'_>) -> JsExpr {
        match expr {
            js::Expression::BooleanLiteral(lit) => JsExpr::Literal(Literal::Bool(lit.value)),
            js::Expression::NullLiteral(_) => JsExpr::Literal(Literal::Null),
            js::Expression::NumericLiteral(lit) => JsExpr::num(lit.value),
            js::Expression::StringLiteral(lit) => JsExpr::str(lit.value.as_str()),
            js::Expression::Identifier(ident) => JsExpr::ident(ident.name.as_str()),
            js::Expression::StaticMemberExpression(mem) => self.static_member(mem),
            js::Expression::ComputedMemberExpression(mem) => self.computed_member(mem),
            js::Expression::CallExpression(call) => self.call(call),
            js::Expression::ChainExpression(chain) => match &chain.expression {
                js::ChainElement::CallExpression(call) => self.call(call),
                js::ChainElement::StaticMemberExpression(mem) => self.static_member(mem),
                js::ChainElement::ComputedMemberExpression(mem) => self.computed_member(mem),
                _ => self.opaque(expr),
            },
            js::Expression::TemplateLiteral(tpl) => JsExpr::Template {
                quasis: tpl
                    .quasis
                    .iter()
                    .map(|q| q.value.raw.to_string())
                    .collect(),
                exprs: tpl.expressions.iter().map(|e| self.expr(e)).collect(),
            },
            js::Expression::NewExpression(new) => JsExpr::New {
                callee: Box::new(self.expr(&new.callee)),
                args: self.args(&new.arguments),
            },
            js::Expression::ObjectExpression(obj) => JsExpr::Object(
                obj.properties
                    .iter()
                    .map(|prop| match prop {
                        js::ObjectPropertyKind::ObjectProperty(p)
                            if p.kind == js::PropertyKind::Init && !p.method =>
                        {
                            ObjectMember::Property {
                                key: self.prop_key(&p.key, p.computed),
                                value: self.expr(&p.value),
                                shorthand: p.shorthand,
                            }
                        }
                        js::ObjectPropertyKind::ObjectProperty(p) => {
                            ObjectMember::Opaque(self.text(p.span))
                        }
                        js::ObjectPropertyKind::SpreadProperty(spread) => {
                            ObjectMember::Spread(self.expr(&spread.argument))
                        }
                    })
                    .collect(),
            ),
            js::Expression::ArrayExpression(arr) => JsExpr::Array(
                arr.elements
                    .iter()
                    .map(|e| match e {
                        js::ArrayExpressionElement::SpreadElement(spread) => {
                            Some(JsExpr::Spread(Box::new(self.expr(&spread.argument))))
                        }
                        js::ArrayExpressionElement::Elision(_) => None,
                        _ => Some(self.expr(e.to_expression())),
                    })
                    .collect(),
            ),
            js::Expression::ArrowFunctionExpression(arrow) => {
                let body = if arrow.expression {
                    match arrow.body.statements.first() {
                        Some(js::Statement::ExpressionStatement(es)) => {
                            ArrowBody::Expr(Box::new(self.expr(&es.expression)))
                        }
                        _ => ArrowBody::Block(self.stmts(&arrow.body.statements)),
                    }
                } else {
                    ArrowBody::Block(self.stmts(&arrow.body.statements))
                };
                JsExpr::Arrow {
                    params: self.params(&arrow.params),
                    body,
                    is_async: arrow.r#async,
                }
            }
            js::Expression::FunctionExpression(func) => match &func.body {
                Some(body) => JsExpr::Function {
                    name: func.id.as_ref().map(|id| id.name.to_string()),
                    params: self.params(&func.params),
                    body: self.stmts(&body.statements),
                    is_async: func.r#async,
                    is_generator: func.generator,
                },
                None => self.opaque(expr),
            },
            js::Expression::UnaryExpression(unary) => JsExpr::Unary {
                op: unary.operator.as_str().to_string(),
                expr: Box::new(self.expr(&unary.argument)),
            },
            js::Expression::BinaryExpression(bin) => JsExpr::binary(
                bin.operator.as_str(),
                self.expr(&bin.left),
                self.expr(&bin.right),
            ),
            js::Expression::LogicalExpression(log) => JsExpr::binary(
                log.operator.as_str(),
                self.expr(&log.left),
                self.expr(&log.right),
            ),
            js::Expression::ConditionalExpression(cond) => JsExpr::Conditional {
                test: Box::new(self.expr(&cond.test)),
                consequent: Box::new(self.expr(&cond.consequent)),
                alternate: Box::new(self.expr(&cond.alternate)),
            },
            js::Expression::AssignmentExpression(assign) => {
                let target = match &assign.left {
                    js::AssignmentTarget::AssignmentTargetIdentifier(ident) => {
                        JsExpr::ident(ident.name.as_str())
                    }
                    other => JsExpr::Opaque(self.text(other.span())),
                };
                JsExpr::Assign {
                    op: assign.operator.as_str().to_string(),
                    target: Box::new(target),
                    value: Box::new(self.expr(&assign.right)),
                }
            }
            // `(a?.b).c` does not short-circuit `.c`; dropping the parens
            // would change that.
            js::Expression::ParenthesizedExpression(paren)
                if matches!(paren.expression, js::Expression::ChainExpression(_)) =>
            {
                self.opaque(expr)
            }
            js::Expression::ParenthesizedExpression(paren) => self.expr(&paren.expression),
            _ => self.opaque(expr),
        }
    }

    /// Member and call links carry their own `optional` flag; only links
    /// inside a chain expression can have it set.
    fn static_member(&self, mem: &js::StaticMemberExpression<'_>) -> JsExpr {
        let object = Box::new(self.expr(&mem.object));
        let property = MemberProp::Name(mem.property.name.to_string());
        if mem.optional {
            JsExpr::OptionalMember { object, property }
        } else {
            JsExpr::Member { object, property }
        }
    }

    fn computed_member(&self, mem: &js::ComputedMemberExpression<'_>) -> JsExpr {
        let object = Box::new(self.expr(&mem.object));
        let property = MemberProp::Computed(Box::new(self.expr(&mem.expression)));
        if mem.optional {
            JsExpr::OptionalMember { object, property }
        } else {
            JsExpr::Member { object, property }
        }
    }

    fn call(&self, call: &js::CallExpression<'_>) -> JsExpr {
        let callee = Box::new(self.expr(&call.callee));
        let args = self.args(&call.arguments);
        if call.optional {
            JsExpr::OptionalCall { callee, args }
        } else {
            JsExpr::Call { callee, args }
        }
    }

    fn args(&self, args: &[js::Argument<'_>]) -> Vec<JsExpr> {
        args.iter()
            .map(|arg| match arg {
                js::Argument::SpreadElement(spread) => {
                    JsExpr::Spread(Box::new(self.expr(&spread.argument)))
                }
                _ => self.expr(arg.to_expression()),
            })
            .collect()
    }
}

fn statement_kind(stmt: &js::Statement<'_>) -> &'static str {
    match stmt {
        js::Statement::IfStatement(_) => "if statement",
        js::Statement::ForStatement(_)
        | js::Statement::ForInStatement(_)
        | js::Statement::ForOfStatement(_)
        | js::Statement::WhileStatement(_)
        | js::Statement::DoWhileStatement(_) => "loop",
        js::Statement::SwitchStatement(_) => "switch statement",
        js::Statement::TryStatement(_) => "try statement",
        js::Statement::ThrowStatement(_) => "throw statement",
        js::Statement::BlockStatement(_) => "block statement",
        js::Statement::FunctionDeclaration(_) => "nested function declaration",
        js::Statement::ClassDeclaration(_) => "class declaration",
        _ => "statement",
    }
}
