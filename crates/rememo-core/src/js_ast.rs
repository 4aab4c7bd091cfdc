//! Owned JavaScript AST: the host form the pipeline consumes and produces.
//!
//! Only the shapes the memoization pass reasons about are modeled
//! structurally. Everything else (control flow, classes, tagged templates,
//! ...) is carried as `Opaque` source text so it survives a parse → compile → print
//! round trip untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Source location for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub file: String,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

/// Key of an object literal property or object pattern entry.
#[derive(Debug, Clone, PartialEq)]
pub enum PropKey {
    Ident(String),
    String(String),
    Number(f64),
    Computed(Box<JsExpr>),
}

/// An entry of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectMember {
    /// `key: value`, or `key` alone when `shorthand`.
    Property {
        key: PropKey,
        value: JsExpr,
        shorthand: bool,
    },
    /// `...expr`.
    Spread(JsExpr),
    /// Methods, getters and setters, kept as source text.
    Opaque(String),
}

/// Property side of a member access.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberProp {
    /// `object.name`.
    Name(String),
    /// `object[expr]`.
    Computed(Box<JsExpr>),
}

/// Body of an arrow function.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Expr(Box<JsExpr>),
    Block(Vec<JsStmt>),
}

/// A JavaScript expression.
#[derive(Debug, Clone, PartialEq)]
pub enum JsExpr {
    Literal(Literal),
    Ident(String),
    Member {
        object: Box<JsExpr>,
        property: MemberProp,
    },
    Call {
        callee: Box<JsExpr>,
        args: Vec<JsExpr>,
    },
    /// `object?.name` / `object?.[expr]`: one optional link of a chain.
    OptionalMember {
        object: Box<JsExpr>,
        property: MemberProp,
    },
    /// `callee?.(args)`.
    OptionalCall {
        callee: Box<JsExpr>,
        args: Vec<JsExpr>,
    },
    New {
        callee: Box<JsExpr>,
        args: Vec<JsExpr>,
    },
    /// Untagged template literal. `quasis` holds the raw text around the
    /// substitutions and is always one longer than `exprs`.
    Template {
        quasis: Vec<String>,
        exprs: Vec<JsExpr>,
    },
    Object(Vec<ObjectMember>),
    /// Array literal; `None` entries are holes.
    Array(Vec<Option<JsExpr>>),
    Arrow {
        params: Vec<JsPattern>,
        body: ArrowBody,
        is_async: bool,
    },
    Function {
        name: Option<String>,
        params: Vec<JsPattern>,
        body: Vec<JsStmt>,
        is_async: bool,
        is_generator: bool,
    },
    Unary {
        op: String,
        expr: Box<JsExpr>,
    },
    /// Binary and logical operators.
    Binary {
        op: String,
        lhs: Box<JsExpr>,
        rhs: Box<JsExpr>,
    },
    Conditional {
        test: Box<JsExpr>,
        consequent: Box<JsExpr>,
        alternate: Box<JsExpr>,
    },
    Assign {
        op: String,
        target: Box<JsExpr>,
        value: Box<JsExpr>,
    },
    /// `...expr` in argument or array position.
    Spread(Box<JsExpr>),
    /// Anything else, kept as source text.
    Opaque(String),
}

impl JsExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        JsExpr::Ident(name.into())
    }

    pub fn num(value: f64) -> Self {
        JsExpr::Literal(Literal::Number(value))
    }

    pub fn str(value: impl Into<String>) -> Self {
        JsExpr::Literal(Literal::String(value.into()))
    }

    pub fn member(object: JsExpr, name: impl Into<String>) -> Self {
        JsExpr::Member {
            object: Box::new(object),
            property: MemberProp::Name(name.into()),
        }
    }

    pub fn index(object: JsExpr, index: JsExpr) -> Self {
        JsExpr::Member {
            object: Box::new(object),
            property: MemberProp::Computed(Box::new(index)),
        }
    }

    pub fn call(callee: JsExpr, args: Vec<JsExpr>) -> Self {
        JsExpr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn method_call(object: JsExpr, method: impl Into<String>, args: Vec<JsExpr>) -> Self {
        JsExpr::call(JsExpr::member(object, method), args)
    }

    pub fn binary(op: impl Into<String>, lhs: JsExpr, rhs: JsExpr) -> Self {
        JsExpr::Binary {
            op: op.into(),
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// `(params) => body` with an expression body.
    pub fn arrow(params: Vec<JsPattern>, body: JsExpr) -> Self {
        JsExpr::Arrow {
            params,
            body: ArrowBody::Expr(Box::new(body)),
            is_async: false,
        }
    }

    /// Object literal with identifier keys.
    pub fn object(props: Vec<(&str, JsExpr)>) -> Self {
        JsExpr::Object(
            props
                .into_iter()
                .map(|(k, v)| ObjectMember::Property {
                    key: PropKey::Ident(k.to_string()),
                    value: v,
                    shorthand: false,
                })
                .collect(),
        )
    }

    pub fn array(elems: Vec<JsExpr>) -> Self {
        JsExpr::Array(elems.into_iter().map(Some).collect())
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            JsExpr::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// One entry of an object pattern: `key: value`.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternProp {
    pub key: PropKey,
    pub value: JsPattern,
    pub shorthand: bool,
}

/// A binding pattern (declaration left side or parameter).
#[derive(Debug, Clone, PartialEq)]
pub enum JsPattern {
    Ident(String),
    /// `[a, , b]`; `None` entries are holes.
    Array(Vec<Option<JsPattern>>),
    Object {
        props: Vec<PatternProp>,
        rest: Option<Box<JsPattern>>,
    },
    /// `target = default`.
    Assign {
        target: Box<JsPattern>,
        default: Box<JsExpr>,
    },
    /// `...target`.
    Rest(Box<JsPattern>),
}

impl JsPattern {
    pub fn ident(name: impl Into<String>) -> Self {
        JsPattern::Ident(name.into())
    }

    /// Identifiers bound by this pattern, left to right.
    pub fn bound_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, out: &mut Vec<String>) {
        match self {
            JsPattern::Ident(name) => out.push(name.clone()),
            JsPattern::Array(elems) => {
                for elem in elems.iter().flatten() {
                    elem.collect_names(out);
                }
            }
            JsPattern::Object { props, rest } => {
                for prop in props {
                    prop.value.collect_names(out);
                }
                if let Some(rest) = rest {
                    rest.collect_names(out);
                }
            }
            JsPattern::Assign { target, .. } | JsPattern::Rest(target) => {
                target.collect_names(out)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Const,
    Let,
    Var,
}

impl DeclKind {
    pub fn keyword(self) -> &'static str {
        match self {
            DeclKind::Const => "const",
            DeclKind::Let => "let",
            DeclKind::Var => "var",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub target: JsPattern,
    pub init: Option<JsExpr>,
}

/// A JavaScript statement.
#[derive(Debug, Clone, PartialEq)]
pub enum JsStmt {
    VarDecl {
        kind: DeclKind,
        declarators: Vec<Declarator>,
        span: Option<Span>,
    },
    Return {
        value: Option<JsExpr>,
        span: Option<Span>,
    },
    Expr {
        expr: JsExpr,
        span: Option<Span>,
    },
    /// Statement kinds the pass does not model (`if`, loops, ...).
    Opaque {
        kind: String,
        text: String,
        span: Option<Span>,
    },
}

impl JsStmt {
    /// `const name = init;`
    pub fn const_decl(name: impl Into<String>, init: JsExpr) -> Self {
        JsStmt::decl(DeclKind::Const, JsPattern::Ident(name.into()), init)
    }

    pub fn decl(kind: DeclKind, target: JsPattern, init: JsExpr) -> Self {
        JsStmt::VarDecl {
            kind,
            declarators: vec![Declarator {
                target,
                init: Some(init),
            }],
            span: None,
        }
    }

    pub fn ret(value: Option<JsExpr>) -> Self {
        JsStmt::Return { value, span: None }
    }

    pub fn expr(expr: JsExpr) -> Self {
        JsStmt::Expr { expr, span: None }
    }

    pub fn span(&self) -> Option<&Span> {
        match self {
            JsStmt::VarDecl { span, .. }
            | JsStmt::Return { span, .. }
            | JsStmt::Expr { span, .. }
            | JsStmt::Opaque { span, .. } => span.as_ref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Functions and modules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportKind {
    #[default]
    None,
    Named,
    Default,
}

/// A function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct JsFunction {
    pub name: String,
    pub params: Vec<JsPattern>,
    pub body: Vec<JsStmt>,
    pub is_async: bool,
    pub is_generator: bool,
    pub export: ExportKind,
    pub span: Option<Span>,
}

impl JsFunction {
    pub fn new(name: impl Into<String>, params: Vec<JsPattern>, body: Vec<JsStmt>) -> Self {
        Self {
            name: name.into(),
            params,
            body,
            is_async: false,
            is_generator: false,
            export: ExportKind::None,
            span: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSpecifier {
    /// `{ imported as local }`; `local == imported` when not renamed.
    Named { imported: String, local: String },
    Default(String),
    Namespace(String),
}

impl ImportSpecifier {
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        ImportSpecifier::Named {
            imported: name.clone(),
            local: name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub source: String,
    pub specifiers: Vec<ImportSpecifier>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleItem {
    Import(ImportDecl),
    Function(JsFunction),
    /// Top-level items the pass leaves alone, as source text.
    Raw(String),
}

/// A parsed source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsModule {
    pub items: Vec<ModuleItem>,
}

impl JsModule {
    pub fn functions_mut(&mut self) -> impl Iterator<Item = &mut JsFunction> {
        self.items.iter_mut().filter_map(|item| match item {
            ModuleItem::Function(f) => Some(f),
            _ => None,
        })
    }

    pub fn imports(&self) -> impl Iterator<Item = &ImportDecl> {
        self.items.iter().filter_map(|item| match item {
            ModuleItem::Import(i) => Some(i),
            _ => None,
        })
    }
}
