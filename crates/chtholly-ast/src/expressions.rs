//! Expression nodes.

use crate::infrastructure::{ExprId, Span, Spanned};

/// Literal value carried by a literal expression.
///
/// Typed storage for the five literal forms; the analyzer maps each case to
/// its primitive type (`i32`, `f64`, `string`, `char`, `bool`).
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
    Bool(bool),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    Neq,
    And,
    Or,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Lt => "<",
            BinOp::Lte => "<=",
            BinOp::Gt => ">",
            BinOp::Gte => ">=",
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        };
        write!(f, "{}", s)
    }
}

/// Unary operators. Borrows (`&x`, `&mut x`) have their own node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}

/// An expression: a kind plus identity and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    /// A name use: variable, function, or type symbol.
    Variable(String),
    /// `self` inside a class method.
    SelfRef,
    /// `&target` or `&mut target`.
    Borrow {
        mutable: bool,
        target: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `target = value`; the target must be a place (variable, member
    /// access, or index) — validated by the analyzer.
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `object.member` — field access, method reference, or (when the
    /// object names an enum) a variant path.
    Member {
        object: Box<Expr>,
        member: Spanned<String>,
    },
    /// `Name { ... }` struct construction.
    StructInit {
        name: Spanned<String>,
        fields: StructInitFields,
    },
    /// `Enum::Variant` path; payloads are supplied by a wrapping `Call`.
    EnumPath {
        enum_name: Spanned<String>,
        variant: Spanned<String>,
    },
    /// `[e0, e1, ...]`
    ArrayLit(Vec<Expr>),
    /// `array[index]`
    Index {
        array: Box<Expr>,
        index: Box<Expr>,
    },
}

/// Field initializers of a struct literal: positional covers every field in
/// declaration order, named covers each field exactly once by key.
#[derive(Debug, Clone, PartialEq)]
pub enum StructInitFields {
    Positional(Vec<Expr>),
    Named(Vec<(Spanned<String>, Expr)>),
}
