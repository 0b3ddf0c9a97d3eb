//! Statement and declaration nodes.

use crate::expressions::Expr;
use crate::infrastructure::{Span, Spanned};
use crate::types::TypeName;

/// A parsed compilation unit: top-level statements in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// A statement: a kind plus location.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// Statement variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expression(Expr),
    Let(LetStmt),
    Block(Vec<Stmt>),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    Switch(SwitchStmt),
    Break,
    Continue,
    Fallthrough,
    Return(Option<Expr>),
    Function(FunctionDecl),
    Struct(StructDecl),
    Class(ClassDecl),
    Enum(EnumDecl),
}

/// `let [mut] name [: ty] [= init];`
///
/// The parser guarantees at least one of `ty` / `init` is present.
#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
    pub name: Spanned<String>,
    pub mutable: bool,
    pub ty: Option<Spanned<TypeName>>,
    pub init: Option<Expr>,
}

/// `switch (discriminant) { case v: stmt ... default: stmt }`
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub discriminant: Expr,
    pub cases: Vec<SwitchCase>,
}

/// One arm of a switch; `value` is `None` for `default`.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub value: Option<Expr>,
    pub body: Box<Stmt>,
    pub span: Span,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Spanned<String>,
    pub ty: Spanned<TypeName>,
    pub mutable: bool,
}

/// `fn name(params): ret { body }` — omitted return type means `void`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Spanned<String>,
    pub params: Vec<Param>,
    pub ret: Option<Spanned<TypeName>>,
    pub body: Vec<Stmt>,
}

/// A struct or class field: `let [mut] name: ty;`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: Spanned<String>,
    pub ty: Spanned<TypeName>,
    pub mutable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: Spanned<String>,
    pub fields: Vec<FieldDecl>,
}

/// A class method. `mutates` is set for `mut fn ...` declarations, which
/// install a mutable `self` in the method body.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub func: FunctionDecl,
    pub mutates: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Spanned<String>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
}

/// One enum variant with its (possibly empty) payload types.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDecl {
    pub name: Spanned<String>,
    pub payload: Vec<Spanned<TypeName>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: Spanned<String>,
    pub variants: Vec<VariantDecl>,
}
