//! Chtholly AST
//!
//! Tree definitions shared by the parser, the semantic analyzer, and the
//! driver. Expressions carry a stable [`ExprId`] so later passes can attach
//! annotations (resolved types, move/copy classification, borrow lifetimes)
//! in side tables instead of mutating the tree.

mod expressions;
mod infrastructure;
mod statements;
mod types;

pub use expressions::{BinOp, Expr, ExprKind, Literal, StructInitFields, UnaryOp};
pub use infrastructure::{ExprId, Span, Spanned};
pub use statements::{
    ClassDecl, EnumDecl, FieldDecl, FunctionDecl, LetStmt, MethodDecl, Param, Program, Stmt,
    StmtKind, StructDecl, SwitchCase, SwitchStmt, VariantDecl,
};
pub use types::TypeName;
