//! Chtholly semantic analyzer.
//!
//! One sequential pass over the parsed AST that proves three interlocking
//! properties: name resolution and type correctness, move/copy ownership
//! discipline, and borrow validity with lexical lifetime scoping. Errors are
//! collected, never thrown: the walk recovers locally and keeps going so a
//! single run reports every problem in source order.
//!
//! # Examples
//!
//! ```
//! use chtholly_parser::parse;
//! use chtholly_sema::Analyzer;
//!
//! let program = parse("fn main(): void { let x: i32 = 10; }").unwrap();
//! let analysis = Analyzer::new().analyze(&program);
//! assert!(!analysis.has_errors());
//! ```

pub mod diagnostics;
pub mod error_report;
pub mod lifetime;
pub mod registry;
pub mod symbols;

mod check_expr;
mod check_stmt;

use std::collections::HashMap;

use chtholly_ast::{ExprId, Program, Span, Spanned, Stmt, StmtKind, TypeName};

pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use lifetime::{Lifetime, LifetimeManager};
pub use registry::{FieldDef, FunctionSig, TypeDesc, TypeId, TypeRegistry, VariantDef};
pub use symbols::{BorrowState, OwnershipState, Symbol, SymbolKind, SymbolTable};

/// Whether a consuming use of a binding transferred ownership or copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseKind {
    Move,
    Copy,
}

/// The innermost breakable construct, for `break`/`continue`/`fallthrough`
/// legality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlowContext {
    None,
    Loop,
    Switch,
}

/// What kind of top-level declaration a [`CheckedDecl`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Variable,
    Function,
    Struct,
    Class,
    Enum,
}

/// A top-level declaration with its resolved type. Emitted even when its
/// check produced errors; `valid` is false in that case.
#[derive(Debug, Clone)]
pub struct CheckedDecl {
    pub name: String,
    pub kind: DeclKind,
    pub ty: TypeId,
    pub valid: bool,
    pub span: Span,
}

/// Everything the analyzer hands to later stages.
pub struct Analysis {
    /// Top-level declarations in source order.
    pub decls: Vec<CheckedDecl>,
    /// Resolved type of every checked expression.
    pub expr_types: HashMap<ExprId, TypeId>,
    /// Move-or-copy classification of every consuming variable use.
    pub use_kinds: HashMap<ExprId, UseKind>,
    /// Lifetime index of every borrow site.
    pub borrow_lifetimes: HashMap<ExprId, Lifetime>,
    /// Diagnostics in traversal order.
    pub diagnostics: Vec<Diagnostic>,
    /// The registry the `TypeId`s in this analysis point into.
    pub registry: TypeRegistry,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity >= Severity::Error)
    }
}

/// The semantic analyzer. Create one per program; all state is owned here
/// and routed through `&mut self` during the walk.
pub struct Analyzer {
    pub(crate) registry: TypeRegistry,
    pub(crate) symbols: SymbolTable,
    pub(crate) lifetimes: LifetimeManager,
    pub(crate) diagnostics: Vec<Diagnostic>,

    // Context flags, saved and restored around nested constructs
    pub(crate) current_return: Option<TypeId>,
    pub(crate) current_class: Option<TypeId>,
    pub(crate) flow: FlowContext,

    // Annotations written back for the consumer
    pub(crate) expr_types: HashMap<ExprId, TypeId>,
    pub(crate) use_kinds: HashMap<ExprId, UseKind>,
    pub(crate) borrow_lifetimes: HashMap<ExprId, Lifetime>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            registry: TypeRegistry::new(),
            symbols: SymbolTable::new(),
            lifetimes: LifetimeManager::new(),
            diagnostics: Vec::new(),
            current_return: None,
            current_class: None,
            flow: FlowContext::None,
            expr_types: HashMap::new(),
            use_kinds: HashMap::new(),
            borrow_lifetimes: HashMap::new(),
        }
    }

    /// Run the full pass. Total: diagnostics are collected, never returned
    /// as an `Err`.
    pub fn analyze(mut self, program: &Program) -> Analysis {
        let mut decls = Vec::new();

        for stmt in &program.statements {
            let errors_before = self.error_count();
            self.check_stmt(stmt);
            let valid = self.error_count() == errors_before;

            if let Some((name, kind)) = Self::decl_name(stmt) {
                let ty = self
                    .symbols
                    .lookup(&name)
                    .map(|s| s.ty)
                    .unwrap_or(self.registry.unknown());
                decls.push(CheckedDecl {
                    name,
                    kind,
                    ty,
                    valid,
                    span: stmt.span,
                });
            }
        }

        Analysis {
            decls,
            expr_types: self.expr_types,
            use_kinds: self.use_kinds,
            borrow_lifetimes: self.borrow_lifetimes,
            diagnostics: self.diagnostics,
            registry: self.registry,
        }
    }

    fn decl_name(stmt: &Stmt) -> Option<(String, DeclKind)> {
        match &stmt.kind {
            StmtKind::Let(l) => Some((l.name.node.clone(), DeclKind::Variable)),
            StmtKind::Function(f) => Some((f.name.node.clone(), DeclKind::Function)),
            StmtKind::Struct(s) => Some((s.name.node.clone(), DeclKind::Struct)),
            StmtKind::Class(c) => Some((c.name.node.clone(), DeclKind::Class)),
            StmtKind::Enum(e) => Some((e.name.node.clone(), DeclKind::Enum)),
            _ => None,
        }
    }

    // === Shared plumbing ===

    pub(crate) fn error(&mut self, kind: DiagnosticKind, span: Span) {
        self.diagnostics.push(Diagnostic::error(kind, span));
    }

    pub(crate) fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity >= Severity::Error)
            .count()
    }

    /// Open a scope in the symbol table and the lifetime counter together.
    pub(crate) fn enter_scope(&mut self) -> Lifetime {
        self.symbols.enter_scope();
        self.lifetimes.enter_scope()
    }

    /// Close the innermost scope along every exit path, releasing the
    /// borrows it holds on outer bindings.
    pub(crate) fn leave_scope(&mut self) {
        self.symbols.leave_scope();
        self.lifetimes.leave_scope();
    }

    /// Resolve a written type annotation to a registry id. Unknown names
    /// are reported and poisoned.
    pub(crate) fn resolve_type(&mut self, ty: &Spanned<TypeName>) -> TypeId {
        match &ty.node {
            TypeName::Plain(name) => {
                if let Some(id) = self.registry.primitive(name) {
                    return id;
                }
                if let Some(id) = self.registry.lookup_nominal(name) {
                    return id;
                }
                self.error(
                    DiagnosticKind::UndeclaredType { name: name.clone() },
                    ty.span,
                );
                self.registry.unknown()
            }
            TypeName::Reference { inner, mutable } => {
                let inner_id = self.resolve_type(inner);
                self.registry.intern_reference(inner_id, *mutable)
            }
            TypeName::Array { element, size } => {
                let element_id = self.resolve_type(element);
                match size {
                    Some(n) => self.registry.intern_array(element_id, *n),
                    None => self.registry.intern_dyn_array(element_id),
                }
            }
        }
    }
}
