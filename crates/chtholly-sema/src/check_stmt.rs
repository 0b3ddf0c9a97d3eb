//! Statement checking.
//!
//! Drives the walk: manages scope transitions, the context flags
//! (current function return type, current class, loop/switch context), and
//! the declaration of functions, structs, classes and enums. Contexts are
//! saved and restored around every nested construct so error recovery
//! cannot leave stale state behind.

use std::collections::HashSet;
use std::mem;

use chtholly_ast::{
    ClassDecl, EnumDecl, Expr, ExprKind, FieldDecl, FunctionDecl, LetStmt, Literal, MethodDecl,
    Param, Span, Stmt, StmtKind, StructDecl, SwitchStmt,
};

use crate::check_expr::Usage;
use crate::diagnostics::DiagnosticKind;
use crate::registry::{FieldDef, FunctionSig, TypeDesc, TypeId, VariantDef};
use crate::symbols::{Symbol, SymbolKind};
use crate::{Analyzer, FlowContext};

impl Analyzer {
    pub(crate) fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expression(expr) => {
                self.check_expr(expr, Usage::Inspect);
            }
            StmtKind::Let(let_stmt) => self.check_let(let_stmt, stmt.span),
            StmtKind::Block(statements) => {
                self.enter_scope();
                for statement in statements {
                    self.check_stmt(statement);
                }
                self.leave_scope();
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_condition(condition);
                self.check_in_scope(then_branch);
                if let Some(else_branch) = else_branch {
                    self.check_in_scope(else_branch);
                }
            }
            StmtKind::While { condition, body } => {
                self.check_condition(condition);
                let enclosing = mem::replace(&mut self.flow, FlowContext::Loop);
                self.check_in_scope(body);
                self.flow = enclosing;
            }
            StmtKind::DoWhile { body, condition } => {
                let enclosing = mem::replace(&mut self.flow, FlowContext::Loop);
                self.check_in_scope(body);
                self.flow = enclosing;
                self.check_condition(condition);
            }
            StmtKind::For {
                init,
                condition,
                step,
                body,
            } => {
                self.enter_scope();
                if let Some(init) = init {
                    self.check_stmt(init);
                }
                if let Some(condition) = condition {
                    self.check_condition(condition);
                }
                if let Some(step) = step {
                    self.check_expr(step, Usage::Inspect);
                }
                let enclosing = mem::replace(&mut self.flow, FlowContext::Loop);
                self.check_in_scope(body);
                self.flow = enclosing;
                self.leave_scope();
            }
            StmtKind::Switch(switch) => self.check_switch(switch),
            StmtKind::Break => {
                if self.flow == FlowContext::None {
                    self.error(DiagnosticKind::BreakOutsideLoopOrSwitch, stmt.span);
                }
            }
            StmtKind::Continue => {
                if self.flow != FlowContext::Loop {
                    self.error(DiagnosticKind::ContinueOutsideLoop, stmt.span);
                }
            }
            StmtKind::Fallthrough => {
                if self.flow != FlowContext::Switch {
                    self.error(DiagnosticKind::FallthroughOutsideSwitch, stmt.span);
                }
            }
            StmtKind::Return(value) => self.check_return(value.as_ref(), stmt.span),
            StmtKind::Function(decl) => self.check_function_decl(decl, stmt.span),
            StmtKind::Struct(decl) => self.check_struct_decl(decl, stmt.span),
            StmtKind::Class(decl) => self.check_class_decl(decl, stmt.span),
            StmtKind::Enum(decl) => self.check_enum_decl(decl, stmt.span),
        }
    }

    /// Branch and loop bodies get their own scope even when they are not
    /// written as blocks (a block body simply nests one deeper).
    fn check_in_scope(&mut self, stmt: &Stmt) {
        self.enter_scope();
        self.check_stmt(stmt);
        self.leave_scope();
    }

    fn check_condition(&mut self, condition: &Expr) {
        let ty = self.check_expr(condition, Usage::Inspect);
        if ty != self.registry.bool_() && !self.registry.is_unknown(ty) {
            self.error(
                DiagnosticKind::NonBoolCondition {
                    found: self.registry.display(ty),
                },
                condition.span,
            );
        }
    }

    /// `let [mut] name [: T] = init;`
    fn check_let(&mut self, let_stmt: &LetStmt, span: Span) {
        let name = &let_stmt.name.node;

        let already_defined = self.symbols.is_defined_in_current_scope(name);
        if already_defined {
            self.error(
                DiagnosticKind::Redeclaration { name: name.clone() },
                let_stmt.name.span,
            );
        }

        // The initializer sees the outer binding, not the new one
        let init_ty = let_stmt
            .init
            .as_ref()
            .map(|init| self.check_expr(init, Usage::Consume));
        let declared_ty = let_stmt.ty.as_ref().map(|ty| self.resolve_type(ty));

        let var_ty = match (declared_ty, init_ty) {
            (Some(declared), Some(found)) => {
                if !self.registry.assignable(declared, found) {
                    self.error(
                        DiagnosticKind::AssignmentTypeMismatch {
                            expected: self.registry.display(declared),
                            found: self.registry.display(found),
                        },
                        span,
                    );
                }
                declared
            }
            (Some(declared), None) => declared,
            (None, Some(found)) => found,
            // The parser rejects `let x;` with neither type nor initializer
            (None, None) => self.registry.unknown(),
        };

        if already_defined {
            return;
        }

        let lifetime = self.lifetimes.current();
        self.symbols
            .define(Symbol::variable(name, var_ty, let_stmt.mutable, lifetime));

        if let Some(init) = &let_stmt.init {
            self.check_dangling_into(name, init);
        }
    }

    fn check_switch(&mut self, switch: &SwitchStmt) {
        let switch_ty = self.check_expr(&switch.discriminant, Usage::Inspect);

        let mut has_default = false;
        let mut int_values: HashSet<i64> = HashSet::new();
        let mut str_values: HashSet<String> = HashSet::new();

        let enclosing = mem::replace(&mut self.flow, FlowContext::Switch);
        for case in &switch.cases {
            match &case.value {
                Some(value) => {
                    let case_ty = self.check_expr(value, Usage::Inspect);
                    if !self.registry.assignable(switch_ty, case_ty) {
                        self.error(
                            DiagnosticKind::CaseTypeMismatch {
                                expected: self.registry.display(switch_ty),
                                found: self.registry.display(case_ty),
                            },
                            value.span,
                        );
                    }
                    // Duplicate detection covers literal discriminants
                    match &value.kind {
                        ExprKind::Literal(Literal::Int(n)) => {
                            if !int_values.insert(*n) {
                                self.error(
                                    DiagnosticKind::DuplicateCase {
                                        value: n.to_string(),
                                    },
                                    value.span,
                                );
                            }
                        }
                        ExprKind::Literal(Literal::Str(s)) => {
                            if !str_values.insert(s.clone()) {
                                self.error(
                                    DiagnosticKind::DuplicateCase { value: s.clone() },
                                    value.span,
                                );
                            }
                        }
                        _ => {}
                    }
                }
                None => {
                    if has_default {
                        self.error(DiagnosticKind::MultipleDefault, case.span);
                    }
                    has_default = true;
                }
            }

            // `fallthrough` is legal only as the final statement of a case
            if let StmtKind::Block(statements) = &case.body.kind {
                for (index, statement) in statements.iter().enumerate() {
                    if matches!(statement.kind, StmtKind::Fallthrough)
                        && index + 1 != statements.len()
                    {
                        self.error(DiagnosticKind::FallthroughNotLast, statement.span);
                    }
                }
            }
            self.check_in_scope(&case.body);
        }
        self.flow = enclosing;
    }

    fn check_return(&mut self, value: Option<&Expr>, span: Span) {
        let Some(expected) = self.current_return else {
            self.error(DiagnosticKind::ReturnOutsideFunction, span);
            if let Some(value) = value {
                self.check_expr(value, Usage::Inspect);
            }
            return;
        };

        let found = match value {
            Some(value) => self.check_expr(value, Usage::Consume),
            None => self.registry.void(),
        };

        if !self.registry.assignable(expected, found) {
            self.error(
                DiagnosticKind::ReturnTypeMismatch {
                    expected: self.registry.display(expected),
                    found: self.registry.display(found),
                },
                span,
            );
        }

        // Escape check: a reference to a binding of the innermost lifetime
        // would dangle the moment the function returns
        if let Some(value) = value {
            if let ExprKind::Borrow { target, .. } = &value.kind {
                if let ExprKind::Variable(name) = &target.kind {
                    if let Some(symbol) = self.symbols.lookup(name) {
                        if symbol.lifetime == self.lifetimes.current() {
                            self.error(
                                DiagnosticKind::ReferenceEscapesFunction { name: name.clone() },
                                value.span,
                            );
                        }
                    }
                }
            }
        }
    }

    // === Declarations ===

    fn resolve_params(&mut self, params: &[Param]) -> Vec<TypeId> {
        params.iter().map(|p| self.resolve_type(&p.ty)).collect()
    }

    fn function_sig(&mut self, decl: &FunctionDecl) -> FunctionSig {
        let params = self.resolve_params(&decl.params);
        let ret = decl
            .ret
            .as_ref()
            .map(|ty| self.resolve_type(ty))
            .unwrap_or(self.registry.void());
        FunctionSig { params, ret }
    }

    /// `fn name(params): ret { body }` — defines the function symbol in the
    /// enclosing scope, then checks the body with parameters installed and
    /// the return/flow context swapped in.
    fn check_function_decl(&mut self, decl: &FunctionDecl, _span: Span) {
        let sig = self.function_sig(decl);
        let fn_ty = self.registry.intern_function(sig.clone());
        let lifetime = self.lifetimes.current();

        if !self.symbols.define(Symbol::item(
            &decl.name.node,
            SymbolKind::Function,
            fn_ty,
            lifetime,
        )) {
            self.error(
                DiagnosticKind::Redeclaration {
                    name: decl.name.node.clone(),
                },
                decl.name.span,
            );
        }

        self.check_function_body(decl, &sig);
    }

    /// Installs parameters in a fresh scope and checks the body with
    /// `current_function_return` set. `break`/`continue`/`fallthrough`
    /// never cross a function boundary.
    fn check_function_body(&mut self, decl: &FunctionDecl, sig: &FunctionSig) {
        self.enter_scope();
        let lifetime = self.lifetimes.current();

        for (param, &ty) in decl.params.iter().zip(&sig.params) {
            if !self
                .symbols
                .define(Symbol::variable(&param.name.node, ty, param.mutable, lifetime))
            {
                self.error(
                    DiagnosticKind::Redeclaration {
                        name: param.name.node.clone(),
                    },
                    param.name.span,
                );
            }
        }

        let enclosing_return = mem::replace(&mut self.current_return, Some(sig.ret));
        let enclosing_flow = mem::replace(&mut self.flow, FlowContext::None);

        for statement in &decl.body {
            self.check_stmt(statement);
        }

        self.current_return = enclosing_return;
        self.flow = enclosing_flow;
        self.leave_scope();
    }

    fn resolve_fields(&mut self, fields: &[FieldDecl]) -> Vec<FieldDef> {
        let mut resolved: Vec<FieldDef> = Vec::new();
        for field in fields {
            let ty = self.resolve_type(&field.ty);
            if resolved.iter().any(|f| f.name == field.name.node) {
                self.error(
                    DiagnosticKind::Redeclaration {
                        name: field.name.node.clone(),
                    },
                    field.name.span,
                );
                continue;
            }
            resolved.push(FieldDef {
                name: field.name.node.clone(),
                ty,
                mutable: field.mutable,
            });
        }
        resolved
    }

    fn check_struct_decl(&mut self, decl: &StructDecl, _span: Span) {
        let fields = self.resolve_fields(&decl.fields);
        let name = &decl.name.node;

        let Some(ty) = self.registry.declare_nominal(
            name,
            TypeDesc::Struct {
                name: name.clone(),
                fields,
            },
        ) else {
            self.error(
                DiagnosticKind::Redeclaration { name: name.clone() },
                decl.name.span,
            );
            return;
        };

        let lifetime = self.lifetimes.current();
        if !self
            .symbols
            .define(Symbol::item(name, SymbolKind::Struct, ty, lifetime))
        {
            self.error(
                DiagnosticKind::Redeclaration { name: name.clone() },
                decl.name.span,
            );
        }
    }

    /// Class declaration: fields and method signatures are registered
    /// first so methods can call each other, then each body is checked in
    /// a scope where `self` is bound to the class type (mutable for
    /// `mut fn` methods) and `current_class` is set.
    fn check_class_decl(&mut self, decl: &ClassDecl, _span: Span) {
        let fields = self.resolve_fields(&decl.fields);
        let name = &decl.name.node;

        // The nominal must exist before method signatures are resolved:
        // they may mention the class's own name
        let Some(class_ty) = self.registry.declare_nominal(
            name,
            TypeDesc::Class {
                name: name.clone(),
                fields,
                methods: Vec::new(),
            },
        ) else {
            self.error(
                DiagnosticKind::Redeclaration { name: name.clone() },
                decl.name.span,
            );
            return;
        };

        let lifetime = self.lifetimes.current();
        if !self
            .symbols
            .define(Symbol::item(name, SymbolKind::Class, class_ty, lifetime))
        {
            self.error(
                DiagnosticKind::Redeclaration { name: name.clone() },
                decl.name.span,
            );
        }

        let mut methods: Vec<(String, FunctionSig)> = Vec::new();
        for method in &decl.methods {
            let sig = self.function_sig(&method.func);
            if methods.iter().any(|(n, _)| n == &method.func.name.node) {
                self.error(
                    DiagnosticKind::Redeclaration {
                        name: method.func.name.node.clone(),
                    },
                    method.func.name.span,
                );
                continue;
            }
            methods.push((method.func.name.node.clone(), sig));
        }
        self.registry.set_class_methods(class_ty, methods.clone());

        for method in &decl.methods {
            self.check_method_body(method, class_ty, &methods);
        }
    }

    fn check_method_body(
        &mut self,
        method: &MethodDecl,
        class_ty: TypeId,
        methods: &[(String, FunctionSig)],
    ) {
        let Some((_, sig)) = methods
            .iter()
            .find(|(n, _)| n == &method.func.name.node)
        else {
            // Duplicate method name; its body was already rejected
            return;
        };
        let sig = sig.clone();

        self.enter_scope();
        let lifetime = self.lifetimes.current();
        self.symbols.define(Symbol::variable(
            "self",
            class_ty,
            method.mutates,
            lifetime,
        ));
        for (param, &ty) in method.func.params.iter().zip(&sig.params) {
            if !self
                .symbols
                .define(Symbol::variable(&param.name.node, ty, param.mutable, lifetime))
            {
                self.error(
                    DiagnosticKind::Redeclaration {
                        name: param.name.node.clone(),
                    },
                    param.name.span,
                );
            }
        }

        let enclosing_class = mem::replace(&mut self.current_class, Some(class_ty));
        let enclosing_return = mem::replace(&mut self.current_return, Some(sig.ret));
        let enclosing_flow = mem::replace(&mut self.flow, FlowContext::None);

        for statement in &method.func.body {
            self.check_stmt(statement);
        }

        self.current_class = enclosing_class;
        self.current_return = enclosing_return;
        self.flow = enclosing_flow;
        self.leave_scope();
    }

    fn check_enum_decl(&mut self, decl: &EnumDecl, _span: Span) {
        let name = &decl.name.node;

        let mut variants: Vec<VariantDef> = Vec::new();
        for variant in &decl.variants {
            let payload: Vec<TypeId> = variant
                .payload
                .iter()
                .map(|ty| self.resolve_type(ty))
                .collect();
            if variants.iter().any(|v| v.name == variant.name.node) {
                self.error(
                    DiagnosticKind::Redeclaration {
                        name: variant.name.node.clone(),
                    },
                    variant.name.span,
                );
                continue;
            }
            variants.push(VariantDef {
                name: variant.name.node.clone(),
                payload,
            });
        }

        let Some(ty) = self.registry.declare_nominal(
            name,
            TypeDesc::Enum {
                name: name.clone(),
                variants,
            },
        ) else {
            self.error(
                DiagnosticKind::Redeclaration { name: name.clone() },
                decl.name.span,
            );
            return;
        };

        let lifetime = self.lifetimes.current();
        if !self
            .symbols
            .define(Symbol::item(name, SymbolKind::Enum, ty, lifetime))
        {
            self.error(
                DiagnosticKind::Redeclaration { name: name.clone() },
                decl.name.span,
            );
        }
    }
}
