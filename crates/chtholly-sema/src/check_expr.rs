//! Expression checking.
//!
//! `check_expr` derives the type of an expression, validates the use site
//! (moves, borrows, mutability), and updates binding state in the symbol
//! table. Every checked expression is annotated with its resolved type; a
//! failed check reports a diagnostic and yields the unknown type so the
//! walk continues without cascading errors.

use chtholly_ast::{BinOp, Expr, ExprKind, Literal, Span, Spanned, StructInitFields, UnaryOp};

use crate::diagnostics::DiagnosticKind;
use crate::registry::{FunctionSig, TypeDesc, TypeId};
use crate::symbols::{OwnershipState, SymbolKind};
use crate::{Analyzer, UseKind};

/// How the surrounding context uses the value of an expression.
///
/// A consuming use takes ownership (let/assign right-hand sides, call
/// arguments, initializer values, returned values); only those move
/// non-Copy bindings. Inspecting uses (operands, conditions, receivers,
/// indices) read without transferring ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Usage {
    Consume,
    Inspect,
}

impl Analyzer {
    pub(crate) fn check_expr(&mut self, expr: &Expr, usage: Usage) -> TypeId {
        let ty = self.check_expr_inner(expr, usage);
        self.expr_types.insert(expr.id, ty);
        ty
    }

    fn check_expr_inner(&mut self, expr: &Expr, usage: Usage) -> TypeId {
        match &expr.kind {
            ExprKind::Literal(lit) => self.literal_type(lit),
            ExprKind::Variable(name) => self.check_variable(name, expr.span, expr.id, usage),
            ExprKind::SelfRef => self.check_self(expr, usage),
            ExprKind::Borrow { mutable, target } => self.check_borrow(expr, *mutable, target),
            ExprKind::Unary { op, operand } => self.check_unary(*op, operand, expr.span),
            ExprKind::Binary { op, left, right } => self.check_binary(*op, left, right, expr.span),
            ExprKind::Assign { target, value } => self.check_assign(target, value, expr.span),
            ExprKind::Call { callee, args } => self.check_call(callee, args, expr.span),
            ExprKind::Member { object, member } => self.check_member(object, member),
            ExprKind::StructInit { name, fields } => self.check_struct_init(name, fields),
            ExprKind::EnumPath { enum_name, variant } => {
                self.check_enum_variant(enum_name, variant, &[], expr.span)
            }
            ExprKind::ArrayLit(elements) => self.check_array_literal(elements),
            ExprKind::Index { array, index } => self.check_index(array, index),
        }
    }

    fn literal_type(&self, lit: &Literal) -> TypeId {
        match lit {
            Literal::Int(_) => self.registry.i32_(),
            Literal::Float(_) => self.registry.f64_(),
            Literal::Str(_) => self.registry.string(),
            Literal::Char(_) => self.registry.char_(),
            Literal::Bool(_) => self.registry.bool_(),
        }
    }

    /// A name use. Applies the ownership discipline for variable bindings:
    /// a Moved binding rejects every use, and a consuming use of a non-Copy
    /// binding either conflicts with live borrows or transitions the
    /// binding to Moved.
    fn check_variable(
        &mut self,
        name: &str,
        span: Span,
        id: chtholly_ast::ExprId,
        usage: Usage,
    ) -> TypeId {
        let Some(symbol) = self.symbols.lookup(name) else {
            self.error(
                DiagnosticKind::UndeclaredVariable {
                    name: name.to_string(),
                },
                span,
            );
            return self.registry.unknown();
        };

        let ty = symbol.ty;
        let kind = symbol.kind;
        let state = symbol.state;
        let borrowed = symbol.borrows.is_borrowed();

        if kind != SymbolKind::Variable {
            // Functions and type symbols carry no ownership state
            return ty;
        }

        if state == OwnershipState::Moved {
            self.error(
                DiagnosticKind::UseAfterMove {
                    name: name.to_string(),
                },
                span,
            );
            return ty;
        }

        if usage == Usage::Consume {
            if self.registry.is_copy(ty) {
                self.use_kinds.insert(id, UseKind::Copy);
            } else if borrowed {
                self.error(
                    DiagnosticKind::MoveWhileBorrowed {
                        name: name.to_string(),
                    },
                    span,
                );
            } else {
                if let Some(symbol) = self.symbols.lookup_mut(name) {
                    symbol.state = OwnershipState::Moved;
                }
                self.use_kinds.insert(id, UseKind::Move);
            }
        }

        ty
    }

    fn check_self(&mut self, expr: &Expr, usage: Usage) -> TypeId {
        if self.current_class.is_none() {
            self.error(DiagnosticKind::SelfOutsideClass, expr.span);
            return self.registry.unknown();
        }
        // `self` is an ordinary binding in the method scope
        self.check_variable("self", expr.span, expr.id, usage)
    }

    /// `&x` / `&mut x`. Borrowing a variable updates its accountant and
    /// records the borrow on the current scope for release; borrowing any
    /// other expression produces a reference to a temporary whose lifetime
    /// is the current scope.
    fn check_borrow(&mut self, expr: &Expr, mutable: bool, target: &Expr) -> TypeId {
        let name = match &target.kind {
            ExprKind::Variable(name) => Some(name.clone()),
            ExprKind::SelfRef if self.current_class.is_some() => Some("self".to_string()),
            _ => None,
        };

        let Some(name) = name else {
            let inner = self.check_expr(target, Usage::Inspect);
            self.borrow_lifetimes
                .insert(expr.id, self.lifetimes.current());
            return self.registry.intern_reference(inner, mutable);
        };

        let Some(symbol) = self.symbols.lookup(&name) else {
            self.error(DiagnosticKind::UndeclaredVariable { name }, target.span);
            return self.registry.unknown();
        };

        let inner = symbol.ty;
        let target_lifetime = symbol.lifetime;
        let target_mutable = symbol.mutable;
        let borrows = symbol.borrows;
        let state = symbol.state;
        self.expr_types.insert(target.id, inner);

        if state == OwnershipState::Moved {
            // Any borrow requires a Valid binding
            self.error(DiagnosticKind::UseAfterMove { name }, target.span);
            return self.registry.intern_reference(inner, mutable);
        }

        if mutable {
            if !target_mutable {
                self.error(DiagnosticKind::ImmutableBorrowedMutably { name }, expr.span);
                return self.registry.intern_reference(inner, true);
            }
            if borrows.is_borrowed() {
                self.error(DiagnosticKind::ConflictingBorrow { name }, expr.span);
                return self.registry.intern_reference(inner, true);
            }
            if let Some(symbol) = self.symbols.lookup_mut(&name) {
                symbol.borrows.mutable_borrowed = true;
            }
            self.symbols.record_borrow(&name, true);
        } else {
            if borrows.mutable_borrowed {
                self.error(DiagnosticKind::ConflictingBorrow { name }, expr.span);
                return self.registry.intern_reference(inner, false);
            }
            if let Some(symbol) = self.symbols.lookup_mut(&name) {
                symbol.borrows.shared_count += 1;
            }
            self.symbols.record_borrow(&name, false);
        }

        self.borrow_lifetimes.insert(expr.id, target_lifetime);
        self.registry.intern_reference(inner, mutable)
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &Expr, span: Span) -> TypeId {
        let ty = self.check_expr(operand, Usage::Inspect);
        match op {
            UnaryOp::Neg => {
                if self.registry.is_numeric(ty) || self.registry.is_unknown(ty) {
                    ty
                } else {
                    self.operand_error("-", ty, ty, span);
                    self.registry.unknown()
                }
            }
            UnaryOp::Not => {
                if ty == self.registry.bool_() || self.registry.is_unknown(ty) {
                    self.registry.bool_()
                } else {
                    self.operand_error("!", ty, ty, span);
                    self.registry.unknown()
                }
            }
        }
    }

    fn check_binary(&mut self, op: BinOp, left: &Expr, right: &Expr, span: Span) -> TypeId {
        let lhs = self.check_expr(left, Usage::Inspect);
        let rhs = self.check_expr(right, Usage::Inspect);

        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                match self.registry.arith_result(lhs, rhs) {
                    Some(result) => result,
                    None => {
                        self.operand_error(&op.to_string(), lhs, rhs, span);
                        self.registry.unknown()
                    }
                }
            }
            BinOp::Lt | BinOp::Lte | BinOp::Gt | BinOp::Gte | BinOp::Eq | BinOp::Neq => {
                if !self.registry.assignable(lhs, rhs) {
                    self.operand_error(&op.to_string(), lhs, rhs, span);
                }
                self.registry.bool_()
            }
            BinOp::And | BinOp::Or => {
                let bool_ = self.registry.bool_();
                let lhs_ok = lhs == bool_ || self.registry.is_unknown(lhs);
                let rhs_ok = rhs == bool_ || self.registry.is_unknown(rhs);
                if !lhs_ok || !rhs_ok {
                    self.operand_error(&op.to_string(), lhs, rhs, span);
                }
                bool_
            }
        }
    }

    fn operand_error(&mut self, op: &str, left: TypeId, right: TypeId, span: Span) {
        let kind = DiagnosticKind::OperandTypeMismatch {
            op: op.to_string(),
            left: self.registry.display(left),
            right: self.registry.display(right),
        };
        self.error(kind, span);
    }

    // === Assignment ===

    /// `place = value`. The parser guarantees the target is a variable,
    /// member access, or index expression. Assignments have type void.
    fn check_assign(&mut self, target: &Expr, value: &Expr, span: Span) -> TypeId {
        match &target.kind {
            ExprKind::Variable(name) => {
                self.check_assign_variable(name.clone(), target, value, span)
            }
            ExprKind::Member { object, member } => {
                self.check_assign_member(object, member, target, value)
            }
            ExprKind::Index { array, index } => self.check_assign_index(array, index, target, value),
            _ => {
                // Unreachable: the parser rejects other targets
                self.check_expr(value, Usage::Inspect);
                self.registry.unknown()
            }
        }
    }

    fn check_assign_variable(
        &mut self,
        name: String,
        target: &Expr,
        value: &Expr,
        span: Span,
    ) -> TypeId {
        let void = self.registry.void();

        let Some(symbol) = self.symbols.lookup(&name) else {
            self.error(DiagnosticKind::UndeclaredVariable { name }, target.span);
            self.check_expr(value, Usage::Inspect);
            return void;
        };

        let declared = symbol.ty;
        let kind = symbol.kind;
        let mutable = symbol.mutable;
        let state = symbol.state;
        let borrows = symbol.borrows;
        self.expr_types.insert(target.id, declared);

        let mut ok = true;
        if kind != SymbolKind::Variable || !mutable {
            self.error(
                DiagnosticKind::AssignToImmutable { name: name.clone() },
                target.span,
            );
            ok = false;
        }
        if state == OwnershipState::Moved {
            self.error(
                DiagnosticKind::UseAfterMove { name: name.clone() },
                target.span,
            );
            ok = false;
        }
        if borrows.is_borrowed() {
            self.error(
                DiagnosticKind::ConflictingBorrow { name: name.clone() },
                target.span,
            );
            ok = false;
        }

        let value_ty = self.check_expr(value, Usage::Consume);
        if !self.registry.assignable(declared, value_ty) {
            self.error(
                DiagnosticKind::AssignmentTypeMismatch {
                    expected: self.registry.display(declared),
                    found: self.registry.display(value_ty),
                },
                span,
            );
            ok = false;
        }

        if ok {
            self.check_dangling_into(&name, value);
            if let Some(symbol) = self.symbols.lookup_mut(&name) {
                symbol.state = OwnershipState::Valid;
            }
        }

        void
    }

    /// Dangling-reference check for `binding = &source` (and let
    /// initializers): the binding must not outlive the source.
    pub(crate) fn check_dangling_into(&mut self, binding: &str, value: &Expr) {
        let ExprKind::Borrow { target, .. } = &value.kind else {
            return;
        };
        let ExprKind::Variable(source) = &target.kind else {
            return;
        };
        let Some(binding_lifetime) = self.symbols.lookup(binding).map(|s| s.lifetime) else {
            return;
        };
        let Some(source_lifetime) = self.symbols.lookup(source).map(|s| s.lifetime) else {
            return;
        };
        if binding_lifetime < source_lifetime {
            self.error(
                DiagnosticKind::DanglingReference {
                    name: source.clone(),
                },
                value.span,
            );
        }
    }

    fn check_assign_member(
        &mut self,
        object: &Expr,
        member: &Spanned<String>,
        target: &Expr,
        value: &Expr,
    ) -> TypeId {
        let void = self.registry.void();
        let object_ty = self.check_expr(object, Usage::Inspect);
        let aggregate = self.deref_aggregate(object_ty);
        let desc = self.registry.get(aggregate).clone();

        let field = match desc {
            TypeDesc::Struct { fields, .. } | TypeDesc::Class { fields, .. } => {
                fields.into_iter().find(|f| f.name == member.node)
            }
            TypeDesc::Unknown => {
                self.check_expr(value, Usage::Inspect);
                return void;
            }
            _ => {
                self.error(
                    DiagnosticKind::MemberAccessOnNonAggregate {
                        found: self.registry.display(object_ty),
                    },
                    object.span,
                );
                self.check_expr(value, Usage::Inspect);
                return void;
            }
        };

        let Some(field) = field else {
            self.error(
                DiagnosticKind::NoSuchMember {
                    type_name: self.registry.display(aggregate),
                    member: member.node.clone(),
                },
                member.span,
            );
            self.check_expr(value, Usage::Inspect);
            return void;
        };
        self.expr_types.insert(target.id, field.ty);

        // The object itself must be a mutable place
        if let Some(root) = Self::place_root(object) {
            if let Some(symbol) = self.symbols.lookup(&root) {
                if !symbol.mutable {
                    self.error(DiagnosticKind::AssignToImmutable { name: root }, object.span);
                }
            }
        }

        if !field.mutable {
            self.error(
                DiagnosticKind::AssignToImmutableField {
                    field: member.node.clone(),
                },
                member.span,
            );
        }

        let value_ty = self.check_expr(value, Usage::Consume);
        if !self.registry.assignable(field.ty, value_ty) {
            self.error(
                DiagnosticKind::AssignmentTypeMismatch {
                    expected: self.registry.display(field.ty),
                    found: self.registry.display(value_ty),
                },
                value.span,
            );
        }

        void
    }

    fn check_assign_index(
        &mut self,
        array: &Expr,
        index: &Expr,
        target: &Expr,
        value: &Expr,
    ) -> TypeId {
        let void = self.registry.void();
        let element = self.check_index(array, index);
        self.expr_types.insert(target.id, element);

        if let Some(root) = Self::place_root(array) {
            if let Some(symbol) = self.symbols.lookup(&root) {
                if !symbol.mutable {
                    self.error(DiagnosticKind::AssignToImmutable { name: root }, array.span);
                }
            }
        }

        let value_ty = self.check_expr(value, Usage::Consume);
        if !self.registry.assignable(element, value_ty) {
            self.error(
                DiagnosticKind::AssignmentTypeMismatch {
                    expected: self.registry.display(element),
                    found: self.registry.display(value_ty),
                },
                value.span,
            );
        }

        void
    }

    /// The variable at the bottom of a place expression chain.
    fn place_root(expr: &Expr) -> Option<String> {
        match &expr.kind {
            ExprKind::Variable(name) => Some(name.clone()),
            ExprKind::SelfRef => Some("self".to_string()),
            ExprKind::Member { object, .. } => Self::place_root(object),
            ExprKind::Index { array, .. } => Self::place_root(array),
            _ => None,
        }
    }

    // === Calls ===

    fn check_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> TypeId {
        match &callee.kind {
            ExprKind::Variable(name) => self.check_named_call(name.clone(), callee, args, span),
            ExprKind::Member { object, member } => {
                self.check_member_call(object, member, callee, args, span)
            }
            ExprKind::EnumPath { enum_name, variant } => {
                let ty = self.check_enum_variant(enum_name, variant, args, span);
                self.expr_types.insert(callee.id, ty);
                ty
            }
            _ => {
                let callee_ty = self.check_expr(callee, Usage::Inspect);
                match self.registry.get(callee_ty).clone() {
                    TypeDesc::Function(sig) | TypeDesc::Method { sig, .. } => {
                        self.check_call_args(&sig, args, span);
                        sig.ret
                    }
                    TypeDesc::Unknown => self.registry.unknown(),
                    _ => {
                        self.error(
                            DiagnosticKind::CalleeNotCallable {
                                found: self.registry.display(callee_ty),
                            },
                            callee.span,
                        );
                        self.registry.unknown()
                    }
                }
            }
        }
    }

    /// `name(args...)`: a free function or a class constructor.
    fn check_named_call(
        &mut self,
        name: String,
        callee: &Expr,
        args: &[Expr],
        span: Span,
    ) -> TypeId {
        let Some(symbol) = self.symbols.lookup(&name) else {
            self.error(DiagnosticKind::UndeclaredVariable { name }, callee.span);
            for arg in args {
                self.check_expr(arg, Usage::Inspect);
            }
            return self.registry.unknown();
        };

        let symbol_ty = symbol.ty;
        let kind = symbol.kind;
        self.expr_types.insert(callee.id, symbol_ty);

        match kind {
            SymbolKind::Function => {
                let TypeDesc::Function(sig) = self.registry.get(symbol_ty).clone() else {
                    return self.registry.unknown();
                };
                self.check_call_args(&sig, args, span);
                sig.ret
            }
            SymbolKind::Class => {
                // Constructor call: checked against `new` when declared
                let new_sig = match self.registry.get(symbol_ty) {
                    TypeDesc::Class { methods, .. } => methods
                        .iter()
                        .find(|(n, _)| n == "new")
                        .map(|(_, sig)| sig.clone()),
                    _ => None,
                };
                match new_sig {
                    Some(sig) => self.check_call_args(&sig, args, span),
                    None => {
                        if !args.is_empty() {
                            self.error(
                                DiagnosticKind::WrongArgumentCount {
                                    expected: 0,
                                    got: args.len(),
                                },
                                span,
                            );
                        }
                        self.check_args_in_call_scope(args, &[]);
                    }
                }
                symbol_ty
            }
            _ => {
                self.error(
                    DiagnosticKind::CalleeNotCallable {
                        found: self.registry.display(symbol_ty),
                    },
                    callee.span,
                );
                for arg in args {
                    self.check_expr(arg, Usage::Inspect);
                }
                self.registry.unknown()
            }
        }
    }

    /// `object.member(args...)`: a method call, or an enum variant
    /// construction when `object` names an enum.
    fn check_member_call(
        &mut self,
        object: &Expr,
        member: &Spanned<String>,
        callee: &Expr,
        args: &[Expr],
        span: Span,
    ) -> TypeId {
        if let ExprKind::Variable(name) = &object.kind {
            if let Some(symbol) = self.symbols.lookup(name) {
                if symbol.kind == SymbolKind::Enum {
                    let enum_sym_ty = symbol.ty;
                    let enum_name = Spanned::new(name.clone(), object.span);
                    self.expr_types.insert(object.id, enum_sym_ty);
                    let ty = self.check_enum_variant(&enum_name, member, args, span);
                    self.expr_types.insert(callee.id, ty);
                    return ty;
                }
            }
        }

        let object_ty = self.check_expr(object, Usage::Inspect);
        let aggregate = self.deref_aggregate(object_ty);
        let desc = self.registry.get(aggregate).clone();

        let method = match desc {
            TypeDesc::Class {
                fields, methods, ..
            } => match methods.iter().find(|(n, _)| n == &member.node) {
                Some((_, sig)) => Some(sig.clone()),
                None => {
                    if let Some(field) = fields.iter().find(|f| f.name == member.node) {
                        self.error(
                            DiagnosticKind::CalleeNotCallable {
                                found: self.registry.display(field.ty),
                            },
                            member.span,
                        );
                    } else {
                        self.error(
                            DiagnosticKind::NoSuchMember {
                                type_name: self.registry.display(aggregate),
                                member: member.node.clone(),
                            },
                            member.span,
                        );
                    }
                    None
                }
            },
            TypeDesc::Struct { fields, .. } => {
                if let Some(field) = fields.iter().find(|f| f.name == member.node) {
                    self.error(
                        DiagnosticKind::CalleeNotCallable {
                            found: self.registry.display(field.ty),
                        },
                        member.span,
                    );
                } else {
                    self.error(
                        DiagnosticKind::NoSuchMember {
                            type_name: self.registry.display(aggregate),
                            member: member.node.clone(),
                        },
                        member.span,
                    );
                }
                None
            }
            TypeDesc::Unknown => None,
            _ => {
                self.error(
                    DiagnosticKind::MemberAccessOnNonAggregate {
                        found: self.registry.display(object_ty),
                    },
                    object.span,
                );
                None
            }
        };

        let Some(sig) = method else {
            for arg in args {
                self.check_expr(arg, Usage::Inspect);
            }
            return self.registry.unknown();
        };

        let method_ty = self.registry.intern_method(aggregate, sig.clone());
        self.expr_types.insert(callee.id, method_ty);
        self.check_call_args(&sig, args, span);
        sig.ret
    }

    /// Arity and argument-type checking. Arguments are checked inside a
    /// dedicated scope so borrows taken for the call last for the call
    /// only.
    fn check_call_args(&mut self, sig: &FunctionSig, args: &[Expr], span: Span) {
        if sig.params.len() != args.len() {
            self.error(
                DiagnosticKind::WrongArgumentCount {
                    expected: sig.params.len(),
                    got: args.len(),
                },
                span,
            );
        }
        let params = sig.params.clone();
        self.check_args_in_call_scope(args, &params);
    }

    fn check_args_in_call_scope(&mut self, args: &[Expr], params: &[TypeId]) {
        self.enter_scope();
        for (index, arg) in args.iter().enumerate() {
            let arg_ty = self.check_expr(arg, Usage::Consume);
            if let Some(&param_ty) = params.get(index) {
                if !self.registry.assignable(param_ty, arg_ty) {
                    self.error(
                        DiagnosticKind::ArgumentTypeMismatch {
                            index: index + 1,
                            expected: self.registry.display(param_ty),
                            found: self.registry.display(arg_ty),
                        },
                        arg.span,
                    );
                }
            }
        }
        self.leave_scope();
    }

    // === Member access ===

    fn check_member(&mut self, object: &Expr, member: &Spanned<String>) -> TypeId {
        // `Enum.Variant` without a call: a payload-less variant value
        if let ExprKind::Variable(name) = &object.kind {
            if let Some(symbol) = self.symbols.lookup(name) {
                if symbol.kind == SymbolKind::Enum {
                    let enum_sym_ty = symbol.ty;
                    self.expr_types.insert(object.id, enum_sym_ty);
                    let enum_name = Spanned::new(name.clone(), object.span);
                    return self.check_enum_variant(&enum_name, member, &[], member.span);
                }
            }
        }

        let object_ty = self.check_expr(object, Usage::Inspect);
        let aggregate = self.deref_aggregate(object_ty);
        let desc = self.registry.get(aggregate).clone();

        match desc {
            TypeDesc::Struct { fields, .. } => {
                match fields.iter().find(|f| f.name == member.node) {
                    Some(field) => field.ty,
                    None => {
                        self.error(
                            DiagnosticKind::NoSuchMember {
                                type_name: self.registry.display(aggregate),
                                member: member.node.clone(),
                            },
                            member.span,
                        );
                        self.registry.unknown()
                    }
                }
            }
            TypeDesc::Class {
                fields, methods, ..
            } => {
                if let Some(field) = fields.iter().find(|f| f.name == member.node) {
                    return field.ty;
                }
                if let Some((_, sig)) = methods.iter().find(|(n, _)| n == &member.node) {
                    let sig = sig.clone();
                    return self.registry.intern_method(aggregate, sig);
                }
                self.error(
                    DiagnosticKind::NoSuchMember {
                        type_name: self.registry.display(aggregate),
                        member: member.node.clone(),
                    },
                    member.span,
                );
                self.registry.unknown()
            }
            TypeDesc::Unknown => self.registry.unknown(),
            _ => {
                self.error(
                    DiagnosticKind::MemberAccessOnNonAggregate {
                        found: self.registry.display(object_ty),
                    },
                    object.span,
                );
                self.registry.unknown()
            }
        }
    }

    /// Member access looks through one level of reference.
    fn deref_aggregate(&self, ty: TypeId) -> TypeId {
        match self.registry.get(ty) {
            TypeDesc::Reference { inner, .. } => *inner,
            _ => ty,
        }
    }

    // === Constructors ===

    fn check_struct_init(&mut self, name: &Spanned<String>, fields: &StructInitFields) -> TypeId {
        let Some(symbol) = self.symbols.lookup(&name.node) else {
            self.error(
                DiagnosticKind::UndeclaredType {
                    name: name.node.clone(),
                },
                name.span,
            );
            self.check_init_values_poisoned(fields);
            return self.registry.unknown();
        };

        let struct_ty = symbol.ty;
        let TypeDesc::Struct {
            fields: declared, ..
        } = self.registry.get(struct_ty).clone()
        else {
            self.error(
                DiagnosticKind::NotAStruct {
                    name: name.node.clone(),
                },
                name.span,
            );
            self.check_init_values_poisoned(fields);
            return self.registry.unknown();
        };

        match fields {
            StructInitFields::Positional(values) => {
                if values.len() != declared.len() {
                    self.error(
                        DiagnosticKind::WrongArgumentCount {
                            expected: declared.len(),
                            got: values.len(),
                        },
                        name.span,
                    );
                }
                for (index, value) in values.iter().enumerate() {
                    let value_ty = self.check_expr(value, Usage::Consume);
                    if let Some(field) = declared.get(index) {
                        if !self.registry.assignable(field.ty, value_ty) {
                            self.error(
                                DiagnosticKind::ArgumentTypeMismatch {
                                    index: index + 1,
                                    expected: self.registry.display(field.ty),
                                    found: self.registry.display(value_ty),
                                },
                                value.span,
                            );
                        }
                    }
                }
            }
            StructInitFields::Named(entries) => {
                let mut seen: Vec<String> = Vec::new();
                for (key, value) in entries {
                    let value_ty = self.check_expr(value, Usage::Consume);
                    if seen.iter().any(|s| s == &key.node) {
                        self.error(
                            DiagnosticKind::DuplicateStructField {
                                field: key.node.clone(),
                            },
                            key.span,
                        );
                        continue;
                    }
                    seen.push(key.node.clone());
                    match declared.iter().find(|f| f.name == key.node) {
                        Some(field) => {
                            if !self.registry.assignable(field.ty, value_ty) {
                                self.error(
                                    DiagnosticKind::AssignmentTypeMismatch {
                                        expected: self.registry.display(field.ty),
                                        found: self.registry.display(value_ty),
                                    },
                                    value.span,
                                );
                            }
                        }
                        None => {
                            self.error(
                                DiagnosticKind::NoSuchMember {
                                    type_name: name.node.clone(),
                                    member: key.node.clone(),
                                },
                                key.span,
                            );
                        }
                    }
                }
                for field in &declared {
                    if !seen.iter().any(|s| s == &field.name) {
                        self.error(
                            DiagnosticKind::MissingStructField {
                                field: field.name.clone(),
                            },
                            name.span,
                        );
                    }
                }
            }
        }

        struct_ty
    }

    fn check_init_values_poisoned(&mut self, fields: &StructInitFields) {
        match fields {
            StructInitFields::Positional(values) => {
                for value in values {
                    self.check_expr(value, Usage::Inspect);
                }
            }
            StructInitFields::Named(entries) => {
                for (_, value) in entries {
                    self.check_expr(value, Usage::Inspect);
                }
            }
        }
    }

    /// `E::V(args)` / `E.V(args)` / bare unit-variant paths.
    fn check_enum_variant(
        &mut self,
        enum_name: &Spanned<String>,
        variant: &Spanned<String>,
        args: &[Expr],
        span: Span,
    ) -> TypeId {
        let Some(symbol) = self.symbols.lookup(&enum_name.node) else {
            self.error(
                DiagnosticKind::UndeclaredType {
                    name: enum_name.node.clone(),
                },
                enum_name.span,
            );
            for arg in args {
                self.check_expr(arg, Usage::Inspect);
            }
            return self.registry.unknown();
        };

        let enum_ty = symbol.ty;
        let TypeDesc::Enum { variants, .. } = self.registry.get(enum_ty).clone() else {
            self.error(
                DiagnosticKind::NotAnEnum {
                    name: enum_name.node.clone(),
                },
                enum_name.span,
            );
            for arg in args {
                self.check_expr(arg, Usage::Inspect);
            }
            return self.registry.unknown();
        };

        let Some(decl) = variants.iter().find(|v| v.name == variant.node) else {
            self.error(
                DiagnosticKind::NoSuchVariant {
                    enum_name: enum_name.node.clone(),
                    variant: variant.node.clone(),
                },
                variant.span,
            );
            for arg in args {
                self.check_expr(arg, Usage::Inspect);
            }
            return enum_ty;
        };

        if decl.payload.len() != args.len() {
            self.error(
                DiagnosticKind::WrongEnumPayloadCount {
                    variant: variant.node.clone(),
                    expected: decl.payload.len(),
                    got: args.len(),
                },
                span,
            );
        }
        let payload = decl.payload.clone();
        self.check_args_in_call_scope(args, &payload);

        enum_ty
    }

    // === Arrays ===

    fn check_array_literal(&mut self, elements: &[Expr]) -> TypeId {
        let mut element_ty = self.registry.unknown();
        for (index, element) in elements.iter().enumerate() {
            let ty = self.check_expr(element, Usage::Consume);
            if index == 0 {
                element_ty = ty;
            } else if !self.registry.assignable(element_ty, ty) {
                self.error(
                    DiagnosticKind::ArrayElementTypeMismatch {
                        expected: self.registry.display(element_ty),
                        found: self.registry.display(ty),
                    },
                    element.span,
                );
            }
        }
        self.registry
            .intern_array(element_ty, elements.len() as u64)
    }

    fn check_index(&mut self, array: &Expr, index: &Expr) -> TypeId {
        let array_ty = self.check_expr(array, Usage::Inspect);
        let index_ty = self.check_expr(index, Usage::Inspect);

        if !self.registry.is_integer(index_ty) && !self.registry.is_unknown(index_ty) {
            self.error(
                DiagnosticKind::NonIntegerIndex {
                    found: self.registry.display(index_ty),
                },
                index.span,
            );
        }

        let desc = self.registry.get(array_ty).clone();
        match desc {
            TypeDesc::Array { element, .. } | TypeDesc::DynArray { element } => element,
            TypeDesc::Unknown => self.registry.unknown(),
            _ => {
                self.error(
                    DiagnosticKind::IndexOnNonArray {
                        found: self.registry.display(array_ty),
                    },
                    array.span,
                );
                self.registry.unknown()
            }
        }
    }
}
