//! End-to-end analyzer tests: real source through the parser, checked
//! against expected diagnostic kinds.

use chtholly_parser::parse;
use chtholly_sema::{Analysis, Analyzer, DeclKind, DiagnosticKind};

fn analyze(source: &str) -> Analysis {
    let program = parse(source).unwrap();
    Analyzer::new().analyze(&program)
}

fn kinds(source: &str) -> Vec<DiagnosticKind> {
    analyze(source)
        .diagnostics
        .into_iter()
        .map(|d| d.kind)
        .collect()
}

fn assert_ok(source: &str) {
    let analysis = analyze(source);
    assert!(
        !analysis.has_errors(),
        "unexpected diagnostics: {:?}",
        analysis.diagnostics
    );
}

// === Well-typed programs ===

#[test]
fn copy_types_allow_repeated_reads() {
    assert_ok("fn main(): void { let x: i32 = 10; let y: i32 = x; let z: i32 = x; }");
}

#[test]
fn function_call_and_recursion() {
    assert_ok(
        r#"
        fn fact(n: i32): i32 {
            if (n <= 1) { return 1; }
            return n * fact(n - 1);
        }
        fn main(): void { fact(5); }
        "#,
    );
}

#[test]
fn arithmetic_coerces_int_with_float() {
    let source = "fn main(): void { let v = 1 + 2.5; }";
    let analysis = analyze(source);
    assert!(!analysis.has_errors());
    // v is inferred as f64
    let decl_ty = analysis
        .expr_types
        .values()
        .any(|&t| t == analysis.registry.f64_());
    assert!(decl_ty);
}

#[test]
fn struct_init_and_member_read() {
    assert_ok(
        r#"
        struct P { let mut x: i32; let y: i32; }
        fn main(): void {
            let p = P{x: 1, y: 2};
            let a: i32 = p.x;
        }
        "#,
    );
}

#[test]
fn struct_positional_init() {
    assert_ok(
        r#"
        struct P { let x: i32; let y: i32; }
        fn main(): void { let p = P{1, 2}; }
        "#,
    );
}

#[test]
fn class_with_methods_and_constructor() {
    assert_ok(
        r#"
        class Counter {
            let mut count: i32;
            fn get(): i32 { return self.count; }
            mut fn bump(): void { self.count = self.count + 1; }
        }
        fn main(): void {
            let c = Counter();
            let n: i32 = c.get();
        }
        "#,
    );
}

#[test]
fn class_constructor_checked_against_new() {
    assert_ok(
        r#"
        class Point {
            let mut x: i32;
            let mut y: i32;
            mut fn new(x: i32, y: i32): Point {
                self.x = x;
                self.y = y;
                return self;
            }
        }
        fn main(): void { let p = Point(1, 2); }
        "#,
    );
    // Wrong arity against `new`
    let errs = kinds(
        r#"
        class Point {
            let mut x: i32;
            mut fn new(x: i32): Point {
                self.x = x;
                return self;
            }
        }
        fn main(): void { let p = Point(1, 2); }
        "#,
    );
    assert!(errs
        .iter()
        .any(|k| matches!(k, DiagnosticKind::WrongArgumentCount { expected: 1, got: 2 })));
}

#[test]
fn static_method_call_through_class_name() {
    assert_ok(
        r#"
        class Point {
            let x: i32;
            fn origin(): Point { return Point(); }
        }
        fn main(): void { let p = Point.origin(); }
        "#,
    );
}

#[test]
fn enum_variants_both_path_forms() {
    assert_ok(
        r#"
        enum Shape { Circle(f64), Empty }
        fn main(): void {
            let a = Shape::Circle(1.5);
            let b = Shape.Circle(2.5);
            let c = Shape::Empty;
        }
        "#,
    );
}

#[test]
fn switch_on_string_discriminant() {
    assert_ok(
        r#"
        fn main(): void {
            let name: string = "a";
            switch (name) {
                case "a": { break; }
                case "b": { fallthrough; }
                default: { }
            }
        }
        "#,
    );
}

#[test]
fn loops_with_break_and_continue() {
    assert_ok(
        r#"
        fn main(): void {
            for (let mut i: i32 = 0; i < 10; i = i + 1) {
                if (i == 3) { continue; }
                if (i == 7) { break; }
            }
            let mut n: i32 = 3;
            while (n > 0) { n = n - 1; }
            do { n = n + 1; } while (n < 3);
        }
        "#,
    );
}

#[test]
fn arrays_fixed_and_indexing() {
    assert_ok(
        r#"
        fn main(): void {
            let mut a: i32[3] = [1, 2, 3];
            let first: i32 = a[0];
            a[1] = 9;
        }
        "#,
    );
}

#[test]
fn references_as_parameters() {
    assert_ok(
        r#"
        fn read(r: &i32): i32 { return 0; }
        fn main(): void {
            let x: i32 = 5;
            read(&x);
        }
        "#,
    );
}

// === Rejected programs, one per diagnostic kind ===

#[test]
fn use_after_move_on_string() {
    let errs = kinds(
        "fn main(): void { let x: string = \"a\"; let y: string = x; let z: string = x; }",
    );
    assert_eq!(errs.len(), 1);
    assert!(matches!(&errs[0], DiagnosticKind::UseAfterMove { name } if name == "x"));
}

#[test]
fn conflicting_mutable_borrows() {
    let errs =
        kinds("fn main(): void { let mut x: i32 = 5; let y = &mut x; let z = &mut x; }");
    assert_eq!(errs.len(), 1);
    assert!(matches!(&errs[0], DiagnosticKind::ConflictingBorrow { name } if name == "x"));
}

#[test]
fn mutable_borrow_of_immutable() {
    let errs = kinds("fn main(): void { let x: i32 = 5; let y = &mut x; }");
    assert_eq!(errs.len(), 1);
    assert!(
        matches!(&errs[0], DiagnosticKind::ImmutableBorrowedMutably { name } if name == "x")
    );
}

#[test]
fn dangling_reference_on_assignment() {
    let errs = kinds(
        "fn main(): void { let mut r: &i32 = &0; { let x: i32 = 10; r = &x; } }",
    );
    assert_eq!(errs.len(), 1);
    assert!(matches!(&errs[0], DiagnosticKind::DanglingReference { name } if name == "x"));
}

#[test]
fn duplicate_case_value() {
    let errs = kinds("fn main(): void { let x = 1; switch (x) { case 1: {} case 1: {} } }");
    assert_eq!(errs.len(), 1);
    assert!(matches!(&errs[0], DiagnosticKind::DuplicateCase { .. }));
}

#[test]
fn assign_to_field_of_immutable_object() {
    let errs = kinds(
        r#"
        struct P { let mut x: i32; let y: i32; }
        fn main(): void { let p = P{x: 1, y: 2}; p.x = 3; }
        "#,
    );
    assert_eq!(errs.len(), 1);
    assert!(matches!(&errs[0], DiagnosticKind::AssignToImmutable { name } if name == "p"));
}

#[test]
fn reference_escapes_function() {
    let errs = kinds("fn get(): &i32 { let x = 10; return &x; }");
    assert_eq!(errs.len(), 1);
    assert!(
        matches!(&errs[0], DiagnosticKind::ReferenceEscapesFunction { name } if name == "x")
    );
}

#[test]
fn undeclared_variable() {
    let errs = kinds("fn main(): void { y; }");
    assert!(matches!(&errs[0], DiagnosticKind::UndeclaredVariable { name } if name == "y"));
}

#[test]
fn undeclared_type() {
    let errs = kinds("fn main(): void { let x: Widget = 1; }");
    assert!(matches!(&errs[0], DiagnosticKind::UndeclaredType { name } if name == "Widget"));
}

#[test]
fn redeclaration_in_same_scope() {
    let errs = kinds("fn main(): void { let x: i32 = 1; let x: i32 = 2; }");
    assert!(matches!(&errs[0], DiagnosticKind::Redeclaration { name } if name == "x"));
}

#[test]
fn shadowing_in_inner_scope_is_fine() {
    assert_ok("fn main(): void { let x: i32 = 1; { let x: string = \"s\"; } }");
}

#[test]
fn no_such_member() {
    let errs = kinds(
        r#"
        struct P { let x: i32; }
        fn main(): void { let p = P{x: 1}; p.z; }
        "#,
    );
    assert!(matches!(&errs[0], DiagnosticKind::NoSuchMember { member, .. } if member == "z"));
}

#[test]
fn no_such_variant() {
    let errs = kinds(
        r#"
        enum E { A }
        fn main(): void { let v = E::B; }
        "#,
    );
    assert!(matches!(&errs[0], DiagnosticKind::NoSuchVariant { variant, .. } if variant == "B"));
}

#[test]
fn duplicate_and_missing_struct_fields() {
    let errs = kinds(
        r#"
        struct P { let x: i32; }
        fn main(): void { let p = P{x: 1, x: 2}; }
        "#,
    );
    assert!(matches!(&errs[0], DiagnosticKind::DuplicateStructField { field } if field == "x"));

    let errs = kinds(
        r#"
        struct P { let x: i32; let y: i32; }
        fn main(): void { let p = P{x: 1}; }
        "#,
    );
    assert!(matches!(&errs[0], DiagnosticKind::MissingStructField { field } if field == "y"));
}

#[test]
fn struct_init_on_non_struct() {
    let errs = kinds(
        r#"
        fn helper(): void { }
        fn main(): void { let v = helper{1}; }
        "#,
    );
    assert!(matches!(&errs[0], DiagnosticKind::NotAStruct { name } if name == "helper"));
}

#[test]
fn variant_path_on_non_enum() {
    let errs = kinds(
        r#"
        struct P { let x: i32; }
        fn main(): void { let v = P::A; }
        "#,
    );
    assert!(matches!(&errs[0], DiagnosticKind::NotAnEnum { name } if name == "P"));
}

#[test]
fn let_annotation_mismatch() {
    let errs = kinds("fn main(): void { let x: i32 = \"a\"; }");
    assert!(matches!(
        &errs[0],
        DiagnosticKind::AssignmentTypeMismatch { .. }
    ));
}

#[test]
fn argument_type_mismatch() {
    let errs = kinds(
        r#"
        fn f(a: i32): void { }
        fn main(): void { f("a"); }
        "#,
    );
    assert!(matches!(
        &errs[0],
        DiagnosticKind::ArgumentTypeMismatch { index: 1, .. }
    ));
}

#[test]
fn return_type_mismatch() {
    let errs = kinds("fn f(): i32 { return \"a\"; }");
    assert!(matches!(&errs[0], DiagnosticKind::ReturnTypeMismatch { .. }));

    let errs = kinds("fn f(): i32 { return; }");
    assert!(matches!(&errs[0], DiagnosticKind::ReturnTypeMismatch { .. }));
}

#[test]
fn array_element_type_mismatch() {
    let errs = kinds("fn main(): void { let a = [1, \"a\"]; }");
    assert!(matches!(
        &errs[0],
        DiagnosticKind::ArrayElementTypeMismatch { .. }
    ));
}

#[test]
fn case_type_mismatch() {
    let errs = kinds(
        "fn main(): void { let x = 1; switch (x) { case \"a\": { } } }",
    );
    assert!(matches!(&errs[0], DiagnosticKind::CaseTypeMismatch { .. }));
}

#[test]
fn non_bool_condition() {
    let errs = kinds("fn main(): void { if (1) { } }");
    assert!(matches!(&errs[0], DiagnosticKind::NonBoolCondition { .. }));
}

#[test]
fn operand_type_mismatch() {
    let errs = kinds("fn main(): void { let v = 1 + \"a\"; }");
    assert!(matches!(&errs[0], DiagnosticKind::OperandTypeMismatch { .. }));

    let errs = kinds("fn main(): void { let v = true && 1; }");
    assert!(matches!(&errs[0], DiagnosticKind::OperandTypeMismatch { .. }));
}

#[test]
fn non_integer_index() {
    let errs = kinds("fn main(): void { let a = [1, 2]; let v = a[true]; }");
    assert!(matches!(&errs[0], DiagnosticKind::NonIntegerIndex { .. }));
}

#[test]
fn wrong_argument_count() {
    let errs = kinds(
        r#"
        fn f(a: i32): void { }
        fn main(): void { f(1, 2); }
        "#,
    );
    assert!(matches!(
        &errs[0],
        DiagnosticKind::WrongArgumentCount { expected: 1, got: 2 }
    ));
}

#[test]
fn wrong_enum_payload_count() {
    let errs = kinds(
        r#"
        enum E { A }
        fn main(): void { let v = E::A(1); }
        "#,
    );
    assert!(matches!(
        &errs[0],
        DiagnosticKind::WrongEnumPayloadCount { expected: 0, got: 1, .. }
    ));
}

#[test]
fn assign_to_immutable_variable() {
    let errs = kinds("fn main(): void { let x: i32 = 1; x = 2; }");
    assert!(matches!(&errs[0], DiagnosticKind::AssignToImmutable { name } if name == "x"));
}

#[test]
fn assign_to_immutable_field() {
    let errs = kinds(
        r#"
        struct P { let x: i32; }
        fn main(): void { let mut p = P{x: 1}; p.x = 2; }
        "#,
    );
    assert_eq!(errs.len(), 1);
    assert!(matches!(&errs[0], DiagnosticKind::AssignToImmutableField { field } if field == "x"));
}

#[test]
fn control_flow_outside_constructs() {
    let errs = kinds("fn main(): void { break; }");
    assert!(matches!(&errs[0], DiagnosticKind::BreakOutsideLoopOrSwitch));

    let errs = kinds("fn main(): void { continue; }");
    assert!(matches!(&errs[0], DiagnosticKind::ContinueOutsideLoop));

    let errs = kinds("fn main(): void { fallthrough; }");
    assert!(matches!(&errs[0], DiagnosticKind::FallthroughOutsideSwitch));
}

#[test]
fn continue_inside_switch_is_rejected() {
    let errs = kinds(
        r#"
        fn main(): void {
            let x = 1;
            switch (x) { case 1: { continue; } }
        }
        "#,
    );
    assert!(matches!(&errs[0], DiagnosticKind::ContinueOutsideLoop));
}

#[test]
fn break_legal_in_switch_and_loop() {
    assert_ok(
        r#"
        fn main(): void {
            let x = 1;
            switch (x) { case 1: { break; } }
            while (x < 2) { break; }
        }
        "#,
    );
}

#[test]
fn fallthrough_not_last_statement() {
    let errs = kinds(
        r#"
        fn main(): void {
            let x = 1;
            switch (x) {
                case 1: { fallthrough; let a: i32 = 1; }
            }
        }
        "#,
    );
    assert_eq!(errs.len(), 1);
    assert!(matches!(&errs[0], DiagnosticKind::FallthroughNotLast));
}

#[test]
fn multiple_default_cases() {
    let errs = kinds(
        "fn main(): void { let x = 1; switch (x) { default: {} default: {} } }",
    );
    assert!(matches!(&errs[0], DiagnosticKind::MultipleDefault));
}

#[test]
fn return_outside_function() {
    let errs = kinds("return;");
    assert!(matches!(&errs[0], DiagnosticKind::ReturnOutsideFunction));
}

#[test]
fn member_access_on_non_aggregate() {
    let errs = kinds("fn main(): void { let x: i32 = 1; x.y; }");
    assert!(matches!(
        &errs[0],
        DiagnosticKind::MemberAccessOnNonAggregate { .. }
    ));
}

#[test]
fn callee_not_callable() {
    let errs = kinds("fn main(): void { let x: i32 = 1; x(); }");
    assert!(matches!(&errs[0], DiagnosticKind::CalleeNotCallable { .. }));
}

#[test]
fn index_on_non_array() {
    let errs = kinds("fn main(): void { let x: i32 = 1; x[0]; }");
    assert!(matches!(&errs[0], DiagnosticKind::IndexOnNonArray { .. }));
}

#[test]
fn self_outside_class() {
    let errs = kinds("fn main(): void { self; }");
    assert!(matches!(&errs[0], DiagnosticKind::SelfOutsideClass));
}

#[test]
fn self_field_assignment_requires_mut_method() {
    let errs = kinds(
        r#"
        class C {
            let mut v: i32;
            fn set(n: i32): void { self.v = n; }
        }
        "#,
    );
    assert_eq!(errs.len(), 1);
    assert!(matches!(&errs[0], DiagnosticKind::AssignToImmutable { name } if name == "self"));
}

// === Error recovery and output interface ===

#[test]
fn multiple_errors_reported_in_source_order() {
    let errs = kinds(
        r#"
        fn main(): void {
            let a: i32 = "x";
            let b: Widget = 1;
            missing;
        }
        "#,
    );
    assert_eq!(errs.len(), 3);
    assert!(matches!(&errs[0], DiagnosticKind::AssignmentTypeMismatch { .. }));
    assert!(matches!(&errs[1], DiagnosticKind::UndeclaredType { .. }));
    assert!(matches!(&errs[2], DiagnosticKind::UndeclaredVariable { .. }));
}

#[test]
fn poisoned_type_does_not_cascade() {
    // `q` is undeclared; everything downstream of it stays quiet
    let errs = kinds("fn main(): void { let a = q + 1; let b: i32 = a; }");
    assert_eq!(errs.len(), 1);
    assert!(matches!(&errs[0], DiagnosticKind::UndeclaredVariable { .. }));
}

#[test]
fn decls_emitted_in_source_order_with_validity() {
    let analysis = analyze(
        r#"
        struct P { let x: i32; }
        enum E { A }
        fn ok(): void { }
        fn bad(): void { missing; }
        class C { let v: i32; }
        let g: i32 = 1;
        "#,
    );
    let names: Vec<&str> = analysis.decls.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["P", "E", "ok", "bad", "C", "g"]);

    let kinds: Vec<DeclKind> = analysis.decls.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![
            DeclKind::Struct,
            DeclKind::Enum,
            DeclKind::Function,
            DeclKind::Function,
            DeclKind::Class,
            DeclKind::Variable,
        ]
    );

    // `bad` is emitted but marked invalid; everything else is valid
    for decl in &analysis.decls {
        assert_eq!(decl.valid, decl.name != "bad", "decl {}", decl.name);
    }
}

#[test]
fn expression_types_are_annotated() {
    let program = parse("fn main(): void { let x: i32 = 1 + 2; }").unwrap();
    let analysis = Analyzer::new().analyze(&program);
    assert!(!analysis.has_errors());

    // Every expression in the program got a resolved type
    use chtholly_ast::{ExprKind, StmtKind};
    let main = match &program.statements[0].kind {
        StmtKind::Function(f) => f,
        _ => unreachable!(),
    };
    let init = match &main.body[0].kind {
        StmtKind::Let(l) => l.init.as_ref().unwrap(),
        _ => unreachable!(),
    };
    assert_eq!(analysis.expr_types[&init.id], analysis.registry.i32_());
    if let ExprKind::Binary { left, right, .. } = &init.kind {
        assert_eq!(analysis.expr_types[&left.id], analysis.registry.i32_());
        assert_eq!(analysis.expr_types[&right.id], analysis.registry.i32_());
    } else {
        unreachable!();
    }
}
