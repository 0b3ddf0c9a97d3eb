//! Parser tests

use crate::parse;
use chtholly_ast::*;
use pretty_assertions::assert_eq;

fn first_stmt(source: &str) -> Stmt {
    let program = parse(source).unwrap();
    program.statements.into_iter().next().unwrap()
}

#[test]
fn test_parse_let() {
    let stmt = first_stmt("let mut x: i32 = 10;");
    match stmt.kind {
        StmtKind::Let(let_stmt) => {
            assert_eq!(let_stmt.name.node, "x");
            assert!(let_stmt.mutable);
            assert_eq!(
                let_stmt.ty.unwrap().node,
                TypeName::Plain("i32".to_string())
            );
            assert!(let_stmt.init.is_some());
        }
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn test_parse_let_inferred() {
    let stmt = first_stmt("let s = \"hello\";");
    match stmt.kind {
        StmtKind::Let(let_stmt) => {
            assert!(!let_stmt.mutable);
            assert!(let_stmt.ty.is_none());
            assert!(matches!(
                let_stmt.init.unwrap().kind,
                ExprKind::Literal(Literal::Str(_))
            ));
        }
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn test_let_without_type_or_init_is_error() {
    assert!(parse("let x;").is_err());
}

#[test]
fn test_parse_function() {
    let stmt = first_stmt("fn add(a: i32, b: i32): i32 { return a + b; }");
    match stmt.kind {
        StmtKind::Function(f) => {
            assert_eq!(f.name.node, "add");
            assert_eq!(f.params.len(), 2);
            assert_eq!(f.params[0].name.node, "a");
            assert_eq!(f.ret.unwrap().node, TypeName::Plain("i32".to_string()));
            assert_eq!(f.body.len(), 1);
        }
        other => panic!("expected fn, got {:?}", other),
    }
}

#[test]
fn test_parse_function_void_return_omitted() {
    let stmt = first_stmt("fn main() { }");
    match stmt.kind {
        StmtKind::Function(f) => assert!(f.ret.is_none()),
        other => panic!("expected fn, got {:?}", other),
    }
}

#[test]
fn test_parse_reference_types() {
    let stmt = first_stmt("fn f(r: &i32, m: &mut i32) { }");
    match stmt.kind {
        StmtKind::Function(f) => {
            match &f.params[0].ty.node {
                TypeName::Reference { inner, mutable } => {
                    assert!(!mutable);
                    assert_eq!(inner.node, TypeName::Plain("i32".to_string()));
                }
                other => panic!("expected reference type, got {:?}", other),
            }
            match &f.params[1].ty.node {
                TypeName::Reference { mutable, .. } => assert!(mutable),
                other => panic!("expected reference type, got {:?}", other),
            }
        }
        other => panic!("expected fn, got {:?}", other),
    }
}

#[test]
fn test_parse_array_types() {
    let stmt = first_stmt("let a: i32[4] = [1, 2, 3, 4];");
    match stmt.kind {
        StmtKind::Let(l) => match l.ty.unwrap().node {
            TypeName::Array { element, size } => {
                assert_eq!(element.node, TypeName::Plain("i32".to_string()));
                assert_eq!(size, Some(4));
            }
            other => panic!("expected array type, got {:?}", other),
        },
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn test_parse_dynamic_array_type() {
    let stmt = first_stmt("fn f(xs: i32[]) { }");
    match stmt.kind {
        StmtKind::Function(f) => match &f.params[0].ty.node {
            TypeName::Array { size, .. } => assert_eq!(*size, None),
            other => panic!("expected array type, got {:?}", other),
        },
        other => panic!("expected fn, got {:?}", other),
    }
}

#[test]
fn test_parse_struct_decl() {
    let stmt = first_stmt("struct P { let mut x: i32; let y: i32; }");
    match stmt.kind {
        StmtKind::Struct(s) => {
            assert_eq!(s.name.node, "P");
            assert_eq!(s.fields.len(), 2);
            assert!(s.fields[0].mutable);
            assert!(!s.fields[1].mutable);
        }
        other => panic!("expected struct, got {:?}", other),
    }
}

#[test]
fn test_parse_class_decl() {
    let source = r#"
        class Point {
            let x: i32;
            let y: i32;
            fn get_x(): i32 { return self.x; }
            mut fn set_x(v: i32) { self.x = v; }
        }
    "#;
    let stmt = first_stmt(source);
    match stmt.kind {
        StmtKind::Class(c) => {
            assert_eq!(c.name.node, "Point");
            assert_eq!(c.fields.len(), 2);
            assert_eq!(c.methods.len(), 2);
            assert!(!c.methods[0].mutates);
            assert!(c.methods[1].mutates);
        }
        other => panic!("expected class, got {:?}", other),
    }
}

#[test]
fn test_parse_enum_decl() {
    let stmt = first_stmt("enum Shape { Circle(f64), Rect(f64, f64), Empty }");
    match stmt.kind {
        StmtKind::Enum(e) => {
            assert_eq!(e.name.node, "Shape");
            assert_eq!(e.variants.len(), 3);
            assert_eq!(e.variants[0].payload.len(), 1);
            assert_eq!(e.variants[1].payload.len(), 2);
            assert!(e.variants[2].payload.is_empty());
        }
        other => panic!("expected enum, got {:?}", other),
    }
}

#[test]
fn test_parse_enum_path_expr() {
    let stmt = first_stmt("let s = Shape::Circle(1.0);");
    match stmt.kind {
        StmtKind::Let(l) => match l.init.unwrap().kind {
            ExprKind::Call { callee, args } => {
                assert_eq!(args.len(), 1);
                match callee.kind {
                    ExprKind::EnumPath { enum_name, variant } => {
                        assert_eq!(enum_name.node, "Shape");
                        assert_eq!(variant.node, "Circle");
                    }
                    other => panic!("expected enum path, got {:?}", other),
                }
            }
            other => panic!("expected call, got {:?}", other),
        },
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn test_parse_struct_init_named_and_positional() {
    let named = first_stmt("let p = P{x: 1, y: 2};");
    match named.kind {
        StmtKind::Let(l) => match l.init.unwrap().kind {
            ExprKind::StructInit { fields, .. } => {
                assert!(matches!(fields, StructInitFields::Named(f) if f.len() == 2));
            }
            other => panic!("expected struct init, got {:?}", other),
        },
        other => panic!("expected let, got {:?}", other),
    }

    let positional = first_stmt("let p = P{1, 2};");
    match positional.kind {
        StmtKind::Let(l) => match l.init.unwrap().kind {
            ExprKind::StructInit { fields, .. } => {
                assert!(matches!(fields, StructInitFields::Positional(f) if f.len() == 2));
            }
            other => panic!("expected struct init, got {:?}", other),
        },
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn test_parse_if_else() {
    let stmt = first_stmt("if (x < 0) { } else { }");
    assert!(matches!(
        stmt.kind,
        StmtKind::If {
            else_branch: Some(_),
            ..
        }
    ));
}

#[test]
fn test_parse_while_and_do_while() {
    let w = first_stmt("while (x > 0) { x = x - 1; }");
    assert!(matches!(w.kind, StmtKind::While { .. }));

    let dw = first_stmt("do { x = x - 1; } while (x > 0);");
    assert!(matches!(dw.kind, StmtKind::DoWhile { .. }));
}

#[test]
fn test_parse_for() {
    let stmt = first_stmt("for (let mut i: i32 = 0; i < 10; i = i + 1) { }");
    match stmt.kind {
        StmtKind::For {
            init,
            condition,
            step,
            ..
        } => {
            assert!(init.is_some());
            assert!(condition.is_some());
            assert!(step.is_some());
        }
        other => panic!("expected for, got {:?}", other),
    }
}

#[test]
fn test_parse_for_empty_clauses() {
    let stmt = first_stmt("for (;;) { break; }");
    match stmt.kind {
        StmtKind::For {
            init,
            condition,
            step,
            ..
        } => {
            assert!(init.is_none());
            assert!(condition.is_none());
            assert!(step.is_none());
        }
        other => panic!("expected for, got {:?}", other),
    }
}

#[test]
fn test_parse_switch() {
    let source = r#"
        switch (x) {
            case 1: { fallthrough; }
            case 2: { break; }
            default: { }
        }
    "#;
    let stmt = first_stmt(source);
    match stmt.kind {
        StmtKind::Switch(s) => {
            assert_eq!(s.cases.len(), 3);
            assert!(s.cases[0].value.is_some());
            assert!(s.cases[2].value.is_none());
        }
        other => panic!("expected switch, got {:?}", other),
    }
}

#[test]
fn test_parse_borrow_exprs() {
    let stmt = first_stmt("let y = &mut x;");
    match stmt.kind {
        StmtKind::Let(l) => match l.init.unwrap().kind {
            ExprKind::Borrow { mutable, target } => {
                assert!(mutable);
                assert!(matches!(target.kind, ExprKind::Variable(_)));
            }
            other => panic!("expected borrow, got {:?}", other),
        },
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn test_parse_precedence() {
    // 1 + 2 * 3 parses as 1 + (2 * 3)
    let stmt = first_stmt("let v = 1 + 2 * 3;");
    match stmt.kind {
        StmtKind::Let(l) => match l.init.unwrap().kind {
            ExprKind::Binary { op, right, .. } => {
                assert_eq!(op, BinOp::Add);
                assert!(matches!(
                    right.kind,
                    ExprKind::Binary { op: BinOp::Mul, .. }
                ));
            }
            other => panic!("expected binary, got {:?}", other),
        },
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn test_parse_member_chain_and_index() {
    let stmt = first_stmt("let v = a.b.c[0];");
    match stmt.kind {
        StmtKind::Let(l) => {
            assert!(matches!(l.init.unwrap().kind, ExprKind::Index { .. }));
        }
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn test_parse_method_call() {
    let stmt = first_stmt("p.dist(q);");
    match stmt.kind {
        StmtKind::Expression(e) => match e.kind {
            ExprKind::Call { callee, args } => {
                assert_eq!(args.len(), 1);
                assert!(matches!(callee.kind, ExprKind::Member { .. }));
            }
            other => panic!("expected call, got {:?}", other),
        },
        other => panic!("expected expression stmt, got {:?}", other),
    }
}

#[test]
fn test_parse_assignment_targets() {
    assert!(parse("x = 1;").is_ok());
    assert!(parse("p.x = 1;").is_ok());
    assert!(parse("a[0] = 1;").is_ok());
    assert!(parse("1 = 2;").is_err());
    assert!(parse("f() = 2;").is_err());
}

#[test]
fn test_expr_ids_are_unique() {
    let program = parse("let a = 1 + 2; let b = a * 3;").unwrap();
    let mut ids = Vec::new();
    fn collect(e: &Expr, ids: &mut Vec<ExprId>) {
        ids.push(e.id);
        match &e.kind {
            ExprKind::Binary { left, right, .. } => {
                collect(left, ids);
                collect(right, ids);
            }
            ExprKind::Unary { operand, .. } => collect(operand, ids),
            _ => {}
        }
    }
    for stmt in &program.statements {
        if let StmtKind::Let(l) = &stmt.kind {
            if let Some(init) = &l.init {
                collect(init, &mut ids);
            }
        }
    }
    let len = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), len);
}

#[test]
fn test_missing_semicolon_is_error() {
    assert!(parse("let x = 1").is_err());
}

#[test]
fn test_spans_cover_source() {
    let source = "let x = 10;";
    let program = parse(source).unwrap();
    let span = program.statements[0].span;
    assert_eq!(&source[span.start..span.end], source);
}
