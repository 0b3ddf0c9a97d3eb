//! Expression parsing (precedence climbing).

use chtholly_ast::{BinOp, Expr, ExprKind, Literal, Span, StructInitFields, UnaryOp};
use chtholly_lexer::Token;

use crate::{ParseError, ParseResult, Parser};

impl Parser {
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.parse_logic_or()?;

        if self.check(&Token::Eq) {
            let eq_span = self.current_span();
            self.advance();
            let value = self.parse_assignment()?;

            // Only place expressions may be assigned to
            match expr.kind {
                ExprKind::Variable(_) | ExprKind::Member { .. } | ExprKind::Index { .. } => {
                    let span = expr.span.merge(value.span);
                    return Ok(self.mk_expr(
                        ExprKind::Assign {
                            target: Box::new(expr),
                            value: Box::new(value),
                        },
                        span,
                    ));
                }
                _ => return Err(ParseError::InvalidAssignTarget { span: eq_span }),
            }
        }

        Ok(expr)
    }

    fn parse_logic_or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_logic_and()?;
        while self.eat(&Token::PipePipe) {
            let right = self.parse_logic_and()?;
            expr = self.mk_binary(BinOp::Or, expr, right);
        }
        Ok(expr)
    }

    fn parse_logic_and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_equality()?;
        while self.eat(&Token::AmpAmp) {
            let right = self.parse_equality()?;
            expr = self.mk_binary(BinOp::And, expr, right);
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_comparison()?;
        loop {
            let op = if self.eat(&Token::EqEq) {
                BinOp::Eq
            } else if self.eat(&Token::Neq) {
                BinOp::Neq
            } else {
                break;
            };
            let right = self.parse_comparison()?;
            expr = self.mk_binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_term()?;
        loop {
            let op = if self.eat(&Token::Lt) {
                BinOp::Lt
            } else if self.eat(&Token::Lte) {
                BinOp::Lte
            } else if self.eat(&Token::Gt) {
                BinOp::Gt
            } else if self.eat(&Token::Gte) {
                BinOp::Gte
            } else {
                break;
            };
            let right = self.parse_term()?;
            expr = self.mk_binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_factor()?;
        loop {
            let op = if self.eat(&Token::Plus) {
                BinOp::Add
            } else if self.eat(&Token::Minus) {
                BinOp::Sub
            } else {
                break;
            };
            let right = self.parse_factor()?;
            expr = self.mk_binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = if self.eat(&Token::Star) {
                BinOp::Mul
            } else if self.eat(&Token::Slash) {
                BinOp::Div
            } else if self.eat(&Token::Percent) {
                BinOp::Mod
            } else {
                break;
            };
            let right = self.parse_unary()?;
            expr = self.mk_binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let start = self.current_span().start;

        if self.eat(&Token::Minus) {
            let operand = self.parse_unary()?;
            let span = self.span_from(start);
            return Ok(self.mk_expr(
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        if self.eat(&Token::Bang) {
            let operand = self.parse_unary()?;
            let span = self.span_from(start);
            return Ok(self.mk_expr(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        if self.eat(&Token::Amp) {
            let mutable = self.eat(&Token::Mut);
            let target = self.parse_unary()?;
            let span = self.span_from(start);
            return Ok(self.mk_expr(
                ExprKind::Borrow {
                    mutable,
                    target: Box::new(target),
                },
                span,
            ));
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.check(&Token::LParen) {
                self.advance();
                let args = self.parse_args(&Token::RParen)?;
                self.expect(&Token::RParen)?;
                let span = self.span_from(expr.span.start);
                expr = self.mk_expr(
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    span,
                );
            } else if self.eat(&Token::Dot) {
                let member = self.expect_ident("member name")?;
                let span = self.span_from(expr.span.start);
                expr = self.mk_expr(
                    ExprKind::Member {
                        object: Box::new(expr),
                        member,
                    },
                    span,
                );
            } else if self.check(&Token::LBracket) {
                self.advance();
                let index = self.parse_expr()?;
                self.expect(&Token::RBracket)?;
                let span = self.span_from(expr.span.start);
                expr = self.mk_expr(
                    ExprKind::Index {
                        array: Box::new(expr),
                        index: Box::new(index),
                    },
                    span,
                );
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let tok = self.peek().ok_or_else(|| self.unexpected("expression"))?;
        let span = Span::new(tok.span.start, tok.span.end);

        let expr = match tok.token.clone() {
            Token::Int(n) => {
                self.advance();
                self.mk_expr(ExprKind::Literal(Literal::Int(n)), span)
            }
            Token::Float(n) => {
                self.advance();
                self.mk_expr(ExprKind::Literal(Literal::Float(n)), span)
            }
            Token::Str(s) => {
                self.advance();
                self.mk_expr(ExprKind::Literal(Literal::Str(s)), span)
            }
            Token::Char(c) => {
                self.advance();
                self.mk_expr(ExprKind::Literal(Literal::Char(c)), span)
            }
            Token::True => {
                self.advance();
                self.mk_expr(ExprKind::Literal(Literal::Bool(true)), span)
            }
            Token::False => {
                self.advance();
                self.mk_expr(ExprKind::Literal(Literal::Bool(false)), span)
            }
            Token::SelfKw => {
                self.advance();
                self.mk_expr(ExprKind::SelfRef, span)
            }
            Token::Ident(name) => {
                self.advance();
                let name = chtholly_ast::Spanned::new(name, span);

                if self.eat(&Token::ColonColon) {
                    let variant = self.expect_ident("variant name")?;
                    let full = self.span_from(span.start);
                    self.mk_expr(
                        ExprKind::EnumPath {
                            enum_name: name,
                            variant,
                        },
                        full,
                    )
                } else if self.check(&Token::LBrace) {
                    self.advance();
                    let fields = self.parse_struct_init_fields()?;
                    self.expect(&Token::RBrace)?;
                    let full = self.span_from(span.start);
                    self.mk_expr(ExprKind::StructInit { name, fields }, full)
                } else {
                    self.mk_expr(ExprKind::Variable(name.node), span)
                }
            }
            Token::LBracket => {
                self.advance();
                let elements = self.parse_args(&Token::RBracket)?;
                self.expect(&Token::RBracket)?;
                let full = self.span_from(span.start);
                self.mk_expr(ExprKind::ArrayLit(elements), full)
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                inner
            }
            _ => return Err(self.unexpected("expression")),
        };

        Ok(expr)
    }

    /// Comma-separated expressions up to (not including) `close`.
    fn parse_args(&mut self, close: &Token) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.check(close) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(args)
    }

    /// Struct initializer body: either all-named (`x: 1, y: 2`) or
    /// all-positional (`1, 2`), decided by one token of lookahead.
    fn parse_struct_init_fields(&mut self) -> ParseResult<StructInitFields> {
        if self.check(&Token::RBrace) {
            return Ok(StructInitFields::Positional(Vec::new()));
        }

        let named = matches!(
            (self.peek().map(|t| &t.token), self.peek_next().map(|t| &t.token)),
            (Some(Token::Ident(_)), Some(Token::Colon))
        );

        if named {
            let mut fields = Vec::new();
            loop {
                let name = self.expect_ident("field name")?;
                self.expect(&Token::Colon)?;
                let value = self.parse_expr()?;
                fields.push((name, value));
                if !self.eat(&Token::Comma) {
                    break;
                }
                if self.check(&Token::RBrace) {
                    break; // trailing comma
                }
            }
            Ok(StructInitFields::Named(fields))
        } else {
            let mut values = Vec::new();
            loop {
                values.push(self.parse_expr()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
                if self.check(&Token::RBrace) {
                    break;
                }
            }
            Ok(StructInitFields::Positional(values))
        }
    }

    fn mk_binary(&mut self, op: BinOp, left: Expr, right: Expr) -> Expr {
        let span = left.span.merge(right.span);
        self.mk_expr(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }
}
