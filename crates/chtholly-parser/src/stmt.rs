//! Statement and declaration parsing.

use chtholly_ast::{
    ClassDecl, EnumDecl, FieldDecl, FunctionDecl, LetStmt, MethodDecl, Param, Stmt, StmtKind,
    StructDecl, SwitchCase, SwitchStmt, VariantDecl,
};
use chtholly_lexer::Token;

use crate::{ParseResult, Parser};

impl Parser {
    pub(crate) fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span().start;

        let kind = match self.peek().map(|t| t.token.clone()) {
            Some(Token::Let) => {
                self.advance();
                let stmt = self.parse_let()?;
                self.expect(&Token::Semi)?;
                StmtKind::Let(stmt)
            }
            Some(Token::LBrace) => {
                self.advance();
                StmtKind::Block(self.parse_block_contents()?)
            }
            Some(Token::If) => {
                self.advance();
                self.parse_if()?
            }
            Some(Token::While) => {
                self.advance();
                self.parse_while()?
            }
            Some(Token::Do) => {
                self.advance();
                self.parse_do_while()?
            }
            Some(Token::For) => {
                self.advance();
                self.parse_for()?
            }
            Some(Token::Switch) => {
                self.advance();
                self.parse_switch()?
            }
            Some(Token::Break) => {
                self.advance();
                self.expect(&Token::Semi)?;
                StmtKind::Break
            }
            Some(Token::Continue) => {
                self.advance();
                self.expect(&Token::Semi)?;
                StmtKind::Continue
            }
            Some(Token::Fallthrough) => {
                self.advance();
                self.expect(&Token::Semi)?;
                StmtKind::Fallthrough
            }
            Some(Token::Return) => {
                self.advance();
                let value = if self.check(&Token::Semi) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(&Token::Semi)?;
                StmtKind::Return(value)
            }
            Some(Token::Fn) => {
                self.advance();
                StmtKind::Function(self.parse_function()?)
            }
            Some(Token::Struct) => {
                self.advance();
                StmtKind::Struct(self.parse_struct()?)
            }
            Some(Token::Class) => {
                self.advance();
                StmtKind::Class(self.parse_class()?)
            }
            Some(Token::Enum) => {
                self.advance();
                StmtKind::Enum(self.parse_enum()?)
            }
            Some(_) => {
                let expr = self.parse_expr()?;
                self.expect(&Token::Semi)?;
                StmtKind::Expression(expr)
            }
            None => return Err(self.unexpected("statement")),
        };

        Ok(Stmt {
            kind,
            span: self.span_from(start),
        })
    }

    /// `let` has been consumed; the trailing `;` is left to the caller.
    fn parse_let(&mut self) -> ParseResult<LetStmt> {
        let mutable = self.eat(&Token::Mut);
        let name = self.expect_ident("variable name")?;

        let ty = if self.eat(&Token::Colon) {
            Some(self.parse_type_name()?)
        } else {
            None
        };

        let init = if self.eat(&Token::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        if ty.is_none() && init.is_none() {
            return Err(self.unexpected("type annotation or initializer"));
        }

        Ok(LetStmt {
            name,
            mutable,
            ty,
            init,
        })
    }

    /// `{` has been consumed.
    pub(crate) fn parse_block_contents(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            statements.push(self.parse_stmt()?);
        }
        self.expect(&Token::RBrace)?;
        Ok(statements)
    }

    fn parse_if(&mut self) -> ParseResult<StmtKind> {
        self.expect(&Token::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(&Token::RParen)?;

        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch = if self.eat(&Token::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };

        Ok(StmtKind::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_while(&mut self) -> ParseResult<StmtKind> {
        self.expect(&Token::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(&Token::RParen)?;
        let body = Box::new(self.parse_stmt()?);

        Ok(StmtKind::While { condition, body })
    }

    fn parse_do_while(&mut self) -> ParseResult<StmtKind> {
        let body = Box::new(self.parse_stmt()?);
        self.expect(&Token::While)?;
        self.expect(&Token::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(&Token::RParen)?;
        self.expect(&Token::Semi)?;

        Ok(StmtKind::DoWhile { body, condition })
    }

    fn parse_for(&mut self) -> ParseResult<StmtKind> {
        self.expect(&Token::LParen)?;

        let init = if self.eat(&Token::Semi) {
            None
        } else if self.eat(&Token::Let) {
            let start = self.prev_span().start;
            let stmt = self.parse_let()?;
            self.expect(&Token::Semi)?;
            Some(Box::new(Stmt {
                kind: StmtKind::Let(stmt),
                span: self.span_from(start),
            }))
        } else {
            let start = self.current_span().start;
            let expr = self.parse_expr()?;
            self.expect(&Token::Semi)?;
            Some(Box::new(Stmt {
                kind: StmtKind::Expression(expr),
                span: self.span_from(start),
            }))
        };

        let condition = if self.check(&Token::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&Token::Semi)?;

        let step = if self.check(&Token::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&Token::RParen)?;

        let body = Box::new(self.parse_stmt()?);

        Ok(StmtKind::For {
            init,
            condition,
            step,
            body,
        })
    }

    fn parse_switch(&mut self) -> ParseResult<StmtKind> {
        self.expect(&Token::LParen)?;
        let discriminant = self.parse_expr()?;
        self.expect(&Token::RParen)?;
        self.expect(&Token::LBrace)?;

        let mut cases = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            let start = self.current_span().start;
            let value = if self.eat(&Token::Case) {
                Some(self.parse_expr()?)
            } else if self.eat(&Token::Default) {
                None
            } else {
                return Err(self.unexpected("case or default"));
            };
            self.expect(&Token::Colon)?;
            let body = Box::new(self.parse_stmt()?);
            cases.push(SwitchCase {
                value,
                body,
                span: self.span_from(start),
            });
        }
        self.expect(&Token::RBrace)?;

        Ok(StmtKind::Switch(SwitchStmt {
            discriminant,
            cases,
        }))
    }

    /// `fn` has been consumed.
    pub(crate) fn parse_function(&mut self) -> ParseResult<FunctionDecl> {
        let name = self.expect_ident("function name")?;

        self.expect(&Token::LParen)?;
        let params = self.parse_params()?;
        self.expect(&Token::RParen)?;

        let ret = if self.eat(&Token::Colon) {
            Some(self.parse_type_name()?)
        } else {
            None
        };

        self.expect(&Token::LBrace)?;
        let body = self.parse_block_contents()?;

        Ok(FunctionDecl {
            name,
            params,
            ret,
            body,
        })
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();
        if self.check(&Token::RParen) {
            return Ok(params);
        }
        loop {
            let mutable = self.eat(&Token::Mut);
            let name = self.expect_ident("parameter name")?;
            self.expect(&Token::Colon)?;
            let ty = self.parse_type_name()?;
            params.push(Param { name, ty, mutable });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(params)
    }

    fn parse_struct(&mut self) -> ParseResult<StructDecl> {
        let name = self.expect_ident("struct name")?;
        self.expect(&Token::LBrace)?;

        let mut fields = Vec::new();
        while self.eat(&Token::Let) {
            fields.push(self.parse_field()?);
        }
        self.expect(&Token::RBrace)?;

        Ok(StructDecl { name, fields })
    }

    fn parse_field(&mut self) -> ParseResult<FieldDecl> {
        let mutable = self.eat(&Token::Mut);
        let name = self.expect_ident("field name")?;
        self.expect(&Token::Colon)?;
        let ty = self.parse_type_name()?;
        self.expect(&Token::Semi)?;
        Ok(FieldDecl { name, ty, mutable })
    }

    fn parse_class(&mut self) -> ParseResult<ClassDecl> {
        let name = self.expect_ident("class name")?;
        self.expect(&Token::LBrace)?;

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        loop {
            if self.eat(&Token::Let) {
                fields.push(self.parse_field()?);
            } else if self.eat(&Token::Fn) {
                methods.push(MethodDecl {
                    func: self.parse_function()?,
                    mutates: false,
                });
            } else if self.check(&Token::Mut) {
                // `mut fn ...` — a mutating method
                self.advance();
                self.expect(&Token::Fn)?;
                methods.push(MethodDecl {
                    func: self.parse_function()?,
                    mutates: true,
                });
            } else {
                break;
            }
        }
        self.expect(&Token::RBrace)?;

        Ok(ClassDecl {
            name,
            fields,
            methods,
        })
    }

    fn parse_enum(&mut self) -> ParseResult<EnumDecl> {
        let name = self.expect_ident("enum name")?;
        self.expect(&Token::LBrace)?;

        let mut variants = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            let vname = self.expect_ident("variant name")?;
            let mut payload = Vec::new();
            if self.eat(&Token::LParen) {
                loop {
                    payload.push(self.parse_type_name()?);
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                self.expect(&Token::RParen)?;
            }
            variants.push(VariantDecl {
                name: vname,
                payload,
            });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBrace)?;

        Ok(EnumDecl { name, variants })
    }
}
