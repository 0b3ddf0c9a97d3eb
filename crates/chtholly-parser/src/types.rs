//! Type annotation parsing.

use chtholly_ast::{Span, Spanned, TypeName};
use chtholly_lexer::Token;

use crate::{ParseResult, Parser};

impl Parser {
    /// Parse a type annotation: `&mut T`, `&T`, or a base type with any
    /// number of `[n]` / `[]` array suffixes.
    pub(crate) fn parse_type_name(&mut self) -> ParseResult<Spanned<TypeName>> {
        let start = self.current_span().start;

        if self.eat(&Token::Amp) {
            let mutable = self.eat(&Token::Mut);
            let inner = self.parse_type_name()?;
            let span = self.span_from(start);
            return Ok(Spanned::new(
                TypeName::Reference {
                    inner: Box::new(inner),
                    mutable,
                },
                span,
            ));
        }

        let base = self.parse_base_type()?;
        let mut ty = base;

        while self.check(&Token::LBracket) {
            self.advance();
            let size = match self.peek() {
                Some(tok) => match tok.token {
                    Token::Int(n) => {
                        self.advance();
                        Some(n as u64)
                    }
                    Token::RBracket => None,
                    _ => return Err(self.unexpected("array size or ]")),
                },
                None => return Err(self.unexpected("array size or ]")),
            };
            self.expect(&Token::RBracket)?;
            let span = self.span_from(start);
            ty = Spanned::new(
                TypeName::Array {
                    element: Box::new(ty),
                    size,
                },
                span,
            );
        }

        Ok(ty)
    }

    fn parse_base_type(&mut self) -> ParseResult<Spanned<TypeName>> {
        let tok = self.peek().ok_or_else(|| self.unexpected("type"))?;
        let span = Span::new(tok.span.start, tok.span.end);

        let name = match &tok.token {
            Token::I8 => "i8",
            Token::I16 => "i16",
            Token::I32 => "i32",
            Token::I64 => "i64",
            Token::U8 => "u8",
            Token::U16 => "u16",
            Token::U32 => "u32",
            Token::U64 => "u64",
            Token::F32 => "f32",
            Token::F64 => "f64",
            Token::Bool => "bool",
            Token::CharTy => "char",
            Token::StringTy => "string",
            Token::Void => "void",
            Token::Ident(name) => {
                let name = name.clone();
                self.advance();
                return Ok(Spanned::new(TypeName::Plain(name), span));
            }
            _ => return Err(self.unexpected("type")),
        };

        self.advance();
        Ok(Spanned::new(TypeName::Plain(name.to_string()), span))
    }
}
