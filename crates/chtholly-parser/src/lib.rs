//! Chtholly Parser
//!
//! Recursive descent parser producing the `chtholly-ast` tree from a token
//! stream. Uses predictive parsing with single-token lookahead.

mod expr;
mod stmt;
mod types;

#[cfg(test)]
mod parser_tests;

use thiserror::Error;
use chtholly_ast::{Expr, ExprId, ExprKind, Program, Span, Spanned};
use chtholly_lexer::{SpannedToken, Token};

/// Error type for parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Unexpected token encountered during parsing
    #[error("Unexpected token {found} at {span:?}, expected {expected}")]
    UnexpectedToken {
        /// The token that was found
        found: Token,
        /// Source location of the unexpected token
        span: std::ops::Range<usize>,
        /// Description of what was expected
        expected: String,
    },
    /// Unexpected end of file while parsing
    #[error("Unexpected end of file")]
    UnexpectedEof {
        /// Location where EOF was encountered
        span: std::ops::Range<usize>,
    },
    /// The target of an assignment is not a place expression
    #[error("Invalid assignment target at {span:?}")]
    InvalidAssignTarget { span: std::ops::Range<usize> },
    /// Source text failed to tokenize
    #[error("Invalid token at position {position}")]
    Lex { position: usize },
}

impl ParseError {
    /// Get the span associated with this error, if available
    pub fn span(&self) -> Option<std::ops::Range<usize>> {
        match self {
            ParseError::UnexpectedToken { span, .. } => Some(span.clone()),
            ParseError::UnexpectedEof { span } => Some(span.clone()),
            ParseError::InvalidAssignTarget { span } => Some(span.clone()),
            ParseError::Lex { position } => Some(*position..*position + 1),
        }
    }
}

pub(crate) type ParseResult<T> = Result<T, ParseError>;

/// Recursive descent parser for Chtholly source code.
pub struct Parser {
    /// Token stream to parse
    tokens: Vec<SpannedToken>,
    /// Current position in the token stream
    pos: usize,
    /// Next expression id to hand out
    next_expr_id: u32,
}

impl Parser {
    /// Creates a new parser from a token stream.
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        Self {
            tokens,
            pos: 0,
            next_expr_id: 0,
        }
    }

    /// Parses a complete program (top-level statements).
    ///
    /// This is the main entry point for parsing. It consumes all tokens and
    /// produces a Program with all top-level statements in source order.
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.parse_stmt()?);
        }

        Ok(Program { statements })
    }

    // === Helper methods ===

    pub(crate) fn mk_expr(&mut self, kind: ExprKind, span: Span) -> Expr {
        let id = ExprId(self.next_expr_id);
        self.next_expr_id += 1;
        Expr { id, kind, span }
    }

    pub(crate) fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn peek_next(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos + 1)
    }

    pub(crate) fn advance(&mut self) -> Option<SpannedToken> {
        if self.is_at_end() {
            None
        } else {
            let tok = self.tokens[self.pos].clone();
            self.pos += 1;
            Some(tok)
        }
    }

    pub(crate) fn check(&self, expected: &Token) -> bool {
        self.peek().map(|t| &t.token == expected).unwrap_or(false)
    }

    /// Consume the token if it matches, returning whether it did.
    pub(crate) fn eat(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, expected: &Token) -> ParseResult<SpannedToken> {
        if self.check(expected) {
            self.advance().ok_or(ParseError::UnexpectedEof {
                span: self.current_span(),
            })
        } else {
            Err(ParseError::UnexpectedToken {
                found: self
                    .peek()
                    .map(|t| t.token.clone())
                    .unwrap_or(Token::Ident("EOF".into())),
                span: self.current_span(),
                expected: format!("{}", expected),
            })
        }
    }

    /// Consume an identifier token, returning its spanned name.
    pub(crate) fn expect_ident(&mut self, what: &str) -> ParseResult<Spanned<String>> {
        match self.peek() {
            Some(SpannedToken {
                token: Token::Ident(name),
                span,
            }) => {
                let spanned = Spanned::new(name.clone(), Span::new(span.start, span.end));
                self.advance();
                Ok(spanned)
            }
            Some(tok) => Err(ParseError::UnexpectedToken {
                found: tok.token.clone(),
                span: tok.span.clone(),
                expected: what.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof {
                span: self.current_span(),
            }),
        }
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn current_span(&self) -> std::ops::Range<usize> {
        self.peek()
            .map(|t| t.span.clone())
            .unwrap_or(self.prev_span())
    }

    pub(crate) fn prev_span(&self) -> std::ops::Range<usize> {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span.clone()
        } else {
            0..0
        }
    }

    pub(crate) fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_span().end)
    }

    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(tok) => ParseError::UnexpectedToken {
                found: tok.token.clone(),
                span: tok.span.clone(),
                expected: expected.to_string(),
            },
            None => ParseError::UnexpectedEof {
                span: self.current_span(),
            },
        }
    }
}

/// Parses Chtholly source code into an AST.
///
/// Convenience function that performs both lexing and parsing in one step.
///
/// # Examples
///
/// ```
/// use chtholly_parser::parse;
///
/// let source = "fn main(): void { let x: i32 = 10; }";
/// let program = parse(source).unwrap();
/// assert_eq!(program.statements.len(), 1);
/// ```
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let tokens = chtholly_lexer::tokenize(source).map_err(|e| match e {
        chtholly_lexer::LexError::InvalidToken(position) => ParseError::Lex { position },
    })?;

    let mut parser = Parser::new(tokens);
    parser.parse_program()
}
