//! Token buffer with a cursor.

use super::lexer::{Keyword, Symbol, Token, TokenKind};

/// Tokens of one input plus the parser position. The buffer keeps its capacity across
/// [`reset`](Self::reset) so a cached session does not reallocate per call.
#[derive(Debug, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    pub fn reset(&mut self) {
        self.tokens.clear();
        self.pos = 0;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Current token; the trailing `Eof` once input is exhausted.
    pub fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    pub fn peek_nth(&self, n: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + n).min(last)]
    }

    pub fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    pub fn at_keyword(&self, kw: Keyword) -> bool {
        self.peek().is_keyword(kw)
    }

    pub fn at_symbol(&self, sym: Symbol) -> bool {
        self.peek().is_symbol(sym)
    }

    pub fn eat_keyword(&mut self, kw: Keyword) -> Option<Token> {
        self.at_keyword(kw).then(|| self.advance())
    }

    pub fn eat_symbol(&mut self, sym: Symbol) -> Option<Token> {
        self.at_symbol(sym).then(|| self.advance())
    }
}
