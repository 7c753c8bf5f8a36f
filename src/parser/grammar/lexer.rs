//! Case-insensitive SQL tokenizer built on nom.
//!
//! Keywords are matched case-insensitively and keep their source spelling in
//! [`Token::text`]. Whitespace, `--` / `#` line comments and `/* */` block comments
//! are skipped.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{is_not, tag, take_until, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace1},
    combinator::{opt, recognize, value},
    multi::many0,
    sequence::pair,
};

use super::stream::TokenStream;
use crate::error::{SqlError, SqlResult};

/// Words the grammar reserves. Matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    All,
    And,
    As,
    Asc,
    Between,
    By,
    Case,
    Cast,
    Cross,
    Desc,
    Distinct,
    Else,
    End,
    Except,
    Exists,
    False,
    From,
    Full,
    Group,
    Having,
    In,
    Inner,
    Intersect,
    Is,
    Join,
    Left,
    Like,
    Limit,
    Natural,
    Not,
    Null,
    Offset,
    On,
    Or,
    Order,
    Outer,
    Over,
    Right,
    Select,
    Then,
    True,
    Union,
    Using,
    When,
    Where,
    With,
}

impl Keyword {
    pub fn lookup(word: &str) -> Option<Self> {
        let kw = match word.to_ascii_uppercase().as_str() {
            "ALL" => Keyword::All,
            "AND" => Keyword::And,
            "AS" => Keyword::As,
            "ASC" => Keyword::Asc,
            "BETWEEN" => Keyword::Between,
            "BY" => Keyword::By,
            "CASE" => Keyword::Case,
            "CAST" => Keyword::Cast,
            "CROSS" => Keyword::Cross,
            "DESC" => Keyword::Desc,
            "DISTINCT" => Keyword::Distinct,
            "ELSE" => Keyword::Else,
            "END" => Keyword::End,
            "EXCEPT" => Keyword::Except,
            "EXISTS" => Keyword::Exists,
            "FALSE" => Keyword::False,
            "FROM" => Keyword::From,
            "FULL" => Keyword::Full,
            "GROUP" => Keyword::Group,
            "HAVING" => Keyword::Having,
            "IN" => Keyword::In,
            "INNER" => Keyword::Inner,
            "INTERSECT" => Keyword::Intersect,
            "IS" => Keyword::Is,
            "JOIN" => Keyword::Join,
            "LEFT" => Keyword::Left,
            "LIKE" => Keyword::Like,
            "LIMIT" => Keyword::Limit,
            "NATURAL" => Keyword::Natural,
            "NOT" => Keyword::Not,
            "NULL" => Keyword::Null,
            "OFFSET" => Keyword::Offset,
            "ON" => Keyword::On,
            "OR" => Keyword::Or,
            "ORDER" => Keyword::Order,
            "OUTER" => Keyword::Outer,
            "OVER" => Keyword::Over,
            "RIGHT" => Keyword::Right,
            "SELECT" => Keyword::Select,
            "THEN" => Keyword::Then,
            "TRUE" => Keyword::True,
            "UNION" => Keyword::Union,
            "USING" => Keyword::Using,
            "WHEN" => Keyword::When,
            "WHERE" => Keyword::Where,
            "WITH" => Keyword::With,
            _ => return None,
        };
        Some(kw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    NotEq,
    BangEq,
    LtEq,
    GtEq,
    Concat,
    Eq,
    Lt,
    Gt,
    Comma,
    Dot,
    LParen,
    RParen,
    Star,
    Semicolon,
    Plus,
    Minus,
    Slash,
    Percent,
}

impl Symbol {
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Symbol::Plus
                | Symbol::Minus
                | Symbol::Star
                | Symbol::Slash
                | Symbol::Percent
                | Symbol::Concat
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Symbol::Eq
                | Symbol::NotEq
                | Symbol::BangEq
                | Symbol::Lt
                | Symbol::LtEq
                | Symbol::Gt
                | Symbol::GtEq
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Ident,
    /// Backtick or double-quoted identifier; never a keyword.
    QuotedIdent,
    Number,
    String,
    Symbol(Symbol),
    Eof,
}

/// A positioned token. `text` is the identifier spelling, the unescaped string body,
/// the number text or the symbol itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub offset: usize,
    pub len: usize,
}

impl Token {
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.kind == TokenKind::Keyword(kw)
    }

    pub fn is_symbol(&self, sym: Symbol) -> bool {
        self.kind == TokenKind::Symbol(sym)
    }

    /// Identifier-like token usable as a name.
    pub fn is_name(&self) -> bool {
        matches!(self.kind, TokenKind::Ident | TokenKind::QuotedIdent)
    }

    /// Text shown in error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => self.text.clone(),
        }
    }
}

/// 1-based line and column of a byte offset.
pub fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut end = offset.min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    let before = &source[..end];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}

pub(crate) fn error_at(source: &str, offset: usize, found: &str, message: &str) -> SqlError {
    let (line, column) = line_column(source, offset);
    SqlError::parse(line, column, found, message)
}

fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(alt((tag("--"), tag("#"))), opt(is_not("\r\n")))).parse(input)
}

fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize((tag("/*"), take_until("*/"), tag("*/"))).parse(input)
}

fn trivia(input: &str) -> IResult<&str, ()> {
    value((), many0(alt((multispace1, line_comment, block_comment)))).parse(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '$'),
    ))
    .parse(input)
}

fn number(input: &str) -> IResult<&str, &str> {
    recognize(pair(digit1, opt(pair(char('.'), digit0)))).parse(input)
}

fn symbol(input: &str) -> IResult<&str, Symbol> {
    alt((
        value(Symbol::NotEq, tag("<>")),
        value(Symbol::BangEq, tag("!=")),
        value(Symbol::LtEq, tag("<=")),
        value(Symbol::GtEq, tag(">=")),
        value(Symbol::Concat, tag("||")),
        value(Symbol::Eq, char('=')),
        value(Symbol::Lt, char('<')),
        value(Symbol::Gt, char('>')),
        value(Symbol::Comma, char(',')),
        value(Symbol::Dot, char('.')),
        value(Symbol::LParen, char('(')),
        value(Symbol::RParen, char(')')),
        value(Symbol::Star, char('*')),
        value(Symbol::Semicolon, char(';')),
        value(Symbol::Plus, char('+')),
        value(Symbol::Minus, char('-')),
        value(Symbol::Slash, char('/')),
        value(Symbol::Percent, char('%')),
    ))
    .parse(input)
}

/// Quoted identifier; the quote character is escaped by doubling it.
fn quoted_ident(quote: char) -> impl Fn(&str) -> IResult<&str, String> {
    move |input: &str| {
        let (mut rest, _) = char(quote).parse(input)?;
        let mut out = String::new();
        loop {
            let (r, chunk) = take_while(|c: char| c != quote).parse(rest)?;
            out.push_str(chunk);
            let (r, _) = char(quote).parse(r)?;
            match r.strip_prefix(quote) {
                Some(after) => {
                    out.push(quote);
                    rest = after;
                }
                None => return Ok((r, out)),
            }
        }
    }
}

/// Single-quoted string. `''`, `\'` and `\\` are unescaped; other backslash pairs are kept.
fn string_literal(input: &str) -> IResult<&str, String> {
    let (mut rest, _) = char('\'').parse(input)?;
    let mut out = String::new();
    loop {
        let (r, chunk) = take_while(|c: char| c != '\'' && c != '\\').parse(rest)?;
        out.push_str(chunk);
        if let Some(after) = r.strip_prefix("''") {
            out.push('\'');
            rest = after;
        } else if let Some(after) = r.strip_prefix('\'') {
            return Ok((after, out));
        } else {
            let (r, _) = char('\\').parse(r)?;
            let mut chars = r.chars();
            match chars.next() {
                // LIKE wildcards keep their escape.
                Some(c @ ('%' | '_')) => {
                    out.push('\\');
                    out.push(c);
                }
                Some(c) => out.push(unescape_char(c)),
                None => {
                    return Err(nom::Err::Error(nom::error::Error::new(
                        r,
                        nom::error::ErrorKind::Eof,
                    )));
                }
            }
            rest = chars.as_str();
        }
    }
}

/// MySQL backslash escapes; any other escaped character stands for itself.
fn unescape_char(c: char) -> char {
    match c {
        '0' => '\0',
        'a' => '\u{7}',
        'b' => '\u{8}',
        'f' => '\u{c}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'Z' => '\u{1a}',
        other => other,
    }
}

/// Tokenize `source` into `stream`, which must be empty. An `Eof` token is always appended.
pub fn tokenize(source: &str, stream: &mut TokenStream) -> SqlResult<()> {
    let offset_of = |rest: &str| source.len() - rest.len();
    let mut rest = source;

    loop {
        if let Ok((r, _)) = trivia(rest) {
            rest = r;
        }
        let start = offset_of(rest);
        if rest.is_empty() {
            stream.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                offset: start,
                len: 0,
            });
            return Ok(());
        }

        let (r, kind, text) = if rest.starts_with("/*") {
            return Err(error_at(source, start, "/*", "unterminated block comment"));
        } else if rest.starts_with('\'') {
            match string_literal(rest) {
                Ok((r, s)) => (r, TokenKind::String, s),
                Err(_) => return Err(error_at(source, start, "'", "unterminated string literal")),
            }
        } else if rest.starts_with('`') || rest.starts_with('"') {
            let quote = if rest.starts_with('`') { '`' } else { '"' };
            match quoted_ident(quote)(rest) {
                Ok((r, s)) => (r, TokenKind::QuotedIdent, s),
                Err(_) => {
                    return Err(error_at(
                        source,
                        start,
                        &quote.to_string(),
                        "unterminated quoted identifier",
                    ));
                }
            }
        } else if let Ok((r, n)) = number(rest) {
            (r, TokenKind::Number, n.to_string())
        } else if let Ok((r, w)) = word(rest) {
            let kind = match Keyword::lookup(w) {
                Some(kw) => TokenKind::Keyword(kw),
                None => TokenKind::Ident,
            };
            (r, kind, w.to_string())
        } else if let Ok((r, sym)) = symbol(rest) {
            (r, TokenKind::Symbol(sym), rest[..rest.len() - r.len()].to_string())
        } else {
            let found: String = rest.chars().take(1).collect();
            return Err(error_at(source, start, &found, "unexpected character"));
        };

        stream.push(Token {
            kind,
            text,
            offset: start,
            len: rest.len() - r.len(),
        });
        rest = r;
    }
}
