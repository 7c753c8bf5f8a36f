//! Hand-written grammar front-end: nom tokenizer, recursive-descent rules and a
//! visitor from the concrete syntax tree to the query model.

pub mod lexer;
pub mod rules;
pub mod stream;
pub mod tree;
pub mod visitor;

pub use lexer::{Keyword, Symbol, Token, TokenKind, tokenize};
pub use rules::{GrammarParser, MAX_DEPTH};
pub use stream::TokenStream;
pub use tree::{Rule, SyntaxElement, SyntaxNode};
pub use visitor::ModelVisitor;
