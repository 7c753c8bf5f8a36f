//! Concrete syntax tree produced by the grammar rules.

use super::lexer::{Keyword, Symbol, Token};

/// Grammar rule that produced a [`SyntaxNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    SelectStatement,
    QueryExpression,
    SetOperator,
    QueryTerm,
    QuerySpecification,
    SelectList,
    SelectItem,
    Alias,
    FromClause,
    TableSource,
    TableName,
    JoinClause,
    WhereClause,
    GroupByClause,
    HavingClause,
    OrderByClause,
    OrderItem,
    LimitClause,
    OrExpr,
    AndExpr,
    Predicate,
    ParenExpr,
    Subquery,
    ExprList,
    CaseExpr,
    WhenClause,
    ElseClause,
    FunctionCall,
    ColumnRef,
    Literal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxElement {
    Node(SyntaxNode),
    Token(Token),
}

/// Interior CST node: the rule, its source offset and every child in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    pub rule: Rule,
    pub offset: usize,
    pub children: Vec<SyntaxElement>,
}

impl SyntaxNode {
    pub fn new(rule: Rule, offset: usize) -> Self {
        Self {
            rule,
            offset,
            children: Vec::new(),
        }
    }

    pub fn push_node(&mut self, node: SyntaxNode) {
        self.children.push(SyntaxElement::Node(node));
    }

    pub fn push_token(&mut self, token: Token) {
        self.children.push(SyntaxElement::Token(token));
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter_map(|c| match c {
            SyntaxElement::Node(n) => Some(n),
            SyntaxElement::Token(_) => None,
        })
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.children.iter().filter_map(|c| match c {
            SyntaxElement::Token(t) => Some(t),
            SyntaxElement::Node(_) => None,
        })
    }

    pub fn child(&self, rule: Rule) -> Option<&SyntaxNode> {
        self.nodes().find(|n| n.rule == rule)
    }

    pub fn children_of(&self, rule: Rule) -> impl Iterator<Item = &SyntaxNode> {
        self.nodes().filter(move |n| n.rule == rule)
    }

    pub fn has_keyword(&self, kw: Keyword) -> bool {
        self.tokens().any(|t| t.is_keyword(kw))
    }

    pub fn has_symbol(&self, sym: Symbol) -> bool {
        self.tokens().any(|t| t.is_symbol(sym))
    }

    /// Identifier tokens (plain or quoted) among the direct children.
    pub fn names(&self) -> impl Iterator<Item = &Token> {
        self.tokens().filter(|t| t.is_name())
    }

    /// Render the tree as an indented outline, one element per line.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(0, &mut out);
        out
    }

    fn write_outline(&self, depth: usize, out: &mut String) {
        out.push_str(&format!("{}{:?}\n", "  ".repeat(depth), self.rule));
        for child in &self.children {
            match child {
                SyntaxElement::Node(n) => n.write_outline(depth + 1, out),
                SyntaxElement::Token(t) => {
                    out.push_str(&format!("{}{:?} {:?}\n", "  ".repeat(depth + 1), t.kind, t.text))
                }
            }
        }
    }
}
