//! Recursive-descent rules producing the concrete syntax tree.
//!
//! ```text
//! select_statement    := query_expression [';'] EOF
//! query_expression    := query_term { set_operator query_term } [order_by] [limit]
//! query_term          := '(' query_expression ')' | query_specification
//! query_specification := SELECT [DISTINCT | ALL] select_list
//!                        [FROM table_source { join_clause }]
//!                        [WHERE expr] [GROUP BY expr {, expr}] [HAVING expr]
//! expr                := and_expr { OR and_expr }
//! and_expr            := predicate { AND predicate }
//! predicate           := [NOT] EXISTS subquery
//!                      | operand [ cmp operand | IS [NOT] NULL | [NOT] LIKE operand
//!                                | [NOT] IN (subquery | expr_list)
//!                                | [NOT] BETWEEN operand AND operand ]
//! ```

use super::lexer::{Keyword, Symbol, Token, TokenKind, error_at};
use super::stream::TokenStream;
use super::tree::{Rule, SyntaxNode};
use crate::error::{SqlError, SqlResult};

/// Deepest nesting of queries and parenthesized expressions accepted.
pub const MAX_DEPTH: usize = 64;

pub struct GrammarParser<'a> {
    stream: &'a mut TokenStream,
    source: &'a str,
    depth: usize,
}

impl<'a> GrammarParser<'a> {
    pub fn new(stream: &'a mut TokenStream, source: &'a str) -> Self {
        Self {
            stream,
            source,
            depth: 0,
        }
    }

    fn error(&self, message: &str) -> SqlError {
        let token = self.stream.peek();
        error_at(self.source, token.offset, &token.describe(), message)
    }

    fn offset(&self) -> usize {
        self.stream.peek().offset
    }

    fn enter(&mut self) -> SqlResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("query nested too deeply"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn expect_keyword(&mut self, kw: Keyword, message: &str) -> SqlResult<Token> {
        self.stream
            .eat_keyword(kw)
            .ok_or_else(|| self.error(message))
    }

    fn expect_symbol(&mut self, sym: Symbol, message: &str) -> SqlResult<Token> {
        self.stream.eat_symbol(sym).ok_or_else(|| self.error(message))
    }

    fn expect_name(&mut self, message: &str) -> SqlResult<Token> {
        if self.stream.peek().is_name() {
            Ok(self.stream.advance())
        } else {
            Err(self.error(message))
        }
    }

    pub fn select_statement(&mut self) -> SqlResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::SelectStatement, self.offset());

        let first = self.stream.peek();
        if first.is_keyword(Keyword::With) {
            return Err(SqlError::unsupported("WITH (common table expressions)"));
        }
        if !first.is_keyword(Keyword::Select) && !first.is_symbol(Symbol::LParen) {
            if first.kind == TokenKind::Ident {
                return Err(SqlError::unsupported(format!(
                    "{} statements",
                    first.text.to_uppercase()
                )));
            }
            return Err(self.error("expected SELECT"));
        }

        node.push_node(self.query_expression()?);
        if let Some(semi) = self.stream.eat_symbol(Symbol::Semicolon) {
            node.push_token(semi);
        }
        if !self.stream.at_eof() {
            return Err(self.error("unexpected input after end of statement"));
        }
        Ok(node)
    }

    fn query_expression(&mut self) -> SqlResult<SyntaxNode> {
        self.enter()?;
        let mut node = SyntaxNode::new(Rule::QueryExpression, self.offset());
        node.push_node(self.query_term()?);

        while [Keyword::Union, Keyword::Intersect, Keyword::Except]
            .iter()
            .any(|kw| self.stream.at_keyword(*kw))
        {
            let mut op = SyntaxNode::new(Rule::SetOperator, self.offset());
            op.push_token(self.stream.advance());
            if let Some(q) = self
                .stream
                .eat_keyword(Keyword::All)
                .or_else(|| self.stream.eat_keyword(Keyword::Distinct))
            {
                op.push_token(q);
            }
            node.push_node(op);
            node.push_node(self.query_term()?);
        }

        if self.stream.at_keyword(Keyword::Order) {
            node.push_node(self.order_by_clause()?);
        }
        if self.stream.at_keyword(Keyword::Limit) || self.stream.at_keyword(Keyword::Offset) {
            node.push_node(self.limit_clause()?);
        }
        self.leave();
        Ok(node)
    }

    fn query_term(&mut self) -> SqlResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::QueryTerm, self.offset());
        if let Some(open) = self.stream.eat_symbol(Symbol::LParen) {
            node.push_token(open);
            node.push_node(self.query_expression()?);
            node.push_token(self.expect_symbol(Symbol::RParen, "expected ')' after query")?);
        } else if self.stream.at_keyword(Keyword::Select) {
            node.push_node(self.query_specification()?);
        } else if self.stream.at_keyword(Keyword::With) {
            return Err(SqlError::unsupported("WITH (common table expressions)"));
        } else {
            return Err(self.error("expected SELECT or '('"));
        }
        Ok(node)
    }

    fn query_specification(&mut self) -> SqlResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::QuerySpecification, self.offset());
        node.push_token(self.expect_keyword(Keyword::Select, "expected SELECT")?);

        if let Some(distinct) = self.stream.eat_keyword(Keyword::Distinct) {
            node.push_token(distinct);
            if self.stream.at_keyword(Keyword::On) {
                return Err(SqlError::unsupported("DISTINCT ON"));
            }
        } else if let Some(all) = self.stream.eat_keyword(Keyword::All) {
            node.push_token(all);
        }

        node.push_node(self.select_list()?);

        if self.stream.at_keyword(Keyword::From) {
            node.push_node(self.from_clause()?);
            if self.stream.at_symbol(Symbol::Comma) {
                return Err(SqlError::unsupported("comma-separated FROM tables"));
            }
            while self.at_join() {
                node.push_node(self.join_clause()?);
            }
        }
        if self.stream.at_keyword(Keyword::Where) {
            node.push_node(self.keyword_clause(Rule::WhereClause)?);
        }
        if self.stream.at_keyword(Keyword::Group) {
            node.push_node(self.group_by_clause()?);
        }
        if self.stream.at_keyword(Keyword::Having) {
            node.push_node(self.keyword_clause(Rule::HavingClause)?);
        }
        Ok(node)
    }

    fn select_list(&mut self) -> SqlResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::SelectList, self.offset());
        loop {
            node.push_node(self.select_item()?);
            match self.stream.eat_symbol(Symbol::Comma) {
                Some(comma) => node.push_token(comma),
                None => break,
            }
        }
        Ok(node)
    }

    fn select_item(&mut self) -> SqlResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::SelectItem, self.offset());
        node.push_node(self.expr()?);
        if self.at_alias() {
            node.push_node(self.alias()?);
        }
        Ok(node)
    }

    fn at_alias(&self) -> bool {
        self.stream.at_keyword(Keyword::As) || self.stream.peek().is_name()
    }

    fn alias(&mut self) -> SqlResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::Alias, self.offset());
        if let Some(kw) = self.stream.eat_keyword(Keyword::As) {
            node.push_token(kw);
        }
        node.push_token(self.expect_name("expected alias name")?);
        Ok(node)
    }

    fn from_clause(&mut self) -> SqlResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::FromClause, self.offset());
        node.push_token(self.expect_keyword(Keyword::From, "expected FROM")?);
        node.push_node(self.table_source()?);
        Ok(node)
    }

    fn table_source(&mut self) -> SqlResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::TableSource, self.offset());
        if let Some(open) = self.stream.eat_symbol(Symbol::LParen) {
            node.push_token(open);
            node.push_node(self.query_expression()?);
            node.push_token(
                self.expect_symbol(Symbol::RParen, "expected ')' after derived table")?,
            );
            if !self.at_alias() {
                return Err(self.error("derived table needs an alias"));
            }
            node.push_node(self.alias()?);
            return Ok(node);
        }

        let mut name = SyntaxNode::new(Rule::TableName, self.offset());
        name.push_token(self.expect_name("expected table name")?);
        while let Some(dot) = self.stream.eat_symbol(Symbol::Dot) {
            name.push_token(dot);
            name.push_token(self.expect_name("expected name after '.'")?);
        }
        node.push_node(name);

        if self.stream.at_symbol(Symbol::LParen) {
            return Err(SqlError::unsupported("table functions"));
        }
        if self.at_alias() {
            node.push_node(self.alias()?);
        }
        Ok(node)
    }

    fn at_join(&self) -> bool {
        [
            Keyword::Join,
            Keyword::Inner,
            Keyword::Left,
            Keyword::Right,
            Keyword::Full,
            Keyword::Cross,
            Keyword::Natural,
        ]
        .iter()
        .any(|kw| self.stream.at_keyword(*kw))
    }

    fn join_clause(&mut self) -> SqlResult<SyntaxNode> {
        if self.stream.at_keyword(Keyword::Cross) {
            return Err(SqlError::unsupported("CROSS JOIN"));
        }
        if self.stream.at_keyword(Keyword::Natural) {
            return Err(SqlError::unsupported("NATURAL JOIN"));
        }

        let mut node = SyntaxNode::new(Rule::JoinClause, self.offset());
        if let Some(inner) = self.stream.eat_keyword(Keyword::Inner) {
            node.push_token(inner);
        } else if let Some(side) = self
            .stream
            .eat_keyword(Keyword::Left)
            .or_else(|| self.stream.eat_keyword(Keyword::Right))
            .or_else(|| self.stream.eat_keyword(Keyword::Full))
        {
            node.push_token(side);
            if let Some(outer) = self.stream.eat_keyword(Keyword::Outer) {
                node.push_token(outer);
            }
        }
        node.push_token(self.expect_keyword(Keyword::Join, "expected JOIN")?);
        node.push_node(self.table_source()?);

        if self.stream.at_keyword(Keyword::Using) {
            return Err(SqlError::unsupported("JOIN ... USING"));
        }
        node.push_token(self.expect_keyword(Keyword::On, "expected ON after joined table")?);
        node.push_node(self.expr()?);
        Ok(node)
    }

    /// WHERE / HAVING: keyword followed by one expression.
    fn keyword_clause(&mut self, rule: Rule) -> SqlResult<SyntaxNode> {
        let mut node = SyntaxNode::new(rule, self.offset());
        node.push_token(self.stream.advance());
        node.push_node(self.expr()?);
        Ok(node)
    }

    fn group_by_clause(&mut self) -> SqlResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::GroupByClause, self.offset());
        node.push_token(self.expect_keyword(Keyword::Group, "expected GROUP")?);
        node.push_token(self.expect_keyword(Keyword::By, "expected BY after GROUP")?);
        loop {
            node.push_node(self.expr()?);
            match self.stream.eat_symbol(Symbol::Comma) {
                Some(comma) => node.push_token(comma),
                None => break,
            }
        }
        Ok(node)
    }

    fn order_by_clause(&mut self) -> SqlResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::OrderByClause, self.offset());
        node.push_token(self.expect_keyword(Keyword::Order, "expected ORDER")?);
        node.push_token(self.expect_keyword(Keyword::By, "expected BY after ORDER")?);
        loop {
            let mut item = SyntaxNode::new(Rule::OrderItem, self.offset());
            item.push_node(self.expr()?);
            if let Some(dir) = self
                .stream
                .eat_keyword(Keyword::Asc)
                .or_else(|| self.stream.eat_keyword(Keyword::Desc))
            {
                item.push_token(dir);
            }
            node.push_node(item);
            match self.stream.eat_symbol(Symbol::Comma) {
                Some(comma) => node.push_token(comma),
                None => break,
            }
        }
        Ok(node)
    }

    /// `LIMIT n [OFFSET m]`, `LIMIT m, n` or `OFFSET m`.
    fn limit_clause(&mut self) -> SqlResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::LimitClause, self.offset());
        if let Some(limit) = self.stream.eat_keyword(Keyword::Limit) {
            node.push_token(limit);
            self.row_count(&mut node)?;
            if let Some(comma) = self.stream.eat_symbol(Symbol::Comma) {
                node.push_token(comma);
                self.row_count(&mut node)?;
            } else if let Some(offset) = self.stream.eat_keyword(Keyword::Offset) {
                node.push_token(offset);
                self.row_count(&mut node)?;
            }
        } else {
            node.push_token(self.expect_keyword(Keyword::Offset, "expected LIMIT or OFFSET")?);
            self.row_count(&mut node)?;
        }
        Ok(node)
    }

    fn row_count(&mut self, node: &mut SyntaxNode) -> SqlResult<()> {
        if let Some(minus) = self.stream.eat_symbol(Symbol::Minus) {
            node.push_token(minus);
        }
        if self.stream.peek().kind != TokenKind::Number {
            return Err(self.error("expected a row count"));
        }
        node.push_token(self.stream.advance());
        Ok(())
    }

    pub fn expr(&mut self) -> SqlResult<SyntaxNode> {
        self.enter()?;
        let node = self.chain(Rule::OrExpr, Keyword::Or)?;
        self.leave();
        Ok(node)
    }

    /// Left-to-right chain of one logical operator; a single operand is returned bare.
    fn chain(&mut self, rule: Rule, kw: Keyword) -> SqlResult<SyntaxNode> {
        let offset = self.offset();
        let first = match rule {
            Rule::OrExpr => self.chain(Rule::AndExpr, Keyword::And)?,
            _ => self.predicate()?,
        };
        if !self.stream.at_keyword(kw) {
            return Ok(first);
        }
        let mut node = SyntaxNode::new(rule, offset);
        node.push_node(first);
        while let Some(op) = self.stream.eat_keyword(kw) {
            node.push_token(op);
            let next = match rule {
                Rule::OrExpr => self.chain(Rule::AndExpr, Keyword::And)?,
                _ => self.predicate()?,
            };
            node.push_node(next);
        }
        Ok(node)
    }

    fn predicate(&mut self) -> SqlResult<SyntaxNode> {
        let offset = self.offset();
        let negated_exists = self.stream.at_keyword(Keyword::Not)
            && self.stream.peek_nth(1).is_keyword(Keyword::Exists);

        if self.stream.at_keyword(Keyword::Exists) || negated_exists {
            let mut node = SyntaxNode::new(Rule::Predicate, offset);
            if let Some(not) = self.stream.eat_keyword(Keyword::Not) {
                node.push_token(not);
            }
            node.push_token(self.stream.advance());
            node.push_node(self.subquery("expected '(' after EXISTS")?);
            return Ok(node);
        }
        if self.stream.at_keyword(Keyword::Not) {
            return Err(SqlError::unsupported("NOT over an arbitrary expression"));
        }

        let left = self.operand()?;
        let mut node = SyntaxNode::new(Rule::Predicate, offset);
        let next = self.stream.peek().clone();

        if let TokenKind::Symbol(sym) = next.kind {
            if sym.is_comparison() {
                node.push_node(left);
                node.push_token(self.stream.advance());
                node.push_node(self.operand()?);
                return Ok(node);
            }
            return Ok(left);
        }

        if next.is_keyword(Keyword::Is) {
            node.push_node(left);
            node.push_token(self.stream.advance());
            if let Some(not) = self.stream.eat_keyword(Keyword::Not) {
                node.push_token(not);
            }
            node.push_token(self.expect_keyword(Keyword::Null, "expected NULL after IS")?);
            return Ok(node);
        }

        let is_negated_form = next.is_keyword(Keyword::Not)
            && [Keyword::Like, Keyword::In, Keyword::Between]
                .iter()
                .any(|kw| self.stream.peek_nth(1).is_keyword(*kw));
        let is_form = [Keyword::Like, Keyword::In, Keyword::Between]
            .iter()
            .any(|kw| next.is_keyword(*kw));
        if !is_negated_form && !is_form {
            if next.is_keyword(Keyword::Not) {
                return Err(self.error("expected LIKE, IN or BETWEEN after NOT"));
            }
            return Ok(left);
        }

        node.push_node(left);
        if let Some(not) = self.stream.eat_keyword(Keyword::Not) {
            node.push_token(not);
        }
        let op = self.stream.advance();
        let keyword = op.kind;
        node.push_token(op);
        match keyword {
            TokenKind::Keyword(Keyword::Like) => node.push_node(self.operand()?),
            TokenKind::Keyword(Keyword::In) => {
                if self.stream.peek_nth(1).is_keyword(Keyword::Select) {
                    node.push_node(self.subquery("expected '(' after IN")?);
                } else {
                    node.push_node(self.expr_list()?);
                }
            }
            _ => {
                node.push_node(self.operand()?);
                node.push_token(self.expect_keyword(Keyword::And, "expected AND in BETWEEN")?);
                node.push_node(self.operand()?);
            }
        }
        Ok(node)
    }

    fn subquery(&mut self, message: &str) -> SqlResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::Subquery, self.offset());
        node.push_token(self.expect_symbol(Symbol::LParen, message)?);
        node.push_node(self.query_expression()?);
        node.push_token(self.expect_symbol(Symbol::RParen, "expected ')' after subquery")?);
        Ok(node)
    }

    fn expr_list(&mut self) -> SqlResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::ExprList, self.offset());
        node.push_token(self.expect_symbol(Symbol::LParen, "expected '(' before value list")?);
        loop {
            node.push_node(self.expr()?);
            match self.stream.eat_symbol(Symbol::Comma) {
                Some(comma) => node.push_token(comma),
                None => break,
            }
        }
        node.push_token(self.expect_symbol(Symbol::RParen, "expected ')' after value list")?);
        Ok(node)
    }

    fn operand(&mut self) -> SqlResult<SyntaxNode> {
        let node = self.primary()?;
        if let TokenKind::Symbol(sym) = self.stream.peek().kind {
            if sym.is_arithmetic() {
                return Err(SqlError::unsupported("arithmetic operators"));
            }
        }
        Ok(node)
    }

    fn primary(&mut self) -> SqlResult<SyntaxNode> {
        let offset = self.offset();
        let token = self.stream.peek().clone();
        match token.kind {
            TokenKind::Number
            | TokenKind::String
            | TokenKind::Keyword(Keyword::True)
            | TokenKind::Keyword(Keyword::False)
            | TokenKind::Keyword(Keyword::Null) => {
                let mut node = SyntaxNode::new(Rule::Literal, offset);
                node.push_token(self.stream.advance());
                Ok(node)
            }
            TokenKind::Symbol(Symbol::Minus) => {
                if self.stream.peek_nth(1).kind != TokenKind::Number {
                    return Err(SqlError::unsupported("arithmetic operators"));
                }
                let mut node = SyntaxNode::new(Rule::Literal, offset);
                node.push_token(self.stream.advance());
                node.push_token(self.stream.advance());
                Ok(node)
            }
            TokenKind::Symbol(Symbol::Star) => {
                let mut node = SyntaxNode::new(Rule::ColumnRef, offset);
                node.push_token(self.stream.advance());
                Ok(node)
            }
            TokenKind::Symbol(Symbol::LParen) => {
                if self.stream.peek_nth(1).is_keyword(Keyword::Select) {
                    return self.subquery("expected '('");
                }
                let mut node = SyntaxNode::new(Rule::ParenExpr, offset);
                node.push_token(self.stream.advance());
                node.push_node(self.expr()?);
                if self.stream.at_symbol(Symbol::Comma) {
                    return Err(SqlError::unsupported("row value constructors"));
                }
                node.push_token(self.expect_symbol(Symbol::RParen, "expected ')'")?);
                Ok(node)
            }
            TokenKind::Keyword(Keyword::Case) => self.case_expr(),
            TokenKind::Keyword(Keyword::Cast) => Err(SqlError::unsupported("CAST")),
            TokenKind::Ident if self.stream.peek_nth(1).is_symbol(Symbol::LParen) => {
                self.function_call()
            }
            TokenKind::Ident | TokenKind::QuotedIdent => self.column_ref(),
            _ => Err(self.error("expected an expression")),
        }
    }

    fn column_ref(&mut self) -> SqlResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::ColumnRef, self.offset());
        node.push_token(self.expect_name("expected column name")?);
        while let Some(dot) = self.stream.eat_symbol(Symbol::Dot) {
            node.push_token(dot);
            if let Some(star) = self.stream.eat_symbol(Symbol::Star) {
                node.push_token(star);
                break;
            }
            node.push_token(self.expect_name("expected name after '.'")?);
        }
        Ok(node)
    }

    fn function_call(&mut self) -> SqlResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::FunctionCall, self.offset());
        node.push_token(self.expect_name("expected function name")?);
        node.push_token(self.expect_symbol(Symbol::LParen, "expected '('")?);
        if let Some(distinct) = self.stream.eat_keyword(Keyword::Distinct) {
            node.push_token(distinct);
        }
        if self.stream.at_symbol(Symbol::Star) {
            let mut star = SyntaxNode::new(Rule::ColumnRef, self.offset());
            star.push_token(self.stream.advance());
            node.push_node(star);
        } else if !self.stream.at_symbol(Symbol::RParen) {
            loop {
                node.push_node(self.expr()?);
                match self.stream.eat_symbol(Symbol::Comma) {
                    Some(comma) => node.push_token(comma),
                    None => break,
                }
            }
        }
        node.push_token(self.expect_symbol(Symbol::RParen, "expected ')' after arguments")?);
        if self.stream.at_keyword(Keyword::Over) {
            return Err(SqlError::unsupported("window functions (OVER)"));
        }
        Ok(node)
    }

    fn case_expr(&mut self) -> SqlResult<SyntaxNode> {
        let mut node = SyntaxNode::new(Rule::CaseExpr, self.offset());
        node.push_token(self.expect_keyword(Keyword::Case, "expected CASE")?);
        if !self.stream.at_keyword(Keyword::When) {
            node.push_node(self.expr()?);
        }
        if !self.stream.at_keyword(Keyword::When) {
            return Err(self.error("expected WHEN"));
        }
        while self.stream.at_keyword(Keyword::When) {
            let mut when = SyntaxNode::new(Rule::WhenClause, self.offset());
            when.push_token(self.stream.advance());
            when.push_node(self.expr()?);
            when.push_token(self.expect_keyword(Keyword::Then, "expected THEN")?);
            when.push_node(self.expr()?);
            node.push_node(when);
        }
        if self.stream.at_keyword(Keyword::Else) {
            let mut else_clause = SyntaxNode::new(Rule::ElseClause, self.offset());
            else_clause.push_token(self.stream.advance());
            else_clause.push_node(self.expr()?);
            node.push_node(else_clause);
        }
        node.push_token(self.expect_keyword(Keyword::End, "expected END to close CASE")?);
        Ok(node)
    }
}
