use serde::{Deserialize, Serialize};

use crate::ast::operators::{BooleanOperator, ConditionOperator, ExpressionKind, OrderType};
use crate::ast::query::SelectQuery;
use crate::error::{SqlError, SqlResult};
use crate::transpiler::ToSql;

/// A scalar or boolean expression node.
///
/// Every variant reports exactly one [`ExpressionKind`] and renders itself through
/// [`ToSql`]. Variants that carry structural invariants (`Boolean`, `Condition`, `Case`,
/// `Func`, `List`) wrap types that can only be built through validating constructors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Column reference (`col`, `t.col`, `s.t.col`)
    Column(Column),
    /// Raw text emitted verbatim: numbers, NULL, TRUE, already quoted text
    Literal(String),
    /// String value, always single-quoted on output
    Value(String),
    /// `*` or `t.*`
    Star(Option<String>),
    /// `expr as alias`
    Alias(Alias),
    Boolean(BooleanExpr),
    Condition(Condition),
    Case(CaseExpr),
    Func(FuncCall),
    Order(OrderExpr),
    /// Parenthesized value list, the right operand of IN / NOT IN
    List(ExprList),
    /// Parenthesized query used as IN operand, EXISTS operand or scalar
    Subquery(Box<SelectQuery>),
}

impl Expression {
    pub fn kind(&self) -> ExpressionKind {
        match self {
            Expression::Column(_) => ExpressionKind::Column,
            Expression::Literal(_) => ExpressionKind::Literal,
            Expression::Value(_) => ExpressionKind::Value,
            Expression::Star(_) => ExpressionKind::Star,
            Expression::Alias(_) => ExpressionKind::Alias,
            Expression::Boolean(_) => ExpressionKind::Boolean,
            Expression::Condition(_) => ExpressionKind::Condition,
            Expression::Case(_) => ExpressionKind::Case,
            Expression::Func(_) => ExpressionKind::Func,
            Expression::Order(_) => ExpressionKind::Order,
            Expression::List(_) => ExpressionKind::List,
            Expression::Subquery(_) => ExpressionKind::Subquery,
        }
    }

    /// Render with the default dialect.
    pub fn render(&self) -> String {
        self.to_sql()
    }

    pub fn is_star(&self) -> bool {
        matches!(self, Expression::Star(_))
    }

    /// Wrap this expression in an alias.
    pub fn alias(self, alias: impl Into<String>) -> Expression {
        Expression::Alias(Alias {
            expr: Box::new(self),
            alias: alias.into(),
        })
    }

    /// Parse a dotted column path (`a`, `t.a`, `s.t.a`), `*` or `t.*`.
    ///
    /// Paths with more than three parts are kept whole as a single column name.
    pub fn from_path(path: &str) -> Expression {
        if path == "*" {
            return Expression::Star(None);
        }
        if let Some(table) = path.strip_suffix(".*") {
            return Expression::Star(Some(table.to_string()));
        }
        let parts: Vec<&str> = path.split('.').collect();
        match parts.as_slice() {
            [table, name] => Column::qualified(*table, *name).into(),
            [schema, table, name] => Column::qualified(*table, *name).with_schema(*schema).into(),
            _ => Column::new(path).into(),
        }
    }
}

impl From<&str> for Expression {
    fn from(path: &str) -> Self {
        Expression::from_path(path)
    }
}

impl From<String> for Expression {
    fn from(path: String) -> Self {
        Expression::from_path(&path)
    }
}

macro_rules! impl_numeric_literal {
    ($($t:ty),*) => {
        $(impl From<$t> for Expression {
            fn from(n: $t) -> Self {
                Expression::Literal(n.to_string())
            }
        })*
    };
}

impl_numeric_literal!(i32, i64, u32, u64, f64);

impl From<bool> for Expression {
    fn from(b: bool) -> Self {
        Expression::Literal(if b { "TRUE" } else { "FALSE" }.to_string())
    }
}

impl From<Column> for Expression {
    fn from(c: Column) -> Self {
        Expression::Column(c)
    }
}

impl From<BooleanExpr> for Expression {
    fn from(b: BooleanExpr) -> Self {
        Expression::Boolean(b)
    }
}

impl From<Condition> for Expression {
    fn from(c: Condition) -> Self {
        Expression::Condition(c)
    }
}

impl From<CaseExpr> for Expression {
    fn from(c: CaseExpr) -> Self {
        Expression::Case(c)
    }
}

impl From<FuncCall> for Expression {
    fn from(f: FuncCall) -> Self {
        Expression::Func(f)
    }
}

impl From<OrderExpr> for Expression {
    fn from(o: OrderExpr) -> Self {
        Expression::Order(o)
    }
}

impl From<ExprList> for Expression {
    fn from(l: ExprList) -> Self {
        Expression::List(l)
    }
}

impl From<SelectQuery> for Expression {
    fn from(q: SelectQuery) -> Self {
        Expression::Subquery(Box::new(q))
    }
}

/// Column reference. The schema is only rendered when a table is present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    pub schema: Option<String>,
    pub table: Option<String>,
    pub name: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: None,
            name: name.into(),
        }
    }

    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: Some(table.into()),
            name: name.into(),
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Identifier parts in rendering order, most qualified first.
    pub fn parts(&self) -> Vec<&str> {
        let mut parts = Vec::with_capacity(3);
        if let Some(table) = &self.table {
            if let Some(schema) = &self.schema {
                parts.push(schema.as_str());
            }
            parts.push(table.as_str());
        }
        parts.push(self.name.as_str());
        parts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alias {
    pub expr: Box<Expression>,
    pub alias: String,
}

/// An ORDER BY item. The direction is always rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderExpr {
    pub expr: Box<Expression>,
    pub direction: OrderType,
}

impl OrderExpr {
    pub fn new(expr: impl Into<Expression>, direction: OrderType) -> Self {
        Self {
            expr: Box::new(expr.into()),
            direction,
        }
    }
}

/// Comparison or predicate.
///
/// `IS NULL` / `IS NOT NULL` carry no right operand and `EXISTS` / `NOT EXISTS` take a
/// subquery as their only (left) operand. For `BETWEEN` the left and right operands are the
/// range bounds and the tested expression is the optional `subject`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BooleanParts")]
pub struct BooleanExpr {
    left: Box<Expression>,
    operator: BooleanOperator,
    right: Option<Box<Expression>>,
    subject: Option<Box<Expression>>,
}

#[derive(Deserialize)]
struct BooleanParts {
    left: Box<Expression>,
    operator: BooleanOperator,
    right: Option<Box<Expression>>,
    subject: Option<Box<Expression>>,
}

impl TryFrom<BooleanParts> for BooleanExpr {
    type Error = SqlError;

    fn try_from(parts: BooleanParts) -> SqlResult<Self> {
        let mut expr = BooleanExpr::new(*parts.left, parts.operator, parts.right.map(|r| *r))?;
        if let Some(subject) = parts.subject {
            if !parts.operator.is_range() {
                return Err(SqlError::invalid_expression(format!(
                    "only BETWEEN takes a subject, found '{}'",
                    parts.operator
                )));
            }
            expr.subject = Some(subject);
        }
        Ok(expr)
    }
}

impl BooleanExpr {
    /// Build a boolean expression, checking that the operand shape fits the operator.
    pub fn new(
        left: Expression,
        operator: BooleanOperator,
        right: Option<Expression>,
    ) -> SqlResult<Self> {
        match (&right, operator.needs_right()) {
            (None, true) => {
                return Err(SqlError::invalid_expression(format!(
                    "operator '{}' needs a right operand",
                    operator
                )));
            }
            (Some(_), false) => {
                return Err(SqlError::invalid_expression(format!(
                    "operator '{}' takes no right operand",
                    operator
                )));
            }
            _ => {}
        }
        if matches!(operator, BooleanOperator::In | BooleanOperator::NotIn)
            && !matches!(right, Some(Expression::List(_)) | Some(Expression::Subquery(_)))
        {
            return Err(SqlError::invalid_expression(format!(
                "right operand of '{}' must be a value list or subquery",
                operator
            )));
        }
        if operator.is_prefix() && !matches!(left, Expression::Subquery(_)) {
            return Err(SqlError::invalid_expression(format!(
                "operand of '{}' must be a subquery",
                operator
            )));
        }
        Ok(Self {
            left: Box::new(left),
            operator,
            right: right.map(Box::new),
            subject: None,
        })
    }

    /// `subject [NOT] BETWEEN low AND high`
    pub fn between(subject: Expression, low: Expression, high: Expression, negated: bool) -> Self {
        Self {
            left: Box::new(low),
            operator: BooleanOperator::Between.negated_if(negated),
            right: Some(Box::new(high)),
            subject: Some(Box::new(subject)),
        }
    }

    /// Comparison with a right operand that needs no shape check (`=`, `<`, `like`, ...).
    pub(crate) fn compare(left: Expression, operator: BooleanOperator, right: Expression) -> Self {
        Self {
            left: Box::new(left),
            operator,
            right: Some(Box::new(right)),
            subject: None,
        }
    }

    /// `IS NULL` / `IS NOT NULL` / `EXISTS` / `NOT EXISTS` over an operand already known to fit.
    pub(crate) fn unary(left: Expression, operator: BooleanOperator) -> Self {
        Self {
            left: Box::new(left),
            operator,
            right: None,
            subject: None,
        }
    }

    pub fn left(&self) -> &Expression {
        &self.left
    }

    pub fn operator(&self) -> BooleanOperator {
        self.operator
    }

    pub fn right(&self) -> Option<&Expression> {
        self.right.as_deref()
    }

    pub fn subject(&self) -> Option<&Expression> {
        self.subject.as_deref()
    }
}

/// Ordered group of expressions joined by AND or OR. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConditionParts")]
pub struct Condition {
    operator: ConditionOperator,
    items: Vec<Expression>,
}

#[derive(Deserialize)]
struct ConditionParts {
    operator: ConditionOperator,
    items: Vec<Expression>,
}

impl TryFrom<ConditionParts> for Condition {
    type Error = SqlError;

    fn try_from(parts: ConditionParts) -> SqlResult<Self> {
        Condition::new(parts.operator, parts.items)
    }
}

impl Condition {
    pub fn new(operator: ConditionOperator, items: Vec<Expression>) -> SqlResult<Self> {
        if items.is_empty() {
            return Err(SqlError::invalid_expression(format!(
                "{} condition needs at least one item",
                operator.sql_keyword()
            )));
        }
        Ok(Self { operator, items })
    }

    pub fn and(items: Vec<Expression>) -> SqlResult<Self> {
        Self::new(ConditionOperator::And, items)
    }

    pub fn or(items: Vec<Expression>) -> SqlResult<Self> {
        Self::new(ConditionOperator::Or, items)
    }

    pub fn operator(&self) -> ConditionOperator {
        self.operator
    }

    pub fn items(&self) -> &[Expression] {
        &self.items
    }
}

/// Searched CASE with at least one WHEN/THEN pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CaseParts")]
pub struct CaseExpr {
    when_then: Vec<(Expression, Expression)>,
    else_result: Option<Box<Expression>>,
}

#[derive(Deserialize)]
struct CaseParts {
    when_then: Vec<(Expression, Expression)>,
    else_result: Option<Box<Expression>>,
}

impl TryFrom<CaseParts> for CaseExpr {
    type Error = SqlError;

    fn try_from(parts: CaseParts) -> SqlResult<Self> {
        CaseExpr::new(parts.when_then, parts.else_result.map(|e| *e))
    }
}

impl CaseExpr {
    pub fn new(
        when_then: Vec<(Expression, Expression)>,
        else_result: Option<Expression>,
    ) -> SqlResult<Self> {
        if when_then.is_empty() {
            return Err(SqlError::invalid_expression(
                "CASE needs at least one WHEN/THEN pair",
            ));
        }
        Ok(Self {
            when_then,
            else_result: else_result.map(Box::new),
        })
    }

    /// Callers guarantee at least one pair.
    pub(crate) fn from_nonempty(
        when_then: Vec<(Expression, Expression)>,
        else_result: Option<Expression>,
    ) -> Self {
        debug_assert!(!when_then.is_empty());
        Self {
            when_then,
            else_result: else_result.map(Box::new),
        }
    }

    pub fn when_then(&self) -> &[(Expression, Expression)] {
        &self.when_then
    }

    pub fn else_result(&self) -> Option<&Expression> {
        self.else_result.as_deref()
    }
}

/// Function call. The name is emitted as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FuncParts")]
pub struct FuncCall {
    name: String,
    args: Vec<Expression>,
    distinct: bool,
}

#[derive(Deserialize)]
struct FuncParts {
    name: String,
    args: Vec<Expression>,
    #[serde(default)]
    distinct: bool,
}

impl TryFrom<FuncParts> for FuncCall {
    type Error = SqlError;

    fn try_from(parts: FuncParts) -> SqlResult<Self> {
        Ok(FuncCall::new(parts.name, parts.args)?.with_distinct(parts.distinct))
    }
}

impl FuncCall {
    pub fn new(name: impl Into<String>, args: Vec<Expression>) -> SqlResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SqlError::invalid_expression("function name is empty"));
        }
        Ok(Self {
            name,
            args,
            distinct: false,
        })
    }

    /// `count(DISTINCT x)`
    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Expression] {
        &self.args
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }
}

/// Non-empty parenthesized expression list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Expression>", into = "Vec<Expression>")]
pub struct ExprList(Vec<Expression>);

impl TryFrom<Vec<Expression>> for ExprList {
    type Error = SqlError;

    fn try_from(items: Vec<Expression>) -> SqlResult<Self> {
        ExprList::new(items)
    }
}

impl From<ExprList> for Vec<Expression> {
    fn from(list: ExprList) -> Self {
        list.0
    }
}

impl ExprList {
    pub fn new(items: Vec<Expression>) -> SqlResult<Self> {
        if items.is_empty() {
            return Err(SqlError::invalid_expression("value list is empty"));
        }
        Ok(Self(items))
    }

    pub fn items(&self) -> &[Expression] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(Expression::from("id"), Expression::Column(Column::new("id")));
        assert_eq!(
            Expression::from("a.id"),
            Expression::Column(Column::qualified("a", "id"))
        );
        assert_eq!(
            Expression::from("s.a.id"),
            Expression::Column(Column::qualified("a", "id").with_schema("s"))
        );
        assert_eq!(Expression::from("*"), Expression::Star(None));
        assert_eq!(Expression::from("o.*"), Expression::Star(Some("o".into())));
    }

    #[test]
    fn test_empty_condition_rejected() {
        let err = Condition::new(ConditionOperator::And, vec![]).unwrap_err();
        assert!(matches!(err, SqlError::InvalidExpression(_)));
    }

    #[test]
    fn test_empty_case_and_list_rejected() {
        assert!(CaseExpr::new(vec![], None).is_err());
        assert!(ExprList::new(vec![]).is_err());
        assert!(FuncCall::new("  ", vec![]).is_err());
    }

    #[test]
    fn test_boolean_operand_shape() {
        assert!(BooleanExpr::new("a".into(), BooleanOperator::IsNull, None).is_ok());
        assert!(BooleanExpr::new("a".into(), BooleanOperator::IsNull, Some("b".into())).is_err());
        assert!(BooleanExpr::new("a".into(), BooleanOperator::Eq, None).is_err());
        assert!(BooleanExpr::new("a".into(), BooleanOperator::In, Some("b".into())).is_err());
        assert!(BooleanExpr::new("a".into(), BooleanOperator::Exists, None).is_err());

        let list = ExprList::new(vec![Expression::from(1), Expression::from(2)]).unwrap();
        let expr = BooleanExpr::new("a".into(), BooleanOperator::In, Some(list.into())).unwrap();
        assert_eq!(expr.operator(), BooleanOperator::In);
        assert!(expr.subject().is_none());
    }

    #[test]
    fn test_kind() {
        let expr = Expression::from("a").alias("x");
        assert_eq!(expr.kind(), ExpressionKind::Alias);
        assert_eq!(Expression::Value("v".into()).kind(), ExpressionKind::Value);
        assert_eq!(Expression::from(true), Expression::Literal("TRUE".into()));
    }

    #[test]
    fn test_deserialize_rejects_empty_list() {
        let bad: Result<ExprList, _> = toml::from_str::<Wrapper>("items = []").map(|w| w.items);
        assert!(bad.is_err());
    }

    #[derive(Deserialize)]
    struct Wrapper {
        items: ExprList,
    }
}
