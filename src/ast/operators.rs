use serde::{Deserialize, Serialize};

/// The kind of an expression node, used for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpressionKind {
    Column,
    Literal,
    Value,
    Boolean,
    Condition,
    Case,
    Func,
    Order,
    Star,
    Alias,
    List,
    Subquery,
}

impl std::fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpressionKind::Column => write!(f, "column"),
            ExpressionKind::Literal => write!(f, "literal"),
            ExpressionKind::Value => write!(f, "value"),
            ExpressionKind::Boolean => write!(f, "boolean"),
            ExpressionKind::Condition => write!(f, "condition"),
            ExpressionKind::Case => write!(f, "case"),
            ExpressionKind::Func => write!(f, "func"),
            ExpressionKind::Order => write!(f, "order"),
            ExpressionKind::Star => write!(f, "star"),
            ExpressionKind::Alias => write!(f, "alias"),
            ExpressionKind::List => write!(f, "list"),
            ExpressionKind::Subquery => write!(f, "subquery"),
        }
    }
}

/// Comparison and predicate operators of a boolean expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOperator {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    Exists,
    NotExists,
    Between,
    NotBetween,
}

impl BooleanOperator {
    pub const ALL: [BooleanOperator; 16] = [
        BooleanOperator::Eq,
        BooleanOperator::NotEq,
        BooleanOperator::Gt,
        BooleanOperator::GtEq,
        BooleanOperator::Lt,
        BooleanOperator::LtEq,
        BooleanOperator::Like,
        BooleanOperator::NotLike,
        BooleanOperator::In,
        BooleanOperator::NotIn,
        BooleanOperator::IsNull,
        BooleanOperator::IsNotNull,
        BooleanOperator::Exists,
        BooleanOperator::NotExists,
        BooleanOperator::Between,
        BooleanOperator::NotBetween,
    ];

    /// SQL text of the operator.
    /// BETWEEN forms are rendered with upper-case keywords by the transpiler.
    pub fn sql_symbol(&self) -> &'static str {
        match self {
            BooleanOperator::Eq => "=",
            BooleanOperator::NotEq => "<>",
            BooleanOperator::Gt => ">",
            BooleanOperator::GtEq => ">=",
            BooleanOperator::Lt => "<",
            BooleanOperator::LtEq => "<=",
            BooleanOperator::Like => "like",
            BooleanOperator::NotLike => "not like",
            BooleanOperator::In => "in",
            BooleanOperator::NotIn => "not in",
            BooleanOperator::IsNull => "is null",
            BooleanOperator::IsNotNull => "is not null",
            BooleanOperator::Exists => "exists",
            BooleanOperator::NotExists => "not exists",
            BooleanOperator::Between => "between",
            BooleanOperator::NotBetween => "not between",
        }
    }

    /// Look up an operator by its SQL text, ignoring case and repeated whitespace.
    pub fn from_sql(text: &str) -> Option<Self> {
        let normalized = normalize_keyword(text);
        if normalized == "!=" {
            return Some(BooleanOperator::NotEq);
        }
        Self::ALL
            .into_iter()
            .find(|op| op.sql_symbol() == normalized)
    }

    /// IS NULL, IS NOT NULL: rendered after the left operand, no right operand.
    pub fn is_postfix(&self) -> bool {
        matches!(self, BooleanOperator::IsNull | BooleanOperator::IsNotNull)
    }

    /// EXISTS, NOT EXISTS: rendered before their only operand.
    pub fn is_prefix(&self) -> bool {
        matches!(self, BooleanOperator::Exists | BooleanOperator::NotExists)
    }

    pub fn is_range(&self) -> bool {
        matches!(self, BooleanOperator::Between | BooleanOperator::NotBetween)
    }

    /// Whether the operator takes a right operand.
    pub fn needs_right(&self) -> bool {
        !(self.is_postfix() || self.is_prefix())
    }

    /// The operator with the opposite truth value, where SQL has one.
    pub fn negated(&self) -> Self {
        match self {
            BooleanOperator::Eq => BooleanOperator::NotEq,
            BooleanOperator::NotEq => BooleanOperator::Eq,
            BooleanOperator::Gt => BooleanOperator::LtEq,
            BooleanOperator::GtEq => BooleanOperator::Lt,
            BooleanOperator::Lt => BooleanOperator::GtEq,
            BooleanOperator::LtEq => BooleanOperator::Gt,
            BooleanOperator::Like => BooleanOperator::NotLike,
            BooleanOperator::NotLike => BooleanOperator::Like,
            BooleanOperator::In => BooleanOperator::NotIn,
            BooleanOperator::NotIn => BooleanOperator::In,
            BooleanOperator::IsNull => BooleanOperator::IsNotNull,
            BooleanOperator::IsNotNull => BooleanOperator::IsNull,
            BooleanOperator::Exists => BooleanOperator::NotExists,
            BooleanOperator::NotExists => BooleanOperator::Exists,
            BooleanOperator::Between => BooleanOperator::NotBetween,
            BooleanOperator::NotBetween => BooleanOperator::Between,
        }
    }

    /// `self`, or its negation when a NOT was present.
    pub fn negated_if(self, negate: bool) -> Self {
        if negate { self.negated() } else { self }
    }
}

impl std::fmt::Display for BooleanOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql_symbol())
    }
}

/// Logical operator joining the items of a condition group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ConditionOperator {
    #[default]
    And,
    Or,
}

impl ConditionOperator {
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            ConditionOperator::And => "AND",
            ConditionOperator::Or => "OR",
        }
    }

    pub fn from_sql(text: &str) -> Option<Self> {
        match normalize_keyword(text).as_str() {
            "and" => Some(ConditionOperator::And),
            "or" => Some(ConditionOperator::Or),
            _ => None,
        }
    }
}

/// Sort direction of an ORDER BY item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderType {
    #[default]
    Asc,
    Desc,
}

impl OrderType {
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            OrderType::Asc => "ASC",
            OrderType::Desc => "DESC",
        }
    }

    pub fn from_sql(text: &str) -> Option<Self> {
        match normalize_keyword(text).as_str() {
            "asc" => Some(OrderType::Asc),
            "desc" => Some(OrderType::Desc),
            _ => None,
        }
    }
}

/// Join type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum JoinTableType {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl JoinTableType {
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            JoinTableType::Inner => "JOIN",
            JoinTableType::Left => "LEFT JOIN",
            JoinTableType::Right => "RIGHT JOIN",
            JoinTableType::Full => "FULL JOIN",
        }
    }

    /// Accepts the optional INNER / OUTER noise words.
    pub fn from_sql(text: &str) -> Option<Self> {
        match normalize_keyword(text).as_str() {
            "join" | "inner join" => Some(JoinTableType::Inner),
            "left join" | "left outer join" => Some(JoinTableType::Left),
            "right join" | "right outer join" => Some(JoinTableType::Right),
            "full join" | "full outer join" => Some(JoinTableType::Full),
            _ => None,
        }
    }
}

/// Set operation combining several single selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombineOperator {
    Union,
    UnionAll,
    Intersect,
    IntersectAll,
    Except,
    ExceptAll,
}

impl CombineOperator {
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            CombineOperator::Union => "UNION",
            CombineOperator::UnionAll => "UNION ALL",
            CombineOperator::Intersect => "INTERSECT",
            CombineOperator::IntersectAll => "INTERSECT ALL",
            CombineOperator::Except => "EXCEPT",
            CombineOperator::ExceptAll => "EXCEPT ALL",
        }
    }

    /// `UNION DISTINCT` is accepted as a spelling of `UNION`.
    pub fn from_sql(text: &str) -> Option<Self> {
        match normalize_keyword(text).as_str() {
            "union" | "union distinct" => Some(CombineOperator::Union),
            "union all" => Some(CombineOperator::UnionAll),
            "intersect" | "intersect distinct" => Some(CombineOperator::Intersect),
            "intersect all" => Some(CombineOperator::IntersectAll),
            "except" | "except distinct" => Some(CombineOperator::Except),
            "except all" => Some(CombineOperator::ExceptAll),
            _ => None,
        }
    }

    pub fn from_parts(base: SetBase, all: bool) -> Self {
        match (base, all) {
            (SetBase::Union, false) => CombineOperator::Union,
            (SetBase::Union, true) => CombineOperator::UnionAll,
            (SetBase::Intersect, false) => CombineOperator::Intersect,
            (SetBase::Intersect, true) => CombineOperator::IntersectAll,
            (SetBase::Except, false) => CombineOperator::Except,
            (SetBase::Except, true) => CombineOperator::ExceptAll,
        }
    }
}

impl std::fmt::Display for CombineOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql_keyword())
    }
}

/// Set operation keyword without its quantifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetBase {
    Union,
    Intersect,
    Except,
}

fn normalize_keyword(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_operator_lookup() {
        assert_eq!(BooleanOperator::from_sql("IS  NOT NULL"), Some(BooleanOperator::IsNotNull));
        assert_eq!(BooleanOperator::from_sql("!="), Some(BooleanOperator::NotEq));
        assert_eq!(BooleanOperator::from_sql("Not Like"), Some(BooleanOperator::NotLike));
        assert_eq!(BooleanOperator::from_sql("~"), None);
    }

    #[test]
    fn test_boolean_operator_shape() {
        assert!(BooleanOperator::IsNull.is_postfix());
        assert!(BooleanOperator::Exists.is_prefix());
        assert!(!BooleanOperator::Exists.needs_right());
        assert!(BooleanOperator::Between.needs_right());
        for op in BooleanOperator::ALL {
            assert_eq!(op.negated().negated(), op);
            assert_eq!(op.negated_if(false), op);
        }
        assert_eq!(BooleanOperator::Like.negated_if(true), BooleanOperator::NotLike);
    }

    #[test]
    fn test_join_and_combine_lookup() {
        assert_eq!(JoinTableType::from_sql("left outer join"), Some(JoinTableType::Left));
        assert_eq!(JoinTableType::from_sql("INNER JOIN"), Some(JoinTableType::Inner));
        assert_eq!(CombineOperator::from_sql("Union All"), Some(CombineOperator::UnionAll));
        assert_eq!(CombineOperator::from_sql("minus"), None);
        assert_eq!(
            CombineOperator::from_parts(SetBase::Except, true),
            CombineOperator::ExceptAll
        );
    }
}
