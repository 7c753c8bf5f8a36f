use pretty_assertions::assert_eq;

use super::*;
use crate::ast::builders::*;
use crate::ast::*;

fn mysql(sql: &str) -> SelectQuery {
    parse_statement(sql, StatementDialect::MySql).unwrap()
}

fn single(sql: &str) -> SingleSelect {
    let query = mysql(sql);
    assert!(!query.is_compound());
    query.single_selects()[0].clone()
}

#[test]
fn test_join_where_matches_builder() {
    let parsed = mysql("SELECT a.id, b.name FROM a JOIN b ON a.id = b.id WHERE a.id IS NOT NULL");
    let built: SelectQuery = select(["a.id", "b.name"])
        .from("a")
        .inner_join("b", eq("a.id", "b.id"))
        .where_(is_not_null("a.id"))
        .build()
        .unwrap()
        .into();
    assert_eq!(parsed, built);
}

#[test]
fn test_and_chain_is_flattened() {
    let s = single("SELECT a FROM t WHERE a = 1 AND b = 2 AND c = 3");
    let expected = and([eq("a", 1), eq("b", 2), eq("c", 3)]).unwrap();
    assert_eq!(s.where_clause, Some(expected));

    let s = single("SELECT a FROM t WHERE a = 1 AND (b = 2 AND c = 3)");
    let expected = and([eq("a", 1), and([eq("b", 2), eq("c", 3)]).unwrap()]).unwrap();
    assert_eq!(s.where_clause, Some(expected));
}

#[test]
fn test_join_types() {
    let s = single(
        "SELECT o.id FROM orders o LEFT JOIN customers c ON o.cid = c.id \
         RIGHT OUTER JOIN items i ON i.oid = o.id INNER JOIN tags t ON t.id = o.id",
    );
    let types: Vec<JoinTableType> = s.joins.iter().map(|j| j.join_type).collect();
    assert_eq!(
        types,
        vec![JoinTableType::Left, JoinTableType::Right, JoinTableType::Inner]
    );
    assert_eq!(s.from, Some(TableSource::named("orders").with_alias("o")));
}

#[test]
fn test_functions_and_literals() {
    let s = single("SELECT count(DISTINCT u.id) AS n, count(*), 'x', -5, NULL FROM u");
    assert_eq!(
        s.select_list,
        vec![
            alias(func_distinct("count", [col("u.id")]).unwrap(), "n"),
            func("count", [star()]).unwrap(),
            value("x"),
            lit("-5"),
            lit("NULL"),
        ]
    );
}

#[test]
fn test_limit_forms() {
    let s = single("SELECT a FROM t ORDER BY a DESC LIMIT 10 OFFSET 20");
    assert_eq!(s.order_by, vec![desc("a")]);
    assert_eq!((s.limit, s.offset), (Some(10), Some(20)));

    let s = single("SELECT a FROM t LIMIT 5, 10");
    assert_eq!((s.limit, s.offset), (Some(10), Some(5)));

    let s = single("SELECT a FROM t LIMIT 18446744073709551615 OFFSET 3");
    assert_eq!((s.limit, s.offset), (None, Some(3)));
}

#[test]
fn test_union_members() {
    let q = mysql("SELECT a FROM t UNION ALL SELECT b FROM u UNION ALL SELECT c FROM v");
    assert_eq!(q.combine_operator(), Some(CombineOperator::UnionAll));
    assert_eq!(q.single_selects().len(), 3);

    let err = parse_statement(
        "SELECT a FROM t UNION SELECT b FROM u EXCEPT SELECT c FROM v",
        StatementDialect::MySql,
    )
    .unwrap_err();
    assert!(matches!(err, SqlError::UnsupportedFeature(_)));
}

#[test]
fn test_subquery_and_derived_table() {
    let inner: SelectQuery = select(["id"]).from("banned").build().unwrap().into();
    let s = single(
        "SELECT x.id FROM (SELECT id FROM banned) AS x WHERE x.id IN (SELECT id FROM banned)",
    );
    assert_eq!(s.from, Some(TableSource::derived(inner.clone(), "x")));
    assert_eq!(s.where_clause, Some(in_subquery("x.id", inner)));
}

#[test]
fn test_unsupported_statements() {
    for sql in [
        "INSERT INTO t (a) VALUES (1)",
        "WITH x AS (SELECT 1) SELECT * FROM x",
        "SELECT a + 1 FROM t",
        "SELECT CAST(a AS CHAR) FROM t",
        "SELECT a FROM t JOIN u USING (id)",
        "SELECT a FROM t, u",
        "SELECT 1; SELECT 2",
    ] {
        let err = parse_statement(sql, StatementDialect::MySql).unwrap_err();
        assert!(
            matches!(err, SqlError::UnsupportedFeature(_)),
            "{:?} gave {:?}",
            sql,
            err
        );
    }
}

#[test]
fn test_clauses_without_from_rejected() {
    for sql in [
        "SELECT 1 WHERE 1 = 0",
        "SELECT 1 ORDER BY 1 LIMIT 0",
        "SELECT 1 HAVING 1 > 0",
        "(SELECT a FROM t LIMIT 1) UNION ALL (SELECT b FROM u LIMIT 1)",
    ] {
        let err = parse_statement(sql, StatementDialect::MySql).unwrap_err();
        assert!(
            matches!(err, SqlError::UnsupportedFeature(_)),
            "{:?} gave {:?}",
            sql,
            err
        );
    }
    let lone = mysql("(SELECT a FROM t LIMIT 1) UNION ALL (SELECT b FROM u)");
    assert_eq!(lone.single_selects()[0].limit, Some(1));
}

#[test]
fn test_wildcard_modifiers_rejected() {
    for sql in ["SELECT * EXCLUDE (a) FROM t", "SELECT t.* EXCLUDE (a) FROM t"] {
        let err = parse_statement(sql, StatementDialect::Generic).unwrap_err();
        match err {
            SqlError::UnsupportedFeature(feature) => assert!(feature.contains("EXCLUDE")),
            other => panic!("expected unsupported feature for {:?}, got {:?}", sql, other),
        }
    }
    let plain = parse_statement("SELECT t.* FROM t", StatementDialect::Generic).unwrap();
    assert_eq!(plain.single_selects()[0].select_list, vec![table_star("t")]);
}

#[test]
fn test_syntax_error_is_statement_error() {
    let err = parse_statement("SELECT * FROM t WHERE", StatementDialect::MySql).unwrap_err();
    assert!(matches!(err, SqlError::Statement(_)));
}

#[test]
fn test_postgres_quoted_identifier() {
    let query =
        parse_statement("SELECT \"Mixed Case\" FROM t", StatementDialect::Postgres).unwrap();
    assert_eq!(query.single_selects()[0].select_list, vec![col("Mixed Case")]);
}

#[test]
fn test_extract_tables() {
    let tables = extract_tables(
        "SELECT o.id FROM shop.orders o JOIN customers c ON o.cid = c.id \
         WHERE o.id IN (SELECT order_id FROM refunds) AND c.id IN (SELECT id FROM customers)",
        StatementDialect::MySql,
    )
    .unwrap();
    assert_eq!(tables, vec!["shop.orders", "customers", "refunds"]);

    let tables = extract_tables(
        "SELECT id FROM events UNION SELECT id FROM archive.events",
        StatementDialect::Generic,
    )
    .unwrap();
    assert_eq!(tables, vec!["events", "archive.events"]);
}
