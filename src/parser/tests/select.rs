use pretty_assertions::assert_eq;

use crate::ast::builders::*;
use crate::ast::*;
use crate::parser::{parse, parse_with_fresh_session};

fn single(sql: &str) -> SingleSelect {
    let query = parse(sql).unwrap();
    assert!(!query.is_compound());
    query.single_selects()[0].clone()
}

#[test]
fn test_simple_select() {
    let s = single("SELECT id, name FROM users");
    assert_eq!(s.select_list, vec![col("id"), col("name")]);
    assert_eq!(s.from, Some(TableSource::named("users")));
    assert!(s.joins.is_empty());
    assert!(s.where_clause.is_none());
}

#[test]
fn test_keywords_case_insensitive() {
    let upper = parse("SELECT id FROM users WHERE id IS NOT NULL").unwrap();
    let lower = parse("select id from users where id is not null").unwrap();
    assert_eq!(upper, lower);

    let s = single("select Id from Users");
    assert_eq!(s.select_list, vec![col("Id")]);
    assert_eq!(s.from, Some(TableSource::named("Users")));
}

#[test]
fn test_comments_and_semicolon() {
    let sql = "-- leading comment\nSELECT a /* inline */ FROM t; # trailing";
    assert_eq!(parse(sql).unwrap(), parse("SELECT a FROM t").unwrap());
}

#[test]
fn test_join_where_matches_builder() {
    let parsed = parse(
        "SELECT a.id, b.name FROM a JOIN b ON a.id = b.id WHERE a.id is not null",
    )
    .unwrap();
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
fn test_join_types_and_aliases() {
    let s = single(
        "SELECT o.id FROM shop.orders AS o \
         LEFT OUTER JOIN customers c ON o.customer_id = c.id \
         RIGHT JOIN items i ON i.order_id = o.id \
         FULL JOIN notes n ON n.id = o.id \
         INNER JOIN tags t ON t.id = o.id",
    );
    assert_eq!(
        s.from,
        Some(TableSource::qualified("shop", "orders").with_alias("o"))
    );
    let types: Vec<JoinTableType> = s.joins.iter().map(|j| j.join_type).collect();
    assert_eq!(
        types,
        vec![
            JoinTableType::Left,
            JoinTableType::Right,
            JoinTableType::Full,
            JoinTableType::Inner
        ]
    );
    assert_eq!(s.joins[0].table, TableSource::named("customers").with_alias("c"));
    assert_eq!(s.table_names(), vec!["o", "c", "i", "n", "t"]);
}

#[test]
fn test_missing_from_is_fragment() {
    let s = single("SELECT a.id, b.name");
    assert!(s.is_fragment());
    assert_eq!(s.select_list, vec![col("a.id"), col("b.name")]);
}

#[test]
fn test_where_precedence() {
    let s = single("SELECT a FROM t WHERE a = 1 OR b = 2 AND c = 3");
    let expected = or([eq("a", 1), and([eq("b", 2), eq("c", 3)]).unwrap()]).unwrap();
    assert_eq!(s.where_clause, Some(expected));

    let s = single("SELECT a FROM t WHERE (a = 1 OR b = 2) AND c = 3");
    let expected = and([or([eq("a", 1), eq("b", 2)]).unwrap(), eq("c", 3)]).unwrap();
    assert_eq!(s.where_clause, Some(expected));
}

#[test]
fn test_predicates() {
    let s = single(
        "SELECT a FROM t WHERE a <> 1 AND b != 2 AND c >= 3 AND d LIKE 'x%' \
         AND e NOT LIKE 'y%' AND f IN (1, 2) AND g NOT IN ('p', 'q') \
         AND h BETWEEN 1 AND 9 AND i NOT BETWEEN 2 AND 3 AND j IS NULL",
    );
    let expected = and([
        ne("a", 1),
        ne("b", 2),
        gte("c", 3),
        like("d", value("x%")),
        not_like("e", value("y%")),
        is_in("f", [1, 2]).unwrap(),
        not_in("g", [value("p"), value("q")]).unwrap(),
        between("h", 1, 9),
        not_between("i", 2, 3),
        is_null("j"),
    ])
    .unwrap();
    assert_eq!(s.where_clause, Some(expected));
}

#[test]
fn test_subqueries() {
    let inner: SelectQuery = select(["id"]).from("banned").build().unwrap().into();

    let s = single("SELECT id FROM users WHERE id NOT IN (SELECT id FROM banned)");
    assert_eq!(s.where_clause, Some(not_in_subquery("id", inner.clone())));

    let s = single("SELECT id FROM users WHERE NOT EXISTS (SELECT id FROM banned)");
    assert_eq!(s.where_clause, Some(not_exists(inner.clone())));

    let s = single("SELECT x.id FROM (SELECT id FROM banned) AS x");
    assert_eq!(s.from, Some(TableSource::derived(inner, "x")));
}

#[test]
fn test_functions_case_and_literals() {
    let s = single(
        "SELECT count(DISTINCT u.id) AS n, count(*), coalesce(a, 'none') label, \
         CASE WHEN a > 0 THEN 'pos' ELSE 'neg' END, -5, TRUE, null \
         FROM u",
    );
    let expected = vec![
        alias(func_distinct("count", [col("u.id")]).unwrap(), "n"),
        func("count", [star()]).unwrap(),
        alias(func("coalesce", [col("a"), value("none")]).unwrap(), "label"),
        case_when(gt("a", 0), value("pos")).otherwise(value("neg")).build(),
        lit("-5"),
        lit("TRUE"),
        lit("NULL"),
    ];
    assert_eq!(s.select_list, expected);
}

#[test]
fn test_simple_case_becomes_searched() {
    let s = single("SELECT CASE status WHEN 1 THEN 'on' END FROM t");
    let expected = case_when(eq("status", 1), value("on")).build();
    assert_eq!(s.select_list, vec![expected]);
}

#[test]
fn test_group_having_order_limit() {
    let s = single(
        "SELECT dept, count(*) FROM emp GROUP BY dept HAVING count(*) > 3 \
         ORDER BY dept DESC, 2 LIMIT 10 OFFSET 20",
    );
    assert_eq!(s.group_by, vec![col("dept")]);
    assert_eq!(s.having, Some(gt(func("count", [star()]).unwrap(), 3)));
    assert_eq!(s.order_by, vec![desc("dept"), asc(2)]);
    assert_eq!(s.limit, Some(10));
    assert_eq!(s.offset, Some(20));
}

#[test]
fn test_limit_forms() {
    let s = single("SELECT a FROM t LIMIT 5, 10");
    assert_eq!((s.limit, s.offset), (Some(10), Some(5)));

    let s = single("SELECT a FROM t OFFSET 7");
    assert_eq!((s.limit, s.offset), (None, Some(7)));

    let s = single("SELECT a FROM t LIMIT -1 OFFSET 3");
    assert_eq!((s.limit, s.offset), (None, Some(3)));

    let s = single("SELECT a FROM t LIMIT 18446744073709551615 OFFSET 3");
    assert_eq!((s.limit, s.offset), (None, Some(3)));
}

#[test]
fn test_union_all() {
    let q = parse("SELECT a FROM t UNION ALL SELECT b FROM u UNION ALL SELECT c FROM v").unwrap();
    assert_eq!(q.combine_operator(), Some(CombineOperator::UnionAll));
    assert_eq!(q.single_selects().len(), 3);

    let q = parse("SELECT a FROM t UNION DISTINCT SELECT b FROM u").unwrap();
    assert_eq!(q.combine_operator(), Some(CombineOperator::Union));
}

#[test]
fn test_trailing_order_attaches_to_last_member() {
    let q = parse("SELECT a FROM t EXCEPT SELECT b FROM u ORDER BY 1 LIMIT 3").unwrap();
    let members = q.single_selects();
    assert!(members[0].order_by.is_empty());
    assert_eq!(members[1].order_by, vec![asc(1)]);
    assert_eq!(members[1].limit, Some(3));

    let q = parse("(SELECT a FROM t ORDER BY a LIMIT 1) UNION (SELECT b FROM u)").unwrap();
    assert_eq!(q.single_selects()[0].order_by, vec![asc("a")]);
    assert_eq!(q.single_selects()[0].limit, Some(1));
}

#[test]
fn test_quoted_identifiers_and_stars() {
    let s = single("SELECT `order`.`select`, \"Mixed Case\", t.* FROM `order` t");
    assert_eq!(
        s.select_list,
        vec![col("order.select"), col("Mixed Case"), table_star("t")]
    );

    let s = single("SELECT DISTINCT * FROM t");
    assert!(s.distinct);
    assert_eq!(s.select_list, vec![star()]);
}

#[test]
fn test_escaped_strings() {
    let s = single("SELECT a FROM t WHERE b = 'it''s' AND c = 'back\\'slash'");
    let expected = and([eq("b", value("it's")), eq("c", value("back'slash"))]).unwrap();
    assert_eq!(s.where_clause, Some(expected));
}

#[test]
fn test_fresh_session_matches_cached() {
    let sql = "SELECT a, b FROM t WHERE a = 1 ORDER BY b";
    assert_eq!(
        parse_with_fresh_session(sql, 1024).unwrap(),
        parse(sql).unwrap()
    );
}
