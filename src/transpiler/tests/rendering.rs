//! Rendering tests for the default dialect.

use pretty_assertions::assert_eq;

use crate::ast::builders::*;
use crate::ast::*;
use crate::transpiler::ToSql;

#[test]
fn test_join_with_where() {
    let select = select(["a.id", "b.name"])
        .from("a")
        .inner_join("b", eq("a.id", "b.id"))
        .where_(is_not_null("a.id"))
        .build()
        .unwrap();
    assert_eq!(
        select.to_sql(),
        "SELECT a.id, b.name FROM a JOIN b ON a.id = b.id WHERE a.id is not null"
    );
}

#[test]
fn test_fragment_without_from() {
    let select = select(["a.id", "b.name"])
        .where_(is_not_null("a.id"))
        .order_by(asc("a.id"))
        .build()
        .unwrap();
    assert_eq!(select.to_sql(), "SELECT a.id, b.name");
}

#[test]
fn test_union_all() {
    let first = select(["id"]).from("a").build().unwrap();
    let second = select(["id"]).from("b").build().unwrap();
    let query = SelectQueryBuilder::new(first).union_all(second).build().unwrap();
    assert_eq!(query.to_sql(), "SELECT id FROM a UNION ALL SELECT id FROM b");
}

#[test]
fn test_boolean_shapes() {
    let is_null = BooleanExpr::new(col("x"), BooleanOperator::IsNull, None).unwrap();
    assert_eq!(Expression::from(is_null).render(), "x is null");

    let range = BooleanExpr::new(lit(1), BooleanOperator::Between, Some(lit(5))).unwrap();
    assert_eq!(Expression::from(range).render(), "BETWEEN 1 AND 5");

    assert_eq!(between("age", 18, 65).render(), "age BETWEEN 18 AND 65");
    assert_eq!(not_between("age", 18, 65).render(), "age NOT BETWEEN 18 AND 65");
    assert_eq!(ne("a", "b").render(), "a <> b");
    assert_eq!(not_like("name", value("A%")).render(), "name not like 'A%'");
}

#[test]
fn test_nested_conditions_parenthesized() {
    let inner = and([eq("b", 2), eq("c", 3)]).unwrap();
    let outer = or([eq("a", 1), inner]).unwrap();
    assert_eq!(outer.render(), "a = 1 OR (b = 2 AND c = 3)");
}

#[test]
fn test_case_and_functions() {
    let case = case_when(gt("x", 0), value("pos"))
        .when(lt("x", 0), value("neg"))
        .otherwise(value("zero"))
        .build();
    assert_eq!(
        case.render(),
        "CASE WHEN x > 0 THEN 'pos' WHEN x < 0 THEN 'neg' ELSE 'zero' END"
    );

    let count = func("count", [star()]).unwrap();
    assert_eq!(alias(count, "total").render(), "count(*) as total");

    let distinct = func_distinct("count", [col("o.user_id")]).unwrap();
    assert_eq!(distinct.render(), "count(DISTINCT o.user_id)");

    assert_eq!(func("now", []).unwrap().render(), "now()");
}

#[test]
fn test_in_and_exists() {
    assert_eq!(is_in("id", [1, 2, 3]).unwrap().render(), "id in (1, 2, 3)");
    assert_eq!(
        not_in("status", [value("a"), value("b")]).unwrap().render(),
        "status not in ('a', 'b')"
    );

    let inner = select([lit(1)])
        .from("b")
        .where_(eq("b.id", "a.id"))
        .build()
        .unwrap();
    assert_eq!(
        exists(inner.clone()).render(),
        "exists (SELECT 1 FROM b WHERE b.id = a.id)"
    );
    assert_eq!(
        in_subquery("a.id", select(["b.id"]).from("b").build().unwrap()).render(),
        "a.id in (SELECT b.id FROM b)"
    );
}

#[test]
fn test_full_select() {
    let select = select(["u.name"])
        .field(alias(func("count", [star()]).unwrap(), "total"))
        .distinct()
        .from(TableSource::named("users").with_alias("u"))
        .left_join(TableSource::named("orders").with_alias("o"), eq("o.user_id", "u.id"))
        .where_(gt("u.age", 18))
        .where_(like("u.name", value("A%")))
        .group_by(["u.name"])
        .having(gt(func("count", [star()]).unwrap(), 2))
        .order_by(desc("total"))
        .limit(10)
        .offset(20)
        .build()
        .unwrap();
    assert_eq!(
        select.to_sql(),
        "SELECT DISTINCT u.name, count(*) as total FROM users as u \
         LEFT JOIN orders as o ON o.user_id = u.id \
         WHERE u.age > 18 AND u.name like 'A%' GROUP BY u.name \
         HAVING count(*) > 2 ORDER BY total DESC LIMIT 10 OFFSET 20"
    );
}

#[test]
fn test_ordered_member_is_parenthesized() {
    let first = select(["id"])
        .from("a")
        .order_by(asc("id"))
        .limit(1)
        .build()
        .unwrap();
    let second = select(["id"]).from("b").order_by(desc("id")).build().unwrap();
    let query = SelectQueryBuilder::new(first).union(second).build().unwrap();
    assert_eq!(
        query.to_sql(),
        "(SELECT id FROM a ORDER BY id ASC LIMIT 1) UNION SELECT id FROM b ORDER BY id DESC"
    );
}

#[test]
fn test_derived_table() {
    let a = select(["id"]).from("a").build().unwrap();
    let b = select(["id"]).from("b").build().unwrap();
    let union = SelectQueryBuilder::new(a).union(b).build().unwrap();
    let select = select([star()])
        .from("users")
        .left_join(TableSource::derived(union, "orders"), eq("orders.id", "users.id"))
        .build()
        .unwrap();
    assert_eq!(
        select.to_sql(),
        "SELECT * FROM users LEFT JOIN (SELECT id FROM a UNION SELECT id FROM b) as orders \
         ON orders.id = users.id"
    );
}

#[test]
fn test_render_is_deterministic() {
    let select = select(["a.id"])
        .from("a")
        .where_(or([eq("a.x", 1), is_null("a.y")]).unwrap())
        .build()
        .unwrap();
    assert_eq!(select.to_sql(), select.clone().to_sql());
}
