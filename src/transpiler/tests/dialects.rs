//! SQL Dialect tests.

use pretty_assertions::assert_eq;

use crate::ast::builders::*;
use crate::ast::*;
use crate::transpiler::{Dialect, IdentifierQuoting, RenderOptions, ToSql};

fn offset_only() -> SingleSelect {
    select(["id"]).from("users").offset(20).build().unwrap()
}

#[test]
fn test_offset_without_limit() {
    let select = offset_only();
    assert_eq!(
        select.to_sql_with_dialect(Dialect::MySql),
        "SELECT id FROM users LIMIT 18446744073709551615 OFFSET 20"
    );
    assert_eq!(
        select.to_sql_with_dialect(Dialect::Postgres),
        "SELECT id FROM users OFFSET 20"
    );
    assert_eq!(
        select.to_sql_with_dialect(Dialect::Sqlite),
        "SELECT id FROM users LIMIT -1 OFFSET 20"
    );
}

#[test]
fn test_reserved_identifier_quoting() {
    let select = select(["order.group"]).from("order").build().unwrap();
    assert_eq!(select.to_sql(), "SELECT `order`.`group` FROM `order`");
    assert_eq!(
        select.to_sql_with_dialect(Dialect::Postgres),
        "SELECT \"order\".\"group\" FROM \"order\""
    );
}

#[test]
fn test_always_quote() {
    let select = select(["a.id"])
        .from(TableSource::qualified("shop", "a"))
        .build()
        .unwrap();
    let options = RenderOptions {
        dialect: Dialect::Sqlite,
        quoting: IdentifierQuoting::Always,
    };
    assert_eq!(
        select.to_sql_with_options(options),
        "SELECT \"a\".\"id\" FROM \"shop\".\"a\""
    );
}

#[test]
fn test_string_escaping() {
    let v = value("it's a\\b");
    assert_eq!(v.to_sql_with_dialect(Dialect::MySql), "'it''s a\\\\b'");
    assert_eq!(v.to_sql_with_dialect(Dialect::Postgres), "'it''s a\\b'");
    assert_eq!(v.to_sql_with_dialect(Dialect::Sqlite), "'it''s a\\b'");
}

#[test]
fn test_mysql_control_characters() {
    let v = value("a\nb\0\u{1a}\t");
    assert_eq!(v.to_sql_with_dialect(Dialect::MySql), "'a\\nb\\0\\Z\t'");
    assert_eq!(v.to_sql_with_dialect(Dialect::Postgres), "'a\nb\0\u{1a}\t'");
}

#[test]
fn test_embedded_quote_char_in_identifier() {
    let column = Expression::Column(Column::new("we`ird"));
    assert_eq!(column.to_sql(), "`we``ird`");
    assert_eq!(column.to_sql_with_dialect(Dialect::Postgres), "\"we`ird\"");
}
