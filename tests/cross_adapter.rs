//! Both front-ends must agree on every statement they both accept.

use pretty_assertions::assert_eq;
use sqlcanon::config::Config;
use sqlcanon::prelude::*;
use sqlcanon::transformer::extract_tables;

/// Set `RUST_LOG=sqlcanon=debug` to see front-end and render logs.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn assert_same_model(sql: &str, dialect: StatementDialect) {
    let grammar = parse(sql).unwrap();
    let statement = parse_statement(sql, dialect).unwrap();
    assert_eq!(grammar, statement, "models differ for {}", sql);
    for render in [Dialect::MySql, Dialect::Postgres, Dialect::Sqlite] {
        assert_eq!(
            grammar.to_sql_with_dialect(render),
            statement.to_sql_with_dialect(render)
        );
    }
}

#[test]
fn test_front_ends_agree() {
    init_logging();
    for sql in [
        "SELECT a.id, b.name FROM a JOIN b ON a.id = b.id WHERE a.id IS NOT NULL",
        "SELECT DISTINCT o.id AS oid, count(*) FROM shop.orders AS o \
         LEFT OUTER JOIN customers c ON o.cid = c.id \
         WHERE o.total >= 10 AND (o.state = 'open' OR o.state = 'new') \
         GROUP BY o.id HAVING count(*) > 1 ORDER BY o.id DESC LIMIT 5 OFFSET 10",
        "SELECT id FROM users WHERE id NOT IN (SELECT user_id FROM bans) \
         AND name LIKE 'a%' AND age BETWEEN 18 AND 65 AND email IS NULL",
        "SELECT a FROM t UNION ALL SELECT b FROM u ORDER BY 1 LIMIT 2",
        "SELECT x.n FROM (SELECT count(*) AS n FROM t) AS x",
        "SELECT CASE WHEN a > 1 THEN 'big' ELSE 'small' END AS size FROM t",
        "SELECT `select`.`from` FROM `select`",
        "SELECT a FROM t LIMIT 5, 10",
        "SELECT -5, 1.50, TRUE, NULL, 'it''s' FROM t",
        "SELECT a FROM t WHERE EXISTS (SELECT 1 FROM u WHERE u.id = t.id)",
        "SELECT a, b",
        r"SELECT 'a\nb', 'c\%d\_' FROM t",
    ] {
        assert_same_model(sql, StatementDialect::MySql);
    }
}

#[test]
fn test_double_quoted_identifiers_with_postgres_statements() {
    assert_same_model(
        "SELECT \"Mixed Case\", t.* FROM \"Order Items\" t",
        StatementDialect::Postgres,
    );
}

#[test]
fn test_both_reject_unsupported() {
    for sql in [
        "SELECT a + 1 FROM t",
        "SELECT CAST(a AS CHAR) FROM t",
        "WITH x AS (SELECT 1) SELECT * FROM x",
        "SELECT a FROM t JOIN u USING (id)",
    ] {
        assert!(matches!(parse(sql), Err(SqlError::UnsupportedFeature(_))), "{}", sql);
        assert!(
            matches!(
                parse_statement(sql, StatementDialect::MySql),
                Err(SqlError::UnsupportedFeature(_))
            ),
            "{}",
            sql
        );
    }
}

#[test]
fn test_transpile_with_each_front_end() {
    init_logging();
    let sql = "SELECT name FROM users WHERE id = 1 OFFSET 20";

    let grammar = Config::from_toml_str("[render]\ndialect = \"postgres\"").unwrap();
    let statement = Config::from_toml_str(
        "[parse]\nfront_end = \"statement\"\nstatement_dialect = \"generic\"\n\
         [render]\ndialect = \"postgres\"",
    )
    .unwrap();

    let expected = "SELECT name FROM users WHERE id = 1 OFFSET 20";
    assert_eq!(sqlcanon::transpile(sql, &grammar).unwrap(), expected);
    assert_eq!(sqlcanon::transpile(sql, &statement).unwrap(), expected);
}

#[test]
fn test_transpile_keeps_mysql_escapes() {
    let sql = r"SELECT 'a\nb\tc' FROM t";
    let expected = "SELECT 'a\\nb\tc' FROM t";
    assert_eq!(sqlcanon::transpile(sql, &Config::default()).unwrap(), expected);

    let config = Config::from_toml_str("[parse]\nfront_end = \"statement\"").unwrap();
    assert_eq!(sqlcanon::transpile(sql, &config).unwrap(), expected);
}

#[test]
fn test_transpile_enforces_input_limit() {
    let config = Config::from_toml_str("[parse]\nmax_input_len = 10").unwrap();
    let err = sqlcanon::transpile("SELECT a FROM t", &config).unwrap_err();
    assert!(err.is_parse());

    let fresh = Config::from_toml_str(
        "[parse]\nsession = \"fresh\"\n[render]\nquote_identifiers = \"always\"",
    )
    .unwrap();
    assert_eq!(
        sqlcanon::transpile("select a from t", &fresh).unwrap(),
        "SELECT `a` FROM `t`"
    );
}

#[test]
fn test_extract_tables_lists_lineage() {
    let tables = extract_tables(
        "SELECT o.id FROM orders o JOIN (SELECT id FROM customers) c ON o.cid = c.id",
        StatementDialect::MySql,
    )
    .unwrap();
    assert_eq!(tables, vec!["orders", "customers"]);
}
