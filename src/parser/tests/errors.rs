use crate::error::SqlError;
use crate::parser::{parse, parse_with_limit};

fn unsupported(sql: &str) -> String {
    match parse(sql) {
        Err(SqlError::UnsupportedFeature(feature)) => feature,
        other => panic!("expected unsupported feature for {:?}, got {:?}", sql, other),
    }
}

#[test]
fn test_parse_error_position() {
    let err = parse("SELECT a\nFROM t WHERE").unwrap_err();
    match err {
        SqlError::Parse {
            line,
            column,
            found,
            ..
        } => {
            assert_eq!(line, 2);
            assert_eq!(column, 13);
            assert_eq!(found, "end of input");
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_malformed_input() {
    for sql in [
        "",
        "SELECT",
        "SELECT a FROM",
        "SELECT a FROM t WHERE a =",
        "SELECT a FROM t t2 t3",
        "SELECT 'unterminated FROM t",
        "SELECT a FROM t JOIN u",
        "SELECT a FROM (SELECT b FROM u)",
        "SELECT a FROM t LIMIT x",
        "SELECT a FROM t LIMIT 1.5",
        "SELECT a FROM t WHERE a NOT = 1",
        "SELECT a FROM t /* never closed",
    ] {
        let err = parse(sql).unwrap_err();
        assert!(err.is_parse(), "{:?} gave {:?}", sql, err);
    }
}

#[test]
fn test_unsupported_constructs() {
    assert!(unsupported("WITH x AS (SELECT 1) SELECT * FROM x").contains("WITH"));
    assert!(unsupported("SELECT row_number() OVER () FROM t").contains("OVER"));
    assert!(unsupported("SELECT CAST(a AS int) FROM t").contains("CAST"));
    assert!(unsupported("SELECT a + 1 FROM t").contains("arithmetic"));
    assert!(unsupported("SELECT a FROM t CROSS JOIN u").contains("CROSS"));
    assert!(unsupported("SELECT a FROM t NATURAL JOIN u").contains("NATURAL"));
    assert!(unsupported("SELECT a FROM t JOIN u USING (id)").contains("USING"));
    assert!(unsupported("SELECT DISTINCT ON (a) a FROM t").contains("DISTINCT ON"));
    assert!(
        unsupported("SELECT a FROM t UNION SELECT b FROM u EXCEPT SELECT c FROM v")
            .contains("mixing")
    );
    assert!(unsupported("INSERT INTO t VALUES (1)").contains("INSERT"));
    assert!(unsupported("SELECT a FROM t, u").contains("comma"));
}

#[test]
fn test_clauses_without_from_rejected() {
    for sql in [
        "SELECT 1 WHERE 1 = 0",
        "SELECT 1 ORDER BY 1 LIMIT 0",
        "SELECT 1 GROUP BY 1",
        "SELECT a FROM t UNION SELECT 1 LIMIT 5",
    ] {
        assert!(unsupported(sql).contains("without FROM"), "{:?}", sql);
    }
    assert!(parse("SELECT 1, 'x'").is_ok());
}

#[test]
fn test_last_parenthesized_member_with_limit_rejected() {
    for sql in [
        "(SELECT a FROM t LIMIT 1) UNION ALL (SELECT b FROM u LIMIT 1)",
        "SELECT a FROM t UNION (SELECT b FROM u ORDER BY b)",
    ] {
        assert!(unsupported(sql).contains("last parenthesized member"), "{:?}", sql);
    }
    assert!(parse("(SELECT a FROM t LIMIT 1) UNION ALL (SELECT b FROM u)").is_ok());
    assert!(parse("(SELECT a FROM t LIMIT 1)").is_ok());
}

#[test]
fn test_input_length_limit() {
    let err = parse_with_limit("SELECT a FROM t", 8).unwrap_err();
    match err {
        SqlError::Parse { line, column, .. } => assert_eq!((line, column), (1, 9)),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_deep_nesting_rejected() {
    let depth = 200;
    let sql = format!(
        "SELECT a FROM t WHERE {}a = 1{}",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    assert!(parse(&sql).unwrap_err().is_parse());
}
