use super::super::traits::{SqlGenerator, standard_limit_offset};

/// MySQL has no "offset only" form; the documented idiom is the largest unsigned limit.
pub const MYSQL_NO_LIMIT: u64 = u64::MAX;

pub struct MysqlGenerator;

impl SqlGenerator for MysqlGenerator {
    fn quote_identifier(&self, id: &str) -> String {
        format!("`{}`", id.replace('`', "``"))
    }

    fn escape_string(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\'' => out.push_str("''"),
                '\0' => out.push_str("\\0"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\u{1a}' => out.push_str("\\Z"),
                c => out.push(c),
            }
        }
        out
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        match (limit, offset) {
            (Some(n), offset) => standard_limit_offset(n, offset),
            (None, Some(m)) => standard_limit_offset(MYSQL_NO_LIMIT, Some(m)),
            (None, None) => String::new(),
        }
    }
}
