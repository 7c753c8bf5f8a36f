use super::super::traits::{SqlGenerator, standard_limit_offset};

pub struct SqliteGenerator;

impl SqlGenerator for SqliteGenerator {
    fn quote_identifier(&self, id: &str) -> String {
        format!("\"{}\"", id.replace('"', "\"\""))
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        match (limit, offset) {
            (Some(n), offset) => standard_limit_offset(n, offset),
            // SQLite requires LIMIT before OFFSET; -1 means no limit.
            (None, Some(m)) => format!(" LIMIT -1 OFFSET {}", m),
            (None, None) => String::new(),
        }
    }
}
