use super::super::traits::{SqlGenerator, standard_limit_offset};

pub struct PostgresGenerator;

impl SqlGenerator for PostgresGenerator {
    fn quote_identifier(&self, id: &str) -> String {
        format!("\"{}\"", id.replace('"', "\"\""))
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        match (limit, offset) {
            (Some(n), offset) => standard_limit_offset(n, offset),
            (None, Some(m)) => format!(" OFFSET {}", m),
            (None, None) => String::new(),
        }
    }
}
