//! SQL statement classification.
//!
//! `execute_query` accepts arbitrary SQL, so before running a statement we
//! decide whether it produces a result set (fetch rows) or mutates state
//! (report an affected count). Classification parses the statement with the
//! dialect's grammar; when parsing fails we fall back to the leading keyword
//! and let the backend report the real error on execution.

use sqlparser::ast::Statement;
use sqlparser::dialect::{Dialect as SqlDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

use crate::models::Dialect;

/// Keywords that begin row-returning statements, used when the parser
/// cannot make sense of the input.
const ROW_RETURNING_KEYWORDS: &[&str] = &[
    "SELECT", "SHOW", "EXPLAIN", "DESCRIBE", "DESC", "VALUES", "WITH", "TABLE",
];

fn parser_dialect(dialect: Dialect) -> Box<dyn SqlDialect> {
    match dialect {
        Dialect::MySql => Box::new(MySqlDialect {}),
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
    }
}

/// Decide whether a statement should be fetched or executed.
///
/// For multi-statement input the first statement decides the shape.
pub fn returns_rows(sql: &str, dialect: Dialect) -> bool {
    let parser = parser_dialect(dialect);
    match Parser::parse_sql(parser.as_ref(), sql) {
        Ok(statements) => statements
            .first()
            .map(statement_returns_rows)
            .unwrap_or(false),
        Err(_) => keyword_fallback(sql),
    }
}

/// Classify a parsed statement.
fn statement_returns_rows(stmt: &Statement) -> bool {
    match stmt {
        Statement::Query(_)
        | Statement::ShowTables { .. }
        | Statement::ShowColumns { .. }
        | Statement::ShowDatabases { .. }
        | Statement::ShowSchemas { .. }
        | Statement::ShowCreate { .. }
        | Statement::ShowFunctions { .. }
        | Statement::ShowVariable { .. }
        | Statement::ShowVariables { .. }
        | Statement::ShowStatus { .. }
        | Statement::ShowCollation { .. }
        | Statement::ExplainTable { .. }
        | Statement::Explain { .. } => true,

        // INSERT/UPDATE/DELETE ... RETURNING produce rows on PostgreSQL
        Statement::Insert(insert) => insert.returning.is_some(),
        Statement::Update(update) => update.returning.is_some(),
        Statement::Delete(delete) => delete.returning.is_some(),

        _ => false,
    }
}

fn keyword_fallback(sql: &str) -> bool {
    sql.split_whitespace()
        .next()
        .map(|word| {
            let upper = word.to_uppercase();
            ROW_RETURNING_KEYWORDS.contains(&upper.as_str())
        })
        .unwrap_or(false)
}
