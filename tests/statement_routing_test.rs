//! Statement routing tests: which statements take the row-returning path
//! versus the mutation path, per dialect.

use database_mcp::db::statement::returns_rows;
use database_mcp::models::Dialect;

#[test]
fn queries_take_the_row_path() {
    for sql in [
        "SELECT id, name FROM users",
        "select 1",
        "  SELECT 1 UNION SELECT 2",
        "WITH t AS (SELECT 1 AS n) SELECT n FROM t",
        "VALUES (1), (2)",
        "TABLE users",
    ] {
        assert!(returns_rows(sql, Dialect::Postgres), "postgres: {sql}");
        if !sql.starts_with("TABLE") {
            assert!(returns_rows(sql, Dialect::MySql), "mysql: {sql}");
        }
    }
}

#[test]
fn introspection_statements_take_the_row_path() {
    assert!(returns_rows("SHOW TABLES", Dialect::MySql));
    assert!(returns_rows("SHOW DATABASES", Dialect::MySql));
    assert!(returns_rows("SHOW COLUMNS FROM users", Dialect::MySql));
    assert!(returns_rows("EXPLAIN SELECT * FROM users", Dialect::MySql));
    assert!(returns_rows(
        "EXPLAIN ANALYZE SELECT * FROM users",
        Dialect::Postgres
    ));
    assert!(returns_rows("DESCRIBE users", Dialect::MySql));
}

#[test]
fn mutations_take_the_mutation_path() {
    for sql in [
        "INSERT INTO users (name) VALUES ('a')",
        "UPDATE users SET name = 'b' WHERE id = 1",
        "DELETE FROM users WHERE id = 1",
        "CREATE TABLE t (id INT)",
        "DROP TABLE t",
        "ALTER TABLE t ADD COLUMN c INT",
        "TRUNCATE TABLE t",
        "INSERT INTO archive SELECT * FROM users",
    ] {
        assert!(!returns_rows(sql, Dialect::MySql), "mysql: {sql}");
        assert!(!returns_rows(sql, Dialect::Postgres), "postgres: {sql}");
    }
}

#[test]
fn returning_clause_takes_the_row_path() {
    assert!(returns_rows(
        "INSERT INTO users (name) VALUES ('a') RETURNING id",
        Dialect::Postgres
    ));
    assert!(returns_rows(
        "DELETE FROM users WHERE id = 1 RETURNING id",
        Dialect::Postgres
    ));
    assert!(returns_rows(
        "UPDATE users SET name = 'b' RETURNING id, name",
        Dialect::Postgres
    ));
}

#[test]
fn unparseable_statements_fall_back_to_keywords() {
    // Misspelled keyword: routed by first word, backend reports the real error
    assert!(!returns_rows("SELEKT 1", Dialect::Postgres));
    // Leading row-returning keyword with garbage after it still routes to rows
    assert!(returns_rows("SELECT FROM FROM FROM", Dialect::MySql));
    assert!(returns_rows("SHOW GIBBERISH NONSENSE", Dialect::MySql));
}
