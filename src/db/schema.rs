//! Schema introspection.
//!
//! Both dialects produce the same `TableSchema` shape from their own system
//! catalogs. SQL lives in the `queries` submodule; the dialect submodules
//! below provide a parallel interface over it.

use tracing::debug;

use crate::db::pool::DbPool;
use crate::error::{DbError, DbResult};
use crate::models::{ColumnDefinition, ForeignKey, ForeignKeyAction, IndexInfo, TableSchema};

/// Schema inspector for database introspection.
pub struct SchemaInspector;

impl SchemaInspector {
    /// List base table names in the connected database, sorted.
    pub async fn list_tables(pool: &DbPool) -> DbResult<Vec<String>> {
        match pool {
            DbPool::Postgres(p) => postgres::list_tables(p).await,
            DbPool::MySql(p) => mysql::list_tables(p).await,
        }
    }

    /// Describe a table's schema.
    ///
    /// The table is validated against the current table list first, so an
    /// unknown name fails with the available tables in the message rather
    /// than an empty descriptor.
    pub async fn describe_table(pool: &DbPool, table_name: &str) -> DbResult<TableSchema> {
        let tables = Self::list_tables(pool).await?;
        if !tables.iter().any(|t| t == table_name) {
            let available = if tables.is_empty() {
                "(none)".to_string()
            } else {
                tables.join(", ")
            };
            return Err(DbError::not_found(format!(
                "Table '{}' not found. Available tables: {}",
                table_name, available
            )));
        }

        match pool {
            DbPool::Postgres(p) => postgres::describe_table(p, table_name).await,
            DbPool::MySql(p) => mysql::describe_table(p, table_name).await,
        }
    }
}

// =============================================================================
// SQL Query Templates
// =============================================================================

mod queries {
    pub mod postgres {
        pub const LIST_TABLES: &str = r#"
            SELECT table_name
            FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_type = 'BASE TABLE'
            ORDER BY table_name
            "#;

        pub const DESCRIBE_COLUMNS: &str = r#"
        SELECT
            c.column_name,
            format_type(a.atttypid, a.atttypmod) AS column_type,
            c.is_nullable,
            c.column_default
        FROM information_schema.columns c
        JOIN pg_class t ON t.relname = c.table_name
        JOIN pg_namespace n ON n.oid = t.relnamespace AND n.nspname = c.table_schema
        JOIN pg_attribute a ON a.attrelid = t.oid AND a.attname = c.column_name
        WHERE c.table_name = $1 AND c.table_schema = 'public'
        ORDER BY c.ordinal_position
        "#;

        pub const DESCRIBE_PRIMARY_KEYS: &str = r#"
        SELECT kcu.column_name
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
            ON tc.constraint_name = kcu.constraint_name
            AND tc.table_schema = kcu.table_schema
        WHERE tc.table_name = $1
        AND tc.table_schema = 'public'
        AND tc.constraint_type = 'PRIMARY KEY'
        ORDER BY kcu.ordinal_position
        "#;

        pub const DESCRIBE_FOREIGN_KEYS: &str = r#"
        SELECT
            tc.constraint_name,
            kcu.column_name,
            ccu.table_name AS foreign_table_name,
            ccu.column_name AS foreign_column_name,
            rc.delete_rule,
            rc.update_rule
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
            ON tc.constraint_name = kcu.constraint_name
            AND tc.table_schema = kcu.table_schema
        JOIN information_schema.constraint_column_usage ccu
            ON ccu.constraint_name = tc.constraint_name
            AND ccu.table_schema = tc.table_schema
        JOIN information_schema.referential_constraints rc
            ON rc.constraint_name = tc.constraint_name
            AND rc.constraint_schema = tc.table_schema
        WHERE tc.table_name = $1
        AND tc.table_schema = 'public'
        AND tc.constraint_type = 'FOREIGN KEY'
        "#;

        pub const DESCRIBE_INDEXES: &str = r#"
        SELECT
            i.relname AS index_name,
            array_agg(a.attname ORDER BY array_position(ix.indkey, a.attnum)) AS column_names,
            ix.indisunique AS is_unique,
            ix.indisprimary AS is_primary
        FROM pg_index ix
        JOIN pg_class i ON i.oid = ix.indexrelid
        JOIN pg_class t ON t.oid = ix.indrelid
        JOIN pg_namespace n ON n.oid = t.relnamespace
        JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = ANY(ix.indkey)
        WHERE t.relname = $1 AND n.nspname = 'public'
        GROUP BY i.relname, ix.indisunique, ix.indisprimary
        ORDER BY i.relname
        "#;
    }

    pub mod mysql {
        // CONVERT(... USING utf8) guards against VARBINARY results under
        // some server charset configurations.
        pub const LIST_TABLES: &str = r#"
            SELECT CONVERT(TABLE_NAME USING utf8) AS TABLE_NAME
            FROM information_schema.TABLES
            WHERE TABLE_SCHEMA = DATABASE()
            AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
            "#;

        pub const DESCRIBE_COLUMNS: &str = r#"
        SELECT
            CONVERT(COLUMN_NAME USING utf8) AS COLUMN_NAME,
            CONVERT(COLUMN_TYPE USING utf8) AS COLUMN_TYPE,
            CONVERT(IS_NULLABLE USING utf8) AS IS_NULLABLE,
            CONVERT(COLUMN_DEFAULT USING utf8) AS COLUMN_DEFAULT,
            CONVERT(COLUMN_KEY USING utf8) AS COLUMN_KEY
        FROM information_schema.COLUMNS
        WHERE TABLE_NAME = ? AND TABLE_SCHEMA = DATABASE()
        ORDER BY ORDINAL_POSITION
        "#;

        pub const DESCRIBE_FOREIGN_KEYS: &str = r#"
        SELECT
            CONVERT(kcu.CONSTRAINT_NAME USING utf8) AS CONSTRAINT_NAME,
            CONVERT(kcu.COLUMN_NAME USING utf8) AS COLUMN_NAME,
            CONVERT(kcu.REFERENCED_TABLE_NAME USING utf8) AS REFERENCED_TABLE_NAME,
            CONVERT(kcu.REFERENCED_COLUMN_NAME USING utf8) AS REFERENCED_COLUMN_NAME,
            CONVERT(rc.DELETE_RULE USING utf8) AS DELETE_RULE,
            CONVERT(rc.UPDATE_RULE USING utf8) AS UPDATE_RULE
        FROM information_schema.KEY_COLUMN_USAGE kcu
        JOIN information_schema.REFERENTIAL_CONSTRAINTS rc
            ON rc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME
            AND rc.CONSTRAINT_SCHEMA = kcu.TABLE_SCHEMA
        WHERE kcu.TABLE_NAME = ?
        AND kcu.TABLE_SCHEMA = DATABASE()
        AND kcu.REFERENCED_TABLE_NAME IS NOT NULL
        "#;

        pub const DESCRIBE_INDEXES: &str = r#"
        SELECT
            CONVERT(INDEX_NAME USING utf8) AS INDEX_NAME,
            CONVERT(GROUP_CONCAT(COLUMN_NAME ORDER BY SEQ_IN_INDEX) USING utf8) AS COLUMN_NAMES,
            NOT NON_UNIQUE AS IS_UNIQUE
        FROM information_schema.STATISTICS
        WHERE TABLE_NAME = ? AND TABLE_SCHEMA = DATABASE()
        GROUP BY INDEX_NAME, NON_UNIQUE
        ORDER BY INDEX_NAME
        "#;
    }
}

// =============================================================================
// Dialect-Specific Implementations
// =============================================================================

mod postgres {
    use sqlx::{PgPool, Row};

    use super::*;

    pub async fn list_tables(pool: &PgPool) -> DbResult<Vec<String>> {
        let rows = sqlx::query(queries::postgres::LIST_TABLES)
            .fetch_all(pool)
            .await?;

        let tables: Vec<String> = rows.iter().map(|row| row.get("table_name")).collect();
        debug!(count = tables.len(), "Listed PostgreSQL tables");
        Ok(tables)
    }

    pub async fn describe_table(pool: &PgPool, table_name: &str) -> DbResult<TableSchema> {
        let columns = fetch_columns(pool, table_name).await?;
        let primary_keys = fetch_primary_keys(pool, table_name).await?;
        let foreign_keys = fetch_foreign_keys(pool, table_name).await?;
        let indexes = fetch_indexes(pool, table_name).await?;

        Ok(TableSchema {
            table_name: table_name.to_string(),
            columns,
            primary_keys,
            foreign_keys,
            indexes,
        })
    }

    async fn fetch_columns(pool: &PgPool, table_name: &str) -> DbResult<Vec<ColumnDefinition>> {
        let rows = sqlx::query(queries::postgres::DESCRIBE_COLUMNS)
            .bind(table_name)
            .fetch_all(pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let name: String = row.get("column_name");
                let column_type: String = row.get("column_type");
                let nullable: String = row.get("is_nullable");
                let default_value: Option<String> = row.try_get("column_default").ok().flatten();

                let mut col = ColumnDefinition::new(&name, &column_type, nullable == "YES");
                if let Some(ref def) = default_value {
                    col = col.with_default_str(def);
                }
                col
            })
            .collect())
    }

    async fn fetch_primary_keys(pool: &PgPool, table_name: &str) -> DbResult<Vec<String>> {
        let rows = sqlx::query(queries::postgres::DESCRIBE_PRIMARY_KEYS)
            .bind(table_name)
            .fetch_all(pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("column_name")).collect())
    }

    async fn fetch_foreign_keys(pool: &PgPool, table_name: &str) -> DbResult<Vec<ForeignKey>> {
        let rows = sqlx::query(queries::postgres::DESCRIBE_FOREIGN_KEYS)
            .bind(table_name)
            .fetch_all(pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let name: String = row.get("constraint_name");
                let column: String = row.get("column_name");
                let ref_table: String = row.get("foreign_table_name");
                let ref_column: String = row.get("foreign_column_name");
                let delete_rule: String = row.get("delete_rule");
                let update_rule: String = row.get("update_rule");

                ForeignKey::new(column, ref_table, ref_column)
                    .with_name(name)
                    .with_on_delete(ForeignKeyAction::parse(&delete_rule))
                    .with_on_update(ForeignKeyAction::parse(&update_rule))
            })
            .collect())
    }

    async fn fetch_indexes(pool: &PgPool, table_name: &str) -> DbResult<Vec<IndexInfo>> {
        let rows = sqlx::query(queries::postgres::DESCRIBE_INDEXES)
            .bind(table_name)
            .fetch_all(pool)
            .await?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let name: String = row.get("index_name");
                let columns: Vec<String> = row.get("column_names");
                let is_unique: bool = row.get("is_unique");
                let is_primary: bool = row.get("is_primary");

                if columns.is_empty() {
                    None
                } else {
                    Some(
                        IndexInfo::new(name, columns)
                            .with_unique(is_unique)
                            .with_primary(is_primary),
                    )
                }
            })
            .collect())
    }
}

mod mysql {
    use sqlx::{MySqlPool, Row};

    use super::*;

    /// Safely get a string from a MySQL row.
    /// MySQL may return VARBINARY instead of VARCHAR depending on charset.
    fn get_string(row: &sqlx::mysql::MySqlRow, column: &str) -> String {
        row.try_get::<String, _>(column)
            .ok()
            .or_else(|| {
                row.try_get::<Vec<u8>, _>(column)
                    .ok()
                    .and_then(|bytes| String::from_utf8(bytes).ok())
            })
            .unwrap_or_default()
    }

    /// Safely get an optional string from a MySQL row.
    fn get_optional_string(row: &sqlx::mysql::MySqlRow, column: &str) -> Option<String> {
        row.try_get::<Option<String>, _>(column)
            .ok()
            .flatten()
            .or_else(|| {
                row.try_get::<Option<Vec<u8>>, _>(column)
                    .ok()
                    .flatten()
                    .and_then(|bytes| String::from_utf8(bytes).ok())
            })
    }

    pub async fn list_tables(pool: &MySqlPool) -> DbResult<Vec<String>> {
        let rows = sqlx::query(queries::mysql::LIST_TABLES)
            .fetch_all(pool)
            .await?;

        let tables: Vec<String> = rows
            .iter()
            .map(|row| get_string(row, "TABLE_NAME"))
            .filter(|name| !name.is_empty())
            .collect();
        debug!(count = tables.len(), "Listed MySQL tables");
        Ok(tables)
    }

    pub async fn describe_table(pool: &MySqlPool, table_name: &str) -> DbResult<TableSchema> {
        let (columns, primary_keys) = fetch_columns(pool, table_name).await?;
        let foreign_keys = fetch_foreign_keys(pool, table_name).await?;
        let indexes = fetch_indexes(pool, table_name).await?;

        Ok(TableSchema {
            table_name: table_name.to_string(),
            columns,
            primary_keys,
            foreign_keys,
            indexes,
        })
    }

    async fn fetch_columns(
        pool: &MySqlPool,
        table_name: &str,
    ) -> DbResult<(Vec<ColumnDefinition>, Vec<String>)> {
        let rows = sqlx::query(queries::mysql::DESCRIBE_COLUMNS)
            .bind(table_name)
            .fetch_all(pool)
            .await?;

        let mut columns = Vec::with_capacity(rows.len());
        let mut primary_keys = Vec::new();
        for row in &rows {
            let name = get_string(row, "COLUMN_NAME");
            let column_type = get_string(row, "COLUMN_TYPE");
            let nullable = get_string(row, "IS_NULLABLE");
            let default_value = get_optional_string(row, "COLUMN_DEFAULT");
            if get_string(row, "COLUMN_KEY") == "PRI" {
                primary_keys.push(name.clone());
            }

            let mut col = ColumnDefinition::new(&name, &column_type, nullable == "YES");
            if let Some(ref def) = default_value {
                col = col.with_default_str(def);
            }
            columns.push(col);
        }
        Ok((columns, primary_keys))
    }

    async fn fetch_foreign_keys(pool: &MySqlPool, table_name: &str) -> DbResult<Vec<ForeignKey>> {
        let rows = sqlx::query(queries::mysql::DESCRIBE_FOREIGN_KEYS)
            .bind(table_name)
            .fetch_all(pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let name = get_string(row, "CONSTRAINT_NAME");
                let column = get_string(row, "COLUMN_NAME");
                let ref_table = get_string(row, "REFERENCED_TABLE_NAME");
                let ref_column = get_string(row, "REFERENCED_COLUMN_NAME");
                let delete_rule = get_string(row, "DELETE_RULE");
                let update_rule = get_string(row, "UPDATE_RULE");

                ForeignKey::new(column, ref_table, ref_column)
                    .with_name(name)
                    .with_on_delete(ForeignKeyAction::parse(&delete_rule))
                    .with_on_update(ForeignKeyAction::parse(&update_rule))
            })
            .collect())
    }

    async fn fetch_indexes(pool: &MySqlPool, table_name: &str) -> DbResult<Vec<IndexInfo>> {
        let rows = sqlx::query(queries::mysql::DESCRIBE_INDEXES)
            .bind(table_name)
            .fetch_all(pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let name = get_string(row, "INDEX_NAME");
                let columns_str = get_string(row, "COLUMN_NAMES");
                let is_unique: i64 = row.try_get("IS_UNIQUE").unwrap_or(0);
                let columns: Vec<String> = columns_str.split(',').map(|s| s.to_string()).collect();
                let is_primary = name == "PRIMARY";

                IndexInfo::new(name, columns)
                    .with_unique(is_unique != 0 || is_primary)
                    .with_primary(is_primary)
            })
            .collect())
    }
}
