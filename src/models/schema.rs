//! Schema introspection data models.
//!
//! `TableSchema` is the dialect-neutral shape returned by `describe_table`:
//! the same field names and structure regardless of which backend produced it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnDefinition>,
    pub primary_keys: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<IndexInfo>,
}

impl TableSchema {
    /// Create a new table schema.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
            primary_keys: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Add a column definition.
    pub fn with_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Set the primary key columns.
    pub fn with_primary_keys(mut self, columns: Vec<String>) -> Self {
        self.primary_keys = columns;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColumnDefinition {
    pub name: String,
    /// Declared type as the backend reports it (e.g., `varchar(30)`, `bigint`)
    pub data_type: String,
    pub nullable: bool,
    /// Default value with appropriate JSON type based on column data type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
}

impl ColumnDefinition {
    /// Create a new column definition.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            default_value: None,
        }
    }

    /// Set the default value from a string, converting to the JSON type
    /// implied by the column's data_type.
    pub fn with_default_str(mut self, default_str: &str) -> Self {
        self.default_value = Some(parse_default_value(default_str, &self.data_type));
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub column: String,
    pub references_table: String,
    pub references_column: String,
    pub on_delete: ForeignKeyAction,
    pub on_update: ForeignKeyAction,
}

impl ForeignKey {
    /// Create a new foreign key.
    pub fn new(
        column: impl Into<String>,
        references_table: impl Into<String>,
        references_column: impl Into<String>,
    ) -> Self {
        Self {
            name: None,
            column: column.into(),
            references_table: references_table.into(),
            references_column: references_column.into(),
            on_delete: ForeignKeyAction::NoAction,
            on_update: ForeignKeyAction::NoAction,
        }
    }

    /// Set the constraint name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the on delete action.
    pub fn with_on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = action;
        self
    }

    /// Set the on update action.
    pub fn with_on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = action;
        self
    }
}

/// Foreign key referential action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyAction {
    /// No action (error if referenced)
    #[default]
    NoAction,
    /// Restrict (same as NoAction in most databases)
    Restrict,
    /// Cascade the operation
    Cascade,
    /// Set to NULL
    SetNull,
    /// Set to default value
    SetDefault,
}

impl ForeignKeyAction {
    /// Parse from database-specific string.
    pub fn parse(s: &str) -> Self {
        let upper = s.to_uppercase();
        match upper.as_str() {
            "CASCADE" => Self::Cascade,
            "SET NULL" => Self::SetNull,
            "SET DEFAULT" => Self::SetDefault,
            "RESTRICT" => Self::Restrict,
            _ => Self::NoAction,
        }
    }
}

impl std::fmt::Display for ForeignKeyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoAction => write!(f, "NO ACTION"),
            Self::Restrict => write!(f, "RESTRICT"),
            Self::Cascade => write!(f, "CASCADE"),
            Self::SetNull => write!(f, "SET NULL"),
            Self::SetDefault => write!(f, "SET DEFAULT"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IndexInfo {
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
    pub is_primary: bool,
}

impl IndexInfo {
    /// Create a new index info.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            is_unique: false,
            is_primary: false,
        }
    }

    /// Set whether this is a unique index.
    pub fn with_unique(mut self, is_unique: bool) -> Self {
        self.is_unique = is_unique;
        self
    }

    /// Set whether this is the primary key index.
    pub fn with_primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        if is_primary {
            self.is_unique = true;
        }
        self
    }
}

/// Parse a default value string into the appropriate JSON type based on column data type.
///
/// - Integer types (int, bigint, smallint, tinyint) → JSON Number
/// - Float types (float, double, real) → JSON Number
/// - Boolean types → JSON Boolean
/// - JSON/JSONB types → Parsed JSON value
/// - Decimal/numeric → JSON String (preserve precision)
/// - String types and expressions (CURRENT_TIMESTAMP, nextval, etc.) → JSON String
pub fn parse_default_value(default_str: &str, data_type: &str) -> serde_json::Value {
    let dt_lower = data_type.to_lowercase();

    if dt_lower.contains("int") || dt_lower.contains("serial") {
        if let Ok(n) = default_str.parse::<i64>() {
            return serde_json::Value::Number(n.into());
        }
    }

    if (dt_lower.contains("float") || dt_lower.contains("double") || dt_lower == "real")
        && !dt_lower.contains("decimal")
        && !dt_lower.contains("numeric")
    {
        if let Ok(n) = default_str.parse::<f64>() {
            if let Some(num) = serde_json::Number::from_f64(n) {
                return serde_json::Value::Number(num);
            }
        }
    }

    if dt_lower.contains("bool") {
        match default_str.to_lowercase().as_str() {
            "true" | "1" | "t" => return serde_json::Value::Bool(true),
            "false" | "0" | "f" => return serde_json::Value::Bool(false),
            _ => {}
        }
    }

    // JSON/JSONB types - try to parse as JSON
    if dt_lower == "json" || dt_lower == "jsonb" {
        if let Ok(parsed) = serde_json::from_str(default_str) {
            return parsed;
        }
    }

    // Everything else: decimal/numeric, varchar, text, expressions, etc.
    serde_json::Value::String(default_str.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_schema_builder() {
        let schema = TableSchema::new("users")
            .with_column(ColumnDefinition::new("id", "bigint", false))
            .with_column(ColumnDefinition::new("name", "varchar(100)", true))
            .with_primary_keys(vec!["id".to_string()]);

        assert_eq!(schema.table_name, "users");
        assert_eq!(schema.columns.len(), 2);
        assert_eq!(schema.primary_keys, vec!["id"]);
    }

    #[test]
    fn test_foreign_key_action_parsing() {
        assert_eq!(
            ForeignKeyAction::parse("CASCADE"),
            ForeignKeyAction::Cascade
        );
        assert_eq!(
            ForeignKeyAction::parse("SET NULL"),
            ForeignKeyAction::SetNull
        );
        assert_eq!(
            ForeignKeyAction::parse("UNKNOWN"),
            ForeignKeyAction::NoAction
        );
    }

    #[test]
    fn test_index_info_builder() {
        let index = IndexInfo::new("users_pkey", vec!["id".to_string()]).with_primary(true);

        assert!(index.is_primary);
        assert!(index.is_unique); // Primary implies unique
    }

    #[test]
    fn test_column_serialization_skips_missing_default() {
        let col = ColumnDefinition::new("name", "text", true);
        let json = serde_json::to_string(&col).unwrap();
        assert!(!json.contains("default_value"));

        let col = ColumnDefinition::new("age", "int", false).with_default_str("0");
        let json = serde_json::to_string(&col).unwrap();
        assert!(json.contains("\"default_value\":0"));
    }

    #[test]
    fn test_parse_default_value_integer_types() {
        assert_eq!(
            parse_default_value("42", "int"),
            serde_json::Value::Number(42.into())
        );
        assert_eq!(
            parse_default_value("-100", "bigint"),
            serde_json::Value::Number((-100).into())
        );
        assert_eq!(
            parse_default_value("5", "serial"),
            serde_json::Value::Number(5.into())
        );
    }

    #[test]
    fn test_parse_default_value_decimal_stays_string() {
        assert_eq!(
            parse_default_value("123.456789", "decimal(10,6)"),
            serde_json::Value::String("123.456789".to_string())
        );
        assert_eq!(
            parse_default_value("99.99", "numeric(5,2)"),
            serde_json::Value::String("99.99".to_string())
        );
    }

    #[test]
    fn test_parse_default_value_boolean() {
        assert_eq!(
            parse_default_value("true", "boolean"),
            serde_json::Value::Bool(true)
        );
        assert_eq!(
            parse_default_value("0", "boolean"),
            serde_json::Value::Bool(false)
        );
    }

    #[test]
    fn test_parse_default_value_expressions() {
        assert_eq!(
            parse_default_value("CURRENT_TIMESTAMP", "timestamp"),
            serde_json::Value::String("CURRENT_TIMESTAMP".to_string())
        );
        assert_eq!(
            parse_default_value("nextval('users_id_seq'::regclass)", "bigint"),
            serde_json::Value::String("nextval('users_id_seq'::regclass)".to_string())
        );
    }

    #[test]
    fn test_parse_default_value_json_types() {
        assert_eq!(parse_default_value("{}", "json"), serde_json::json!({}));
        assert_eq!(
            parse_default_value(r#"{"key": "value"}"#, "jsonb"),
            serde_json::json!({"key": "value"})
        );
        // Invalid JSON falls back to string
        assert_eq!(
            parse_default_value("not valid json", "json"),
            serde_json::Value::String("not valid json".to_string())
        );
    }
}
