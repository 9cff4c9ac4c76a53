//! Named database registry.
//!
//! Holds the validated configurations keyed by name and remembers the order
//! they were registered in, so listings are stable across calls. Registering
//! a name twice replaces the configuration but keeps the original position.

use std::collections::HashMap;

use crate::error::{DbError, DbResult};
use crate::models::DatabaseConfig;

#[derive(Debug, Default)]
pub struct DatabaseRegistry {
    entries: HashMap<String, DatabaseConfig>,
    order: Vec<String>,
}

impl DatabaseRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a database. Last write wins for duplicate names.
    pub fn register(&mut self, config: DatabaseConfig) {
        if !self.entries.contains_key(&config.name) {
            self.order.push(config.name.clone());
        }
        self.entries.insert(config.name.clone(), config);
    }

    /// Look up a database by name.
    pub fn resolve(&self, name: &str) -> DbResult<&DatabaseConfig> {
        self.entries.get(name).ok_or_else(|| {
            DbError::config(format!(
                "Database '{}' is not configured. Available databases: {}",
                name,
                self.describe_names()
            ))
        })
    }

    /// All configurations in registration order.
    pub fn list(&self) -> impl Iterator<Item = &DatabaseConfig> {
        self.order.iter().filter_map(|name| self.entries.get(name))
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn describe_names(&self) -> String {
        if self.order.is_empty() {
            "(none)".to_string()
        } else {
            self.order.join(", ")
        }
    }
}
