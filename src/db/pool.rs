//! Connection pool management.
//!
//! Pools are created lazily on first use and cached by database name.
//! Creation happens outside the cache lock; if two tasks race on the same
//! name, the first insert wins and the loser's pool is closed. A failed
//! creation caches nothing, so the next request retries from scratch.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use sqlx::{MySqlPool, PgPool, mysql::MySqlConnectOptions, mysql::MySqlPoolOptions, postgres::PgPoolOptions};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::models::{DatabaseConfig, DatabaseInfo, Dialect};
use crate::registry::DatabaseRegistry;

const MIN_CONNECTIONS: u32 = 1;
const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Database-specific connection pool (avoids AnyPool limitations).
#[derive(Debug, Clone)]
pub enum DbPool {
    MySql(MySqlPool),
    Postgres(PgPool),
}

impl DbPool {
    /// Close the connection pool.
    pub async fn close(&self) {
        match self {
            DbPool::MySql(pool) => pool.close().await,
            DbPool::Postgres(pool) => pool.close().await,
        }
    }

    /// Get the dialect for this pool.
    pub fn dialect(&self) -> Dialect {
        match self {
            DbPool::MySql(_) => Dialect::MySql,
            DbPool::Postgres(_) => Dialect::Postgres,
        }
    }
}

/// Owns the registry and the cache of live pools.
#[derive(Debug)]
pub struct ConnectionManager {
    registry: DatabaseRegistry,
    pools: RwLock<HashMap<String, DbPool>>,
}

impl ConnectionManager {
    /// Create a manager over a validated registry. No pools are opened here.
    pub fn new(registry: DatabaseRegistry) -> Self {
        Self {
            registry,
            pools: RwLock::new(HashMap::new()),
        }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &DatabaseRegistry {
        &self.registry
    }

    /// Credential-free summaries of all configured databases, in
    /// registration order.
    pub fn list_databases(&self) -> Vec<DatabaseInfo> {
        self.registry.list().map(DatabaseInfo::from).collect()
    }

    /// Get the pool for a named database, creating it on first use.
    pub async fn get_pool(&self, name: &str) -> DbResult<DbPool> {
        {
            let pools = self.pools.read().await;
            if let Some(pool) = pools.get(name) {
                return Ok(pool.clone());
            }
        }

        let config = self.registry.resolve(name)?;
        info!(database = %name, dialect = %config.dialect, "Opening connection pool");
        let pool = create_pool(config).await?;
        Ok(self.adopt_pool(name, pool).await)
    }

    /// Cache a freshly created pool unless a concurrent creator won the
    /// race in the meantime; then keep the cached pool and close the
    /// duplicate.
    async fn adopt_pool(&self, name: &str, pool: DbPool) -> DbPool {
        let mut pools = self.pools.write().await;
        if let Some(existing) = pools.get(name) {
            let existing = existing.clone();
            drop(pools);
            debug!(database = %name, "Lost pool creation race, closing duplicate");
            pool.close().await;
            return existing;
        }
        pools.insert(name.to_string(), pool.clone());
        pool
    }

    /// Number of pools currently open.
    pub async fn pool_count(&self) -> usize {
        let pools = self.pools.read().await;
        pools.len()
    }

    /// Close all pools and clear the cache. The registry is unaffected;
    /// subsequent requests reopen pools on demand.
    pub async fn teardown(&self) {
        let drained: Vec<(String, DbPool)> = {
            let mut pools = self.pools.write().await;
            pools.drain().collect()
        };
        for (name, pool) in drained {
            info!(database = %name, "Closing connection pool");
            pool.close().await;
        }
        info!("All connection pools closed");
    }
}

/// Create a connection pool for the given configuration.
///
/// Failures of the first connection attempt are reported as connection
/// errors regardless of what the backend said.
async fn create_pool(config: &DatabaseConfig) -> DbResult<DbPool> {
    let url = config.connection_url();
    match config.dialect {
        Dialect::MySql => {
            let options = MySqlConnectOptions::from_str(&url)
                .map_err(|e| {
                    DbError::config(format!(
                        "Invalid connection options for '{}': {}",
                        config.name, e
                    ))
                })?
                .charset("utf8mb4");

            let pool = MySqlPoolOptions::new()
                .min_connections(MIN_CONNECTIONS)
                .max_connections(MAX_CONNECTIONS)
                .acquire_timeout(ACQUIRE_TIMEOUT)
                .idle_timeout(IDLE_TIMEOUT)
                .connect_with(options)
                .await
                .map_err(|e| connect_error(config, &e))?;
            Ok(DbPool::MySql(pool))
        }
        Dialect::Postgres => {
            let pool = PgPoolOptions::new()
                .min_connections(MIN_CONNECTIONS)
                .max_connections(MAX_CONNECTIONS)
                .acquire_timeout(ACQUIRE_TIMEOUT)
                .idle_timeout(IDLE_TIMEOUT)
                .connect(&url)
                .await
                .map_err(|e| connect_error(config, &e))?;
            Ok(DbPool::Postgres(pool))
        }
    }
}

fn connect_error(config: &DatabaseConfig, err: &sqlx::Error) -> DbError {
    DbError::connection(format!(
        "Failed to connect to '{}' at {}:{}: {}",
        config.name, config.host, config.port, err
    ))
}
