use crate::config::StorageConfig;
use duckdb::{Connection, Result as DbResult};
use std::sync::{Arc, Mutex};
use tracing::info;

pub type DbPool = Arc<Mutex<Connection>>;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS local_storage (
    key VARCHAR PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#;

pub fn get_connection(config: &StorageConfig) -> DbResult<DbPool> {
    info!("Opening local storage at {}", config.path);
    let conn = if config.path == ":memory:" {
        Connection::open_in_memory()?
    } else {
        Connection::open(&config.path)?
    };

    init_schema(&conn)?;

    Ok(Arc::new(Mutex::new(conn)))
}

/// In-memory storage, gone when the pool is dropped.
pub fn in_memory() -> DbResult<DbPool> {
    get_connection(&StorageConfig {
        path: ":memory:".to_string(),
    })
}

fn init_schema(conn: &Connection) -> DbResult<()> {
    info!("Initializing local storage schema");
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
