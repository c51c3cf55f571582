use duckdb::Connection;
use tracing::{debug, warn};

use crate::db::service::DbService;
use crate::store::models::Thread;
use crate::store::StoreError;

/// Storage key holding the JSON array of threads.
pub const STORAGE_KEY: &str = "@chat";

pub fn load_threads(conn: &Connection) -> Result<Vec<Thread>, StoreError> {
    let Some(raw) = DbService::get_item(conn, STORAGE_KEY)? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str::<Vec<Thread>>(&raw) {
        Ok(threads) => Ok(threads),
        Err(e) => {
            warn!("Discarding unreadable chat history: {}", e);
            Ok(Vec::new())
        }
    }
}

pub fn save_threads(conn: &Connection, threads: &[Thread]) -> Result<(), StoreError> {
    let payload = serde_json::to_string(threads)?;
    DbService::set_item(conn, STORAGE_KEY, &payload)?;
    debug!("Persisted {} threads", threads.len());
    Ok(())
}

pub fn clear_threads(conn: &Connection) -> Result<(), StoreError> {
    DbService::remove_item(conn, STORAGE_KEY)?;
    Ok(())
}
