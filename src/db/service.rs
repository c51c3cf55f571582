use duckdb::{params, Connection, OptionalExt, Result as DbResult};

/// Key/value access to the `local_storage` table.
pub struct DbService;

impl DbService {
    pub fn get_item(conn: &Connection, key: &str) -> DbResult<Option<String>> {
        conn.query_row(
            "SELECT value FROM local_storage WHERE key = ?",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
    }

    pub fn set_item(conn: &Connection, key: &str, value: &str) -> DbResult<()> {
        conn.execute(
            "INSERT OR REPLACE INTO local_storage (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove_item(conn: &Connection, key: &str) -> DbResult<()> {
        conn.execute("DELETE FROM local_storage WHERE key = ?", params![key])?;
        Ok(())
    }
}
