pub mod connection;
pub mod service;

pub use connection::{get_connection, in_memory, DbPool};
