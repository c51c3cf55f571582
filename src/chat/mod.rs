pub mod controller;
pub mod query;

pub use controller::{ChatController, ChatError, SendOutcome, UploadOutcome};
pub use query::{ask, QueryError};
