pub mod auth;
pub mod backend;
pub mod chat;
pub mod cli;
pub mod config;
pub mod db;
pub mod store;
pub mod upload;
