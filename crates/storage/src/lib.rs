#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod sqlite;

pub use sqlite::SqliteStorage;
