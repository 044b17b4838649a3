pub mod db;

pub use db::{create_db, fetch_expenses, insert_expenses, DbPool, StorageError};
