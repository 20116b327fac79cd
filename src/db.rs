//! Persistence for captures. The application only needs a flat key-value
//! capability (item name -> serialized capture), so the SQLite schema is a
//! single table and the rest of the crate talks to the [`KeyValueStore`] trait.

mod connection;
mod store;

pub use connection::{default_db_path, ensure_schema, DATA_DIR_NAME};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError};
