pub mod blocks;
pub mod connection;
pub mod migrations;
pub mod store;

pub use blocks::BlockStore;
pub use connection::{connect, connect_with_settings, ping, DbPool};
pub use store::{InMemoryKeyValueStore, KeyValueStore, SqlKeyValueStore, StoreError};
