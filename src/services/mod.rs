// Service exports
pub mod memory;
pub mod password;
pub mod postgres;
pub mod store;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::{bounded, LedgerStore, LedgerTransaction, ProfileStore, StoreError};
