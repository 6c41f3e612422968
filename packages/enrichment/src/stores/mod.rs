//! Store backends: Postgres for production, in-memory for tests.

pub mod memory;
pub mod postgres;

pub use self::memory::MemoryStore;
pub use self::postgres::PostgresStore;
