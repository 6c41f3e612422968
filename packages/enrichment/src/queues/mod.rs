//! Queue backends: Redis for production, in-memory for tests.

pub mod memory;
pub mod redis;

pub use self::memory::MemoryQueue;
pub use self::redis::RedisQueue;
