//! Scoped key-value persistence.
//!
//! The places snapshot is one JSON string stored under one key, so a provider
//! only needs whole-value `get` and `set`. Encoding is the caller's concern.

mod file;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Error;

pub use crate::db::PgStore;
pub use file::FileStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait KeyValueStore {
    /// Returns `None` when nothing was ever stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Overwrites the value under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), Error>;
}

pub type DynStore = Arc<dyn KeyValueStore + Send + Sync>;
