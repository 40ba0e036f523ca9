//! SQLite backend for BingoMap.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. A single [`SqliteStore`] implements
//! both [`CredentialStore`](bingomap_core::store::CredentialStore) and
//! [`ViewerStore`](bingomap_core::store::ViewerStore).

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
