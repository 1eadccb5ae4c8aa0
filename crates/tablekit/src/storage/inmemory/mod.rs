//! In-memory storage backend.
//!
//! Implements the `TableStore` contract over `HashMap`s wrapped in
//! `Arc<RwLock<_>>`, evaluating expressions locally. Used by the test suite
//! and by `--backend memory`. Data is lost when the store is dropped.
//!
//! # Example
//!
//! ```rust,ignore
//! use tablekit::storage::inmemory::InMemoryStore;
//!
//! let store = InMemoryStore::new();
//! store.create_table(&movies_table_definition()).await?;
//! ```

mod store;

pub use store::InMemoryStore;
