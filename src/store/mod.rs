//! Paginated document-access layer.
//!
//! [`DocumentStoreHandler`] is the typed facade used by services. It sits on a
//! [`DocumentCollection`] backend: [`MongoCollection`] in production,
//! [`InMemoryCollection`] for tests and local runs.

pub mod collection;
pub mod error;
pub mod handler;
pub mod memory;
pub mod mongo;
pub mod page;
pub mod query;

pub use collection::DocumentCollection;
pub use error::{StoreError, StoreResult};
pub use handler::DocumentStoreHandler;
pub use memory::InMemoryCollection;
pub use mongo::{MongoClient, MongoCollection};
pub use page::{PageRequest, Paginated};
pub use query::{ID_FIELD, Query, SortDirection, SortKey, SortSpec};
