use async_trait::async_trait;
use bson::{Document, oid::ObjectId};

use super::{
    error::StoreResult,
    query::{Query, SortSpec},
};

/// Primitive operations over one collection of BSON documents.
///
/// Every method is a single round trip with per-document atomicity; nothing
/// here composes operations. Composition (read-after-write, existence checks)
/// belongs to [`super::DocumentStoreHandler`].
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    fn name(&self) -> &str;

    /// Inserts a document without an `_id`; the store assigns one and returns it.
    async fn insert_one(&self, document: Document) -> StoreResult<ObjectId>;

    async fn find_one(&self, query: &Query) -> StoreResult<Option<Document>>;

    async fn find_window(
        &self,
        query: &Query,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> StoreResult<Vec<Document>>;

    async fn count(&self, query: &Query) -> StoreResult<u64>;

    /// Replaces every field except `_id` of the first match. Returns the number
    /// of matched documents (0 or 1).
    async fn replace_one(&self, query: &Query, replacement: Document) -> StoreResult<u64>;

    /// Returns the number of removed documents (0 or 1).
    async fn delete_one(&self, query: &Query) -> StoreResult<u64>;
}
