//! MongoDB collection backend.

use std::time::Duration;

use async_trait::async_trait;
use bson::{Document, doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{Client, Collection, options::ClientOptions};
use tracing::info;

use super::{
    collection::DocumentCollection,
    error::{StoreError, StoreResult},
    query::{ID_FIELD, Query, SortSpec},
};

/// Bounds how long startup waits for an unreachable server.
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(3);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Process-wide MongoDB session. Cloning shares the underlying connection pool.
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
}

impl MongoClient {
    /// Connects and pings the server so that an unreachable store fails here
    /// rather than on the first request.
    pub async fn connect(store_address: &str) -> StoreResult<Self> {
        info!(store_address, "connecting to document store");

        let mut options = ClientOptions::parse(store_address).await?;
        options
            .server_selection_timeout
            .get_or_insert(SERVER_SELECTION_TIMEOUT);
        options.connect_timeout.get_or_insert(CONNECT_TIMEOUT);

        let client = Client::with_options(options)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|err| StoreError::unavailable(format!("ping failed: {err}")))?;

        info!("document store reachable");
        Ok(Self { client })
    }

    pub fn collection(&self, namespace: &str, collection_name: &str) -> MongoCollection {
        MongoCollection {
            inner: self
                .client
                .database(namespace)
                .collection::<Document>(collection_name),
            name: collection_name.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MongoCollection {
    inner: Collection<Document>,
    name: String,
}

#[async_trait]
impl DocumentCollection for MongoCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert_one(&self, mut document: Document) -> StoreResult<ObjectId> {
        document.remove(ID_FIELD);

        let result = self.inner.insert_one(document).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::unavailable("store did not return an ObjectId for the insert"))
    }

    async fn find_one(&self, query: &Query) -> StoreResult<Option<Document>> {
        Ok(self.inner.find_one(query.to_filter()).await?)
    }

    async fn find_window(
        &self,
        query: &Query,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> StoreResult<Vec<Document>> {
        let cursor = self
            .inner
            .find(query.to_filter())
            .sort(sort.to_document())
            .skip(skip)
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await?;

        // A cursor error mid-stream fails the whole window.
        Ok(cursor.try_collect().await?)
    }

    async fn count(&self, query: &Query) -> StoreResult<u64> {
        Ok(self.inner.count_documents(query.to_filter()).await?)
    }

    async fn replace_one(&self, query: &Query, mut replacement: Document) -> StoreResult<u64> {
        replacement.remove(ID_FIELD);

        let result = self.inner.replace_one(query.to_filter(), replacement).await?;
        Ok(result.matched_count)
    }

    async fn delete_one(&self, query: &Query) -> StoreResult<u64> {
        let result = self.inner.delete_one(query.to_filter()).await?;
        Ok(result.deleted_count)
    }
}
