use std::{marker::PhantomData, sync::Arc};

use bson::Document;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::{
    collection::DocumentCollection,
    error::{StoreError, StoreResult},
    mongo::MongoClient,
    page::{PageRequest, Paginated},
    query::{ID_FIELD, Query, SortSpec},
};

/// Typed access to one document collection.
///
/// Mutations follow a write-then-read protocol: `add` and `update` re-read the
/// affected record and return what the store now holds. If the read-back step
/// fails, the operation fails as a whole even though the write went through.
/// Missing records are reported as `Ok(None)` (or `Ok(false)` for `delete`);
/// errors are reserved for store faults, paging misuse and undecodable
/// documents.
pub struct DocumentStoreHandler<T> {
    collection: Arc<dyn DocumentCollection>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for DocumentStoreHandler<T> {
    fn clone(&self) -> Self {
        Self {
            collection: Arc::clone(&self.collection),
            _record: PhantomData,
        }
    }
}

impl<T> DocumentStoreHandler<T>
where
    T: DeserializeOwned + Send,
{
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        Self {
            collection,
            _record: PhantomData,
        }
    }

    /// Opens a MongoDB session and binds the handler to
    /// `collection_namespace.collection_name`.
    pub async fn connect(
        store_address: &str,
        collection_namespace: &str,
        collection_name: &str,
    ) -> StoreResult<Self> {
        let client = MongoClient::connect(store_address).await?;
        Ok(Self::new(Arc::new(
            client.collection(collection_namespace, collection_name),
        )))
    }

    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }

    pub async fn add<I>(&self, record: &I) -> StoreResult<Option<T>>
    where
        I: Serialize + Sync + ?Sized,
    {
        let document = encode(record)?;
        let id = self.collection.insert_one(document).await?;
        debug!(collection = self.collection_name(), %id, "inserted document");

        let stored = self.retrieve_one(&Query::by_id(id)).await?;
        if stored.is_none() {
            warn!(
                collection = self.collection_name(),
                %id,
                "inserted document is not visible on read-back"
            );
        }
        Ok(stored)
    }

    pub async fn retrieve_page(
        &self,
        query: &Query,
        page: i64,
        sort: &SortSpec,
        limit: i64,
    ) -> StoreResult<Paginated<T>> {
        let window = PageRequest::new(page, limit)?;
        debug!(
            collection = self.collection_name(),
            page = window.page(),
            limit = window.limit(),
            skip = window.skip(),
            "retrieving page"
        );

        let (documents, total_count) = tokio::try_join!(
            self.collection
                .find_window(query, sort, window.skip(), window.limit()),
            self.collection.count(query),
        )?;

        let items = documents
            .into_iter()
            .map(|document| self.decode(document))
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Paginated {
            items,
            page_count: window.page_count(total_count),
            total_count,
        })
    }

    pub async fn retrieve_one(&self, query: &Query) -> StoreResult<Option<T>> {
        self.collection
            .find_one(query)
            .await?
            .map(|document| self.decode(document))
            .transpose()
    }

    /// Replaces the full field set of the record matching `query`.
    ///
    /// A query that matches nothing leaves the collection untouched and
    /// yields `Ok(None)`.
    pub async fn update<I>(&self, query: &Query, record: &I) -> StoreResult<Option<T>>
    where
        I: Serialize + Sync + ?Sized,
    {
        let replacement = encode(record)?;
        let matched = self.collection.replace_one(query, replacement).await?;
        debug!(collection = self.collection_name(), matched, "replaced document");

        self.retrieve_one(query).await
    }

    pub async fn delete(&self, query: &Query) -> StoreResult<bool> {
        if !self.exists(query).await? {
            return Ok(false);
        }

        let deleted = self.collection.delete_one(query).await?;
        debug!(collection = self.collection_name(), deleted, "deleted document");
        Ok(deleted > 0)
    }

    pub async fn exists(&self, query: &Query) -> StoreResult<bool> {
        Ok(self.collection.find_one(query).await?.is_some())
    }

    fn decode(&self, document: Document) -> StoreResult<T> {
        bson::from_document(document).map_err(|err| StoreError::MalformedDocument {
            collection: self.collection_name().to_string(),
            message: err.to_string(),
        })
    }
}

/// Serialises a record into its stored form. Identity is never part of the
/// payload; the store owns it.
fn encode<I>(record: &I) -> StoreResult<Document>
where
    I: Serialize + ?Sized,
{
    let mut document = bson::to_document(record)?;
    document.remove(ID_FIELD);
    Ok(document)
}
