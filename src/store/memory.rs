use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};
use tokio::sync::RwLock;

use super::{
    collection::DocumentCollection,
    error::StoreResult,
    query::{ID_FIELD, Query, SortSpec},
};

/// Process-local collection backend.
///
/// Documents are kept in insertion order, which is the natural order used by
/// `find_one` when several documents match.
#[derive(Debug, Default)]
pub struct InMemoryCollection {
    name: String,
    documents: RwLock<Vec<Document>>,
}

impl InMemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: RwLock::default(),
        }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentCollection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert_one(&self, document: Document) -> StoreResult<ObjectId> {
        let id = ObjectId::new();

        let mut stored = Document::new();
        stored.insert(ID_FIELD, id);
        for (key, value) in document {
            if key != ID_FIELD {
                stored.insert(key, value);
            }
        }

        self.documents.write().await.push(stored);
        Ok(id)
    }

    async fn find_one(&self, query: &Query) -> StoreResult<Option<Document>> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .find(|document| query.matches(document))
            .cloned())
    }

    async fn find_window(
        &self,
        query: &Query,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> StoreResult<Vec<Document>> {
        let mut items = self
            .documents
            .read()
            .await
            .iter()
            .filter(|document| query.matches(document))
            .cloned()
            .collect::<Vec<_>>();

        items.sort_by(|left, right| sort.compare(left, right));

        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(items.into_iter().skip(skip).take(limit).collect())
    }

    async fn count(&self, query: &Query) -> StoreResult<u64> {
        let matched = self
            .documents
            .read()
            .await
            .iter()
            .filter(|document| query.matches(document))
            .count();
        Ok(u64::try_from(matched).unwrap_or(u64::MAX))
    }

    async fn replace_one(&self, query: &Query, replacement: Document) -> StoreResult<u64> {
        let mut documents = self.documents.write().await;
        let Some(existing) = documents.iter_mut().find(|document| query.matches(document)) else {
            return Ok(0);
        };

        let id = existing.get(ID_FIELD).cloned().unwrap_or(Bson::Null);
        let mut replaced = Document::new();
        replaced.insert(ID_FIELD, id);
        for (key, value) in replacement {
            if key != ID_FIELD {
                replaced.insert(key, value);
            }
        }

        *existing = replaced;
        Ok(1)
    }

    async fn delete_one(&self, query: &Query) -> StoreResult<u64> {
        let mut documents = self.documents.write().await;
        let Some(position) = documents.iter().position(|document| query.matches(document)) else {
            return Ok(0);
        };

        documents.remove(position);
        Ok(1)
    }
}
