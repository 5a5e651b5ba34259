use crate::domain::document::{Document, Fields, Query, merge_fields};
use crate::domain::ports::{DocumentStore, ObjectStorage, ProgressFn};
use crate::error::{AdminError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A thread-safe in-memory document store.
///
/// Collections keep their documents in insertion order, which is the
/// enumeration order seen by scans. Ideal for tests and for running the CLI
/// without a persistent database.
#[derive(Default, Clone)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl InMemoryDocumentStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

pub(crate) fn new_document_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(20);
    id
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn scan_collection(&self, collection: &str) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn write_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| {
                AdminError::NotFound(format!("No document to update: {collection}/{id}"))
            })?;
        merge_fields(&mut doc.fields, fields);
        Ok(())
    }

    async fn put_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(existing) => existing.fields = fields,
            None => docs.push(Document::new(id, fields)),
        }
        Ok(())
    }

    async fn create_document(&self, collection: &str, fields: Fields) -> Result<String> {
        let id = new_document_id();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id.clone(), fields));
        Ok(id)
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.retain(|d| d.id != id);
        }
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>> {
        let documents = self.scan_collection(&query.collection).await?;
        Ok(query.apply(documents))
    }
}

/// Object storage that keeps uploaded bytes in memory and hands out
/// `memory://` URLs.
#[derive(Default, Clone)]
pub struct InMemoryObjectStorage {
    objects: Arc<RwLock<HashMap<String, (String, Vec<u8>)>>>,
}

impl InMemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content type and bytes stored under `path`.
    pub async fn object(&self, path: &str) -> Option<(String, Vec<u8>)> {
        self.objects.read().await.get(path).cloned()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<String> {
        if let Some(report) = progress {
            report(0.0);
        }
        self.objects
            .write()
            .await
            .insert(path.to_string(), (content_type.to_string(), bytes.to_vec()));
        if let Some(report) = progress {
            report(1.0);
        }
        Ok(format!("memory://{path}"))
    }
}
