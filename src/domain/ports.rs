use super::document::{Document, Fields, Query};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// The managed document store as the services consume it.
///
/// There is no primitive to update a single element of an embedded array;
/// callers rewrite the whole field. None of the methods provide
/// compare-and-swap semantics across calls.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of the collection, in the store's enumeration order.
    async fn scan_collection(&self, collection: &str) -> Result<Vec<Document>>;
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>>;
    /// Merges `fields` into an existing document. Dotted keys address nested
    /// map fields. Fails with `NotFound` when the document does not exist.
    async fn write_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()>;
    /// Creates or fully replaces the document stored under `id`.
    async fn put_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()>;
    async fn create_document(&self, collection: &str, fields: Fields) -> Result<String>;
    async fn delete_document(&self, collection: &str, id: &str) -> Result<()>;
    async fn query(&self, query: &Query) -> Result<Vec<Document>>;
}

pub type DocumentStoreRef = Arc<dyn DocumentStore>;

/// Upload progress as a fraction in `[0, 1]`.
pub type ProgressFn<'a> = &'a (dyn Fn(f64) + Send + Sync);

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `bytes` under `path` and returns a publicly retrievable URL.
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<String>;
}

pub type ObjectStorageRef = Arc<dyn ObjectStorage>;
