use super::in_memory::new_document_id;
use crate::domain::document::{Document, Fields, Query, merge_fields};
use crate::domain::ports::DocumentStore;
use crate::error::{AdminError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding every document of every collection.
pub const CF_DOCUMENTS: &str = "documents";

/// A persistent document store backed by RocksDB.
///
/// Documents are keyed `<collection>/<id>` and stored as JSON, so a scan of a
/// collection is a prefix iteration and enumerates documents in id order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "documents" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_documents = ColumnFamilyDescriptor::new(CF_DOCUMENTS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_documents])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(CF_DOCUMENTS)
            .ok_or_else(|| AdminError::remote("Documents column family not found"))
    }

    fn key(collection: &str, id: &str) -> Vec<u8> {
        format!("{collection}/{id}").into_bytes()
    }

    fn load(&self, collection: &str, id: &str) -> Result<Option<Fields>> {
        let cf = self.cf()?;
        match self.db.get_cf(cf, Self::key(collection, id))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn save(&self, collection: &str, id: &str, fields: &Fields) -> Result<()> {
        let cf = self.cf()?;
        let value = serde_json::to_vec(fields)?;
        self.db.put_cf(cf, Self::key(collection, id), value)?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for RocksDBStore {
    async fn scan_collection(&self, collection: &str) -> Result<Vec<Document>> {
        let cf = self.cf()?;
        let prefix = format!("{collection}/");
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix.as_bytes(), Direction::Forward));

        let mut documents = Vec::new();
        for item in iter {
            let (key, value) = item?;
            let Some(id) = key.strip_prefix(prefix.as_bytes()) else {
                break;
            };
            let id = String::from_utf8_lossy(id).into_owned();
            let fields: Fields = serde_json::from_slice(&value)?;
            documents.push(Document::new(id, fields));
        }

        Ok(documents)
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        Ok(self
            .load(collection, id)?
            .map(|fields| Document::new(id, fields)))
    }

    async fn write_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let mut existing = self.load(collection, id)?.ok_or_else(|| {
            AdminError::NotFound(format!("No document to update: {collection}/{id}"))
        })?;
        merge_fields(&mut existing, fields);
        self.save(collection, id, &existing)
    }

    async fn put_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.save(collection, id, &fields)
    }

    async fn create_document(&self, collection: &str, fields: Fields) -> Result<String> {
        let id = new_document_id();
        self.save(collection, &id, &fields)?;
        Ok(id)
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        let cf = self.cf()?;
        self.db.delete_cf(cf, Self::key(collection, id))?;
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>> {
        let documents = self.scan_collection(&query.collection).await?;
        Ok(query.apply(documents))
    }
}
