#![allow(dead_code)]

use async_trait::async_trait;
use schooladmin::domain::document::{Document, Fields, Query};
use schooladmin::domain::payment::PARENT_STUDENTS;
use schooladmin::domain::ports::DocumentStore;
use schooladmin::error::{AdminError, Result};
use schooladmin::infrastructure::in_memory::InMemoryDocumentStore;
use serde_json::Value;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Barrier;

pub fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be an object, got {other}"),
    }
}

/// Stores each `(parent_id, students)` pair as a parent document.
pub async fn seed_parents(store: &dyn DocumentStore, parents: &[(&str, Value)]) {
    for (id, students) in parents {
        let mut doc = Fields::new();
        doc.insert("students".into(), students.clone());
        store.put_document(PARENT_STUDENTS, id, doc).await.unwrap();
    }
}

pub fn generate_roster(path: &Path, parents: usize, students_per_parent: usize) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record([
        "parent_id",
        "student_id",
        "name",
        "student_email",
        "grade",
        "transaction_id",
        "amount",
        "payment_status",
    ])?;

    for p in 1..=parents {
        for s in 1..=students_per_parent {
            let student = format!("s{p}-{s}");
            wtr.write_record([
                format!("p{p}"),
                student.clone(),
                format!("Student {student}"),
                format!("{student}@school.test"),
                (s % 12 + 1).to_string(),
                format!("tx-{student}"),
                String::new(),
                String::new(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Wraps the in-memory store and counts every call that reaches it.
#[derive(Default, Clone)]
pub struct RecordingStore {
    inner: InMemoryDocumentStore,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl RecordingStore {
    pub fn new(inner: InMemoryDocumentStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }

    fn write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn scan_collection(&self, collection: &str) -> Result<Vec<Document>> {
        self.read();
        self.inner.scan_collection(collection).await
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.read();
        self.inner.get_document(collection, id).await
    }

    async fn write_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.write();
        self.inner.write_document(collection, id, fields).await
    }

    async fn put_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.write();
        self.inner.put_document(collection, id, fields).await
    }

    async fn create_document(&self, collection: &str, fields: Fields) -> Result<String> {
        self.write();
        self.inner.create_document(collection, fields).await
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        self.write();
        self.inner.delete_document(collection, id).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>> {
        self.read();
        self.inner.query(query).await
    }
}

/// Holds every scan at a barrier after the read has completed, so that a set
/// of concurrent callers all observe the same snapshot before any of them
/// writes.
pub struct GatedStore {
    inner: InMemoryDocumentStore,
    barrier: Barrier,
}

impl GatedStore {
    pub fn new(inner: InMemoryDocumentStore, callers: usize) -> Self {
        Self {
            inner,
            barrier: Barrier::new(callers),
        }
    }
}

#[async_trait]
impl DocumentStore for GatedStore {
    async fn scan_collection(&self, collection: &str) -> Result<Vec<Document>> {
        let snapshot = self.inner.scan_collection(collection).await?;
        self.barrier.wait().await;
        Ok(snapshot)
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.inner.get_document(collection, id).await
    }

    async fn write_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.inner.write_document(collection, id, fields).await
    }

    async fn put_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.inner.put_document(collection, id, fields).await
    }

    async fn create_document(&self, collection: &str, fields: Fields) -> Result<String> {
        self.inner.create_document(collection, fields).await
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        self.inner.delete_document(collection, id).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>> {
        self.inner.query(query).await
    }
}

/// Accepts a fixed number of document creations, then fails every call.
pub struct FlakyStore {
    inner: InMemoryDocumentStore,
    remaining: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: InMemoryDocumentStore, successful_creates: usize) -> Self {
        Self {
            inner,
            remaining: AtomicUsize::new(successful_creates),
        }
    }

    fn unavailable() -> AdminError {
        AdminError::remote("store unavailable")
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn scan_collection(&self, collection: &str) -> Result<Vec<Document>> {
        self.inner.scan_collection(collection).await
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.inner.get_document(collection, id).await
    }

    async fn write_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.inner.write_document(collection, id, fields).await
    }

    async fn put_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.inner.put_document(collection, id, fields).await
    }

    async fn create_document(&self, collection: &str, fields: Fields) -> Result<String> {
        let granted = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !granted {
            return Err(Self::unavailable());
        }
        self.inner.create_document(collection, fields).await
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        self.inner.delete_document(collection, id).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>> {
        self.inner.query(query).await
    }
}
