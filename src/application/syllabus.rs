use crate::domain::document::{Direction, Document, Fields, Query, now_iso};
use crate::domain::ports::{DocumentStoreRef, ObjectStorageRef, ProgressFn};
use crate::domain::upload::UploadFile;
use crate::error::Result;
use serde_json::Value;
use tracing::{error, info};

pub const SYLLABUS: &str = "syllabus";

/// Course documents: bytes go to object storage, metadata to the store.
#[derive(Clone)]
pub struct SyllabusService {
    store: DocumentStoreRef,
    storage: ObjectStorageRef,
}

impl SyllabusService {
    pub fn new(store: DocumentStoreRef, storage: ObjectStorageRef) -> Self {
        Self { store, storage }
    }

    /// Validates, uploads under `syllabus/<kind>/<name>` using only the final
    /// component of the file name, then records the metadata. Nothing is uploaded when validation fails.
    pub async fn upload_syllabus(
        &self,
        file: &UploadFile,
        course: &str,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<Document> {
        file.validate()?;

        let name = file.base_name();
        let path = format!("{}/{}/{}", SYLLABUS, file.kind().folder(), name);
        let url = self
            .storage
            .upload(&path, &file.bytes, &file.content_type, progress)
            .await
            .inspect_err(|e| error!(file = %file.name, "Upload failed: {}", e))?;
        info!(file = %file.name, %url, "Syllabus uploaded");

        let mut fields = Fields::new();
        fields.insert("course".into(), Value::from(course));
        fields.insert("fileName".into(), Value::from(name));
        fields.insert("fileURL".into(), Value::from(url));
        fields.insert("createdAt".into(), Value::from(now_iso()));

        let id = self.store.create_document(SYLLABUS, fields.clone()).await?;
        Ok(Document::new(id, fields))
    }

    /// Newest first.
    pub async fn list_syllabus(&self) -> Result<Vec<Document>> {
        let query = Query::collection(SYLLABUS).order_by("createdAt", Direction::Descending);
        self.store.query(&query).await
    }
}
