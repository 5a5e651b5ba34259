use crate::domain::document::Document;
use crate::domain::exam::STUDENTS;
use crate::domain::ports::DocumentStoreRef;
use crate::error::Result;

/// Read access to the student roster.
#[derive(Clone)]
pub struct StudentService {
    store: DocumentStoreRef,
}

impl StudentService {
    pub fn new(store: DocumentStoreRef) -> Self {
        Self { store }
    }

    pub async fn list_students(&self) -> Result<Vec<Document>> {
        self.store.scan_collection(STUDENTS).await
    }
}
