use crate::domain::document::{Document, Query, now_iso};
use crate::domain::exam::{QUESTIONS, QuestionDraft};
use crate::domain::ports::DocumentStoreRef;
use crate::error::Result;
use serde_json::Value;
use tracing::error;

/// Standalone questions, each a document pointing at its exam via `examId`.
#[derive(Clone)]
pub struct QuestionService {
    store: DocumentStoreRef,
}

impl QuestionService {
    pub fn new(store: DocumentStoreRef) -> Self {
        Self { store }
    }

    pub async fn questions_by_exam(&self, exam_id: &str) -> Result<Vec<Document>> {
        let query = Query::collection(QUESTIONS).where_eq("examId", exam_id);
        self.store
            .query(&query)
            .await
            .inspect_err(|e| error!(exam = exam_id, "Error fetching questions: {}", e))
    }

    pub async fn add_question(&self, exam_id: &str, draft: &QuestionDraft) -> Result<String> {
        let mut fields = draft.to_fields();
        fields.insert("examId".into(), Value::from(exam_id));
        fields.insert("createdAt".into(), Value::from(now_iso()));
        self.store
            .create_document(QUESTIONS, fields)
            .await
            .inspect_err(|e| error!(exam = exam_id, "Error adding question: {}", e))
    }

    pub async fn update_question(&self, question_id: &str, draft: &QuestionDraft) -> Result<()> {
        let mut fields = draft.to_fields();
        fields.insert("updatedAt".into(), Value::from(now_iso()));
        self.store
            .write_document(QUESTIONS, question_id, fields)
            .await
            .inspect_err(|e| error!(question = question_id, "Error updating question: {}", e))
    }

    pub async fn delete_question(&self, question_id: &str) -> Result<()> {
        self.store
            .delete_document(QUESTIONS, question_id)
            .await
            .inspect_err(|e| error!(question = question_id, "Error deleting question: {}", e))
    }
}
