use crate::domain::document::{Document, Fields};
use crate::domain::exam::EXAMS;
use crate::domain::ports::DocumentStoreRef;
use crate::error::{AdminError, Result};
use serde_json::Value;

/// Exams and the question list embedded in each exam document.
#[derive(Clone)]
pub struct ExamService {
    store: DocumentStoreRef,
}

impl ExamService {
    pub fn new(store: DocumentStoreRef) -> Self {
        Self { store }
    }

    pub async fn list_exams(&self) -> Result<Vec<Document>> {
        self.store.scan_collection(EXAMS).await
    }

    pub async fn add_exam(&self, exam: Fields) -> Result<String> {
        self.store.create_document(EXAMS, exam).await
    }

    pub async fn update_exam(&self, exam_id: &str, fields: Fields) -> Result<()> {
        self.store.write_document(EXAMS, exam_id, fields).await
    }

    /// Soft delete: the exam stays in the collection flagged `deleted: true`.
    pub async fn delete_exam(&self, exam_id: &str) -> Result<()> {
        let mut fields = Fields::new();
        fields.insert("deleted".into(), Value::Bool(true));
        self.store.write_document(EXAMS, exam_id, fields).await
    }

    /// Questions embedded in the exam; empty when the exam does not exist.
    pub async fn exam_questions(&self, exam_id: &str) -> Result<Vec<Value>> {
        Ok(self
            .store
            .get_document(EXAMS, exam_id)
            .await?
            .map(|doc| embedded_questions(&doc))
            .unwrap_or_default())
    }

    pub async fn add_question_to_exam(&self, exam_id: &str, question: Value) -> Result<()> {
        let mut questions = self.existing_questions(exam_id).await?;
        questions.push(question);
        self.save_questions(exam_id, questions).await
    }

    pub async fn update_exam_question(
        &self,
        exam_id: &str,
        index: usize,
        question: Value,
    ) -> Result<()> {
        let mut questions = self.existing_questions(exam_id).await?;
        let slot = questions
            .get_mut(index)
            .ok_or_else(|| out_of_range(exam_id, index))?;
        *slot = question;
        self.save_questions(exam_id, questions).await
    }

    pub async fn delete_exam_question(&self, exam_id: &str, index: usize) -> Result<()> {
        let mut questions = self.existing_questions(exam_id).await?;
        if index >= questions.len() {
            return Err(out_of_range(exam_id, index));
        }
        questions.remove(index);
        self.save_questions(exam_id, questions).await
    }

    async fn existing_questions(&self, exam_id: &str) -> Result<Vec<Value>> {
        let doc = self
            .store
            .get_document(EXAMS, exam_id)
            .await?
            .ok_or_else(|| AdminError::NotFound(format!("Exam {exam_id} not found")))?;
        Ok(embedded_questions(&doc))
    }

    async fn save_questions(&self, exam_id: &str, questions: Vec<Value>) -> Result<()> {
        let mut fields = Fields::new();
        fields.insert("questions".into(), Value::Array(questions));
        self.store.write_document(EXAMS, exam_id, fields).await
    }
}

pub(crate) fn embedded_questions(doc: &Document) -> Vec<Value> {
    doc.get("questions")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn out_of_range(exam_id: &str, index: usize) -> AdminError {
    AdminError::Validation(format!("Exam {exam_id} has no question at index {index}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::InMemoryDocumentStore;
    use serde_json::json;
    use std::sync::Arc;

    async fn service_with_exam() -> (ExamService, String) {
        let service = ExamService::new(Arc::new(InMemoryDocumentStore::new()));
        let mut exam = Fields::new();
        exam.insert("title".into(), json!("Science Midterm"));
        let id = service.add_exam(exam).await.unwrap();
        (service, id)
    }

    #[tokio::test]
    async fn test_embedded_question_editing() {
        let (service, id) = service_with_exam().await;

        service.add_question_to_exam(&id, json!({"q": "one"})).await.unwrap();
        service.add_question_to_exam(&id, json!({"q": "two"})).await.unwrap();
        service.add_question_to_exam(&id, json!({"q": "three"})).await.unwrap();
        service
            .update_exam_question(&id, 1, json!({"q": "TWO"}))
            .await
            .unwrap();
        service.delete_exam_question(&id, 0).await.unwrap();

        let questions = service.exam_questions(&id).await.unwrap();
        assert_eq!(questions, vec![json!({"q": "TWO"}), json!({"q": "three"})]);
    }

    #[tokio::test]
    async fn test_question_index_out_of_range() {
        let (service, id) = service_with_exam().await;
        service.add_question_to_exam(&id, json!({"q": "one"})).await.unwrap();

        let update = service.update_exam_question(&id, 3, json!({})).await;
        let delete = service.delete_exam_question(&id, 1).await;

        assert!(matches!(update, Err(AdminError::Validation(_))));
        assert!(matches!(delete, Err(AdminError::Validation(_))));
        assert_eq!(service.exam_questions(&id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_exam() {
        let (service, _) = service_with_exam().await;

        assert!(service.exam_questions("ghost").await.unwrap().is_empty());
        let result = service.add_question_to_exam("ghost", json!({})).await;
        assert!(matches!(result, Err(AdminError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_exam_is_soft() {
        let (service, id) = service_with_exam().await;
        service.delete_exam(&id).await.unwrap();

        let exams = service.list_exams().await.unwrap();
        assert_eq!(exams.len(), 1);
        assert_eq!(exams[0].get("deleted"), Some(&json!(true)));
        assert_eq!(exams[0].get("title"), Some(&json!("Science Midterm")));
    }
}
