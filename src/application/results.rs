use super::exams::embedded_questions;
use crate::domain::document::Query;
use crate::domain::exam::{EXAMS, ExamResults, ResultUpdate, STUDENTS, StudentResult};
use crate::domain::ports::DocumentStoreRef;
use crate::error::Result;

#[derive(Clone)]
pub struct ResultService {
    store: DocumentStoreRef,
}

impl ResultService {
    pub fn new(store: DocumentStoreRef) -> Self {
        Self { store }
    }

    /// Questions of the exam plus every student assigned to it.
    pub async fn exam_results(&self, exam_id: &str) -> Result<ExamResults> {
        let Some(exam) = self.store.get_document(EXAMS, exam_id).await? else {
            return Ok(ExamResults::default());
        };

        let query = Query::collection(STUDENTS).where_array_contains("exams", exam_id);
        let students = self
            .store
            .query(&query)
            .await?
            .iter()
            .map(|doc| StudentResult::from_document(doc, exam_id))
            .collect();

        Ok(ExamResults {
            students,
            questions: embedded_questions(&exam),
        })
    }

    /// Writes only the parts present in `update`, scoped to this exam.
    pub async fn update_exam_result(
        &self,
        exam_id: &str,
        student_id: &str,
        update: &ResultUpdate,
    ) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }
        self.store
            .write_document(STUDENTS, student_id, update.to_fields(exam_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::Fields;
    use crate::domain::ports::DocumentStore;
    use crate::infrastructure::in_memory::InMemoryDocumentStore;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(m) => m,
            _ => panic!("fixture must be an object"),
        }
    }

    async fn seeded() -> (ResultService, InMemoryDocumentStore) {
        let store = InMemoryDocumentStore::new();
        store
            .put_document(EXAMS, "e1", fields(json!({"questions": [{"q": "1+1"}]})))
            .await
            .unwrap();
        store
            .put_document(
                STUDENTS,
                "st1",
                fields(json!({
                    "name": "Nila",
                    "exams": ["e1"],
                    "examAnswers": {"e1": ["2"]},
                    "examStatus": {"e1": "Passed"},
                    "examPublished": {"e1": true}
                })),
            )
            .await
            .unwrap();
        store
            .put_document(STUDENTS, "st2", fields(json!({"name": "Omar", "exams": ["e9"]})))
            .await
            .unwrap();
        (ResultService::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_exam_results() {
        let (service, _) = seeded().await;
        let results = service.exam_results("e1").await.unwrap();

        assert_eq!(results.questions, vec![json!({"q": "1+1"})]);
        assert_eq!(results.students.len(), 1);
        let nila = &results.students[0];
        assert_eq!(nila.student_id, "st1");
        assert_eq!(nila.answers, vec![json!("2")]);
        assert_eq!(nila.status, "Passed");
        assert!(nila.published);
    }

    #[tokio::test]
    async fn test_missing_exam_yields_empty_results() {
        let (service, _) = seeded().await;
        assert_eq!(service.exam_results("nope").await.unwrap(), ExamResults::default());
    }

    #[tokio::test]
    async fn test_update_only_touches_given_parts() {
        let (service, store) = seeded().await;
        let update = ResultUpdate {
            status: Some("Failed".into()),
            ..Default::default()
        };
        service.update_exam_result("e2", "st1", &update).await.unwrap();

        let doc = store.get_document(STUDENTS, "st1").await.unwrap().unwrap();
        assert_eq!(
            doc.get("examStatus"),
            Some(&json!({"e1": "Passed", "e2": "Failed"}))
        );
        assert_eq!(doc.get("examAnswers"), Some(&json!({"e1": ["2"]})));
    }
}
