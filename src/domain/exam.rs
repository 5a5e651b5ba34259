use super::document::{Document, Fields};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const EXAMS: &str = "exams";
pub const QUESTIONS: &str = "questions";
pub const STUDENTS: &str = "students";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "MCQ")]
    Mcq,
    Subjective,
}

impl QuestionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Mcq => "MCQ",
            QuestionKind::Subjective => "Subjective",
        }
    }
}

/// Editable part of a standalone question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question_text: String,
    #[serde(default)]
    pub options: Option<Fields>,
    #[serde(default)]
    pub correct_answer: Option<Value>,
}

impl QuestionDraft {
    /// Fields written on both create and update; missing options become `{}`
    /// and a missing answer is stored as `null`.
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("type".into(), Value::from(self.kind.as_str()));
        fields.insert("questionText".into(), Value::from(self.question_text.clone()));
        fields.insert(
            "options".into(),
            Value::Object(self.options.clone().unwrap_or_default()),
        );
        fields.insert(
            "correctAnswer".into(),
            self.correct_answer.clone().unwrap_or(Value::Null),
        );
        fields
    }
}

/// One student's standing on a given exam.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResult {
    pub student_id: String,
    pub name: Option<Value>,
    pub email: Option<Value>,
    pub grade: Option<Value>,
    pub answers: Vec<Value>,
    pub status: String,
    pub published: bool,
}

impl StudentResult {
    /// Reads the per-exam entries of the `examAnswers`, `examStatus` and
    /// `examPublished` maps of a student document.
    pub fn from_document(doc: &Document, exam_id: &str) -> Self {
        let per_exam = |map: &str| doc.get(map).and_then(|m| m.get(exam_id));
        let present = |field: &str| doc.get(field).filter(|v| !v.is_null()).cloned();

        Self {
            student_id: doc.id.clone(),
            name: present("name"),
            email: present("email"),
            grade: present("grade"),
            answers: per_exam("examAnswers")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            status: per_exam("examStatus")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or("Pending")
                .to_string(),
            published: per_exam("examPublished")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ExamResults {
    pub students: Vec<StudentResult>,
    pub questions: Vec<Value>,
}

/// Parts of an exam result to overwrite; `None` leaves the stored value alone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultUpdate {
    pub answers: Option<Vec<Value>>,
    pub status: Option<String>,
    pub published: Option<bool>,
}

impl ResultUpdate {
    pub fn is_empty(&self) -> bool {
        self.answers.is_none() && self.status.is_none() && self.published.is_none()
    }

    /// Nested field paths scoped to one exam, e.g. `examStatus.<exam_id>`.
    pub fn to_fields(&self, exam_id: &str) -> Fields {
        let mut fields = Fields::new();
        if let Some(answers) = &self.answers {
            fields.insert(
                format!("examAnswers.{exam_id}"),
                Value::Array(answers.clone()),
            );
        }
        if let Some(status) = &self.status {
            fields.insert(format!("examStatus.{exam_id}"), Value::from(status.clone()));
        }
        if let Some(published) = self.published {
            fields.insert(format!("examPublished.{exam_id}"), Value::from(published));
        }
        fields
    }
}
