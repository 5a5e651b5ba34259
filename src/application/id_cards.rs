use crate::domain::document::{Document, Fields, Query, now_iso};
use crate::domain::id_card::{ID_CARDS, IdCardView, STUDENT_ID_CARDS};
use crate::domain::ports::DocumentStoreRef;
use crate::error::Result;
use chrono::Utc;
use futures::future::try_join_all;
use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{error, info};

static LAST_CARD_MILLIS: AtomicI64 = AtomicI64::new(0);

/// `IDC-<millis>`, strictly increasing within the process so cards issued in
/// the same millisecond still get distinct numbers.
pub fn next_card_number() -> String {
    let now = Utc::now().timestamp_millis();
    let previous = LAST_CARD_MILLIS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    format!("IDC-{}", now.max(previous + 1))
}

#[derive(Clone)]
pub struct IdCardService {
    store: DocumentStoreRef,
}

impl IdCardService {
    pub fn new(store: DocumentStoreRef) -> Self {
        Self { store }
    }

    /// Issues a card carrying the given student fields.
    pub async fn generate_id_card(&self, student: Fields) -> Result<Document> {
        let mut card = student;
        card.insert("generatedAt".into(), Value::from(now_iso()));
        card.insert("cardNumber".into(), Value::from(next_card_number()));
        card.insert("status".into(), Value::from("active"));
        card.insert("printed".into(), Value::Bool(false));
        card.insert("printedAt".into(), Value::Null);

        let id = self
            .store
            .create_document(ID_CARDS, card.clone())
            .await
            .inspect_err(|e| error!("Error generating ID card: {}", e))?;
        Ok(Document::new(id, card))
    }

    /// Issues every card concurrently. Fails as a whole if any creation
    /// fails; cards created before the failure are not removed.
    pub async fn bulk_generate(&self, students: Vec<Fields>) -> Result<Vec<Document>> {
        let count = students.len();
        let cards = try_join_all(
            students
                .into_iter()
                .map(|student| self.generate_id_card(student)),
        )
        .await
        .inspect_err(|e| error!("Error bulk generating ID cards: {}", e))?;
        info!(count, "ID cards generated");
        Ok(cards)
    }

    pub async fn list_id_cards(&self) -> Result<Vec<Document>> {
        self.store.scan_collection(ID_CARDS).await
    }

    pub async fn id_card_for_student(&self, student_id: &str) -> Result<Option<Document>> {
        let query = Query::collection(ID_CARDS).where_eq("studentId", student_id);
        Ok(self.store.query(&query).await?.into_iter().next())
    }

    pub async fn update_id_card(&self, card_id: &str, fields: Fields) -> Result<()> {
        self.store.write_document(ID_CARDS, card_id, fields).await
    }

    pub async fn delete_id_card(&self, card_id: &str) -> Result<()> {
        self.store.delete_document(ID_CARDS, card_id).await
    }

    pub async fn mark_printed(&self, card_id: &str) -> Result<()> {
        let mut fields = Fields::new();
        fields.insert("printed".into(), Value::Bool(true));
        fields.insert("printedAt".into(), Value::from(now_iso()));
        self.store.write_document(ID_CARDS, card_id, fields).await
    }

    /// The card published for a signed-in student, as the mobile app shows it.
    pub async fn card_view(&self, user_id: &str) -> Result<Option<IdCardView>> {
        Ok(self
            .store
            .get_document(STUDENT_ID_CARDS, user_id)
            .await?
            .map(|doc| IdCardView::from_document(&doc)))
    }
}
