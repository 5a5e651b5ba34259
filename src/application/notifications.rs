use crate::domain::document::{Direction, Document, Fields, Query, now_iso};
use crate::domain::ports::DocumentStoreRef;
use crate::error::Result;
use serde_json::Value;

pub const NOTIFICATIONS: &str = "notifications";

#[derive(Clone)]
pub struct NotificationService {
    store: DocumentStoreRef,
}

impl NotificationService {
    pub fn new(store: DocumentStoreRef) -> Self {
        Self { store }
    }

    /// Newest first.
    pub async fn list_notifications(&self) -> Result<Vec<Document>> {
        let query = Query::collection(NOTIFICATIONS).order_by("timestamp", Direction::Descending);
        self.store.query(&query).await
    }

    pub async fn add_notification(&self, mut notification: Fields) -> Result<String> {
        notification.insert("timestamp".into(), Value::from(now_iso()));
        self.store.create_document(NOTIFICATIONS, notification).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::InMemoryDocumentStore;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_newest_first() {
        let service = NotificationService::new(Arc::new(InMemoryDocumentStore::new()));
        for title in ["Holiday", "Exam schedule"] {
            let mut notification = Fields::new();
            notification.insert("title".into(), json!(title));
            service.add_notification(notification).await.unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let titles: Vec<_> = service
            .list_notifications()
            .await
            .unwrap()
            .iter()
            .map(|n| n.str_field("title").unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["Exam schedule", "Holiday"]);
    }
}
