use super::document::Document;
use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use serde_json::Value;

/// Cards issued from the admin panel.
pub const ID_CARDS: &str = "idCards";
/// Cards published for the mobile app, keyed by the student's auth uid.
pub const STUDENT_ID_CARDS: &str = "student_id_cards";

/// What the mobile screen displays for a previously generated card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdCardView {
    pub initials: String,
    pub student_name: Option<String>,
    pub grade: Option<String>,
    pub student_id: Option<String>,
    pub email: Option<String>,
    pub issue_date: String,
    pub valid_until: String,
    pub qr_code_data: Option<String>,
    pub card_number: Option<String>,
    pub status: String,
    pub last_updated: String,
    pub view_count: u64,
    pub download_count: u64,
}

impl IdCardView {
    pub fn from_document(doc: &Document) -> Self {
        let text = |field: &str| match doc.get(field) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let count = |field: &str| doc.get(field).and_then(Value::as_u64).unwrap_or(0);

        let student_name = text("studentName");
        Self {
            initials: initials(student_name.as_deref()),
            grade: text("studentGrade"),
            student_id: text("studentId"),
            email: text("studentEmail"),
            issue_date: month_year(text("issueDate").as_deref()),
            valid_until: month_year(text("validUntil").as_deref()),
            qr_code_data: text("qrCodeData"),
            card_number: text("cardNumber"),
            status: text("status").unwrap_or_default().to_uppercase(),
            last_updated: month_year(text("lastUpdated").as_deref()),
            view_count: count("viewCount"),
            download_count: count("downloadCount"),
            student_name,
        }
    }
}

/// First letter of each name part, upper-cased, at most two letters.
pub fn initials(name: Option<&str>) -> String {
    match name.map(str::trim) {
        None | Some("") => "??".to_string(),
        Some(name) => name
            .split(' ')
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect(),
    }
}

/// `"MAR 2025"` style date, or `"N/A"` when absent or unparsable.
pub fn month_year(date: Option<&str>) -> String {
    let Some(raw) = date.filter(|d| !d.is_empty()) else {
        return "N/A".to_string();
    };
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"));
    match parsed {
        Ok(day) => day.format("%b %Y").to_string().to_uppercase(),
        Err(_) => "N/A".to_string(),
    }
}
