use super::document::{Document, Fields};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Collection holding one document per guardian, each embedding its students.
pub const PARENT_STUDENTS: &str = "parent_students";

/// Fee applied at read time when a record carries no amount.
pub const DEFAULT_AMOUNT: Decimal = dec!(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Rejected,
}

impl PaymentStatus {
    /// `Paid` and `Rejected` are decisions; `Pending` is not.
    pub fn is_terminal(self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "rejected" => Ok(PaymentStatus::Rejected),
            other => Err(format!("unknown payment status '{other}'")),
        }
    }
}

/// Whether a decided payment may be decided again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// `Paid -> Rejected` and `Rejected -> Paid` are accepted.
    #[default]
    AllowRetransition,
    /// Once `Paid` or `Rejected`, a record keeps its status.
    TerminalIsFinal,
}

impl TransitionPolicy {
    pub fn permits(self, from: PaymentStatus, to: PaymentStatus) -> bool {
        match self {
            TransitionPolicy::AllowRetransition => true,
            TransitionPolicy::TerminalIsFinal => !from.is_terminal() || from == to,
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow-retransition" => Ok(TransitionPolicy::AllowRetransition),
            "terminal-is-final" => Ok(TransitionPolicy::TerminalIsFinal),
            other => Err(format!(
                "unknown transition policy '{other}' (expected allow-retransition or terminal-is-final)"
            )),
        }
    }
}

/// One student's fee-payment attempt, embedded in a parent document.
///
/// Every field is optional on the wire. Only the identifiers and the status
/// must be readable; descriptive fields of an unexpected shape read as absent.
/// Defaults for `amount` and `paymentStatus` are applied by [`PaymentView`],
/// never written back.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPaymentRecord {
    #[serde(default, deserialize_with = "text_like")]
    pub student_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub student_email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub grade: Option<String>,
    #[serde(rename = "transactionID", default, deserialize_with = "text_like")]
    pub transaction_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<Decimal>,
    #[serde(default, deserialize_with = "status_or_unset")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub updated_at: Option<String>,
}

impl StudentPaymentRecord {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// A record takes part in payment workflows only once a transaction id
    /// has been submitted.
    pub fn has_transaction(&self) -> bool {
        self.transaction_id.as_deref().is_some_and(|tx| !tx.is_empty())
    }

    pub fn is_payment(&self, student_id: &str, transaction_id: &str) -> bool {
        self.has_transaction()
            && self.student_id.as_deref() == Some(student_id)
            && self.transaction_id.as_deref() == Some(transaction_id)
    }

    pub fn status(&self) -> PaymentStatus {
        self.payment_status.unwrap_or_default()
    }
}

// Legacy documents hold ids and grades either as strings or numbers.
fn text_like<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}

// Descriptive fields never make a record unreadable.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => {
            warn!("Ignoring unreadable text field: {}", other);
            None
        }
    })
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    };
    let parsed = Decimal::from_str(raw.trim())
        .or_else(|_| Decimal::from_scientific(raw.trim()));
    match parsed {
        Ok(amount) => Ok(Some(amount)),
        Err(e) => {
            warn!(amount = %raw, "Unreadable amount, using the default fee: {}", e);
            Ok(None)
        }
    }
}

fn status_or_unset<'de, D>(deserializer: D) -> Result<Option<PaymentStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Flattened read-side projection of a submitted payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentView {
    pub student_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub grade: Option<String>,
    pub transaction_id: String,
    pub amount: Decimal,
    pub payment_status: PaymentStatus,
    pub updated_at: Option<String>,
}

impl PaymentView {
    /// Projects a record, or `None` when no payment was submitted for it.
    pub fn from_record(record: StudentPaymentRecord) -> Option<Self> {
        if !record.has_transaction() {
            return None;
        }
        let payment_status = record.status();
        Some(Self {
            student_id: record.student_id.unwrap_or_default(),
            name: record.name,
            email: record.student_email,
            grade: record.grade,
            transaction_id: record.transaction_id.unwrap_or_default(),
            amount: record.amount.unwrap_or(DEFAULT_AMOUNT),
            payment_status,
            updated_at: record.updated_at,
        })
    }
}

/// A guardian document and its embedded student entries, kept as raw values so
/// that a rewrite returns every untouched entry exactly as it was read.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentAccount {
    pub id: String,
    pub students: Vec<Value>,
}

impl ParentAccount {
    /// Returns `None` for documents without a `students` array.
    pub fn from_document(doc: Document) -> Option<Self> {
        let Document { id, mut fields } = doc;
        match fields.remove("students") {
            Some(Value::Array(students)) => Some(Self { id, students }),
            _ => None,
        }
    }

    /// Parses each embedded entry; malformed entries yield an error item.
    pub fn records(
        &self,
    ) -> impl Iterator<Item = Result<StudentPaymentRecord, serde_json::Error>> + '_ {
        self.students.iter().map(StudentPaymentRecord::from_value)
    }

    /// Current statuses of the entries matching the payment attempt.
    pub fn payment_statuses(&self, student_id: &str, transaction_id: &str) -> Vec<PaymentStatus> {
        self.records()
            .filter_map(Result::ok)
            .filter(|r| r.is_payment(student_id, transaction_id))
            .map(|r| r.status())
            .collect()
    }

    pub fn find_student(&self, student_id: &str) -> Option<StudentPaymentRecord> {
        self.records()
            .filter_map(Result::ok)
            .find(|r| r.student_id.as_deref() == Some(student_id))
    }

    /// Sets status and timestamp on every entry matching the payment attempt
    /// and returns how many entries changed.
    pub fn apply_status(
        &mut self,
        student_id: &str,
        transaction_id: &str,
        status: PaymentStatus,
        at: &str,
    ) -> usize {
        let mut changed = 0;
        for entry in &mut self.students {
            let matches = StudentPaymentRecord::from_value(entry)
                .is_ok_and(|r| r.is_payment(student_id, transaction_id));
            if let (true, Value::Object(fields)) = (matches, entry) {
                fields.insert("paymentStatus".into(), Value::from(status.as_str()));
                fields.insert("updatedAt".into(), Value::from(at));
                changed += 1;
            }
        }
        changed
    }

    /// The partial update that replaces the whole `students` field.
    pub fn students_update(self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("students".into(), Value::Array(self.students));
        fields
    }
}

/// Outcome reported to callers of an approve or reject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub success: bool,
    pub message: String,
}
