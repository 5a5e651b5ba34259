use crate::domain::document::Fields;
use crate::domain::payment::PARENT_STUDENTS;
use crate::domain::ports::DocumentStore;
use crate::error::{AdminError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::io::Read;
use std::str::FromStr;

/// One student line of a roster export.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct RosterRow {
    pub parent_id: String,
    pub student_id: String,
    pub name: Option<String>,
    pub student_email: Option<String>,
    pub grade: Option<String>,
    pub transaction_id: Option<String>,
    pub amount: Option<Decimal>,
    pub payment_status: Option<String>,
}

impl RosterRow {
    /// The embedded student entry; empty cells are left out entirely.
    pub fn to_student(&self) -> Result<Value> {
        let mut fields = Fields::new();
        fields.insert("studentId".into(), Value::from(self.student_id.as_str()));
        let optional = [
            ("name", &self.name),
            ("studentEmail", &self.student_email),
            ("grade", &self.grade),
            ("transactionID", &self.transaction_id),
            ("paymentStatus", &self.payment_status),
        ];
        for (key, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                fields.insert(key.into(), Value::from(value));
            }
        }
        if let Some(amount) = self.amount {
            let number = Number::from_str(&amount.normalize().to_string()).map_err(|e| {
                AdminError::Validation(format!("Invalid amount {amount}: {e}"))
            })?;
            fields.insert("amount".into(), Value::Number(number));
        }
        Ok(Value::Object(fields))
    }
}

/// Reads roster rows from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<RosterRow>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct RosterReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RosterReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes rows.
    pub fn rows(self) -> impl Iterator<Item = Result<RosterRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(AdminError::from))
    }
}

/// Stores one parent document per `parent_id`, students in file order.
///
/// Parents are fully replaced, so importing the same file twice leaves the
/// store unchanged. Returns the number of parent documents written.
pub async fn import_roster<R: Read>(store: &dyn DocumentStore, reader: RosterReader<R>) -> Result<usize> {
    let mut parents: Vec<(String, Vec<Value>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for row in reader.rows() {
        let row = row?;
        if row.parent_id.is_empty() || row.student_id.is_empty() {
            return Err(AdminError::Validation(
                "Roster rows need a parent_id and a student_id".into(),
            ));
        }
        let student = row.to_student()?;
        match positions.get(&row.parent_id) {
            Some(&at) => parents[at].1.push(student),
            None => {
                positions.insert(row.parent_id.clone(), parents.len());
                parents.push((row.parent_id, vec![student]));
            }
        }
    }

    let count = parents.len();
    for (parent_id, students) in parents {
        let mut fields = Fields::new();
        fields.insert("students".into(), Value::Array(students));
        store.put_document(PARENT_STUDENTS, &parent_id, fields).await?;
    }
    Ok(count)
}
