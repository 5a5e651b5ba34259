use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Top-level fields of a schemaless document.
pub type Fields = Map<String, Value>;

/// A stored document together with the identifier the store assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the field as a string slice when it holds a string.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `field == value`
    Eq(String, Value),
    /// `value` is one of the elements of the array stored in `field`.
    ArrayContains(String, Value),
}

impl Filter {
    pub fn matches(&self, fields: &Fields) -> bool {
        match self {
            Filter::Eq(field, value) => fields.get(field) == Some(value),
            Filter::ArrayContains(field, value) => fields
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value)),
        }
    }
}

/// A collection query limited to what the managed store supports natively:
/// equality and array-containment filters plus ordering on a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, Direction)>,
}

impl Query {
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            filters: Vec::new(),
            order_by: None,
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(field.into(), value.into()));
        self
    }

    pub fn where_array_contains(
        mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.filters
            .push(Filter::ArrayContains(field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    /// Applies the filters and ordering to an already enumerated collection.
    ///
    /// Documents without the ordering field are dropped from ordered results,
    /// matching how the managed store treats them.
    pub fn apply(&self, documents: Vec<Document>) -> Vec<Document> {
        let mut matched: Vec<Document> = documents
            .into_iter()
            .filter(|doc| self.filters.iter().all(|f| f.matches(&doc.fields)))
            .collect();

        if let Some((field, direction)) = &self.order_by {
            matched.retain(|doc| doc.fields.get(field).is_some_and(|v| !v.is_null()));
            matched.sort_by(|a, b| {
                let ord = compare_values(&a.fields[field], &b.fields[field]);
                match direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        matched
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Merges `update` into `target`. Keys containing `.` address nested maps,
/// creating intermediate maps as needed.
pub fn merge_fields(target: &mut Fields, update: Fields) {
    for (key, value) in update {
        let mut path = key.split('.').peekable();
        let mut current = &mut *target;
        while let Some(segment) = path.next() {
            if path.peek().is_none() {
                current.insert(segment.to_string(), value);
                break;
            }
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => unreachable!("entry was just replaced by an object"),
            };
        }
    }
}

/// Current UTC time as an ISO-8601 string with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
