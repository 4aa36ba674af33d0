//! Typed fields and the wire translation layer
//!
//! The store's item API takes `{"fields": {"<field_id>": value}}` with
//! stringified numeric keys. The structs here are what the engine builds;
//! translation to wire shape happens only in `to_wire`, against the
//! configured field-id table.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Map, Value};

use crate::config::{CallActivityFieldIds, TaskFieldIds};

/// Fields for one call-activity item.
///
/// `title` is never blank; optional fields are omitted from the wire
/// payload when unset.
#[derive(Debug, Clone)]
pub struct CallActivityFields {
    pub title: String,
    /// Master-lead item the activity belongs to
    pub lead_record_id: u64,
    pub date_of_call: DateTime<Utc>,
    pub duration_seconds: Option<u32>,
    pub recording_url: Option<String>,
    pub disposition_code: Option<String>,
    pub agent_notes: Option<String>,
    pub motivation_level: Option<String>,
    pub next_action_date: Option<NaiveDate>,
    pub asking_price: Option<f64>,
}

impl CallActivityFields {
    pub fn to_wire(&self, ids: &CallActivityFieldIds) -> Value {
        let mut fields = Map::new();
        fields.insert(ids.title.to_string(), json!(self.title));
        fields.insert(
            ids.lead_relationship.to_string(),
            json!([self.lead_record_id]),
        );
        fields.insert(
            ids.date_of_call.to_string(),
            json!(self.date_of_call.format("%Y-%m-%d %H:%M:%S").to_string()),
        );
        if let Some(duration) = self.duration_seconds {
            fields.insert(ids.call_duration.to_string(), json!(duration));
        }
        if let Some(url) = &self.recording_url {
            fields.insert(ids.recording_url.to_string(), json!(url));
        }
        if let Some(code) = &self.disposition_code {
            fields.insert(ids.disposition_code.to_string(), json!(code));
        }
        if let Some(notes) = &self.agent_notes {
            fields.insert(ids.agent_notes.to_string(), json!(notes));
        }
        if let Some(level) = &self.motivation_level {
            fields.insert(ids.motivation_level.to_string(), json!(level));
        }
        if let Some(date) = &self.next_action_date {
            fields.insert(
                ids.next_action_date.to_string(),
                json!(date.format("%Y-%m-%d").to_string()),
            );
        }
        if let Some(price) = self.asking_price {
            fields.insert(ids.asking_price.to_string(), json!(price));
        }
        json!({ "fields": Value::Object(fields) })
    }

    /// Wire payload that patches only the recording URL on an existing
    /// item, used for webhook back-fill.
    pub fn recording_patch(ids: &CallActivityFieldIds, recording_url: &str) -> Value {
        json!({ "fields": { ids.recording_url.to_string(): recording_url } })
    }
}

/// Fields for one follow-up task item.
#[derive(Debug, Clone)]
pub struct TaskFields {
    pub title: String,
    pub task_type: String,
    pub due_date: DateTime<Utc>,
    pub lead_record_id: u64,
}

impl TaskFields {
    pub fn to_wire(&self, ids: &TaskFieldIds) -> Value {
        json!({
            "fields": {
                ids.title.to_string(): self.title,
                ids.task_type.to_string(): self.task_type,
                ids.due_date.to_string(): self.due_date.format("%Y-%m-%d %H:%M:%S").to_string(),
                ids.lead_relationship.to_string(): [self.lead_record_id],
            }
        })
    }
}

/// Strip markup tags from a stored rich-text value (`<p>Name</p>` -> `Name`).
pub(crate) fn strip_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

fn field_by_id<'a>(item: &'a Value, field_id: u64) -> Option<&'a Value> {
    item.get("fields")?
        .as_array()?
        .iter()
        .find(|f| f.get("field_id").and_then(Value::as_u64) == Some(field_id))
}

fn first_value(field: &Value) -> Option<&Value> {
    field.get("values")?.as_array()?.first()
}

/// Extract a text-like field value by id. Handles text fields
/// (`{"value": "<p>..."}`), category fields (`{"value": {"text": ...}}`),
/// date fields (`{"start": "YYYY-MM-DD"}`), and bare scalars.
pub fn extract_text(item: &Value, field_id: u64) -> Option<String> {
    let value = first_value(field_by_id(item, field_id)?)?;
    let text = match value {
        Value::Object(obj) => match obj.get("value") {
            Some(Value::Object(inner)) => inner.get("text")?.as_str()?.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) if !other.is_null() => other.to_string(),
            _ => obj.get("start")?.as_str()?.to_string(),
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let text = strip_html(&text);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Extract a numeric field value by id. Number and money fields carry their
/// value as a decimal string (`{"value": "65.0000"}`).
pub fn extract_number(item: &Value, field_id: u64) -> Option<f64> {
    let value = first_value(field_by_id(item, field_id)?)?;
    match value {
        Value::Object(obj) => match obj.get("value") {
            Some(Value::String(s)) => s.parse().ok(),
            Some(Value::Number(n)) => n.as_f64(),
            _ => None,
        },
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Extract a field value by its display label. Used for the handful of
/// lead fields addressed by label rather than id.
pub fn extract_by_label(item: &Value, label: &str) -> Option<String> {
    let field = item
        .get("fields")?
        .as_array()?
        .iter()
        .find(|f| f.get("label").and_then(Value::as_str) == Some(label))?;
    let value = first_value(field)?;
    let text = match value {
        Value::Object(obj) => match obj.get("value") {
            Some(Value::Object(inner)) => inner.get("text")?.as_str()?.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) if !other.is_null() => other.to_string(),
            _ => return None,
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let text = strip_html(&text);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
