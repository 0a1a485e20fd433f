//! In-memory report of the events of one provisioning run

use chrono::Utc;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::constants::{JSON_FIELD_CONTEXT, JSON_FIELD_ID, JSON_FIELD_NAME, JSON_FIELD_TIMESTAMP};

/// Events of one run, each stamped with the current context
#[derive(Debug, Clone, Default)]
pub struct Report {
    context: Value,
    events:  Vec<Value>,
}

impl Report {
    /// Empty report with a null context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context stamped onto every event appended afterwards
    pub fn set_context(&mut self, context: Value) {
        self.context = context;
    }

    /// Append an event; the fields of `data` are flattened into it
    pub fn append_event(&mut self, name: &str, data: Map<String, Value>) {
        let mut event = data;
        event.insert(JSON_FIELD_ID.to_string(), json!(Uuid::new_v4().to_string()));
        event.insert(JSON_FIELD_NAME.to_string(), json!(name));
        event.insert(JSON_FIELD_TIMESTAMP.to_string(), json!(Utc::now().to_rfc3339()));
        event.insert(JSON_FIELD_CONTEXT.to_string(), self.context.clone());
        self.events.push(Value::Object(event));
    }

    /// Events appended so far
    #[must_use]
    pub fn events(&self) -> &[Value] {
        &self.events
    }

    /// Every event as a pretty-printed JSON array
    #[must_use]
    pub fn report(&self) -> String {
        serde_json::to_string_pretty(&self.events).unwrap_or_else(|_| "[]".to_string())
    }
}
