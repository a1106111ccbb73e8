//! Immutable named messages.
//!
//! # Invariants
//! 1. `name` is never empty; both constructors and deserialization enforce it.
//! 2. An `Event` has no mutators. Listeners receive `&Event`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, require_non_empty};

/// Opaque event payload.
pub type Payload = serde_json::Value;

/// A named message with an optional payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEvent")]
pub struct Event {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Payload>,
}

#[derive(Deserialize)]
struct RawEvent {
    name: String,
    #[serde(default)]
    payload: Option<Payload>,
}

impl TryFrom<RawEvent> for Event {
    type Error = crate::Error;

    fn try_from(raw: RawEvent) -> Result<Self> {
        Self::build(raw.name, raw.payload)
    }
}

impl Event {
    /// Create an event without a payload.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::build(name.into(), None)
    }

    /// Create an event carrying `payload`.
    pub fn with_payload(name: impl Into<String>, payload: impl Into<Payload>) -> Result<Self> {
        Self::build(name.into(), Some(payload.into()))
    }

    fn build(name: String, payload: Option<Payload>) -> Result<Self> {
        require_non_empty("name", &name)?;
        Ok(Self { name, payload })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Consume the event, returning its name and payload.
    #[must_use]
    pub fn into_parts(self) -> (String, Option<Payload>) {
        (self.name, self.payload)
    }
}
