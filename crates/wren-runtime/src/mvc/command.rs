#![forbid(unsafe_code)]

//! Commands: units of behavior bound to one model.

use std::any::type_name;
use std::rc::Rc;

use anyhow::Context as _;
use serde::de::DeserializeOwned;
use wren_core::Payload;

use super::model::Model;

/// Mutates one model in response to an event's payload.
///
/// The bound model type is fixed by [`Command::Model`], so a command can only
/// be built against the model it expects.
pub trait Command: 'static {
    type Model: Model;

    fn model(&self) -> &Self::Model;

    /// Apply the command. Errors are reported by the dispatcher and do not
    /// stop other listeners.
    fn execute(&self, payload: Option<&Payload>) -> anyhow::Result<()>;

    /// Name used in logs and mapping records.
    fn name(&self) -> &str {
        let full = type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

impl<C: Command> Command for Rc<C> {
    type Model = C::Model;

    fn model(&self) -> &C::Model {
        (**self).model()
    }

    fn execute(&self, payload: Option<&Payload>) -> anyhow::Result<()> {
        (**self).execute(payload)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Reading helpers for an optional event payload.
pub trait PayloadExt {
    /// The object member `key`, if the payload is an object that has it.
    fn field(&self, key: &str) -> Option<&Payload>;

    /// Deserialize the payload; an absent payload decodes from `null`.
    fn decode<T: DeserializeOwned>(&self) -> anyhow::Result<T>;
}

impl PayloadExt for Option<&Payload> {
    fn field(&self, key: &str) -> Option<&Payload> {
        self.and_then(|payload| payload.get(key))
    }

    fn decode<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        let value = self.cloned().unwrap_or(Payload::Null);
        serde_json::from_value(value)
            .with_context(|| format!("payload is not a valid {}", type_name::<T>()))
    }
}
