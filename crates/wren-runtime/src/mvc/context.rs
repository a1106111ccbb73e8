#![forbid(unsafe_code)]

//! Binds event names to commands over a shared dispatcher.

use std::cell::RefCell;
use std::fmt;

use anyhow::Context as _;
use tracing::debug;
use wren_core::{DispatchReport, Event, EventDispatcher, Listener, Result};

use super::command::Command;

/// One `map_command` call recorded by a [`Context`].
#[derive(Clone)]
pub struct CommandMapping {
    event_name: String,
    command: String,
    listener: Listener,
}

impl CommandMapping {
    #[must_use]
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// The mapped command's [`Command::name`].
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }
}

impl fmt::Debug for CommandMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandMapping")
            .field("event_name", &self.event_name)
            .field("command", &self.command)
            .finish()
    }
}

/// Event-name to command bindings over an [`EventDispatcher`].
///
/// The dispatcher is a shared handle: several contexts may hold clones of
/// the same one, and an event dispatched through any of them reaches every
/// command mapped by all of them.
pub struct Context {
    dispatcher: EventDispatcher,
    mappings: RefCell<Vec<CommandMapping>>,
}

impl Context {
    #[must_use]
    pub fn new(dispatcher: EventDispatcher) -> Self {
        Self {
            dispatcher,
            mappings: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Run `command` with the event's payload whenever `event_name` is
    /// dispatched.
    ///
    /// Several commands may share a name (all of them run) and one command
    /// may be mapped under several names; wrap it in an `Rc` to share it.
    pub fn map_command<C: Command>(&self, event_name: &str, command: C) -> Result<()> {
        let command_name = command.name().to_string();
        let listener = Listener::new(move |event| {
            debug!(event = event.name(), command = command.name(), "executing command");
            command
                .execute(event.payload())
                .with_context(|| format!("command {} failed", command.name()))
        });
        self.dispatcher.add_listener(event_name, &listener)?;
        debug!(event = event_name, command = %command_name, "command mapped");
        self.mappings.borrow_mut().push(CommandMapping {
            event_name: event_name.to_string(),
            command: command_name,
            listener,
        });
        Ok(())
    }

    /// Remove every mapping this context installed for `event_name`.
    /// Returns how many were removed. Listeners added by others stay.
    pub fn unmap_command(&self, event_name: &str) -> Result<usize> {
        let removed: Vec<CommandMapping> = {
            let mut mappings = self.mappings.borrow_mut();
            let (removed, kept): (Vec<_>, Vec<_>) = mappings
                .drain(..)
                .partition(|mapping| mapping.event_name == event_name);
            *mappings = kept;
            removed
        };
        for mapping in &removed {
            self.dispatcher
                .remove_listener(event_name, &mapping.listener)?;
        }
        if !removed.is_empty() {
            debug!(event = event_name, count = removed.len(), "commands unmapped");
        }
        Ok(removed.len())
    }

    /// Every mapping installed through this context, in mapping order.
    #[must_use]
    pub fn mappings(&self) -> Vec<CommandMapping> {
        self.mappings.borrow().clone()
    }

    pub fn dispatch(&self, event: &Event) -> DispatchReport {
        self.dispatcher.dispatch(event)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(EventDispatcher::new())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("dispatcher", &self.dispatcher)
            .field("mappings", &self.mappings.borrow())
            .finish()
    }
}
