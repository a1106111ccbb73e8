#![forbid(unsafe_code)]

//! Core: events, the listener registry, and the shared error taxonomy.
//!
//! # Role in Wren
//! `wren-core` is the messaging layer. It owns the immutable [`Event`]
//! record, the name-keyed [`EventDispatcher`], and the [`Error`] type every
//! other crate reports through.
//!
//! # Primary responsibilities
//! - **Event**: a validated, immutable name plus optional JSON payload.
//! - **EventDispatcher**: add/remove/dispatch with per-listener failure
//!   isolation.
//! - **Error**: argument, state, and configuration error kinds.
//! - **Logging**: optional subscriber bootstrap (`subscriber` feature).
//!
//! # How it fits in the system
//! The runtime (`wren-runtime`) maps event names to commands through a
//! [`EventDispatcher`] and mutates observable model state in response.
//! Nothing in this crate knows about models or observables.

pub mod dispatcher;
pub mod error;
pub mod event;
pub mod logging;

pub use dispatcher::{DispatchReport, DispatcherConfig, EventDispatcher, Listener, UnhandledPolicy};
pub use error::{Error, ErrorKind, Result};
pub use event::{Event, Payload};
