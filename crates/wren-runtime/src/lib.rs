#![forbid(unsafe_code)]

//! Runtime: observable state, declarative model properties, and command
//! binding.
//!
//! # Role in Wren
//! `wren-runtime` is the state layer. It turns a model's declared fields
//! into independently observable containers and connects named events to
//! the commands that mutate them.
//!
//! # Primary responsibilities
//! - **reactive**: [`ObservableValue`] and [`ObservableList`] with
//!   subscription guards and batched list notification.
//! - **state**: [`StateProperty`] declarations materialized per model
//!   instance inside a [`ModelState`].
//! - **mvc**: the [`Model`], [`Command`], [`Context`], and [`View`] contract.
//!
//! # How it fits in the system
//! Events and the dispatcher come from `wren-core`. Applications (see
//! `wren-demo`) declare models, map commands in a context, and subscribe
//! views to state changes.

pub mod mvc;
pub mod reactive;
pub mod state;

pub use mvc::{Command, CommandMapping, Context, Model, PayloadExt, View};
pub use reactive::{BatchGuard, Observable, ObservableList, ObservableValue, Subscription};
pub use state::{
    ChangeRegistrar, Declaration, ModelState, Scalar, Sequence, StateContainer, StateKind,
    StateProperty,
};
