#![forbid(unsafe_code)]

//! Declarative state properties.
//!
//! A model type declares its reactive fields as associated constants:
//!
//! ```
//! use wren_runtime::mvc::Model;
//! use wren_runtime::state::{Declaration, ModelState, Scalar, Sequence};
//!
//! struct Counter {
//!     state: ModelState,
//! }
//!
//! impl Counter {
//!     const COUNT: Scalar<i64> = Scalar::new("count", || 0);
//!     const HISTORY: Sequence<String> = Sequence::new("history", Vec::new);
//! }
//!
//! impl Model for Counter {
//!     const DECLARATIONS: &'static [&'static dyn Declaration] = &[&Self::COUNT, &Self::HISTORY];
//!
//!     fn state(&self) -> &ModelState {
//!         &self.state
//!     }
//! }
//!
//! let counter = Counter { state: ModelState::new::<Counter>() };
//! Counter::COUNT.set(&counter, 5);
//! assert_eq!(Counter::COUNT.value(&counter), 5);
//! ```
//!
//! The declaration is shared by every instance; the container it hands out
//! lives in the instance's [`ModelState`], so instances never share state.

pub mod property;
pub mod store;

pub use property::{Declaration, Scalar, Sequence, StateContainer, StateKind, StateProperty};
pub use store::{ChangeRegistrar, ModelState};
