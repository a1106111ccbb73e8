#![forbid(unsafe_code)]

//! Wren: reactive model state and event-driven commands.
//!
//! This facade re-exports the pieces most applications need. Start with the
//! [`prelude`]:
//!
//! ```
//! use std::rc::Rc;
//! use wren::prelude::*;
//!
//! struct Clicks {
//!     state: ModelState,
//! }
//!
//! impl Clicks {
//!     const TOTAL: Scalar<u32> = Scalar::new("total", || 0);
//! }
//!
//! impl Model for Clicks {
//!     const DECLARATIONS: &'static [&'static dyn Declaration] = &[&Self::TOTAL];
//!
//!     fn state(&self) -> &ModelState {
//!         &self.state
//!     }
//! }
//!
//! struct Click(Rc<Clicks>);
//!
//! impl Command for Click {
//!     type Model = Clicks;
//!
//!     fn model(&self) -> &Clicks {
//!         &self.0
//!     }
//!
//!     fn execute(&self, _payload: Option<&Payload>) -> anyhow::Result<()> {
//!         Clicks::TOTAL.get(self.model()).update(|n| *n += 1);
//!         Ok(())
//!     }
//! }
//!
//! let model = Rc::new(Clicks { state: ModelState::new::<Clicks>() });
//! let context = Context::new(EventDispatcher::new());
//! context.map_command("CLICK", Click(Rc::clone(&model)))?;
//! context.dispatch(&Event::new("CLICK")?);
//! assert_eq!(Clicks::TOTAL.value(&*model), 1);
//! # Ok::<(), wren::Error>(())
//! ```

pub use wren_core::{
    DispatchReport, DispatcherConfig, Error, ErrorKind, Event, EventDispatcher, Listener, Payload,
    Result, UnhandledPolicy, logging,
};
pub use wren_runtime::{mvc, reactive, state};
pub use wren_runtime::{
    BatchGuard, ChangeRegistrar, Command, CommandMapping, Context, Declaration, Model, ModelState,
    Observable, ObservableList, ObservableValue, PayloadExt, Scalar, Sequence, StateKind,
    StateProperty, Subscription, View,
};

pub mod prelude {
    //! Everything needed to declare models, map commands, and dispatch events.

    pub use crate::{
        Command, Context, Declaration, Event, EventDispatcher, Listener, Model, ModelState,
        Observable, ObservableList, ObservableValue, Payload, PayloadExt, Scalar, Sequence,
        Subscription, View,
    };
}
