#![forbid(unsafe_code)]

//! Counter: a number plus a log of what changed it.

use std::rc::Rc;

use serde::Deserialize;
use wren::prelude::*;

use super::Console;

pub struct CounterModel {
    state: ModelState,
}

impl CounterModel {
    pub const COUNT: Scalar<i64> = Scalar::new("count", || 0);
    pub const HISTORY: Sequence<String> = Sequence::new("history", Vec::new);

    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            state: ModelState::new::<Self>(),
        })
    }

    #[must_use]
    pub fn count(&self) -> i64 {
        Self::COUNT.value(self)
    }

    #[must_use]
    pub fn history(&self) -> Vec<String> {
        Self::HISTORY.value(self)
    }

    pub fn increment(&self, amount: i64) {
        Self::COUNT.get(self).update(|count| *count += amount);
        Self::HISTORY.get(self).push(format!("Incremented by {amount}"));
    }

    pub fn decrement(&self, amount: i64) {
        Self::COUNT.get(self).update(|count| *count -= amount);
        Self::HISTORY.get(self).push(format!("Decremented by {amount}"));
    }

    pub fn reset(&self) {
        Self::COUNT.set(self, 0);
        Self::HISTORY.get(self).push("Reset to 0".to_string());
    }
}

impl Model for CounterModel {
    const DECLARATIONS: &'static [&'static dyn Declaration] = &[&Self::COUNT, &Self::HISTORY];

    fn state(&self) -> &ModelState {
        &self.state
    }
}

#[derive(Debug, Deserialize)]
struct Amount {
    #[serde(default = "Amount::one")]
    amount: i64,
}

impl Amount {
    fn one() -> i64 {
        1
    }

    /// `{"amount": n}`; absent payload or member means 1.
    fn from_payload(payload: Option<&Payload>) -> anyhow::Result<i64> {
        let amount: Option<Amount> = payload.decode()?;
        Ok(amount.map_or(1, |a| a.amount))
    }
}

pub struct IncrementCommand {
    model: Rc<CounterModel>,
}

impl Command for IncrementCommand {
    type Model = CounterModel;

    fn model(&self) -> &CounterModel {
        &self.model
    }

    fn execute(&self, payload: Option<&Payload>) -> anyhow::Result<()> {
        self.model.increment(Amount::from_payload(payload)?);
        Ok(())
    }
}

pub struct DecrementCommand {
    model: Rc<CounterModel>,
}

impl Command for DecrementCommand {
    type Model = CounterModel;

    fn model(&self) -> &CounterModel {
        &self.model
    }

    fn execute(&self, payload: Option<&Payload>) -> anyhow::Result<()> {
        self.model.decrement(Amount::from_payload(payload)?);
        Ok(())
    }
}

pub struct ResetCommand {
    model: Rc<CounterModel>,
}

impl Command for ResetCommand {
    type Model = CounterModel;

    fn model(&self) -> &CounterModel {
        &self.model
    }

    fn execute(&self, _payload: Option<&Payload>) -> anyhow::Result<()> {
        self.model.reset();
        Ok(())
    }
}

/// A context with INCREMENT, DECREMENT, and RESET mapped onto `model`.
pub fn counter_context(
    dispatcher: EventDispatcher,
    model: &Rc<CounterModel>,
) -> wren::Result<Context> {
    let context = Context::new(dispatcher);
    context.map_command(
        "INCREMENT",
        IncrementCommand {
            model: Rc::clone(model),
        },
    )?;
    context.map_command(
        "DECREMENT",
        DecrementCommand {
            model: Rc::clone(model),
        },
    )?;
    context.map_command(
        "RESET",
        ResetCommand {
            model: Rc::clone(model),
        },
    )?;
    Ok(context)
}

pub struct CounterView {
    context: Rc<Context>,
    _subscriptions: Vec<Subscription>,
}

impl CounterView {
    pub fn new(context: Rc<Context>, model: &CounterModel, console: &Console) -> wren::Result<Self> {
        let on_count = console.clone();
        let on_history = console.clone();
        let subscriptions = vec![
            model.on_change("count", move |count: &i64| {
                on_count.line(format!("Count changed to: {count}"));
            })?,
            model.on_change("history", move |history: &Vec<String>| {
                if let Some(last) = history.last() {
                    on_history.line(format!("Last action: {last}"));
                }
            })?,
        ];
        Ok(Self {
            context,
            _subscriptions: subscriptions,
        })
    }

    pub fn increment_clicked(&self, amount: i64) -> wren::Result<()> {
        self.dispatch(&Event::with_payload(
            "INCREMENT",
            serde_json::json!({ "amount": amount }),
        )?);
        Ok(())
    }

    pub fn decrement_clicked(&self, amount: i64) -> wren::Result<()> {
        self.dispatch(&Event::with_payload(
            "DECREMENT",
            serde_json::json!({ "amount": amount }),
        )?);
        Ok(())
    }

    pub fn reset_clicked(&self) -> wren::Result<()> {
        self.dispatch(&Event::new("RESET")?);
        Ok(())
    }
}

impl View for CounterView {
    fn context(&self) -> &Context {
        &self.context
    }
}

/// Scripted session: +1, +5, -2, reset, then the final history.
pub fn run(console: &Console) -> anyhow::Result<()> {
    let model = CounterModel::new();
    let context = Rc::new(counter_context(EventDispatcher::new(), &model)?);
    let view = CounterView::new(context, &model, console)?;

    console.line("=== Counter Application Demo ===");
    view.increment_clicked(1)?;
    view.increment_clicked(5)?;
    view.decrement_clicked(2)?;
    view.reset_clicked()?;

    console.blank();
    console.line("Final history:");
    for (i, entry) in model.history().iter().enumerate() {
        console.line(format!("{}. {entry}", i + 1));
    }
    tracing::info!(count = model.count(), "counter demo finished");
    Ok(())
}
