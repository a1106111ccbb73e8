//! Property-based invariant tests for the event dispatcher.
//!
//! 1. Every well-formed name yields an `Event` with no payload by default.
//! 2. Each dispatch calls every registered listener exactly once, whatever
//!    mix of succeeding, failing, and panicking listeners is registered.
//! 3. The registry holds a name iff it has at least one listener, after any
//!    sequence of add/remove operations.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use proptest::prelude::*;
use wren_core::{Event, EventDispatcher, Listener};

// ── Strategies ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Behavior {
    Succeed,
    Fail,
    Panic,
}

fn behavior_strategy() -> impl Strategy<Value = Behavior> {
    prop_oneof![
        3 => Just(Behavior::Succeed),
        1 => Just(Behavior::Fail),
        1 => Just(Behavior::Panic),
    ]
}

#[derive(Debug, Clone)]
enum Op {
    Add { name: usize, listener: usize },
    Remove { name: usize, listener: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..3, 0usize..4).prop_map(|(name, listener)| Op::Add { name, listener }),
        (0usize..3, 0usize..4).prop_map(|(name, listener)| Op::Remove { name, listener }),
    ]
}

const NAMES: [&str; 3] = ["alpha", "beta", "gamma"];

// ── Properties ────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn well_formed_names_construct(name in "[A-Za-z_][A-Za-z0-9_ ]{0,24}") {
        let event = Event::new(name.clone()).unwrap();
        prop_assert_eq!(event.name(), name.as_str());
        prop_assert!(event.payload().is_none());
    }

    #[test]
    fn every_listener_runs_once(behaviors in proptest::collection::vec(behavior_strategy(), 1..12)) {
        let dispatcher = EventDispatcher::new();
        let calls: Vec<Rc<Cell<u32>>> = behaviors.iter().map(|_| Rc::new(Cell::new(0))).collect();

        for (behavior, counter) in behaviors.iter().zip(&calls) {
            let counter = Rc::clone(counter);
            let behavior = *behavior;
            let listener = Listener::new(move |_| {
                counter.set(counter.get() + 1);
                match behavior {
                    Behavior::Succeed => Ok(()),
                    Behavior::Fail => Err(anyhow::anyhow!("listener failed")),
                    Behavior::Panic => panic!("listener panicked"),
                }
            });
            dispatcher.add_listener("evt", &listener).unwrap();
        }

        let report = dispatcher.dispatch(&Event::new("evt").unwrap());

        for counter in &calls {
            prop_assert_eq!(counter.get(), 1);
        }
        let expected_ok = behaviors.iter().filter(|b| matches!(b, Behavior::Succeed)).count();
        prop_assert_eq!(report.delivered, expected_ok);
        prop_assert_eq!(report.failed, behaviors.len() - expected_ok);
    }

    #[test]
    fn registry_tracks_membership(ops in proptest::collection::vec(op_strategy(), 0..40)) {
        let dispatcher = EventDispatcher::new();
        let listeners: Vec<Listener> = (0..4).map(|_| Listener::new(|_| Ok(()))).collect();
        let mut model: HashMap<usize, Vec<usize>> = HashMap::new();

        for op in ops {
            match op {
                Op::Add { name, listener } => {
                    dispatcher.add_listener(NAMES[name], &listeners[listener]).unwrap();
                    let entry = model.entry(name).or_default();
                    if !entry.contains(&listener) {
                        entry.push(listener);
                    }
                }
                Op::Remove { name, listener } => {
                    dispatcher.remove_listener(NAMES[name], &listeners[listener]).unwrap();
                    if let Some(entry) = model.get_mut(&name) {
                        entry.retain(|l| *l != listener);
                        if entry.is_empty() {
                            model.remove(&name);
                        }
                    }
                }
            }
        }

        for (idx, name) in NAMES.iter().enumerate() {
            let expected = model.get(&idx).map_or(0, Vec::len);
            prop_assert_eq!(dispatcher.listener_count(name), expected);
            prop_assert_eq!(dispatcher.has_listeners(name), expected > 0);
        }
    }
}
