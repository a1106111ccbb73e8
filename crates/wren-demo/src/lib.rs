#![forbid(unsafe_code)]

//! Wren sample applications.
//!
//! Each app wires a model, a context, and a view through the public Wren
//! API only. Output goes through a [`Console`](apps::Console) so runs can be
//! captured in tests.

pub mod apps;
pub mod cli;
