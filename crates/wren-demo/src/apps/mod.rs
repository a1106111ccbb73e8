#![forbid(unsafe_code)]

//! The sample applications and their shared output sink.

pub mod counter;
pub mod quiz;
pub mod todo;

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

/// Where a view writes its lines.
#[derive(Clone, Debug, Default)]
pub enum Console {
    /// Print to stdout.
    #[default]
    Stdout,
    /// Keep lines in memory.
    Captured(Rc<RefCell<Vec<String>>>),
}

impl Console {
    /// A console that records lines, plus a handle to read them back.
    #[must_use]
    pub fn captured() -> (Self, Rc<RefCell<Vec<String>>>) {
        let lines = Rc::new(RefCell::new(Vec::new()));
        (Self::Captured(Rc::clone(&lines)), lines)
    }

    pub fn line(&self, text: impl Display) {
        match self {
            Self::Stdout => println!("{text}"),
            Self::Captured(lines) => lines.borrow_mut().push(text.to_string()),
        }
    }

    pub fn blank(&self) {
        self.line("");
    }
}
