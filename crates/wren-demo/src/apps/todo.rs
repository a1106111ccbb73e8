#![forbid(unsafe_code)]

//! Todo list with a line-oriented command prompt.

use std::cell::Cell;
use std::fmt;
use std::io::BufRead;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use wren::prelude::*;

use super::Console;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: u64,
    pub text: String,
    pub completed: bool,
}

impl fmt::Display for TodoItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.completed { '✓' } else { ' ' };
        write!(f, "[{mark}] {}", self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TodoStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

pub struct TodoModel {
    state: ModelState,
    next_id: Cell<u64>,
}

impl TodoModel {
    pub const ITEMS: Sequence<TodoItem> = Sequence::new("items", Vec::new);
    pub const FILTER_COMPLETED: Scalar<bool> = Scalar::new("filter_completed", || false);

    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            state: ModelState::new::<Self>(),
            next_id: Cell::new(1),
        })
    }

    fn items(&self) -> ObservableList<TodoItem> {
        Self::ITEMS.get(self)
    }

    /// Add an item unless `text` is blank. Returns the new id.
    pub fn add_item(&self, text: &str) -> Option<u64> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.items().push(TodoItem {
            id,
            text: text.to_string(),
            completed: false,
        });
        Some(id)
    }

    pub fn remove_item(&self, id: u64) -> bool {
        let items = self.items();
        let position = items.with(|items| items.iter().position(|item| item.id == id));
        position.is_some_and(|index| items.remove_at(index).is_ok())
    }

    pub fn toggle_item(&self, id: u64) -> bool {
        let items = self.items();
        let found = items.with(|items| {
            items
                .iter()
                .enumerate()
                .find(|(_, item)| item.id == id)
                .map(|(index, item)| (index, item.clone()))
        });
        let Some((index, mut item)) = found else {
            return false;
        };
        item.completed = !item.completed;
        items.set(index, item).is_ok()
    }

    pub fn toggle_filter(&self) {
        Self::FILTER_COMPLETED.get(self).update(|only_active| *only_active = !*only_active);
    }

    #[must_use]
    pub fn filter_completed(&self) -> bool {
        Self::FILTER_COMPLETED.value(self)
    }

    /// The items the list currently shows: all, or only active ones when the
    /// filter is on.
    #[must_use]
    pub fn filtered_items(&self) -> Vec<TodoItem> {
        let hide_completed = self.filter_completed();
        self.items().with(|items| {
            items
                .iter()
                .filter(|item| !hide_completed || !item.completed)
                .cloned()
                .collect()
        })
    }

    #[must_use]
    pub fn stats(&self) -> TodoStats {
        self.items().with(|items| {
            let completed = items.iter().filter(|item| item.completed).count();
            TodoStats {
                total: items.len(),
                active: items.len() - completed,
                completed,
            }
        })
    }
}

impl Model for TodoModel {
    const DECLARATIONS: &'static [&'static dyn Declaration] =
        &[&Self::ITEMS, &Self::FILTER_COMPLETED];

    fn state(&self) -> &ModelState {
        &self.state
    }
}

// ── Commands ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TextPayload {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct IdPayload {
    id: Option<u64>,
}

pub struct AddTodoCommand {
    model: Rc<TodoModel>,
}

impl Command for AddTodoCommand {
    type Model = TodoModel;

    fn model(&self) -> &TodoModel {
        &self.model
    }

    fn execute(&self, payload: Option<&Payload>) -> anyhow::Result<()> {
        if let Some(TextPayload { text }) = payload.decode()? {
            self.model.add_item(&text);
        }
        Ok(())
    }
}

pub struct RemoveTodoCommand {
    model: Rc<TodoModel>,
}

impl Command for RemoveTodoCommand {
    type Model = TodoModel;

    fn model(&self) -> &TodoModel {
        &self.model
    }

    fn execute(&self, payload: Option<&Payload>) -> anyhow::Result<()> {
        if let Some(IdPayload { id: Some(id) }) = payload.decode()? {
            self.model.remove_item(id);
        }
        Ok(())
    }
}

pub struct ToggleTodoCommand {
    model: Rc<TodoModel>,
}

impl Command for ToggleTodoCommand {
    type Model = TodoModel;

    fn model(&self) -> &TodoModel {
        &self.model
    }

    fn execute(&self, payload: Option<&Payload>) -> anyhow::Result<()> {
        if let Some(IdPayload { id: Some(id) }) = payload.decode()? {
            self.model.toggle_item(id);
        }
        Ok(())
    }
}

pub struct ToggleFilterCommand {
    model: Rc<TodoModel>,
}

impl Command for ToggleFilterCommand {
    type Model = TodoModel;

    fn model(&self) -> &TodoModel {
        &self.model
    }

    fn execute(&self, _payload: Option<&Payload>) -> anyhow::Result<()> {
        self.model.toggle_filter();
        Ok(())
    }
}

/// A context with ADD_TODO, REMOVE_TODO, TOGGLE_TODO, and TOGGLE_FILTER
/// mapped onto `model`.
pub fn todo_context(dispatcher: EventDispatcher, model: &Rc<TodoModel>) -> wren::Result<Context> {
    let context = Context::new(dispatcher);
    context.map_command("ADD_TODO", AddTodoCommand { model: Rc::clone(model) })?;
    context.map_command("REMOVE_TODO", RemoveTodoCommand { model: Rc::clone(model) })?;
    context.map_command("TOGGLE_TODO", ToggleTodoCommand { model: Rc::clone(model) })?;
    context.map_command("TOGGLE_FILTER", ToggleFilterCommand { model: Rc::clone(model) })?;
    Ok(context)
}

// ── Input ─────────────────────────────────────────────────────────────────

/// One parsed prompt line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Add(Option<String>),
    Toggle(Option<String>),
    Remove(Option<String>),
    Filter,
    Help,
    Exit,
    Unknown(String),
}

impl Input {
    /// Parse `add|a <text>`, `toggle|t <n>`, `remove|r <n>`, `filter|f`,
    /// `help|h`, and `exit|e|q`. Command words are case-insensitive.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let (command, param) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, Some(rest.trim().to_string())),
            None => (line, None),
        };
        match command.to_lowercase().as_str() {
            "add" | "a" => Self::Add(param),
            "toggle" | "t" => Self::Toggle(param),
            "remove" | "r" => Self::Remove(param),
            "filter" | "f" => Self::Filter,
            "help" | "h" => Self::Help,
            "exit" | "e" | "q" => Self::Exit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

const HELP_LINES: [&str; 6] = [
    "  a, add <text>          - Add a new todo item",
    "  t, toggle <number>     - Toggle completion status",
    "  r, remove <number>     - Remove a todo item",
    "  f, filter              - Toggle filter (all/active only)",
    "  e, q, exit             - Exit the application",
    "  h, help                - Show this help message",
];

// ── View ──────────────────────────────────────────────────────────────────

pub struct TodoView {
    context: Rc<Context>,
    model: Rc<TodoModel>,
    console: Console,
    _subscriptions: Vec<Subscription>,
}

impl TodoView {
    pub fn new(context: Rc<Context>, model: Rc<TodoModel>, console: Console) -> wren::Result<Self> {
        let subscriptions = vec![
            model.on_change("items", render_on_change::<Vec<TodoItem>>(&model, &console))?,
            model.on_change("filter_completed", render_on_change::<bool>(&model, &console))?,
        ];
        Ok(Self {
            context,
            model,
            console,
            _subscriptions: subscriptions,
        })
    }

    pub fn render(&self) {
        render(&self.model, &self.console);
    }

    /// Handle one prompt line. Returns `false` when the user asked to exit.
    pub fn process_line(&self, line: &str) -> wren::Result<bool> {
        match Input::parse(line) {
            Input::Empty => {}
            Input::Exit => return Ok(false),
            Input::Add(Some(text)) => {
                self.dispatch(&Event::with_payload("ADD_TODO", json!({ "text": text }))?);
            }
            Input::Add(None) => {}
            Input::Toggle(number) => self.dispatch_for_item("TOGGLE_TODO", number.as_deref())?,
            Input::Remove(number) => self.dispatch_for_item("REMOVE_TODO", number.as_deref())?,
            Input::Filter => {
                self.dispatch(&Event::new("TOGGLE_FILTER")?);
            }
            Input::Help => {
                self.console.blank();
                self.console.line("Available commands:");
                for line in HELP_LINES {
                    self.console.line(line);
                }
            }
            Input::Unknown(_) => {
                self.console.blank();
                self.console.line("Unknown command. Type 'help' for assistance.");
            }
        }
        Ok(true)
    }

    /// Resolve a 1-based number against the visible items and dispatch
    /// `event_name` with that item's id.
    fn dispatch_for_item(&self, event_name: &str, number: Option<&str>) -> wren::Result<()> {
        let Some(index) = number
            .and_then(|n| n.parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1))
        else {
            self.console.blank();
            self.console.line("Please enter a valid number.");
            return Ok(());
        };
        match self.model.filtered_items().get(index) {
            Some(item) => {
                self.dispatch(&Event::with_payload(event_name, json!({ "id": item.id }))?);
            }
            None => {
                self.console.blank();
                self.console.line("Invalid item number.");
            }
        }
        Ok(())
    }

    /// Read prompt lines from `input` until exit or end of input.
    pub fn run(&self, input: impl BufRead) -> anyhow::Result<()> {
        self.render();
        for line in input.lines() {
            if !self.process_line(&line?)? {
                break;
            }
        }
        Ok(())
    }
}

impl View for TodoView {
    fn context(&self) -> &Context {
        &self.context
    }
}

fn render_on_change<V: 'static>(model: &Rc<TodoModel>, console: &Console) -> impl Fn(&V) + 'static {
    let model = Rc::downgrade(model);
    let console = console.clone();
    move |_: &V| {
        if let Some(model) = model.upgrade() {
            render(&model, &console);
        }
    }
}

fn render(model: &TodoModel, console: &Console) {
    console.blank();
    console.line("===== WREN TODO APP =====");
    console.blank();
    let showing = if model.filter_completed() {
        "Active items only"
    } else {
        "All items"
    };
    console.line(format!("Showing: {showing}"));

    let items = model.filtered_items();
    if items.is_empty() {
        console.line("No items to display.");
    } else {
        for (i, item) in items.iter().enumerate() {
            console.line(format!("{}. {item}", i + 1));
        }
    }

    let stats = model.stats();
    console.blank();
    console.line(format!(
        "Total: {} | Active: {} | Completed: {}",
        stats.total, stats.active, stats.completed
    ));
    console.line("> ");
}

/// Interactive session over `input`, seeded with three example items.
pub fn run(console: &Console, input: impl BufRead) -> anyhow::Result<()> {
    let model = TodoModel::new();
    TodoModel::ITEMS.get(&*model).batch_update(|_| {
        model.add_item("Learn Wren");
        model.add_item("Build a todo application");
        model.add_item("Implement the MVC pattern");
    });

    let context = Rc::new(todo_context(EventDispatcher::new(), &model)?);
    let view = TodoView::new(context, Rc::clone(&model), console.clone())?;
    view.run(input)?;
    tracing::info!(items = model.stats().total, "todo session ended");
    Ok(())
}
