#![forbid(unsafe_code)]

//! The Bridge of Death: three questions, the last one a trick.

use std::fmt;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::json;
use wren::prelude::*;

use super::Console;

pub const QUESTIONS: [&str; 3] = [
    "What is your name?",
    "What is your quest?",
    "What is the airspeed velocity of an unladen swallow?",
];

/// Index of the question whose answer decides the outcome.
const DECIDING_QUESTION: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Pending,
    Pass,
    Fail,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "",
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        })
    }
}

pub struct QuizModel {
    state: ModelState,
}

impl QuizModel {
    pub const CURRENT_QUESTION: Scalar<usize> = Scalar::new("current_question", || 0);
    pub const ANSWERS: Sequence<String> = Sequence::new("answers", Vec::new);
    pub const OUTCOME: Scalar<Outcome> = Scalar::new("outcome", Outcome::default);

    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            state: ModelState::new::<Self>(),
        })
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&'static str> {
        QUESTIONS.get(Self::CURRENT_QUESTION.value(self)).copied()
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        Self::OUTCOME.value(self)
    }

    #[must_use]
    pub fn answers(&self) -> Vec<String> {
        Self::ANSWERS.value(self)
    }

    /// Record `answer`, judge the deciding question, and advance unless
    /// already on the last question.
    pub fn answer_question(&self, answer: &str) {
        Self::ANSWERS.get(self).push(answer.to_string());

        let current = Self::CURRENT_QUESTION.get(self);
        if current == DECIDING_QUESTION {
            let outcome = if answer.to_lowercase().contains("african or european") {
                Outcome::Pass
            } else {
                Outcome::Fail
            };
            Self::OUTCOME.set(self, outcome);
        }
        if current < QUESTIONS.len() - 1 {
            current.update(|index| *index += 1);
        }
    }

    pub fn reset(&self) {
        Self::CURRENT_QUESTION.set(self, 0);
        Self::ANSWERS.set(self, Vec::new());
        Self::OUTCOME.set(self, Outcome::Pending);
    }
}

impl Model for QuizModel {
    const DECLARATIONS: &'static [&'static dyn Declaration] =
        &[&Self::CURRENT_QUESTION, &Self::ANSWERS, &Self::OUTCOME];

    fn state(&self) -> &ModelState {
        &self.state
    }
}

#[derive(Debug, Deserialize)]
struct AnswerPayload {
    answer: String,
}

pub struct AnswerCommand {
    model: Rc<QuizModel>,
}

impl Command for AnswerCommand {
    type Model = QuizModel;

    fn model(&self) -> &QuizModel {
        &self.model
    }

    fn execute(&self, payload: Option<&Payload>) -> anyhow::Result<()> {
        let AnswerPayload { answer } = payload.decode()?;
        self.model.answer_question(&answer);
        Ok(())
    }
}

pub struct ResetQuizCommand {
    model: Rc<QuizModel>,
}

impl Command for ResetQuizCommand {
    type Model = QuizModel;

    fn model(&self) -> &QuizModel {
        &self.model
    }

    fn execute(&self, _payload: Option<&Payload>) -> anyhow::Result<()> {
        self.model.reset();
        Ok(())
    }
}

pub fn quiz_context(dispatcher: EventDispatcher, model: &Rc<QuizModel>) -> wren::Result<Context> {
    let context = Context::new(dispatcher);
    context.map_command(
        "ANSWER_QUESTION",
        AnswerCommand {
            model: Rc::clone(model),
        },
    )?;
    context.map_command(
        "RESET_QUIZ",
        ResetQuizCommand {
            model: Rc::clone(model),
        },
    )?;
    Ok(context)
}

pub struct BridgeKeeperView {
    context: Rc<Context>,
    model: Rc<QuizModel>,
    console: Console,
    _subscriptions: Vec<Subscription>,
}

impl BridgeKeeperView {
    pub fn new(context: Rc<Context>, model: Rc<QuizModel>, console: Console) -> wren::Result<Self> {
        let on_question = console.clone();
        let on_outcome = console.clone();
        let subscriptions = vec![
            model.on_change("current_question", move |index: &usize| {
                if let Some(question) = QUESTIONS.get(*index) {
                    on_question.blank();
                    on_question.line(format!("BRIDGE KEEPER: {question}"));
                }
            })?,
            model.on_change("outcome", move |outcome: &Outcome| match outcome {
                Outcome::Pass => {
                    on_outcome.blank();
                    on_outcome.line("BRIDGE KEEPER: Right. Off you go.");
                    on_outcome.line("*You cross the Bridge of Death successfully*");
                }
                Outcome::Fail => {
                    on_outcome.blank();
                    on_outcome.line("BRIDGE KEEPER: *launches you into the gorge*");
                    on_outcome.line("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAHHH!");
                }
                Outcome::Pending => {}
            })?,
        ];
        Ok(Self {
            context,
            model,
            console,
            _subscriptions: subscriptions,
        })
    }

    /// Print the question the model is on.
    pub fn ask(&self) {
        if let Some(question) = self.model.current_question() {
            self.console.blank();
            self.console.line(format!("BRIDGE KEEPER: {question}"));
        }
    }

    pub fn answer(&self, text: &str) -> wren::Result<()> {
        self.console.line(format!("YOU: {text}"));
        self.dispatch(&Event::with_payload(
            "ANSWER_QUESTION",
            json!({ "answer": text }),
        )?);
        Ok(())
    }

    pub fn reset(&self) -> wren::Result<()> {
        self.console.blank();
        self.console.line("--- NEW CHALLENGER APPROACHES ---");
        self.dispatch(&Event::new("RESET_QUIZ")?);
        Ok(())
    }
}

impl View for BridgeKeeperView {
    fn context(&self) -> &Context {
        &self.context
    }
}

/// Two scripted crossings: one into the gorge, one across.
pub fn run(console: &Console) -> anyhow::Result<()> {
    let model = QuizModel::new();
    let context = Rc::new(quiz_context(EventDispatcher::new(), &model)?);
    let view = BridgeKeeperView::new(context, Rc::clone(&model), console.clone())?;

    console.line("--- THE BRIDGE OF DEATH ---");
    console.line(
        "BRIDGE KEEPER: STOP! Who would cross the Bridge of Death must answer me these questions three.",
    );
    view.ask();
    view.answer("Sir Lancelot of Camelot")?;
    view.answer("To seek the Holy Grail")?;
    view.answer("What? I don't know that!")?;

    view.reset()?;
    view.answer("Sir Robin of Camelot")?;
    view.answer("To seek the Holy Grail")?;
    view.answer("What do you mean? African or European swallow?")?;

    tracing::info!(outcome = %model.outcome(), "quiz finished");
    Ok(())
}
