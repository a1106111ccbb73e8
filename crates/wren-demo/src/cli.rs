#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo.
//!
//! Parses args by hand. `WREN_DEMO_APP` overrides the default app;
//! explicit flags override the environment.

use std::env;
use std::process;

use wren::logging::{LogConfig, LogFormat};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Wren Demo: sample applications built on Wren

USAGE:
    wren-demo [OPTIONS]

OPTIONS:
    --app=NAME       Application to run: 'counter', 'todo', or 'quiz' (default: counter)
    --log=FILTER     Tracing filter directive, e.g. 'debug' or 'wren_core=trace'
    --json-logs      Emit logs as JSON lines on stderr
    --help, -h       Show this help message
    --version, -V    Show version

APPS:
    counter   Scripted counter session with change history
    todo      Interactive todo list reading commands from stdin
    quiz      Scripted Bridge of Death quiz, two attempts

ENVIRONMENT VARIABLES:
    WREN_DEMO_APP     Override the default --app
    WREN_LOG          Tracing filter (overridden by --log)
    WREN_LOG_FORMAT   'text' or 'json' (overridden by --json-logs)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum App {
    #[default]
    Counter,
    Todo,
    Quiz,
}

impl App {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "counter" => Some(Self::Counter),
            "todo" => Some(Self::Todo),
            "quiz" => Some(Self::Quiz),
            _ => None,
        }
    }
}

/// Parsed command-line options.
#[derive(Debug, Clone, Default)]
pub struct Opts {
    pub app: App,
    /// `--log` filter; `None` keeps whatever the environment says.
    pub log_filter: Option<String>,
    pub json_logs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseError {
    Help,
    Version,
    InvalidValue { flag: &'static str, value: String },
    UnknownArg(String),
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    pub fn parse() -> Self {
        match Self::parse_from_env_and_args(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(ParseError::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(ParseError::Version) => {
                println!("wren-demo {VERSION}");
                process::exit(0);
            }
            Err(ParseError::InvalidValue { flag, value }) => {
                eprintln!("Invalid {flag} value: {value}");
                process::exit(1);
            }
            Err(ParseError::UnknownArg(arg)) => {
                eprintln!("Unknown argument: {arg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    fn parse_from_env_and_args<I, S, F>(args: I, get_env: F) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        if let Some(val) = get_env("WREN_DEMO_APP")
            && let Some(app) = App::parse(&val)
        {
            opts.app = app;
        }

        for arg in args {
            let arg = arg.as_ref();
            match arg {
                "--help" | "-h" => return Err(ParseError::Help),
                "--version" | "-V" => return Err(ParseError::Version),
                "--json-logs" => opts.json_logs = true,
                other => {
                    if let Some(val) = other.strip_prefix("--app=") {
                        opts.app = App::parse(val).ok_or_else(|| ParseError::InvalidValue {
                            flag: "--app",
                            value: val.to_string(),
                        })?;
                    } else if let Some(val) = other.strip_prefix("--log=") {
                        if val.trim().is_empty() {
                            return Err(ParseError::InvalidValue {
                                flag: "--log",
                                value: val.to_string(),
                            });
                        }
                        opts.log_filter = Some(val.to_string());
                    } else {
                        return Err(ParseError::UnknownArg(other.to_string()));
                    }
                }
            }
        }

        Ok(opts)
    }

    /// Layer the CLI logging flags over `base` (usually from the environment).
    #[must_use]
    pub fn log_config(&self, base: LogConfig) -> LogConfig {
        let mut config = base;
        if let Some(filter) = &self.log_filter {
            config = config.with_filter(filter.clone());
        }
        if self.json_logs {
            config = config.with_format(LogFormat::Json);
        }
        config
    }
}
