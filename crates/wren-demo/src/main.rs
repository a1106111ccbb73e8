#![forbid(unsafe_code)]

//! Wren demo binary entry point.

use std::io;

use wren::logging::{self, LogConfig};
use wren_demo::apps::{self, Console};
use wren_demo::cli::{App, Opts};

fn main() {
    let opts = Opts::parse();

    let config = match LogConfig::from_env() {
        Ok(config) => opts.log_config(config),
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = logging::init(&config) {
        eprintln!("Failed to initialize: {e}");
        std::process::exit(1);
    }

    let console = Console::Stdout;
    let result = match opts.app {
        App::Counter => apps::counter::run(&console),
        App::Todo => apps::todo::run(&console, io::stdin().lock()),
        App::Quiz => apps::quiz::run(&console),
    };
    if let Err(e) = result {
        eprintln!("Runtime error: {e:#}");
        std::process::exit(1);
    }
}
