#[macro_use]
extern crate serde_derive;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate log;

#[macro_use]
extern crate failure;

extern crate ctrlc;
extern crate log4rs;
extern crate reqwest;
extern crate serde;
extern crate serde_json;
extern crate toml;

mod ci_server;
mod config_file;
mod dispatcher;
mod errors;
mod format;
mod jenkins_client;
mod jenkins_response;
mod network;
mod notifier;
mod status;
mod timer;

use std::fs;
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use config_file::Config;
use dispatcher::CommandDispatcher;
use jenkins_client::JenkinsClient;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use notifier::ConsoleNotifier;

const CONFIG_FILE: &'static str = "config.toml";

lazy_static! {
    static ref HTTP_CLIENT: reqwest::Client = reqwest::Client::new();
}

fn main() {
    init_logging();

    let config = match read_config() {
        Ok(config) => config,
        Err(message) => {
            error!("{}", message);
            return;
        }
    };

    let client = JenkinsClient::new(
        &config.jenkins_username,
        &config.jenkins_token,
        &config.jenkins_base_url,
    );
    let notifier = Arc::new(ConsoleNotifier);
    let dispatcher = CommandDispatcher::new(client, notifier);

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    if let Err(err) = ctrlc::set_handler(move || {
        handler_flag.store(false, Ordering::SeqCst);
    }) {
        warn!("Unable to install the ctrl-c handler: {}", err);
    }

    info!(
        "Connected to {} as {}. Type a command, or 'quit' to exit.",
        config.jenkins_base_url, config.jenkins_username
    );

    // Minimal console host: one line per command, first token is the
    // verb, the rest is handed to the dispatcher untouched.
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "quit" || trimmed == "exit" {
            break;
        }

        let (command, args) = split_command(trimmed);
        let reply = dispatcher.handle(command, args);
        println!("{}", reply);
    }

    dispatcher.shutdown();
    info!("Shutting down.");
}

fn init_logging() {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {l} {t} - {m}{n}",
        )))
        .build();
    let config = log4rs::config::Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info));

    match config {
        Ok(config) => {
            if let Err(err) = log4rs::init_config(config) {
                eprintln!("Unable to initialize logging: {}", err);
            }
        }
        Err(err) => eprintln!("Invalid logging configuration: {}", err),
    }
}

fn read_config() -> Result<Config, String> {
    let contents = fs::read_to_string(CONFIG_FILE)
        .map_err(|err| format!("Unable to read {}: {}", CONFIG_FILE, err))?;
    toml::from_str(&contents).map_err(|err| format!("Unable to parse {}: {}", CONFIG_FILE, err))
}

fn split_command(line: &str) -> (&str, &str) {
    match line.find(char::is_whitespace) {
        Some(index) => (&line[..index], line[index..].trim_left()),
        None => (line, ""),
    }
}
