//! Terminal input for interactive chat.
//!
//! Lines are read from stdin on a background task and delivered over a
//! channel, so the chat loop can also wait for Ctrl+C.

use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

pub const EXIT_COMMANDS: &[&str] = &["quit", "exit", "bye"];
pub const CLEAR_COMMAND: &str = "/clear";
pub const HELP_COMMANDS: &[&str] = &["/help", "help"];

/// What a line of user input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Empty,
    Exit,
    Clear,
    Help,
    Message(String),
}

impl ChatCommand {
    /// Commands match case-insensitively; anything else is a message.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return ChatCommand::Empty;
        }
        let command = trimmed.to_lowercase();
        if EXIT_COMMANDS.contains(&command.as_str()) {
            ChatCommand::Exit
        } else if command == CLEAR_COMMAND {
            ChatCommand::Clear
        } else if HELP_COMMANDS.contains(&command.as_str()) {
            ChatCommand::Help
        } else {
            ChatCommand::Message(trimmed.to_string())
        }
    }
}

/// Spawn a task that forwards stdin lines until EOF.
pub fn spawn_stdin_reader() -> mpsc::Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        let reader = BufReader::new(io::stdin());
        let mut lines = reader.lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(Ok(line)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break, // EOF (Ctrl+D)
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    break;
                }
            }
        }
    });

    rx
}
