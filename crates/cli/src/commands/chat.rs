//! `lucan chat`: interactive or single-message chat with a persona.

use crate::input::{spawn_stdin_reader, ChatCommand};
use lucan_agent::ChatSession;
use lucan_config::AppConfig;
use lucan_core::error::ProviderError;
use lucan_memory::FileRelationshipStore;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

pub const GOODBYE_MESSAGE: &str = "Goodbye! Take care.";
pub const CONVERSATION_CLEARED: &str = "Conversation history cleared.";
pub const CHAT_INTERRUPTED: &str = "Chat interrupted. Goodbye!";
pub const WELCOME_SUBTITLE: &str =
    "Type 'quit', 'exit', or 'bye' to leave • '/clear' to reset conversation";

const HELP_TEXT: &str = "\
Available commands:
  /clear                 Clear conversation history
  /help                  Show this help message
  quit, exit, or bye     Exit the chat

Persona selection:
  --persona <name>       Choose a different persona when starting
  --list-personas        See all available personas

Tips:
  - Direct, honest messages get the most useful replies
  - Ask about goals, challenges, or decisions you're facing
  - Say things like \"be more supportive\" or \"be less verbose\" to adjust the style";

pub struct ChatOptions {
    pub persona: Option<String>,
    pub debug: bool,
    pub message: Option<String>,
}

pub async fn run(opts: ChatOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(opts.persona.as_deref())?;
    let persona = super::load_persona(&config)?;

    let provider = match lucan_providers::build_provider(&config) {
        Ok(p) => p,
        Err(ProviderError::NotConfigured(reason)) => {
            print_setup_help();
            return Err(format!("Provider not configured: {reason}").into());
        }
        Err(e) => return Err(e.into()),
    };

    let store = FileRelationshipStore::new(config.relationships_dir())?;
    let name = persona.name().to_string();
    let diagnostics = persona.diagnostic_summary();
    debug!(persona = %name, model = %config.model, "Starting chat session");
    let mut session = ChatSession::new(
        Arc::new(RwLock::new(persona)),
        Arc::new(store),
        provider,
        &config,
    );

    if opts.debug {
        println!("Debug - Modifier Values");
        println!("{diagnostics}");
        println!("Debug - Generated System Prompt");
        println!("{}\n", session.system_prompt().await);
    }

    if let Some(msg) = opts.message {
        eprint!("{name} is thinking...");
        let reply = session.send_message(&msg).await;
        eprint!("\r{}\r", " ".repeat(name.len() + 15));
        println!("{reply}");
        return Ok(());
    }

    interactive(&mut session, &name).await
}

async fn interactive(session: &mut ChatSession, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    print_welcome(name);
    let mut rx = spawn_stdin_reader();

    loop {
        print!("You > ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = rx.recv() => line,
            _ = tokio::signal::ctrl_c() => {
                println!("\n{CHAT_INTERRUPTED}");
                return Ok(());
            }
        };

        let line = match line {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("An error occurred: {e}");
                return Err(e.into());
            }
            None => {
                println!("\n{GOODBYE_MESSAGE}");
                return Ok(());
            }
        };

        match ChatCommand::parse(&line) {
            ChatCommand::Empty => continue,
            ChatCommand::Exit => {
                println!("{GOODBYE_MESSAGE}");
                return Ok(());
            }
            ChatCommand::Clear => {
                session.clear_history();
                print_welcome(name);
                println!("{CONVERSATION_CLEARED}\n");
            }
            ChatCommand::Help => println!("\n{HELP_TEXT}\n"),
            ChatCommand::Message(text) => {
                eprint!("{name} is thinking...");
                let reply = tokio::select! {
                    reply = session.send_message(&text) => reply,
                    _ = tokio::signal::ctrl_c() => {
                        println!("\n{CHAT_INTERRUPTED}");
                        return Ok(());
                    }
                };
                eprint!("\r{}\r", " ".repeat(name.len() + 15));
                println!("\n{}\n", format_reply(name, &reply));
            }
        }
    }
}

fn print_welcome(name: &str) {
    println!();
    println!("  {}", welcome_line(name));
    println!("  {WELCOME_SUBTITLE}");
    println!();
}

pub fn welcome_line(name: &str) -> String {
    format!("Welcome to {name} - your loyal AI friend")
}

/// Prefix every line of the reply with the persona's name.
pub fn format_reply(name: &str, reply: &str) -> String {
    reply
        .lines()
        .map(|line| format!("{name} > {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_setup_help() {
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    LUCAN_API_KEY=sk-ant-...");
    eprintln!("    ANTHROPIC_API_KEY=sk-ant-...");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_path().display());
    eprintln!();
    eprintln!("  Run `lucan onboard` to create the config and default persona.");
    eprintln!();
}
