//! Lucan CLI, the main entry point.
//!
//! Commands:
//! - `chat`           Interactive chat or single-message mode (default)
//! - `personas`       List available personas
//! - `modifiers`      Show or change a persona's modifiers
//! - `relationships`  Show remembered people
//! - `onboard`        Create config, default persona and template
//! - `config`         Show config or its path

use clap::{Parser, Subcommand};

mod commands;
mod input;

#[derive(Parser)]
#[command(
    name = "lucan",
    about = "Lucan CLI - your adaptive AI friend",
    version,
    after_help = "Examples:\n  lucan                              Use the default Lucan persona\n  lucan --persona coach              Use the coach persona\n  lucan --persona ./personas/coach   Use a persona directory by path\n  lucan --list-personas              Show available personas\n  lucan --debug                      Show modifiers and system prompt on start"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Persona by name (e.g. 'coach') or path
    #[arg(long, global = true)]
    persona: Option<String>,

    /// Show loaded modifiers and the system prompt, and log at debug level
    #[arg(long, global = true)]
    debug: bool,

    /// List all available personas and exit
    #[arg(long)]
    list_personas: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Send a single message instead of entering interactive mode
    #[arg(short, long, global = true)]
    message: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the persona (default)
    Chat,

    /// List available personas
    Personas,

    /// Show or change the persona's modifiers
    Modifiers {
        /// Set a modifier to an absolute value, e.g. --set warmth=2
        #[arg(long, value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Move a modifier by a delta, e.g. --adjust verbosity=-1
        #[arg(long, value_name = "KEY=DELTA", allow_hyphen_values = true)]
        adjust: Vec<String>,
    },

    /// Show remembered people, or one person in detail
    Relationships {
        /// Name to look up
        name: Option<String>,
    },

    /// Initialize configuration, the default persona and the template
    Onboard,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing; quiet by default so chat output stays clean
    let filter = if cli.verbose || cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    if cli.list_personas {
        return commands::personas::run(cli.persona.as_deref()).await;
    }

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            commands::chat::run(commands::chat::ChatOptions {
                persona: cli.persona,
                debug: cli.debug,
                message: cli.message,
            })
            .await?
        }
        Commands::Personas => commands::personas::run(cli.persona.as_deref()).await?,
        Commands::Modifiers { set, adjust } => {
            commands::modifiers::run(cli.persona.as_deref(), &set, &adjust).await?
        }
        Commands::Relationships { name } => commands::relationships::run(name.as_deref()).await?,
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
        },
    }

    Ok(())
}
