//! CLI subcommands.

pub mod chat;
pub mod config_cmd;
pub mod modifiers;
pub mod onboard;
pub mod personas;
pub mod relationships;

use lucan_config::AppConfig;
use lucan_core::{Persona, PersonaDirectory};

/// Load the config and apply a `--persona` override.
pub fn load_config(persona: Option<&str>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if let Some(persona) = persona {
        config.persona = persona.to_string();
    }
    Ok(config)
}

/// Resolve and load the configured persona, printing a hint on failure.
pub fn load_persona(config: &AppConfig) -> Result<Persona, Box<dyn std::error::Error>> {
    let directory = PersonaDirectory::new(config.personas_dir());
    directory.load(&config.persona).map_err(|e| {
        eprintln!("Error: {e}");
        eprintln!("Use --list-personas to see available options");
        e.into()
    })
}
