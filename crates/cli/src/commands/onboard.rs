//! `lucan onboard`: first-time setup.
//!
//! Creates the config file, the default `lucan` persona, a `template`
//! persona to copy from, and the relationships directory. Existing files are
//! never overwritten.

use lucan_config::AppConfig;
use lucan_core::persona::{DEFAULT_PERSONA, MODIFIERS_FILE, PERSONALITY_FILE, TEMPLATE_DIR};
use std::path::{Path, PathBuf};

const LUCAN_PERSONALITY: &str = "\
name: Lucan
description: |
  a loyal, unflinching friend. You care about the user enough to tell them
  the truth. You ask more than you lecture, notice when words and actions
  don't line up, and keep the conversation moving toward what the user can
  do next. You use the occasional metaphor, and you reframe problems with
  structure when it helps.
";

const DEFAULT_MODIFIERS: &str = "\
modifiers:
  warmth: 0
  challenge: 0
  verbosity: 0
  emotional_depth: 0
  structure: 0
";

const TEMPLATE_PERSONALITY: &str = "\
# Copy this directory to memory/personas/<name>/ and edit.
name: Your Persona Name
description: |
  describe who this persona is, how they talk, and what they care about.
";

/// What `scaffold` created, for reporting.
#[derive(Debug, Default)]
pub struct Scaffold {
    pub created: Vec<PathBuf>,
    pub existing: Vec<PathBuf>,
}

impl Scaffold {
    fn dir(&mut self, path: PathBuf) -> std::io::Result<()> {
        if path.is_dir() {
            self.existing.push(path);
        } else {
            std::fs::create_dir_all(&path)?;
            self.created.push(path);
        }
        Ok(())
    }

    fn file(&mut self, path: PathBuf, content: &str) -> std::io::Result<()> {
        if path.exists() {
            self.existing.push(path);
        } else {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, content)?;
            self.created.push(path);
        }
        Ok(())
    }
}

/// Lay out the config file and memory directory.
pub fn scaffold(config_path: &Path, memory_dir: &Path) -> std::io::Result<Scaffold> {
    let mut out = Scaffold::default();
    out.file(config_path.to_path_buf(), &AppConfig::default_toml())?;

    let personas = memory_dir.join("personas");
    let lucan = personas.join(DEFAULT_PERSONA);
    out.file(lucan.join(PERSONALITY_FILE), LUCAN_PERSONALITY)?;
    out.file(lucan.join(MODIFIERS_FILE), DEFAULT_MODIFIERS)?;

    let template = personas.join(TEMPLATE_DIR);
    out.file(template.join(PERSONALITY_FILE), TEMPLATE_PERSONALITY)?;
    out.file(template.join(MODIFIERS_FILE), DEFAULT_MODIFIERS)?;

    out.dir(memory_dir.join("relationships"))?;
    Ok(out)
}

/// Config that decides where the memory directory goes. A malformed file is
/// an error.
fn setup_config(config_path: &Path) -> Result<AppConfig, String> {
    let mut config =
        AppConfig::load_from(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_path();
    let config = setup_config(&config_path)?;
    let memory_dir = config.memory_dir();

    println!("Lucan: first-time setup");
    println!("=======================\n");

    let result = scaffold(&config_path, &memory_dir)?;
    for path in &result.created {
        println!("  Created  {}", path.display());
    }
    for path in &result.existing {
        println!("  Exists   {}", path.display());
    }

    println!("\nNext steps:");
    println!("  1. Set LUCAN_API_KEY or ANTHROPIC_API_KEY (or add api_key to {})", config_path.display());
    println!("  2. Run: lucan");
    println!("  3. Copy {} to make your own persona\n", memory_dir.join("personas").join(TEMPLATE_DIR).display());

    Ok(())
}
