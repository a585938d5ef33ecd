//! Persona system: base personality text plus a persisted modifier set.
//!
//! A persona lives in its own directory under the personas root:
//!
//! ```text
//! personas/
//!   lucan/
//!     personality.txt   # YAML: name, description
//!     modifiers.txt     # YAML: modifiers: { warmth: 0, ... }
//!   template/           # starting point for new personas, never listed
//! ```
//!
//! Both files are size-checked before parsing. Modifier changes are written
//! back to `modifiers.txt` immediately.

use crate::error::PersonaError;
use crate::modifier::{Modifier, ModifierChange, ModifierSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Well-known persona file names.
pub const PERSONALITY_FILE: &str = "personality.txt";
pub const MODIFIERS_FILE: &str = "modifiers.txt";

/// Directory under the personas root that holds the starter template.
pub const TEMPLATE_DIR: &str = "template";

/// Persona used when none is requested.
pub const DEFAULT_PERSONA: &str = "lucan";

/// Display name when `personality.txt` has no `name`.
pub const DEFAULT_DISPLAY_NAME: &str = "Lucan";

pub const MAX_PERSONALITY_BYTES: u64 = 10 * 1024;
pub const MAX_MODIFIERS_BYTES: u64 = 5 * 1024;

const MAX_PERSONA_NAME_LEN: usize = 50;

/// A persona shared between the session and the tools that mutate it.
pub type SharedPersona = Arc<tokio::sync::RwLock<Persona>>;

/// The parsed contents of `personality.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalityProfile {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawProfile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl PersonalityProfile {
    /// Parse the YAML body of a personality file.
    pub fn from_yaml(content: &str) -> Result<Self, String> {
        let raw: RawProfile = if content.trim().is_empty() {
            RawProfile::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| e.to_string())?
        };
        Ok(Self {
            name: raw
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            description: raw.description.unwrap_or_default(),
        })
    }
}

/// A loaded persona.
#[derive(Debug, Clone)]
pub struct Persona {
    dir: PathBuf,
    profile: PersonalityProfile,
    modifiers: ModifierSet,
}

impl Persona {
    /// Load a persona from its directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, PersonaError> {
        let dir = dir.as_ref().to_path_buf();
        let label = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());

        let personality_path = dir.join(PERSONALITY_FILE);
        if !personality_path.is_file() {
            return Err(PersonaError::MissingPersonality(label));
        }
        let modifiers_path = dir.join(MODIFIERS_FILE);
        if !modifiers_path.is_file() {
            return Err(PersonaError::MissingModifiers(label));
        }

        let content = read_limited(&personality_path, MAX_PERSONALITY_BYTES)?;
        let profile = PersonalityProfile::from_yaml(&content).map_err(|reason| {
            PersonaError::Parse { path: personality_path.clone(), reason }
        })?;

        let content = read_limited(&modifiers_path, MAX_MODIFIERS_BYTES)?;
        let modifiers = ModifierSet::from_yaml(&content).map_err(|reason| {
            PersonaError::Parse { path: modifiers_path.clone(), reason }
        })?;

        debug!(
            persona = %profile.name,
            dir = %dir.display(),
            modifiers = modifiers.len(),
            "Persona loaded"
        );

        Ok(Self { dir, profile, modifiers })
    }

    /// Build an in-memory persona. Nothing is read; saving writes into `dir`.
    pub fn from_parts(dir: impl Into<PathBuf>, profile: PersonalityProfile, modifiers: ModifierSet) -> Self {
        Self { dir: dir.into(), profile, modifiers }
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn profile(&self) -> &PersonalityProfile {
        &self.profile
    }

    pub fn modifiers(&self) -> &ModifierSet {
        &self.modifiers
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn personality_path(&self) -> PathBuf {
        self.dir.join(PERSONALITY_FILE)
    }

    pub fn modifiers_path(&self) -> PathBuf {
        self.dir.join(MODIFIERS_FILE)
    }

    /// Rewrite `modifiers.txt` from the in-memory set.
    pub fn save_modifiers(&self) -> Result<(), PersonaError> {
        let path = self.modifiers_path();
        let yaml = self
            .modifiers
            .to_yaml()
            .map_err(|reason| PersonaError::Parse { path: path.clone(), reason })?;
        std::fs::write(&path, yaml).map_err(|e| PersonaError::Io {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        debug!(file = %path.display(), "Modifiers saved");
        Ok(())
    }

    /// Set an existing modifier and persist it.
    pub fn set_modifier(&mut self, key: &str, value: i64) -> Result<ModifierChange, PersonaError> {
        self.mutate(|set| set.set(key, value))
    }

    /// Adjust an existing modifier by `delta` and persist it.
    pub fn adjust_modifier(&mut self, key: &str, delta: i64) -> Result<ModifierChange, PersonaError> {
        self.mutate(|set| set.adjust(key, delta))
    }

    /// Move a known axis to `target`, inserting it if absent, and persist it.
    ///
    /// Only a write failure is an error; hitting the boundary is not.
    pub fn apply_modifier(&mut self, axis: Modifier, target: i64) -> Result<ModifierChange, PersonaError> {
        self.mutate(|set| Ok(set.upsert(axis, target)))
    }

    fn mutate<F>(&mut self, op: F) -> Result<ModifierChange, PersonaError>
    where
        F: FnOnce(&mut ModifierSet) -> Result<ModifierChange, PersonaError>,
    {
        let previous = self.modifiers.clone();
        let change = op(&mut self.modifiers)?;
        if let Err(e) = self.save_modifiers() {
            self.modifiers = previous;
            return Err(e);
        }
        info!(
            persona = %self.profile.name,
            modifier = %change.key,
            old = change.old,
            new = change.new,
            "Modifier updated"
        );
        Ok(change)
    }

    /// The persona section of the system prompt.
    pub fn build_prompt_profile(&self) -> String {
        let mut prompt = format!(
            "You are {}, {}\n\n",
            self.profile.name,
            self.profile.description.trim()
        );

        let mut non_zero = self.modifiers.non_zero().peekable();
        if non_zero.peek().is_some() {
            prompt.push_str(
                "Personality modifiers (scale -3 to +3, where -3 is extreme negative, 0 is neutral, +3 is extreme positive):\n",
            );
            for (key, value) in non_zero {
                prompt.push_str(&format!("- {key}: {value}\n"));
            }
            prompt.push_str("\nAdjust your personality accordingly based on these modifier values.\n");
        }

        prompt
    }

    /// Human-readable dump of the loaded modifiers, for `--debug`.
    pub fn diagnostic_summary(&self) -> String {
        let mut summary = String::new();
        if self.modifiers.is_empty() {
            summary.push_str("No modifiers loaded\n");
        } else {
            summary.push_str("Loaded Modifiers:\n");
            for (key, value) in self.modifiers.iter() {
                summary.push_str(&format!("- {key}: {value}\n"));
            }
        }
        summary.push_str(&format!("\nModifiers file: {}\n", self.modifiers_path().display()));
        summary
    }
}

/// Read a file after checking its size against `limit`.
fn read_limited(path: &Path, limit: u64) -> Result<String, PersonaError> {
    let meta = std::fs::metadata(path).map_err(|e| PersonaError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if meta.len() > limit {
        return Err(PersonaError::FileTooLarge {
            path: path.to_path_buf(),
            size: meta.len(),
            limit,
        });
    }
    std::fs::read_to_string(path).map_err(|e| PersonaError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Check a persona name: 1-50 chars of `a-z`, `0-9`, `_`, `-`.
pub fn validate_persona_name(name: &str) -> Result<(), PersonaError> {
    let invalid = |reason: &str| PersonaError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.chars().count() > MAX_PERSONA_NAME_LEN {
        return Err(invalid("name is longer than 50 characters"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err(invalid("only lowercase letters, digits, '_' and '-' are allowed"));
    }
    Ok(())
}

/// The directory that holds every persona.
#[derive(Debug, Clone)]
pub struct PersonaDirectory {
    root: PathBuf,
}

impl PersonaDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of usable personas, sorted. The template is excluded.
    pub fn list(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(rd) => rd,
            Err(e) => {
                debug!(dir = %self.root.display(), error = %e, "Personas directory not readable");
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .filter(|p| p.join(PERSONALITY_FILE).is_file() && p.join(MODIFIERS_FILE).is_file())
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .filter(|n| n != TEMPLATE_DIR)
            .collect();
        names.sort();
        names
    }

    /// Turn a persona name or path into a validated persona directory.
    ///
    /// Input containing `/` or `\` is taken as a path; anything else is a
    /// name under the root.
    pub fn resolve(&self, input: &str) -> Result<PathBuf, PersonaError> {
        let path = if input.contains('/') || input.contains('\\') {
            PathBuf::from(input)
        } else {
            validate_persona_name(input)?;
            self.root.join(input)
        };

        if !path.exists() {
            let available = self.list();
            let available = if available.is_empty() {
                "none".to_string()
            } else {
                available.join(", ")
            };
            return Err(PersonaError::NotFound { persona: input.to_string(), available });
        }
        if !path.is_dir() {
            return Err(PersonaError::NotADirectory(path));
        }
        if !path.join(PERSONALITY_FILE).exists() {
            return Err(PersonaError::MissingPersonality(input.to_string()));
        }
        if !path.join(MODIFIERS_FILE).exists() {
            return Err(PersonaError::MissingModifiers(input.to_string()));
        }
        Ok(path)
    }

    /// Resolve and load in one step.
    pub fn load(&self, input: &str) -> Result<Persona, PersonaError> {
        Persona::load(self.resolve(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_persona(root: &Path, name: &str, personality: &str, modifiers: &str) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(PERSONALITY_FILE), personality).unwrap();
        fs::write(dir.join(MODIFIERS_FILE), modifiers).unwrap();
        dir
    }

    const PERSONALITY: &str = "name: Lucan\ndescription: |\n  a loyal friend who asks hard questions.\n";
    const MODIFIERS: &str = "modifiers:\n  warmth: 1\n  challenge: 0\n  verbosity: -2\n";

    #[test]
    fn load_reads_both_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = write_persona(tmp.path(), "lucan", PERSONALITY, MODIFIERS);
        let persona = Persona::load(&dir).unwrap();
        assert_eq!(persona.name(), "Lucan");
        assert_eq!(persona.modifiers().get("verbosity"), Some(-2));
    }

    #[test]
    fn name_defaults_when_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = write_persona(tmp.path(), "quiet", "description: calm\n", MODIFIERS);
        let persona = Persona::load(&dir).unwrap();
        assert_eq!(persona.name(), "Lucan");
        assert_eq!(persona.profile().description, "calm");
    }

    #[test]
    fn load_missing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("half");
        fs::create_dir_all(&dir).unwrap();
        let err = Persona::load(&dir).unwrap_err();
        assert!(matches!(err, PersonaError::MissingPersonality(_)));

        fs::write(dir.join(PERSONALITY_FILE), PERSONALITY).unwrap();
        let err = Persona::load(&dir).unwrap_err();
        assert_eq!(err.to_string(), "Persona 'half' is missing modifiers.txt file");
    }

    #[test]
    fn load_rejects_oversize_files() {
        let tmp = tempfile::tempdir().unwrap();
        let big = format!("name: Big\ndescription: {}\n", "x".repeat(11 * 1024));
        let dir = write_persona(tmp.path(), "big", &big, MODIFIERS);
        let err = Persona::load(&dir).unwrap_err();
        assert!(matches!(err, PersonaError::FileTooLarge { limit: MAX_PERSONALITY_BYTES, .. }));

        let big_mods = format!("modifiers:\n  warmth: 1\n# {}\n", "y".repeat(6 * 1024));
        let dir = write_persona(tmp.path(), "bigmods", PERSONALITY, &big_mods);
        let err = Persona::load(&dir).unwrap_err();
        assert!(matches!(err, PersonaError::FileTooLarge { limit: MAX_MODIFIERS_BYTES, .. }));
    }

    #[test]
    fn load_rejects_invalid_yaml() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = write_persona(tmp.path(), "broken", PERSONALITY, "modifiers: [unclosed\n");
        let err = Persona::load(&dir).unwrap_err();
        assert!(matches!(err, PersonaError::Parse { .. }));
    }

    #[test]
    fn prompt_profile_lists_non_zero_modifiers() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = write_persona(tmp.path(), "lucan", PERSONALITY, MODIFIERS);
        let persona = Persona::load(&dir).unwrap();
        let profile = persona.build_prompt_profile();
        assert!(profile.starts_with("You are Lucan, a loyal friend who asks hard questions.\n\n"));
        assert!(profile.contains("- warmth: 1\n- verbosity: -2\n"));
        assert!(!profile.contains("challenge"));
        assert!(profile.ends_with("Adjust your personality accordingly based on these modifier values.\n"));
    }

    #[test]
    fn prompt_profile_without_modifiers() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = write_persona(tmp.path(), "flat", PERSONALITY, "modifiers:\n  warmth: 0\n");
        let persona = Persona::load(&dir).unwrap();
        assert_eq!(
            persona.build_prompt_profile(),
            "You are Lucan, a loyal friend who asks hard questions.\n\n"
        );
    }

    #[test]
    fn set_modifier_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = write_persona(tmp.path(), "lucan", PERSONALITY, MODIFIERS);
        let mut persona = Persona::load(&dir).unwrap();
        let change = persona.set_modifier("challenge", 5).unwrap();
        assert_eq!(change.to_string(), "Set challenge from 0 to 3");

        let reloaded = Persona::load(&dir).unwrap();
        assert_eq!(reloaded.modifiers().get("challenge"), Some(3));
        let keys: Vec<&str> = reloaded.modifiers().iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["warmth", "challenge", "verbosity"]);
    }

    #[test]
    fn adjust_modifier_boundary_does_not_write() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = write_persona(tmp.path(), "lucan", PERSONALITY, "modifiers:\n  warmth: -3\n");
        let mut persona = Persona::load(&dir).unwrap();
        let err = persona.adjust_modifier("warmth", -1).unwrap_err();
        assert!(matches!(err, PersonaError::AtBoundary { current: -3, .. }));
        let raw = fs::read_to_string(dir.join(MODIFIERS_FILE)).unwrap();
        assert_eq!(raw, "modifiers:\n  warmth: -3\n");
    }

    #[test]
    fn apply_modifier_inserts_known_axis() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = write_persona(tmp.path(), "lucan", PERSONALITY, MODIFIERS);
        let mut persona = Persona::load(&dir).unwrap();
        let change = persona.apply_modifier(Modifier::EmotionalDepth, -7).unwrap();
        assert_eq!((change.old, change.new), (0, -3));
        let reloaded = Persona::load(&dir).unwrap();
        assert_eq!(reloaded.modifiers().get("emotional_depth"), Some(-3));
    }

    #[test]
    fn diagnostic_summary_lists_modifiers() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = write_persona(tmp.path(), "lucan", PERSONALITY, MODIFIERS);
        let persona = Persona::load(&dir).unwrap();
        let summary = persona.diagnostic_summary();
        assert!(summary.starts_with("Loaded Modifiers:\n- warmth: 1\n"));
        assert!(summary.contains("Modifiers file:"));

        let dir = write_persona(tmp.path(), "empty", PERSONALITY, "");
        let persona = Persona::load(&dir).unwrap();
        assert!(persona.diagnostic_summary().starts_with("No modifiers loaded"));
    }

    #[test]
    fn directory_lists_valid_personas_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        write_persona(tmp.path(), "therapist", PERSONALITY, MODIFIERS);
        write_persona(tmp.path(), "coach", PERSONALITY, MODIFIERS);
        write_persona(tmp.path(), TEMPLATE_DIR, PERSONALITY, MODIFIERS);
        fs::create_dir_all(tmp.path().join("incomplete")).unwrap();

        let dir = PersonaDirectory::new(tmp.path());
        assert_eq!(dir.list(), vec!["coach", "therapist"]);
    }

    #[test]
    fn directory_list_of_missing_root_is_empty() {
        let dir = PersonaDirectory::new("/definitely/not/here");
        assert!(dir.list().is_empty());
    }

    #[test]
    fn resolve_reports_available_personas() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = PersonaDirectory::new(tmp.path());
        let err = dir.resolve("coach").unwrap_err();
        assert_eq!(err.to_string(), "Persona 'coach' not found. Available personas: none");

        write_persona(tmp.path(), "lucan", PERSONALITY, MODIFIERS);
        let err = dir.resolve("coach").unwrap_err();
        assert_eq!(err.to_string(), "Persona 'coach' not found. Available personas: lucan");
        assert_eq!(dir.resolve("lucan").unwrap(), tmp.path().join("lucan"));
    }

    #[test]
    fn resolve_accepts_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let persona_dir = write_persona(tmp.path(), "Custom Persona", PERSONALITY, MODIFIERS);
        let dir = PersonaDirectory::new(tmp.path().join("elsewhere"));
        let input = persona_dir.to_string_lossy().into_owned();
        assert_eq!(dir.resolve(&input).unwrap(), persona_dir);

        let file = tmp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let err = dir.resolve(&file.to_string_lossy()).unwrap_err();
        assert!(matches!(err, PersonaError::NotADirectory(_)));
    }

    #[test]
    fn resolve_validates_names() {
        let dir = PersonaDirectory::new("/tmp");
        assert!(matches!(dir.resolve("Coach").unwrap_err(), PersonaError::InvalidName { .. }));
        assert!(matches!(dir.resolve("..").unwrap_err(), PersonaError::InvalidName { .. }));
        assert!(validate_persona_name(&"a".repeat(50)).is_ok());
        assert!(validate_persona_name(&"a".repeat(51)).is_err());
        assert!(validate_persona_name("").is_err());
    }
}
