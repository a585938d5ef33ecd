//! File-based relationship store: one human-editable text file per person.
//!
//! Each record lives at `<dir>/<sanitized name>.txt`:
//!
//! ```text
//! ---
//! first_mentioned: 2026-03-01T10:00:00.000000
//! last_updated: 2026-03-04T18:12:09.441021
//! name: Mervin
//! relationship: therapist
//! ---
//!
//! - [2026-03-01] Helps with anxiety
//! - [2026-03-04] Suggested journaling
//! ```
//!
//! Unknown frontmatter keys are carried through rewrites. Notes may be
//! written as `-` or `*` bullets or as plain lines.

use async_trait::async_trait;
use lucan_core::error::MemoryError;
use lucan_core::relationship::{
    sanitize_name, timestamp_now, RelationshipRecord, RelationshipStore,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

const DELIMITER: &str = "---\n";
const EXTENSION: &str = "txt";

/// YAML frontmatter of a relationship file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Frontmatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    first_mentioned: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_updated: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    relationship: Option<String>,

    #[serde(flatten)]
    extra: BTreeMap<String, serde_yaml::Value>,
}

/// A relationship file split into its two halves.
#[derive(Debug, Default)]
struct RecordFile {
    frontmatter: Frontmatter,
    notes: Vec<String>,
}

impl RecordFile {
    /// Parse strictly: the file must open with a frontmatter block that
    /// holds valid YAML.
    fn parse(content: &str) -> Result<Self, String> {
        let rest = content
            .strip_prefix(DELIMITER)
            .ok_or("missing frontmatter")?;
        let end = rest.find(DELIMITER).ok_or("unterminated frontmatter")?;
        let frontmatter = parse_frontmatter(&rest[..end])?;
        Ok(Self {
            frontmatter,
            notes: parse_notes(&rest[end + DELIMITER.len()..]),
        })
    }

    /// Parse for rewriting: a broken frontmatter is dropped and any text
    /// without one is kept as notes.
    fn parse_lenient(content: &str) -> Self {
        let Some(rest) = content.strip_prefix(DELIMITER) else {
            return Self { frontmatter: Frontmatter::default(), notes: parse_notes(content) };
        };
        let Some(end) = rest.find(DELIMITER) else {
            return Self { frontmatter: Frontmatter::default(), notes: parse_notes(content) };
        };
        let frontmatter = parse_frontmatter(&rest[..end]).unwrap_or_else(|reason| {
            warn!(reason = %reason, "Discarding unreadable relationship frontmatter");
            Frontmatter::default()
        });
        Self { frontmatter, notes: parse_notes(&rest[end + DELIMITER.len()..]) }
    }

    fn render(&self) -> Result<String, String> {
        let yaml = serde_yaml::to_string(&self.frontmatter).map_err(|e| e.to_string())?;
        let mut content = String::with_capacity(yaml.len() + 64);
        content.push_str(DELIMITER);
        content.push_str(&yaml);
        content.push_str(DELIMITER);
        content.push('\n');
        for note in &self.notes {
            content.push_str(&format!("- {note}\n"));
        }
        Ok(content)
    }

    fn to_record(&self, fallback_name: &str, key: &str) -> RelationshipRecord {
        RelationshipRecord {
            name: self
                .frontmatter
                .name
                .clone()
                .unwrap_or_else(|| fallback_name.to_string()),
            relationship: self.frontmatter.relationship.clone().unwrap_or_default(),
            notes: self.notes.clone(),
            first_mentioned: self.frontmatter.first_mentioned.clone(),
            last_updated: self.frontmatter.last_updated.clone(),
            key: key.to_string(),
        }
    }
}

fn parse_frontmatter(text: &str) -> Result<Frontmatter, String> {
    if text.trim().is_empty() {
        return Ok(Frontmatter::default());
    }
    serde_yaml::from_str(text).map_err(|e| e.to_string())
}

fn parse_notes(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.strip_prefix('-').or_else(|| line.strip_prefix('*')) {
            Some(rest) => rest.trim().to_string(),
            None => line.to_string(),
        })
        .collect()
}

/// "mary_jane" → "Mary Jane"
fn title_case_stem(stem: &str) -> String {
    stem.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A relationship store backed by a directory of frontmatter text files.
///
/// Writes are serialized through a mutex so concurrent tool calls cannot
/// interleave a read-modify-write of the same file.
pub struct FileRelationshipStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileRelationshipStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, MemoryError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            MemoryError::Storage(format!("Failed to create relationships directory: {e}"))
        })?;
        debug!(dir = %dir.display(), "Relationship store opened");
        Ok(Self { dir, write_lock: Mutex::new(()) })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{EXTENSION}"))
    }

    fn read(path: &Path) -> Result<Option<String>, MemoryError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MemoryError::Storage(format!(
                "Failed to read relationship file {}: {e}",
                path.display()
            ))),
        }
    }
}

#[async_trait]
impl RelationshipStore for FileRelationshipStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn add_note(
        &self,
        name: &str,
        relationship_type: &str,
        note: &str,
    ) -> Result<RelationshipRecord, MemoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MemoryError::InvalidKey("Name cannot be empty".into()));
        }
        let key = sanitize_name(name);
        if key.is_empty() {
            return Err(MemoryError::InvalidKey(format!(
                "Name '{name}' has no usable characters"
            )));
        }

        let _guard = self.write_lock.lock().await;
        let path = self.path_for(&key);
        let now = timestamp_now();

        let mut file = match Self::read(&path)? {
            Some(content) => RecordFile::parse_lenient(&content),
            None => RecordFile {
                frontmatter: Frontmatter {
                    first_mentioned: Some(now.clone()),
                    name: Some(name.to_string()),
                    relationship: Some(relationship_type.to_string()),
                    ..Frontmatter::default()
                },
                notes: Vec::new(),
            },
        };
        if file.frontmatter.name.is_none() {
            file.frontmatter.name = Some(name.to_string());
        }

        let mut record = file.to_record(name, &key);
        record.apply_note(relationship_type, note, &now);
        file.frontmatter.last_updated = record.last_updated.clone();
        file.frontmatter.relationship = Some(record.relationship.clone());
        file.notes = record.notes.clone();

        let content = file.render().map_err(|e| {
            MemoryError::Storage(format!("Failed to serialize relationship record: {e}"))
        })?;
        std::fs::write(&path, content).map_err(|e| {
            MemoryError::Storage(format!("Failed to write relationship file: {e}"))
        })?;

        debug!(
            name = %record.name,
            relationship = %record.relationship,
            notes = record.notes.len(),
            file = %path.display(),
            "Relationship note saved"
        );
        Ok(record)
    }

    async fn get_notes(&self, name: &str) -> Result<Option<RelationshipRecord>, MemoryError> {
        let key = sanitize_name(name);
        if key.is_empty() {
            return Ok(None);
        }
        let path = self.path_for(&key);
        let Some(content) = Self::read(&path)? else {
            return Ok(None);
        };
        match RecordFile::parse(&content) {
            Ok(file) => Ok(Some(file.to_record(name.trim(), &key))),
            Err(reason) => {
                warn!(file = %path.display(), reason = %reason, "Malformed relationship file");
                Ok(None)
            }
        }
    }

    async fn list(&self) -> Result<Vec<RelationshipRecord>, MemoryError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            MemoryError::Storage(format!("Failed to read relationships directory: {e}"))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|ext| ext.to_str()) == Some(EXTENSION))
            .collect();
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(content) = Self::read(&path)? else { continue };
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            match RecordFile::parse(&content) {
                Ok(file) => records.push(file.to_record(&title_case_stem(stem), stem)),
                Err(reason) => {
                    warn!(file = %path.display(), reason = %reason, "Skipping malformed relationship file");
                }
            }
        }
        records.sort_by_key(|r| r.name.to_lowercase());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn store() -> (tempfile::TempDir, FileRelationshipStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileRelationshipStore::new(tmp.path().join("relationships")).unwrap();
        (tmp, store)
    }

    #[test]
    fn constructor_creates_directory() {
        let (_tmp, store) = store();
        assert!(store.dir().is_dir());
    }

    #[tokio::test]
    async fn add_note_creates_file() {
        let (_tmp, store) = store();
        let record = store.add_note("Mervin", "therapist", "Helps with anxiety").await.unwrap();
        assert_eq!(record.name, "Mervin");
        assert_eq!(record.relationship, "therapist");
        assert_eq!(record.notes.len(), 1);
        assert!(record.notes[0].starts_with('['));
        assert!(record.notes[0].ends_with("] Helps with anxiety"));
        assert_eq!(record.first_mentioned, record.last_updated);

        let content = fs::read_to_string(store.dir().join("mervin.txt")).unwrap();
        assert!(content.starts_with("---\n"));
        assert!(content.contains("name: Mervin\n"));
        assert!(content.contains("relationship: therapist\n"));
        assert!(content.contains("---\n\n- ["));
        assert!(content.ends_with("Helps with anxiety\n"));
    }

    #[tokio::test]
    async fn add_note_appends_and_updates_type() {
        let (_tmp, store) = store();
        let first = store.add_note("Mary Jane", "friend", "Met at college").await.unwrap();
        let second = store.add_note("mary jane", "", "Moved to Denver").await.unwrap();
        assert_eq!(second.name, "Mary Jane");
        assert_eq!(second.relationship, "friend");
        assert_eq!(second.notes.len(), 2);
        assert_eq!(second.first_mentioned, first.first_mentioned);

        let third = store.add_note("Mary-Jane", "partner", "").await.unwrap();
        assert_eq!(third.relationship, "partner");
        assert_eq!(third.notes.len(), 2);
        assert!(store.dir().join("mary_jane.txt").exists());
    }

    #[tokio::test]
    async fn empty_name_rejected() {
        let (_tmp, store) = store();
        let err = store.add_note("   ", "friend", "x").await.unwrap_err();
        assert!(matches!(err, MemoryError::InvalidKey(_)));
        assert!(store.add_note("!!!", "friend", "x").await.is_err());
    }

    #[tokio::test]
    async fn get_notes_roundtrip_and_missing() {
        let (_tmp, store) = store();
        assert!(store.get_notes("Nobody").await.unwrap().is_none());
        store.add_note("Rex", "dog", "Loves the beach").await.unwrap();
        let record = store.get_notes("rex").await.unwrap().unwrap();
        assert_eq!(record.name, "Rex");
        assert_eq!(record.relationship, "dog");
    }

    #[tokio::test]
    async fn hand_written_file_is_readable() {
        let (_tmp, store) = store();
        fs::write(
            store.dir().join("sarah.txt"),
            "---\nname: Sarah\nrelationship: colleague\nmood: upbeat\n---\n\n* Got promoted\nLikes climbing\n- [2026-01-02] Running a marathon\n",
        )
        .unwrap();

        let record = store.get_notes("Sarah").await.unwrap().unwrap();
        assert_eq!(
            record.notes,
            vec!["Got promoted", "Likes climbing", "[2026-01-02] Running a marathon"]
        );
        assert!(record.first_mentioned.is_none());

        store.add_note("Sarah", "", "Started a new team").await.unwrap();
        let content = fs::read_to_string(store.dir().join("sarah.txt")).unwrap();
        assert!(content.contains("mood: upbeat"));
        assert!(content.contains("- Got promoted\n"));
        assert!(content.contains("last_updated:"));
    }

    #[tokio::test]
    async fn malformed_file_reads_as_none_but_is_repaired_on_write() {
        let (_tmp, store) = store();
        let path = store.dir().join("tom.txt");
        fs::write(&path, "just some text about tom\n").unwrap();
        assert!(store.get_notes("Tom").await.unwrap().is_none());

        let record = store.add_note("Tom", "friend", "Plays guitar").await.unwrap();
        assert_eq!(record.notes.len(), 2);
        assert_eq!(record.notes[0], "just some text about tom");
        let repaired = store.get_notes("Tom").await.unwrap().unwrap();
        assert_eq!(repaired.relationship, "friend");
    }

    #[tokio::test]
    async fn invalid_yaml_frontmatter_is_none() {
        let (_tmp, store) = store();
        fs::write(store.dir().join("kim.txt"), "---\nname: [oops\n---\n\n- note\n").unwrap();
        assert!(store.get_notes("Kim").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_sorted_with_fallback_names() {
        let (_tmp, store) = store();
        store.add_note("Zoe", "friend", "").await.unwrap();
        store.add_note("adam", "colleague", "").await.unwrap();
        fs::write(store.dir().join("aunt_may.txt"), "---\nrelationship: family\n---\n").unwrap();
        fs::write(store.dir().join("broken.txt"), "no frontmatter").unwrap();
        fs::write(store.dir().join("ignored.md"), "---\nname: X\n---\n").unwrap();

        let names: Vec<String> = store.list().await.unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["adam", "Aunt May", "Zoe"]);
    }

    #[tokio::test]
    async fn find_by_relationship_type_uses_synonyms() {
        let (_tmp, store) = store();
        store.add_note("Linda", "mother", "").await.unwrap();
        store.add_note("Frank", "family", "").await.unwrap();
        store.add_note("Mervin", "counselor", "").await.unwrap();
        store.add_note("Sam", "friend", "").await.unwrap();

        let moms = store.find_by_relationship_type("mom").await.unwrap();
        let names: Vec<&str> = moms.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Frank", "Linda"]);

        let therapists = store.find_by_relationship_type("therapist").await.unwrap();
        assert_eq!(therapists.len(), 1);
        assert_eq!(therapists[0].name, "Mervin");

        assert!(store.find_by_relationship_type("pet").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listed_records_carry_file_stem() {
        let (_tmp, store) = store();
        fs::write(
            store.dir().join("mom.txt"),
            "---\nname: Linda\nrelationship: family\n---\n\n- Loves gardening\n",
        )
        .unwrap();

        let records = store.list().await.unwrap();
        assert_eq!(records[0].name, "Linda");
        assert_eq!(records[0].key, "mom");

        let found = lucan_core::relationship::mentioned_records("mom says hi", &records);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].notes, vec!["Loves gardening"]);
    }

    #[test]
    fn title_case_examples() {
        assert_eq!(title_case_stem("aunt_may"), "Aunt May");
        assert_eq!(title_case_stem("rex"), "Rex");
    }
}
