//! Relationship memory: notes about people the user mentions.
//!
//! Each person (or pet, or organization) gets one record keyed by a
//! sanitized form of their name. Notes are appended with a date prefix and
//! never rewritten. Backends live in `lucan-memory`; this module holds the
//! record type, the store trait, and the text heuristics shared by the
//! tools and the session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use crate::error::MemoryError;

/// Fallback relationship type when nothing more specific is known.
pub const DEFAULT_RELATIONSHIP: &str = "person";

/// A stored relationship record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    /// Display name as first given
    pub name: String,

    /// Relationship type (e.g., "therapist", "family", "pet")
    #[serde(default)]
    pub relationship: String,

    /// Notes, oldest first, each prefixed with `[YYYY-MM-DD]`
    #[serde(default)]
    pub notes: Vec<String>,

    /// Local ISO timestamp of creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_mentioned: Option<String>,

    /// Local ISO timestamp of the last write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    /// Store key: the sanitized name, or the file stem the record was read from
    #[serde(skip)]
    pub key: String,
}

impl RelationshipRecord {
    /// A fresh record stamped with `now`.
    pub fn new(name: &str, relationship_type: &str, now: &str) -> Self {
        Self {
            name: name.to_string(),
            relationship: relationship_type.to_string(),
            notes: Vec::new(),
            first_mentioned: Some(now.to_string()),
            last_updated: Some(now.to_string()),
            key: sanitize_name(name),
        }
    }

    /// Apply one `add_note` call to this record.
    ///
    /// A non-empty type overwrites the stored one; a non-empty note is
    /// appended with the date part of `now`.
    pub fn apply_note(&mut self, relationship_type: &str, note: &str, now: &str) {
        self.last_updated = Some(now.to_string());
        if !relationship_type.is_empty() {
            self.relationship = relationship_type.to_string();
        }
        let note = note.trim();
        if !note.is_empty() {
            self.notes.push(dated_note(note, now));
        }
    }
}

/// Current local time in ISO-8601 with microseconds.
pub fn timestamp_now() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Prefix a note with the date part of an ISO timestamp.
pub fn dated_note(note: &str, timestamp: &str) -> String {
    let date: String = timestamp.chars().take(10).collect();
    format!("[{date}] {note}")
}

/// Storage for relationship records.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Backend name (e.g., "file", "in_memory").
    fn name(&self) -> &str;

    /// Create or update a record and append a note.
    ///
    /// An empty or whitespace-only name is rejected.
    async fn add_note(
        &self,
        name: &str,
        relationship_type: &str,
        note: &str,
    ) -> Result<RelationshipRecord, MemoryError>;

    /// Look up a record by name. Missing or unreadable records yield `None`.
    async fn get_notes(&self, name: &str) -> Result<Option<RelationshipRecord>, MemoryError>;

    /// Every record, sorted by name.
    async fn list(&self) -> Result<Vec<RelationshipRecord>, MemoryError>;

    /// Records whose stored type matches `relationship_type` or a synonym.
    async fn find_by_relationship_type(
        &self,
        relationship_type: &str,
    ) -> Result<Vec<RelationshipRecord>, MemoryError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|r| relationship_types_match(relationship_type, &r.relationship))
            .collect())
    }
}

/// Turn a display name into a record key.
///
/// Lowercases, keeps alphanumerics plus space, `-` and `_`, then maps space
/// and `-` to `_`.
pub fn sanitize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Whether a queried relationship type matches a stored one.
pub fn relationship_types_match(query: &str, stored: &str) -> bool {
    let query = query.to_lowercase();
    let stored = stored.to_lowercase();
    if query == stored {
        return true;
    }
    let in_group = |group: &[&str], s: &str| group.contains(&s);
    match query.as_str() {
        "mom" | "mother" => in_group(&["mom", "mother", "family"], &stored),
        "dad" | "father" => in_group(&["dad", "father", "family"], &stored),
        "family" => in_group(&["mom", "mother", "dad", "father", "family"], &stored),
        "therapist" | "counselor" => in_group(&["therapist", "counselor"], &stored),
        "pet" | "dog" | "cat" => in_group(&["pet", "dog", "cat"], &stored),
        _ => false,
    }
}

/// Keyword groups for relationship inference, checked in order.
const INFERENCE_RULES: &[(&[&str], &str)] = &[
    (&["therapist", "therapy", "counselor", "psychologist"], "therapist"),
    (&["mom", "mother", "dad", "father", "parent"], "family"),
    (&["friend", "buddy", "pal"], "friend"),
    (&["boss", "manager", "colleague", "coworker", "work"], "colleague"),
    (&["doctor", "dr", "physician", "dentist"], "doctor"),
    (&["teacher", "professor", "instructor"], "teacher"),
    (&["dog", "cat", "pet", "puppy", "kitten"], "pet"),
    (&["wife", "husband", "spouse", "partner", "girlfriend", "boyfriend"], "partner"),
    (&["son", "daughter", "child", "kid"], "child"),
    (&["brother", "sister", "sibling"], "sibling"),
];

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Guess a relationship type from recent conversation text.
///
/// Keywords match whole words (a trailing plural `s` is allowed), so
/// "person" does not count as "son".
pub fn infer_relationship_type(context: &str) -> &'static str {
    let words = words(context);
    let mentions = |keyword: &str| {
        words.iter().any(|w| {
            w == keyword || (w.len() == keyword.len() + 1 && w.starts_with(keyword) && w.ends_with('s'))
        })
    };
    INFERENCE_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| mentions(k)))
        .map(|(_, kind)| *kind)
        .unwrap_or(DEFAULT_RELATIONSHIP)
}

/// Records whose name or store key appears as a whole word (or word
/// sequence) in `text`.
pub fn mentioned_records<'a>(
    text: &str,
    records: &'a [RelationshipRecord],
) -> Vec<&'a RelationshipRecord> {
    let haystack = words(text);
    let contains = |needle: &[String]| {
        !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
    };
    records
        .iter()
        .filter(|record| {
            let key: Vec<String> = record
                .key
                .split('_')
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect();
            contains(&words(&record.name)) || contains(&key)
        })
        .collect()
}

/// The last few conversation messages, shared between the session (which
/// writes it every turn) and tools that infer from context.
#[derive(Debug, Clone, Default)]
pub struct RecentContext(Arc<RwLock<String>>);

impl RecentContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, text: impl Into<String>) {
        let mut guard = match self.0.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = text.into();
    }

    pub fn text(&self) -> String {
        match self.0.read() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
