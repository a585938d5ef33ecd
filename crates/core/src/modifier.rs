//! Personality modifiers: bounded integer axes that shape response style.
//!
//! A persona's `modifiers.txt` looks like:
//!
//! ```yaml
//! modifiers:
//!   warmth: 1
//!   challenge: 0
//!   verbosity: -1
//! ```
//!
//! Every stored value is kept inside [`MODIFIER_MIN`, `MODIFIER_MAX`]. Values
//! read from disk are clamped on load, and every mutation clamps again.

use crate::error::PersonaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MODIFIER_MIN: i32 = -3;
pub const MODIFIER_MAX: i32 = 3;

/// Clamp any integer into the modifier range.
pub fn clamp_modifier(value: i64) -> i32 {
    value.clamp(MODIFIER_MIN as i64, MODIFIER_MAX as i64) as i32
}

/// The five axes the model is allowed to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Warmth,
    Challenge,
    Verbosity,
    EmotionalDepth,
    Structure,
}

impl Modifier {
    pub const ALL: [Modifier; 5] = [
        Modifier::Warmth,
        Modifier::Challenge,
        Modifier::Verbosity,
        Modifier::EmotionalDepth,
        Modifier::Structure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Warmth => "warmth",
            Modifier::Challenge => "challenge",
            Modifier::Verbosity => "verbosity",
            Modifier::EmotionalDepth => "emotional_depth",
            Modifier::Structure => "structure",
        }
    }

    /// All axis names, in canonical order.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Modifier::as_str).collect()
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modifier {
    type Err = PersonaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| PersonaError::UnknownModifier(s.to_string()))
    }
}

/// Whether a change was an absolute set or a relative adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Set,
    Adjust,
}

/// The outcome of a single modifier mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierChange {
    pub key: String,
    pub old: i32,
    pub new: i32,
    pub kind: ChangeKind,
}

impl ModifierChange {
    pub fn changed(&self) -> bool {
        self.old != self.new
    }
}

impl fmt::Display for ModifierChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            ChangeKind::Set => "Set",
            ChangeKind::Adjust => "Adjusted",
        };
        write!(f, "{verb} {} from {} to {}", self.key, self.old, self.new)
    }
}

/// An ordered `key → value` set of modifiers.
///
/// Order follows the file so that rewriting `modifiers.txt` does not shuffle
/// the user's layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifierSet {
    entries: Vec<(String, i32)>,
}

impl ModifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the contents of a modifiers file.
    ///
    /// An empty document or a missing `modifiers` key yields an empty set.
    pub fn from_yaml(content: &str) -> Result<Self, String> {
        let doc: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        let modifiers = match &doc {
            serde_yaml::Value::Null => return Ok(Self::new()),
            serde_yaml::Value::Mapping(map) => match map.get("modifiers") {
                None | Some(serde_yaml::Value::Null) => return Ok(Self::new()),
                Some(serde_yaml::Value::Mapping(m)) => m,
                Some(_) => return Err("'modifiers' must be a mapping".into()),
            },
            _ => return Err("expected a mapping at the top level".into()),
        };

        let mut set = Self::new();
        for (key, value) in modifiers {
            let key = key
                .as_str()
                .ok_or_else(|| format!("modifier key {key:?} is not a string"))?;
            let raw = value
                .as_i64()
                .ok_or_else(|| format!("modifier '{key}' must be an integer"))?;
            set.insert(key, clamp_modifier(raw));
        }
        Ok(set)
    }

    /// Serialize back to the modifiers file layout.
    pub fn to_yaml(&self) -> Result<String, String> {
        let mut inner = serde_yaml::Mapping::new();
        for (key, value) in &self.entries {
            inner.insert(
                serde_yaml::Value::String(key.clone()),
                serde_yaml::Value::Number((*value as i64).into()),
            );
        }
        let mut doc = serde_yaml::Mapping::new();
        doc.insert("modifiers".into(), serde_yaml::Value::Mapping(inner));
        serde_yaml::to_string(&doc).map_err(|e| e.to_string())
    }

    pub fn get(&self, key: &str) -> Option<i32> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Modifiers with a value other than zero, in file order.
    pub fn non_zero(&self) -> impl Iterator<Item = (&str, i32)> {
        self.iter().filter(|(_, v)| *v != 0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or overwrite a value, clamping it. New keys go to the end.
    fn insert(&mut self, key: &str, value: i32) -> i32 {
        let value = value.clamp(MODIFIER_MIN, MODIFIER_MAX);
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => {
                let old = *v;
                *v = value;
                old
            }
            None => {
                self.entries.push((key.to_string(), value));
                0
            }
        }
    }

    /// Set an existing modifier to an absolute value.
    pub fn set(&mut self, key: &str, value: i64) -> Result<ModifierChange, PersonaError> {
        if !self.contains(key) {
            return Err(PersonaError::UnknownModifier(key.to_string()));
        }
        let new = clamp_modifier(value);
        let old = self.insert(key, new);
        Ok(ModifierChange { key: key.to_string(), old, new, kind: ChangeKind::Set })
    }

    /// Move an existing modifier by `delta`.
    ///
    /// Fails when clamping leaves the value where it already was.
    pub fn adjust(&mut self, key: &str, delta: i64) -> Result<ModifierChange, PersonaError> {
        let current = self
            .get(key)
            .ok_or_else(|| PersonaError::UnknownModifier(key.to_string()))?;
        let new = clamp_modifier((current as i64).saturating_add(delta));
        if new == current {
            return Err(PersonaError::AtBoundary { key: key.to_string(), current });
        }
        self.insert(key, new);
        Ok(ModifierChange { key: key.to_string(), old: current, new, kind: ChangeKind::Adjust })
    }

    /// Set a known axis to `target`, adding it when the file lacks it.
    ///
    /// Never fails; a missing axis counts as 0 before the change.
    pub fn upsert(&mut self, axis: Modifier, target: i64) -> ModifierChange {
        let new = clamp_modifier(target);
        let old = self.insert(axis.as_str(), new);
        ModifierChange { key: axis.as_str().to_string(), old, new, kind: ChangeKind::Set }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "modifiers:\n  warmth: 1\n  challenge: 0\n  verbosity: -1\n";

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp_modifier(7), 3);
        assert_eq!(clamp_modifier(-10), -3);
        assert_eq!(clamp_modifier(2), 2);
        assert_eq!(clamp_modifier(i64::MAX), 3);
    }

    #[test]
    fn modifier_from_str() {
        assert_eq!("emotional_depth".parse::<Modifier>().unwrap(), Modifier::EmotionalDepth);
        let err = "charisma".parse::<Modifier>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown modifier: charisma");
    }

    #[test]
    fn parse_preserves_file_order() {
        let set = ModifierSet::from_yaml(SAMPLE).unwrap();
        let keys: Vec<&str> = set.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["warmth", "challenge", "verbosity"]);
        assert_eq!(set.get("verbosity"), Some(-1));
    }

    #[test]
    fn parse_clamps_out_of_range_values() {
        let set = ModifierSet::from_yaml("modifiers:\n  warmth: 9\n  structure: -8\n").unwrap();
        assert_eq!(set.get("warmth"), Some(3));
        assert_eq!(set.get("structure"), Some(-3));
    }

    #[test]
    fn parse_empty_documents() {
        assert!(ModifierSet::from_yaml("").unwrap().is_empty());
        assert!(ModifierSet::from_yaml("modifiers:\n").unwrap().is_empty());
        assert!(ModifierSet::from_yaml("other: 1\n").unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_non_integer() {
        let err = ModifierSet::from_yaml("modifiers:\n  warmth: lots\n").unwrap_err();
        assert!(err.contains("warmth"));
        assert!(ModifierSet::from_yaml("- a\n- b\n").is_err());
    }

    #[test]
    fn yaml_roundtrip_keeps_order() {
        let set = ModifierSet::from_yaml(SAMPLE).unwrap();
        let text = set.to_yaml().unwrap();
        assert!(text.starts_with("modifiers:"));
        let warmth = text.find("warmth").unwrap();
        let verbosity = text.find("verbosity").unwrap();
        assert!(warmth < verbosity);
        assert_eq!(ModifierSet::from_yaml(&text).unwrap(), set);
    }

    #[test]
    fn set_clamps_and_reports() {
        let mut set = ModifierSet::from_yaml(SAMPLE).unwrap();
        let change = set.set("warmth", 10).unwrap();
        assert_eq!(change.to_string(), "Set warmth from 1 to 3");
        assert_eq!(set.get("warmth"), Some(3));
    }

    #[test]
    fn set_unknown_key_fails() {
        let mut set = ModifierSet::from_yaml(SAMPLE).unwrap();
        let err = set.set("structure", 1).unwrap_err();
        assert_eq!(err.to_string(), "Unknown modifier: structure");
    }

    #[test]
    fn adjust_moves_and_reports() {
        let mut set = ModifierSet::from_yaml(SAMPLE).unwrap();
        let change = set.adjust("verbosity", -1).unwrap();
        assert_eq!(change.to_string(), "Adjusted verbosity from -1 to -2");
    }

    #[test]
    fn adjust_at_boundary_fails() {
        let mut set = ModifierSet::from_yaml("modifiers:\n  warmth: 3\n").unwrap();
        let err = set.adjust("warmth", 2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Modifier 'warmth' is already at the boundary (current: 3)"
        );
        assert_eq!(set.get("warmth"), Some(3));
    }

    #[test]
    fn adjust_partial_clamp_succeeds() {
        let mut set = ModifierSet::from_yaml("modifiers:\n  warmth: 2\n").unwrap();
        let change = set.adjust("warmth", 5).unwrap();
        assert_eq!((change.old, change.new), (2, 3));
    }

    #[test]
    fn upsert_inserts_missing_axis() {
        let mut set = ModifierSet::from_yaml(SAMPLE).unwrap();
        let change = set.upsert(Modifier::Structure, 2);
        assert_eq!((change.old, change.new), (0, 2));
        assert_eq!(set.iter().last(), Some(("structure", 2)));

        let change = set.upsert(Modifier::Warmth, 3);
        assert_eq!((change.old, change.new), (1, 3));
        let change = set.upsert(Modifier::Warmth, 5);
        assert!(!change.changed());
    }

    #[test]
    fn non_zero_filters() {
        let set = ModifierSet::from_yaml(SAMPLE).unwrap();
        let nz: Vec<(&str, i32)> = set.non_zero().collect();
        assert_eq!(nz, vec![("warmth", 1), ("verbosity", -1)]);
    }
}
