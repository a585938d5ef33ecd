//! Session goal tracking.
//!
//! Goals are what the user says they are working toward ("stop
//! procrastinating", "get promoted"). They live only for the session and
//! feed the monitor's metrics summary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const SUMMARY_PREVIEW_CHARS: usize = 30;

/// What to do with a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalAction {
    Add,
    Replace,
    Remove,
}

impl GoalAction {
    pub const ALL: [GoalAction; 3] = [GoalAction::Add, GoalAction::Replace, GoalAction::Remove];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalAction::Add => "add",
            GoalAction::Replace => "replace",
            GoalAction::Remove => "remove",
        }
    }
}

impl FromStr for GoalAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("Unknown action: {s}"))
    }
}

/// How far out a goal sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Timeframe {
    ShortTerm,
    MediumTerm,
    LongTerm,
    Ongoing,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::ShortTerm,
        Timeframe::MediumTerm,
        Timeframe::LongTerm,
        Timeframe::Ongoing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::ShortTerm => "short-term",
            Timeframe::MediumTerm => "medium-term",
            Timeframe::LongTerm => "long-term",
            Timeframe::Ongoing => "ongoing",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown timeframe: {s}"))
    }
}

/// One tracked goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<Timeframe>,
}

/// Result of a goal operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalOutcome {
    Added,
    AlreadyExists,
    Replaced,
    Removed,
    NotFound,
}

impl GoalOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, GoalOutcome::NotFound)
    }
}

/// Session-scoped list of user goals, in the order they were added.
#[derive(Debug, Default)]
pub struct GoalTracker {
    goals: Mutex<Vec<Goal>>,
}

impl GoalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Goal>> {
        match self.goals.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn add(&self, goal: &str, timeframe: Option<Timeframe>) -> GoalOutcome {
        let mut goals = self.lock();
        if goals.iter().any(|g| g.text == goal) {
            return GoalOutcome::AlreadyExists;
        }
        goals.push(Goal { text: goal.to_string(), timeframe });
        debug!(goal, timeframe = ?timeframe, total = goals.len(), "Goal added");
        GoalOutcome::Added
    }

    /// Drop every goal and keep only `goal`.
    pub fn replace(&self, goal: &str, timeframe: Option<Timeframe>) -> GoalOutcome {
        let mut goals = self.lock();
        goals.clear();
        goals.push(Goal { text: goal.to_string(), timeframe });
        debug!(goal, timeframe = ?timeframe, "Goals replaced");
        GoalOutcome::Replaced
    }

    pub fn remove(&self, goal: &str) -> GoalOutcome {
        let mut goals = self.lock();
        match goals.iter().position(|g| g.text == goal) {
            Some(index) => {
                goals.remove(index);
                debug!(goal, total = goals.len(), "Goal removed");
                GoalOutcome::Removed
            }
            None => GoalOutcome::NotFound,
        }
    }

    pub fn handle(&self, goal: &str, action: GoalAction, timeframe: Option<Timeframe>) -> GoalOutcome {
        match action {
            GoalAction::Add => self.add(goal, timeframe),
            GoalAction::Replace => self.replace(goal, timeframe),
            GoalAction::Remove => self.remove(goal),
        }
    }

    /// Snapshot of the active goals.
    pub fn active(&self) -> Vec<Goal> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// One-line summary for the metrics line.
    pub fn summary(&self) -> String {
        let goals = self.lock();
        let Some(first) = goals.first() else {
            return "Goals: none set".into();
        };

        let preview = if first.text.chars().count() > SUMMARY_PREVIEW_CHARS {
            let head: String = first.text.chars().take(SUMMARY_PREVIEW_CHARS).collect();
            format!("{head}...")
        } else {
            first.text.clone()
        };

        if goals.len() == 1 {
            format!("Goals: '{preview}'")
        } else {
            format!("Goals: '{preview}' +{} more", goals.len() - 1)
        }
    }
}
