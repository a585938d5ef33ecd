//! Conversation monitor.
//!
//! Tracks the emotional trajectory of the persona's recent replies, keeps a
//! log of exchanges, and holds the coach warning that gets appended to the
//! next system prompt. Isolation keywords are reported as a risk level in
//! the metrics summary.

use crate::sentiment::{polarity, trend_slope};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Replies kept in the rolling window.
pub const WINDOW_SIZE: usize = 10;

/// Replies scanned for risk keywords.
const RISK_LOOKBACK: usize = 3;

const RISK_KEYWORDS: &[&str] = &[
    "alone",
    "only one",
    "can't cope",
    "nobody understands",
    "isolated",
];

/// Replies needed before the sentiment trajectory is computed.
const SENTIMENT_MIN_REPLIES: usize = 3;

/// Replies the trend line is fitted over.
const SENTIMENT_LOOKBACK: usize = 5;

const DECLINE_SLOPE: f64 = -0.1;
const DECLINE_DELTA: f64 = -0.3;

/// Sentiment of the window: latest score, recent slope, and change since
/// the oldest reply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentTrend {
    pub current: f64,
    pub slope: f64,
    pub delta: f64,
}

impl SentimentTrend {
    pub fn is_declining(&self) -> bool {
        self.slope < DECLINE_SLOPE || self.delta < DECLINE_DELTA
    }

    pub fn arrow(&self) -> &'static str {
        if self.slope > 0.05 {
            "↗"
        } else if self.slope < -0.05 {
            "↘"
        } else {
            "→"
        }
    }

    pub fn status(&self) -> &'static str {
        if self.current > 0.1 {
            "pos"
        } else if self.current < -0.1 {
            "neg"
        } else {
            "neu"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Med,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Med => "med",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strongly a coach warning should steer the next reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Logged only
    Info,
    Warn,
    Block,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Block => "block",
        }
    }

    fn is_active(&self) -> bool {
        matches!(self, Severity::Warn | Severity::Block)
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Severity::Info),
            "warn" => Ok(Severity::Warn),
            "block" => Ok(Severity::Block),
            other => Err(format!("Unknown severity: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachWarning {
    pub note: String,
    pub severity: Severity,
}

/// One user/assistant exchange, with the goals active at the time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeEvent {
    pub user: String,
    pub reply: String,
    pub goals: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ConversationMonitor {
    window: VecDeque<String>,
    events: Vec<ExchangeEvent>,
    warning: Option<CoachWarning>,
}

impl ConversationMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log an exchange, slide the window and re-evaluate the warning.
    pub fn record_exchange(&mut self, user: &str, reply: &str, goals: Vec<String>) {
        self.events.push(ExchangeEvent {
            user: user.to_string(),
            reply: reply.to_string(),
            goals,
        });

        self.window.push_back(reply.to_string());
        while self.window.len() > WINDOW_SIZE {
            self.window.pop_front();
        }

        if self.window.len() >= 2 {
            self.evaluate();
        }
    }

    fn evaluate(&mut self) {
        let mut failures = Vec::new();
        if let Some(trend) = self.sentiment_trend() {
            if trend.is_declining() {
                failures.push(format!(
                    "Negative emotional trajectory: trend={:.2}, delta={:.2}",
                    trend.slope, trend.delta
                ));
            }
        }

        if failures.is_empty() {
            debug!(replies = self.window.len(), "Monitor evaluation passed");
            self.clear_warning();
        } else {
            let note = failures.join("; ");
            info!(note = %note, "Coach warning raised");
            self.set_warning(note, Severity::Warn);
        }
    }

    /// Sentiment trajectory, once the window holds enough replies.
    pub fn sentiment_trend(&self) -> Option<SentimentTrend> {
        if self.window.len() < SENTIMENT_MIN_REPLIES {
            return None;
        }
        let scores: Vec<f64> = self.window.iter().map(|r| polarity(r)).collect();
        let recent = &scores[scores.len().saturating_sub(SENTIMENT_LOOKBACK)..];
        let (first, current) = (*scores.first()?, *scores.last()?);
        Some(SentimentTrend {
            current,
            slope: trend_slope(recent),
            delta: current - first,
        })
    }

    /// Risk from the number of distinct keywords in the last few replies.
    pub fn risk_level(&self) -> RiskLevel {
        let recent: Vec<&str> = self
            .window
            .iter()
            .rev()
            .take(RISK_LOOKBACK)
            .rev()
            .map(String::as_str)
            .collect();
        let text = recent.join(" ").to_lowercase();
        let hits = RISK_KEYWORDS.iter().filter(|k| text.contains(*k)).count();
        match hits {
            0 => RiskLevel::Low,
            1 => RiskLevel::Med,
            _ => RiskLevel::High,
        }
    }

    pub fn metrics_summary(&self, goals_summary: &str) -> String {
        if self.window.len() < 2 {
            return "Metrics: insufficient data".into();
        }
        let mut parts = Vec::with_capacity(3);
        if let Some(trend) = self.sentiment_trend() {
            parts.push(format!(
                "Sentiment: {:+.2} {} ({})",
                trend.current,
                trend.arrow(),
                trend.status()
            ));
        }
        parts.push(goals_summary.to_string());
        parts.push(format!("Risk: {}", self.risk_level()));
        format!("Metrics: {}", parts.join(" | "))
    }

    pub fn set_warning(&mut self, note: impl Into<String>, severity: Severity) {
        self.warning = Some(CoachWarning {
            note: note.into(),
            severity,
        });
    }

    pub fn clear_warning(&mut self) {
        self.warning = None;
    }

    /// The warning note, if its severity is `warn` or `block`.
    pub fn active_warning(&self) -> Option<&str> {
        self.warning
            .as_ref()
            .filter(|w| w.severity.is_active())
            .map(|w| w.note.as_str())
    }

    pub fn warning(&self) -> Option<&CoachWarning> {
        self.warning.as_ref()
    }

    pub fn events(&self) -> &[ExchangeEvent] {
        &self.events
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }
}
