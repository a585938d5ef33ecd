//! The agent side of Lucan.
//!
//! A chat turn flows through three pieces:
//!
//! 1. **ChatSession** rebuilds the system prompt from the persona, the people
//!    just mentioned, and any coach warning
//! 2. **AgentLoop** calls the provider, runs requested tools for a bounded
//!    number of rounds, and settles on the reply text
//! 3. **ConversationMonitor** records the exchange and raises a warning when
//!    the sentiment of recent replies is sliding downward

pub mod loop_runner;
pub mod monitor;
pub mod sentiment;
pub mod session;

pub use loop_runner::{AgentLoop, EMPTY_RESPONSE_FALLBACK};
pub use monitor::{CoachWarning, ConversationMonitor, ExchangeEvent, RiskLevel, SentimentTrend, Severity};
pub use session::ChatSession;

#[cfg(test)]
pub(crate) mod test_helpers;
