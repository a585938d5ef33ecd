//! Chat session: one conversation between the user and a persona.
//!
//! The session owns the conversation history and everything the tools
//! mutate. Each call to `send_message` rebuilds the system prompt so that
//! modifier changes, people just mentioned, and any coach warning reach
//! the model on the very next turn.

use crate::loop_runner::AgentLoop;
use crate::monitor::ConversationMonitor;
use lucan_config::AppConfig;
use lucan_core::message::{Conversation, Message};
use lucan_core::prompt::PromptBuilder;
use lucan_core::relationship::{mentioned_records, RecentContext, RelationshipRecord, RelationshipStore};
use lucan_core::{Provider, SharedPersona};
use lucan_memory::GoalTracker;
use lucan_tools::{default_registry, ToolContext};
use std::sync::Arc;
use tracing::{debug, warn};

/// Messages fed to context-based relationship inference.
const RECENT_CONTEXT_MESSAGES: usize = 3;

pub struct ChatSession {
    persona: SharedPersona,
    relationships: Arc<dyn RelationshipStore>,
    goals: Arc<GoalTracker>,
    monitor: ConversationMonitor,
    recent: RecentContext,
    conversation: Conversation,
    agent: AgentLoop,
}

impl ChatSession {
    /// Wire up a session: tools, agent loop and monitor.
    pub fn new(
        persona: SharedPersona,
        relationships: Arc<dyn RelationshipStore>,
        provider: Arc<dyn Provider>,
        config: &AppConfig,
    ) -> Self {
        let goals = Arc::new(GoalTracker::new());
        let recent = RecentContext::new();
        let tools = default_registry(ToolContext {
            persona: persona.clone(),
            relationships: relationships.clone(),
            goals: goals.clone(),
            recent: recent.clone(),
        });

        let agent = AgentLoop::new(provider, &config.model, config.temperature, Arc::new(tools))
            .with_max_tokens(config.max_tokens)
            .with_max_tool_rounds(config.max_tool_rounds);

        Self {
            persona,
            relationships,
            goals,
            monitor: ConversationMonitor::new(),
            recent,
            conversation: Conversation::new(),
            agent,
        }
    }

    /// Send one user message and return the persona's reply.
    ///
    /// Provider failures are turned into a reply rather than an error so the
    /// chat loop keeps going.
    pub async fn send_message(&mut self, text: &str) -> String {
        debug!(metrics = %self.metrics_summary(), "Turn starting");

        let warning = self.monitor.active_warning().map(str::to_string);
        if let Some(w) = &warning {
            debug!(warning = %w, "Active coach warning");
        }

        self.conversation.push(Message::user(text));
        self.recent.set(self.conversation.recent_text(RECENT_CONTEXT_MESSAGES));

        let mentioned = self.mentioned_in(text).await;
        if !mentioned.is_empty() {
            debug!(count = mentioned.len(), "People mentioned with stored notes");
        }

        let (prompt, name) = {
            let persona = self.persona.read().await;
            let prompt = PromptBuilder::new(&persona)
                .with_relationships(&mentioned)
                .with_warning(warning.as_deref())
                .build();
            (prompt, persona.name().to_string())
        };

        match self.agent.process(&mut self.conversation, &prompt).await {
            Ok(reply) => {
                let goals = self.goals.active().into_iter().map(|g| g.text).collect();
                self.monitor.record_exchange(text, &reply, goals);
                reply
            }
            Err(e) => {
                warn!(error = %e, "Turn failed");
                format!("Error communicating with {name}: {e}")
            }
        }
    }

    async fn mentioned_in(&self, text: &str) -> Vec<RelationshipRecord> {
        match self.relationships.list().await {
            Ok(records) => mentioned_records(text, &records).into_iter().cloned().collect(),
            Err(e) => {
                warn!(error = %e, "Failed to list relationships");
                Vec::new()
            }
        }
    }

    /// The system prompt as it would be sent right now, without mentions.
    pub async fn system_prompt(&self) -> String {
        let persona = self.persona.read().await;
        PromptBuilder::new(&persona)
            .with_warning(self.monitor.active_warning())
            .build()
    }

    pub fn clear_history(&mut self) {
        self.conversation.clear();
        self.recent.set("");
        debug!("Conversation history cleared");
    }

    /// Number of user and assistant messages, tool traffic included.
    pub fn history_len(&self) -> usize {
        self.conversation.history_len()
    }

    pub fn metrics_summary(&self) -> String {
        self.monitor.metrics_summary(&self.goals.summary())
    }

    pub fn persona(&self) -> &SharedPersona {
        &self.persona
    }

    pub fn goals(&self) -> &GoalTracker {
        &self.goals
    }

    pub fn monitor(&self) -> &ConversationMonitor {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut ConversationMonitor {
        &mut self.monitor
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}
