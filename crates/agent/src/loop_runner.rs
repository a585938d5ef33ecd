//! The agent reasoning loop implementation.

use lucan_core::message::{Conversation, Message, Role};
use lucan_core::provider::{Provider, ProviderRequest, ProviderResponse};
use lucan_core::tool::{ToolCall, ToolRegistry, ToolResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reply used when the model returns nothing usable after calling tools.
pub const EMPTY_RESPONSE_FALLBACK: &str =
    "I received the information but encountered an issue generating a response. Could you please try again?";

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 2;

/// Orchestrates LLM calls and tool execution for one turn.
pub struct AgentLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Max tokens per response
    max_tokens: Option<u32>,

    /// Tool registry
    tools: Arc<ToolRegistry>,

    /// Maximum rounds of tool execution per turn
    max_tool_rounds: usize,
}

impl AgentLoop {
    /// Create a new agent loop.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// Set the maximum number of tool rounds per turn.
    pub fn with_max_tool_rounds(mut self, max: usize) -> Self {
        self.max_tool_rounds = max;
        self
    }

    /// Set the max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    async fn call(&self, conversation: &Conversation) -> Result<ProviderResponse, lucan_core::Error> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: conversation.messages.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: self.tools.definitions(),
            stop: vec![],
        };
        Ok(self.provider.complete(request).await?)
    }

    /// Run every tool call in `message` and push the results.
    async fn execute_tools(&self, conversation: &mut Conversation, message: &Message) {
        for tc in &message.tool_calls {
            let call = ToolCall {
                id: tc.id.clone(),
                name: tc.name.clone(),
                arguments: serde_json::from_str(&tc.arguments).unwrap_or_default(),
            };

            let result = match self.tools.execute(&call).await {
                Ok(result) => {
                    debug!(tool = %tc.name, success = result.success, "Tool executed");
                    result
                }
                Err(e) => {
                    warn!(tool = %tc.name, error = %e, "Tool execution failed");
                    // Report the error to the LLM so it can recover
                    ToolResult::failure(e.to_string())
                }
            };

            conversation.push(Message::tool_result(&tc.id, result.to_payload().to_string()));
        }
    }

    /// Process the conversation and generate the assistant's reply.
    ///
    /// 1. Puts `system_prompt` at the head of the conversation
    /// 2. Calls the LLM
    /// 3. While tools are requested and rounds remain, executes them and calls again
    /// 4. Pushes and returns the final text
    pub async fn process(
        &self,
        conversation: &mut Conversation,
        system_prompt: &str,
    ) -> Result<String, lucan_core::Error> {
        info!(
            conversation_id = %conversation.id,
            messages = conversation.messages.len(),
            "Processing conversation"
        );

        // Ensure system prompt is the first message
        if conversation.messages.first().is_some_and(|m| m.role == Role::System) {
            conversation.messages[0] = Message::system(system_prompt);
        } else {
            conversation.messages.insert(0, Message::system(system_prompt));
        }

        let mut response = self.call(conversation).await?;
        let mut rounds = 0;
        let mut first_tool_text: Option<String> = None;

        while !response.message.tool_calls.is_empty() && rounds < self.max_tool_rounds {
            rounds += 1;
            debug!(
                conversation_id = %conversation.id,
                round = rounds,
                tool_count = response.message.tool_calls.len(),
                "Executing tool calls"
            );

            if first_tool_text.is_none() {
                first_tool_text = Some(response.message.content.clone());
            }

            let message = response.message;
            conversation.push(message.clone());
            self.execute_tools(conversation, &message).await;

            response = self.call(conversation).await?;
        }

        if !response.message.tool_calls.is_empty() {
            warn!(
                conversation_id = %conversation.id,
                rounds,
                "Tool round limit reached, ignoring further tool calls"
            );
        }

        let mut text = response.message.content;
        if text.is_empty() && rounds > 0 {
            warn!(conversation_id = %conversation.id, "Empty response after tool use");
            text = first_tool_text
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| EMPTY_RESPONSE_FALLBACK.to_string());
        }

        conversation.push(Message::assistant(&text));
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use async_trait::async_trait;
    use lucan_core::error::ToolError;
    use lucan_core::tool::Tool;
    use serde_json::json;

    struct NoteTool;

    #[async_trait]
    impl Tool for NoteTool {
        fn name(&self) -> &str {
            "note"
        }

        fn description(&self) -> &str {
            "Records a note"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            })
        }

        async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
            let text = arguments["text"].as_str().unwrap_or_default();
            Ok(ToolResult::success(format!("Noted {text}"), json!({ "length": text.len() })))
        }
    }

    fn agent(provider: Arc<SequentialMockProvider>) -> AgentLoop {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(NoteTool));
        AgentLoop::new(provider, "mock-model", 0.7, Arc::new(registry)).with_max_tokens(1000)
    }

    fn conversation(text: &str) -> Conversation {
        let mut conv = Conversation::new();
        conv.push(Message::user(text));
        conv
    }

    #[tokio::test]
    async fn simple_text_response() {
        let provider = Arc::new(SequentialMockProvider::single_text("Hello! How can I help?"));
        let agent = agent(provider.clone());

        let mut conv = conversation("Hello!");
        let response = agent.process(&mut conv, "You are Lucan").await.unwrap();

        assert_eq!(response, "Hello! How can I help?");
        // System + User + Assistant = 3 messages
        assert_eq!(conv.messages.len(), 3);
        assert_eq!(conv.messages[0].role, Role::System);
        assert_eq!(conv.messages[0].content, "You are Lucan");

        let request = &provider.requests()[0];
        assert_eq!(request.max_tokens, Some(1000));
        assert_eq!(request.tools.len(), 1);
    }

    #[tokio::test]
    async fn system_prompt_is_replaced_not_duplicated() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_text_response("one"),
            make_text_response("two"),
        ]));
        let agent = agent(provider);

        let mut conv = conversation("first");
        agent.process(&mut conv, "prompt v1").await.unwrap();
        conv.push(Message::user("second"));
        agent.process(&mut conv, "prompt v2").await.unwrap();

        let system: Vec<_> = conv.messages.iter().filter(|m| m.role == Role::System).collect();
        assert_eq!(system.len(), 1);
        assert_eq!(conv.messages[0].content, "prompt v2");
    }

    #[tokio::test]
    async fn tool_round_then_answer() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(vec![make_tool_call("note", json!({"text": "hi"}))], ""),
            make_text_response("Done."),
        ]));
        let agent = agent(provider.clone());

        let mut conv = conversation("remember hi");
        let response = agent.process(&mut conv, "sys").await.unwrap();

        assert_eq!(response, "Done.");
        assert_eq!(provider.call_count(), 2);

        let tool_msg = conv.messages.iter().find(|m| m.role == Role::Tool).unwrap();
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_note"));
        let payload: serde_json::Value = serde_json::from_str(&tool_msg.content).unwrap();
        assert_eq!(payload["success"], true);
        assert_eq!(payload["message"], "Noted hi");
        assert_eq!(payload["length"], 2);

        // sys, user, assistant(tool call), tool, assistant
        assert_eq!(conv.messages.len(), 5);
    }

    #[tokio::test]
    async fn tool_errors_are_reported_to_the_model() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(vec![make_tool_call("note", json!({"body": "x"}))], ""),
            make_text_response("Sorry."),
        ]));
        let agent = agent(provider);

        let mut conv = conversation("x");
        agent.process(&mut conv, "sys").await.unwrap();

        let tool_msg = conv.messages.iter().find(|m| m.role == Role::Tool).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&tool_msg.content).unwrap();
        assert_eq!(payload["success"], false);
        assert!(payload["message"].as_str().unwrap().contains("Missing required parameter: text"));
    }

    #[tokio::test]
    async fn stops_after_max_tool_rounds() {
        let call = || vec![make_tool_call("note", json!({"text": "again"}))];
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(call(), "Let me note that."),
            make_tool_call_response(call(), ""),
            make_tool_call_response(call(), "Final words."),
        ]));
        let agent = agent(provider.clone());

        let mut conv = conversation("loop");
        let response = agent.process(&mut conv, "sys").await.unwrap();

        assert_eq!(provider.call_count(), 3);
        assert_eq!(response, "Final words.");
        let last = conv.messages.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert!(last.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn empty_reply_falls_back_to_first_tool_text() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(
                vec![make_tool_call("note", json!({"text": "a"}))],
                "Good to hear about Sarah.",
            ),
            make_text_response(""),
        ]));
        let agent = agent(provider);

        let mut conv = conversation("Sarah got promoted");
        let response = agent.process(&mut conv, "sys").await.unwrap();
        assert_eq!(response, "Good to hear about Sarah.");
        assert_eq!(conv.messages.last().unwrap().content, "Good to hear about Sarah.");
    }

    #[tokio::test]
    async fn empty_reply_without_any_text_uses_fallback() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(vec![make_tool_call("note", json!({"text": "a"}))], ""),
            make_text_response(""),
        ]));
        let agent = agent(provider);

        let mut conv = conversation("x");
        let response = agent.process(&mut conv, "sys").await.unwrap();
        assert_eq!(response, EMPTY_RESPONSE_FALLBACK);
    }

    #[tokio::test]
    async fn provider_error_propagates() {
        let agent = AgentLoop::new(
            Arc::new(FailingProvider),
            "mock-model",
            0.7,
            Arc::new(ToolRegistry::new()),
        );
        let mut conv = conversation("hello");
        let err = agent.process(&mut conv, "sys").await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
