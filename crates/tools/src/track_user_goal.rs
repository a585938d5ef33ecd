//! Goal tracking tool: records what the user says they are working toward.

use async_trait::async_trait;
use lucan_core::error::ToolError;
use lucan_core::tool::{Tool, ToolResult};
use lucan_memory::{GoalAction, GoalTracker, Timeframe};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

pub struct TrackUserGoalTool {
    goals: Arc<GoalTracker>,
}

impl TrackUserGoalTool {
    pub fn new(goals: Arc<GoalTracker>) -> Self {
        Self { goals }
    }
}

#[async_trait]
impl Tool for TrackUserGoalTool {
    fn name(&self) -> &str {
        "track_user_goal"
    }

    fn description(&self) -> &str {
        "Track or update user goals when they mention wanting to work on something, achieve \
         something, or change their focus. Use this when the user expresses goals like: 'I want \
         to reduce my anxiety', 'My goal is to get promoted', 'I'm working on improving my \
         relationships', 'I want to stop procrastinating', etc. This helps maintain goal \
         consistency tracking. Don't announce when you're using this tool."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        let actions: Vec<&str> = GoalAction::ALL.iter().map(GoalAction::as_str).collect();
        let timeframes: Vec<&str> = Timeframe::ALL.iter().map(Timeframe::as_str).collect();
        json!({
            "type": "object",
            "properties": {
                "goal": {
                    "type": "string",
                    "description": "The user's goal in clear, specific terms"
                },
                "action": {
                    "type": "string",
                    "enum": actions,
                    "description": "Whether to add a new goal, replace all current goals with this one, or remove a specific goal"
                },
                "timeframe": {
                    "type": "string",
                    "enum": timeframes,
                    "description": "The timeframe for this goal"
                }
            },
            "required": ["goal", "action"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let goal = arguments["goal"].as_str().unwrap_or_default();
        let action_arg = arguments["action"].as_str().unwrap_or_default();

        let Ok(action) = action_arg.parse::<GoalAction>() else {
            return Ok(ToolResult::failure(format!(
                "Action must be one of: {}",
                crate::quoted_list(GoalAction::ALL.iter().map(GoalAction::as_str))
            )));
        };

        let timeframe = match arguments["timeframe"].as_str() {
            None => None,
            Some(t) => match t.parse::<Timeframe>() {
                Ok(t) => Some(t),
                Err(_) => {
                    return Ok(ToolResult::failure(format!(
                        "Timeframe must be one of: {}",
                        crate::quoted_list(Timeframe::ALL.iter().map(Timeframe::as_str))
                    )));
                }
            },
        };

        if goal.trim().is_empty() {
            return Ok(ToolResult::failure("Goal cannot be empty"));
        }

        let outcome = self.goals.handle(goal, action, timeframe);
        debug!(goal, action = action.as_str(), outcome = ?outcome, "Goal tracking");

        if !outcome.is_success() {
            return Ok(ToolResult::failure("Failed to update goal"));
        }

        Ok(ToolResult::success(
            "Goal updated successfully",
            json!({
                "goal": goal,
                "action": action.as_str(),
                "timeframe": timeframe.map(|t| t.as_str()),
                "total_goals": self.goals.len(),
            }),
        ))
    }
}
