//! Modifier tool: lets the persona shift its own personality modifiers.
//!
//! `adjust` moves a modifier relative to its current value, `set` jumps to an
//! absolute value. Either way the result is clamped to -3..=3 and written
//! back to `modifiers.txt` before the tool returns.

use async_trait::async_trait;
use lucan_core::error::ToolError;
use lucan_core::modifier::Modifier;
use lucan_core::tool::{Tool, ToolResult};
use lucan_core::SharedPersona;
use serde_json::json;
use tracing::debug;

pub struct AdjustModifierTool {
    persona: SharedPersona,
}

impl AdjustModifierTool {
    pub fn new(persona: SharedPersona) -> Self {
        Self { persona }
    }
}

#[async_trait]
impl Tool for AdjustModifierTool {
    fn name(&self) -> &str {
        "adjust_modifier"
    }

    fn description(&self) -> &str {
        "Adjust your own personality modifiers based on user feedback or your own perception of \
         misalignment. Use this tool when: 1. The user explicitly asks for behavior changes \
         (e.g., 'be less verbose', 'be warmer') 2. You perceive your current behavior isn't \
         working well for the user. For small adjustments (±1): Just apply the change and \
         continue naturally. For larger changes (±2 or more, or any set): Always announce that \
         you're shifting your approach."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["adjust", "set"],
                    "description": "Either \"adjust\" (relative change) or \"set\" (absolute value)"
                },
                "modifier": {
                    "type": "string",
                    "enum": Modifier::names(),
                    "description": "Which modifier to change"
                },
                "value": {
                    "type": "integer",
                    "description": "Absolute value for \"set\" action (range: -3 to +3)"
                },
                "adjustment": {
                    "type": "integer",
                    "description": "Relative change for \"adjust\" action (e.g., -1, +2)"
                },
                "reason": {
                    "type": "string",
                    "description": "Why this change is being made"
                }
            },
            "required": ["action", "modifier"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let action = arguments["action"].as_str().unwrap_or_default();
        let modifier = arguments["modifier"].as_str().unwrap_or_default();
        let reason = arguments["reason"].as_str().unwrap_or_default();

        if action != "adjust" && action != "set" {
            return Ok(ToolResult::failure("Action must be either 'adjust' or 'set'"));
        }

        let Ok(axis) = modifier.parse::<Modifier>() else {
            return Ok(ToolResult::failure(format!(
                "Unknown modifier '{modifier}'. Available: {}",
                crate::quoted_list(Modifier::names())
            )));
        };

        let adjustment = arguments["adjustment"].as_i64();
        let value = arguments["value"].as_i64();

        let mut persona = self.persona.write().await;
        let current = persona.modifiers().get(axis.as_str()).unwrap_or(0) as i64;
        let (target, is_large_change) = match action {
            "adjust" => {
                let Some(delta) = adjustment else {
                    return Ok(ToolResult::failure(
                        "'adjustment' parameter required for 'adjust' action",
                    ));
                };
                (current.saturating_add(delta), delta.abs() >= 2)
            }
            _ => {
                let Some(value) = value else {
                    return Ok(ToolResult::failure("'value' parameter required for 'set' action"));
                };
                (value, true)
            }
        };

        let change = match persona.apply_modifier(axis, target) {
            Ok(change) => change,
            Err(e) => return Ok(ToolResult::failure(format!("Error adjusting modifier: {e}"))),
        };

        debug!(
            modifier = %axis,
            old = change.old,
            new = change.new,
            reason,
            "Modifier adjusted by tool"
        );

        Ok(ToolResult::success(
            format!("Modified {axis} from {} to {}", change.old, change.new),
            json!({
                "modifier": axis.as_str(),
                "old_value": change.old,
                "new_value": change.new,
                "action": action,
                "is_large_change": is_large_change,
                "reason": reason,
            }),
        ))
    }
}
