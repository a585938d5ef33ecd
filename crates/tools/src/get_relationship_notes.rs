//! Relationship lookup tool: recalls what Lucan knows about someone.
//!
//! The query is tried as a name first, then as a relationship type ("mom",
//! "therapist"). When nothing matches, an empty record is created so the
//! person is known the next time they come up.

use async_trait::async_trait;
use lucan_core::error::ToolError;
use lucan_core::relationship::{
    infer_relationship_type, RecentContext, RelationshipRecord, RelationshipStore,
    DEFAULT_RELATIONSHIP,
};
use lucan_core::tool::{Tool, ToolResult};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

const INFERRED_NOTE: &str = "Relationship type inferred from context";

pub struct GetRelationshipNotesTool {
    store: Arc<dyn RelationshipStore>,
    recent: RecentContext,
}

impl GetRelationshipNotesTool {
    pub fn new(store: Arc<dyn RelationshipStore>, recent: RecentContext) -> Self {
        Self { store, recent }
    }

    fn found(record: &RelationshipRecord, found_by: &str) -> ToolResult {
        ToolResult::success(
            "",
            json!({
                "name": record.name,
                "relationship": record.relationship,
                "notes": record.notes,
                "found_by": found_by,
            }),
        )
    }

    /// Replace a generic `person` type with one guessed from the conversation.
    async fn refine_type(&self, name: &str, record: RelationshipRecord) -> RelationshipRecord {
        if record.relationship != DEFAULT_RELATIONSHIP {
            return record;
        }
        let inferred = infer_relationship_type(&self.recent.text());
        if inferred == DEFAULT_RELATIONSHIP {
            return record;
        }
        match self.store.add_note(name, inferred, INFERRED_NOTE).await {
            Ok(updated) => {
                debug!(name, relationship = inferred, "Relationship type inferred");
                updated
            }
            Err(e) => {
                warn!(name, error = %e, "Failed to store inferred relationship type");
                RelationshipRecord { relationship: inferred.to_string(), ..record }
            }
        }
    }
}

#[async_trait]
impl Tool for GetRelationshipNotesTool {
    fn name(&self) -> &str {
        "get_relationship_notes"
    }

    fn description(&self) -> &str {
        "Look up information about someone the user asks about. Use this tool when the user asks \
         questions like 'Do you know my mom?', 'Tell me about Sarah', 'Do you remember my \
         therapist?', 'What do you know about my friend John?', etc. You can search by either a \
         person's name (like 'Sarah') or by relationship type (like 'mom', 'therapist', \
         'friend'). Don't announce when you're using this tool - just naturally recall the \
         information."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "The person's name OR their relationship type (e.g., 'Sarah', 'mom', 'therapist', 'friend', 'dog')"
                }
            },
            "required": ["name"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let name = arguments["name"].as_str().unwrap_or_default().trim();
        if name.is_empty() {
            return Ok(ToolResult::failure("Name cannot be empty"));
        }

        let by_name = match self.store.get_notes(name).await {
            Ok(record) => record,
            Err(e) => {
                return Ok(ToolResult::failure(format!(
                    "Error retrieving relationship notes: {e}"
                )));
            }
        };
        if let Some(record) = by_name {
            debug!(name, notes = record.notes.len(), "Relationship found by name");
            let record = self.refine_type(name, record).await;
            return Ok(Self::found(&record, "name"));
        }

        let by_type = match self.store.find_by_relationship_type(name).await {
            Ok(records) => records,
            Err(e) => {
                return Ok(ToolResult::failure(format!(
                    "Error retrieving relationship notes: {e}"
                )));
            }
        };
        if let Some(first) = by_type.first() {
            debug!(query = name, matches = by_type.len(), first = %first.name, "Relationship found by type");
            return Ok(Self::found(first, "relationship_type"));
        }

        let inferred = infer_relationship_type(&self.recent.text());
        match self.store.add_note(name, inferred, "").await {
            Ok(_) => debug!(name, relationship = inferred, "Created empty relationship record"),
            Err(e) => warn!(name, error = %e, "Failed to create empty relationship record"),
        }

        Ok(ToolResult::success(
            format!("No information found about {name}"),
            json!({
                "name": name,
                "relationship": null,
                "notes": [],
                "found_by": "not_found",
            }),
        ))
    }
}
