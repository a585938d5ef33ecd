//! Relationship note tool: remembers something about a person the user mentions.

use async_trait::async_trait;
use lucan_core::error::ToolError;
use lucan_core::relationship::RelationshipStore;
use lucan_core::tool::{Tool, ToolResult};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct AddRelationshipNoteTool {
    store: Arc<dyn RelationshipStore>,
}

impl AddRelationshipNoteTool {
    pub fn new(store: Arc<dyn RelationshipStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for AddRelationshipNoteTool {
    fn name(&self) -> &str {
        "add_relationship_note"
    }

    fn description(&self) -> &str {
        "Add or update information about someone the user mentions. Use this tool when the user \
         shares important information about people in their life, such as: relationship changes \
         (breakups, marriages), life updates (new jobs, moves, health issues), new people they \
         mention, or any significant details worth remembering. Examples: 'My girlfriend and I \
         broke up', 'My mom got a new job', 'I have a new therapist named Dr. Smith', 'My friend \
         Sarah is getting married'. Don't announce when you're using this tool - just naturally \
         remember the information."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "The person's name"
                },
                "relationship_type": {
                    "type": "string",
                    "description": "Their relationship to the user (e.g., friend, family, colleague, therapist, pet, partner, etc.)"
                },
                "note": {
                    "type": "string",
                    "description": "What to remember about this person (updates, context, interests, concerns, relationship changes, etc.)"
                }
            },
            "required": ["name", "relationship_type", "note"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let name = arguments["name"].as_str().unwrap_or_default().trim();
        let relationship_type = arguments["relationship_type"].as_str().unwrap_or_default();
        let note = arguments["note"].as_str().unwrap_or_default();

        if name.is_empty() {
            return Ok(ToolResult::failure("Name cannot be empty"));
        }

        match self.store.add_note(name, relationship_type, note).await {
            Ok(record) => {
                debug!(
                    name,
                    relationship = %record.relationship,
                    notes = record.notes.len(),
                    "Relationship note added"
                );
                Ok(ToolResult::success(
                    format!("Added note for {name}"),
                    json!({
                        "name": name,
                        "relationship_type": relationship_type,
                        "note": note,
                    }),
                ))
            }
            Err(e) => {
                warn!(name, error = %e, "Failed to save relationship note");
                Ok(ToolResult::failure("Failed to save relationship note"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lucan_memory::{FileRelationshipStore, InMemoryRelationshipStore};

    #[tokio::test]
    async fn adds_note() {
        let store = Arc::new(InMemoryRelationshipStore::new());
        let tool = AddRelationshipNoteTool::new(store.clone());

        let result = tool
            .execute(json!({"name": "Sarah", "relationship_type": "friend", "note": "Getting married in June"}))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.output, "Added note for Sarah");
        let record = store.get_notes("sarah").await.unwrap().unwrap();
        assert_eq!(record.relationship, "friend");
        assert!(record.notes[0].ends_with("Getting married in June"));
    }

    #[tokio::test]
    async fn writes_file_backed_record() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(FileRelationshipStore::new(tmp.path()).unwrap());
        let tool = AddRelationshipNoteTool::new(store);

        tool.execute(json!({"name": "Dr. Smith", "relationship_type": "therapist", "note": "New therapist"}))
            .await
            .unwrap();

        let content = std::fs::read_to_string(tmp.path().join("dr_smith.txt")).unwrap();
        assert!(content.starts_with("---\n"));
        assert!(content.contains("relationship: therapist"));
        assert!(content.contains("New therapist"));
    }

    #[tokio::test]
    async fn empty_name_fails() {
        let store = Arc::new(InMemoryRelationshipStore::new());
        let tool = AddRelationshipNoteTool::new(store.clone());

        let result = tool
            .execute(json!({"name": "   ", "relationship_type": "friend", "note": "x"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.output, "Name cannot be empty");
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn store_failure_is_reported() {
        let store = Arc::new(InMemoryRelationshipStore::new());
        let tool = AddRelationshipNoteTool::new(store);

        let result = tool
            .execute(json!({"name": "!!!", "relationship_type": "friend", "note": "x"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.output, "Failed to save relationship note");
    }
}
