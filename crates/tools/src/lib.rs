//! Built-in tools for Lucan.
//!
//! Tools let the persona act on its own state: shift its modifiers,
//! remember people the user mentions, and keep track of the user's goals.
//! Every tool reports problems as a failed `ToolResult` rather than an
//! `Err`, so the model sees the message and can recover.

pub mod add_relationship_note;
pub mod adjust_modifier;
pub mod get_relationship_notes;
pub mod track_user_goal;

use lucan_core::relationship::{RecentContext, RelationshipStore};
use lucan_core::tool::ToolRegistry;
use lucan_core::SharedPersona;
use lucan_memory::GoalTracker;
use std::sync::Arc;

pub use add_relationship_note::AddRelationshipNoteTool;
pub use adjust_modifier::AdjustModifierTool;
pub use get_relationship_notes::GetRelationshipNotesTool;
pub use track_user_goal::TrackUserGoalTool;

/// Shared state the tools operate on.
#[derive(Clone)]
pub struct ToolContext {
    pub persona: SharedPersona,
    pub relationships: Arc<dyn RelationshipStore>,
    pub goals: Arc<GoalTracker>,
    pub recent: RecentContext,
}

/// Create a registry with all four built-in tools.
pub fn default_registry(ctx: ToolContext) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(AdjustModifierTool::new(ctx.persona.clone())));
    registry.register(Box::new(AddRelationshipNoteTool::new(ctx.relationships.clone())));
    registry.register(Box::new(GetRelationshipNotesTool::new(
        ctx.relationships.clone(),
        ctx.recent.clone(),
    )));
    registry.register(Box::new(TrackUserGoalTool::new(ctx.goals)));
    registry
}

/// Python-style list rendering used in validation messages: `['a', 'b']`.
pub(crate) fn quoted_list<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = items.into_iter().map(|i| format!("'{i}'")).collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
pub(crate) mod test_support {
    use lucan_core::persona::{MODIFIERS_FILE, PERSONALITY_FILE};
    use lucan_core::{Persona, SharedPersona};
    use std::path::Path;
    use std::sync::Arc;

    pub const MODIFIERS: &str =
        "modifiers:\n  warmth: 0\n  challenge: 1\n  verbosity: 0\n  emotional_depth: 0\n  structure: 0\n";

    pub fn persona_in(root: &Path, modifiers: &str) -> SharedPersona {
        let dir = root.join("lucan");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(PERSONALITY_FILE),
            "name: Lucan\ndescription: a loyal friend.\n",
        )
        .unwrap();
        std::fs::write(dir.join(MODIFIERS_FILE), modifiers).unwrap();
        Arc::new(tokio::sync::RwLock::new(Persona::load(&dir).unwrap()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lucan_memory::InMemoryRelationshipStore;

    #[test]
    fn default_registry_has_all_tools() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = ToolContext {
            persona: test_support::persona_in(tmp.path(), test_support::MODIFIERS),
            relationships: Arc::new(InMemoryRelationshipStore::new()),
            goals: Arc::new(GoalTracker::new()),
            recent: RecentContext::new(),
        };
        let registry = default_registry(ctx);
        assert_eq!(
            registry.names(),
            vec![
                "add_relationship_note",
                "adjust_modifier",
                "get_relationship_notes",
                "track_user_goal"
            ]
        );
        assert_eq!(registry.definitions().len(), 4);
    }

    #[test]
    fn quoted_list_format() {
        assert_eq!(quoted_list(["add", "remove"]), "['add', 'remove']");
    }
}
