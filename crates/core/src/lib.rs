//! # Lucan Core
//!
//! Domain types, traits, and error definitions for the Lucan companion agent.
//! Every other crate in the workspace depends inward on this one.
//!
//! ## Design Philosophy
//!
//! Seams are traits here, implementations live in their own crates:
//! - [`Provider`]: the language model, implemented in `lucan-providers`
//! - [`Tool`]: model-callable actions, implemented in `lucan-tools`
//! - [`RelationshipStore`]: relationship memory, implemented in `lucan-memory`
//!
//! Persona loading, modifier arithmetic and prompt assembly are plain
//! synchronous code with no I/O beyond the persona directory.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;
pub mod modifier;
pub mod persona;
pub mod relationship;
pub mod prompt;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Message, Role, Conversation, ConversationId};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use tool::{Tool, ToolCall, ToolResult, ToolRegistry};
pub use modifier::{Modifier, ModifierChange, ModifierSet};
pub use persona::{Persona, PersonaDirectory, SharedPersona};
pub use relationship::{RecentContext, RelationshipRecord, RelationshipStore};
pub use prompt::PromptBuilder;
