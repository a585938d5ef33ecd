//! Memory implementations for Lucan.
//!
//! - [`FileRelationshipStore`]: one frontmatter text file per person
//! - [`InMemoryRelationshipStore`]: same semantics, nothing persisted
//! - [`GoalTracker`]: the user's goals for the current session

pub mod relationship_files;
pub mod in_memory;
pub mod goals;

pub use relationship_files::FileRelationshipStore;
pub use in_memory::InMemoryRelationshipStore;
pub use goals::{Goal, GoalAction, GoalOutcome, GoalTracker, Timeframe};
