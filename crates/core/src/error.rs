//! Error types for the Lucan domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all Lucan operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Persona errors ---
    #[error("Persona error: {0}")]
    Persona(#[from] PersonaError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Errors raised while locating, loading, or mutating a persona.
#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("Persona '{persona}' not found. Available personas: {available}")]
    NotFound { persona: String, available: String },

    #[error("Persona path '{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Persona '{0}' is missing personality.txt file")]
    MissingPersonality(String),

    #[error("Persona '{0}' is missing modifiers.txt file")]
    MissingModifiers(String),

    #[error("Invalid persona name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("File {} is {size} bytes, limit is {limit}", path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("I/O error on {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    #[error("Unknown modifier: {0}")]
    UnknownModifier(String),

    #[error("Modifier '{key}' is already at the boundary (current: {current})")]
    AtBoundary { key: String, current: i32 },
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid record key: {0}")]
    InvalidKey(String),

    #[error("Malformed record at {path}: {reason}")]
    Malformed { path: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Validation error: {0}")]
    InvalidArguments(String),
}
