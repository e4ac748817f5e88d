//! Engine settings.
//!
//! Settings are plain serde structs so a host application can embed them in
//! its own configuration file; every field has a default.

use serde::{Deserialize, Serialize};

/// Default limit on nested parentheses accepted by the parser.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default number of conditions per chunk when splitting OR-chains.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Tunable limits for parsing and plan rewrites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Deepest group nesting the parser accepts.
    pub max_depth: usize,

    /// Largest number of conditions per chunk for OR-chain splitting.
    pub chunk_size: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl EngineSettings {
    /// Sets the maximum group nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the chunk size used for OR-chain splitting.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}
