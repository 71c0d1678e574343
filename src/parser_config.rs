use crate::errors::{MdsError, MdsResult};

/// Configuration for resource limits while decoding model scripts
///
/// Scripts are small in practice; the limits exist so that a corrupted or hostile input
/// cannot make the decoder allocate without bound.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximum accepted input size (bytes)
    pub max_input_size: usize,

    /// Maximum number of chunks in a compiled script
    pub max_chunks: usize,

    /// Maximum number of top-level declarations
    pub max_declarations: usize,

    /// Maximum number of events inside a single animation
    pub max_events_per_animation: usize,

    /// Maximum length of a single string value (bytes)
    pub max_string_length: usize,

    /// Maximum nesting depth of `{ }` blocks in source scripts
    pub max_block_depth: u32,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_input_size: 16 * 1024 * 1024, // the largest shipped scripts are well under 1MB
            max_chunks: 1_000_000,
            max_declarations: 200_000,
            max_events_per_animation: 4096,
            max_string_length: 4096,
            max_block_depth: 8,
        }
    }
}

impl ParserConfig {
    /// Create a security-focused configuration with strict limits
    pub fn security_focused() -> Self {
        Self {
            max_input_size: 1024 * 1024,
            max_chunks: 100_000,
            max_declarations: 20_000,
            max_events_per_animation: 256,
            max_string_length: 256,
            max_block_depth: 4,
        }
    }

    /// Create a permissive configuration for large generated scripts
    pub fn permissive() -> Self {
        Self {
            max_input_size: 256 * 1024 * 1024,
            max_chunks: 20_000_000,
            max_declarations: 5_000_000,
            max_events_per_animation: 65_536,
            max_string_length: 65_536,
            max_block_depth: 32,
        }
    }

    /// Check if the input size is acceptable before decoding
    pub fn check_input_size(&self, size: usize) -> MdsResult<()> {
        if size > self.max_input_size {
            return Err(MdsError::DataSizeExceedsLimit {
                field: "input_size".to_string(),
                size,
                limit: self.max_input_size,
            });
        }
        Ok(())
    }

    /// Check if a string value is within limits
    pub fn check_string_length(&self, length: usize) -> MdsResult<()> {
        if length > self.max_string_length {
            return Err(MdsError::DataSizeExceedsLimit {
                field: "string_length".to_string(),
                size: length,
                limit: self.max_string_length,
            });
        }
        Ok(())
    }

    /// Check if an animation's event count is within limits
    pub fn check_event_count(&self, count: usize) -> MdsResult<()> {
        if count > self.max_events_per_animation {
            return Err(MdsError::DataSizeExceedsLimit {
                field: "events_per_animation".to_string(),
                size: count,
                limit: self.max_events_per_animation,
            });
        }
        Ok(())
    }
}

/// Resource tracker for monitoring usage during decoding
#[derive(Debug, Default)]
pub struct ResourceTracker {
    /// Number of chunks read so far
    pub chunk_count: usize,

    /// Number of top-level declarations read so far
    pub declaration_count: usize,

    /// Current block nesting depth
    pub block_depth: u32,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new chunk being read
    pub fn track_chunk(&mut self, config: &ParserConfig) -> MdsResult<()> {
        self.chunk_count += 1;

        if self.chunk_count > config.max_chunks {
            return Err(MdsError::DataSizeExceedsLimit {
                field: "chunk_count".to_string(),
                size: self.chunk_count,
                limit: config.max_chunks,
            });
        }
        Ok(())
    }

    /// Track a new top-level declaration
    pub fn track_declaration(&mut self, config: &ParserConfig) -> MdsResult<()> {
        self.declaration_count += 1;

        if self.declaration_count > config.max_declarations {
            return Err(MdsError::DataSizeExceedsLimit {
                field: "declaration_count".to_string(),
                size: self.declaration_count,
                limit: config.max_declarations,
            });
        }
        Ok(())
    }

    /// Enter a `{ }` block
    pub fn enter_block(&mut self, config: &ParserConfig, line: usize) -> MdsResult<()> {
        self.block_depth += 1;

        if self.block_depth > config.max_block_depth {
            return Err(MdsError::ParseStackOverflow {
                line,
                max_depth: config.max_block_depth as usize,
            });
        }
        Ok(())
    }

    /// Leave a `{ }` block
    pub fn exit_block(&mut self) {
        if self.block_depth > 0 {
            self.block_depth -= 1;
        }
    }
}
