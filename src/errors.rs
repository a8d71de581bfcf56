use thiserror::Error;

/// Everything that can go wrong inside the rewriting/turtle/codec core.
///
/// None of these are fatal; callers at the boundary decide whether to retry,
/// regenerate, or report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LSystemError {
    #[error("No L-system with id {0} in the catalog.")]
    UnknownSystem(u32),

    #[error("No L-system named '{0}' in the catalog.")]
    UnknownSystemName(String),

    #[error("Vertex buffer of {len} bytes is not a whole number of 12 byte vertices.")]
    CorruptData { len: usize },

    #[error("Vertex buffer holds {vertices} vertices, segments need an even count.")]
    OddVertexCount { vertices: usize },

    #[error("Popped an empty turtle stack at symbol {index}.")]
    UnbalancedStructure { index: usize },

    #[error("Popped an empty turtle stack.")]
    PoppedEmptyStack,

    #[error("Expansion produced no drawable symbols.")]
    EmptyResult,

    #[error("Rule patterns may not be empty.")]
    EmptyPattern,

    #[error("Invalid rule '{0}', expected pattern=replacement")]
    InvalidRule(String),

    #[error("Requested {requested} iterations, limit is {limit}")]
    IterationLimit { requested: u32, limit: u32 },
}

impl LSystemError {
    /// True for both flavours of malformed vertex buffer.
    pub fn is_corrupt_data(&self) -> bool {
        matches!(
            self,
            LSystemError::CorruptData { .. } | LSystemError::OddVertexCount { .. }
        )
    }
}
