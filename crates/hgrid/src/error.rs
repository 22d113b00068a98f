//! Error types for the hierarchical grid.

/// Errors that can occur when configuring or addressing the grid.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HGridError {
    /// The coarsest cell size must be positive and finite.
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f64),

    /// A level argument exceeds the maximum level the fixed-point
    /// coordinate space can address.
    #[error("level {level} exceeds the maximum addressable level {max}")]
    LevelOutOfRange {
        /// The requested level.
        level: u32,
        /// The maximum representable level.
        max: u32,
    },
}
