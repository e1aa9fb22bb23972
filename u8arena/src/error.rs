/// Convenient type alias for arena results.
pub type Result<T> = core::result::Result<T, ArenaError>;

/// Error types for `Arena` operations
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum ArenaError {
    /// The buffer has insufficient space left for the requested allocation
    #[error("arena '{name}' out of space: requested {requested} bytes, but only {available} bytes available")]
    OutOfArena {
        /// Debug name of the arena
        name: &'static str,
        /// Number of bytes requested
        requested: usize,
        /// Number of bytes available
        available: usize,
    },
    /// The requested alignment exceeds pointer alignment
    #[error("alignment {align} exceeds the supported pointer alignment")]
    UnsupportedAlign {
        /// Alignment that was requested
        align: usize,
    },
}
