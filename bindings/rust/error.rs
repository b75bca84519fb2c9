use thiserror::Error;

/// Errors raised while configuring a [`Parser`](crate::Parser) or loading
/// grammar metadata.
///
/// Syntax errors in parsed text are not reported through this type; they are
/// recorded as `ERROR` and `MISSING` nodes in the resulting tree.
#[derive(Debug, Error)]
pub enum SifuError {
    /// The descriptor was produced for an ABI this crate cannot drive.
    #[error("incompatible language version {version}, expected {min}..={max}")]
    IncompatibleVersion {
        /// Version reported by the descriptor.
        version: u32,
        /// Oldest supported version.
        min: u32,
        /// Newest supported version.
        max: u32,
    },

    /// `parse` was called before `set_language`.
    #[error("no language is assigned to the parser")]
    NoLanguage,

    /// A lexical pattern in the descriptor failed to compile.
    #[error("invalid token pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The embedded `tree-sitter.json` could not be decoded.
    #[error("invalid grammar configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias for grammar operations.
pub type Result<T> = std::result::Result<T, SifuError>;
