use std::fmt;

/// Why a [`WindowConfig`](crate::WindowConfig) was rejected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    ZeroChunkSize,
    ZeroMaxVisibleChunks,
    ZeroPageLimit,
    InvalidProximity(f32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroChunkSize => write!(f, "chunk size must be at least 1"),
            ConfigError::ZeroMaxVisibleChunks => {
                write!(f, "max visible chunks must be at least 1")
            }
            ConfigError::ZeroPageLimit => write!(f, "page limit must be at least 1"),
            ConfigError::InvalidProximity(value) => {
                write!(f, "fetch proximity {value} is not a finite, non-negative distance")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A failed page fetch.
///
/// Every variant is transient from the engine's point of view: the in-flight
/// flag for the edge clears and a later intersection may try again. Retry
/// policy belongs to the pager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PagerError {
    Transport { reason: String },
    InvalidCursor,
    SourceUnavailable { source: String },
}

impl fmt::Display for PagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PagerError::Transport { reason } => write!(f, "page request failed: {reason}"),
            PagerError::InvalidCursor => write!(f, "pager rejected the cursor"),
            PagerError::SourceUnavailable { source } => {
                write!(f, "source {source} is unavailable")
            }
        }
    }
}

impl std::error::Error for PagerError {}
