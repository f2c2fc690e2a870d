//! Tuning knobs for a [`ScrollWindow`](crate::ScrollWindow).

use web_time::Duration;

use crate::error::ConfigError;

/// Default number of items per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 50;

/// Default cap on simultaneously rendered chunks.
pub const DEFAULT_MAX_VISIBLE_CHUNKS: usize = 4;

/// Default delay during which an edge ignores repeated intersection callbacks.
pub const DEFAULT_EDGE_COOLDOWN: Duration = Duration::from_millis(300);

/// Default distance from the true edge (px) within which a remote fetch starts.
pub const DEFAULT_FETCH_PROXIMITY: f32 = 100.0;

/// Default number of items requested per page.
pub const DEFAULT_PAGE_LIMIT: usize = DEFAULT_CHUNK_SIZE;

/// Configuration of the windowing engine.
///
/// Override individual fields with struct update syntax:
///
/// ```
/// use lectern_window::WindowConfig;
///
/// let config = WindowConfig {
///     chunk_size: 25,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct WindowConfig {
    /// Items per chunk, the unit of virtualization.
    pub chunk_size: usize,
    /// Most chunks rendered at the same time.
    pub max_visible_chunks: usize,
    /// Cooldown applied by each edge controller after it acts.
    pub edge_cooldown: Duration,
    /// How close (px) the viewport must be to the true edge before fetching.
    pub fetch_proximity: f32,
    /// Items requested from the pager per page.
    pub page_limit: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_visible_chunks: DEFAULT_MAX_VISIBLE_CHUNKS,
            edge_cooldown: DEFAULT_EDGE_COOLDOWN,
            fetch_proximity: DEFAULT_FETCH_PROXIMITY,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl WindowConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.max_visible_chunks == 0 {
            return Err(ConfigError::ZeroMaxVisibleChunks);
        }
        if self.page_limit == 0 {
            return Err(ConfigError::ZeroPageLimit);
        }
        if !self.fetch_proximity.is_finite() || self.fetch_proximity < 0.0 {
            return Err(ConfigError::InvalidProximity(self.fetch_proximity));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(WindowConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_degenerate_values() {
        let zero_chunk = WindowConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert_eq!(zero_chunk.validate(), Err(ConfigError::ZeroChunkSize));

        let zero_window = WindowConfig {
            max_visible_chunks: 0,
            ..Default::default()
        };
        assert_eq!(
            zero_window.validate(),
            Err(ConfigError::ZeroMaxVisibleChunks)
        );

        let zero_page = WindowConfig {
            page_limit: 0,
            ..Default::default()
        };
        assert_eq!(zero_page.validate(), Err(ConfigError::ZeroPageLimit));

        let bad_proximity = WindowConfig {
            fetch_proximity: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            bad_proximity.validate(),
            Err(ConfigError::InvalidProximity(_))
        ));
    }
}
