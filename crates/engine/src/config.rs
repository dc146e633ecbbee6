use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result, read_json_file};

/// Default grace window after a seek during which progress reports may not
/// move the current clip index.
pub const DEFAULT_SEEK_GRACE_MS: u64 = 500;
/// Default distance before a clip end at which sequence playback moves on.
pub const DEFAULT_END_TOLERANCE_SECS: f64 = 0.1;

/// What happens to a seek issued while the player is not ready.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingSeekPolicy {
    #[default]
    Drop,
    /// Keep the most recent seek and replay it once the player is ready.
    FlushOnReady,
}

/// Tuning knobs for the synchronization engine.
///
/// The grace window is a heuristic: the player gives no acknowledgment when a
/// seek lands, so reports arriving shortly after a seek are assumed stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub seek_grace_ms: u64,
    pub end_tolerance_secs: f64,
    pub auto_advance: bool,
    pub pending_seek: PendingSeekPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            seek_grace_ms: DEFAULT_SEEK_GRACE_MS,
            end_tolerance_secs: DEFAULT_END_TOLERANCE_SECS,
            auto_advance: true,
            pending_seek: PendingSeekPolicy::Drop,
        }
    }
}

impl SyncConfig {
    /// Loads and validates a JSON config file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let config: Self = read_json_file("failed to read sync config", path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.end_tolerance_secs.is_finite() || self.end_tolerance_secs < 0.0 {
            return Err(EngineError::InvalidConfig {
                reason: format!(
                    "end_tolerance_secs must be a finite non-negative number, got {}",
                    self.end_tolerance_secs
                ),
            });
        }
        Ok(())
    }

    pub fn seek_grace(&self) -> Duration {
        Duration::from_millis(self.seek_grace_ms)
    }
}
