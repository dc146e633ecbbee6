use std::time::{Duration, Instant};

/// Remembers when the last seek was issued.
///
/// Player progress reports that arrive within the grace window may still
/// describe the position from before the seek, so they are not allowed to
/// change the clip index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeekGate {
    last_seek: Option<Instant>,
}

impl SeekGate {
    pub fn stamp(&mut self, now: Instant) {
        self.last_seek = Some(now);
    }

    /// True while `now` is less than `window` after the last seek.
    pub fn suppresses(&self, now: Instant, window: Duration) -> bool {
        self.last_seek
            .is_some_and(|stamp| now.saturating_duration_since(stamp) < window)
    }
}
