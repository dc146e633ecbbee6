use serde::{Deserialize, Serialize};

/// Clip index and playback mode as one value.
///
/// Sequence mode always carries a clip index, so "sequencing with no clip"
/// cannot be represented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "clip", rename_all = "snake_case")]
pub enum PlaybackState {
    /// Free playback outside every clip, or no clips at all.
    #[default]
    Idle,
    /// Free playback inside clip `i`.
    Browsing(usize),
    /// Clip-sequence playback at clip `i`; reaching its end auto-advances.
    Sequencing(usize),
    /// The last clip of a sequence finished; playback is paused there.
    SequenceEnded(usize),
}

impl PlaybackState {
    pub fn clip_index(self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Browsing(index) | Self::Sequencing(index) | Self::SequenceEnded(index) => {
                Some(index)
            }
        }
    }

    pub fn is_virtual_mode(self) -> bool {
        matches!(self, Self::Sequencing(_))
    }

    /// Moves to another clip, keeping sequence mode if it is active.
    pub fn with_clip(self, index: Option<usize>) -> Self {
        match (self, index) {
            (Self::Sequencing(_), Some(index)) => Self::Sequencing(index),
            (_, Some(index)) => Self::Browsing(index),
            (_, None) => Self::Idle,
        }
    }

    pub fn enter_sequence(self, index: usize) -> Self {
        Self::Sequencing(index)
    }

    /// Leaves sequence mode and keeps the current clip. No-op otherwise.
    pub fn exit_sequence(self) -> Self {
        match self {
            Self::Sequencing(index) => Self::Browsing(index),
            other => other,
        }
    }

    pub fn finish_sequence(self) -> Self {
        match self {
            Self::Sequencing(index) => Self::SequenceEnded(index),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PlaybackState;

    #[test]
    fn with_clip_preserves_sequence_mode() {
        let state = PlaybackState::Sequencing(0).with_clip(Some(2));
        assert_eq!(state, PlaybackState::Sequencing(2));
        assert!(state.is_virtual_mode());
    }

    #[test]
    fn with_clip_from_ended_sequence_returns_to_browsing() {
        let state = PlaybackState::SequenceEnded(3).with_clip(Some(1));
        assert_eq!(state, PlaybackState::Browsing(1));
    }

    #[test]
    fn losing_the_clip_always_goes_idle() {
        assert_eq!(
            PlaybackState::Sequencing(1).with_clip(None),
            PlaybackState::Idle
        );
        assert_eq!(PlaybackState::Browsing(1).with_clip(None), PlaybackState::Idle);
    }

    #[test]
    fn exit_sequence_keeps_index_and_is_idempotent() {
        let exited = PlaybackState::Sequencing(4).exit_sequence();
        assert_eq!(exited, PlaybackState::Browsing(4));
        assert_eq!(exited.exit_sequence(), exited);
        assert_eq!(PlaybackState::Idle.exit_sequence(), PlaybackState::Idle);
    }

    #[test]
    fn finish_sequence_turns_off_virtual_mode() {
        let finished = PlaybackState::Sequencing(2).finish_sequence();
        assert_eq!(finished, PlaybackState::SequenceEnded(2));
        assert!(!finished.is_virtual_mode());
        assert_eq!(finished.clip_index(), Some(2));
    }
}
