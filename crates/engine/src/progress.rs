use crate::config::SyncConfig;
use crate::state::PlaybackState;
use crate::timeline::ClipTimeline;

/// What a trusted progress report asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressDecision {
    Unchanged,
    /// Free playback moved into another clip, or out of every clip.
    Track(Option<usize>),
    /// Sequence playback reached the end of the current clip.
    Advance { next: usize },
    /// Sequence playback reached the end of its last clip.
    Finish,
}

/// Decides how a progress report outside the seek grace window affects the
/// clip index and mode.
pub fn decide_progress(
    state: PlaybackState,
    timeline: &ClipTimeline,
    actual_time: f64,
    config: &SyncConfig,
) -> ProgressDecision {
    let sequencing = match state {
        PlaybackState::Sequencing(index) => timeline.clip(index).map(|clip| (index, clip)),
        _ => None,
    };

    let Some((index, clip)) = sequencing else {
        let found = timeline.find_clip_index(actual_time);
        if found == state.clip_index() {
            return ProgressDecision::Unchanged;
        }
        return ProgressDecision::Track(found);
    };

    if actual_time < clip.end_time - config.end_tolerance_secs {
        return ProgressDecision::Unchanged;
    }

    let next = index + 1;
    if config.auto_advance && next < timeline.len() {
        ProgressDecision::Advance { next }
    } else {
        ProgressDecision::Finish
    }
}

#[cfg(test)]
mod tests {
    use super::{ProgressDecision, decide_progress};
    use crate::config::SyncConfig;
    use crate::state::PlaybackState;
    use crate::timeline::{Clip, ClipTimeline};

    fn timeline() -> ClipTimeline {
        ClipTimeline::new(vec![Clip::new(0.0, 10.0), Clip::new(20.0, 30.0)])
    }

    #[test]
    fn free_playback_tracks_the_containing_clip() {
        let decision = decide_progress(
            PlaybackState::Idle,
            &timeline(),
            21.0,
            &SyncConfig::default(),
        );
        assert_eq!(decision, ProgressDecision::Track(Some(1)));
    }

    #[test]
    fn free_playback_in_a_gap_clears_the_index() {
        let decision = decide_progress(
            PlaybackState::Browsing(0),
            &timeline(),
            15.0,
            &SyncConfig::default(),
        );
        assert_eq!(decision, ProgressDecision::Track(None));
    }

    #[test]
    fn free_playback_inside_same_clip_is_unchanged() {
        let decision = decide_progress(
            PlaybackState::Browsing(1),
            &timeline(),
            25.0,
            &SyncConfig::default(),
        );
        assert_eq!(decision, ProgressDecision::Unchanged);
    }

    #[test]
    fn sequence_before_tolerance_is_unchanged() {
        let decision = decide_progress(
            PlaybackState::Sequencing(0),
            &timeline(),
            9.85,
            &SyncConfig::default(),
        );
        assert_eq!(decision, ProgressDecision::Unchanged);
    }

    #[test]
    fn sequence_within_tolerance_advances() {
        let decision = decide_progress(
            PlaybackState::Sequencing(0),
            &timeline(),
            9.95,
            &SyncConfig::default(),
        );
        assert_eq!(decision, ProgressDecision::Advance { next: 1 });
    }

    #[test]
    fn sequence_ignores_position_outside_current_clip_until_its_end() {
        // Sequence mode trusts its own index; only the current clip's end matters.
        let decision = decide_progress(
            PlaybackState::Sequencing(1),
            &timeline(),
            5.0,
            &SyncConfig::default(),
        );
        assert_eq!(decision, ProgressDecision::Unchanged);
    }

    #[test]
    fn last_clip_end_finishes_the_sequence() {
        let decision = decide_progress(
            PlaybackState::Sequencing(1),
            &timeline(),
            29.95,
            &SyncConfig::default(),
        );
        assert_eq!(decision, ProgressDecision::Finish);
    }

    #[test]
    fn disabled_auto_advance_finishes_at_first_clip_end() {
        let config = SyncConfig {
            auto_advance: false,
            ..SyncConfig::default()
        };
        let decision = decide_progress(PlaybackState::Sequencing(0), &timeline(), 9.95, &config);
        assert_eq!(decision, ProgressDecision::Finish);
    }
}
