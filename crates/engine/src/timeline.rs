use serde::{Deserialize, Serialize};
use tracing::debug;

/// One playable sub-range of the media, in player seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub start_time: f64,
    pub end_time: f64,
}

impl Clip {
    pub fn new(start_time: f64, end_time: f64) -> Self {
        Self {
            start_time,
            end_time,
        }
    }

    /// Half-open containment: `start_time <= t < end_time`.
    pub fn contains(&self, actual_time: f64) -> bool {
        self.start_time <= actual_time && actual_time < self.end_time
    }
}

/// A clip placed on the virtual timeline.
///
/// `duration` is clamped at zero, so a malformed clip with `end <= start`
/// occupies no virtual time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRange {
    pub clip: Clip,
    pub virtual_start: f64,
    pub virtual_end: f64,
    pub actual_start: f64,
    pub actual_end: f64,
    pub duration: f64,
}

/// Lays clips end to end on the virtual timeline.
///
/// Gaps between clips in player time disappear; each range starts where the
/// previous one ended.
///
/// # Example
/// ```
/// use clip_engine::timeline::{Clip, compute_ranges, total_virtual_duration};
///
/// let ranges = compute_ranges(&[Clip::new(0.0, 10.0), Clip::new(20.0, 30.0)]);
/// assert_eq!(ranges[1].virtual_start, 10.0);
/// assert_eq!(total_virtual_duration(&ranges), 20.0);
/// ```
pub fn compute_ranges(clips: &[Clip]) -> Vec<ClipRange> {
    let mut cursor = 0.0;
    clips
        .iter()
        .map(|clip| {
            let duration = (clip.end_time - clip.start_time).max(0.0);
            let range = ClipRange {
                clip: *clip,
                virtual_start: cursor,
                virtual_end: cursor + duration,
                actual_start: clip.start_time,
                actual_end: clip.end_time,
                duration,
            };
            cursor = range.virtual_end;
            range
        })
        .collect()
}

/// Total length of the virtual timeline; zero when there are no ranges.
pub fn total_virtual_duration(ranges: &[ClipRange]) -> f64 {
    ranges.last().map(|range| range.virtual_end).unwrap_or(0.0)
}

/// Clip list together with its derived virtual ranges.
///
/// Ranges are rebuilt wholesale on every replacement; nothing is patched
/// incrementally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipTimeline {
    clips: Vec<Clip>,
    ranges: Vec<ClipRange>,
}

impl ClipTimeline {
    pub fn new(clips: Vec<Clip>) -> Self {
        let ranges = compute_ranges(&clips);
        debug!(
            clip_count = clips.len(),
            total_virtual = total_virtual_duration(&ranges),
            "clip ranges computed"
        );
        Self { clips, ranges }
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn ranges(&self) -> &[ClipRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn clip(&self, index: usize) -> Option<&Clip> {
        self.clips.get(index)
    }

    pub fn last_index(&self) -> Option<usize> {
        self.clips.len().checked_sub(1)
    }

    pub fn total_virtual_duration(&self) -> f64 {
        total_virtual_duration(&self.ranges)
    }

    /// Finds the first clip whose half-open range contains `actual_time`.
    pub fn find_clip_index(&self, actual_time: f64) -> Option<usize> {
        self.clips.iter().position(|clip| clip.contains(actual_time))
    }
}
