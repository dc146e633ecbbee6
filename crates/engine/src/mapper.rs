//! Translation between player ("actual") time and the gapless virtual
//! timeline built from clip ranges.

use serde::{Deserialize, Serialize};

use crate::timeline::{ClipRange, total_virtual_duration};

/// Player position resolved from a virtual time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActualTarget {
    pub actual_time: f64,
    /// `None` only when there are no ranges.
    pub clip_index: Option<usize>,
}

/// Maps a player position onto the virtual timeline.
///
/// Positions inside a range map linearly. Positions before a range, or in the
/// gap leading up to it, snap forward to that range's virtual start. Positions
/// past every range map to the total virtual duration.
///
/// # Example
/// ```
/// use clip_engine::mapper::actual_to_virtual;
/// use clip_engine::timeline::{Clip, compute_ranges};
///
/// let ranges = compute_ranges(&[Clip::new(0.0, 10.0), Clip::new(20.0, 30.0)]);
/// assert_eq!(actual_to_virtual(25.0, &ranges), 15.0);
/// assert_eq!(actual_to_virtual(15.0, &ranges), 10.0);
/// ```
pub fn actual_to_virtual(actual_time: f64, ranges: &[ClipRange]) -> f64 {
    if let Some(range) = ranges.iter().find(|range| {
        range.duration > 0.0
            && range.actual_start <= actual_time
            && actual_time <= range.actual_end
    }) {
        return range.virtual_start + (actual_time - range.actual_start);
    }

    ranges
        .iter()
        .filter(|range| actual_time < range.actual_start)
        .min_by(|a, b| a.actual_start.total_cmp(&b.actual_start))
        .map_or_else(|| total_virtual_duration(ranges), |next| next.virtual_start)
}

/// Maps a virtual time back to a player position and clip index.
///
/// Times past the end clamp to the last range's actual end; negative times
/// clamp to the first range's start.
pub fn virtual_to_actual(virtual_time: f64, ranges: &[ClipRange]) -> ActualTarget {
    let Some(last_index) = ranges.len().checked_sub(1) else {
        return ActualTarget {
            actual_time: 0.0,
            clip_index: None,
        };
    };

    if let Some(index) = ranges
        .iter()
        .position(|range| range.virtual_start <= virtual_time && virtual_time < range.virtual_end)
    {
        let range = &ranges[index];
        return ActualTarget {
            actual_time: range.actual_start + (virtual_time - range.virtual_start),
            clip_index: Some(index),
        };
    }

    if virtual_time < 0.0 {
        return ActualTarget {
            actual_time: ranges[0].actual_start,
            clip_index: Some(0),
        };
    }

    ActualTarget {
        actual_time: ranges[last_index].actual_end,
        clip_index: Some(last_index),
    }
}

#[cfg(test)]
mod tests {
    use super::{ActualTarget, actual_to_virtual, virtual_to_actual};
    use crate::timeline::{Clip, compute_ranges};

    const EPSILON: f64 = 1e-9;

    fn two_clips() -> Vec<crate::timeline::ClipRange> {
        compute_ranges(&[Clip::new(0.0, 10.0), Clip::new(20.0, 30.0)])
    }

    #[test]
    fn actual_before_first_range_snaps_to_its_start() {
        let ranges = compute_ranges(&[Clip::new(5.0, 10.0)]);
        assert_eq!(actual_to_virtual(1.0, &ranges), 0.0);
    }

    #[test]
    fn actual_in_gap_snaps_forward_to_next_range() {
        assert_eq!(actual_to_virtual(12.0, &two_clips()), 10.0);
    }

    #[test]
    fn actual_inside_later_range_of_unsorted_clips_maps_linearly() {
        let ranges = compute_ranges(&[Clip::new(20.0, 30.0), Clip::new(0.0, 10.0)]);

        assert_eq!(actual_to_virtual(5.0, &ranges), 15.0);
        assert_eq!(actual_to_virtual(15.0, &ranges), 0.0);
    }

    #[test]
    fn actual_past_all_ranges_maps_to_total_duration() {
        assert_eq!(actual_to_virtual(99.0, &two_clips()), 20.0);
    }

    #[test]
    fn actual_on_empty_ranges_is_zero() {
        assert_eq!(actual_to_virtual(3.0, &[]), 0.0);
    }

    #[test]
    fn virtual_inside_second_range_resolves_offset_and_index() {
        let target = virtual_to_actual(12.5, &two_clips());
        assert_eq!(
            target,
            ActualTarget {
                actual_time: 22.5,
                clip_index: Some(1),
            }
        );
    }

    #[test]
    fn virtual_past_end_clamps_to_last_range_end() {
        let target = virtual_to_actual(50.0, &two_clips());
        assert_eq!(target.actual_time, 30.0);
        assert_eq!(target.clip_index, Some(1));
    }

    #[test]
    fn virtual_on_empty_ranges_has_no_clip() {
        let target = virtual_to_actual(4.0, &[]);
        assert_eq!(target.actual_time, 0.0);
        assert_eq!(target.clip_index, None);
    }

    #[test]
    fn virtual_negative_clamps_to_first_range() {
        let target = virtual_to_actual(-2.0, &two_clips());
        assert_eq!(target.actual_time, 0.0);
        assert_eq!(target.clip_index, Some(0));
    }

    #[test]
    fn zero_width_range_is_skipped_by_both_directions() {
        let ranges = compute_ranges(&[
            Clip::new(0.0, 4.0),
            Clip::new(8.0, 8.0),
            Clip::new(10.0, 14.0),
        ]);

        let target = virtual_to_actual(4.0, &ranges);
        assert_eq!(target.clip_index, Some(2));
        assert_eq!(target.actual_time, 10.0);
        assert_eq!(actual_to_virtual(8.0, &ranges), 4.0);
    }

    #[test]
    fn round_trip_inside_clips_is_identity() {
        let ranges = compute_ranges(&[
            Clip::new(1.0, 3.5),
            Clip::new(7.25, 9.0),
            Clip::new(30.0, 61.0),
        ]);

        for actual in [1.0, 2.2, 3.49, 7.25, 8.0, 30.0, 45.123, 60.9] {
            let virtual_time = actual_to_virtual(actual, &ranges);
            let back = virtual_to_actual(virtual_time, &ranges);
            assert!(
                (back.actual_time - actual).abs() < EPSILON,
                "round trip drifted for {actual}: got {}",
                back.actual_time
            );
        }
    }
}
