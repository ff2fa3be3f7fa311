use crate::timeline::model::{EffectOrigin, GapType, TimelineEffect, TimelineEntry, TimelineGap};

/// Enumerates uncovered intervals of a timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GapDetector {
    min_gap_ms: f64,
}

impl Default for GapDetector {
    fn default() -> Self {
        Self { min_gap_ms: 50.0 }
    }
}

fn section_of(effect: &TimelineEffect) -> Option<&str> {
    match &effect.origin {
        EffectOrigin::Step { section_id, .. } => Some(section_id),
        EffectOrigin::Transition { .. } => None,
    }
}

impl GapDetector {
    pub fn new(min_gap_ms: f64) -> Self {
        Self {
            min_gap_ms: if min_gap_ms.is_finite() {
                min_gap_ms.max(0.0)
            } else {
                0.0
            },
        }
    }

    pub fn min_gap_ms(&self) -> f64 {
        self.min_gap_ms
    }

    /// Every gap in `timeline` over `[0, song_duration_ms]`, sorted by start.
    ///
    /// Explicit gaps are passed through unchanged. The parts of a hole they cover are not
    /// reported again; the uncovered remainders keep the hole's type and anchors. Pieces
    /// shorter than `min_gap_ms` are dropped.
    pub fn detect_all_gaps(
        &self,
        timeline: &[TimelineEntry],
        song_duration_ms: u64,
    ) -> Vec<TimelineGap> {
        let effects: Vec<&TimelineEffect> = timeline
            .iter()
            .filter_map(|e| match e {
                TimelineEntry::Effect(effect) => Some(effect),
                TimelineEntry::Gap(_) => None,
            })
            .collect();
        let explicit: Vec<&TimelineGap> = timeline
            .iter()
            .filter_map(|e| match e {
                TimelineEntry::Gap(gap) => Some(gap),
                TimelineEntry::Effect(_) => None,
            })
            .collect();
        self.detect(&effects, &explicit, song_duration_ms, None)
    }

    /// Gaps for one fixture: only its effects and the explicit gaps addressed to it (or to
    /// nobody) are considered. Every returned gap carries `fixture_id`.
    pub fn detect_fixture_gaps(
        &self,
        fixture_id: &str,
        timeline: &[TimelineEntry],
        song_duration_ms: u64,
    ) -> Vec<TimelineGap> {
        let effects: Vec<&TimelineEffect> = timeline
            .iter()
            .filter_map(|e| match e {
                TimelineEntry::Effect(effect) if effect.fixture_id == fixture_id => Some(effect),
                _ => None,
            })
            .collect();
        let explicit: Vec<&TimelineGap> = timeline
            .iter()
            .filter_map(|e| match e {
                TimelineEntry::Gap(gap)
                    if gap.fixture_id.as_deref().is_none_or(|f| f == fixture_id) =>
                {
                    Some(gap)
                }
                _ => None,
            })
            .collect();
        self.detect(&effects, &explicit, song_duration_ms, Some(fixture_id))
    }

    fn detect(
        &self,
        effects: &[&TimelineEffect],
        explicit: &[&TimelineGap],
        song_duration_ms: u64,
        fixture_id: Option<&str>,
    ) -> Vec<TimelineGap> {
        let tag = |mut g: TimelineGap| {
            if g.fixture_id.is_none() {
                g.fixture_id = fixture_id.map(str::to_string);
            }
            g
        };

        let mut gaps: Vec<TimelineGap> = explicit.iter().map(|g| tag((*g).clone())).collect();
        let mut covered: Vec<(u64, u64)> = explicit
            .iter()
            .filter(|g| g.end_ms > g.start_ms)
            .map(|g| (g.start_ms, g.end_ms))
            .collect();
        covered.sort_unstable();

        let holes = if effects.is_empty() {
            let mut holes = Vec::new();
            if song_duration_ms > 0 {
                holes.push(TimelineGap {
                    start_ms: 0,
                    end_ms: song_duration_ms,
                    gap_type: GapType::Start,
                    fixture_id: None,
                    from_position: None,
                    to_position: None,
                });
            }
            holes
        } else {
            holes_between(effects, song_duration_ms)
        };

        for hole in holes {
            for (start_ms, end_ms) in uncovered(hole.start_ms, hole.end_ms, &covered) {
                if ((end_ms - start_ms) as f64) < self.min_gap_ms {
                    continue;
                }
                gaps.push(tag(TimelineGap {
                    start_ms,
                    end_ms,
                    ..hole.clone()
                }));
            }
        }

        sort_gaps(&mut gaps);
        gaps
    }
}

/// Computed holes of a non-empty effect list over `[0, song_duration_ms]`, before any
/// explicit gaps or the min-gap filter are applied.
fn holes_between(effects: &[&TimelineEffect], song_duration_ms: u64) -> Vec<TimelineGap> {
    let mut sorted = effects.to_vec();
    sorted.sort_by(|a, b| {
        a.start_ms
            .cmp(&b.start_ms)
            .then_with(|| a.end_ms.cmp(&b.end_ms))
            .then_with(|| a.fixture_id.cmp(&b.fixture_id))
    });
    let mut holes = Vec::new();
    let Some(&first) = sorted.first() else {
        return holes;
    };
    if first.start_ms > 0 {
        holes.push(TimelineGap {
            start_ms: 0,
            end_ms: first.start_ms,
            gap_type: GapType::Start,
            fixture_id: None,
            from_position: None,
            to_position: Some(first.start_pose),
        });
    }

    // Cursor tracks the furthest end seen so far; overlapping effects extend coverage.
    let mut cursor = first;
    for &next in &sorted[1..] {
        if cursor.end_ms < next.start_ms {
            let gap_type = match (section_of(cursor), section_of(next)) {
                (Some(a), Some(b)) if a != b => GapType::InterSection,
                _ => GapType::MidSequence,
            };
            holes.push(TimelineGap {
                start_ms: cursor.end_ms,
                end_ms: next.start_ms,
                gap_type,
                fixture_id: None,
                from_position: Some(cursor.end_pose),
                to_position: Some(next.start_pose),
            });
        }
        if next.end_ms >= cursor.end_ms {
            cursor = next;
        }
    }

    if cursor.end_ms < song_duration_ms {
        holes.push(TimelineGap {
            start_ms: cursor.end_ms,
            end_ms: song_duration_ms,
            gap_type: GapType::End,
            fixture_id: None,
            from_position: Some(cursor.end_pose),
            to_position: None,
        });
    }
    holes
}

/// Pieces of `[start, end)` not inside any of `covered` (sorted by start).
fn uncovered(start: u64, end: u64, covered: &[(u64, u64)]) -> Vec<(u64, u64)> {
    let mut pieces = Vec::new();
    let mut at = start;
    for &(s, e) in covered {
        if s >= end {
            break;
        }
        if e <= at {
            continue;
        }
        if s > at {
            pieces.push((at, s));
        }
        at = at.max(e);
    }
    if at < end {
        pieces.push((at, end));
    }
    pieces
}

fn sort_gaps(gaps: &mut [TimelineGap]) {
    gaps.sort_by(|a, b| {
        a.start_ms
            .cmp(&b.start_ms)
            .then_with(|| a.end_ms.cmp(&b.end_ms))
            .then_with(|| a.fixture_id.cmp(&b.fixture_id))
    });
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/gaps.rs"]
mod tests;
