use xxhash_rust::xxh3::Xxh3;

use crate::{
    compile::segment::{ChannelValue, SegmentChannels},
    curve::model::Curve,
    foundation::core::PanTilt,
    timeline::model::{EffectOrigin, GapType, TimelineEffect},
};

const XXH3_SEED: u64 = 0x5c1d_07a3_e4b2_9f61;

/// Stable 128-bit fingerprint of a rendered effect list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimelineFingerprint {
    pub hi: u64,
    pub lo: u64,
}

impl std::fmt::Display for TimelineFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

impl serde::Serialize for TimelineFingerprint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Hash effects in order. Metadata is not hashed; it only annotates.
pub fn fingerprint_effects(effects: &[TimelineEffect]) -> TimelineFingerprint {
    let mut h = StableHasher::new();
    h.write_u64(effects.len() as u64);
    for e in effects {
        write_effect(&mut h, e);
    }
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn finish(self) -> TimelineFingerprint {
        let v = self.inner.digest128();
        TimelineFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

fn write_effect(h: &mut StableHasher, e: &TimelineEffect) {
    h.write_str(&e.fixture_id);
    h.write_u64(e.start_ms);
    h.write_u64(e.end_ms);
    write_pose(h, e.start_pose);
    write_pose(h, e.end_pose);
    match &e.origin {
        EffectOrigin::Step {
            section_id,
            step_id,
        } => {
            h.write_u8(0);
            h.write_str(section_id);
            h.write_str(step_id);
        }
        EffectOrigin::Transition { strategy, gap_type } => {
            h.write_u8(1);
            h.write_str(strategy);
            h.write_u8(match gap_type {
                GapType::Start => 0,
                GapType::MidSequence => 1,
                GapType::InterSection => 2,
                GapType::End => 3,
            });
        }
    }
    write_channels(h, &e.channels);
}

fn write_pose(h: &mut StableHasher, p: PanTilt) {
    h.write_f64(p.pan_deg);
    h.write_f64(p.tilt_deg);
}

fn write_channels(h: &mut StableHasher, c: &SegmentChannels) {
    for ch in [&c.pan, &c.tilt, &c.dimmer] {
        match ch {
            ChannelValue::Static(v) => {
                h.write_u8(0);
                h.write_u8(*v);
            }
            ChannelValue::Curve(curve) => {
                h.write_u8(1);
                write_curve(h, curve);
            }
        }
    }
}

fn write_curve(h: &mut StableHasher, c: &Curve) {
    h.write_u64(c.len() as u64);
    for p in c.points() {
        h.write_f64(p.t);
        h.write_f64(p.v);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/fingerprint.rs"]
mod tests;
