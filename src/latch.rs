use serde_derive::{Deserialize, Serialize};

/// Edge-triggered overlap state for one line.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Latch {
    #[default]
    Idle,
    Engaged,
}

impl Latch {
    #[inline]
    pub fn from_engaged(engaged: bool) -> Self {
        if engaged {
            Latch::Engaged
        } else {
            Latch::Idle
        }
    }

    #[inline]
    pub fn is_engaged(&self) -> bool {
        *self == Latch::Engaged
    }

    /// Feeds one frame's overlap observation. Returns `true` only on the frame an overlap
    /// episode begins.
    pub fn observe(&mut self, matched: bool) -> bool {
        let (next, rising) = match (*self, matched) {
            (Latch::Idle, true) => (Latch::Engaged, true),
            (Latch::Engaged, true) => (Latch::Engaged, false),
            (_, false) => (Latch::Idle, false),
        };

        *self = next;
        rising
    }
}
