use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Number of impact slots fed to the shield shader.
pub const IMPACT_CAPACITY: usize = 5;

/// Timestamp of an unused slot. Far enough in the past to never be active.
pub const SENTINEL_TIME: f32 = -100.0;

/// Seconds an impact keeps rippling after it lands.
pub const RIPPLE_LIFETIME: f32 = 2.0;

/// A single hit on the shield: where and when.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactEvent {
    pub position: Vec3,
    pub time: f32,
}

impl ImpactEvent {
    pub fn new(position: Vec3, time: f32) -> Self {
        Self { position, time }
    }

    /// Placeholder for an empty slot.
    pub const fn sentinel() -> Self {
        Self {
            position: Vec3::ZERO,
            time: SENTINEL_TIME,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.time == SENTINEL_TIME
    }

    /// Seconds elapsed since the impact, negative for future impacts.
    pub fn age_at(&self, now: f32) -> f32 {
        now - self.time
    }

    /// Whether the impact is inside its open `(0, RIPPLE_LIFETIME)` window.
    pub fn is_active_at(&self, now: f32) -> bool {
        let age = self.age_at(now);
        age > 0.0 && age < RIPPLE_LIFETIME
    }
}

impl Default for ImpactEvent {
    fn default() -> Self {
        Self::sentinel()
    }
}

/// Immutable copy of the buffer, oldest slot first.
pub type ImpactSnapshot = [ImpactEvent; IMPACT_CAPACITY];

/// Fixed-capacity FIFO of the most recent impacts.
///
/// Index 0 is the oldest retained slot, the last index the newest. The shader
/// treats slots as an unordered set, so order only matters for eviction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactBuffer {
    slots: ImpactSnapshot,
}

impl Default for ImpactBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ImpactBuffer {
    /// A buffer of sentinel slots.
    pub fn new() -> Self {
        Self {
            slots: [ImpactEvent::sentinel(); IMPACT_CAPACITY],
        }
    }

    /// Append an impact, evicting the oldest slot.
    ///
    /// `time` must not go backwards between calls; the buffer does not check.
    pub fn record(&mut self, position: Vec3, time: f32) -> ImpactEvent {
        let event = ImpactEvent::new(position, time);
        let evicted = self.slots[0];

        let mut next = [ImpactEvent::sentinel(); IMPACT_CAPACITY];
        next[..IMPACT_CAPACITY - 1].copy_from_slice(&self.slots[1..]);
        next[IMPACT_CAPACITY - 1] = event;
        self.slots = next;

        tracing::debug!(
            x = position.x,
            y = position.y,
            z = position.z,
            time,
            evicted_time = evicted.time,
            "impact recorded"
        );
        event
    }

    /// Copy of the current slots.
    pub fn snapshot(&self) -> ImpactSnapshot {
        self.slots
    }

    pub fn slots(&self) -> &ImpactSnapshot {
        &self.slots
    }

    /// Number of slots currently rippling.
    pub fn active_count(&self, now: f32) -> usize {
        self.slots.iter().filter(|e| e.is_active_at(now)).count()
    }

    /// Newest real impact, if any has been recorded.
    pub fn latest(&self) -> Option<ImpactEvent> {
        self.slots.iter().rev().find(|e| !e.is_sentinel()).copied()
    }
}
