//! Lock-free gain hand-off between the control thread and the audio thread.
//!
//! The control thread recomputes compensation when tap parameters change and
//! publishes the gain; the audio thread reads it once per block and feeds its
//! own smoother. One writer, one reader, no locks, no allocation.
//!
//! ```text
//! control thread                      audio thread
//! ──────────────                      ────────────
//! engine.update(&set) ─→ publish() ─→ load_if_newer() ─→ smoother target
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

/// Single-writer/single-reader cell holding the latest output gain.
///
/// The gain is stored as its `f32` bit pattern. A generation counter lets the
/// reader skip the update when nothing was published since its last read.
///
/// # Example
///
/// ```rust
/// use tapdensity_core::GainSlot;
///
/// let slot = GainSlot::new(1.0);
/// let mut seen = slot.generation();
///
/// assert_eq!(slot.load_if_newer(&mut seen), None);
/// slot.publish(0.25);
/// assert_eq!(slot.load_if_newer(&mut seen), Some(0.25));
/// assert_eq!(slot.load_if_newer(&mut seen), None);
/// ```
#[derive(Debug)]
pub struct GainSlot {
    bits: AtomicU32,
    generation: AtomicU32,
}

impl GainSlot {
    /// Create a slot holding `initial`.
    pub fn new(initial: f32) -> Self {
        Self {
            bits: AtomicU32::new(initial.to_bits()),
            generation: AtomicU32::new(0),
        }
    }

    /// Publish a new gain (writer side).
    #[inline]
    pub fn publish(&self, gain: f32) {
        self.bits.store(gain.to_bits(), Ordering::Release);
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// Latest published gain (reader side).
    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Number of publishes so far (wrapping).
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation.load(Ordering::Acquire)
    }

    /// Latest gain if anything was published since the reader last saw
    /// generation `seen`; updates `seen`.
    #[inline]
    pub fn load_if_newer(&self, seen: &mut u32) -> Option<f32> {
        let generation = self.generation();
        if generation == *seen {
            return None;
        }
        *seen = generation;
        Some(self.load())
    }
}

impl Default for GainSlot {
    fn default() -> Self {
        Self::new(1.0)
    }
}
