use core::sync::atomic::{AtomicU32, Ordering};

pub const MIN_INTERVAL_MS: u32 = 10;
pub const MAX_INTERVAL_MS: u32 = 5000;

/// Frame interval shared between the ticker and whoever adjusts the speed.
///
/// Readers take one atomic load per tick.
#[derive(Debug)]
pub struct FrameInterval(AtomicU32);

impl FrameInterval {
    pub fn new(ms: u32) -> Self {
        Self(AtomicU32::new(clamp_interval(ms)))
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, ms: u32) {
        self.0.store(clamp_interval(ms), Ordering::Relaxed);
    }

    /// Add `delta_ms` (may be negative), clamped. Returns the new interval.
    pub fn adjust(&self, delta_ms: i32) -> u32 {
        let update = |ms: u32| Some(clamp_interval(ms.saturating_add_signed(delta_ms)));
        match self.0.fetch_update(Ordering::Relaxed, Ordering::Relaxed, update) {
            Ok(previous) | Err(previous) => update(previous).unwrap_or(previous),
        }
    }
}

fn clamp_interval(ms: u32) -> u32 {
    ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS)
}

/// Cyclic playback position over a fixed number of frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playback {
    len: usize,
    index: usize,
    playing: bool,
}

impl Playback {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            index: 0,
            playing: len > 1,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn current(&self) -> usize {
        self.index
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing && self.len > 1;
        self.playing
    }

    /// Timer tick; advances only while playing.
    pub fn tick(&mut self) -> bool {
        if self.playing {
            self.step_forward();
        }
        self.playing
    }

    pub fn step_forward(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn step_back(&mut self) {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
    }
}
