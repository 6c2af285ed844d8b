//! Append-only, time-indexed, multi-channel numeric trace.
//!
//! Grounded directly in the original `Signal` class: a stable name→index
//! mapping established once at construction, frames appended in tick order,
//! and a pre-seeded all-zero sentinel frame so relative-time operators have
//! a defined baseline at tick 0.

use std::collections::HashMap;

/// Ordered sequence of frames, each a fixed-width vector of floats indexed
/// by a stable name→index mapping. The channel set is immutable after
/// construction; `append`/`pop` are the only ways the frame count changes.
#[derive(Debug, Clone)]
pub struct Signal {
    index: HashMap<String, usize>,
    channel_count: usize,
    frames: Vec<Vec<f64>>,
}

impl Signal {
    /// Establish the name→index mapping and pre-seed one all-zero frame.
    pub fn new<S: AsRef<str>>(channel_names: &[S]) -> Signal {
        let mut index = HashMap::with_capacity(channel_names.len());
        for (i, name) in channel_names.iter().enumerate() {
            index.insert(name.as_ref().to_string(), i);
        }
        let channel_count = channel_names.len();
        Signal {
            index,
            channel_count,
            frames: vec![vec![0.0; channel_count]],
        }
    }

    /// Number of frames currently in the trace (including the sentinel).
    pub fn length(&self) -> usize {
        self.frames.len()
    }

    /// Number of channels established at construction.
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Append a frame. Panics if its length does not equal the channel count
    /// — a caller-side logic bug, not a recoverable condition.
    pub fn append(&mut self, frame: Vec<f64>) {
        assert_eq!(
            frame.len(),
            self.channel_count,
            "frame length {} does not match channel count {}",
            frame.len(),
            self.channel_count
        );
        self.frames.push(frame);
    }

    /// Remove the most recent frame. Must not be called when only the
    /// sentinel frame remains.
    pub fn pop(&mut self) {
        assert!(
            self.frames.len() > 1,
            "pop() called with only the sentinel frame remaining"
        );
        self.frames.pop();
    }

    /// True iff tick `t` has a frame (`0 <= t < length()`).
    pub fn available(&self, t: i64) -> bool {
        t >= 0 && (t as usize) < self.frames.len()
    }

    /// Value of channel `name` at tick `t`. Panics if `t` is out of range or
    /// `name` is unknown — callers MUST check [`Signal::available`] first;
    /// this is the same contract as the original `value(name, t)`, which
    /// throws rather than silently clamping.
    pub fn value(&self, name: &str, t: i64) -> f64 {
        assert!(self.available(t), "value() called with unavailable tick {t}");
        let idx = *self
            .index
            .get(name)
            .unwrap_or_else(|| panic!("unknown channel '{name}'"));
        self.frames[t as usize][idx]
    }

    /// Value of channel `name` at the latest tick.
    pub fn value_latest(&self, name: &str) -> f64 {
        let t = self.frames.len() as i64 - 1;
        self.value(name, t)
    }

    /// Append `frame`, run `f` with a read-only view of `self`, then pop the
    /// frame unconditionally — even if `f` panics. This is the only
    /// sanctioned way to do one-step-ahead "what-if" scoring (Design Note:
    /// raw append/pop pairs are fragile under early return or panic).
    pub fn scoped_with_frame<R>(&mut self, frame: Vec<f64>, f: impl FnOnce(&Signal) -> R) -> R {
        struct PopGuard<'a>(&'a mut Signal);
        impl Drop for PopGuard<'_> {
            fn drop(&mut self) {
                self.0.pop();
            }
        }
        self.append(frame);
        let guard = PopGuard(self);
        f(guard.0)
    }
}
