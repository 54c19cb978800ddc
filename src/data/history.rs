//! Rolling per-channel history for display and trending.

use super::channel::{Diagnosis, Reading};
use crate::error::{MonitorError, Result};

/// Smallest accepted window size.
pub const MIN_WINDOW: usize = 10;
/// Largest accepted window size.
pub const MAX_WINDOW: usize = 100;
/// Window size used when none is configured.
pub const DEFAULT_WINDOW: usize = 30;

/// A classified reading as stored in history.
pub type Entry = (Reading, Diagnosis);

/// Reject window sizes outside `MIN_WINDOW..=MAX_WINDOW`.
pub fn check_window(capacity: usize) -> Result<usize> {
    if (MIN_WINDOW..=MAX_WINDOW).contains(&capacity) {
        Ok(capacity)
    } else {
        Err(MonitorError::InvalidCapacity(capacity))
    }
}

/// Fixed-capacity ring buffer of classified readings.
///
/// Storage is allocated once up front. Once full, each push overwrites the
/// oldest slot and advances `start`, so iteration order is always oldest to
/// newest.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    slots: Vec<Entry>,
    /// Index of the oldest entry once the buffer has wrapped.
    start: usize,
    capacity: usize,
}

impl SeriesBuffer {
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = check_window(capacity)?;
        Ok(Self {
            slots: Vec::with_capacity(capacity),
            start: 0,
            capacity,
        })
    }

    /// Append at the tail, evicting the oldest entry when full.
    pub fn push(&mut self, entry: Entry) {
        if self.slots.len() < self.capacity {
            self.slots.push(entry);
        } else {
            self.slots[self.start] = entry;
            self.start = (self.start + 1) % self.capacity;
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Entry> + '_ {
        self.slots[self.start..].iter().chain(self.slots[..self.start].iter())
    }

    /// The most recent entry.
    pub fn latest(&self) -> Option<&Entry> {
        let len = self.slots.len();
        if len == 0 {
            return None;
        }
        self.slots.get((self.start + len - 1) % len)
    }

    /// Change capacity, keeping the newest entries.
    ///
    /// Shrinking drops from the oldest end; growing keeps everything.
    pub fn resize(&mut self, capacity: usize) -> Result<()> {
        let capacity = check_window(capacity)?;
        let keep = self.slots.len().min(capacity);
        let skip = self.slots.len() - keep;

        let mut slots = Vec::with_capacity(capacity);
        slots.extend(self.iter().skip(skip).copied());

        self.slots = slots;
        self.start = 0;
        self.capacity = capacity;
        Ok(())
    }

    /// Values normalized to 0-7 for an 8-level sparkline.
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn sparkline(&self) -> Vec<u8> {
        if self.slots.len() < 2 {
            return Vec::new();
        }

        let (min, max) = self.iter().fold((f64::MAX, f64::MIN), |(lo, hi), (r, _)| {
            (lo.min(r.value), hi.max(r.value))
        });
        let range = max - min;

        self.iter()
            .map(|(r, _)| {
                if range <= f64::EPSILON {
                    return 3;
                }
                let normalized = ((r.value - min) / range * 7.0) as u8;
                normalized.min(7)
            })
            .collect()
    }

    /// Change between the last two readings.
    ///
    /// Returns None if there's not enough history.
    pub fn trend(&self) -> Option<f64> {
        let mut newest = self.iter().rev();
        let current = newest.next()?.0.value;
        let previous = newest.next()?.0.value;
        Some(current - previous)
    }
}
