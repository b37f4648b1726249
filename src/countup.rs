//! Eased "count-up" sequence for animating numeric stats.
use std::time::Duration;

/// Interpolated display values from `from` to `to`, one per frame, using an
/// ease-out cubic curve. The first value is `from` and the last is exactly `to`.
#[derive(Debug, Clone)]
pub struct CountUp {
    from:   i64,
    to:     i64,
    frames: u32,
    next:   u32,
}

impl CountUp {
    pub fn new(from: i64, to: i64, duration: Duration, frame: Duration) -> Self {
        let frames = if frame.is_zero() {
            0
        } else {
            (duration.as_nanos() / frame.as_nanos()).min(u128::from(u32::MAX - 1)) as u32
        };
        Self { from, to, frames, next: 0 }
    }

    fn value_at(&self, frame: u32) -> i64 {
        let t = if self.frames == 0 { 1.0 } else { f64::from(frame) / f64::from(self.frames) };
        let eased = 1.0 - (1.0 - t).powi(3);
        (self.from as f64 + (self.to - self.from) as f64 * eased).round() as i64
    }
}

impl Iterator for CountUp {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if self.next > self.frames { return None; }
        let v = self.value_at(self.next);
        self.next += 1;
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.frames + 1).saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for CountUp {}
