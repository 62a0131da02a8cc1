//! Frame timing gate.
//!
//! Coalesces per-frame ticks into one rate sample per reporting interval so
//! the graph moves at a readable pace instead of once per frame.

use serde::{Deserialize, Serialize};

/// One reported throughput measurement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Frames per second over the elapsed interval, rounded.
    pub fps: f64,
    /// Clock reading at which the sample was taken.
    pub timestamp_ms: f64,
}

/// Accumulates frames between flushes. Timestamps are supplied by the caller.
#[derive(Clone, Debug)]
pub struct TimingGate {
    min_report_interval_ms: f64,
    last_flush_ms: f64,
    frame_start_ms: Option<f64>,
    frames: u32,
    last_frame_ms: f64,
}

impl TimingGate {
    /// Start a gate whose first interval begins at `now_ms`.
    pub fn new(min_report_interval_ms: f64, now_ms: f64) -> Self {
        Self {
            min_report_interval_ms,
            last_flush_ms: now_ms,
            frame_start_ms: None,
            frames: 0,
            last_frame_ms: 0.0,
        }
    }

    #[inline]
    pub fn begin_frame(&mut self, now_ms: f64) {
        self.frame_start_ms = Some(now_ms);
    }

    /// Count one frame and flush a sample once the interval has elapsed.
    pub fn end_frame(&mut self, now_ms: f64) -> Option<Sample> {
        self.frames += 1;

        if let Some(start) = self.frame_start_ms.take() {
            self.last_frame_ms = (now_ms - start).max(0.0);
        }

        let elapsed = now_ms - self.last_flush_ms;
        if elapsed < 0.0 {
            log::warn!(
                "clock went backwards by {:.3} ms; holding the current interval",
                -elapsed
            );
        }
        if elapsed < self.min_report_interval_ms {
            return None;
        }

        let fps = (f64::from(self.frames) * 1000.0 / elapsed.max(1.0)).round();
        self.frames = 0;
        self.last_flush_ms = now_ms;

        Some(Sample {
            fps,
            timestamp_ms: now_ms,
        })
    }

    pub fn min_report_interval_ms(&self) -> f64 {
        self.min_report_interval_ms
    }

    /// Frames counted since the last flush.
    pub fn pending_frames(&self) -> u32 {
        self.frames
    }

    /// Duration of the most recent `begin_frame`/`end_frame` pair.
    pub fn last_frame_ms(&self) -> f64 {
        self.last_frame_ms
    }
}
