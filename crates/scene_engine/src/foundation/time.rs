//! Time management utilities
//!
//! The scene consumes frame deltas in milliseconds, so the frame timer
//! reports milliseconds as well.

use std::time::{Duration, Instant};

/// Wall-clock frame timer
pub struct FrameTimer {
    last_frame: Instant,
    delta_ms: f32,
    total_ms: f64,
    frame_count: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_ms: 0.0,
            total_ms: 0.0,
            frame_count: 0,
        }
    }

    /// Advance the timer; call once per frame before updating the scene
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.advance(elapsed);
        self.last_frame = now;
        self.delta_ms
    }

    /// Advance the timer by a fixed amount instead of reading the clock
    pub fn advance(&mut self, elapsed: Duration) {
        self.delta_ms = elapsed.as_secs_f32() * 1000.0;
        self.total_ms += f64::from(self.delta_ms);
        self.frame_count += 1;
    }

    /// Time since the last frame in milliseconds
    pub fn delta_ms(&self) -> f32 {
        self.delta_ms
    }

    /// Total elapsed time in milliseconds
    pub fn total_ms(&self) -> f64 {
        self.total_ms
    }

    /// Number of frames ticked so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average frames per second since the timer was created
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f64 {
        if self.total_ms > 0.0 {
            self.frame_count as f64 / (self.total_ms / 1000.0)
        } else {
            0.0
        }
    }
}

/// Simple stopwatch for measuring elapsed time
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time.take() {
            self.elapsed += start.elapsed();
        }
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let running = self.start_time.map_or(Duration::ZERO, |start| start.elapsed());
        self.elapsed + running
    }

    /// Get the elapsed time in seconds
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }
}
