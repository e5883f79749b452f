use std::time::Duration;

use super::frame_clock::FrameTime;

/// Smoothed frames-per-second / frame-time counter for on-screen stats.
///
/// Averages over a fixed window rather than reporting instantaneous values,
/// which are too jittery to read in an overlay.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: Duration,
    accumulated: Duration,
    frames: u32,

    fps: f32,
    frame_time_ms: f32,
}

impl FpsCounter {
    /// Creates a counter with a half-second averaging window.
    pub fn new() -> Self {
        Self::with_window(Duration::from_millis(500))
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            accumulated: Duration::ZERO,
            frames: 0,
            fps: 0.0,
            frame_time_ms: 0.0,
        }
    }

    /// Feeds one frame tick into the averaging window.
    pub fn update(&mut self, ft: &FrameTime) {
        self.accumulated += Duration::from_secs_f32(ft.dt);
        self.frames += 1;

        if self.accumulated >= self.window && self.frames > 0 {
            let secs = self.accumulated.as_secs_f32();
            self.fps = self.frames as f32 / secs;
            self.frame_time_ms = secs * 1000.0 / self.frames as f32;

            self.accumulated = Duration::ZERO;
            self.frames = 0;
        }
    }

    /// Smoothed frames per second.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Smoothed frame time in milliseconds.
    pub fn frame_time_ms(&self) -> f32 {
        self.frame_time_ms
    }

    /// Frame time formatted for the debug overlay, e.g. `"16.67ms"`.
    pub fn frame_time_str(&self) -> String {
        format!("{:.2}ms", self.frame_time_ms)
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn tick(dt: f32, index: u64) -> FrameTime {
        FrameTime {
            dt,
            now: Instant::now(),
            frame_index: index,
        }
    }

    #[test]
    fn averages_over_window() {
        let mut counter = FpsCounter::with_window(Duration::from_millis(100));

        // 10 frames at 16ms crosses the 100ms window.
        for i in 0..10 {
            counter.update(&tick(0.016, i));
        }

        assert!((counter.frame_time_ms() - 16.0).abs() < 0.5);
        assert!((counter.fps() - 62.5).abs() < 2.0);
    }

    #[test]
    fn frame_time_str_has_two_decimals() {
        let mut counter = FpsCounter::with_window(Duration::from_millis(1));
        counter.update(&tick(0.01234, 0));

        assert_eq!(counter.frame_time_str(), "12.34ms");
    }
}
