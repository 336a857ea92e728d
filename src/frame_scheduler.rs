//! Frame scheduling and timing utilities.
//!
//! Provides portable frame pacing without async/await or platform-specific timers.
//! The caller is responsible for sleeping/waiting between frames.

use embassy_time::{Duration, Instant};
#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::{OutputDriver, Renderer};

/// Default target frame rate (100 FPS).
pub const DEFAULT_FPS: u32 = 100;

/// Frame pacing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    pub frames_per_second: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            frames_per_second: DEFAULT_FPS,
        }
    }
}

impl FrameConfig {
    /// Time budget of one frame
    pub fn frame_duration(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.frames_per_second.max(1)))
    }
}

/// Result of a frame tick operation.
#[derive(Debug, Clone, Copy)]
pub struct FrameResult {
    /// The deadline for the next frame.
    pub next_deadline: Instant,
    /// How long to wait until the next frame (may be zero if behind schedule).
    pub sleep_duration: Duration,
}

/// Portable frame scheduler that manages timing without async.
///
/// This scheduler:
/// - Tracks frame timing with drift correction
/// - Renders one frame and hands it to the strip exactly once
/// - Returns timing info so the caller can sleep appropriately
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = FrameScheduler::new(renderer, driver, FrameConfig::default());
///
/// loop {
///     let result = scheduler.tick(Instant::now());
///     block_for(result.sleep_duration);
/// }
/// ```
pub struct FrameScheduler<
    'a,
    O: OutputDriver,
    const COLUMNS: usize,
    const CELLS: usize,
    const SPARKS: usize,
    const QUEUE: usize,
> {
    output: O,
    renderer: Renderer<'a, COLUMNS, CELLS, SPARKS, QUEUE>,
    next_frame: Instant,
    frame_duration: Duration,
    frames: u32,
}

impl<
    'a,
    O: OutputDriver,
    const COLUMNS: usize,
    const CELLS: usize,
    const SPARKS: usize,
    const QUEUE: usize,
> FrameScheduler<'a, O, COLUMNS, CELLS, SPARKS, QUEUE>
{
    pub fn new(
        renderer: Renderer<'a, COLUMNS, CELLS, SPARKS, QUEUE>,
        driver: O,
        config: FrameConfig,
    ) -> Self {
        Self {
            output: driver,
            renderer,
            next_frame: Instant::from_ticks(0),
            frame_duration: config.frame_duration(),
            frames: 0,
        }
    }

    /// Process one frame and return timing information.
    ///
    /// This method:
    /// 1. Applies drift correction if we've fallen too far behind
    /// 2. Renders the current frame
    /// 3. Writes to the output driver
    /// 4. Returns the deadline for the next frame
    ///
    /// The caller is responsible for waiting until `next_deadline` before
    /// calling `tick` again.
    pub fn tick(&mut self, now: Instant) -> FrameResult {
        // Skip the backlog after a long stall instead of bursting to catch up
        let max_drift = self.frame_duration * 2;
        if now > self.next_frame + max_drift {
            #[cfg(feature = "esp32-log")]
            println!(
                "[FrameScheduler] behind by {}ms, resetting",
                now.duration_since(self.next_frame).as_millis()
            );
            self.next_frame = now;
        }

        let frame = self.renderer.render();
        self.output.write(frame);
        self.frames = self.frames.wrapping_add(1);

        self.next_frame += self.frame_duration;

        let sleep_duration = self
            .next_frame
            .checked_duration_since(now)
            .unwrap_or(Duration::from_ticks(0));

        FrameResult {
            next_deadline: self.next_frame,
            sleep_duration,
        }
    }

    /// Frames rendered so far
    pub const fn frames(&self) -> u32 {
        self.frames
    }

    pub const fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    pub fn renderer(&self) -> &Renderer<'a, COLUMNS, CELLS, SPARKS, QUEUE> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer<'a, COLUMNS, CELLS, SPARKS, QUEUE> {
        &mut self.renderer
    }

    pub fn output(&self) -> &O {
        &self.output
    }
}
