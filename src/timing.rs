//! Frame timing: per-frame delta, FPS counter and the fixed-step accumulator.

/// Length of the window over which frames are counted for the FPS value.
pub const FPS_WINDOW: f64 = 0.5;

/// Delta handed to the very first frame, before a previous timestamp exists.
pub const FIRST_FRAME_DELTA: f64 = 0.02;

/// Tracks frame timestamps in seconds.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    previous: Option<f64>,
    current: f64,
    delta: f64,
    frames: u64,
    window_frames: u32,
    window_time: f64,
    fps: u32,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            previous: None,
            current: 0.0,
            delta: 0.0,
            frames: 0,
            window_frames: 0,
            window_time: 0.0,
            fps: 0,
        }
    }

    /// Advances to `now` and returns the time elapsed since the previous tick.
    ///
    /// Returns `Some(fps)` in the second slot whenever the FPS value was
    /// recomputed during this tick.
    pub fn tick(&mut self, now: f64) -> (f64, Option<u32>) {
        let previous = self.previous.unwrap_or(now - FIRST_FRAME_DELTA);
        self.previous = Some(now);
        self.current = now;
        // Clocks are monotonic but test code may feed anything
        self.delta = (now - previous).max(0.0);
        self.frames += 1;
        self.window_frames += 1;
        self.window_time += self.delta;

        let mut updated = None;
        if self.window_time >= FPS_WINDOW {
            self.window_time -= FPS_WINDOW;
            self.fps = (self.window_frames as f64 / FPS_WINDOW) as u32;
            self.window_frames = 0;
            updated = Some(self.fps);
        }
        (self.delta, updated)
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Timestamp of the latest tick.
    pub fn time(&self) -> f64 {
        self.current
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed update interval used when none or an unusable one is configured.
pub const DEFAULT_FIXED_STEP: f64 = 1.0 / 60.0;

/// Returns `step` if it is a usable interval, otherwise warns and falls back
/// to [`DEFAULT_FIXED_STEP`].
pub fn checked_step(step: f64) -> f64 {
    if step.is_finite() && step > 0.0 {
        step
    } else {
        log::warn!("Fixed step {step} is not a positive duration, using {DEFAULT_FIXED_STEP}");
        DEFAULT_FIXED_STEP
    }
}

/// Accumulates frame time and tells how many fixed steps are due.
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: f64,
    accumulator: f64,
    max_steps: u32,
}

impl FixedStep {
    pub fn new(step: f64, max_steps: u32) -> Self {
        Self {
            step: checked_step(step),
            accumulator: 0.0,
            max_steps: max_steps.max(1),
        }
    }

    /// Adds `delta` and returns how many steps should run this frame.
    ///
    /// Each returned step has already been subtracted from the accumulator.
    /// If more than `max_steps` are due the surplus time is dropped so a slow
    /// frame cannot snowball into ever longer catch-up phases.
    pub fn accumulate(&mut self, delta: f64) -> u32 {
        if !(delta.is_finite() && delta > 0.0) {
            return 0;
        }
        self.accumulator += delta;

        let mut steps = 0;
        while self.accumulator >= self.step {
            if steps == self.max_steps {
                let dropped = self.accumulator - self.accumulator % self.step;
                log::warn!(
                    "Fixed update is {:.1} ms behind, skipping {} steps",
                    dropped * 1000.0,
                    (dropped / self.step) as u32
                );
                self.accumulator %= self.step;
                break;
            }
            self.accumulator -= self.step;
            steps += 1;
        }
        steps
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Time carried over to the next frame.
    pub fn residual(&self) -> f64 {
        self.accumulator
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_STEP, 5)
    }
}
