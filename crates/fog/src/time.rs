/// Anything that can report the current shading time in seconds.
pub trait TimeSource {
    fn now(&self) -> f32;
}

impl<F: Fn() -> f32> TimeSource for F {
    fn now(&self) -> f32 {
        self()
    }
}

/// Frame time uniform. Advanced once per frame by the render loop, read by
/// every field evaluation of that frame. Never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeUniform {
    seconds: f32,
    frame: u64,
}

impl TimeUniform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seconds(&self) -> f32 {
        self.seconds
    }

    /// Number of frames advanced so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advance by a frame delta. Negative or non-finite deltas count as a
    /// frame but leave the clock where it was.
    pub fn advance(&mut self, dt: f32) -> f32 {
        if dt.is_finite() && dt >= 0.0 {
            self.seconds += dt;
        } else {
            tracing::warn!(dt, "ignoring invalid frame delta");
        }
        self.frame += 1;
        self.seconds
    }

    /// Jump to an absolute time. Earlier values are ignored.
    pub fn set(&mut self, seconds: f32) -> f32 {
        if seconds.is_finite() && seconds >= self.seconds {
            self.seconds = seconds;
        } else {
            tracing::warn!(seconds, current = self.seconds, "ignoring non-monotonic time");
        }
        self.frame += 1;
        self.seconds
    }
}

impl TimeSource for TimeUniform {
    fn now(&self) -> f32 {
        self.seconds
    }
}
