use std::collections::VecDeque;
use std::time::{Duration, Instant};

use hazeframe_fog::TimeUniform;

use crate::renderer::{RenderView, Renderer};
use crate::scene::Scene;

/// Rolling window of recent frame durations.
#[derive(Debug, Clone)]
pub struct FrameStats {
    window: VecDeque<Duration>,
    capacity: usize,
}

impl FrameStats {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(dt);
    }

    pub fn count(&self) -> usize {
        self.window.len()
    }

    pub fn average(&self) -> Duration {
        if self.window.is_empty() {
            return Duration::ZERO;
        }
        self.window.iter().sum::<Duration>() / self.window.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.window.iter().copied().max().unwrap_or_default()
    }

    pub fn min(&self) -> Duration {
        self.window.iter().copied().min().unwrap_or_default()
    }
}

/// Drives frames: advances the time uniform, then renders with it.
///
/// The clock always moves before any field is evaluated for the frame, so
/// every fragment of a frame sees the same time.
#[derive(Debug)]
pub struct FrameLoop {
    clock: TimeUniform,
    stats: FrameStats,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(120)
    }
}

impl FrameLoop {
    pub fn new(stats_capacity: usize) -> Self {
        Self {
            clock: TimeUniform::new(),
            stats: FrameStats::new(stats_capacity),
        }
    }

    pub fn clock(&self) -> &TimeUniform {
        &self.clock
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Advance time by `dt` seconds and render one frame.
    pub fn run_frame<R: Renderer>(
        &mut self,
        renderer: &R,
        scene: &Scene,
        view: &RenderView,
        dt: f32,
    ) -> R::Output {
        let time = self.clock.advance(dt);
        let _span = tracing::info_span!("frame", frame = self.clock.frame(), time).entered();
        let start = Instant::now();

        let output = renderer.render(scene, view, time);

        let elapsed = start.elapsed();
        self.stats.record(elapsed);
        tracing::trace!(?elapsed, "frame complete");
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneConfig;

    /// Echoes the time each render call observed.
    struct TimeProbe;

    impl Renderer for TimeProbe {
        type Output = f32;

        fn render(&self, _scene: &Scene, _view: &RenderView, time: f32) -> f32 {
            time
        }
    }

    #[test]
    fn stats_track_window() {
        let mut stats = FrameStats::new(3);
        stats.record(Duration::from_millis(10));
        stats.record(Duration::from_millis(20));
        stats.record(Duration::from_millis(30));

        assert_eq!(stats.count(), 3);
        assert_eq!(stats.average(), Duration::from_millis(20));
        assert_eq!(stats.max(), Duration::from_millis(30));
        assert_eq!(stats.min(), Duration::from_millis(10));
    }

    #[test]
    fn stats_drop_oldest() {
        let mut stats = FrameStats::new(2);
        stats.record(Duration::from_millis(10));
        stats.record(Duration::from_millis(20));
        stats.record(Duration::from_millis(30));

        assert_eq!(stats.count(), 2);
        assert_eq!(stats.average(), Duration::from_millis(25));
        assert_eq!(stats.min(), Duration::from_millis(20));
    }

    #[test]
    fn empty_stats_are_zero() {
        let stats = FrameStats::new(0);
        assert_eq!(stats.count(), 0);
        assert_eq!(stats.average(), Duration::ZERO);
    }

    #[test]
    fn time_advances_before_render() {
        let scene = Scene::new(SceneConfig::default()).unwrap();
        let view = RenderView::default();
        let mut frames = FrameLoop::new(8);

        let t1 = frames.run_frame(&TimeProbe, &scene, &view, 0.5);
        let t2 = frames.run_frame(&TimeProbe, &scene, &view, 0.5);
        assert_eq!(t1, 0.5);
        assert_eq!(t2, 1.0);
        assert_eq!(frames.clock().frame(), 2);
        assert_eq!(frames.stats().count(), 2);
    }

    #[test]
    fn time_is_monotonic_across_bad_deltas() {
        let scene = Scene::new(SceneConfig::default()).unwrap();
        let view = RenderView::default();
        let mut frames = FrameLoop::default();

        let mut prev = 0.0;
        for dt in [0.016, -1.0, 0.016, f32::NAN, 0.033] {
            let t = frames.run_frame(&TimeProbe, &scene, &view, dt);
            assert!(t >= prev);
            prev = t;
        }
    }
}
