//! Animation clock and the per-frame render loop.
//!
//! The loop owns the clock and the scene (camera + viewport). Each tick reads
//! the time, freezes the parameters into a uniform snapshot, moves the camera,
//! hands the snapshot to the frame target and asks the host for another frame.

use std::collections::VecDeque;
use std::time::Instant;

use crate::camera::OrbitCamera;
use crate::params::WaterParams;
use crate::rendering::WaterUniforms;
use crate::viewport::{RenderSize, Viewport};

/// Frames kept in the rolling frame-rate window
const FPS_WINDOW: usize = 60;

/// Seconds between frame-rate log lines
const FPS_LOG_INTERVAL_S: f64 = 1.0;

/// Monotonic source of elapsed seconds
pub trait Clock {
    fn elapsed_s(&self) -> f64;
}

/// Wall clock started at construction
#[derive(Debug, Clone)]
pub struct WallClock {
    start: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn elapsed_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// No frame rendered yet
    Idle,
    /// Self-rescheduling; `frame` counts frames submitted
    Running { frame: u64 },
}

/// Camera and viewport, owned by the loop and lent out to event handlers
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: OrbitCamera,
    pub viewport: Viewport,
}

impl Scene {
    pub fn new(camera: OrbitCamera, viewport: Viewport) -> Self {
        let mut scene = Self { camera, viewport };
        scene.camera.set_aspect(scene.viewport.aspect());
        scene
    }

    /// Size-change notification. Keeps the camera aspect in step with the window.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f64) -> Option<RenderSize> {
        let render_size = self.viewport.resize(width, height, scale_factor)?;
        self.camera.set_aspect(self.viewport.aspect());
        log::debug!(
            "Viewport {}x{} @ {:.2}x, pixel ratio {:.2}",
            width,
            height,
            scale_factor,
            self.viewport.pixel_ratio()
        );
        Some(render_size)
    }
}

/// Where a frame goes: the GPU in the app, a recorder in tests
pub trait FrameTarget {
    type Error;

    /// Submit one frame rendered from this snapshot
    fn draw(&mut self, uniforms: &WaterUniforms) -> Result<(), Self::Error>;

    /// Ask the host to call back for the next frame
    fn schedule_next(&mut self);
}

/// Rolling frame-rate statistics over the last [`FPS_WINDOW`] frames
#[derive(Debug, Clone)]
pub struct FpsTracker {
    frame_times: VecDeque<f64>,
    last_frame_s: Option<f64>,
    last_log_s: f64,
    min_fps: f32,
    max_fps: f32,
}

impl FpsTracker {
    pub fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(FPS_WINDOW + 1),
            last_frame_s: None,
            last_log_s: 0.0,
            min_fps: f32::MAX,
            max_fps: 0.0,
        }
    }

    /// Record a frame at clock time `now_s`
    pub fn record_frame(&mut self, now_s: f64) {
        let Some(last) = self.last_frame_s.replace(now_s) else {
            self.last_log_s = now_s;
            return;
        };

        self.frame_times.push_back((now_s - last).max(0.0));
        if self.frame_times.len() > FPS_WINDOW {
            self.frame_times.pop_front();
        }

        let current = self.current_fps();
        if current > 0.0 {
            self.min_fps = self.min_fps.min(current);
            self.max_fps = self.max_fps.max(current);
        }

        if now_s - self.last_log_s >= FPS_LOG_INTERVAL_S {
            let (min, avg, max) = self.stats();
            log::debug!("FPS - Min: {:.1}, Avg: {:.1}, Max: {:.1}", min, avg, max);
            self.last_log_s = now_s;
        }
    }

    pub fn current_fps(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }

        let total: f64 = self.frame_times.iter().sum();
        let avg_frame_time = total / self.frame_times.len() as f64;

        if avg_frame_time > 0.0 {
            (1.0 / avg_frame_time) as f32
        } else {
            0.0
        }
    }

    /// (min, average, max) frames per second
    pub fn stats(&self) -> (f32, f32, f32) {
        let min = if self.min_fps == f32::MAX {
            0.0
        } else {
            self.min_fps
        };
        (min, self.current_fps(), self.max_fps)
    }
}

impl Default for FpsTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the animation clock and drives one frame per host callback
pub struct RenderLoop<C: Clock = WallClock> {
    clock: C,
    scene: Scene,
    state: LoopState,
    fps: FpsTracker,
}

impl<C: Clock> RenderLoop<C> {
    pub fn new(clock: C, scene: Scene) -> Self {
        Self {
            clock,
            scene,
            state: LoopState::Idle,
            fps: FpsTracker::new(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn fps(&self) -> &FpsTracker {
        &self.fps
    }

    /// Run one frame.
    ///
    /// The returned snapshot is what was drawn. The next frame is scheduled
    /// even when drawing fails, so a dropped frame never stalls the loop.
    pub fn tick<T: FrameTarget>(
        &mut self,
        params: &WaterParams,
        target: &mut T,
    ) -> Result<WaterUniforms, T::Error> {
        let now_s = self.clock.elapsed_s();

        self.scene.camera.update();
        let uniforms =
            WaterUniforms::snapshot(params, now_s as f32, self.scene.camera.view_proj());

        let drawn = target.draw(&uniforms);
        target.schedule_next();

        let frame = match self.state {
            LoopState::Idle => 1,
            LoopState::Running { frame } => frame + 1,
        };
        self.state = LoopState::Running { frame };
        self.fps.record_frame(now_s);

        drawn.map(|()| uniforms)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::params::{OrbitConfig, RenderConfig};

    /// Test clock advanced by hand
    #[derive(Clone, Default)]
    struct ManualClock(Rc<Cell<f64>>);

    impl ManualClock {
        fn set(&self, t: f64) {
            self.0.set(t);
        }
    }

    impl Clock for ManualClock {
        fn elapsed_s(&self) -> f64 {
            self.0.get()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Draw(f32),
        Schedule,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
        snapshots: Vec<WaterUniforms>,
        fail_next: bool,
    }

    impl FrameTarget for Recorder {
        type Error = String;

        fn draw(&mut self, uniforms: &WaterUniforms) -> Result<(), String> {
            self.calls.push(Call::Draw(uniforms.time));
            self.snapshots.push(*uniforms);
            if std::mem::take(&mut self.fail_next) {
                return Err("surface lost".to_string());
            }
            Ok(())
        }

        fn schedule_next(&mut self) {
            self.calls.push(Call::Schedule);
        }
    }

    fn scene() -> Scene {
        let render = RenderConfig::default();
        Scene::new(
            OrbitCamera::new(&OrbitConfig::default(), &render),
            Viewport::new(render.window_width, render.window_height, 1.0, render.max_pixel_ratio),
        )
    }

    #[test]
    fn test_starts_idle_then_runs() {
        let clock = ManualClock::default();
        let mut render_loop = RenderLoop::new(clock.clone(), scene());
        let mut target = Recorder::default();
        assert_eq!(render_loop.state(), LoopState::Idle);

        render_loop.tick(&WaterParams::default(), &mut target).unwrap();
        assert_eq!(render_loop.state(), LoopState::Running { frame: 1 });

        clock.set(0.016);
        render_loop.tick(&WaterParams::default(), &mut target).unwrap();
        assert_eq!(render_loop.state(), LoopState::Running { frame: 2 });
    }

    #[test]
    fn test_tick_draws_then_schedules() {
        let clock = ManualClock::default();
        let mut render_loop = RenderLoop::new(clock.clone(), scene());
        let mut target = Recorder::default();

        clock.set(1.5);
        render_loop.tick(&WaterParams::default(), &mut target).unwrap();
        clock.set(2.0);
        render_loop.tick(&WaterParams::default(), &mut target).unwrap();

        assert_eq!(
            target.calls,
            vec![
                Call::Draw(1.5),
                Call::Schedule,
                Call::Draw(2.0),
                Call::Schedule
            ]
        );
    }

    #[test]
    fn test_edits_show_up_next_frame() {
        let clock = ManualClock::default();
        let mut render_loop = RenderLoop::new(clock, scene());
        let mut target = Recorder::default();
        let mut params = WaterParams::default();

        let first = render_loop.tick(&params, &mut target).unwrap();
        params.amplitude = 0.75;
        params.noise_iterations = 0;
        let second = render_loop.tick(&params, &mut target).unwrap();

        assert_eq!(first.amplitude, 0.2);
        assert_eq!(second.amplitude, 0.75);
        assert_eq!(second.noise_iterations, 0);
        assert_eq!(target.snapshots[1], second);
    }

    #[test]
    fn test_failed_draw_still_schedules() {
        let clock = ManualClock::default();
        let mut render_loop = RenderLoop::new(clock, scene());
        let mut target = Recorder {
            fail_next: true,
            ..Recorder::default()
        };

        let result = render_loop.tick(&WaterParams::default(), &mut target);
        assert!(result.is_err());
        assert_eq!(target.calls.last(), Some(&Call::Schedule));
        assert_eq!(render_loop.state(), LoopState::Running { frame: 1 });

        assert!(render_loop.tick(&WaterParams::default(), &mut target).is_ok());
    }

    #[test]
    fn test_camera_glides_across_ticks() {
        let clock = ManualClock::default();
        let mut render_loop = RenderLoop::new(clock, scene());
        let mut target = Recorder::default();

        render_loop.scene_mut().camera.rotate(200.0, 0.0, 720.0);
        let a = render_loop.tick(&WaterParams::default(), &mut target).unwrap();
        let b = render_loop.tick(&WaterParams::default(), &mut target).unwrap();
        assert_ne!(a.view_proj, b.view_proj);
    }

    #[test]
    fn test_scene_resize_updates_camera_aspect() {
        let mut scene = scene();
        let size = scene.resize(1000, 500, 1.0);
        assert!(size.is_some());
        assert!((scene.camera.aspect() - 2.0).abs() < 1e-6);

        assert_eq!(scene.resize(1000, 500, 1.0), None);
        assert_eq!(scene.resize(0, 0, 1.0), None);
        assert!((scene.camera.aspect() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_fps_tracker_average() {
        let mut fps = FpsTracker::new();
        assert_eq!(fps.current_fps(), 0.0);

        for i in 0..=120 {
            fps.record_frame(i as f64 / 60.0);
        }
        assert!((fps.current_fps() - 60.0).abs() < 0.1);

        let (min, avg, max) = fps.stats();
        assert!(min <= avg && avg <= max);
    }
}
