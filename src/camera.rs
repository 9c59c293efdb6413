//! Orbit camera with damped rotation, driven by mouse input.

use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::params::{OrbitConfig, RenderConfig};

/// Keeps the polar angle off the poles so `look_at` never degenerates
const POLE_EPSILON: f32 = 1e-4;

/// Zoom factor per wheel line at zoom speed 1
const ZOOM_BASE: f32 = 0.95;

/// Pixels of trackpad scroll treated as one wheel line
const PIXELS_PER_LINE: f32 = 40.0;

/// Camera orbiting a target on a sphere
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    target: Vec3,
    radius: f32,
    /// Azimuth around +Y, measured from +Z toward +X
    theta: f32,
    /// Polar angle from +Y
    phi: f32,

    // Input not yet applied; rotation decays with damping
    pending_theta: f32,
    pending_phi: f32,
    pending_scale: f32,

    config: OrbitConfig,
    fov_y_radians: f32,
    aspect: f32,
    near: f32,
    far: f32,
}

impl OrbitCamera {
    pub fn new(orbit: &OrbitConfig, render: &RenderConfig) -> Self {
        let target = Vec3::from_array(orbit.target);
        let offset = Vec3::from_array(orbit.eye) - target;
        let radius = offset
            .length()
            .clamp(orbit.min_distance, orbit.max_distance.max(orbit.min_distance));

        let theta = offset.x.atan2(offset.z);
        let phi = if offset.length() > 0.0 {
            (offset.y / offset.length()).clamp(-1.0, 1.0).acos()
        } else {
            PI / 2.0
        };

        Self {
            target,
            radius,
            theta,
            phi: phi.clamp(POLE_EPSILON, PI - POLE_EPSILON),
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_scale: 1.0,
            config: orbit.clone(),
            fov_y_radians: render.fov_degrees.to_radians(),
            aspect: render.aspect_ratio(),
            near: render.near_plane,
            far: render.far_plane,
        }
    }

    /// Queue a rotation from a mouse drag of (dx, dy) pixels
    pub fn rotate(&mut self, dx_px: f32, dy_px: f32, viewport_height_px: f32) {
        let height = viewport_height_px.max(1.0);
        self.pending_theta -= TAU * dx_px / height * self.config.rotate_speed;
        self.pending_phi -= TAU * dy_px / height * self.config.rotate_speed;
    }

    /// Queue a zoom; positive steps move toward the target
    pub fn zoom(&mut self, steps: f32) {
        let factor = ZOOM_BASE.powf(self.config.zoom_speed * steps.abs());
        if steps > 0.0 {
            self.pending_scale *= factor;
        } else if steps < 0.0 {
            self.pending_scale /= factor;
        }
    }

    /// Apply queued input. Call once per frame.
    pub fn update(&mut self) {
        let damping = if self.config.damping_factor > 0.0 {
            self.config.damping_factor.min(1.0)
        } else {
            1.0
        };

        self.theta += self.pending_theta * damping;
        self.phi = (self.phi + self.pending_phi * damping).clamp(POLE_EPSILON, PI - POLE_EPSILON);
        self.radius = (self.radius * self.pending_scale)
            .min(self.config.max_distance)
            .max(self.config.min_distance);

        self.pending_theta *= 1.0 - damping;
        self.pending_phi *= 1.0 - damping;
        self.pending_scale = 1.0;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        self.target
            + Vec3::new(
                self.radius * sin_phi * sin_theta,
                self.radius * cos_phi,
                self.radius * sin_phi * cos_theta,
            )
    }

    /// Combined projection * view matrix (wgpu clip space, depth 0..1)
    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(self.fov_y_radians, self.aspect, self.near, self.far);
        proj * view
    }
}

/// Mouse state feeding an [`OrbitCamera`]: left drag rotates, wheel zooms
#[derive(Debug, Default)]
pub struct OrbitControls {
    dragging: bool,
    last_cursor: Option<(f32, f32)>,
}

impl OrbitControls {
    /// Route a window event. Events the panel consumed only end a drag.
    pub fn handle_event(
        &mut self,
        event: &WindowEvent,
        consumed_by_panel: bool,
        camera: &mut OrbitCamera,
        viewport_height_px: f32,
    ) {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed if !consumed_by_panel => self.press(),
                ElementState::Pressed => {}
                ElementState::Released => self.release(),
            },
            WindowEvent::CursorMoved { position, .. } => {
                let position = (position.x as f32, position.y as f32);
                if consumed_by_panel {
                    self.last_cursor = Some(position);
                } else {
                    self.cursor_moved(position, camera, viewport_height_px);
                }
            }
            WindowEvent::MouseWheel { delta, .. } if !consumed_by_panel => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                camera.zoom(lines);
            }
            WindowEvent::CursorLeft { .. } => self.release(),
            _ => {}
        }
    }

    pub fn press(&mut self) {
        self.dragging = true;
    }

    pub fn release(&mut self) {
        self.dragging = false;
    }

    pub fn cursor_moved(
        &mut self,
        position: (f32, f32),
        camera: &mut OrbitCamera,
        viewport_height_px: f32,
    ) {
        if let (true, Some(last)) = (self.dragging, self.last_cursor) {
            camera.rotate(
                position.0 - last.0,
                position.1 - last.1,
                viewport_height_px,
            );
        }
        self.last_cursor = Some(position);
    }
}
