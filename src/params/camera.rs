//! Orbit camera configuration.

/// Orbit controls parameters
#[derive(Debug, Clone)]
pub struct OrbitConfig {
    /// Starting eye position (world units)
    pub eye: [f32; 3],

    /// Point the camera orbits around (world units)
    pub target: [f32; 3],

    /// Fraction of the pending rotation applied per frame (0..1).
    /// Small values give a long, smooth glide after the mouse is released.
    pub damping_factor: f32,

    /// Rotation multiplier; 1.0 = a full drag across the viewport height is one turn
    pub rotate_speed: f32,

    /// Zoom multiplier per wheel step
    pub zoom_speed: f32,

    /// Closest allowed distance to the target (world units)
    pub min_distance: f32,

    /// Farthest allowed distance to the target (world units)
    pub max_distance: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            eye: [1.0, 1.0, 1.0],
            target: [0.0, 0.0, 0.0],
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.1,
            max_distance: 50.0,
        }
    }
}
