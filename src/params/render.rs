//! Rendering and preview configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Initial window width (logical pixels)
    pub window_width: u32,

    /// Initial window height (logical pixels)
    pub window_height: u32,

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (world units)
    pub near_plane: f32,

    /// Far clipping plane (world units)
    pub far_plane: f32,

    /// Grid cells per side; the mesh has (segments + 1)^2 vertices
    pub grid_segments: u32,

    /// Side length of the square water surface (world units)
    pub surface_extent: f32,

    /// Upper bound on device pixels per logical pixel for the scene target.
    /// High-density displays above this render at reduced resolution.
    pub max_pixel_ratio: f32,

    /// Background color, linear RGB
    pub clear_color: [f64; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fov_degrees: 75.0,
            near_plane: 0.1,
            far_plane: 100.0,
            grid_segments: 512, // 263,169 vertices
            surface_extent: 2.0,
            max_pixel_ratio: 2.0,
            clear_color: [0.0, 0.0, 0.0],
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }
}

/// Headless preview configuration (CPU-rendered top-down image)
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Output PNG path
    pub output_path: String,

    /// Image side length (pixels)
    pub size: u32,

    /// Elapsed time to sample the surface at (seconds)
    pub time_s: f32,

    /// Perlin seed for the CPU ripple field
    pub noise_seed: u32,

    /// Side length of the sampled surface (world units)
    pub surface_extent: f32,
}

impl PreviewConfig {
    pub fn new(output_path: impl Into<String>) -> Self {
        Self {
            output_path: output_path.into(),
            size: 512,
            time_s: 0.0,
            noise_seed: 42,
            surface_extent: 2.0,
        }
    }
}
