//! Window size tracking: camera aspect and scene render resolution.

/// Scene render target size (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSize {
    pub width: u32,
    pub height: u32,
}

/// Window dimensions and the resolution the scene is rendered at.
///
/// The scene renders at `logical size * min(scale_factor, max_pixel_ratio)`,
/// so displays denser than the cap get a cheaper, upscaled scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    scale_factor: f64,
    max_pixel_ratio: f32,
    pixel_ratio: f32,
    render_size: RenderSize,
}

impl Viewport {
    /// Create from the window's physical size and scale factor
    pub fn new(width: u32, height: u32, scale_factor: f64, max_pixel_ratio: f32) -> Self {
        let mut viewport = Self {
            width: 0,
            height: 0,
            scale_factor: 0.0,
            max_pixel_ratio,
            pixel_ratio: 1.0,
            render_size: RenderSize {
                width: 1,
                height: 1,
            },
        };
        viewport.resize(width.max(1), height.max(1), scale_factor);
        viewport
    }

    /// Apply a size-change notification (physical pixels).
    ///
    /// Returns the new render size when anything changed, `None` when the
    /// dimensions are unchanged or zero (minimized window).
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f64) -> Option<RenderSize> {
        if width == 0 || height == 0 {
            return None;
        }

        let scale_factor = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };

        if width == self.width && height == self.height && scale_factor == self.scale_factor {
            return None;
        }

        let pixel_ratio = (scale_factor as f32).min(self.max_pixel_ratio.max(f32::MIN_POSITIVE));
        let to_render = |physical: u32| {
            let logical = physical as f64 / scale_factor;
            ((logical * pixel_ratio as f64).round() as u32).max(1)
        };

        self.width = width;
        self.height = height;
        self.scale_factor = scale_factor;
        self.pixel_ratio = pixel_ratio;
        self.render_size = RenderSize {
            width: to_render(width),
            height: to_render(height),
        };

        Some(self.render_size)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn render_size(&self) -> RenderSize {
        self.render_size
    }

    /// Window size in physical pixels
    pub fn window_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_and_render_size_at_low_density() {
        let viewport = Viewport::new(1280, 720, 1.0, 2.0);
        assert!((viewport.aspect() - 1280.0 / 720.0).abs() < 1e-6);
        assert_eq!(viewport.pixel_ratio(), 1.0);
        assert_eq!(
            viewport.render_size(),
            RenderSize {
                width: 1280,
                height: 720
            }
        );
    }

    #[test]
    fn test_pixel_ratio_capped_at_two() {
        // 3x display: 1000x600 logical
        let viewport = Viewport::new(3000, 1800, 3.0, 2.0);
        assert_eq!(viewport.pixel_ratio(), 2.0);
        assert_eq!(
            viewport.render_size(),
            RenderSize {
                width: 2000,
                height: 1200
            }
        );
        assert_eq!(viewport.window_size(), (3000, 1800));
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut viewport = Viewport::new(800, 600, 1.0, 2.0);
        let first = viewport.resize(1024, 768, 2.0);
        assert!(first.is_some());
        let snapshot = viewport.clone();

        assert_eq!(viewport.resize(1024, 768, 2.0), None);
        assert_eq!(viewport, snapshot);
    }

    #[test]
    fn test_zero_size_ignored() {
        let mut viewport = Viewport::new(800, 600, 1.0, 2.0);
        let before = viewport.clone();
        assert_eq!(viewport.resize(0, 600, 1.0), None);
        assert_eq!(viewport.resize(800, 0, 1.0), None);
        assert_eq!(viewport, before);
    }

    #[test]
    fn test_scale_change_alone_updates_resolution() {
        let mut viewport = Viewport::new(2400, 1600, 2.0, 2.0);
        let size = viewport.resize(2400, 1600, 3.0).unwrap();
        assert_eq!(
            size,
            RenderSize {
                width: 1600,
                height: 1067
            }
        );
    }
}
