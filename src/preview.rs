//! Headless preview: the water seen straight from above, evaluated on the CPU.

use image::{Rgb, RgbImage};

use crate::params::{PreviewConfig, WaterParams};
use crate::water::{depth_color, linear_to_srgb8, WaveModel};

/// Rest position (world units) sampled by pixel `i` along one axis
fn pixel_to_world(i: u32, size: u32, extent: f32) -> f32 {
    ((i as f32 + 0.5) / size as f32 - 0.5) * extent
}

/// Render the surface color at `config.time_s`, one sample per pixel.
/// Image x runs along world X, image y along world Z.
pub fn render_preview(config: &PreviewConfig, params: &WaterParams) -> RgbImage {
    let model = WaveModel::new(config.noise_seed);
    let size = config.size.max(1);

    RgbImage::from_fn(size, size, |px, py| {
        let x = pixel_to_world(px, size, config.surface_extent);
        let z = pixel_to_world(py, size, config.surface_extent);
        let h = model.height(x, z, config.time_s, params);
        Rgb(linear_to_srgb8(depth_color(h, params)))
    })
}

/// Render and save as PNG
pub fn write_preview(config: &PreviewConfig, params: &WaterParams) -> Result<(), String> {
    let image = render_preview(config, params);
    image
        .save_with_format(&config.output_path, image::ImageFormat::Png)
        .map_err(|e| format!("Failed to write preview '{}': {}", config.output_path, e))?;

    log::info!(
        "Wrote {}x{} preview at t={:.2}s to {}",
        image.width(),
        image.height(),
        config.time_s,
        config.output_path
    );
    Ok(())
}
