//! Command-line argument parsing.

use clap::Parser;

use crate::params::{PreviewConfig, RenderConfig, WaterParams};
use crate::water::{srgb_hex_to_linear, MAX_GRID_SEGMENTS};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Seaform")]
#[command(about = "Animated procedural water surface with live controls", long_about = None)]
pub struct Args {
    /// Initial window width (logical pixels)
    #[arg(long, value_name = "PIXELS", default_value = "1280")]
    pub width: u32,

    /// Initial window height (logical pixels)
    #[arg(long, value_name = "PIXELS", default_value = "720")]
    pub height: u32,

    /// Grid cells per side of the water mesh (1..=2048)
    #[arg(long, value_name = "COUNT", default_value = "512")]
    pub segments: u32,

    /// Crest color, sRGB hex
    #[arg(long, value_name = "HEX")]
    pub surface_color: Option<String>,

    /// Trough color, sRGB hex
    #[arg(long, value_name = "HEX")]
    pub depth_color: Option<String>,

    /// Seed for the CPU ripple noise (preview only)
    #[arg(long, default_value = "42")]
    pub seed: u32,

    /// Write a top-down PNG of the surface and exit, no window
    #[arg(long, value_name = "PATH")]
    pub preview: Option<String>,

    /// Preview image side length (pixels)
    #[arg(long, value_name = "PIXELS", default_value = "512")]
    pub preview_size: u32,

    /// Time to sample the preview at (seconds)
    #[arg(long, value_name = "SECONDS", default_value = "0")]
    pub preview_time: f32,
}

impl Args {
    /// Starting parameters with any color overrides applied
    pub fn water_params(&self) -> Result<WaterParams, String> {
        let mut params = WaterParams::default();
        if let Some(hex) = &self.surface_color {
            params.surface_color = srgb_hex_to_linear(hex)?;
        }
        if let Some(hex) = &self.depth_color {
            params.depth_color = srgb_hex_to_linear(hex)?;
        }
        Ok(params)
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            window_width: self.width.max(1),
            window_height: self.height.max(1),
            grid_segments: self.segments.clamp(1, MAX_GRID_SEGMENTS),
            ..RenderConfig::default()
        }
    }

    /// Preview settings, when `--preview` was given
    pub fn preview_config(&self) -> Option<PreviewConfig> {
        self.preview.as_ref().map(|path| PreviewConfig {
            size: self.preview_size,
            time_s: self.preview_time,
            noise_seed: self.seed,
            ..PreviewConfig::new(path.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["seaform"]).unwrap();
        let render = args.render_config();
        assert_eq!((render.window_width, render.window_height), (1280, 720));
        assert_eq!(render.grid_segments, 512);
        assert!(args.preview_config().is_none());
        assert_eq!(args.water_params().unwrap(), WaterParams::default());
    }

    #[test]
    fn test_color_overrides() {
        let args = Args::try_parse_from([
            "seaform",
            "--surface-color",
            "#ffffff",
            "--depth-color",
            "000000",
        ])
        .unwrap();
        let params = args.water_params().unwrap();
        assert_eq!(params.surface_color, [1.0, 1.0, 1.0]);
        assert_eq!(params.depth_color, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_bad_color_is_an_error() {
        let args = Args::try_parse_from(["seaform", "--surface-color", "teal"]).unwrap();
        assert!(args.water_params().is_err());
    }

    #[test]
    fn test_preview_flags() {
        let args = Args::try_parse_from([
            "seaform",
            "--preview",
            "out.png",
            "--preview-size",
            "64",
            "--preview-time",
            "2.5",
            "--seed",
            "7",
        ])
        .unwrap();
        let preview = args.preview_config().unwrap();
        assert_eq!(preview.output_path, "out.png");
        assert_eq!(preview.size, 64);
        assert_eq!(preview.time_s, 2.5);
        assert_eq!(preview.noise_seed, 7);
    }

    #[test]
    fn test_window_and_grid_flags() {
        let args =
            Args::try_parse_from(["seaform", "--width", "800", "--height", "600", "--segments", "0"])
                .unwrap();
        let render = args.render_config();
        assert_eq!((render.window_width, render.window_height), (800, 600));
        assert_eq!(render.grid_segments, 1);
    }

    #[test]
    fn test_segments_capped_to_buffer_limits() {
        let args = Args::try_parse_from(["seaform", "--segments", "100000"]).unwrap();
        assert_eq!(args.render_config().grid_segments, MAX_GRID_SEGMENTS);
    }
}
