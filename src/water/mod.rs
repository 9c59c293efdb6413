//! Water surface: rest geometry plus the wave and color models it is shaded with.

mod color;
mod mesh;
mod wave;

// Re-export public types
pub use color::{
    depth_color, lerp, linear_to_srgb8, mix_factor, srgb8_to_linear, srgb_hex_to_linear,
};
pub use mesh::{SurfaceGrid, Vertex, MAX_GRID_SEGMENTS};
pub use wave::{large_wave, WaveModel, OCTAVE_GAIN, OCTAVE_LACUNARITY};
