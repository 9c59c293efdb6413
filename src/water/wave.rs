//! CPU reference of the wave displacement model.
//!
//! The vertex stage of `water.wgsl` evaluates the same two layers on the GPU:
//! - Big waves: a separable product of sines. This is a stylized look, not a
//!   Gerstner or other physically based traveling wave.
//! - Small waves: fractal Brownian motion over a coherent noise field.
//!
//! The CPU side samples `noise::Perlin`, the shader carries its own gradient
//! noise, so ripple detail has the same character but not identical values.

use noise::{NoiseFn, Perlin};

use crate::params::WaterParams;

/// Frequency multiplier between successive fbm octaves
pub const OCTAVE_LACUNARITY: f32 = 2.0;

/// Amplitude multiplier between successive fbm octaves
pub const OCTAVE_GAIN: f32 = 0.5;

/// Large-scale wave height at rest position (x, z)
pub fn large_wave(x: f32, z: f32, time_s: f32, params: &WaterParams) -> f32 {
    let phase = time_s * params.speed;
    params.amplitude
        * (x * params.frequency[0] + phase).sin()
        * (z * params.frequency[1] + phase).sin()
}

/// Wave displacement model over a coherent noise field
pub struct WaveModel<N = Perlin> {
    noise: N,
}

impl WaveModel<Perlin> {
    /// Create a model backed by seeded Perlin noise
    pub fn new(seed: u32) -> Self {
        Self {
            noise: Perlin::new(seed),
        }
    }
}

impl<N: NoiseFn<f64, 3>> WaveModel<N> {
    /// Wrap an arbitrary 3D noise field
    pub fn with_noise(noise: N) -> Self {
        Self { noise }
    }

    /// Summed noise octaves, before scaling by `noise_amplitude`.
    ///
    /// Octave `i` samples at `noise_frequency * 2^i` with weight `0.5^i`;
    /// every octave shares the time coordinate `time_s * noise_speed`.
    pub fn fbm(&self, x: f32, z: f32, time_s: f32, params: &WaterParams) -> f32 {
        let t = (time_s * params.noise_speed) as f64;
        let mut frequency = params.noise_frequency;
        let mut weight = 1.0;
        let mut sum = 0.0;

        for _ in 0..params.noise_iterations {
            let sample = self
                .noise
                .get([(x * frequency) as f64, (z * frequency) as f64, t]) as f32;
            sum += sample * weight;
            frequency *= OCTAVE_LACUNARITY;
            weight *= OCTAVE_GAIN;
        }

        sum
    }

    /// Fine ripple height; exactly zero when `noise_iterations` is 0
    pub fn fine_ripple(&self, x: f32, z: f32, time_s: f32, params: &WaterParams) -> f32 {
        if params.noise_iterations == 0 {
            return 0.0;
        }
        params.noise_amplitude * self.fbm(x, z, time_s, params)
    }

    /// Total vertical displacement at rest position (x, z)
    pub fn height(&self, x: f32, z: f32, time_s: f32, params: &WaterParams) -> f32 {
        large_wave(x, z, time_s, params) + self.fine_ripple(x, z, time_s, params)
    }
}
