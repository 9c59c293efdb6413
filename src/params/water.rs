//! Water surface parameters (the live parameter store) and their slider ranges.

use std::ops::RangeInclusive;

use crate::water::srgb8_to_linear;

/// Every tunable value of the water surface.
///
/// One instance is owned by the application. The control panel writes into
/// it, the render loop copies it into a uniform snapshot once per frame.
/// Values are never validated; out-of-range numbers just look different.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterParams {
    // === Big waves (product of sines) ===
    /// Peak height of the large waves (world units)
    pub amplitude: f32,

    /// Spatial frequency along X and Z (radians per world unit)
    pub frequency: [f32; 2],

    /// Phase speed of the large waves (radians per second)
    pub speed: f32,

    // === Color ===
    /// Color at the crests, linear RGB
    pub surface_color: [f32; 3],

    /// Color in the troughs, linear RGB
    pub depth_color: [f32; 3],

    /// Shifts the height at which the blend crosses from depth to surface
    pub color_offset: f32,

    /// Steepens the blend band; values below 1 wash the gradient out
    pub color_multiplier: f32,

    // === Small waves (fbm ripples) ===
    /// Height of the ripple layer (world units)
    pub noise_amplitude: f32,

    /// Base spatial frequency of the first ripple octave
    pub noise_frequency: f32,

    /// Number of fbm octaves; 0 disables ripples
    pub noise_iterations: u32,

    /// How fast the ripple field evolves (noise units per second)
    pub noise_speed: f32,
}

impl Default for WaterParams {
    fn default() -> Self {
        Self {
            amplitude: 0.2,
            frequency: [3.0, 1.5],
            speed: 0.75,

            surface_color: srgb8_to_linear([0xb8, 0xe9, 0xf5]),
            depth_color: srgb8_to_linear([0x54, 0x8e, 0xac]),
            color_offset: 0.18,
            color_multiplier: 3.7,

            noise_amplitude: 0.15,
            noise_frequency: 3.0,
            noise_iterations: 4,
            noise_speed: 0.2,
        }
    }
}

/// Mutable view of one scalar parameter, as handed to a widget.
pub enum ParamValue<'a> {
    Float(&'a mut f32),
    Count(&'a mut u32),
}

impl WaterParams {
    /// Look up a scalar parameter by its [`ParamRange::key`].
    pub fn value_mut(&mut self, key: &str) -> Option<ParamValue<'_>> {
        let value = match key {
            "amplitude" => ParamValue::Float(&mut self.amplitude),
            "frequency_x" => ParamValue::Float(&mut self.frequency[0]),
            "frequency_y" => ParamValue::Float(&mut self.frequency[1]),
            "speed" => ParamValue::Float(&mut self.speed),
            "color_offset" => ParamValue::Float(&mut self.color_offset),
            "color_multiplier" => ParamValue::Float(&mut self.color_multiplier),
            "noise_amplitude" => ParamValue::Float(&mut self.noise_amplitude),
            "noise_frequency" => ParamValue::Float(&mut self.noise_frequency),
            "noise_iterations" => ParamValue::Count(&mut self.noise_iterations),
            "noise_speed" => ParamValue::Float(&mut self.noise_speed),
            _ => return None,
        };
        Some(value)
    }
}

/// Panel folder a parameter is shown in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamGroup {
    BigWaves,
    Color,
    SmallWaves,
}

impl ParamGroup {
    pub const ALL: [ParamGroup; 3] = [Self::BigWaves, Self::Color, Self::SmallWaves];

    pub fn title(self) -> &'static str {
        match self {
            Self::BigWaves => "Big waves",
            Self::Color => "Color",
            Self::SmallWaves => "Small waves",
        }
    }
}

/// Slider declaration for one scalar parameter.
///
/// Only the widget uses these bounds; the wave and color math accept any value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub key: &'static str,
    pub label: &'static str,
    pub group: ParamGroup,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ParamRange {
    pub fn range(&self) -> RangeInclusive<f32> {
        self.min..=self.max
    }

    /// Clamp and snap a value the user dragged to.
    ///
    /// Decimal steps snap by dividing by a whole number of steps per unit, so
    /// on-grid values (3.0, 0.75, ...) come back bit-identical.
    pub fn clamp(&self, value: f32) -> f32 {
        let value = value as f64;
        let min = self.min as f64;
        let step = self.step as f64;

        let snapped = if step >= 1.0 {
            min + ((value - min) / step).round() * step
        } else if step > 0.0 {
            let steps_per_unit = (1.0 / step).round();
            min + ((value - min) * steps_per_unit).round() / steps_per_unit
        } else {
            value
        };
        (snapped as f32).clamp(self.min, self.max)
    }
}

const fn slider(
    key: &'static str,
    label: &'static str,
    group: ParamGroup,
    min: f32,
    max: f32,
    step: f32,
) -> ParamRange {
    ParamRange {
        key,
        label,
        group,
        min,
        max,
        step,
    }
}

/// Slider table for every scalar parameter, in panel order
pub const PARAM_RANGES: &[ParamRange] = &[
    slider("amplitude", "Big amplitude", ParamGroup::BigWaves, 0.0, 1.0, 0.001),
    slider("frequency_x", "Big frequency X", ParamGroup::BigWaves, 0.0, 10.0, 0.001),
    slider("frequency_y", "Big frequency Y", ParamGroup::BigWaves, 0.0, 10.0, 0.001),
    slider("speed", "Big speed", ParamGroup::BigWaves, 0.0, 4.0, 0.001),
    slider("color_offset", "Offset", ParamGroup::Color, 0.0, 1.0, 0.001),
    slider("color_multiplier", "Multiplier", ParamGroup::Color, 1.0, 10.0, 0.001),
    slider("noise_amplitude", "Small amplitude", ParamGroup::SmallWaves, 0.0, 1.0, 0.001),
    slider("noise_frequency", "Small frequency", ParamGroup::SmallWaves, 0.0, 30.0, 0.001),
    slider("noise_iterations", "Iterations", ParamGroup::SmallWaves, 0.0, 10.0, 1.0),
    slider("noise_speed", "Small speed", ParamGroup::SmallWaves, 0.0, 4.0, 0.001),
];
