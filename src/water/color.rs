//! Depth color model and color-space helpers.

use crate::params::WaterParams;

/// Blend weight between depth color (0) and surface color (1) for height `h`
pub fn mix_factor(h: f32, params: &WaterParams) -> f32 {
    ((h + params.color_offset) * params.color_multiplier).clamp(0.0, 1.0)
}

/// Final surface color for height `h`, linear RGB
pub fn depth_color(h: f32, params: &WaterParams) -> [f32; 3] {
    lerp(params.depth_color, params.surface_color, mix_factor(h, params))
}

/// Component-wise linear interpolation; returns `a` at t = 0 and `b` at t = 1 exactly
pub fn lerp(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    let s = 1.0 - t;
    [a[0] * s + b[0] * t, a[1] * s + b[1] * t, a[2] * s + b[2] * t]
}

fn srgb_channel_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_channel_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Decode an 8-bit sRGB triple to linear RGB
pub fn srgb8_to_linear(rgb: [u8; 3]) -> [f32; 3] {
    rgb.map(|c| srgb_channel_to_linear(c as f32 / 255.0))
}

/// Encode linear RGB to 8-bit sRGB, saturating out-of-range channels
pub fn linear_to_srgb8(rgb: [f32; 3]) -> [u8; 3] {
    rgb.map(|c| (linear_channel_to_srgb(c.clamp(0.0, 1.0)) * 255.0).round() as u8)
}

/// Parse `#rrggbb` (or `rrggbb`) into linear RGB
pub fn srgb_hex_to_linear(hex: &str) -> Result<[f32; 3], String> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(format!("Expected a color like #b8e9f5, got '{}'", hex));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|e| format!("Invalid color '{}': {}", hex, e))
    };

    Ok(srgb8_to_linear([
        channel(0..2)?,
        channel(2..4)?,
        channel(4..6)?,
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_color_near(a: [f32; 3], b: [f32; 3]) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < 1e-5, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn test_high_crest_saturates_to_surface_color() {
        let params = WaterParams::default();
        assert_eq!(depth_color(1000.0, &params), params.surface_color);
    }

    #[test]
    fn test_deep_trough_saturates_to_depth_color() {
        let params = WaterParams::default();
        assert_eq!(depth_color(-1000.0, &params), params.depth_color);
    }

    #[test]
    fn test_channels_stay_in_range() {
        let params = WaterParams::default();
        for i in -200..=200 {
            let h = i as f32 * 0.01;
            for c in depth_color(h, &params) {
                assert!((0.0..=1.0).contains(&c), "channel {} at h = {}", c, h);
            }
        }
    }

    #[test]
    fn test_reference_scenario_blend() {
        let params = WaterParams {
            color_offset: 0.18,
            color_multiplier: 3.7,
            ..WaterParams::default()
        };
        let factor = mix_factor(0.0, &params);
        assert!((factor - 0.666).abs() < 1e-4);
        assert_color_near(
            depth_color(0.0, &params),
            lerp(params.depth_color, params.surface_color, 0.666),
        );
    }

    #[test]
    fn test_blend_is_continuous_across_band() {
        let params = WaterParams::default();
        let step = 1e-4;
        // Band spans h in [-offset, 1/multiplier - offset]
        let mut h = -0.3;
        let mut previous = depth_color(h, &params);
        while h < 0.2 {
            h += step;
            let current = depth_color(h, &params);
            for i in 0..3 {
                assert!((current[i] - previous[i]).abs() < 1e-3);
            }
            previous = current;
        }
    }

    #[test]
    fn test_mix_factor_monotonic_in_height() {
        let params = WaterParams::default();
        let mut last = mix_factor(-1.0, &params);
        for i in -99..=100 {
            let f = mix_factor(i as f32 * 0.01, &params);
            assert!(f >= last);
            last = f;
        }
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(srgb_hex_to_linear("#ffffff").unwrap(), [1.0, 1.0, 1.0]);
        assert_eq!(srgb_hex_to_linear("000000").unwrap(), [0.0, 0.0, 0.0]);
        assert_eq!(
            srgb_hex_to_linear("#b8e9f5").unwrap(),
            srgb8_to_linear([0xb8, 0xe9, 0xf5])
        );
        assert!(srgb_hex_to_linear("#b8e9f").is_err());
        assert!(srgb_hex_to_linear("#zzzzzz").is_err());
        assert!(srgb_hex_to_linear("#ééé").is_err());
    }

    #[test]
    fn test_srgb_round_trip_of_defaults() {
        let params = WaterParams::default();
        assert_eq!(linear_to_srgb8(params.surface_color), [0xb8, 0xe9, 0xf5]);
        assert_eq!(linear_to_srgb8(params.depth_color), [0x54, 0x8e, 0xac]);
    }
}
