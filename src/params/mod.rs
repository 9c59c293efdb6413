//! Parameter definitions with units and documented semantics.
//!
//! All tunable numbers live here with:
//! - Their reference defaults
//! - Documented ranges and meanings
//! - The slider range/step the control panel offers

mod camera;
mod render;
mod water;

// Re-export all types
pub use camera::OrbitConfig;
pub use render::{PreviewConfig, RenderConfig};
pub use water::{ParamGroup, ParamRange, ParamValue, WaterParams, PARAM_RANGES};
