//! Seaform library - procedurally animated water surface

pub mod camera;
pub mod cli;
pub mod frame;
pub mod panel;
pub mod params;
pub mod preview;
pub mod rendering;
pub mod viewport;
pub mod water;
