//! Debug control panel (egui) bound to the live water parameters.

use winit::event::WindowEvent;
use winit::window::Window;

use crate::params::{ParamGroup, ParamRange, ParamValue, WaterParams, PARAM_RANGES};

/// Tessellated panel output for one frame, consumed by the renderer
pub struct PanelFrame {
    pub paint_jobs: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

/// egui context plus its winit integration
pub struct ControlPanel {
    ctx: egui::Context,
    state: egui_winit::State,
    visible: bool,
}

impl ControlPanel {
    pub fn new(window: &Window) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        Self {
            ctx,
            state,
            visible: true,
        }
    }

    /// Feed a window event to egui. Returns true when the panel consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);
        response.consumed && self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("Control panel {}", if self.visible { "shown" } else { "hidden" });
    }

    /// Build this frame's UI, writing edits straight into `params`
    pub fn run(&mut self, window: &Window, params: &mut WaterParams, fps: f32) -> PanelFrame {
        let raw_input = self.state.take_egui_input(window);
        let visible = self.visible;
        let mut edited = false;
        let full_output = self.ctx.run(raw_input, |ctx| {
            if visible {
                edited = show(ctx, params, fps);
            }
        });
        if edited {
            log::trace!("Water parameters edited: {:?}", params);
        }
        self.state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        PanelFrame {
            paint_jobs: self.ctx.tessellate(full_output.shapes, pixels_per_point),
            textures_delta: full_output.textures_delta,
            pixels_per_point,
        }
    }
}

/// Panel window with frame-rate readout and all parameter groups.
/// Returns true when any parameter changed.
pub fn show(ctx: &egui::Context, params: &mut WaterParams, fps: f32) -> bool {
    let mut changed = false;
    egui::Window::new("Water")
        .default_width(280.0)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("{:.0} fps", fps)).small());
            changed = draw_controls(ui, params);
            ui.separator();
            ui.label(egui::RichText::new("Drag to orbit, scroll to zoom, H hides").small());
        });
    changed
}

/// One collapsing group per [`ParamGroup`], sliders from [`PARAM_RANGES`].
/// Returns true when any parameter changed.
pub fn draw_controls(ui: &mut egui::Ui, params: &mut WaterParams) -> bool {
    let mut changed = false;

    for group in ParamGroup::ALL {
        egui::CollapsingHeader::new(group.title())
            .default_open(true)
            .show(ui, |ui| {
                if group == ParamGroup::Color {
                    changed |= color_row(ui, "Surface color", &mut params.surface_color);
                    changed |= color_row(ui, "Depth color", &mut params.depth_color);
                }
                for range in PARAM_RANGES.iter().filter(|r| r.group == group) {
                    changed |= slider_row(ui, range, params);
                }
            });
    }

    changed
}

/// Widgets edit a copy; the store only sees values the user actually changed
fn color_row(ui: &mut egui::Ui, label: &str, rgb: &mut [f32; 3]) -> bool {
    let mut edited = *rgb;
    let changed = ui
        .horizontal(|ui| {
            let response = egui::color_picker::color_edit_button_rgb(ui, &mut edited);
            ui.label(label);
            response.changed()
        })
        .inner;

    if changed && edited != *rgb {
        *rgb = edited;
        return true;
    }
    false
}

fn slider_row(ui: &mut egui::Ui, range: &ParamRange, params: &mut WaterParams) -> bool {
    let Some(value) = params.value_mut(range.key) else {
        return false;
    };

    match value {
        ParamValue::Float(v) => {
            let mut edited = *v;
            let slider = egui::Slider::new(&mut edited, range.range())
                .clamping(egui::SliderClamping::Edits)
                .text(range.label);
            if ui.add(slider).changed() && edited != *v {
                *v = range.clamp(edited);
                return true;
            }
        }
        ParamValue::Count(v) => {
            let mut edited = *v;
            let slider = egui::Slider::new(&mut edited, range.min as u32..=range.max as u32)
                .clamping(egui::SliderClamping::Edits)
                .text(range.label);
            if ui.add(slider).changed() && edited != *v {
                *v = range.clamp(edited as f32) as u32;
                return true;
            }
        }
    }
    false
}
