//! Rendering system with wgpu pipelines and the per-frame uniform snapshot.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::panel::PanelFrame;
use crate::params::{RenderConfig, WaterParams};
use crate::viewport::RenderSize;
use crate::water::{SurfaceGrid, Vertex};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Uniform buffer for the water shader.
///
/// One consistent copy of every parameter plus the frame time; layout matches
/// `WaterUniforms` in `water.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct WaterUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub frequency: [f32; 2],
    pub amplitude: f32,
    pub speed: f32,
    pub surface_color: [f32; 3],
    pub color_offset: f32,
    pub depth_color: [f32; 3],
    pub color_multiplier: f32,
    pub time: f32,
    pub noise_amplitude: f32,
    pub noise_frequency: f32,
    pub noise_speed: f32,
    pub noise_iterations: u32,
    pub _padding: [u32; 3], // Round struct up to a multiple of 16 bytes
}

impl WaterUniforms {
    /// Freeze parameters and time for one frame
    pub fn snapshot(params: &WaterParams, time_s: f32, view_proj: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            frequency: params.frequency,
            amplitude: params.amplitude,
            speed: params.speed,
            surface_color: params.surface_color,
            color_offset: params.color_offset,
            depth_color: params.depth_color,
            color_multiplier: params.color_multiplier,
            time: time_s,
            noise_amplitude: params.noise_amplitude,
            noise_frequency: params.noise_frequency,
            noise_speed: params.noise_speed,
            noise_iterations: params.noise_iterations,
            _padding: [0; 3],
        }
    }
}

/// Offscreen color + depth the water is drawn into before upscaling
struct SceneTarget {
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    blit_bind_group: wgpu::BindGroup,
}

impl SceneTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: RenderSize,
        blit_layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Color"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Depth"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        let blit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Blit Bind Group"),
            layout: blit_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self {
            color_view,
            depth_view,
            blit_bind_group,
        }
    }
}

/// Rendering system managing wgpu device, pipelines, and buffers
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    water_pipeline: wgpu::RenderPipeline,
    blit_pipeline: wgpu::RenderPipeline,
    blit_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    scene_target: SceneTarget,
    egui_renderer: egui_wgpu::Renderer,
    clear_color: wgpu::Color,
}

impl RenderSystem {
    /// Create the rendering system. Any failure here is a startup failure.
    pub async fn new(
        window: Arc<Window>,
        grid: &SurfaceGrid,
        render_config: &RenderConfig,
        render_size: RenderSize,
    ) -> Result<Self, String> {
        let size = window.inner_size();

        // Create wgpu instance
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface (window must have 'static lifetime via Arc)
        let surface = instance
            .create_surface(window)
            .map_err(|e| format!("Failed to create surface: {}", e))?;

        // Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or("Failed to find suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("GPU adapter: {} ({:?})", info.name, info.backend);

        // Grid buffers must fit the limits requested below
        let required_limits = wgpu::Limits::default();
        let vertex_bytes = std::mem::size_of_val(grid.vertices.as_slice()) as u64;
        let index_bytes = std::mem::size_of_val(grid.indices.as_slice()) as u64;
        if vertex_bytes.max(index_bytes) > required_limits.max_buffer_size {
            return Err(format!(
                "Water grid of {} segments needs {} bytes, above the {} byte buffer limit",
                grid.segments(),
                vertex_bytes.max(index_bytes),
                required_limits.max_buffer_size
            ));
        }

        // Request device
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits,
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| format!("Failed to request device: {}", e))?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or("Surface reports no supported formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .ok_or("Surface reports no alpha modes")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "Surface {:?} at {}x{}, scene at {}x{}",
            surface_format,
            config.width,
            config.height,
            render_size.width,
            render_size.height
        );

        // Load shaders
        let water_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Water Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("water.wgsl").into()),
        });

        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("blit.wgsl").into()),
        });

        // Create buffers
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&grid.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&grid.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let uniforms = WaterUniforms::snapshot(&WaterParams::default(), 0.0, Mat4::IDENTITY);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Water Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // Create water bind group
        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Water Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Water Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // Create water render pipeline
        let water_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Water Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let water_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Water Render Pipeline"),
            layout: Some(&water_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &water_shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x3,
                        },
                        wgpu::VertexAttribute {
                            offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Float32x2,
                        },
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &water_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None, // Orbit camera can look from below
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // Create blit (scene target -> window) resources
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Scene Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let blit_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Blit Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let blit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Blit Pipeline Layout"),
            bind_group_layouts: &[&blit_layout],
            push_constant_ranges: &[],
        });

        let blit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Blit Pipeline"),
            layout: Some(&blit_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &blit_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &blit_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let scene_target =
            SceneTarget::new(&device, config.format, render_size, &blit_layout, &sampler);

        let egui_renderer = egui_wgpu::Renderer::new(&device, config.format, None, 1, false);

        let [r, g, b] = render_config.clear_color;

        Ok(Self {
            surface,
            device,
            queue,
            config,
            water_pipeline,
            blit_pipeline,
            blit_layout,
            sampler,
            vertex_buffer,
            index_buffer,
            index_count: grid.index_count(),
            uniform_buffer,
            uniform_bind_group,
            scene_target,
            egui_renderer,
            clear_color: wgpu::Color { r, g, b, a: 1.0 },
        })
    }

    /// Reconfigure the surface and rebuild the scene target
    pub fn resize(&mut self, window_size: (u32, u32), render_size: RenderSize) {
        let (width, height) = window_size;
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.scene_target = SceneTarget::new(
            &self.device,
            self.config.format,
            render_size,
            &self.blit_layout,
            &self.sampler,
        );
        log::debug!(
            "Resized surface to {}x{}, scene to {}x{}",
            width,
            height,
            render_size.width,
            render_size.height
        );
    }

    /// Re-apply the current surface configuration (after `Lost`/`Outdated`)
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload this frame's uniform snapshot
    pub fn write_uniforms(&self, uniforms: &WaterUniforms) {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[*uniforms]));
    }

    /// Render the water, upscale it to the window, and draw the panel on top
    pub fn render(&mut self, panel: &PanelFrame) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        for (id, image_delta) in &panel.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: panel.pixels_per_point,
        };
        let panel_commands = self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &panel.paint_jobs,
            &screen,
        );

        {
            let mut scene_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Water Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.scene_target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.scene_target.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            scene_pass.set_pipeline(&self.water_pipeline);
            scene_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            scene_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            scene_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            scene_pass.draw_indexed(0..self.index_count, 0, 0..1);
        }

        {
            let mut window_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Window Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.clear_color),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();

            window_pass.set_pipeline(&self.blit_pipeline);
            window_pass.set_bind_group(0, &self.scene_target.blit_bind_group, &[]);
            window_pass.draw(0..3, 0..1); // Fullscreen triangle

            self.egui_renderer
                .render(&mut window_pass, &panel.paint_jobs, &screen);
        }

        self.queue.submit(
            panel_commands
                .into_iter()
                .chain(std::iter::once(encoder.finish())),
        );

        for id in &panel.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_and_validate(source: &str) -> naga::Module {
        let module = naga::front::wgsl::parse_str(source).expect("WGSL should parse");
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&module)
        .expect("WGSL should validate");
        module
    }

    fn entry_stages(module: &naga::Module) -> Vec<(String, naga::ShaderStage)> {
        module
            .entry_points
            .iter()
            .map(|ep| (ep.name.clone(), ep.stage))
            .collect()
    }

    #[test]
    fn test_water_shader_validates() {
        let module = parse_and_validate(include_str!("water.wgsl"));
        let stages = entry_stages(&module);
        assert!(stages.contains(&("vs_main".to_string(), naga::ShaderStage::Vertex)));
        assert!(stages.contains(&("fs_main".to_string(), naga::ShaderStage::Fragment)));
    }

    #[test]
    fn test_blit_shader_validates() {
        let module = parse_and_validate(include_str!("blit.wgsl"));
        assert_eq!(module.entry_points.len(), 2);
    }

    #[test]
    fn test_uniform_layout_matches_shader() {
        let module = parse_and_validate(include_str!("water.wgsl"));
        let span = module
            .types
            .iter()
            .find_map(|(_, ty)| match (&ty.name, &ty.inner) {
                (Some(name), naga::TypeInner::Struct { span, .. }) if name == "WaterUniforms" => {
                    Some(*span)
                }
                _ => None,
            })
            .expect("WaterUniforms struct in shader");

        assert_eq!(span as usize, std::mem::size_of::<WaterUniforms>());
        assert_eq!(std::mem::size_of::<WaterUniforms>(), 144);
    }

    #[test]
    fn test_uniform_member_offsets_match_shader() {
        let module = parse_and_validate(include_str!("water.wgsl"));
        let members = module
            .types
            .iter()
            .find_map(|(_, ty)| match (&ty.name, &ty.inner) {
                (Some(name), naga::TypeInner::Struct { members, .. }) if name == "WaterUniforms" => {
                    Some(members.clone())
                }
                _ => None,
            })
            .expect("WaterUniforms struct in shader");

        let offset_of = |name: &str| {
            members
                .iter()
                .find(|m| m.name.as_deref() == Some(name))
                .map(|m| m.offset)
                .expect("member present")
        };

        assert_eq!(offset_of("surface_color"), 80);
        assert_eq!(offset_of("depth_color"), 96);
        assert_eq!(offset_of("time"), 112);
        assert_eq!(offset_of("noise_iterations"), 128);
    }

    #[test]
    fn test_snapshot_copies_params_and_time() {
        let params = WaterParams {
            amplitude: 0.5,
            noise_iterations: 7,
            ..WaterParams::default()
        };
        let uniforms = WaterUniforms::snapshot(&params, 12.5, Mat4::IDENTITY);

        assert_eq!(uniforms.amplitude, 0.5);
        assert_eq!(uniforms.noise_iterations, 7);
        assert_eq!(uniforms.time, 12.5);
        assert_eq!(uniforms.frequency, params.frequency);
        assert_eq!(uniforms.surface_color, params.surface_color);
        assert_eq!(uniforms.depth_color, params.depth_color);
        assert_eq!(uniforms.view_proj, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn test_snapshot_is_detached_from_later_edits() {
        let mut params = WaterParams::default();
        let uniforms = WaterUniforms::snapshot(&params, 1.0, Mat4::IDENTITY);
        params.amplitude = 0.9;
        assert_eq!(uniforms.amplitude, WaterParams::default().amplitude);
    }
}
