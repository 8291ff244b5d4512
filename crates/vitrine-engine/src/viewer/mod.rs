//! Model viewer bound to a window surface.
//!
//! The runtime constructs one viewer per window, forwards pointer events to
//! it, and asks it to render once per frame tick. The viewer owns the GPU
//! surface, the loaded model/environment, and the orbit camera.

mod camera;
mod environment;
mod model;
mod options;
mod pipeline;

pub use camera::OrbitCamera;
pub use environment::{IndirectLight, KtxInfo, parse_ktx1};
pub use model::{Aabb, ModelData, ModelVertex, fit_to_unit_cube};
pub use options::{
    AmbientOcclusionOptions, AntiAliasing, BlendMode, ClearOptions, Color, MsaaOptions,
    ResolvedOptions, ViewerOptions,
};

use anyhow::{Context, Result};
use glam::Mat4;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::frame::FrameTick;
use crate::input::PointerEvent;

use pipeline::{MeshBuffers, PostPass, PostUniform, ScenePipeline, SceneTargets, SceneUniform};

/// Outcome of a render call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RenderStatus {
    Presented,
    /// Transient surface problem; the frame was dropped.
    Skipped,
    /// Unrecoverable surface error; the caller should shut down.
    Fatal,
}

/// Fixed key light; most of the look comes from the baked ambient term.
const LIGHT_DIRECTION: [f32; 3] = [0.4, 0.8, 0.45];

struct LoadedModel {
    mesh: MeshBuffers,
    bounds: Aabb,
    transform: Mat4,
    base_color: [f32; 4],
}

/// Viewer handle bound 1:1 to a window surface.
pub struct ModelViewer<'w> {
    gpu: Gpu<'w>,
    options: ViewerOptions,
    resolved: ResolvedOptions,
    camera: OrbitCamera,

    scene_pipeline: ScenePipeline,
    post_pass: PostPass,
    targets: SceneTargets,

    model: Option<LoadedModel>,
    light: Option<IndirectLight>,

    // fps accounting, logged roughly once per second
    fps_window_start_ns: u64,
    fps_frames: u32,
}

impl<'w> ModelViewer<'w> {
    /// Constructs a viewer bound to the window's surface and applies the
    /// initial render options.
    pub fn new(window: &'w Window, options: ViewerOptions) -> Result<Self> {
        let resolved = options.resolve();

        let init = GpuInit {
            // Translucent compositing wants a non-opaque surface when the
            // platform offers one.
            alpha_mode: resolved
                .translucent
                .then_some(wgpu::CompositeAlphaMode::PreMultiplied),
            ..GpuInit::default()
        };

        let gpu = pollster::block_on(Gpu::new(window, init))
            .context("failed to initialize GPU surface for viewer")?;

        Ok(Self {
            gpu,
            options,
            resolved,
            camera: OrbitCamera::new(),
            scene_pipeline: ScenePipeline::default(),
            post_pass: PostPass::default(),
            targets: SceneTargets::default(),
            model: None,
            light: None,
            fps_window_start_ns: 0,
            fps_frames: 0,
        })
    }

    /// Applies a render option set.
    ///
    /// Resolution is pure, so reapplying equal options changes nothing;
    /// pipelines and targets are rebuilt lazily on the next frame when the
    /// resolved parameters actually differ.
    pub fn set_render_options(&mut self, options: ViewerOptions) {
        self.resolved = options.resolve();
        self.options = options;
    }

    pub fn render_options(&self) -> &ViewerOptions {
        &self.options
    }

    /// Decodes a GLB buffer and uploads its geometry.
    ///
    /// The model is rendered with its own transform; call
    /// [`transform_to_unit_cube`](Self::transform_to_unit_cube) to frame it.
    pub fn load_model_glb(&mut self, bytes: &[u8]) -> Result<()> {
        let data = ModelData::from_glb(bytes)?;
        log::info!(
            "model loaded: {} vertices, {} indices",
            data.vertices.len(),
            data.indices.len()
        );

        self.model = Some(LoadedModel {
            mesh: MeshBuffers::upload(self.gpu.device(), &data),
            bounds: data.bounds,
            transform: Mat4::IDENTITY,
            base_color: data.base_color,
        });
        Ok(())
    }

    /// Re-centers and scales the loaded model into the origin-centered unit
    /// cube. No-op before a model is loaded.
    pub fn transform_to_unit_cube(&mut self) {
        if let Some(model) = self.model.as_mut() {
            model.transform = fit_to_unit_cube(model.bounds);
        }
    }

    /// Identifies a KTX1 environment buffer and installs it as the indirect
    /// light.
    pub fn load_indirect_light(&mut self, bytes: &[u8]) -> Result<()> {
        let light = IndirectLight::from_ktx1(bytes)?;
        log::info!(
            "environment loaded: {}x{}, {} faces, {} mips, intensity {}",
            light.info.pixel_width,
            light.info.pixel_height,
            light.info.faces,
            light.info.mip_levels,
            light.intensity
        );
        self.light = Some(light);
        Ok(())
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Forwards a pointer event to the orbit controls. Events are always
    /// consumed.
    pub fn on_pointer_event(&mut self, event: PointerEvent) {
        self.camera.handle_event(event);
    }

    /// Reconfigures the surface after a window resize.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    /// Renders one frame for the given tick.
    pub fn render(&mut self, tick: FrameTick) -> RenderStatus {
        let mut frame = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => RenderStatus::Fatal,
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        RenderStatus::Skipped
                    }
                };
            }
        };

        let size = self.gpu.size();
        let format = self.gpu.surface_format();
        let device = self.gpu.device();

        let targets_changed = self.targets.ensure(
            device,
            size.width,
            size.height,
            format,
            self.resolved.sample_count,
        );
        self.scene_pipeline.ensure(device, format, &self.resolved);
        self.post_pass.ensure_pipeline(device, format);

        let Some(color_view) = self.targets.color_view.as_ref() else {
            return RenderStatus::Skipped;
        };
        if targets_changed || !self.post_pass.has_bindings() {
            self.post_pass.rebind(device, color_view);
        }

        self.write_uniforms(size);
        self.record_scene_pass(&mut frame.encoder);
        self.post_pass.record(&mut frame.encoder, &frame.view);

        self.gpu.submit(frame);
        self.account_fps(tick);

        RenderStatus::Presented
    }

    fn write_uniforms(&mut self, size: PhysicalSize<u32>) {
        let aspect = size.width.max(1) as f32 / size.height.max(1) as f32;
        let ambient = self
            .light
            .as_ref()
            .map(|l| l.ambient_strength())
            .unwrap_or(0.1);

        let (transform, base_color) = match self.model.as_ref() {
            Some(model) => (model.transform, model.base_color),
            None => (Mat4::IDENTITY, [1.0; 4]),
        };

        self.scene_pipeline.write_uniform(
            self.gpu.queue(),
            SceneUniform {
                view_proj: self.camera.view_projection(aspect).to_cols_array_2d(),
                model: transform.to_cols_array_2d(),
                base_color,
                light: [
                    LIGHT_DIRECTION[0],
                    LIGHT_DIRECTION[1],
                    LIGHT_DIRECTION[2],
                    ambient,
                ],
                params: [
                    if self.resolved.ambient_occlusion { 1.0 } else { 0.0 },
                    0.0,
                    0.0,
                    0.0,
                ],
            },
        );

        self.post_pass.write_uniform(
            self.gpu.queue(),
            PostUniform {
                texel: [1.0 / size.width.max(1) as f32, 1.0 / size.height.max(1) as f32],
                fxaa: if self.resolved.fxaa { 1.0 } else { 0.0 },
                _pad: 0.0,
            },
        );
    }

    fn record_scene_pass(&self, encoder: &mut wgpu::CommandEncoder) {
        let Some(color_view) = self.targets.color_view.as_ref() else {
            return;
        };
        let Some(depth_view) = self.targets.depth_view.as_ref() else {
            return;
        };

        let c = self.resolved.clear_color;
        let load = if self.resolved.load_op_clear {
            wgpu::LoadOp::Clear(wgpu::Color {
                r: c.r as f64,
                g: c.g as f64,
                b: c.b as f64,
                a: c.a as f64,
            })
        } else {
            wgpu::LoadOp::Load
        };

        // Multisampled rendering resolves into the single-sample color
        // target the post pass samples from.
        let (view, resolve_target) = match self.targets.msaa_view.as_ref() {
            Some(msaa_view) => (msaa_view, Some(color_view)),
            None => (color_view, None),
        };

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vitrine scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let (Some(pipeline), Some(bind_group), Some(model)) = (
            self.scene_pipeline.pipeline(),
            self.scene_pipeline.bind_group(),
            self.model.as_ref(),
        ) else {
            return;
        };

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, model.mesh.vertex.slice(..));
        rpass.set_index_buffer(model.mesh.index.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..model.mesh.index_count, 0, 0..1);
    }

    fn account_fps(&mut self, tick: FrameTick) {
        self.fps_frames += 1;
        let elapsed = tick.timestamp_ns.saturating_sub(self.fps_window_start_ns);
        if elapsed >= 1_000_000_000 {
            let fps = self.fps_frames as f64 * 1e9 / elapsed as f64;
            log::debug!("{fps:.1} fps");
            self.fps_window_start_ns = tick.timestamp_ns;
            self.fps_frames = 0;
        }
    }
}
