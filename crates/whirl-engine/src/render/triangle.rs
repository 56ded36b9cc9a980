use bytemuck::{Pod, Zeroable};

use crate::render::geometry::{GeometryBuffer, Vertex};
use crate::render::{RenderCtx, RenderTarget};
use crate::shader::LinkedProgram;
use crate::time::RotationState;

/// Uniform payload for the vertex stage: a column-major 4x4 transform.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct TransformUniform {
    matrix: [[f32; 4]; 4],
}

/// Triangle renderer.
///
/// Owns all device-side state for one linked program: the render pipeline,
/// the transform uniform buffer + bind group, and the vertex buffer.
/// Resources are created lazily against the active surface format and
/// recreated if the format changes.
///
/// A program that failed to compile or link never reaches the device:
/// `render` becomes a no-op (the first skipped frame logs why), which is
/// what keeps an invalid shader non-fatal all the way through the loop.
pub struct TriangleRenderer {
    program: LinkedProgram,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    transform_ubo: Option<wgpu::Buffer>,

    geometry: Option<GeometryBuffer>,

    warned_invalid_program: bool,
    warned_missing_uniform: bool,
}

impl TriangleRenderer {
    pub fn new(program: LinkedProgram) -> Self {
        Self {
            program,
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            bind_group: None,
            transform_ubo: None,
            geometry: None,
            warned_invalid_program: false,
            warned_missing_uniform: false,
        }
    }

    /// Records one draw of the triangle, rotated per `rotation`.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        rotation: RotationState,
    ) {
        if !self.program.is_ok() {
            if !self.warned_invalid_program {
                log::debug!("triangle renderer idle: shader program is invalid");
                self.warned_invalid_program = true;
            }
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_geometry(ctx);
        self.ensure_bindings(ctx);
        self.write_transform(ctx, rotation);

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let Some(geometry) = self.geometry.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("whirl triangle pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, geometry.buffer().slice(..));
        rpass.draw(0..geometry.vertex_count(), 0..1);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let vertex_module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("whirl vertex stage"),
            source: wgpu::ShaderSource::Wgsl(self.program.vertex_source().into()),
        });
        let fragment_module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("whirl fragment stage"),
            source: wgpu::ShaderSource::Wgsl(self.program.fragment_source().into()),
        });

        // The linker guarantees at most one uniform, in group 0; mirror its
        // binding slot in the layout.
        let entries: Vec<wgpu::BindGroupLayoutEntry> = self
            .program
            .uniforms()
            .map(|(_, loc)| wgpu::BindGroupLayoutEntry {
                binding: loc.binding,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<TransformUniform>() as u64,
                    ),
                },
                count: None,
            })
            .collect();

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("whirl triangle bgl"),
                    entries: &entries,
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("whirl triangle pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("whirl triangle pipeline"),
                layout: Some(&pipeline_layout),

                vertex: wgpu::VertexState {
                    module: &vertex_module,
                    entry_point: Some(self.program.vertex_entry()),
                    compilation_options: Default::default(),
                    buffers: &[Vertex::layout()],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &fragment_module,
                    entry_point: Some(self.program.fragment_entry()),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
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

                multiview_mask: None,
                cache: None,
            });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);

        self.bind_group = None;
        self.transform_ubo = None;
    }

    fn ensure_geometry(&mut self, ctx: &RenderCtx<'_>) {
        if self.geometry.is_none() {
            self.geometry = Some(GeometryBuffer::triangle(ctx.device));
        }
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let ubo = self.program.uniforms().next().map(|(_, loc)| {
            let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("whirl transform ubo"),
                size: std::mem::size_of::<TransformUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            (ubo, loc)
        });

        let entries: Vec<wgpu::BindGroupEntry> = ubo
            .iter()
            .map(|(ubo, loc)| wgpu::BindGroupEntry {
                binding: loc.binding,
                resource: ubo.as_entire_binding(),
            })
            .collect();

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("whirl triangle bind group"),
            layout: bgl,
            entries: &entries,
        });

        self.transform_ubo = ubo.map(|(ubo, _)| ubo);
        self.bind_group = Some(bind_group);
    }

    /// Uploads the rotation transform, looked up by uniform name.
    ///
    /// A program without a `"transform"` uniform keeps drawing with
    /// whatever the buffer holds; the skipped upload is reported once
    /// rather than silently ignored.
    fn write_transform(&mut self, ctx: &RenderCtx<'_>, rotation: RotationState) {
        if self.program.uniform("transform").is_none() {
            if !self.warned_missing_uniform {
                log::warn!(
                    "shader program declares no \"transform\" uniform; rotation will not be applied"
                );
                self.warned_missing_uniform = true;
            }
            return;
        }
        let Some(ubo) = self.transform_ubo.as_ref() else { return };

        let uniform = TransformUniform {
            matrix: rotation.transform().to_cols_array_2d(),
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&uniform));
    }
}
