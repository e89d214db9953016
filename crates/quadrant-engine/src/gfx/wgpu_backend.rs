use wgpu::util::DeviceExt;

use crate::assets::{AssetError, validate_wgsl};
use crate::paint::Color;

use super::vertex::{COLOR_OFFSET, POSITION_OFFSET, TEX_SLOT_OFFSET, UV_OFFSET, VERTEX_STRIDE};
use super::{
    BufferId, ProgramDesc, ProgramId, RenderBackend, TEXTURE_UNITS, TextureId, UniformLayout,
    UniformValue,
};

/// Binding of the uniform block in every program's bind group.
const UNIFORM_BINDING: u32 = 0;
/// Texture unit `n` lives at binding `FIRST_TEXTURE_BINDING + n`.
const FIRST_TEXTURE_BINDING: u32 = 1;
const SAMPLER_BINDING: u32 = FIRST_TEXTURE_BINDING + TEXTURE_UNITS as u32;

/// Tuning knobs for [`WgpuBackend`].
#[derive(Debug, Clone)]
pub struct WgpuBackendConfig {
    /// Filter used for both magnification and minification.
    ///
    /// `Nearest` keeps pixel art crisp.
    pub filter: wgpu::FilterMode,
}

impl Default for WgpuBackendConfig {
    fn default() -> Self {
        Self { filter: wgpu::FilterMode::Nearest }
    }
}

struct Program {
    label: String,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    layout: UniformLayout,
    block: Vec<u8>,
}

struct GpuTexture {
    // Kept alive for the view.
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

enum GpuBuffer {
    Vertex(wgpu::Buffer),
    Index(wgpu::Buffer),
}

struct Frame {
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

/// `RenderBackend` over a wgpu device.
///
/// Each `draw_indexed` records its own render pass with `LoadOp::Load` into the
/// frame encoder, so draws composite in call order. Uniform values are
/// snapshotted per draw. Vertex writes issued during a frame are recorded as
/// buffer copies on the same encoder, which keeps reuse of one vertex buffer
/// across several draws in a frame correct.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,

    sampler: wgpu::Sampler,
    white: GpuTexture,

    programs: Vec<Program>,
    textures: Vec<GpuTexture>,
    buffers: Vec<GpuBuffer>,

    bound_program: Option<ProgramId>,
    bound_units: [Option<TextureId>; TEXTURE_UNITS],
    bound_buffers: Option<(BufferId, BufferId)>,

    frame: Option<Frame>,
    warned_no_frame: bool,
}

impl WgpuBackend {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        config: WgpuBackendConfig,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("quadrant sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: config.filter,
            min_filter: config.filter,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let white = upload_texture(device, queue, "quadrant white", 1, 1, &[255; 4]);

        Self {
            device: device.clone(),
            queue: queue.clone(),
            surface_format,
            sampler,
            white,
            programs: Vec::new(),
            textures: Vec::new(),
            buffers: Vec::new(),
            bound_program: None,
            bound_units: [None; TEXTURE_UNITS],
            bound_buffers: None,
            frame: None,
            warned_no_frame: false,
        }
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Starts recording a frame that renders into `view`.
    ///
    /// With `clear` set, the target is cleared before any draw.
    pub fn begin_frame(&mut self, view: wgpu::TextureView, clear: Option<Color>) {
        if self.frame.is_some() {
            log::warn!("WgpuBackend: begin_frame while a frame is open; submitting it first");
            self.end_frame();
        }

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("quadrant frame encoder"),
        });

        if let Some(color) = clear {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("quadrant clear pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(color.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        self.frame = Some(Frame { view, encoder });
    }

    /// Submits everything recorded since [`begin_frame`](Self::begin_frame).
    pub fn end_frame(&mut self) {
        let Some(frame) = self.frame.take() else { return; };
        self.queue.submit(std::iter::once(frame.encoder.finish()));
        drop(frame.view);
    }

    pub fn in_frame(&self) -> bool {
        self.frame.is_some()
    }

    fn unit_view(&self, unit: usize) -> &wgpu::TextureView {
        self.bound_units[unit]
            .and_then(|t| self.textures.get(t.index()))
            .map_or(&self.white.view, |t| &t.view)
    }
}

fn vertex_buffer(buffers: &[GpuBuffer], id: BufferId) -> Option<&wgpu::Buffer> {
    match buffers.get(id.index()) {
        Some(GpuBuffer::Vertex(b)) => Some(b),
        _ => None,
    }
}

fn index_buffer(buffers: &[GpuBuffer], id: BufferId) -> Option<&wgpu::Buffer> {
    match buffers.get(id.index()) {
        Some(GpuBuffer::Index(b)) => Some(b),
        _ => None,
    }
}

impl RenderBackend for WgpuBackend {
    fn create_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramId, AssetError> {
        // wgpu reports shader errors through its uncaptured error handler, so
        // validate up front and surface a proper error instead.
        validate_wgsl(desc.label, desc.wgsl)?;

        let layout = UniformLayout::new(desc.uniforms);

        let shader = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(desc.label),
            source: wgpu::ShaderSource::Wgsl(desc.wgsl.into()),
        });

        let mut entries = Vec::with_capacity(TEXTURE_UNITS + 2);
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: UNIFORM_BINDING,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
        for unit in 0..TEXTURE_UNITS as u32 {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: FIRST_TEXTURE_BINDING + unit,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
        }
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: SAMPLER_BINDING,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });

        let bind_group_layout =
            self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(desc.label),
                entries: &entries,
            });

        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(desc.label),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let attributes = [
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: POSITION_OFFSET as u64,
                shader_location: 0,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x4,
                offset: COLOR_OFFSET as u64,
                shader_location: 1,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: UV_OFFSET as u64,
                shader_location: 2,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32,
                offset: TEX_SLOT_OFFSET as u64,
                shader_location: 3,
            },
        ];

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: VERTEX_STRIDE as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: Some(premul_alpha_blend()),
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

        let id = ProgramId(self.programs.len() as u32);
        log::debug!("WgpuBackend: program {:?} '{}' ({} uniform bytes)", id, desc.label, layout.size());

        self.programs.push(Program {
            label: desc.label.to_string(),
            pipeline,
            bind_group_layout,
            block: vec![0; layout.size()],
            layout,
        });
        Ok(id)
    }

    fn create_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureId, AssetError> {
        super::check_texture_data(label, width, height, rgba)?;

        let texture = upload_texture(&self.device, &self.queue, label, width, height, rgba);
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(texture);
        Ok(id)
    }

    fn create_vertex_buffer(&mut self, label: &str, size_bytes: u64) -> BufferId {
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: size_bytes.max(wgpu::COPY_BUFFER_ALIGNMENT),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let id = BufferId(self.buffers.len() as u32);
        self.buffers.push(GpuBuffer::Vertex(buffer));
        id
    }

    fn create_index_buffer(&mut self, label: &str, indices: &[u32]) -> BufferId {
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let id = BufferId(self.buffers.len() as u32);
        self.buffers.push(GpuBuffer::Index(buffer));
        id
    }

    fn write_vertices(&mut self, buffer: BufferId, data: &[f32]) {
        if data.is_empty() {
            return;
        }
        let Some(dst) = vertex_buffer(&self.buffers, buffer) else {
            log::warn!("WgpuBackend: write to unknown vertex buffer {:?}", buffer);
            return;
        };
        let bytes: &[u8] = bytemuck::cast_slice(data);
        if bytes.len() as u64 > dst.size() {
            log::warn!(
                "WgpuBackend: {} bytes exceed vertex buffer {:?} ({} bytes)",
                bytes.len(),
                buffer,
                dst.size()
            );
            return;
        }

        match self.frame.as_mut() {
            Some(frame) => {
                let staging = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("quadrant vertex staging"),
                    contents: bytes,
                    usage: wgpu::BufferUsages::COPY_SRC,
                });
                frame.encoder.copy_buffer_to_buffer(&staging, 0, dst, 0, bytes.len() as u64);
            }
            None => self.queue.write_buffer(dst, 0, bytes),
        }
    }

    fn use_program(&mut self, program: ProgramId) {
        self.bound_program = Some(program);
    }

    fn detach_program(&mut self, program: ProgramId) {
        if self.bound_program == Some(program) {
            self.bound_program = None;
        }
    }

    fn set_uniform(&mut self, program: ProgramId, name: &str, value: UniformValue) {
        let Some(p) = self.programs.get_mut(program.index()) else { return; };
        if !p.layout.write(&mut p.block, name, &value) {
            log::warn!(
                "WgpuBackend: program '{}' has no {:?} uniform named '{}'",
                p.label,
                value.kind(),
                name
            );
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        match self.bound_units.get_mut(unit as usize) {
            Some(slot) => *slot = Some(texture),
            None => log::warn!("WgpuBackend: texture unit {} out of range", unit),
        }
    }

    fn unbind_texture(&mut self, unit: u32) {
        if let Some(slot) = self.bound_units.get_mut(unit as usize) {
            *slot = None;
        }
    }

    fn bind_buffers(&mut self, vertices: BufferId, indices: BufferId) {
        self.bound_buffers = Some((vertices, indices));
    }

    fn unbind_buffers(&mut self) {
        self.bound_buffers = None;
    }

    fn draw_indexed(&mut self, index_count: u32) {
        if index_count == 0 {
            return;
        }
        if self.frame.is_none() {
            if !self.warned_no_frame {
                log::warn!("WgpuBackend: draw outside begin_frame/end_frame skipped");
                self.warned_no_frame = true;
            }
            return;
        }

        let Some(program) = self.bound_program.and_then(|p| self.programs.get(p.index())) else {
            log::warn!("WgpuBackend: draw without a program skipped");
            return;
        };
        let Some((vbo, ibo)) = self.bound_buffers else {
            log::warn!("WgpuBackend: draw without buffers skipped");
            return;
        };
        let (Some(vertices), Some(indices)) =
            (vertex_buffer(&self.buffers, vbo), index_buffer(&self.buffers, ibo))
        else {
            log::warn!("WgpuBackend: draw with invalid buffers skipped");
            return;
        };

        let ubo = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quadrant uniforms"),
            contents: &program.block,
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = {
            let mut entries = Vec::with_capacity(TEXTURE_UNITS + 2);
            entries.push(wgpu::BindGroupEntry {
                binding: UNIFORM_BINDING,
                resource: ubo.as_entire_binding(),
            });
            for unit in 0..TEXTURE_UNITS {
                entries.push(wgpu::BindGroupEntry {
                    binding: FIRST_TEXTURE_BINDING + unit as u32,
                    resource: wgpu::BindingResource::TextureView(self.unit_view(unit)),
                });
            }
            entries.push(wgpu::BindGroupEntry {
                binding: SAMPLER_BINDING,
                resource: wgpu::BindingResource::Sampler(&self.sampler),
            });

            self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("quadrant draw bind group"),
                layout: &program.bind_group_layout,
                entries: &entries,
            })
        };

        let Some(frame) = self.frame.as_mut() else { return; };
        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("quadrant draw pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
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

        rpass.set_pipeline(&program.pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.set_vertex_buffer(0, vertices.slice(..));
        rpass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..index_count, 0, 0..1);
    }
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> GpuTexture {
    let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture { _texture: texture, view }
}

fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}
