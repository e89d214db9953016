//! Headless backend that records every call.
//!
//! Useful for tests and frame captures: `draws()` replays the command stream
//! and reports what each draw call would have rendered.

use std::collections::{BTreeMap, HashMap};

use crate::assets::AssetError;

use super::vertex::{INDICES_PER_QUAD, QUAD_FLOATS, VERTEX_SIZE};
use super::{BufferId, ProgramDesc, ProgramId, RenderBackend, TextureId, UniformValue};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    CreateProgram { program: ProgramId, label: String },
    CreateTexture { texture: TextureId, label: String, width: u32, height: u32 },
    CreateVertexBuffer { buffer: BufferId, label: String, size_bytes: u64 },
    CreateIndexBuffer { buffer: BufferId, label: String, count: usize },
    WriteVertices { buffer: BufferId, data: Vec<f32> },
    UseProgram(ProgramId),
    DetachProgram(ProgramId),
    SetUniform { program: ProgramId, name: String, value: UniformValue },
    BindTexture { unit: u32, texture: TextureId },
    UnbindTexture { unit: u32 },
    BindBuffers { vertices: BufferId, indices: BufferId },
    UnbindBuffers,
    DrawIndexed { index_count: u32 },
}

/// State observed by one `draw_indexed` call during replay.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub program: Option<ProgramId>,
    pub vertex_buffer: Option<BufferId>,
    pub index_count: u32,
    /// Bound textures by unit.
    pub textures: BTreeMap<u32, TextureId>,
    /// Last value set for each uniform of the bound program.
    pub uniforms: BTreeMap<String, UniformValue>,
    /// Vertex floats covered by the draw.
    pub vertices: Vec<f32>,
}

impl RecordedDraw {
    #[inline]
    pub fn quad_count(&self) -> usize {
        self.index_count as usize / INDICES_PER_QUAD
    }

    /// The `VERTEX_SIZE` floats of `corner` (0..4) of quad `quad`.
    pub fn vertex(&self, quad: usize, corner: usize) -> &[f32] {
        let at = quad * QUAD_FLOATS + corner * VERTEX_SIZE;
        &self.vertices[at..at + VERTEX_SIZE]
    }
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<GpuCommand>,
    next_program: u32,
    next_texture: u32,
    next_buffer: u32,
    index_buffers: HashMap<BufferId, Vec<u32>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call since construction (or the last [`clear_commands`](Self::clear_commands)).
    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    /// Forgets recorded commands but keeps created resources.
    ///
    /// Vertex contents written before the clear are not replayed by
    /// [`draws`](Self::draws) afterwards.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of recorded commands matching `pred`.
    pub fn count(&self, pred: impl Fn(&GpuCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    pub fn index_contents(&self, buffer: BufferId) -> Option<&[u32]> {
        self.index_buffers.get(&buffer).map(Vec::as_slice)
    }

    /// Replays the command stream and snapshots each draw call.
    pub fn draws(&self) -> Vec<RecordedDraw> {
        let mut program = None;
        let mut buffers: Option<(BufferId, BufferId)> = None;
        let mut textures = BTreeMap::new();
        let mut uniforms: HashMap<ProgramId, BTreeMap<String, UniformValue>> = HashMap::new();
        let mut contents: HashMap<BufferId, Vec<f32>> = HashMap::new();
        let mut draws = Vec::new();

        for cmd in &self.commands {
            match cmd {
                GpuCommand::WriteVertices { buffer, data } => {
                    let dst = contents.entry(*buffer).or_default();
                    if dst.len() < data.len() {
                        dst.resize(data.len(), 0.0);
                    }
                    dst[..data.len()].copy_from_slice(data);
                }
                GpuCommand::UseProgram(p) => program = Some(*p),
                GpuCommand::DetachProgram(p) => {
                    if program == Some(*p) {
                        program = None;
                    }
                }
                GpuCommand::SetUniform { program: p, name, value } => {
                    uniforms.entry(*p).or_default().insert(name.clone(), value.clone());
                }
                GpuCommand::BindTexture { unit, texture } => {
                    textures.insert(*unit, *texture);
                }
                GpuCommand::UnbindTexture { unit } => {
                    textures.remove(unit);
                }
                GpuCommand::BindBuffers { vertices, indices } => {
                    buffers = Some((*vertices, *indices));
                }
                GpuCommand::UnbindBuffers => buffers = None,
                GpuCommand::DrawIndexed { index_count } => {
                    let vertex_buffer = buffers.map(|(v, _)| v);
                    let floats = *index_count as usize / INDICES_PER_QUAD * QUAD_FLOATS;
                    let vertices = vertex_buffer
                        .and_then(|v| contents.get(&v))
                        .map(|data| data[..floats.min(data.len())].to_vec())
                        .unwrap_or_default();

                    draws.push(RecordedDraw {
                        program,
                        vertex_buffer,
                        index_count: *index_count,
                        textures: textures.clone(),
                        uniforms: program
                            .and_then(|p| uniforms.get(&p).cloned())
                            .unwrap_or_default(),
                        vertices,
                    });
                }
                GpuCommand::CreateProgram { .. }
                | GpuCommand::CreateTexture { .. }
                | GpuCommand::CreateVertexBuffer { .. }
                | GpuCommand::CreateIndexBuffer { .. } => {}
            }
        }

        draws
    }

    fn next_buffer_id(&mut self) -> BufferId {
        let id = BufferId(self.next_buffer);
        self.next_buffer += 1;
        id
    }
}

impl RenderBackend for RecordingBackend {
    fn create_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramId, AssetError> {
        let program = ProgramId(self.next_program);
        self.next_program += 1;
        self.commands.push(GpuCommand::CreateProgram { program, label: desc.label.to_string() });
        Ok(program)
    }

    fn create_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureId, AssetError> {
        super::check_texture_data(label, width, height, rgba)?;

        let texture = TextureId(self.next_texture);
        self.next_texture += 1;
        self.commands.push(GpuCommand::CreateTexture {
            texture,
            label: label.to_string(),
            width,
            height,
        });
        Ok(texture)
    }

    fn create_vertex_buffer(&mut self, label: &str, size_bytes: u64) -> BufferId {
        let buffer = self.next_buffer_id();
        self.commands.push(GpuCommand::CreateVertexBuffer {
            buffer,
            label: label.to_string(),
            size_bytes,
        });
        buffer
    }

    fn create_index_buffer(&mut self, label: &str, indices: &[u32]) -> BufferId {
        let buffer = self.next_buffer_id();
        self.index_buffers.insert(buffer, indices.to_vec());
        self.commands.push(GpuCommand::CreateIndexBuffer {
            buffer,
            label: label.to_string(),
            count: indices.len(),
        });
        buffer
    }

    fn write_vertices(&mut self, buffer: BufferId, data: &[f32]) {
        self.commands.push(GpuCommand::WriteVertices { buffer, data: data.to_vec() });
    }

    fn use_program(&mut self, program: ProgramId) {
        self.commands.push(GpuCommand::UseProgram(program));
    }

    fn detach_program(&mut self, program: ProgramId) {
        self.commands.push(GpuCommand::DetachProgram(program));
    }

    fn set_uniform(&mut self, program: ProgramId, name: &str, value: UniformValue) {
        self.commands.push(GpuCommand::SetUniform { program, name: name.to_string(), value });
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.commands.push(GpuCommand::BindTexture { unit, texture });
    }

    fn unbind_texture(&mut self, unit: u32) {
        self.commands.push(GpuCommand::UnbindTexture { unit });
    }

    fn bind_buffers(&mut self, vertices: BufferId, indices: BufferId) {
        self.commands.push(GpuCommand::BindBuffers { vertices, indices });
    }

    fn unbind_buffers(&mut self) {
        self.commands.push(GpuCommand::UnbindBuffers);
    }

    fn draw_indexed(&mut self, index_count: u32) {
        self.commands.push(GpuCommand::DrawIndexed { index_count });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_snapshot_bound_state() {
        let mut gpu = RecordingBackend::new();
        let program = gpu
            .create_program(&ProgramDesc { label: "p", wgsl: "", uniforms: &[] })
            .unwrap();
        let texture = gpu.create_texture("t", 1, 1, &[255; 4]).unwrap();
        let vbo = gpu.create_vertex_buffer("v", 1024);
        let ibo = gpu.create_index_buffer("i", &[0, 1, 2, 0, 2, 3]);

        let quad: Vec<f32> = (0..QUAD_FLOATS).map(|i| i as f32).collect();
        gpu.write_vertices(vbo, &quad);
        gpu.use_program(program);
        gpu.set_uniform(program, "u_radius", UniformValue::Float(4.0));
        gpu.bind_texture(1, texture);
        gpu.bind_buffers(vbo, ibo);
        gpu.draw_indexed(6);
        gpu.unbind_texture(1);
        gpu.unbind_buffers();
        gpu.detach_program(program);
        gpu.draw_indexed(6);

        let draws = gpu.draws();
        assert_eq!(draws.len(), 2);

        let first = &draws[0];
        assert_eq!(first.program, Some(program));
        assert_eq!(first.vertex_buffer, Some(vbo));
        assert_eq!(first.quad_count(), 1);
        assert_eq!(first.textures.get(&1), Some(&texture));
        assert_eq!(first.uniforms.get("u_radius"), Some(&UniformValue::Float(4.0)));
        assert_eq!(first.vertex(0, 1)[0], VERTEX_SIZE as f32);

        let second = &draws[1];
        assert_eq!(second.program, None);
        assert!(second.textures.is_empty());
        assert!(second.vertices.is_empty());
    }

    #[test]
    fn rejects_short_pixel_data() {
        let mut gpu = RecordingBackend::new();
        let err = gpu.create_texture("short", 2, 2, &[0; 8]).unwrap_err();
        assert!(matches!(err, AssetError::TextureSize { expected: 16, actual: 8, .. }));
    }
}
