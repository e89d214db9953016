use std::cell::Cell;

use nalgebra::{Matrix3, Matrix4, Vector2, Vector3, Vector4};

use crate::gfx::{ProgramDesc, ProgramId, RenderBackend, UniformValue};

use super::AssetError;

/// A compiled program plus a bound flag.
///
/// `use_program` only reaches the backend when the program is not already
/// bound. Every upload binds first, so uploads never land on another program.
#[derive(Debug)]
pub struct Shader {
    program: ProgramId,
    label: String,
    bound: Cell<bool>,
}

impl Shader {
    pub(crate) fn new(program: ProgramId, label: impl Into<String>) -> Self {
        Self { program, label: label.into(), bound: Cell::new(false) }
    }

    /// Compiles `desc` through `gpu`.
    pub fn compile<B: RenderBackend + ?Sized>(
        gpu: &mut B,
        desc: &ProgramDesc<'_>,
    ) -> Result<Self, AssetError> {
        let program = gpu.create_program(desc)?;
        log::debug!("shader '{}' compiled as {:?}", desc.label, program);
        Ok(Self::new(program, desc.label))
    }

    #[inline]
    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.bound.get()
    }

    pub fn use_program<B: RenderBackend + ?Sized>(&self, gpu: &mut B) {
        if !self.bound.get() {
            gpu.use_program(self.program);
            self.bound.set(true);
        }
    }

    pub fn detach<B: RenderBackend + ?Sized>(&self, gpu: &mut B) {
        gpu.detach_program(self.program);
        self.bound.set(false);
    }

    fn upload<B: RenderBackend + ?Sized>(&self, gpu: &mut B, name: &str, value: UniformValue) {
        self.use_program(gpu);
        gpu.set_uniform(self.program, name, value);
    }

    pub fn upload_mat4<B: RenderBackend + ?Sized>(&self, gpu: &mut B, name: &str, m: &Matrix4<f32>) {
        self.upload(gpu, name, UniformValue::mat4(m));
    }

    pub fn upload_mat3<B: RenderBackend + ?Sized>(&self, gpu: &mut B, name: &str, m: &Matrix3<f32>) {
        self.upload(gpu, name, UniformValue::mat3(m));
    }

    pub fn upload_vec4<B: RenderBackend + ?Sized>(&self, gpu: &mut B, name: &str, v: &Vector4<f32>) {
        self.upload(gpu, name, UniformValue::Vec4([v.x, v.y, v.z, v.w]));
    }

    pub fn upload_vec3<B: RenderBackend + ?Sized>(&self, gpu: &mut B, name: &str, v: &Vector3<f32>) {
        self.upload(gpu, name, UniformValue::Vec3([v.x, v.y, v.z]));
    }

    pub fn upload_vec2<B: RenderBackend + ?Sized>(&self, gpu: &mut B, name: &str, v: &Vector2<f32>) {
        self.upload(gpu, name, UniformValue::Vec2([v.x, v.y]));
    }

    pub fn upload_float<B: RenderBackend + ?Sized>(&self, gpu: &mut B, name: &str, v: f32) {
        self.upload(gpu, name, UniformValue::Float(v));
    }

    pub fn upload_int<B: RenderBackend + ?Sized>(&self, gpu: &mut B, name: &str, v: i32) {
        self.upload(gpu, name, UniformValue::Int(v));
    }

    /// Points a sampler uniform at texture `unit`.
    pub fn upload_texture<B: RenderBackend + ?Sized>(&self, gpu: &mut B, name: &str, unit: u32) {
        self.upload(gpu, name, UniformValue::Sampler(unit));
    }

    pub fn upload_int_array<B: RenderBackend + ?Sized>(&self, gpu: &mut B, name: &str, v: &[i32]) {
        self.upload(gpu, name, UniformValue::IntArray(v.to_vec()));
    }
}

/// Parses and validates WGSL, returning compiler diagnostics on failure.
pub fn validate_wgsl(label: &str, source: &str) -> Result<(), AssetError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| AssetError::ShaderCompile {
        label: label.to_string(),
        diagnostics: e.emit_to_string(source),
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| AssetError::ShaderCompile {
        label: label.to_string(),
        diagnostics: e.emit_to_string(source),
    })?;

    Ok(())
}
