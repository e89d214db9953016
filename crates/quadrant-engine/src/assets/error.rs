use thiserror::Error;

/// Failures while creating GPU-side assets.
///
/// All of these happen at load time; the render path itself never fails.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("shader '{label}' failed to compile:\n{diagnostics}")]
    ShaderCompile { label: String, diagnostics: String },

    #[error("texture '{name}' expects {expected} bytes of RGBA8 data, got {actual}")]
    TextureSize { name: String, expected: usize, actual: usize },

    #[error("texture '{name}' has a zero dimension")]
    EmptyTexture { name: String },

    #[error("no shader named '{0}' in the asset cache")]
    MissingShader(String),
}
