use std::path::{Path, PathBuf};

use crate::{
    error::{RenderError, Result},
    shader::ShaderStage,
    target::Extent,
};

/// Device and swap chain settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Initial back buffer size.
    pub extent: Extent,
    pub clear_color: [f32; 4],
    pub buffer_count: u32,
    /// Creates the device with the debug layer and reports live objects on teardown.
    pub debug_layer: bool,
    /// Tags created objects with names for the debug layer and graphics debuggers.
    pub debug_names: bool,
}

impl RendererConfig {
    pub const DEFAULT_EXTENT: Extent = Extent::new(1280, 720);
    pub const DEFAULT_CLEAR_COLOR: [f32; 4] = [1.0, 0.125, 0.25, 1.0];
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            extent: Self::DEFAULT_EXTENT,
            clear_color: Self::DEFAULT_CLEAR_COLOR,
            buffer_count: 2,
            debug_layer: cfg!(debug_assertions),
            debug_names: cfg!(debug_assertions),
        }
    }
}

/// Shader sources of the triangle scene, relative to the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneConfig {
    pub vertex_shader: PathBuf,
    pub pixel_shader: PathBuf,
    /// Compiles with debug info and without optimization.
    pub shader_debug_info: bool,
}

impl SceneConfig {
    /// Assigns two shader files to their stages by the `.vs` / `.ps` naming convention.
    pub fn from_sources(first: impl Into<PathBuf>, second: impl Into<PathBuf>) -> Result<Self> {
        let (first, second) = (first.into(), second.into());
        let (vertex_shader, pixel_shader) = match (stage_of(&first)?, stage_of(&second)?) {
            (ShaderStage::Vertex, ShaderStage::Pixel) => (first, second),
            (ShaderStage::Pixel, ShaderStage::Vertex) => (second, first),
            // two sources for the same stage, the second one has nothing to pair with
            _ => return Err(RenderError::UnknownShaderStage { path: second }),
        };

        Ok(Self {
            vertex_shader,
            pixel_shader,
            ..Default::default()
        })
    }
}

fn stage_of(path: &Path) -> Result<ShaderStage> {
    ShaderStage::infer(path).ok_or_else(|| RenderError::UnknownShaderStage {
        path: path.to_path_buf(),
    })
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            vertex_shader: PathBuf::from("shaders/triangle.vs"),
            pixel_shader: PathBuf::from("shaders/triangle.ps"),
            shader_debug_info: cfg!(debug_assertions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_and_clear_color() {
        let config = RendererConfig::default();
        assert_eq!(config.extent, Extent::new(1280, 720));
        assert_eq!(config.clear_color, [1.0, 0.125, 0.25, 1.0]);
        assert_eq!(config.buffer_count, 2);
        assert_eq!(config.debug_layer, cfg!(debug_assertions));
    }

    #[test]
    fn default_shaders_follow_naming_convention() {
        let config = SceneConfig::default();
        assert_eq!(ShaderStage::infer(&config.vertex_shader), Some(ShaderStage::Vertex));
        assert_eq!(ShaderStage::infer(&config.pixel_shader), Some(ShaderStage::Pixel));
    }

    #[test]
    fn bundled_sources_match_default_paths() {
        let config =
            SceneConfig::from_sources("shaders/triangle.vs", "shaders/triangle.ps").unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn sources_are_sorted_by_stage() {
        let config = SceneConfig::from_sources("color.ps", "color.vs").unwrap();
        assert_eq!(config.vertex_shader, PathBuf::from("color.vs"));
        assert_eq!(config.pixel_shader, PathBuf::from("color.ps"));
    }

    #[test]
    fn unmarked_source_is_rejected() {
        let err = SceneConfig::from_sources("triangle.vs", "triangle.hlsl").unwrap_err();
        assert!(matches!(
            err,
            RenderError::UnknownShaderStage { ref path } if path == &PathBuf::from("triangle.hlsl")
        ));

        assert!(SceneConfig::from_sources("a.vs", "b.vs").is_err());
    }
}
