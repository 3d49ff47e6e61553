use core::ffi::CStr;
use std::path::Path;

/// Pipeline stage a shader source is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

impl ShaderStage {
    pub const fn entry_point(self) -> &'static CStr {
        match self {
            Self::Vertex => c"vs_main",
            Self::Pixel => c"ps_main",
        }
    }

    pub const fn profile(self) -> &'static CStr {
        match self {
            Self::Vertex => c"vs_5_0",
            Self::Pixel => c"ps_5_0",
        }
    }

    /// Guesses the stage from a `.vs` / `.ps` marker anywhere in the path.
    pub fn infer(path: &Path) -> Option<Self> {
        let path = path.to_string_lossy();
        if path.contains(".vs") {
            Some(Self::Vertex)
        } else if path.contains(".ps") {
            Some(Self::Pixel)
        } else {
            None
        }
    }
}

#[cfg(windows)]
pub use compile::{ShaderBytecode, compile_file};

#[cfg(windows)]
mod compile {
    use std::{ffi::CString, fs, path::Path};

    use tracing::{debug, error};
    use windows::{
        Win32::Graphics::Direct3D::{
            Fxc::{
                D3DCOMPILE_DEBUG, D3DCOMPILE_ENABLE_STRICTNESS, D3DCOMPILE_OPTIMIZATION_LEVEL3,
                D3DCOMPILE_SKIP_OPTIMIZATION, D3DCompile,
            },
            ID3DBlob,
        },
        core::PCSTR,
    };

    use super::ShaderStage;
    use crate::{
        error::{RenderError, Result},
        util::blob_bytes,
    };

    pub struct ShaderBytecode {
        blob: ID3DBlob,
    }

    impl ShaderBytecode {
        #[inline]
        pub fn as_bytes(&self) -> &[u8] {
            unsafe { blob_bytes(&self.blob) }
        }
    }

    /// Reads and compiles a shader source file for `stage`.
    ///
    /// Compiler diagnostics are logged and carried in [`RenderError::ShaderCompile`].
    #[tracing::instrument]
    pub fn compile_file(
        path: &Path,
        stage: ShaderStage,
        debug_info: bool,
    ) -> Result<ShaderBytecode> {
        let source = fs::read(path).map_err(|source| RenderError::ShaderIo {
            path: path.to_path_buf(),
            source,
        })?;
        // only used by the compiler for messages
        let source_name = CString::new(path.to_string_lossy().into_owned()).unwrap_or_default();

        let flags = if debug_info {
            D3DCOMPILE_DEBUG | D3DCOMPILE_SKIP_OPTIMIZATION
        } else {
            D3DCOMPILE_OPTIMIZATION_LEVEL3
        } | D3DCOMPILE_ENABLE_STRICTNESS;

        let mut code = None;
        let mut errors = None;
        let res = unsafe {
            D3DCompile(
                source.as_ptr() as _,
                source.len(),
                PCSTR(source_name.as_ptr() as _),
                None,
                None,
                PCSTR(stage.entry_point().as_ptr() as _),
                PCSTR(stage.profile().as_ptr() as _),
                flags,
                0,
                &mut code,
                Some(&mut errors as *mut _),
            )
        };

        let diagnostics = errors
            .map(|blob: ID3DBlob| {
                String::from_utf8_lossy(unsafe { blob_bytes(&blob) })
                    .trim_end_matches('\0')
                    .trim_end()
                    .to_string()
            })
            .unwrap_or_default();

        if let Err(err) = res {
            let diagnostics = if diagnostics.is_empty() {
                err.message()
            } else {
                diagnostics
            };
            error!("shader compilation failed. path: {path:?}\n{diagnostics}");

            return Err(RenderError::ShaderCompile {
                path: path.to_path_buf(),
                diagnostics,
            });
        }

        if !diagnostics.is_empty() {
            debug!("compiler output for {path:?}\n{diagnostics}");
        }

        let blob = code.ok_or(RenderError::missing("D3DCompile"))?;
        Ok(ShaderBytecode { blob })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_entry_points() {
        assert_eq!(ShaderStage::Vertex.entry_point().to_str(), Ok("vs_main"));
        assert_eq!(ShaderStage::Vertex.profile().to_str(), Ok("vs_5_0"));
        assert_eq!(ShaderStage::Pixel.entry_point().to_str(), Ok("ps_main"));
        assert_eq!(ShaderStage::Pixel.profile().to_str(), Ok("ps_5_0"));
    }

    #[test]
    fn infer_from_name_markers() {
        assert_eq!(
            ShaderStage::infer(Path::new("shaders/triangle.vs")),
            Some(ShaderStage::Vertex)
        );
        assert_eq!(
            ShaderStage::infer(Path::new("shaders/triangle.ps")),
            Some(ShaderStage::Pixel)
        );
        assert_eq!(
            ShaderStage::infer(Path::new("color.ps.hlsl")),
            Some(ShaderStage::Pixel)
        );
    }

    #[test]
    fn infer_without_marker_fails() {
        assert_eq!(ShaderStage::infer(Path::new("shaders/triangle.hlsl")), None);
        assert_eq!(ShaderStage::infer(Path::new("")), None);
        assert_eq!(ShaderStage::infer(Path::new("vs_ps")), None);
    }
}
