use std::{io, path::PathBuf};

use derive_more::{Display, Error};

pub type Result<T> = core::result::Result<T, RenderError>;

/// Failures of device bring-up, scene setup and frame submission.
#[derive(Debug, Display, Error)]
pub enum RenderError {
    #[display("no hardware adapter found, only the Microsoft Basic Render Driver is available")]
    NoHardwareAdapter,

    #[display("feature level {requested:#x} is not available (device reported {obtained:#x})")]
    FeatureLevel { requested: i32, obtained: i32 },

    /// A Direct3D or DXGI call returned a failing HRESULT.
    #[display("{op} failed ({code:#010x}): {message}")]
    Graphics {
        op: &'static str,
        code: i32,
        message: String,
    },

    /// The call succeeded but did not hand out the object it should have created.
    #[display("{op} returned no object")]
    MissingOutput { op: &'static str },

    #[display("cannot read shader source `{}`", path.display())]
    ShaderIo { path: PathBuf, source: io::Error },

    #[display("failed to compile `{}`:\n{diagnostics}", path.display())]
    ShaderCompile { path: PathBuf, diagnostics: String },

    #[display("no `.vs` or `.ps` stage marker in shader name `{}`", path.display())]
    UnknownShaderStage { path: PathBuf },
}

impl RenderError {
    /// Maps a `windows` error of the named call, for use with `map_err`.
    #[cfg(windows)]
    pub(crate) fn graphics(op: &'static str) -> impl FnOnce(windows::core::Error) -> Self {
        move |err| Self::Graphics {
            op,
            code: err.code().0,
            message: err.message(),
        }
    }

    #[cfg_attr(not(windows), allow(dead_code))]
    pub(crate) const fn missing(op: &'static str) -> Self {
        Self::MissingOutput { op }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphics_error_shows_code_in_hex() {
        let err = RenderError::Graphics {
            op: "ResizeBuffers",
            code: 0x887A0001_u32 as i32,
            message: "The application made a call that is invalid.".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "ResizeBuffers failed (0x887a0001): The application made a call that is invalid."
        );
    }

    #[test]
    fn compile_error_keeps_diagnostics() {
        let err = RenderError::ShaderCompile {
            path: PathBuf::from("shaders/triangle.vs"),
            diagnostics: "error X3000: syntax error".to_string(),
        };

        let text = err.to_string();
        assert!(text.starts_with("failed to compile `shaders/triangle.vs`"));
        assert!(text.ends_with("error X3000: syntax error"));
    }

    #[test]
    fn io_error_is_exposed_as_source() {
        use std::error::Error as _;

        let err = RenderError::ShaderIo {
            path: PathBuf::from("missing.ps"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };

        assert!(err.source().is_some());
        assert!(RenderError::NoHardwareAdapter.source().is_none());
    }
}
