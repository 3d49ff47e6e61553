//! Direct3D 11 device bring-up.
//!
//! [`Renderer`] owns the device, the immediate context, the swap chain with its
//! render target view and, optionally, the static triangle [`Scene`].
//! Every GPU object is released by drop, in reverse creation order.
//!
//! The platform independent parts (adapter filtering, vertex format, shader stage
//! selection, render target state) are available on every target.

pub mod adapter;
pub mod config;
pub mod error;
pub mod mesh;
pub mod shader;
pub mod target;

#[cfg(windows)]
pub mod device;
#[cfg(windows)]
pub mod frame;
#[cfg(windows)]
pub mod scene;
#[cfg(windows)]
pub mod swapchain;
#[cfg(windows)]
mod util;

pub use config::{RendererConfig, SceneConfig};
pub use error::{RenderError, Result};
pub use shader::ShaderStage;
pub use target::Extent;

#[cfg(windows)]
pub use frame::Renderer;
#[cfg(windows)]
pub use scene::Scene;
