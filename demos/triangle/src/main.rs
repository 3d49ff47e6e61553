//! Draws a vertex colored triangle over the clear color every frame.
//!
//! Shader sources are loaded from `shaders/` relative to the working directory.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::process::ExitCode;

use tracing::error;

#[cfg(windows)]
fn run() -> anyhow::Result<i32> {
    use anyhow::Context;
    use dx11_lab_renderer::{Renderer, RendererConfig, SceneConfig};
    use dx11_lab_shell::WindowConfig;

    let mut dir = std::path::Path::new("shaders");
    if !dir.is_dir() {
        // started through cargo from the workspace root
        dir = std::path::Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders"));
    }
    let scene = SceneConfig::from_sources(dir.join("triangle.vs"), dir.join("triangle.ps"))?;

    dx11_lab_shell::run(&WindowConfig::new("triangle"), |hwnd, extent| {
        let config = RendererConfig {
            extent,
            ..Default::default()
        };

        Renderer::new(hwnd, &config)?
            .with_scene(&scene)
            .context("cannot create triangle scene")
    })
}

#[cfg(not(windows))]
fn run() -> anyhow::Result<i32> {
    anyhow::bail!("Direct3D 11 is only available on Windows")
}

fn main() -> ExitCode {
    dx11_lab_shell::setup_tracing();

    match run() {
        Ok(code) => ExitCode::from(dx11_lab_shell::exit_status(code)),
        Err(err) => {
            error!("triangle demo failed. err: {err:?}");
            ExitCode::FAILURE
        }
    }
}
