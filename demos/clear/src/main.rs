//! Opens a window and clears it to a solid color every frame.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::process::ExitCode;

use tracing::error;

#[cfg(windows)]
fn run() -> anyhow::Result<i32> {
    use dx11_lab_renderer::{Renderer, RendererConfig};
    use dx11_lab_shell::WindowConfig;

    dx11_lab_shell::run(&WindowConfig::new("clear"), |hwnd, extent| {
        let config = RendererConfig {
            extent,
            ..Default::default()
        };

        Ok(Renderer::new(hwnd, &config)?)
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
            error!("clear demo failed. err: {err:?}");
            ExitCode::FAILURE
        }
    }
}
