use tracing::{debug, info};
use windows::Win32::{
    Foundation::{HWND, RECT},
    Graphics::Direct3D11::D3D11_VIEWPORT,
};

use crate::{
    config::{RendererConfig, SceneConfig},
    device::GraphicsDevice,
    error::Result,
    scene::Scene,
    swapchain::SwapChainTarget,
    target::Extent,
};

/// Owning renderer context.
///
/// Field order is teardown order: scene objects, then the back buffer view and
/// swap chain, then the immediate context and device.
pub struct Renderer {
    scene: Option<Scene>,
    target: SwapChainTarget,
    device: GraphicsDevice,
    clear_color: [f32; 4],
    debug_names: bool,
}

impl Renderer {
    /// Creates the device and a swap chain for `hwnd`.
    #[tracing::instrument(skip(config))]
    pub fn new(hwnd: HWND, config: &RendererConfig) -> Result<Self> {
        let (device, factory) = GraphicsDevice::new(config)?;
        let target = SwapChainTarget::new(&factory, &device, hwnd, config)?;
        drop(factory);

        info!(
            "renderer ready. adapter: {} extent: {:?}",
            device.adapter_name(),
            target.extent()
        );

        Ok(Self {
            scene: None,
            target,
            device,
            clear_color: config.clear_color,
            debug_names: config.debug_names,
        })
    }

    /// Uploads the static triangle and compiles its shaders.
    pub fn with_scene(mut self, config: &SceneConfig) -> Result<Self> {
        self.scene = Some(Scene::new(&self.device, config, self.debug_names)?);
        Ok(self)
    }

    /// Records and presents one frame.
    ///
    /// Without a back buffer view (after a failed resize) nothing is drawn but the frame
    /// is still presented.
    pub fn render(&mut self) -> Result<()> {
        let cx = self.device.context();
        unsafe {
            cx.ClearState();

            if let Some(view) = self.target.view() {
                cx.OMSetRenderTargets(Some(&[Some(view.clone())]), None);
                cx.ClearRenderTargetView(view, &self.clear_color);

                if let Some(ref scene) = self.scene {
                    let extent = self.target.extent();
                    let [x, y, width, height] = extent.viewport();
                    cx.RSSetViewports(Some(&[D3D11_VIEWPORT {
                        TopLeftX: x,
                        TopLeftY: y,
                        Width: width,
                        Height: height,
                        MinDepth: 0.0,
                        MaxDepth: 1.0,
                    }]));
                    cx.RSSetScissorRects(Some(&[RECT {
                        left: 0,
                        top: 0,
                        right: extent.width as _,
                        bottom: extent.height as _,
                    }]));

                    scene.draw(cx);
                }
            }
        }

        self.target.present()
    }

    /// Rebuilds the swap chain buffers for a new client size.
    pub fn resize(&mut self, extent: Extent) -> Result<()> {
        self.target.resize(&self.device, extent)?;
        debug!("resized to {:?}", self.target.extent());
        Ok(())
    }
}
