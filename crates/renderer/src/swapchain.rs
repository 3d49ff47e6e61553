use tracing::{debug, info, warn};
use windows::{
    Win32::{
        Foundation::HWND,
        Graphics::{
            Direct3D11::{D3D11_TEXTURE2D_DESC, ID3D11RenderTargetView, ID3D11Texture2D},
            Dxgi::{
                Common::{
                    DXGI_FORMAT_R8G8B8A8_UNORM, DXGI_FORMAT_UNKNOWN, DXGI_MODE_DESC,
                    DXGI_SAMPLE_DESC,
                },
                DXGI_PRESENT, DXGI_SWAP_CHAIN_DESC, DXGI_SWAP_CHAIN_FLAG,
                DXGI_SWAP_EFFECT_FLIP_DISCARD, DXGI_USAGE_RENDER_TARGET_OUTPUT, IDXGIFactory1,
                IDXGISwapChain,
            },
        },
    },
    core::BOOL,
};

use crate::{
    config::RendererConfig,
    device::GraphicsDevice,
    error::{RenderError, Result},
    target::{Extent, RenderTarget},
    util::set_debug_name,
};

/// Flip discard swap chain with the view of its current back buffer.
pub struct SwapChainTarget {
    // declared before the swap chain so the view is released first
    target: RenderTarget<ID3D11RenderTargetView>,
    swap_chain: IDXGISwapChain,
    extent: Extent,
    debug_names: bool,
}

impl SwapChainTarget {
    #[tracing::instrument(skip(factory, device, config))]
    pub fn new(
        factory: &IDXGIFactory1,
        device: &GraphicsDevice,
        hwnd: HWND,
        config: &RendererConfig,
    ) -> Result<Self> {
        let desc = DXGI_SWAP_CHAIN_DESC {
            BufferDesc: DXGI_MODE_DESC {
                Width: config.extent.width,
                Height: config.extent.height,
                Format: DXGI_FORMAT_R8G8B8A8_UNORM,
                ..Default::default()
            },
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            BufferCount: config.buffer_count,
            OutputWindow: hwnd,
            Windowed: BOOL(1),
            SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
            Flags: 0,
        };

        let mut swap_chain = None;
        unsafe { factory.CreateSwapChain(device.device(), &desc, &mut swap_chain) }
            .ok()
            .map_err(RenderError::graphics("CreateSwapChain"))?;
        let swap_chain = swap_chain.ok_or(RenderError::missing("CreateSwapChain"))?;

        let (view, extent) = create_back_buffer_view(device, &swap_chain, config.debug_names)?;
        debug!("swap chain created. extent: {extent:?}");

        Ok(Self {
            target: RenderTarget::Bound(view),
            swap_chain,
            extent,
            debug_names: config.debug_names,
        })
    }

    #[inline]
    pub fn view(&self) -> Option<&ID3D11RenderTargetView> {
        self.target.view()
    }

    #[inline]
    pub const fn extent(&self) -> Extent {
        self.extent
    }

    /// Resizes the swap chain buffers and recreates the back buffer view.
    ///
    /// On error no view is bound until the next successful resize.
    #[tracing::instrument(skip(self, device))]
    pub fn resize(&mut self, device: &GraphicsDevice, extent: Extent) -> Result<()> {
        if extent.is_empty() {
            debug!("ignoring empty resize");
            return Ok(());
        }

        let was_degraded = self.target.is_degraded();
        unsafe {
            device.context().OMSetRenderTargets(None, None);
        }
        drop(self.target.begin_resize());

        let res = unsafe {
            self.swap_chain.ResizeBuffers(
                0,
                extent.width,
                extent.height,
                DXGI_FORMAT_UNKNOWN,
                DXGI_SWAP_CHAIN_FLAG(0),
            )
        };
        if let Err(err) = res {
            // the old buffers are still usable
            warn!("ResizeBuffers failed. err: {err:?}");
        }

        let view = create_back_buffer_view(device, &self.swap_chain, self.debug_names).map(
            |(view, extent)| {
                self.extent = extent;
                view
            },
        );
        self.target.finish_resize(view)?;
        if was_degraded {
            info!("render target restored. extent: {:?}", self.extent);
        }

        Ok(())
    }

    pub fn present(&self) -> Result<()> {
        unsafe { self.swap_chain.Present(0, DXGI_PRESENT(0)) }
            .ok()
            .map_err(RenderError::graphics("Present"))
    }
}

/// Creates a view over back buffer 0, returning it with the buffer size.
fn create_back_buffer_view(
    device: &GraphicsDevice,
    swap_chain: &IDXGISwapChain,
    debug_names: bool,
) -> Result<(ID3D11RenderTargetView, Extent)> {
    let back_buffer = unsafe { swap_chain.GetBuffer::<ID3D11Texture2D>(0) }
        .map_err(RenderError::graphics("GetBuffer"))?;

    let mut desc = D3D11_TEXTURE2D_DESC::default();
    unsafe {
        back_buffer.GetDesc(&mut desc);
    }

    let mut view = None;
    unsafe {
        device
            .device()
            .CreateRenderTargetView(&back_buffer, None, Some(&mut view))
    }
    .map_err(RenderError::graphics("CreateRenderTargetView"))?;
    let view = view.ok_or(RenderError::missing("CreateRenderTargetView"))?;

    if debug_names {
        set_debug_name(&view, "back buffer view");
    }

    Ok((view, Extent::new(desc.Width, desc.Height)))
}
