//! Adapter selection and device creation.

use core::mem::ManuallyDrop;

use tracing::{debug, info, warn};
use windows::{
    Win32::{
        Foundation::HMODULE,
        Graphics::{
            Direct3D::{D3D_DRIVER_TYPE_UNKNOWN, D3D_FEATURE_LEVEL, D3D_FEATURE_LEVEL_11_0},
            Direct3D11::{
                D3D11_CREATE_DEVICE_DEBUG, D3D11_CREATE_DEVICE_FLAG, D3D11_RLDO_DETAIL,
                D3D11_SDK_VERSION, D3D11CreateDevice, ID3D11Debug, ID3D11Device,
                ID3D11DeviceContext,
            },
            Dxgi::{CreateDXGIFactory1, DXGI_ERROR_UNSUPPORTED, IDXGIAdapter, IDXGIFactory1},
        },
    },
    core::{IUnknown, Interface},
};

use crate::{
    adapter::{decode_description, select_hardware},
    config::RendererConfig,
    error::{RenderError, Result},
    util::set_debug_name,
};

pub const REQUIRED_FEATURE_LEVEL: D3D_FEATURE_LEVEL = D3D_FEATURE_LEVEL_11_0;

/// Owns the device and its immediate context.
///
/// Dropping releases the context first, then the device. With the debug layer on,
/// objects still holding the device at that point are reported.
pub struct GraphicsDevice {
    cx: ManuallyDrop<ID3D11DeviceContext>,
    device: ManuallyDrop<ID3D11Device>,
    debug_layer: bool,
    adapter_name: String,
}

impl GraphicsDevice {
    /// Creates the device on the first hardware adapter.
    ///
    /// The factory is handed back so the swap chain is created by the same factory
    /// that enumerated the adapter.
    #[tracing::instrument(skip_all)]
    pub fn new(config: &RendererConfig) -> Result<(Self, IDXGIFactory1)> {
        let factory = unsafe { CreateDXGIFactory1::<IDXGIFactory1>() }
            .map_err(RenderError::graphics("CreateDXGIFactory1"))?;

        let (adapter, adapter_name) =
            select_hardware(enumerate_adapters(&factory)).ok_or(RenderError::NoHardwareAdapter)?;
        info!("using adapter: {adapter_name}");

        let mut flags = D3D11_CREATE_DEVICE_FLAG(0);
        if config.debug_layer {
            flags = flags | D3D11_CREATE_DEVICE_DEBUG;
        }

        let mut device = None;
        let mut cx = None;
        let mut level = D3D_FEATURE_LEVEL::default();
        unsafe {
            D3D11CreateDevice(
                &adapter,
                D3D_DRIVER_TYPE_UNKNOWN,
                HMODULE::default(),
                flags,
                Some(&[REQUIRED_FEATURE_LEVEL]),
                D3D11_SDK_VERSION,
                Some(&mut device),
                Some(&mut level),
                Some(&mut cx),
            )
        }
        .map_err(|err| {
            if err.code() == DXGI_ERROR_UNSUPPORTED {
                RenderError::FeatureLevel {
                    requested: REQUIRED_FEATURE_LEVEL.0,
                    obtained: level.0,
                }
            } else {
                RenderError::graphics("D3D11CreateDevice")(err)
            }
        })?;
        let device = device.ok_or(RenderError::missing("D3D11CreateDevice"))?;
        let cx = cx.ok_or(RenderError::missing("D3D11CreateDevice"))?;

        if level != REQUIRED_FEATURE_LEVEL {
            return Err(RenderError::FeatureLevel {
                requested: REQUIRED_FEATURE_LEVEL.0,
                obtained: level.0,
            });
        }

        if config.debug_names {
            set_debug_name(&cx, "immediate context");
        }
        debug!("device created. level: {:#x} flags: {:#x}", level.0, flags.0);

        Ok((
            Self {
                cx: ManuallyDrop::new(cx),
                device: ManuallyDrop::new(device),
                debug_layer: config.debug_layer,
                adapter_name,
            },
            factory,
        ))
    }

    #[inline]
    pub fn device(&self) -> &ID3D11Device {
        &self.device
    }

    #[inline]
    pub fn context(&self) -> &ID3D11DeviceContext {
        &self.cx
    }

    #[inline]
    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }
}

impl Drop for GraphicsDevice {
    fn drop(&mut self) {
        unsafe {
            self.cx.ClearState();
            self.cx.Flush();
            ManuallyDrop::drop(&mut self.cx);
        }

        let device = unsafe { ManuallyDrop::take(&mut self.device) };
        let debug = if self.debug_layer {
            device.cast::<ID3D11Debug>().ok()
        } else {
            None
        };

        // Release by hand to see how many references are left behind
        let device = ManuallyDrop::new(IUnknown::from(device));
        let remaining =
            unsafe { (Interface::vtable(&*device).Release)(Interface::as_raw(&*device)) };
        let expected = debug.is_some() as u32;

        if remaining > expected {
            warn!(
                "device still has {} references after teardown",
                remaining - expected
            );
            if let Some(ref debug) = debug {
                _ = unsafe { debug.ReportLiveDeviceObjects(D3D11_RLDO_DETAIL) };
            }
        } else {
            debug!("device released");
        }
    }
}

fn enumerate_adapters(factory: &IDXGIFactory1) -> impl Iterator<Item = (IDXGIAdapter, String)> {
    (0..)
        .map_while(|i| unsafe { factory.EnumAdapters(i) }.ok())
        .filter_map(|adapter| {
            let desc = unsafe { adapter.GetDesc() }.ok()?;
            let description = decode_description(&desc.Description);
            debug!("found adapter: {description}");

            Some((adapter, description))
        })
}
