use core::slice;

use tracing::trace;
use windows::Win32::Graphics::{
    Direct3D::{ID3DBlob, WKPDID_D3DDebugObjectName},
    Direct3D11::ID3D11DeviceChild,
};

/// # Safety
/// The returned slice borrows the blob memory, the blob must not be mutated while it is alive.
pub unsafe fn blob_bytes(blob: &ID3DBlob) -> &[u8] {
    unsafe { slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize()) }
}

/// Tags a device child so debug layer messages and graphics debuggers show `name`.
pub fn set_debug_name(child: &ID3D11DeviceChild, name: &str) {
    let res = unsafe {
        child.SetPrivateData(
            &WKPDID_D3DDebugObjectName,
            name.len() as _,
            Some(name.as_ptr() as _),
        )
    };

    if let Err(err) = res {
        trace!("cannot set debug name {name:?}. err: {err:?}");
    }
}
