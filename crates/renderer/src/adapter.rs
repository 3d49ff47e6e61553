//! Adapter filtering.

/// Description DXGI reports for the WARP software rasterizer.
pub const SOFTWARE_ADAPTER: &str = "Microsoft Basic Render Driver";

#[inline]
pub fn is_software_adapter(description: &str) -> bool {
    description == SOFTWARE_ADAPTER
}

/// Decodes a NUL padded UTF-16 adapter description.
pub fn decode_description(raw: &[u16]) -> String {
    let len = raw.iter().position(|&c| c == 0).unwrap_or(raw.len());
    String::from_utf16_lossy(&raw[..len])
}

/// Picks the first adapter that is not the software rasterizer.
///
/// Adapters are consumed lazily, so enumeration stops at the first match.
pub fn select_hardware<A>(adapters: impl IntoIterator<Item = (A, String)>) -> Option<(A, String)> {
    adapters
        .into_iter()
        .find(|(_, description)| !is_software_adapter(description))
}
