//! Static triangle: immutable geometry, shader pair and input layout.

use tracing::debug;
use windows::{
    Win32::Graphics::{
        Direct3D::D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST,
        Direct3D11::*,
        Dxgi::Common::{
            DXGI_FORMAT_R8G8B8A8_UNORM, DXGI_FORMAT_R16_UINT, DXGI_FORMAT_R32G32B32_FLOAT,
        },
    },
    core::s,
};

use crate::{
    config::SceneConfig,
    device::GraphicsDevice,
    error::{RenderError, Result},
    mesh::{COLOR_OFFSET, StaticMesh, TRIANGLE, VERTEX_STRIDE},
    shader::{ShaderStage, compile_file},
    util::set_debug_name,
};

const INPUT_DESC: [D3D11_INPUT_ELEMENT_DESC; 2] = [
    D3D11_INPUT_ELEMENT_DESC {
        SemanticName: s!("POSITION"),
        SemanticIndex: 0,
        Format: DXGI_FORMAT_R32G32B32_FLOAT,
        InputSlot: 0,
        AlignedByteOffset: 0,
        InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
        InstanceDataStepRate: 0,
    },
    D3D11_INPUT_ELEMENT_DESC {
        SemanticName: s!("COLOR"),
        SemanticIndex: 0,
        Format: DXGI_FORMAT_R8G8B8A8_UNORM,
        InputSlot: 0,
        AlignedByteOffset: COLOR_OFFSET,
        InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
        InstanceDataStepRate: 0,
    },
];

/// GPU resources of the triangle. Fields are in reverse creation order so drop
/// releases them the other way around.
pub struct Scene {
    input_layout: ID3D11InputLayout,
    pixel_shader: ID3D11PixelShader,
    vertex_shader: ID3D11VertexShader,
    index_buffer: ID3D11Buffer,
    vertex_buffer: ID3D11Buffer,
    index_count: u32,
}

impl Scene {
    #[tracing::instrument(skip(device))]
    pub fn new(device: &GraphicsDevice, config: &SceneConfig, debug_names: bool) -> Result<Self> {
        Self::with_mesh(device, &TRIANGLE, config, debug_names)
    }

    pub fn with_mesh(
        device: &GraphicsDevice,
        mesh: &StaticMesh,
        config: &SceneConfig,
        debug_names: bool,
    ) -> Result<Self> {
        let device = device.device();

        let vertex_buffer = create_immutable_buffer(
            device,
            D3D11_BIND_VERTEX_BUFFER,
            mesh.vertex_bytes(),
            "CreateBuffer(vertex)",
        )?;
        let index_buffer = create_immutable_buffer(
            device,
            D3D11_BIND_INDEX_BUFFER,
            mesh.index_bytes(),
            "CreateBuffer(index)",
        )?;

        let vs_code = compile_file(
            &config.vertex_shader,
            ShaderStage::Vertex,
            config.shader_debug_info,
        )?;
        let mut vertex_shader = None;
        unsafe { device.CreateVertexShader(vs_code.as_bytes(), None, Some(&mut vertex_shader)) }
            .map_err(RenderError::graphics("CreateVertexShader"))?;
        let vertex_shader = vertex_shader.ok_or(RenderError::missing("CreateVertexShader"))?;

        let ps_code = compile_file(
            &config.pixel_shader,
            ShaderStage::Pixel,
            config.shader_debug_info,
        )?;
        let mut pixel_shader = None;
        unsafe { device.CreatePixelShader(ps_code.as_bytes(), None, Some(&mut pixel_shader)) }
            .map_err(RenderError::graphics("CreatePixelShader"))?;
        let pixel_shader = pixel_shader.ok_or(RenderError::missing("CreatePixelShader"))?;

        // validated against the vertex shader input signature
        let mut input_layout = None;
        unsafe {
            device.CreateInputLayout(&INPUT_DESC, vs_code.as_bytes(), Some(&mut input_layout))
        }
        .map_err(RenderError::graphics("CreateInputLayout"))?;
        let input_layout = input_layout.ok_or(RenderError::missing("CreateInputLayout"))?;

        if debug_names {
            set_debug_name(&vertex_buffer, "triangle vertices");
            set_debug_name(&index_buffer, "triangle indices");
            set_debug_name(&vertex_shader, "triangle vs");
            set_debug_name(&pixel_shader, "triangle ps");
            set_debug_name(&input_layout, "triangle layout");
        }
        debug!("scene created. indices: {}", mesh.index_count());

        Ok(Self {
            input_layout,
            pixel_shader,
            vertex_shader,
            index_buffer,
            vertex_buffer,
            index_count: mesh.index_count(),
        })
    }

    /// Binds geometry and shaders, then issues one indexed draw.
    ///
    /// Render target, viewport and scissor rect must already be set.
    pub fn draw(&self, cx: &ID3D11DeviceContext) {
        unsafe {
            cx.IASetIndexBuffer(&self.index_buffer, DXGI_FORMAT_R16_UINT, 0);
            cx.IASetVertexBuffers(
                0,
                1,
                Some(&Some(self.vertex_buffer.clone())),
                Some(&VERTEX_STRIDE),
                Some(&0),
            );
            cx.IASetInputLayout(&self.input_layout);
            cx.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST);

            cx.VSSetShader(&self.vertex_shader, None);
            cx.PSSetShader(&self.pixel_shader, None);

            cx.DrawIndexed(self.index_count, 0, 0);
        }
    }
}

/// Creates a buffer whose contents are fixed at creation. No CPU access is requested,
/// so the runtime rejects any later map or update.
fn create_immutable_buffer(
    device: &ID3D11Device,
    bind: D3D11_BIND_FLAG,
    data: &[u8],
    op: &'static str,
) -> Result<ID3D11Buffer> {
    let mut buffer = None;
    unsafe {
        device.CreateBuffer(
            &immutable_buffer_desc(bind, data.len() as _),
            Some(&D3D11_SUBRESOURCE_DATA {
                pSysMem: data.as_ptr() as _,
                SysMemPitch: 0,
                SysMemSlicePitch: 0,
            }),
            Some(&mut buffer),
        )
    }
    .map_err(RenderError::graphics(op))?;

    buffer.ok_or(RenderError::missing(op))
}

#[inline]
fn immutable_buffer_desc(bind: D3D11_BIND_FLAG, byte_width: u32) -> D3D11_BUFFER_DESC {
    D3D11_BUFFER_DESC {
        ByteWidth: byte_width,
        Usage: D3D11_USAGE_IMMUTABLE,
        BindFlags: bind.0 as _,
        CPUAccessFlags: 0,
        MiscFlags: 0,
        StructureByteStride: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_are_immutable() {
        let desc = immutable_buffer_desc(D3D11_BIND_VERTEX_BUFFER, 48);
        assert_eq!(desc.Usage, D3D11_USAGE_IMMUTABLE);
        assert_eq!(desc.CPUAccessFlags, 0);
        assert_eq!(desc.BindFlags, D3D11_BIND_VERTEX_BUFFER.0 as u32);
    }

    #[test]
    fn layout_offsets_match_vertex() {
        assert_eq!(INPUT_DESC[0].AlignedByteOffset, 0);
        assert_eq!(INPUT_DESC[1].AlignedByteOffset, 12);
        assert_eq!(VERTEX_STRIDE, 16);
    }
}
