use crate::utils::{bit, bits};

bitflags::bitflags! {
    /// The 3D display control register, as latched for the frame
    /// being rendered.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Display3DControl: u32 {
        const TextureMapping   = bit!(0);
        const HighlightShading = bit!(1);
        const AlphaBlending    = bit!(3);
        const AntiAliasing     = bit!(4);
        const EdgeMarking      = bit!(5);
        const FogAlphaOnly     = bit!(6);
        const FogEnable        = bit!(7);
        const RearPlaneBitmap  = bit!(14);

        // modes that force both polygon edges to be filled
        const EdgeFillForced   = bits![4, 5];
    }
}

impl Default for Display3DControl {
    fn default() -> Self {
        Self::empty()
    }
}

/// Register file snapshot consumed once per frame.
///
/// These mirror the I/O registers as the register block latches them at
/// frame start; the core never reads live MMIO.
#[derive(Clone, Debug)]
pub struct RenderState {
    pub control: Display3DControl,
    pub clear_attr1: u32,
    pub clear_attr2: u32,
    pub alpha_ref: u8,
    pub fog_color: u32,
    pub fog_offset: u32,
    pub fog_shift: u32,
    /// 33-entry density ramp; the last slot duplicates the saturated
    /// entry read when the density index clamps to 32.
    pub fog_density_table: [u8; 34],
    pub toon_table: [u16; 32],
    pub edge_table: [u16; 8],
    /// Set by the geometry stage when it submitted no new geometry.
    pub frame_identical: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            control: Display3DControl::empty(),
            clear_attr1: 0,
            clear_attr2: 0,
            alpha_ref: 0,
            fog_color: 0,
            fog_offset: 0,
            fog_shift: 0,
            fog_density_table: [0; 34],
            toon_table: [0; 32],
            edge_table: [0; 8],
            frame_identical: false,
        }
    }
}

pub const TEXTURE_VRAM_SIZE: usize = 0x80000;
pub const TEX_PAL_VRAM_SIZE: usize = 0x20000;

/// Flat views of the texture image and texture palette VRAM banks.
///
/// All reads are masked to the view size, matching the wraparound
/// addressing of the real memory mapping.
pub struct TextureVram {
    pub texture: Vec<u8>,
    pub palette: Vec<u8>,
}

impl TextureVram {
    pub fn new() -> Self {
        Self {
            texture: vec![0; TEXTURE_VRAM_SIZE],
            palette: vec![0; TEX_PAL_VRAM_SIZE],
        }
    }

    pub fn read_texture(&self, addr: u32) -> u8 {
        self.texture[(addr as usize) & (TEXTURE_VRAM_SIZE - 1)]
    }

    pub fn read_texture_halfword(&self, addr: u32) -> u16 {
        let addr = (addr as usize) & (TEXTURE_VRAM_SIZE - 1);
        u16::from_le_bytes([
            self.texture[addr],
            self.texture[(addr + 1) & (TEXTURE_VRAM_SIZE - 1)],
        ])
    }

    pub fn read_palette_halfword(&self, addr: u32) -> u16 {
        let addr = (addr as usize) & (TEX_PAL_VRAM_SIZE - 1);
        u16::from_le_bytes([
            self.palette[addr],
            self.palette[(addr + 1) & (TEX_PAL_VRAM_SIZE - 1)],
        ])
    }
}

impl Default for TextureVram {
    fn default() -> Self {
        Self::new()
    }
}
