use crate::polygon::TexParams;
use crate::state::TextureVram;

/// Decode one texel.
///
/// `s` and `t` arrive in the vertex 12.4 fixed-point layout; the
/// integer texel coordinate is the upper part. Returns 15-bit packed
/// RGB and a 5-bit alpha.
pub fn lookup(vram: &TextureVram, params: TexParams, palette_base: u32, s: i16, t: i16) -> (u16, u8) {
    let mut vramaddr = params.vram_base();

    let width = params.width();
    let height = params.height();

    let mut s = (s >> 4) as i32;
    let mut t = (t >> 4) as i32;

    // wrap, mirror or clamp per axis
    if params.repeat_s() {
        if params.mirror_s() && (s & width) != 0 {
            s = (width - 1) - (s & (width - 1));
        } else {
            s &= width - 1;
        }
    } else {
        s = s.clamp(0, width - 1);
    }

    if params.repeat_t() {
        if params.mirror_t() && (t & height) != 0 {
            t = (height - 1) - (t & (height - 1));
        } else {
            t &= height - 1;
        }
    } else {
        t = t.clamp(0, height - 1);
    }

    let alpha0: u8 = if params.color0_transparent() { 0 } else { 31 };

    let texpal = palette_base;

    match params.format() {
        1 => {
            // A3I5: 5-bit palette index, 3-bit alpha expanded to 5
            vramaddr += ((t * width) + s) as u32;
            let pixel = vram.read_texture(vramaddr);

            let color = vram.read_palette_halfword((texpal << 4) + (((pixel & 0x1F) as u32) << 1));
            let alpha = ((pixel >> 3) & 0x1C) + (pixel >> 6);
            (color, alpha)
        }

        2 => {
            // 4-color: 2 bits per texel, four to a byte
            vramaddr += (((t * width) + s) >> 2) as u32;
            let mut pixel = vram.read_texture(vramaddr);
            pixel >>= (s & 0x3) << 1;
            pixel &= 0x3;

            let color = vram.read_palette_halfword((texpal << 3) + ((pixel as u32) << 1));
            let alpha = if pixel == 0 { alpha0 } else { 31 };
            (color, alpha)
        }

        3 => {
            // 16-color: 4 bits per texel
            vramaddr += (((t * width) + s) >> 1) as u32;
            let mut pixel = vram.read_texture(vramaddr);
            if s & 0x1 != 0 {
                pixel >>= 4;
            } else {
                pixel &= 0xF;
            }

            let color = vram.read_palette_halfword((texpal << 4) + ((pixel as u32) << 1));
            let alpha = if pixel == 0 { alpha0 } else { 31 };
            (color, alpha)
        }

        4 => {
            // 256-color
            vramaddr += ((t * width) + s) as u32;
            let pixel = vram.read_texture(vramaddr);

            let color = vram.read_palette_halfword((texpal << 4) + ((pixel as u32) << 1));
            let alpha = if pixel == 0 { alpha0 } else { 31 };
            (color, alpha)
        }

        5 => lookup_compressed(vram, texpal, vramaddr, width, s, t),

        6 => {
            // A5I3: 3-bit palette index, 5-bit alpha
            vramaddr += ((t * width) + s) as u32;
            let pixel = vram.read_texture(vramaddr);

            let color = vram.read_palette_halfword((texpal << 4) + (((pixel & 0x7) as u32) << 1));
            let alpha = pixel >> 3;
            (color, alpha)
        }

        7 => {
            // direct color with a 1-bit alpha
            vramaddr += (((t * width) + s) << 1) as u32;
            let color = vram.read_texture_halfword(vramaddr);
            let alpha = if color & 0x8000 != 0 { 31 } else { 0 };
            (color, alpha)
        }

        // format 0 is "no texture"; the pixel pipeline never samples it
        _ => (0, 0),
    }
}

/// 4x4 block compression. Each tile is 4 bytes of 2-bit indices in the
/// texture slot; its 16-bit palette header lives in the second half of
/// slot 1, at half the tile address.
fn lookup_compressed(
    vram: &TextureVram,
    texpal: u32,
    mut vramaddr: u32,
    width: i32,
    s: i32,
    t: i32,
) -> (u16, u8) {
    vramaddr += (((t & 0x3FC) * (width >> 2)) + (s & 0x3FC)) as u32;
    vramaddr += (t & 0x3) as u32;

    let mut slot1addr = 0x20000 + ((vramaddr & 0x1FFFC) >> 1);
    if vramaddr >= 0x40000 {
        slot1addr += 0x10000;
    }

    let mut val = vram.read_texture(vramaddr);
    val >>= 2 * (s & 0x3);

    let palinfo = vram.read_texture_halfword(slot1addr);
    let paloffset = ((palinfo & 0x3FFF) as u32) << 2;
    let texpal = texpal << 4;

    match val & 0x3 {
        0 => (vram.read_palette_halfword(texpal + paloffset), 31),

        1 => (vram.read_palette_halfword(texpal + paloffset + 2), 31),

        2 => {
            let color = match palinfo >> 14 {
                1 => {
                    let color0 = vram.read_palette_halfword(texpal + paloffset);
                    let color1 = vram.read_palette_halfword(texpal + paloffset + 2);
                    average_rgb15(color0, color1)
                }
                3 => {
                    let color0 = vram.read_palette_halfword(texpal + paloffset);
                    let color1 = vram.read_palette_halfword(texpal + paloffset + 2);
                    weight_rgb15(color0, color1, 5, 3)
                }
                _ => vram.read_palette_halfword(texpal + paloffset + 4),
            };
            (color, 31)
        }

        _ => match palinfo >> 14 {
            2 => (vram.read_palette_halfword(texpal + paloffset + 6), 31),
            3 => {
                let color0 = vram.read_palette_halfword(texpal + paloffset);
                let color1 = vram.read_palette_halfword(texpal + paloffset + 2);
                (weight_rgb15(color0, color1, 3, 5), 31)
            }
            _ => (0, 0),
        },
    }
}

// the averaging below works channel-wise on the packed 5-bit layout,
// masking each channel afterwards so sums cannot carry across

fn average_rgb15(color0: u16, color1: u16) -> u16 {
    let r = ((color0 & 0x001F) as u32 + (color1 & 0x001F) as u32) >> 1;
    let g = (((color0 & 0x03E0) as u32 + (color1 & 0x03E0) as u32) >> 1) & 0x03E0;
    let b = (((color0 & 0x7C00) as u32 + (color1 & 0x7C00) as u32) >> 1) & 0x7C00;
    (r | g | b) as u16
}

fn weight_rgb15(color0: u16, color1: u16, f0: u32, f1: u32) -> u16 {
    let r = ((color0 & 0x001F) as u32 * f0 + (color1 & 0x001F) as u32 * f1) >> 3;
    let g = (((color0 & 0x03E0) as u32 * f0 + (color1 & 0x03E0) as u32 * f1) >> 3) & 0x03E0;
    let b = (((color0 & 0x7C00) as u32 * f0 + (color1 & 0x7C00) as u32 * f1) >> 3) & 0x7C00;
    (r | g | b) as u16
}
