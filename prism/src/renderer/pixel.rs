use crate::polygon::{PixelAttr, Polygon};
use crate::state::{Display3DControl, RenderState, TextureVram};

use super::texture;

pub const MODE_DECAL_BIT: u32 = 0x1;
pub const MODE_TOON_HIGHLIGHT: u32 = 2;

/// Expand a packed 15-bit color to 6-bit channels.
///
/// A nonzero 5-bit channel gains a low bit of 1, so full intensity maps
/// to 63 rather than 62.
pub fn expand_rgb15(color: u16) -> [u32; 3] {
    let mut r = ((color as u32) << 1) & 0x3E;
    let mut g = ((color as u32) >> 4) & 0x3E;
    let mut b = ((color as u32) >> 9) & 0x3E;
    if r != 0 {
        r += 1;
    }
    if g != 0 {
        g += 1;
    }
    if b != 0 {
        b += 1;
    }
    [r, g, b]
}

// The depth test turns into 'less or equal' when drawing a front-facing
// pixel over an opaque back-facing pixel (and for wireframe edges under
// conditions that are still unclear). The 'equal' test range depends on
// the depth-buffering mode: +-0x200 for Z-buffering, +-0xFF for
// W-buffering.

pub type DepthTest = fn(dst_z: i32, z: i32, dst_attr: u32) -> bool;

pub fn depth_test_equal_z(dst_z: i32, z: i32, _dst_attr: u32) -> bool {
    let diff = dst_z - z;
    (diff + 0x200) as u32 <= 0x400
}

pub fn depth_test_equal_w(dst_z: i32, z: i32, _dst_attr: u32) -> bool {
    let diff = dst_z - z;
    (diff + 0xFF) as u32 <= 0x1FE
}

pub fn depth_test_less_than(dst_z: i32, z: i32, _dst_attr: u32) -> bool {
    z < dst_z
}

pub fn depth_test_less_than_front_facing(dst_z: i32, z: i32, dst_attr: u32) -> bool {
    if dst_attr & (PixelAttr::TRANSLUCENT | PixelAttr::BACKFACING) == PixelAttr::BACKFACING {
        // opaque and back-facing
        z <= dst_z
    } else {
        z < dst_z
    }
}

/// Pick the polygon's depth predicate once, outside the pixel loops.
pub fn resolve_depth_test(polygon: &Polygon) -> DepthTest {
    if polygon.attrs.depth_test_equal() {
        if polygon.w_buffer {
            depth_test_equal_w
        } else {
            depth_test_equal_z
        }
    } else if polygon.facing_view {
        depth_test_less_than_front_facing
    } else {
        depth_test_less_than
    }
}

/// Blend a translucent source over the destination pixel.
///
/// When alpha blending is disabled in the display control, the source
/// color replaces the destination; alpha still takes the maximum of the
/// two so translucent pixels cannot punch holes into opaque ones.
pub fn alpha_blend(control: Display3DControl, srccolor: u32, dstcolor: u32, alpha: u32) -> u32 {
    let mut dstalpha = dstcolor >> 24;

    if dstalpha == 0 {
        return srccolor;
    }

    let mut src_r = srccolor & 0x3F;
    let mut src_g = (srccolor >> 8) & 0x3F;
    let mut src_b = (srccolor >> 16) & 0x3F;

    if control.contains(Display3DControl::AlphaBlending) {
        let dst_r = dstcolor & 0x3F;
        let dst_g = (dstcolor >> 8) & 0x3F;
        let dst_b = (dstcolor >> 16) & 0x3F;

        let a = alpha + 1;
        src_r = ((src_r * a) + (dst_r * (32 - a))) >> 5;
        src_g = ((src_g * a) + (dst_g * (32 - a))) >> 5;
        src_b = ((src_b * a) + (dst_b * (32 - a))) >> 5;
    }

    if alpha > dstalpha {
        dstalpha = alpha;
    }

    src_r | (src_g << 8) | (src_b << 16) | (dstalpha << 24)
}

/// Combine the interpolated vertex color with the sampled texel
/// according to the polygon's blend mode. Returns packed 6-6-6-5 RGBA.
pub fn render_pixel(
    state: &RenderState,
    vram: &TextureVram,
    polygon: &Polygon,
    vr: u8,
    vg: u8,
    vb: u8,
    s: i16,
    t: i16,
) -> u32 {
    let mut vr = vr as u32;
    let mut vg = vg as u32;
    let mut vb = vb as u32;

    let blendmode = polygon.attrs.mode();
    let polyalpha = polygon.attrs.alpha();
    let wireframe = polyalpha == 0;

    let highlight = state.control.contains(Display3DControl::HighlightShading);

    if blendmode == MODE_TOON_HIGHLIGHT {
        if highlight {
            // highlight mode: the color is calculated normally, except
            // every vertex color component takes the red component; the
            // toon color is added to the final color below
            vg = vr;
            vb = vr;
        } else {
            // toon mode: the vertex color is replaced by the toon color
            let [tr, tg, tb] = expand_rgb15(state.toon_table[(vr >> 1) as usize]);
            vr = tr;
            vg = tg;
            vb = tb;
        }
    }

    let (mut r, mut g, mut b, a);

    if state.control.contains(Display3DControl::TextureMapping) && polygon.tex_params.format() != 0
    {
        let (tcolor, talpha) =
            texture::lookup(vram, polygon.tex_params, polygon.tex_palette, s, t);
        let talpha = talpha as u32;
        let [tr, tg, tb] = expand_rgb15(tcolor);

        if blendmode & MODE_DECAL_BIT != 0 {
            // decal
            if talpha == 0 {
                r = vr;
                g = vg;
                b = vb;
            } else if talpha == 31 {
                r = tr;
                g = tg;
                b = tb;
            } else {
                r = ((tr * talpha) + (vr * (31 - talpha))) >> 5;
                g = ((tg * talpha) + (vg * (31 - talpha))) >> 5;
                b = ((tb * talpha) + (vb * (31 - talpha))) >> 5;
            }
            a = polyalpha;
        } else {
            // modulate
            r = ((tr + 1) * (vr + 1) - 1) >> 6;
            g = ((tg + 1) * (vg + 1) - 1) >> 6;
            b = ((tb + 1) * (vb + 1) - 1) >> 6;
            a = ((talpha + 1) * (polyalpha + 1) - 1) >> 5;
        }
    } else {
        r = vr;
        g = vg;
        b = vb;
        a = polyalpha;
    }

    if blendmode == MODE_TOON_HIGHLIGHT && highlight {
        let [tr, tg, tb] = expand_rgb15(state.toon_table[(vr >> 1) as usize]);

        r = (r + tr).min(63);
        g = (g + tg).min(63);
        b = (b + tb).min(63);
    }

    // TODO: can wireframe polygons use texture alpha?
    let a = if wireframe { 31 } else { a };

    r | (g << 8) | (b << 16) | (a << 24)
}
