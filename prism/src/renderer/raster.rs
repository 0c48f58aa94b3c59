use log::debug;

use crate::interp::Interpolator;
use crate::polygon::{PixelAttr, Polygon, PolygonAttrs, Vertex};
use crate::slope::Slope;
use crate::state::{Display3DControl, RenderState, TextureVram};

use super::pixel::{self, DepthTest};

// Buffer dimensions are 258x194: a 1px offscreen border simplifies the
// neighbour reads of the edge marking pass. The buffers are doubled in
// depth to keep track of the two topmost pixels of every column.
// TODO: check whether hardware can accidentally plot into that border

pub const SCANLINE_WIDTH: usize = 258;
pub const NUM_SCANLINES: usize = 194;
pub const BUFFER_SIZE: usize = SCANLINE_WIDTH * NUM_SCANLINES;
pub const FIRST_PIXEL_OFFSET: usize = SCANLINE_WIDTH + 1;

/// Per-polygon rasterization state for one frame: the two edge walkers
/// and the vertex window around them.
pub(super) struct PolygonState<'p> {
    pub(super) poly: &'p Polygon,

    slope_l: Slope<false>,
    slope_r: Slope<true>,
    xl: i32,
    xr: i32,
    cur_vl: usize,
    next_vl: usize,
    cur_vr: usize,
    next_vr: usize,
}

/// One scanline's framing, shared between the regular and the
/// shadow-mask procedures: span bounds, edge fill decisions, edge
/// lengths and coverages, and the Y-interpolated span endpoints.
struct ScanlineSpan<'p> {
    xstart: i32,
    xend: i32,

    l_filledge: bool,
    r_filledge: bool,
    l_edgelen: i32,
    r_edgelen: i32,
    l_edgecov: i32,
    r_edgecov: i32,

    wl: i32,
    wr: i32,
    zl: i32,
    zr: i32,

    vlcur: &'p Vertex,
    vlnext: &'p Vertex,
    vrcur: &'p Vertex,
    vrnext: &'p Vertex,

    swapped: bool,
}

/// Span endpoint attributes interpolated along Y, consumed by the
/// per-pixel loop.
struct SpanAttrs {
    zl: i32,
    zr: i32,
    rl: i32,
    gl: i32,
    bl: i32,
    sl: i32,
    tl: i32,
    rr: i32,
    gr: i32,
    br: i32,
    sr: i32,
    tr: i32,
}

/// How a segment of the scanline derives antialiasing coverage.
#[derive(Clone, Copy)]
enum CovMode {
    /// Interior pixels carry no coverage.
    None,
    /// Left edge: coverage counts up from the descriptor's start value.
    Start(i32),
    /// Right edge: like `Start`, but inverted.
    End(i32),
}

impl<'p> PolygonState<'p> {
    pub(super) fn new(polygon: &'p Polygon) -> Self {
        let mut rp = Self {
            poly: polygon,
            slope_l: Slope::default(),
            slope_r: Slope::default(),
            xl: 0,
            xr: 0,
            cur_vl: polygon.vtop,
            next_vl: polygon.vtop,
            cur_vr: polygon.vtop,
            next_vr: polygon.vtop,
        };

        let nverts = polygon.vertices.len();
        if polygon.facing_view {
            rp.next_vl = (rp.cur_vl + 1) % nverts;
            rp.next_vr = (rp.cur_vr + nverts - 1) % nverts;
        } else {
            rp.next_vl = (rp.cur_vl + nverts - 1) % nverts;
            rp.next_vr = (rp.cur_vr + 1) % nverts;
        }

        if polygon.ybottom == polygon.ytop {
            // flat polygon: a single row between the leftmost and
            // rightmost of the candidate vertices
            let mut vl = 0;
            let mut vr = 0;
            for i in [1, nverts - 1] {
                if polygon.vertices[i].x < polygon.vertices[vl].x {
                    vl = i;
                }
                if polygon.vertices[i].x > polygon.vertices[vr].x {
                    vr = i;
                }
            }

            rp.cur_vl = vl;
            rp.next_vl = vl;
            rp.cur_vr = vr;
            rp.next_vr = vr;

            rp.xl = rp.slope_l.setup_dummy(polygon.vertices[vl].x);
            rp.xr = rp.slope_r.setup_dummy(polygon.vertices[vr].x);
        } else {
            rp.setup_left_edge(polygon.ytop);
            rp.setup_right_edge(polygon.ytop);
        }

        rp
    }

    fn setup_left_edge(&mut self, y: i32) {
        let polygon = self.poly;
        let nverts = polygon.vertices.len();

        while y >= polygon.vertices[self.next_vl].y && self.cur_vl != polygon.vbottom {
            self.cur_vl = self.next_vl;
            self.next_vl = if polygon.facing_view {
                (self.cur_vl + 1) % nverts
            } else {
                (self.cur_vl + nverts - 1) % nverts
            };
        }

        let v0 = &polygon.vertices[self.cur_vl];
        let v1 = &polygon.vertices[self.next_vl];
        self.xl = self.slope_l.setup(v0.x, v1.x, v0.y, v1.y, v0.w, v1.w, y);
    }

    fn setup_right_edge(&mut self, y: i32) {
        let polygon = self.poly;
        let nverts = polygon.vertices.len();

        while y >= polygon.vertices[self.next_vr].y && self.cur_vr != polygon.vbottom {
            self.cur_vr = self.next_vr;
            self.next_vr = if polygon.facing_view {
                (self.cur_vr + nverts - 1) % nverts
            } else {
                (self.cur_vr + 1) % nverts
            };
        }

        let v0 = &polygon.vertices[self.cur_vr];
        let v1 = &polygon.vertices[self.next_vr];
        self.xr = self.slope_r.setup(v0.x, v1.x, v0.y, v1.y, v0.w, v1.w, y);
    }

    fn step_slopes(&mut self) {
        self.xl = self.slope_l.step();
        self.xr = self.slope_r.step();
    }

    /// Advance the edges down to row `y` and lay out the scanline.
    fn scanline_span(&mut self, y: i32, fill_all_edges: bool) -> ScanlineSpan<'p> {
        let polygon = self.poly;

        if polygon.ytop != polygon.ybottom {
            if y >= polygon.vertices[self.next_vl].y && self.cur_vl != polygon.vbottom {
                self.setup_left_edge(y);
            }
            if y >= polygon.vertices[self.next_vr].y && self.cur_vr != polygon.vbottom {
                self.setup_right_edge(y);
            }
        }

        let mut xstart = self.xl;
        let mut xend = self.xr;

        // edge fill rules for opaque pixels:
        // * the left edge is filled if its slope is <= 1
        // * the right edge is filled if its slope is > 1
        // * edges with slope 0 are always filled
        // * right vertical edges are pushed 1px to the left
        // * everything is filled when antialiasing or edge marking is
        //   enabled, or when the pixels are translucent
        let (mut l_filledge, mut r_filledge) = if fill_all_edges {
            (true, true)
        } else {
            (
                self.slope_l.negative || !self.slope_l.x_major,
                (!self.slope_r.negative && self.slope_r.x_major) || self.slope_r.increment == 0,
            )
        };

        let mut wl = self.slope_l.interp.interpolate(
            polygon.vertices[self.cur_vl].w,
            polygon.vertices[self.next_vl].w,
        );
        let mut wr = self.slope_r.interp.interpolate(
            polygon.vertices[self.cur_vr].w,
            polygon.vertices[self.next_vr].w,
        );

        let mut zl = self.slope_l.interp.interpolate_z(
            polygon.vertices[self.cur_vl].z,
            polygon.vertices[self.next_vl].z,
            polygon.w_buffer,
        );
        let mut zr = self.slope_r.interp.interpolate_z(
            polygon.vertices[self.cur_vr].z,
            polygon.vertices[self.next_vr].z,
            polygon.w_buffer,
        );

        let swapped = xstart > xend;
        let (vlcur, vlnext, vrcur, vrnext);
        let (l_edgelen, l_edgecov, r_edgelen, r_edgecov);

        if swapped {
            // the left and right edges crossed over: render backwards.
            // on hardware this breaks the edge length calculation, as if
            // such slopes were treated as Y-major; it also breaks the
            // antialiasing of those edges (TODO)
            vlcur = &polygon.vertices[self.cur_vr];
            vlnext = &polygon.vertices[self.next_vr];
            vrcur = &polygon.vertices[self.cur_vl];
            vrnext = &polygon.vertices[self.next_vl];

            let (len, cov) = self.slope_r.edge_params_y_major();
            l_edgelen = len;
            l_edgecov = cov;
            let (len, cov) = self.slope_l.edge_params_y_major();
            r_edgelen = len;
            r_edgecov = cov;

            std::mem::swap(&mut xstart, &mut xend);
            std::mem::swap(&mut wl, &mut wr);
            std::mem::swap(&mut zl, &mut zr);
            std::mem::swap(&mut l_filledge, &mut r_filledge);
        } else {
            vlcur = &polygon.vertices[self.cur_vl];
            vlnext = &polygon.vertices[self.next_vl];
            vrcur = &polygon.vertices[self.cur_vr];
            vrnext = &polygon.vertices[self.next_vr];

            let (len, cov) = self.slope_l.edge_params();
            l_edgelen = len;
            l_edgecov = cov;
            let (len, cov) = self.slope_r.edge_params();
            r_edgelen = len;
            r_edgecov = cov;
        }

        ScanlineSpan {
            xstart,
            xend,
            l_filledge,
            r_filledge,
            l_edgelen,
            r_edgelen,
            l_edgecov,
            r_edgecov,
            wl,
            wr,
            zl,
            zr,
            vlcur,
            vlnext,
            vrcur,
            vrnext,
            swapped,
        }
    }
}

/// The rasterizer and its frame buffers.
///
/// Addresses `[0, BUFFER_SIZE)` hold the topmost pixel of each column,
/// `[BUFFER_SIZE, 2*BUFFER_SIZE)` the pixel underneath it.
pub struct RenderCore {
    pub(super) color: Vec<u32>,
    pub(super) depth: Vec<u32>,
    pub(super) attr: Vec<u32>,

    pub(super) stencil: Box<[u8; 256 * 2]>,
    pub(super) prev_is_shadow_mask: bool,
}

impl RenderCore {
    pub fn new() -> Self {
        Self {
            color: vec![0; BUFFER_SIZE * 2],
            depth: vec![0; BUFFER_SIZE * 2],
            attr: vec![0; BUFFER_SIZE * 2],
            stencil: Box::new([0; 256 * 2]),
            prev_is_shadow_mask: false,
        }
    }

    /// Zero the buffers. This only happens on device reset; per-frame
    /// initialization goes through `clear_buffers`.
    pub fn reset(&mut self) {
        self.color.fill(0);
        self.depth.fill(0);
        self.attr.fill(0);
        self.stencil.fill(0);
        self.prev_is_shadow_mask = false;
    }

    /// One completed output row, 258 pixels wide with the usable image
    /// starting at offset 1.
    pub fn line(&self, line: usize) -> &[u32] {
        let start = (line + 1) * SCANLINE_WIDTH;
        &self.color[start..start + SCANLINE_WIDTH]
    }

    /// Rasterize the frame's polygon list into the cleared buffers,
    /// invoking `line_done` as each row leaves the final pass.
    pub fn render_frame<F>(
        &mut self,
        state: &RenderState,
        vram: &TextureVram,
        polygons: &[Polygon],
        mut line_done: F,
    ) where
        F: FnMut(&[u32]),
    {
        let mut list: Vec<PolygonState> = polygons
            .iter()
            .filter(|p| !p.degenerate)
            .map(PolygonState::new)
            .collect();

        debug!("rasterizing {} polygons", list.len());

        // the final pass of a row needs the row below it already
        // rendered, so it trails the rasterizer by one line
        self.render_scanline(state, vram, &mut list, 0);
        for y in 1..192 {
            self.render_scanline(state, vram, &mut list, y);
            self.scanline_final_pass(state, y - 1);
            line_done(self.line((y - 1) as usize));
        }
        self.scanline_final_pass(state, 191);
        line_done(self.line(191));
    }

    fn render_scanline(
        &mut self,
        state: &RenderState,
        vram: &TextureVram,
        list: &mut [PolygonState],
        y: i32,
    ) {
        for rp in list.iter_mut() {
            let polygon = rp.poly;
            let live = y >= polygon.ytop
                && (y < polygon.ybottom || (y == polygon.ytop && polygon.ybottom == polygon.ytop));
            if live {
                if polygon.is_shadow_mask {
                    self.render_shadow_mask_scanline(state, rp, y);
                } else {
                    self.render_polygon_scanline(state, vram, rp, y);
                }
            }
        }
    }

    fn render_polygon_scanline(
        &mut self,
        state: &RenderState,
        vram: &TextureVram,
        rp: &mut PolygonState,
        y: i32,
    ) {
        let polygon = rp.poly;

        let mut polyattr = polygon.attrs.0 & PolygonAttrs::PIXEL_CARRY_MASK;
        if !polygon.facing_view {
            polyattr |= PixelAttr::BACKFACING;
        }

        let wireframe = polygon.attrs.is_wireframe();
        let depth_test = pixel::resolve_depth_test(polygon);

        self.prev_is_shadow_mask = false;

        let fill_all = wireframe || state.control.intersects(Display3DControl::EdgeFillForced);
        let span = rp.scanline_span(y, fill_all);

        let (interp_start, interp_end) = if span.swapped {
            (&rp.slope_r.interp, &rp.slope_l.interp)
        } else {
            (&rp.slope_l.interp, &rp.slope_r.interp)
        };

        // interpolate the span endpoint attributes along Y
        let attrs = SpanAttrs {
            zl: span.zl,
            zr: span.zr,
            rl: interp_start.interpolate(span.vlcur.color[0], span.vlnext.color[0]),
            gl: interp_start.interpolate(span.vlcur.color[1], span.vlnext.color[1]),
            bl: interp_start.interpolate(span.vlcur.color[2], span.vlnext.color[2]),
            sl: interp_start
                .interpolate(span.vlcur.tex_coords[0] as i32, span.vlnext.tex_coords[0] as i32),
            tl: interp_start
                .interpolate(span.vlcur.tex_coords[1] as i32, span.vlnext.tex_coords[1] as i32),
            rr: interp_end.interpolate(span.vrcur.color[0], span.vrnext.color[0]),
            gr: interp_end.interpolate(span.vrcur.color[1], span.vrnext.color[1]),
            br: interp_end.interpolate(span.vrcur.color[2], span.vrnext.color[2]),
            sr: interp_end
                .interpolate(span.vrcur.tex_coords[0] as i32, span.vrnext.tex_coords[0] as i32),
            tr: interp_end
                .interpolate(span.vrcur.tex_coords[1] as i32, span.vrnext.tex_coords[1] as i32),
        };

        // in wireframe mode, there are special rules for equal Z (TODO)

        let yedge = if y == polygon.ytop {
            PixelAttr::EDGE_TOP
        } else if y == polygon.ybottom - 1 {
            PixelAttr::EDGE_BOTTOM
        } else {
            0
        };

        let mut interp_x = Interpolator::<false>::new(span.xstart, span.xend + 1, span.wl, span.wr);
        let mut x = span.xstart.max(0);
        let mut xcov = 0;

        // part 1: left edge
        let edge = yedge | PixelAttr::EDGE_LEFT;
        let xlimit = (span.xstart + span.l_edgelen).min(span.xend + 1).min(256);
        if span.l_edgecov & (1 << 31) != 0 {
            xcov = (span.l_edgecov >> 12) & 0x3FF;
            if xcov == 0x3FF {
                xcov = 0;
            }
        }

        if !span.l_filledge {
            x = xlimit.min(span.xend - span.r_edgelen + 1);
        } else {
            self.polygon_segment(
                state,
                vram,
                polygon,
                polyattr,
                depth_test,
                &mut interp_x,
                &attrs,
                y,
                &mut x,
                xlimit,
                edge,
                CovMode::Start(span.l_edgecov),
                &mut xcov,
            );
        }

        // part 2: polygon interior
        let xlimit = (span.xend - span.r_edgelen + 1).min(span.xend + 1).min(256);
        if wireframe && yedge == 0 {
            x = xlimit;
        } else {
            self.polygon_segment(
                state,
                vram,
                polygon,
                polyattr,
                depth_test,
                &mut interp_x,
                &attrs,
                y,
                &mut x,
                xlimit,
                yedge,
                CovMode::None,
                &mut xcov,
            );
        }

        // part 3: right edge
        let edge = yedge | PixelAttr::EDGE_RIGHT;
        let xlimit = (span.xend + 1).min(256);
        if span.r_edgecov & (1 << 31) != 0 {
            xcov = (span.r_edgecov >> 12) & 0x3FF;
            if xcov == 0x3FF {
                xcov = 0;
            }
        }

        if span.r_filledge {
            self.polygon_segment(
                state,
                vram,
                polygon,
                polyattr,
                depth_test,
                &mut interp_x,
                &attrs,
                y,
                &mut x,
                xlimit,
                edge,
                CovMode::End(span.r_edgecov),
                &mut xcov,
            );
        }

        rp.step_slopes();
    }

    /// Render one segment of a polygon scanline: depth testing against
    /// the two stored pixels of every column, shadow stencil gating, and
    /// the opaque or translucent plot.
    #[allow(clippy::too_many_arguments)]
    fn polygon_segment(
        &mut self,
        state: &RenderState,
        vram: &TextureVram,
        polygon: &Polygon,
        polyattr: u32,
        depth_test: DepthTest,
        interp_x: &mut Interpolator<false>,
        attrs: &SpanAttrs,
        y: i32,
        x: &mut i32,
        xlimit: i32,
        edge: u32,
        cov_mode: CovMode,
        xcov: &mut i32,
    ) {
        while *x < xlimit {
            let cx = *x;
            *x += 1;

            let mut pixeladdr = FIRST_PIXEL_OFFSET + (y as usize) * SCANLINE_WIDTH + cx as usize;
            let mut dstattr = self.attr[pixeladdr];

            // shadow polygons only render where the preceding mask
            // flagged a failed depth test
            if polygon.is_shadow {
                let stencil = self.stencil[256 * ((y as usize) & 0x1) + cx as usize];
                if stencil == 0 {
                    continue;
                }
                if stencil & 0x1 == 0 {
                    pixeladdr += BUFFER_SIZE;
                }
                if stencil & 0x2 == 0 {
                    // keeps the shadow from being blended under
                    // antialiased edges
                    dstattr &= !PixelAttr::AA_EDGE_MASK;
                }
            }

            interp_x.set_x(cx);

            let z = interp_x.interpolate_z(attrs.zl, attrs.zr, polygon.w_buffer);

            // if the depth test against the topmost pixel fails, try the
            // pixel underneath
            if !depth_test(self.depth[pixeladdr] as i32, z, dstattr) {
                if dstattr & PixelAttr::AA_EDGE_MASK == 0 {
                    continue;
                }

                pixeladdr += BUFFER_SIZE;
                dstattr = self.attr[pixeladdr];
                if !depth_test(self.depth[pixeladdr] as i32, z, dstattr) {
                    continue;
                }
            }

            let vr = interp_x.interpolate(attrs.rl, attrs.rr);
            let vg = interp_x.interpolate(attrs.gl, attrs.gr);
            let vb = interp_x.interpolate(attrs.bl, attrs.br);

            let s = interp_x.interpolate(attrs.sl, attrs.sr) as i16;
            let t = interp_x.interpolate(attrs.tl, attrs.tr) as i16;

            let color = pixel::render_pixel(
                state,
                vram,
                polygon,
                (vr >> 3) as u8,
                (vg >> 3) as u8,
                (vb >> 3) as u8,
                s,
                t,
            );
            let alpha = color >> 24;

            // alpha test
            if alpha <= state.alpha_ref as u32 {
                continue;
            }

            if alpha == 31 {
                let mut attr = polyattr | edge;

                if state.control.contains(Display3DControl::AntiAliasing) {
                    if let CovMode::Start(descriptor) | CovMode::End(descriptor) = cov_mode {
                        // antialiasing: all edges are rendered; X-major
                        // descriptors accumulate across the segment
                        let mut cov = descriptor;
                        if cov & (1 << 31) != 0 {
                            cov = match cov_mode {
                                CovMode::End(_) => (0x1F - (*xcov >> 5)).max(0),
                                _ => (*xcov >> 5).min(31),
                            };
                            *xcov += descriptor & 0x3FF;
                        }
                        attr |= (cov as u32) << 8;

                        // push the old topmost pixel down one layer
                        if pixeladdr < BUFFER_SIZE {
                            self.color[pixeladdr + BUFFER_SIZE] = self.color[pixeladdr];
                            self.depth[pixeladdr + BUFFER_SIZE] = self.depth[pixeladdr];
                            self.attr[pixeladdr + BUFFER_SIZE] = self.attr[pixeladdr];
                        }
                    }
                }

                self.depth[pixeladdr] = z as u32;
                self.color[pixeladdr] = color;
                self.attr[pixeladdr] = attr;
            } else {
                let z = if polygon.attrs.update_depth_translucent() {
                    Some(z as u32)
                } else {
                    None
                };
                self.plot_translucent_pixel(state, pixeladdr, color, z, polyattr, polygon.is_shadow);

                // blend into the pixel underneath, if needed
                if (dstattr & PixelAttr::AA_EDGE_MASK != 0) && pixeladdr < BUFFER_SIZE {
                    self.plot_translucent_pixel(
                        state,
                        pixeladdr + BUFFER_SIZE,
                        color,
                        z,
                        polyattr,
                        polygon.is_shadow,
                    );
                }
            }
        }
    }

    fn plot_translucent_pixel(
        &mut self,
        state: &RenderState,
        pixeladdr: usize,
        color: u32,
        z: Option<u32>,
        polyattr: u32,
        shadow: bool,
    ) {
        let dstattr = self.attr[pixeladdr];
        let mut attr = (polyattr & 0xE0F0)
            | ((polyattr >> 8) & 0xFF0000)
            | PixelAttr::TRANSLUCENT
            | (dstattr & PixelAttr::TRANS_KEEP_MASK);

        if shadow {
            // shadows also check against opaque pixel ids
            if dstattr & PixelAttr::TRANSLUCENT != 0 {
                if (dstattr & PixelAttr::TRANS_ID_MASK) == (attr & PixelAttr::TRANS_ID_MASK) {
                    return;
                }
            } else if (dstattr & PixelAttr::OPAQUE_ID_MASK) == (polyattr & PixelAttr::OPAQUE_ID_MASK)
            {
                return;
            }
        } else {
            // never blend a translucent polygon onto its own id
            if (dstattr & PixelAttr::TRANS_ID_MASK) == (attr & PixelAttr::TRANS_ID_MASK) {
                return;
            }
        }

        // the fog flag only survives if the destination had it too
        if dstattr & PixelAttr::FOG == 0 {
            attr &= !PixelAttr::FOG;
        }

        let color = pixel::alpha_blend(state.control, color, self.color[pixeladdr], color >> 24);

        if let Some(z) = z {
            self.depth[pixeladdr] = z;
        }

        self.color[pixeladdr] = color;
        self.attr[pixeladdr] = attr;
    }

    /// Shadow masks draw nothing: they set stencil bits wherever their
    /// depth test fails, for the shadow polygons that follow.
    fn render_shadow_mask_scanline(&mut self, state: &RenderState, rp: &mut PolygonState, y: i32) {
        let polygon = rp.poly;

        let mut polyalpha = polygon.attrs.alpha();
        let wireframe = polyalpha == 0;

        let depth_test = pixel::resolve_depth_test(polygon);

        // the stencil is zeroed at the first mask of a run; consecutive
        // masks accumulate into it
        if !self.prev_is_shadow_mask {
            self.stencil[256 * ((y as usize) & 0x1)..][..256].fill(0);
        }
        self.prev_is_shadow_mask = true;

        // CHECKME: edge fill rules for opaque shadow mask polygons
        let fill_all = polyalpha < 31 || state.control.intersects(Display3DControl::EdgeFillForced);
        let span = rp.scanline_span(y, fill_all);

        // color and texcoord attributes aren't needed here: every pixel
        // of a shadow mask has the same alpha (shadows use decal
        // blending), so the alpha test can run up front (checkme)
        if wireframe {
            polyalpha = 31;
        }
        if polyalpha <= state.alpha_ref as u32 {
            return;
        }

        let yedge = if y == polygon.ytop {
            PixelAttr::EDGE_TOP
        } else if y == polygon.ybottom - 1 {
            PixelAttr::EDGE_BOTTOM
        } else {
            0
        };

        let mut interp_x = Interpolator::<false>::new(span.xstart, span.xend + 1, span.wl, span.wr);
        let mut x = span.xstart.max(0);

        // part 1: left edge
        let xlimit = (span.xstart + span.l_edgelen).min(span.xend + 1).min(256);
        self.shadow_mask_segment(
            polygon,
            depth_test,
            &mut interp_x,
            span.zl,
            span.zr,
            y,
            &mut x,
            xlimit,
            span.l_filledge,
            true,
        );

        // part 2: polygon interior
        let xlimit = (span.xend - span.r_edgelen + 1).min(span.xend + 1).min(256);
        if wireframe && yedge == 0 {
            x = xlimit;
        } else {
            self.shadow_mask_segment(
                polygon,
                depth_test,
                &mut interp_x,
                span.zl,
                span.zr,
                y,
                &mut x,
                xlimit,
                true,
                false,
            );
        }

        // part 3: right edge
        let xlimit = (span.xend + 1).min(256);
        self.shadow_mask_segment(
            polygon,
            depth_test,
            &mut interp_x,
            span.zl,
            span.zr,
            y,
            &mut x,
            xlimit,
            span.r_filledge,
            false,
        );

        rp.step_slopes();
    }

    #[allow(clippy::too_many_arguments)]
    fn shadow_mask_segment(
        &mut self,
        polygon: &Polygon,
        depth_test: DepthTest,
        interp_x: &mut Interpolator<false>,
        zl: i32,
        zr: i32,
        y: i32,
        x: &mut i32,
        xlimit: i32,
        filledge: bool,
        or_stencil: bool,
    ) {
        while *x < xlimit {
            let cx = *x;
            *x += 1;

            let pixeladdr = FIRST_PIXEL_OFFSET + (y as usize) * SCANLINE_WIDTH + cx as usize;

            interp_x.set_x(cx);

            let z = interp_x.interpolate_z(zl, zr, polygon.w_buffer);
            let dstattr = self.attr[pixeladdr];

            // checkme
            if !filledge {
                continue;
            }

            let sidx = 256 * ((y as usize) & 0x1) + cx as usize;

            if !depth_test(self.depth[pixeladdr] as i32, z, dstattr) {
                if or_stencil {
                    self.stencil[sidx] |= 0x1;
                } else {
                    self.stencil[sidx] = 1;
                }
            }

            if dstattr & PixelAttr::AA_EDGE_MASK != 0 {
                let pixeladdr = pixeladdr + BUFFER_SIZE;
                if !depth_test(self.depth[pixeladdr] as i32, z, self.attr[pixeladdr]) {
                    self.stencil[sidx] |= 0x2;
                }
            }
        }
    }
}
