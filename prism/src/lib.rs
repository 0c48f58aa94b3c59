//! Software rasterizer core for NDS-class 3D graphics.
//!
//! The crate consumes a frame's worth of preprocessed screen-space
//! polygons with fixed-point attributes and produces a 256x192 image
//! that matches the original hardware pixel for pixel. The heavy
//! lifting happens in the perspective-correct fixed-point interpolator,
//! the two-layer depth buffer with its shadow volume stencil, the six
//! texture decoders, and the deferred edge marking / fog / antialiasing
//! passes.
//!
//! The geometry pipeline (transform, clipping, projection), VRAM
//! mapping and the host display are external: they feed [`FrameInput`]
//! and pull rows back out with [`SoftRenderer::get_line`].

mod interp;
mod polygon;
mod renderer;
mod slope;
mod state;
mod utils;

pub use polygon::{PixelAttr, Polygon, PolygonAttrs, TexParams, Vertex};
pub use renderer::{FrameInput, RenderSettings, SoftRenderer, NUM_SCANLINES, SCANLINE_WIDTH};
pub use state::{Display3DControl, RenderState, TextureVram};
