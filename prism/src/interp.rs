#[cfg(test)]
mod test;

// Notes on the interpolator:
//
// A typical rasterizer interpolates an attribute A perspective-correctly
// by interpolating A/W and 1/W linearly, then dividing. The hardware
// this models instead computes a perspective-correct factor between 0
// and 1 and uses it to linearly blend the two endpoint attributes. The
// factor keeps 9 bits of precision along Y and 8 along X.
//
// When both W values are equal with their low-order bits clear, a
// direct linear path is taken, which avoids the precision loss of the
// approximation (desirable when the 3D pipeline is used to draw 2D
// quads).

/// Perspective-correct attribute interpolator along one axis.
///
/// `ALONG_Y` selects the Y-direction variant used while walking edges;
/// the X-direction variant interpolates across a scanline span.
#[derive(Clone, Default)]
pub struct Interpolator<const ALONG_Y: bool> {
    x0: i32,
    xdiff: i32,
    x: i32,

    linear: bool,

    xrecip: i32,
    xrecip_z: i32,
    w0n: i32,
    w0d: i32,
    w1d: i32,

    yfactor: i32,
}

impl<const ALONG_Y: bool> Interpolator<ALONG_Y> {
    const SHIFT: u32 = if ALONG_Y { 9 } else { 8 };

    pub fn new(x0: i32, x1: i32, w0: i32, w1: i32) -> Self {
        let mut interp = Self::default();
        interp.setup(x0, x1, w0, w1);
        interp
    }

    pub fn setup(&mut self, x0: i32, x1: i32, w0: i32, w1: i32) {
        self.x0 = x0;
        self.xdiff = x1 - x0;

        // reciprocals for linear mode and Z interpolation
        self.xrecip = if self.xdiff != 0 {
            (1 << 30) / self.xdiff
        } else {
            0
        };
        self.xrecip_z = self.xrecip >> 8;

        // linear mode applies if both W values are equal and have their
        // low-order bits clear (bits 0-6 along X, 1-6 along Y)
        let mask = if ALONG_Y { 0x7E } else { 0x7F };
        self.linear = w0 == w1 && (w0 & mask) == 0 && (w1 & mask) == 0;

        if ALONG_Y {
            if (w0 & 0x1) != 0 && (w1 & 0x1) == 0 {
                self.w0n = w0 - 1;
                self.w0d = w0 + 1;
                self.w1d = w1;
            } else {
                self.w0n = w0 & 0xFFFE;
                self.w0d = w0 & 0xFFFE;
                self.w1d = w1 & 0xFFFE;
            }
        } else {
            self.w0n = w0;
            self.w0d = w0;
            self.w1d = w1;
        }
    }

    pub fn set_x(&mut self, x: i32) {
        let x = x - self.x0;
        self.x = x;
        if self.xdiff != 0 && !self.linear {
            let num = ((x as i64) * (self.w0n as i64)) << Self::SHIFT;
            let den = (x as i64) * (self.w0d as i64) + ((self.xdiff - x) as i64) * (self.w1d as i64);

            // the hardware appears to perform an exact division here
            // TODO: find inputs that expose its true rounding behaviour
            self.yfactor = if den == 0 { 0 } else { (num / den) as i32 };
        }
    }

    pub fn interpolate(&self, y0: i32, y1: i32) -> i32 {
        if self.xdiff == 0 || y0 == y1 {
            return y0;
        }

        if !self.linear {
            // perspective-correct approximation; note the asymmetry
            // around the ordering of the two endpoints
            if y0 < y1 {
                y0 + ((((y1 - y0) as i64 * self.yfactor as i64) >> Self::SHIFT) as i32)
            } else {
                y1 + ((((y0 - y1) as i64 * ((1 << Self::SHIFT) - self.yfactor) as i64)
                    >> Self::SHIFT) as i32)
            }
        } else {
            // linear interpolation; the rounding bias is a best guess
            if y0 < y1 {
                y0 + ((((y1 - y0) as i64 * self.x as i64 * self.xrecip as i64 + (3 << 24)) >> 30)
                    as i32)
            } else {
                y1 + ((((y0 - y1) as i64 * (self.xdiff - self.x) as i64 * self.xrecip as i64
                    + (3 << 24))
                    >> 30) as i32)
            }
        }
    }

    pub fn interpolate_z(&self, z0: i32, z1: i32, w_buffer: bool) -> i32 {
        if self.xdiff == 0 || z0 == z1 {
            return z0;
        }

        if w_buffer {
            // W-buffering reuses the perspective-correct factor
            if z0 < z1 {
                z0 + ((((z1 - z0) as i64 * self.yfactor as i64) >> Self::SHIFT) as i32)
            } else {
                z1 + ((((z0 - z1) as i64 * ((1 << Self::SHIFT) - self.yfactor) as i64)
                    >> Self::SHIFT) as i32)
            }
        } else {
            // Z-buffering takes a linear path with the displacement
            // normalized down to 10 bits along Y
            // still doesn't quite match hardware
            let (base, disp, factor) = if z0 < z1 {
                (z0, z1 - z0, self.x)
            } else {
                (z1, z0 - z1, self.xdiff - self.x)
            };

            if ALONG_Y {
                let mut disp = disp;
                let mut shift = 0;
                while disp > 0x3FF {
                    disp >>= 1;
                    shift += 1;
                }

                base + ((((disp as i64 * factor as i64 * self.xrecip_z as i64) >> 22) << shift)
                    as i32)
            } else {
                let disp = disp >> 9;
                base + (((disp as i64 * factor as i64 * self.xrecip_z as i64) >> 13) as i32)
            }
        }
    }
}
