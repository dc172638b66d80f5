//! ---------------------------------------------------------------------------
//! Owned 0xAARRGGBB pixel buffer and the drawing primitives the renderer is
//! built from.
//!
//! Every primitive clips against the surface bounds first; a fully
//! off-surface or degenerate target is a no-op, never an out-of-bounds
//! write.
//! ---------------------------------------------------------------------------

use glam::Vec2;

use crate::fixed::{self, SUBPIXEL_BITS, TEXEL_BITS};

/// Packed pixel, 0xAARRGGBB.
pub type Argb = u32;

/// Texel value the billboard blitter treats as "see-through".
pub const TRANSPARENT: Argb = 0;

/// Screen or texture coordinates beyond this magnitude would overflow the
/// 6-bit sub-pixel format; billboards that large are skipped.
const MAX_BILLBOARD_EXTENT: f32 = (1 << 22) as f32;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("{width}x{height} surface needs {expected} pixels, got {got}")]
    SizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        got: usize,
    },
}

/*──────────────────────────── shading ────────────────────────────*/

/// Scale R, G and B by `(lightness + 1) / 256`, keeping alpha.
///
/// Red and blue share one multiply (they are 16 bits apart, so the products
/// never overlap); green gets the second.  Byte-exact with per-channel
/// `(c * (lightness + 1)) >> 8`, which keeps `255` as the identity.
#[inline(always)]
pub fn darken(color: Argb, lightness: u8) -> Argb {
    let l = lightness as u32 + 1;
    let rb = ((color & 0x00FF_00FF) * l >> 8) & 0x00FF_00FF;
    let g = ((color & 0x0000_FF00) * l >> 8) & 0x0000_FF00;
    (color & 0xFF00_0000) | rb | g
}

/// Linear falloff: 255 at the eye, 0 at `light_distance` and beyond.
#[inline]
pub fn lightness(distance: f32, light_distance: f32) -> u8 {
    if !(light_distance > 0.0) {
        return u8::MAX;
    }
    let l = (1.0 - distance.min(light_distance) / light_distance) * 255.0;
    l.clamp(0.0, 255.0) as u8
}

/*──────────────────────────── surface ────────────────────────────*/

/// Destination rectangle and shading for [`Surface::draw_image`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Billboard {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Depth compared against the per-column depth buffer.
    pub distance: f32,
    pub lightness: u8,
}

/// Width × height pixels, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<Argb>,
}

impl Surface {
    /// Zero-filled (transparent black) surface.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    /// Wrap an existing pixel buffer.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Argb>) -> Result<Self, SurfaceError> {
        let expected = width * height;
        if pixels.len() != expected {
            return Err(SurfaceError::SizeMismatch {
                width,
                height,
                expected,
                got: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[Argb] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Argb] {
        &mut self.pixels
    }

    #[inline]
    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Bounds-checked read.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Argb> {
        self.contains(x, y)
            .then(|| self.pixels[y as usize * self.width + x as usize])
    }

    /// Bounds-checked write; ignored outside the surface.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Argb) {
        if self.contains(x, y) {
            self.pixels[y as usize * self.width + x as usize] = color;
        }
    }

    /// Unchecked-coordinate read for samplers that already wrapped or
    /// clamped their coordinates.  Panics if they did not.
    #[inline(always)]
    pub fn texel(&self, x: usize, y: usize) -> Argb {
        self.pixels[y * self.width + x]
    }

    /// Copy of the `w`×`h` block at `(x, y)`.  Source pixels outside this
    /// surface come out transparent.
    pub fn region(&self, x: i32, y: i32, w: usize, h: usize) -> Surface {
        let mut out = Surface::new(w, h);
        for dy in 0..h {
            for dx in 0..w {
                if let Some(c) = self.get(x + dx as i32, y + dy as i32) {
                    out.pixels[dy * w + dx] = c;
                }
            }
        }
        out
    }

    /*──────────────────────── primitives ────────────────────────*/

    pub fn clear(&mut self, color: Argb) {
        self.pixels.fill(color);
    }

    /// Inclusive vertical span; endpoints may come in either order.
    pub fn draw_vertical_line(&mut self, x: i32, y_start: i32, y_end: i32, color: Argb) {
        let (y_start, y_end) = if y_end < y_start {
            (y_end, y_start)
        } else {
            (y_start, y_end)
        };
        if x < 0 || x as usize >= self.width || self.height == 0 {
            return;
        }
        if y_end < 0 || y_start >= self.height as i32 {
            return;
        }
        let last = self.height as i32 - 1;
        let y0 = fixed::clip(y_start, 0, last) as usize;
        let y1 = fixed::clip(y_end, 0, last) as usize;

        let col = x as usize;
        for y in y0..=y1 {
            self.pixels[y * self.width + col] = color;
        }
    }

    /// Stretch texture column `column` over the inclusive screen span
    /// `y_start..=y_end` at column `x`, darkening every texel.
    ///
    /// When the span starts above the surface the texture start is pushed
    /// down by the clipped amount, so the visible part samples the right
    /// rows.
    pub fn draw_vertical_slice(
        &mut self,
        texture: &Surface,
        x: i32,
        y_start: i32,
        y_end: i32,
        column: i32,
        lightness: u8,
    ) {
        let (y_start, y_end) = if y_end < y_start {
            (y_end, y_start)
        } else {
            (y_start, y_end)
        };
        if x < 0 || x as usize >= self.width || self.height == 0 {
            return;
        }
        if y_end < 0 || y_start >= self.height as i32 {
            return;
        }
        if column < 0 || column as usize >= texture.width || texture.height == 0 {
            return;
        }

        // i64: projected spans of very near walls saturate to i32::MIN..MAX
        let span = (y_end as i64 - y_start as i64 + 1) as f32;
        let step = texture.height as f32 / span;
        let mut tex_y = if y_start < 0 {
            -(y_start as f32) * step
        } else {
            0.0
        };

        let last = self.height as i32 - 1;
        let y0 = fixed::clip(y_start, 0, last) as usize;
        let y1 = fixed::clip(y_end, 0, last) as usize;
        let last_row = texture.height - 1;
        let col = column as usize;
        let x = x as usize;

        for y in y0..=y1 {
            let ty = (tex_y as usize).min(last_row);
            self.pixels[y * self.width + x] = darken(texture.texel(col, ty), lightness);
            tex_y += step;
        }
    }

    /// Clipped axis-aligned fill.
    pub fn draw_rectangle(&mut self, x: i32, y: i32, w: i32, h: i32, color: Argb) {
        if w <= 0 || h <= 0 {
            return;
        }
        let (sw, sh) = (self.width as i32, self.height as i32);
        let x0 = fixed::clip(x, 0, sw);
        let y0 = fixed::clip(y, 0, sh);
        let x1 = fixed::clip(x.saturating_add(w), 0, sw);
        let y1 = fixed::clip(y.saturating_add(h), 0, sh);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for row in y0 as usize..y1 as usize {
            let start = row * self.width;
            self.pixels[start + x0 as usize..start + x1 as usize].fill(color);
        }
    }

    /// Integer Bresenham line; pixels off the surface are skipped.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Argb) {
        let mut x0 = x0;
        let mut y0 = y0;
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Scaled, depth-tested billboard blit.
    ///
    /// The top-left corner and the span size are each snapped to whole
    /// pixels in 26.6 fixed-point, and the 16.16 texture step is derived from
    /// the *snapped* span, so a sprite whose projected size drifts by a
    /// fraction of a pixel keeps a stable texel mapping.
    ///
    /// Left/top clipping advances the texture start by `clipped * step`;
    /// the sub-pixel remainder of the unsnapped corner is not compensated.
    ///
    /// A column is skipped whenever `depth[x] < billboard.distance`; texels
    /// equal to [`TRANSPARENT`] are skipped too.
    pub fn draw_image(&mut self, image: &Surface, dst: &Billboard, depth: &[f32]) {
        if image.width == 0 || image.height == 0 {
            return;
        }
        if !(dst.width > 0.0 && dst.height > 0.0) {
            return;
        }
        if [dst.x, dst.y, dst.width, dst.height]
            .iter()
            .any(|v| !(v.abs() < MAX_BILLBOARD_EXTENT))
        {
            return;
        }

        let b = SUBPIXEL_BITS;
        let snap = |v: f32| fixed::to_int(fixed::round(fixed::to_fixed(v, b), b), b);
        let x0 = snap(dst.x);
        let y0 = snap(dst.y);
        let span_w = snap(dst.width);
        let span_h = snap(dst.height);
        if span_w <= 0 || span_h <= 0 {
            return;
        }

        let step_u = ((image.width as i64) << TEXEL_BITS) / span_w as i64;
        let step_v = ((image.height as i64) << TEXEL_BITS) / span_h as i64;

        let (dx0, u_start) = if x0 < 0 {
            (0, -(x0 as i64) * step_u)
        } else {
            (x0, 0)
        };
        let (dy0, v_start) = if y0 < 0 {
            (0, -(y0 as i64) * step_v)
        } else {
            (y0, 0)
        };
        let dx1 = (x0 + span_w).min(self.width as i32);
        let dy1 = (y0 + span_h).min(self.height as i32);
        if dx0 >= dx1 || dy0 >= dy1 {
            return;
        }

        let last_row = image.height - 1;
        let mut u = u_start;
        for x in dx0..dx1 {
            let tu = (u >> TEXEL_BITS) as usize;
            u += step_u;

            if depth
                .get(x as usize)
                .is_some_and(|&d| d < dst.distance)
            {
                continue;
            }
            if tu >= image.width {
                break;
            }

            let mut v = v_start;
            for y in dy0..dy1 {
                let tv = ((v >> TEXEL_BITS) as usize).min(last_row);
                v += step_v;
                let texel = image.texel(tu, tv);
                if texel != TRANSPARENT {
                    self.pixels[y as usize * self.width + x as usize] = darken(texel, dst.lightness);
                }
            }
        }
    }

    /// Fill a triangle with vertices given in sub-pixel precision.
    ///
    /// Vertices are quantised to `subpixel_bits` fractional bits; pixel
    /// centres are tested against integer edge functions starting from the
    /// bounding box corner rounded up to the next pixel boundary.  Either
    /// winding is accepted.
    pub fn fill_triangle(&mut self, points: [Vec2; 3], color: Argb, subpixel_bits: u32) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let bits = subpixel_bits.min(16);
        let fp = |p: Vec2| (fixed::to_fixed(p.x, bits), fixed::to_fixed(p.y, bits));
        let (a, mut b, mut c) = (fp(points[0]), fp(points[1]), fp(points[2]));

        let area = orient2d(a, b, c);
        if area == 0 {
            return;
        }
        if area < 0 {
            std::mem::swap(&mut b, &mut c);
        }

        let min_x = a.0.min(b.0).min(c.0).max(0);
        let min_y = a.1.min(b.1).min(c.1).max(0);
        let max_x = a.0
            .max(b.0)
            .max(c.0)
            .min(fixed::from_int(self.width as i32 - 1, bits));
        let max_y = a.1
            .max(b.1)
            .max(c.1)
            .min(fixed::from_int(self.height as i32 - 1, bits));

        let step = fixed::one(bits);
        let mut py = fixed::ceil(min_y, bits);
        while py <= max_y {
            let mut px = fixed::ceil(min_x, bits);
            while px <= max_x {
                let p = (px, py);
                if orient2d(b, c, p) >= 0 && orient2d(c, a, p) >= 0 && orient2d(a, b, p) >= 0 {
                    let x = fixed::to_int(px, bits) as usize;
                    let y = fixed::to_int(py, bits) as usize;
                    self.pixels[y * self.width + x] = color;
                }
                px += step;
            }
            py += step;
        }
    }
}

/// Twice the signed area of `a, b, c` (positive = clockwise on a y-down
/// screen).
#[inline(always)]
fn orient2d(a: (i32, i32), b: (i32, i32), c: (i32, i32)) -> i64 {
    (b.0 as i64 - a.0 as i64) * (c.1 as i64 - a.1 as i64)
        - (b.1 as i64 - a.1 as i64) * (c.0 as i64 - a.0 as i64)
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /* tiny helpers ---------------------------------------------------*/
    fn gradient(w: usize, h: usize) -> Surface {
        let pixels = (0..w * h).map(|i| 0xFF00_0000 | (i as u32 + 1)).collect();
        Surface::from_pixels(w, h, pixels).unwrap()
    }

    fn column(s: &Surface, x: i32) -> Vec<Argb> {
        (0..s.height() as i32).map(|y| s.get(x, y).unwrap()).collect()
    }

    #[test]
    fn darken_extremes() {
        let c = 0x80_C0_40_20;
        assert_eq!(darken(c, 255), c);
        assert_eq!(darken(c, 0), 0x80_00_00_00);
    }

    #[test]
    fn darken_matches_per_channel_formula() {
        for &c in &[0xFF_FF_FF_FFu32, 0x12_34_56_78, 0x00_01_FE_7F] {
            for l in [0u8, 1, 64, 127, 128, 200, 254, 255] {
                let f = |shift: u32| ((((c >> shift) & 0xFF) * (l as u32 + 1)) >> 8) << shift;
                let expected = (c & 0xFF00_0000) | f(16) | f(8) | f(0);
                assert_eq!(darken(c, l), expected, "c={c:08x} l={l}");
            }
        }
    }

    #[test]
    fn lightness_falls_off_linearly() {
        assert_eq!(lightness(0.0, 10.0), 255);
        assert_eq!(lightness(5.0, 10.0), 127);
        assert_eq!(lightness(10.0, 10.0), 0);
        assert_eq!(lightness(50.0, 10.0), 0);
        assert_eq!(lightness(3.0, 0.0), 255);
    }

    #[test]
    fn from_pixels_checks_length() {
        assert_eq!(
            Surface::from_pixels(2, 2, vec![0; 3]).unwrap_err(),
            SurfaceError::SizeMismatch {
                width: 2,
                height: 2,
                expected: 4,
                got: 3
            }
        );
    }

    #[test]
    fn vertical_line_clips() {
        let mut s = Surface::new(3, 4);
        s.draw_vertical_line(1, -10, 1, 7);
        assert_eq!(column(&s, 1), vec![7, 7, 0, 0]);
        s.draw_vertical_line(3, 0, 3, 9);
        s.draw_vertical_line(0, 5, 9, 9);
        assert!(s.pixels().iter().all(|&p| p != 9));
    }

    #[test]
    fn zero_height_surface_ignores_columns() {
        let tex = gradient(1, 2);
        let mut s = Surface::new(3, 0);
        s.draw_vertical_line(1, -5, 5, 7);
        s.draw_vertical_slice(&tex, 1, -5, 5, 0, 255);
        s.draw_rectangle(0, -1, 3, 3, 7);
        assert!(s.pixels().is_empty());
    }

    #[test]
    fn slice_stretches_texture_column() {
        let tex = gradient(2, 2); // column 1 = [2, 4]
        let mut s = Surface::new(1, 4);
        s.draw_vertical_slice(&tex, 0, 0, 3, 1, 255);
        assert_eq!(
            column(&s, 0),
            vec![0xFF00_0002, 0xFF00_0002, 0xFF00_0004, 0xFF00_0004]
        );
    }

    #[test]
    fn slice_compensates_top_clipping() {
        let tex = gradient(1, 4); // [1, 2, 3, 4]
        let mut s = Surface::new(1, 4);
        // 8-pixel span, top half above the surface
        s.draw_vertical_slice(&tex, 0, -4, 3, 0, 255);
        assert_eq!(
            column(&s, 0),
            vec![0xFF00_0003, 0xFF00_0003, 0xFF00_0004, 0xFF00_0004]
        );
    }

    #[test]
    fn slice_rejects_bad_column() {
        let tex = gradient(2, 2);
        let mut s = Surface::new(1, 2);
        s.draw_vertical_slice(&tex, 0, 0, 1, 2, 255);
        s.draw_vertical_slice(&tex, 0, 0, 1, -1, 255);
        assert!(s.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn slice_survives_saturated_span() {
        let tex = gradient(1, 4);
        let mut s = Surface::new(1, 3);
        s.draw_vertical_slice(&tex, 0, i32::MIN, i32::MAX, 0, 255);
        assert!(s.pixels().iter().all(|&p| p != 0));
    }

    #[test]
    fn rectangle_clips() {
        let mut s = Surface::new(4, 3);
        s.draw_rectangle(-1, 1, 3, 5, 5);
        assert_eq!(s.pixels(), &[0, 0, 0, 0, 5, 5, 0, 0, 5, 5, 0, 0]);
        s.draw_rectangle(10, 0, 3, 3, 6);
        s.draw_rectangle(0, 0, 0, 3, 6);
        assert!(s.pixels().iter().all(|&p| p != 6));
    }

    #[test]
    fn line_hits_both_endpoints() {
        let mut s = Surface::new(5, 5);
        s.draw_line(0, 0, 4, 2, 3);
        assert_eq!(s.get(0, 0), Some(3));
        assert_eq!(s.get(4, 2), Some(3));
        s.draw_line(-5, -5, 10, 10, 4);
        assert_eq!(s.get(4, 4), Some(4));
    }

    #[test]
    fn region_copies_and_pads() {
        let src = gradient(3, 3);
        let r = src.region(1, 1, 3, 2);
        assert_eq!(r.pixels(), &[0xFF00_0005, 0xFF00_0006, 0, 0xFF00_0008, 0xFF00_0009, 0]);
    }

    #[test]
    fn image_scales_and_keys_transparency() {
        let img = Surface::from_pixels(2, 1, vec![0xFF11_1111, TRANSPARENT]).unwrap();
        let mut s = Surface::new(4, 2);
        s.clear(0xFF00_0000);
        let dst = Billboard {
            x: 0.0,
            y: 0.0,
            width: 4.0,
            height: 2.0,
            distance: 1.0,
            lightness: 255,
        };
        s.draw_image(&img, &dst, &[f32::INFINITY; 4]);
        assert_eq!(
            s.pixels(),
            &[
                0xFF11_1111, 0xFF11_1111, 0xFF00_0000, 0xFF00_0000,
                0xFF11_1111, 0xFF11_1111, 0xFF00_0000, 0xFF00_0000,
            ]
        );
    }

    #[test]
    fn image_span_is_snapped() {
        let img = Surface::from_pixels(1, 1, vec![0xFF12_3456]).unwrap();
        let depth = [f32::INFINITY; 8];
        let drawn = |x: f32, w: f32| {
            let mut s = Surface::new(8, 1);
            let dst = Billboard {
                x,
                y: 0.0,
                width: w,
                height: 1.0,
                distance: 0.0,
                lightness: 255,
            };
            s.draw_image(&img, &dst, &depth);
            s.pixels().iter().filter(|&&p| p != 0).count()
        };
        // fractional drift in position or size does not change coverage
        assert_eq!(drawn(1.2, 3.0), 3);
        assert_eq!(drawn(1.45, 3.2), 3);
        assert_eq!(drawn(0.6, 2.9), 3);
    }

    #[test]
    fn image_clipped_left_samples_the_right_part() {
        let img = Surface::from_pixels(4, 1, vec![0xFF00_0001, 0xFF00_0002, 0xFF00_0003, 0xFF00_0004])
            .unwrap();
        let mut s = Surface::new(2, 1);
        let dst = Billboard {
            x: -2.0,
            y: 0.0,
            width: 4.0,
            height: 1.0,
            distance: 0.0,
            lightness: 255,
        };
        s.draw_image(&img, &dst, &[f32::INFINITY; 2]);
        assert_eq!(s.pixels(), &[0xFF00_0003, 0xFF00_0004]);
    }

    #[test]
    fn image_off_surface_is_noop() {
        let img = gradient(2, 2);
        let mut s = Surface::new(4, 4);
        for (x, y) in [(-10.0, 0.0), (10.0, 0.0), (0.0, -10.0), (0.0, 10.0)] {
            let dst = Billboard {
                x,
                y,
                width: 2.0,
                height: 2.0,
                distance: 0.0,
                lightness: 255,
            };
            s.draw_image(&img, &dst, &[f32::INFINITY; 4]);
        }
        assert!(s.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn triangle_covers_interior_either_winding() {
        let tri = [Vec2::new(0.0, 0.0), Vec2::new(7.0, 0.0), Vec2::new(0.0, 7.0)];
        for pts in [tri, [tri[0], tri[2], tri[1]]] {
            for bits in [0, 4, 8] {
                let mut s = Surface::new(8, 8);
                s.fill_triangle(pts, 1, bits);
                assert_eq!(s.get(1, 1), Some(1));
                assert_eq!(s.get(0, 7), Some(1));
                assert_eq!(s.get(7, 7), Some(0));
            }
        }
    }

    #[test]
    fn degenerate_triangle_draws_nothing() {
        let mut s = Surface::new(4, 4);
        s.fill_triangle([Vec2::ZERO, Vec2::new(1.0, 1.0), Vec2::new(3.0, 3.0)], 1, 4);
        assert!(s.pixels().iter().all(|&p| p == 0));
    }

    proptest! {
        #[test]
        fn vertical_line_is_order_independent(
            x in -2i32..6,
            a in -20i32..20,
            b in -20i32..20,
        ) {
            let mut s1 = Surface::new(4, 10);
            let mut s2 = Surface::new(4, 10);
            s1.draw_vertical_line(x, a, b, 0xFFAB_CDEF);
            s2.draw_vertical_line(x, b, a, 0xFFAB_CDEF);
            prop_assert_eq!(s1, s2);
        }

        #[test]
        fn occluded_columns_are_untouched(
            x in -6.0f32..6.0,
            w in 1.0f32..12.0,
            occluded in 0usize..6,
            distance in 0.5f32..20.0,
        ) {
            let img = Surface::from_pixels(2, 2, vec![0xFFFF_FFFF; 4]).unwrap();
            let mut depth = [f32::INFINITY; 6];
            depth[occluded] = distance * 0.5;
            let mut s = Surface::new(6, 4);
            s.clear(0xFF00_0000);
            let dst = Billboard { x, y: 0.0, width: w, height: 4.0, distance, lightness: 255 };
            s.draw_image(&img, &dst, &depth);
            for y in 0..4 {
                prop_assert_eq!(s.get(occluded as i32, y), Some(0xFF00_0000));
            }
        }

        #[test]
        fn darken_keeps_alpha(c in any::<u32>(), l in any::<u8>()) {
            prop_assert_eq!(darken(c, l) & 0xFF00_0000, c & 0xFF00_0000);
        }
    }
}
