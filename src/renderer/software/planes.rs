use glam::Vec2;

use crate::{
    fixed::{self, TEXEL_BITS},
    renderer::{Surface, darken, lightness, software::Software},
    world::{Camera, Texture},
};

use super::projection::{View, column_offset};

/// Everything a row rasterizer needs for one floor row and its mirrored
/// ceiling row.
#[derive(Clone, Copy, Debug)]
pub struct PlaneRow {
    pub floor_y: usize,
    pub ceiling_y: usize,
    /// World point seen by column 0.
    pub origin: Vec2,
    /// World-space advance per screen column.
    pub step: Vec2,
    pub lightness: u8,
}

/// Draws one [`PlaneRow`] into the frame.  Floor and ceiling textures must
/// have power-of-two sides; coordinates wrap with `& (side - 1)`.
pub type PlaneRowFn = fn(&mut Surface, &PlaneRow, &Texture, &Texture);

/// How floor/ceiling texture coordinates are stepped across a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneMode {
    /// f32 world coordinates.
    Float,
    /// 16.16 fixed-point world coordinates, shifted straight into texels.
    Fixed,
}

impl PlaneMode {
    pub fn row_fn(self) -> PlaneRowFn {
        match self {
            PlaneMode::Float => draw_row_float,
            PlaneMode::Fixed => draw_row_fixed,
        }
    }
}

impl Software<'_> {
    /// Inverse perspective mapping: a row `p` pixels below the horizon shows
    /// the floor at distance `half_h / p`.  The ceiling row mirrored about
    /// the horizon shows the same distance.
    pub(super) fn render_planes(&mut self, camera: &Camera, light_distance: f32) {
        let (Some(floor), Some(ceiling)) = (self.floor, self.ceiling) else {
            return;
        };
        let view = View::new(camera);
        let width = self.frame.width();
        let height = self.frame.height();
        if width == 0 || height == 0 {
            return;
        }

        let left = view.forward + view.right * (column_offset(0, width) * view.half_width);
        let right = view.forward + view.right * (column_offset(width - 1, width) * view.half_width);
        let per_column = if width > 1 {
            (right - left) / (width - 1) as f32
        } else {
            Vec2::ZERO
        };

        let draw_row = self.flags.plane_mode().row_fn();

        for y in (height / 2)..height {
            let p = (y as f32 + 0.5) - self.half_h;
            if p <= 0.0 {
                continue;
            }
            let row_distance = self.half_h / p;
            let row = PlaneRow {
                floor_y: y,
                ceiling_y: height - 1 - y,
                origin: view.pos + left * row_distance,
                step: per_column * row_distance,
                lightness: lightness(row_distance, light_distance),
            };
            draw_row(&mut self.frame, &row, floor, ceiling);
        }
    }
}

/// Texel coordinate for world coordinate `v` on a side of `size` texels.
#[inline(always)]
fn wrap(v: f32, size: usize) -> usize {
    ((v * size as f32).floor() as i32 & (size as i32 - 1)) as usize
}

fn draw_row_float(frame: &mut Surface, row: &PlaneRow, floor: &Texture, ceiling: &Texture) {
    let width = frame.width();
    let floor_base = row.floor_y * width;
    let ceil_base = row.ceiling_y * width;
    let pixels = frame.pixels_mut();

    let mut p = row.origin;
    for x in 0..width {
        let f = floor.texel(wrap(p.x, floor.width()), wrap(p.y, floor.height()));
        let c = ceiling.texel(wrap(p.x, ceiling.width()), wrap(p.y, ceiling.height()));
        pixels[floor_base + x] = darken(f, row.lightness);
        pixels[ceil_base + x] = darken(c, row.lightness);
        p += row.step;
    }
}

/// Shift that turns a 16.16 world coordinate into a texel index on a
/// power-of-two side.
#[inline(always)]
fn texel_shift(size: usize) -> u32 {
    TEXEL_BITS - size.trailing_zeros().min(TEXEL_BITS)
}

fn draw_row_fixed(frame: &mut Surface, row: &PlaneRow, floor: &Texture, ceiling: &Texture) {
    let width = frame.width();
    let floor_base = row.floor_y * width;
    let ceil_base = row.ceiling_y * width;
    let pixels = frame.pixels_mut();

    let (fsx, fsy) = (texel_shift(floor.width()), texel_shift(floor.height()));
    let (csx, csy) = (texel_shift(ceiling.width()), texel_shift(ceiling.height()));
    let (fmx, fmy) = (floor.width() as i32 - 1, floor.height() as i32 - 1);
    let (cmx, cmy) = (ceiling.width() as i32 - 1, ceiling.height() as i32 - 1);

    // rounded: a truncated step drifts a little further every column
    let mut u = fixed::to_fixed_round(row.origin.x, TEXEL_BITS);
    let mut v = fixed::to_fixed_round(row.origin.y, TEXEL_BITS);
    let du = fixed::to_fixed_round(row.step.x, TEXEL_BITS);
    let dv = fixed::to_fixed_round(row.step.y, TEXEL_BITS);

    for x in 0..width {
        let f = floor.texel(((u >> fsx) & fmx) as usize, ((v >> fsy) & fmy) as usize);
        let c = ceiling.texel(((u >> csx) & cmx) as usize, ((v >> csy) & cmy) as usize);
        pixels[floor_base + x] = darken(f, row.lightness);
        pixels[ceil_base + x] = darken(c, row.lightness);
        u = u.wrapping_add(du);
        v = v.wrapping_add(dv);
    }
}
