use glam::Vec2;

use crate::world::Camera;

/// Camera basis shared by every pass of one frame.
#[derive(Clone, Copy, Debug)]
pub struct View {
    pub pos: Vec2,
    pub forward: Vec2,
    pub right: Vec2,
    /// `tan(fov / 2)`
    pub half_width: f32,
}

impl View {
    pub fn new(camera: &Camera) -> Self {
        Self {
            pos: camera.pos,
            forward: camera.forward(),
            right: camera.right(),
            half_width: camera.half_width(),
        }
    }

    /// Un-normalised ray through screen column `x`; its forward component
    /// is exactly 1, so scaling it by a perpendicular distance gives the
    /// world point at that depth.
    #[inline]
    pub fn column_ray(&self, x: usize, width: usize) -> Vec2 {
        self.forward + self.right * (column_offset(x, width) * self.half_width)
    }

    /// Inverse of [`column_ray`](Self::column_ray) for a lateral/forward
    /// ratio: fractional screen column whose ray has that slope.
    #[inline]
    pub fn screen_x(&self, lateral_over_depth: f32, width: usize) -> f32 {
        let span = width.saturating_sub(1) as f32;
        (lateral_over_depth / self.half_width + 1.0) * 0.5 * span
    }
}

/// Position of column `x` across the view plane: −1 at the left edge, +1 at
/// the right edge.  A single-column frame looks straight ahead.
#[inline]
pub fn column_offset(x: usize, width: usize) -> f32 {
    if width <= 1 {
        return 0.0;
    }
    x as f32 * 2.0 / (width - 1) as f32 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_span_the_view_plane() {
        assert_eq!(column_offset(0, 5), -1.0);
        assert_eq!(column_offset(2, 5), 0.0);
        assert_eq!(column_offset(4, 5), 1.0);
        assert_eq!(column_offset(0, 1), 0.0);
    }

    #[test]
    fn screen_x_inverts_column_ray() {
        let view = View::new(&Camera::new(0.0, 0.0, 30.0, 66.0));
        for x in [0, 3, 7, 9] {
            let ray = view.column_ray(x, 10);
            let slope = ray.dot(view.right) / ray.dot(view.forward);
            assert!((view.screen_x(slope, 10) - x as f32).abs() < 1e-3);
        }
    }
}
