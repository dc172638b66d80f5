use glam::Vec2;

use super::map::{EMPTY, Map};

/// Distance probed ahead of the camera on each axis before stepping.
pub const COLLISION_LOOKAHEAD: f32 = 0.1;

/// Largest distance a single `advance`/`strafe` call may travel per axis.
pub const MAX_STEP: f32 = 0.1;

/// Viewer pose in grid space.
///
/// * `angle` is in **degrees**; 0 = +X, positive turns toward +Y.
/// * `fov` is the full horizontal field of view, also in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub pos: Vec2,
    pub angle: f32,
    pub fov: f32,
}

impl Camera {
    pub fn new(x: f32, y: f32, angle: f32, fov: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            angle,
            fov,
        }
    }

    /*──────────────────────── derived vectors ───────────────────────*/

    /// Unit vector the camera looks along.
    #[inline(always)]
    pub fn forward(&self) -> Vec2 {
        let (s, c) = self.angle.to_radians().sin_cos();
        Vec2::new(c, s)
    }

    /// Unit vector pointing to the camera's right: forward rotated +90°.
    #[inline(always)]
    pub fn right(&self) -> Vec2 {
        self.forward().perp()
    }

    /// `tan(fov / 2)`: lateral extent of the view plane at unit depth.
    #[inline]
    pub fn half_width(&self) -> f32 {
        (self.fov * 0.5).to_radians().tan()
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Turn by `degrees`; the stored angle stays in `[0, 360)`.
    pub fn rotate(&mut self, degrees: f32) {
        self.angle = (self.angle + degrees).rem_euclid(360.0);
    }

    /// Walk along the view direction (negative = backwards), sliding along
    /// walls.
    pub fn advance(&mut self, map: &Map, distance: f32) {
        let dir = self.forward();
        self.slide(map, dir, distance);
    }

    /// Side-step to the right (negative = left), sliding along walls.
    pub fn strafe(&mut self, map: &Map, distance: f32) {
        let dir = self.right();
        self.slide(map, dir, distance);
    }

    /// Axis-separated collision: each axis is probed `COLLISION_LOOKAHEAD`
    /// ahead of the current position and advanced only if that cell is
    /// open.
    fn slide(&mut self, map: &Map, dir: Vec2, distance: f32) {
        let dir = if distance < 0.0 { -dir } else { dir };
        let step = distance.abs().min(MAX_STEP);
        let start = self.pos;

        let probe_x = Vec2::new(start.x + dir.x * COLLISION_LOOKAHEAD, start.y);
        let probe_y = Vec2::new(start.x, start.y + dir.y * COLLISION_LOOKAHEAD);

        if map.cell_at(probe_x) <= EMPTY {
            self.pos.x += dir.x * step;
        }
        if map.cell_at(probe_y) <= EMPTY {
            self.pos.y += dir.y * step;
        }
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
