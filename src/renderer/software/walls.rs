use glam::Vec2;

use crate::{
    renderer::{lightness, software::Software},
    world::{Camera, CellCode, Map},
};

use super::projection::View;

/// One screen column's wall, already projected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct WallColumn {
    pub cell: CellCode,
    pub hit: Vec2,
    /// Distance along the camera forward axis (fisheye-corrected).
    pub distance: f32,
    /// `frame_half_height / distance`
    pub half_height: f32,
    pub y_start: i32,
    pub y_end: i32,
}

impl Software<'_> {
    pub(super) fn render_walls(&mut self, camera: &Camera, map: &Map, light_distance: f32) {
        let view = View::new(camera);
        let max_distance = map.diagonal();
        let width = self.frame.width();
        let mut untextured = 0usize;

        for x in 0..width {
            let Some(col) = self.project_column(&view, map, max_distance, x) else {
                continue; // miss: keep background, depth stays +∞
            };

            let Some(tex) = usize::try_from(col.cell - 1)
                .ok()
                .and_then(|i| self.walls.get(i))
            else {
                untextured += 1;
                continue;
            };
            let tw = tex.width() as i32;
            if tw == 0 {
                continue;
            }

            // u couples to x+y so that both faces of a cell run the strip
            // in the same world direction
            let u = (((col.hit.x + col.hit.y) * tw as f32).floor() as i32).rem_euclid(tw);
            let light = lightness(col.distance, light_distance);

            self.frame
                .draw_vertical_slice(tex, x as i32, col.y_start, col.y_end, u, light);
            self.depth[x] = col.distance;
        }

        if untextured > 0 {
            tracing::debug!(
                columns = untextured,
                wall_textures = self.walls.len(),
                "cell codes without a wall texture"
            );
        }
    }

    /// Cast the ray for column `x` and project the wall it hits.
    pub(super) fn project_column(
        &self,
        view: &View,
        map: &Map,
        max_distance: f32,
        x: usize,
    ) -> Option<WallColumn> {
        let dir = view.column_ray(x, self.frame.width()).normalize();
        let hit = map.raycast(view.pos, dir, max_distance)?;

        let distance = hit.distance * dir.dot(view.forward);
        let half_height = self.half_h / distance;

        Some(WallColumn {
            cell: hit.cell,
            hit: hit.point,
            distance,
            half_height,
            y_start: (self.half_h - half_height) as i32,
            y_end: (self.half_h + half_height) as i32,
        })
    }
}
