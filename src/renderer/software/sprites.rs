use crate::{
    renderer::{Billboard, lightness, software::Software},
    world::{Camera, Sprite},
};

use super::projection::View;

impl Software<'_> {
    /// Painter's algorithm over the sprite list, with the wall depth buffer
    /// providing per-column occlusion.
    pub(super) fn render_sprites(
        &mut self,
        camera: &Camera,
        sprites: &mut [Sprite<'_>],
        light_distance: f32,
    ) {
        let view = View::new(camera);

        for s in sprites.iter_mut() {
            s.distance = s.pos.distance(view.pos);
        }
        // far-to-near so nearer sprites overdraw
        sprites.sort_by(|a, b| b.distance.total_cmp(&a.distance));

        for s in sprites.iter() {
            if let Some(dst) = self.project_sprite(&view, s, light_distance) {
                self.frame.draw_image(s.texture, &dst, &self.depth);
            }
        }
    }

    /// Screen rectangle of a sprite standing on the floor, or `None` when
    /// it is behind the camera.
    fn project_sprite(&self, view: &View, s: &Sprite<'_>, light_distance: f32) -> Option<Billboard> {
        let to_sprite = s.pos - view.pos;
        let ahead = to_sprite.dot(view.forward);
        if ahead <= 0.0 {
            return None;
        }
        let tex = s.texture;
        if tex.width() == 0 || tex.height() == 0 {
            return None;
        }

        let view_angle = to_sprite.dot(view.right).atan2(ahead);
        let distance = s.distance * view_angle.cos();

        // a full cell spans 2 * half_h / distance pixels
        let height = 2.0 * self.half_h / distance * s.height;
        let width = height * tex.width() as f32 / tex.height() as f32;

        let centre_x = view.screen_x(view_angle.tan(), self.frame.width()) + 0.5;
        let floor_y = self.half_h + self.half_h / distance;

        Some(Billboard {
            x: centre_x - width * 0.5,
            y: floor_y - height,
            width,
            height,
            distance,
            lightness: lightness(distance, light_distance),
        })
    }
}
