use glam::Vec2;

use super::texture::Texture;

/// Billboard placed in the grid.
///
/// The texture is borrowed: whoever owns the textures must keep them alive
/// for as long as the sprite list is rendered.
#[derive(Clone, Copy, Debug)]
pub struct Sprite<'t> {
    pub pos: Vec2,
    /// Vertical size as a fraction of a full wall cell.
    pub height: f32,
    pub texture: &'t Texture,
    /// Euclidean distance to the camera, refreshed by the renderer before
    /// every sort.
    pub distance: f32,
}

impl<'t> Sprite<'t> {
    pub fn new(x: f32, y: f32, height: f32, texture: &'t Texture) -> Self {
        Self {
            pos: Vec2::new(x, y),
            height,
            texture,
            distance: 0.0,
        }
    }
}
