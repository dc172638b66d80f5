//! Rendering abstraction layer.
//!
//! A frame is produced in four steps behind the [`Renderer`] trait:
//! `begin_frame` → floor/ceiling → walls → sprites, then `end_frame` loans
//! the finished buffer to the host.  [`RendererExt::render`] runs the steps
//! in that order so call-sites stay short.
//!
//! * Pixels are 0xAARRGGBB ([`Argb`]), which `minifb` displays as-is.
//! * Which passes run is decided by [`RenderFlags`].

use bitflags::bitflags;

use crate::world::{Camera, Map, Sprite};

mod surface;
pub mod software;

pub use software::{PlaneMode, PlaneRow, PlaneRowFn, Software};
pub use surface::{Argb, Billboard, Surface, SurfaceError, TRANSPARENT, darken, lightness};

bitflags! {
    /// Per-pass feature toggles.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RenderFlags: u8 {
        const WALLS              = 0b0001;
        const PLANES             = 0b0010;
        const SPRITES            = 0b0100;
        // Floor/ceiling sampled with 16.16 fixed-point instead of f32.
        const FIXED_POINT_PLANES = 0b1000;
    }
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self::WALLS | Self::PLANES | Self::SPRITES
    }
}

impl RenderFlags {
    /// Floor/ceiling strategy selected by [`RenderFlags::FIXED_POINT_PLANES`].
    pub fn plane_mode(self) -> PlaneMode {
        if self.contains(Self::FIXED_POINT_PLANES) {
            PlaneMode::Fixed
        } else {
            PlaneMode::Float
        }
    }
}

/// Construction-time failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RenderError {
    /// Floor/ceiling textures wrap with a bitmask, so both sides must be
    /// powers of two.
    #[error("{which} texture is {width}x{height}; floor/ceiling sides must be powers of two")]
    NotPowerOfTwo {
        which: &'static str,
        width: usize,
        height: usize,
    },
}

/// A renderer that owns its frame buffer and depth buffer.
///
/// Inputs are borrowed for the duration of each call only; no pass keeps
/// state for the next frame other than the buffers themselves.
pub trait Renderer {
    /// Clear the frame to the background and reset the depth buffer to +∞.
    fn begin_frame(&mut self);

    /// Floor and ceiling by inverse perspective mapping.
    fn draw_planes(&mut self, camera: &Camera, light_distance: f32);

    /// One ray per column against `map`; records the depth buffer.
    fn draw_walls(&mut self, camera: &Camera, map: &Map, light_distance: f32);

    /// Billboards far-to-near, depth-tested per column.  Refreshes every
    /// sprite's `distance` and re-sorts the slice in place.
    fn draw_sprites(&mut self, camera: &Camera, sprites: &mut [Sprite<'_>], light_distance: f32);

    /// Finish the frame and **loan** the finished buffer to `submit`.
    ///
    /// * `submit(&[Argb], w, h)` is run exactly once per call.
    /// * Software caller passes `|fb, w, h| window.update_with_buffer(fb, w, h)`.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Argb], usize, usize);
}

/// Convenience blanket-impl with a one-liner `render` adaptor.
pub trait RendererExt: Renderer {
    /// Render one full frame.  `light_distance` is where lightness reaches 0.
    fn render(&mut self, camera: &Camera, map: &Map, sprites: &mut [Sprite<'_>], light_distance: f32) {
        self.begin_frame();
        self.draw_planes(camera, light_distance);
        self.draw_walls(camera, map, light_distance);
        self.draw_sprites(camera, sprites, light_distance);
    }
}
impl<T: Renderer + ?Sized> RendererExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flags_enable_every_pass_in_float_mode() {
        let f = RenderFlags::default();
        assert!(f.contains(RenderFlags::WALLS | RenderFlags::PLANES | RenderFlags::SPRITES));
        assert_eq!(f.plane_mode(), PlaneMode::Float);
    }

    #[test]
    fn fixed_flag_selects_fixed_planes() {
        let mut f = RenderFlags::default();
        f.toggle(RenderFlags::FIXED_POINT_PLANES);
        assert_eq!(f.plane_mode(), PlaneMode::Fixed);
    }
}
