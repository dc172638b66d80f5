//! Grid raycasting software renderer.
//!
//! * [`world`] holds the map, camera, sprites and texture loading.
//! * [`renderer`] turns them into a 0xAARRGGBB frame.

pub mod fixed;
pub mod metrics;
pub mod renderer;
pub mod world;

pub use renderer::{RenderFlags, Renderer, RendererExt, Software, Surface};
pub use world::{Camera, Map, Sprite, Texture};
