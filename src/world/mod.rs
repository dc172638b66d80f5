mod camera;
mod map;
mod sprite;
mod texture;

pub use camera::{COLLISION_LOOKAHEAD, Camera, MAX_STEP};

pub use map::{CellCode, EMPTY, Map, MapError, RayHit};

pub use sprite::Sprite;

pub use texture::{Palette, Texture, TextureError, argb_from_rgba_bytes, argb_to_rgba, rgba_to_argb};
