//! ---------------------------------------------------------------------------
//! Software (CPU) grid raycaster
//!
//! * Fills an owned [`Surface`](super::Surface) in **0xAARRGGBB** format.
//! * Walls come from one DDA ray per screen column; each column records the
//!   corrected wall distance in a depth buffer that the sprite pass tests
//!   against per pixel.
//! * Floors and ceilings are drawn first, row by row, so walls overwrite
//!   them where they stand.
//! ---------------------------------------------------------------------------

mod planes;
mod projection;
mod renderer;
mod sprites;
mod walls;

pub use planes::{PlaneMode, PlaneRow, PlaneRowFn};
pub use renderer::Software;
