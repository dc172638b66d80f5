use crate::{
    renderer::{Argb, RenderError, RenderFlags, Renderer, Surface},
    world::{Camera, Map, Sprite, Texture},
};

/// Opaque black.
const DEFAULT_BACKGROUND: Argb = 0xFF_00_00_00;

/// CPU raycaster.
///
/// Owns the frame and its depth buffer; borrows every texture for `'t`, so
/// the textures must outlive the renderer.
pub struct Software<'t> {
    pub(super) frame: Surface,
    /// Per-column distance along the camera forward axis to the nearest wall
    /// drawn this frame, +∞ where none was.
    pub(super) depth: Vec<f32>,

    /// Wall texture `i` is used by cell code `i + 1`.
    pub(super) walls: &'t [Texture],
    pub(super) floor: Option<&'t Texture>,
    pub(super) ceiling: Option<&'t Texture>,

    pub(super) flags: RenderFlags,
    pub(super) background: Argb,

    pub(super) half_h: f32,
}

impl<'t> Software<'t> {
    /// `width`×`height` frame using `walls` for cell codes `1..=walls.len()`.
    /// Floors and ceilings stay off until [`with_planes`](Self::with_planes).
    pub fn new(width: usize, height: usize, walls: &'t [Texture]) -> Self {
        tracing::debug!(width, height, wall_textures = walls.len(), "software renderer");
        Self {
            frame: Surface::new(width, height),
            depth: vec![f32::INFINITY; width],
            walls,
            floor: None,
            ceiling: None,
            flags: RenderFlags::default(),
            background: DEFAULT_BACKGROUND,
            half_h: height as f32 * 0.5,
        }
    }

    /// Attach floor and ceiling textures.  Both must have power-of-two sides.
    pub fn with_planes(mut self, floor: &'t Texture, ceiling: &'t Texture) -> Result<Self, RenderError> {
        check_pow2("floor", floor)?;
        check_pow2("ceiling", ceiling)?;
        self.floor = Some(floor);
        self.ceiling = Some(ceiling);
        Ok(self)
    }

    pub fn with_flags(mut self, flags: RenderFlags) -> Self {
        self.flags = flags;
        self
    }

    #[inline]
    pub fn flags(&self) -> RenderFlags {
        self.flags
    }

    /// Mutable toggles, handed to whatever handles input.
    #[inline]
    pub fn flags_mut(&mut self) -> &mut RenderFlags {
        &mut self.flags
    }

    /// Colour left wherever no pass draws (e.g. columns whose ray missed).
    pub fn set_background(&mut self, color: Argb) {
        self.background = color;
    }

    #[inline]
    pub fn frame(&self) -> &Surface {
        &self.frame
    }

    /// Mutable access for host overlays drawn after `render`.
    #[inline]
    pub fn frame_mut(&mut self) -> &mut Surface {
        &mut self.frame
    }

    #[inline]
    pub fn depth_buffer(&self) -> &[f32] {
        &self.depth
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.frame.height()
    }
}

fn check_pow2(which: &'static str, tex: &Texture) -> Result<(), RenderError> {
    if tex.width().is_power_of_two() && tex.height().is_power_of_two() {
        Ok(())
    } else {
        Err(RenderError::NotPowerOfTwo {
            which,
            width: tex.width(),
            height: tex.height(),
        })
    }
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for Software<'_> {
    fn begin_frame(&mut self) {
        self.frame.clear(self.background);
        self.depth.fill(f32::INFINITY);
    }

    fn draw_planes(&mut self, camera: &Camera, light_distance: f32) {
        if !self.flags.contains(RenderFlags::PLANES) {
            return;
        }
        self.render_planes(camera, light_distance);
    }

    fn draw_walls(&mut self, camera: &Camera, map: &Map, light_distance: f32) {
        if !self.flags.contains(RenderFlags::WALLS) {
            return;
        }
        self.render_walls(camera, map, light_distance);
    }

    fn draw_sprites(&mut self, camera: &Camera, sprites: &mut [Sprite<'_>], light_distance: f32) {
        if !self.flags.contains(RenderFlags::SPRITES) {
            return;
        }
        self.render_sprites(camera, sprites, light_distance);
    }

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Argb], usize, usize),
    {
        submit(self.frame.pixels(), self.frame.width(), self.frame.height());
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
