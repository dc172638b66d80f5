use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, bail};
use clap::Parser;
use glam::Vec2;
use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use raycast_rs::{
    metrics::Average,
    renderer::{Argb, RenderFlags, Renderer, RendererExt, Software, Surface, TRANSPARENT},
    world::{Camera, EMPTY, Map, Sprite, Texture},
};

/// Walk speed in cells per second.
const MOVE_SPEED: f32 = 3.0;
/// Turn speed in degrees per second.
const TURN_SPEED: f32 = 120.0;
/// Minimap cell size in pixels.
const MINIMAP_CELL: i32 = 4;
/// Report the averaged frame time this often.
const REPORT_EVERY: Duration = Duration::from_secs(3);

const BUILTIN_MAP: &str = "
1 1 1 1 1 1 1 1 1 1 1 1
1 0 0 0 0 0 0 0 0 0 0 1
1 0 2 2 0 0 0 0 3 0 0 1
1 0 2 0 0 0 0 0 3 0 0 1
1 0 0 0 0 1 1 0 0 0 0 1
1 0 0 0 0 1 1 0 0 0 0 1
1 0 3 0 0 0 0 0 0 2 0 1
1 0 3 0 0 0 0 0 2 2 0 1
1 0 0 0 0 0 0 0 0 0 0 1
1 1 1 1 1 1 1 1 1 1 1 1
";

/// Grid raycaster viewer.
#[derive(Parser, Debug)]
#[command(name = "view", version, about)]
struct Args {
    /// Frame width in pixels
    #[arg(long, default_value_t = 320)]
    width: usize,

    /// Frame height in pixels
    #[arg(long, default_value_t = 200)]
    height: usize,

    /// Window scale factor (1, 2, 4 or 8)
    #[arg(long, default_value_t = 4)]
    scale: u32,

    /// Horizontal field of view in degrees
    #[arg(long, default_value_t = 66.0)]
    fov: f32,

    /// Distance at which everything fades to black; 0 disables shading
    #[arg(long, default_value_t = 8.0)]
    light_distance: f32,

    /// Map file: whitespace-separated cell codes, one row per line
    #[arg(long)]
    map: Option<PathBuf>,

    /// Wall texture atlas; tiles are numbered row-major from cell code 1
    #[arg(long)]
    atlas: Option<PathBuf>,

    /// Atlas tile side in pixels
    #[arg(long, default_value_t = 64)]
    tile: usize,

    /// Floor texture (power-of-two sides)
    #[arg(long)]
    floor: Option<PathBuf>,

    /// Ceiling texture (power-of-two sides)
    #[arg(long)]
    ceiling: Option<PathBuf>,

    /// Sprite texture
    #[arg(long)]
    sprite: Option<PathBuf>,

    /// Sample floor and ceiling in 16.16 fixed-point
    #[arg(long)]
    fixed_planes: bool,

    #[arg(long)]
    no_walls: bool,

    #[arg(long)]
    no_planes: bool,

    #[arg(long)]
    no_sprites: bool,
}

impl Args {
    fn flags(&self) -> RenderFlags {
        let mut flags = RenderFlags::default();
        flags.set(RenderFlags::WALLS, !self.no_walls);
        flags.set(RenderFlags::PLANES, !self.no_planes);
        flags.set(RenderFlags::SPRITES, !self.no_sprites);
        flags.set(RenderFlags::FIXED_POINT_PLANES, self.fixed_planes);
        flags
    }

    fn window_scale(&self) -> anyhow::Result<Scale> {
        Ok(match self.scale {
            1 => Scale::X1,
            2 => Scale::X2,
            4 => Scale::X4,
            8 => Scale::X8,
            s => bail!("unsupported window scale {s}; use 1, 2, 4 or 8"),
        })
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // ─────────── world ───────────
    let map = match &args.map {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading map {}", path.display()))?
            .parse::<Map>()
            .with_context(|| format!("parsing map {}", path.display()))?,
        None => BUILTIN_MAP.parse::<Map>().context("built-in map")?,
    };
    tracing::info!(width = map.width(), height = map.height(), "map loaded");

    let walls = match &args.atlas {
        Some(path) => slice_atlas(path, args.tile)?,
        None => procedural_walls(),
    };
    let floor = load_or(args.floor.as_deref(), || {
        Texture::checker(8, 0xFF_50_50_50, 0xFF_40_40_40)
    })?;
    let ceiling = load_or(args.ceiling.as_deref(), || {
        Texture::checker(8, 0xFF_30_30_48, 0xFF_28_28_38)
    })?;
    let sprite_tex = load_or(args.sprite.as_deref(), procedural_sprite)?;

    let mut sprites = place_sprites(&map, &sprite_tex);
    let mut camera = spawn_camera(&map, args.fov).context("map has no empty cell to start in")?;

    let mut renderer = Software::new(args.width, args.height, &walls)
        .with_planes(&floor, &ceiling)?
        .with_flags(args.flags());

    // ─────────── window ───────────
    let mut win = Window::new(
        "Grid Raycaster",
        args.width,
        args.height,
        WindowOptions {
            scale: args.window_scale()?,
            ..WindowOptions::default()
        },
    )?;
    win.set_target_fps(60);

    let mut minimap = false;
    let mut frame_ms = Average::new(180);
    let mut last_print = Instant::now();
    let mut last_frame = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let dt = last_frame.elapsed().as_secs_f32();
        last_frame = Instant::now();

        handle_input(&win, &mut camera, &map, renderer.flags_mut(), &mut minimap, dt);

        let t0 = Instant::now();
        renderer.render(&camera, &map, &mut sprites, args.light_distance);
        if minimap {
            draw_minimap(renderer.frame_mut(), &map, &camera);
        }
        frame_ms.push(t0.elapsed().as_secs_f64() * 1000.0);

        let mut shown = Ok(());
        renderer.end_frame(|fb, w, h| shown = win.update_with_buffer(fb, w, h));
        shown.context("presenting frame")?;

        if last_print.elapsed() >= REPORT_EVERY {
            let avg = frame_ms.average();
            tracing::info!(
                "avg render: {:.2} ms  ({:.1} FPS)",
                avg,
                if avg > 0.0 { 1000.0 / avg } else { 0.0 }
            );
            last_print = Instant::now();
        }
    }
    Ok(())
}

/// W/S walk, A/D turn, Q/E strafe, 1–4 pass toggles, M minimap.
fn handle_input(
    win: &Window,
    camera: &mut Camera,
    map: &Map,
    flags: &mut RenderFlags,
    minimap: &mut bool,
    dt: f32,
) {
    let step = MOVE_SPEED * dt;
    let turn = TURN_SPEED * dt;

    if win.is_key_down(Key::W) {
        camera.advance(map, step);
    }
    if win.is_key_down(Key::S) {
        camera.advance(map, -step);
    }
    if win.is_key_down(Key::A) {
        camera.rotate(-turn);
    }
    if win.is_key_down(Key::D) {
        camera.rotate(turn);
    }
    if win.is_key_down(Key::Q) {
        camera.strafe(map, -step);
    }
    if win.is_key_down(Key::E) {
        camera.strafe(map, step);
    }

    const TOGGLES: [(Key, RenderFlags); 4] = [
        (Key::Key1, RenderFlags::WALLS),
        (Key::Key2, RenderFlags::PLANES),
        (Key::Key3, RenderFlags::SPRITES),
        (Key::Key4, RenderFlags::FIXED_POINT_PLANES),
    ];
    for (key, flag) in TOGGLES {
        if win.is_key_pressed(key, KeyRepeat::No) {
            flags.toggle(flag);
            tracing::info!(?flags, "render passes");
        }
    }
    if win.is_key_pressed(Key::M, KeyRepeat::No) {
        *minimap = !*minimap;
    }
}

/// Top-left overlay: solid cells, camera position and view direction.
fn draw_minimap(frame: &mut Surface, map: &Map, camera: &Camera) {
    const WALL: Argb = 0xFF_C0_C0_C0;
    const FLOOR: Argb = 0xFF_20_20_20;
    const PLAYER: Argb = 0xFF_FF_40_40;

    let c = MINIMAP_CELL;
    for y in 0..map.height() as i32 {
        for x in 0..map.width() as i32 {
            let color = if map.get_cell(x, y) > EMPTY { WALL } else { FLOOR };
            frame.draw_rectangle(x * c, y * c, c, c, color);
        }
    }

    let to_px = |p: Vec2| ((p.x * c as f32) as i32, (p.y * c as f32) as i32);
    let (px, py) = to_px(camera.pos);
    let (fx, fy) = to_px(camera.pos + camera.forward() * 1.5);
    frame.draw_line(px, py, fx, fy, PLAYER);
    frame.draw_rectangle(px - 1, py - 1, 3, 3, PLAYER);
}

fn load_or(path: Option<&Path>, fallback: impl FnOnce() -> Texture) -> anyhow::Result<Texture> {
    match path {
        Some(p) => Texture::load(p).with_context(|| format!("loading texture {}", p.display())),
        None => Ok(fallback()),
    }
}

/// Cut a texture atlas into `tile`×`tile` wall textures, row-major.
fn slice_atlas(path: &Path, tile: usize) -> anyhow::Result<Vec<Texture>> {
    if tile == 0 {
        bail!("atlas tile size must be non-zero");
    }
    let atlas = Texture::load(path).with_context(|| format!("loading atlas {}", path.display()))?;
    let (cols, rows) = (atlas.width() / tile, atlas.height() / tile);
    if cols == 0 || rows == 0 {
        bail!(
            "atlas {} is {}x{}, smaller than one {tile}px tile",
            path.display(),
            atlas.width(),
            atlas.height()
        );
    }

    let tiles = (0..rows)
        .flat_map(|ty| (0..cols).map(move |tx| (tx, ty)))
        .map(|(tx, ty)| atlas.region((tx * tile) as i32, (ty * tile) as i32, tile, tile))
        .collect::<Vec<_>>();
    tracing::info!(tiles = tiles.len(), tile, "wall atlas sliced");
    Ok(tiles)
}

fn procedural_walls() -> Vec<Texture> {
    [
        (0xFF_A0_40_30, 0xFF_80_30_20),
        (0xFF_30_70_A0, 0xFF_20_50_80),
        (0xFF_60_A0_40, 0xFF_40_80_30),
    ]
    .into_iter()
    .map(|(a, b)| Texture::checker(8, a, b))
    .collect()
}

/// Diamond on a transparent background.
fn procedural_sprite() -> Texture {
    const SIDE: f32 = 32.0;
    let mut tex = Surface::new(SIDE as usize, SIDE as usize);
    tex.clear(TRANSPARENT);

    let diamond = |inset: f32| {
        let (lo, hi, mid) = (inset, SIDE - 1.0 - inset, (SIDE - 1.0) * 0.5);
        [
            [Vec2::new(mid, lo), Vec2::new(hi, mid), Vec2::new(mid, hi)],
            [Vec2::new(mid, lo), Vec2::new(mid, hi), Vec2::new(lo, mid)],
        ]
    };
    for tri in diamond(0.0) {
        tex.fill_triangle(tri, 0xFF_E0_B0_20, 4);
    }
    for tri in diamond(8.0) {
        tex.fill_triangle(tri, 0xFF_FF_F0_80, 4);
    }
    tex
}

/// A handful of sprites spread over the empty cells.
fn place_sprites<'t>(map: &Map, texture: &'t Texture) -> Vec<Sprite<'t>> {
    (0..map.height() as i32)
        .flat_map(|y| (0..map.width() as i32).map(move |x| (x, y)))
        .filter(|&(x, y)| map.get_cell(x, y) == EMPTY && (x * 7 + y * 3) % 11 == 0)
        .take(8)
        .map(|(x, y)| Sprite::new(x as f32 + 0.5, y as f32 + 0.5, 0.6, texture))
        .collect()
}

/// Centre of the first empty cell, facing east.
fn spawn_camera(map: &Map, fov: f32) -> Option<Camera> {
    let i = map.cells().iter().position(|&c| c == EMPTY)?;
    let (x, y) = (i % map.width(), i / map.width());
    Some(Camera::new(x as f32 + 0.5, y as f32 + 0.5, 0.0, fov))
}
