//! Dense grid map plus the DDA ray query used by the wall pass.
//!
//! Cell code `0` is open space; any other code `n > 0` selects wall texture
//! `n - 1`.  Everything outside `0..width × 0..height` reads as `0`, so the
//! map behaves like an open world past its edges.

use std::str::FromStr;

use glam::Vec2;
use thiserror::Error;

/// Code stored in a cell; `0` is empty.
pub type CellCode = i32;

/// The "nothing here" sentinel.
pub const EMPTY: CellCode = 0;

/// Things that can go wrong when building a map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    /// Cell slice does not hold exactly `width * height` codes.
    #[error("map is {width}x{height} but {got} cells were supplied")]
    SizeMismatch {
        width: usize,
        height: usize,
        got: usize,
    },

    /// Text map contained no rows.
    #[error("map text has no rows")]
    Empty,

    /// A text row had a different number of cells than the first one.
    #[error("row {row} has {got} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// A token in a text map was not an integer.
    #[error("row {row}: `{token}` is not a cell code")]
    BadCell { row: usize, token: String },
}

/// Result of a successful [`Map::raycast`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Non-zero code of the cell that stopped the ray.
    pub cell: CellCode,
    /// World-space intersection (`origin + dir * distance`).
    pub point: Vec2,
    /// Length travelled along the ray, in units of `dir`.
    pub distance: f32,
}

/// Row-major grid of cell codes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Map {
    width: usize,
    height: usize,
    cells: Vec<CellCode>,
}

impl Map {
    /// Copy `cells` (row-major, stride = `width`) into a new map.
    pub fn new(width: usize, height: usize, cells: &[CellCode]) -> Result<Self, MapError> {
        if cells.len() != width * height {
            return Err(MapError::SizeMismatch {
                width,
                height,
                got: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells: cells.to_vec(),
        })
    }

    /// All-empty map.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![EMPTY; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn cells(&self) -> &[CellCode] {
        &self.cells
    }

    /// Length of the map diagonal; no ray inside the map travels farther
    /// before leaving it.
    pub fn diagonal(&self) -> f32 {
        Vec2::new(self.width as f32, self.height as f32).length()
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Code at `(x, y)`, or [`EMPTY`] outside the grid.
    #[inline]
    pub fn get_cell(&self, x: i32, y: i32) -> CellCode {
        self.index(x, y).map_or(EMPTY, |i| self.cells[i])
    }

    /// Overwrite one cell; ignored outside the grid.
    pub fn set_cell(&mut self, x: i32, y: i32, code: CellCode) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = code;
        }
    }

    /// Code of the cell containing world point `p`.
    #[inline]
    pub fn cell_at(&self, p: Vec2) -> CellCode {
        self.get_cell(p.x.floor() as i32, p.y.floor() as i32)
    }

    /// Walk the grid from `origin` along `dir` one cell boundary at a time.
    ///
    /// `dir` is expected to be unit length; `distance` is measured in units
    /// of `dir`.  Returns `None` when no non-empty cell is met before
    /// `max_distance`, which is clamped to the distance at which the ray
    /// has left the grid for good.
    ///
    /// A zero direction component means the ray never crosses a boundary on
    /// that axis, so its per-cell step is infinite rather than a division by
    /// zero.
    pub fn raycast(&self, origin: Vec2, dir: Vec2, max_distance: f32) -> Option<RayHit> {
        if dir == Vec2::ZERO {
            return None;
        }
        // past this the ray is outside the grid and moving away from it
        let centre = Vec2::new(self.width as f32, self.height as f32) * 0.5;
        let max_distance = max_distance.min(origin.distance(centre) + self.diagonal());

        let step_len = Vec2::new(axis_step(dir.x, dir.y), axis_step(dir.y, dir.x));

        let mut map_x = origin.x.floor() as i32;
        let mut map_y = origin.y.floor() as i32;

        let (step_x, mut len_x) = first_crossing(origin.x, map_x, dir.x, step_len.x);
        let (step_y, mut len_y) = first_crossing(origin.y, map_y, dir.y, step_len.y);

        loop {
            let distance;
            if len_x < len_y {
                map_x += step_x;
                distance = len_x;
                len_x += step_len.x;
            } else {
                map_y += step_y;
                distance = len_y;
                len_y += step_len.y;
            }

            if distance > max_distance {
                return None;
            }

            let cell = self.get_cell(map_x, map_y);
            if cell != EMPTY {
                return Some(RayHit {
                    cell,
                    point: origin + dir * distance,
                    distance,
                });
            }
        }
    }
}

/// Ray length needed to cross one whole cell along the axis whose direction
/// component is `along`.
#[inline]
fn axis_step(along: f32, across: f32) -> f32 {
    if along == 0.0 {
        return f32::INFINITY;
    }
    let r = across / along;
    (1.0 + r * r).sqrt()
}

/// Integer step and ray length to the first boundary on one axis.
#[inline]
fn first_crossing(origin: f32, cell: i32, dir: f32, step_len: f32) -> (i32, f32) {
    if step_len.is_infinite() {
        return (if dir < 0.0 { -1 } else { 1 }, f32::INFINITY);
    }
    if dir < 0.0 {
        (-1, (origin - cell as f32) * step_len)
    } else {
        (1, (cell as f32 + 1.0 - origin) * step_len)
    }
}

impl FromStr for Map {
    type Err = MapError;

    /// One map row per line, cells separated by whitespace.  Blank lines and
    /// lines starting with `#` are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut width = 0;
        let mut rows = 0;
        let mut cells = Vec::new();

        for line in s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
        {
            let before = cells.len();
            for token in line.split_whitespace() {
                let code = token.parse::<CellCode>().map_err(|_| MapError::BadCell {
                    row: rows,
                    token: token.to_owned(),
                })?;
                cells.push(code);
            }
            let got = cells.len() - before;
            if rows == 0 {
                width = got;
            } else if got != width {
                return Err(MapError::Ragged {
                    row: rows,
                    expected: width,
                    got,
                });
            }
            rows += 1;
        }

        if rows == 0 {
            return Err(MapError::Empty);
        }
        Map::new(width, rows, &cells)
    }
}

/*────────────────────────────── Tests ──────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// 5×5, solid border, empty interior.
    fn walled_room() -> Map {
        #[rustfmt::skip]
        let cells = [
            1, 1, 1, 1, 1,
            1, 0, 0, 0, 1,
            1, 0, 0, 0, 1,
            1, 0, 0, 0, 1,
            1, 1, 1, 1, 1,
        ];
        Map::new(5, 5, &cells).unwrap()
    }

    #[test]
    fn rejects_wrong_cell_count() {
        assert_eq!(
            Map::new(3, 3, &[0; 8]).unwrap_err(),
            MapError::SizeMismatch {
                width: 3,
                height: 3,
                got: 8
            }
        );
    }

    #[test]
    fn set_cell_ignores_out_of_range() {
        let mut map = Map::empty(2, 2);
        map.set_cell(1, 1, 7);
        map.set_cell(2, 0, 7);
        map.set_cell(-1, 0, 7);
        assert_eq!(map.cells(), &[0, 0, 0, 7]);
    }

    #[test]
    fn straight_ray_hits_east_border() {
        let map = walled_room();
        let hit = map
            .raycast(Vec2::new(2.5, 2.5), Vec2::X, 100.0)
            .expect("ray must hit the border");
        assert_eq!(hit.cell, 1);
        // east wall occupies x ∈ [4, 5)
        assert!((hit.distance - 1.5).abs() < 1e-6);
        assert!((hit.point.x - 4.0).abs() < 1e-6);
        assert!((hit.point.y - 2.5).abs() < 1e-6);
    }

    #[test]
    fn negative_axis_ray_hits_west_border() {
        let map = walled_room();
        let hit = map.raycast(Vec2::new(2.5, 2.5), -Vec2::X, 100.0).unwrap();
        assert!((hit.distance - 1.5).abs() < 1e-6);
        assert!((hit.point.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn diagonal_ray_reports_true_intersection() {
        let map = walled_room();
        let dir = Vec2::new(1.0, 1.0).normalize();
        let hit = map.raycast(Vec2::new(1.5, 1.5), dir, 100.0).unwrap();
        assert_eq!(hit.cell, 1);
        let expected = Vec2::new(1.5, 1.5) + dir * hit.distance;
        assert!((hit.point - expected).length() < 1e-5);
        assert!(hit.point.x >= 3.999 || hit.point.y >= 3.999);
    }

    #[test]
    fn max_distance_cuts_the_ray_short() {
        let map = walled_room();
        assert!(map.raycast(Vec2::new(2.5, 2.5), Vec2::X, 1.0).is_none());
    }

    #[test]
    fn unbounded_ray_out_of_the_map_terminates() {
        let map = Map::empty(4, 4);
        assert!(
            map.raycast(Vec2::new(2.0, 2.0), Vec2::Y, f32::INFINITY)
                .is_none()
        );
        assert!(map.raycast(Vec2::new(2.0, 2.0), Vec2::ZERO, 10.0).is_none());
    }

    #[test]
    fn huge_finite_max_distance_terminates() {
        let map = Map::empty(4, 4);
        assert!(map.raycast(Vec2::new(2.0, 2.0), Vec2::X, 1.0e9).is_none());
        assert!(map.raycast(Vec2::new(-50.0, 2.0), -Vec2::X, f32::MAX).is_none());

        // still finds the wall it is pointed at
        let hit = walled_room().raycast(Vec2::new(2.5, 2.5), Vec2::Y, 1.0e9).unwrap();
        assert!((hit.distance - 1.5).abs() < 1e-6);
    }

    #[test]
    fn parses_text_maps() {
        let map: Map = "# tiny\n1 1 1\n1 0 2\n\n1 1 1\n".parse().unwrap();
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 3);
        assert_eq!(map.get_cell(2, 1), 2);
        assert_eq!(map.get_cell(1, 1), 0);
    }

    #[test]
    fn text_map_errors() {
        assert_eq!("".parse::<Map>().unwrap_err(), MapError::Empty);
        assert_eq!(
            "1 1\n1".parse::<Map>().unwrap_err(),
            MapError::Ragged {
                row: 1,
                expected: 2,
                got: 1
            }
        );
        assert!(matches!(
            "1 x".parse::<Map>().unwrap_err(),
            MapError::BadCell { row: 0, .. }
        ));
    }

    proptest! {
        #[test]
        fn outside_cells_read_empty(x in -1000i32..1000, y in -1000i32..1000) {
            let mut map = Map::empty(6, 4);
            for cy in 0..4 {
                for cx in 0..6 {
                    map.set_cell(cx, cy, 9);
                }
            }
            let inside = (0..6).contains(&x) && (0..4).contains(&y);
            prop_assert_eq!(map.get_cell(x, y), if inside { 9 } else { 0 });
        }

        #[test]
        fn empty_map_never_hits(
            ox in -3.0f32..9.0,
            oy in -3.0f32..9.0,
            angle in 0.0f32..std::f32::consts::TAU,
        ) {
            let map = Map::empty(6, 6);
            let dir = Vec2::from_angle(angle);
            prop_assert!(map.raycast(Vec2::new(ox, oy), dir, 50.0).is_none());
        }

        #[test]
        fn walls_out_of_reach_are_missed(
            ox in 6.0f32..10.0,
            oy in 6.0f32..10.0,
            angle in 0.0f32..std::f32::consts::TAU,
            max_distance in 0.25f32..4.0,
        ) {
            let origin = Vec2::new(ox, oy);
            let mut map = Map::empty(16, 16);
            // every point of a cell lies within √2/2 of its centre
            for y in 0..16 {
                for x in 0..16 {
                    let centre = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    if centre.distance(origin) > max_distance + 1.0 {
                        map.set_cell(x, y, 1);
                    }
                }
            }
            let dir = Vec2::from_angle(angle);
            prop_assert!(map.raycast(origin, dir, max_distance).is_none());
            // one cell further out and the ring is always reached
            prop_assert!(map.raycast(origin, dir, max_distance + 3.0).is_some());
        }
    }
}
