// Dense 2D field of cells. Cells only hold lookup ids; the engine's entity
// maps own the players and bullets.

use super::entities::{BulletId, PlayerId};
use super::errors::ConfigError;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terrain {
    Empty,
    Wall,
}

impl Terrain {
    /// Numeric value used on the wire (`0=empty, 1=wall`).
    pub fn wire_value(self) -> u8 {
        match self {
            Terrain::Empty => 0,
            Terrain::Wall => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub terrain: Terrain,
    pub player: Option<PlayerId>,
    pub bullet: Option<BulletId>,
}

impl Cell {
    fn with_terrain(terrain: Terrain) -> Self {
        Self {
            terrain,
            player: None,
            bullet: None,
        }
    }

    pub fn has_entity(&self) -> bool {
        self.player.is_some() || self.bullet.is_some()
    }

    /// Empty terrain and nobody standing on it.
    pub fn is_free(&self) -> bool {
        self.terrain == Terrain::Empty && !self.has_entity()
    }

    fn reset(&mut self) {
        *self = Cell::with_terrain(Terrain::Empty);
    }
}

#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    // Row-major: index = y * width + x.
    cells: Vec<Cell>,
}

impl Grid {
    /// Fills every cell independently: wall with `wall_probability`, empty otherwise.
    pub fn initialize<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        wall_probability: f64,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        check_dimensions(width, height)?;
        if !(0.0..=1.0).contains(&wall_probability) {
            return Err(ConfigError::WallProbability(wall_probability));
        }

        let cells = (0..width * height)
            .map(|_| {
                if rng.gen_bool(wall_probability) {
                    Cell::with_terrain(Terrain::Wall)
                } else {
                    Cell::with_terrain(Terrain::Empty)
                }
            })
            .collect();

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Grid without a single wall.
    pub fn empty(width: usize, height: usize) -> Result<Self, ConfigError> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![Cell::with_terrain(Terrain::Empty); width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            self.cells.get(y * self.width + x)
        } else {
            None
        }
    }

    pub fn cell_mut(&mut self, x: usize, y: usize) -> Option<&mut Cell> {
        if self.in_bounds(x, y) {
            self.cells.get_mut(y * self.width + x)
        } else {
            None
        }
    }

    /// In bounds, empty terrain and unoccupied.
    pub fn is_passable(&self, x: usize, y: usize) -> bool {
        self.cell(x, y).is_some_and(Cell::is_free)
    }

    /// Resets a cell to empty terrain with no occupants. Walls never come back.
    pub fn clear(&mut self, x: usize, y: usize) {
        if let Some(cell) = self.cell_mut(x, y) {
            cell.reset();
        }
    }

    pub fn set_terrain(&mut self, x: usize, y: usize, terrain: Terrain) {
        if let Some(cell) = self.cell_mut(x, y) {
            cell.terrain = terrain;
        }
    }

    pub(crate) fn set_player(&mut self, x: usize, y: usize, player: Option<PlayerId>) {
        if let Some(cell) = self.cell_mut(x, y) {
            cell.player = player;
        }
    }

    pub(crate) fn set_bullet(&mut self, x: usize, y: usize, bullet: Option<BulletId>) {
        if let Some(cell) = self.cell_mut(x, y) {
            cell.bullet = bullet;
        }
    }

    /// Cells in row-major order together with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Cell)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (i % width, i / width, cell))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<(), ConfigError> {
    if width == 0 || height == 0 {
        return Err(ConfigError::ZeroDimension { width, height });
    }
    Ok(())
}
