// Simulation entities: players, bullets and the ids that name them.

/// Identifier of a live player. Assigned once, never reused.
pub type PlayerId = u64;

/// Identifier of a live bullet. Assigned once, never reused.
pub type BulletId = u64;

/// Facing direction shared by players and bullets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Numeric value used on the wire (`1=left, 2=right, 3=up, 4=down`).
    pub fn wire_value(self) -> u8 {
        match self {
            Direction::Left => 1,
            Direction::Right => 2,
            Direction::Up => 3,
            Direction::Down => 4,
        }
    }

    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            1 => Some(Direction::Left),
            2 => Some(Direction::Right),
            3 => Some(Direction::Up),
            4 => Some(Direction::Down),
            _ => None,
        }
    }

    /// Cell reached by taking one step from `(x, y)`.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant; the
    /// upper bounds are the grid's business.
    pub fn step(self, x: usize, y: usize) -> Option<(usize, usize)> {
        match self {
            Direction::Left => x.checked_sub(1).map(|x| (x, y)),
            Direction::Right => Some((x + 1, y)),
            Direction::Up => y.checked_sub(1).map(|y| (x, y)),
            Direction::Down => Some((x, y + 1)),
        }
    }
}

/// Client intent applied by the command handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Shoot,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub x: usize,
    pub y: usize,
    pub direction: Direction,

    // Cooldown timestamps in milliseconds; `None` until the first action.
    pub last_move_at: Option<u64>,
    pub last_shot_at: Option<u64>,
}

impl Player {
    pub fn new(id: PlayerId, x: usize, y: usize) -> Self {
        Self {
            id,
            x,
            y,
            direction: Direction::Left,
            last_move_at: None,
            last_shot_at: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: BulletId,
    pub owner_id: PlayerId,
    pub x: usize,
    pub y: usize,
    pub direction: Direction,
    pub created_at: u64,
    pub last_move_at: Option<u64>,
}

/// Monotonic id source owned by the engine.
///
/// Replaces process-wide counters so tests can start from a known value.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }

    /// Id the next call to `next_id` will hand out.
    pub fn peek(&self) -> u64 {
        self.next
    }
}
