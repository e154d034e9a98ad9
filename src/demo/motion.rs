/// Distance covered per frame while a move is in progress.
pub const MOVE_STEP: f32 = 0.02;
/// Frames a single directional command lasts.
pub const MOVE_FRAMES: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Per-frame delta in clip-space units.
    #[inline(always)]
    pub const fn delta(self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, MOVE_STEP),
            Direction::Down => (0.0, -MOVE_STEP),
            Direction::Left => (-MOVE_STEP, 0.0),
            Direction::Right => (MOVE_STEP, 0.0),
        }
    }
}

/// Discrete movement: a command starts a fixed-length move, and nothing else
/// is accepted until it finishes. No queueing, no cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Motion {
    #[default]
    Idle,
    Moving { dx: f32, dy: f32, remaining: u32 },
}

impl Motion {
    /// Starts a move if idle. Returns false when the command was dropped.
    pub fn start(&mut self, direction: Direction) -> bool {
        match self {
            Motion::Idle => {
                let (dx, dy) = direction.delta();
                *self = Motion::Moving { dx, dy, remaining: MOVE_FRAMES };
                true
            }
            Motion::Moving { .. } => false,
        }
    }

    /// Advances one frame and returns the delta to apply, if any.
    pub fn step(&mut self) -> Option<(f32, f32)> {
        match *self {
            Motion::Idle => None,
            Motion::Moving { dx, dy, remaining } => {
                let remaining = remaining.saturating_sub(1);
                *self = if remaining == 0 {
                    Motion::Idle
                } else {
                    Motion::Moving { dx, dy, remaining }
                };
                Some((dx, dy))
            }
        }
    }
}
