/// The board state machine.
///
/// ```text
///   EmptyBoard ──spawn ok──▶ PieceActive ──gravity blocked──▶ EmptyBoard
///        │                      │   ▲
///        │                      └───┘ gravity ok / lateral move
///        └──spawn blocked──▶ Halted (terminal)
/// ```
///
/// Every mutation follows the same erase → test → write sequence against
/// the `Grid`: lift the active piece off the board, ask `can_place` about
/// the target, then write it back either at the target or where it was.
/// The caller owns the board exclusively, so a gravity step and a lateral
/// move can never observe each other half done.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::cell::Cell;
use crate::domain::grid::{CellChange, Grid};
use crate::domain::shape::Shape;
use super::event::BoardEvent;

/// Spawn row of the pivot. Row 0 stays reachable for offsets with `dy = -1`.
pub const SPAWN_ROW: i32 = 1;

/// Smallest board on which every shape fits at the spawn point.
pub const MIN_SIDE: usize = 4;

/// Largest accepted side; keeps cell indices and pivots well inside `i32`.
pub const MAX_SIDE: usize = 256;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ActivePiece {
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
}

impl ActivePiece {
    /// Absolute `(x, y)` of the four cells.
    #[cfg(test)]
    pub fn cells(&self) -> [(i32, i32); 4] {
        self.shape.offsets().map(|(dx, dy)| (self.x + dx, self.y + dy))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BoardState {
    EmptyBoard,
    PieceActive(ActivePiece),
    Halted,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MoveDir {
    Left,
    Right,
}

impl MoveDir {
    pub fn dx(self) -> i32 {
        match self {
            MoveDir::Left => -1,
            MoveDir::Right => 1,
        }
    }
}

pub struct Board {
    grid: Grid,
    state: BoardState,
    rng: StdRng,
    ticks: u64,
    spawned: u64,
}

impl Board {
    pub fn new(width: usize, height: usize, rng: StdRng) -> Self {
        debug_assert!((MIN_SIDE..=MAX_SIDE).contains(&width));
        debug_assert!((MIN_SIDE..=MAX_SIDE).contains(&height));
        Board {
            grid: Grid::new(width, height),
            state: BoardState::EmptyBoard,
            rng,
            ticks: 0,
            spawned: 0,
        }
    }

    pub fn with_seed(width: usize, height: usize, seed: u64) -> Self {
        Board::new(width, height, StdRng::seed_from_u64(seed))
    }

    // ── Queries ──

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> BoardState {
        self.state
    }

    pub fn active(&self) -> Option<ActivePiece> {
        match self.state {
            BoardState::PieceActive(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_piece_active(&self) -> bool {
        self.active().is_some()
    }

    pub fn is_halted(&self) -> bool {
        self.state == BoardState::Halted
    }

    /// Scheduler steps applied so far (halted steps excluded).
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Pieces that made it onto the board.
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    pub fn spawn_point(&self) -> (i32, i32) {
        ((self.grid.width() / 2) as i32, SPAWN_ROW)
    }

    /// Net cell changes since the last call, for incremental repaint.
    pub fn take_changes(&mut self) -> Vec<CellChange> {
        self.grid.take_changes()
    }

    /// All occupied cells, for repainting a cleared surface.
    pub fn repaint_all(&mut self) -> Vec<CellChange> {
        self.grid.repaint_all()
    }

    // ── Transitions ──

    /// One scheduler tick: spawn when the board is empty, otherwise gravity.
    pub fn step(&mut self) -> Vec<BoardEvent> {
        match self.state {
            BoardState::Halted => vec![],
            BoardState::EmptyBoard => {
                self.ticks += 1;
                let shape = Shape::random(&mut self.rng);
                self.spawn_shape(shape)
            }
            BoardState::PieceActive(piece) => {
                self.ticks += 1;
                self.gravity(piece)
            }
        }
    }

    /// Spawn `shape` at the spawn point. Only valid on an empty board;
    /// a blocked spawn halts the board for good.
    pub fn spawn_shape(&mut self, shape: Shape) -> Vec<BoardEvent> {
        if self.state != BoardState::EmptyBoard || shape == Shape::None {
            return vec![];
        }
        let (x, y) = self.spawn_point();
        let offsets = shape.offsets();
        if !self.grid.can_place(&offsets, x, y) {
            self.state = BoardState::Halted;
            return vec![BoardEvent::ToppedOut { shape }];
        }
        self.grid.occupy(&offsets, x, y, Cell::of(shape));
        self.state = BoardState::PieceActive(ActivePiece { shape, x, y });
        self.spawned += 1;
        vec![BoardEvent::Spawned { shape, x, y }]
    }

    fn gravity(&mut self, piece: ActivePiece) -> Vec<BoardEvent> {
        match self.relocate(piece, 0, 1) {
            Some(moved) => {
                self.state = BoardState::PieceActive(moved);
                vec![BoardEvent::Descended { y: moved.y }]
            }
            None => {
                self.state = BoardState::EmptyBoard;
                vec![BoardEvent::Locked { shape: piece.shape, x: piece.x, y: piece.y }]
            }
        }
    }

    /// Shift the active piece one column. A blocked move leaves the board
    /// exactly as it was.
    pub fn move_piece(&mut self, dir: MoveDir) -> Vec<BoardEvent> {
        let piece = match self.state {
            BoardState::PieceActive(p) => p,
            _ => return vec![],
        };
        let dx = dir.dx();
        match self.relocate(piece, dx, 0) {
            Some(moved) => {
                self.state = BoardState::PieceActive(moved);
                vec![BoardEvent::Moved { dx, x: moved.x }]
            }
            None => vec![BoardEvent::MoveRejected { dx }],
        }
    }

    /// Erase, test the target, write back. Returns the piece at its new
    /// position, or `None` if it had to stay put.
    fn relocate(&mut self, piece: ActivePiece, dx: i32, dy: i32) -> Option<ActivePiece> {
        let offsets = piece.shape.offsets();
        let value = Cell::of(piece.shape);
        self.grid.occupy(&offsets, piece.x, piece.y, Cell::EMPTY);
        let (nx, ny) = (piece.x + dx, piece.y + dy);
        if self.grid.can_place(&offsets, nx, ny) {
            self.grid.occupy(&offsets, nx, ny, value);
            Some(ActivePiece { x: nx, y: ny, ..piece })
        } else {
            debug_assert!(
                self.grid.can_place(&offsets, piece.x, piece.y),
                "piece lost its own cells at ({}, {})",
                piece.x,
                piece.y
            );
            self.grid.occupy(&offsets, piece.x, piece.y, value);
            None
        }
    }
}
