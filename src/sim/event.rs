/// Events emitted by a board step or move.
/// The game loop consumes these for logging and the status line.

use crate::domain::shape::Shape;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BoardEvent {
    Spawned { shape: Shape, x: i32, y: i32 },
    Descended { y: i32 },
    Locked { shape: Shape, x: i32, y: i32 },
    Moved { dx: i32, x: i32 },
    MoveRejected { dx: i32 },
    ToppedOut { shape: Shape },
}
