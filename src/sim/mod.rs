/// Time-driven state: the board state machine, its events, and the
/// gravity scheduler.

pub mod board;
pub mod event;
pub mod scheduler;
