/// Pure game data: cell values, the shape catalog, colors, and the grid.
/// Nothing in here knows about time, input, or the terminal.

pub mod cell;
pub mod color;
pub mod grid;
pub mod shape;
