/// Grid cell values.
/// A cell is either empty or holds the id of the shape occupying it.
/// Ids persist after a piece locks, so the grid doubles as the color map.

use super::shape::Shape;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Cell(u8);

impl Cell {
    pub const EMPTY: Cell = Cell(0);

    /// Cell occupied by `shape`. `Shape::None` yields `EMPTY`.
    pub fn of(shape: Shape) -> Self {
        Cell(shape.id())
    }

    /// Arbitrary raw value, including ids no shape uses.
    #[cfg(test)]
    pub fn raw(id: u8) -> Self {
        Cell(id)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn id(self) -> u8 {
        self.0
    }

    /// The shape this cell belongs to (`Shape::None` when empty).
    pub fn shape(self) -> Shape {
        Shape::from_id(self.0).unwrap_or(Shape::None)
    }
}
