/// The occupancy grid.
///
/// `height` rows × `width` columns of `Cell`, stored row-major.
/// Coordinates are `(x, y)` = `(column, row)` as signed integers so that
/// pivot + offset arithmetic can go negative before the bounds check.
///
/// ## Collision
///
/// `can_place` is the only collision primitive. A placement is legal iff
/// all four absolute cells are inside `[0, width) × [0, height)` and empty.
/// `occupy` trusts its caller: it writes whatever it is told.
///
/// ## Dirty tracking
///
/// Every write remembers the value the cell had before it was first touched
/// since the last `take_changes()`. Draining compares that against the
/// current value, so an erase followed by a rewrite of the same cell
/// reports nothing.

use std::collections::BTreeMap;

use super::cell::Cell;
use super::shape::Offsets;

/// One cell whose value differs from the last drain.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CellChange {
    pub row: usize,
    pub col: usize,
    pub old: Cell,
    pub new: Cell,
}

#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    /// `(row, col)` → value before first write since last drain.
    dirty: BTreeMap<(usize, usize), Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            cells: vec![Cell::EMPTY; width * height],
            dirty: BTreeMap::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Cell at `(x, y)`, or `None` outside the grid.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Would a piece with `offsets` fit with its pivot at `(x, y)`?
    pub fn can_place(&self, offsets: &Offsets, x: i32, y: i32) -> bool {
        offsets.iter().all(|&(dx, dy)| {
            matches!(self.get(x + dx, y + dy), Some(c) if c.is_empty())
        })
    }

    /// Write `value` into the four cells of a piece with its pivot at `(x, y)`.
    /// Pass `Cell::EMPTY` to erase.
    pub fn occupy(&mut self, offsets: &Offsets, x: i32, y: i32, value: Cell) {
        for &(dx, dy) in offsets {
            let (cx, cy) = (x + dx, y + dy);
            debug_assert!(self.index(cx, cy).is_some(), "occupy out of bounds at ({cx}, {cy})");
            if let Some(i) = self.index(cx, cy) {
                let key = (cy as usize, cx as usize);
                let prev = self.cells[i];
                self.dirty.entry(key).or_insert(prev);
                self.cells[i] = value;
            }
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Rows top to bottom.
    #[cfg(test)]
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1))
    }

    /// Drain net changes since the previous drain, in row-major order.
    pub fn take_changes(&mut self) -> Vec<CellChange> {
        let dirty = std::mem::take(&mut self.dirty);
        dirty
            .into_iter()
            .filter_map(|((row, col), old)| {
                let new = self.cells[row * self.width + col];
                (new != old).then_some(CellChange { row, col, old, new })
            })
            .collect()
    }

    /// Every occupied cell as a change from empty, for painting onto a
    /// freshly cleared surface. Pending dirty entries are discarded.
    pub fn repaint_all(&mut self) -> Vec<CellChange> {
        self.dirty.clear();
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_empty())
            .map(|(i, &new)| CellChange {
                row: i / self.width,
                col: i % self.width,
                old: Cell::EMPTY,
                new,
            })
            .collect()
    }
}
