/// Paint contract between the board and any drawing surface.
///
/// A `CellChange` becomes at most two `PaintOp`s:
///   1. `Erase(tag)` if the cell held a piece before and its value changed
///   2. `Draw(paint)` if the cell holds a piece now
///
/// `CellPaint` carries the full bevelled-square geometry in surface pixels
/// (`PIECE` per cell, origin at `(X0, Y0)`): a filled square with a dark
/// outline plus two light highlight lines, both two pixels wide, along
/// the top and left edges.
/// Every drawing is tagged by its cell so it can be erased later without
/// touching neighbours. Surfaces that cannot draw lines (the terminal)
/// approximate the bevel from the same colors.

use std::fmt;
use std::io;

use tracing::warn;

use crate::domain::color::{Palette, Rgb};
use crate::domain::grid::CellChange;

/// Cell edge length in surface pixels.
pub const PIECE: i32 = 20;
pub const X0: i32 = 2;
pub const Y0: i32 = 2;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CellTag {
    pub row: usize,
    pub col: usize,
}

impl fmt::Display for CellTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "piece_{}_{}", self.row, self.col)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Line {
    pub from: (i32, i32),
    pub to: (i32, i32),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CellPaint {
    pub tag: CellTag,
    /// Top-left corner of the square.
    pub x: i32,
    pub y: i32,
    pub side: i32,
    pub fill: Rgb,
    pub outline: Rgb,
    pub highlight: Rgb,
    /// Top edge, then left edge.
    pub highlights: [Line; 2],
}

impl CellPaint {
    pub fn new(tag: CellTag, fill: Rgb, outline: Rgb, highlight: Rgb) -> Self {
        let xs = X0 + tag.col as i32 * PIECE;
        let ys = Y0 + tag.row as i32 * PIECE;
        let side = PIECE - 1;
        let (xe, ye) = (xs + side, ys + side);
        CellPaint {
            tag,
            x: xs,
            y: ys,
            side,
            fill,
            outline,
            highlight,
            highlights: [
                Line { from: (xs, ys + 1), to: (xe - 1, ys + 1) },
                Line { from: (xs + 1, ys), to: (xs + 1, ye + 1) },
            ],
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PaintOp {
    Erase(CellTag),
    Draw(CellPaint),
}

/// Translate one cell change into paint operations.
pub fn paint_ops(change: &CellChange, palette: &Palette) -> Vec<PaintOp> {
    let tag = CellTag { row: change.row, col: change.col };
    let mut ops = Vec::with_capacity(2);
    if change.new != change.old && !change.old.is_empty() {
        ops.push(PaintOp::Erase(tag));
    }
    if !change.new.is_empty() {
        let s = palette.swatch(change.new);
        ops.push(PaintOp::Draw(CellPaint::new(tag, s.base, s.dark, s.light)));
    }
    ops
}

/// A surface that can draw and erase tagged cells.
pub trait Canvas {
    fn erase(&mut self, tag: CellTag) -> io::Result<()>;
    fn draw(&mut self, paint: &CellPaint) -> io::Result<()>;
}

/// Apply `changes` to `canvas`. A failed operation is logged and skipped;
/// returns how many failed.
pub fn paint_changes<C: Canvas + ?Sized>(
    canvas: &mut C,
    palette: &Palette,
    changes: &[CellChange],
) -> usize {
    let mut failed = 0;
    for change in changes {
        for op in paint_ops(change, palette) {
            let result = match op {
                PaintOp::Erase(tag) => canvas.erase(tag),
                PaintOp::Draw(ref paint) => canvas.draw(paint),
            };
            if let Err(e) = result {
                warn!(error = %e, ?op, "paint failed");
                failed += 1;
            }
        }
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cell::Cell;
    use crate::domain::shape::Shape;

    fn change(row: usize, col: usize, old: Cell, new: Cell) -> CellChange {
        CellChange { row, col, old, new }
    }

    #[test]
    fn tag_name_matches_cell() {
        assert_eq!(CellTag { row: 3, col: 7 }.to_string(), "piece_3_7");
    }

    #[test]
    fn geometry_for_cell() {
        let p = CellPaint::new(CellTag { row: 1, col: 5 }, Rgb::BLACK, Rgb::BLACK, Rgb::BLACK);
        assert_eq!((p.x, p.y, p.side), (102, 22, 19));
        assert_eq!(p.highlights[0], Line { from: (102, 23), to: (120, 23) });
        assert_eq!(p.highlights[1], Line { from: (103, 22), to: (103, 42) });
    }

    #[test]
    fn fill_erase_and_replace() {
        let palette = Palette::new(&[]);
        let o = Cell::of(Shape::O);
        let i = Cell::of(Shape::I);

        let ops = paint_ops(&change(0, 0, Cell::EMPTY, o), &palette);
        assert!(matches!(ops[..], [PaintOp::Draw(_)]));

        let ops = paint_ops(&change(0, 0, o, Cell::EMPTY), &palette);
        assert_eq!(ops, vec![PaintOp::Erase(CellTag { row: 0, col: 0 })]);

        let ops = paint_ops(&change(0, 0, o, i), &palette);
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], PaintOp::Erase(_)));
        match ops[1] {
            PaintOp::Draw(p) => {
                let s = palette.swatch(i);
                assert_eq!((p.fill, p.outline, p.highlight), (s.base, s.dark, s.light));
            }
            other => panic!("expected draw, got {other:?}"),
        }
    }

    struct FlakyCanvas {
        drawn: Vec<CellTag>,
        erased: Vec<CellTag>,
    }

    impl Canvas for FlakyCanvas {
        fn erase(&mut self, tag: CellTag) -> io::Result<()> {
            self.erased.push(tag);
            Ok(())
        }

        fn draw(&mut self, paint: &CellPaint) -> io::Result<()> {
            if paint.tag.col == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "column 0 is cursed"));
            }
            self.drawn.push(paint.tag);
            Ok(())
        }
    }

    #[test]
    fn failures_are_counted_not_fatal() {
        let palette = Palette::new(&[]);
        let o = Cell::of(Shape::O);
        let changes = [
            change(0, 0, Cell::EMPTY, o),
            change(0, 1, Cell::EMPTY, o),
            change(1, 1, o, Cell::EMPTY),
        ];
        let mut c = FlakyCanvas { drawn: vec![], erased: vec![] };
        assert_eq!(paint_changes(&mut c, &palette, &changes), 1);
        assert_eq!(c.drawn, vec![CellTag { row: 0, col: 1 }]);
        assert_eq!(c.erased, vec![CellTag { row: 1, col: 1 }]);
    }
}
