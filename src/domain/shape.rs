/// The shape catalog.
///
/// Eight entries indexed by id: 0 is the empty shape (four `(0, 0)`
/// offsets, never spawned), 1..=7 are the tetrominoes. Each entry is an
/// ordered list of four `(dx, dy)` offsets from the pivot plus one base
/// color. `y` grows downward.
///
///   [-1,-1] [0,-1] [1,-1]
///   [-1, 0] [0, 0] [1, 0]
///   [-1, 1] [0, 1] [1, 1]
///   [-1, 2] [0, 2] [1, 2]

use rand::Rng;

use super::color::Rgb;

/// Four offsets from a pivot.
pub type Offsets = [(i32, i32); 4];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Shape {
    None = 0,
    Z = 1,
    S = 2,
    I = 3,
    T = 4,
    O = 5,
    L = 6,
    J = 7,
}

impl Shape {
    /// Every spawnable shape, in id order.
    pub const PLAYABLE: [Shape; 7] = [
        Shape::Z,
        Shape::S,
        Shape::I,
        Shape::T,
        Shape::O,
        Shape::L,
        Shape::J,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Shape> {
        match id {
            0 => Some(Shape::None),
            1 => Some(Shape::Z),
            2 => Some(Shape::S),
            3 => Some(Shape::I),
            4 => Some(Shape::T),
            5 => Some(Shape::O),
            6 => Some(Shape::L),
            7 => Some(Shape::J),
            _ => None,
        }
    }

    /// Case-insensitive lookup by letter, used for `[colors]` overrides.
    pub fn from_name(name: &str) -> Option<Shape> {
        Shape::PLAYABLE
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            Shape::None => "-",
            Shape::Z => "Z",
            Shape::S => "S",
            Shape::I => "I",
            Shape::T => "T",
            Shape::O => "O",
            Shape::L => "L",
            Shape::J => "J",
        }
    }

    pub fn offsets(self) -> Offsets {
        match self {
            Shape::None => [(0, 0), (0, 0), (0, 0), (0, 0)],
            Shape::Z => [(0, -1), (0, 0), (-1, 0), (-1, 1)],
            Shape::S => [(0, -1), (0, 0), (1, 0), (1, 1)],
            Shape::I => [(0, -1), (0, 0), (0, 1), (0, 2)],
            Shape::T => [(-1, 0), (0, 0), (1, 0), (0, 1)],
            Shape::O => [(0, 0), (1, 0), (0, 1), (1, 1)],
            Shape::L => [(-1, -1), (0, -1), (0, 0), (0, 1)],
            Shape::J => [(1, -1), (0, -1), (0, 0), (0, 1)],
        }
    }

    /// Base color before shading.
    pub fn base_color(self) -> Rgb {
        match self {
            Shape::None => Rgb::BLACK,
            Shape::Z => Rgb::new(0xff, 0x00, 0x00), // red
            Shape::S => Rgb::new(0x00, 0xff, 0x00), // green
            Shape::I => Rgb::new(0x00, 0xff, 0xff), // cyan
            Shape::T => Rgb::new(0x80, 0x00, 0x80), // purple
            Shape::O => Rgb::new(0xff, 0xff, 0x00), // yellow
            Shape::L => Rgb::new(0xff, 0xa5, 0x00), // orange
            Shape::J => Rgb::new(0x00, 0x00, 0xff), // blue
        }
    }

    /// Uniform pick over ids 1..=7.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Shape {
        Shape::PLAYABLE[rng.gen_range(0..Shape::PLAYABLE.len())]
    }
}
