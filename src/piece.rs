use serde::{Deserialize, Serialize};
use tsify::Tsify;

#[derive(Clone, Copy, Serialize, Deserialize, Tsify, Debug, PartialEq, Eq)]
pub enum Tetromino {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl Tetromino {
    pub fn all() -> [Tetromino; 7] {
        [
            Tetromino::I,
            Tetromino::L,
            Tetromino::J,
            Tetromino::O,
            Tetromino::T,
            Tetromino::S,
            Tetromino::Z,
        ]
    }

    pub fn color_id(self) -> u8 {
        match self {
            Tetromino::T => 1,
            Tetromino::O => 2,
            Tetromino::L => 3,
            Tetromino::J => 4,
            Tetromino::I => 5,
            Tetromino::S => 6,
            Tetromino::Z => 7,
        }
    }

    /// Spawn matrix, top-left anchored. Every occupied cell holds `color_id`.
    fn spawn_rows(self) -> Vec<Vec<u8>> {
        match self {
            Tetromino::T => vec![vec![0, 0, 0], vec![1, 1, 1], vec![0, 1, 0]],
            Tetromino::O => vec![vec![2, 2], vec![2, 2]],
            Tetromino::L => vec![vec![0, 3, 0], vec![0, 3, 0], vec![0, 3, 3]],
            Tetromino::J => vec![vec![0, 4, 0], vec![0, 4, 0], vec![4, 4, 0]],
            Tetromino::I => vec![
                vec![0, 5, 0, 0],
                vec![0, 5, 0, 0],
                vec![0, 5, 0, 0],
                vec![0, 5, 0, 0],
            ],
            Tetromino::S => vec![vec![0, 6, 6], vec![6, 6, 0], vec![0, 0, 0]],
            Tetromino::Z => vec![vec![7, 7, 0], vec![0, 7, 7], vec![0, 0, 0]],
        }
    }
}

/// Offset of a piece's top-left corner in grid coordinates (y grows downward).
#[derive(Clone, Copy, Serialize, Deserialize, Tsify, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Rotation direction: clockwise is `+1`, counter-clockwise `-1`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Turn {
    Cw,
    Ccw,
}

impl Turn {
    pub fn from_dir(dir: i32) -> Turn {
        if dir > 0 { Turn::Cw } else { Turn::Ccw }
    }
}

/// A falling-block matrix. Cells are row-major; 0 is empty, anything else is
/// the color id drawn for that cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    kind: Option<Tetromino>,
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl Piece {
    pub fn new(kind: Tetromino) -> Self {
        let mut piece = Self::from_rows(&kind.spawn_rows());
        piece.kind = Some(kind);
        piece
    }

    /// Builds a piece from explicit rows. Short rows are padded with empty
    /// cells so the matrix stays rectangular.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.as_ref().len()).max().unwrap_or(0);
        let mut cells = vec![0; width * height];
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            cells[y * width..y * width + row.len()].copy_from_slice(row);
        }
        Self {
            kind: None,
            width,
            height,
            cells,
        }
    }

    pub fn kind(&self) -> Option<Tetromino> {
        self.kind
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.cells[y * self.width + x]
    }

    /// Occupied cells as `(x, y, color)` relative to the top-left corner.
    pub fn blocks(&self) -> impl Iterator<Item = (i32, i32, u8)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, &c)| {
            (c != 0).then(|| ((i % self.width) as i32, (i / self.width) as i32, c))
        })
    }

    pub fn rows(&self) -> Vec<Vec<u8>> {
        if self.width == 0 {
            return vec![Vec::new(); self.height];
        }
        self.cells.chunks(self.width).map(|r| r.to_vec()).collect()
    }

    /// Quarter turn into a new matrix. Rectangular shapes swap their
    /// dimensions, so a 3x2 piece becomes 2x3.
    pub fn rotated(&self, turn: Turn) -> Piece {
        let (w, h) = (self.width, self.height);
        let mut cells = vec![0; w * h];
        // New matrix is `h` wide and `w` tall.
        for r in 0..w {
            for c in 0..h {
                cells[r * h + c] = match turn {
                    Turn::Cw => self.get(r, h - 1 - c),
                    Turn::Ccw => self.get(w - 1 - r, c),
                };
            }
        }
        Piece {
            kind: self.kind,
            width: h,
            height: w,
            cells,
        }
    }
}
