use crate::piece::{Piece, Point};

/// Points for the first row cleared by one sweep; each further row doubles.
pub const FIRST_ROW_POINTS: u32 = 10;

/// One player's board. Row 0 is the top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "grid must be at least 1x1");
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major cells, `width * height` long.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks(self.width)
    }

    /// `None` outside the board.
    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        self.index(x, y).map(|i| self.cells[i])
    }

    pub fn set(&mut self, x: i32, y: i32, color: u8) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = color;
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    fn row(&self, y: usize) -> &[u8] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    /// Any occupied piece cell on a filled grid cell or off the board collides.
    pub fn collides(&self, piece: &Piece, offset: Point) -> bool {
        piece
            .blocks()
            .any(|(x, y, _)| match self.get(x + offset.x, y + offset.y) {
                Some(cell) => cell != 0,
                None => true,
            })
    }

    pub fn merge(&mut self, piece: &Piece, offset: Point) {
        for (x, y, color) in piece.blocks() {
            self.set(x + offset.x, y + offset.y, color);
        }
    }

    /// Clears every full row below the top one and returns the points earned.
    pub fn sweep(&mut self) -> u32 {
        let mut row_points = FIRST_ROW_POINTS;
        let mut score = 0;
        let mut y = self.height - 1;
        while y > 0 {
            if self.row(y).contains(&0) {
                y -= 1;
                continue;
            }
            // Pull everything above down one row; the same y is checked again.
            self.cells.copy_within(0..y * self.width, self.width);
            self.cells[..self.width].fill(0);
            score += row_points;
            row_points *= 2;
        }
        score
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&c| c == 0)
    }
}
