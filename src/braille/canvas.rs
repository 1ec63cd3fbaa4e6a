/// Empty braille cell (no dots set)
pub const BLANK: char = '\u{2800}';

/// Braille Unicode canvas for terminal plotting.
/// Each character cell holds a 2x4 dot grid, so a canvas of `width x height`
/// characters has `width*2 x height*4` addressable pixels.
#[derive(Clone)]
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    cells: Vec<u8>, // Dot bits, row-major
}

impl BrailleCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0u8; width * height],
        }
    }

    /// Set a pixel. Out-of-range pixels are ignored.
    /// Braille dot layout per character:
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let cx = x / 2;
        let cy = y / 4;

        if cx >= self.width || cy >= self.height {
            return;
        }

        let bit = match (x % 2, y % 4) {
            (0, 0) => 0x01,
            (1, 0) => 0x08,
            (0, 1) => 0x02,
            (1, 1) => 0x10,
            (0, 2) => 0x04,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => 0,
        };

        self.cells[cy * self.width + cx] |= bit;
    }

    /// Set a pixel using signed coordinates (ignores negative values)
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// Braille character at a cell, `BLANK` when outside the canvas
    pub fn cell(&self, col: usize, row: usize) -> char {
        if col >= self.width || row >= self.height {
            return BLANK;
        }
        char::from_u32(0x2800 + self.cells[row * self.width + col] as u32).unwrap_or(BLANK)
    }

    /// Non-blank cells as (column, row, glyph)
    pub fn dots(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        self.cells.iter().enumerate().filter(|&(_, &b)| b != 0).map(|(i, _)| {
            let col = i % self.width;
            let row = i / self.width;
            (col, row, self.cell(col, row))
        })
    }

    #[cfg(test)]
    pub fn to_string(&self) -> String {
        (0..self.height)
            .map(|row| (0..self.width).map(|col| self.cell(col, row)).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
