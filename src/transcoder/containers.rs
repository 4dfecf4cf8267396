use serde::{Deserialize, Serialize};
use std::fmt;

/// One packet's bytes as the stripped run of hex digits found in the dump.
///
/// Only ASCII alphanumerics survive tokenization, so byte offsets and char offsets agree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HexPayload {
    pub index: usize,
    digits: String,
}

impl HexPayload {
    /// Keeps only the ASCII alphanumeric characters of `digits`.
    pub fn new(index: usize, digits: &str) -> Self {
        let mut payload = Self { index, digits: String::new() };
        payload.push_stripped(digits);
        payload
    }

    pub(crate) fn push_stripped(&mut self, fragment: &str) {
        self.digits
            .extend(fragment.chars().filter(|c| c.is_ascii_alphanumeric()));
    }

    pub fn as_str(&self) -> &str {
        &self.digits
    }

    /// Length in hex digits, not bytes.
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }
}

impl fmt::Display for HexPayload {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "packet {} ({} hex digits)", self.index, self.digits.len())
    }
}

/// A fixed `rows x cols` image of a single packet, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl PixelGrid {
    pub fn filled(rows: usize, cols: usize, value: u8) -> Self {
        Self {
            rows,
            cols,
            cells: vec![value; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.cols + col]
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: u8) {
        self.cells[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[u8] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}

/// All packet images laid side by side: `rows x (cols * packet_count)`, row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetArray {
    pub rows: usize,
    pub cols: usize,
    pub packet_count: usize,
    pub data: Vec<u8>,
}

impl DatasetArray {
    pub fn filled(rows: usize, cols: usize, packet_count: usize, value: u8) -> Self {
        Self {
            rows,
            cols,
            packet_count,
            data: vec![value; rows * cols * packet_count],
        }
    }

    /// Total number of columns of the stacked matrix.
    pub fn width(&self) -> usize {
        self.cols * self.packet_count
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.width())
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.width() + col]
    }

    /// Copies `grid` into the column slice `[p*cols, (p+1)*cols)`.
    pub(crate) fn place(&mut self, packet: usize, grid: &PixelGrid) {
        let width = self.width();
        let start = packet * self.cols;
        for r in 0..self.rows {
            let offset = r * width + start;
            self.data[offset..offset + self.cols].copy_from_slice(grid.row(r));
        }
    }

    /// Cuts packet `p` back out as its own grid.
    pub fn packet(&self, packet: usize) -> PixelGrid {
        let mut grid = PixelGrid::filled(self.rows, self.cols, 0);
        let start = packet * self.cols;
        for r in 0..self.rows {
            for c in 0..self.cols {
                grid.set(r, c, self.get(r, start + c));
            }
        }
        grid
    }

    /// Whether `data` actually holds `rows * width` cells. A shape whose cell count
    /// does not fit in `usize` is never consistent.
    pub fn is_consistent(&self) -> bool {
        self.cols
            .checked_mul(self.packet_count)
            .and_then(|width| width.checked_mul(self.rows))
            .map_or(false, |cells| cells == self.data.len())
    }
}
