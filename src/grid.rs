//! Column-major LED grid mapped onto a serpentine strip.
//!
//! Columns may have different heights. Every column spans the full `rows`
//! range logically, but only its bottom `height` rows exist on the strip;
//! the rows above are dead space that can be written but is never shown.
//! Even columns run top to bottom along the strip, odd columns bottom to top.

use core::fmt;

use heapless::Vec;

use crate::OutputDriver;
use crate::color::{FADE_FACTOR, Pixel};

/// Grid construction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// No column heights were given
    NoColumns,
    /// The column at this index has zero height
    EmptyColumn(usize),
    /// More columns than the grid can hold
    TooManyColumns { count: usize, capacity: usize },
    /// `columns * rows` exceeds the pixel capacity
    TooManyCells { count: usize, capacity: usize },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoColumns => write!(f, "grid has no columns"),
            Self::EmptyColumn(column) => write!(f, "column {column} has zero height"),
            Self::TooManyColumns { count, capacity } => {
                write!(f, "{count} columns exceed capacity of {capacity}")
            }
            Self::TooManyCells { count, capacity } => {
                write!(f, "{count} cells exceed capacity of {capacity}")
            }
        }
    }
}

/// Result of a pixel write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    Applied,
    /// Coordinates were outside the grid; nothing changed
    Ignored,
}

/// Logical pixel grid.
///
/// `COLUMNS` bounds the number of columns and `CELLS` bounds
/// `columns * rows`, so the whole grid lives inline without allocation.
#[derive(Debug, Clone)]
pub struct Grid<const COLUMNS: usize, const CELLS: usize> {
    heights: Vec<usize, COLUMNS>,
    /// Strip index of the first LED of each column
    starts: Vec<usize, COLUMNS>,
    rows: usize,
    led_count: usize,
    pixels: Vec<Pixel, CELLS>,
    frame: Vec<Pixel, CELLS>,
}

impl<const COLUMNS: usize, const CELLS: usize> Grid<COLUMNS, CELLS> {
    /// Create a dark grid from per-column heights
    pub fn new(heights: &[usize]) -> Result<Self, GridError> {
        if heights.is_empty() {
            return Err(GridError::NoColumns);
        }
        if let Some(column) = heights.iter().position(|&height| height == 0) {
            return Err(GridError::EmptyColumn(column));
        }
        let too_many_columns = GridError::TooManyColumns {
            count: heights.len(),
            capacity: COLUMNS,
        };
        let heights: Vec<usize, COLUMNS> =
            Vec::from_slice(heights).map_err(|()| too_many_columns)?;

        let rows = heights.iter().copied().max().unwrap_or(0);
        let cells = heights.len() * rows;
        if cells > CELLS {
            return Err(GridError::TooManyCells {
                count: cells,
                capacity: CELLS,
            });
        }

        let mut starts = Vec::new();
        let mut led_count = 0;
        for &height in &heights {
            // Same length as `heights`, which already fit
            let _ = starts.push(led_count);
            led_count += height;
        }

        let mut pixels = Vec::new();
        let _ = pixels.resize(cells, Pixel::OFF);
        let mut frame = Vec::new();
        let _ = frame.resize(led_count, Pixel::OFF);

        Ok(Self {
            heights,
            starts,
            rows,
            led_count,
            pixels,
            frame,
        })
    }

    /// Number of columns
    pub fn columns(&self) -> usize {
        self.heights.len()
    }

    /// Height of the tallest column
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of visible LEDs on the strip
    pub const fn led_count(&self) -> usize {
        self.led_count
    }

    /// Height of a column, `None` if it does not exist
    pub fn height_of(&self, column: usize) -> Option<usize> {
        self.heights.get(column).copied()
    }

    /// Read a logical pixel
    pub fn get(&self, column: usize, row: usize) -> Option<Pixel> {
        self.cell(column, row).map(|cell| self.pixels[cell])
    }

    /// Overwrite a pixel. Out of range coordinates are ignored.
    pub fn set(&mut self, column: usize, row: usize, pixel: Pixel) -> Write {
        match self.cell(column, row) {
            Some(cell) => {
                self.pixels[cell] = pixel;
                Write::Applied
            }
            None => Write::Ignored,
        }
    }

    /// Blend into a pixel (see [`Pixel::add`]). Out of range coordinates
    /// are ignored.
    pub fn add(&mut self, column: usize, row: usize, pixel: Pixel) -> Write {
        match self.cell(column, row) {
            Some(cell) => {
                self.pixels[cell].add(pixel);
                Write::Applied
            }
            None => Write::Ignored,
        }
    }

    /// Decay every pixel by one frame
    pub fn fade(&mut self) {
        for pixel in &mut self.pixels {
            pixel.fade(FADE_FACTOR);
        }
    }

    /// Overwrite every pixel with one color
    pub fn fill(&mut self, pixel: Pixel) {
        self.pixels.fill(pixel);
    }

    /// Strip index of a logical pixel.
    ///
    /// Returns `None` outside the grid and for the dead space above a
    /// short column.
    pub fn physical_index(&self, column: usize, row: usize) -> Option<usize> {
        let height = self.height_of(column)?;
        let top = self.rows - height;
        if row < top || row >= self.rows {
            return None;
        }
        let offset = row - top;
        let start = self.starts[column];
        if column % 2 == 0 {
            Some(start + offset)
        } else {
            Some(start + height - 1 - offset)
        }
    }

    /// Copy the visible pixels into strip order and return the frame
    pub fn flatten(&mut self) -> &[Pixel] {
        for column in 0..self.columns() {
            let height = self.heights[column];
            for row in self.rows - height..self.rows {
                let Some(index) = self.physical_index(column, row) else {
                    continue;
                };
                self.frame[index] = self.pixels[column * self.rows + row];
            }
        }
        &self.frame
    }

    /// Flatten and hand the finished frame to the strip.
    ///
    /// Call once per frame after all compositing is done.
    pub fn show<O: OutputDriver>(&mut self, output: &mut O) {
        let frame = self.flatten();
        output.write(frame);
    }

    fn cell(&self, column: usize, row: usize) -> Option<usize> {
        (column < self.columns() && row < self.rows).then(|| column * self.rows + row)
    }
}
