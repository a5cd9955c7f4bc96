use crate::config::GridConfig;
use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

/// Binary occupancy map of the room. A cell holds 1 once anything was seen in it.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    rows: usize,
    cols: usize,
    resolution: f64,
    cells: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GridSnapshot {
    pub rows: usize,
    pub cols: usize,
    pub resolution: f64,
    pub occupied: Vec<Cell>,
}

impl OccupancyGrid {
    pub fn new(cfg: &GridConfig) -> Self {
        let rows = cfg.rows();
        let cols = cfg.cols();
        Self {
            rows,
            cols,
            resolution: cfg.resolution,
            cells: vec![0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Meters per cell.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Cell containing the room coordinate `(x, y)` in meters.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<Cell> {
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return None;
        }
        let col = cell_index(x / self.resolution);
        let row = cell_index(y / self.resolution);
        (row < self.rows && col < self.cols).then_some(Cell { row, col })
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        (cell.row < self.rows && cell.col < self.cols).then(|| cell.row * self.cols + cell.col)
    }

    /// Marks `cell` occupied. Returns `true` if it was free before.
    pub fn mark(&mut self, cell: Cell) -> bool {
        match self.index(cell) {
            Some(i) => {
                let fresh = self.cells[i] == 0;
                self.cells[i] = 1;
                fresh
            }
            None => false,
        }
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|i| self.cells[i] != 0)
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }

    pub fn occupied_cells(&self) -> Vec<Cell> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != 0)
            .map(|(i, _)| Cell {
                row: i / self.cols,
                col: i % self.cols,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// One pixel per cell, 255 where occupied.
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.cols as u32, self.rows as u32, |x, y| {
            let value = self.cells[y as usize * self.cols + x as usize];
            Luma([value.saturating_mul(255)])
        })
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            rows: self.rows,
            cols: self.cols,
            resolution: self.resolution,
            occupied: self.occupied_cells(),
        }
    }
}

/// Floors `q`, snapping values a rounding error below an integer up to it.
fn cell_index(q: f64) -> usize {
    let nearest = q.round();
    if (q - nearest).abs() <= 1e-9 * nearest.max(1.0) {
        nearest as usize
    } else {
        q.floor() as usize
    }
}
