use crate::config::GridConfig;
use crate::grid::{Cell, OccupancyGrid};

/// Maps image pixels onto room coordinates by plain scaling: the image plane
/// is taken to cover the whole room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    image_width: u32,
    image_height: u32,
    meters_per_px_x: f64,
    meters_per_px_y: f64,
}

impl Projection {
    pub fn new(image_width: u32, image_height: u32, grid: &GridConfig) -> Self {
        let image_width = image_width.max(1);
        let image_height = image_height.max(1);
        Self {
            image_width,
            image_height,
            meters_per_px_x: grid.width / f64::from(image_width),
            meters_per_px_y: grid.height / f64::from(image_height),
        }
    }

    pub fn to_room(&self, px: u32, py: u32) -> (f64, f64) {
        (
            f64::from(px) * self.meters_per_px_x,
            f64::from(py) * self.meters_per_px_y,
        )
    }

    /// Cell under pixel `(px, py)`. Integer arithmetic, so every pixel on a
    /// cell boundary lands in the cell that starts there.
    pub fn cell_for(&self, grid: &OccupancyGrid, px: u32, py: u32) -> Option<Cell> {
        let col = scale_index(px, grid.cols(), self.image_width);
        let row = scale_index(py, grid.rows(), self.image_height);
        (row < grid.rows() && col < grid.cols()).then_some(Cell { row, col })
    }
}

fn scale_index(pixel: u32, cells: usize, pixels: u32) -> usize {
    let index = u128::from(pixel) * cells as u128 / u128::from(pixels);
    usize::try_from(index).unwrap_or(usize::MAX)
}
