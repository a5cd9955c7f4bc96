use crate::error::{MapperError, Result};
use crate::grid::OccupancyGrid;
use crate::mapper::FrameReport;
use image::imageops::{self, FilterType};
use std::io::Write;
use std::path::PathBuf;
use tracing::trace;

/// Receives the grid after every processed frame.
pub trait GridSink {
    fn show(&mut self, grid: &OccupancyGrid, report: &FrameReport) -> Result<()>;
}

/// Overwrites a PNG with the current grid, each cell `scale` pixels wide.
pub struct PngSink {
    path: PathBuf,
    scale: u32,
}

impl PngSink {
    pub fn new(path: PathBuf, scale: u32) -> Self {
        Self {
            path,
            scale: scale.max(1),
        }
    }
}

impl GridSink for PngSink {
    fn show(&mut self, grid: &OccupancyGrid, report: &FrameReport) -> Result<()> {
        let img = grid.to_image();
        let img = if self.scale > 1 {
            let (width, height) = img
                .width()
                .checked_mul(self.scale)
                .zip(img.height().checked_mul(self.scale))
                .ok_or_else(|| {
                    MapperError::Config(format!("png scale {} is too large", self.scale))
                })?;
            imageops::resize(&img, width, height, FilterType::Nearest)
        } else {
            img
        };
        img.save(&self.path)?;
        trace!(path = %self.path.display(), index = report.index, "grid image written");
        Ok(())
    }
}

/// Prints the grid as text, `#` for occupied and `.` for free cells.
pub struct AsciiSink<W: Write> {
    out: W,
}

impl<W: Write> AsciiSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> GridSink for AsciiSink<W> {
    fn show(&mut self, grid: &OccupancyGrid, report: &FrameReport) -> Result<()> {
        if report.warmup {
            return Ok(());
        }
        let img = grid.to_image();
        let mut line = String::with_capacity(grid.cols() + 1);
        for row in img.rows() {
            line.clear();
            line.extend(row.map(|p| if p.0[0] != 0 { '#' } else { '.' }));
            line.push('\n');
            self.out.write_all(line.as_bytes())?;
        }
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

pub struct NullSink;

impl GridSink for NullSink {
    fn show(&mut self, _grid: &OccupancyGrid, _report: &FrameReport) -> Result<()> {
        Ok(())
    }
}
