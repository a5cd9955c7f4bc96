// Frame -> background mask -> object boxes -> grid cells.

use crate::background::BackgroundSubtractor;
use crate::config::{Config, DetectionConfig, GridConfig};
use crate::contours::{detect_objects, BoundingBox};
use crate::error::Result;
use crate::grid::{Cell, OccupancyGrid};
use crate::projection::Projection;
use image::RgbImage;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub center: (u32, u32),
    /// `None` when the centre fell outside the mapped room.
    pub cell: Option<Cell>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub index: u32,
    /// The frame only trained the background model.
    pub warmup: bool,
    pub detections: Vec<Detection>,
    pub newly_occupied: usize,
}

pub struct OccupancyMapper<S: BackgroundSubtractor> {
    subtractor: S,
    grid: OccupancyGrid,
    grid_cfg: GridConfig,
    detection: DetectionConfig,
    frames: u32,
}

impl<S: BackgroundSubtractor> OccupancyMapper<S> {
    pub fn new(subtractor: S, cfg: &Config) -> Self {
        Self {
            subtractor,
            grid: OccupancyGrid::new(&cfg.grid),
            grid_cfg: cfg.grid.clone(),
            detection: cfg.detection.clone(),
            frames: 0,
        }
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn frames_processed(&self) -> u32 {
        self.frames
    }

    pub fn process(&mut self, frame: &RgbImage) -> Result<FrameReport> {
        let index = self.frames;
        let mask = self.subtractor.apply(frame)?;
        self.frames += 1;

        if index < self.detection.warmup_frames {
            debug!(index, "warm-up frame");
            return Ok(FrameReport {
                index,
                warmup: true,
                detections: Vec::new(),
                newly_occupied: 0,
            });
        }

        let projection = Projection::new(frame.width(), frame.height(), &self.grid_cfg);
        let mut detections = Vec::new();
        let mut newly_occupied = 0;
        for bbox in detect_objects(&mask, self.detection.min_area) {
            let center = bbox.center();
            let cell = projection.cell_for(&self.grid, center.0, center.1);
            match cell {
                Some(cell) => {
                    if self.grid.mark(cell) {
                        newly_occupied += 1;
                        debug!(row = cell.row, col = cell.col, "cell occupied");
                    }
                }
                None => warn!(x = center.0, y = center.1, "object centre outside the room"),
            }
            detections.push(Detection { bbox, center, cell });
        }

        debug!(
            index,
            objects = detections.len(),
            newly_occupied,
            occupied = self.grid.occupied_count(),
            "frame mapped"
        );
        Ok(FrameReport {
            index,
            warmup: false,
            detections,
            newly_occupied,
        })
    }

    /// Forgets both the occupancy and the learned background.
    pub fn reset(&mut self) {
        self.grid.clear();
        self.subtractor.reset();
        self.frames = 0;
    }
}
