use image::GrayImage;
use imageproc::contours::{self, BorderType};
use serde::{Deserialize, Serialize};

/// Axis-aligned box around a contour, extent inclusive of both edges.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut iter = points.into_iter();
        let (x0, y0) = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
        for (x, y) in iter {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Pixel centre, rounded down.
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<(u32, u32)>,
}

impl Contour {
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.points.iter().copied())
    }
}

/// Outermost borders of the non-zero regions in `mask`. Holes and anything
/// nested inside a hole are skipped.
pub fn find_external_contours(mask: &GrayImage) -> Vec<Contour> {
    contours::find_contours::<u32>(mask)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| Contour {
            points: c.points.iter().map(|p| (p.x, p.y)).collect(),
        })
        .collect()
}

/// Bounding boxes of the foreground objects in `mask`, ignoring those
/// covering fewer than `min_area` pixels.
pub fn detect_objects(mask: &GrayImage, min_area: u32) -> Vec<BoundingBox> {
    find_external_contours(mask)
        .iter()
        .filter_map(Contour::bounding_box)
        .filter(|b| b.area() >= u64::from(min_area))
        .collect()
}
