use crate::config::SyntheticConfig;
use crate::error::{MapperError, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};
use tracing::{debug, error, trace};

/// Where frames come from.
pub trait FrameSource {
    /// The next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// A simulated camera looking at an empty room that a single white "person"
/// walks into.
pub struct SyntheticSource {
    cfg: SyntheticConfig,
    index: u32,
}

impl SyntheticSource {
    pub fn new(cfg: SyntheticConfig) -> Self {
        Self { cfg, index: 0 }
    }

    /// The frame shown at position `index` of the feed.
    pub fn frame_at(&self, index: u32) -> RgbImage {
        let mut frame = RgbImage::new(self.cfg.width, self.cfg.height);
        if index < self.cfg.empty_frames {
            return frame;
        }
        let step = i32::try_from(index - self.cfg.empty_frames).unwrap_or(i32::MAX);
        let [x0, y0, x1, y1] = self.cfg.person.map(i64::from);
        let dx = i64::from(self.cfg.velocity[0].saturating_mul(step));
        let dy = i64::from(self.cfg.velocity[1].saturating_mul(step));
        // Clip to the frame; the person may walk out of view.
        let left = (x0.min(x1) + dx).max(0);
        let top = (y0.min(y1) + dy).max(0);
        let right = (x0.max(x1) + dx).min(i64::from(self.cfg.width) - 1);
        let bottom = (y0.max(y1) + dy).min(i64::from(self.cfg.height) - 1);
        if left > right || top > bottom {
            return frame;
        }
        let rect = Rect::at(left as i32, top as i32)
            .of_size((right - left + 1) as u32, (bottom - top + 1) as u32);
        draw_filled_rect_mut(&mut frame, rect, Rgb([255, 255, 255]));
        frame
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let frame = self.frame_at(self.index);
        trace!(index = self.index, "synthetic frame rendered");
        self.index = self.index.saturating_add(1);
        Ok(Some(frame))
    }
}

pub fn frame_dir() -> PathBuf {
    std::env::var_os("OCCUPANCY_FRAME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("frames"))
}

fn load_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    paths.sort();
    if paths.is_empty() {
        error!("no frames found in {}", dir.display());
    }
    Ok(paths)
}

/// Replays the image files of a directory in file-name order.
pub struct DirectorySource {
    frames: Vec<PathBuf>,
    index: usize,
}

impl DirectorySource {
    pub fn new(dir: &Path) -> Result<Self> {
        let frames = load_frames(dir)?;
        debug!(dir = %dir.display(), count = frames.len(), "frame directory scanned");
        Ok(Self { frames, index: 0 })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for DirectorySource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(path) = self.frames.get(self.index) else {
            return Ok(None);
        };
        self.index += 1;
        let img = image::open(path).map_err(|source| MapperError::Frame {
            path: path.clone(),
            source,
        })?;
        trace!(path = %path.display(), "frame loaded");
        Ok(Some(img.into_rgb8()))
    }
}

#[cfg(feature = "camera")]
pub use camera::CameraSource;

#[cfg(feature = "camera")]
mod camera {
    use super::FrameSource;
    use crate::error::{MapperError, Result};
    use image::RgbImage;
    use nokhwa::{
        pixel_format::RgbFormat,
        utils::{CameraIndex, RequestedFormat, RequestedFormatType},
        Camera,
    };
    use tracing::debug;

    /// Frames from the first attached camera.
    pub struct CameraSource {
        cam: Camera,
    }

    impl CameraSource {
        pub fn open() -> Result<Self> {
            let format =
                RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
            let mut cam = Camera::new(CameraIndex::Index(0), format)
                .map_err(|e| MapperError::Camera(e.to_string()))?;
            cam.open_stream()
                .map_err(|e| MapperError::Camera(e.to_string()))?;
            debug!(format = ?cam.camera_format(), "camera stream opened");
            Ok(Self { cam })
        }
    }

    impl FrameSource for CameraSource {
        fn next_frame(&mut self) -> Result<Option<RgbImage>> {
            let frame = self
                .cam
                .frame()
                .map_err(|e| MapperError::Camera(e.to_string()))?;
            let img = frame
                .decode_image::<RgbFormat>()
                .map_err(|e| MapperError::Camera(e.to_string()))?;
            Ok(Some(img))
        }
    }

    impl Drop for CameraSource {
        fn drop(&mut self) {
            let _ = self.cam.stop_stream();
        }
    }
}
