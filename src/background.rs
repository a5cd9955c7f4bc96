use crate::config::SubtractorConfig;
use crate::error::{MapperError, Result};
use image::{GrayImage, Luma, RgbImage};
use tracing::{debug, trace};

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Separates moving objects from a learned static scene.
pub trait BackgroundSubtractor {
    /// Feeds `frame` into the model and returns its foreground mask
    /// (`FOREGROUND` / `BACKGROUND` per pixel).
    fn apply(&mut self, frame: &RgbImage) -> Result<GrayImage>;
    fn reset(&mut self);
}

#[derive(Clone, Copy, Debug, Default)]
struct Mode {
    weight: f32,
    mean: [f32; 3],
    variance: f32,
}

/// Per-pixel adaptive mixture of Gaussians.
///
/// Every pixel keeps up to `mixtures` colour modes sorted by weight. The
/// heaviest modes whose weights add up to `background_ratio` describe the
/// background; a pixel close enough to one of them is background, anything
/// else is foreground. Modes that stop being observed fade out and are pruned.
pub struct GaussianMixture {
    cfg: SubtractorConfig,
    size: Option<(u32, u32)>,
    modes: Vec<Mode>,
    used: Vec<usize>,
    frames: u32,
}

impl GaussianMixture {
    pub fn new(cfg: SubtractorConfig) -> Self {
        Self {
            cfg,
            size: None,
            modes: Vec::new(),
            used: Vec::new(),
            frames: 0,
        }
    }

    pub fn frames_seen(&self) -> u32 {
        self.frames
    }

    fn mixtures(&self) -> usize {
        self.cfg.mixtures.max(1)
    }

    fn learning_rate(&self) -> f32 {
        match self.cfg.learning_rate {
            Some(rate) if self.frames > 1 => rate,
            _ => 1.0 / self.frames.saturating_mul(2).min(self.cfg.history.max(1)) as f32,
        }
    }

    fn prepare(&mut self, dims: (u32, u32)) -> Result<()> {
        match self.size {
            Some(expected) if expected != dims => Err(MapperError::FrameSizeMismatch {
                expected,
                actual: dims,
            }),
            Some(_) => Ok(()),
            None => {
                let pixels = dims.0 as usize * dims.1 as usize;
                self.modes = vec![Mode::default(); pixels * self.mixtures()];
                self.used = vec![0; pixels];
                self.size = Some(dims);
                debug!(width = dims.0, height = dims.1, "background model allocated");
                Ok(())
            }
        }
    }
}

impl BackgroundSubtractor for GaussianMixture {
    fn apply(&mut self, frame: &RgbImage) -> Result<GrayImage> {
        let (width, height) = frame.dimensions();
        self.prepare((width, height))?;
        self.frames += 1;
        let alpha = self.learning_rate();
        let k = self.mixtures();

        let mut mask = GrayImage::new(width, height);
        let mut foreground = 0usize;
        for (i, (pixel, out)) in frame.pixels().zip(mask.pixels_mut()).enumerate() {
            let modes = &mut self.modes[i * k..(i + 1) * k];
            let is_fg = update_pixel(&self.cfg, modes, &mut self.used[i], pixel.0, alpha);
            if is_fg {
                foreground += 1;
            }
            *out = Luma([if is_fg { FOREGROUND } else { BACKGROUND }]);
        }
        trace!(frame = self.frames, alpha, foreground, "background subtracted");
        Ok(mask)
    }

    fn reset(&mut self) {
        self.size = None;
        self.modes.clear();
        self.used.clear();
        self.frames = 0;
    }
}

/// Updates one pixel's modes with colour `rgb`. Returns `true` for foreground.
fn update_pixel(
    cfg: &SubtractorConfig,
    modes: &mut [Mode],
    used: &mut usize,
    rgb: [u8; 3],
    alpha: f32,
) -> bool {
    let x = rgb.map(f32::from);
    let alpha1 = 1.0 - alpha;
    let prune = -alpha * cfg.complexity_reduction;
    let mut n = *used;

    let mut fits = false;
    let mut background = false;
    let mut total = 0.0f32;
    for mode in modes[..n].iter_mut() {
        let mut weight = alpha1 * mode.weight + prune;
        if !fits {
            let diff = [
                mode.mean[0] - x[0],
                mode.mean[1] - x[1],
                mode.mean[2] - x[2],
            ];
            let dist2: f32 = diff.iter().map(|d| d * d).sum();
            let var = mode.variance;
            if dist2 < cfg.var_threshold_gen * var {
                fits = true;
                if total < cfg.background_ratio && dist2 < cfg.var_threshold * var {
                    background = true;
                }
                weight += alpha;
                let step = alpha / weight;
                for (m, d) in mode.mean.iter_mut().zip(diff) {
                    *m -= step * d;
                }
                mode.variance = (var + step * (dist2 - var)).max(cfg.var_min).min(cfg.var_max);
            }
        }
        if weight < -prune {
            weight = 0.0;
        }
        mode.weight = weight;
        total += weight;
    }

    let mut live = 0;
    for m in 0..n {
        if modes[m].weight > 0.0 {
            modes[live] = modes[m];
            live += 1;
        }
    }
    n = live;

    if !fits {
        // Modes are sorted, so the last one is the weakest.
        let weight = if n == 0 { 1.0 } else { alpha };
        if n < modes.len() {
            n += 1;
        }
        modes[n - 1] = Mode {
            weight,
            mean: x,
            variance: cfg.var_init,
        };
    }

    let modes = &mut modes[..n];
    modes.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    let total: f32 = modes.iter().map(|m| m.weight).sum();
    if total > 0.0 {
        for mode in modes.iter_mut() {
            mode.weight /= total;
        }
    }
    *used = n;
    !background
}
