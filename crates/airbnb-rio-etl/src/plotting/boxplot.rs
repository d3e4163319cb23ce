//! Single-series vertical box plot.

use crate::error::Result;
use crate::statistics;
use image::{Rgb, RgbImage};
use std::path::Path;
use tracing::{debug, info, warn};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const BOX_FILL: Rgb<u8> = Rgb([176, 196, 222]);
const MEDIAN: Rgb<u8> = Rgb([255, 127, 14]);
const FLIER: Rgb<u8> = Rgb([90, 90, 90]);

const MARGIN: u32 = 40;
const TICK_LEN: u32 = 5;
const TICK_COUNT: u32 = 5;
const FLIER_RADIUS: i64 = 3;

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxplotStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value within `q1 - 1.5 * iqr`.
    pub whisker_low: f64,
    /// Largest value within `q3 + 1.5 * iqr`.
    pub whisker_high: f64,
    /// Values beyond the whiskers, in ascending order.
    pub fliers: Vec<f64>,
    pub count: usize,
}

impl BoxplotStats {
    /// Summary of `values`. `None` if no finite value is present.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted: Vec<f64> = statistics::sorted(values)
            .into_iter()
            .filter(|v| v.is_finite())
            .collect();

        let q1 = statistics::quantile_sorted(&sorted, 0.25)?;
        let median = statistics::quantile_sorted(&sorted, 0.5)?;
        let q3 = statistics::quantile_sorted(&sorted, 0.75)?;
        let iqr = q3 - q1;
        let low_fence = q1 - 1.5 * iqr;
        let high_fence = q3 + 1.5 * iqr;

        let inside: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|v| *v >= low_fence && *v <= high_fence)
            .collect();
        let whisker_low = inside.first().copied().unwrap_or(q1).min(q1);
        let whisker_high = inside.last().copied().unwrap_or(q3).max(q3);

        let fliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < whisker_low || *v > whisker_high)
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            fliers,
            count: sorted.len(),
        })
    }

    /// Smallest and largest value the plot must show.
    fn extent(&self) -> (f64, f64) {
        let lo = self.fliers.first().copied().unwrap_or(self.whisker_low);
        let hi = self.fliers.last().copied().unwrap_or(self.whisker_high);
        (lo.min(self.whisker_low), hi.max(self.whisker_high))
    }
}

/// Draws box plots to PNG files.
pub struct BoxplotRenderer {
    width: u32,
    height: u32,
}

impl BoxplotRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Draw the box plot of `values` and save it to `path`.
    ///
    /// An empty sample still produces an image with the empty axes frame.
    pub fn render(&self, values: &[f64], title: &str, path: &Path) -> Result<()> {
        let stats = BoxplotStats::from_values(values);
        let img = self.draw(stats.as_ref());
        img.save(path)?;

        match &stats {
            Some(s) => info!(
                "Saved box plot '{}' to {} (n={}, median={:.2}, {} fliers)",
                title,
                path.display(),
                s.count,
                s.median,
                s.fliers.len()
            ),
            None => warn!("Saved empty box plot '{}' to {}", title, path.display()),
        }
        Ok(())
    }

    /// Rasterize the plot.
    pub fn draw(&self, stats: Option<&BoxplotStats>) -> RgbImage {
        let mut img = RgbImage::from_pixel(self.width, self.height, WHITE);

        let left = MARGIN;
        let right = self.width.saturating_sub(MARGIN).max(left + 1);
        let top = MARGIN / 2;
        let bottom = self.height.saturating_sub(MARGIN / 2).max(top + 1);

        draw_rect_outline(&mut img, left, top, right, bottom, BLACK);

        let Some(stats) = stats else {
            return img;
        };

        let (lo, hi) = stats.extent();
        let span = if hi > lo { hi - lo } else { 1.0 };
        let pad = span * 0.05;
        let (lo, hi) = (lo - pad, lo + span + pad);

        let plot_top = top + 1;
        let plot_bottom = bottom - 1;
        let to_y = |v: f64| -> u32 {
            let frac = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
            let y = plot_bottom as f64 - frac * (plot_bottom - plot_top) as f64;
            y.round() as u32
        };

        for i in 0..=TICK_COUNT {
            let y = plot_bottom - (plot_bottom - plot_top) * i / TICK_COUNT;
            draw_hline(&mut img, left.saturating_sub(TICK_LEN), left, y, BLACK);
        }

        let center = (left + right) / 2;
        let box_half = ((right - left) / 6).max(2);
        let cap_half = box_half / 2;

        let y_q1 = to_y(stats.q1);
        let y_q3 = to_y(stats.q3);
        let y_med = to_y(stats.median);
        let y_wlo = to_y(stats.whisker_low);
        let y_whi = to_y(stats.whisker_high);

        // whiskers and caps
        draw_vline(&mut img, center, y_q1, y_wlo, BLACK);
        draw_vline(&mut img, center, y_whi, y_q3, BLACK);
        draw_hline(&mut img, center - cap_half, center + cap_half, y_wlo, BLACK);
        draw_hline(&mut img, center - cap_half, center + cap_half, y_whi, BLACK);

        // box
        fill_rect(&mut img, center - box_half, y_q3, center + box_half, y_q1, BOX_FILL);
        draw_rect_outline(&mut img, center - box_half, y_q3, center + box_half, y_q1, BLACK);
        draw_hline(&mut img, center - box_half, center + box_half, y_med, MEDIAN);

        for flier in &stats.fliers {
            draw_circle(&mut img, center, to_y(*flier), FLIER_RADIUS, FLIER);
        }

        debug!(
            "Box plot pixels: q1={} median={} q3={} whiskers=({}, {})",
            y_q1, y_med, y_q3, y_wlo, y_whi
        );
        img
    }
}

fn put(img: &mut RgbImage, x: u32, y: u32, color: Rgb<u8>) {
    if x < img.width() && y < img.height() {
        img.put_pixel(x, y, color);
    }
}

fn draw_hline(img: &mut RgbImage, x0: u32, x1: u32, y: u32, color: Rgb<u8>) {
    for x in x0.min(x1)..=x0.max(x1) {
        put(img, x, y, color);
    }
}

fn draw_vline(img: &mut RgbImage, x: u32, y0: u32, y1: u32, color: Rgb<u8>) {
    for y in y0.min(y1)..=y0.max(y1) {
        put(img, x, y, color);
    }
}

fn draw_rect_outline(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    draw_hline(img, x0, x1, y0, color);
    draw_hline(img, x0, x1, y1, color);
    draw_vline(img, x0, y0, y1, color);
    draw_vline(img, x1, y0, y1, color);
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    for y in y0.min(y1)..=y0.max(y1) {
        draw_hline(img, x0, x1, y, color);
    }
}

fn draw_circle(img: &mut RgbImage, cx: u32, cy: u32, radius: i64, color: Rgb<u8>) {
    let (cx, cy) = (cx as i64, cy as i64);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let d2 = dx * dx + dy * dy;
            // ring only
            if d2 <= radius * radius && d2 >= (radius - 1) * (radius - 1) {
                let (x, y) = (cx + dx, cy + dy);
                if x >= 0 && y >= 0 {
                    put(img, x as u32, y as u32, color);
                }
            }
        }
    }
}
