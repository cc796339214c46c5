use imlab_image::{Image, ImageError, ImageSize};
use rayon::prelude::*;

use crate::draw;

/// Color used to render detected lines.
pub const LINE_COLOR: [u8; 3] = [0, 255, 0];

/// Half length of the segment drawn for a line, measured from the foot of the normal.
const LINE_HALF_LENGTH: f64 = 1000.0;

/// A line in normal form, `x * cos(theta) + y * sin(theta) = rho`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// Signed distance from the origin, in pixels.
    pub rho: f64,
    /// Angle of the normal in radians, in [-pi/2, pi/2).
    pub theta: f64,
    /// Number of edge pixels that voted for the line.
    pub votes: u32,
}

/// Vote table of the hough line transform over (rho, theta) buckets.
///
/// Angles start at -90 degrees and advance by the angle step while below 90 degrees.
/// Distances cover `[-diag, diag]` with `2 * diag` buckets, where `diag` is the image
/// diagonal rounded up.
#[derive(Debug, Clone)]
pub struct HoughAccumulator {
    votes: Vec<u32>,
    thetas: Vec<f64>,
    cos_sin: Vec<(f64, f64)>,
    diag: usize,
}

impl HoughAccumulator {
    /// Create an empty accumulator for an image of the given size.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidParameter`] if the angle step is not positive.
    pub fn new(size: ImageSize, angle_step_deg: f64) -> Result<Self, ImageError> {
        if angle_step_deg.is_nan() || angle_step_deg <= 0.0 {
            return Err(ImageError::InvalidParameter(format!(
                "hough angle step must be positive, got {angle_step_deg}"
            )));
        }

        let (w, h) = (size.width as f64, size.height as f64);
        let diag = (h * h + w * w).sqrt().ceil() as usize;

        let num_thetas = (180.0 / angle_step_deg).ceil() as usize;
        let thetas = (0..num_thetas)
            .map(|i| (-90.0 + i as f64 * angle_step_deg).to_radians())
            .collect::<Vec<_>>();
        let cos_sin = thetas.iter().map(|t| (t.cos(), t.sin())).collect();

        Ok(Self {
            votes: vec![0; 2 * diag * num_thetas],
            thetas,
            cos_sin,
            diag,
        })
    }

    /// Number of distance buckets.
    pub fn num_rhos(&self) -> usize {
        2 * self.diag
    }

    /// Number of angle buckets.
    pub fn num_thetas(&self) -> usize {
        self.thetas.len()
    }

    /// The angle of a bucket in radians.
    pub fn theta(&self, theta_idx: usize) -> Option<f64> {
        self.thetas.get(theta_idx).copied()
    }

    /// The distance of a bucket, sampled evenly from `-diag` to `diag` inclusive.
    pub fn rho(&self, rho_idx: usize) -> Option<f64> {
        let n = self.num_rhos();
        if rho_idx >= n {
            return None;
        }

        let diag = self.diag as f64;
        if rho_idx == n - 1 {
            return Some(diag);
        }

        let step = 2.0 * diag / (n - 1) as f64;
        Some(-diag + rho_idx as f64 * step)
    }

    /// The number of votes of a bucket.
    pub fn votes(&self, rho_idx: usize, theta_idx: usize) -> Option<u32> {
        if rho_idx >= self.num_rhos() || theta_idx >= self.num_thetas() {
            return None;
        }
        Some(self.votes[rho_idx * self.num_thetas() + theta_idx])
    }

    /// Add the votes of every nonzero pixel of an edge mask.
    ///
    /// Each pixel votes once per angle for the bucket `round(x cos + y sin) + diag`,
    /// rounding half to even. Votes falling outside of the table are dropped.
    pub fn accumulate(&mut self, edges: &Image<u8, 1>) {
        let cols = edges.cols();
        let points = edges
            .as_slice()
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0)
            .map(|(i, _)| ((i % cols) as f64, (i / cols) as f64))
            .collect::<Vec<_>>();

        let num_rhos = self.num_rhos() as i64;
        let diag = self.diag as i64;

        // every angle owns one column of the table, so columns are filled independently
        let columns = self
            .cos_sin
            .par_iter()
            .map(|&(cos, sin)| {
                let mut column = vec![0u32; num_rhos as usize];
                for &(x, y) in &points {
                    let idx = (x * cos + y * sin).round_ties_even() as i64 + diag;
                    if (0..num_rhos).contains(&idx) {
                        column[idx as usize] += 1;
                    }
                }
                column
            })
            .collect::<Vec<_>>();

        let num_thetas = self.num_thetas();
        for (theta_idx, column) in columns.iter().enumerate() {
            for (rho_idx, &count) in column.iter().enumerate() {
                self.votes[rho_idx * num_thetas + theta_idx] += count;
            }
        }

        log::debug!(
            "hough: {} edge pixels voted over {}x{} buckets",
            points.len(),
            self.num_rhos(),
            num_thetas
        );
    }

    /// Every bucket with at least `threshold` votes, rho major and theta minor.
    pub fn lines(&self, threshold: u32) -> Vec<Line> {
        let num_thetas = self.num_thetas();
        let mut lines = Vec::new();
        for rho_idx in 0..self.num_rhos() {
            for theta_idx in 0..num_thetas {
                let votes = self.votes[rho_idx * num_thetas + theta_idx];
                if votes < threshold {
                    continue;
                }
                if let (Some(rho), Some(theta)) = (self.rho(rho_idx), self.theta(theta_idx)) {
                    lines.push(Line { rho, theta, votes });
                }
            }
        }
        lines
    }
}

/// Detect straight lines in an edge mask with the standard hough transform.
///
/// Every bucket that collects at least `vote_threshold` votes is reported, without
/// merging neighbouring buckets, so a single image line usually yields several
/// nearly identical entries.
///
/// # Arguments
///
/// * `edges` - The edge mask, every nonzero pixel votes.
/// * `angle_step_deg` - The angle resolution in degrees.
/// * `vote_threshold` - The minimum number of votes of a reported line.
/// * `min_line_length` - Unused by the detection, applied when drawing.
/// * `max_line_gap` - Accepted for interface compatibility, has no effect.
///
/// # Errors
///
/// Returns an error if the angle step is not positive.
pub fn hough_lines(
    edges: &Image<u8, 1>,
    angle_step_deg: f64,
    vote_threshold: u32,
    min_line_length: f64,
    max_line_gap: f64,
) -> Result<Vec<Line>, ImageError> {
    let mut accumulator = HoughAccumulator::new(edges.size(), angle_step_deg)?;
    accumulator.accumulate(edges);
    let lines = accumulator.lines(vote_threshold);

    log::debug!(
        "hough: {} lines with at least {vote_threshold} votes \
         (min_line_length={min_line_length}, max_line_gap={max_line_gap} ignored)",
        lines.len()
    );

    Ok(lines)
}

/// The two end points drawn for a line, `LINE_HALF_LENGTH` away from the foot of its
/// normal on either side, truncated to integers.
fn line_endpoints(line: &Line) -> ((i64, i64), (i64, i64)) {
    let (a, b) = (line.theta.cos(), line.theta.sin());
    let (x0, y0) = (a * line.rho, b * line.rho);

    let p1 = (
        (x0 + LINE_HALF_LENGTH * -b) as i64,
        (y0 + LINE_HALF_LENGTH * a) as i64,
    );
    let p2 = (
        (x0 - LINE_HALF_LENGTH * -b) as i64,
        (y0 - LINE_HALF_LENGTH * a) as i64,
    );

    (p1, p2)
}

/// Draw detected lines in pure green on a copy of an RGB image.
///
/// Lines whose projected segment is shorter than `min_length` are skipped. The segment
/// is walked with Bresenham's algorithm and clipped to the image.
///
/// # Arguments
///
/// * `src` - The input RGB image.
/// * `lines` - The lines to draw.
/// * `min_length` - The minimum length of a drawn segment.
/// * `dst` - The output RGB image.
pub fn draw_hough_lines(
    src: &Image<u8, 3>,
    lines: &[Line],
    min_length: f64,
    dst: &mut Image<u8, 3>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    dst.as_slice_mut().copy_from_slice(src.as_slice());

    for line in lines {
        let (p1, p2) = line_endpoints(line);
        let length = (((p2.0 - p1.0).pow(2) + (p2.1 - p1.1).pow(2)) as f64).sqrt();
        if length < min_length {
            continue;
        }
        draw::draw_line(dst, p1, p2, LINE_COLOR);
    }

    Ok(())
}
