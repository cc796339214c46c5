use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

fn check_range<T>(name: &'static str, value: T, min: T, max: T) -> Result<(), Error>
where
    T: PartialOrd + Display + Copy,
{
    if value >= min && value <= max {
        return Ok(());
    }
    Err(Error::InvalidParameter {
        name,
        reason: format!("{value} is outside [{min}, {max}]"),
    })
}

fn check_open_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), Error> {
    if value > min && value < max {
        return Ok(());
    }
    Err(Error::InvalidParameter {
        name,
        reason: format!("{value} is outside ({min}, {max})"),
    })
}

fn check_left_open_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), Error> {
    if value > min && value <= max {
        return Ok(());
    }
    Err(Error::InvalidParameter {
        name,
        reason: format!("{value} is outside ({min}, {max}]"),
    })
}

/// Thresholds of the edge detector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeParams {
    /// The weak threshold on the normalized gradient magnitude.
    pub low: u32,
    /// The strong threshold on the normalized gradient magnitude.
    pub high: u32,
    /// Whether weak pixels next to strong ones are kept.
    pub use_hysteresis: bool,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            low: 50,
            high: 150,
            use_hysteresis: true,
        }
    }
}

impl EdgeParams {
    /// Check that both thresholds are in [0, 255].
    pub fn validate(&self) -> Result<(), Error> {
        check_range("edges.low", self.low, 0, 255)?;
        check_range("edges.high", self.high, 0, 255)?;
        Ok(())
    }

    /// The thresholds as 8-bit values, saturating above 255.
    pub fn thresholds(&self) -> (u8, u8) {
        let clamp = |v: u32| v.min(u8::MAX as u32) as u8;
        (clamp(self.low), clamp(self.high))
    }
}

/// Parameters of the Hough line detector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughParams {
    /// The angle resolution in degrees.
    pub angle_step: f64,
    /// The minimum number of votes of a line.
    pub vote_threshold: u32,
    /// Lines drawn shorter than this are skipped.
    pub min_line_length: f64,
    /// Accepted for compatibility, not used by the detector.
    pub max_line_gap: f64,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            angle_step: 1.0,
            vote_threshold: 80,
            min_line_length: 50.0,
            max_line_gap: 10.0,
        }
    }
}

impl HoughParams {
    /// Check the parameters against the ranges of the line detector.
    pub fn validate(&self) -> Result<(), Error> {
        check_range("lines.angle_step", self.angle_step, 1.0, 10.0)?;
        check_range("lines.vote_threshold", self.vote_threshold, 1, 500)?;
        check_range("lines.min_line_length", self.min_line_length, 10.0, 500.0)?;
        check_range("lines.max_line_gap", self.max_line_gap, 0.0, f64::INFINITY)?;
        Ok(())
    }
}

/// Parameters of the Harris corner detector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarrisParams {
    /// The fraction of the maximum response a corner must exceed.
    pub threshold: f32,
    /// The size of the non-maximum suppression window.
    pub min_distance: usize,
    /// The sensitivity of the response.
    pub k: f32,
}

impl Default for HarrisParams {
    fn default() -> Self {
        Self {
            threshold: 0.01,
            min_distance: 10,
            k: imlab_imgproc::corners::DEFAULT_HARRIS_K,
        }
    }
}

impl HarrisParams {
    /// Check the parameters against the ranges of the corner detector.
    pub fn validate(&self) -> Result<(), Error> {
        check_range("points.threshold", self.threshold, 0.001, 0.1)?;
        check_range("points.min_distance", self.min_distance, 1, 50)?;
        check_open_range("points.k", self.k as f64, 0.0, 0.25)?;
        Ok(())
    }
}

/// The contrast stage of the workbench.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContrastMode {
    /// Keep the image as it is.
    #[default]
    Original,
    /// Stretch every channel to the full range.
    LinearStretch,
    /// Equalize the grayscale image and replicate it to RGB.
    EqualizeGray,
    /// Equalize every RGB channel independently.
    EqualizeRgb,
    /// Equalize the value channel in HSV space.
    EqualizeHsv,
}

/// The segmentation stage of the workbench.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Segmentation {
    /// No segmentation.
    #[default]
    None,
    /// Overlay detected edges in blue.
    Edges(EdgeParams),
    /// Draw detected lines in green.
    Lines(HoughParams),
    /// Draw detected corners as red crosses.
    Points(HarrisParams),
}

/// Settings of a workbench run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbenchParams {
    /// The contrast stage.
    pub contrast: ContrastMode,
    /// The segmentation stage.
    pub segmentation: Segmentation,
}

impl WorkbenchParams {
    /// Check the parameters of the selected segmentation.
    pub fn validate(&self) -> Result<(), Error> {
        match &self.segmentation {
            Segmentation::None => Ok(()),
            Segmentation::Edges(p) => p.validate(),
            Segmentation::Lines(p) => p.validate(),
            Segmentation::Points(p) => p.validate(),
        }
    }
}

/// Parameters of the synthetic degradations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DegradeParams {
    /// The standard deviation of the additive gaussian noise.
    pub noise_sigma: f64,
    /// The side of the gaussian blur kernel.
    pub blur_kernel_size: usize,
    /// The standard deviation of the gaussian blur.
    pub blur_sigma: f64,
    /// The contrast factor around mid gray.
    pub contrast_factor: f32,
    /// The intensity factor of the dark variant.
    pub dark_factor: f32,
    /// The intensity factor of the overexposed variant.
    pub overexpose_factor: f32,
    /// Seed of the noise generator. The noise differs between runs when unset.
    pub seed: Option<u64>,
}

impl Default for DegradeParams {
    fn default() -> Self {
        Self {
            noise_sigma: 30.0,
            blur_kernel_size: 15,
            blur_sigma: 2.5,
            contrast_factor: 0.4,
            dark_factor: 0.3,
            overexpose_factor: 2.0,
            seed: None,
        }
    }
}

impl DegradeParams {
    /// Check the parameters against the ranges of the degradations.
    pub fn validate(&self) -> Result<(), Error> {
        check_left_open_range("noise_sigma", self.noise_sigma, 0.0, 100.0)?;
        check_range("blur_kernel_size", self.blur_kernel_size, 3, 31)?;
        if self.blur_kernel_size % 2 == 0 {
            return Err(Error::InvalidParameter {
                name: "blur_kernel_size",
                reason: format!("{} is not odd", self.blur_kernel_size),
            });
        }
        check_left_open_range("blur_sigma", self.blur_sigma, 0.0, 10.0)?;
        check_left_open_range("contrast_factor", self.contrast_factor as f64, 0.0, 1.0)?;
        check_open_range("dark_factor", self.dark_factor as f64, 0.0, 1.0)?;
        check_left_open_range("overexpose_factor", self.overexpose_factor as f64, 1.0, 5.0)?;
        Ok(())
    }
}
