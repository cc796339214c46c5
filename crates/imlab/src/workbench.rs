use imlab_image::Image;
use imlab_imgproc::{color, corners, edges, enhance, histogram, hough};

use crate::params::{
    ContrastMode, EdgeParams, HarrisParams, HoughParams, Segmentation, WorkbenchParams,
};
use crate::Error;

/// Thresholds of the edge detection feeding the line detector.
const LINE_EDGE_LOW: u8 = 50;
const LINE_EDGE_HIGH: u8 = 150;

/// Run the contrast stage followed by the segmentation stage on an RGB image.
///
/// # Arguments
///
/// * `image` - The input RGB image, left untouched.
/// * `params` - The stages to run and their parameters.
///
/// # Returns
///
/// A new image of the same size.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if the segmentation parameters are out of range.
///
/// # Example
///
/// ```
/// use imlab::image::Image;
/// use imlab::params::{ContrastMode, Segmentation, WorkbenchParams};
/// use imlab::workbench;
///
/// let image = Image::<u8, 3>::from_size_val([16, 16].into(), 40).unwrap();
/// let params = WorkbenchParams {
///     contrast: ContrastMode::EqualizeRgb,
///     segmentation: Segmentation::Edges(Default::default()),
/// };
///
/// let result = workbench::apply(&image, &params).unwrap();
/// assert_eq!(result.size(), image.size());
/// ```
pub fn apply(image: &Image<u8, 3>, params: &WorkbenchParams) -> Result<Image<u8, 3>, Error> {
    params.validate()?;

    let contrasted = apply_contrast(image, params.contrast)?;

    let result = match &params.segmentation {
        Segmentation::None => contrasted,
        Segmentation::Edges(p) => overlay_edges(&contrasted, p)?,
        Segmentation::Lines(p) => draw_lines(&contrasted, p)?,
        Segmentation::Points(p) => draw_points(&contrasted, p)?,
    };

    Ok(result)
}

fn apply_contrast(image: &Image<u8, 3>, mode: ContrastMode) -> Result<Image<u8, 3>, Error> {
    log::debug!("contrast stage: {mode:?}");

    let mut dst = Image::<u8, 3>::from_size_val(image.size(), 0)?;
    match mode {
        ContrastMode::Original => dst.as_slice_mut().copy_from_slice(image.as_slice()),
        ContrastMode::LinearStretch => enhance::linear_contrast_stretch(image, &mut dst)?,
        ContrastMode::EqualizeGray => {
            let gray = color::gray_from_image_u8(image)?;
            let mut equalized = Image::<u8, 1>::from_size_val(image.size(), 0)?;
            histogram::equalize_histogram(&gray, &mut equalized)?;
            color::rgb_from_gray(&equalized, &mut dst)?;
        }
        ContrastMode::EqualizeRgb => histogram::equalize_histogram_rgb(image, &mut dst)?,
        ContrastMode::EqualizeHsv => histogram::equalize_histogram_hsv(image, &mut dst)?,
    }

    Ok(dst)
}

fn overlay_edges(image: &Image<u8, 3>, params: &EdgeParams) -> Result<Image<u8, 3>, Error> {
    let (low, high) = params.thresholds();
    let mask = edges::detect_edges(image, low, high, params.use_hysteresis)?;

    let mut dst = Image::<u8, 3>::from_size_val(image.size(), 0)?;
    edges::overlay_edges(image, &mask, &mut dst)?;

    Ok(dst)
}

fn draw_lines(image: &Image<u8, 3>, params: &HoughParams) -> Result<Image<u8, 3>, Error> {
    let mask = edges::detect_edges(image, LINE_EDGE_LOW, LINE_EDGE_HIGH, true)?;
    let lines = hough::hough_lines(
        &mask,
        params.angle_step,
        params.vote_threshold,
        params.min_line_length,
        params.max_line_gap,
    )?;

    let mut dst = Image::<u8, 3>::from_size_val(image.size(), 0)?;
    hough::draw_hough_lines(image, &lines, params.min_line_length, &mut dst)?;

    Ok(dst)
}

fn draw_points(image: &Image<u8, 3>, params: &HarrisParams) -> Result<Image<u8, 3>, Error> {
    let mask = corners::harris_corners(image, params.k, params.threshold, params.min_distance)?;

    let mut dst = Image::<u8, 3>::from_size_val(image.size(), 0)?;
    corners::draw_corner_points(image, &mask, &mut dst)?;

    Ok(dst)
}
