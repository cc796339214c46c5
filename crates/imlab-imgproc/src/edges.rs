use imlab_image::{Image, ImageError};
use rayon::prelude::*;

use crate::{color, filter, parallel};

/// Value of an edge pixel in an edge mask.
pub const EDGE: u8 = 255;

/// Compute the normalized sobel gradient magnitude of a grayscale image.
///
/// The image is correlated with the 3x3 sobel kernels using a zero border and the
/// magnitude `hypot(gx, gy)` is rescaled so that its maximum maps to 255, then
/// truncated. An image without any gradient produces an all-zero result.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output magnitude image.
///
/// # Errors
///
/// Returns an error if the sizes of `src` and `dst` do not match.
pub fn sobel_magnitude_u8(src: &Image<u8, 1>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let src_f32 = src.cast::<f32>()?;
    let mut gx = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
    let mut gy = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
    filter::sobel_gradients(&src_f32, &mut gx, &mut gy)?;

    let magnitude = gx
        .as_slice()
        .par_iter()
        .zip(gy.as_slice().par_iter())
        .map(|(&x, &y)| x.hypot(y))
        .collect::<Vec<_>>();
    let magnitude = Image::<f32, 1>::new(src.size(), magnitude)?;

    let max = magnitude
        .as_slice()
        .par_iter()
        .copied()
        .reduce(|| 0.0, f32::max);

    if max == 0.0 {
        dst.as_slice_mut().fill(0);
        return Ok(());
    }

    parallel::par_iter_rows_val(&magnitude, dst, |&m, out| {
        *out = (m / max * 255.0) as u8;
    });

    Ok(())
}

/// Detect edges in an 8-bit image.
///
/// The image is reduced to grayscale (single channel inputs are used as they are) and
/// its normalized sobel magnitude is thresholded:
///
/// * pixels with magnitude `>= high` are strong edges and always kept,
/// * with `use_hysteresis` and `low < high`, weak pixels with magnitude in
///   `[low, high)` become edges when a strong pixel lies in their 3x3 neighbourhood.
///   The linking is a single pass and only considers pixels off the image border,
/// * otherwise every pixel with magnitude `>= low` is an edge as well, so with
///   `low > high` the mask is `magnitude >= high`.
///
/// # Arguments
///
/// * `src` - The input image with 1 or 3 channels.
/// * `low` - The weak threshold.
/// * `high` - The strong threshold.
/// * `use_hysteresis` - Whether to link weak pixels to strong ones.
///
/// # Returns
///
/// A mask with [`EDGE`] on edge pixels and zero elsewhere.
///
/// # Errors
///
/// Returns [`ImageError::UnsupportedChannels`] for images that are neither gray nor RGB.
///
/// # Example
///
/// ```
/// use imlab_image::Image;
/// use imlab_imgproc::edges::detect_edges;
///
/// let image = Image::<u8, 3>::from_size_val([8, 8].into(), 0).unwrap();
/// let edges = detect_edges(&image, 50, 150, true).unwrap();
///
/// assert!(edges.as_slice().iter().all(|&v| v == 0));
/// ```
pub fn detect_edges<const C: usize>(
    src: &Image<u8, C>,
    low: u8,
    high: u8,
    use_hysteresis: bool,
) -> Result<Image<u8, 1>, ImageError> {
    let gray = color::gray_from_image_u8(src)?;

    let mut magnitude = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    sobel_magnitude_u8(&gray, &mut magnitude)?;

    let mut edges = Image::<u8, 1>::from_size_val(src.size(), 0)?;

    if !(use_hysteresis && low < high) {
        parallel::par_iter_rows_val(&magnitude, &mut edges, |&m, out| {
            *out = if m >= high || m >= low { EDGE } else { 0 };
        });
        return Ok(edges);
    }

    let (rows, cols) = (magnitude.rows(), magnitude.cols());
    let mag = magnitude.as_slice();
    let is_strong = |y: usize, x: usize| mag[y * cols + x] >= high;

    parallel::par_rows_mut(&mut edges, |y, row| {
        for (x, out) in row.iter_mut().enumerate() {
            let m = mag[y * cols + x];
            if m >= high {
                *out = EDGE;
                continue;
            }

            let interior = y >= 1 && y + 1 < rows && x >= 1 && x + 1 < cols;
            if interior && m >= low {
                let linked = (y - 1..=y + 1)
                    .any(|ny| (x - 1..=x + 1).any(|nx| is_strong(ny, nx)));
                if linked {
                    *out = EDGE;
                }
            }
        }
    });

    log::debug!(
        "detected {} edge pixels (low={low}, high={high})",
        edges.as_slice().iter().filter(|&&v| v == EDGE).count()
    );

    Ok(edges)
}

/// Paint the edge pixels of a mask in pure blue on top of an RGB image.
///
/// # Arguments
///
/// * `src` - The input RGB image.
/// * `edges` - The edge mask, pixels equal to [`EDGE`] are painted.
/// * `dst` - The output RGB image.
pub fn overlay_edges(
    src: &Image<u8, 3>,
    edges: &Image<u8, 1>,
    dst: &mut Image<u8, 3>,
) -> Result<(), ImageError> {
    if src.size() != edges.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            edges.cols(),
            edges.rows(),
        ));
    }

    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    dst.as_slice_mut()
        .par_chunks_exact_mut(3)
        .zip(src.as_slice().par_chunks_exact(3))
        .zip(edges.as_slice().par_iter())
        .for_each(|((out, pixel), &edge)| {
            if edge == EDGE {
                out.copy_from_slice(&[0, 0, 255]);
            } else {
                out.copy_from_slice(pixel);
            }
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_image() -> Result<Image<u8, 1>, ImageError> {
        #[rustfmt::skip]
        let image = Image::new([4, 4].into(), vec![
            0, 0, 255, 255,
            0, 0, 255, 255,
            0, 0, 255, 255,
            0, 0, 255, 255,
        ])?;
        Ok(image)
    }

    #[test]
    fn test_sobel_magnitude_u8() -> Result<(), ImageError> {
        let mut magnitude = Image::<u8, 1>::from_size_val([4, 4].into(), 0)?;
        sobel_magnitude_u8(&step_image()?, &mut magnitude)?;

        // the zero border adds a second response on the right side of the image
        #[rustfmt::skip]
        assert_eq!(magnitude.as_slice(), &[
            0, 190, 255, 255,
            0, 240, 240, 240,
            0, 240, 240, 240,
            0, 190, 255, 255,
        ]);

        Ok(())
    }

    #[test]
    fn test_sobel_magnitude_u8_flat() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val([5, 3].into(), 0)?;
        let mut magnitude = Image::<u8, 1>::from_size_val(image.size(), 7)?;

        sobel_magnitude_u8(&image, &mut magnitude)?;
        assert!(magnitude.as_slice().iter().all(|&v| v == 0));

        Ok(())
    }

    #[test]
    fn test_detect_edges_step() -> Result<(), ImageError> {
        let edges = detect_edges(&step_image()?, 50, 100, true)?;

        for y in 0..4 {
            assert_eq!(edges.get_pixel(0, y, 0)?, 0);
            assert_eq!(edges.get_pixel(1, y, 0)?, EDGE);
            assert_eq!(edges.get_pixel(2, y, 0)?, EDGE);
        }

        Ok(())
    }

    #[test]
    fn test_detect_edges_low_above_high() -> Result<(), ImageError> {
        let image = step_image()?;

        // strong pixels are kept even though they are below the low threshold
        #[rustfmt::skip]
        let expected = [
            0, EDGE, EDGE, EDGE,
            0, EDGE, EDGE, EDGE,
            0, EDGE, EDGE, EDGE,
            0, EDGE, EDGE, EDGE,
        ];
        for hysteresis in [true, false] {
            let edges = detect_edges(&image, 200, 100, hysteresis)?;
            assert_eq!(edges.as_slice(), &expected, "hysteresis {hysteresis}");
        }

        // both thresholds above the 190 response of the corner columns
        #[rustfmt::skip]
        let expected = [
            0, 0,    EDGE, EDGE,
            0, EDGE, EDGE, EDGE,
            0, EDGE, EDGE, EDGE,
            0, 0,    EDGE, EDGE,
        ];
        for hysteresis in [true, false] {
            let edges = detect_edges(&image, 250, 200, hysteresis)?;
            assert_eq!(edges.as_slice(), &expected, "hysteresis {hysteresis}");
        }

        Ok(())
    }

    #[test]
    fn test_detect_edges_without_hysteresis() -> Result<(), ImageError> {
        let edges = detect_edges(&step_image()?, 200, 250, false)?;

        #[rustfmt::skip]
        assert_eq!(edges.as_slice(), &[
            0, 0,    EDGE, EDGE,
            0, EDGE, EDGE, EDGE,
            0, EDGE, EDGE, EDGE,
            0, 0,    EDGE, EDGE,
        ]);

        Ok(())
    }

    #[test]
    fn test_detect_edges_black_image() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::from_size_val([6, 5].into(), 0)?;

        for (low, high, hysteresis) in [(0, 0, false), (0, 255, true), (50, 150, true), (200, 10, true)] {
            let edges = detect_edges(&image, low, high, hysteresis)?;
            // a zero threshold accepts every pixel of the zero magnitude
            let expected = if low == 0 && !(hysteresis && low < high) { EDGE } else { 0 };
            assert!(edges.as_slice().iter().all(|&v| v == expected));
        }

        Ok(())
    }

    #[test]
    fn test_detect_edges_hysteresis() -> Result<(), ImageError> {
        // a bright dot gives its side neighbours the full magnitude and its diagonal
        // neighbours about 180
        let mut image = Image::<u8, 1>::from_size_val([7, 7].into(), 0)?;
        image.set_pixel(3, 3, 0, 255)?;

        let strong_only = detect_edges(&image, 255, 255, false)?;
        let linked = detect_edges(&image, 100, 255, true)?;
        let plain = detect_edges(&image, 100, 255, false)?;

        // linking only adds pixels next to strong ones
        for (i, ((&s, &l), &p)) in strong_only
            .as_slice()
            .iter()
            .zip(linked.as_slice())
            .zip(plain.as_slice())
            .enumerate()
        {
            if s == EDGE {
                assert_eq!(l, EDGE, "strong pixel {i} must be kept");
            }
            if l == EDGE {
                assert_eq!(p, EDGE, "linked pixel {i} must be above the low threshold");
            }
        }
        assert_eq!(strong_only.as_slice().iter().filter(|&&v| v == EDGE).count(), 4);
        assert_eq!(linked.as_slice().iter().filter(|&&v| v == EDGE).count(), 8);

        Ok(())
    }

    #[test]
    fn test_detect_edges_unsupported_channels() -> Result<(), ImageError> {
        let image = Image::<u8, 2>::from_size_val([3, 3].into(), 0)?;
        assert_eq!(
            detect_edges(&image, 50, 150, true),
            Err(ImageError::UnsupportedChannels(2))
        );
        Ok(())
    }

    #[test]
    fn test_overlay_edges() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new([2, 1].into(), vec![10, 20, 30, 40, 50, 60])?;
        let edges = Image::<u8, 1>::new([2, 1].into(), vec![0, EDGE])?;
        let mut dst = Image::<u8, 3>::from_size_val(image.size(), 0)?;

        overlay_edges(&image, &edges, &mut dst)?;
        assert_eq!(dst.as_slice(), &[10, 20, 30, 0, 0, 255]);

        Ok(())
    }
}
