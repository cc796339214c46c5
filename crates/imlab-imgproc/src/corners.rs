use imlab_image::{Image, ImageError};
use rayon::prelude::*;

use crate::{color, draw, filter, parallel};

/// Value of a corner pixel in a corner mask.
pub const CORNER: u8 = 255;

/// Color used to render detected corners.
pub const CORNER_COLOR: [u8; 3] = [255, 0, 0];

/// Default sensitivity of the harris response.
pub const DEFAULT_HARRIS_K: f32 = 0.04;

const STRUCTURE_KERNEL_SIZE: usize = 5;
const STRUCTURE_SIGMA: f64 = 1.0;
const CROSS_HALF_SIZE: i64 = 3;

/// Compute the harris response of a grayscale image.
///
/// The gradients are central differences, one along the rows and one along the columns,
/// and are zero on the first and last row (respectively column). The structure tensor
/// entries are stored in single precision and smoothed with a 5x5 gaussian (sigma 1)
/// using a zero border, each window summed in double precision. The response is
/// `det - k * trace^2`.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W).
/// * `dst` - The destination image with shape (H, W).
/// * `k` - The sensitivity of the response, usually around `0.04`.
pub fn harris_response(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    k: f32,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (rows, cols) = (src.rows(), src.cols());
    let src_data = src.as_slice();

    let mut ixx = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
    let mut iyy = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
    let mut ixy = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;

    let gradients = |y: usize, x: usize| {
        let across_rows = if y == 0 || y + 1 >= rows {
            0.0
        } else {
            src_data[(y + 1) * cols + x] - src_data[(y - 1) * cols + x]
        };
        let across_cols = if x == 0 || x + 1 >= cols {
            0.0
        } else {
            src_data[y * cols + x + 1] - src_data[y * cols + x - 1]
        };
        (across_rows, across_cols)
    };

    ixx.as_slice_mut()
        .par_chunks_exact_mut(cols.max(1))
        .zip(iyy.as_slice_mut().par_chunks_exact_mut(cols.max(1)))
        .zip(ixy.as_slice_mut().par_chunks_exact_mut(cols.max(1)))
        .enumerate()
        .for_each(|(y, ((xx_row, yy_row), xy_row))| {
            for x in 0..cols {
                let (d_rows, d_cols) = gradients(y, x);
                xx_row[x] = d_rows * d_rows;
                yy_row[x] = d_cols * d_cols;
                xy_row[x] = d_rows * d_cols;
            }
        });

    let kernel = filter::kernels::gaussian_kernel_2d(STRUCTURE_KERNEL_SIZE, STRUCTURE_SIGMA)?;
    // tensor products are stored in f32, the window sums run in f64
    let smooth = |tensor: &Image<f32, 1>| -> Result<Image<f32, 1>, ImageError> {
        let tensor = tensor.cast::<f64>()?;
        let mut out = Image::<f64, 1>::from_size_val(tensor.size(), 0.0)?;
        filter::convolve2d(&tensor, &mut out, &kernel, filter::BorderMode::Zero)?;
        Ok(out.map(|&v| v as f32))
    };
    let sxx = smooth(&ixx)?;
    let syy = smooth(&iyy)?;
    let sxy = smooth(&ixy)?;

    dst.as_slice_mut()
        .par_iter_mut()
        .zip(sxx.as_slice().par_iter())
        .zip(syy.as_slice().par_iter())
        .zip(sxy.as_slice().par_iter())
        .for_each(|(((r, &xx), &yy), &xy)| {
            let det = xx * yy - xy * xy;
            let trace = xx + yy;
            *r = det - k * trace * trace;
        });

    Ok(())
}

/// Detect corners in an 8-bit image with the harris detector.
///
/// A pixel is a corner when its response is above `threshold * max(response)` and, for a
/// positive `min_distance`, equal to the maximum response in the `min_distance` wide
/// window around it. The window spans offsets `-(n / 2)..=n - 1 - n / 2` and is clipped
/// to the image. A zero `min_distance` keeps every candidate.
///
/// # Arguments
///
/// * `src` - The input image with 1 or 3 channels.
/// * `k` - The sensitivity of the response.
/// * `threshold` - The fraction of the maximum response a corner must exceed.
/// * `min_distance` - The size of the non-maximum suppression window.
///
/// # Returns
///
/// A mask with [`CORNER`] on corner pixels and zero elsewhere. Images without any
/// positive response produce an empty mask.
///
/// # Errors
///
/// Returns [`ImageError::UnsupportedChannels`] for images that are neither gray nor RGB.
pub fn harris_corners<const C: usize>(
    src: &Image<u8, C>,
    k: f32,
    threshold: f32,
    min_distance: usize,
) -> Result<Image<u8, 1>, ImageError> {
    let gray = color::gray_from_image_u8(src)?.cast::<f32>()?;

    let mut response = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
    harris_response(&gray, &mut response, k)?;

    let max = response
        .as_slice()
        .par_iter()
        .copied()
        .reduce(|| f32::NEG_INFINITY, f32::max);
    let min_response = threshold * max;

    let (rows, cols) = (response.rows(), response.cols());
    let r = response.as_slice();
    let lo = (min_distance / 2) as isize;
    let hi = min_distance as isize - 1 - lo;

    let is_local_max = |y: usize, x: usize| {
        let value = r[y * cols + x];
        let y0 = (y as isize - lo).max(0) as usize;
        let y1 = ((y as isize + hi) as usize).min(rows - 1);
        let x0 = (x as isize - lo).max(0) as usize;
        let x1 = ((x as isize + hi) as usize).min(cols - 1);
        (y0..=y1).all(|ny| r[ny * cols + x0..=ny * cols + x1].iter().all(|&v| v <= value))
    };

    let mut corners = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    parallel::par_rows_mut(&mut corners, |y, row| {
        for (x, out) in row.iter_mut().enumerate() {
            let candidate = r[y * cols + x] > min_response;
            if candidate && (min_distance == 0 || is_local_max(y, x)) {
                *out = CORNER;
            }
        }
    });

    log::debug!(
        "harris: {} corners (max response {max}, threshold {threshold}, min distance {min_distance})",
        corners.as_slice().iter().filter(|&&v| v == CORNER).count()
    );

    Ok(corners)
}

/// List the nonzero pixels of a mask as `(x, y)` in row-major order.
pub fn corner_points(mask: &Image<u8, 1>) -> Vec<(usize, usize)> {
    let cols = mask.cols();
    mask.as_slice()
        .iter()
        .enumerate()
        .filter(|(_, &v)| v != 0)
        .map(|(i, _)| (i % cols, i / cols))
        .collect()
}

/// Draw a red cross, seven pixels wide, on a copy of an RGB image for every nonzero
/// pixel of a corner mask.
pub fn draw_corner_points(
    src: &Image<u8, 3>,
    mask: &Image<u8, 1>,
    dst: &mut Image<u8, 3>,
) -> Result<(), ImageError> {
    if src.size() != mask.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            mask.cols(),
            mask.rows(),
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

    dst.as_slice_mut().copy_from_slice(src.as_slice());
    for (x, y) in corner_points(mask) {
        draw::draw_cross(dst, (x as i64, y as i64), CROSS_HALF_SIZE, CORNER_COLOR);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect_image(
        width: usize,
        height: usize,
        (x0, y0): (usize, usize),
        (x1, y1): (usize, usize),
    ) -> Result<Image<u8, 1>, ImageError> {
        let mut image = Image::<u8, 1>::from_size_val([width, height].into(), 0)?;
        for y in y0..y1 {
            for x in x0..x1 {
                image.set_pixel(x, y, 0, 255)?;
            }
        }
        Ok(image)
    }

    #[test]
    fn test_harris_response_flat() -> Result<(), ImageError> {
        let src = Image::<f32, 1>::from_size_val([8, 8].into(), 100.0)?;
        let mut dst = Image::<f32, 1>::from_size_val(src.size(), 1.0)?;

        harris_response(&src, &mut dst, DEFAULT_HARRIS_K)?;
        assert!(dst.as_slice().iter().all(|&v| v == 0.0));

        Ok(())
    }

    #[test]
    fn test_harris_response_edge_vs_corner() -> Result<(), ImageError> {
        let image = rect_image(30, 30, (15, 15), (30, 30))?.cast::<f32>()?;
        let mut response = Image::<f32, 1>::from_size_val(image.size(), 0.0)?;

        harris_response(&image, &mut response, DEFAULT_HARRIS_K)?;

        // positive at the corner, negative along a straight edge
        assert!(response.get_pixel(15, 15, 0)? > 0.0);
        assert!(response.get_pixel(15, 25, 0)? < 0.0);

        Ok(())
    }

    #[test]
    fn test_harris_response_matches_direct_sum() -> Result<(), ImageError> {
        let (w, h) = (9usize, 9usize);
        let data = (0..w * h)
            .map(|i| (((i % w) * 7 + (i / w) * 13) % 17) as f32 * 10.0)
            .collect::<Vec<_>>();
        let src = Image::<f32, 1>::new([w, h].into(), data.clone())?;
        let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;

        harris_response(&src, &mut dst, DEFAULT_HARRIS_K)?;

        let at = |x: usize, y: usize| data[y * w + x];
        let grad = |x: usize, y: usize| {
            let d_rows = if y == 0 || y + 1 >= h { 0.0 } else { at(x, y + 1) - at(x, y - 1) };
            let d_cols = if x == 0 || x + 1 >= w { 0.0 } else { at(x + 1, y) - at(x - 1, y) };
            (d_rows, d_cols)
        };

        let weight = |dx: i64, dy: i64| (-((dx * dx + dy * dy) as f64) / 2.0).exp();
        let norm: f64 = (-2..=2)
            .flat_map(|dy| (-2..=2).map(move |dx| (dx, dy)))
            .map(|(dx, dy)| weight(dx, dy))
            .sum();

        for (x, y) in [(4, 4), (1, 2), (0, 8)] {
            let (mut sxx, mut syy, mut sxy) = (0.0f64, 0.0f64, 0.0f64);
            for dy in -2i64..=2 {
                for dx in -2i64..=2 {
                    let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                    if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                        continue;
                    }
                    let (gr, gc) = grad(nx as usize, ny as usize);
                    let k = weight(dx, dy) / norm;
                    sxx += k * (gr * gr) as f64;
                    syy += k * (gc * gc) as f64;
                    sxy += k * (gr * gc) as f64;
                }
            }
            let (sxx, syy, sxy) = (sxx as f32, syy as f32, sxy as f32);
            let trace = sxx + syy;
            let expected = sxx * syy - sxy * sxy - DEFAULT_HARRIS_K * trace * trace;

            assert_relative_eq!(dst.get_pixel(x, y, 0)?, expected, max_relative = 1e-4);
        }

        Ok(())
    }

    #[test]
    fn test_harris_corners_single_corner() -> Result<(), ImageError> {
        let image = rect_image(30, 30, (15, 15), (30, 30))?;

        let corners = harris_corners(&image, DEFAULT_HARRIS_K, 0.01, 10)?;
        let points = corner_points(&corners);

        assert!(!points.is_empty());
        for &(x, y) in &points {
            assert!(x.abs_diff(15) <= 1 && y.abs_diff(15) <= 1, "({x}, {y})");
        }

        // without suppression the whole neighbourhood of the corner is reported
        let all = harris_corners(&image, DEFAULT_HARRIS_K, 0.01, 0)?;
        assert!(corner_points(&all).len() > points.len());

        Ok(())
    }

    #[test]
    fn test_harris_corners_rectangle() -> Result<(), ImageError> {
        let gray = rect_image(32, 30, (12, 10), (25, 20))?;
        let mut rgb = Image::<u8, 3>::from_size_val(gray.size(), 0)?;
        color::rgb_from_gray(&gray, &mut rgb)?;

        let corners = harris_corners(&rgb, DEFAULT_HARRIS_K, 0.01, 10)?;
        let points = corner_points(&corners);

        let expected = [(12, 10), (24, 10), (12, 19), (24, 19)];
        let near = |(x, y): (usize, usize), (ex, ey): (usize, usize)| {
            x.abs_diff(ex) <= 1 && y.abs_diff(ey) <= 1
        };
        for e in expected {
            assert!(points.iter().any(|&p| near(p, e)), "missing corner {e:?}");
        }
        for &p in &points {
            assert!(expected.iter().any(|&e| near(p, e)), "unexpected corner {p:?}");
        }

        Ok(())
    }

    #[test]
    fn test_harris_corners_flat() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::from_size_val([16, 12].into(), 90)?;
        let corners = harris_corners(&image, DEFAULT_HARRIS_K, 0.01, 10)?;
        assert!(corners.as_slice().iter().all(|&v| v == 0));
        Ok(())
    }

    #[test]
    fn test_draw_corner_points() -> Result<(), ImageError> {
        let src = Image::<u8, 3>::from_size_val([9, 9].into(), 0)?;
        let mut mask = Image::<u8, 1>::from_size_val(src.size(), 0)?;
        mask.set_pixel(4, 4, 0, CORNER)?;
        let mut dst = Image::<u8, 3>::from_size_val(src.size(), 0)?;

        draw_corner_points(&src, &mask, &mut dst)?;

        let red = |x: usize, y: usize| -> Result<bool, ImageError> {
            Ok([0, 1, 2]
                .iter()
                .map(|&c| dst.get_pixel(x, y, c))
                .collect::<Result<Vec<_>, _>>()?
                == CORNER_COLOR)
        };
        assert!(red(4, 4)?);
        assert!(red(1, 4)? && red(7, 4)? && red(4, 1)? && red(4, 7)?);
        assert!(!red(0, 4)? && !red(8, 4)? && !red(5, 5)?);

        Ok(())
    }
}
