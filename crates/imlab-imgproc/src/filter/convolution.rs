use imlab_image::{Image, ImageError};
use num_traits::Float;

use super::Kernel;
use crate::parallel;

/// A border type for sampling outside of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// Fill the border with zeros.
    ///
    /// Example: 0 0 | a b c d | 0 0
    #[default]
    Zero,

    /// Repeat the outermost row or column of pixels into the border.
    ///
    /// Example: a a | a b c d | d d
    Replicate,
}

impl BorderMode {
    /// Maps index `i` to a valid index within `[0, len)`, or `None` when the sample
    /// falls in a zero border.
    #[inline]
    pub fn map_index(&self, i: isize, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        match self {
            BorderMode::Zero => {
                if i < 0 || i >= len as isize {
                    None
                } else {
                    Some(i as usize)
                }
            }
            BorderMode::Replicate => Some(i.clamp(0, len as isize - 1) as usize),
        }
    }
}

/// Correlate a single channel image with a kernel.
///
/// Computes `dst[i, j] = sum(kernel[dy, dx] * padded[i + dy - ay, j + dx - ax])` where
/// `(ax, ay)` is the kernel anchor. The kernel is not flipped. Samples outside the image
/// are resolved with `border`.
///
/// Rows are processed in parallel. The summation order inside a pixel is fixed to the
/// kernel row-major order, so the output does not depend on the thread count.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, 1).
/// * `dst` - The destination image with shape (H, W, 1).
/// * `kernel` - The correlation kernel.
/// * `border` - How to sample outside of the image.
///
/// # Errors
///
/// Returns an error if `src` and `dst` have different sizes.
///
/// # Example
///
/// ```
/// use imlab_image::Image;
/// use imlab_imgproc::filter::{convolve2d, BorderMode, Kernel};
///
/// let src = Image::<f32, 1>::new([3, 1].into(), vec![1.0, 2.0, 3.0]).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
/// let kernel = Kernel::new(3, 1, vec![1.0, 1.0, 1.0]).unwrap();
///
/// convolve2d(&src, &mut dst, &kernel, BorderMode::Zero).unwrap();
/// assert_eq!(dst.as_slice(), &[3.0, 6.0, 5.0]);
/// ```
pub fn convolve2d<T>(
    src: &Image<T, 1>,
    dst: &mut Image<T, 1>,
    kernel: &Kernel<T>,
    border: BorderMode,
) -> Result<(), ImageError>
where
    T: Float + Send + Sync,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (rows, cols) = (src.rows(), src.cols());
    let (anchor_x, anchor_y) = kernel.anchor();
    let (kw, kh) = (kernel.width(), kernel.height());
    let weights = kernel.as_slice();
    let src_data = src.as_slice();

    parallel::par_rows_mut(dst, |row, dst_row| {
        for (col, dst_pixel) in dst_row.iter_mut().enumerate() {
            let mut sum = T::zero();
            for ky in 0..kh {
                let y = row as isize + ky as isize - anchor_y as isize;
                let Some(y) = border.map_index(y, rows) else {
                    continue;
                };
                let src_row = &src_data[y * cols..(y + 1) * cols];
                for kx in 0..kw {
                    let x = col as isize + kx as isize - anchor_x as isize;
                    if let Some(x) = border.map_index(x, cols) {
                        sum = sum + weights[ky * kw + kx] * src_row[x];
                    }
                }
            }
            *dst_pixel = sum;
        }
    });

    Ok(())
}

/// Correlate every channel of an image independently with the same kernel.
///
/// # Errors
///
/// Returns an error if `src` and `dst` have different sizes.
pub fn convolve2d_channels<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel: &Kernel<T>,
    border: BorderMode,
) -> Result<(), ImageError>
where
    T: Float + Send + Sync,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let filtered = src
        .split_channels()?
        .iter()
        .map(|channel| {
            let mut out = Image::from_size_val(channel.size(), T::zero())?;
            convolve2d(channel, &mut out, kernel, border)?;
            Ok(out)
        })
        .collect::<Result<Vec<_>, ImageError>>()?;

    *dst = Image::from_channels(&filtered)?;

    Ok(())
}
