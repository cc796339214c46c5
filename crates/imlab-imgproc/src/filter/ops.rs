use imlab_image::{ops, Image, ImageError};

use super::{convolve2d, convolve2d_channels, kernels, BorderMode};

/// Blur an 8-bit image with a square gaussian kernel.
///
/// Each channel is correlated with [`kernels::gaussian_kernel_2d`] using a replicated
/// border, so flat borders do not darken. The result is clipped to `[0, 255]` and
/// truncated.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The size of the kernel, must be odd.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn gaussian_blur_u8<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    kernel_size: usize,
    sigma: f64,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let kernel = kernels::gaussian_kernel_2d(kernel_size, sigma)?;

    let src_f64 = src.cast::<f64>()?;
    let mut blurred = Image::<f64, C>::from_size_val(src.size(), 0.0)?;
    convolve2d_channels(&src_f64, &mut blurred, &kernel, BorderMode::Replicate)?;

    ops::clip_to_u8(&blurred, dst)
}

/// Compute the sobel derivatives of a single channel image.
///
/// The 3x3 sobel kernels are correlated with the image using a zero border.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, 1).
/// * `gx` - The horizontal derivative with shape (H, W, 1).
/// * `gy` - The vertical derivative with shape (H, W, 1).
pub fn sobel_gradients(
    src: &Image<f32, 1>,
    gx: &mut Image<f32, 1>,
    gy: &mut Image<f32, 1>,
) -> Result<(), ImageError> {
    let (kernel_x, kernel_y) = kernels::sobel_kernels_3x3::<f32>()?;
    convolve2d(src, gx, &kernel_x, BorderMode::Zero)?;
    convolve2d(src, gy, &kernel_y, BorderMode::Zero)?;
    Ok(())
}
