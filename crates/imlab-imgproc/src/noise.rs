use imlab_image::{Image, ImageError};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Add zero mean gaussian noise to every value of an 8-bit image.
///
/// One sample is drawn per value in row-major order, so a seeded generator yields a
/// reproducible result. The noisy values are clipped to [0, 255] and truncated.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image.
/// * `sigma` - The standard deviation of the noise.
/// * `rng` - The random number generator to draw the noise from.
///
/// # Errors
///
/// Returns an error if the sizes do not match or `sigma` is negative or NaN.
///
/// # Example
///
/// ```
/// use imlab_image::Image;
/// use imlab_imgproc::noise::add_gaussian_noise;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let image = Image::<u8, 3>::from_size_val([4, 4].into(), 128).unwrap();
/// let mut noisy = Image::<u8, 3>::from_size_val(image.size(), 0).unwrap();
///
/// let mut rng = StdRng::seed_from_u64(7);
/// add_gaussian_noise(&image, &mut noisy, 30.0, &mut rng).unwrap();
/// ```
pub fn add_gaussian_noise<const C: usize, R: Rng + ?Sized>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    sigma: f64,
    rng: &mut R,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let normal = Normal::new(0.0, sigma)
        .map_err(|e| ImageError::InvalidParameter(format!("noise sigma {sigma}: {e}")))?;

    dst.as_slice_mut()
        .iter_mut()
        .zip(src.as_slice())
        .for_each(|(out, &v)| {
            let noisy = v as f32 as f64 + normal.sample(rng);
            *out = noisy.clamp(0.0, 255.0) as u8;
        });

    Ok(())
}
