use crate::{Image, ImageError};

/// Convert a floating point image to 8 bits, clipping to `[0, 255]` and truncating.
///
/// This is the quantization used by every stage that produces a displayable buffer.
pub fn clip_to_u8<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError>
where
    T: Copy + num_traits::Float,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    let lo = T::zero();
    let hi = T::from(255.0).ok_or(ImageError::CastError("u8".to_string()))?;

    dst.as_slice_mut()
        .iter_mut()
        .zip(src.as_slice().iter())
        .for_each(|(out, &inp)| {
            // NaN maps to 0
            *out = inp.max(lo).min(hi).to_u8().unwrap_or(0);
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_to_u8() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new([5, 1].into(), vec![-3.0, 0.9, 127.99, 255.0, 511.0])?;
        let mut out = Image::<u8, 1>::from_size_val(image.size(), 0)?;

        super::clip_to_u8(&image, &mut out)?;
        assert_eq!(out.as_slice(), &[0, 0, 127, 255, 255]);

        Ok(())
    }
}
