use imlab_image::ImageError;
use num_traits::Float;

/// A 2D matrix of weights anchored at its center.
///
/// Both dimensions are odd so that the anchor falls on a weight.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: Copy> Kernel<T> {
    /// Create a kernel from row-major weights.
    ///
    /// # Arguments
    ///
    /// * `width` - The number of columns of the kernel.
    /// * `height` - The number of rows of the kernel.
    /// * `data` - The weights, `width * height` values in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidKernelSize`] if a dimension is even or zero, and
    /// [`ImageError::InvalidChannelShape`] if the data length does not match.
    pub fn new(width: usize, height: usize, data: Vec<T>) -> Result<Self, ImageError> {
        if width % 2 == 0 || height % 2 == 0 {
            return Err(ImageError::InvalidKernelSize(width, height));
        }

        if data.len() != width * height {
            return Err(ImageError::InvalidChannelShape(data.len(), width * height));
        }

        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Create a kernel from a fixed size 2D array.
    pub fn from_rows<const W: usize, const H: usize>(rows: [[T; W]; H]) -> Result<Self, ImageError> {
        Self::new(W, H, rows.iter().flatten().copied().collect())
    }

    /// The number of columns of the kernel.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The number of rows of the kernel.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The anchor of the kernel as `(x, y)`.
    pub fn anchor(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }

    /// The weights in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the weight at column `x` and row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }
}

/// Create a square gaussian kernel.
///
/// The weights are `exp(-(x^2 + y^2) / (2 * sigma^2))` for integer offsets
/// `x, y` in `-(size / 2)..=size / 2`, normalized to sum to one.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel, must be odd.
/// * `sigma` - The standard deviation of the gaussian.
///
/// # Errors
///
/// Returns an error if the kernel size is even or `sigma` is not positive.
///
/// # Example
///
/// ```
/// use imlab_imgproc::filter::kernels::gaussian_kernel_2d;
///
/// let kernel = gaussian_kernel_2d::<f64>(5, 1.0).unwrap();
/// let sum: f64 = kernel.as_slice().iter().sum();
///
/// assert_eq!(kernel.width(), 5);
/// assert!((sum - 1.0).abs() < 1e-12);
/// ```
pub fn gaussian_kernel_2d<T: Float>(kernel_size: usize, sigma: T) -> Result<Kernel<T>, ImageError> {
    if kernel_size % 2 == 0 {
        return Err(ImageError::InvalidKernelSize(kernel_size, kernel_size));
    }

    if sigma <= T::zero() {
        return Err(ImageError::InvalidParameter(format!(
            "gaussian sigma must be positive, got {:?}",
            sigma.to_f64()
        )));
    }

    let half = (kernel_size / 2) as isize;
    let two = T::one() + T::one();
    let denom = two * sigma * sigma;

    let mut data = Vec::with_capacity(kernel_size * kernel_size);
    for y in -half..=half {
        for x in -half..=half {
            let xf: T = cast(x)?;
            let yf: T = cast(y)?;
            data.push((-(xf * xf + yf * yf) / denom).exp());
        }
    }

    // normalize the kernel
    let norm = data.iter().fold(T::zero(), |acc, &k| acc + k);
    data.iter_mut().for_each(|k| *k = *k / norm);

    Kernel::new(kernel_size, kernel_size, data)
}

/// Create the 3x3 sobel kernels `(kx, ky)`.
///
/// `kx` responds to horizontal intensity changes and `ky` to vertical ones, with `ky`
/// positive when the image gets darker going down.
pub fn sobel_kernels_3x3<T: Float>() -> Result<(Kernel<T>, Kernel<T>), ImageError> {
    let kx = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
    let ky = [[1.0, 2.0, 1.0], [0.0, 0.0, 0.0], [-1.0, -2.0, -1.0]];

    let to_kernel = |rows: [[f64; 3]; 3]| -> Result<Kernel<T>, ImageError> {
        let data = rows
            .iter()
            .flatten()
            .map(|&v| cast(v))
            .collect::<Result<Vec<T>, ImageError>>()?;
        Kernel::new(3, 3, data)
    };

    Ok((to_kernel(kx)?, to_kernel(ky)?))
}

fn cast<T: Float, N: num_traits::ToPrimitive>(v: N) -> Result<T, ImageError> {
    T::from(v).ok_or_else(|| ImageError::CastError(std::any::type_name::<T>().to_string()))
}
