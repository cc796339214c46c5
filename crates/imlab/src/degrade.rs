use std::path::{Path, PathBuf};

use imlab_image::Image;
use imlab_imgproc::{enhance, filter, noise};
use imlab_io::{functional as io, IoError};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::params::DegradeParams;
use crate::{CancellationToken, Error};

/// The kinds of degradation, in the order they are generated. The names are used as
/// file name suffixes.
pub const DEGRADATIONS: [&str; 5] = ["noisy", "blurred", "low_contrast", "dark", "overexposed"];

/// The five degraded variants of an image.
#[derive(Clone, Debug)]
pub struct DegradedImages {
    /// The image with additive gaussian noise.
    pub noisy: Image<u8, 3>,
    /// The gaussian blurred image.
    pub blurred: Image<u8, 3>,
    /// The image with its contrast reduced around mid gray.
    pub low_contrast: Image<u8, 3>,
    /// The darkened image.
    pub dark: Image<u8, 3>,
    /// The overexposed image.
    pub overexposed: Image<u8, 3>,
}

impl DegradedImages {
    /// The variants paired with their names from [`DEGRADATIONS`].
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Image<u8, 3>)> {
        DEGRADATIONS.into_iter().zip([
            &self.noisy,
            &self.blurred,
            &self.low_contrast,
            &self.dark,
            &self.overexposed,
        ])
    }
}

/// Generate the degraded variants of an image.
///
/// # Arguments
///
/// * `image` - The input RGB image.
/// * `params` - The strength of every degradation.
/// * `rng` - The random number generator of the noise.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if the parameters are out of range.
pub fn degrade_image<R: Rng + ?Sized>(
    image: &Image<u8, 3>,
    params: &DegradeParams,
    rng: &mut R,
) -> Result<DegradedImages, Error> {
    params.validate()?;

    let new_image = || Image::<u8, 3>::from_size_val(image.size(), 0);

    let mut noisy = new_image()?;
    noise::add_gaussian_noise(image, &mut noisy, params.noise_sigma, rng)?;

    let mut blurred = new_image()?;
    filter::gaussian_blur_u8(image, &mut blurred, params.blur_kernel_size, params.blur_sigma)?;

    let mut low_contrast = new_image()?;
    enhance::reduce_contrast(image, &mut low_contrast, params.contrast_factor)?;

    let mut dark = new_image()?;
    enhance::scale_intensity(image, &mut dark, params.dark_factor)?;

    let mut overexposed = new_image()?;
    enhance::scale_intensity(image, &mut overexposed, params.overexpose_factor)?;

    Ok(DegradedImages {
        noisy,
        blurred,
        low_contrast,
        dark,
        overexposed,
    })
}

/// The result of processing one input file.
#[derive(Clone, Debug, PartialEq)]
pub enum FileOutcome {
    /// All variants were written.
    Processed {
        /// The input file.
        input: PathBuf,
        /// The written files, in the order of [`DEGRADATIONS`].
        outputs: Vec<PathBuf>,
    },
    /// The file was skipped.
    Failed {
        /// The input file.
        input: PathBuf,
        /// Why the file was skipped.
        error: String,
    },
}

impl FileOutcome {
    /// The input file of the outcome.
    pub fn input(&self) -> &Path {
        match self {
            FileOutcome::Processed { input, .. } | FileOutcome::Failed { input, .. } => input,
        }
    }
}

/// Summary of a batch run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    /// One outcome per visited input file, in processing order.
    pub outcomes: Vec<FileOutcome>,
    /// Whether the run stopped early because it was cancelled.
    pub cancelled: bool,
}

impl BatchReport {
    /// The number of files whose variants were all written.
    pub fn num_processed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Processed { .. }))
            .count()
    }

    /// The number of skipped files.
    pub fn num_failed(&self) -> usize {
        self.outcomes.len() - self.num_processed()
    }
}

/// The output path of a degraded variant: `{stem}_{degradation}.jpg` in `output_dir`.
pub fn output_path(output_dir: &Path, input: &Path, degradation: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    output_dir.join(format!("{stem}_{degradation}.jpg"))
}

fn process_file<R: Rng + ?Sized>(
    input: &Path,
    output_dir: &Path,
    params: &DegradeParams,
    rng: &mut R,
) -> Result<Vec<PathBuf>, Error> {
    let image = io::read_image_rgb8(input)?;
    let degraded = degrade_image(&image, params, rng)?;

    let mut outputs = Vec::with_capacity(DEGRADATIONS.len());
    for (name, variant) in degraded.iter() {
        let path = output_path(output_dir, input, name);
        if let Err(e) = io::write_image_rgb8(&path, variant) {
            remove_outputs(&outputs);
            return Err(e.into());
        }
        outputs.push(path);
    }

    Ok(outputs)
}

/// Delete the variants already written for a file that failed half way.
fn remove_outputs(outputs: &[PathBuf]) {
    for path in outputs {
        if let Err(e) = std::fs::remove_file(path) {
            log::warn!("failed to remove partial output {}: {e}", path.display());
        }
    }
}

/// Write the degraded variants of every image of a directory.
///
/// The images of `input_dir` (see [`imlab_io::functional::list_images`]) are processed
/// in path order. For each of them the five variants of [`DEGRADATIONS`] are written as
/// JPEG files to `output_dir`, which is created if needed. Files that cannot be read or
/// written are logged and reported as [`FileOutcome::Failed`]; the batch continues with
/// the next file. Variants already written for a failed file are removed.
///
/// The cancellation token is checked between files. A cancelled run returns the
/// outcomes gathered so far.
///
/// # Arguments
///
/// * `input_dir` - The directory to read the images from.
/// * `output_dir` - The directory to write the variants to.
/// * `params` - The strength of every degradation.
/// * `cancel` - The cancellation token.
///
/// # Errors
///
/// Returns an error if the parameters are invalid, the input directory cannot be listed
/// or the output directory cannot be created.
pub fn run_batch(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    params: &DegradeParams,
    cancel: &CancellationToken,
) -> Result<BatchReport, Error> {
    let (input_dir, output_dir) = (input_dir.as_ref(), output_dir.as_ref());
    params.validate()?;

    let files = io::list_images(input_dir, || cancel.is_cancelled())?;
    std::fs::create_dir_all(output_dir).map_err(IoError::from)?;

    log::info!(
        "degrading {} images from {} into {}",
        files.len(),
        input_dir.display(),
        output_dir.display()
    );

    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut report = BatchReport::default();
    for (i, input) in files.iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }

        match process_file(input, output_dir, params, &mut rng) {
            Ok(outputs) => {
                log::info!("[{}/{}] processed {}", i + 1, files.len(), input.display());
                report.outcomes.push(FileOutcome::Processed {
                    input: input.clone(),
                    outputs,
                });
            }
            Err(e) => {
                log::warn!("skipping {}: {e}", input.display());
                report.outcomes.push(FileOutcome::Failed {
                    input: input.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    report.cancelled = cancel.is_cancelled();
    if report.cancelled {
        log::info!(
            "batch cancelled after {} of {} files",
            report.outcomes.len(),
            files.len()
        );
    } else {
        log::info!(
            "batch done: {} processed, {} failed",
            report.num_processed(),
            report.num_failed()
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degrade_image() -> Result<(), Error> {
        let image = Image::<u8, 3>::from_size_val([20, 10].into(), 100)?;
        let params = DegradeParams::default();

        let degraded = degrade_image(&image, &params, &mut StdRng::seed_from_u64(0))?;

        // flat input: blur keeps it up to rounding, the intensity changes are exact
        assert!(degraded.blurred.as_slice().iter().all(|&v| v == 99 || v == 100));
        assert!(degraded.low_contrast.as_slice().iter().all(|&v| v == 116));
        assert!(degraded.dark.as_slice().iter().all(|&v| v == 30));
        assert!(degraded.overexposed.as_slice().iter().all(|&v| v == 200));
        assert_ne!(degraded.noisy, image);

        let names = degraded.iter().map(|(name, _)| name).collect::<Vec<_>>();
        assert_eq!(names, DEGRADATIONS);

        Ok(())
    }

    #[test]
    fn test_degrade_image_invalid_params() -> Result<(), Error> {
        let image = Image::<u8, 3>::from_size_val([4, 4].into(), 0)?;
        let params = DegradeParams {
            blur_kernel_size: 2,
            ..Default::default()
        };

        let res = degrade_image(&image, &params, &mut StdRng::seed_from_u64(0));
        assert!(matches!(res, Err(Error::InvalidParameter { .. })));

        Ok(())
    }

    #[test]
    fn test_output_path() {
        let path = output_path(Path::new("out"), Path::new("in/photo.final.png"), "dark");
        assert_eq!(path, Path::new("out/photo.final_dark.jpg"));
    }
}
