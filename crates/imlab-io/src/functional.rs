use std::path::{Path, PathBuf};

use imlab_image::{Image, ImageSize};

use crate::error::IoError;

/// File extensions, lower case, of the images the pipeline reads and writes.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// Check whether a path has one of the [`SUPPORTED_EXTENSIONS`], ignoring case.
pub fn has_image_extension(file_path: impl AsRef<Path>) -> bool {
    file_path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Reads an image from the given file path as 8-bit RGB.
///
/// The format is guessed from the file content. Grayscale, alpha and 16-bit images are
/// converted to 8-bit RGB.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An image containing the image data.
///
/// # Errors
///
/// Returns an error if the file does not exist or cannot be decoded.
pub fn read_image_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::ImageReader::open(file_path)?
        .with_guessed_format()?
        .decode()?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    log::debug!(
        "decoded {} ({:?}, {}x{})",
        file_path.display(),
        img.color(),
        size.width,
        size.height
    );

    let image = Image::<u8, 3>::new(size, img.into_rgb8().into_raw())?;

    Ok(image)
}

fn write_image<const C: usize>(
    file_path: &Path,
    image: &Image<u8, C>,
    color_type: image::ExtendedColorType,
) -> Result<(), IoError> {
    if !has_image_extension(file_path) {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let [width, height]: [u32; 2] = image.size().into();
    image::save_buffer(file_path, image.as_slice(), width, height, color_type)
        .map_err(|e| IoError::ImageEncodeError(file_path.to_path_buf(), e))?;

    Ok(())
}

/// Writes an RGB8 image to the given file path.
///
/// The format is chosen from the file extension, one of [`SUPPORTED_EXTENSIONS`].
///
/// # Arguments
///
/// * `file_path` - The path to the output image.
/// * `image` - The image to write.
pub fn write_image_rgb8(file_path: impl AsRef<Path>, image: &Image<u8, 3>) -> Result<(), IoError> {
    write_image(file_path.as_ref(), image, image::ExtendedColorType::Rgb8)
}

/// Writes a grayscale image to the given file path.
///
/// The format is chosen from the file extension, one of [`SUPPORTED_EXTENSIONS`].
///
/// # Arguments
///
/// * `file_path` - The path to the output image.
/// * `image` - The image to write.
pub fn write_image_mono8(file_path: impl AsRef<Path>, image: &Image<u8, 1>) -> Result<(), IoError> {
    write_image(file_path.as_ref(), image, image::ExtendedColorType::L8)
}

/// Collect the image files of a directory.
///
/// Only regular files with one of the [`SUPPORTED_EXTENSIONS`] are returned, sorted by
/// path. Subdirectories are not visited.
///
/// `is_cancelled` is polled before every directory entry. Once it returns `true` the
/// scan stops and the files found so far are returned.
///
/// # Arguments
///
/// * `dir` - The directory to scan.
/// * `is_cancelled` - The cancellation check.
///
/// # Errors
///
/// Returns an error if the directory does not exist or cannot be read.
pub fn list_images(
    dir: impl AsRef<Path>,
    is_cancelled: impl Fn() -> bool,
) -> Result<Vec<PathBuf>, IoError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(IoError::FileDoesNotExist(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        if is_cancelled() {
            log::info!("directory scan of {} cancelled", dir.display());
            break;
        }

        let path = entry?.path();
        if path.is_file() && has_image_extension(&path) {
            files.push(path);
        }
    }

    files.sort();

    Ok(files)
}
