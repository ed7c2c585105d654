//! Raster image I/O and geometric augmentation.
//!
//! - [`load_grayscale`]: read any supported raster into an 8-bit grey buffer.
//! - [`load_image`] / [`save_image`]: colour-preserving read and write.
//! - [`intensities`]: flatten a grey image into a row-major intensity column.
//! - [`augment`]: the four flip/rotate variants written per source image.

pub mod augment;

use crate::error::{Result, TumorscopeError};
use crate::primitives::Matrix;
use image::{DynamicImage, GrayImage};
use std::fs;
use std::path::Path;

pub use augment::{augment_class, augment_image, Augmentation};

/// Extensions recognised as raster inputs (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "gif"];

/// Returns true when `path` has a supported raster extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Load an image from disk without changing its colour type.
///
/// # Errors
///
/// Returns [`TumorscopeError::Image`] naming the file if it is missing or
/// cannot be decoded.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|e| TumorscopeError::Image {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load an image from disk and convert to 8-bit grayscale (luma).
///
/// # Errors
///
/// Same as [`load_image`].
pub fn load_grayscale(path: &Path) -> Result<GrayImage> {
    Ok(load_image(path)?.into_luma8())
}

/// Write an image, creating parent directories; format follows the extension.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or encoding fails.
pub fn save_image(image: &DynamicImage, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    image.save(path).map_err(|e| TumorscopeError::Image {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Row-major pixel intensities as an `n_pixels × 1` matrix.
#[must_use]
pub fn intensities(image: &GrayImage) -> Matrix<f32> {
    Matrix::column_vector(image.as_raw().iter().map(|&v| f32::from(v)).collect())
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| TumorscopeError::io(parent, e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_supported_extensions_case_insensitive() {
        assert!(is_supported_image(Path::new("a/scan.PNG")));
        assert!(is_supported_image(Path::new("scan.jpeg")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("no_extension")));
    }

    #[test]
    fn test_intensities_row_major() {
        let img = GrayImage::from_fn(3, 2, |x, y| Luma([(y * 3 + x) as u8 * 10]));
        let column = intensities(&img);
        assert_eq!(column.shape(), (6, 1));
        assert_eq!(column.as_slice(), &[0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn test_save_then_load_grayscale() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/out.png");
        let img = GrayImage::from_fn(4, 3, |x, y| Luma([(x * 20 + y) as u8]));

        save_image(&DynamicImage::ImageLuma8(img.clone()), &path).unwrap();
        assert_eq!(load_grayscale(&path).unwrap(), img);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = load_grayscale(Path::new("/definitely/missing/scan.png")).unwrap_err();
        assert!(err.to_string().contains("/definitely/missing/scan.png"));
    }

    #[test]
    fn test_load_corrupt_file_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not a png").unwrap();
        assert!(matches!(
            load_grayscale(&path),
            Err(TumorscopeError::Image { .. })
        ));
    }
}
