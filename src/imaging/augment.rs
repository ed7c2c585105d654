//! Geometric dataset augmentation.
//!
//! Every source image yields four files in the output directory, named
//! `<stem>_<suffix>.<ext>`.

use super::{load_image, save_image};
use crate::error::{Result, TumorscopeError};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One of the four size-preserving variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Augmentation {
    /// Unchanged copy.
    Original,
    /// Mirror left-right (each row reversed).
    HorizontalFlip,
    /// Mirror top-bottom (row order reversed).
    VerticalFlip,
    /// Rotate by 180 degrees.
    Rotate180,
}

impl Augmentation {
    /// All variants in output order.
    pub const ALL: [Augmentation; 4] = [
        Augmentation::Original,
        Augmentation::HorizontalFlip,
        Augmentation::VerticalFlip,
        Augmentation::Rotate180,
    ];

    /// Filename suffix encoding the variant.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Augmentation::Original => "orig",
            Augmentation::HorizontalFlip => "hflip",
            Augmentation::VerticalFlip => "vflip",
            Augmentation::Rotate180 => "rot180",
        }
    }

    /// Applies the transform.
    #[must_use]
    pub fn apply(self, image: &DynamicImage) -> DynamicImage {
        match self {
            Augmentation::Original => image.clone(),
            Augmentation::HorizontalFlip => image.fliph(),
            Augmentation::VerticalFlip => image.flipv(),
            Augmentation::Rotate180 => image.rotate180(),
        }
    }

    /// Destination of this variant of `source` inside `out_dir`.
    ///
    /// Sources without an extension are written as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` has no usable file stem.
    pub fn output_path(self, source: &Path, out_dir: &Path) -> Result<PathBuf> {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| TumorscopeError::Image {
                path: source.to_path_buf(),
                message: "file name is not valid UTF-8".to_string(),
            })?;
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map_or_else(|| "png".to_string(), str::to_ascii_lowercase);
        Ok(out_dir.join(format!("{stem}_{}.{ext}", self.suffix())))
    }
}

/// Writes the four variants of `source` into `out_dir`.
///
/// Returns the written paths in [`Augmentation::ALL`] order.
///
/// # Errors
///
/// A missing or undecodable source, or a failed write, aborts with an
/// error naming the file.
pub fn augment_image(source: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let image = load_image(source)?;
    Augmentation::ALL
        .iter()
        .map(|&kind| {
            let dest = kind.output_path(source, out_dir)?;
            save_image(&kind.apply(&image), &dest)?;
            Ok(dest)
        })
        .collect()
}

/// Augments every source of one class.
///
/// Destinations are checked before anything is written: two sources that
/// map to the same output file (`scan.png` and `scan.PNG`) are rejected.
///
/// # Errors
///
/// Fails on a destination collision, otherwise stops at the first failing
/// source.
pub fn augment_class(sources: &[PathBuf], out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    for source in sources {
        for kind in Augmentation::ALL {
            let dest = kind.output_path(source, out_dir)?;
            if let Some(previous) = claimed.insert(dest.clone(), source) {
                return Err(TumorscopeError::Image {
                    path: source.clone(),
                    message: format!(
                        "output {} collides with the variants of {}",
                        dest.display(),
                        previous.display()
                    ),
                });
            }
        }
    }

    let mut written = Vec::with_capacity(sources.len() * Augmentation::ALL.len());
    for source in sources {
        tracing::debug!(source = %source.display(), "augmenting");
        written.extend(augment_image(source, out_dir)?);
    }
    tracing::info!(
        sources = sources.len(),
        written = written.len(),
        out_dir = %out_dir.display(),
        "augmented class"
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::load_grayscale;
    use image::{GrayImage, Luma};

    fn gradient(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| Luma([(y * w + x) as u8]))
    }

    #[test]
    fn test_transforms_preserve_dimensions() {
        let img = DynamicImage::ImageLuma8(gradient(5, 3));
        for kind in Augmentation::ALL {
            let out = kind.apply(&img);
            assert_eq!((out.width(), out.height()), (5, 3), "{kind:?}");
        }
    }

    #[test]
    fn test_horizontal_flip_reverses_rows() {
        let src = gradient(4, 3);
        let out = Augmentation::HorizontalFlip
            .apply(&DynamicImage::ImageLuma8(src.clone()))
            .into_luma8();
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(out.get_pixel(x, y), src.get_pixel(3 - x, y));
            }
        }
    }

    #[test]
    fn test_vertical_flip_reverses_columns() {
        let src = gradient(4, 3);
        let out = Augmentation::VerticalFlip
            .apply(&DynamicImage::ImageLuma8(src.clone()))
            .into_luma8();
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(out.get_pixel(x, y), src.get_pixel(x, 2 - y));
            }
        }
    }

    #[test]
    fn test_rotate180_is_both_flips() {
        let img = DynamicImage::ImageLuma8(gradient(4, 3));
        let rotated = Augmentation::Rotate180.apply(&img).into_luma8();
        let both = img.fliph().flipv().into_luma8();
        assert_eq!(rotated, both);
    }

    #[test]
    fn test_output_paths_encode_kind() {
        let out = Path::new("/aug/yes");
        let p = Augmentation::VerticalFlip
            .output_path(Path::new("/raw/yes/Y12.JPG"), out)
            .unwrap();
        assert_eq!(p, Path::new("/aug/yes/Y12_vflip.jpg"));

        let p = Augmentation::Original
            .output_path(Path::new("/raw/no/scan"), out)
            .unwrap();
        assert_eq!(p, Path::new("/aug/yes/scan_orig.png"));
    }

    #[test]
    fn test_augment_image_writes_four_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("raw/scan.png");
        std::fs::create_dir_all(source.parent().unwrap()).unwrap();
        gradient(6, 4).save(&source).unwrap();

        let out_dir = dir.path().join("aug");
        let written = augment_image(&source, &out_dir).unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["scan_orig.png", "scan_hflip.png", "scan_vflip.png", "scan_rot180.png"]
        );
        for path in &written {
            let img = load_grayscale(path).unwrap();
            assert_eq!(img.dimensions(), (6, 4));
        }
        assert_eq!(load_grayscale(&written[0]).unwrap(), gradient(6, 4));
    }

    #[test]
    fn test_augment_class_fails_on_missing_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("gone.png");
        let err = augment_class(&[missing.clone()], dir.path()).unwrap_err();
        assert!(err.to_string().contains("gone.png"));
    }

    #[test]
    fn test_augment_class_rejects_colliding_sources() {
        let dir = tempfile::tempdir().expect("tempdir");
        let raw = dir.path().join("raw");
        std::fs::create_dir_all(&raw).unwrap();
        let lower = raw.join("Y1.png");
        let upper = raw.join("Y1.PNG");
        gradient(4, 4).save_with_format(&lower, image::ImageFormat::Png).unwrap();
        gradient(5, 3).save_with_format(&upper, image::ImageFormat::Png).unwrap();

        let out_dir = dir.path().join("aug");
        let err = augment_class(&[lower.clone(), upper.clone()], &out_dir).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Y1.png"), "{msg}");
        assert!(msg.contains("Y1.PNG"), "{msg}");
        assert!(!out_dir.exists(), "nothing is written before the check");
    }

    #[test]
    fn test_augment_class_paths_are_unique() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sources: Vec<PathBuf> = ["a.png", "b.png", "a.bmp"]
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                gradient(3, 3).save(&path).unwrap();
                path
            })
            .collect();

        let written = augment_class(&sources, &dir.path().join("aug")).unwrap();
        let unique: std::collections::HashSet<_> = written.iter().collect();
        assert_eq!(written.len(), 12);
        assert_eq!(unique.len(), 12);
    }
}
