//! Synthetic scan fixtures shared by the integration tests.

#![allow(dead_code)]

use image::{GrayImage, Luma};
use std::path::{Path, PathBuf};

/// 16×16 scan: dark border, mid-grey tissue, and for tumor scans a bright
/// blob whose position and size vary with `i`.
pub fn scan(i: u32, tumor: bool) -> GrayImage {
    let (cx, cy, r) = (5 + i % 5, 6 + i % 4, 2 + i % 2);
    GrayImage::from_fn(16, 16, |x, y| {
        let border = x < 2 || y < 2 || x > 13 || y > 13;
        let blob = tumor && x.abs_diff(cx).pow(2) + y.abs_diff(cy).pow(2) <= r * r;
        let v = if border {
            30 + (x * 7 + y * 11 + i * 3) % 8
        } else if blob {
            215 + (x + y + i) % 10
        } else {
            110 + (x * 5 + y * 3 + i) % 10
        };
        Luma([v as u8])
    })
}

/// Writes `n` tumor and `n` healthy scans under `root/raw/{yes,no}`.
pub fn write_dataset(root: &Path, n: u32) -> (PathBuf, PathBuf) {
    let tumor = root.join("raw/yes");
    let healthy = root.join("raw/no");
    std::fs::create_dir_all(&tumor).unwrap();
    std::fs::create_dir_all(&healthy).unwrap();
    for i in 0..n {
        scan(i, true).save(tumor.join(format!("Y{i}.png"))).unwrap();
        scan(i, false).save(healthy.join(format!("N{i}.png"))).unwrap();
    }
    (tumor, healthy)
}

/// 16×16 scan drawn from exactly five grey levels.
pub fn five_level_scan(i: u32, tumor: bool) -> GrayImage {
    let (cx, cy) = (6 + i % 4, 7 + i % 3);
    GrayImage::from_fn(16, 16, |x, y| {
        let v = if x < 2 || y < 2 || x > 13 || y > 13 {
            30
        } else if tumor && x.abs_diff(cx) <= 1 && y.abs_diff(cy) <= 1 {
            220
        } else if !tumor && (x == 2 || y == 2) {
            60
        } else {
            [110, 120, 130][((x + y + i) % 3) as usize]
        };
        Luma([v])
    })
}

/// Writes `n` five-level scans per class under `root/raw/{yes,no}`.
pub fn write_five_level_dataset(root: &Path, n: u32) -> (PathBuf, PathBuf) {
    let tumor = root.join("raw/yes");
    let healthy = root.join("raw/no");
    std::fs::create_dir_all(&tumor).unwrap();
    std::fs::create_dir_all(&healthy).unwrap();
    for i in 0..n {
        five_level_scan(i, true).save(tumor.join(format!("Y{i}.png"))).unwrap();
        five_level_scan(i, false).save(healthy.join(format!("N{i}.png"))).unwrap();
    }
    (tumor, healthy)
}
