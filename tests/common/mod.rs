//! Common test utilities for the texture batch tests.
//!
//! Fixtures are generated with the `image` crate into temporary directories,
//! so no binary assets live in the repository.

#![allow(dead_code)]

/// Texture fixtures written to disk
pub mod fixtures {
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Gradient RGBA texture with alpha inside the halved-opacity range.
    pub fn halved_gradient(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, y| {
            Rgba([
                ((x * 255) / w.max(1)) as u8,
                ((y * 255) / h.max(1)) as u8,
                128,
                ((x + y) % 129) as u8,
            ])
        }))
    }

    /// Hard-edged alpha checkerboard (0 / 128) that makes sharpening
    /// kernels overshoot.
    pub fn halved_checkerboard(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, y| {
            let on = (x / 2 + y / 2) % 2 == 0;
            Rgba([255, 255, 255, if on { 128 } else { 0 }])
        }))
    }

    /// Texture with full 0..=255 alpha.
    pub fn full_range(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255])))
    }

    /// Flat 16-bit RGBA texture with every alpha set to `alpha`.
    pub fn flat_rgba16(w: u32, h: u32, alpha: u16) -> DynamicImage {
        DynamicImage::ImageRgba16(ImageBuffer::<Rgba<u16>, Vec<u16>>::from_pixel(
            w,
            h,
            Rgba([20000, 30000, 40000, alpha]),
        ))
    }

    pub fn opaque_rgb(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 200])
        }))
    }

    /// Write `image` to `dir/name` in `format`, creating parent directories.
    pub fn write(dir: &Path, name: &str, image: &DynamicImage, format: ImageFormat) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        image.save_with_format(&path, format).unwrap();
        path
    }

    /// A file with a texture extension and garbage content.
    pub fn write_corrupt(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"\x89PNG\r\n\x1a\n but then nothing useful").unwrap();
        path
    }
}

/// Custom assertions for testing
pub mod assertions {
    use std::path::Path;

    /// Assert that the texture at `path` decodes to exactly `w` x `h`.
    pub fn assert_texture_size(path: &Path, w: u32, h: u32) {
        let img = image::open(path).unwrap_or_else(|e| panic!("{}: {e}", path.display()));
        assert_eq!(
            (img.width(), img.height()),
            (w, h),
            "{}: size mismatch",
            path.display()
        );
    }

    /// Assert that both sides of the texture at `path` are powers of two.
    pub fn assert_pow2(path: &Path) {
        let img = image::open(path).unwrap();
        assert!(
            texture_pow2::is_power_of_two(img.width()) && texture_pow2::is_power_of_two(img.height()),
            "{} is {}x{}",
            path.display(),
            img.width(),
            img.height()
        );
    }

    /// Every 16-bit alpha value in the texture at `path`.
    pub fn alpha16(path: &Path) -> Vec<u16> {
        let img = image::open(path).unwrap();
        let buf = img
            .as_rgba16()
            .unwrap_or_else(|| panic!("{} is {:?}", path.display(), img.color()));
        buf.pixels().map(|p| p[3]).collect()
    }

    /// Largest alpha value in the texture at `path`.
    pub fn max_alpha(path: &Path) -> u8 {
        image::open(path)
            .unwrap()
            .to_rgba8()
            .pixels()
            .map(|p| p[3])
            .max()
            .unwrap_or(0)
    }
}
