//! # Opacity Audit
//!
//! PS2 textures store alpha at half of its rendered opacity: a stored 128 is
//! fully opaque on the console. Textures that went through a PC-side export
//! often carry full 0..=255 alpha instead and render wrong once rebuilt.
//!
//! This module only *measures* alpha. Values are never remapped; the one
//! mutation offered, [`clamp_alpha_ceiling`], trims resampling overshoot back
//! under the source's own maximum.
//!
//! Measurements stay in the image's own sample units (0..=255, 0..=65535 or
//! 0.0..=1.0). The halved threshold is scaled into those units rather than
//! rounding samples down to 8 bits, so a 16-bit alpha of 33000 is full-range
//! even though it rounds to 128.

use image::{DynamicImage, ImageBuffer, Pixel};

/// Stored alpha that renders fully opaque under the halved convention.
pub const HALVED_OPAQUE: u8 = 128;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpacityClass {
    /// No alpha channel.
    Opaque,
    /// Every stored alpha is within `0..=HALVED_OPAQUE`.
    Halved,
    /// Some stored alpha exceeds `HALVED_OPAQUE`.
    FullRange,
}

impl OpacityClass {
    pub fn as_str(self) -> &'static str {
        match self {
            OpacityClass::Opaque => "opaque",
            OpacityClass::Halved => "halved",
            OpacityClass::FullRange => "full_range",
        }
    }
}

/// Alpha statistics in native sample units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpacityProfile {
    pub has_alpha: bool,
    /// Lowest stored alpha.
    pub min_stored: f32,
    /// Highest stored alpha.
    pub max_stored: f32,
    /// Stored value of full intensity: 255, 65535 or 1.0.
    pub full_scale: f32,
}

fn alpha_range<P>(buf: &ImageBuffer<P, Vec<P::Subpixel>>) -> (f32, f32)
where
    P: Pixel,
    P::Subpixel: Into<f32>,
{
    let last = usize::from(P::CHANNEL_COUNT) - 1;
    buf.pixels()
        .map(|p| Into::<f32>::into(p.channels()[last]))
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), a| (lo.min(a), hi.max(a)))
}

impl OpacityProfile {
    fn without_alpha() -> Self {
        Self {
            has_alpha: false,
            min_stored: 255.0,
            max_stored: 255.0,
            full_scale: 255.0,
        }
    }

    /// Scan the alpha channel of `image`.
    pub fn measure(image: &DynamicImage) -> Self {
        if !image.color().has_alpha() {
            return Self::without_alpha();
        }

        let ((min_stored, max_stored), full_scale) = match image {
            DynamicImage::ImageLumaA8(buf) => (alpha_range(buf), 255.0),
            DynamicImage::ImageRgba8(buf) => (alpha_range(buf), 255.0),
            DynamicImage::ImageLumaA16(buf) => (alpha_range(buf), 65535.0),
            DynamicImage::ImageRgba16(buf) => (alpha_range(buf), 65535.0),
            DynamicImage::ImageRgba32F(buf) => (alpha_range(buf), 1.0),
            other => (alpha_range(&other.to_rgba32f()), 1.0),
        };
        Self {
            has_alpha: true,
            min_stored,
            max_stored,
            full_scale,
        }
    }

    /// `HALVED_OPAQUE` expressed in this image's sample units.
    pub fn halved_ceiling(&self) -> f32 {
        f32::from(HALVED_OPAQUE) * self.full_scale / 255.0
    }

    /// Lowest alpha on the 8-bit scale, rounded down.
    pub fn min_alpha(&self) -> u8 {
        self.to_8bit(self.min_stored).floor() as u8
    }

    /// Highest alpha on the 8-bit scale, rounded up so that a full-range
    /// value never reads as 128.
    pub fn max_alpha(&self) -> u8 {
        self.to_8bit(self.max_stored).ceil() as u8
    }

    fn to_8bit(&self, stored: f32) -> f32 {
        (stored * 255.0 / self.full_scale).clamp(0.0, 255.0)
    }

    pub fn class(&self) -> OpacityClass {
        if !self.has_alpha {
            OpacityClass::Opaque
        } else if self.max_stored <= self.halved_ceiling() {
            OpacityClass::Halved
        } else {
            OpacityClass::FullRange
        }
    }
}

/// Rendered opacity (0.0..=1.0) of a stored alpha value.
pub fn effective_opacity(stored: u8) -> f32 {
    (f32::from(stored) * 2.0).min(255.0) / 255.0
}

/// Lower any alpha above `ceiling` down to it. `ceiling` is in the image's
/// own sample units, as in [`OpacityProfile::max_stored`]. Colour channels
/// and alpha values at or below the ceiling are left as they are.
pub fn clamp_alpha_ceiling(image: &mut DynamicImage, ceiling: f32) {
    let c8 = ceiling.clamp(0.0, 255.0) as u8;
    let c16 = ceiling.clamp(0.0, 65535.0) as u16;
    match image {
        DynamicImage::ImageLumaA8(buf) => buf.pixels_mut().for_each(|p| p[1] = p[1].min(c8)),
        DynamicImage::ImageRgba8(buf) => buf.pixels_mut().for_each(|p| p[3] = p[3].min(c8)),
        DynamicImage::ImageLumaA16(buf) => buf.pixels_mut().for_each(|p| p[1] = p[1].min(c16)),
        DynamicImage::ImageRgba16(buf) => buf.pixels_mut().for_each(|p| p[3] = p[3].min(c16)),
        DynamicImage::ImageRgba32F(buf) => buf.pixels_mut().for_each(|p| p[3] = p[3].min(ceiling)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn rgba16(w: u32, h: u32, alpha: u16) -> DynamicImage {
        DynamicImage::ImageRgba16(ImageBuffer::<Rgba<u16>, Vec<u16>>::from_pixel(
            w,
            h,
            Rgba([1000, 2000, 3000, alpha]),
        ))
    }

    #[test]
    fn rgb_is_opaque() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([1, 2, 3])));
        let p = OpacityProfile::measure(&img);
        assert!(!p.has_alpha);
        assert_eq!(p.class(), OpacityClass::Opaque);
    }

    #[test]
    fn halved_and_full_range_are_told_apart() {
        let mut buf = RgbaImage::from_pixel(4, 1, Rgba([0, 0, 0, 10]));
        buf.put_pixel(3, 0, Rgba([0, 0, 0, 128]));
        let p = OpacityProfile::measure(&DynamicImage::ImageRgba8(buf.clone()));
        assert_eq!((p.min_alpha(), p.max_alpha()), (10, 128));
        assert_eq!(p.class(), OpacityClass::Halved);

        buf.put_pixel(0, 0, Rgba([0, 0, 0, 129]));
        let p = OpacityProfile::measure(&DynamicImage::ImageRgba8(buf));
        assert_eq!(p.class(), OpacityClass::FullRange);
    }

    #[test]
    fn sixteen_bit_threshold_is_exact() {
        let p = OpacityProfile::measure(&rgba16(2, 2, 128 * 257));
        assert_eq!(p.max_stored, 32896.0);
        assert_eq!(p.max_alpha(), 128);
        assert_eq!(p.class(), OpacityClass::Halved);

        // Rounds to 128 on the 8-bit scale but sits above the threshold.
        let p = OpacityProfile::measure(&rgba16(2, 2, 33000));
        assert_eq!(p.class(), OpacityClass::FullRange);
        assert_eq!(p.max_alpha(), 129);
    }

    #[test]
    fn float_threshold_is_exact() {
        let rgba32f = |a: f32| {
            DynamicImage::ImageRgba32F(ImageBuffer::from_pixel(1, 1, Rgba([0.0, 0.0, 0.0, a])))
        };
        let img = rgba32f(128.0 / 255.0);
        assert_eq!(OpacityProfile::measure(&img).class(), OpacityClass::Halved);

        let img = rgba32f(0.51);
        assert_eq!(OpacityProfile::measure(&img).class(), OpacityClass::FullRange);
    }

    #[test]
    fn effective_opacity_doubles_and_saturates() {
        assert_eq!(effective_opacity(0), 0.0);
        assert_eq!(effective_opacity(128), 1.0);
        assert_eq!(effective_opacity(255), 1.0);
        assert!((effective_opacity(64) - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn clamp_only_touches_alpha_above_ceiling() {
        let mut buf = RgbaImage::from_pixel(2, 1, Rgba([250, 250, 250, 131]));
        buf.put_pixel(1, 0, Rgba([250, 250, 250, 40]));
        let mut img = DynamicImage::ImageRgba8(buf);
        clamp_alpha_ceiling(&mut img, 128.0);
        let out = img.as_rgba8().unwrap();
        assert_eq!(out.get_pixel(0, 0), &Rgba([250, 250, 250, 128]));
        assert_eq!(out.get_pixel(1, 0), &Rgba([250, 250, 250, 40]));
    }

    #[test]
    fn clamp_keeps_sixteen_bit_source_level() {
        let mut img = rgba16(2, 2, 32000);
        let ceiling = OpacityProfile::measure(&img).max_stored;
        clamp_alpha_ceiling(&mut img, ceiling);
        assert!(img.as_rgba16().unwrap().pixels().all(|p| p[3] == 32000));
    }
}
