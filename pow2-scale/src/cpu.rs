// SPDX-License-Identifier: MIT
// CPU resize built on fast_image_resize (SIMD-accelerated), with the Kaiser
// kernel routed to the in-crate resampler.
// Tightly packed pixels in, tightly packed pixels out, same layout both sides.

use fast_image_resize as fir;
use fir::images::Image;
use fir::{PixelType, ResizeOptions, Resizer};
use thiserror::Error;

use crate::dims::Size;
use crate::filter::ResampleFilter;
use crate::kaiser::{self, KaiserParams};

#[derive(Debug, Error)]
pub enum ScaleError {
    #[error("source buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("cannot resize to an empty {0} canvas")]
    EmptyTarget(Size),
    #[error("unsupported pixel layout: {channels} channel(s) of {depth:?}")]
    UnsupportedLayout { channels: u8, depth: SampleDepth },
    #[error("fast image resize error: {0}")]
    Fir(#[from] fir::ResizeError),
    #[error("image buffer error: {0}")]
    ImageBuf(#[from] fir::ImageBufferError),
}

/// Storage type of a single channel sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleDepth {
    U8,
    U16,
    F32,
}

impl SampleDepth {
    pub fn bytes(self) -> usize {
        match self {
            SampleDepth::U8 => 1,
            SampleDepth::U16 => 2,
            SampleDepth::F32 => 4,
        }
    }
}

/// Channel count and sample depth of a tightly packed, native-endian buffer.
/// Alpha, when present, is always the last channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelLayout {
    pub channels: u8,
    pub depth: SampleDepth,
}

impl PixelLayout {
    pub fn new(channels: u8, depth: SampleDepth) -> Self {
        Self { channels, depth }
    }

    pub fn bytes_per_pixel(self) -> usize {
        self.channels as usize * self.depth.bytes()
    }

    pub fn buffer_len(self, size: Size) -> usize {
        size.w as usize * size.h as usize * self.bytes_per_pixel()
    }

    fn pixel_type(self) -> Result<PixelType, ScaleError> {
        let pt = match (self.depth, self.channels) {
            (SampleDepth::U8, 1) => PixelType::U8,
            (SampleDepth::U8, 2) => PixelType::U8x2,
            (SampleDepth::U8, 3) => PixelType::U8x3,
            (SampleDepth::U8, 4) => PixelType::U8x4,
            (SampleDepth::U16, 1) => PixelType::U16,
            (SampleDepth::U16, 2) => PixelType::U16x2,
            (SampleDepth::U16, 3) => PixelType::U16x3,
            (SampleDepth::U16, 4) => PixelType::U16x4,
            (SampleDepth::F32, 1) => PixelType::F32,
            (SampleDepth::F32, 2) => PixelType::F32x2,
            (SampleDepth::F32, 3) => PixelType::F32x3,
            (SampleDepth::F32, 4) => PixelType::F32x4,
            (depth, channels) => return Err(ScaleError::UnsupportedLayout { channels, depth }),
        };
        Ok(pt)
    }
}

/// Main resize entry point.
///
/// `src` must be exactly `layout.buffer_len(src_size)` bytes. The result is
/// exactly `layout.buffer_len(dst_size)` bytes in the same layout. The source
/// is only read.
pub fn resize_pixels(
    resizer: &mut Resizer,
    src: &[u8],
    src_size: Size,
    layout: PixelLayout,
    dst_size: Size,
    filter: ResampleFilter,
) -> Result<Vec<u8>, ScaleError> {
    let expected = layout.buffer_len(src_size);
    if src.len() != expected {
        return Err(ScaleError::BufferSize {
            expected,
            actual: src.len(),
        });
    }
    if dst_size.w == 0 || dst_size.h == 0 {
        return Err(ScaleError::EmptyTarget(dst_size));
    }

    match filter.fir_alg() {
        Some(alg) => resize_fir(resizer, src, src_size, layout, dst_size, alg),
        None => resize_kaiser(src, src_size, layout, dst_size),
    }
}

fn resize_fir(
    resizer: &mut Resizer,
    src: &[u8],
    src_size: Size,
    layout: PixelLayout,
    dst_size: Size,
    alg: fir::ResizeAlg,
) -> Result<Vec<u8>, ScaleError> {
    let pixel_type = layout.pixel_type()?;
    let src_image = Image::from_vec_u8(src_size.w, src_size.h, src.to_vec(), pixel_type)?;
    let mut dst_image = Image::new(dst_size.w, dst_size.h, pixel_type);

    // Straight alpha: the halved-opacity convention breaks under premultiply.
    let opts = ResizeOptions::new().resize_alg(alg).use_alpha(false);
    resizer.resize(&src_image, &mut dst_image, &opts)?;

    Ok(dst_image.into_vec())
}

fn resize_kaiser(
    src: &[u8],
    src_size: Size,
    layout: PixelLayout,
    dst_size: Size,
) -> Result<Vec<u8>, ScaleError> {
    layout.pixel_type()?;
    let channels = layout.channels as usize;
    let samples = decode_samples(src, layout.depth);
    let out = kaiser::resample(&samples, src_size, dst_size, channels, &KaiserParams::default());
    Ok(encode_samples(&out, layout.depth))
}

fn decode_samples(src: &[u8], depth: SampleDepth) -> Vec<f32> {
    match depth {
        SampleDepth::U8 => src.iter().map(|&v| f32::from(v)).collect(),
        SampleDepth::U16 => src
            .chunks_exact(2)
            .map(|b| f32::from(u16::from_ne_bytes([b[0], b[1]])))
            .collect(),
        SampleDepth::F32 => src
            .chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
    }
}

fn encode_samples(samples: &[f32], depth: SampleDepth) -> Vec<u8> {
    match depth {
        SampleDepth::U8 => samples
            .iter()
            .map(|&v| v.round().clamp(0.0, 255.0) as u8)
            .collect(),
        SampleDepth::U16 => samples
            .iter()
            .flat_map(|&v| (v.round().clamp(0.0, 65535.0) as u16).to_ne_bytes())
            .collect(),
        SampleDepth::F32 => samples.iter().flat_map(|&v| v.to_ne_bytes()).collect(),
    }
}
