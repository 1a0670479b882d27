// SPDX-License-Identifier: MIT
//! # Kaiser-Windowed Sinc Resampler
//!
//! fast_image_resize ships no Kaiser kernel, and texture tools such as
//! Photoshop's NVIDIA plugin default to one for mip and pow2 rescales. This
//! module implements it as a plain separable convolution over interleaved
//! `f32` samples:
//!
//! 1. Precompute one weight table per axis (`in_size -> out_size`).
//! 2. Horizontal pass: `in_w x in_h -> out_w x in_h`.
//! 3. Vertical pass: `out_w x in_h -> out_w x out_h`.
//!
//! Every channel, alpha included, goes through the same weights. Taps that
//! fall outside the image are dropped and the remaining weights renormalised,
//! which behaves like clamp-to-edge for smooth content.
//!
//! Output values are not clamped here; the caller converts back to its
//! storage type and clamps there.

use crate::dims::Size;

/// Kernel parameters. Defaults follow the common texture-tool setting of a
/// three-lobe window with `beta = 4`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KaiserParams {
    /// Half-width of the kernel in source pixels (at scale 1).
    pub radius: f64,
    /// Window shape; larger values trade sharpness for less ringing.
    pub beta: f64,
}

impl Default for KaiserParams {
    fn default() -> Self {
        Self {
            radius: 3.0,
            beta: 4.0,
        }
    }
}

/// Zeroth-order modified Bessel function of the first kind.
fn bessel_i0(x: f64) -> f64 {
    let half = x / 2.0;
    let mut sum = 1.0;
    let mut term = 1.0;
    let mut k = 1.0;
    loop {
        term *= (half / k) * (half / k);
        sum += term;
        if term < sum * 1e-12 {
            return sum;
        }
        k += 1.0;
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = std::f64::consts::PI * x;
        px.sin() / px
    }
}

impl KaiserParams {
    /// Kernel value at distance `x` (in source pixels at scale 1).
    pub fn weight(&self, x: f64) -> f64 {
        let t = x / self.radius;
        if t.abs() >= 1.0 {
            return 0.0;
        }
        let window = bessel_i0(self.beta * (1.0 - t * t).sqrt()) / bessel_i0(self.beta);
        sinc(x) * window
    }
}

/// Contribution list for a single output sample.
struct Taps {
    start: usize,
    weights: Vec<f32>,
}

fn build_taps(in_size: usize, out_size: usize, params: &KaiserParams) -> Vec<Taps> {
    let scale = in_size as f64 / out_size as f64;
    // Widen the kernel when shrinking so every source pixel contributes.
    let filter_scale = scale.max(1.0);
    let support = params.radius * filter_scale;

    (0..out_size)
        .map(|i| {
            let center = (i as f64 + 0.5) * scale;
            let start = (center - support).floor().max(0.0) as usize;
            let end = ((center + support).ceil() as usize).min(in_size);

            let mut weights: Vec<f64> = (start..end)
                .map(|k| params.weight((k as f64 + 0.5 - center) / filter_scale))
                .collect();
            let sum: f64 = weights.iter().sum();

            if sum.abs() < f64::EPSILON {
                // Degenerate window; fall back to the nearest source pixel.
                let nearest = (center.floor() as usize).min(in_size - 1);
                return Taps {
                    start: nearest,
                    weights: vec![1.0],
                };
            }
            for w in &mut weights {
                *w /= sum;
            }
            Taps {
                start,
                weights: weights.into_iter().map(|w| w as f32).collect(),
            }
        })
        .collect()
}

fn horizontal_pass(
    src: &[f32],
    src_size: Size,
    out_w: usize,
    channels: usize,
    taps: &[Taps],
) -> Vec<f32> {
    let in_w = src_size.w as usize;
    let rows = src_size.h as usize;
    let mut dst = vec![0f32; out_w * rows * channels];
    let mut acc = vec![0f32; channels];

    for y in 0..rows {
        let src_row = &src[y * in_w * channels..(y + 1) * in_w * channels];
        let dst_row = &mut dst[y * out_w * channels..(y + 1) * out_w * channels];
        for (x, tap) in taps.iter().enumerate() {
            acc.iter_mut().for_each(|a| *a = 0.0);
            for (j, &w) in tap.weights.iter().enumerate() {
                let px = &src_row[(tap.start + j) * channels..(tap.start + j + 1) * channels];
                for c in 0..channels {
                    acc[c] += px[c] * w;
                }
            }
            dst_row[x * channels..(x + 1) * channels].copy_from_slice(&acc);
        }
    }
    dst
}

fn vertical_pass(
    src: &[f32],
    width: usize,
    out_h: usize,
    channels: usize,
    taps: &[Taps],
) -> Vec<f32> {
    let row_len = width * channels;
    let mut dst = vec![0f32; row_len * out_h];

    for (y, tap) in taps.iter().enumerate() {
        let dst_row = &mut dst[y * row_len..(y + 1) * row_len];
        for (j, &w) in tap.weights.iter().enumerate() {
            let src_row = &src[(tap.start + j) * row_len..(tap.start + j + 1) * row_len];
            for (d, s) in dst_row.iter_mut().zip(src_row) {
                *d += s * w;
            }
        }
    }
    dst
}

/// Resample an interleaved `f32` image with `channels` samples per pixel.
///
/// `src.len()` must equal `src_size.area() * channels`; the returned buffer
/// holds `dst_size.area() * channels` samples.
pub fn resample(
    src: &[f32],
    src_size: Size,
    dst_size: Size,
    channels: usize,
    params: &KaiserParams,
) -> Vec<f32> {
    debug_assert_eq!(src.len() as u64, src_size.area() * channels as u64);

    let horizontal = if src_size.w == dst_size.w {
        src.to_vec()
    } else {
        let taps = build_taps(src_size.w as usize, dst_size.w as usize, params);
        horizontal_pass(src, src_size, dst_size.w as usize, channels, &taps)
    };

    if src_size.h == dst_size.h {
        return horizontal;
    }
    let taps = build_taps(src_size.h as usize, dst_size.h as usize, params);
    vertical_pass(&horizontal, dst_size.w as usize, dst_size.h as usize, channels, &taps)
}
