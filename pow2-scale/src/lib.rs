// SPDX-License-Identifier: MIT
//! # pow2-scale: Power-of-Two Texture Planning and Resampling
//!
//! This crate holds the deterministic core of the texture rebuild tooling:
//! deciding whether a texture is already power-of-two sized, computing the
//! next power-of-two target, and resampling raw pixel buffers to that target.
//!
//! It deliberately knows nothing about file formats. Callers hand in tightly
//! packed pixel bytes plus a [`PixelLayout`](cpu::PixelLayout) and get tightly
//! packed bytes back in the same layout.
//!
//! ## Key Components
//!
//! - [`dims`]: power-of-two math, classification and resize planning
//! - [`filter`]: resampling filter identifiers and their parsing
//! - [`cpu`]: resize entry point built on fast_image_resize
//! - [`kaiser`]: separable Kaiser-windowed sinc resampler
//!
//! ## Alpha Handling
//!
//! Alpha is resampled exactly like colour: same kernel, no premultiplication.
//! PS2 textures store alpha at half of its rendered opacity, so premultiplying
//! against a 255 ceiling would darken every edge.
//!
//! ## Usage Example
//!
//! ```rust
//! use pow2_scale::cpu::{resize_pixels, PixelLayout, SampleDepth};
//! use pow2_scale::dims::{classify, Size};
//! use pow2_scale::filter::ResampleFilter;
//!
//! let src = Size { w: 3, h: 5 };
//! let class = classify(src).unwrap();
//! assert!(!class.already_pow2);
//! assert_eq!((class.target.w, class.target.h), (4, 8));
//!
//! let layout = PixelLayout::new(4, SampleDepth::U8);
//! let pixels = vec![64u8; 3 * 5 * 4];
//! let mut resizer = fast_image_resize::Resizer::new();
//! let out = resize_pixels(
//!     &mut resizer,
//!     &pixels,
//!     src,
//!     layout,
//!     class.target,
//!     "lanczos".parse::<ResampleFilter>().unwrap(),
//! )
//! .unwrap();
//! assert_eq!(out.len(), 4 * 8 * 4);
//! ```

pub mod cpu;
pub mod dims;
pub mod filter;
pub mod kaiser;
