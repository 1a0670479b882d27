// SPDX-License-Identifier: MIT
//! # Resampling Filters
//!
//! Filter choice is configuration, never hard-coded. Identifiers are parsed
//! once, up front, so a typo fails the whole run before any texture is read.
//!
//! | id | kernel | backend |
//! |----|--------|---------|
//! | `nearest` | nearest neighbour | fast_image_resize |
//! | `box` | box | fast_image_resize |
//! | `bilinear` | triangle | fast_image_resize |
//! | `hamming` | Hamming | fast_image_resize |
//! | `bicubic` | Catmull-Rom | fast_image_resize |
//! | `mitchell` | Mitchell-Netravali | fast_image_resize |
//! | `lanczos` | Lanczos3 | fast_image_resize |
//! | `kaiser` | Kaiser-windowed sinc | [`crate::kaiser`] |

use std::fmt;
use std::str::FromStr;

use fast_image_resize as fir;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported resampling filter `{name}` (expected one of: {})", ResampleFilter::names().join(", "))]
pub struct UnsupportedFilter {
    pub name: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResampleFilter {
    Nearest,
    Box,
    Bilinear,
    Hamming,
    /// Catmull-Rom; the closest match to Photoshop's "Bicubic".
    Bicubic,
    Mitchell,
    #[default]
    Lanczos,
    Kaiser,
}

impl ResampleFilter {
    pub const ALL: [ResampleFilter; 8] = [
        ResampleFilter::Nearest,
        ResampleFilter::Box,
        ResampleFilter::Bilinear,
        ResampleFilter::Hamming,
        ResampleFilter::Bicubic,
        ResampleFilter::Mitchell,
        ResampleFilter::Lanczos,
        ResampleFilter::Kaiser,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResampleFilter::Nearest => "nearest",
            ResampleFilter::Box => "box",
            ResampleFilter::Bilinear => "bilinear",
            ResampleFilter::Hamming => "hamming",
            ResampleFilter::Bicubic => "bicubic",
            ResampleFilter::Mitchell => "mitchell",
            ResampleFilter::Lanczos => "lanczos",
            ResampleFilter::Kaiser => "kaiser",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.name()).collect()
    }

    /// fast_image_resize algorithm for this filter, `None` when the filter
    /// is handled by the in-crate Kaiser resampler.
    pub fn fir_alg(self) -> Option<fir::ResizeAlg> {
        use fir::{FilterType, ResizeAlg};
        match self {
            ResampleFilter::Nearest => Some(ResizeAlg::Nearest),
            ResampleFilter::Box => Some(ResizeAlg::Convolution(FilterType::Box)),
            ResampleFilter::Bilinear => Some(ResizeAlg::Convolution(FilterType::Bilinear)),
            ResampleFilter::Hamming => Some(ResizeAlg::Convolution(FilterType::Hamming)),
            ResampleFilter::Bicubic => Some(ResizeAlg::Convolution(FilterType::CatmullRom)),
            ResampleFilter::Mitchell => Some(ResizeAlg::Convolution(FilterType::Mitchell)),
            ResampleFilter::Lanczos => Some(ResizeAlg::Convolution(FilterType::Lanczos3)),
            ResampleFilter::Kaiser => None,
        }
    }
}

impl fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResampleFilter {
    type Err = UnsupportedFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "box" => Ok(Self::Box),
            "bilinear" | "triangle" => Ok(Self::Bilinear),
            "hamming" => Ok(Self::Hamming),
            "bicubic" | "catmullrom" => Ok(Self::Bicubic),
            "mitchell" => Ok(Self::Mitchell),
            "lanczos" | "lanczos3" => Ok(Self::Lanczos),
            "kaiser" => Ok(Self::Kaiser),
            _ => Err(UnsupportedFilter {
                name: s.to_string(),
            }),
        }
    }
}
