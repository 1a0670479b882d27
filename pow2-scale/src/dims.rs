// SPDX-License-Identifier: MIT
//! # Dimension Classification and Resize Planning
//!
//! Older rendering paths only sample textures whose sides are exact powers of
//! two. This module decides whether a texture already satisfies that and, if
//! not, which size it has to be upscaled to.
//!
//! ## Rules
//!
//! - Each side is rounded up independently: 130×70 becomes 256×128.
//! - A side that is already a power of two is left unchanged.
//! - Targets never shrink a side, so no detail is thrown away.
//! - Zero-sized inputs are rejected; there is no power of two to round to.

use thiserror::Error;

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// Number of pixels covered by this size.
    pub fn area(self) -> u64 {
        u64::from(self.w) * u64::from(self.h)
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DimensionError {
    #[error("image has zero {axis}")]
    Zero { axis: &'static str },
    #[error("{axis} of {value} has no power-of-two target representable in 32 bits")]
    Overflow { axis: &'static str, value: u32 },
}

/// Result of inspecting a texture's dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    /// Both sides are already exact powers of two.
    pub already_pow2: bool,
    /// Next power-of-two size; equal to the source size when `already_pow2`.
    pub target: Size,
}

/// True when `n` is an exact power of two. Zero is not.
#[inline]
pub fn is_power_of_two(n: u32) -> bool {
    n != 0 && (n & (n - 1)) == 0
}

/// Smallest power of two that is `>= n`.
///
/// Returns `None` for zero and for values above `2^31`, which have no
/// power-of-two ceiling in `u32`.
#[inline]
pub fn next_power_of_two(n: u32) -> Option<u32> {
    if n == 0 {
        return None;
    }
    n.checked_next_power_of_two()
}

fn side_target(axis: &'static str, value: u32) -> Result<u32, DimensionError> {
    if value == 0 {
        return Err(DimensionError::Zero { axis });
    }
    next_power_of_two(value).ok_or(DimensionError::Overflow { axis, value })
}

/// Classify a texture size and compute its power-of-two target.
pub fn classify(size: Size) -> Result<Classification, DimensionError> {
    let target = Size {
        w: side_target("width", size.w)?,
        h: side_target("height", size.h)?,
    };
    Ok(Classification {
        already_pow2: is_power_of_two(size.w) && is_power_of_two(size.h),
        target,
    })
}

/// What to do with one texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizePlan {
    /// Both sides already pow2; nothing to resample.
    Keep { size: Size },
    /// Upscale from `input` to `output`.
    Upscale { input: Size, output: Size },
}

impl ResizePlan {
    pub fn output(&self) -> Size {
        match *self {
            ResizePlan::Keep { size } => size,
            ResizePlan::Upscale { output, .. } => output,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, ResizePlan::Keep { .. })
    }
}

/// Build the resize plan for a source size.
pub fn build_plan(input: Size) -> Result<ResizePlan, DimensionError> {
    let class = classify(input)?;
    if class.already_pow2 {
        Ok(ResizePlan::Keep { size: input })
    } else {
        Ok(ResizePlan::Upscale {
            input,
            output: class.target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_pow2_examples() {
        assert_eq!(next_power_of_two(1), Some(1));
        assert_eq!(next_power_of_two(2), Some(2));
        assert_eq!(next_power_of_two(3), Some(4));
        assert_eq!(next_power_of_two(70), Some(128));
        assert_eq!(next_power_of_two(130), Some(256));
        assert_eq!(next_power_of_two(256), Some(256));
        assert_eq!(next_power_of_two(257), Some(512));
        assert_eq!(next_power_of_two(1 << 31), Some(1 << 31));
        assert_eq!(next_power_of_two((1 << 31) + 1), None);
        assert_eq!(next_power_of_two(0), None);
    }

    #[test]
    fn next_pow2_is_ceiling_for_small_range() {
        for n in 1..=5000u32 {
            let p = next_power_of_two(n).unwrap();
            assert!(p >= n, "{p} < {n}");
            assert!(is_power_of_two(p), "{p} not pow2");
            assert!(p / 2 < n, "{p} is not the smallest pow2 >= {n}");
        }
    }

    #[test]
    fn next_pow2_idempotent_on_powers() {
        for shift in 0..32 {
            let p = 1u32 << shift;
            assert_eq!(next_power_of_two(p), Some(p));
        }
    }

    #[test]
    fn is_pow2_check() {
        assert!(!is_power_of_two(0));
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(512));
        assert!(!is_power_of_two(3));
        assert!(!is_power_of_two(640));
    }

    #[test]
    fn classify_npot_texture() {
        let c = classify(Size::new(130, 70)).unwrap();
        assert!(!c.already_pow2);
        assert_eq!(c.target, Size::new(256, 128));
    }

    #[test]
    fn classify_pow2_texture() {
        let c = classify(Size::new(256, 256)).unwrap();
        assert!(c.already_pow2);
        assert_eq!(c.target, Size::new(256, 256));
    }

    #[test]
    fn classify_one_side_npot() {
        let c = classify(Size::new(64, 48)).unwrap();
        assert!(!c.already_pow2);
        assert_eq!(c.target, Size::new(64, 64));
    }

    #[test]
    fn classify_rejects_zero() {
        assert_eq!(
            classify(Size::new(0, 16)),
            Err(DimensionError::Zero { axis: "width" })
        );
        assert_eq!(
            classify(Size::new(16, 0)),
            Err(DimensionError::Zero { axis: "height" })
        );
    }

    #[test]
    fn plan_is_noop_for_pow2() {
        let plan = build_plan(Size::new(128, 32)).unwrap();
        assert!(plan.is_noop());
        assert_eq!(plan.output(), Size::new(128, 32));

        let plan = build_plan(Size::new(100, 32)).unwrap();
        assert_eq!(
            plan,
            ResizePlan::Upscale {
                input: Size::new(100, 32),
                output: Size::new(128, 32)
            }
        );
    }
}
