//! # Power-of-Two Texture Rebuild Library
//!
//! Classifies PS2-era textures by whether their sides are exact powers of
//! two and upscales the ones that are not, in batch, without disturbing the
//! halved-opacity alpha convention.
//!
//! ## Architecture
//!
//! - `texture`: decoding, lossless encoding, `classify` and `resize`
//! - `alpha`: opacity profiling under the halved-opacity convention
//! - `batch`: directory walk and parallel per-file pipeline
//! - `report`: JSON summary of a run
//! - `config`: batch configuration and validation
//! - `error`: error type with per-file paths and fatal classification
//!
//! Dimension math and the resampling kernels live in the `pow2-scale` crate
//! and are re-exported here.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use texture_pow2::{classify, resize, ResampleFilter, Texture};
//!
//! # fn example() -> texture_pow2::TextureResult<()> {
//! let texture = Texture::open("dump/w_face.tga")?;
//! let class = classify(&texture)?;
//! if !class.already_pow2 {
//!     let out = resize(&texture, class.target.w, class.target.h, ResampleFilter::Kaiser)?;
//!     out.save(Path::new("rebuilt/w_face.tga"), image::ImageFormat::Tga)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod alpha;
pub mod batch;
pub mod config;
pub mod error;
pub mod report;
pub mod texture;

pub use pow2_scale;
pub use pow2_scale::dims::{is_power_of_two, next_power_of_two, Classification, ResizePlan, Size};
pub use pow2_scale::filter::{ResampleFilter, UnsupportedFilter};

pub use alpha::{OpacityClass, OpacityProfile};
pub use batch::{run_batch, Action, BatchSummary};
pub use config::BatchConfig;
pub use error::{TextureError, TextureResult};
pub use texture::{classify, plan, resize, resize_named, Texture, TextureHeader};
