//! # Configuration Module
//!
//! Configuration for a batch run, shared by the CLI and by library callers.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Default | Description |
//! |-----------|------|---------|-------------|
//! | `input_dir` | `PathBuf` | - | Directory holding source textures |
//! | `output_dir` | `PathBuf` | - | Directory receiving rebuilt textures |
//! | `filter` | `ResampleFilter` | `lanczos` | Resampling kernel |
//! | `recursive` | `bool` | `false` | Descend into sub-directories |
//! | `skip_pow2` | `bool` | `false` | Do not copy already-pow2 textures to the output |
//! | `dry_run` | `bool` | `false` | Classify only, write nothing |
//! | `clamp_alpha` | `bool` | `true` | Trim alpha overshoot on halved-opacity textures |
//! | `jobs` | `Option<usize>` | `None` | Worker threads (`None` = one per core) |
//! | `extensions` | `Vec<String>` | png, tga, bmp, tif, tiff, jpg, jpeg | Files considered textures |
//! | `report` | `Option<PathBuf>` | `None` | JSON report destination |
//!
//! ## Examples
//!
//! ```rust
//! use texture_pow2::config::BatchConfig;
//! use texture_pow2::ResampleFilter;
//!
//! let config = BatchConfig::new("dump", "rebuilt")
//!     .with_filter_name("kaiser")
//!     .unwrap()
//!     .recursive(true);
//! assert_eq!(config.filter, ResampleFilter::Kaiser);
//! ```

use std::path::{Path, PathBuf};

use pow2_scale::filter::ResampleFilter;

use crate::error::{TextureError, TextureResult};

pub const DEFAULT_EXTENSIONS: [&str; 7] = ["png", "tga", "bmp", "tif", "tiff", "jpg", "jpeg"];

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub filter: ResampleFilter,
    pub recursive: bool,
    /// Already-pow2 textures are classified but not copied to the output.
    pub skip_pow2: bool,
    /// Classify and plan only; nothing is written.
    pub dry_run: bool,
    /// On halved-opacity sources, clamp resampled alpha to the source maximum.
    pub clamp_alpha: bool,
    pub jobs: Option<usize>,
    /// Lower-case extensions without the dot.
    pub extensions: Vec<String>,
    pub report: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            filter: ResampleFilter::default(),
            recursive: false,
            skip_pow2: false,
            dry_run: false,
            clamp_alpha: true,
            jobs: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            report: None,
        }
    }
}

impl BatchConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: ResampleFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Parse and set the filter; unknown names fail with `UnsupportedFilter`.
    pub fn with_filter_name(self, name: &str) -> TextureResult<Self> {
        Ok(self.with_filter(name.parse()?))
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn skip_pow2(mut self, skip: bool) -> Self {
        self.skip_pow2 = skip;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn clamp_alpha(mut self, clamp: bool) -> Self {
        self.clamp_alpha = clamp;
        self
    }

    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Replace the extension list. Leading dots and case are normalised.
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    pub fn report(mut self, report: Option<PathBuf>) -> Self {
        self.report = report;
        self
    }

    /// Whether `path` has one of the configured texture extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .is_some_and(|e| self.extensions.iter().any(|x| *x == e))
    }

    /// Check the configuration before any file is touched.
    pub fn validate(&self) -> TextureResult<()> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(TextureError::config("input_dir", "must not be empty"));
        }
        if !self.input_dir.is_dir() {
            return Err(TextureError::config(
                "input_dir",
                format!("{} is not a directory", self.input_dir.display()),
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(TextureError::config("output_dir", "must not be empty"));
        }
        if same_dir(&self.input_dir, &self.output_dir) {
            return Err(TextureError::config(
                "output_dir",
                "must differ from input_dir; sources are never overwritten",
            ));
        }
        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(TextureError::config(
                "output_dir",
                format!("{} exists and is not a directory", self.output_dir.display()),
            ));
        }
        if self.jobs == Some(0) {
            return Err(TextureError::config("jobs", "must be at least 1"));
        }
        if self.extensions.is_empty() {
            return Err(TextureError::config("extensions", "at least one extension is required"));
        }
        Ok(())
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
