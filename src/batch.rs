//! # Batch Processing
//!
//! Walks an input directory and runs every texture through
//! load → plan → opacity audit → resize or pass-through.
//!
//! Textures are independent, so they are spread over a rayon pool with no
//! ordering between them. A failing texture is recorded and the batch keeps
//! going; the summary is sorted by path once all workers are done.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use fast_image_resize::Resizer;
use image::ImageFormat;
use pow2_scale::cpu::{PixelLayout, SampleDepth};
use pow2_scale::dims::{build_plan, ResizePlan, Size};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::alpha::{clamp_alpha_ceiling, OpacityClass, OpacityProfile};
use crate::config::BatchConfig;
use crate::error::{TextureError, TextureResult};
use crate::texture::{plan, resize_with, Texture};

/// What happened to one texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Upscaled to its power-of-two target and written.
    Resized,
    /// Already pow2; copied byte-for-byte.
    PassedThrough,
    /// Already pow2 and `skip_pow2` is set; nothing written.
    Skipped,
    /// Dry run; nothing written.
    Planned,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Resized => "resized",
            Action::PassedThrough => "passed_through",
            Action::Skipped => "skipped",
            Action::Planned => "planned",
        }
    }
}

#[derive(Clone, Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub output: Option<PathBuf>,
    pub source: Size,
    pub target: Size,
    pub already_pow2: bool,
    pub action: Action,
    pub opacity: OpacityProfile,
}

#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: TextureError,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<FileOutcome>,
    pub failures: Vec<FileFailure>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn count(&self, action: Action) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }

    /// Textures that were not already power-of-two sized.
    pub fn npot(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.already_pow2)
    }

    pub fn full_range_alpha(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.opacity.class() == OpacityClass::FullRange)
    }
}

/// Texture files found under the input directory, plus the paths the walk
/// could not read.
#[derive(Debug, Default)]
pub struct Inputs {
    pub files: Vec<PathBuf>,
    pub unreadable: Vec<FileFailure>,
}

/// Collect texture files under `config.input_dir`, sorted.
///
/// An unreadable input directory is an error. Unreadable sub-directories and
/// entries are returned in [`Inputs::unreadable`] so the batch can report
/// them. The output directory and symlinked directories are never descended
/// into.
pub fn collect_inputs(config: &BatchConfig) -> TextureResult<Inputs> {
    let mut inputs = Inputs::default();
    let output = config.output_dir.canonicalize().ok();
    let entries = fs::read_dir(&config.input_dir)
        .map_err(|e| TextureError::io("read directory", &config.input_dir, e))?;
    visit(&config.input_dir, entries, config, output.as_deref(), &mut inputs);
    inputs.files.sort();
    Ok(inputs)
}

fn record_unreadable(inputs: &mut Inputs, path: &Path, error: io::Error) {
    warn!("skipping {}: {error}", path.display());
    inputs.unreadable.push(FileFailure {
        path: path.to_path_buf(),
        error: TextureError::io("read directory", path, error),
    });
}

fn visit(
    dir: &Path,
    entries: fs::ReadDir,
    config: &BatchConfig,
    output: Option<&Path>,
    inputs: &mut Inputs,
) {
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                record_unreadable(inputs, dir, e);
                continue;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                record_unreadable(inputs, &path, e);
                continue;
            }
        };

        if file_type.is_symlink() && path.is_dir() {
            debug!("not following directory symlink {}", path.display());
        } else if file_type.is_dir() {
            if !config.recursive {
                continue;
            }
            if output.is_some_and(|out| path.canonicalize().is_ok_and(|p| p == out)) {
                continue;
            }
            match fs::read_dir(&path) {
                Ok(sub) => visit(&path, sub, config, output, inputs),
                Err(e) => record_unreadable(inputs, &path, e),
            }
        } else if config.accepts(&path) {
            inputs.files.push(path);
        } else {
            debug!("ignoring non-texture file {}", path.display());
        }
    }
}

/// Lossless container to write a resized texture into.
///
/// PNG, TGA, BMP and TIFF sources keep their container when it can hold the
/// pixel format; lossy or limited containers fall back to PNG, and float
/// textures go to OpenEXR.
pub fn output_format(source: Option<ImageFormat>, depth: SampleDepth, channels: u8) -> ImageFormat {
    if depth == SampleDepth::F32 {
        return ImageFormat::OpenExr;
    }
    match source {
        Some(ImageFormat::Png) => ImageFormat::Png,
        Some(ImageFormat::Tga) if depth == SampleDepth::U8 => ImageFormat::Tga,
        Some(ImageFormat::Bmp) if depth == SampleDepth::U8 => ImageFormat::Bmp,
        Some(ImageFormat::Tiff) if channels != 2 => ImageFormat::Tiff,
        _ => ImageFormat::Png,
    }
}

/// Mirror `path` from the input tree into the output tree.
fn mirrored(config: &BatchConfig, path: &Path) -> PathBuf {
    let relative = path
        .strip_prefix(&config.input_dir)
        .unwrap_or_else(|_| Path::new(path.file_name().unwrap_or(path.as_os_str())));
    config.output_dir.join(relative)
}

fn with_format_extension(
    path: PathBuf,
    source: Option<ImageFormat>,
    format: ImageFormat,
) -> PathBuf {
    if source == Some(format) {
        return path;
    }
    match format.extensions_str().first() {
        Some(ext) => path.with_extension(ext),
        None => path,
    }
}

/// File written for `path` under `plan`, or `None` when nothing is.
fn destination(
    config: &BatchConfig,
    path: &Path,
    plan: &ResizePlan,
    source: Option<ImageFormat>,
    layout: PixelLayout,
) -> Option<PathBuf> {
    match plan {
        ResizePlan::Keep { .. } if config.skip_pow2 => None,
        ResizePlan::Keep { .. } => Some(mirrored(config, path)),
        ResizePlan::Upscale { .. } => {
            let format = output_format(source, layout.depth, layout.channels);
            Some(with_format_extension(mirrored(config, path), source, format))
        }
    }
}

/// Destination worked out from the file header alone. Files whose header
/// cannot be read are left for [`process_file`] to report.
fn planned_destination(config: &BatchConfig, path: &Path) -> Option<PathBuf> {
    let header = Texture::read_header(path)
        .inspect_err(|e| debug!("no output planned: {e}"))
        .ok()?;
    let plan = build_plan(header.size).ok()?;
    destination(config, path, &plan, Some(header.format), header.layout)
}

/// Give every output file to exactly one input.
///
/// `files` must be sorted. When several inputs map to the same output, the
/// one already named like the output keeps it (`tex.png` over `tex.jpg`),
/// otherwise the first in path order. The rest are returned as failures.
fn claim_outputs(
    config: &BatchConfig,
    files: Vec<PathBuf>,
    planned: &[Option<PathBuf>],
) -> (Vec<PathBuf>, Vec<FileFailure>) {
    let mut claims: BTreeMap<&Path, Vec<usize>> = BTreeMap::new();
    for (i, dest) in planned.iter().enumerate() {
        if let Some(dest) = dest {
            claims.entry(dest.as_path()).or_default().push(i);
        }
    }

    let mut rejected = vec![false; files.len()];
    let mut failures = Vec::new();
    for (dest, sources) in claims.into_iter().filter(|(_, s)| s.len() > 1) {
        let winner = sources
            .iter()
            .copied()
            .find(|&i| mirrored(config, &files[i]) == dest)
            .unwrap_or(sources[0]);
        for &i in sources.iter().filter(|&&i| i != winner) {
            rejected[i] = true;
            failures.push(FileFailure {
                path: files[i].clone(),
                error: TextureError::OutputCollision {
                    path: files[i].clone(),
                    output: dest.to_path_buf(),
                    claimed_by: files[winner].clone(),
                },
            });
        }
    }

    let kept = files
        .into_iter()
        .zip(rejected)
        .filter_map(|(f, r)| (!r).then_some(f))
        .collect();
    (kept, failures)
}

fn ensure_parent(path: &Path) -> TextureResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| TextureError::io("create directory", parent, e))?;
    }
    Ok(())
}

/// Run one texture through the pipeline.
pub fn process_file(
    resizer: &mut Resizer,
    config: &BatchConfig,
    path: &Path,
) -> TextureResult<FileOutcome> {
    let texture = Texture::open(path)?;
    let plan = plan(&texture)?;
    let opacity = OpacityProfile::measure(texture.image());

    if opacity.class() == OpacityClass::FullRange {
        warn!(
            "{}: alpha reaches {} (> 128), not in halved-opacity range",
            path.display(),
            opacity.max_alpha()
        );
    }

    let mut outcome = FileOutcome {
        path: path.to_path_buf(),
        output: None,
        source: texture.size(),
        target: plan.output(),
        already_pow2: plan.is_noop(),
        action: Action::Planned,
        opacity,
    };

    if config.dry_run {
        if !outcome.already_pow2 {
            info!("{}: {} -> {} (planned)", path.display(), outcome.source, outcome.target);
        }
        return Ok(outcome);
    }

    let layout = texture.layout()?;
    let Some(dest) = destination(config, path, &plan, texture.format(), layout) else {
        debug!("{}: already {}, skipped", path.display(), outcome.source);
        outcome.action = Action::Skipped;
        return Ok(outcome);
    };
    ensure_parent(&dest)?;

    match plan {
        ResizePlan::Keep { size } => {
            fs::copy(path, &dest).map_err(|e| TextureError::io("copy", &dest, e))?;
            debug!("{}: already {size}, copied", path.display());
            outcome.action = Action::PassedThrough;
        }
        ResizePlan::Upscale { input, output } => {
            let mut resized = resize_with(resizer, &texture, output.w, output.h, config.filter)?;
            if config.clamp_alpha && opacity.class() == OpacityClass::Halved {
                clamp_alpha_ceiling(resized.image_mut(), opacity.max_stored);
            }
            let format = output_format(texture.format(), layout.depth, layout.channels);
            resized.save(&dest, format)?;
            info!("{}: {input} -> {output} ({})", path.display(), config.filter);
            outcome.action = Action::Resized;
        }
    }
    outcome.output = Some(dest);
    Ok(outcome)
}

/// Process every texture under the input directory.
///
/// Returns `Err` only for problems that invalidate the whole run (bad
/// configuration, unreadable input directory, thread pool failure).
/// Per-texture failures land in [`BatchSummary::failures`], together with
/// unreadable directories and inputs that would overwrite another input's
/// output.
pub fn run_batch(config: &BatchConfig) -> TextureResult<BatchSummary> {
    config.validate()?;
    let Inputs { files, unreadable } = collect_inputs(config)?;
    info!(
        "found {} texture(s) in {} (filter: {})",
        files.len(),
        config.input_dir.display(),
        config.filter
    );
    if !config.dry_run {
        fs::create_dir_all(&config.output_dir)
            .map_err(|e| TextureError::io("create directory", &config.output_dir, e))?;
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = config.jobs {
        builder = builder.num_threads(jobs);
    }
    let pool = builder
        .build()
        .map_err(|e| TextureError::config("jobs", e.to_string()))?;

    let planned: Vec<Option<PathBuf>> = pool.install(|| {
        files
            .par_iter()
            .map(|path| planned_destination(config, path))
            .collect()
    });
    let (files, collisions) = claim_outputs(config, files, &planned);

    let done = AtomicUsize::new(0);
    let total = files.len();
    let results: Vec<(PathBuf, TextureResult<FileOutcome>)> = pool.install(|| {
        files
            .par_iter()
            .map_init(Resizer::new, |resizer, path| {
                let result = process_file(resizer, config, path);
                let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                debug!("[{n}/{total}] {}", path.display());
                (path.clone(), result)
            })
            .collect()
    });

    let mut summary = BatchSummary {
        outcomes: Vec::new(),
        failures: unreadable,
    };
    for failure in collisions {
        tracing::error!("{}", failure.error);
        summary.failures.push(failure);
    }
    for (path, result) in results {
        match result {
            Ok(outcome) => summary.outcomes.push(outcome),
            Err(error) => {
                tracing::error!("{error}");
                summary.failures.push(FileFailure { path, error });
            }
        }
    }
    summary.outcomes.sort_by(|a, b| a.path.cmp(&b.path));
    summary.failures.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_keeps_lossless_containers() {
        assert_eq!(output_format(Some(ImageFormat::Png), SampleDepth::U16, 4), ImageFormat::Png);
        assert_eq!(output_format(Some(ImageFormat::Tga), SampleDepth::U8, 4), ImageFormat::Tga);
        assert_eq!(output_format(Some(ImageFormat::Bmp), SampleDepth::U8, 3), ImageFormat::Bmp);
        assert_eq!(output_format(Some(ImageFormat::Tiff), SampleDepth::U16, 3), ImageFormat::Tiff);
    }

    #[test]
    fn output_format_falls_back_to_png() {
        assert_eq!(output_format(Some(ImageFormat::Jpeg), SampleDepth::U8, 3), ImageFormat::Png);
        assert_eq!(output_format(Some(ImageFormat::Tga), SampleDepth::U16, 4), ImageFormat::Png);
        assert_eq!(output_format(None, SampleDepth::U8, 4), ImageFormat::Png);
        assert_eq!(output_format(Some(ImageFormat::Png), SampleDepth::F32, 4), ImageFormat::OpenExr);
    }

    #[test]
    fn jpeg_output_is_renamed_to_png() {
        let p = with_format_extension(
            PathBuf::from("out/sky.jpg"),
            Some(ImageFormat::Jpeg),
            ImageFormat::Png,
        );
        assert_eq!(p, PathBuf::from("out/sky.png"));

        let p = with_format_extension(
            PathBuf::from("out/face.tga"),
            Some(ImageFormat::Tga),
            ImageFormat::Tga,
        );
        assert_eq!(p, PathBuf::from("out/face.tga"));
    }

    #[test]
    fn mirrored_keeps_relative_layout() {
        let config = BatchConfig::new("dump", "rebuilt");
        assert_eq!(
            mirrored(&config, Path::new("dump/stage/a.tga")),
            PathBuf::from("rebuilt/stage/a.tga")
        );
    }

    #[test]
    fn destination_follows_plan() {
        let config = BatchConfig::new("dump", "rebuilt");
        let rgb8 = PixelLayout::new(3, SampleDepth::U8);
        let keep = ResizePlan::Keep {
            size: Size::new(64, 64),
        };
        let upscale = ResizePlan::Upscale {
            input: Size::new(100, 60),
            output: Size::new(128, 64),
        };

        assert_eq!(
            destination(&config, Path::new("dump/sky.jpg"), &keep, Some(ImageFormat::Jpeg), rgb8),
            Some(PathBuf::from("rebuilt/sky.jpg"))
        );
        assert_eq!(
            destination(&config, Path::new("dump/sky.jpg"), &upscale, Some(ImageFormat::Jpeg), rgb8),
            Some(PathBuf::from("rebuilt/sky.png"))
        );

        let config = config.skip_pow2(true);
        assert_eq!(
            destination(&config, Path::new("dump/sky.jpg"), &keep, Some(ImageFormat::Jpeg), rgb8),
            None
        );
    }

    #[test]
    fn shared_output_goes_to_the_same_named_input() {
        let config = BatchConfig::new("dump", "rebuilt");
        let files = vec![
            PathBuf::from("dump/a.png"),
            PathBuf::from("dump/tex.jpg"),
            PathBuf::from("dump/tex.png"),
        ];
        let planned = vec![
            Some(PathBuf::from("rebuilt/a.png")),
            Some(PathBuf::from("rebuilt/tex.png")),
            Some(PathBuf::from("rebuilt/tex.png")),
        ];

        let (kept, failures) = claim_outputs(&config, files, &planned);
        assert_eq!(kept, vec![PathBuf::from("dump/a.png"), PathBuf::from("dump/tex.png")]);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path, PathBuf::from("dump/tex.jpg"));
        match &failures[0].error {
            TextureError::OutputCollision {
                output, claimed_by, ..
            } => {
                assert_eq!(output, &PathBuf::from("rebuilt/tex.png"));
                assert_eq!(claimed_by, &PathBuf::from("dump/tex.png"));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn unplanned_inputs_are_kept() {
        let config = BatchConfig::new("dump", "rebuilt");
        let files = vec![PathBuf::from("dump/broken.png"), PathBuf::from("dump/ok.png")];
        let planned = vec![None, Some(PathBuf::from("rebuilt/ok.png"))];
        let (kept, failures) = claim_outputs(&config, files.clone(), &planned);
        assert_eq!(kept, files);
        assert!(failures.is_empty());
    }

    #[test]
    fn unreadable_paths_become_failures() {
        let mut inputs = Inputs::default();
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        record_unreadable(&mut inputs, Path::new("dump/locked"), err);

        assert_eq!(inputs.unreadable.len(), 1);
        assert_eq!(inputs.unreadable[0].path, PathBuf::from("dump/locked"));
        assert_eq!(inputs.unreadable[0].error.category(), "io");
    }
}
