//! # Textures
//!
//! Decoded raster textures plus the two core operations on them:
//! [`classify`] and [`resize`].
//!
//! A [`Texture`] keeps the pixel format it was decoded with (channel count and
//! bit depth). Resizing never converts it, so an 8-bit luma+alpha TGA comes
//! back out as 8-bit luma+alpha.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use fast_image_resize::Resizer;
use image::{ColorType, DynamicImage, ImageBuffer, ImageDecoder, ImageFormat};
use pow2_scale::cpu::{resize_pixels, PixelLayout, SampleDepth};
use pow2_scale::dims::{self, Classification, ResizePlan, Size};
use pow2_scale::filter::ResampleFilter;

use crate::error::{TextureError, TextureResult};

const IN_MEMORY: &str = "<memory>";

/// What a texture file holds, read from its header without decoding pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureHeader {
    pub size: Size,
    pub format: ImageFormat,
    pub layout: PixelLayout,
}

/// A decoded texture and where it came from.
#[derive(Debug, Clone)]
pub struct Texture {
    image: DynamicImage,
    origin: Option<PathBuf>,
    format: Option<ImageFormat>,
}

impl Texture {
    /// Wrap an in-memory image.
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image,
            origin: None,
            format: None,
        }
    }

    /// Read and decode a texture from disk.
    ///
    /// The format comes from the extension first (TGA has no magic bytes) and
    /// from the content second.
    pub fn open(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| TextureError::io("read", path, e))?;
        Self::decode(&bytes, path)
    }

    /// Read only the header of the texture at `path`.
    pub fn read_header(path: &Path) -> TextureResult<TextureHeader> {
        let mut reader =
            image::ImageReader::open(path).map_err(|e| TextureError::io("read", path, e))?;
        if reader.format().is_none() {
            reader = reader
                .with_guessed_format()
                .map_err(|e| TextureError::io("read", path, e))?;
        }
        let format = reader
            .format()
            .ok_or_else(|| TextureError::invalid_image(path, "unrecognised image format"))?;
        reader.no_limits();

        let decoder = reader
            .into_decoder()
            .map_err(|e| TextureError::invalid_image(path, e.to_string()))?;
        let (w, h) = decoder.dimensions();
        Ok(TextureHeader {
            size: Size::new(w, h),
            format,
            layout: layout_of(decoder.color_type(), path)?,
        })
    }

    /// Decode a texture from an in-memory file image. `path` is used for
    /// format detection and error reporting only.
    pub fn decode(bytes: &[u8], path: &Path) -> TextureResult<Self> {
        let format = ImageFormat::from_path(path)
            .ok()
            .or_else(|| image::guess_format(bytes).ok())
            .ok_or_else(|| TextureError::invalid_image(path, "unrecognised image format"))?;

        let mut reader = image::ImageReader::with_format(Cursor::new(bytes), format);
        reader.no_limits();
        let image = reader
            .decode()
            .map_err(|e| TextureError::invalid_image(path, e.to_string()))?;

        if image.width() == 0 || image.height() == 0 {
            return Err(TextureError::invalid_image(
                path,
                format!("zero-sized image ({}x{})", image.width(), image.height()),
            ));
        }
        layout_of(image.color(), path)?;

        Ok(Self {
            image,
            origin: Some(path.to_path_buf()),
            format: Some(format),
        })
    }

    pub fn size(&self) -> Size {
        Size::new(self.image.width(), self.image.height())
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut DynamicImage {
        &mut self.image
    }

    /// Container format the texture was decoded from.
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    pub fn origin(&self) -> &Path {
        self.origin.as_deref().unwrap_or(Path::new(IN_MEMORY))
    }

    pub fn layout(&self) -> TextureResult<PixelLayout> {
        layout_of(self.image.color(), self.origin())
    }

    /// Encode losslessly to `path` in `format`.
    pub fn save(&self, path: &Path, format: ImageFormat) -> TextureResult<()> {
        self.image
            .save_with_format(path, format)
            .map_err(|source| match source {
                image::ImageError::IoError(e) => TextureError::io("write", path, e),
                source => TextureError::Encode {
                    path: path.to_path_buf(),
                    format: format!("{format:?}"),
                    source,
                },
            })
    }
}

fn layout_of(color: ColorType, path: &Path) -> TextureResult<PixelLayout> {
    let (channels, depth) = match color {
        ColorType::L8 => (1, SampleDepth::U8),
        ColorType::La8 => (2, SampleDepth::U8),
        ColorType::Rgb8 => (3, SampleDepth::U8),
        ColorType::Rgba8 => (4, SampleDepth::U8),
        ColorType::L16 => (1, SampleDepth::U16),
        ColorType::La16 => (2, SampleDepth::U16),
        ColorType::Rgb16 => (3, SampleDepth::U16),
        ColorType::Rgba16 => (4, SampleDepth::U16),
        ColorType::Rgb32F => (3, SampleDepth::F32),
        ColorType::Rgba32F => (4, SampleDepth::F32),
        other => {
            return Err(TextureError::invalid_image(
                path,
                format!("unsupported pixel format {other:?}"),
            ))
        }
    };
    Ok(PixelLayout::new(channels, depth))
}

fn u16_samples(bytes: Vec<u8>) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|b| u16::from_ne_bytes([b[0], b[1]]))
        .collect()
}

fn f32_samples(bytes: Vec<u8>) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Rebuild a `DynamicImage` of `color` from tightly packed native-endian bytes.
fn image_from_bytes(color: ColorType, size: Size, bytes: Vec<u8>) -> Option<DynamicImage> {
    let (w, h) = (size.w, size.h);
    let image = match color {
        ColorType::L8 => DynamicImage::ImageLuma8(ImageBuffer::from_raw(w, h, bytes)?),
        ColorType::La8 => DynamicImage::ImageLumaA8(ImageBuffer::from_raw(w, h, bytes)?),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(ImageBuffer::from_raw(w, h, bytes)?),
        ColorType::Rgba8 => DynamicImage::ImageRgba8(ImageBuffer::from_raw(w, h, bytes)?),
        ColorType::L16 => DynamicImage::ImageLuma16(ImageBuffer::from_raw(w, h, u16_samples(bytes))?),
        ColorType::La16 => {
            DynamicImage::ImageLumaA16(ImageBuffer::from_raw(w, h, u16_samples(bytes))?)
        }
        ColorType::Rgb16 => DynamicImage::ImageRgb16(ImageBuffer::from_raw(w, h, u16_samples(bytes))?),
        ColorType::Rgba16 => {
            DynamicImage::ImageRgba16(ImageBuffer::from_raw(w, h, u16_samples(bytes))?)
        }
        ColorType::Rgb32F => {
            DynamicImage::ImageRgb32F(ImageBuffer::from_raw(w, h, f32_samples(bytes))?)
        }
        ColorType::Rgba32F => {
            DynamicImage::ImageRgba32F(ImageBuffer::from_raw(w, h, f32_samples(bytes))?)
        }
        _ => return None,
    };
    Some(image)
}

/// Whether both sides are already powers of two, and the next power-of-two
/// size either way.
pub fn classify(texture: &Texture) -> TextureResult<Classification> {
    dims::classify(texture.size())
        .map_err(|e| TextureError::invalid_image(texture.origin(), e.to_string()))
}

/// Keep the texture as it is, or upscale it to its power-of-two target.
pub fn plan(texture: &Texture) -> TextureResult<ResizePlan> {
    dims::build_plan(texture.size())
        .map_err(|e| TextureError::invalid_image(texture.origin(), e.to_string()))
}

/// Resample `texture` to exactly `width` x `height` with `filter`.
///
/// The input is not modified. Alpha is resampled with the same kernel as
/// colour and is never premultiplied or remapped.
pub fn resize(
    texture: &Texture,
    width: u32,
    height: u32,
    filter: ResampleFilter,
) -> TextureResult<Texture> {
    resize_with(&mut Resizer::new(), texture, width, height, filter)
}

/// [`resize`] taking the filter by name, as it arrives from configuration.
pub fn resize_named(
    texture: &Texture,
    width: u32,
    height: u32,
    filter: &str,
) -> TextureResult<Texture> {
    let filter: ResampleFilter = filter.parse()?;
    resize(texture, width, height, filter)
}

/// [`resize`] reusing a caller-owned resizer, for batch workers.
pub fn resize_with(
    resizer: &mut Resizer,
    texture: &Texture,
    width: u32,
    height: u32,
    filter: ResampleFilter,
) -> TextureResult<Texture> {
    let origin = texture.origin();
    let layout = texture.layout()?;
    let target = Size::new(width, height);

    let pixels = resize_pixels(
        resizer,
        texture.image.as_bytes(),
        texture.size(),
        layout,
        target,
        filter,
    )
    .map_err(|source| TextureError::Resize {
        path: origin.to_path_buf(),
        source,
    })?;

    let image = image_from_bytes(texture.image.color(), target, pixels).ok_or_else(|| {
        TextureError::invalid_image(origin, "resized buffer does not match target size")
    })?;

    Ok(Texture {
        image,
        origin: texture.origin.clone(),
        format: texture.format,
    })
}
