//! Image re-encoding: flatten, downscale, write.

use super::{remove_best_effort, reserve};
use crate::error::AppError;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

/// Bounding box and lossy quality for one kind of stored image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSpec {
    pub max_side: u32,
    pub quality: u8,
}

impl ImageSpec {
    /// Gallery pictures, faculty and testimonial photos.
    pub const PHOTO: ImageSpec = ImageSpec { max_side: 800, quality: 85 };
    pub const AVATAR: ImageSpec = ImageSpec { max_side: 300, quality: 85 };
    pub const THUMBNAIL: ImageSpec = ImageSpec { max_side: 300, quality: 80 };
}

pub const THUMBNAIL_PREFIX: &str = "thumb_";

/// Composites any transparency onto white so lossy encoders can take it.
pub fn flatten(img: DynamicImage) -> DynamicImage {
    if !img.color().has_alpha() {
        return DynamicImage::ImageRgb8(img.to_rgb8());
    }
    let (width, height) = img.dimensions();
    let mut background = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut background, &img.to_rgba8(), 0, 0);
    DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(background).to_rgb8())
}

/// Shrinks `img` so neither side exceeds `max_side`, keeping the aspect
/// ratio. Smaller images are left alone.
pub fn fit_within(img: DynamicImage, max_side: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_side && height <= max_side {
        return img;
    }
    img.resize(max_side, max_side, FilterType::Lanczos3)
}

fn encode<W: Write + Seek>(
    img: &DynamicImage,
    format: ImageFormat,
    quality: u8,
    writer: &mut W,
) -> Result<(), AppError> {
    match format {
        ImageFormat::Jpeg => {
            img.write_with_encoder(JpegEncoder::new_with_quality(writer, quality))?
        }
        ImageFormat::Png => img.write_with_encoder(PngEncoder::new_with_quality(
            writer,
            CompressionType::Best,
            PngFilter::Adaptive,
        ))?,
        other => img.write_to(writer, other)?,
    }
    Ok(())
}

fn process(img: DynamicImage, spec: ImageSpec) -> DynamicImage {
    fit_within(flatten(img), spec.max_side)
}

/// Writes `img` to the already reserved file, removing it again if encoding
/// fails halfway.
fn write_reserved(
    img: &DynamicImage,
    format: ImageFormat,
    quality: u8,
    file: File,
    path: &Path,
) -> Result<(), AppError> {
    let mut writer = BufWriter::new(file);
    let written = encode(img, format, quality, &mut writer)
        .and_then(|_| writer.flush().map_err(AppError::from));
    if written.is_err() {
        remove_best_effort(path);
    }
    written
}

fn format_for(filename: &str) -> Result<ImageFormat, AppError> {
    super::extension_of(filename)
        .and_then(ImageFormat::from_extension)
        .ok_or_else(|| AppError::field("file", "Unsupported image type."))
}

/// Decodes an uploaded image, normalises it to `spec` and stores it in
/// `dir`. Returns the stored file name.
pub fn save_image(
    bytes: &[u8],
    original_name: &str,
    dir: &Path,
    spec: ImageSpec,
) -> Result<String, AppError> {
    let format = format_for(original_name)?;
    let img = image::load_from_memory(bytes)
        .map_err(|_| AppError::field("file", "The uploaded file is not a readable image."))?;
    let img = process(img, spec);

    let (name, file) = reserve(dir, original_name)?;
    write_reserved(&img, format, spec.quality, file, &dir.join(&name))?;
    Ok(name)
}

/// Derives a smaller copy of a stored image as `thumb_<name>` in
/// `thumb_dir`. Returns the thumbnail's file name.
pub fn create_thumbnail(source: &Path, thumb_dir: &Path) -> Result<String, AppError> {
    let source_name = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::BadRequest("invalid image path".to_string()))?;
    let format = format_for(source_name)?;
    let img = process(image::open(source)?, ImageSpec::THUMBNAIL);

    std::fs::create_dir_all(thumb_dir)?;
    let name = format!("{}{}", THUMBNAIL_PREFIX, source_name);
    let path = thumb_dir.join(&name);
    write_reserved(&img, format, ImageSpec::THUMBNAIL.quality, File::create(&path)?, &path)?;
    Ok(name)
}
