// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image file loading and export encoding.
//!
//! This module decodes background images into RGBA buffers and writes the
//! flattened export next to the source image.

use crate::error::{LoadError, SaveError};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// File extensions offered by the open dialog.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "gif", "webp"];

/// A decoded background image.
pub struct LoadedImage {
    pub path: PathBuf,
    pub pixels: RgbaImage,
}

impl LoadedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Decode an image file into native-resolution RGBA pixels.
pub fn load_image(path: &Path) -> Result<LoadedImage, LoadError> {
    let img = image::open(path).map_err(|source| match source {
        image::ImageError::IoError(source) => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        source => LoadError::Decode {
            path: path.to_path_buf(),
            source,
        },
    })?;
    Ok(LoadedImage {
        path: path.to_path_buf(),
        pixels: img.to_rgba8(),
    })
}

/// `<stem>_edit<.ext>` beside the source image.
pub fn export_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let name = match source.extension() {
        Some(ext) => format!("{}_edit.{}", stem, ext.to_string_lossy()),
        None => format!("{}_edit", stem),
    };
    source.with_file_name(name)
}

/// Encode `img` to `path`, choosing settings from the extension.
///
/// JPEG is flattened to RGB at `jpeg_quality`; PNG is written uncompressed;
/// other formats use their codec defaults and drop the
/// alpha channel when the format has none.
pub fn save_export(img: &RgbaImage, path: &Path, jpeg_quality: u8) -> Result<(), SaveError> {
    let format = ImageFormat::from_path(path).map_err(|source| SaveError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    let encode_err = |source: image::ImageError| SaveError::Encode {
        path: path.to_path_buf(),
        source,
    };

    match format {
        ImageFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
            let encoder = JpegEncoder::new_with_quality(create(path)?, jpeg_quality);
            rgb.write_with_encoder(encoder).map_err(encode_err)
        }
        ImageFormat::Png => {
            let encoder = PngEncoder::new_with_quality(
                create(path)?,
                CompressionType::Uncompressed,
                FilterType::NoFilter,
            );
            img.write_with_encoder(encoder).map_err(encode_err)
        }
        format if has_alpha(format) => img.save_with_format(path, format).map_err(encode_err),
        format => DynamicImage::ImageRgba8(img.clone())
            .to_rgb8()
            .save_with_format(path, format)
            .map_err(encode_err),
    }
}

fn has_alpha(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png
            | ImageFormat::Gif
            | ImageFormat::WebP
            | ImageFormat::Tiff
            | ImageFormat::Tga
            | ImageFormat::Bmp
            | ImageFormat::Ico
            | ImageFormat::Qoi
            | ImageFormat::Farbfeld
            | ImageFormat::Avif
            | ImageFormat::OpenExr
    )
}

fn create(path: &Path) -> Result<BufWriter<File>, SaveError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| SaveError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_export_path_keeps_extension() {
        assert_eq!(
            export_path(Path::new("/walls/forest.JPG")),
            PathBuf::from("/walls/forest_edit.JPG")
        );
        assert_eq!(
            export_path(Path::new("/walls/plain")),
            PathBuf::from("/walls/plain_edit")
        );
    }

    #[test]
    fn test_png_export_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out_edit.png");
        let mut img = RgbaImage::from_pixel(16, 8, Rgba([10, 20, 30, 255]));
        img.put_pixel(3, 4, Rgba([200, 100, 50, 77]));

        save_export(&img, &path, 100).unwrap();
        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.pixels, img);
    }

    #[test]
    fn test_png_export_is_stored_uncompressed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat_edit.png");
        let img = RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 255]));

        save_export(&img, &path, 100).unwrap();
        // A flat image deflates to almost nothing; stored blocks keep every byte.
        let written = std::fs::metadata(&path).unwrap().len();
        assert!(written >= 64 * 64 * 4, "{written} bytes");
    }

    #[test]
    fn test_jpeg_export_is_opaque() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out_edit.jpg");
        let img = RgbaImage::from_pixel(16, 16, Rgba([120, 60, 30, 100]));

        save_export(&img, &path, 100).unwrap();
        let decoded = image::open(&path).unwrap();
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_load_missing_file_is_load_error() {
        let err = load_image(Path::new("/definitely/not/here.png")).err().unwrap();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_load_corrupt_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();
        let err = load_image(&path).err().unwrap();
        assert!(matches!(err, LoadError::Decode { .. }));
    }
}
