//! Uploaded image processing. Every upload is re-encoded as PNG; avatars and
//! profile covers also get a fixed-size thumbnail for list views.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use thiserror::Error;

use crate::errors::AppError;

pub const THUMBNAIL_WIDTH: u32 = 160;
pub const THUMBNAIL_HEIGHT: u32 = 120;
const BOX_WIDTH: u32 = 150;
const BOX_HEIGHT: u32 = 110;

const BACKGROUND: Rgb<u8> = Rgb([230, 230, 230]);
const BOX_FILL: Rgb<u8> = Rgb([255, 255, 255]);

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("uploaded file is not a supported image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Decode(_) => {
                AppError::Validation("Upload a valid image. The file you uploaded was either not an image or a corrupted image.".to_string())
            }
            ImageError::Encode(e) => AppError::Internal(anyhow::anyhow!("PNG encoding failed: {e}")),
        }
    }
}

/// The PNG original and, when requested, its thumbnail, ready for upload.
#[derive(Debug)]
pub struct ProcessedImage {
    pub png: Vec<u8>,
    pub thumbnail: Option<Vec<u8>>,
}

pub fn process_image(bytes: &[u8], with_thumbnail: bool) -> Result<ProcessedImage, ImageError> {
    let image = image::load_from_memory(bytes).map_err(ImageError::Decode)?;
    let png = encode_png(&image)?;
    let thumbnail = if with_thumbnail {
        Some(encode_png(&DynamicImage::ImageRgb8(make_thumbnail(&image)))?)
    } else {
        None
    };
    Ok(ProcessedImage { png, thumbnail })
}

/// Shrinks `image` to fit 160×120 (never enlarging), centers it on a white
/// 150×110 box, then centers the box on a light grey 160×120 background.
/// Parts of the image wider than the box are clipped.
pub fn make_thumbnail(image: &DynamicImage) -> RgbImage {
    let fitted = if image.width() > THUMBNAIL_WIDTH || image.height() > THUMBNAIL_HEIGHT {
        image.resize(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT, FilterType::Lanczos3)
    } else {
        image.clone()
    };
    let fitted = fitted.to_rgb8();

    let mut boxed = RgbImage::from_pixel(BOX_WIDTH, BOX_HEIGHT, BOX_FILL);
    imageops::overlay(
        &mut boxed,
        &fitted,
        centered(BOX_WIDTH, fitted.width()),
        centered(BOX_HEIGHT, fitted.height()),
    );

    let mut background = RgbImage::from_pixel(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT, BACKGROUND);
    imageops::overlay(
        &mut background,
        &boxed,
        centered(THUMBNAIL_WIDTH, BOX_WIDTH),
        centered(THUMBNAIL_HEIGHT, BOX_HEIGHT),
    );
    background
}

fn centered(outer: u32, inner: u32) -> i64 {
    (i64::from(outer) - i64::from(inner)).div_euclid(2)
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(ImageError::Encode)?;
    Ok(buffer.into_inner())
}
