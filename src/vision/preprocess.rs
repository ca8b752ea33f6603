//! Screenshot loading and intensity conversion.

use image::{DynamicImage, GrayImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

use crate::screen::screen_model::Rect;
use crate::vision::error::{VisionError, VisionResult};

/// Where a screenshot comes from: a file on disk or an encoded buffer handed
/// over by the capture subsystem.
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
}

impl<'a> ImageSource<'a> {
    fn describe(&self) -> String {
        match self {
            ImageSource::Path(p) => p.display().to_string(),
            ImageSource::Bytes(b) => format!("<{} byte buffer>", b.len()),
        }
    }
}

impl<'a> From<&'a Path> for ImageSource<'a> {
    fn from(path: &'a Path) -> Self {
        ImageSource::Path(path)
    }
}

impl<'a> From<&'a [u8]> for ImageSource<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        ImageSource::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for ImageSource<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        ImageSource::Bytes(bytes.as_slice())
    }
}

pub fn load_image(source: ImageSource<'_>) -> VisionResult<DynamicImage> {
    let decoded = match source {
        ImageSource::Path(path) => image::open(path),
        ImageSource::Bytes(bytes) => image::load_from_memory(bytes),
    };

    decoded.map_err(|source_err| VisionError::ImageLoad {
        origin: source.describe(),
        source: source_err,
    })
}

/// Single-channel intensity image with the same dimensions as `image`,
/// optionally smoothed with a Gaussian of the given (odd) kernel size.
pub fn to_intensity(image: &DynamicImage, blur_kernel_size: Option<u32>) -> GrayImage {
    let gray = image.to_luma8();

    match blur_kernel_size {
        Some(k) if k > 1 => {
            let sigma = sigma_for_kernel(k);
            debug!(kernel = k, sigma, "smoothing intensity image");
            imageproc::filter::gaussian_blur_f32(&gray, sigma)
        }
        _ => gray,
    }
}

/// Standard deviation implied by a kernel size when none is given
/// explicitly (the usual `0.3 * ((k - 1) / 2 - 1) + 0.8` rule).
pub fn sigma_for_kernel(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

pub fn encode_png(image: &DynamicImage) -> VisionResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(VisionError::Encode)?;
    Ok(buf.into_inner())
}

/// Write `image` to `path`, creating missing parent directories. The format
/// follows the file extension.
pub fn save_image(image: &DynamicImage, path: &Path) -> VisionResult<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    image.save(path).map_err(VisionError::Encode)
}

/// Cut `region` out of the screenshot and return it PNG-encoded.
pub fn crop_region(source: ImageSource<'_>, region: Rect) -> VisionResult<Vec<u8>> {
    let image = load_image(source)?;
    let cropped = crop_image(&image, region)?;
    encode_png(&cropped)
}

pub fn crop_image(image: &DynamicImage, region: Rect) -> VisionResult<DynamicImage> {
    let (width, height) = (image.width(), image.height());
    let inside = region.x >= 0
        && region.y >= 0
        && region.width > 0
        && region.height > 0
        && region.right() <= width as i64
        && region.bottom() <= height as i64;

    if !inside {
        return Err(VisionError::InvalidRegion {
            region,
            width,
            height,
        });
    }

    Ok(image.crop_imm(region.x as u32, region.y as u32, region.width, region.height))
}
