//! スクリーンショットから固定領域を切り出す
//!
//! デコード結果の画素形式（RGB / RGBA / 16bit など）に関わらず
//! 切り出しは同じ処理で行う。

use crate::error::PipelineError;
use auction_ocr_common::ImageRegion;
use image::{DynamicImage, GenericImageView};

/// 画像バイト列をデコード
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PipelineError> {
    image::load_from_memory(bytes).map_err(|e| PipelineError::DecodeFailed(e.to_string()))
}

/// デコード済み画像から矩形を切り出す
///
/// 矩形が画像からはみ出す場合は `OutOfBounds`（部分的な画像は返さない）。
pub fn crop(image: &DynamicImage, region: ImageRegion) -> Result<DynamicImage, PipelineError> {
    let (image_width, image_height) = image.dimensions();
    if !region.fits_within(image_width, image_height) {
        return Err(PipelineError::OutOfBounds {
            region,
            image_width,
            image_height,
        });
    }
    Ok(image.crop_imm(region.x, region.y, region.width, region.height))
}

/// 画像バイト列から矩形を切り出す
pub fn extract(bytes: &[u8], region: ImageRegion) -> Result<DynamicImage, PipelineError> {
    let image = decode(bytes)?;
    crop(&image, region)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(image: DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
        buf
    }

    #[test]
    fn test_extract_returns_requested_dimensions() {
        let bytes = png_bytes(DynamicImage::ImageRgba8(RgbaImage::new(100, 80)));

        for region in [
            ImageRegion::new(0, 0, 100, 80),
            ImageRegion::new(10, 20, 30, 40),
            ImageRegion::new(99, 79, 1, 1),
        ] {
            let cropped = extract(&bytes, region).unwrap();
            assert_eq!(cropped.dimensions(), (region.width, region.height));
        }
    }

    #[test]
    fn test_extract_copies_pixels_from_offset() {
        let mut img = RgbaImage::new(50, 50);
        img.put_pixel(12, 22, Rgba([255, 0, 0, 128]));
        let bytes = png_bytes(DynamicImage::ImageRgba8(img));

        let cropped = extract(&bytes, ImageRegion::new(10, 20, 5, 5)).unwrap();
        assert_eq!(cropped.get_pixel(2, 2), Rgba([255, 0, 0, 128]));
        assert_eq!(cropped.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_extract_without_alpha_channel() {
        let mut img = RgbImage::new(20, 20);
        img.put_pixel(5, 5, Rgb([1, 2, 3]));
        let bytes = png_bytes(DynamicImage::ImageRgb8(img));

        let cropped = extract(&bytes, ImageRegion::new(5, 5, 2, 2)).unwrap();
        assert_eq!(cropped.get_pixel(0, 0), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_out_of_bounds_regions_fail() {
        let bytes = png_bytes(DynamicImage::ImageRgba8(RgbaImage::new(100, 80)));

        for region in [
            ImageRegion::new(90, 0, 11, 10),
            ImageRegion::new(0, 70, 10, 11),
            ImageRegion::new(200, 200, 5, 5),
            ImageRegion::new(0, 0, 0, 5),
            ImageRegion::new(u32::MAX, 0, 5, 5),
        ] {
            let err = extract(&bytes, region).unwrap_err();
            assert!(
                matches!(err, PipelineError::OutOfBounds { image_width: 100, image_height: 80, .. }),
                "{} should be out of bounds",
                region
            );
        }
    }

    #[test]
    fn test_malformed_bytes_fail_to_decode() {
        let err = extract(b"not an image", ImageRegion::new(0, 0, 1, 1)).unwrap_err();
        assert!(matches!(err, PipelineError::DecodeFailed(_)));
    }
}
