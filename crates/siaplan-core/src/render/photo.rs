use printpdf::image_crate::{self, DynamicImage, GenericImageView, Rgb, RgbImage};
use std::path::Path;

/// Load a practitioner photo and crop it to a circle.
///
/// The source is centre-cropped to a square, then pixels outside the
/// inscribed circle are filled with white (the photo is always drawn
/// over a white mask, so opaque white stands in for transparency).
pub fn circular_photo(path: &Path) -> Result<DynamicImage, String> {
    let source = image_crate::open(path).map_err(|e| e.to_string())?;

    let side = source.width().min(source.height());
    if side == 0 {
        return Err("photo has zero size".into());
    }
    let x0 = (source.width() - side) / 2;
    let y0 = (source.height() - side) / 2;
    let square = source.crop_imm(x0, y0, side, side).to_rgba8();

    let center = side as f32 / 2.0;
    let radius = side as f32 / 2.0;
    let mut out = RgbImage::new(side, side);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - center;
        let dy = y as f32 + 0.5 - center;
        if dx * dx + dy * dy > radius * radius {
            *pixel = Rgb([255, 255, 255]);
        } else {
            let src = square.get_pixel(x, y);
            // Blend any source transparency over white.
            let alpha = src[3] as f32 / 255.0;
            let blend = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)) as u8;
            *pixel = Rgb([blend(src[0]), blend(src[1]), blend(src[2])]);
        }
    }

    Ok(DynamicImage::ImageRgb8(out))
}
