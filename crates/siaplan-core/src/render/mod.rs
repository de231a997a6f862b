mod photo;

use crate::error::PlanError;
use crate::layout::font::{FontId, FontSet};
use crate::layout::{Color, DocumentLayout, DrawOp, PageLayout};
use printpdf::image_crate::GenericImageView;
use printpdf::utils::{calculate_points_for_circle, calculate_points_for_rect};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color as PdfColor, Image, ImageTransform, IndirectFontRef, Line, Mm,
    PdfDocument, PdfLayerReference, Polygon, Pt, Rgb,
};
use std::io::BufWriter;
use std::path::Path;

struct PdfFonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Render a laid-out document into PDF bytes.
///
/// A configured but unusable background or team asset aborts the whole
/// generation; a failing doctor photo is logged and skipped.
pub fn render_pdf(layout: &DocumentLayout, fonts: &FontSet) -> Result<Vec<u8>, PlanError> {
    let Some(first) = layout.pages.first() else {
        return Err(PlanError::Render("document has no pages".into()));
    };

    let (doc, first_page, first_layer) = PdfDocument::new(
        "Treatment Plan",
        Mm::from(Pt(first.width as f32)),
        Mm::from(Pt(first.height as f32)),
        "Layer 1",
    );

    let pdf_fonts = embed_fonts(&doc, fonts)?;

    for (index, page) in layout.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_idx, layer_idx) = doc.add_page(
                Mm::from(Pt(page.width as f32)),
                Mm::from(Pt(page.height as f32)),
                "Layer 1",
            );
            doc.get_page(page_idx).get_layer(layer_idx)
        };
        render_page(&layer, page, &pdf_fonts)?;
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| PlanError::Render(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| PlanError::Render(format!("PDF buffer error: {e}")))
}

fn embed_fonts(
    doc: &printpdf::PdfDocumentReference,
    fonts: &FontSet,
) -> Result<PdfFonts, PlanError> {
    if let Some(bytes) = &fonts.ttf_bytes {
        match (
            doc.add_external_font(bytes.as_slice()),
            doc.add_external_font(bytes.as_slice()),
        ) {
            (Ok(regular), Ok(bold)) => return Ok(PdfFonts { regular, bold }),
            _ => {
                tracing::warn!("external font could not be embedded, using built-in face");
            }
        }
    }

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| PlanError::Render(format!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| PlanError::Render(format!("PDF font error: {e}")))?;
    Ok(PdfFonts { regular, bold })
}

fn render_page(
    layer: &PdfLayerReference,
    page: &PageLayout,
    fonts: &PdfFonts,
) -> Result<(), PlanError> {
    if let Some(background) = &page.background {
        draw_background(layer, background, page.width, page.height)?;
    }

    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                font,
                color,
                text,
            } => {
                layer.set_fill_color(pdf_color(*color));
                let font_ref = match font {
                    FontId::Regular => &fonts.regular,
                    FontId::Bold => &fonts.bold,
                };
                layer.use_text(
                    text.clone(),
                    *size as f32,
                    Mm::from(Pt(*x as f32)),
                    Mm::from(Pt(*y as f32)),
                    font_ref,
                );
            }
            DrawOp::RectFill {
                x,
                y,
                width,
                height,
                color,
            } => {
                layer.set_fill_color(pdf_color(*color));
                let points = calculate_points_for_rect(
                    Pt(*width as f32),
                    Pt(*height as f32),
                    Pt((*x + *width / 2.0) as f32),
                    Pt((*y + *height / 2.0) as f32),
                );
                layer.add_polygon(Polygon {
                    rings: vec![points],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::NonZero,
                });
            }
            DrawOp::LineSeg {
                x1,
                y1,
                x2,
                y2,
                thickness,
                color,
            } => {
                layer.set_outline_color(pdf_color(*color));
                layer.set_outline_thickness(*thickness as f32);
                layer.add_line(Line {
                    points: vec![
                        (point(*x1, *y1), false),
                        (point(*x2, *y2), false),
                    ],
                    is_closed: false,
                });
            }
            DrawOp::CircleStroke {
                cx,
                cy,
                radius,
                thickness,
                color,
            } => {
                layer.set_outline_color(pdf_color(*color));
                layer.set_outline_thickness(*thickness as f32);
                layer.add_line(Line {
                    points: calculate_points_for_circle(
                        Pt(*radius as f32),
                        Pt(*cx as f32),
                        Pt(*cy as f32),
                    ),
                    is_closed: true,
                });
            }
            DrawOp::Photo { x, y, size, path } => match photo::circular_photo(path) {
                Ok(image) => draw_image(layer, &image, *x, *y, *size, *size),
                Err(reason) => {
                    // The document still generates without the photo.
                    tracing::warn!(path = %path.display(), reason, "skipping doctor photo");
                }
            },
        }
    }

    Ok(())
}

fn draw_background(
    layer: &PdfLayerReference,
    path: &Path,
    page_width: f32,
    page_height: f32,
) -> Result<(), PlanError> {
    let image = printpdf::image_crate::open(path).map_err(|e| PlanError::TemplateAsset {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    draw_image(layer, &image, 0.0, 0.0, page_width, page_height);
    Ok(())
}

/// Place an image at (x, y) scaled to (width, height) points. At 72 dpi
/// one pixel is one point, so the scale factors are plain ratios.
fn draw_image(
    layer: &PdfLayerReference,
    image: &printpdf::image_crate::DynamicImage,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) {
    let (px_w, px_h) = image.dimensions();
    if px_w == 0 || px_h == 0 {
        return;
    }
    let pdf_image = Image::from_dynamic_image(image);
    pdf_image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm::from(Pt(x as f32))),
            translate_y: Some(Mm::from(Pt(y as f32))),
            rotate: None,
            scale_x: Some(width as f32 / px_w as f32),
            scale_y: Some(height as f32 / px_h as f32),
            dpi: Some(72.0),
        },
    );
}

fn pdf_color(color: Color) -> PdfColor {
    PdfColor::Rgb(Rgb::new(color.r as f32, color.g as f32, color.b as f32, None))
}

fn point(x: f32, y: f32) -> printpdf::Point {
    printpdf::Point::new(Mm::from(Pt(x as f32)), Mm::from(Pt(y as f32)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout_document, PageKind};
    use crate::model::{FeeEntry, Location, TreatmentItem, TreatmentPlan};
    use crate::settings::TemplateSettings;
    use chrono::NaiveDate;
    use printpdf::image_crate::{DynamicImage, ImageFormat, Rgb as ImgRgb, RgbImage};
    use rust_decimal_macros::dec;
    use std::path::PathBuf;

    fn write_png(path: &Path) {
        let mut img = RgbImage::new(4, 4);
        for pixel in img.pixels_mut() {
            *pixel = ImgRgb([240, 240, 240]);
        }
        DynamicImage::ImageRgb8(img)
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }

    fn plan() -> TreatmentPlan {
        let mut plan = TreatmentPlan::new(
            NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            Location::Essendon,
        );
        plan.patient_name = "Mr John Citizen".into();
        plan.doctor_name = "Dr Jane Smith".into();
        let mut item = TreatmentItem::new();
        item.item_code = "311".into();
        item.description = "Direct restoration - one surface".into();
        item.tooth = "18".into();
        item.fees = vec![FeeEntry::new(1, dec!(180))];
        plan.items = vec![item];
        plan
    }

    fn settings_with_team(team_path: PathBuf) -> TemplateSettings {
        let mut settings = TemplateSettings::default();
        settings
            .team_pages
            .insert(Location::Essendon.team(), team_path);
        settings
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let team = dir.path().join("team.png");
        write_png(&team);

        let fonts = FontSet::builtin();
        let layout = layout_document(&plan(), &settings_with_team(team), &fonts).unwrap();
        let bytes = render_pdf(&layout, &fonts).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_missing_team_asset_aborts() {
        let fonts = FontSet::builtin();
        let layout = layout_document(
            &plan(),
            &settings_with_team(PathBuf::from("/nonexistent/team.png")),
            &fonts,
        )
        .unwrap();
        let err = render_pdf(&layout, &fonts).unwrap_err();
        assert!(matches!(err, PlanError::TemplateAsset { .. }));
    }

    #[test]
    fn test_missing_photo_does_not_abort() {
        let dir = tempfile::tempdir().unwrap();
        let team = dir.path().join("team.png");
        write_png(&team);

        let mut plan = plan();
        plan.doctor_photo = Some(PathBuf::from("/nonexistent/photo.jpg"));
        let fonts = FontSet::builtin();
        let layout = layout_document(&plan, &settings_with_team(team), &fonts).unwrap();
        let bytes = render_pdf(&layout, &fonts).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_page_roles_cover_render() {
        let dir = tempfile::tempdir().unwrap();
        let team = dir.path().join("team.png");
        write_png(&team);

        let fonts = FontSet::builtin();
        let layout = layout_document(&plan(), &settings_with_team(team), &fonts).unwrap();
        assert_eq!(layout.pages.first().unwrap().kind, PageKind::Cover);
        assert_eq!(layout.pages.last().unwrap().kind, PageKind::Team);
        assert!(render_pdf(&layout, &fonts).is_ok());
    }
}
