use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use std::path::Path;

/// Which face a draw op uses. The renderer maps these onto the loaded
/// TTF or the built-in Helvetica family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FontId {
    Regular,
    Bold,
}

/// Width measurement for one face.
///
/// Word wrapping and centring must use measured glyph widths, not
/// character counts; a TTF gives exact advances via ab_glyph, and the
/// built-in faces use the standard Helvetica metric tables.
pub enum FontMetrics {
    Ttf(FontVec),
    Builtin(BuiltinFace),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFace {
    Helvetica,
    HelveticaBold,
}

impl FontMetrics {
    /// Measured width of `text` at `size` points.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        match self {
            FontMetrics::Ttf(font) => {
                let scaled = font.as_scaled(PxScale::from(size));
                text.chars()
                    .map(|c| scaled.h_advance(font.glyph_id(c)))
                    .sum()
            }
            FontMetrics::Builtin(face) => {
                let table = match face {
                    BuiltinFace::Helvetica => &HELVETICA_WIDTHS,
                    BuiltinFace::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
                };
                let units: u32 = text.chars().map(|c| char_units(table, c)).sum();
                units as f32 * size / 1000.0
            }
        }
    }
}

/// The fonts a document is laid out and rendered with, plus the raw TTF
/// bytes when an external font is in use (the renderer embeds them).
pub struct FontSet {
    pub regular: FontMetrics,
    pub bold: FontMetrics,
    pub ttf_bytes: Option<Vec<u8>>,
}

impl FontSet {
    /// The built-in Helvetica pair.
    pub fn builtin() -> FontSet {
        FontSet {
            regular: FontMetrics::Builtin(BuiltinFace::Helvetica),
            bold: FontMetrics::Builtin(BuiltinFace::HelveticaBold),
            ttf_bytes: None,
        }
    }

    /// Load the configured TTF, falling back to the built-in faces when
    /// the file is absent or does not parse. Font problems are never
    /// fatal to generation.
    pub fn load(font_path: Option<&Path>) -> FontSet {
        let Some(path) = font_path else {
            return FontSet::builtin();
        };

        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "font not readable, using built-in face");
                return FontSet::builtin();
            }
        };

        match (
            FontVec::try_from_vec(bytes.clone()),
            FontVec::try_from_vec(bytes.clone()),
        ) {
            (Ok(regular), Ok(bold)) => FontSet {
                regular: FontMetrics::Ttf(regular),
                bold: FontMetrics::Ttf(bold),
                ttf_bytes: Some(bytes),
            },
            _ => {
                tracing::warn!(path = %path.display(), "font failed to parse, using built-in face");
                FontSet::builtin()
            }
        }
    }

    pub fn metrics(&self, id: FontId) -> &FontMetrics {
        match id {
            FontId::Regular => &self.regular,
            FontId::Bold => &self.bold,
        }
    }
}

fn char_units(table: &[u16; 95], c: char) -> u32 {
    let code = c as u32;
    if (0x20..=0x7e).contains(&code) {
        table[(code - 0x20) as usize] as u32
    } else {
        // Outside the table, approximate with a typical lowercase advance.
        556
    }
}

/// Helvetica advance widths for ASCII 0x20..=0x7E, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // 'A'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, // 'a'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica-Bold advance widths for ASCII 0x20..=0x7E, in 1/1000 em.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // 'A'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389,
    556, 333, 611, 556, 778, 556, 556, 500, // 'a'..'z'
    389, 280, 389, 584, // '{'..'~'
];
