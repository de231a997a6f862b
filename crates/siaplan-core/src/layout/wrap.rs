use crate::layout::font::FontMetrics;

/// Greedy word-wrap against a measured width budget.
///
/// Words accumulate into a line while the measured width of the line
/// stays within `max_width`; a word that would overflow starts a new
/// line. A single word wider than the budget still gets its own line
/// (overflow is accepted, not corrected).
pub fn wrap_text(text: &str, font: &FontMetrics, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if font.text_width(&candidate, size) <= max_width {
            current = candidate;
        } else {
            if !current.is_empty() {
                lines.push(current);
            }
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font::{BuiltinFace, FontMetrics};

    fn font() -> FontMetrics {
        FontMetrics::Builtin(BuiltinFace::Helvetica)
    }

    #[test]
    fn test_short_text_single_line() {
        let lines = wrap_text("One surface", &font(), 12.0, 300.0);
        assert_eq!(lines, vec!["One surface"]);
    }

    #[test]
    fn test_every_line_fits_budget() {
        let f = font();
        let text = "Direct restoration - tooth coloured - One surface. A filling to repair a small area of decay.";
        let budget = 140.0;
        let lines = wrap_text(text, &f, 12.0, budget);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(
                f.text_width(line, 12.0) <= budget,
                "line '{line}' exceeds budget"
            );
        }
    }

    #[test]
    fn test_rejoining_reproduces_normalized_text() {
        let f = font();
        let text = "Crown -  Porcelain   fused to metal. A durable crown.";
        let lines = wrap_text(text, &f, 12.0, 120.0);
        let rejoined = lines.join(" ");
        let normalized: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, normalized.join(" "));
    }

    #[test]
    fn test_oversized_word_kept_whole() {
        let f = font();
        let lines = wrap_text("supercalifragilistic filling", &f, 12.0, 30.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "supercalifragilistic");
    }

    #[test]
    fn test_empty_text_no_lines() {
        assert!(wrap_text("   ", &font(), 12.0, 100.0).is_empty());
    }
}
