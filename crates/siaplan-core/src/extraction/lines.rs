use crate::extraction::{PageRuns, TextRun};
use std::cmp::Ordering;

/// Default baseline tolerance, in logical points. Wide enough to absorb
/// baseline jitter between runs of one visual line, narrow enough not to
/// merge adjacent table rows.
pub const DEFAULT_LINE_TOLERANCE: f32 = 5.0;

/// Reconstruct plain-text lines from positioned runs.
///
/// Per page: walk the runs top of page first, accumulating into the
/// current line while each run's y stays within `tolerance` of the y
/// that opened the line, then order the accumulated runs left to right
/// and join them. Pages are concatenated in order into one flat
/// sequence.
///
/// Best effort only: a visually single line may come back split, and
/// two close lines may merge. Downstream parsing tolerates both.
pub fn reconstruct_lines(pages: &[PageRuns], tolerance: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for page in pages {
        let mut runs: Vec<&TextRun> = page
            .runs
            .iter()
            .filter(|r| !r.text.trim().is_empty())
            .collect();
        runs.sort_by(|a, b| {
            b.y.partial_cmp(&a.y)
                .unwrap_or(Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
        });

        let mut current: Vec<&TextRun> = Vec::new();
        let mut current_y = f32::NAN;

        for run in runs {
            if current_y.is_nan() || (run.y - current_y).abs() > tolerance {
                flush_line(&mut lines, &mut current);
                current_y = run.y;
            }
            current.push(run);
        }
        flush_line(&mut lines, &mut current);
    }

    lines
}

/// Join one line's runs left to right and push the trimmed result.
fn flush_line(lines: &mut Vec<String>, current: &mut Vec<&TextRun>) {
    if current.is_empty() {
        return;
    }
    current.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
    let joined = current
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let joined = joined.trim();
    if !joined.is_empty() {
        lines.push(joined.to_string());
    }
    current.clear();
}
