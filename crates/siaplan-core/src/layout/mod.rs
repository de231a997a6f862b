pub mod font;
pub mod wrap;

use crate::error::PlanError;
use crate::model::{TreatmentItem, TreatmentPlan};
use crate::settings::{TemplateSettings, PAGE_HEIGHT, PAGE_WIDTH};
use font::{FontId, FontSet};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use wrap::wrap_text;

// Brand palette, matching the on-screen treatment plan styling.
pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
pub const DARK_GRAY: Color = Color::new(0.12, 0.16, 0.22);
pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
pub const TEAL: Color = Color::new(0.17, 0.75, 0.70);
pub const PURPLE: Color = Color::new(0.65, 0.20, 0.55);
pub const BORDER_GRAY: Color = Color::new(0.85, 0.85, 0.85);
pub const TOTAL_BAND_GRAY: Color = Color::new(0.9, 0.9, 0.9);

const INTRO_FONT_SIZE: f32 = 32.0;
const INTRO_LINE_1: &str = "A personalised";
const INTRO_LINE_2: &str = "treatment plan for:";
const PHOTO_RING_THICKNESS: f32 = 3.0;

const HEADER_BLOCK_FONT_SIZE: f32 = 12.0;
const TABLE_HEADER_HEIGHT: f32 = 45.0;
const TABLE_HEADER_FONT_SIZE: f32 = 14.0;
const ROW_FONT_SIZE: f32 = 12.0;
const ROW_LINE_HEIGHT: f32 = 16.0;
const DESC_PADDING: f32 = 8.0;
const FEE_RIGHT_PADDING: f32 = 10.0;
const TOTAL_BAND_HEIGHT: f32 = 50.0;
const TOTAL_FONT_SIZE: f32 = 16.0;

pub const BRAND_NAME: &str = "SIA Dental";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Color {
        Color { r, g, b }
    }
}

/// One drawing instruction in the logical 810x1440 page space,
/// bottom-left origin. Text x is the final (already aligned) position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        font: FontId,
        color: Color,
        text: String,
    },
    RectFill {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    LineSeg {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        thickness: f32,
        color: Color,
    },
    CircleStroke {
        cx: f32,
        cy: f32,
        radius: f32,
        thickness: f32,
        color: Color,
    },
    Photo {
        x: f32,
        y: f32,
        size: f32,
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageKind {
    Cover,
    Table { index: usize, is_last: bool },
    Team,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub kind: PageKind,
    pub width: f32,
    pub height: f32,
    pub background: Option<PathBuf>,
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    pub pages: Vec<PageLayout>,
}

/// Proportional column widths for a given table width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnWidths {
    pub item: f32,
    pub tooth: f32,
    pub description: f32,
    pub qty: f32,
    pub fee: f32,
}

impl ColumnWidths {
    pub fn for_table(table_width: f32) -> ColumnWidths {
        ColumnWidths {
            item: table_width * 0.10,
            tooth: table_width * 0.10,
            description: table_width * 0.50,
            qty: table_width * 0.12,
            fee: table_width * 0.18,
        }
    }
}

/// Number of table pages for `item_count` items at `per_page` capacity.
/// There is always at least one table page, even with zero items.
pub fn table_page_count(item_count: usize, per_page: usize) -> usize {
    let per_page = per_page.max(1);
    item_count.div_ceil(per_page).max(1)
}

/// Currency text, two decimals with thousands separators.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let text = format!("{:.2}", rounded);
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::new();
    let bytes = int_part.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*b as char);
    }

    format!("{sign}${grouped}.{frac_part}")
}

/// Deterministically lay out a treatment plan into an ordered page
/// sequence: cover, one or more table pages, then the closing team page.
pub fn layout_document(
    plan: &TreatmentPlan,
    settings: &TemplateSettings,
    fonts: &FontSet,
) -> Result<DocumentLayout, PlanError> {
    let team = plan.location.team();
    let team_page = settings
        .team_pages
        .get(&team)
        .cloned()
        .ok_or_else(|| PlanError::MissingTeamPage {
            team: team.to_string(),
        })?;

    let mut pages = Vec::new();
    pages.push(cover_page(plan, settings, fonts));

    let items = plan.visible_items();
    let per_page = settings.max_rows_per_page.max(1);
    let page_count = table_page_count(items.len(), per_page);

    for page_index in 0..page_count {
        let start = page_index * per_page;
        let end = (start + per_page).min(items.len());
        let page_items = if start < items.len() {
            &items[start..end]
        } else {
            &[]
        };
        let is_last = page_index + 1 == page_count;
        pages.push(table_page(
            plan, settings, fonts, page_items, page_index, is_last,
        ));
    }

    pages.push(PageLayout {
        kind: PageKind::Team,
        width: PAGE_WIDTH,
        height: PAGE_HEIGHT,
        background: Some(team_page),
        ops: Vec::new(),
    });

    Ok(DocumentLayout { pages })
}

fn centered_x(text: &str, font: &font::FontMetrics, size: f32) -> f32 {
    (PAGE_WIDTH - font.text_width(text, size)) / 2.0
}

fn cover_page(plan: &TreatmentPlan, settings: &TemplateSettings, fonts: &FontSet) -> PageLayout {
    let mut ops = Vec::new();

    ops.push(DrawOp::Text {
        x: centered_x(INTRO_LINE_1, &fonts.regular, INTRO_FONT_SIZE),
        y: 580.0,
        size: INTRO_FONT_SIZE,
        font: FontId::Regular,
        color: DARK_GRAY,
        text: INTRO_LINE_1.to_string(),
    });
    ops.push(DrawOp::Text {
        x: centered_x(INTRO_LINE_2, &fonts.regular, INTRO_FONT_SIZE),
        y: 540.0,
        size: INTRO_FONT_SIZE,
        font: FontId::Regular,
        color: DARK_GRAY,
        text: INTRO_LINE_2.to_string(),
    });

    ops.push(DrawOp::Text {
        x: centered_x(
            &plan.patient_name,
            &fonts.bold,
            settings.patient_name_font_size,
        ),
        y: settings.patient_name_position.y,
        size: settings.patient_name_font_size,
        font: FontId::Bold,
        color: PURPLE,
        text: plan.patient_name.clone(),
    });

    if let Some(photo) = &plan.doctor_photo {
        let frame = settings.doctor_photo_frame;
        // White mask over any photo baked into the background art.
        ops.push(DrawOp::RectFill {
            x: frame.x - 5.0,
            y: frame.y - 5.0,
            width: frame.size + 14.0,
            height: frame.size + 14.0,
            color: WHITE,
        });
        ops.push(DrawOp::Photo {
            x: frame.x,
            y: frame.y,
            size: frame.size,
            path: photo.clone(),
        });
        ops.push(DrawOp::CircleStroke {
            cx: frame.x + frame.size / 2.0,
            cy: frame.y + frame.size / 2.0,
            radius: frame.size / 2.0,
            thickness: PHOTO_RING_THICKNESS,
            color: TEAL,
        });
    }

    ops.push(DrawOp::Text {
        x: settings.doctor_name_position.x,
        y: settings.doctor_name_position.y,
        size: settings.doctor_name_font_size,
        font: FontId::Bold,
        color: BLACK,
        text: plan.doctor_name.clone(),
    });

    PageLayout {
        kind: PageKind::Cover,
        width: PAGE_WIDTH,
        height: PAGE_HEIGHT,
        background: settings.cover_background.clone(),
        ops,
    }
}

fn table_page(
    plan: &TreatmentPlan,
    settings: &TemplateSettings,
    fonts: &FontSet,
    items: &[&TreatmentItem],
    page_index: usize,
    is_last: bool,
) -> PageLayout {
    let table_x = settings.table_margin_x;
    let table_width = PAGE_WIDTH - settings.table_margin_x * 2.0;
    let cols = ColumnWidths::for_table(table_width);
    let mut ops = Vec::new();

    // The first table page carries the document's self-describing header
    // lines; continuation pages only repeat the table itself.
    if page_index == 0 {
        let header_lines = [
            format!("{} {}", BRAND_NAME, plan.location),
            format!("Plan by: {}", plan.doctor_name),
            format!("Date Created: {}", plan.date.format("%d/%m/%Y")),
        ];
        let mut y = PAGE_HEIGHT - 60.0;
        for line in header_lines {
            ops.push(DrawOp::Text {
                x: table_x,
                y,
                size: HEADER_BLOCK_FONT_SIZE,
                font: FontId::Regular,
                color: DARK_GRAY,
                text: line,
            });
            y -= 24.0;
        }
    }

    let mut current_y = settings.table_start_y;

    // Header bar with centred white captions.
    ops.push(DrawOp::RectFill {
        x: table_x,
        y: current_y - TABLE_HEADER_HEIGHT,
        width: table_width,
        height: TABLE_HEADER_HEIGHT,
        color: DARK_GRAY,
    });
    let header_y = current_y - 28.0;
    let captions = [
        ("Item", table_x, cols.item),
        ("Tooth", table_x + cols.item, cols.tooth),
        ("Description", table_x + cols.item + cols.tooth, cols.description),
        (
            "Qty",
            table_x + cols.item + cols.tooth + cols.description,
            cols.qty,
        ),
        (
            "Fee",
            table_x + cols.item + cols.tooth + cols.description + cols.qty,
            cols.fee,
        ),
    ];
    for (caption, col_x, col_width) in captions {
        let width = fonts.bold.text_width(caption, TABLE_HEADER_FONT_SIZE);
        ops.push(DrawOp::Text {
            x: col_x + col_width / 2.0 - width / 2.0,
            y: header_y,
            size: TABLE_HEADER_FONT_SIZE,
            font: FontId::Bold,
            color: WHITE,
            text: caption.to_string(),
        });
    }
    current_y -= TABLE_HEADER_HEIGHT;

    for item in items {
        row_ops(&mut ops, item, settings, fonts, table_x, table_width, &cols, current_y);
        current_y -= settings.row_height;
    }

    if is_last {
        let total_y = current_y - TOTAL_BAND_HEIGHT;
        ops.push(DrawOp::RectFill {
            x: table_x,
            y: total_y,
            width: table_width,
            height: TOTAL_BAND_HEIGHT,
            color: TOTAL_BAND_GRAY,
        });
        ops.push(DrawOp::Text {
            x: table_x + table_width - 220.0,
            y: total_y + 15.0,
            size: TOTAL_FONT_SIZE,
            font: FontId::Bold,
            color: DARK_GRAY,
            text: "TOTAL AMOUNT:".to_string(),
        });
        let total_text = format_currency(plan.total_amount());
        let total_width = fonts.bold.text_width(&total_text, TOTAL_FONT_SIZE);
        ops.push(DrawOp::Text {
            x: table_x + table_width - total_width - FEE_RIGHT_PADDING,
            y: total_y + 15.0,
            size: TOTAL_FONT_SIZE,
            font: FontId::Bold,
            color: DARK_GRAY,
            text: total_text,
        });
    }

    let background = if page_index == 0 {
        settings.table_background.clone()
    } else {
        settings
            .table_continuation_background
            .clone()
            .or_else(|| settings.table_background.clone())
    };

    PageLayout {
        kind: PageKind::Table {
            index: page_index,
            is_last,
        },
        width: PAGE_WIDTH,
        height: PAGE_HEIGHT,
        background,
        ops,
    }
}

#[allow(clippy::too_many_arguments)]
fn row_ops(
    ops: &mut Vec<DrawOp>,
    item: &TreatmentItem,
    settings: &TemplateSettings,
    fonts: &FontSet,
    table_x: f32,
    table_width: f32,
    cols: &ColumnWidths,
    top_y: f32,
) {
    let row_height = settings.row_height;
    let row_y = top_y - row_height;

    // Vertical separators, then the bottom rule.
    let mut separators = vec![table_x];
    let mut col_x = table_x;
    for width in [cols.item, cols.tooth, cols.description, cols.qty] {
        col_x += width;
        separators.push(col_x);
    }
    separators.push(table_x + table_width);
    for x in separators {
        ops.push(DrawOp::LineSeg {
            x1: x,
            y1: top_y,
            x2: x,
            y2: row_y,
            thickness: 1.0,
            color: BORDER_GRAY,
        });
    }
    ops.push(DrawOp::LineSeg {
        x1: table_x,
        y1: row_y,
        x2: table_x + table_width,
        y2: row_y,
        thickness: 1.0,
        color: BORDER_GRAY,
    });

    let mid_y = row_y + row_height / 2.0 - 3.0;

    let code_width = fonts.regular.text_width(&item.item_code, ROW_FONT_SIZE);
    ops.push(DrawOp::Text {
        x: table_x + cols.item / 2.0 - code_width / 2.0,
        y: mid_y,
        size: ROW_FONT_SIZE,
        font: FontId::Regular,
        color: DARK_GRAY,
        text: item.item_code.clone(),
    });

    let tooth_width = fonts.regular.text_width(&item.tooth, ROW_FONT_SIZE);
    ops.push(DrawOp::Text {
        x: table_x + cols.item + cols.tooth / 2.0 - tooth_width / 2.0,
        y: mid_y,
        size: ROW_FONT_SIZE,
        font: FontId::Regular,
        color: DARK_GRAY,
        text: item.tooth.clone(),
    });

    // Description wraps within its column and centres as a block.
    let desc_x = table_x + cols.item + cols.tooth + DESC_PADDING;
    let desc_budget = cols.description - DESC_PADDING * 2.0;
    let lines = wrap_text(&item.description, &fonts.regular, ROW_FONT_SIZE, desc_budget);
    let block_height = lines.len() as f32 * ROW_LINE_HEIGHT;
    let mut text_y = row_y + (row_height + block_height) / 2.0 - ROW_LINE_HEIGHT + 2.0;
    for line in lines {
        ops.push(DrawOp::Text {
            x: desc_x,
            y: text_y,
            size: ROW_FONT_SIZE,
            font: FontId::Regular,
            color: DARK_GRAY,
            text: line,
        });
        text_y -= ROW_LINE_HEIGHT;
    }

    // Fee sub-entries stack in the qty column, centred as a block.
    let fee_lines: Vec<String> = item
        .fees
        .iter()
        .map(|f| {
            if item.fees.len() > 1 || f.quantity > 1 {
                format!("{} x {}", f.quantity, format_currency(f.unit_fee))
            } else {
                f.quantity.to_string()
            }
        })
        .collect();
    let qty_center = table_x + cols.item + cols.tooth + cols.description + cols.qty / 2.0;
    let fee_block_height = fee_lines.len() as f32 * ROW_LINE_HEIGHT;
    let mut fee_y = row_y + (row_height + fee_block_height) / 2.0 - ROW_LINE_HEIGHT + 2.0;
    for line in fee_lines {
        let width = fonts.regular.text_width(&line, ROW_FONT_SIZE);
        ops.push(DrawOp::Text {
            x: qty_center - width / 2.0,
            y: fee_y,
            size: ROW_FONT_SIZE,
            font: FontId::Regular,
            color: DARK_GRAY,
            text: line,
        });
        fee_y -= ROW_LINE_HEIGHT;
    }

    // Row total, right-aligned once per row.
    let total_text = format_currency(item.total_fee());
    let total_width = fonts.regular.text_width(&total_text, ROW_FONT_SIZE);
    ops.push(DrawOp::Text {
        x: table_x + table_width - total_width - FEE_RIGHT_PADDING,
        y: mid_y,
        size: ROW_FONT_SIZE,
        font: FontId::Regular,
        color: DARK_GRAY,
        text: total_text,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeeEntry, Location, TreatmentItem, TreatmentPlan};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn settings() -> TemplateSettings {
        let mut s = TemplateSettings::default();
        for loc in Location::ALL {
            s.team_pages
                .insert(loc.team(), PathBuf::from(format!("team-{}.png", loc.team())));
        }
        s
    }

    fn plan_with_items(n: usize) -> TreatmentPlan {
        let mut plan = TreatmentPlan::new(
            NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            Location::Essendon,
        );
        plan.patient_name = "Mr John Citizen".into();
        plan.doctor_name = "Dr Jane Smith".into();
        plan.items = (0..n)
            .map(|i| {
                let mut item = TreatmentItem::new();
                item.item_code = format!("{}", 311 + i);
                item.description = "Direct restoration - one surface".into();
                item.tooth = "18".into();
                item.fees = vec![FeeEntry::new(1, dec!(180))];
                item
            })
            .collect();
        plan
    }

    fn table_pages(layout: &DocumentLayout) -> Vec<&PageLayout> {
        layout
            .pages
            .iter()
            .filter(|p| matches!(p.kind, PageKind::Table { .. }))
            .collect()
    }

    #[test]
    fn test_page_count_formula() {
        for (items, per_page, expected) in
            [(0, 5, 1), (1, 5, 1), (5, 5, 1), (6, 5, 2), (11, 5, 3), (12, 4, 3)]
        {
            assert_eq!(table_page_count(items, per_page), expected);
        }
    }

    #[test]
    fn test_layout_page_sequence() {
        let fonts = FontSet::builtin();
        let layout = layout_document(&plan_with_items(7), &settings(), &fonts).unwrap();
        // cover + 2 table pages + team
        assert_eq!(layout.pages.len(), 4);
        assert_eq!(layout.pages[0].kind, PageKind::Cover);
        assert_eq!(
            layout.pages[1].kind,
            PageKind::Table {
                index: 0,
                is_last: false
            }
        );
        assert_eq!(
            layout.pages[2].kind,
            PageKind::Table {
                index: 1,
                is_last: true
            }
        );
        assert_eq!(layout.pages[3].kind, PageKind::Team);
    }

    #[test]
    fn test_zero_items_still_one_table_page() {
        let fonts = FontSet::builtin();
        let mut plan = plan_with_items(0);
        plan.items = vec![TreatmentItem::new()]; // blank row from the editor
        let layout = layout_document(&plan, &settings(), &fonts).unwrap();
        assert_eq!(table_pages(&layout).len(), 1);
    }

    #[test]
    fn test_capacity_caps_rows_even_with_space() {
        let fonts = FontSet::builtin();
        let mut s = settings();
        s.max_rows_per_page = 2;
        let layout = layout_document(&plan_with_items(5), &s, &fonts).unwrap();
        assert_eq!(table_pages(&layout).len(), 3);
    }

    #[test]
    fn test_grand_total_on_last_table_page_only() {
        let fonts = FontSet::builtin();
        let layout = layout_document(&plan_with_items(12), &settings(), &fonts).unwrap();
        let with_total: Vec<bool> = table_pages(&layout)
            .iter()
            .map(|p| {
                p.ops.iter().any(|op| {
                    matches!(op, DrawOp::Text { text, .. } if text == "TOTAL AMOUNT:")
                })
            })
            .collect();
        assert_eq!(with_total, vec![false, false, true]);
    }

    #[test]
    fn test_grand_total_is_plan_total_not_page_total() {
        let fonts = FontSet::builtin();
        let plan = plan_with_items(7);
        let layout = layout_document(&plan, &settings(), &fonts).unwrap();
        let expected = format_currency(plan.total_amount());
        let last = *table_pages(&layout).last().unwrap();
        assert!(last
            .ops
            .iter()
            .any(|op| matches!(op, DrawOp::Text { text, .. } if *text == expected)));
    }

    #[test]
    fn test_blank_items_filtered() {
        let fonts = FontSet::builtin();
        let mut plan = plan_with_items(2);
        plan.items.push(TreatmentItem::new());
        let layout = layout_document(&plan, &settings(), &fonts).unwrap();
        assert_eq!(table_pages(&layout).len(), 1);
        let codes: Vec<&str> = table_pages(&layout)[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } if text.len() == 3 && text.chars().all(|c| c.is_ascii_digit()) => {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(codes, vec!["311", "312"]);
    }

    #[test]
    fn test_deterministic_layout() {
        let fonts = FontSet::builtin();
        let plan = plan_with_items(6);
        let a = layout_document(&plan, &settings(), &fonts).unwrap();
        let b = layout_document(&plan, &settings(), &fonts).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_team_page_is_error() {
        let fonts = FontSet::builtin();
        let s = TemplateSettings::default();
        let err = layout_document(&plan_with_items(1), &s, &fonts).unwrap_err();
        assert!(matches!(err, PlanError::MissingTeamPage { .. }));
    }

    #[test]
    fn test_photo_ops_only_when_photo_present() {
        let fonts = FontSet::builtin();
        let mut plan = plan_with_items(1);
        let without = layout_document(&plan, &settings(), &fonts).unwrap();
        assert!(!without.pages[0]
            .ops
            .iter()
            .any(|op| matches!(op, DrawOp::Photo { .. })));

        plan.doctor_photo = Some(PathBuf::from("dr-jane-smith.jpg"));
        let with = layout_document(&plan, &settings(), &fonts).unwrap();
        assert!(with.pages[0]
            .ops
            .iter()
            .any(|op| matches!(op, DrawOp::Photo { .. })));
        assert!(with.pages[0]
            .ops
            .iter()
            .any(|op| matches!(op, DrawOp::CircleStroke { .. })));
    }

    #[test]
    fn test_fee_line_formats() {
        let fonts = FontSet::builtin();
        let mut plan = plan_with_items(1);
        plan.items[0].fees = vec![FeeEntry::new(1, dec!(180))];
        let layout = layout_document(&plan, &settings(), &fonts).unwrap();
        // Single entry, quantity 1: bare quantity.
        assert!(table_pages(&layout)[0]
            .ops
            .iter()
            .any(|op| matches!(op, DrawOp::Text { text, .. } if text == "1")));

        plan.items[0].fees = vec![FeeEntry::new(2, dec!(180))];
        let layout = layout_document(&plan, &settings(), &fonts).unwrap();
        assert!(table_pages(&layout)[0]
            .ops
            .iter()
            .any(|op| matches!(op, DrawOp::Text { text, .. } if text == "2 x $180.00")));
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(dec!(180)), "$180.00");
        assert_eq!(format_currency(dec!(1234.5)), "$1,234.50");
        assert_eq!(format_currency(dec!(1234567.89)), "$1,234,567.89");
        assert_eq!(format_currency(dec!(0)), "$0.00");
    }

    #[test]
    fn test_column_widths_proportions() {
        let cols = ColumnWidths::for_table(690.0);
        let sum = cols.item + cols.tooth + cols.description + cols.qty + cols.fee;
        assert!((sum - 690.0).abs() < 0.01);
        assert!((cols.description - 345.0).abs() < 0.01);
    }
}
