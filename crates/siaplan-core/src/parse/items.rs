use crate::model::{FeeEntry, TreatmentItem};
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::LazyLock;

static DECIMAL_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d[\d,]*)\.(\d+)").unwrap());
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static THREE_LETTERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z]{3}").unwrap());
static NUMERIC_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$?\d[\d,]*(?:\.\d+)?").unwrap());

/// Item codes live in this numeric range; anything outside cannot be a
/// billing code.
const CODE_MIN: u32 = 11;
const CODE_MAX: u32 = 999;

/// Recover treatment items from the reconstructed line sequence.
///
/// Each candidate line yields zero or more items, one per surviving
/// 3-digit code candidate. The tie-breaks are deliberately greedy and
/// lossy; misses degrade to warnings upstream, never errors.
pub fn parse_items(lines: &[String]) -> Vec<TreatmentItem> {
    let fee_fragments = collect_fee_fragments(lines);
    let mut seen_codes: HashSet<String> = HashSet::new();
    let mut items = Vec::new();

    for line in lines {
        if is_boilerplate(line) || !THREE_LETTERS.is_match(line) {
            continue;
        }

        let fee = first_decimal(line);
        let tooth = find_tooth(line);
        let description = derive_description(line);

        for candidate in code_candidates(line, &seen_codes, &fee_fragments) {
            // A code with no real description next to it is noise.
            if description.len() <= 3 {
                continue;
            }
            seen_codes.insert(candidate.clone());

            let mut item = TreatmentItem::new();
            item.item_code = candidate;
            item.tooth = tooth
                .as_ref()
                .filter(|t| **t != item.item_code)
                .cloned()
                .unwrap_or_default();
            item.description = description.clone();
            item.fees = vec![FeeEntry::new(1, fee.unwrap_or(Decimal::ZERO))];
            items.push(item);
        }
    }

    items
}

/// Integer parts of every decimal amount in the corpus, both as written
/// (commas stripped) and per thousands group, so "255" in "255.00" and
/// "234" in "1,234.50" are never taken for item codes.
fn collect_fee_fragments(lines: &[String]) -> HashSet<String> {
    let mut fragments = HashSet::new();
    for line in lines {
        for caps in DECIMAL_NUMBER.captures_iter(line) {
            let int_part = &caps[1];
            fragments.insert(int_part.replace(',', ""));
            for group in int_part.split(',') {
                fragments.insert(group.to_string());
            }
        }
    }
    fragments
}

/// Surviving 3-digit code candidates on one line, in order of appearance.
fn code_candidates(
    line: &str,
    seen_codes: &HashSet<String>,
    fee_fragments: &HashSet<String>,
) -> Vec<String> {
    let mut out = Vec::new();
    for m in DIGIT_RUN.find_iter(line) {
        let token = m.as_str();
        if token.len() != 3 {
            continue;
        }
        // Year fragments ("19xx"/"20xx") are never codes.
        if token.starts_with("19") || token.starts_with("20") {
            continue;
        }
        let value: u32 = match token.parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        if !(CODE_MIN..=CODE_MAX).contains(&value) {
            continue;
        }
        if seen_codes.contains(token) || out.iter().any(|c| c == token) {
            continue;
        }
        if fee_fragments.contains(token) {
            continue;
        }
        out.push(token.to_string());
    }
    out
}

/// First decimal-formatted number on the line, commas tolerated.
fn first_decimal(line: &str) -> Option<Decimal> {
    let caps = DECIMAL_NUMBER.captures(line)?;
    let normalized = format!("{}.{}", caps[1].replace(',', ""), &caps[2]);
    Decimal::from_str(&normalized).ok()
}

/// First standalone token in the permanent (11-48) or primary (51-85)
/// tooth ranges. Digits inside decimal amounts do not count.
fn find_tooth(line: &str) -> Option<String> {
    let decimal_spans: Vec<(usize, usize)> = DECIMAL_NUMBER
        .find_iter(line)
        .map(|m| (m.start(), m.end()))
        .collect();

    for m in DIGIT_RUN.find_iter(line) {
        if decimal_spans
            .iter()
            .any(|&(start, end)| m.start() >= start && m.end() <= end)
        {
            continue;
        }
        let token = m.as_str();
        if token.len() != 2 {
            continue;
        }
        let value: u32 = match token.parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        if (11..=48).contains(&value) || (51..=85).contains(&value) {
            return Some(token.to_string());
        }
    }
    None
}

/// The line with all numeric tokens removed, quantity separators
/// dropped, and residual dashes trimmed.
fn derive_description(line: &str) -> String {
    let stripped = NUMERIC_TOKEN.replace_all(line, " ");
    let words: Vec<&str> = stripped
        .split_whitespace()
        .filter(|w| !w.eq_ignore_ascii_case("x"))
        .collect();
    words
        .join(" ")
        .trim_matches(|c: char| c == '-' || c.is_whitespace())
        .to_string()
}

/// Lines that are table headers, boilerplate or address material never
/// contain items.
fn is_boilerplate(line: &str) -> bool {
    let lower = line.to_lowercase();
    if lower.contains("sia dental")
        || lower.contains("plan by")
        || lower.contains("date created")
        || lower.contains("total amount")
        || lower.contains("treatment plan")
    {
        return true;
    }
    // Column caption row.
    if lower.contains("item") && lower.contains("description") {
        return true;
    }
    // Address and contact lines.
    if lower.contains(" rd") || lower.contains(" hwy") || lower.contains("vic ")
        || lower.contains("(03)") || lower.contains(".com.au")
    {
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_basic_item_line() {
        let l = lines(&["1 311 1 Direct restoration - one surface 18 180.00 180.00"]);
        let items = parse_items(&l);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_code, "311");
        assert_eq!(items[0].tooth, "18");
        assert_eq!(items[0].description, "Direct restoration - one surface");
        assert_eq!(items[0].total_fee(), dec!(180.00));
    }

    #[test]
    fn test_fee_fragment_not_a_code() {
        // "255" appears only as the integer part of a fee amount.
        let l = lines(&["322 Tooth extraction 255.00"]);
        let items = parse_items(&l);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_code, "322");
    }

    #[test]
    fn test_fee_fragment_excluded_across_lines() {
        // A standalone "255" is rejected because "255.00" exists
        // elsewhere in the corpus.
        let l = lines(&[
            "322 Tooth extraction 255.00",
            "255 suspicious residue line",
        ]);
        let items = parse_items(&l);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_code, "322");
    }

    #[test]
    fn test_comma_grouped_fee_fragments() {
        // "234" inside "$1,234.50" must not become a code.
        let l = lines(&["613 Crown fitted porcelain 1,234.50"]);
        let items = parse_items(&l);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_code, "613");
        assert_eq!(items[0].total_fee(), dec!(1234.50));
    }

    #[test]
    fn test_year_like_token_rejected() {
        let l = lines(&["201 some historic procedure 90.00"]);
        assert!(parse_items(&l).is_empty());
    }

    #[test]
    fn test_out_of_range_token_rejected() {
        let l = lines(&["008 weird row with letters 50.00"]);
        assert!(parse_items(&l).is_empty());
    }

    #[test]
    fn test_duplicate_code_accepted_once() {
        let l = lines(&[
            "311 Direct restoration one surface 180.00",
            "311 repeated reference to restoration",
        ]);
        let items = parse_items(&l);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_requires_three_consecutive_letters() {
        let l = lines(&["311 18 180.00"]);
        assert!(parse_items(&l).is_empty());
    }

    #[test]
    fn test_short_residual_description_rejected() {
        let l = lines(&["311 abc 180.00"]);
        assert!(parse_items(&l).is_empty());
    }

    #[test]
    fn test_tooth_not_taken_from_fee_decimal() {
        // "45" only appears inside "45.00"; it is a fee, not a tooth.
        let l = lines(&["121 Topical fluoride treatment 45.00"]);
        let items = parse_items(&l);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].tooth, "");
        assert_eq!(items[0].total_fee(), dec!(45.00));
    }

    #[test]
    fn test_primary_tooth_range() {
        let l = lines(&["322 Tooth extraction primary 75 220.00"]);
        let items = parse_items(&l);
        assert_eq!(items[0].tooth, "75");
    }

    #[test]
    fn test_tooth_out_of_ranges_ignored() {
        // 49 and 50 sit between the permanent and primary ranges.
        let l = lines(&["322 Tooth extraction 49 50 220.00"]);
        let items = parse_items(&l);
        assert_eq!(items[0].tooth, "");
    }

    #[test]
    fn test_quantity_separator_dropped_from_description() {
        let l = lines(&["311 18 Direct restoration - one surface 2 x 180.00 360.00"]);
        let items = parse_items(&l);
        assert_eq!(items[0].description, "Direct restoration - one surface");
    }

    #[test]
    fn test_header_and_boilerplate_lines_skipped() {
        let l = lines(&[
            "Item Tooth Description Qty Fee",
            "SIA Dental Essendon 311",
            "TOTAL AMOUNT: 780.00",
            "1138-1140 Mt Alexander Rd, Essendon, VIC 3040",
        ]);
        assert!(parse_items(&l).is_empty());
    }

    #[test]
    fn test_multiple_codes_on_one_line() {
        let l = lines(&["311 and 312 combined restorations 430.00"]);
        let items = parse_items(&l);
        let codes: Vec<&str> = items.iter().map(|i| i.item_code.as_str()).collect();
        assert_eq!(codes, vec!["311", "312"]);
    }

    #[test]
    fn test_no_fee_defaults_to_zero() {
        let l = lines(&["311 Direct restoration planned"]);
        let items = parse_items(&l);
        assert_eq!(items[0].total_fee(), dec!(0));
    }
}
