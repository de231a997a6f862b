use crate::model::Location;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static PLAN_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Plan\s*by[:\s]+(.+)").unwrap());
static ORDINAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*[-\u{2013}]\s*").unwrap());
static DEFAULT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Default\s*,\s*").unwrap());
static HONORIFIC_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:Mrs|Miss|Mr|Ms)\.?\s+[A-Z][A-Za-z'-]*(?:\s+[A-Z][A-Za-z'-]*){0,2}")
        .unwrap()
});
static LABELLED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:Patient|Name)[:\s]+(.+)").unwrap());
static CAPITALIZED_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z'-]+(?:\s+[A-Z][a-z'-]+){1,3}\b").unwrap());
static DATE_CREATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Date\s*Created[:\s]*(\d{1,2})/(\d{1,2})/(\d{4})").unwrap()
});

/// Boilerplate the fallback patient-name pass must never mistake for a
/// person: brand, section headers, address components.
const NAME_DENYLIST: &[&str] = &[
    "sia dental",
    "dental",
    "essendon",
    "burwood",
    "mulgrave",
    "treatment plan",
    "date created",
    "plan by",
    "total amount",
    "description",
    "alexander rd",
    "burwood hwy",
    "vic",
];

/// Scan for the clinic's brand line and sub-match a location token.
/// First match wins.
pub fn parse_location(lines: &[String]) -> Option<Location> {
    lines
        .iter()
        .filter(|line| line.to_lowercase().contains("sia dental"))
        .find_map(|line| Location::from_str_loose(line))
}

/// The line the doctor name was recovered from, if any. The patient-name
/// passes use it to avoid re-reading the doctor's name as the patient's.
pub fn doctor_line(lines: &[String]) -> Option<&String> {
    lines.iter().find(|line| PLAN_BY.is_match(line))
}

/// Recover the doctor name from a "Plan by:" line, stripping a leading
/// ordinal-and-dash token and a literal "Default," prefix.
pub fn parse_doctor_name(lines: &[String]) -> String {
    for line in lines {
        if let Some(caps) = PLAN_BY.captures(line) {
            let mut name = caps[1].trim().to_string();
            name = ORDINAL_PREFIX.replace(&name, "").to_string();
            name = DEFAULT_PREFIX.replace(&name, "").to_string();
            return name.trim().to_string();
        }
    }
    String::new()
}

/// Multi-pass patient-name recovery, descending confidence. Later
/// passes run only when earlier ones found nothing.
pub fn parse_patient_name(lines: &[String], doctor_line: Option<&String>) -> String {
    let doctor_line = doctor_line.map(String::as_str).unwrap_or("");

    // Pass (a): honorific followed by 1-3 capitalised words, unless the
    // same substring also appears on the plan-by line.
    for line in lines {
        if let Some(m) = HONORIFIC_NAME.find(line) {
            if !doctor_line.contains(m.as_str()) {
                return m.as_str().trim().to_string();
            }
        }
    }

    // Pass (b): explicit label.
    for line in lines {
        if line.to_lowercase().contains("plan by") {
            continue;
        }
        if let Some(caps) = LABELLED_NAME.captures(line) {
            let name = caps[1].trim();
            if !name.is_empty() {
                return name.to_string();
            }
        }
    }

    // Pass (c): any run of 2-4 capitalised words that is neither
    // boilerplate nor part of the doctor line.
    for line in lines {
        for m in CAPITALIZED_RUN.find_iter(line) {
            let candidate = m.as_str();
            let lower = candidate.to_lowercase();
            if NAME_DENYLIST.iter().any(|d| lower.contains(d)) {
                continue;
            }
            if doctor_line.contains(candidate) {
                continue;
            }
            return candidate.to_string();
        }
    }

    String::new()
}

/// Recover the creation date from a "Date Created: DD/MM/YYYY" line.
pub fn parse_date(lines: &[String]) -> Option<NaiveDate> {
    for line in lines {
        if let Some(caps) = DATE_CREATED.captures(line) {
            let day: u32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            let year: i32 = caps[3].parse().ok()?;
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }
    }
    None
}
