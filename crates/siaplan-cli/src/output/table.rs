use siaplan_core::layout::format_currency;
use siaplan_core::parse::ParseOutcome;

pub fn format_outcome(outcome: &ParseOutcome) -> String {
    let plan = &outcome.plan;
    let mut out = String::new();

    let location = plan
        .location
        .map(|l| l.to_string())
        .unwrap_or_else(|| "(unknown)".to_string());
    out.push_str(&format!("Patient:  {}\n", display_or_dash(&plan.patient_name)));
    out.push_str(&format!("Doctor:   {}\n", display_or_dash(&plan.doctor_name)));
    out.push_str(&format!("Location: {location}\n"));
    out.push_str(&format!("Date:     {}\n", plan.date));

    if plan.items.is_empty() {
        out.push_str("\nNo treatment items recovered.\n");
        return out;
    }

    out.push_str(&format!(
        "\n  {:<6} {:<6} {:<44} {:>10}\n",
        "Item", "Tooth", "Description", "Fee"
    ));
    let mut total = rust_decimal::Decimal::ZERO;
    for item in &plan.items {
        let short: String = item.description.chars().take(44).collect();
        out.push_str(&format!(
            "  {:<6} {:<6} {:<44} {:>10}\n",
            item.item_code,
            if item.tooth.is_empty() { "-" } else { &item.tooth },
            short,
            format_currency(item.total_fee())
        ));
        total += item.total_fee();
    }
    out.push_str(&format!("\n  Total: {}\n", format_currency(total)));

    out
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "(unknown)"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siaplan_core::directory::DentistDirectory;
    use siaplan_core::parse::parse_lines;

    #[test]
    fn test_format_recovered_plan() {
        let lines: Vec<String> = [
            "SIA Dental Essendon",
            "Mr John Citizen",
            "Plan by: Dr Jane Smith",
            "311 Direct restoration one surface 18 180.00",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let outcome = parse_lines(&lines, &DentistDirectory::builtin());

        let text = format_outcome(&outcome);
        assert!(text.contains("Patient:  Mr John Citizen"));
        assert!(text.contains("Location: Essendon"));
        assert!(text.contains("311"));
        assert!(text.contains("$180.00"));
        assert!(text.contains("Total: $180.00"));
    }

    #[test]
    fn test_format_empty_items() {
        let lines = vec!["nothing useful".to_string()];
        let outcome = parse_lines(&lines, &DentistDirectory::builtin());
        let text = format_outcome(&outcome);
        assert!(text.contains("No treatment items recovered."));
        assert!(text.contains("(unknown)"));
    }
}
