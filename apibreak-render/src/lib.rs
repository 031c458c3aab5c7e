//! Rendering helpers (markdown) for human-readable artifacts.

use apibreak_types::{ActivationReport, Category, CategoryInfo};

pub fn render_activation_md(report: &ActivationReport) -> String {
    let mut out = String::new();
    out.push_str("# apibreak activation\n\n");
    out.push_str(&format!("- Mode: `{}`\n", report.mode.as_str()));
    out.push_str(&format!("- Seed: `{}`\n", report.seed));
    out.push_str(&format!("- Snapshot: `{}`\n", report.snapshot_id));
    if let Some(at) = &report.generated_at {
        out.push_str(&format!("- Generated at: {}\n", at));
    }
    out.push_str(&format!(
        "- Endpoints: {} ({} breaking)\n",
        report.summary.endpoints_total, report.summary.endpoints_active
    ));
    out.push_str(&format!(
        "- Categories: {} active of {} available\n",
        report.summary.categories_active, report.summary.categories_available
    ));
    if report.summary.diagnostics > 0 {
        out.push_str(&format!("- Diagnostics: {}\n", report.summary.diagnostics));
    }
    out.push('\n');

    out.push_str("## Endpoints\n\n");
    if report.endpoints.is_empty() {
        out.push_str("_No endpoint profiles loaded._\n");
        return out;
    }

    out.push_str("| Endpoint | Available | Active |\n");
    out.push_str("|---|---|---|\n");
    for entry in &report.endpoints {
        out.push_str(&format!(
            "| `{}` | {} | {} |\n",
            entry.key,
            category_list(&entry.available),
            category_list(&entry.active)
        ));
    }

    let with_diagnostics: Vec<_> = report
        .endpoints
        .iter()
        .filter(|e| !e.diagnostics.is_empty())
        .collect();
    if !with_diagnostics.is_empty() {
        out.push_str("\n## Diagnostics\n\n");
        for entry in with_diagnostics {
            out.push_str(&format!("### `{}`\n\n", entry.key));
            for d in &entry.diagnostics {
                match d.category {
                    Some(c) => out.push_str(&format!("- `{}`: {}\n", c, d.message)),
                    None => out.push_str(&format!("- {}\n", d.message)),
                }
            }
            out.push('\n');
        }
    }

    out
}

/// One section per category, for `explain`-style output.
pub fn render_category_md(info: &CategoryInfo) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}: {}\n\n", info.category, info.title));
    out.push_str(&format!("{}\n\n", info.description));
    if !info.implemented {
        out.push_str("_Declarable and activatable, but has no effect on payloads._\n\n");
    }
    out.push_str("## Parameters\n\n");
    if info.params.is_empty() {
        out.push_str("_None._\n");
    } else {
        for p in info.params {
            out.push_str(&format!("- `{}`\n", p));
        }
    }
    out
}

fn category_list(cats: &[Category]) -> String {
    if cats.is_empty() {
        return "-".to_string();
    }
    cats.iter()
        .map(|c| format!("`{}`", c))
        .collect::<Vec<_>>()
        .join(", ")
}
