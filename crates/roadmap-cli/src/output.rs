use roadmap_core::document::format_date;
use roadmap_core::types::Roadmap;
use roadmap_core::StatusRegistry;
use roadmap_sync::DocumentSummary;

/// Format a key-value pair for display.
pub fn kv(key: &str, value: &str) -> String {
    format!("{key:>16}: {value}")
}

/// Format a header line.
pub fn header(title: &str) -> String {
    format!("=== {title} ===")
}

/// Tree view of a roadmap with ids, so they can be passed back to other commands.
pub fn render_roadmap(roadmap: &Roadmap, registry: &StatusRegistry) -> String {
    let mut lines = vec![header(&roadmap.name)];
    if roadmap.is_empty() {
        lines.push("(no milestones)".to_string());
    }
    for milestone in &roadmap.milestones {
        lines.push(String::new());
        lines.push(format!("[{}] {}", milestone.id(), milestone.title));
        lines.push(kv("purpose", &milestone.purpose));
        let current = format_date(milestone.current_completion_date());
        if !current.is_empty() {
            let target = if milestone.is_rescheduled() {
                format!(
                    "{current} (originally {})",
                    format_date(milestone.original_completion_date())
                )
            } else {
                current
            };
            lines.push(kv("target", &target));
        }
        for item in &milestone.items {
            let icon = registry.icon_for(item.status()).unwrap_or("?");
            lines.push(format!(
                "    {icon} {}  ({}, {})",
                item.text,
                item.status(),
                item.id()
            ));
        }
    }
    lines.join("\n")
}

pub fn render_statuses(registry: &StatusRegistry) -> String {
    registry
        .all()
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{i:>3}  {} {}", s.icon, s.name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_summaries(summaries: &[DocumentSummary]) -> String {
    if summaries.is_empty() {
        return "(no saved roadmaps)".to_string();
    }
    summaries
        .iter()
        .map(|s| {
            format!(
                "{:<24} {}  {}",
                s.id.as_str(),
                s.created_at.format("%Y-%m-%d %H:%M"),
                s.title
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
