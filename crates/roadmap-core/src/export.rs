//! Self-contained view of a roadmap handed to document exporters.
//!
//! Every item carries its resolved status name and icon so an exporter never
//! needs the registry.

use std::fmt::Write as _;

use serde::Serialize;

use crate::document::format_date;
use crate::error::CoreError;
use crate::registry::StatusRegistry;
use crate::types::Roadmap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub roadmap_name: String,
    pub milestones: Vec<ExportMilestone>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMilestone {
    pub title: String,
    pub purpose: String,
    pub current_completion_date: String,
    pub original_completion_date: String,
    pub items: Vec<ExportItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportItem {
    pub text: String,
    pub status_name: String,
    pub status_icon: String,
}

impl ExportDocument {
    pub fn build(roadmap: &Roadmap, registry: &StatusRegistry) -> Self {
        let fallback = registry.first();
        Self {
            roadmap_name: roadmap.name.clone(),
            milestones: roadmap
                .milestones
                .iter()
                .map(|m| ExportMilestone {
                    title: m.title.clone(),
                    purpose: m.purpose.clone(),
                    current_completion_date: format_date(m.current_completion_date()),
                    original_completion_date: format_date(m.original_completion_date()),
                    items: m
                        .items
                        .iter()
                        .map(|i| {
                            let status = registry
                                .position(i.status())
                                .and_then(|idx| registry.get(idx))
                                .unwrap_or(fallback);
                            ExportItem {
                                text: i.text.clone(),
                                status_name: status.name.clone(),
                                status_icon: status.icon.clone(),
                            }
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// A renderer for one output format. PDF and office formats live outside this crate.
pub trait Exporter {
    fn format_id(&self) -> &str;
    fn file_extension(&self) -> &str;
    fn render(&self, doc: &ExportDocument) -> Result<Vec<u8>, CoreError>;
}

pub struct MarkdownExporter;

impl Exporter for MarkdownExporter {
    fn format_id(&self) -> &str {
        "markdown"
    }

    fn file_extension(&self) -> &str {
        "md"
    }

    fn render(&self, doc: &ExportDocument) -> Result<Vec<u8>, CoreError> {
        let mut out = String::new();
        let w = |e: std::fmt::Error| CoreError::Export(e.to_string());
        writeln!(out, "# {}", doc.roadmap_name).map_err(w)?;
        for m in &doc.milestones {
            writeln!(out, "\n## {}\n", m.title).map_err(w)?;
            writeln!(out, "{}\n", m.purpose).map_err(w)?;
            if !m.current_completion_date.is_empty() {
                if !m.original_completion_date.is_empty()
                    && m.original_completion_date != m.current_completion_date
                {
                    writeln!(
                        out,
                        "**Target:** {} (originally {})\n",
                        m.current_completion_date, m.original_completion_date
                    )
                    .map_err(w)?;
                } else {
                    writeln!(out, "**Target:** {}\n", m.current_completion_date).map_err(w)?;
                }
            }
            for item in &m.items {
                writeln!(out, "- {} {} _({})_", item.status_icon, item.text, item.status_name)
                    .map_err(w)?;
            }
        }
        Ok(out.into_bytes())
    }
}

pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn format_id(&self) -> &str {
        "json"
    }

    fn file_extension(&self) -> &str {
        "json"
    }

    fn render(&self, doc: &ExportDocument) -> Result<Vec<u8>, CoreError> {
        Ok(serde_json::to_vec_pretty(doc)?)
    }
}

pub fn exporter_for(format: &str) -> Option<Box<dyn Exporter>> {
    match format {
        "markdown" | "md" => Some(Box::new(MarkdownExporter)),
        "json" => Some(Box::new(JsonExporter)),
        _ => None,
    }
}
