//! Soul display formatting
//!
//! Formats souls for terminal output in table and detail views.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Registry, Soul};

#[derive(Tabled)]
struct SoulRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Events")]
    events: usize,
    #[tabled(rename = "Last Event")]
    last_event: String,
    #[tabled(rename = "Seed")]
    seed: String,
}

impl From<&Soul> for SoulRow {
    fn from(soul: &Soul) -> Self {
        Self {
            name: soul.name.clone(),
            created: soul.created_at.format("%Y-%m-%d %H:%M").to_string(),
            events: soul.event_count(),
            last_event: soul
                .last_event_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
            seed: format!("{}…", soul.seed.partial()),
        }
    }
}

/// Format all souls in a registry as a table
pub fn format_soul_list(registry: &Registry) -> String {
    if registry.is_empty() {
        return "No souls found.\n".to_string();
    }

    let mut table = Table::new(registry.iter().map(SoulRow::from));
    table.with(Style::sharp());
    format!("{}\n", table)
}

/// Format a single soul with its event history
pub fn format_soul_details(soul: &Soul) -> String {
    let mut output = String::new();

    output.push_str(&format!("Soul: {}\n", soul.name));
    output.push_str(&format!("  Created:  {}\n", soul.created_at.to_rfc3339()));
    output.push_str(&format!("  Seed:     {}…\n", soul.seed.partial()));
    output.push_str(&format!("  Events:   {}\n", soul.event_count()));

    if soul.events.is_empty() {
        output.push_str("\n  No consultations yet.\n");
        return output;
    }

    output.push('\n');
    for event in &soul.events {
        output.push_str(&format!(
            "  #{:<4} {}  {:<9}  {}\n",
            event.sequence_number,
            event.timestamp.format("%Y-%m-%d %H:%M"),
            event.reading.pattern.label(),
            event.input
        ));
    }

    output
}
