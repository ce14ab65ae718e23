//! CSV lineage export
//!
//! One row per soul: `Name, Created, Last Event, Total Events, SeedHash`.
//! The seed itself never leaves the store; only its fingerprint does.

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{VaultError, VaultResult};
use crate::models::Registry;

const HEADER: [&str; 5] = ["Name", "Created", "Last Event", "Total Events", "SeedHash"];

/// Write the lineage of every soul in the registry as CSV
pub fn export_lineage_csv<W: Write>(registry: &Registry, writer: W) -> VaultResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record(HEADER)
        .map_err(|e| VaultError::Export(e.to_string()))?;

    for soul in registry.iter() {
        let last_event = soul.last_event_at.map(timestamp).unwrap_or_default();
        csv.write_record([
            soul.name.clone(),
            timestamp(soul.created_at),
            last_event,
            soul.event_count().to_string(),
            soul.seed.fingerprint(),
        ])
        .map_err(|e| VaultError::Export(e.to_string()))?;
    }

    csv.flush().map_err(|e| VaultError::Export(e.to_string()))
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
