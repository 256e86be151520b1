//! Config command implementation

use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, ConfigRow};
use anyhow::Result;
use georadar_core::config::LayeredConfig;

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let mut entries: Vec<ConfigEntry> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigEntry { key, value, source: format!("{:?}", source) })
        .collect();
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    if output.is_json() {
        output.result(entries)?;
    } else {
        output.section("Configuration");
        let rows: Vec<ConfigRow> = entries
            .into_iter()
            .map(|e| ConfigRow { key: e.key, value: e.value, source: e.source })
            .collect();
        output.table(rows);
    }

    Ok(())
}
