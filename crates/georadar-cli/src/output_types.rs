use georadar_core::models::Coordinate;
use serde::Serialize;
use tabled::Tabled;

/// Output for distance command
#[derive(Debug, Serialize)]
pub struct DistanceOutput {
    pub from: Coordinate,
    pub to: Coordinate,
    pub distance_km: f64,
    pub range_threshold_km: f64,
    pub in_range: bool,
}

/// One row of the check table
#[derive(Debug, Tabled)]
pub struct CheckRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Type")]
    pub kind: String,
    #[tabled(rename = "Distance")]
    pub distance: String,
    #[tabled(rename = "When")]
    pub when: String,
    #[tabled(rename = "Decision")]
    pub decision: String,
}

/// One row of the config table
#[derive(Debug, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

/// Output for config command entries
#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: String,
}
