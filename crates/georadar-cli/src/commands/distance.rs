//! Distance command implementation

use crate::cli::DistanceArgs;
use crate::output::OutputWriter;
use crate::output_types::DistanceOutput;
use anyhow::Result;
use georadar_core::config::LayeredConfig;
use georadar_geo::distance_km;

use super::parse_coordinate;

pub fn execute(args: DistanceArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let from = parse_coordinate("first", args.lat1, args.lon1)?;
    let to = parse_coordinate("second", args.lat2, args.lon2)?;

    let distance_km = distance_km(from, to);
    let range_threshold_km = config.range_threshold_km.value;
    let in_range = distance_km <= range_threshold_km;

    if output.is_json() {
        output.result(DistanceOutput { from, to, distance_km, range_threshold_km, in_range })?;
    } else {
        output.kv("From", from);
        output.kv("To", to);
        output.kv("Distance", format!("{:.3} km", distance_km));
        if in_range {
            output.success(format!("Within the {} km range", range_threshold_km));
        } else {
            output.info(format!("Outside the {} km range", range_threshold_km));
        }
    }

    Ok(())
}
