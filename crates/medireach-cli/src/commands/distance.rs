//! Distance calculation command.

use clap::Args;

use medireach_core::error::AppError;
use medireach_core::types::Coordinates;
use medireach_service::matching::distance;

/// Arguments for the distance command
#[derive(Debug, Args)]
pub struct DistanceArgs {
    /// Latitude of the first point
    #[arg(allow_negative_numbers = true)]
    pub lat1: f64,
    /// Longitude of the first point
    #[arg(allow_negative_numbers = true)]
    pub lng1: f64,
    /// Latitude of the second point
    #[arg(allow_negative_numbers = true)]
    pub lat2: f64,
    /// Longitude of the second point
    #[arg(allow_negative_numbers = true)]
    pub lng2: f64,
}

/// Print the haversine distance between the two points
pub fn execute(args: &DistanceArgs) -> Result<(), AppError> {
    let from = Coordinates::new(args.lat1, args.lng1);
    let to = Coordinates::new(args.lat2, args.lng2);
    for point in [from, to] {
        if !point.is_valid() {
            return Err(AppError::validation(format!("Coordinates out of range: {point}")));
        }
    }
    println!("{}", distance::format_distance(distance::between(from, to)));
    Ok(())
}
