//! Donor shortlist preview.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use medireach_core::config::AppConfig;
use medireach_core::error::AppError;
use medireach_core::traits::Geocoder;
use medireach_core::types::Coordinates;
use medireach_database::repositories::UserRepository;
use medireach_database::{DatabasePool, UserDirectory};
use medireach_entity::request::Urgency;
use medireach_service::{DonorMatcher, format_distance};

/// Arguments for the match command
#[derive(Debug, Args)]
pub struct MatchArgs {
    /// Free-text location of the need
    pub location: String,
    /// Urgency level
    #[arg(short, long, default_value = "high")]
    pub urgency: Urgency,
    /// Latitude; geocoded from the location when omitted
    #[arg(long, allow_negative_numbers = true, requires = "lng")]
    pub lat: Option<f64>,
    /// Longitude
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lng: Option<f64>,
}

/// Shortlist row for table output
#[derive(Debug, Serialize, Tabled)]
struct MatchRow {
    /// Rank
    rank: usize,
    /// Donor ID
    donor_id: String,
    /// Distance or fallback marker
    distance: String,
}

/// Execute the match command
pub async fn execute(
    args: &MatchArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let coordinates = match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
        _ => {
            let geocoder = medireach_geocoder::from_config(&config.geocoding)?;
            geocoder.geocode(&args.location).await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Geocoding failed, matching on location text only");
                None
            })
        }
    };

    let pool = DatabasePool::connect(&config.database).await?;
    let users = UserRepository::new(pool.pool().clone());
    let donors = users.available_donors().await;
    pool.close().await;
    let donors = donors?;

    let matcher = DonorMatcher::new(config.matching.clone());
    let outcome = matcher.rank(args.urgency, &args.location, coordinates, &donors);

    let ranked = outcome
        .ranked
        .iter()
        .map(|r| (r.donor_id, format_distance(r.distance_km)));
    let fallback = outcome
        .fallback
        .iter()
        .map(|id| (*id, "location match".to_string()));
    let rows: Vec<MatchRow> = ranked
        .chain(fallback)
        .enumerate()
        .map(|(i, (donor_id, distance))| MatchRow {
            rank: i + 1,
            donor_id: donor_id.to_string(),
            distance,
        })
        .collect();

    if format == OutputFormat::Table {
        output::print_kv(
            "Origin",
            &coordinates.map_or_else(|| "unknown".to_string(), |c| c.to_string()),
        );
        output::print_kv("Candidates", &donors.len().to_string());
    }
    output::print_list(&rows, format);
    Ok(())
}
