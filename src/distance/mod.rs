pub mod fixed;
pub mod google;
pub mod straight_line;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::order::Coordinates;

pub use fixed::FixedDistance;
pub use google::GoogleDistanceMatrix;
pub use straight_line::StraightLineDistance;

#[derive(Debug, Error)]
pub enum DistanceError {
    /// The provider answered but could not find a route between the points.
    #[error("no route found")]
    Unknown,

    #[error("provider request failed: {0}")]
    Upstream(String),
}

/// Maps a pair of points to a route distance in meters.
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    async fn distance_meters(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
    ) -> Result<i64, DistanceError>;
}
