use async_trait::async_trait;

use crate::distance::{DistanceError, DistanceProvider};
use crate::geo::haversine_meters;
use crate::models::order::Coordinates;

/// Offline provider for local runs without a map API key. Uses the
/// great-circle distance, so it never reports an unknown route.
#[derive(Debug, Default, Clone)]
pub struct StraightLineDistance;

#[async_trait]
impl DistanceProvider for StraightLineDistance {
    async fn distance_meters(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
    ) -> Result<i64, DistanceError> {
        Ok(haversine_meters(origin, destination).round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::StraightLineDistance;
    use crate::distance::DistanceProvider;
    use crate::models::order::Coordinates;

    #[tokio::test]
    async fn rounds_to_whole_meters() {
        let a = Coordinates { lat: 0.0, lng: 0.0 };
        let b = Coordinates { lat: 0.0, lng: 0.001 };

        let distance = StraightLineDistance.distance_meters(&a, &b).await.unwrap();
        assert_eq!(distance, 111);
    }
}
