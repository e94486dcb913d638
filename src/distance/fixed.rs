use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::distance::{DistanceError, DistanceProvider};
use crate::models::order::Coordinates;

#[derive(Debug, Clone)]
enum Outcome {
    Meters(i64),
    Unknown,
    Failure(String),
}

/// Deterministic provider that always gives the same answer.
#[derive(Debug)]
pub struct FixedDistance {
    outcome: Outcome,
    calls: AtomicUsize,
}

impl FixedDistance {
    pub fn meters(distance: i64) -> Self {
        Self::with(Outcome::Meters(distance))
    }

    pub fn unknown() -> Self {
        Self::with(Outcome::Unknown)
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self::with(Outcome::Failure(reason.into()))
    }

    fn with(outcome: Outcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DistanceProvider for FixedDistance {
    async fn distance_meters(
        &self,
        _origin: &Coordinates,
        _destination: &Coordinates,
    ) -> Result<i64, DistanceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.outcome {
            Outcome::Meters(distance) => Ok(*distance),
            Outcome::Unknown => Err(DistanceError::Unknown),
            Outcome::Failure(reason) => Err(DistanceError::Upstream(reason.clone())),
        }
    }
}
