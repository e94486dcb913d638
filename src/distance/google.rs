use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::distance::{DistanceError, DistanceProvider};
use crate::models::order::Coordinates;

pub const DEFAULT_DISTANCE_MATRIX_URL: &str =
    "https://maps.googleapis.com/maps/api/distancematrix/json";

#[derive(Debug, Deserialize)]
struct DistanceMatrixResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    status: String,
    distance: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: i64,
}

/// Client for the Google Distance Matrix API.
pub struct GoogleDistanceMatrix {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GoogleDistanceMatrix {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl DistanceProvider for GoogleDistanceMatrix {
    async fn distance_meters(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
    ) -> Result<i64, DistanceError> {
        let origins = origin.to_string();
        let destinations = destination.to_string();

        let response = self
            .client
            .get(self.base_url.as_str())
            .query(&[
                ("origins", origins.as_str()),
                ("destinations", destinations.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DistanceError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DistanceError::Upstream(format!(
                "distance matrix returned status {}",
                response.status()
            )));
        }

        let body: DistanceMatrixResponse = response
            .json()
            .await
            .map_err(|e| DistanceError::Upstream(format!("invalid response body: {e}")))?;

        first_element_distance(body)
    }
}

/// Only the first origin/destination pair is ever requested, so only the
/// first element of the first row is read.
fn first_element_distance(body: DistanceMatrixResponse) -> Result<i64, DistanceError> {
    if body.status != "OK" {
        let detail = body.error_message.unwrap_or_default();
        return Err(DistanceError::Upstream(format!("{} {detail}", body.status)));
    }

    let element = body
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.elements.into_iter().next())
        .ok_or(DistanceError::Unknown)?;

    if element.status != "OK" {
        return Err(DistanceError::Unknown);
    }

    match element.distance {
        Some(distance) if distance.value >= 0 => Ok(distance.value),
        Some(distance) => Err(DistanceError::Upstream(format!(
            "negative distance {}",
            distance.value
        ))),
        None => Err(DistanceError::Unknown),
    }
}
