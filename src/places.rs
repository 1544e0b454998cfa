use color_eyre::eyre::{Result, WrapErr};
use tracing::{debug, info, instrument, warn};

use crate::map::{Map, Marker};
use crate::types::dto::place::PlacesResponse;

/// Fetches places from the places endpoint and drops them on a map
#[derive(Debug, Clone)]
pub struct PlacesLoader {
    client: reqwest::Client,
    url: String,
}

impl PlacesLoader {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// One GET per call. Any failure along the way turns into the
    /// `{"Status": 500}` fallback instead of an error.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch(&self) -> PlacesResponse {
        self.try_fetch().await.unwrap_or_else(|err| {
            warn!("could not load places, falling back: {err:#}");
            PlacesResponse::fallback()
        })
    }

    async fn try_fetch(&self) -> Result<PlacesResponse> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .wrap_err("places request failed")?;
        debug!("places endpoint answered {}", response.status());
        let body = response
            .text()
            .await
            .wrap_err("could not read places body")?;
        serde_json::from_str(&body).wrap_err("places body is neither data nor status")
    }

    /// Adds one untitled marker per place. Returns how many were added.
    pub fn plot(response: &PlacesResponse, map: &mut Map) -> usize {
        match response {
            PlacesResponse::Places { data } => {
                for place in data {
                    map.add_marker(Marker::untitled(place.coordinate()));
                }
                info!("plotted {} places", data.len());
                data.len()
            }
            PlacesResponse::Failure { status } => {
                warn!("places unavailable (status {status}), nothing plotted");
                0
            }
        }
    }
}
