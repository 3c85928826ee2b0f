//! Open-Meteo geocoding and forecast client.
//!
//! Both endpoints are keyless. One [`OpenMeteoProvider`] serves as both the
//! [`GeoResolver`] and the [`WeatherFetcher`] and shares the injected HTTP
//! client (and its connection pool) between them.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::{
    config::OpenMeteoConfig,
    error::LookupError,
    model::{CurrentWeather, GeoLocation},
};

use super::{GeoResolver, WeatherFetcher};

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,wind_speed_10m,apparent_temperature";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    http: Client,
    config: OpenMeteoConfig,
}

impl OpenMeteoProvider {
    pub fn new(http: Client, config: OpenMeteoConfig) -> Self {
        Self { http, config }
    }

    /// Send `request` and return the body of a 2xx response, aborting if `cancel` fires.
    async fn get_body(
        &self,
        request: RequestBuilder,
        what: &str,
        cancel: &CancellationToken,
    ) -> Result<String, LookupError> {
        let exchange = async {
            let res = request
                .send()
                .await
                .map_err(|e| {
                    LookupError::Network(format!("{what} request failed: {e}"))
                })?;

            let status = res.status();
            let body = res
                .text()
                .await
                .map_err(|e| {
                    LookupError::Network(format!("failed to read {what} body: {e}"))
                })?;

            if !status.is_success() {
                return Err(LookupError::Network(format!(
                    "{what} request failed with status {status}: {}",
                    truncate_body(&body),
                )));
            }

            Ok(body)
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(LookupError::Cancelled),
            result = exchange => result,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmPlace {
    latitude: f64,
    longitude: f64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct OmGeocodingResponse {
    /// Open-Meteo omits `results` entirely when nothing matches.
    results: Option<Vec<OmPlace>>,
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<u8>,
    wind_speed_10m: Option<f64>,
    apparent_temperature: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current: Option<OmCurrent>,
}

impl OmForecastResponse {
    fn into_current(self) -> Option<CurrentWeather> {
        let current = self.current?;
        Some(CurrentWeather {
            temperature: current.temperature_2m?,
            relative_humidity: current.relative_humidity_2m?,
            wind_speed: current.wind_speed_10m?,
            apparent_temperature: current.apparent_temperature?,
        })
    }
}

#[async_trait]
impl GeoResolver for OpenMeteoProvider {
    #[instrument(skip(self, cancel))]
    async fn resolve(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<GeoLocation, LookupError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LookupError::InvalidInput);
        }

        let count = self.config.candidate_count.to_string();
        let request = self
            .http
            .get(&self.config.geocoding_url)
            .query(&[
                ("name", name),
                ("count", count.as_str()),
                ("language", self.config.language.as_str()),
                ("format", "json"),
            ]);

        debug!(url = %self.config.geocoding_url, "Resolving city");
        let body = self.get_body(request, "geocoding", cancel).await?;

        let parsed: OmGeocodingResponse = serde_json::from_str(&body)
            .map_err(|e| LookupError::Parse(format!("geocoding JSON: {e}")))?;

        // First candidate in provider order; no re-ranking.
        let place = parsed
            .results
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| LookupError::NotFound(name.to_string()))?;

        Ok(GeoLocation {
            latitude: place.latitude,
            longitude: place.longitude,
            name: place.name,
        })
    }
}

#[async_trait]
impl WeatherFetcher for OpenMeteoProvider {
    #[instrument(skip_all, fields(lat = %location.latitude, lon = %location.longitude))]
    async fn fetch(
        &self,
        location: &GeoLocation,
        cancel: &CancellationToken,
    ) -> Result<CurrentWeather, LookupError> {
        // f64 Display is locale-independent: always '.' as decimal separator.
        let latitude = location.latitude.to_string();
        let longitude = location.longitude.to_string();

        let request = self
            .http
            .get(&self.config.forecast_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", CURRENT_FIELDS),
                ("wind_speed_unit", "ms"),
            ]);

        debug!(url = %self.config.forecast_url, "Fetching current weather");
        let body = self.get_body(request, "forecast", cancel).await?;

        let parsed: OmForecastResponse = serde_json::from_str(&body)
            .map_err(|e| LookupError::Parse(format!("forecast JSON: {e}")))?;

        parsed.into_current().ok_or(LookupError::IncompleteData)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
