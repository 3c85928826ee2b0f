use async_trait::async_trait;
use std::fmt::Debug;
use tokio_util::sync::CancellationToken;

use crate::{
    error::LookupError,
    model::{CurrentWeather, GeoLocation},
};

pub mod open_meteo;

pub use open_meteo::OpenMeteoProvider;

/// Turns a (normalized) place name into coordinates.
#[async_trait]
pub trait GeoResolver: Send + Sync + Debug {
    async fn resolve(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<GeoLocation, LookupError>;
}

/// Current conditions for resolved coordinates.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    async fn fetch(
        &self,
        location: &GeoLocation,
        cancel: &CancellationToken,
    ) -> Result<CurrentWeather, LookupError>;
}
