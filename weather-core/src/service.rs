use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    error::LookupError,
    format::format_report,
    normalize::normalize,
    provider::{GeoResolver, WeatherFetcher},
};

/// City name in, formatted report out.
#[derive(Debug, Clone)]
pub struct WeatherService {
    resolver: Arc<dyn GeoResolver>,
    fetcher: Arc<dyn WeatherFetcher>,
}

impl WeatherService {
    pub fn new(resolver: Arc<dyn GeoResolver>, fetcher: Arc<dyn WeatherFetcher>) -> Self {
        Self { resolver, fetcher }
    }

    /// Normalize, resolve, fetch, format. The first failing step ends the lookup.
    pub async fn report(
        &self,
        city: &str,
        cancel: &CancellationToken,
    ) -> Result<String, LookupError> {
        let name = normalize(city);
        let location = self.resolver.resolve(&name, cancel).await?;
        debug!(query = %name, resolved = %location.name, "City resolved");

        let weather = self.fetcher.fetch(&location, cancel).await?;
        Ok(format_report(city, &weather))
    }
}
