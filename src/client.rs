//! BMKG client
//!
//! Fetches documents through a [`Transport`] and hands them to the
//! normalizers. Unit system and language are fixed at construction.

use bytes::Bytes;
use tracing::{debug, info, instrument};

use crate::config::{BmkgConfig, EndpointConfig};
use crate::forecast::normalize_weather;
use crate::image_cache::{Clock, ImageCache, ImageResource, SystemClock};
use crate::location_resolver::LocationResolver;
use crate::models::{EarthquakeEvent, SeismicVariant, TsunamiEvent, Weather};
use crate::seismic::{parse_events, parse_latest_earthquake, parse_tsunami};
use crate::transport::{HttpTransport, Transport};
use crate::Result;

pub struct BmkgClient<T: Transport = HttpTransport, C: Clock = SystemClock> {
    transport: T,
    endpoints: EndpointConfig,
    metric: bool,
    english: bool,
    images: ImageCache<C>,
}

impl BmkgClient<HttpTransport, SystemClock> {
    /// Create a client talking to BMKG over HTTP
    pub fn new(config: &BmkgConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.http)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> BmkgClient<T, SystemClock> {
    pub fn with_transport(config: &BmkgConfig, transport: T) -> Self {
        Self::with_parts(config, transport, ImageCache::new())
    }
}

impl<T: Transport, C: Clock> BmkgClient<T, C> {
    /// Create a client with an explicit transport and image cache
    pub fn with_parts(config: &BmkgConfig, transport: T, images: ImageCache<C>) -> Self {
        Self {
            transport,
            endpoints: config.endpoints.clone(),
            metric: config.metric,
            english: config.english,
            images,
        }
    }

    #[must_use]
    pub fn is_metric(&self) -> bool {
        self.metric
    }

    #[must_use]
    pub fn is_english(&self) -> bool {
        self.english
    }

    /// URL of the forecast document serving `location`
    #[must_use]
    pub fn forecast_url(&self, location: Option<&str>) -> String {
        let path = LocationResolver::resolve(location);
        format!("{}{}", self.endpoints.forecast_base_url, path)
    }

    /// Forecast for a province, or the nationwide document when `location`
    /// is absent or unrecognised
    #[instrument(skip(self))]
    pub async fn get_forecast(&self, location: Option<&str>) -> Result<Weather> {
        let url = self.forecast_url(location);
        let xml = self.transport.get_text(&url).await?;
        let weather = normalize_weather(&xml, self.metric, self.english)?;
        info!("Loaded {} forecast areas from {}", weather.len(), url);
        Ok(weather)
    }

    #[instrument(skip(self))]
    pub async fn get_latest_earthquake(&self) -> Result<EarthquakeEvent> {
        let xml = self
            .transport
            .get_text(&self.endpoints.latest_earthquake_url)
            .await?;
        parse_latest_earthquake(&xml, self.metric)
    }

    /// Most recent earthquakes of magnitude 5.0 and above
    #[instrument(skip(self))]
    pub async fn get_recent_earthquakes(&self) -> Result<Vec<EarthquakeEvent>> {
        let xml = self
            .transport
            .get_text(&self.endpoints.recent_earthquakes_url)
            .await?;
        parse_events(&xml, self.metric, SeismicVariant::ListElement)
    }

    /// Most recent earthquakes reported as felt
    #[instrument(skip(self))]
    pub async fn get_felt_earthquakes(&self) -> Result<Vec<EarthquakeEvent>> {
        let xml = self
            .transport
            .get_text(&self.endpoints.felt_earthquakes_url)
            .await?;
        parse_events(&xml, self.metric, SeismicVariant::Felt)
    }

    #[instrument(skip(self))]
    pub async fn get_latest_tsunami(&self) -> Result<TsunamiEvent> {
        let xml = self
            .transport
            .get_text(&self.endpoints.latest_tsunami_url)
            .await?;
        parse_tsunami(&xml, self.metric)
    }

    /// Monthly rainfall outlook map
    pub async fn get_climate_info(&mut self) -> Result<Bytes> {
        self.fetch_image(ImageResource::ClimateInfo).await
    }

    /// Himawari satellite image
    pub async fn get_satellite_image(&mut self) -> Result<Bytes> {
        self.fetch_image(ImageResource::Satellite).await
    }

    pub async fn get_wave_height_forecast(&mut self) -> Result<Bytes> {
        self.fetch_image(ImageResource::WaveHeight).await
    }

    pub async fn get_wind_forecast(&mut self) -> Result<Bytes> {
        self.fetch_image(ImageResource::WindForecast).await
    }

    /// Fire danger (FFMC) map
    pub async fn get_forest_fires(&mut self) -> Result<Bytes> {
        self.fetch_image(ImageResource::ForestFires).await
    }

    pub async fn get_earthquake_map(&mut self) -> Result<Bytes> {
        self.fetch_image(ImageResource::EarthquakeMap).await
    }

    #[instrument(skip(self, resource), fields(resource = resource.key()))]
    async fn fetch_image(&mut self, resource: ImageResource) -> Result<Bytes> {
        if let Some(payload) = self.images.get(resource) {
            return Ok(payload);
        }

        let payload = self.transport.get_bytes(resource.url()).await?;
        debug!("Fetched {} bytes", payload.len());
        self.images.put(resource, payload.clone());
        Ok(payload)
    }

    /// Drop every cached image
    pub fn close(&mut self) {
        self.images.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BmkgError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeTransport {
        documents: HashMap<String, String>,
        images: HashMap<String, Bytes>,
        calls: AtomicUsize,
    }

    impl FakeTransport {
        fn with_document(mut self, url: &str, body: &str) -> Self {
            self.documents.insert(url.to_string(), body.to_string());
            self
        }

        fn with_image(mut self, url: &str, body: &'static [u8]) -> Self {
            self.images.insert(url.to_string(), Bytes::from_static(body));
            self
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get_text(&self, url: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.documents
                .get(url)
                .cloned()
                .ok_or_else(|| BmkgError::transport(format!("{url} answered 404 Not Found")))
        }

        async fn get_bytes(&self, url: &str) -> Result<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.images
                .get(url)
                .cloned()
                .ok_or_else(|| BmkgError::transport(format!("{url} answered 404 Not Found")))
        }
    }

    const BASE: &str = "https://data.bmkg.go.id/DataMKG/MEWS/DigitalForecast/";

    #[test]
    fn test_forecast_url() {
        let client = BmkgClient::with_transport(&BmkgConfig::default(), FakeTransport::default());
        assert_eq!(
            client.forecast_url(Some("jakarta")),
            format!("{BASE}DigitalForecast-DKIJakarta.xml")
        );
        assert_eq!(
            client.forecast_url(None),
            format!("{BASE}DigitalForecast-Indonesia.xml")
        );
    }

    #[tokio::test]
    async fn test_get_forecast() {
        let transport = FakeTransport::default().with_document(
            &format!("{BASE}DigitalForecast-Aceh.xml"),
            include_str!("../tests/fixtures/digital_forecast.xml"),
        );
        let client = BmkgClient::with_transport(&BmkgConfig::default(), transport);

        let weather = client.get_forecast(Some("Aceh")).await.unwrap();
        assert_eq!(weather.domain.as_deref(), Some("Aceh"));
        assert_eq!(weather.len(), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_is_propagated() {
        let client = BmkgClient::with_transport(&BmkgConfig::default(), FakeTransport::default());
        let result = client.get_latest_earthquake().await;
        assert!(matches!(result, Err(BmkgError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_seismic_feeds() {
        let config = BmkgConfig::default();
        let transport = FakeTransport::default()
            .with_document(
                &config.endpoints.latest_earthquake_url,
                include_str!("../tests/fixtures/autogempa.xml"),
            )
            .with_document(
                &config.endpoints.recent_earthquakes_url,
                include_str!("../tests/fixtures/gempaterkini.xml"),
            )
            .with_document(
                &config.endpoints.felt_earthquakes_url,
                include_str!("../tests/fixtures/gempadirasakan.xml"),
            )
            .with_document(
                &config.endpoints.latest_tsunami_url,
                include_str!("../tests/fixtures/lasttsunami.xml"),
            );
        let client = BmkgClient::with_transport(&config, transport);

        let latest = client.get_latest_earthquake().await.unwrap();
        assert_eq!(latest.variant, SeismicVariant::Single);

        let recent = client.get_recent_earthquakes().await.unwrap();
        assert_eq!(recent.len(), 3);
        assert!(recent.iter().all(|e| e.variant == SeismicVariant::ListElement));

        let felt = client.get_felt_earthquakes().await.unwrap();
        assert_eq!(felt.len(), 2);
        assert!(felt.iter().all(|e| e.felt_locations.is_some()));

        let tsunami = client.get_latest_tsunami().await.unwrap();
        assert_eq!(tsunami.observations.len(), 2);
    }

    #[tokio::test]
    async fn test_images_cached_per_day() {
        let current = Arc::new(Mutex::new(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()));
        let handle = Arc::clone(&current);
        let clock = move || *handle.lock().unwrap();

        let transport = FakeTransport::default()
            .with_image(ImageResource::Satellite.url(), b"himawari")
            .with_image(ImageResource::EarthquakeMap.url(), b"eqmap");
        let mut client = BmkgClient::with_parts(
            &BmkgConfig::default(),
            transport,
            ImageCache::with_clock(clock),
        );

        assert_eq!(client.get_satellite_image().await.unwrap(), Bytes::from_static(b"himawari"));
        client.get_satellite_image().await.unwrap();
        assert_eq!(client.transport.calls.load(Ordering::SeqCst), 1);

        client.get_earthquake_map().await.unwrap();
        assert_eq!(client.transport.calls.load(Ordering::SeqCst), 2);

        *current.lock().unwrap() = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        client.get_satellite_image().await.unwrap();
        assert_eq!(client.transport.calls.load(Ordering::SeqCst), 3);

        client.close();
        client.get_earthquake_map().await.unwrap();
        assert_eq!(client.transport.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_failed_image_fetch_is_not_cached() {
        let mut client =
            BmkgClient::with_transport(&BmkgConfig::default(), FakeTransport::default());
        assert!(client.get_wind_forecast().await.is_err());
        assert!(client.images.is_empty());
    }
}
