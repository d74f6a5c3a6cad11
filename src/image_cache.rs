//! Daily image cache
//!
//! BMKG redraws its map images once a day. An image is served from the
//! cache only when it was captured on the current calendar day; otherwise
//! the caller refetches it and overwrites the entry. There is at most one
//! entry per [`ImageResource`].

use std::collections::HashMap;

use bytes::Bytes;
use chrono::{Local, NaiveDate};
use tracing::debug;

/// Images published by BMKG
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageResource {
    ClimateInfo,
    Satellite,
    WaveHeight,
    WindForecast,
    ForestFires,
    EarthquakeMap,
}

impl ImageResource {
    pub const ALL: [ImageResource; 6] = [
        ImageResource::ClimateInfo,
        ImageResource::Satellite,
        ImageResource::WaveHeight,
        ImageResource::WindForecast,
        ImageResource::ForestFires,
        ImageResource::EarthquakeMap,
    ];

    /// Stable name of the resource
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            ImageResource::ClimateInfo => "climate_info",
            ImageResource::Satellite => "satellite",
            ImageResource::WaveHeight => "wave_height",
            ImageResource::WindForecast => "wind_forecast",
            ImageResource::ForestFires => "forest_fires",
            ImageResource::EarthquakeMap => "earthquake_map",
        }
    }

    /// Where BMKG publishes the image
    #[must_use]
    pub fn url(self) -> &'static str {
        match self {
            ImageResource::ClimateInfo => {
                "https://cdn.bmkg.go.id/DataMKG/CEWS/pch/pch.bulan.1.cond1.png"
            }
            ImageResource::Satellite => {
                "https://inderaja.bmkg.go.id/IMAGE/HIMA/H08_EH_Indonesia.png"
            }
            ImageResource::WaveHeight => {
                "https://cdn.bmkg.go.id/DataMKG/MEWS/maritim/gelombang_maritim.png"
            }
            ImageResource::WindForecast => {
                "https://cdn.bmkg.go.id/DataMKG/MEWS/angin/streamline_d1.jpg"
            }
            ImageResource::ForestFires => {
                "https://cdn.bmkg.go.id/DataMKG/MEWS/spartan/36_indonesia_ffmc_01.png"
            }
            ImageResource::EarthquakeMap => "https://data.bmkg.go.id/eqmap.gif",
        }
    }
}

/// Source of the current calendar day
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

impl<F> Clock for F
where
    F: Fn() -> NaiveDate + Send + Sync,
{
    fn today(&self) -> NaiveDate {
        self()
    }
}

/// An image together with the day it was fetched
#[derive(Debug, Clone, PartialEq)]
pub struct CachedImage {
    pub captured_on: NaiveDate,
    pub payload: Bytes,
}

impl CachedImage {
    /// Stale once the calendar day has changed since capture
    #[must_use]
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.captured_on != today
    }
}

/// Per-client image cache with daily invalidation
#[derive(Debug)]
pub struct ImageCache<C: Clock = SystemClock> {
    clock: C,
    entries: HashMap<ImageResource, CachedImage>,
}

impl ImageCache<SystemClock> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for ImageCache<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ImageCache<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            entries: HashMap::new(),
        }
    }

    /// Cached payload if it was captured today
    #[tracing::instrument(name = "query_image_cache", level = "debug", skip(self))]
    pub fn get(&self, resource: ImageResource) -> Option<Bytes> {
        let today = self.clock.today();
        match self.entries.get(&resource) {
            Some(entry) if !entry.is_stale(today) => {
                debug!("Image found and captured today");
                Some(entry.payload.clone())
            }
            Some(_) => {
                debug!("Image found but captured on an earlier day");
                None
            }
            None => {
                debug!("Image not cached");
                None
            }
        }
    }

    /// Store a freshly fetched payload, replacing any previous entry
    #[tracing::instrument(
        name = "put_image_cache",
        level = "debug",
        skip(self, payload),
        fields(bytes = payload.len())
    )]
    pub fn put(&mut self, resource: ImageResource, payload: Bytes) {
        let entry = CachedImage {
            captured_on: self.clock.today(),
            payload,
        };
        self.entries.insert(resource, entry);
    }

    pub fn entry(&self, resource: ImageResource) -> Option<&CachedImage> {
        self.entries.get(&resource)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
