//! `bmkg` - Client for the open data feeds of Indonesia's meteorological agency
//!
//! This library fetches BMKG's DigitalForecast and earthquake/tsunami XML
//! feeds and normalizes them into typed models, with unit and language
//! selection fixed per client.

pub mod client;
pub mod codes;
pub mod config;
pub mod error;
pub mod forecast;
pub mod image_cache;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod seismic;
pub mod temporal;
pub mod transport;

// Re-export core types for public API
pub use client::BmkgClient;
pub use config::BmkgConfig;
pub use error::BmkgError;
pub use forecast::{normalize_area, normalize_weather, parse_area};
pub use image_cache::{CachedImage, Clock, ImageCache, ImageResource, SystemClock};
pub use location_resolver::LocationResolver;
pub use models::{Area, EarthquakeEvent, SeismicVariant, TsunamiEvent, Weather};
pub use seismic::{parse_events, parse_latest_earthquake, parse_tsunami};
pub use transport::{HttpTransport, Transport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, BmkgError>;
