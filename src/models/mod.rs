//! Data models for BMKG bulletins
//!
//! This module contains the normalized records organized by feed:
//! - Area: one forecast zone with its time series
//! - Weather: a whole DigitalForecast document
//! - Earthquake: earthquake and tsunami events

pub mod area;
pub mod earthquake;
pub mod weather;

// Re-export all public types for convenient access
pub use area::{
    Area, ForecastPoint, HumidityPoint, TemperaturePoint, WindDirectionPoint, WindSpeedPoint,
};
pub use earthquake::{Depth, EarthquakeEvent, SeismicVariant, TsunamiEvent, WaveObservation};
pub use weather::Weather;
