//! Earthquake and tsunami event models

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Which seismic bulletin an event was read from
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SeismicVariant {
    /// The latest earthquake, published alone in its document
    Single,
    /// One entry of the recent earthquakes list
    ListElement,
    /// One entry of the felt earthquakes list
    Felt,
    /// The latest tsunami-generating earthquake
    Tsunami,
}

impl SeismicVariant {
    /// Whether the document wraps one event or a list of them
    #[must_use]
    pub fn is_list(self) -> bool {
        matches!(self, SeismicVariant::ListElement | SeismicVariant::Felt)
    }
}

impl fmt::Display for SeismicVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeismicVariant::Single => "latest earthquake",
            SeismicVariant::ListElement => "recent earthquakes",
            SeismicVariant::Felt => "felt earthquakes",
            SeismicVariant::Tsunami => "latest tsunami",
        };
        f.write_str(name)
    }
}

/// Hypocentre depth
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Depth {
    pub value: f64,
    /// `km` when metric, `mi` otherwise
    pub unit: String,
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// A normalized earthquake report
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EarthquakeEvent {
    pub variant: SeismicVariant,
    pub datetime: DateTime<FixedOffset>,
    /// Decimal degrees, negative south of the equator
    pub latitude: f64,
    /// Decimal degrees, negative west of Greenwich
    pub longitude: f64,
    pub magnitude: f64,
    pub depth: Depth,
    /// Region description as published
    pub region: String,
    /// Tsunami potential statement; latest earthquake only
    pub potential: Option<String>,
    /// Places where shaking was felt; felt earthquakes only
    pub felt_locations: Option<String>,
    pub shakemap_url: Option<String>,
}

/// Wave observation attached to a tsunami bulletin
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WaveObservation {
    pub location: String,
    /// Arrival time as published
    pub arrival: String,
    /// Observed wave height in metres
    pub height_m: f64,
}

/// A normalized tsunami bulletin
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TsunamiEvent {
    /// The generating earthquake; its `potential` is always `None`
    pub event: EarthquakeEvent,
    /// Warning statement of the bulletin
    pub warning: String,
    pub instruction: Option<String>,
    pub observations: Vec<WaveObservation>,
}

impl TsunamiEvent {
    /// Highest observed wave, if any observation was reported
    #[must_use]
    pub fn max_wave_height(&self) -> Option<f64> {
        self.observations
            .iter()
            .map(|observation| observation.height_m)
            .reduce(f64::max)
    }
}
