//! Forecast area model and its time series

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Page on bmkg.go.id showing the forecast of one area
const AREA_PAGE_URL: &str = "https://www.bmkg.go.id/cuaca/prakiraan-cuaca.bmkg?AreaID=";

/// Relative humidity sample
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HumidityPoint {
    pub datetime: NaiveDateTime,
    /// Humidity value, usually a percentage
    pub value: i64,
    /// Unit attribute as published (`%`)
    pub unit: String,
}

/// Temperature sample in the configured unit system
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TemperaturePoint {
    pub datetime: NaiveDateTime,
    pub value: f64,
    /// Unit attribute of the selected value (`C` or `F`)
    pub unit: String,
}

/// Wind speed sample; every published representation is kept
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WindSpeedPoint {
    pub datetime: NaiveDateTime,
    /// Speed in km/h when metric, mph otherwise
    pub value: f64,
    /// Speed in metres per second
    pub ms: f64,
    /// Speed in knots
    pub knots: f64,
}

/// Wind direction sample
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WindDirectionPoint {
    pub datetime: NaiveDateTime,
    /// Direction in decimal degrees
    pub degrees: f64,
    /// Compass label in the selected locale
    pub text: String,
    /// Sexagesimal value as published
    pub sexagesimal: f64,
}

/// Weather condition sample
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastPoint {
    pub datetime: NaiveDateTime,
    /// Condition label in the selected locale
    pub condition: String,
    /// Day or night icon for the condition
    pub icon_url: String,
}

/// One forecast zone published by BMKG
///
/// Every series keeps the order of its own parameter block; series are not
/// re-sorted or cross-aligned.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Area {
    pub id: i64,
    /// Name in the selected locale
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Area type attribute, e.g. `land`
    #[serde(rename = "type")]
    pub kind: String,
    /// Administrative level
    pub level: i64,
    pub description: Option<String>,
    pub domain: Option<String>,
    /// Timerange type of the humidity block, e.g. `hourly`
    pub humidity_type: String,
    pub url: String,

    pub humidity: Vec<HumidityPoint>,
    pub max_humidity: Vec<HumidityPoint>,
    pub min_humidity: Vec<HumidityPoint>,
    pub temperature: Vec<TemperaturePoint>,
    pub max_temperature: Vec<TemperaturePoint>,
    pub min_temperature: Vec<TemperaturePoint>,
    pub wind_speed: Vec<WindSpeedPoint>,
    pub wind_direction: Vec<WindDirectionPoint>,
    pub forecast: Vec<ForecastPoint>,

    /// Unit system the values were selected in; fixed once normalized
    pub(crate) metric: bool,
    /// Locale the labels were selected in; fixed once normalized
    pub(crate) english: bool,
}

impl Area {
    /// Forecast page for an area id
    #[must_use]
    pub fn page_url(id: i64) -> String {
        format!("{AREA_PAGE_URL}{id}")
    }

    #[must_use]
    pub fn is_metric(&self) -> bool {
        self.metric
    }

    #[must_use]
    pub fn is_english(&self) -> bool {
        self.english
    }

    #[must_use]
    pub fn temperature_unit(&self) -> &'static str {
        if self.metric { "°C" } else { "°F" }
    }

    #[must_use]
    pub fn wind_speed_unit(&self) -> &'static str {
        if self.metric { "km/h" } else { "mph" }
    }

    /// Forecast entry closest at or before `at`, if any
    #[must_use]
    pub fn forecast_at(&self, at: NaiveDateTime) -> Option<&ForecastPoint> {
        self.forecast.iter().rev().find(|point| point.datetime <= at)
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (id {}, {:.4}, {:.4})",
            self.name, self.id, self.latitude, self.longitude
        )
    }
}
