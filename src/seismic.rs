//! Seismic Normalizer
//!
//! Earthquake bulletins share one element layout whether the document holds
//! a single event or a list. The [`SeismicVariant`] tag selects which fields
//! are required and how the document is wrapped.

use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::debug;

use crate::models::{Depth, EarthquakeEvent, SeismicVariant, TsunamiEvent, WaveObservation};
use crate::temporal::parse_seismic_timestamp;
use crate::{BmkgError, Result};

/// Base URL of shakemap images referenced by the `Shakemap` field
pub const SHAKEMAP_BASE_URL: &str = "https://data.bmkg.go.id/DataMKG/TEWS/";

const KM_TO_MILES: f64 = 0.621_371;

/// `<Infogempa>` root of the earthquake feeds
#[derive(Debug, Deserialize)]
pub struct RawInfogempa {
    #[serde(rename = "gempa", alias = "Gempa", default)]
    pub events: Vec<RawQuake>,
}

/// `<Infotsunami>` root of the tsunami feed
#[derive(Debug, Deserialize)]
pub struct RawInfotsunami {
    #[serde(rename = "Gempa", alias = "gempa", default)]
    pub events: Vec<RawQuake>,
}

#[derive(Debug, Deserialize)]
pub struct RawQuake {
    #[serde(rename = "DateTime")]
    pub datetime: Option<String>,
    #[serde(rename = "Lintang")]
    pub latitude: Option<String>,
    #[serde(rename = "Bujur")]
    pub longitude: Option<String>,
    #[serde(rename = "Magnitude")]
    pub magnitude: Option<String>,
    #[serde(rename = "Kedalaman")]
    pub depth: Option<String>,
    #[serde(rename = "Wilayah")]
    pub region: Option<String>,
    #[serde(rename = "Potensi")]
    pub potential: Option<String>,
    #[serde(rename = "Dirasakan")]
    pub felt: Option<String>,
    #[serde(rename = "Shakemap")]
    pub shakemap: Option<String>,
    #[serde(rename = "Instruksi")]
    pub instruction: Option<String>,
    #[serde(rename = "Pengamatan", default)]
    pub observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
pub struct RawObservation {
    #[serde(rename = "Lokasi")]
    pub location: Option<String>,
    #[serde(rename = "Waktu")]
    pub arrival: Option<String>,
    #[serde(rename = "Tinggi")]
    pub height: Option<String>,
}

/// Parse an earthquake document into events, keeping document order.
///
/// `Single` and `Tsunami` documents must hold exactly one event.
pub fn parse_events(
    xml: &str,
    metric: bool,
    variant: SeismicVariant,
) -> Result<Vec<EarthquakeEvent>> {
    let nodes = event_nodes(xml, variant)?;
    debug!("Read {} event elements from {} document", nodes.len(), variant);

    nodes
        .iter()
        .enumerate()
        .map(|(position, node)| {
            normalize_event(node, metric, variant).map_err(|err| at_position(err, position))
        })
        .collect()
}

/// Parse the latest earthquake document.
pub fn parse_latest_earthquake(xml: &str, metric: bool) -> Result<EarthquakeEvent> {
    let mut events = parse_events(xml, metric, SeismicVariant::Single)?;
    events
        .pop()
        .ok_or_else(|| BmkgError::structural("latest earthquake document holds no event"))
}

/// Parse the latest tsunami document.
pub fn parse_tsunami(xml: &str, metric: bool) -> Result<TsunamiEvent> {
    let nodes = event_nodes(xml, SeismicVariant::Tsunami)?;
    let node = nodes
        .first()
        .ok_or_else(|| BmkgError::structural("tsunami document holds no event"))?;
    normalize_tsunami(node, metric)
}

fn event_nodes(xml: &str, variant: SeismicVariant) -> Result<Vec<RawQuake>> {
    let nodes = match variant {
        SeismicVariant::Tsunami => from_str::<RawInfotsunami>(xml)?.events,
        _ => from_str::<RawInfogempa>(xml)?.events,
    };

    if !variant.is_list() && nodes.len() != 1 {
        return Err(BmkgError::structural(format!(
            "{variant} document must hold exactly one event, found {}",
            nodes.len()
        )));
    }
    Ok(nodes)
}

/// Normalize one event element for the given variant.
pub fn normalize_event(
    node: &RawQuake,
    metric: bool,
    variant: SeismicVariant,
) -> Result<EarthquakeEvent> {
    let (potential, felt_locations) = match variant {
        SeismicVariant::Single => (
            Some(required(&node.potential, "Potensi")?.to_string()),
            optional(&node.felt),
        ),
        SeismicVariant::ListElement => (optional(&node.potential), None),
        SeismicVariant::Felt => (None, Some(required(&node.felt, "Dirasakan")?.to_string())),
        SeismicVariant::Tsunami => (None, None),
    };

    let datetime = required(&node.datetime, "DateTime")?;

    Ok(EarthquakeEvent {
        variant,
        datetime: parse_seismic_timestamp(datetime)?,
        latitude: coordinate(required(&node.latitude, "Lintang")?, "Lintang", "LU", "LS")?,
        longitude: coordinate(required(&node.longitude, "Bujur")?, "Bujur", "BT", "BB")?,
        magnitude: leading_number(required(&node.magnitude, "Magnitude")?, "Magnitude")?,
        depth: depth(required(&node.depth, "Kedalaman")?, metric)?,
        region: required(&node.region, "Wilayah")?.to_string(),
        potential,
        felt_locations,
        shakemap_url: optional(&node.shakemap).map(|file| format!("{SHAKEMAP_BASE_URL}{file}")),
    })
}

/// Normalize a tsunami event element.
pub fn normalize_tsunami(node: &RawQuake, metric: bool) -> Result<TsunamiEvent> {
    let event = normalize_event(node, metric, SeismicVariant::Tsunami)?;
    let observations = node
        .observations
        .iter()
        .enumerate()
        .map(|(position, raw)| -> Result<WaveObservation> {
            let field = |name: &str| format!("Pengamatan[{position}].{name}");
            let height = required(&raw.height, &field("Tinggi"))?;
            Ok(WaveObservation {
                location: required(&raw.location, &field("Lokasi"))?.to_string(),
                arrival: required(&raw.arrival, &field("Waktu"))?.to_string(),
                height_m: wave_height(height, &field("Tinggi"))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TsunamiEvent {
        event,
        warning: required(&node.potential, "Potensi")?.to_string(),
        instruction: optional(&node.instruction),
        observations,
    })
}

fn at_position(err: BmkgError, position: usize) -> BmkgError {
    match err {
        BmkgError::Structural { message } => {
            BmkgError::structural(format!("event {position}: {message}"))
        }
        BmkgError::Format { field, value } => {
            BmkgError::format(format!("gempa[{position}].{field}"), value)
        }
        other => other,
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BmkgError::structural(format!("missing field '{field}'")))
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Number in front of an optional unit token, e.g. `5.0 SR`
fn leading_number(raw: &str, field: &str) -> Result<f64> {
    raw.split_whitespace()
        .next()
        .and_then(|token| token.parse::<f64>().ok())
        .ok_or_else(|| BmkgError::format(field, raw))
}

/// Degrees with a hemisphere suffix, e.g. `7.87 LS`
fn coordinate(raw: &str, field: &str, positive: &str, negative: &str) -> Result<f64> {
    let value = leading_number(raw, field)?;
    match raw.split_whitespace().nth(1) {
        None => Ok(value),
        Some(h) if h.eq_ignore_ascii_case(positive) => Ok(value.abs()),
        Some(h) if h.eq_ignore_ascii_case(negative) => Ok(-value.abs()),
        Some(_) => Err(BmkgError::format(field, raw)),
    }
}

fn depth(raw: &str, metric: bool) -> Result<Depth> {
    let value = leading_number(raw, "Kedalaman")?;
    match raw.split_whitespace().nth(1) {
        None => {}
        Some(unit) if unit.eq_ignore_ascii_case("km") => {}
        Some(_) => return Err(BmkgError::format("Kedalaman", raw)),
    }

    Ok(if metric {
        Depth {
            value,
            unit: "km".to_string(),
        }
    } else {
        Depth {
            value: value * KM_TO_MILES,
            unit: "mi".to_string(),
        }
    })
}

fn wave_height(raw: &str, field: &str) -> Result<f64> {
    let value = leading_number(raw, field)?;
    match raw.split_whitespace().nth(1) {
        None => Ok(value),
        Some(unit) if unit.eq_ignore_ascii_case("m") => Ok(value),
        Some(unit) if unit.eq_ignore_ascii_case("cm") => Ok(value / 100.0),
        Some(_) => Err(BmkgError::format(field, raw)),
    }
}
