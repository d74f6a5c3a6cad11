//! Forecast Normalizer
//!
//! Reads BMKG DigitalForecast documents into [`Weather`] and [`Area`]
//! records. The XML is first deserialized into the `Raw*` structures below,
//! which mirror the published tree; normalization then walks the parameter
//! blocks by their fixed position in the provider schema.

use std::str::FromStr;

use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::{debug, info};

use crate::codes;
use crate::models::{
    Area, ForecastPoint, HumidityPoint, TemperaturePoint, Weather, WindDirectionPoint,
    WindSpeedPoint,
};
use crate::temporal::{is_evening, parse_issue_timestamp, parse_timestamp};
use crate::{BmkgError, Result};

/// Parameter blocks of an area, in the order the provider publishes them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterSlot {
    Humidity,
    MaxHumidity,
    MaxTemperature,
    MinHumidity,
    MinTemperature,
    Temperature,
    Weather,
    WindDirection,
    WindSpeed,
}

impl ParameterSlot {
    /// Every slot, ordered by block position
    pub const ALL: [ParameterSlot; 9] = [
        ParameterSlot::Humidity,
        ParameterSlot::MaxHumidity,
        ParameterSlot::MaxTemperature,
        ParameterSlot::MinHumidity,
        ParameterSlot::MinTemperature,
        ParameterSlot::Temperature,
        ParameterSlot::Weather,
        ParameterSlot::WindDirection,
        ParameterSlot::WindSpeed,
    ];

    /// Position of the block inside `<area>`
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            ParameterSlot::Humidity => 0,
            ParameterSlot::MaxHumidity => 1,
            ParameterSlot::MaxTemperature => 2,
            ParameterSlot::MinHumidity => 3,
            ParameterSlot::MinTemperature => 4,
            ParameterSlot::Temperature => 5,
            ParameterSlot::Weather => 6,
            ParameterSlot::WindDirection => 7,
            ParameterSlot::WindSpeed => 8,
        }
    }

    /// `id` attribute the block carries in the document
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            ParameterSlot::Humidity => "hu",
            ParameterSlot::MaxHumidity => "humax",
            ParameterSlot::MaxTemperature => "tmax",
            ParameterSlot::MinHumidity => "humin",
            ParameterSlot::MinTemperature => "tmin",
            ParameterSlot::Temperature => "t",
            ParameterSlot::Weather => "weather",
            ParameterSlot::WindDirection => "wd",
            ParameterSlot::WindSpeed => "ws",
        }
    }
}

/// Minimum number of parameter blocks an area must carry
pub const REQUIRED_PARAMETER_BLOCKS: usize = ParameterSlot::ALL.len();

// Value positions inside a timerange. The temperature and wind speed
// selections move in opposite directions with the unit flag; both follow
// the provider's value ordering (C, F) and (Kt, MPH, KPH, MS).

/// Temperature value position: `C` when metric, `F` otherwise
#[must_use]
pub const fn temperature_index(metric: bool) -> usize {
    1 - metric as usize
}

/// Primary wind speed position: `KPH` when metric, `MPH` otherwise
#[must_use]
pub const fn wind_speed_index(metric: bool) -> usize {
    metric as usize + 1
}

pub const WIND_SPEED_MS_INDEX: usize = 3;
pub const WIND_SPEED_KNOTS_INDEX: usize = 0;

pub const WIND_DEGREES_INDEX: usize = 0;
pub const WIND_CARDINAL_INDEX: usize = 1;
pub const WIND_SEXAGESIMAL_INDEX: usize = 2;

/// Name position: English first, Indonesian second
#[must_use]
pub const fn name_index(english: bool) -> usize {
    if english { 0 } else { 1 }
}

/// DigitalForecast XML structure for deserialization
#[derive(Debug, Deserialize)]
pub struct RawDocument {
    #[serde(rename = "@source")]
    pub source: Option<String>,
    #[serde(rename = "@productioncenter")]
    pub production_center: Option<String>,
    pub forecast: Option<RawForecast>,
}

#[derive(Debug, Deserialize)]
pub struct RawForecast {
    #[serde(rename = "@domain")]
    pub domain: Option<String>,
    pub issue: Option<RawIssue>,
    #[serde(rename = "area", default)]
    pub areas: Vec<RawArea>,
}

#[derive(Debug, Deserialize)]
pub struct RawIssue {
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawArea {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    #[serde(rename = "@latitude")]
    pub latitude: Option<String>,
    #[serde(rename = "@longitude")]
    pub longitude: Option<String>,
    #[serde(rename = "@type")]
    pub kind: Option<String>,
    #[serde(rename = "@level")]
    pub level: Option<String>,
    #[serde(rename = "@description")]
    pub description: Option<String>,
    #[serde(rename = "@domain")]
    pub domain: Option<String>,
    #[serde(rename = "name", default)]
    pub names: Vec<RawText>,
    #[serde(rename = "parameter", default)]
    pub parameters: Vec<RawParameter>,
}

#[derive(Debug, Deserialize)]
pub struct RawText {
    #[serde(rename = "$text", default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct RawParameter {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    #[serde(rename = "@description")]
    pub description: Option<String>,
    #[serde(rename = "timerange", default)]
    pub timeranges: Vec<RawTimerange>,
}

#[derive(Debug, Deserialize)]
pub struct RawTimerange {
    #[serde(rename = "@type")]
    pub kind: Option<String>,
    #[serde(rename = "@datetime")]
    pub datetime: Option<String>,
    #[serde(rename = "value", default)]
    pub values: Vec<RawValue>,
}

#[derive(Debug, Deserialize)]
pub struct RawValue {
    #[serde(rename = "@unit")]
    pub unit: Option<String>,
    #[serde(rename = "$text", default)]
    pub text: String,
}

/// Parse a whole DigitalForecast document.
pub fn normalize_weather(xml: &str, metric: bool, english: bool) -> Result<Weather> {
    let raw: RawDocument = from_str(xml)?;
    let forecast = raw
        .forecast
        .ok_or_else(|| BmkgError::structural("document has no <forecast> element"))?;
    let timestamp = forecast
        .issue
        .as_ref()
        .and_then(|issue| issue.timestamp.as_deref())
        .ok_or_else(|| BmkgError::structural("forecast: missing issue.timestamp"))?;
    let issued = parse_issue_timestamp(timestamp)?;

    let mut areas = Vec::with_capacity(forecast.areas.len());
    for raw_area in &forecast.areas {
        // Sea areas are published without any parameter block
        if raw_area.parameters.is_empty() {
            debug!("Skipping area {:?} without parameter blocks", raw_area.id);
            continue;
        }
        areas.push(normalize_area(raw_area, metric, english)?);
    }

    info!("Normalized {} areas for domain {:?}", areas.len(), forecast.domain);

    Ok(Weather {
        source: raw.source,
        production_center: raw.production_center,
        domain: forecast.domain,
        issued,
        areas,
    })
}

/// Parse a standalone `<area>` element.
pub fn parse_area(xml: &str, metric: bool, english: bool) -> Result<Area> {
    let raw: RawArea = from_str(xml)?;
    normalize_area(&raw, metric, english)
}

/// Normalize one area node into an [`Area`].
pub fn normalize_area(node: &RawArea, metric: bool, english: bool) -> Result<Area> {
    let raw_id = node
        .id
        .as_deref()
        .ok_or_else(|| BmkgError::structural("area: missing attribute 'id'"))?;
    let id: i64 = number(raw_id, "area.id")?;
    let context = AreaContext { node, id };
    context.check_blocks()?;

    let name = node
        .names
        .get(name_index(english))
        .map(|name| name.text.trim().to_string())
        .ok_or_else(|| {
            BmkgError::structural(format!(
                "area {id}: expected a name at position {}, found {} names",
                name_index(english),
                node.names.len()
            ))
        })?;

    let humidity_type = context
        .block(ParameterSlot::Humidity)?
        .timeranges
        .first()
        .and_then(|entry| entry.kind.clone())
        .ok_or_else(|| {
            BmkgError::structural(format!("area {id}: humidity block has no typed timerange"))
        })?;

    Ok(Area {
        id,
        name,
        latitude: number(context.attribute(&node.latitude, "latitude")?, "area.latitude")?,
        longitude: number(context.attribute(&node.longitude, "longitude")?, "area.longitude")?,
        kind: context.attribute(&node.kind, "type")?.to_string(),
        level: number(context.attribute(&node.level, "level")?, "area.level")?,
        description: node.description.clone().filter(|d| !d.is_empty()),
        domain: node.domain.clone().filter(|d| !d.is_empty()),
        humidity_type,
        url: Area::page_url(id),
        humidity: context.series(ParameterSlot::Humidity, humidity_point)?,
        max_humidity: context.series(ParameterSlot::MaxHumidity, humidity_point)?,
        min_humidity: context.series(ParameterSlot::MinHumidity, humidity_point)?,
        temperature: context.series(ParameterSlot::Temperature, |e| temperature_point(e, metric))?,
        max_temperature: context
            .series(ParameterSlot::MaxTemperature, |e| temperature_point(e, metric))?,
        min_temperature: context
            .series(ParameterSlot::MinTemperature, |e| temperature_point(e, metric))?,
        wind_speed: context.series(ParameterSlot::WindSpeed, |e| wind_speed_point(e, metric))?,
        wind_direction: context
            .series(ParameterSlot::WindDirection, |e| wind_direction_point(e, english))?,
        forecast: context.series(ParameterSlot::Weather, |e| forecast_point(e, english))?,
        metric,
        english,
    })
}

struct AreaContext<'a> {
    node: &'a RawArea,
    id: i64,
}

/// One timerange together with the location it was read from
struct Entry<'a> {
    raw: &'a RawTimerange,
    slot: ParameterSlot,
    position: usize,
}

impl<'a> AreaContext<'a> {
    fn attribute(&self, value: &'a Option<String>, name: &str) -> Result<&'a str> {
        value.as_deref().ok_or_else(|| {
            BmkgError::structural(format!("area {}: missing attribute '{name}'", self.id))
        })
    }

    fn check_blocks(&self) -> Result<()> {
        let found = self.node.parameters.len();
        if found < REQUIRED_PARAMETER_BLOCKS {
            return Err(BmkgError::structural(format!(
                "area {}: expected at least {REQUIRED_PARAMETER_BLOCKS} parameter blocks, \
                 found {found}",
                self.id
            )));
        }

        for slot in ParameterSlot::ALL {
            if let Some(id) = &self.node.parameters[slot.index()].id {
                if id != slot.id() {
                    return Err(BmkgError::structural(format!(
                        "area {}: parameter block {} is '{id}', expected '{}'",
                        self.id,
                        slot.index(),
                        slot.id()
                    )));
                }
            }
        }
        Ok(())
    }

    fn block(&self, slot: ParameterSlot) -> Result<&RawParameter> {
        self.node.parameters.get(slot.index()).ok_or_else(|| {
            BmkgError::structural(format!(
                "area {}: missing '{}' parameter block",
                self.id,
                slot.id()
            ))
        })
    }

    fn series<T>(
        &self,
        slot: ParameterSlot,
        parse: impl Fn(&Entry<'_>) -> Result<T>,
    ) -> Result<Vec<T>> {
        self.block(slot)?
            .timeranges
            .iter()
            .enumerate()
            .map(|(position, raw)| {
                parse(&Entry {
                    raw,
                    slot,
                    position,
                })
                .map_err(|err| match err {
                    BmkgError::Structural { message } => {
                        BmkgError::structural(format!("area {}: {message}", self.id))
                    }
                    other => other,
                })
            })
            .collect()
    }
}

impl Entry<'_> {
    fn path(&self) -> String {
        format!("{}.timerange[{}]", self.slot.id(), self.position)
    }

    fn datetime(&self) -> Result<chrono::NaiveDateTime> {
        let raw = self.raw.datetime.as_deref().ok_or_else(|| {
            BmkgError::structural(format!("{}: missing attribute 'datetime'", self.path()))
        })?;
        parse_timestamp(raw)
            .map_err(|_| BmkgError::format(format!("{}.datetime", self.path()), raw))
    }

    fn expect_values(&self, count: usize) -> Result<()> {
        if self.raw.values.len() < count {
            return Err(BmkgError::structural(format!(
                "{}: expected {count} values, found {}",
                self.path(),
                self.raw.values.len()
            )));
        }
        Ok(())
    }

    fn value(&self, index: usize) -> Result<&RawValue> {
        self.raw.values.get(index).ok_or_else(|| {
            BmkgError::structural(format!("{}: missing value {index}", self.path()))
        })
    }

    fn number<T: FromStr>(&self, index: usize) -> Result<T> {
        let value = self.value(index)?;
        number(&value.text, &format!("{}.value[{index}]", self.path()))
    }

    fn unit(&self, index: usize) -> Result<String> {
        self.value(index)?.unit.clone().ok_or_else(|| {
            BmkgError::structural(format!("{}.value[{index}]: missing unit", self.path()))
        })
    }

    /// Coded fields carry exactly one value
    fn single_value(&self) -> Result<&RawValue> {
        if self.raw.values.len() != 1 {
            return Err(BmkgError::structural(format!(
                "{}: expected a single value, found {}",
                self.path(),
                self.raw.values.len()
            )));
        }
        self.value(0)
    }
}

fn number<T: FromStr>(raw: &str, field: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| BmkgError::format(field, raw))
}

fn humidity_point(entry: &Entry<'_>) -> Result<HumidityPoint> {
    entry.single_value()?;
    Ok(HumidityPoint {
        datetime: entry.datetime()?,
        value: entry.number(0)?,
        unit: entry.unit(0)?,
    })
}

fn temperature_point(entry: &Entry<'_>, metric: bool) -> Result<TemperaturePoint> {
    entry.expect_values(2)?;
    let index = temperature_index(metric);
    Ok(TemperaturePoint {
        datetime: entry.datetime()?,
        value: entry.number(index)?,
        unit: entry.unit(index)?,
    })
}

fn wind_speed_point(entry: &Entry<'_>, metric: bool) -> Result<WindSpeedPoint> {
    entry.expect_values(4)?;
    Ok(WindSpeedPoint {
        datetime: entry.datetime()?,
        value: entry.number(wind_speed_index(metric))?,
        ms: entry.number(WIND_SPEED_MS_INDEX)?,
        knots: entry.number(WIND_SPEED_KNOTS_INDEX)?,
    })
}

fn wind_direction_point(entry: &Entry<'_>, english: bool) -> Result<WindDirectionPoint> {
    entry.expect_values(3)?;
    let direction = codes::wind_direction(&entry.value(WIND_CARDINAL_INDEX)?.text)?;
    Ok(WindDirectionPoint {
        datetime: entry.datetime()?,
        degrees: entry.number(WIND_DEGREES_INDEX)?,
        text: direction.label(english).to_string(),
        sexagesimal: entry.number(WIND_SEXAGESIMAL_INDEX)?,
    })
}

fn forecast_point(entry: &Entry<'_>, english: bool) -> Result<ForecastPoint> {
    let datetime = entry.datetime()?;
    let condition = codes::weather_condition(&entry.single_value()?.text)?;
    Ok(ForecastPoint {
        datetime,
        condition: condition.label(english).to_string(),
        icon_url: condition.icon_url(is_evening(&datetime)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const AREA_XML: &str = include_str!("../tests/fixtures/area.xml");

    fn area(metric: bool, english: bool) -> Area {
        parse_area(AREA_XML, metric, english).unwrap()
    }

    #[test]
    fn test_slot_table_matches_document_order() {
        for (position, slot) in ParameterSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), position);
        }
        assert_eq!(REQUIRED_PARAMETER_BLOCKS, 9);
    }

    #[test]
    fn test_value_index_arithmetic() {
        assert_eq!(temperature_index(true), 0);
        assert_eq!(temperature_index(false), 1);
        assert_eq!(wind_speed_index(true), 2);
        assert_eq!(wind_speed_index(false), 1);
        assert_eq!(name_index(true), 0);
        assert_eq!(name_index(false), 1);
    }

    #[test]
    fn test_area_identity() {
        let area = area(true, true);
        assert_eq!(area.id, 501_397);
        assert_eq!(area.name, "Banda Aceh City");
        assert_eq!(area.latitude, 5.5483);
        assert_eq!(area.longitude, 95.3238);
        assert_eq!(area.kind, "land");
        assert_eq!(area.level, 1);
        assert_eq!(area.domain.as_deref(), Some("Aceh"));
        assert_eq!(area.humidity_type, "hourly");
        assert!(area.url.ends_with("AreaID=501397"));

        let area = parse_area(AREA_XML, true, false).unwrap();
        assert_eq!(area.name, "Kota Banda Aceh");
    }

    #[test]
    fn test_temperature_unit_selection() {
        let metric = area(true, true);
        assert_eq!(metric.temperature[1].value, 20.0);
        assert_eq!(metric.temperature[1].unit, "C");
        assert_eq!(metric.max_temperature[0].value, 31.0);

        let imperial = area(false, true);
        assert_eq!(imperial.temperature[1].value, 68.0);
        assert_eq!(imperial.temperature[1].unit, "F");
        assert_eq!(imperial.min_temperature[0].value, 73.4);
    }

    #[test]
    fn test_series_follow_block_order() {
        let area = area(true, true);
        let hours: Vec<u32> = area.temperature.iter().map(|p| p.datetime.hour()).collect();
        assert_eq!(hours, vec![0, 9, 15]);
        assert_eq!(area.humidity.len(), 2);
        assert_eq!(area.humidity[0].value, 85);
        assert_eq!(area.humidity[0].unit, "%");
        assert_eq!(area.max_humidity[0].value, 95);
        assert_eq!(area.min_humidity[0].value, 60);
    }

    #[test]
    fn test_wind_speed_keeps_all_representations() {
        let metric = area(true, true);
        let point = &metric.wind_speed[0];
        assert_eq!(point.value, 9.26);
        assert_eq!(point.ms, 2.572);
        assert_eq!(point.knots, 5.0);

        let imperial = area(false, true);
        assert_eq!(imperial.wind_speed[0].value, 5.754);
        assert_eq!(imperial.wind_speed[0].ms, 2.572);
    }

    #[test]
    fn test_wind_direction() {
        let point = &area(true, true).wind_direction[0];
        assert_eq!(point.degrees, 90.0);
        assert_eq!(point.text, "East");
        assert_eq!(point.sexagesimal, 9000.0);

        assert_eq!(area(true, false).wind_direction[0].text, "Timur");
    }

    #[test]
    fn test_forecast_icon_follows_time_of_day() {
        let area = area(true, true);
        assert_eq!(area.forecast[0].datetime.hour(), 9);
        assert_eq!(area.forecast[0].condition, "Mostly Cloudy");
        assert!(area.forecast[0].icon_url.ends_with("berawan-am.png"));

        assert_eq!(area.forecast[1].datetime.hour(), 15);
        assert_eq!(area.forecast[1].condition, "Light Rain");
        assert!(area.forecast[1].icon_url.ends_with("-pm.png"));
    }

    #[test]
    fn test_unknown_weather_code_is_lookup_error() {
        let xml = AREA_XML.replace(
            r#"<value unit="icon">3</value>"#,
            r#"<value unit="icon">999</value>"#,
        );
        let err = parse_area(&xml, true, true).unwrap_err();
        assert!(matches!(err, BmkgError::Lookup { table: "weather", .. }));
    }

    #[test]
    fn test_unknown_wind_direction_is_lookup_error() {
        let xml = AREA_XML.replace(
            r#"<value unit="CARD">E</value>"#,
            r#"<value unit="CARD">EAST</value>"#,
        );
        let err = parse_area(&xml, true, true).unwrap_err();
        assert!(matches!(err, BmkgError::Lookup { table: "wind direction", .. }));
    }

    #[test]
    fn test_missing_block_is_structural_error() {
        let start = AREA_XML.find(r#"<parameter id="ws""#).unwrap();
        let end = AREA_XML.rfind("</parameter>").unwrap() + "</parameter>".len();
        let mut xml = AREA_XML.to_string();
        xml.replace_range(start..end, "");

        let err = parse_area(&xml, true, true).unwrap_err();
        match err {
            BmkgError::Structural { message } => assert!(message.contains("found 8")),
            other => panic!("expected structural error, got {other:?}"),
        }
    }

    #[test]
    fn test_reordered_block_is_structural_error() {
        let xml = AREA_XML.replacen(r#"<parameter id="hu""#, r#"<parameter id="t""#, 1);
        let err = parse_area(&xml, true, true).unwrap_err();
        assert!(matches!(err, BmkgError::Structural { .. }));
    }

    #[test]
    fn test_missing_value_is_structural_error() {
        let xml = AREA_XML.replace(r#"<value unit="MS">2.572</value>"#, "");
        let err = parse_area(&xml, true, true).unwrap_err();
        match err {
            BmkgError::Structural { message } => {
                assert!(message.contains("area 501397"));
                assert!(message.contains("ws.timerange[0]"));
            }
            other => panic!("expected structural error, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_datetime_is_format_error() {
        let xml = AREA_XML.replacen(r#"datetime="202610170000""#, r#"datetime="2026-10-17""#, 1);
        let err = parse_area(&xml, true, true).unwrap_err();
        match err {
            BmkgError::Format { field, value } => {
                assert_eq!(field, "hu.timerange[0].datetime");
                assert_eq!(value, "2026-10-17");
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_datetime_is_structural_error() {
        let xml = AREA_XML.replacen(r#" datetime="202610170000""#, "", 1);
        let err = parse_area(&xml, true, true).unwrap_err();
        match err {
            BmkgError::Structural { message } => {
                assert_eq!(
                    message,
                    "area 501397: hu.timerange[0]: missing attribute 'datetime'"
                );
            }
            other => panic!("expected structural error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_area_attribute_is_structural_error() {
        let xml = AREA_XML.replacen(r#"latitude="5.5483" "#, "", 1);
        let err = parse_area(&xml, true, true).unwrap_err();
        match err {
            BmkgError::Structural { message } => {
                assert_eq!(message, "area 501397: missing attribute 'latitude'");
            }
            other => panic!("expected structural error, got {other:?}"),
        }

        let xml = AREA_XML.replacen(r#"id="501397" "#, "", 1);
        let err = parse_area(&xml, true, true).unwrap_err();
        assert!(matches!(err, BmkgError::Structural { .. }));
    }

    #[test]
    fn test_missing_issue_timestamp_is_structural_error() {
        let xml = include_str!("../tests/fixtures/digital_forecast.xml")
            .replace("<timestamp>20261017060413</timestamp>", "");
        let err = normalize_weather(&xml, true, true).unwrap_err();
        assert!(matches!(err, BmkgError::Structural { .. }));
    }

    #[test]
    fn test_bad_number_is_format_error() {
        let xml = AREA_XML.replace(
            r#"<value unit="%">85</value>"#,
            r#"<value unit="%">high</value>"#,
        );
        let err = parse_area(&xml, true, true).unwrap_err();
        assert!(matches!(err, BmkgError::Format { .. }));
    }
}
