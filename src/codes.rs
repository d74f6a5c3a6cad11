//! Static code tables for BMKG forecast documents
//!
//! Both tables are closed sets. An unknown code is a lookup error: a stale
//! table must fail loudly rather than mislabel the weather.

use crate::{BmkgError, Result};

/// Directory of the weather icons; files are named `{slug}-am.png` / `{slug}-pm.png`
const ICON_URL_BASE: &str = "https://www.bmkg.go.id/asset/img/weather_icon/ID";

/// One entry of the weather condition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherCondition {
    pub code: &'static str,
    pub label_en: &'static str,
    pub label_id: &'static str,
    icon_slug: &'static str,
}

impl WeatherCondition {
    /// Label in the selected locale
    #[must_use]
    pub fn label(&self, english: bool) -> &'static str {
        if english { self.label_en } else { self.label_id }
    }

    /// Icon URL qualified by time of day
    #[must_use]
    pub fn icon_url(&self, is_evening: bool) -> String {
        let qualifier = if is_evening { "pm" } else { "am" };
        format!("{ICON_URL_BASE}/{}-{qualifier}.png", self.icon_slug)
    }
}

const fn condition(
    code: &'static str,
    label_en: &'static str,
    label_id: &'static str,
    icon_slug: &'static str,
) -> WeatherCondition {
    WeatherCondition {
        code,
        label_en,
        label_id,
        icon_slug,
    }
}

/// BMKG weather codes as published in the `weather` parameter block
pub const WEATHER_CODES: &[WeatherCondition] = &[
    condition("0", "Clear Skies", "Cerah", "cerah"),
    condition("1", "Partly Cloudy", "Cerah Berawan", "cerah berawan"),
    condition("2", "Partly Cloudy", "Cerah Berawan", "cerah berawan"),
    condition("3", "Mostly Cloudy", "Berawan", "berawan"),
    condition("4", "Overcast", "Berawan Tebal", "berawan tebal"),
    condition("5", "Haze", "Udara Kabur", "udara kabur"),
    condition("10", "Smoke", "Asap", "asap"),
    condition("45", "Fog", "Kabut", "kabut"),
    condition("60", "Light Rain", "Hujan Ringan", "hujan ringan"),
    condition("61", "Rain", "Hujan Sedang", "hujan sedang"),
    condition("63", "Heavy Rain", "Hujan Lebat", "hujan lebat"),
    condition("80", "Isolated Shower", "Hujan Lokal", "hujan lokal"),
    condition("95", "Severe Thunderstorm", "Hujan Petir", "hujan petir"),
    condition("97", "Severe Thunderstorm", "Hujan Petir", "hujan petir"),
];

/// One entry of the wind direction table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindDirectionCode {
    pub code: &'static str,
    pub label_en: &'static str,
    pub label_id: &'static str,
}

impl WindDirectionCode {
    #[must_use]
    pub fn label(&self, english: bool) -> &'static str {
        if english { self.label_en } else { self.label_id }
    }
}

const fn wind(
    code: &'static str,
    label_en: &'static str,
    label_id: &'static str,
) -> WindDirectionCode {
    WindDirectionCode {
        code,
        label_en,
        label_id,
    }
}

/// Cardinal codes used in the `CARD` value of the wind direction block
pub const WIND_DIRECTION_CODES: &[WindDirectionCode] = &[
    wind("N", "North", "Utara"),
    wind("NNE", "North-Northeast", "Utara-Timur Laut"),
    wind("NE", "Northeast", "Timur Laut"),
    wind("ENE", "East-Northeast", "Timur-Timur Laut"),
    wind("E", "East", "Timur"),
    wind("ESE", "East-Southeast", "Timur-Tenggara"),
    wind("SE", "Southeast", "Tenggara"),
    wind("SSE", "South-Southeast", "Selatan-Tenggara"),
    wind("S", "South", "Selatan"),
    wind("SSW", "South-Southwest", "Selatan-Barat Daya"),
    wind("SW", "Southwest", "Barat Daya"),
    wind("WSW", "West-Southwest", "Barat-Barat Daya"),
    wind("W", "West", "Barat"),
    wind("WNW", "West-Northwest", "Barat-Barat Laut"),
    wind("NW", "Northwest", "Barat Laut"),
    wind("NNW", "North-Northwest", "Utara-Barat Laut"),
    wind("VARIABLE", "Variable", "Berubah-ubah"),
];

/// Look up a weather condition by its raw code.
pub fn weather_condition(code: &str) -> Result<&'static WeatherCondition> {
    let code = code.trim();
    WEATHER_CODES
        .iter()
        .find(|entry| entry.code == code)
        .ok_or_else(|| BmkgError::lookup("weather", code))
}

/// Look up a wind direction by its cardinal code.
pub fn wind_direction(code: &str) -> Result<&'static WindDirectionCode> {
    let code = code.trim();
    WIND_DIRECTION_CODES
        .iter()
        .find(|entry| entry.code == code)
        .ok_or_else(|| BmkgError::lookup("wind direction", code))
}

/// English label and time-of-day icon URL for a weather code.
pub fn weather_label_and_icon(code: &str, is_evening: bool) -> Result<(&'static str, String)> {
    let condition = weather_condition(code)?;
    Ok((condition.label_en, condition.icon_url(is_evening)))
}

/// English label for a wind direction code.
pub fn wind_direction_label(code: &str) -> Result<&'static str> {
    Ok(wind_direction(code)?.label_en)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[test]
    fn test_weather_label_and_icon() {
        let (label, icon) = weather_label_and_icon("3", false).unwrap();
        assert_eq!(label, "Mostly Cloudy");
        assert_eq!(
            icon,
            "https://www.bmkg.go.id/asset/img/weather_icon/ID/berawan-am.png"
        );

        let (_, icon) = weather_label_and_icon("60", true).unwrap();
        assert!(icon.ends_with("hujan ringan-pm.png"));
    }

    #[rstest]
    #[case("999")]
    #[case("")]
    #[case("cerah")]
    fn test_unknown_weather_code_fails(#[case] code: &str) {
        let err = weather_label_and_icon(code, false).unwrap_err();
        assert!(matches!(err, BmkgError::Lookup { table: "weather", .. }));
    }

    #[rstest]
    #[case("N", "North")]
    #[case("SSW", "South-Southwest")]
    #[case("VARIABLE", "Variable")]
    #[case(" E ", "East")]
    fn test_wind_direction_label(#[case] code: &str, #[case] expected: &str) {
        assert_eq!(wind_direction_label(code).unwrap(), expected);
    }

    #[test]
    fn test_unknown_wind_direction_fails() {
        let err = wind_direction_label("XYZ").unwrap_err();
        assert!(matches!(err, BmkgError::Lookup { table: "wind direction", .. }));
    }

    #[test]
    fn test_locale_labels() {
        let condition = weather_condition("0").unwrap();
        assert_eq!(condition.label(true), "Clear Skies");
        assert_eq!(condition.label(false), "Cerah");

        let direction = wind_direction("SE").unwrap();
        assert_eq!(direction.label(false), "Tenggara");
    }

    #[test]
    fn test_tables_have_unique_codes() {
        let weather: HashSet<_> = WEATHER_CODES.iter().map(|c| c.code).collect();
        assert_eq!(weather.len(), WEATHER_CODES.len());

        let wind: HashSet<_> = WIND_DIRECTION_CODES.iter().map(|c| c.code).collect();
        assert_eq!(wind.len(), WIND_DIRECTION_CODES.len());
    }
}
