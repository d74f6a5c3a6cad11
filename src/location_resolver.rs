//! Location Resolution Module
//!
//! Maps a free-form place name onto the DigitalForecast document published
//! for that province. Resolution never fails: anything unrecognised falls
//! back to the nationwide document.

use tracing::debug;

/// Canonical key of the nationwide document
pub const NATIONWIDE: &str = "indonesia";

/// Province keys and their DigitalForecast document paths.
///
/// Iteration order is the tie-break for substring matches: the first key
/// containing the query wins.
pub const PROVINCES: &[(&str, &str)] = &[
    ("indonesia", "DigitalForecast-Indonesia.xml"),
    ("aceh", "DigitalForecast-Aceh.xml"),
    ("bali", "DigitalForecast-Bali.xml"),
    ("bangka_belitung", "DigitalForecast-BangkaBelitung.xml"),
    ("banten", "DigitalForecast-Banten.xml"),
    ("bengkulu", "DigitalForecast-Bengkulu.xml"),
    ("di_yogyakarta", "DigitalForecast-DIYogyakarta.xml"),
    ("dki_jakarta", "DigitalForecast-DKIJakarta.xml"),
    ("gorontalo", "DigitalForecast-Gorontalo.xml"),
    ("jambi", "DigitalForecast-Jambi.xml"),
    ("jawa_barat", "DigitalForecast-JawaBarat.xml"),
    ("jawa_tengah", "DigitalForecast-JawaTengah.xml"),
    ("jawa_timur", "DigitalForecast-JawaTimur.xml"),
    ("kalimantan_barat", "DigitalForecast-KalimantanBarat.xml"),
    ("kalimantan_selatan", "DigitalForecast-KalimantanSelatan.xml"),
    ("kalimantan_tengah", "DigitalForecast-KalimantanTengah.xml"),
    ("kalimantan_timur", "DigitalForecast-KalimantanTimur.xml"),
    ("kalimantan_utara", "DigitalForecast-KalimantanUtara.xml"),
    ("kepulauan_riau", "DigitalForecast-KepulauanRiau.xml"),
    ("lampung", "DigitalForecast-Lampung.xml"),
    ("maluku", "DigitalForecast-Maluku.xml"),
    ("maluku_utara", "DigitalForecast-MalukuUtara.xml"),
    ("nusa_tenggara_barat", "DigitalForecast-NusaTenggaraBarat.xml"),
    ("nusa_tenggara_timur", "DigitalForecast-NusaTenggaraTimur.xml"),
    ("papua", "DigitalForecast-Papua.xml"),
    ("papua_barat", "DigitalForecast-PapuaBarat.xml"),
    ("riau", "DigitalForecast-Riau.xml"),
    ("sulawesi_barat", "DigitalForecast-SulawesiBarat.xml"),
    ("sulawesi_selatan", "DigitalForecast-SulawesiSelatan.xml"),
    ("sulawesi_tengah", "DigitalForecast-SulawesiTengah.xml"),
    ("sulawesi_tenggara", "DigitalForecast-SulawesiTenggara.xml"),
    ("sulawesi_utara", "DigitalForecast-SulawesiUtara.xml"),
    ("sumatera_barat", "DigitalForecast-SumateraBarat.xml"),
    ("sumatera_selatan", "DigitalForecast-SumateraSelatan.xml"),
    ("sumatera_utara", "DigitalForecast-SumateraUtara.xml"),
];

/// Administrative prefix dropped from queries ("Provinsi Jawa Barat")
const ADMINISTRATIVE_PREFIX: &str = "provinsi_";

/// Spelling variants rewritten to the canonical spelling
const SPELLING_VARIANTS: &[(&str, &str)] = &[("jogja", "yogya")];

/// Short-form prefix and its full form ("di jakarta" -> "dki_jakarta").
/// Applied only when the short form is not itself a canonical key.
const SHORT_FORM_PREFIX: (&str, &str) = ("di_", "dki_");

/// Service for resolving place names to forecast document paths
pub struct LocationResolver;

impl LocationResolver {
    /// Resolve a place name into a forecast document path
    #[must_use]
    pub fn resolve(query: Option<&str>) -> &'static str {
        let Some(query) = query.filter(|q| !q.trim().is_empty()) else {
            debug!("No location given, using nationwide forecast");
            return Self::nationwide();
        };

        let literal = Self::literal_form(query);
        let normalized = Self::expand_short_form(literal.clone());
        debug!("Resolving location {:?} as {:?}", query, normalized);

        // Expanded form first, then the literal one ("di jogja" -> di_yogyakarta)
        let candidates = [normalized.as_str(), literal.as_str()];

        if let Some(path) = candidates.iter().find_map(|c| Self::exact(c)) {
            return path;
        }

        for candidate in candidates {
            if let Some((key, path)) = PROVINCES.iter().find(|(key, _)| key.contains(candidate)) {
                debug!("Matched {:?} by substring of {}", candidate, key);
                return path;
            }
        }

        debug!("Location {:?} not recognised, using nationwide forecast", query);
        Self::nationwide()
    }

    /// Document path of the nationwide forecast
    #[must_use]
    pub fn nationwide() -> &'static str {
        Self::exact(NATIONWIDE).unwrap_or("DigitalForecast-Indonesia.xml")
    }

    /// Lowercase, join words with `_` and apply the aliasing rules
    #[must_use]
    pub fn normalize(query: &str) -> String {
        Self::expand_short_form(Self::literal_form(query))
    }

    /// Normalized query before short-form expansion
    fn literal_form(query: &str) -> String {
        let mut normalized = query
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");

        if let Some(rest) = normalized.strip_prefix(ADMINISTRATIVE_PREFIX) {
            normalized = rest.to_string();
        }

        for (variant, canonical) in SPELLING_VARIANTS {
            normalized = normalized.replace(variant, canonical);
        }

        normalized
    }

    fn expand_short_form(normalized: String) -> String {
        let (short, full) = SHORT_FORM_PREFIX;
        if Self::exact(&normalized).is_some() {
            return normalized;
        }
        match normalized.strip_prefix(short) {
            Some(rest) => format!("{full}{rest}"),
            None => normalized,
        }
    }

    fn exact(key: &str) -> Option<&'static str> {
        PROVINCES
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, path)| *path)
    }
}
