//! DigitalForecast document model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Area;

/// A normalized DigitalForecast document
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Weather {
    /// Producer attribute of the document root
    pub source: Option<String>,
    pub production_center: Option<String>,
    /// Forecast domain, e.g. a province name or `Indonesia`
    pub domain: Option<String>,
    /// When BMKG issued the document
    pub issued: NaiveDateTime,
    /// Areas in document order
    pub areas: Vec<Area>,
}

impl Weather {
    /// Case-insensitive lookup by area name
    #[must_use]
    pub fn find_area(&self, name: &str) -> Option<&Area> {
        let name = name.trim().to_lowercase();
        self.areas
            .iter()
            .find(|area| area.name.to_lowercase() == name)
    }

    #[must_use]
    pub fn area_by_id(&self, id: i64) -> Option<&Area> {
        self.areas.iter().find(|area| area.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}
