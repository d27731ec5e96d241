use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Unit system tag carried by every record.
///
/// Rain packets arrive in US units while every other sensor reports metric;
/// records keep whatever the sensor used and consumers go by this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
#[repr(u8)]
pub enum UnitSystem {
    Us = 0x01,
    Metric = 0x10,
}

impl From<UnitSystem> for u8 {
    fn from(units: UnitSystem) -> Self {
        units as u8
    }
}

/// One decoded observation: a timestamp, a unit tag and named values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "dateTime")]
    pub date_time: i64,
    #[serde(rename = "usUnits")]
    pub us_units: UnitSystem,
    #[serde(flatten)]
    values: BTreeMap<String, f64>,
}

impl Record {
    pub fn new(date_time: i64, us_units: UnitSystem) -> Self {
        Self {
            date_time,
            us_units,
            values: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Insert a derived value; `None` leaves the field absent.
    pub fn insert_opt(&mut self, name: impl Into<String>, value: Option<f64>) {
        if let Some(value) = value {
            self.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "dateTime={} usUnits={:?}", self.date_time, self.us_units)?;
        for (name, value) in self.fields() {
            write!(f, " {}={:.2}", name, value)?;
        }
        Ok(())
    }
}
