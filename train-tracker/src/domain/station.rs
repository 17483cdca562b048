//! Station code and catalogue entry types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when parsing an invalid CRS code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid CRS code: {reason}")]
pub struct InvalidCrs {
    reason: &'static str,
}

/// A valid 3-letter CRS (Computer Reservation System) station code.
///
/// CRS codes are always 3 uppercase ASCII letters. This type guarantees
/// that any `Crs` value is valid by construction.
///
/// # Examples
///
/// ```
/// use train_tracker::domain::Crs;
///
/// let kgx = Crs::parse("KGX").unwrap();
/// assert_eq!(kgx.as_str(), "KGX");
///
/// // Lowercase is rejected by the strict parser...
/// assert!(Crs::parse("kgx").is_err());
/// // ...but accepted when normalizing user input.
/// assert_eq!(Crs::parse_normalized(" kgx ").unwrap(), kgx);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Crs([u8; 3]);

impl Crs {
    /// Parse a CRS code from a string.
    ///
    /// The input must be exactly 3 uppercase ASCII letters (A-Z).
    pub fn parse(s: &str) -> Result<Self, InvalidCrs> {
        let bytes = s.as_bytes();

        if bytes.len() != 3 {
            return Err(InvalidCrs {
                reason: "must be exactly 3 characters",
            });
        }

        for &b in bytes {
            if !b.is_ascii_uppercase() {
                return Err(InvalidCrs {
                    reason: "must be uppercase ASCII letters A-Z",
                });
            }
        }

        Ok(Crs([bytes[0], bytes[1], bytes[2]]))
    }

    /// Parse user input: trims whitespace and upper-cases before validating.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidCrs> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the CRS code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII uppercase letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Debug for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Crs({})", self.as_str())
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Crs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Crs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Crs::parse_normalized(&s).map_err(serde::de::Error::custom)
    }
}

/// A station from the bundled catalogue.
///
/// Field names follow the bundled `uk_stations.json` resource; the shorter
/// `name`/`code` spellings are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "stationName", alias = "name")]
    pub name: String,

    #[serde(rename = "crsCode", alias = "code")]
    pub code: Crs,

    #[serde(default)]
    pub lat: Option<f64>,

    #[serde(default, alias = "lon", alias = "lng")]
    pub long: Option<f64>,
}

impl Station {
    /// Create a station without coordinates.
    pub fn new(name: impl Into<String>, code: Crs) -> Self {
        Self {
            name: name.into(),
            code,
            lat: None,
            long: None,
        }
    }

    /// Attach coordinates.
    pub fn with_location(mut self, lat: f64, long: f64) -> Self {
        self.lat = Some(lat);
        self.long = Some(long);
        self
    }

    /// Both coordinates, if the catalogue has them.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.long?))
    }

    /// Display form used by station pickers, e.g. "London Kings Cross (KGX)".
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }
}

/// A station the user has starred. Unique by `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteStation {
    pub code: Crs,
    pub name: String,
}

impl FavoriteStation {
    pub fn new(code: Crs, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }
}

impl From<&Station> for FavoriteStation {
    fn from(station: &Station) -> Self {
        Self::new(station.code, station.name.clone())
    }
}
