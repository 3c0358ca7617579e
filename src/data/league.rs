//! League records as returned by the `/leagues` endpoint

use serde::{Deserialize, Serialize};

/// A league together with the country it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub league: Option<LeagueInfo>,
    pub country: Option<Country>,
}

/// Core league identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueInfo {
    pub id: i64,
    pub name: String,
    /// "League" or "Cup"
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub flag: Option<String>,
}

impl League {
    /// A one-line summary such as `39  Premier League (England)`
    pub fn summary(&self) -> String {
        let (id, name) = match &self.league {
            Some(info) => (info.id.to_string(), info.name.as_str()),
            None => ("?".to_string(), "Unknown league"),
        };
        match self.country.as_ref().and_then(|c| c.name.as_deref()) {
            Some(country) => format!("{:>5}  {} ({})", id, name, country),
            None => format!("{:>5}  {}", id, name),
        }
    }
}
