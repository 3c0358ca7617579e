//! Team records as returned by the `/teams` endpoint

use serde::{Deserialize, Serialize};

/// A team and its home venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub team: Option<TeamInfo>,
    #[serde(default)]
    pub venue: Option<Venue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub founded: Option<i32>,
    #[serde(default)]
    pub national: Option<bool>,
    #[serde(default)]
    pub logo: Option<String>,
}

/// A stadium; every field may be missing in upstream data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub surface: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Team {
    /// A one-line summary such as `42  Arsenal [ARS] - Emirates Stadium`
    pub fn summary(&self) -> String {
        let mut line = match &self.team {
            Some(info) => format!("{:>5}  {}", info.id, info.name),
            None => format!("{:>5}  Unknown team", "?"),
        };
        if let Some(code) = self.team.as_ref().and_then(|t| t.code.as_deref()) {
            line.push_str(&format!(" [{}]", code));
        }
        if let Some(venue) = self.venue.as_ref().and_then(|v| v.name.as_deref()) {
            line.push_str(&format!(" - {}", venue));
        }
        line
    }
}
