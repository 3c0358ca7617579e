//! Fixture records as returned by the `/fixtures` endpoint

use serde::{Deserialize, Serialize};

use super::league::LeagueInfo;
use super::team::{TeamInfo, Venue};

/// A single match with its teams, goals and score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub fixture: Option<FixtureInfo>,
    #[serde(default)]
    pub league: Option<LeagueInfo>,
    #[serde(default)]
    pub teams: Option<Teams>,
    #[serde(default)]
    pub goals: Option<Goals>,
    #[serde(default)]
    pub score: Option<Score>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureInfo {
    pub id: i64,
    #[serde(default)]
    pub referee: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    /// Kick-off in ISO 8601, as sent by the API
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub venue: Option<Venue>,
    #[serde(default)]
    pub status: Option<Status>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub long: Option<String>,
    /// Short code such as "NS", "1H", "FT"
    #[serde(default)]
    pub short: Option<String>,
    #[serde(default)]
    pub elapsed: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teams {
    #[serde(default)]
    pub home: Option<TeamInfo>,
    #[serde(default)]
    pub away: Option<TeamInfo>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goals {
    #[serde(default)]
    pub home: Option<u32>,
    #[serde(default)]
    pub away: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    #[serde(default)]
    pub halftime: Option<ScoreDetail>,
    #[serde(default)]
    pub fulltime: Option<ScoreDetail>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDetail {
    #[serde(default)]
    pub home: Option<u32>,
    #[serde(default)]
    pub away: Option<u32>,
}

impl Fixture {
    /// A one-line summary such as `2024-08-16  Man United 1-0 Fulham  [FT]`
    pub fn summary(&self) -> String {
        let info = self.fixture.as_ref();
        let date = info
            .and_then(|f| f.date.as_deref())
            .and_then(|d| d.get(..10))
            .unwrap_or("????-??-??");
        let team_name = |side: Option<&TeamInfo>| {
            side.map(|t| t.name.clone())
                .unwrap_or_else(|| "TBD".to_string())
        };
        let teams = self.teams.as_ref();
        let home = team_name(teams.and_then(|t| t.home.as_ref()));
        let away = team_name(teams.and_then(|t| t.away.as_ref()));

        let score = match self.goals {
            Some(Goals {
                home: Some(h),
                away: Some(a),
            }) => format!("{}-{}", h, a),
            _ => "vs".to_string(),
        };

        let mut line = format!("{}  {} {} {}", date, home, score, away);
        if let Some(short) = info.and_then(|f| f.status.as_ref()).and_then(|s| s.short.as_deref()) {
            line.push_str(&format!("  [{}]", short));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_JSON: &str = r#"{
        "fixture": {
            "id": 1208021, "referee": "R. Jones", "timezone": "UTC",
            "date": "2024-08-16T19:00:00+00:00", "timestamp": 1723834800,
            "venue": {"id": 556, "name": "Old Trafford", "city": "Manchester"},
            "status": {"long": "Match Finished", "short": "FT", "elapsed": 90}
        },
        "league": {"id": 39, "name": "Premier League", "logo": null},
        "teams": {
            "home": {"id": 33, "name": "Manchester United", "logo": null, "winner": true},
            "away": {"id": 36, "name": "Fulham", "logo": null, "winner": false}
        },
        "goals": {"home": 1, "away": 0},
        "score": {
            "halftime": {"home": 0, "away": 0},
            "fulltime": {"home": 1, "away": 0},
            "extratime": {"home": null, "away": null},
            "penalty": {"home": null, "away": null}
        }
    }"#;

    #[test]
    fn test_parse_fixture_record() {
        let fixture: Fixture = serde_json::from_str(FIXTURE_JSON).expect("Failed to parse fixture");

        let info = fixture.fixture.as_ref().unwrap();
        assert_eq!(info.id, 1208021);
        assert_eq!(info.status.as_ref().unwrap().elapsed, Some(90));
        assert_eq!(
            fixture.score.as_ref().unwrap().fulltime,
            Some(ScoreDetail {
                home: Some(1),
                away: Some(0)
            })
        );
    }

    #[test]
    fn test_summary_finished_match() {
        let fixture: Fixture = serde_json::from_str(FIXTURE_JSON).unwrap();
        assert_eq!(
            fixture.summary(),
            "2024-08-16  Manchester United 1-0 Fulham  [FT]"
        );
    }

    #[test]
    fn test_summary_unplayed_match_without_teams() {
        let fixture: Fixture =
            serde_json::from_str(r#"{"fixture": {"id": 7}, "goals": {"home": null, "away": null}}"#)
                .unwrap();
        assert_eq!(fixture.summary(), "????-??-??  TBD vs TBD");
    }
}
