use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gameweek selection of a task: a single number or an ordered list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Gameweeks {
    One(u32),
    Many(Vec<u32>),
}

impl Gameweeks {
    /// Scalar selections are treated as a one-element list
    pub fn to_vec(&self) -> Vec<u32> {
        match self {
            Gameweeks::One(week) => vec![*week],
            Gameweeks::Many(weeks) => weeks.clone(),
        }
    }
}

/// One entry of the task file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub league: String,
    #[serde(rename = "gameweek", alias = "gameweeks")]
    pub gameweeks: Gameweeks,
}

impl Task {
    /// Expand the task into (league, gameweek) traversal units, in file order
    pub fn targets(&self) -> Vec<NavigationTarget> {
        self.gameweeks
            .to_vec()
            .into_iter()
            .map(|gameweek| NavigationTarget {
                league: self.league.clone(),
                gameweek,
            })
            .collect()
    }
}

/// One unit of traversal work
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationTarget {
    pub league: String,
    pub gameweek: u32,
}

/// Absolute URL of a match page, only meaningful inside the session that found it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MatchLink(pub String);

impl MatchLink {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MatchLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Data shown on the preview tab. Fields stay `None` when not displayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Preview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_home: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_away: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_goals: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub both_to_score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_rating_home: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_rating_away: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_form_home: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_form_away: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xg_luckiness_home: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xg_luckiness_away: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xg_predictability_home: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xg_predictability_away: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_xg_scored_home: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_xg_scored_away: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_xg_conceded_home: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_xg_conceded_away: Option<String>,
}

impl Preview {
    pub fn is_empty(&self) -> bool {
        *self == Preview::default()
    }
}

/// Predicted final score from the preview tab
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScorePrediction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away: Option<String>,
}

impl ScorePrediction {
    pub fn is_empty(&self) -> bool {
        self.home.is_none() && self.away.is_none()
    }
}

/// Goals and expected goals from the statistics tab
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct XgStatistics {
    pub goals_home: Option<String>,
    pub goals_away: Option<String>,
    pub expected_goals_home: Option<String>,
    pub expected_goals_away: Option<String>,
}

impl XgStatistics {
    pub fn is_empty(&self) -> bool {
        *self == XgStatistics::default()
    }
}

/// Everything collected for one visited match
#[derive(Debug, Clone, Serialize)]
pub struct MatchRecord {
    pub league: String,
    pub gameweek: u32,
    pub link: MatchLink,
    pub preview: Preview,
    pub match_score_prediction: ScorePrediction,
    pub xg_statistics: XgStatistics,
    pub scraped_at: DateTime<Utc>,
}

/// Column header of every league sheet
pub const SHEET_HEADER: [&str; 24] = [
    "Team (Home)",
    "Team (Away)",
    "Winner",
    "Over / Under",
    "Both To Score",
    "Correct Score",
    "Team Rating (Home)",
    "Team Rating (Away)",
    "Team Form (Home)",
    "Team Form (Away)",
    "xG Luckiness (Home)",
    "xG Luckiness (Away)",
    "xG Predictability (Home)",
    "xG Predictability (Away)",
    "Avg xG Scored (Home)",
    "Avg xG Scored (Away)",
    "Avg xG Conceded (Home)",
    "Avg xG Conceded (Away)",
    "Score Prediction (Home)",
    "Score Prediction (Away)",
    "Goals (Home)",
    "Goals (Away)",
    "Expected Goals (Home)",
    "Expected Goals (Away)",
];

impl MatchRecord {
    /// Cells in [`SHEET_HEADER`] order; missing values become empty cells
    pub fn sheet_row(&self) -> [&str; 24] {
        let p = &self.preview;
        let s = &self.match_score_prediction;
        let x = &self.xg_statistics;
        [
            &p.team_home,
            &p.team_away,
            &p.winner,
            &p.total_goals,
            &p.both_to_score,
            &p.correct_score,
            &p.team_rating_home,
            &p.team_rating_away,
            &p.team_form_home,
            &p.team_form_away,
            &p.xg_luckiness_home,
            &p.xg_luckiness_away,
            &p.xg_predictability_home,
            &p.xg_predictability_away,
            &p.avg_xg_scored_home,
            &p.avg_xg_scored_away,
            &p.avg_xg_conceded_home,
            &p.avg_xg_conceded_away,
            &s.home,
            &s.away,
            &x.goals_home,
            &x.goals_away,
            &x.expected_goals_home,
            &x.expected_goals_away,
        ]
        .map(|cell| cell.as_deref().unwrap_or(""))
    }
}
