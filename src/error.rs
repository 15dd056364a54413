use std::fmt;
use thiserror::Error;

/// Which step of the traversal a navigation failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationStage {
    League,
    Gameweek,
    Fixtures,
    Match,
}

impl fmt::Display for NavigationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NavigationStage::League => "league",
            NavigationStage::Gameweek => "gameweek",
            NavigationStage::Fixtures => "fixtures",
            NavigationStage::Match => "match",
        };
        f.write_str(name)
    }
}

/// Failures raised by the scraping pipeline.
///
/// The orchestrator decides how far each one propagates: session and
/// league-stage failures end the current task, every other navigation failure
/// ends only the gameweek or match it happened in.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to start browser session: {0}")]
    Session(String),

    #[error("navigation failed at {stage} stage (league '{league}', gameweek {gameweek:?}): {reason}")]
    Navigation {
        stage: NavigationStage,
        league: String,
        gameweek: Option<u32>,
        reason: String,
    },

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("preview tab unavailable: {0}")]
    TabSwitch(String),

    #[error("failed to persist record for league '{league}': {reason}")]
    Sink { league: String, reason: String },
}

impl ScrapeError {
    pub fn navigation(
        stage: NavigationStage,
        league: &str,
        gameweek: Option<u32>,
        reason: impl Into<String>,
    ) -> Self {
        ScrapeError::Navigation {
            stage,
            league: league.to_string(),
            gameweek,
            reason: reason.into(),
        }
    }

    /// True when the failure means no further gameweek of the league can be reached
    pub fn is_league_fatal(&self) -> bool {
        matches!(
            self,
            ScrapeError::Session(_)
                | ScrapeError::Navigation {
                    stage: NavigationStage::League,
                    ..
                }
        )
    }

    pub fn stage(&self) -> Option<NavigationStage> {
        match self {
            ScrapeError::Navigation { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn league_stage_is_fatal_for_the_league() {
        let err = ScrapeError::navigation(NavigationStage::League, "La Liga", Some(5), "not listed");
        assert!(err.is_league_fatal());
        assert_eq!(err.stage(), Some(NavigationStage::League));
    }

    #[test]
    fn gameweek_stage_only_ends_the_gameweek() {
        let err = ScrapeError::navigation(NavigationStage::Gameweek, "La Liga", Some(9), "no option");
        assert!(!err.is_league_fatal());
        assert!(err.to_string().contains("gameweek stage"));
    }
}
