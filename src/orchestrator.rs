//! Sequences league × gameweek × match work and contains failures at each level.

use crate::error::ScrapeError;
use crate::models::{MatchLink, MatchRecord, NavigationTarget, Preview, ScorePrediction, Task, XgStatistics};
use crate::scrapers::dom::Snapshot;
use crate::scrapers::navigation::{Navigator, TabSwitch};
use crate::scrapers::traits::{PageDriver, RecordSink, SessionManager};
use crate::scrapers::xgscore;
use anyhow::Result;
use chrono::Utc;
use tracing::{error, info, warn};

/// Counters for one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub tasks: usize,
    pub tasks_failed: usize,
    pub gameweeks_reached: usize,
    pub gameweeks_failed: usize,
    pub matches_saved: usize,
    pub matches_failed: usize,
}

pub struct Orchestrator<'a, M: SessionManager, S: RecordSink> {
    sessions: &'a M,
    navigator: Navigator,
    sink: &'a mut S,
    report: RunReport,
}

impl<'a, M: SessionManager, S: RecordSink> Orchestrator<'a, M, S> {
    pub fn new(sessions: &'a M, navigator: Navigator, sink: &'a mut S) -> Self {
        Self {
            sessions,
            navigator,
            sink,
            report: RunReport::default(),
        }
    }

    /// Process every task in order. Failures never end the run early.
    pub fn run(mut self, tasks: &[Task]) -> RunReport {
        for task in tasks {
            self.report.tasks += 1;
            match self.run_task(task) {
                Ok(()) => info!(league = %task.league, "Finished league"),
                Err(e) => {
                    self.report.tasks_failed += 1;
                    error!(league = %task.league, "League run aborted: {e}");
                }
            }
        }
        info!(report = ?self.report, "Run complete");
        self.report
    }

    /// All gameweeks of one task share a single browser session
    fn run_task(&mut self, task: &Task) -> Result<(), ScrapeError> {
        let targets = task.targets();
        if targets.is_empty() {
            warn!(league = %task.league, "No gameweeks listed, skipping league");
            return Ok(());
        }

        let sessions = self.sessions;
        let session = sessions.scoped()?;

        for (position, target) in targets.iter().enumerate() {
            info!(league = %target.league, gameweek = target.gameweek, "Starting gameweek");
            match self.run_target(&*session, target) {
                Ok(saved) => {
                    self.report.gameweeks_reached += 1;
                    info!(league = %target.league, gameweek = target.gameweek, saved, "Gameweek done");
                }
                Err(e) if e.is_league_fatal() => {
                    let skipped = targets.len() - position;
                    self.report.gameweeks_failed += skipped;
                    warn!(
                        league = %target.league,
                        gameweek = target.gameweek,
                        skipped,
                        "Stopped at league '{}', gameweek {}", target.league, target.gameweek
                    );
                    return Err(e);
                }
                Err(e) => {
                    self.report.gameweeks_failed += 1;
                    error!(league = %target.league, gameweek = target.gameweek, "Skipping gameweek: {e}");
                }
            }
        }
        Ok(())
    }

    fn run_target(&mut self, driver: &M::Session, target: &NavigationTarget) -> Result<usize, ScrapeError> {
        self.navigator.reach(driver, target)?;
        let links = self.navigator.enumerate_matches(driver, target)?;

        let total = links.len();
        let mut saved = 0;
        for (index, link) in links.iter().enumerate() {
            info!(league = %target.league, gameweek = target.gameweek, "Match {}/{}: {}", index + 1, total, link);
            match self.process_match(driver, target, link) {
                Ok(()) => {
                    saved += 1;
                    self.report.matches_saved += 1;
                }
                Err(e) => {
                    self.report.matches_failed += 1;
                    error!(
                        league = %target.league,
                        gameweek = target.gameweek,
                        match_index = index + 1,
                        link = %link,
                        "Skipping match {}/{}: {e:#}", index + 1, total
                    );
                }
            }
        }
        Ok(saved)
    }

    fn process_match(&mut self, driver: &M::Session, target: &NavigationTarget, link: &MatchLink) -> Result<()> {
        self.navigator.open_match(driver, target, link)?;

        let xg_statistics = match driver.snapshot() {
            Ok(html) => xgscore::extract_xg_statistics(&Snapshot::parse(&html)),
            Err(e) => {
                warn!(link = %link, "Failed to capture statistics tab: {e:#}");
                XgStatistics::default()
            }
        };

        let (preview, match_score_prediction) = match self.navigator.switch_to_preview(driver) {
            TabSwitch::Switched => self.collect_preview(driver),
            TabSwitch::Unavailable(e) => {
                warn!(link = %link, "{e}; keeping statistics only");
                (Preview::default(), ScorePrediction::default())
            }
        };

        let record = MatchRecord {
            league: target.league.clone(),
            gameweek: target.gameweek,
            link: link.clone(),
            preview,
            match_score_prediction,
            xg_statistics,
            scraped_at: Utc::now(),
        };

        self.sink
            .append(&target.league, &record)
            .map_err(|e| ScrapeError::Sink {
                league: target.league.clone(),
                reason: format!("{e:#}"),
            })?;
        info!(link = %link, "Match saved");
        Ok(())
    }

    fn collect_preview(&self, driver: &M::Session) -> (Preview, ScorePrediction) {
        let preview = match driver.snapshot() {
            Ok(html) => xgscore::extract_preview(&Snapshot::parse(&html)),
            Err(e) => {
                warn!("Failed to capture preview tab: {e:#}");
                Preview::default()
            }
        };
        let prediction = xgscore::extract_score_prediction(driver, self.navigator.wait_timeout());
        (preview, prediction)
    }
}
