//! Field extractors for xgscore.io match pages.
//!
//! Every extractor tolerates missing markup field by field: a value that is
//! not on the page stays `None`. Nothing here returns an error to the caller.

use crate::error::ScrapeError;
use crate::models::{Preview, ScorePrediction, XgStatistics};
use crate::scrapers::dom::{ElementQuery, Node, Snapshot};
use crate::scrapers::traits::PageDriver;
use crate::scrapers::{SCORE_PREDICTION_BLOCK, SCORE_PREDICTION_MARKS};
use std::time::Duration;
use tracing::{debug, info, warn};

const STAT_ROWS: &str = "div.xgs-game-statistics-details-row";
const PRIMARY_VALUE: &str = "strong.text-primary";
const SECONDARY_VALUE: &str = "strong.text-secondary";

const HOME_HEADER: &str = "div.mx-4.mx-lg-3.mx-xs-1.text-md-center.my-md-1:not(.text-right)";
const AWAY_HEADER: &str = "div.mx-4.mx-lg-3.mx-xs-1.text-right.text-md-center.my-md-1";
const TEAM_NAME: &str = "strong.xgs-game-header_team-name";

const FORECAST_HEADERS: &str = "div.xgs-category-forecast-card_header";
const FORECAST_COLUMNS: &str = "div.col-3.col-lg-6.m-xs-0.p-xs-0.ng-star-inserted";
const CARD_LABEL: &str = "p.bold-text.text-medium.text-sm-small";
const CARD_MARK: &str = "span.text-medium.text-sm-tiny";

const KEY_STAT_BLOCKS: &str = "div.mb-6";
const PREDICTABILITY_BLOCK: &str = "div.mb-3.ng-star-inserted";
const RECENT_GOALS: &str = "xgs-recent-goals-bar-group.ng-star-inserted";
const RECENT_SCORED: &str = "div.mb-6";
const RECENT_CONCEDED: &str = "div.mb-3";
const STAT_VALUES: &str = "span.text-sm-small.ng-star-inserted";

/// Goals and expected goals from the statistics tab
pub fn extract_xg_statistics(snapshot: &Snapshot) -> XgStatistics {
    match try_xg_statistics(snapshot) {
        Ok(stats) => {
            info!(?stats, "xG statistics collected");
            stats
        }
        Err(e) => {
            warn!("Could not read xG statistics: {e}");
            XgStatistics::default()
        }
    }
}

fn try_xg_statistics(snapshot: &Snapshot) -> Result<XgStatistics, ScrapeError> {
    let rows = snapshot.find_all(STAT_ROWS)?;
    if rows.len() < 2 {
        warn!("Expected at least 2 statistics rows, found {}", rows.len());
        return Ok(XgStatistics::default());
    }

    let (goals, xg) = (rows[0], rows[1]);
    Ok(XgStatistics {
        goals_home: goals.text_of(PRIMARY_VALUE)?,
        goals_away: goals.text_of(SECONDARY_VALUE)?,
        expected_goals_home: xg.text_of(PRIMARY_VALUE)?,
        expected_goals_away: xg.text_of(SECONDARY_VALUE)?,
    })
}

/// Teams, forecast cards and key stats from the preview tab.
///
/// Returns an empty preview only when the page cannot be queried at all.
pub fn extract_preview(snapshot: &Snapshot) -> Preview {
    match try_preview(snapshot) {
        Ok(preview) => {
            info!(?preview, "Preview collected");
            preview
        }
        Err(e) => {
            warn!("Preview extraction failed, dropping preview data: {e}");
            Preview::default()
        }
    }
}

fn try_preview(snapshot: &Snapshot) -> Result<Preview, ScrapeError> {
    let mut preview = Preview {
        team_home: team_name(snapshot, HOME_HEADER)?,
        team_away: team_name(snapshot, AWAY_HEADER)?,
        ..Default::default()
    };

    let headers = snapshot.find_all(FORECAST_HEADERS)?;
    preview.winner = forecast_card(headers.first())?;
    preview.total_goals = forecast_card(headers.get(1))?;

    let columns = snapshot.find_all(FORECAST_COLUMNS)?;
    preview.both_to_score = forecast_card(columns.first())?;
    preview.correct_score = forecast_card(columns.get(1))?;

    let blocks = snapshot.find_all(KEY_STAT_BLOCKS)?;
    debug!("Found {} key stat blocks", blocks.len());
    if let Some((home, away)) = value_pair(blocks.first())? {
        preview.team_rating_home = Some(home);
        preview.team_rating_away = Some(away);
    }
    if let Some((home, away)) = value_pair(blocks.get(1))? {
        preview.team_form_home = Some(home);
        preview.team_form_away = Some(away);
    }
    // Luckiness is the last block, but only once rating and form are both present.
    let luckiness = if blocks.len() > 2 { blocks.last() } else { None };
    if let Some((home, away)) = value_pair(luckiness)? {
        preview.xg_luckiness_home = Some(home);
        preview.xg_luckiness_away = Some(away);
    }

    if let Some((home, away)) = value_pair(snapshot.find(PREDICTABILITY_BLOCK)?.as_ref())? {
        preview.xg_predictability_home = Some(home);
        preview.xg_predictability_away = Some(away);
    }

    if let Some(recent) = snapshot.find(RECENT_GOALS)? {
        if let Some((home, away)) = value_pair(recent.find(RECENT_SCORED)?.as_ref())? {
            preview.avg_xg_scored_home = Some(home);
            preview.avg_xg_scored_away = Some(away);
        }
        if let Some((home, away)) = value_pair(recent.find(RECENT_CONCEDED)?.as_ref())? {
            preview.avg_xg_conceded_home = Some(home);
            preview.avg_xg_conceded_away = Some(away);
        }
    }

    Ok(preview)
}

fn team_name(snapshot: &Snapshot, header: &str) -> Result<Option<String>, ScrapeError> {
    match snapshot.find(header)? {
        Some(block) => block.text_of(TEAM_NAME),
        None => Ok(None),
    }
}

/// `"<label> (<mark>)"`; a missing label or mark leaves its part empty
fn forecast_card(card: Option<&Node<'_>>) -> Result<Option<String>, ScrapeError> {
    let Some(card) = card else {
        return Ok(None);
    };
    let label = card.text_of(CARD_LABEL)?.unwrap_or_default();
    let mark = card.text_of(CARD_MARK)?.unwrap_or_default();
    Ok(Some(format!("{label} ({mark})")))
}

/// First two stat values of a block, home then away
fn value_pair(block: Option<&Node<'_>>) -> Result<Option<(String, String)>, ScrapeError> {
    let Some(block) = block else {
        return Ok(None);
    };
    let mut values = block.find_all(STAT_VALUES)?.into_iter().map(|v| v.text());
    match (values.next(), values.next()) {
        (Some(home), Some(away)) => Ok(Some((home, away))),
        _ => Ok(None),
    }
}

/// Predicted score, waited for live because the widget renders after the tab switch
pub fn extract_score_prediction<D: PageDriver + ?Sized>(driver: &D, timeout: Duration) -> ScorePrediction {
    if let Err(e) = driver.wait_for(SCORE_PREDICTION_BLOCK, timeout) {
        warn!("Score prediction block did not appear: {e:#}");
        return ScorePrediction::default();
    }
    debug!("Score prediction block found");

    match driver.snapshot() {
        Ok(html) => score_prediction(&Snapshot::parse(&html)),
        Err(e) => {
            warn!("Could not read score prediction: {e:#}");
            ScorePrediction::default()
        }
    }
}

/// The two marks beneath the first score prediction block
pub fn score_prediction(snapshot: &Snapshot) -> ScorePrediction {
    match try_score_prediction(snapshot) {
        Ok(prediction) => prediction,
        Err(e) => {
            warn!("Could not read score prediction: {e}");
            ScorePrediction::default()
        }
    }
}

fn try_score_prediction(snapshot: &Snapshot) -> Result<ScorePrediction, ScrapeError> {
    let Some(block) = snapshot.find(SCORE_PREDICTION_BLOCK)? else {
        warn!("Score prediction block missing from snapshot");
        return Ok(ScorePrediction::default());
    };
    let marks = block.find_all(SCORE_PREDICTION_MARKS)?;
    debug!("Found {} score prediction marks", marks.len());

    match marks.as_slice() {
        [home, away, ..] => Ok(ScorePrediction {
            home: Some(home.text()),
            away: Some(away.text()),
        }),
        _ => {
            warn!("Not enough score prediction values");
            Ok(ScorePrediction::default())
        }
    }
}
