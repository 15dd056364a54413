//! League → gameweek → fixtures → match traversal.

use crate::error::{NavigationStage, ScrapeError};
use crate::models::{MatchLink, NavigationTarget};
use crate::scrapers::dom::{ElementQuery, Snapshot};
use crate::scrapers::pacing::Pacer;
use crate::scrapers::traits::PageDriver;
use crate::scrapers::{FIXTURE_BLOCKS, GAMEWEEK_OPTIONS, GAMEWEEK_TOGGLE, LEAGUE_LINKS, PREVIEW_TAB};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Outcome of trying to open the preview tab of a match
#[derive(Debug)]
pub enum TabSwitch {
    Switched,
    Unavailable(ScrapeError),
}

/// Index of the first league entry containing `league`, ignoring case
pub fn find_league(entries: &[String], league: &str) -> Option<usize> {
    let wanted = league.trim().to_lowercase();
    entries.iter().position(|entry| entry.to_lowercase().contains(&wanted))
}

/// Index of the first option reading `"<gameweek> Gameweek"`.
///
/// The number must not be the tail of a longer number, so 5 never selects
/// "15 Gameweek".
pub fn find_gameweek(options: &[String], gameweek: u32) -> Option<usize> {
    let pattern = format!("{gameweek} Gameweek");
    options.iter().position(|option| {
        option.match_indices(&pattern).any(|(at, _)| {
            !option[..at]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_digit())
        })
    })
}

/// Drives one browser session through the site's menus
pub struct Navigator {
    landing_url: Url,
    wait_timeout: Duration,
    pacer: Pacer,
}

impl Navigator {
    pub fn new(landing_url: &str, wait_timeout: Duration, pacer: Pacer) -> Result<Self, url::ParseError> {
        Ok(Self {
            landing_url: Url::parse(landing_url)?,
            wait_timeout,
            pacer,
        })
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    /// Open the landing page and select the target's league and gameweek.
    ///
    /// League failures are reported with [`NavigationStage::League`], gameweek
    /// failures with [`NavigationStage::Gameweek`].
    pub fn reach<D: PageDriver + ?Sized>(&self, driver: &D, target: &NavigationTarget) -> Result<(), ScrapeError> {
        driver.goto(self.landing_url.as_str()).map_err(|e| {
            ScrapeError::navigation(
                NavigationStage::League,
                &target.league,
                Some(target.gameweek),
                format!("landing page did not load: {e:#}"),
            )
        })?;
        info!("Opened statistics landing page");

        self.select_league(driver, target)?;
        self.select_gameweek(driver, target)
    }

    fn select_league<D: PageDriver + ?Sized>(&self, driver: &D, target: &NavigationTarget) -> Result<(), ScrapeError> {
        let fail = |reason: String| {
            ScrapeError::navigation(NavigationStage::League, &target.league, Some(target.gameweek), reason)
        };

        self.pacer.pause();
        driver
            .wait_for(LEAGUE_LINKS, self.wait_timeout)
            .map_err(|e| fail(format!("league list did not render: {e:#}")))?;

        let entries = driver
            .texts(LEAGUE_LINKS)
            .map_err(|e| fail(format!("league list unreadable: {e:#}")))?;
        let index = find_league(&entries, &target.league)
            .ok_or_else(|| fail(format!("no entry among {} leagues matches", entries.len())))?;

        self.pacer.pause();
        driver
            .click(LEAGUE_LINKS, index)
            .map_err(|e| fail(format!("could not select '{}': {e:#}", entries[index])))?;
        info!(league = %target.league, entry = %entries[index].trim(), "League selected");
        Ok(())
    }

    fn select_gameweek<D: PageDriver + ?Sized>(&self, driver: &D, target: &NavigationTarget) -> Result<(), ScrapeError> {
        let fail = |reason: String| {
            ScrapeError::navigation(NavigationStage::Gameweek, &target.league, Some(target.gameweek), reason)
        };

        self.pacer.pause();
        driver
            .wait_for(GAMEWEEK_TOGGLE, self.wait_timeout)
            .and_then(|_| driver.click(GAMEWEEK_TOGGLE, 0))
            .map_err(|e| fail(format!("gameweek selector did not open: {e:#}")))?;
        debug!("Gameweek list opened");

        self.pacer.pause();
        driver
            .wait_for(GAMEWEEK_OPTIONS, self.wait_timeout)
            .map_err(|e| fail(format!("gameweek options did not render: {e:#}")))?;
        let options = driver
            .texts(GAMEWEEK_OPTIONS)
            .map_err(|e| fail(format!("gameweek options unreadable: {e:#}")))?;
        debug!(?options, "Gameweek options");

        let index = find_gameweek(&options, target.gameweek)
            .ok_or_else(|| fail(format!("no option among {} reads '{} Gameweek'", options.len(), target.gameweek)))?;

        self.pacer.pause();
        driver
            .click(GAMEWEEK_OPTIONS, index)
            .map_err(|e| fail(format!("could not select option #{index}: {e:#}")))?;
        info!(league = %target.league, gameweek = target.gameweek, "Gameweek selected");
        Ok(())
    }

    /// Absolute links of the fixtures listed for the selected gameweek, in display order
    pub fn enumerate_matches<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        target: &NavigationTarget,
    ) -> Result<Vec<MatchLink>, ScrapeError> {
        let fail = |reason: String| {
            ScrapeError::navigation(NavigationStage::Fixtures, &target.league, Some(target.gameweek), reason)
        };

        self.pacer.pause();
        let html = driver
            .snapshot()
            .map_err(|e| fail(format!("could not capture fixture list: {e:#}")))?;
        let snapshot = Snapshot::parse(&html);

        let mut links = Vec::new();
        for block in (&snapshot).find_all(FIXTURE_BLOCKS)? {
            let Some(href) = block.find("a")?.and_then(|a| a.attr("href")) else {
                debug!("Fixture block without a link");
                continue;
            };
            match self.landing_url.join(href) {
                Ok(url) => links.push(MatchLink(url.to_string())),
                Err(e) => warn!("Skipping unparsable fixture link '{href}': {e}"),
            }
        }

        info!(league = %target.league, gameweek = target.gameweek, "Found {} matches", links.len());
        Ok(links)
    }

    /// Load a match page; the statistics tab is its default view
    pub fn open_match<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        target: &NavigationTarget,
        link: &MatchLink,
    ) -> Result<(), ScrapeError> {
        driver.goto(link.as_str()).map_err(|e| {
            ScrapeError::navigation(
                NavigationStage::Match,
                &target.league,
                Some(target.gameweek),
                format!("match page {link} did not load: {e:#}"),
            )
        })?;
        self.pacer.pause();
        Ok(())
    }

    /// Try to activate the preview tab of the open match
    pub fn switch_to_preview<D: PageDriver + ?Sized>(&self, driver: &D) -> TabSwitch {
        if let Err(e) = driver.wait_for(PREVIEW_TAB, self.wait_timeout) {
            return TabSwitch::Unavailable(ScrapeError::TabSwitch(format!("{e:#}")));
        }

        self.pacer.pause();
        if let Err(e) = driver.click(PREVIEW_TAB, 0) {
            return TabSwitch::Unavailable(ScrapeError::TabSwitch(format!("{e:#}")));
        }
        info!("Switched to preview tab");

        self.pacer.pause();
        TabSwitch::Switched
    }
}
