//! Scripted stand-in for a browser tab, modelling just enough of the site to
//! drive navigation and orchestration tests.

use crate::error::ScrapeError;
use crate::scrapers::traits::{PageDriver, SessionManager};
use crate::scrapers::dom::{ElementQuery, Snapshot};
use crate::scrapers::{GAMEWEEK_OPTIONS, GAMEWEEK_TOGGLE, LANDING_URL, LEAGUE_LINKS, PREVIEW_TAB};
use anyhow::{anyhow, bail, Result};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct FakeMatch {
    pub stats: String,
    pub preview: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct State {
    url: String,
    selected_league: Option<String>,
    selected_gameweek: Option<String>,
    menu_open: bool,
    preview_active: bool,
    visited: Vec<String>,
    clicks: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeDriver {
    leagues: Vec<String>,
    gameweeks: Vec<String>,
    fixtures: HashMap<String, String>,
    matches: HashMap<String, FakeMatch>,
    failing: Vec<String>,
    unreadable_stats: Vec<String>,
    state: RefCell<State>,
}

/// Landing page markup listing the given match hrefs
pub fn fixture_list(hrefs: &[&str]) -> String {
    let blocks: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<xgs-xg-game-fixture class="xgs-panel ng-star-inserted"><div><a href="{href}">match</a></div></xgs-xg-game-fixture>"#
            )
        })
        .collect();
    format!("<html><body><main>{blocks}</main></body></html>")
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl FakeDriver {
    pub fn with_leagues(mut self, leagues: &[&str]) -> Self {
        self.leagues = owned(leagues);
        self
    }

    pub fn with_gameweeks(mut self, options: &[&str]) -> Self {
        self.gameweeks = owned(options);
        self
    }

    /// Landing page shown once the gameweek option `option` is selected
    pub fn with_fixtures(mut self, option: &str, html: String) -> Self {
        self.fixtures.insert(option.to_string(), html);
        self
    }

    pub fn with_match(mut self, url: &str, page: FakeMatch) -> Self {
        self.matches.insert(url.to_string(), page);
        self
    }

    /// Capturing the statistics tab of `url` fails; its preview stays readable
    pub fn with_unreadable_stats(mut self, url: &str) -> Self {
        self.unreadable_stats.push(url.to_string());
        self
    }

    /// Navigating to `url` fails
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.push(url.to_string());
        self
    }

    pub fn visited(&self) -> Vec<String> {
        self.state.borrow().visited.clone()
    }

    pub fn clicks(&self) -> Vec<(String, usize)> {
        self.state.borrow().clicks.clone()
    }

    fn on_landing(&self) -> bool {
        self.state.borrow().url == LANDING_URL
    }

    fn current_match(&self) -> Option<&FakeMatch> {
        self.matches.get(&self.state.borrow().url)
    }
}

impl PageDriver for FakeDriver {
    fn goto(&self, url: &str) -> Result<()> {
        if self.failing.iter().any(|u| u == url) {
            bail!("net::ERR_CONNECTION_RESET at {url}");
        }
        let mut state = self.state.borrow_mut();
        state.url = url.to_string();
        state.visited.push(url.to_string());
        state.menu_open = false;
        state.preview_active = false;
        if url == LANDING_URL {
            state.selected_league = None;
            state.selected_gameweek = None;
        }
        Ok(())
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        if self.texts(selector)?.is_empty() {
            bail!("timed out after {timeout:?} waiting for '{selector}'");
        }
        Ok(())
    }

    fn texts(&self, selector: &str) -> Result<Vec<String>> {
        let state = self.state.borrow();
        let texts = match selector {
            LEAGUE_LINKS if self.on_landing() => self.leagues.clone(),
            GAMEWEEK_TOGGLE if self.on_landing() && state.selected_league.is_some() => {
                vec!["Gameweek".to_string()]
            }
            GAMEWEEK_OPTIONS if state.menu_open => self.gameweeks.clone(),
            PREVIEW_TAB => match self.current_match() {
                Some(page) if page.preview.is_some() => vec!["Preview".to_string()],
                _ => Vec::new(),
            },
            _ => {
                let snapshot = Snapshot::parse(&self.snapshot()?);
                return Ok((&snapshot)
                    .find_all(selector)?
                    .into_iter()
                    .map(|node| node.text())
                    .collect());
            }
        };
        Ok(texts)
    }

    fn click(&self, selector: &str, index: usize) -> Result<()> {
        let texts = self.texts(selector)?;
        let text = texts
            .get(index)
            .cloned()
            .ok_or_else(|| anyhow!("'{selector}' has no element #{index}"))?;

        let mut state = self.state.borrow_mut();
        state.clicks.push((selector.to_string(), index));
        match selector {
            LEAGUE_LINKS => state.selected_league = Some(text),
            GAMEWEEK_TOGGLE => state.menu_open = true,
            GAMEWEEK_OPTIONS => {
                state.selected_gameweek = Some(text);
                state.menu_open = false;
            }
            PREVIEW_TAB => state.preview_active = true,
            _ => bail!("unexpected click on '{selector}'"),
        }
        Ok(())
    }

    fn snapshot(&self) -> Result<String> {
        if let Some(page) = self.current_match() {
            let state = self.state.borrow();
            if !state.preview_active && self.unreadable_stats.contains(&state.url) {
                bail!("DOM.getDocument failed on {}", state.url);
            }
            return Ok(match (&page.preview, state.preview_active) {
                (Some(preview), true) => preview.clone(),
                _ => page.stats.clone(),
            });
        }
        let state = self.state.borrow();
        let html = state
            .selected_gameweek
            .as_ref()
            .and_then(|gw| self.fixtures.get(gw).cloned())
            .unwrap_or_else(|| "<html><body></body></html>".to_string());
        Ok(html)
    }
}

/// Hands out fresh copies of a scripted driver and counts releases
#[derive(Default)]
pub struct FakeSessions {
    pub site: FakeDriver,
    pub fail_launch: bool,
    pub acquired: Cell<usize>,
    pub released: Cell<usize>,
    pub history: RefCell<Vec<String>>,
}

impl FakeSessions {
    pub fn new(site: FakeDriver) -> Self {
        Self {
            site,
            ..Default::default()
        }
    }
}

impl SessionManager for FakeSessions {
    type Session = FakeDriver;

    fn acquire(&self) -> Result<FakeDriver, ScrapeError> {
        if self.fail_launch {
            return Err(ScrapeError::Session("chrome binary not found".to_string()));
        }
        self.acquired.set(self.acquired.get() + 1);
        Ok(self.site.clone())
    }

    fn release(&self, session: FakeDriver) {
        self.released.set(self.released.get() + 1);
        self.history.borrow_mut().extend(session.visited());
    }
}
