use crate::error::ScrapeError;
use crate::scrapers::traits::{PageDriver, SessionManager};
use crate::scrapers::user_agent;
use anyhow::{anyhow, Context, Result};
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::{OsStr, OsString};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Hides the automation flag that client-side bot checks look at
const MASK_WEBDRIVER: &str = r#"
    Object.defineProperty(navigator, 'webdriver', { get: () => false });
    try { delete Object.getPrototypeOf(navigator).webdriver; } catch (e) {}
"#;

/// Registers [`MASK_WEBDRIVER`] in the page's main world, ahead of every document's own scripts
fn mask_webdriver_on_new_documents() -> Page::AddScriptToEvaluateOnNewDocument {
    Page::AddScriptToEvaluateOnNewDocument {
        source: MASK_WEBDRIVER.to_string(),
        world_name: None,
        include_command_line_api: None,
        run_immediately: None,
    }
}

/// Launch parameters for headless Chrome
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub window_size: (u32, u32),
    pub idle_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1920, 1080),
            idle_timeout: Duration::from_secs(180),
        }
    }
}

/// Launches one Chrome process per acquired session
pub struct ChromeSessions {
    options: BrowserOptions,
}

impl ChromeSessions {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }
}

impl SessionManager for ChromeSessions {
    type Session = BrowserSession;

    fn acquire(&self) -> Result<BrowserSession, ScrapeError> {
        BrowserSession::launch(&self.options).map_err(|e| ScrapeError::Session(format!("{e:#}")))
    }

    fn release(&self, session: BrowserSession) {
        session.close();
    }
}

/// A live Chrome instance with a single working tab
pub struct BrowserSession {
    browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch Chrome with the automation fingerprints removed
    pub fn launch(options: &BrowserOptions) -> Result<Self> {
        info!("Launching headless Chrome...");

        let agent = user_agent::random();
        let agent_arg = OsString::from(format!("--user-agent={agent}"));
        let (width, height) = options.window_size;

        let launch = LaunchOptions::default_builder()
            .headless(options.headless)
            .window_size(Some((width, height)))
            .idle_browser_timeout(options.idle_timeout)
            .args(vec![
                OsStr::new("--disable-blink-features=AutomationControlled"),
                OsStr::new("--disable-extensions"),
                OsStr::new("--start-maximized"),
                agent_arg.as_os_str(),
            ])
            .ignore_default_args(vec![OsStr::new("--enable-automation")])
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(launch).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;

        tab.set_user_agent(agent, Some("en-US,en;q=0.9"), None)
            .context("Failed to override user agent")?;
        tab.call_method(mask_webdriver_on_new_documents())
            .context("Failed to register navigator.webdriver mask")?;
        tab.set_default_timeout(Duration::from_secs(30));

        debug!(user_agent = agent, width, height, "Browser session ready");
        Ok(Self { browser, tab })
    }

    /// Terminate the browser process
    pub fn close(self) {
        if let Err(e) = self.tab.close(true) {
            debug!("Tab close failed: {e:#}");
        }
        // Dropping the handle kills the Chrome process.
        drop(self.browser);
        info!("Browser closed");
    }
}

impl PageDriver for BrowserSession {
    fn goto(&self, url: &str) -> Result<()> {
        debug!("Navigating to {url}");
        self.tab
            .navigate_to(url)
            .with_context(|| format!("Failed to navigate to {url}"))?;
        self.tab
            .wait_until_navigated()
            .with_context(|| format!("Navigation to {url} did not settle"))?;
        Ok(())
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map(|_| ())
            .with_context(|| format!("Timed out after {timeout:?} waiting for '{selector}'"))
    }

    fn texts(&self, selector: &str) -> Result<Vec<String>> {
        let elements = match self.tab.find_elements(selector) {
            Ok(elements) => elements,
            Err(_) => return Ok(Vec::new()),
        };
        elements
            .iter()
            .map(|element| element.get_inner_text())
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Failed to read text of '{selector}'"))
    }

    fn click(&self, selector: &str, index: usize) -> Result<()> {
        let elements = self
            .tab
            .find_elements(selector)
            .with_context(|| format!("No element matches '{selector}'"))?;
        let element = elements
            .get(index)
            .ok_or_else(|| anyhow!("'{selector}' has {} element(s), wanted #{index}", elements.len()))?;
        element
            .scroll_into_view()
            .with_context(|| format!("Failed to scroll to '{selector}' #{index}"))?;
        element
            .click()
            .with_context(|| format!("Failed to click '{selector}' #{index}"))?;
        Ok(())
    }

    fn snapshot(&self) -> Result<String> {
        self.tab.get_content().context("Failed to read page HTML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webdriver_mask_targets_the_main_world() {
        let command = mask_webdriver_on_new_documents();
        assert_eq!(command.source, MASK_WEBDRIVER);
        assert!(command.source.contains("'webdriver'"));
        assert_eq!(command.world_name, None);
    }
}
