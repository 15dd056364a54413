//! Browser-driven traversal and extraction for xgscore.io

pub mod browser;
pub mod dom;
pub mod navigation;
pub mod pacing;
pub mod traits;
pub mod user_agent;
pub mod xgscore;

#[cfg(test)]
pub mod fake;

pub use browser::ChromeSessions;
pub use navigation::Navigator;
pub use pacing::Pacer;

/// Statistics landing page; every traversal starts here
pub const LANDING_URL: &str = "https://xgscore.io/xg-statistics/";

/// League entries of the sidebar navigation
pub const LEAGUE_LINKS: &str = "li.xgs-sidebar-nav_item a";

/// Trigger that opens the gameweek dropdown
pub const GAMEWEEK_TOGGLE: &str = "#mat-select-value-5 > span > span";

/// Options of the opened gameweek dropdown
pub const GAMEWEEK_OPTIONS: &str = ".mat-option";

/// Fixture blocks of the selected gameweek
pub const FIXTURE_BLOCKS: &str = "xgs-xg-game-fixture.xgs-panel.ng-star-inserted";

/// Tab link leading to the preview view of a match
pub const PREVIEW_TAB: &str = ".xgs-tab_link[href*='/preview']";

/// Container of the predicted final score
pub const SCORE_PREDICTION_BLOCK: &str = "[id*='xgs-game-result']";

/// Predicted score values, relative to one [`SCORE_PREDICTION_BLOCK`]
pub const SCORE_PREDICTION_MARKS: &str = "mark.xgs-mark.-huge strong";
