use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::driver::{PageDriver, SelectStrategy};
use crate::error::Result;
use crate::models::Section;

/// Moves the driven page between the board root and its section tabs.
pub struct SectionNavigator {
    landing_url: String,
    entry_link: Option<String>,
    call_timeout: Duration,
    board_settle: Duration,
    tab_settle: Duration,
}

impl SectionNavigator {
    pub fn new(config: &Config) -> Self {
        Self {
            landing_url: config.landing_url(),
            entry_link: config.entry_link.clone(),
            call_timeout: config.call_timeout(),
            board_settle: Duration::from_millis(config.board_settle_ms),
            tab_settle: Duration::from_millis(config.tab_settle_ms),
        }
    }

    /// Load the landing page and open the board through the top menu.
    ///
    /// A failed load is returned to the caller; a missing menu entry is not,
    /// the page may already show the board.
    pub async fn open_board(&self, driver: &mut dyn PageDriver) -> Result<()> {
        driver.navigate(&self.landing_url, self.call_timeout).await?;

        if let Some(entry) = &self.entry_link {
            match driver.select_by_strategy(SelectStrategy::LinkText, entry).await {
                Ok(true) => debug!("Opened board through '{}'", entry),
                Ok(false) => debug!("No '{}' menu entry, staying on landing page", entry),
                Err(e) => debug!("Menu entry '{}' failed: {}", entry, e),
            }
        }

        tokio::time::sleep(self.board_settle).await;
        Ok(())
    }

    /// Switch to the section's tab, trying each strategy of the chain in turn.
    pub async fn select(&self, driver: &mut dyn PageDriver, section: &Section) -> bool {
        for kind in SelectStrategy::CHAIN {
            match driver.select_by_strategy(kind, &section.selector).await {
                Ok(true) => {
                    debug!("[{}] selected '{}' via {:?}", section.key, section.selector, kind);
                    tokio::time::sleep(self.tab_settle).await;
                    return true;
                }
                Ok(false) => debug!("[{}] {:?} found nothing", section.key, kind),
                Err(e) => debug!("[{}] {:?} failed: {}", section.key, kind, e),
            }
        }

        info!("[{}] Cannot select tab '{}', skipping", section.key, section.selector);
        false
    }

    /// Return to the board after visiting an article.
    ///
    /// Later sections would otherwise be read off the article page, so a
    /// failed reload is returned like the first load.
    pub async fn return_to_board(&self, driver: &mut dyn PageDriver) -> Result<()> {
        self.open_board(driver).await.map_err(|e| {
            warn!("Could not return to the board: {}", e);
            e
        })
    }
}
