use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::discord::{notify, Branding, NotificationSink};
use crate::driver::PageDriver;
use crate::error::Result;
use crate::locator::ArticleLocator;
use crate::models::{ArticleRef, ArticleUrl, NotificationEvent, Section};
use crate::navigator::SectionNavigator;
use crate::storage::{is_bootstrap, ObservedState, StateStore};
use crate::title::TitleResolver;

/// How a section ended up in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOutcome {
    /// No strategy could select the tab
    NotSelected,
    /// The tab showed no article link
    NoArticle,
    /// First run: baseline recorded, nothing sent
    Bootstrapped(ArticleUrl),
    /// Another section already reported this item during the run
    Duplicate(ArticleUrl),
    Unchanged(ArticleUrl),
    Changed(ArticleUrl),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcomes: Vec<(String, SectionOutcome)>,
    pub notified: usize,
    pub committed: bool,
}

/// Per-run bookkeeping that never outlives the process.
struct RunContext {
    is_bootstrap: bool,
    sent_this_run: HashSet<ArticleUrl>,
}

/// One full pass over the configured sections.
///
/// State is loaded once, mutated on a private copy and committed once after
/// every section is done. Any error returned from `run` happens before the
/// commit, so the stored record is left as it was.
pub struct RunCoordinator {
    sections: Vec<Section>,
    driver: Box<dyn PageDriver>,
    sink: Arc<dyn NotificationSink>,
    store: Arc<dyn StateStore>,
    navigator: SectionNavigator,
    locator: ArticleLocator,
    titles: TitleResolver,
    branding: Branding,
    call_timeout: Duration,
    article_settle: Duration,
    dry_run: bool,
}

impl RunCoordinator {
    pub fn new(
        config: &Config,
        driver: Box<dyn PageDriver>,
        sink: Arc<dyn NotificationSink>,
        store: Arc<dyn StateStore>,
    ) -> Result<Self> {
        Ok(Self {
            sections: config.sections.clone(),
            driver,
            sink,
            store,
            navigator: SectionNavigator::new(config),
            locator: ArticleLocator::new(config)?,
            titles: TitleResolver::new(&config.brand_name),
            branding: Branding::from_config(config),
            call_timeout: config.call_timeout(),
            article_settle: Duration::from_millis(config.article_settle_ms),
            dry_run: config.dry_run,
        })
    }

    pub async fn run(&mut self) -> Result<RunReport> {
        let loaded = self.store.load().await;
        let mut ctx = RunContext {
            is_bootstrap: is_bootstrap(&loaded, &self.sections),
            sent_this_run: HashSet::new(),
        };
        if ctx.is_bootstrap {
            info!("No usable state, recording a baseline without notifying");
        }

        let mut state = loaded.with_sections(&self.sections);
        let mut outcomes = Vec::with_capacity(self.sections.len());
        let mut notified = 0;

        self.navigator.open_board(self.driver.as_mut()).await?;

        for section in self.sections.clone() {
            let outcome = self.process_section(&section, &mut ctx, &mut state).await?;
            info!("[{}] {:?}", section.key, outcome);
            if matches!(outcome, SectionOutcome::Changed(_)) {
                notified += 1;
            }
            outcomes.push((section.key.clone(), outcome));
        }

        let committed = if self.dry_run {
            info!("Dry run, state left untouched");
            false
        } else {
            self.store.commit(&state).await?;
            true
        };

        Ok(RunReport {
            outcomes,
            notified,
            committed,
        })
    }

    async fn process_section(
        &mut self,
        section: &Section,
        ctx: &mut RunContext,
        state: &mut ObservedState,
    ) -> Result<SectionOutcome> {
        if !self.navigator.select(self.driver.as_mut(), section).await {
            return Ok(SectionOutcome::NotSelected);
        }

        let Some(latest) = self.locator.latest(self.driver.as_ref()).await else {
            return Ok(SectionOutcome::NoArticle);
        };

        let previous = state.get(&section.key).map(str::to_string);

        if ctx.is_bootstrap && previous.is_none() {
            state.set(&section.key, &latest);
            ctx.sent_this_run.insert(latest.clone());
            return Ok(SectionOutcome::Bootstrapped(latest));
        }

        if ctx.sent_this_run.contains(&latest) {
            state.set(&section.key, &latest);
            return Ok(SectionOutcome::Duplicate(latest));
        }

        if previous.as_deref() == Some(latest.as_str()) {
            return Ok(SectionOutcome::Unchanged(latest));
        }

        self.report_change(section, &latest).await?;
        ctx.sent_this_run.insert(latest.clone());
        state.set(&section.key, &latest);

        self.navigator.return_to_board(self.driver.as_mut()).await?;

        Ok(SectionOutcome::Changed(latest))
    }

    /// Visit the article for its title and post the notification. Both a failed
    /// article load and a rejected delivery abort the run.
    async fn report_change(&mut self, section: &Section, url: &ArticleUrl) -> Result<()> {
        self.driver.navigate(url.as_str(), self.call_timeout).await?;
        tokio::time::sleep(self.article_settle).await;

        let article = ArticleRef {
            url: url.clone(),
            title: self.titles.resolve(self.driver.as_ref()).await,
        };

        let event = NotificationEvent::from_article(&section.label, &article);
        notify(self.sink.as_ref(), &self.branding, &event).await
    }
}
