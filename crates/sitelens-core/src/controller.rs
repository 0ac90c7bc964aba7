// ── Controller abstraction ──
//
// Facade over the site registry and the analysis engine. Owns the page
// fetcher, the random source, and the in-flight bookkeeping that keeps
// two operations from racing on the same site.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use dashmap::DashSet;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use url::Url;

use sitelens_api::PageFetcher;

use crate::analysis::{
    self, Recommendation, ScoreReport, SignalBundle, fallback, optimize, quick_analysis,
};
use crate::command::{AnalysisSource, Command, CommandResult};
use crate::config::{EngineConfig, SiteSeed};
use crate::error::CoreError;
use crate::model::{Issue, Site, SiteId, normalize_keywords, normalize_url};
use crate::store::SiteRegistry;
use crate::stream::{EntityStream, Snapshot};

// ── Collaborator seams ───────────────────────────────────────────

/// Asks the user whether a site may be removed.
pub trait ConfirmRemoval {
    fn confirm_removal(&self, site: &Site) -> bool;
}

impl<F> ConfirmRemoval for F
where
    F: Fn(&Site) -> bool,
{
    fn confirm_removal(&self, site: &Site) -> bool {
        self(site)
    }
}

/// Progress of a bulk quick analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkProgress {
    pub completed: usize,
    pub total: usize,
}

impl BulkProgress {
    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

// ── In-flight tracking ───────────────────────────────────────────

/// Marks a site busy for as long as it lives.
struct BusyGuard<'a> {
    in_flight: &'a DashSet<SiteId>,
    id: SiteId,
}

impl<'a> BusyGuard<'a> {
    fn claim(in_flight: &'a DashSet<SiteId>, id: SiteId) -> Result<Self, CoreError> {
        if !in_flight.insert(id) {
            return Err(CoreError::SiteBusy { id });
        }
        Ok(Self { in_flight, id })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.id);
    }
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Every clone shares the
/// same registry, fetcher, and random source.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: EngineConfig,
    registry: Arc<SiteRegistry>,
    fetcher: Arc<dyn PageFetcher>,
    rng: Mutex<StdRng>,
    in_flight: DashSet<SiteId>,
    bulk_progress: watch::Sender<BulkProgress>,
}

impl Controller {
    pub fn new(config: EngineConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let (bulk_progress, _) = watch::channel(BulkProgress::default());

        Self {
            inner: Arc::new(ControllerInner {
                config,
                registry: Arc::new(SiteRegistry::new()),
                fetcher,
                rng: Mutex::new(rng),
                in_flight: DashSet::new(),
                bulk_progress,
            }),
        }
    }

    /// Access the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Access the underlying registry.
    pub fn registry(&self) -> &Arc<SiteRegistry> {
        &self.inner.registry
    }

    // ── Command execution ────────────────────────────────────────

    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        match cmd {
            Command::AddSite { url, keywords } => {
                self.add_site(&url, keywords).map(CommandResult::Added)
            }
            Command::AnalyzeSite { id } => self.analyze_site(id).await,
            Command::OptimizeSite { id } => self.optimize_site(id).await,
            Command::QuickAnalyzeAll => self.quick_analyze_all().await,
        }
    }

    /// Register a site from raw user input.
    pub fn add_site<I, S>(&self, url: &str, keywords: I) -> Result<Arc<Site>, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let url = normalize_url(url)?;
        let keywords = normalize_keywords(keywords, &self.inner.config.default_keyword);
        let site = self.inner.registry.insert(url, keywords)?;
        info!(id = %site.id, url = %site.url, "site added");
        Ok(site)
    }

    /// Fetch, extract, and score one site, degrading to a fallback
    /// estimate when the page cannot be retrieved.
    pub async fn analyze_site(&self, id: SiteId) -> Result<CommandResult, CoreError> {
        let site = self.require(id)?;
        let _busy = BusyGuard::claim(&self.inner.in_flight, id)?;

        let (report, source) = match self.fetch_report(&site).await {
            Ok(report) => (report, AnalysisSource::Page),
            Err(err) => {
                if err.is_unreachable() {
                    warn!(
                        url = %site.url,
                        error = %err,
                        status = ?err.status(),
                        timeout = err.is_timeout(),
                        "page unreachable, using fallback"
                    );
                } else {
                    error!(url = %site.url, error = %err, "fetch failed before any request, using fallback");
                }
                (self.with_rng(fallback), AnalysisSource::Fallback)
            }
        };

        let site = self.record(id, &report)?;
        info!(
            id = %id,
            url = %site.url,
            seo = site.scores.seo,
            performance = site.scores.performance,
            accessibility = site.scores.accessibility,
            %source,
            "analysis complete"
        );
        Ok(CommandResult::Analyzed {
            site,
            report,
            source,
        })
    }

    async fn fetch_report(&self, site: &Site) -> Result<ScoreReport, sitelens_api::Error> {
        let url = Url::parse(&site.url)?;
        let markup = self.inner.fetcher.fetch(&url).await?;
        let signals = SignalBundle::extract(&markup, &site.url);
        debug!(url = %site.url, ?signals, "signals extracted");
        Ok(analysis::score(&signals))
    }

    /// Run one simulated optimization pass.
    pub async fn optimize_site(&self, id: SiteId) -> Result<CommandResult, CoreError> {
        let site = self.require(id)?;
        let _busy = BusyGuard::claim(&self.inner.in_flight, id)?;

        let outcome = self.with_rng(|rng| optimize(&site.issues, site.scores, rng));
        debug!(id = %id, applied = outcome.applied.len(), "optimization planned");

        tokio::time::sleep(self.inner.config.optimize_delay).await;

        let site = self.inner.registry.update(id, |s| {
            let scores = outcome.apply(s.scores);
            s.record(
                scores,
                scores.status(),
                outcome.remaining_issues.clone(),
                Utc::now(),
            );
        })?;
        info!(
            id = %id,
            url = %site.url,
            seo = site.scores.seo,
            performance = site.scores.performance,
            accessibility = site.scores.accessibility,
            "optimization complete"
        );
        Ok(CommandResult::Optimized {
            site,
            applied: outcome.applied,
        })
    }

    /// Quick-analyze every registered site, one every `quick_stagger`.
    ///
    /// Sites busy with another operation are skipped. Progress is published
    /// on [`bulk_progress`](Self::bulk_progress) after each site.
    pub async fn quick_analyze_all(&self) -> Result<CommandResult, CoreError> {
        let sites = self.inner.registry.snapshot();
        if sites.is_empty() {
            return Err(CoreError::EmptyRegistry);
        }

        let total = sites.len();
        self.inner
            .bulk_progress
            .send_replace(BulkProgress { completed: 0, total });

        let start = tokio::time::Instant::now();
        let stagger = self.inner.config.quick_stagger;
        let mut analyzed = 0;

        for (index, site) in sites.iter().enumerate() {
            let offset = stagger.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
            tokio::time::sleep_until(start + offset).await;

            match self.quick_analyze_one(site.id) {
                Ok(()) => analyzed += 1,
                Err(err) => warn!(id = %site.id, error = %err, "skipping site"),
            }
            self.inner.bulk_progress.send_replace(BulkProgress {
                completed: index + 1,
                total,
            });
        }

        info!(analyzed, total, "quick analysis complete");
        Ok(CommandResult::QuickAnalyzed(analyzed))
    }

    fn quick_analyze_one(&self, id: SiteId) -> Result<(), CoreError> {
        let _busy = BusyGuard::claim(&self.inner.in_flight, id)?;
        let report = self.with_rng(quick_analysis);
        self.record(id, &report)?;
        Ok(())
    }

    /// Remove a site after the user confirms. The only deletion path.
    pub fn remove_site(
        &self,
        id: SiteId,
        confirm: &dyn ConfirmRemoval,
    ) -> Result<CommandResult, CoreError> {
        let site = self.require(id)?;
        if !confirm.confirm_removal(&site) {
            debug!(%id, "removal declined");
            return Ok(CommandResult::Declined);
        }
        let removed = self
            .inner
            .registry
            .remove(id)
            .ok_or_else(|| CoreError::not_found(id))?;
        info!(%id, url = %removed.url, "site removed");
        Ok(CommandResult::Removed(removed))
    }

    /// Register configured sites, skipping the ones that are invalid or
    /// already present.
    pub fn seed_sites<I>(&self, seeds: I) -> Vec<Arc<Site>>
    where
        I: IntoIterator<Item = SiteSeed>,
    {
        let mut added = Vec::new();
        for seed in seeds {
            let site = match self.add_site(&seed.url, &seed.keywords) {
                Ok(site) => site,
                Err(err) => {
                    warn!(url = %seed.url, error = %err, "skipping configured site");
                    continue;
                }
            };
            if seed.issues.is_empty() {
                added.push(site);
                continue;
            }
            let issues: Vec<Issue> = seed.issues.iter().map(|s| Issue::from(s.as_str())).collect();
            match self.inner.registry.update(site.id, |s| s.issues = issues) {
                Ok(site) => added.push(site),
                Err(err) => warn!(url = %seed.url, error = %err, "configured site vanished"),
            }
        }
        added
    }

    // ── Reads ────────────────────────────────────────────────────

    pub fn sites_snapshot(&self) -> Snapshot<Site> {
        self.inner.registry.snapshot()
    }

    pub fn site(&self, id: SiteId) -> Option<Arc<Site>> {
        self.inner.registry.get(id)
    }

    /// Look up by URL as the user typed it.
    pub fn site_by_url(&self, input: &str) -> Option<Arc<Site>> {
        let url = normalize_url(input).ok()?;
        self.inner.registry.find_by_url(&url)
    }

    /// Resolve an id (`3`, `#3`) or a URL to a registered site.
    pub fn resolve_site(&self, identifier: &str) -> Result<Arc<Site>, CoreError> {
        let by_id = identifier
            .parse::<SiteId>()
            .ok()
            .and_then(|id| self.site(id));
        by_id
            .or_else(|| self.site_by_url(identifier))
            .ok_or_else(|| CoreError::SiteNotFound {
                identifier: identifier.into(),
            })
    }

    pub fn sites(&self) -> EntityStream<Site> {
        self.inner.registry.subscribe()
    }

    pub fn bulk_progress(&self) -> watch::Receiver<BulkProgress> {
        self.inner.bulk_progress.subscribe()
    }

    pub fn recommendations(&self) -> Result<Vec<Recommendation>, CoreError> {
        analysis::recommend(&self.sites_snapshot())
    }

    // ── Helpers ──────────────────────────────────────────────────

    fn require(&self, id: SiteId) -> Result<Arc<Site>, CoreError> {
        self.site(id).ok_or_else(|| CoreError::not_found(id))
    }

    fn record(&self, id: SiteId, report: &ScoreReport) -> Result<Arc<Site>, CoreError> {
        self.inner.registry.update(id, |s| {
            s.record(report.scores, report.status, report.issues.clone(), Utc::now());
        })
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self
            .inner
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}
