//! One run of the harvester: fetch, reconcile, emit, diff, record

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::AppResult;
use crate::ingestor::{FeedOutcome, IngestorService};
use crate::playlist::PlaylistGenerator;
use crate::reconciler::{FeedReconciler, ReconcileStats};
use crate::storage::CatalogStore;
use crate::tracker::{report, DiffEngine, DiffResult, HistoryEntry, HistoryLog};
use crate::utils::ChannelCategorizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every feed provider answered
    Complete,
    /// At least one feed provider failed and was treated as empty
    Degraded,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub total_groups: usize,
    pub total_channels: usize,
    pub playlists: Vec<PathBuf>,
    pub feeds: Vec<FeedOutcome>,
    pub reconcile: ReconcileStats,
    pub diff: DiffResult,
}

impl RunSummary {
    pub fn is_degraded(&self) -> bool {
        self.status == RunStatus::Degraded
    }
}

/// All components of a run, wired from one configuration
pub struct Pipeline {
    ingestor: IngestorService,
    reconciler: FeedReconciler,
    generator: PlaylistGenerator,
    store: CatalogStore,
    diff_engine: DiffEngine,
    history: HistoryLog,
    report_preview: usize,
}

impl Pipeline {
    pub fn new(config: &Config, ingestor: IngestorService) -> AppResult<Self> {
        Ok(Self {
            ingestor,
            reconciler: FeedReconciler::from_app_config(config)?,
            generator: PlaylistGenerator::new(
                config.output.clone(),
                ChannelCategorizer::from_app_config(config),
            ),
            store: CatalogStore::from_config(&config.output),
            diff_engine: DiffEngine::from_config(&config.tracker),
            history: HistoryLog::from_config(&config.output, &config.tracker),
            report_preview: config.tracker.report_preview,
        })
    }

    /// Pipeline fetching from the remote feeds
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(config, IngestorService::from_config(&config.feeds))
    }

    /// Execute one run
    ///
    /// Feed failures degrade the run; failures reading the previous catalog or
    /// history, or writing any output, abort it. An unreadable history aborts
    /// before any file is touched.
    pub async fn run_once(&self, now: DateTime<Utc>) -> AppResult<RunSummary> {
        info!("Fetching feeds");
        let feeds = self.ingestor.fetch_all().await;
        let status = if feeds.is_degraded() {
            RunStatus::Degraded
        } else {
            RunStatus::Complete
        };

        info!("Processing channels");
        let (catalog, stats) = self
            .reconciler
            .reconcile_with_stats(&feeds.index, &feeds.catalog);
        info!("Total groups: {}", catalog.total_groups());
        info!("Total channels: {}", catalog.total_channels());

        // Everything persisted is read before anything is written
        let previous = self.store.load_previous()?.map(|s| s.into_catalog());
        let history = self.history.load()?;

        info!("Generating output files");
        let playlists = self.generator.write_all(&catalog, &now)?;
        self.store.save(&catalog, now)?;

        info!("Tracking changes");
        let diff = self.diff_engine.diff(previous.as_ref(), &catalog);
        self.store.save_diff_report(&diff)?;
        self.history
            .append(history, HistoryEntry::from_diff(&diff, now))?;

        for line in report::render_lines(&diff, self.report_preview) {
            info!("{}", line);
        }

        if status == RunStatus::Degraded {
            warn!("Run finished with degraded feeds, the catalog may be incomplete");
        }

        Ok(RunSummary {
            status,
            started_at: now,
            total_groups: catalog.total_groups(),
            total_channels: catalog.total_channels(),
            playlists,
            feeds: feeds.outcomes,
            reconcile: stats,
            diff,
        })
    }
}

/// Build a pipeline around `ingestor` and execute one run
pub async fn run_once(
    config: &Config,
    ingestor: IngestorService,
    now: DateTime<Utc>,
) -> AppResult<RunSummary> {
    Pipeline::new(config, ingestor)?.run_once(now).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestor::StaticFeedProvider;
    use crate::models::RawRecord;
    use tempfile::TempDir;

    fn config_in(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.output.dir = dir.to_path_buf();
        config
    }

    fn ingestor(index: Vec<RawRecord>, catalog: Vec<RawRecord>) -> IngestorService {
        IngestorService::new(
            Box::new(StaticFeedProvider::new("index", index)),
            Box::new(StaticFeedProvider::new("catalog", catalog)),
        )
    }

    #[tokio::test]
    async fn test_run_once_writes_all_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());

        let summary = run_once(
            &config,
            ingestor(
                vec![
                    RawRecord::new("ARD HD", "Germany", "http://a/ard"),
                    RawRecord::new("ORF1", "Austria", "http://a/orf1"),
                ],
                vec![
                    RawRecord::new("ARD HD", "Germany", "http://b/ard"),
                    RawRecord::new("RTL LUXEMBOURG", "Germany", "http://b/rtl"),
                ],
            ),
            Utc::now(),
        )
        .await
        .unwrap();

        assert_eq!(summary.status, RunStatus::Complete);
        assert_eq!(summary.total_groups, 2);
        assert_eq!(summary.total_channels, 2);
        assert_eq!(summary.reconcile.excluded, 1);
        assert_eq!(summary.playlists.len(), 2);
        assert_eq!(summary.diff.added, 2);

        for file in ["Germany.m3u8", "Austria.m3u8", "channels.json", "diff_report.json", "history.json"] {
            assert!(temp_dir.path().join(file).exists(), "{} missing", file);
        }
    }

    #[tokio::test]
    async fn test_unwritable_output_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let config = config_in(&blocker);

        let result = run_once(
            &config,
            ingestor(vec![RawRecord::new("ARD", "Germany", "http://a/ard")], Vec::new()),
            Utc::now(),
        )
        .await;

        assert!(result.is_err());
    }
}
