use metrics::{counter, histogram};
use std::sync::Arc;
use tracing::instrument::WithSubscriber;
use tracing::{debug, error, info, instrument};

use crate::apis::VenueAdapter;
use crate::catalog::{CatalogIntegrator, CatalogStore};
use crate::classify::classify;
use crate::common::types::{IntegrationResult, NormalizedEvent};
use crate::config::Config;
use crate::extract::CandidateExtractor;
use crate::normalize::{Clock, DateNormalizer, SystemClock, YearPolicy};
use crate::parse::EventParser;
use crate::render::{DomSnapshot, PageRenderer, RenderOptions};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub render: RenderOptions,
    pub include_recurring: bool,
    pub year_policy: YearPolicy,
    pub fallback_days: i64,
    pub min_candidate_chars: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            render: RenderOptions::from(&config.renderer),
            include_recurring: config.pipeline.include_recurring,
            year_policy: config.pipeline.year_policy,
            fallback_days: config.pipeline.fallback_days,
            min_candidate_chars: config.pipeline.min_candidate_chars,
        }
    }
}

/// Runs render -> extract -> parse -> normalize/classify -> integrate for one venue.
///
/// Stages run strictly in sequence and events are integrated one at a time,
/// so the report's error order matches page order. Every failure except a
/// lost catalog connection degrades to a default or an entry in `errors`;
/// even that one comes back as a report rather than an `Err`.
pub struct Pipeline {
    renderer: Arc<dyn PageRenderer>,
    store: Arc<dyn CatalogStore>,
    clock: Arc<dyn Clock>,
    options: PipelineOptions,
    log_sink: Option<tracing::Dispatch>,
}

impl Pipeline {
    pub fn new(renderer: Arc<dyn PageRenderer>, store: Arc<dyn CatalogStore>) -> Self {
        Self {
            renderer,
            store,
            clock: Arc::new(SystemClock),
            options: PipelineOptions::default(),
            log_sink: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Route this pipeline's logs to `dispatch` instead of the global subscriber
    pub fn with_log_sink(mut self, dispatch: tracing::Dispatch) -> Self {
        self.log_sink = Some(dispatch);
        self
    }

    pub async fn run(&self, adapter: &dyn VenueAdapter, actor_id: &str) -> IntegrationResult {
        let run = self.run_for_venue(adapter, actor_id);
        match &self.log_sink {
            Some(dispatch) => run.with_subscriber(dispatch.clone()).await,
            None => run.await,
        }
    }

    #[instrument(skip(self, adapter), fields(api_name = %adapter.api_name()))]
    async fn run_for_venue(&self, adapter: &dyn VenueAdapter, actor_id: &str) -> IntegrationResult {
        let api_name = adapter.api_name();
        info!("Starting pipeline for {} with {} renderer", api_name, self.renderer.name());
        counter!("stagelog_pipeline_runs_total", "api" => api_name).increment(1);
        let t_pipeline = std::time::Instant::now();

        let snapshot = match self
            .renderer
            .render(adapter.source_url(), &self.options.render)
            .await
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                let message = format!("Render failed: {}", e);
                error!("{}", message);
                return IntegrationResult::failed(message);
            }
        };

        let events = self.prepare_events(adapter, &snapshot);

        let integrator = CatalogIntegrator::new(self.store.clone());
        let result = integrator
            .integrate(&adapter.venue_descriptor(), &events, actor_id)
            .await;

        histogram!("stagelog_pipeline_duration_seconds", "api" => api_name)
            .record(t_pipeline.elapsed().as_secs_f64());
        info!(
            "Pipeline finished for {}: {} venues created, {} performances created, {} errors",
            api_name,
            result.venues_created,
            result.performances_created,
            result.errors.len()
        );
        result
    }

    /// The in-memory stages: extract candidates, parse drafts, resolve dates and tags.
    pub fn prepare_events(&self, adapter: &dyn VenueAdapter, snapshot: &DomSnapshot) -> Vec<NormalizedEvent> {
        let api_name = adapter.api_name();

        let extractor =
            CandidateExtractor::new(adapter.candidate_selectors(), self.options.min_candidate_chars);
        let candidates = extractor.extract(snapshot);
        counter!("stagelog_candidates_total", "api" => api_name).increment(candidates.len() as u64);
        info!("Extracted {} candidates", candidates.len());

        let parser = EventParser::new(adapter.banner_phrases());
        let drafts: Vec<_> = candidates.iter().filter_map(|c| parser.parse(c)).collect();
        let discarded = candidates.len() - drafts.len();

        let (dated, recurring): (Vec<_>, Vec<_>) = drafts.into_iter().partition(|d| !d.is_recurring);
        info!(
            "Parsed {} dated events and {} recurring shows ({} candidates discarded)",
            dated.len(),
            recurring.len(),
            discarded
        );

        let mut selected = dated;
        if self.options.include_recurring {
            selected.extend(recurring);
        } else {
            for show in &recurring {
                debug!("Leaving out recurring show: {}", show.title);
            }
        }

        let normalizer = DateNormalizer::new(self.clock.clone(), adapter.timezone())
            .with_year_policy(self.options.year_policy)
            .with_fallback_days(self.options.fallback_days);

        selected
            .into_iter()
            .map(|draft| {
                let resolved = normalizer.normalize_draft(&draft);
                let category_tags = classify(&draft.title, draft.description.as_deref());
                debug!(
                    "{} -> {} ({:?}) {:?}",
                    draft.title, resolved.at, resolved.source, category_tags
                );
                NormalizedEvent {
                    draft,
                    event_date: resolved.at,
                    date_source: resolved.source,
                    category_tags,
                }
            })
            .collect()
    }
}
