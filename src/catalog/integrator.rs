use metrics::counter;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use super::CatalogStore;
use crate::common::constants::{
    DEFAULT_COMPANY_NAME, DEFAULT_DURATION_MINUTES, DEFAULT_INTERMISSIONS, DEFAULT_LANGUAGE,
    DEFAULT_SHOWING_TIME,
};
use crate::common::error::{Result, ScraperError};
use crate::common::types::{
    Company, IntegrationResult, NewPerformance, NormalizedEvent, Showing, Venue, VenueDescriptor,
};

/// Outcome of integrating one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Created,
    Duplicate,
}

/// Writes normalized events into the catalog, one independent write per event.
pub struct CatalogIntegrator {
    store: Arc<dyn CatalogStore>,
}

impl CatalogIntegrator {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Resolves the venue, then creates every event not already in the catalog.
    ///
    /// Per-event failures are recorded in `errors` and processing continues.
    /// Only a failed venue resolution stops the run, yielding an all-zero
    /// report with a single error.
    #[instrument(skip_all, fields(venue = %descriptor.slug, events = events.len()))]
    pub async fn integrate(
        &self,
        descriptor: &VenueDescriptor,
        events: &[NormalizedEvent],
        actor_id: &str,
    ) -> IntegrationResult {
        let (venue, venue_created) = match self.resolve_venue(descriptor, actor_id).await {
            Ok(resolved) => resolved,
            Err(e) => {
                let message = format!("Integration failed: {}", e);
                error!("{}", message);
                counter!("stagelog_integration_errors_total", "stage" => "venue").increment(1);
                return IntegrationResult::failed(message);
            }
        };

        let mut result = IntegrationResult {
            venues_created: u32::from(venue_created),
            ..IntegrationResult::default()
        };

        for event in events {
            match self.integrate_event(event, &venue, actor_id).await {
                Ok(EventOutcome::Created) => {
                    result.performances_created += 1;
                    counter!("stagelog_performances_created_total").increment(1);
                }
                Ok(EventOutcome::Duplicate) => {
                    debug!("Skipping duplicate: {}", event.title());
                }
                Err(e) => {
                    let message = e.to_string();
                    error!("{}", message);
                    counter!("stagelog_integration_errors_total", "stage" => "performance")
                        .increment(1);
                    result.errors.push(message);
                }
            }
        }

        info!(
            "Integration complete: {} performances created, {} errors",
            result.performances_created,
            result.errors.len()
        );
        result
    }

    async fn resolve_venue(&self, descriptor: &VenueDescriptor, actor_id: &str) -> Result<(Venue, bool)> {
        let existing = self
            .store
            .find_venue_by_slug(&descriptor.slug)
            .await
            .map_err(|e| ScraperError::VenueResolution(e.to_string()))?;

        if let Some(venue) = existing {
            return Ok((venue, false));
        }

        info!("Creating venue {}", descriptor.slug);
        let venue = self
            .store
            .create_venue(descriptor, actor_id)
            .await
            .map_err(|e| ScraperError::VenueResolution(e.to_string()))?;
        Ok((venue, true))
    }

    async fn integrate_event(
        &self,
        event: &NormalizedEvent,
        venue: &Venue,
        actor_id: &str,
    ) -> Result<EventOutcome> {
        let write_err = |e: ScraperError| ScraperError::IntegrationWrite {
            title: event.title().to_string(),
            message: e.to_string(),
        };

        let existing = self
            .store
            .find_performance(event.title(), event.event_date, venue.id)
            .await
            .map_err(write_err)?;
        if existing.is_some() {
            return Ok(EventOutcome::Duplicate);
        }

        let performance = self
            .store
            .create_performance(build_performance(event, venue, actor_id))
            .await
            .map_err(write_err)?;
        info!("Created performance: {}", performance.fields.title);
        Ok(EventOutcome::Created)
    }
}

/// Performance record for an event not yet in the catalog, with catalog defaults filled in
pub fn build_performance(event: &NormalizedEvent, venue: &Venue, actor_id: &str) -> NewPerformance {
    let draft = &event.draft;
    let venue_name = &venue.descriptor.name;

    NewPerformance {
        title: draft.title.clone(),
        description: draft
            .description
            .clone()
            .unwrap_or_else(|| format!("Performance at {}", venue_name)),
        performance_types: event
            .category_tags
            .iter()
            .map(|tag| tag.as_str().to_string())
            .collect(),
        duration_minutes: DEFAULT_DURATION_MINUTES,
        intermissions: DEFAULT_INTERMISSIONS,
        languages: vec![DEFAULT_LANGUAGE.to_string()],
        venue_ids: vec![venue.id],
        company: Company {
            name: DEFAULT_COMPANY_NAME.to_string(),
            description: Some(format!("Independent performance at {}", venue_name)),
        },
        showings: vec![Showing {
            date: event.event_date,
            time: draft
                .raw_time_fragment
                .clone()
                .unwrap_or_else(|| DEFAULT_SHOWING_TIME.to_string()),
            venue_id: venue.id,
            ticket_url: draft.ticket_url.clone(),
            sold_out: draft.sold_out,
        }],
        submitted_by: actor_id.to_string(),
    }
}
