use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

use super::CatalogStore;
use crate::common::error::{Result, ScraperError};
use crate::common::types::{NewPerformance, Performance, Venue, VenueDescriptor};

#[derive(Default)]
struct Tables {
    venues: Vec<Venue>,
    performances: Vec<Performance>,
}

/// In-memory catalog for development/testing
#[derive(Default)]
pub struct InMemoryCatalog {
    tables: Mutex<Tables>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| ScraperError::Storage("catalog lock poisoned".to_string()))
    }

    pub fn venue_count(&self) -> usize {
        self.tables().map(|t| t.venues.len()).unwrap_or_default()
    }

    pub fn performance_count(&self) -> usize {
        self.tables().map(|t| t.performances.len()).unwrap_or_default()
    }

    /// Snapshot of stored performances in insertion order
    pub fn performances(&self) -> Vec<Performance> {
        self.tables()
            .map(|t| t.performances.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn find_venue_by_slug(&self, slug: &str) -> Result<Option<Venue>> {
        let tables = self.tables()?;
        Ok(tables
            .venues
            .iter()
            .find(|v| v.descriptor.slug == slug)
            .cloned())
    }

    async fn create_venue(&self, descriptor: &VenueDescriptor, actor_id: &str) -> Result<Venue> {
        let venue = Venue {
            id: Uuid::new_v4(),
            descriptor: descriptor.clone(),
            submitted_by: actor_id.to_string(),
            created_at: Utc::now(),
        };

        let mut tables = self.tables()?;
        if tables.venues.iter().any(|v| v.descriptor.slug == descriptor.slug) {
            return Err(ScraperError::Storage(format!(
                "venue slug '{}' already exists",
                descriptor.slug
            )));
        }
        tables.venues.push(venue.clone());

        debug!("Created venue: {} with id {}", venue.descriptor.name, venue.id);
        Ok(venue)
    }

    async fn find_performance(
        &self,
        title: &str,
        date: DateTime<Utc>,
        venue_id: Uuid,
    ) -> Result<Option<Performance>> {
        let tables = self.tables()?;
        Ok(tables
            .performances
            .iter()
            .find(|p| p.matches(title, date, venue_id))
            .cloned())
    }

    async fn create_performance(&self, fields: NewPerformance) -> Result<Performance> {
        let performance = Performance {
            id: Uuid::new_v4(),
            fields,
            created_at: Utc::now(),
        };

        let mut tables = self.tables()?;
        tables.performances.push(performance.clone());

        debug!(
            "Created performance: {} with id {}",
            performance.fields.title, performance.id
        );
        Ok(performance)
    }
}
